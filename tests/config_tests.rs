use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use itsalltext::config::hotkey::{HotKey, HotKeyError, Modifier};
use itsalltext::config::preferences::{
    ConfigError, GumdropPosition, Preferences, load_config, load_preferences, normalize_extension,
    save_preferences,
};
use itsalltext::config::store::{ConfigPort, PrefKey, PrefStore};
use itsalltext::record::charset::{Charset, REPLACEMENT_CHAR};
use tempfile::TempDir;

// ============================================================================
// Defaults and derived values
// ============================================================================

#[test]
fn defaults_match_documented_values() {
    let prefs = Preferences::default();
    assert_eq!(prefs.charset, "UTF-8");
    assert_eq!(prefs.refresh_secs, 2);
    assert_eq!(prefs.gumdrop_position, GumdropPosition::LowerRight);
    assert_eq!(prefs.retention_days, 7);
    assert_eq!(prefs.editor, None);
    assert_eq!(
        prefs.extension_list(),
        vec![".txt", ".html", ".css", ".xml", ".xsl", ".js"]
    );
}

#[test]
fn refresh_interval_has_a_floor() {
    let prefs = Preferences {
        refresh_secs: 0,
        ..Preferences::default()
    };
    assert_eq!(prefs.refresh_interval(), Duration::from_secs(1));
}

#[test]
fn extension_list_is_normalized() {
    let prefs = Preferences {
        extensions: " txt, .md,,  .txt , html ".into(),
        ..Preferences::default()
    };
    assert_eq!(prefs.extension_list(), vec![".txt", ".md", ".html"]);
    assert_eq!(prefs.default_extension(), ".txt");

    let empty = Preferences {
        extensions: " , ".into(),
        ..Preferences::default()
    };
    assert!(empty.extension_list().is_empty());
    assert_eq!(empty.default_extension(), ".txt");
}

#[test]
fn normalize_extension_cases() {
    assert_eq!(normalize_extension("md").as_deref(), Some(".md"));
    assert_eq!(normalize_extension(" .md ").as_deref(), Some(".md"));
    assert_eq!(normalize_extension("..md").as_deref(), Some(".md"));
    assert_eq!(normalize_extension("   "), None);
    assert_eq!(normalize_extension("."), None);
    assert_eq!(normalize_extension("tar.gz").as_deref(), Some(".tar.gz"));
    assert_eq!(normalize_extension("/../../escaped"), None);
    assert_eq!(normalize_extension("..\\evil"), None);
    assert_eq!(normalize_extension(".m d"), None);
}

#[test]
fn append_extension_skips_duplicates_and_whitespace() {
    let mut prefs = Preferences {
        extensions: ".txt, .md".into(),
        ..Preferences::default()
    };
    assert!(!prefs.append_extension("md"));
    assert!(!prefs.append_extension(" .txt\n"));
    assert!(!prefs.append_extension("../x"));
    assert!(prefs.append_extension(" r st "));
    assert_eq!(prefs.extensions, ".txt, .md,.rst");
    assert_eq!(prefs.extension_list(), vec![".txt", ".md", ".rst"]);

    let mut empty = Preferences {
        extensions: "  ".into(),
        ..Preferences::default()
    };
    assert!(empty.append_extension("org"));
    assert_eq!(empty.extensions, ".org");
}

#[test]
fn unknown_charset_falls_back_to_utf8() {
    let prefs = Preferences {
        charset: "klingon".into(),
        ..Preferences::default()
    };
    assert_eq!(prefs.charset(), Charset::Utf8);
}

// ============================================================================
// YAML loading
// ============================================================================

#[test]
fn load_partial_yaml_fills_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("itsalltext.yaml");
    std::fs::write(
        &path,
        "editor: /usr/bin/vim\nrefresh_secs: 5\ngumdrop_position: upper-left\nhotkey: ctrl+shift+e\n",
    )
    .unwrap();

    let prefs = load_preferences(&path).unwrap();
    assert_eq!(prefs.editor.as_deref(), Some(std::path::Path::new("/usr/bin/vim")));
    assert_eq!(prefs.refresh_secs, 5);
    assert_eq!(prefs.gumdrop_position, GumdropPosition::UpperLeft);
    assert_eq!(prefs.charset, "UTF-8");
    assert_eq!(prefs.retention_days, 7);
    assert!(prefs.hotkey().unwrap().is_some());
}

#[test]
fn extreme_durations_are_clamped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("itsalltext.yaml");
    std::fs::write(&path, "retention_days: 300000000000000000\nfade_time: .inf\n").unwrap();

    let prefs = load_preferences(&path).unwrap();
    assert_eq!(prefs.retention(), Duration::from_secs(u64::MAX));
    assert_eq!(prefs.fade_duration(), Preferences::default().fade_duration());

    let negative = Preferences {
        fade_time: -3.0,
        ..Preferences::default()
    };
    assert_eq!(negative.fade_duration(), Duration::ZERO);
}

#[test]
fn saved_preferences_load_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("itsalltext.yaml");
    let prefs = Preferences {
        extensions: ".txt,.org".into(),
        refresh_secs: 4,
        ..Preferences::default()
    };

    save_preferences(&path, &prefs).unwrap();
    assert_eq!(load_preferences(&path).unwrap(), prefs);
}

#[test]
fn malformed_yaml_is_reported_strictly_and_ignored_leniently() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.yaml");
    std::fs::write(&path, "refresh_secs: [not, a, number]\n").unwrap();

    assert!(matches!(load_preferences(&path), Err(ConfigError::Parse { .. })));
    assert_eq!(load_config(Some(&path)), Preferences::default());
}

#[test]
fn missing_config_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.yaml");
    assert!(matches!(load_preferences(&path), Err(ConfigError::Read { .. })));
    assert_eq!(load_config(Some(&path)), Preferences::default());
}

// ============================================================================
// Hotkey
// ============================================================================

#[test]
fn hotkey_parse_sorts_modifiers() {
    let key = HotKey::parse("Shift+Ctrl+E").unwrap();
    assert_eq!(key.modifiers, vec![Modifier::Ctrl, Modifier::Shift]);
    assert_eq!(key.key, "e");
    assert_eq!(key.to_string(), "ctrl+shift+e");
}

#[test]
fn hotkey_accepts_dash_and_aliases() {
    let key = HotKey::parse("cmd-option-i").unwrap();
    assert_eq!(key.modifiers, vec![Modifier::Alt, Modifier::Meta]);
    assert_eq!(key.key, "i");
    assert_eq!(HotKey::parse("F2").unwrap().modifiers, vec![]);
}

#[test]
fn hotkey_errors() {
    assert_eq!(HotKey::parse(" + "), Err(HotKeyError::Empty));
    assert_eq!(
        HotKey::parse("hyper+e"),
        Err(HotKeyError::UnknownModifier("hyper".into()))
    );
    assert!(matches!(HotKey::parse("ctrl+shift"), Err(HotKeyError::MissingKey(_))));
}

#[test]
fn blank_hotkey_preference_means_none() {
    let prefs = Preferences {
        hotkey: Some("  ".into()),
        ..Preferences::default()
    };
    assert_eq!(prefs.hotkey(), Ok(None));
}

// ============================================================================
// PrefStore
// ============================================================================

#[test]
fn update_notifies_changed_keys_only() {
    let store = PrefStore::default();
    let seen: Rc<RefCell<Vec<Vec<PrefKey>>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    store.subscribe(Box::new(move |keys, prefs| {
        assert!(prefs.refresh_secs >= 1);
        sink.borrow_mut().push(keys.to_vec());
    }));

    let changed = store.update(&mut |p: &mut Preferences| {
        p.refresh_secs = 10;
        p.extensions = ".md".into();
    });
    assert_eq!(changed, vec![PrefKey::RefreshSecs, PrefKey::Extensions]);
    assert_eq!(store.snapshot().refresh_secs, 10);

    let unchanged = store.update(&mut |p: &mut Preferences| p.refresh_secs = 10);
    assert!(unchanged.is_empty());
    assert_eq!(seen.borrow().len(), 1, "no notification without a change");
}

// ============================================================================
// Charsets
// ============================================================================

#[test]
fn charset_names() {
    assert_eq!(Charset::from_name("utf8"), Some(Charset::Utf8));
    assert_eq!(Charset::from_name(" ISO-8859-1 "), Some(Charset::Latin1));
    assert_eq!(Charset::from_name("US-ASCII"), Some(Charset::Ascii));
    assert_eq!(Charset::from_name("EBCDIC"), None);
    assert_eq!(Charset::Latin1.name(), "ISO-8859-1");
}

#[test]
fn unrepresentable_characters() {
    assert_eq!(Charset::Ascii.encode("naïve"), b"na?ve".to_vec());
    assert_eq!(Charset::Latin1.encode("€5"), b"?5".to_vec());
    assert_eq!(Charset::Ascii.decode(&[b'a', 0xff]), format!("a{}", REPLACEMENT_CHAR));
}
