use std::path::PathBuf;

use clap::Parser;
use itsalltext::cli::commands::{cmd_cleanup, cmd_locate, cmd_save_extension, load_page};
use itsalltext::cli::config::{Cli, Commands, log_filter, resolve_preferences};
use itsalltext::config::preferences::{Preferences, load_preferences};
use tempfile::TempDir;

use crate::common::utils::{DAY, age_file, external_write};

mod common;

fn prefs_in(dir: &TempDir) -> Preferences {
    Preferences {
        working_directory: Some(dir.path().join("work")),
        ..Preferences::default()
    }
}

// ============================================================================
// CLI Argument Parsing Tests
// ============================================================================

#[test]
fn cli_parse_edit_minimal() {
    let cli = Cli::parse_from(["itsalltext", "edit", "--page", "page.yaml", "--field", "comment"]);
    match cli.command {
        Commands::Edit {
            page,
            field,
            extension,
            watch_secs,
            save_extension,
        } => {
            assert_eq!(page, PathBuf::from("page.yaml"));
            assert_eq!(field, "comment");
            assert_eq!(extension, None);
            assert_eq!(watch_secs, 30);
            assert!(!save_extension);
        }
        _ => panic!("Expected Edit command"),
    }
    assert_eq!(cli.verbose, 0);
}

#[test]
fn cli_parse_global_flags_after_subcommand() {
    let cli = Cli::parse_from([
        "itsalltext",
        "locate",
        "--url",
        "http://example.com/post",
        "--field",
        "c",
        "--extension",
        ".md",
        "--editor",
        "/usr/bin/vim",
        "-vv",
    ]);
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.editor, Some(PathBuf::from("/usr/bin/vim")));
    match cli.command {
        Commands::Locate { url, field, extension } => {
            assert_eq!(url, "http://example.com/post");
            assert_eq!(field, "c");
            assert_eq!(extension.as_deref(), Some(".md"));
        }
        _ => panic!("Expected Locate command"),
    }
}

#[test]
fn cli_parse_edit_save_extension() {
    let cli = Cli::parse_from([
        "itsalltext",
        "edit",
        "--page",
        "page.yaml",
        "--field",
        "comment",
        "--extension",
        ".rst",
        "--save-extension",
    ]);
    assert!(matches!(
        cli.command,
        Commands::Edit { save_extension: true, ref extension, .. } if extension.as_deref() == Some(".rst")
    ));

    let without_extension = Cli::try_parse_from([
        "itsalltext",
        "edit",
        "--page",
        "page.yaml",
        "--field",
        "comment",
        "--save-extension",
    ]);
    assert!(without_extension.is_err(), "--save-extension needs --extension");
}

#[test]
fn cli_parse_cleanup_force() {
    let cli = Cli::parse_from(["itsalltext", "cleanup", "--force"]);
    assert!(matches!(cli.command, Commands::Cleanup { force: true }));
}

#[test]
fn cli_rejects_missing_subcommand() {
    assert!(Cli::try_parse_from(["itsalltext"]).is_err());
}

// ============================================================================
// Preference Resolution Tests
// ============================================================================

#[test]
fn cli_flags_override_config_file() {
    let cli = Cli::parse_from([
        "itsalltext",
        "cleanup",
        "--editor",
        "/usr/bin/emacs",
        "--working-directory",
        "/tmp/fields",
    ]);
    let file_prefs = Preferences {
        editor: Some(PathBuf::from("/usr/bin/vim")),
        ..Preferences::default()
    };

    let prefs = resolve_preferences(&cli, file_prefs);
    assert_eq!(prefs.editor, Some(PathBuf::from("/usr/bin/emacs")));
    assert_eq!(prefs.working_directory, Some(PathBuf::from("/tmp/fields")));
    assert!(!prefs.debug);
}

#[test]
fn config_file_values_survive_without_flags() {
    let cli = Cli::parse_from(["itsalltext", "cleanup"]);
    let file_prefs = Preferences {
        editor: Some(PathBuf::from("/usr/bin/vim")),
        refresh_secs: 9,
        ..Preferences::default()
    };

    let prefs = resolve_preferences(&cli, file_prefs.clone());
    assert_eq!(prefs, file_prefs);
}

#[test]
fn log_filter_levels() {
    assert_eq!(log_filter(0, false), "info");
    assert_eq!(log_filter(0, true), "debug");
    assert_eq!(log_filter(1, false), "debug");
    assert_eq!(log_filter(2, false), "trace");
    assert_eq!(log_filter(3, true), "trace");
}

// ============================================================================
// Command Tests
// ============================================================================

#[test]
fn locate_is_stable_and_honors_extension() {
    let dir = TempDir::new().unwrap();
    let first = cmd_locate(prefs_in(&dir), "http://example.com/post?x=1", "comment", None).unwrap();
    let again = cmd_locate(prefs_in(&dir), "http://example.com/post?x=2", "comment", None).unwrap();
    let md = cmd_locate(prefs_in(&dir), "http://example.com/post?x=1", "comment", Some("md")).unwrap();

    assert_eq!(first, again);
    assert!(first.starts_with(dir.path().join("work")));
    let name = first.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("example.com_post."), "got {}", name);
    assert!(name.ends_with(".txt"));
    assert_eq!(md.with_extension("txt"), first);
}

#[test]
fn locate_rejects_bad_url() {
    let dir = TempDir::new().unwrap();
    assert!(cmd_locate(prefs_in(&dir), "not a url", "c", None).is_err());
}

#[test]
fn cleanup_command_respects_force() {
    let dir = TempDir::new().unwrap();
    let work = dir.path().join("work");
    std::fs::create_dir_all(&work).unwrap();
    let stale = work.join("stale.txt");
    let fresh = work.join("fresh.txt");
    external_write(&stale, "old");
    external_write(&fresh, "new");
    age_file(&stale, 30 * DAY);

    let report = cmd_cleanup(prefs_in(&dir), false).unwrap();
    assert_eq!(report.removed, vec![stale]);
    assert!(fresh.exists());

    let report = cmd_cleanup(prefs_in(&dir), true).unwrap();
    assert_eq!(report.removed, vec![fresh]);
}

#[test]
fn save_extension_updates_config_file_once() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("itsalltext.yaml");
    external_write(&path, "editor: /usr/bin/vim\nextensions: .txt\n");

    assert!(cmd_save_extension(Some(&path), "rst").unwrap());
    assert!(!cmd_save_extension(Some(&path), ".rst").unwrap(), "already listed");

    let prefs = load_preferences(&path).unwrap();
    assert_eq!(prefs.extension_list(), vec![".txt", ".rst"]);
    assert_eq!(prefs.editor, Some(PathBuf::from("/usr/bin/vim")));
}

#[test]
fn save_extension_creates_missing_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fresh.yaml");

    assert!(cmd_save_extension(Some(&path), ".org").unwrap());
    let prefs = load_preferences(&path).unwrap();
    assert_eq!(prefs.extension_list().last().map(String::as_str), Some(".org"));
}

#[test]
fn load_page_reads_yaml_description() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("page.yaml");
    external_write(
        &path,
        "url: http://example.com/post\n\
         fields:\n\
         \x20 - id: comment\n\
         \x20   value: hello\n\
         \x20 - name: style\n\
         \x20   extension: .css\n\
         \x20   readonly: true\n\
         frames:\n\
         \x20 - url: http://example.com/frame\n\
         \x20   fields:\n\
         \x20     - id: inner\n",
    );

    let page = load_page(&path).unwrap();
    assert_eq!(page.url, "http://example.com/post");
    assert_eq!(page.fields.len(), 2);
    assert_eq!(page.fields[0].value, "hello");
    assert_eq!(page.fields[1].id, None);
    assert_eq!(page.fields[1].name.as_deref(), Some("style"));
    assert_eq!(page.fields[1].extension.as_deref(), Some(".css"));
    assert!(page.fields[1].readonly);
    assert_eq!(page.frames[0].fields[0].id.as_deref(), Some("inner"));
}

#[cfg(target_os = "linux")]
#[test]
fn edit_command_returns_field_values() {
    use itsalltext::cli::commands::cmd_edit;
    use std::time::Duration;

    let dir = TempDir::new().unwrap();
    let page = dir.path().join("page.yaml");
    external_write(
        &page,
        "url: http://example.com/post\nfields:\n  - id: comment\n    value: hello\n",
    );
    let prefs = Preferences {
        editor: Some(PathBuf::from("/usr/bin/true")),
        ..prefs_in(&dir)
    };

    let values = cmd_edit(prefs, &page, "comment", None, Duration::from_secs(5)).unwrap();
    assert_eq!(values.get("comment").map(String::as_str), Some("hello"));
}

#[test]
fn edit_command_reports_unknown_field() {
    use itsalltext::cli::commands::cmd_edit;
    use std::time::Duration;

    let dir = TempDir::new().unwrap();
    let page = dir.path().join("page.yaml");
    external_write(&page, "url: http://example.com/post\nfields: []\n");
    let work = dir.path().join("work");
    std::fs::create_dir_all(&work).unwrap();
    let stale = work.join("stale.txt");
    external_write(&stale, "old");
    age_file(&stale, 30 * DAY);

    let err = cmd_edit(prefs_in(&dir), &page, "missing", None, Duration::ZERO).unwrap_err();
    assert!(err.to_string().contains("missing"));
    assert!(!stale.exists(), "startup cleanup runs before the edit");
}
