use std::cell::RefCell;

use crate::config::preferences::Preferences;

/// Preference keys, used in change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefKey {
    Charset,
    Editor,
    WorkingDirectory,
    RefreshSecs,
    Debug,
    Extensions,
    GumdropPosition,
    FadeTime,
    HotKey,
    RetentionDays,
}

pub type PrefListener = Box<dyn Fn(&[PrefKey], &Preferences)>;

/// Typed preference access with change notification.
pub trait ConfigPort {
    fn snapshot(&self) -> Preferences;

    /// Apply `change` and notify listeners with the keys that differ.
    /// Returns the changed keys.
    fn update(&self, change: &mut dyn FnMut(&mut Preferences)) -> Vec<PrefKey>;

    fn subscribe(&self, listener: PrefListener);
}

/// In-process `ConfigPort`.
pub struct PrefStore {
    current: RefCell<Preferences>,
    listeners: RefCell<Vec<PrefListener>>,
}

impl PrefStore {
    pub fn new(prefs: Preferences) -> Self {
        PrefStore {
            current: RefCell::new(prefs),
            listeners: RefCell::new(Vec::new()),
        }
    }
}

impl Default for PrefStore {
    fn default() -> Self {
        PrefStore::new(Preferences::default())
    }
}

impl ConfigPort for PrefStore {
    fn snapshot(&self) -> Preferences {
        self.current.borrow().clone()
    }

    fn update(&self, change: &mut dyn FnMut(&mut Preferences)) -> Vec<PrefKey> {
        let (changed, after) = {
            let mut current = self.current.borrow_mut();
            let before = current.clone();
            change(&mut *current);
            (changed_keys(&before, &*current), current.clone())
        };

        if !changed.is_empty() {
            tracing::debug!(?changed, "preferences changed");
            for listener in self.listeners.borrow().iter() {
                listener(&changed, &after);
            }
        }
        changed
    }

    fn subscribe(&self, listener: PrefListener) {
        self.listeners.borrow_mut().push(listener);
    }
}

fn changed_keys(before: &Preferences, after: &Preferences) -> Vec<PrefKey> {
    let mut keys = Vec::new();
    if before.charset != after.charset {
        keys.push(PrefKey::Charset);
    }
    if before.editor != after.editor {
        keys.push(PrefKey::Editor);
    }
    if before.working_directory != after.working_directory {
        keys.push(PrefKey::WorkingDirectory);
    }
    if before.refresh_secs != after.refresh_secs {
        keys.push(PrefKey::RefreshSecs);
    }
    if before.debug != after.debug {
        keys.push(PrefKey::Debug);
    }
    if before.extensions != after.extensions {
        keys.push(PrefKey::Extensions);
    }
    if before.gumdrop_position != after.gumdrop_position {
        keys.push(PrefKey::GumdropPosition);
    }
    if before.fade_time != after.fade_time {
        keys.push(PrefKey::FadeTime);
    }
    if before.hotkey != after.hotkey {
        keys.push(PrefKey::HotKey);
    }
    if before.retention_days != after.retention_days {
        keys.push(PrefKey::RetentionDays);
    }
    keys
}
