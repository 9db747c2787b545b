use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Modifier {
    Ctrl,
    Alt,
    Shift,
    Meta,
}

/// Edit hotkey, e.g. `ctrl+shift+e`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotKey {
    /// Sorted, deduplicated.
    pub modifiers: Vec<Modifier>,
    pub key: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HotKeyError {
    #[error("hotkey descriptor is empty")]
    Empty,

    #[error("unknown modifier '{0}' (expected ctrl, alt, shift or meta)")]
    UnknownModifier(String),

    #[error("hotkey '{0}' has no key")]
    MissingKey(String),
}

impl HotKey {
    pub fn parse(descriptor: &str) -> Result<Self, HotKeyError> {
        let parts: Vec<&str> = descriptor
            .split(['+', '-'])
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        let Some((key, modifier_parts)) = parts.split_last() else {
            return Err(HotKeyError::Empty);
        };

        let mut modifiers = Vec::new();
        for part in modifier_parts {
            let modifier = match part.to_lowercase().as_str() {
                "ctrl" | "control" | "accel" => Modifier::Ctrl,
                "alt" | "option" => Modifier::Alt,
                "shift" => Modifier::Shift,
                "meta" | "cmd" | "command" | "super" => Modifier::Meta,
                other => return Err(HotKeyError::UnknownModifier(other.to_string())),
            };
            modifiers.push(modifier);
        }
        modifiers.sort();
        modifiers.dedup();

        let key = key.to_lowercase();
        if is_modifier_name(&key) {
            return Err(HotKeyError::MissingKey(descriptor.to_string()));
        }

        Ok(HotKey { modifiers, key })
    }
}

fn is_modifier_name(name: &str) -> bool {
    matches!(
        name,
        "ctrl" | "control" | "accel" | "alt" | "option" | "shift" | "meta" | "cmd" | "command" | "super"
    )
}

impl fmt::Display for HotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            let name = match modifier {
                Modifier::Ctrl => "ctrl",
                Modifier::Alt => "alt",
                Modifier::Shift => "shift",
                Modifier::Meta => "meta",
            };
            write!(f, "{}+", name)?;
        }
        f.write_str(&self.key)
    }
}
