pub mod hotkey;
pub mod preferences;
pub mod store;
