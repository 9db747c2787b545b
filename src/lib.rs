pub mod cli;
pub mod config;
pub mod dom;
pub mod identity;
pub mod launcher;
pub mod monitor;
pub mod ports;
pub mod record;
pub mod session;
pub mod store;
pub mod tracker;

/// Hidden marker attribute holding a field record's uid.
pub const UID_ATTRIBUTE: &str = "itsalltext-uid";

/// Field-level declared default extension, e.g. `.css`.
pub const EXTENSION_ATTRIBUTE: &str = "itsalltext-extension";

/// Synthetic node id stored on fields that have no `id` attribute.
pub const GENERATED_ID_ATTRIBUTE: &str = "itsalltext-generated-id";
