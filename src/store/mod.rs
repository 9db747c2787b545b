pub mod error;
pub mod file_store;
pub mod naming;
