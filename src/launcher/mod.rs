pub mod editor;
pub mod error;
