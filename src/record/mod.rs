pub mod charset;
pub mod error;
pub mod field_record;
