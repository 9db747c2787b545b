pub mod field_key;
pub mod hasher;
