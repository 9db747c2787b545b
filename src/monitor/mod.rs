pub mod lock;
pub mod monitor;
