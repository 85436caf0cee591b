pub mod constants;
pub mod error;
pub mod models;
pub mod protocol;
pub mod types;
