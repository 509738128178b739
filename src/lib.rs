pub mod config;
pub mod error;
pub mod release;
pub mod version;
