// Library root: re-exports all modules so integration tests and external
// consumers can access the crate's public API.

pub mod analytics;
pub mod cache;
pub mod clock;
pub mod config;
pub mod providers;
pub mod table;
pub mod validator;
