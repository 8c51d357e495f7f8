//! Configuration Module
//!
//! Client settings schema and layered loading from files and environment.

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::{ClientSettings, RateLimitSettings, DEFAULT_BASE_URL};
