#[cfg(feature = "config")]
pub mod config;
pub mod logging;
pub mod utils;

/// The prefix shared by all environment variables the engine reads.
pub const ENV_PREFIX: &str = "CODIS";
