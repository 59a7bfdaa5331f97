use std::collections::HashMap;

use serde::Deserialize;

use common::{ENV_PREFIX, config::load_config};

use crate::SolverError;

const CONFIG_FILENAME: &str = "codis";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Per-query timeout forwarded to the backend. A query that runs out of
    /// time fails with [`SolverError::Unknown`].
    pub timeout_ms: Option<u64>,
    /// Backend parameters applied once, before the first query.
    pub global_params: HashMap<String, String>,
    pub interpolation: InterpolationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InterpolationConfig {
    /// Simplify the interpolant before decoding it.
    pub simplify: bool,
    /// The tactic that eliminates the local variables of the left group.
    pub tactic: String,
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            simplify: true,
            tactic: "qe".to_owned(),
        }
    }
}

impl SolverConfig {
    /// Reads `codis.toml` (or `.json`) and `CODIS_*` environment variables,
    /// e.g. `CODIS_INTERPOLATION__TACTIC=qe2`.
    pub fn load() -> Result<Self, SolverError> {
        let config = load_config(CONFIG_FILENAME, ENV_PREFIX, Ok)?;
        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable_without_a_file() {
        let config = SolverConfig::default();
        assert_eq!(config.timeout_ms, None);
        assert!(config.global_params.is_empty());
        assert!(config.interpolation.simplify);
        assert_eq!(config.interpolation.tactic, "qe");
    }

    #[test]
    fn partial_sources_keep_the_defaults() {
        let config = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                timeout_ms = 500
                [interpolation]
                simplify = false
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize::<SolverConfig>()
            .unwrap();
        assert_eq!(config.timeout_ms, Some(500));
        assert!(!config.interpolation.simplify);
        assert_eq!(config.interpolation.tactic, "qe");
    }

    #[test]
    fn environment_overrides_the_inline_string() {
        std::env::set_var("CODIS_CONFIG_STR", "timeout_ms = 100\n[interpolation]\nsimplify = false");
        std::env::set_var("CODIS_CONFIG_STR_FMT", "toml");
        std::env::set_var("CODIS_TIMEOUT_MS", "250");
        std::env::set_var("CODIS_INTERPOLATION__TACTIC", "qe2");

        let config = SolverConfig::load().unwrap();
        assert_eq!(config.timeout_ms, Some(250));
        assert!(!config.interpolation.simplify);
        assert_eq!(config.interpolation.tactic, "qe2");
    }
}
