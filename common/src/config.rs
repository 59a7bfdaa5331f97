use std::env;

use config::{
    Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, FileStoredFormat,
    builder::DefaultState,
};

use crate::{log_debug, log_warn, utils::search_current_ancestor_dirs_for};

pub const CONFIG_STR: &str = "CONFIG_STR";
pub const CONFIG_STR_FORMAT: &str = "CONFIG_STR_FMT";

type Builder = ConfigBuilder<DefaultState>;

/// Builds a configuration from (in increasing priority) the sources added by
/// `config_builder`, an optional file named `file_name` found in the current
/// directory or one of its ancestors, an inline configuration string given
/// through the environment, and environment variables prefixed by `env_prefix`.
pub fn load_config(
    file_name: &str,
    env_prefix: &str,
    config_builder: impl FnOnce(Builder) -> Result<Builder, ConfigError>,
) -> Result<Config, ConfigError> {
    let builder = config_builder(Config::builder())?.add_source(file_source(file_name));
    let builder = match inline_source(env_prefix) {
        Some(source) => builder.add_source(source),
        None => builder,
    };
    let config = builder
        .add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;
    log_debug!("Loaded raw configuration: {config:?}");
    Ok(config)
}

fn file_source(file_name: &str) -> File<config::FileSourceFile, FileFormat> {
    let path = search_current_ancestor_dirs_for(file_name)
        .map(|path| path.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_owned());
    File::with_name(&path).required(false)
}

/// The configuration string in `<PREFIX>_CONFIG_STR`, if both it and its
/// format in `<PREFIX>_CONFIG_STR_FMT` are set.
fn inline_source(env_prefix: &str) -> Option<File<config::FileSourceString, FileFormat>> {
    let content = env::var(format!("{env_prefix}_{CONFIG_STR}")).ok()?;
    let format = env::var(format!("{env_prefix}_{CONFIG_STR_FORMAT}")).ok()?;
    match try_parse_format(&format) {
        Ok(format) => Some(File::from_str(&content, format)),
        Err(unknown) => {
            log_warn!("Ignoring the configuration string of unknown format `{unknown}`");
            None
        }
    }
}

fn try_parse_format(extension: &str) -> Result<FileFormat, &str> {
    [FileFormat::Toml, FileFormat::Json]
        .into_iter()
        .find(|format| format.file_extensions().contains(&extension))
        .ok_or(extension)
}
