mod settings;

use config::{Config, ConfigError, Environment, File};

use settings::PartialSettings;

pub use settings::{BrokerSettings, ServerSettings, Settings};

/// Prefix of the environment variables read by `load_config`, e.g.
/// `TOPICD_SERVER__PORT` or `TOPICD_BROKER__SECRET`.
pub const ENV_PREFIX: &str = "TOPICD";

/// Loads the configuration from `config/default` and environment variables,
/// filling anything left unspecified from `Settings::default()`.
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from("config/default")
}

/// Like `load_config`, reading the optional file at `path` (extension optional).
pub fn load_config_from(path: &str) -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(partial.merge(Settings::default()))
}
