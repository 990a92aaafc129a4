use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
#[cfg(feature = "clap")]
pub mod cli;
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{CoverConfig, DatabaseConfig, ServerConfig, Settings};

/// The configuration file looked up in the working directory by default.
pub const DEFAULT_CONFIG_FILE: &str = "bookshelf.toml";
/// Prefix of environment variables that override the file, e.g.
/// `BOOKSHELF__SERVER__PORT=8080`.
pub const ENV_PREFIX: &str = "BOOKSHELF";

/// Loads the application configuration.
///
/// Sources, in increasing precedence: built-in defaults, the TOML file at
/// `path` (or `bookshelf.toml`), then `BOOKSHELF__*` environment variables.
/// The file is optional unless a path was given explicitly.
pub fn load_config(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };
    let settings = build(file, environment())?;
    tracing::debug!(?settings, "Configuration loaded.");
    Ok(settings)
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

fn build<S>(file: S, env: config::Environment) -> Result<Settings, ConfigError>
where
    S: config::Source + Send + Sync + 'static,
{
    let builder = config::Config::builder()
        .add_source(file)
        .add_source(env)
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat, Map};

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let source: Map<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        environment().source(Some(source))
    }

    #[test]
    fn empty_sources_yield_defaults() {
        let settings = build(File::from_str("", FileFormat::Toml), env(&[])).unwrap();
        assert_eq!(settings.server.address(), "127.0.0.1:5000");
        assert_eq!(settings.database.path, Path::new("data/library.sqlite"));
        assert!(settings.covers.enabled);
        assert_eq!(settings.covers.concurrency, 8);
    }

    #[test]
    fn file_overrides_defaults_per_key() {
        let toml = r#"
            [server]
            port = 8080

            [covers]
            enabled = false
        "#;
        let settings = build(File::from_str(toml, FileFormat::Toml), env(&[])).unwrap();
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 8080);
        assert!(!settings.covers.enabled);
        assert_eq!(settings.covers.timeout_ms, 3000);
    }

    #[test]
    fn environment_overrides_file() {
        let toml = "[database]\npath = \"from-file.sqlite\"\n";
        let settings = build(
            File::from_str(toml, FileFormat::Toml),
            env(&[
                ("BOOKSHELF__DATABASE__PATH", "from-env.sqlite"),
                ("BOOKSHELF__COVERS__TIMEOUT_MS", "250"),
            ]),
        )
        .unwrap();
        assert_eq!(settings.database.path, Path::new("from-env.sqlite"));
        assert_eq!(settings.covers.timeout().as_millis(), 250);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let toml = "[covers]\nconcurrency = 0\n";
        let err = build(File::from_str(toml, FileFormat::Toml), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)), "got {err:?}");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = load_config(Some(Path::new("does/not/exist.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::LoadError(_)), "got {err:?}");
    }
}
