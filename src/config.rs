//! Service configuration.
//!
//! Layered with the `config` crate: serde defaults, then an optional TOML
//! file, then `SPECSHEET__<SECTION>__<KEY>` environment variables.

use serde::{Deserialize, Serialize};
use specsheet_core::{DefaultAssets, FieldDefaults, LayoutOptions};
use specsheet_render_core::CommandSpec;
use specsheet_resource::{BROWSER_USER_AGENT, HttpFetchOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const ENV_PREFIX: &str = "SPECSHEET";
/// Names a config file when none is passed explicitly.
pub const CONFIG_PATH_VAR: &str = "SPECSHEET_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub assets: DefaultAssets,
    pub fetch: FetchConfig,
    pub render: RenderConfig,
    pub layout: LayoutOptions,
    pub fields: FieldDefaults,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
    pub max_bytes: u64,
    /// Image fetches in flight per document. One fetches sequentially.
    pub max_concurrent: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            connect_timeout_secs: 5,
            user_agent: BROWSER_USER_AGENT.to_string(),
            max_bytes: 20 * 1024 * 1024,
            max_concurrent: num_cpus::get().clamp(1, 8),
        }
    }
}

impl FetchConfig {
    pub fn http_options(&self) -> HttpFetchOptions {
        HttpFetchOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            user_agent: self.user_agent.clone(),
            max_bytes: self.max_bytes,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderBackend {
    /// The built-in lopdf renderer.
    #[default]
    Lopdf,
    /// An external program; see [`RenderConfig::command`].
    Command,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub timeout_secs: u64,
    pub backend: RenderBackend,
    pub command: Option<CommandSpec>,
    /// Parent of the external renderer's scratch directories. System temp dir when unset.
    pub scratch_dir: Option<PathBuf>,
    /// Compress page content streams.
    pub compress: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            backend: RenderBackend::default(),
            command: None,
            scratch_dir: None,
            compress: true,
        }
    }
}

impl RenderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON catalog snapshot. Without one the service runs against an empty catalog.
    pub snapshot: Option<PathBuf>,
    /// Wrap the catalog in a read-through cache.
    pub cache: bool,
}

impl ServiceConfig {
    /// Loads from `path`, else from `$SPECSHEET_CONFIG`, else defaults, with the
    /// environment layered on top.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let from_env = std::env::var_os(CONFIG_PATH_VAR)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        let file = path.map(Path::to_path_buf).or(from_env);
        Self::load_layers(
            file.as_deref(),
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
    }

    fn load_layers(file: Option<&Path>, env: config::Environment) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(file) = file {
            builder = builder.add_source(config::File::from(file).required(true));
        }
        let mut loaded: ServiceConfig = builder.add_source(env).build()?.try_deserialize()?;

        if let Some(base) = file.and_then(Path::parent) {
            loaded.resolve_paths(base);
        }
        loaded.validate()?;
        Ok(loaded)
    }

    /// Relative paths in a config file are relative to that file.
    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        if let Some(snapshot) = self.catalog.snapshot.as_mut() {
            resolve(snapshot);
        }
        if let Some(scratch) = self.render.scratch_dir.as_mut() {
            resolve(scratch);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render.timeout_secs == 0 {
            return Err(ConfigError::Invalid("render.timeout_secs must be positive".into()));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Invalid("fetch.timeout_secs must be positive".into()));
        }
        if self.fetch.max_concurrent == 0 {
            return Err(ConfigError::Invalid("fetch.max_concurrent must be at least 1".into()));
        }
        if self.render.backend == RenderBackend::Command
            && self.render.command.as_ref().is_none_or(|c| c.program.trim().is_empty())
        {
            return Err(ConfigError::Invalid(
                "render.backend = \"command\" needs render.command.program".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .source(Some(source))
    }

    #[test]
    fn test_defaults_without_sources() {
        let config = ServiceConfig::load_layers(None, env(&[])).unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.render.timeout(), Duration::from_secs(30));
        assert_eq!(config.fetch.timeout_secs, 15);
        assert_eq!(config.layout.accessory_budget, 3);
        assert_eq!(config.assets.fallback_certifications, vec!["CE", "RoHS"]);
        assert_eq!(config.fields.cct, "2700K");
    }

    #[test]
    fn test_file_then_environment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("specsheet.toml");
        fs::write(
            &path,
            r#"
            [assets]
            brand_name = "ACME"

            [render]
            timeout_secs = 12
            backend = "command"
            command = { program = "render-pdf", args = ["{input}", "{output}"] }

            [catalog]
            snapshot = "catalog.json"
            "#,
        )
        .unwrap();

        let config = ServiceConfig::load_layers(
            Some(&path),
            env(&[("SPECSHEET__RENDER__TIMEOUT_SECS", "7")]),
        )
        .unwrap();
        assert_eq!(config.assets.brand_name, "ACME");
        assert_eq!(config.assets.website, DefaultAssets::default().website);
        assert_eq!(config.render.timeout_secs, 7);
        assert_eq!(config.render.backend, RenderBackend::Command);
        assert_eq!(config.render.command.unwrap().args, vec!["{input}", "{output}"]);
        assert_eq!(config.catalog.snapshot, Some(dir.path().join("catalog.json")));
    }

    #[test]
    fn test_command_backend_requires_program() {
        let err = ServiceConfig::load_layers(None, env(&[("SPECSHEET__RENDER__BACKEND", "command")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let mut config = ServiceConfig::default();
        config.render.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = ServiceConfig::load_layers(Some(Path::new("/nonexistent/specsheet.toml")), env(&[]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }
}
