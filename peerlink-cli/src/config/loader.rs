use super::types::{
    DEFAULT_HOST, DEFAULT_LOG_LEVEL, DEFAULT_PORT, LoggingSection, PeerlinkConfig,
    RawLoggingConfig, RawPeerlinkConfig, RawServerConfig, ServerSection,
};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Env var overriding the project config directory
pub const PROJECT_CONFIG_DIR_ENV: &str = "PEERLINK_PROJECT_CONFIG_DIR";

/// Merged configuration plus what happened while loading it
///
/// Config is read before tracing is installed, so loading collects its
/// diagnostics here and [`LoadedConfig::log`] replays them afterwards.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: PeerlinkConfig,
    /// Files that contributed a layer, in merge order
    pub layers: Vec<PathBuf>,
    /// Ignored settings
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    pub fn log(&self) {
        for path in &self.layers {
            debug!("Loaded config layer from {}", path.display());
        }
        for warning in &self.warnings {
            warn!("{}", warning);
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (defaults, user, project, environment)
    pub fn load() -> Result<LoadedConfig> {
        let mut paths = Vec::new();
        if let Some(user_path) = Self::user_config_path() {
            paths.push(user_path);
        }
        paths.push(Self::project_config_path());
        let layers: Vec<PathBuf> = paths.into_iter().filter(|path| path.exists()).collect();

        let mut warnings = Vec::new();
        let raw = Self::load_layers(&layers)?;
        let raw = Self::apply_env(raw, |key| std::env::var(key).ok(), &mut warnings);

        Ok(LoadedConfig {
            config: Self::finalize(raw),
            layers,
            warnings,
        })
    }

    /// Merge the config files at `paths` in order; missing files are skipped
    pub fn load_layers(paths: &[PathBuf]) -> Result<RawPeerlinkConfig> {
        let mut raw = RawPeerlinkConfig::default();
        for path in paths {
            if let Some(layer) = Self::read_raw(path)? {
                raw = Self::merge_raw(raw, layer);
            }
        }
        Ok(raw)
    }

    fn read_raw(path: &Path) -> Result<Option<RawPeerlinkConfig>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let layer = toml::from_str(&contents)
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        Ok(Some(layer))
    }

    /// Get user config path (platform-specific)
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "peerlink").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get project config path
    /// Can be overridden with PEERLINK_PROJECT_CONFIG_DIR env var
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var(PROJECT_CONFIG_DIR_ENV) {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".peerlink/config.toml")
        }
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawPeerlinkConfig, overlay: RawPeerlinkConfig) -> RawPeerlinkConfig {
        RawPeerlinkConfig {
            server: RawServerConfig {
                host: overlay.server.host.or(base.server.host),
                port: overlay.server.port.or(base.server.port),
                cors_origins: overlay.server.cors_origins.or(base.server.cors_origins),
            },
            logging: RawLoggingConfig {
                level: overlay.logging.level.or(base.logging.level),
            },
        }
    }

    /// Apply `PORT` and `CORS_ORIGINS` on top of the file layers
    ///
    /// Unparseable values are ignored and reported in `warnings`.
    fn apply_env<F>(
        mut raw: RawPeerlinkConfig,
        lookup: F,
        warnings: &mut Vec<String>,
    ) -> RawPeerlinkConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            match port.trim().parse::<u16>() {
                Ok(port) => raw.server.port = Some(port),
                Err(_) => warnings.push(format!("Ignoring invalid PORT value: {:?}", port)),
            }
        }

        if let Some(origins) = lookup("CORS_ORIGINS") {
            let origins: Vec<String> = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
            if !origins.is_empty() {
                raw.server.cors_origins = Some(origins);
            }
        }

        raw
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawPeerlinkConfig) -> PeerlinkConfig {
        PeerlinkConfig {
            server: ServerSection {
                host: raw.server.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: raw.server.port.unwrap_or(DEFAULT_PORT),
                cors_origins: raw
                    .server
                    .cors_origins
                    .unwrap_or_else(|| vec!["*".to_string()]),
            },
            logging: LoggingSection {
                level: raw
                    .logging
                    .level
                    .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            },
        }
    }
}
