use crate::domain::{
    config::{EndpointConfig, SockLinkConfig},
    error::{SockLinkError, SockLinkResult},
};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration manager
///
/// Merges the global configuration from the user's home directory with a
/// project configuration discovered by walking up from the current
/// directory.
pub struct ConfigManager {
    global_config_path: PathBuf,
    project_config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Create new configuration manager
    pub fn new() -> SockLinkResult<Self> {
        let global_config_path = Self::get_global_config_path()?;
        let project_config_path = Self::find_project_config_path();

        Ok(Self {
            global_config_path,
            project_config_path,
        })
    }

    /// Load configuration from files
    pub fn load_config(&self) -> SockLinkResult<SockLinkConfig> {
        let mut config = SockLinkConfig::default();

        if self.global_config_path.exists() {
            let global_config = self.load_config_from_path(&self.global_config_path)?;
            config.global = global_config.global;
            config.endpoints = global_config.endpoints;
        }

        // Project endpoints extend the global set
        if let Some(project_path) = &self.project_config_path {
            if project_path.exists() {
                let project_config = self.load_config_from_path(project_path)?;
                config.endpoints.extend(project_config.endpoints);
            }
        }

        Ok(config)
    }

    /// Save the global configuration
    pub fn save_config(&self, config: &SockLinkConfig) -> SockLinkResult<()> {
        if let Some(parent) = self.global_config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| SockLinkError::Config {
                message: format!("Failed to create config directory: {}", e),
            })?;
        }

        self.save_config_to_path(&self.global_config_path, config)
    }

    /// Get global configuration path
    fn get_global_config_path() -> SockLinkResult<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| SockLinkError::Config {
            message: "Could not determine home directory".to_string(),
        })?;

        Ok(home.join(".config").join("socklink").join("config.toml"))
    }

    /// Find project configuration path by walking up the directory tree
    fn find_project_config_path() -> Option<PathBuf> {
        let current_dir = std::env::current_dir().ok()?;
        let mut path = current_dir.as_path();

        loop {
            let config_path = path.join(".socklink").join("config.toml");
            if config_path.exists() {
                return Some(config_path);
            }

            path = path.parent()?;
        }
    }

    /// Load configuration from a specific path
    pub fn load_config_from_path(&self, path: &Path) -> SockLinkResult<SockLinkConfig> {
        let content = fs::read_to_string(path).map_err(|e| SockLinkError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        toml::from_str(&content).map_err(|e| SockLinkError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })
    }

    /// Save configuration to a specific path
    pub fn save_config_to_path(&self, path: &Path, config: &SockLinkConfig) -> SockLinkResult<()> {
        let content = toml::to_string_pretty(config).map_err(|e| SockLinkError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(path, content).map_err(|e| SockLinkError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })
    }

    /// Create a default project configuration
    pub fn init_project_config(&self, path: &Path) -> SockLinkResult<()> {
        let config_dir = path.join(".socklink");
        let config_file = config_dir.join("config.toml");

        if config_file.exists() {
            return Err(SockLinkError::Config {
                message: "Project configuration already exists".to_string(),
            });
        }

        fs::create_dir_all(&config_dir).map_err(|e| SockLinkError::Config {
            message: format!("Failed to create .socklink directory: {}", e),
        })?;

        let default_config = SockLinkConfig {
            global: crate::domain::config::GlobalConfig::default(),
            endpoints: vec![EndpointConfig {
                name: "local".to_string(),
                url: "ws://127.0.0.1:8080/ws".to_string(),
                token: "demo".to_string(),
                description: "Local development server".to_string(),
            }],
        };

        self.save_config_to_path(&config_file, &default_config)?;

        Ok(())
    }

    /// Get the current project config path (if any)
    pub fn get_project_config_path(&self) -> Option<&PathBuf> {
        self.project_config_path.as_ref()
    }

    /// Get the global config path
    pub fn get_global_config_path_ref(&self) -> &PathBuf {
        &self.global_config_path
    }
}
