use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    pub pools: Vec<PoolSettings>,
    #[serde(default)]
    pub tools: ToolSettings,
    pub manifest: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSettings {
    pub name: String,
    pub dir_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    /// Explicit `losetup` binary; located on PATH when unset.
    #[serde(default)]
    pub losetup: Option<PathBuf>,
    /// Explicit `cp` binary; located on PATH when unset.
    #[serde(default)]
    pub cp: Option<PathBuf>,
    #[serde(default = "default_use_sudo")]
    pub use_sudo: bool,
    #[serde(default)]
    pub clone_method: CloneMethod,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CloneMethod {
    /// `cp --reflink=auto`
    #[default]
    Cp,
    /// In-process reflink with a plain copy fallback.
    Native,
}

fn default_use_sudo() -> bool {
    true
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            losetup: None,
            cp: None,
            use_sudo: default_use_sudo(),
            clone_method: CloneMethod::default(),
        }
    }
}

impl Config {
    pub fn load_from(config_path: &Path) -> crate::Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_yaml::from_str(&content)
                .map_err(|e| crate::PoolError::ConfigError(e.to_string()))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, config_path: &Path) -> crate::Result<()> {
        if let Some(config_dir) = config_path.parent() {
            std::fs::create_dir_all(config_dir)?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| crate::PoolError::ConfigError(e.to_string()))?;
        std::fs::write(config_path, content)?;

        Ok(())
    }

    pub fn pool(&self, name: &str) -> Option<&PoolSettings> {
        self.pools.iter().find(|p| p.name == name)
    }

    fn validate(&self) -> crate::Result<()> {
        for (idx, pool) in self.pools.iter().enumerate() {
            if pool.name.is_empty() {
                return Err(crate::PoolError::ConfigError(
                    "Pool name must not be empty".to_string(),
                ));
            }
            if !pool.dir_path.is_absolute() {
                return Err(crate::PoolError::ConfigError(format!(
                    "Pool {} dir_path {} is not absolute",
                    pool.name,
                    pool.dir_path.display()
                )));
            }
            if self.pools[..idx].iter().any(|p| p.name == pool.name) {
                return Err(crate::PoolError::ConfigError(format!(
                    "Pool {} configured twice",
                    pool.name
                )));
            }
        }
        Ok(())
    }

    /// `~/.blkpool/config.yaml`
    pub fn config_path() -> crate::Result<PathBuf> {
        Ok(Self::base_dir()?.join("config.yaml"))
    }

    fn base_dir() -> crate::Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| {
            crate::PoolError::ConfigError("Cannot determine home directory".to_string())
        })?;
        Ok(home.join(".blkpool"))
    }
}

impl Default for Config {
    fn default() -> Self {
        let base = Self::base_dir().unwrap_or_else(|_| PathBuf::from("/var/lib/blkpool"));
        Self {
            version: "1.0".to_string(),
            pools: vec![PoolSettings {
                name: "default".to_string(),
                dir_path: base.join("pools").join("default"),
            }],
            tools: ToolSettings::default(),
            manifest: base.join("domains.yaml"),
        }
    }
}
