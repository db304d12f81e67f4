use crate::StoragePool;
use crate::pool::FilePool;
use blkpool_core::{Config, PoolError, Result};
use std::collections::BTreeMap;
use tracing::debug;

/// Finds pools by name. Lookup only; the caller keeps ownership.
pub trait PoolLookup {
    fn pool(&self, name: &str) -> Option<&dyn StoragePool>;
}

#[derive(Default)]
pub struct PoolRegistry {
    pools: BTreeMap<String, Box<dyn StoragePool>>,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open every pool listed in `config`, creating their directories.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut registry = Self::new();
        for settings in &config.pools {
            let pool = FilePool::from_settings(settings, &config.tools)?;
            registry.register(Box::new(pool))?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, pool: Box<dyn StoragePool>) -> Result<()> {
        let name = pool.name().to_string();
        if self.pools.contains_key(&name) {
            return Err(PoolError::ConfigError(format!(
                "Pool {name} registered twice"
            )));
        }
        debug!("Registered pool {} at {}", name, pool.dir_path().display());
        self.pools.insert(name, pool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&dyn StoragePool> {
        self.pool(name)
            .ok_or_else(|| PoolError::ConfigurationInvalid(format!("Unknown pool {name}")))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.pools.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn StoragePool> {
        self.pools.values().map(|p| p.as_ref())
    }
}

impl PoolLookup for PoolRegistry {
    fn pool(&self, name: &str) -> Option<&dyn StoragePool> {
        self.pools.get(name).map(|p| p.as_ref())
    }
}
