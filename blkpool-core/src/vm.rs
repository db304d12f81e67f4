use crate::error::*;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// The entity that owns volumes: a template, a disposable or a regular VM.
///
/// Pools only ever look things up through this trait; they never hold on to
/// the owner or its template.
pub trait VolumeOwner {
    fn name(&self) -> &str;
    fn class(&self) -> DomainClass;
    fn template(&self) -> Option<&dyn VolumeOwner>;
    fn volume_config(&self, name: &str) -> Option<&VolumeConfig>;

    fn is_template(&self) -> bool {
        self.class() == DomainClass::Template
    }

    fn is_disposable(&self) -> bool {
        self.class() == DomainClass::Disposable
    }
}

#[derive(Debug, Clone)]
pub struct Vm {
    name: String,
    class: DomainClass,
    template: Option<Arc<Vm>>,
    volumes: BTreeMap<String, VolumeConfig>,
}

impl Vm {
    pub fn new(name: impl Into<String>, class: DomainClass) -> Self {
        Self {
            name: name.into(),
            class,
            template: None,
            volumes: BTreeMap::new(),
        }
    }

    pub fn with_template(mut self, template: Arc<Vm>) -> Self {
        self.template = Some(template);
        self
    }

    pub fn with_volume(mut self, config: VolumeConfig) -> Self {
        self.volumes.insert(config.name.clone(), config);
        self
    }

    pub fn volumes(&self) -> impl Iterator<Item = &VolumeConfig> {
        self.volumes.values()
    }
}

impl VolumeOwner for Vm {
    fn name(&self) -> &str {
        &self.name
    }

    fn class(&self) -> DomainClass {
        self.class
    }

    fn template(&self) -> Option<&dyn VolumeOwner> {
        self.template.as_deref().map(|t| t as &dyn VolumeOwner)
    }

    fn volume_config(&self, name: &str) -> Option<&VolumeConfig> {
        self.volumes.get(name)
    }
}

/// One domain as written in the manifest file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEntry {
    pub name: String,
    pub class: DomainClass,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub volumes: BTreeMap<String, VolumeConfig>,
}

/// YAML list of domains and their volume configuration.
#[derive(Debug, Clone, Default)]
pub struct DomainManifest {
    domains: BTreeMap<String, DomainEntry>,
}

impl DomainManifest {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PoolError::ConfigError(format!(
                "Domain manifest {} not found",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let manifest = Self::from_yaml(&content)?;
        debug!(
            "Loaded {} domains from {}",
            manifest.domains.len(),
            path.display()
        );
        Ok(manifest)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let entries: Vec<DomainEntry> =
            serde_yaml::from_str(content).map_err(|e| PoolError::ConfigError(e.to_string()))?;
        Self::from_entries(entries)
    }

    pub fn from_entries(entries: Vec<DomainEntry>) -> Result<Self> {
        let mut domains = BTreeMap::new();
        for mut entry in entries {
            // The map key is the volume name; fill it in when omitted.
            for (key, config) in entry.volumes.iter_mut() {
                if config.name.is_empty() {
                    config.name = key.clone();
                }
            }

            if domains.contains_key(&entry.name) {
                return Err(PoolError::ConfigError(format!(
                    "Domain {} defined twice",
                    entry.name
                )));
            }
            domains.insert(entry.name.clone(), entry);
        }
        Ok(Self { domains })
    }

    /// Write the manifest back as a YAML list of domains.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)?;
        }

        let entries: Vec<&DomainEntry> = self.domains.values().collect();
        let content =
            serde_yaml::to_string(&entries).map_err(|e| PoolError::ConfigError(e.to_string()))?;
        std::fs::write(path, content)?;
        debug!("Saved {} domains to {}", entries.len(), path.display());
        Ok(())
    }

    /// Record a new size for a volume configured directly on `domain`.
    pub fn set_volume_size(&mut self, domain: &str, volume: &str, size: u64) -> Result<()> {
        let entry = self
            .domains
            .get_mut(domain)
            .ok_or_else(|| PoolError::ConfigError(format!("Domain {domain} not found")))?;
        let config = entry.volumes.get_mut(volume).ok_or_else(|| {
            PoolError::ConfigError(format!("Domain {domain} has no volume {volume}"))
        })?;
        config.size = Some(size);
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.domains.keys().map(String::as_str)
    }

    /// Builds the named domain together with its template chain.
    pub fn resolve(&self, name: &str) -> Result<Vm> {
        let mut chain = Vec::new();
        self.resolve_inner(name, &mut chain)
    }

    fn resolve_inner(&self, name: &str, chain: &mut Vec<String>) -> Result<Vm> {
        if chain.iter().any(|seen| seen == name) {
            return Err(PoolError::ConfigError(format!(
                "Template cycle through domain {name}"
            )));
        }
        chain.push(name.to_string());

        let entry = self
            .domains
            .get(name)
            .ok_or_else(|| PoolError::ConfigError(format!("Domain {name} not found")))?;

        let mut vm = Vm::new(entry.name.clone(), entry.class);
        if let Some(template) = &entry.template {
            let template = self.resolve_inner(template, chain)?;
            vm = vm.with_template(Arc::new(template));
        }
        for config in entry.volumes.values() {
            vm = vm.with_volume(config.clone());
        }
        Ok(vm)
    }
}
