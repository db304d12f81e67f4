use serde::{Deserialize, Serialize};

/// Per-volume configuration as supplied by the owning domain.
///
/// `volume_type` and `size` are kept loose here; the pool validates them
/// when the volume is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeConfig {
    #[serde(default)]
    pub name: String,
    pub pool: String,
    #[serde(default)]
    pub volume_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub vid: Option<String>,
}

impl VolumeConfig {
    pub fn new(name: impl Into<String>, pool: impl Into<String>, volume_type: &str) -> Self {
        Self {
            name: name.into(),
            pool: pool.into(),
            volume_type: Some(volume_type.to_string()),
            size: None,
            vid: None,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_vid(mut self, vid: impl Into<String>) -> Self {
        self.vid = Some(vid.into());
        self
    }
}

/// How a domain places its images inside a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DomainClass {
    Template,
    Disposable,
    Regular,
}

impl std::fmt::Display for DomainClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainClass::Template => write!(f, "template"),
            DomainClass::Disposable => write!(f, "disposable"),
            DomainClass::Regular => write!(f, "regular"),
        }
    }
}

/// Fixed layout names shared by every file pool.
pub mod layout {
    pub const APPVMS_DIR: &str = "appvms";
    pub const TEMPLATES_DIR: &str = "vm-templates";
    pub const IMAGE_SUFFIX: &str = ".img";
    pub const COW_SUFFIX: &str = "-cow.img";
    pub const VOLATILE_IMAGE: &str = "volatile.img";
    pub const OLD_SUFFIX: &str = ".old";
    pub const DISPOSABLE_SUFFIX: &str = "-dvm";
}
