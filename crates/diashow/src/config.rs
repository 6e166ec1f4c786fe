use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::head::{RoomId, ViewerId};
use crate::store::{StoreLocation, ViewerMeta};

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "diashow";
const DEFAULT_ROOM: &str = "default";

pub const KEYS: &[&str] = &[
    "viewer.name",
    "viewer.anonymous",
    "store.dir",
    "defaults.room",
    "defaults.theme",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewer: Option<ViewerConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Shown in audience listings and used as the viewer id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub anonymous: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `diashow config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        serde_yaml::from_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# diashow configuration\n{yaml}");
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "viewer.name" => {
                self.viewer.get_or_insert_with(ViewerConfig::default).name =
                    (!value.is_empty()).then(|| value.to_string());
            }
            "viewer.anonymous" => {
                let anonymous = match value {
                    "true" | "yes" | "on" => true,
                    "false" | "no" | "off" => false,
                    _ => anyhow::bail!("Invalid value for viewer.anonymous: {value}. Must be 'true' or 'false'."),
                };
                self.viewer.get_or_insert_with(ViewerConfig::default).anonymous = anonymous;
            }
            "store.dir" => {
                self.store.get_or_insert_with(StoreConfig::default).dir =
                    (!value.is_empty()).then(|| PathBuf::from(value));
            }
            "defaults.room" => {
                if value.trim().is_empty() {
                    anyhow::bail!("Room name cannot be empty.");
                }
                self.defaults.get_or_insert_with(DefaultsConfig::default).room =
                    Some(value.to_string());
            }
            "defaults.theme" => {
                match value {
                    "light" | "dark" => {}
                    _ => anyhow::bail!("Invalid theme: {value}. Must be 'light' or 'dark'."),
                }
                self.defaults.get_or_insert_with(DefaultsConfig::default).theme =
                    Some(value.to_string());
            }
            _ => anyhow::bail!("Unknown config key: {key}. Valid keys: {}", KEYS.join(", ")),
        }
        Ok(())
    }

    pub fn is_anonymous(&self) -> bool {
        self.viewer.as_ref().is_some_and(|v| v.anonymous)
    }

    fn viewer_name(&self) -> Option<&str> {
        self.viewer
            .as_ref()
            .and_then(|v| v.name.as_deref())
            .filter(|name| !name.is_empty())
    }

    /// The configured name, or an anonymous per-process id (`A_<pid>`).
    pub fn viewer_id(&self) -> ViewerId {
        match self.viewer_name() {
            Some(name) if !self.is_anonymous() => ViewerId::new(name),
            _ => ViewerId::new(format!("A_{}", std::process::id())),
        }
    }

    pub fn viewer_meta(&self) -> ViewerMeta {
        let anonymous = self.is_anonymous() || self.viewer_name().is_none();
        ViewerMeta {
            display_name: (!anonymous)
                .then(|| self.viewer_name().map(str::to_string))
                .flatten(),
            anonymous,
        }
    }

    /// Command line first, then config, then `default`.
    pub fn room(&self, flag: Option<&str>) -> RoomId {
        flag.map(str::to_string)
            .or_else(|| self.defaults.as_ref().and_then(|d| d.room.clone()))
            .map_or_else(|| RoomId::new(DEFAULT_ROOM), RoomId::new)
    }

    pub fn theme(&self) -> Option<&str> {
        self.defaults.as_ref().and_then(|d| d.theme.as_deref())
    }

    /// `--offline` wins, then `--store-dir`, then `store.dir`, then the
    /// platform data directory.
    pub fn store_location(&self, flag: Option<&Path>, offline: bool) -> Result<StoreLocation> {
        if offline {
            return Ok(StoreLocation::Memory);
        }
        let dir = match flag {
            Some(dir) => dir.to_path_buf(),
            None => match self.store.as_ref().and_then(|s| s.dir.clone()) {
                Some(dir) => dir,
                None => StoreLocation::default_directory()?,
            },
        };
        Ok(StoreLocation::Directory(dir))
    }
}
