use std::{fs, path::PathBuf};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use url::Url;

const DEFAULT_SERVER: &str = "http://127.0.0.1:8480/";

/// Connection settings for the `cwo` tool, stored as TOML under the user's config
/// directory. The `CWO_SERVER_URL` environment variable overrides the stored value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub server: Url,
}

impl Profile {
    pub fn load() -> Result<Self> {
        if let Ok(url) = std::env::var("CWO_SERVER_URL") {
            let server = Url::parse(&url).map_err(|e| anyhow!("Invalid CWO_SERVER_URL: {e}"))?;
            return Ok(Self { server });
        }
        let path = Self::path()?;
        if path.exists() {
            let raw = fs::read_to_string(&path)?;
            let profile = toml::from_str(&raw).map_err(|e| anyhow!("Could not parse {}: {e}", path.display()))?;
            return Ok(profile);
        }
        let profile = Self { server: Url::parse(DEFAULT_SERVER).expect("default URL is valid") };
        profile.save().ok();
        Ok(profile)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    fn path() -> Result<PathBuf> {
        let dir = dirs::config_dir().ok_or_else(|| anyhow!("Could not determine the config directory"))?;
        Ok(dir.join("cwo").join("profile.toml"))
    }
}
