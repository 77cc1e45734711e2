//! Layered settings: defaults, `offscrub.toml`, `OFFSCRUB_*` variables,
//! then command-line flags.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use offscrub_uninstall::DEFAULT_INTERPRETER;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "offscrub.toml";
pub const ENV_PREFIX: &str = "OFFSCRUB_";
pub const BUNDLE_FILE: &str = "OffScrub.zip";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub interpreter: String,
    pub bundle: PathBuf,
    pub scratch_root: Option<PathBuf>,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interpreter: DEFAULT_INTERPRETER.to_string(),
            bundle: default_bundle(),
            scratch_root: None,
            log_level: "info".to_string(),
        }
    }
}

/// Flag values that win over every other layer when set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Settings {
    pub fn figment(config: Option<&Path>) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config.unwrap_or(Path::new(CONFIG_FILE))))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn load(config: Option<&Path>, overrides: &Overrides) -> Result<Self, figment::Error> {
        Self::figment(config)
            .merge(Serialized::defaults(overrides))
            .extract()
    }
}

/// `OffScrub.zip` beside the running executable.
fn default_bundle() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(BUNDLE_FILE)))
        .unwrap_or_else(|| PathBuf::from(BUNDLE_FILE))
}
