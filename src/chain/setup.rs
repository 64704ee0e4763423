//! Chain setups stored as TOML files.
//!
//! ```toml
//! [settings]
//! solver_mode = "iterate-from-start"
//! start_time = 0.0
//!
//! [attributes]
//! stiffness = { value = 0.8 }
//!
//! [[attributes.joints]]
//! index = 0
//!
//! [[attributes.joints]]
//! index = 1
//! rotation_order = "zxy"
//! limit = { enabled = true, positive = [0.5, 0.5, 0.5], negative = [-0.5, -0.5, -0.5] }
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::config::ChainSettings;
use super::evaluate::DynamicChain;
use super::params::ChainAttributes;
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChainSetup {
    #[serde(default)]
    pub settings: ChainSettings,
    #[serde(default)]
    pub attributes: ChainAttributes,
}

impl ChainSetup {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let setup: Self = toml::from_str(text)?;
        setup.validate()?;
        Ok(setup)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        log::info!("loading chain setup from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.settings.validate()?;

        let mut seen = BTreeSet::new();
        for joint in &self.attributes.joints {
            if !seen.insert(joint.index) {
                return Err(ConfigError::DuplicateJoint(joint.index));
            }
        }
        Ok(())
    }

    pub fn into_chain(self) -> DynamicChain {
        DynamicChain::new(self.settings, self.attributes)
    }
}
