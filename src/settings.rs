use ome_ngff::ValidationSettings;
use serde::{Deserialize, Serialize};

fn enabled() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ReaderSettings {
    #[serde(default)]
    pub validation: ValidationSettings,

    /// Validate the wells of a plate and the nodes of a hierarchy on the rayon thread pool.
    #[serde(default = "enabled")]
    pub parallel: bool,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            validation: ValidationSettings::default(),
            parallel: true,
        }
    }
}

impl ReaderSettings {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
