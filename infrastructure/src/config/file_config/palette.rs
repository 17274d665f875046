//! `[palette]` section

use blueprint_domain::{DEFAULT_PALETTE, Palette};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePaletteConfig {
    /// Identifiers a plan may place. Duplicates are ignored.
    pub blocks: Vec<String>,
}

impl Default for FilePaletteConfig {
    fn default() -> Self {
        Self {
            blocks: DEFAULT_PALETTE.iter().map(|id| id.to_string()).collect(),
        }
    }
}

impl FilePaletteConfig {
    pub fn to_palette(&self) -> Palette {
        Palette::new(
            self.blocks
                .iter()
                .map(|id| id.trim())
                .filter(|id| !id.is_empty()),
        )
    }
}
