//! Ability id → display label resolution.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Label used whenever an ability cannot be resolved.
pub const UNKNOWN_SPELL: &str = "Unknown";

/// Label of ability id 0 (melee swings).
pub const AUTO_ATTACK: &str = "Auto Attack";

/// Maps ability ids to labels. Never fails; unknown ids get [`UNKNOWN_SPELL`].
pub trait SpellResolver: Send + Sync {
    fn label_for(&self, ability_id: u32) -> String;
}

/// Metadata of the instance being viewed. Spell names depend on the
/// expansion the server runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceMeta {
    pub server_id: u32,
    pub expansion_id: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellEntry {
    pub id: u32,
    pub expansion: u8,
    pub name: String,
}

/// On-disk spell list.
///
/// ```toml
/// [[spell]]
/// id = 133
/// expansion = 1
/// name = "Fireball"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpellFile {
    #[serde(rename = "spell", default)]
    pub spells: Vec<SpellEntry>,
}

/// In-memory spell table keyed by `(expansion, ability id)`.
#[derive(Debug, Default)]
pub struct SpellBook {
    meta: RwLock<Option<InstanceMeta>>,
    spells: HashMap<(u8, u32), String>,
}

impl SpellBook {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = SpellEntry>) -> Self {
        let spells = entries
            .into_iter()
            .map(|e| ((e.expansion, e.id), e.name))
            .collect();
        Self {
            meta: RwLock::new(None),
            spells,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file: SpellFile = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::debug!(count = file.spells.len(), path = ?path, "Loaded spell file");
        Ok(Self::from_entries(file.spells))
    }

    /// Replace the instance metadata; `None` until the instance is known.
    pub fn set_meta(&self, meta: Option<InstanceMeta>) {
        *self.meta.write().unwrap_or_else(PoisonError::into_inner) = meta;
    }

    pub fn meta(&self) -> Option<InstanceMeta> {
        *self.meta.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.spells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }
}

impl SpellResolver for SpellBook {
    fn label_for(&self, ability_id: u32) -> String {
        let Some(meta) = self.meta() else {
            return UNKNOWN_SPELL.to_string();
        };
        if ability_id == 0 {
            return AUTO_ATTACK.to_string();
        }
        self.spells
            .get(&(meta.expansion_id, ability_id))
            .cloned()
            .unwrap_or_else(|| UNKNOWN_SPELL.to_string())
    }
}

/// Default spell file location in the user config directory.
pub fn default_spells_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("raidlens").join("spells.toml"))
}
