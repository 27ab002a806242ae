//! Arena configuration: capacity and size classes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_ARENA_CAPACITY, DEFAULT_SIZE_CLASSES, HEADER_SIZE, MAX_ARENA_CAPACITY};
use crate::error::ConfigError;

/// Validated allocator configuration.
///
/// Size classes are normalised largest first, which is also the partitioning
/// priority. Values are fixed once the arena is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawArenaConfig")]
pub struct ArenaConfig {
    capacity: usize,
    size_classes: Vec<u8>,
}

/// Unvalidated on-disk form.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawArenaConfig {
    capacity: usize,
    size_classes: Vec<u8>,
}

impl TryFrom<RawArenaConfig> for ArenaConfig {
    type Error = ConfigError;

    fn try_from(raw: RawArenaConfig) -> Result<Self, Self::Error> {
        Self::new(raw.capacity, raw.size_classes)
    }
}

impl ArenaConfig {
    /// Build and validate a configuration.
    pub fn new(capacity: usize, size_classes: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let mut size_classes = size_classes.into();
        if size_classes.is_empty() {
            return Err(ConfigError::EmptySizeClasses);
        }
        if size_classes.contains(&0) {
            return Err(ConfigError::ZeroPayload);
        }
        size_classes.sort_unstable_by(|a, b| b.cmp(a));
        if let Some(w) = size_classes.windows(2).find(|w| w[0] == w[1]) {
            return Err(ConfigError::DuplicateSizeClass(w[0]));
        }
        if capacity > MAX_ARENA_CAPACITY {
            return Err(ConfigError::CapacityTooLarge {
                capacity,
                max: MAX_ARENA_CAPACITY,
            });
        }
        let smallest = size_classes[size_classes.len() - 1];
        let min_block = block_size(smallest);
        if capacity < min_block {
            return Err(ConfigError::CapacityTooSmall { capacity, min_block });
        }
        Ok(Self {
            capacity,
            size_classes,
        })
    }

    /// The reference configuration: 4096 bytes, classes 180 and 15.
    pub fn reference() -> Self {
        Self {
            capacity: DEFAULT_ARENA_CAPACITY,
            size_classes: DEFAULT_SIZE_CLASSES.to_vec(),
        }
    }

    /// Parse a JSON configuration.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Total arena capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Size-class payload sizes, largest first.
    pub fn size_classes(&self) -> &[u8] {
        &self.size_classes
    }

    /// Map a requested size to its size class, if one matches exactly.
    pub fn class_for(&self, size: usize) -> Option<u8> {
        let size = u8::try_from(size).ok()?;
        self.size_classes.contains(&size).then_some(size)
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::reference()
    }
}

/// Header plus payload bytes of one block of the given class.
pub fn block_size(payload: u8) -> usize {
    HEADER_SIZE + usize::from(payload)
}
