//! Process-wide comparison flags
//!
//! The engine reads these flags every time a comparison is evaluated, so
//! they are shared by every [`Diff`](crate::Diff) in the process. Callers
//! that need a particular combination for the duration of a comparison must
//! coordinate among themselves; this module only guarantees that individual
//! reads and writes are atomic.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use xml_diff_traits::error::{Error, Result};

/// One of the engine's global comparison flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineFlag {
    /// Do not report attributes declared in a different order
    IgnoreAttributeOrder,
    /// Skip comment nodes entirely
    IgnoreComments,
    /// Treat CDATA sections as ordinary text
    IgnoreDiffBetweenTextAndCdata,
    /// Trim character data and drop whitespace-only text
    IgnoreWhitespace,
    /// Merge adjacent character data before comparing
    Normalize,
    /// Collapse whitespace runs in text and attribute values
    NormalizeWhitespace,
}

impl EngineFlag {
    pub const ALL: [EngineFlag; 6] = [
        EngineFlag::IgnoreAttributeOrder,
        EngineFlag::IgnoreComments,
        EngineFlag::IgnoreDiffBetweenTextAndCdata,
        EngineFlag::IgnoreWhitespace,
        EngineFlag::Normalize,
        EngineFlag::NormalizeWhitespace,
    ];
}

/// A snapshot of every flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub ignore_attribute_order: bool,
    pub ignore_comments: bool,
    pub ignore_diff_between_text_and_cdata: bool,
    pub ignore_whitespace: bool,
    pub normalize: bool,
    pub normalize_whitespace: bool,
}

impl EngineConfig {
    /// Values the process starts with
    pub const DEFAULT: EngineConfig = EngineConfig {
        ignore_attribute_order: true,
        ignore_comments: false,
        ignore_diff_between_text_and_cdata: false,
        ignore_whitespace: false,
        normalize: false,
        normalize_whitespace: false,
    };

    /// Every flag off: the strictest comparison
    pub const STRICT: EngineConfig = EngineConfig {
        ignore_attribute_order: false,
        ignore_comments: false,
        ignore_diff_between_text_and_cdata: false,
        ignore_whitespace: false,
        normalize: false,
        normalize_whitespace: false,
    };

    pub fn get(&self, flag: EngineFlag) -> bool {
        match flag {
            EngineFlag::IgnoreAttributeOrder => self.ignore_attribute_order,
            EngineFlag::IgnoreComments => self.ignore_comments,
            EngineFlag::IgnoreDiffBetweenTextAndCdata => self.ignore_diff_between_text_and_cdata,
            EngineFlag::IgnoreWhitespace => self.ignore_whitespace,
            EngineFlag::Normalize => self.normalize,
            EngineFlag::NormalizeWhitespace => self.normalize_whitespace,
        }
    }

    pub fn set(&mut self, flag: EngineFlag, value: bool) {
        let slot = match flag {
            EngineFlag::IgnoreAttributeOrder => &mut self.ignore_attribute_order,
            EngineFlag::IgnoreComments => &mut self.ignore_comments,
            EngineFlag::IgnoreDiffBetweenTextAndCdata => &mut self.ignore_diff_between_text_and_cdata,
            EngineFlag::IgnoreWhitespace => &mut self.ignore_whitespace,
            EngineFlag::Normalize => &mut self.normalize,
            EngineFlag::NormalizeWhitespace => &mut self.normalize_whitespace,
        };
        *slot = value;
    }

    /// Copy of this configuration with one flag changed
    pub fn with(mut self, flag: EngineFlag, value: bool) -> Self {
        self.set(flag, value);
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

static GLOBAL: RwLock<EngineConfig> = RwLock::new(EngineConfig::DEFAULT);

/// Read the current value of every flag
pub fn current() -> Result<EngineConfig> {
    GLOBAL
        .read()
        .map(|config| *config)
        .map_err(|_| Error::engine_config("global comparison flags are poisoned"))
}

/// Read one flag
pub fn flag(flag: EngineFlag) -> Result<bool> {
    current().map(|config| config.get(flag))
}

/// Overwrite one flag
pub fn set_flag(flag: EngineFlag, value: bool) -> Result<()> {
    let mut config = GLOBAL
        .write()
        .map_err(|_| Error::engine_config("global comparison flags are poisoned"))?;
    tracing::trace!(?flag, value, "setting engine flag");
    config.set(flag, value);
    Ok(())
}

/// Overwrite every flag at once, returning the previous values
pub fn replace(new: EngineConfig) -> Result<EngineConfig> {
    let mut config = GLOBAL
        .write()
        .map_err(|_| Error::engine_config("global comparison flags are poisoned"))?;
    Ok(std::mem::replace(&mut *config, new))
}

/// Somewhere flags can be read from and written to.
///
/// [`GlobalConfig`] is the store the engine itself consults.
pub trait ConfigStore: Send + Sync {
    fn get(&self, flag: EngineFlag) -> Result<bool>;
    fn set(&self, flag: EngineFlag, value: bool) -> Result<()>;
}

/// The process-wide flags read by every comparison
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalConfig;

impl ConfigStore for GlobalConfig {
    fn get(&self, flag: EngineFlag) -> Result<bool> {
        self::flag(flag)
    }

    fn set(&self, flag: EngineFlag, value: bool) -> Result<()> {
        set_flag(flag, value)
    }
}
