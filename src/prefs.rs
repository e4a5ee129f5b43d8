//! Theme and per-view sort preferences.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::CorruptPolicy;
use crate::error::{Error, Result};
use crate::persistence::BlobSlot;
use crate::storage::BlobStore;
use crate::view::{ViewConfig, ViewState};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Theme::Dark)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(Error::InvalidArgument(format!(
                "unknown theme '{other}' (expected light|dark)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct Preferences {
    pub theme: Theme,
    #[serde(flatten)]
    pub views: ViewState,
}

/// Stored form; every field may be absent in older or hand-edited blobs.
#[derive(Debug, Default, Deserialize)]
struct StoredPreferences {
    theme: Option<Theme>,
    active: Option<ViewConfig>,
    completed: Option<ViewConfig>,
}

impl StoredPreferences {
    fn fill_from(self, fallback: Preferences) -> Preferences {
        Preferences {
            theme: self.theme.unwrap_or(fallback.theme),
            views: ViewState {
                active: self.active.unwrap_or(fallback.views.active),
                completed: self.completed.unwrap_or(fallback.views.completed),
            },
        }
    }
}

/// Loads and saves `Preferences` under one blob key
#[derive(Debug, Clone)]
pub struct PrefsStore<B: BlobStore> {
    slot: BlobSlot<B>,
    initial: Preferences,
}

impl<B: BlobStore> PrefsStore<B> {
    /// `initial` is returned by `load` until something has been saved, and
    /// fills any field a stored blob lacks
    pub fn new(
        blobs: B,
        key: impl Into<String>,
        on_corrupt: CorruptPolicy,
        initial: Preferences,
    ) -> Self {
        Self {
            slot: BlobSlot::new(blobs, key, on_corrupt),
            initial,
        }
    }

    pub fn load(&self) -> Result<Preferences> {
        let stored: Option<StoredPreferences> = self.slot.read()?;
        Ok(stored.unwrap_or_default().fill_from(self.initial))
    }

    pub fn save(&self, prefs: &Preferences) -> Result<()> {
        self.slot.write(prefs)?;
        tracing::debug!(theme = %prefs.theme, "saved preferences");
        Ok(())
    }

    /// Load, apply `change`, save, and return the new preferences
    pub fn modify(&self, change: impl FnOnce(&mut Preferences)) -> Result<Preferences> {
        let mut prefs = self.load()?;
        change(&mut prefs);
        self.save(&prefs)?;
        Ok(prefs)
    }
}
