// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Saved conversion preferences shared by stylecross tools.

use serde::{Deserialize, Serialize};
use stylecross_core::{ConvertOptions, Dialect};
use stylecross_yaml::EmitOptions;

use crate::config::{ConfigError, ConfigService, ConfigStore};

/// Key under which [`ConvertPrefs`] are stored.
pub const PREFS_KEY: &str = "prefs";

/// Everything a conversion run can be tuned with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertPrefs {
    /// Converter knobs.
    pub convert: ConvertOptions,
    /// Output layout.
    pub emit: EmitOptions,
    /// Source-style fix-ups.
    pub dialect: Dialect,
}

impl Default for ConvertPrefs {
    fn default() -> Self {
        Self {
            convert: ConvertOptions::default(),
            emit: EmitOptions::scene_preset(),
            dialect: Dialect::None,
        }
    }
}

impl<S: ConfigStore> ConfigService<S> {
    /// Stored preferences, or defaults when nothing has been saved.
    pub fn load_prefs(&self) -> Result<ConvertPrefs, ConfigError> {
        Ok(self.load(PREFS_KEY)?.unwrap_or_default())
    }

    /// Persist preferences.
    pub fn save_prefs(&self, prefs: &ConvertPrefs) -> Result<(), ConfigError> {
        self.save(PREFS_KEY, prefs)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::MemoryStore;

    #[test]
    fn defaults_when_nothing_saved() {
        let service = ConfigService::new(MemoryStore::default());
        let prefs = service.load_prefs().unwrap();
        assert_eq!(prefs, ConvertPrefs::default());
        assert_eq!(prefs.emit.flow_level, 8);
        assert_eq!(prefs.convert.default_source, "mapfit");
    }

    #[test]
    fn round_trips_through_store() {
        let service = ConfigService::new(MemoryStore::default());
        let mut prefs = ConvertPrefs::default();
        prefs.convert.global_colors = true;
        prefs.dialect = Dialect::OsmBright;
        prefs.emit.quote = '\'';
        service.save_prefs(&prefs).unwrap();
        assert_eq!(service.load_prefs().unwrap(), prefs);
    }

    #[test]
    fn partial_blob_fills_defaults() {
        let store = MemoryStore::default();
        store
            .save_raw(PREFS_KEY, br#"{ "dialect": "osm-bright", "convert": { "global_colors": true } }"#)
            .unwrap();
        let prefs = ConfigService::new(store).load_prefs().unwrap();
        assert_eq!(prefs.dialect, Dialect::OsmBright);
        assert!(prefs.convert.global_colors);
        assert_eq!(prefs.convert.default_source, "mapfit");
        assert_eq!(prefs.emit, EmitOptions::scene_preset());
    }
}
