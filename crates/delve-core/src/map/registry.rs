//! Registry of loaded maps and the current map identity.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use super::generator::{GenerationReport, Level, TileMapGenerator};
use super::layout::MapData;
use crate::error::MapError;

/// Every known map, keyed by id, plus which one is active.
///
/// Maps are parsed and validated on registration and never change
/// afterward. The current map changes only through
/// [`MapRegistry::load_map`].
///
/// ```
/// use delve_core::map::MapRegistry;
///
/// let registry = MapRegistry::from_json_strs([
///     r#"{"mapId":"hall","tileSize":4.0,"layout":["P."]}"#,
///     r#"{"mapId":"cellar","tileSize":4.0,"layout":["P"]}"#,
/// ]).unwrap();
///
/// assert_eq!(registry.len(), 2);
/// assert_eq!(registry.map_ids().collect::<Vec<_>>(), vec!["cellar", "hall"]);
/// assert_eq!(registry.current_map_id(), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapRegistry {
    maps: BTreeMap<String, MapData>,
    current: Option<String>,
}

impl MapRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from map documents.
    ///
    /// # Errors
    ///
    /// Fails on the first document that does not parse or validate.
    pub fn from_json_strs<I, S>(documents: I) -> Result<Self, MapError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for json in documents {
            registry.register(json.as_ref())?;
        }
        Ok(registry)
    }

    /// Registers every `*.json` file in `dir`, in file name order.
    ///
    /// # Errors
    ///
    /// [`MapError::Io`] if the directory or a file cannot be read, or the
    /// parse and validation errors of [`MapRegistry::register`].
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, MapError> {
        let dir = dir.as_ref();
        let io_error = |source| MapError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut registry = Self::new();
        for path in paths {
            let json = fs::read_to_string(&path).map_err(|source| MapError::Io {
                path: path.clone(),
                source,
            })?;
            let id = registry.register(&json)?;
            debug!(map = %id, path = %path.display(), "map file registered");
        }
        Ok(registry)
    }

    /// Parses, validates and registers one map document, returning its id.
    ///
    /// A map with an id already present replaces the earlier one.
    ///
    /// # Errors
    ///
    /// The parse and validation errors of [`MapData::from_json_str`].
    pub fn register(&mut self, json: &str) -> Result<String, MapError> {
        let map = MapData::from_json_str(json)?;
        Ok(self.insert(map))
    }

    /// Registers an already-built map, returning its id.
    pub fn insert(&mut self, map: MapData) -> String {
        let id = map.map_id.clone();
        if self.maps.insert(id.clone(), map).is_some() {
            info!(map = %id, "map re-registered, replacing earlier definition");
        }
        id
    }

    /// Map data by id.
    #[must_use]
    pub fn get(&self, map_id: &str) -> Option<&MapData> {
        self.maps.get(map_id)
    }

    /// True if `map_id` is registered.
    #[must_use]
    pub fn contains(&self, map_id: &str) -> bool {
        self.maps.contains_key(map_id)
    }

    /// Registered ids in sorted order.
    pub fn map_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.maps.keys().map(String::as_str)
    }

    /// Number of registered maps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    /// True if no maps are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Id of the active map, once one has loaded.
    #[must_use]
    pub fn current_map_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Generates `map_id` into `level` and places the player at
    /// `spawn_number`.
    ///
    /// # Errors
    ///
    /// [`MapError::NotFound`] if the id is unknown. The world and the current
    /// map are left untouched.
    pub fn load_map(
        &mut self,
        map_id: &str,
        spawn_number: u32,
        generator: &TileMapGenerator,
        level: &mut Level<'_>,
    ) -> Result<GenerationReport, MapError> {
        let Some(map) = self.maps.get(map_id) else {
            warn!(map = %map_id, "map not found, load aborted");
            return Err(MapError::NotFound(map_id.to_string()));
        };

        let blueprint = generator.generate(map);
        let report = generator.apply(&blueprint, spawn_number, level);
        self.current = Some(map_id.to_string());
        info!(
            map = %map_id,
            spawn = ?report.player_spawn,
            enemies = report.enemies_spawned,
            "map loaded"
        );
        Ok(report)
    }
}
