//! Map file format and the character grid it describes.

use serde::{Deserialize, Serialize};

use crate::entity::Direction;
use crate::error::MapError;

/// Asset used for floors when the map names none.
pub const DEFAULT_FLOOR_ASSET: &str = "Floor";
/// Asset used for walls when the map names none.
pub const DEFAULT_WALL_ASSET: &str = "Wall";
/// Asset used for doors when the portal names none.
pub const DEFAULT_DOOR_ASSET: &str = "Door";

/// One map file.
///
/// ```
/// use delve_core::map::MapData;
///
/// let map = MapData::from_json_str(r#"{
///     "mapId": "cellar",
///     "tileSize": 4.0,
///     "layout": ["W1W", "W.W", "WPW"],
///     "portals": [{"triggerChar": "1", "targetMapId": "hall", "targetSpawnId": 0}]
/// }"#).unwrap();
///
/// assert_eq!(map.map_id, "cellar");
/// assert_eq!(map.portal('1').unwrap().target_map_id, "hall");
/// assert_eq!(map.floor_asset(), "Floor");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapData {
    /// Unique map id.
    pub map_id: String,
    /// World units per cell.
    pub tile_size: f32,
    /// Grid rows, top row first.
    #[serde(default)]
    pub layout: Vec<String>,
    /// Portal definitions keyed by digit.
    #[serde(default)]
    pub portals: Vec<PortalDef>,
    /// Floor asset override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor_prefab_name: Option<String>,
    /// Wall asset override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wall_prefab_name: Option<String>,
}

/// Where a portal digit leads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalDef {
    /// Single digit `"0"`..`"9"` naming the portal cells.
    pub trigger_char: String,
    /// Map to load.
    pub target_map_id: String,
    /// Spawn index in the target map.
    pub target_spawn_id: u32,
    /// Door asset override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub door_prefab_name: Option<String>,
}

impl PortalDef {
    /// The trigger digit, if `trigger_char` is exactly one ASCII digit.
    #[must_use]
    pub fn trigger(&self) -> Option<char> {
        let mut chars = self.trigger_char.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_digit() => Some(c),
            _ => None,
        }
    }

    /// Door asset name.
    #[must_use]
    pub fn door_asset(&self) -> &str {
        self.door_prefab_name.as_deref().unwrap_or(DEFAULT_DOOR_ASSET)
    }
}

impl MapData {
    /// Parses and validates a map document.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Parse`] for malformed JSON and the validation
    /// errors of [`MapData::validate`].
    pub fn from_json_str(json: &str) -> Result<Self, MapError> {
        let map: Self = serde_json::from_str(json)?;
        map.validate()?;
        Ok(map)
    }

    /// Checks the id, tile size and portal triggers.
    ///
    /// # Errors
    ///
    /// [`MapError::EmptyId`], [`MapError::InvalidTileSize`] or
    /// [`MapError::InvalidTrigger`].
    pub fn validate(&self) -> Result<(), MapError> {
        if self.map_id.trim().is_empty() {
            return Err(MapError::EmptyId);
        }
        if !self.tile_size.is_finite() || self.tile_size <= 0.0 {
            return Err(MapError::InvalidTileSize {
                map_id: self.map_id.clone(),
                tile_size: self.tile_size,
            });
        }
        if let Some(bad) = self.portals.iter().find(|p| p.trigger().is_none()) {
            return Err(MapError::InvalidTrigger {
                map_id: self.map_id.clone(),
                trigger: bad.trigger_char.clone(),
            });
        }
        Ok(())
    }

    /// First portal definition for `digit`.
    #[must_use]
    pub fn portal(&self, digit: char) -> Option<&PortalDef> {
        self.portals.iter().find(|p| p.trigger() == Some(digit))
    }

    /// Floor asset name.
    #[must_use]
    pub fn floor_asset(&self) -> &str {
        self.floor_prefab_name.as_deref().unwrap_or(DEFAULT_FLOOR_ASSET)
    }

    /// Wall asset name.
    #[must_use]
    pub fn wall_asset(&self) -> &str {
        self.wall_prefab_name.as_deref().unwrap_or(DEFAULT_WALL_ASSET)
    }

    /// The layout as a grid.
    #[must_use]
    pub fn grid(&self) -> TileGrid {
        TileGrid::from_rows(&self.layout)
    }
}

// =============================================================================
// Grid
// =============================================================================

/// What a layout character places.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// Floor only.
    Floor,
    /// `W`: wall.
    Wall,
    /// A digit: wall that may carry a portal.
    Portal(char),
    /// `P`: player start, spawn index 0.
    PlayerSpawn,
    /// `E`: enemy spawn.
    EnemySpawn,
}

impl CellKind {
    /// Classifies a character. Spaces are outside and yield `None`.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            ' ' => None,
            'W' => Some(Self::Wall),
            'P' => Some(Self::PlayerSpawn),
            'E' => Some(Self::EnemySpawn),
            d if d.is_ascii_digit() => Some(Self::Portal(d)),
            _ => Some(Self::Floor),
        }
    }

    /// True for cells that get wall panels.
    #[must_use]
    pub const fn is_wall(self) -> bool {
        matches!(self, Self::Wall | Self::Portal(_))
    }
}

/// Rectangular view over the layout rows.
///
/// Rows are trimmed of surrounding whitespace. A cell is outside when it is
/// a space or lies beyond the end of its row or the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileGrid {
    rows: Vec<Vec<char>>,
}

impl TileGrid {
    /// Builds the grid from raw layout rows.
    #[must_use]
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|row| row.as_ref().trim().chars().collect())
                .collect(),
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Length of the longest row.
    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// The tile at `(col, row)`, or `None` when outside.
    #[must_use]
    pub fn cell(&self, col: isize, row: isize) -> Option<CellKind> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        let c = *self.rows.get(row)?.get(col)?;
        CellKind::from_char(c)
    }

    /// True when `(col, row)` is not a tile.
    #[must_use]
    pub fn is_outside(&self, col: isize, row: isize) -> bool {
        self.cell(col, row).is_none()
    }

    /// Sides of `(col, row)` that border outside, in north, south, west,
    /// east order.
    #[must_use]
    pub fn outside_sides(&self, col: usize, row: usize) -> Vec<Direction> {
        let (Ok(col), Ok(row)) = (isize::try_from(col), isize::try_from(row)) else {
            return Direction::ALL.to_vec();
        };
        Direction::ALL
            .into_iter()
            .filter(|dir| {
                let (dc, dr) = dir.grid_offset();
                self.is_outside(col + dc, row + dr)
            })
            .collect()
    }

    /// Every tile as `(col, row, kind)`, row by row.
    pub fn tiles(&self) -> impl Iterator<Item = (usize, usize, CellKind)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, chars)| {
            chars
                .iter()
                .enumerate()
                .filter_map(move |(col, c)| CellKind::from_char(*c).map(|kind| (col, row, kind)))
        })
    }
}
