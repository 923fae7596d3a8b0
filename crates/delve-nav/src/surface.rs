//! Tile surface with nearest-point sampling.
//!
//! Tiles are addressed by integer cell coordinates. A cell `(x, z)` covers the
//! square centered at `(x * tile_size, 0, z * tile_size)` with side `tile_size`.

use std::collections::BTreeSet;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::VERTICAL_TOLERANCE;

/// Integer address of a surface cell.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    /// Cell index along world x.
    pub x: i32,
    /// Cell index along world z.
    pub z: i32,
}

impl CellCoord {
    /// Creates a cell coordinate.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

/// Walkable region made of square tiles on the ground plane.
///
/// Cells are stored in a `BTreeSet` so sampling visits them in a fixed order
/// and ties always resolve the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavSurface {
    tile_size: f32,
    cells: BTreeSet<CellCoord>,
}

impl NavSurface {
    /// Creates an empty surface whose cells are `tile_size` wide.
    ///
    /// Non-positive sizes are replaced by `1.0`.
    #[must_use]
    pub fn new(tile_size: f32) -> Self {
        let tile_size = if tile_size > 0.0 { tile_size } else { 1.0 };
        Self {
            tile_size,
            cells: BTreeSet::new(),
        }
    }

    /// Builds a surface from tile centers.
    #[must_use]
    pub fn from_tiles(tile_size: f32, centers: impl IntoIterator<Item = Vec3>) -> Self {
        let mut surface = Self::new(tile_size);
        for center in centers {
            surface.insert_tile(center);
        }
        surface
    }

    /// Returns the side length of one cell.
    #[must_use]
    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Adds the tile whose center lies closest to `center`.
    pub fn insert_tile(&mut self, center: Vec3) {
        let cell = self.cell_at(center);
        self.cells.insert(cell);
    }

    /// Removes every tile.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Returns the number of tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the surface has no tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the cell containing `point` horizontally.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn cell_at(&self, point: Vec3) -> CellCoord {
        CellCoord::new(
            (point.x / self.tile_size).round() as i32,
            (point.z / self.tile_size).round() as i32,
        )
    }

    /// Returns the world-space center of a cell.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn cell_center(&self, cell: CellCoord) -> Vec3 {
        Vec3::new(
            cell.x as f32 * self.tile_size,
            0.0,
            cell.z as f32 * self.tile_size,
        )
    }

    /// Returns true if `cell` is walkable.
    #[must_use]
    pub fn has_cell(&self, cell: CellCoord) -> bool {
        self.cells.contains(&cell)
    }

    /// Returns true if `point` stands on a walkable tile.
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        point.y.abs() <= VERTICAL_TOLERANCE && self.has_cell(self.cell_at(point))
    }

    /// Finds the walkable point closest to `point`, if one lies within
    /// `tolerance` (straight-line distance, vertical offset included).
    ///
    /// Returned points are pulled slightly inside their tile so that
    /// [`NavSurface::contains`] accepts them. The search visits at most as
    /// many cells as the surface holds, whatever the tile size.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn sample_nearest(&self, point: Vec3, tolerance: f32) -> Option<Vec3> {
        if self.cells.is_empty() || tolerance.is_nan() || tolerance < 0.0 {
            return None;
        }

        let reach = f64::from(tolerance / self.tile_size).ceil() + 1.0;
        let window = (2.0 * reach + 1.0).powi(2);

        let best = if window.is_finite() && window <= self.cells.len() as f64 {
            let origin = self.cell_at(point);
            let reach = reach as i32;
            let mut best: Option<(f32, Vec3)> = None;
            for dz in -reach..=reach {
                for dx in -reach..=reach {
                    let (Some(x), Some(z)) = (origin.x.checked_add(dx), origin.z.checked_add(dz))
                    else {
                        continue;
                    };
                    let cell = CellCoord::new(x, z);
                    if self.has_cell(cell) {
                        best = closer(best, self.closest_in_cell(cell, point));
                    }
                }
            }
            best
        } else {
            self.cells
                .iter()
                .map(|&cell| self.closest_in_cell(cell, point))
                .fold(None, closer)
        };

        best.filter(|(d, _)| *d <= tolerance).map(|(_, p)| p)
    }

    /// Closest point of `cell` to `point`, with its distance.
    fn closest_in_cell(&self, cell: CellCoord, point: Vec3) -> (f32, Vec3) {
        let center = self.cell_center(cell);
        let half = self.tile_size * 0.5;
        let inset = self.tile_size * 1e-3;
        let closest = Vec3::new(
            point.x.clamp(center.x - half + inset, center.x + half - inset),
            0.0,
            point.z.clamp(center.z - half + inset, center.z + half - inset),
        );
        (point.distance(closest), closest)
    }
}

/// Keeps the earlier candidate on ties.
fn closer(best: Option<(f32, Vec3)>, candidate: (f32, Vec3)) -> Option<(f32, Vec3)> {
    match best {
        Some((d, _)) if d <= candidate.0 => best,
        _ => Some(candidate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(len: i32) -> NavSurface {
        NavSurface::from_tiles(
            4.0,
            (0..len).map(|i| Vec3::new(i as f32 * 4.0, 0.0, 0.0)),
        )
    }

    #[test]
    fn contains_points_on_tiles() {
        let surface = strip(3);
        assert!(surface.contains(Vec3::new(0.0, 0.0, 0.0)));
        assert!(surface.contains(Vec3::new(9.5, 0.2, 1.5)));
        assert!(!surface.contains(Vec3::new(0.0, 0.0, 4.0)));
        assert!(!surface.contains(Vec3::new(0.0, 2.0, 0.0)));
    }

    #[test]
    fn sample_returns_point_itself_when_on_surface() {
        let surface = strip(3);
        let p = Vec3::new(3.0, 0.0, 1.0);
        let hit = surface.sample_nearest(p, 2.0).unwrap();
        assert!(hit.distance(p) < 1e-4);
    }

    #[test]
    fn sample_projects_nearby_point_onto_edge() {
        let surface = strip(3);
        let hit = surface.sample_nearest(Vec3::new(4.0, 0.0, 3.0), 2.0).unwrap();
        assert!((hit.z - 2.0).abs() < 0.01);
        assert!(surface.contains(hit));
    }

    #[test]
    fn sample_fails_beyond_tolerance() {
        let surface = strip(3);
        assert!(surface.sample_nearest(Vec3::new(4.0, 0.0, 10.0), 2.0).is_none());
    }

    #[test]
    fn sample_on_empty_surface_fails() {
        let surface = NavSurface::new(4.0);
        assert!(surface.sample_nearest(Vec3::ZERO, 100.0).is_none());
    }

    #[test]
    fn tiny_tiles_sample_without_scanning_empty_space() {
        let size = 1e-9;
        let surface = NavSurface::from_tiles(size, [Vec3::ZERO, Vec3::new(size, 0.0, 0.0)]);
        let hit = surface.sample_nearest(Vec3::new(size, 0.0, 0.0), 2.0).unwrap();
        assert!(surface.contains(hit));
        assert!(surface.sample_nearest(Vec3::new(5.0, 0.0, 0.0), 2.0).is_none());
        assert!(surface.sample_nearest(Vec3::ZERO, f32::INFINITY).is_some());
    }

    #[test]
    fn windowed_search_on_large_surface() {
        let surface = NavSurface::from_tiles(
            4.0,
            (0..10).flat_map(|x| (0..10).map(move |z| Vec3::new(x as f32 * 4.0, 0.0, z as f32 * 4.0))),
        );
        let hit = surface.sample_nearest(Vec3::new(41.0, 0.0, 8.0), 2.0).unwrap();
        assert!((hit.x - 38.0).abs() < 0.01);
        assert!((hit.z - 8.0).abs() < 1e-4);
        assert!(surface.sample_nearest(Vec3::new(50.0, 0.0, 8.0), 2.0).is_none());
    }

    #[test]
    fn wide_tolerance_matches_windowed_search() {
        let surface = strip(3);
        let p = Vec3::new(20.0, 0.0, 1.0);
        let hit = surface.sample_nearest(p, 1000.0).unwrap();
        assert!((hit.x - 10.0).abs() < 0.01);
        assert!((hit.z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn non_positive_tile_size_is_replaced() {
        assert_eq!(NavSurface::new(0.0).tile_size(), 1.0);
        assert_eq!(NavSurface::new(-3.0).tile_size(), 1.0);
    }

    #[test]
    fn surface_is_serializable() {
        let surface = strip(2);
        let json = serde_json::to_string(&surface).unwrap();
        let back: NavSurface = serde_json::from_str(&json).unwrap();
        assert_eq!(back, surface);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn sampled_points_are_on_surface(x in -20.0f32..40.0, z in -20.0f32..20.0) {
                let surface = strip(8);
                if let Some(hit) = surface.sample_nearest(Vec3::new(x, 0.0, z), 3.0) {
                    prop_assert!(surface.contains(hit));
                    prop_assert!(hit.distance(Vec3::new(x, 0.0, z)) <= 3.0);
                }
            }
        }
    }
}
