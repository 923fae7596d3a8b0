//! Tile map generation.
//!
//! Generation runs in two passes:
//!
//! 1. [`TileMapGenerator::generate`] derives a [`Blueprint`] from a map: floor
//!    tiles, wall panels, doors, portal triggers, spawn points and enemy
//!    spawns. It is pure and touches no world state.
//! 2. [`TileMapGenerator::apply`] tears down the previous level, places the
//!    blueprint's geometry, rebuilds the navigation surface, and only then
//!    positions the player and spawns enemies.
//!
//! # Coordinates
//!
//! Cell `(col, row)` is centered at `(col * tile_size, 0, -row * tile_size)`,
//! so north (the previous row) is `+z`.

use std::collections::BTreeMap;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::layout::{CellKind, MapData, PortalDef};
use crate::agent::{EnemyAgent, EnemyRoster};
use crate::ai::PatrolSettings;
use crate::arena::Arena;
use crate::config::{EnemyConfig, GameConfig};
use crate::entity::{
    Direction, DoorComponents, EntityInner, EntityTag, FloorComponents, PortalComponents,
    PortalLink, Transform, WallComponents,
};
use crate::nav::Navigation;
use crate::player::PlayerCombatController;

/// Fraction of a tile by which a door sits inside its wall panel.
pub const DOOR_INSET: f32 = 0.05;

/// Spawn index of the player start tile.
pub const PLAYER_SPAWN: u32 = 0;

/// A single entity to place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Where the entity goes.
    pub transform: Transform,
    /// What it is.
    pub inner: EntityInner,
}

impl Placement {
    /// The placed entity's tag.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        self.inner.tag()
    }
}

/// Everything one map generates, before it is placed in the world.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    /// Source map id.
    pub map_id: String,
    /// World units per cell.
    pub tile_size: f32,
    /// Floors, walls, doors and portal triggers in generation order.
    pub geometry: Vec<Placement>,
    /// Player placement points by spawn index.
    pub spawn_points: BTreeMap<u32, Vec3>,
    /// Intended enemy positions, before snapping.
    pub enemy_spawns: Vec<Vec3>,
}

impl Blueprint {
    /// Number of placements with `tag`.
    #[must_use]
    pub fn count(&self, tag: EntityTag) -> usize {
        self.geometry.iter().filter(|p| p.tag() == tag).count()
    }

    /// Centers of every floor tile.
    #[must_use]
    pub fn floor_centers(&self) -> Vec<Vec3> {
        self.geometry
            .iter()
            .filter(|p| p.tag() == EntityTag::Floor)
            .map(|p| p.transform.position)
            .collect()
    }

    /// Iterates the placements with `tag`.
    pub fn placements(&self, tag: EntityTag) -> impl Iterator<Item = &Placement> + '_ {
        self.geometry.iter().filter(move |p| p.tag() == tag)
    }
}

/// The world a level is placed into.
pub struct Level<'a> {
    /// Entity registry.
    pub arena: &'a mut Arena,
    /// Live enemies.
    pub roster: &'a mut EnemyRoster,
    /// Navigation capability.
    pub nav: &'a mut dyn Navigation,
    /// The persistent player.
    pub player: &'a mut PlayerCombatController,
}

/// Summary of one [`TileMapGenerator::apply`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Map that was placed.
    pub map_id: String,
    /// Floor tiles placed.
    pub floors: usize,
    /// Wall panels placed.
    pub walls: usize,
    /// Door panels placed.
    pub doors: usize,
    /// Portal triggers placed.
    pub portals: usize,
    /// Enemies spawned.
    pub enemies_spawned: usize,
    /// Enemy spawns skipped for lack of a navigable point.
    pub enemies_skipped: usize,
    /// Spawn index the player was placed at, if any.
    pub player_spawn: Option<u32>,
    /// Generated entities removed from the previous level.
    pub despawned: usize,
}

/// Builds levels from map data.
#[derive(Debug, Clone, Default)]
pub struct TileMapGenerator {
    enemy: EnemyConfig,
    patrol: PatrolSettings,
    spawn_height: f32,
}

impl TileMapGenerator {
    /// Creates a generator spawning enemies with the given settings.
    #[must_use]
    pub fn new(enemy: EnemyConfig, patrol: PatrolSettings, spawn_height: f32) -> Self {
        Self {
            enemy,
            patrol,
            spawn_height,
        }
    }

    /// Creates a generator from a game config.
    #[must_use]
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(
            config.enemy.clone(),
            PatrolSettings::from(&config.patrol),
            config.player.spawn_height,
        )
    }

    /// Derives the blueprint of `map`.
    ///
    /// ```
    /// use delve_core::entity::EntityTag;
    /// use delve_core::map::{MapData, TileMapGenerator};
    ///
    /// let map = MapData::from_json_str(
    ///     r#"{"mapId":"box","tileSize":2.0,"layout":["WWW","W.W","WPW"]}"#,
    /// ).unwrap();
    /// let blueprint = TileMapGenerator::default().generate(&map);
    ///
    /// assert_eq!(blueprint.count(EntityTag::Floor), 9);
    /// assert_eq!(blueprint.count(EntityTag::Wall), 11);
    /// assert!(blueprint.spawn_points.contains_key(&0));
    /// ```
    #[must_use]
    pub fn generate(&self, map: &MapData) -> Blueprint {
        let grid = map.grid();
        let size = map.tile_size;
        let mut blueprint = Blueprint {
            map_id: map.map_id.clone(),
            tile_size: size,
            ..Blueprint::default()
        };

        for (col, row, kind) in grid.tiles() {
            #[allow(clippy::cast_precision_loss)]
            let center = Vec3::new(col as f32 * size, 0.0, -(row as f32) * size);

            blueprint.geometry.push(Placement {
                transform: Transform::at(center),
                inner: EntityInner::Floor(FloorComponents {
                    asset: map.floor_asset().to_string(),
                }),
            });

            match kind {
                CellKind::Wall => {
                    Self::place_walls(&mut blueprint, map, grid.outside_sides(col, row), center);
                }
                CellKind::Portal(digit) => {
                    let sides = grid.outside_sides(col, row);
                    let door_side = sides.first().copied();
                    Self::place_walls(&mut blueprint, map, sides, center);
                    if let Some(def) = map.portal(digit) {
                        if let Some(side) = door_side {
                            Self::place_door(&mut blueprint, digit, def, side, center);
                        }
                        let index = digit.to_digit(10).unwrap_or_default();
                        blueprint.spawn_points.insert(index, center);
                    }
                }
                CellKind::PlayerSpawn => {
                    blueprint.spawn_points.insert(PLAYER_SPAWN, center);
                }
                CellKind::EnemySpawn => blueprint.enemy_spawns.push(center),
                CellKind::Floor => {}
            }
        }
        blueprint
    }

    fn place_walls(blueprint: &mut Blueprint, map: &MapData, sides: Vec<Direction>, center: Vec3) {
        // Spurs open on three or four sides get no walls.
        if sides.len() >= 3 {
            return;
        }
        let half = blueprint.tile_size * 0.5;
        for side in sides {
            let position = center + side.world_offset() * half + Vec3::Y * half;
            blueprint.geometry.push(Placement {
                transform: Transform::new(position, side.wall_yaw()),
                inner: EntityInner::Wall(WallComponents {
                    facing: side,
                    asset: map.wall_asset().to_string(),
                }),
            });
        }
    }

    fn place_door(
        blueprint: &mut Blueprint,
        digit: char,
        def: &PortalDef,
        side: Direction,
        center: Vec3,
    ) {
        let size = blueprint.tile_size;
        let half = size * 0.5;
        let position = center + side.world_offset() * (half - size * DOOR_INSET) + Vec3::Y * half;

        blueprint.geometry.push(Placement {
            transform: Transform::new(position, side.wall_yaw()),
            inner: EntityInner::Door(DoorComponents {
                trigger_char: digit,
                asset: def.door_asset().to_string(),
            }),
        });
        blueprint.geometry.push(Placement {
            transform: Transform::new(position, side.wall_yaw()),
            inner: EntityInner::Portal(PortalComponents {
                link: PortalLink {
                    target_map_id: def.target_map_id.clone(),
                    target_spawn_id: def.target_spawn_id,
                },
                half_extents: Vec2::splat(half),
            }),
        });
    }

    /// Replaces the current level with `blueprint` and places the player at
    /// `spawn_number`.
    ///
    /// An unknown spawn index falls back to the player start; with neither,
    /// the player stays where it is. Enemy spawns with no navigable point in
    /// reach are skipped.
    pub fn apply(&self, blueprint: &Blueprint, spawn_number: u32, level: &mut Level<'_>) -> GenerationReport {
        let mut report = GenerationReport {
            map_id: blueprint.map_id.clone(),
            ..GenerationReport::default()
        };

        report.despawned = level.arena.despawn_generated().len();
        for id in level.roster.clear() {
            level.nav.remove_agent(id);
        }

        for placement in &blueprint.geometry {
            level.arena.spawn(placement.transform, placement.inner.clone());
            match placement.tag() {
                EntityTag::Floor => report.floors += 1,
                EntityTag::Wall => report.walls += 1,
                EntityTag::Door => report.doors += 1,
                EntityTag::Portal => report.portals += 1,
                EntityTag::Player | EntityTag::Enemy => {}
            }
        }

        level
            .nav
            .rebuild_surface(blueprint.tile_size, &blueprint.floor_centers());

        report.player_spawn = self.place_player(blueprint, spawn_number, level);

        for &intended in &blueprint.enemy_spawns {
            let Some(position) = level
                .nav
                .sample_nearest_navigable_point(intended, self.enemy.spawn_snap_tolerance)
            else {
                warn!(map = %blueprint.map_id, ?intended, "no navigable point near enemy spawn, skipping");
                report.enemies_skipped += 1;
                continue;
            };
            let id = level.arena.spawn(Transform::at(position), EntityInner::Enemy);
            level
                .nav
                .add_agent(id, position, self.enemy.speed, self.enemy.stopping_distance);
            level
                .roster
                .insert(EnemyAgent::new(id, position, &self.enemy, self.patrol));
            report.enemies_spawned += 1;
        }

        debug!(
            map = %report.map_id,
            floors = report.floors,
            walls = report.walls,
            doors = report.doors,
            enemies = report.enemies_spawned,
            "level placed"
        );
        report
    }

    fn place_player(&self, blueprint: &Blueprint, spawn_number: u32, level: &mut Level<'_>) -> Option<u32> {
        let (index, point) = match blueprint.spawn_points.get(&spawn_number) {
            Some(point) => (spawn_number, *point),
            None => {
                let Some(point) = blueprint.spawn_points.get(&PLAYER_SPAWN) else {
                    warn!(map = %blueprint.map_id, spawn_number, "no spawn point, player left in place");
                    return None;
                };
                warn!(map = %blueprint.map_id, spawn_number, "unknown spawn index, using player start");
                (PLAYER_SPAWN, *point)
            }
        };

        let position = point + Vec3::Y * self.spawn_height;
        level.player.teleport(position);
        level.arena.set_position(level.player.id(), position);
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerConfig;
    use crate::entity::EntityId;
    use crate::nav::GridNavigation;
    use proptest::prelude::*;

    fn map(layout: &[&str], portals: &str) -> MapData {
        let rows: Vec<String> = layout.iter().map(|r| format!("\"{r}\"")).collect();
        MapData::from_json_str(&format!(
            r#"{{"mapId":"test","tileSize":4.0,"layout":[{}],"portals":[{portals}]}}"#,
            rows.join(",")
        ))
        .unwrap()
    }

    struct World {
        arena: Arena,
        roster: EnemyRoster,
        nav: GridNavigation,
        player: PlayerCombatController,
    }

    impl World {
        fn new() -> Self {
            let mut arena = Arena::new();
            let id = arena.spawn(Transform::at(Vec3::new(100.0, 0.0, 100.0)), EntityInner::Player);
            Self {
                arena,
                roster: EnemyRoster::new(),
                nav: GridNavigation::new(),
                player: PlayerCombatController::new(id, Vec3::new(100.0, 0.0, 100.0), PlayerConfig::default()),
            }
        }

        fn apply(&mut self, blueprint: &Blueprint, spawn: u32) -> GenerationReport {
            let mut level = Level {
                arena: &mut self.arena,
                roster: &mut self.roster,
                nav: &mut self.nav,
                player: &mut self.player,
            };
            TileMapGenerator::default().apply(blueprint, spawn, &mut level)
        }
    }

    mod blueprint_tests {
        use super::*;

        #[test]
        fn three_by_three_room() {
            let blueprint = TileMapGenerator::default().generate(&map(&["WWW", "WPW", "WWW"], ""));
            assert_eq!(blueprint.count(EntityTag::Floor), 9);
            // Corners close two sides, edges one; the center is not a wall.
            assert_eq!(blueprint.count(EntityTag::Wall), 4 * 2 + 4);
            assert_eq!(blueprint.spawn_points.get(&0), Some(&Vec3::new(4.0, 0.0, -4.0)));
            assert!(blueprint.enemy_spawns.is_empty());

            let north: Vec<_> = blueprint
                .placements(EntityTag::Wall)
                .filter(|p| matches!(&p.inner, EntityInner::Wall(w) if w.facing == Direction::North))
                .collect();
            assert_eq!(north.len(), 3);
            for wall in north {
                assert_eq!(wall.transform.yaw, 0.0);
                assert_eq!(wall.transform.position.z, 2.0);
                assert_eq!(wall.transform.position.y, 2.0);
            }
        }

        #[test]
        fn floors_skip_spaces() {
            let blueprint = TileMapGenerator::default().generate(&map(&["W W", " . "], ""));
            assert_eq!(blueprint.count(EntityTag::Floor), 3);
            // Rows are trimmed, so the lone '.' lands in column 0.
            let centers = blueprint.floor_centers();
            assert!(centers.contains(&Vec3::new(8.0, 0.0, 0.0)));
            assert!(centers.contains(&Vec3::new(0.0, 0.0, -4.0)));
        }

        #[test]
        fn isolated_wall_gets_no_panels() {
            let blueprint = TileMapGenerator::default().generate(&map(&["W"], ""));
            assert_eq!(blueprint.count(EntityTag::Wall), 0);
            assert_eq!(blueprint.count(EntityTag::Floor), 1);
        }

        #[test]
        fn wall_yaw_per_side() {
            let blueprint = TileMapGenerator::default().generate(&map(&["WW", "WW"], ""));
            for wall in blueprint.placements(EntityTag::Wall) {
                let EntityInner::Wall(components) = &wall.inner else {
                    panic!("not a wall");
                };
                assert_eq!(wall.transform.yaw, components.facing.wall_yaw());
            }
            assert_eq!(blueprint.count(EntityTag::Wall), 8);
        }

        #[test]
        fn portal_cell_gets_one_door_on_first_outside_side() {
            let portals = r#"{"triggerChar":"1","targetMapId":"next","targetSpawnId":3,"doorPrefabName":"Gate"}"#;
            let blueprint = TileMapGenerator::default().generate(&map(&["1W", "WW"], portals));

            // Corner cell: north and west are outside, the door takes north.
            assert_eq!(blueprint.count(EntityTag::Door), 1);
            assert_eq!(blueprint.count(EntityTag::Portal), 1);
            let door = blueprint.placements(EntityTag::Door).next().unwrap();
            assert!(matches!(&door.inner, EntityInner::Door(d) if d.asset == "Gate" && d.trigger_char == '1'));
            assert!(door.transform.position.z > 1.0 && door.transform.position.z < 2.0);

            let portal = blueprint.placements(EntityTag::Portal).next().unwrap();
            let EntityInner::Portal(components) = &portal.inner else {
                panic!("not a portal");
            };
            assert_eq!(components.link.target_map_id, "next");
            assert_eq!(components.link.target_spawn_id, 3);
            assert_eq!(components.half_extents, Vec2::splat(2.0));
            assert_eq!(portal.transform.position, door.transform.position);

            assert_eq!(blueprint.spawn_points.get(&1), Some(&Vec3::ZERO));
        }

        #[test]
        fn digit_without_definition_is_plain_wall() {
            let blueprint = TileMapGenerator::default().generate(&map(&["W5W", "W.W"], ""));
            assert_eq!(blueprint.count(EntityTag::Door), 0);
            assert_eq!(blueprint.count(EntityTag::Portal), 0);
            assert!(!blueprint.spawn_points.contains_key(&5));
            assert_eq!(blueprint.count(EntityTag::Wall), 2 + 1 + 2 + 2 + 2);
        }

        #[test]
        fn enemy_cells_are_recorded() {
            let blueprint = TileMapGenerator::default().generate(&map(&["E.E"], ""));
            assert_eq!(
                blueprint.enemy_spawns,
                vec![Vec3::ZERO, Vec3::new(8.0, 0.0, 0.0)]
            );
        }
    }

    mod apply_tests {
        use super::*;

        #[test]
        fn places_player_and_enemies() {
            let mut world = World::new();
            let blueprint = TileMapGenerator::default().generate(&map(&["WWWW", "WPEW", "WWWW"], ""));
            let report = world.apply(&blueprint, 0);

            assert_eq!(report.player_spawn, Some(0));
            assert_eq!(report.enemies_spawned, 1);
            assert_eq!(report.floors, 12);
            assert_eq!(world.roster.len(), 1);
            assert_eq!(world.nav.agent_count(), 1);
            assert_eq!(world.arena.count_tagged(EntityTag::Enemy), 1);

            let expected = Vec3::new(4.0, PlayerConfig::default().spawn_height, -4.0);
            assert!((world.player.position() - expected).length() < 1e-5);
            let player_entity = world.arena.get(world.player.id()).unwrap();
            assert_eq!(player_entity.transform().position, world.player.position());
        }

        #[test]
        fn regeneration_keeps_only_the_player() {
            let mut world = World::new();
            let first = TileMapGenerator::default().generate(&map(&["WWW", "WPW", "WEW", "WWW"], ""));
            world.apply(&first, 0);
            let player_id = world.player.id();

            let second = TileMapGenerator::default().generate(&map(&["P."], ""));
            let report = world.apply(&second, 0);

            assert_eq!(report.despawned, first.geometry.len() + 1);
            assert_eq!(world.roster.len(), 0);
            assert_eq!(world.nav.agent_count(), 0);
            assert_eq!(world.arena.entity_count(), 1 + 2);
            assert_eq!(world.arena.get(player_id).unwrap().tag(), EntityTag::Player);
            assert_eq!(world.player.id(), player_id);
        }

        #[test]
        fn unknown_spawn_falls_back_to_start() {
            let mut world = World::new();
            let blueprint = TileMapGenerator::default().generate(&map(&["P.."], ""));
            let report = world.apply(&blueprint, 7);
            assert_eq!(report.player_spawn, Some(0));
            assert!(world.player.position().x.abs() < 1e-5);
        }

        #[test]
        fn no_spawn_points_leaves_player_in_place() {
            let mut world = World::new();
            let before = world.player.position();
            let blueprint = TileMapGenerator::default().generate(&map(&["..."], ""));
            let report = world.apply(&blueprint, 2);
            assert_eq!(report.player_spawn, None);
            assert_eq!(world.player.position(), before);
        }

        #[test]
        fn enemy_without_navigable_point_is_skipped() {
            let mut world = World::new();
            let mut blueprint = TileMapGenerator::default().generate(&map(&["P."], ""));
            blueprint.enemy_spawns.push(Vec3::new(50.0, 0.0, 50.0));
            let report = world.apply(&blueprint, 0);
            assert_eq!(report.enemies_spawned, 0);
            assert_eq!(report.enemies_skipped, 1);
            assert!(world.roster.is_empty());
        }

        #[test]
        fn surface_is_rebuilt_before_spawning() {
            let mut world = World::new();
            let blueprint = TileMapGenerator::default().generate(&map(&["E"], ""));
            world.apply(&blueprint, 0);
            let id = world.roster.iter().next().map(EnemyAgent::id).unwrap();
            assert!(world.nav.is_on_navigable_surface(id));
            assert_ne!(id, EntityId::new(0));
        }
    }

    proptest! {
        #[test]
        fn wall_panels_match_outside_sides(
            cells in prop::collection::vec(prop::sample::select(vec![' ', 'W', '.']), 16)
        ) {
            let rows: Vec<String> = cells.chunks(4).map(|c| c.iter().collect()).collect();
            let data = MapData {
                map_id: "prop".to_string(),
                tile_size: 1.0,
                layout: rows,
                portals: Vec::new(),
                floor_prefab_name: None,
                wall_prefab_name: None,
            };
            let grid = data.grid();
            let expected: usize = grid
                .tiles()
                .filter(|(_, _, kind)| kind.is_wall())
                .map(|(col, row, _)| grid.outside_sides(col, row).len())
                .filter(|n| *n <= 2)
                .sum();
            let blueprint = TileMapGenerator::default().generate(&data);
            prop_assert_eq!(blueprint.count(EntityTag::Wall), expected);
        }
    }
}
