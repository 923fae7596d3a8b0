//! Map fixtures and helpers for driving a [`Game`] in tests.

use glam::Vec3;

use crate::config::GameConfig;
use crate::entity::EntityId;
use crate::game::{Game, GameEvent};
use crate::map::MapRegistry;
use crate::player::{InputFrame, PlayerEvent};

/// Fixed tick length used by the scenarios.
pub const DT: f32 = 0.1;

// =============================================================================
// Map Fixtures
// =============================================================================

/// Builds a single-row map with the player at column 0 and one enemy at
/// `enemy_col`, one world unit per tile.
pub fn firing_range(enemy_col: usize) -> String {
    let mut row = vec!['.'; enemy_col + 1];
    row[0] = 'P';
    row[enemy_col] = 'E';
    let row: String = row.into_iter().collect();
    format!(r#"{{"mapId":"range","tileSize":1.0,"layout":["{row}"]}}"#)
}

/// A walled 10x10 room with one enemy in the middle.
pub fn patrol_room() -> String {
    let mut rows = Vec::new();
    rows.push("W".repeat(12));
    for row in 0..10 {
        let mut line = String::from("W");
        for col in 0..10 {
            line.push(match (row, col) {
                (1, 1) => 'P',
                (5, 5) => 'E',
                _ => '.',
            });
        }
        line.push('W');
        rows.push(line);
    }
    rows.push("W".repeat(12));
    let layout: Vec<String> = rows.iter().map(|r| format!("\"{r}\"")).collect();
    format!(
        r#"{{"mapId":"patrol","tileSize":1.0,"layout":[{}]}}"#,
        layout.join(",")
    )
}

/// Two maps linked by portal `1` in each direction.
///
/// Walking east from the player start in `west` enters the portal to
/// `east`, arriving at its portal cell.
pub fn linked_maps() -> [&'static str; 2] {
    [
        r#"{"mapId":"west","tileSize":2.0,"layout":["P1"],
            "portals":[{"triggerChar":"1","targetMapId":"east","targetSpawnId":1}]}"#,
        r#"{"mapId":"east","tileSize":2.0,"layout":["1P"],
            "portals":[{"triggerChar":"1","targetMapId":"west","targetSpawnId":0}]}"#,
    ]
}

// =============================================================================
// Game Setup
// =============================================================================

/// Config whose enemies hold still: patrol candidates all land on home.
pub fn stationary_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.patrol.radius = 0.0;
    config
}

/// Builds a game from map documents and loads `start` at spawn 0.
pub fn game_with(config: GameConfig, maps: &[&str], start: &str) -> Game {
    let registry = MapRegistry::from_json_strs(maps.iter().copied()).expect("fixture maps parse");
    let mut game = Game::new(config, registry);
    game.load_map(start, 0).expect("start map exists");
    game.take_events();
    game
}

/// Steps idle until the charge gauge is full.
pub fn charge_fully(game: &mut Game) {
    let mut guard = 0;
    while game.charge_ratio() < 1.0 {
        game.step(&InputFrame::idle(), DT);
        guard += 1;
        assert!(guard < 1000, "gauge never filled");
    }
}

/// Steps `n` ticks with the same input, collecting events.
pub fn run(game: &mut Game, input: &InputFrame, n: usize) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for _ in 0..n {
        game.step(input, DT);
        events.extend(game.take_events());
    }
    events
}

/// Player events among `events`.
pub fn player_events(events: &[GameEvent]) -> Vec<PlayerEvent> {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::Player(p) => Some(*p),
            _ => None,
        })
        .collect()
}

/// The only enemy in the game.
pub fn sole_enemy(game: &Game) -> EntityId {
    let ids: Vec<EntityId> = game.roster().iter().map(crate::agent::EnemyAgent::id).collect();
    assert_eq!(ids.len(), 1, "expected exactly one enemy");
    ids[0]
}

/// Every enemy's position, in id order.
pub fn enemy_positions(game: &Game) -> Vec<(EntityId, Vec3)> {
    game.roster().iter().map(|a| (a.id(), a.position())).collect()
}
