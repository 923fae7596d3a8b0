//! The game loop.
//!
//! [`Game`] owns every collaborator and runs one tick per
//! [`Game::step`]:
//!
//! 1. **PLAYER**: movement, gravity, charge and aiming
//! 2. **COMBAT**: shots reported by the player are resolved
//! 3. **PORTALS**: at most one map load per tick
//! 4. **BRAINS**: enemy initialization and behavior ticks
//! 5. **NAVIGATION**: agents move
//! 6. **SYNC**: agent positions are copied into the arena
//! 7. **CLEANUP**: removed enemies are despawned and forgotten
//!
//! # Determinism
//!
//! Enemies are visited in id order and all randomness comes from one
//! `ChaCha8Rng` seeded from the config, so the same seed, maps and inputs
//! produce the same run.
//!
//! # Example
//!
//! ```
//! use delve_core::config::GameConfig;
//! use delve_core::game::Game;
//! use delve_core::map::MapRegistry;
//! use delve_core::player::InputFrame;
//!
//! let registry = MapRegistry::from_json_strs([
//!     r#"{"mapId":"hall","tileSize":4.0,"layout":["WWWW","WP.W","W.EW","WWWW"]}"#,
//! ]).unwrap();
//!
//! let mut game = Game::new(GameConfig::default(), registry);
//! game.load_map("hall", 0).unwrap();
//!
//! for _ in 0..40 {
//!     game.step(&InputFrame::idle(), 0.1);
//! }
//!
//! assert_eq!(game.tick(), 40);
//! assert_eq!(game.roster().len(), 1);
//! assert!(game.charge_ratio() >= 1.0);
//! ```

use std::fmt;

use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::agent::EnemyRoster;
use crate::arena::Arena;
use crate::combat::{CombatResolver, DamageOutcome};
use crate::config::GameConfig;
use crate::entity::{EntityId, EntityInner, PortalLink, Transform};
use crate::error::{CombatError, MapError};
use crate::map::{GenerationReport, Level, MapRegistry, PortalTracker, TileMapGenerator};
use crate::nav::{GridNavigation, Navigation};
use crate::player::{InputFrame, PlayerCombatController, PlayerEvent};
use crate::presentation::{Presentation, PresentationLog};

/// Something that happened during a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// The player controller changed mode or fired.
    Player(PlayerEvent),
    /// A shot landed.
    Damage(DamageOutcome),
    /// A shot could not be resolved.
    ShotFailed(CombatError),
    /// The player entered a portal.
    PortalEntered(PortalLink),
    /// A map was placed.
    MapLoaded(GenerationReport),
    /// A map load was requested for an unknown id.
    MapMissing(String),
    /// A map load failed for any other reason; the current level is kept.
    MapLoadFailed {
        /// Requested map.
        map_id: String,
        /// Rendered error.
        reason: String,
    },
    /// A defeated enemy was removed from the world.
    EnemyRemoved(EntityId),
}

/// Owns the world and drives it tick by tick.
pub struct Game<N: Navigation = GridNavigation, P: Presentation = PresentationLog> {
    config: GameConfig,
    arena: Arena,
    roster: EnemyRoster,
    registry: MapRegistry,
    generator: TileMapGenerator,
    resolver: Option<CombatResolver>,
    player: PlayerCombatController,
    nav: N,
    presentation: P,
    portals: PortalTracker,
    rng: ChaCha8Rng,
    tick: u64,
    events: Vec<GameEvent>,
}

impl<N: Navigation, P: Presentation> fmt::Debug for Game<N, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("tick", &self.tick)
            .field("current_map", &self.registry.current_map_id())
            .field("entities", &self.arena.entity_count())
            .field("enemies", &self.roster.len())
            .field("player", &self.player)
            .field("resolver", &self.resolver.is_some())
            .finish_non_exhaustive()
    }
}

impl Game {
    /// Creates a game with grid navigation and a recording presentation.
    #[must_use]
    pub fn new(config: GameConfig, registry: MapRegistry) -> Self {
        Self::with_presentation(config, registry, PresentationLog::new())
    }
}

impl<P: Presentation> Game<GridNavigation, P> {
    /// Creates a game with grid navigation and the given presentation sink.
    #[must_use]
    pub fn with_presentation(config: GameConfig, registry: MapRegistry, presentation: P) -> Self {
        Self::with_parts(
            config,
            registry,
            GridNavigation::new(),
            presentation,
            Some(CombatResolver::new()),
        )
    }
}

impl<N: Navigation, P: Presentation> Game<N, P> {
    /// Creates a game from explicit collaborators.
    ///
    /// The player entity is spawned immediately and persists across map
    /// loads. Passing no resolver makes enemies apply damage themselves.
    #[must_use]
    pub fn with_parts(
        config: GameConfig,
        registry: MapRegistry,
        nav: N,
        presentation: P,
        resolver: Option<CombatResolver>,
    ) -> Self {
        let mut arena = Arena::new();
        let player_id = arena.spawn(Transform::at(Vec3::ZERO), EntityInner::Player);
        let player = PlayerCombatController::new(player_id, Vec3::ZERO, config.player.clone());

        Self {
            generator: TileMapGenerator::from_config(&config),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            arena,
            roster: EnemyRoster::new(),
            registry,
            resolver,
            player,
            nav,
            presentation,
            portals: PortalTracker::new(),
            tick: 0,
            events: Vec::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Ticks run so far.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// The configuration the game was built with.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The entity registry.
    #[must_use]
    pub const fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Live enemies.
    #[must_use]
    pub const fn roster(&self) -> &EnemyRoster {
        &self.roster
    }

    /// The player controller.
    #[must_use]
    pub const fn player(&self) -> &PlayerCombatController {
        &self.player
    }

    /// The map registry.
    #[must_use]
    pub const fn registry(&self) -> &MapRegistry {
        &self.registry
    }

    /// Id of the active map.
    #[must_use]
    pub fn current_map_id(&self) -> Option<&str> {
        self.registry.current_map_id()
    }

    /// The navigation capability.
    #[must_use]
    pub const fn nav(&self) -> &N {
        &self.nav
    }

    /// The presentation sink.
    #[must_use]
    pub const fn presentation(&self) -> &P {
        &self.presentation
    }

    /// Mutable access to the presentation sink, for draining.
    pub fn presentation_mut(&mut self) -> &mut P {
        &mut self.presentation
    }

    /// Charge gauge fill ratio for the HUD.
    #[must_use]
    pub fn charge_ratio(&self) -> f32 {
        self.player.charge_ratio()
    }

    /// Takes the events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // =========================================================================
    // Map loading
    // =========================================================================

    /// Loads `map_id` and places the player at `spawn_number`.
    ///
    /// # Errors
    ///
    /// [`MapError::NotFound`] if the id is unknown; the world is unchanged.
    pub fn load_map(&mut self, map_id: &str, spawn_number: u32) -> Result<GenerationReport, MapError> {
        let mut level = Level {
            arena: &mut self.arena,
            roster: &mut self.roster,
            nav: &mut self.nav,
            player: &mut self.player,
        };
        let result = self
            .registry
            .load_map(map_id, spawn_number, &self.generator, &mut level);
        self.record_load(map_id, &result);
        result
    }

    /// Follows up a load attempt with its event.
    fn record_load(&mut self, map_id: &str, result: &Result<GenerationReport, MapError>) {
        match result {
            Ok(report) => {
                if let Some(target) = self.player.target() {
                    if self.roster.get(target).is_none() {
                        self.player.forget_target(target);
                    }
                }
                self.portals.reseed(&self.arena, self.player.position());
                self.events.push(GameEvent::MapLoaded(report.clone()));
            }
            Err(MapError::NotFound(id)) => self.events.push(GameEvent::MapMissing(id.clone())),
            Err(err) => {
                warn!(map = %map_id, error = %err, "map load failed, keeping current level");
                self.events.push(GameEvent::MapLoadFailed {
                    map_id: map_id.to_string(),
                    reason: err.to_string(),
                });
            }
        }
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Advances the game by `dt` seconds.
    pub fn step(&mut self, input: &InputFrame, dt: f32) {
        // PLAYER
        let player_events = self.player.update(input, dt, &self.roster);
        self.arena.set_position(self.player.id(), self.player.position());

        // COMBAT
        for event in player_events {
            if let PlayerEvent::Fired {
                target: Some(target),
                hit: true,
            } = event
            {
                self.resolve_shot(target);
            }
            self.events.push(GameEvent::Player(event));
        }

        // PORTALS
        if let Some(link) = self.portals.check(&self.arena, self.player.position()) {
            info!(
                map = %link.target_map_id,
                spawn = link.target_spawn_id,
                "portal crossed"
            );
            self.events.push(GameEvent::PortalEntered(link.clone()));
            // Failures are already reported as events; play continues on the current map.
            if let Err(err) = self.load_map(&link.target_map_id, link.target_spawn_id) {
                debug!(map = %link.target_map_id, error = %err, "portal load did not complete");
            }
        }

        // BRAINS
        for agent in self.roster.iter_mut() {
            agent.tick(&mut self.nav, &mut self.rng, dt);
        }

        // NAVIGATION
        self.nav.step(dt);

        // SYNC
        for agent in self.roster.iter_mut() {
            if let Some(position) = self.nav.position(agent.id()) {
                agent.set_position(position);
                self.arena.set_position(agent.id(), position);
            }
        }

        // CLEANUP
        for agent in self.roster.drain_removed() {
            let id = agent.id();
            self.arena.despawn(id);
            self.nav.remove_agent(id);
            self.player.forget_target(id);
            self.events.push(GameEvent::EnemyRemoved(id));
        }

        self.tick += 1;
    }

    fn resolve_shot(&mut self, target: EntityId) {
        let damage = self.config.enemy.shot_damage;
        let result = match self.roster.get_mut(target) {
            Some(agent) => agent.take_damage(damage, self.resolver.as_ref(), &mut self.presentation),
            None => Err(CombatError::UnknownTarget(target)),
        };
        match result {
            Ok(outcome) => self.events.push(GameEvent::Damage(outcome)),
            Err(err) => {
                warn!(entity = %target, error = %err, "shot could not be resolved");
                self.events.push(GameEvent::ShotFailed(err));
            }
        }
    }

    /// Stops the player and every enemy; pending timers never fire.
    pub fn shutdown(&mut self) {
        self.player.teardown();
        for id in self.roster.clear() {
            self.nav.remove_agent(id);
        }
    }
}
