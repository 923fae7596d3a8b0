//! Enemy agents and the roster that owns them.
//!
//! An [`EnemyAgent`] owns its hit points and a behavior state machine and
//! talks to the world only through the [`Navigation`] it is handed each
//! tick.
//!
//! # Initialization
//!
//! A fresh agent waits for the navigation capability to report it standing
//! on the surface, for at most `nav_ready_timeout` seconds. If it is still
//! off the surface after that, one snap to the nearest navigable point is
//! attempted. Then the agent enters patrol. Behavior ticks start on the
//! following tick.
//!
//! # Removal
//!
//! [`EnemyAgent::die`] marks the agent removed and cancels the pending
//! navigation wait; the owner despawns it during cleanup. Calling it again
//! has no effect.

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec3;
use rand::RngCore;
use tracing::{info, warn};

use crate::ai::{AgentContext, AgentState, AgentStateMachine, PatrolSettings, PatrolState};
use crate::combat::{CombatResolver, Damageable, DamageOutcome, Targetable};
use crate::config::EnemyConfig;
use crate::entity::{Combatant, EntityId};
use crate::error::CombatError;
use crate::nav::Navigation;
use crate::player::TargetLookup;
use crate::presentation::Presentation;
use crate::timer::Countdown;

// =============================================================================
// Brain
// =============================================================================

/// Behavior half of an enemy: the state machine plus its parked states.
struct EnemyBrain {
    fsm: AgentStateMachine,
    patrol: Option<Box<AgentState>>,
    nav_ready: Countdown,
    snap_tolerance: f32,
    initialized: bool,
}

impl fmt::Debug for EnemyBrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnemyBrain")
            .field("state", &self.fsm.current().map(|s| s.name()))
            .field("nav_ready", &self.nav_ready)
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}

impl EnemyBrain {
    fn new(home: Vec3, config: &EnemyConfig, patrol: PatrolSettings) -> Self {
        Self {
            fsm: AgentStateMachine::new(),
            patrol: Some(Box::new(PatrolState::new(home, patrol))),
            nav_ready: Countdown::new(config.nav_ready_timeout),
            snap_tolerance: config.spawn_snap_tolerance,
            initialized: false,
        }
    }

    fn tick(&mut self, ctx: &mut AgentContext<'_>) {
        if self.initialized {
            self.fsm.tick(ctx);
            return;
        }
        if self.nav_ready.is_cancelled() {
            return;
        }

        let on_surface = ctx.nav.is_on_navigable_surface(ctx.entity);
        if !on_surface && !self.nav_ready.advance(ctx.delta_seconds) {
            return;
        }
        self.nav_ready.cancel();

        if !ctx.nav.is_on_navigable_surface(ctx.entity) {
            let snapped = ctx
                .nav
                .position(ctx.entity)
                .and_then(|p| ctx.nav.sample_nearest_navigable_point(p, self.snap_tolerance));
            if let Some(point) = snapped {
                ctx.nav.warp(ctx.entity, point);
            }
        }

        self.initialized = true;
        let patrol = self.patrol.take();
        self.patrol = self.fsm.change_state(patrol, ctx);
    }

    fn shutdown(&mut self) {
        self.nav_ready.cancel();
        self.fsm.clear();
        self.patrol = None;
    }
}

// =============================================================================
// EnemyAgent
// =============================================================================

/// A patrolling enemy with hit points.
///
/// # Example
///
/// ```
/// use delve_core::agent::EnemyAgent;
/// use delve_core::ai::PatrolSettings;
/// use delve_core::config::EnemyConfig;
/// use delve_core::entity::EntityId;
/// use delve_core::presentation::PresentationLog;
/// use glam::Vec3;
///
/// let mut enemy = EnemyAgent::new(
///     EntityId::new(3),
///     Vec3::ZERO,
///     &EnemyConfig::default(),
///     PatrolSettings::default(),
/// );
/// let mut log = PresentationLog::new();
///
/// // Without a resolver the agent handles damage itself.
/// enemy.take_damage(5, None, &mut log).unwrap();
/// assert_eq!(enemy.current_hp(), 0);
/// assert!(enemy.is_removed());
/// ```
#[derive(Debug)]
pub struct EnemyAgent {
    id: EntityId,
    combatant: Combatant,
    position: Vec3,
    brain: EnemyBrain,
    removed: bool,
}

impl EnemyAgent {
    /// Creates an agent at `position`, which becomes its patrol home.
    #[must_use]
    pub fn new(id: EntityId, position: Vec3, config: &EnemyConfig, patrol: PatrolSettings) -> Self {
        Self {
            id,
            combatant: Combatant::new(config.max_hp),
            position,
            brain: EnemyBrain::new(position, config, patrol),
            removed: false,
        }
    }

    /// The agent's entity id.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Last known position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Updates the cached position (from navigation).
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Current hit points.
    #[must_use]
    pub const fn current_hp(&self) -> i32 {
        self.combatant.current_hp()
    }

    /// Maximum hit points.
    #[must_use]
    pub const fn max_hp(&self) -> i32 {
        self.combatant.max_hp()
    }

    /// Sets hit points, clamped to `[0, max_hp]`. Never triggers defeat.
    pub fn set_current_hp(&mut self, hp: i32) {
        self.combatant.set_current_hp(hp);
    }

    /// True once the agent has entered its first behavior.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.brain.initialized
    }

    /// True once [`EnemyAgent::die`] has run.
    #[must_use]
    pub const fn is_removed(&self) -> bool {
        self.removed
    }

    /// Name of the active behavior, if any.
    #[must_use]
    pub fn current_state(&self) -> Option<&'static str> {
        self.brain.fsm.current().map(|s| s.name())
    }

    /// Takes `amount` damage.
    ///
    /// With a resolver the hit goes through [`CombatResolver::apply_damage`].
    /// Without one the agent falls back to mutating its own hit points and
    /// dying at 0; no damage or defeat notifications fire on that path.
    ///
    /// # Errors
    ///
    /// Propagates errors from the resolver.
    pub fn take_damage(
        &mut self,
        amount: i32,
        resolver: Option<&CombatResolver>,
        presentation: &mut dyn Presentation,
    ) -> Result<DamageOutcome, CombatError> {
        if let Some(resolver) = resolver {
            return resolver.apply_damage(Some(self), amount, None, presentation);
        }

        warn!(entity = %self.id, "no combat resolver, applying damage locally");
        let previous_hp = self.combatant.current_hp();
        let new_hp = previous_hp.saturating_sub(amount);
        self.combatant.set_current_hp(new_hp);
        let defeated = new_hp <= 0 && self.combatant.mark_defeated();
        if defeated {
            self.die(presentation);
        }
        Ok(DamageOutcome {
            target: self.id,
            previous_hp,
            new_hp: self.combatant.current_hp(),
            defeated,
        })
    }

    /// Removes the agent: plays the removal effect and stops all behavior.
    ///
    /// Returns `false` if the agent was already removed.
    pub fn die(&mut self, presentation: &mut dyn Presentation) -> bool {
        if self.removed {
            return false;
        }
        self.removed = true;
        self.brain.shutdown();
        presentation.notify_removed(self.id);
        info!(entity = %self.id, "enemy removed");
        true
    }

    /// Advances initialization or the active behavior.
    pub fn tick(&mut self, nav: &mut dyn Navigation, rng: &mut dyn RngCore, dt: f32) {
        if self.removed {
            return;
        }
        let mut ctx = AgentContext {
            entity: self.id,
            nav,
            rng,
            delta_seconds: dt,
        };
        self.brain.tick(&mut ctx);
    }
}

impl Targetable for EnemyAgent {
    fn target_id(&self) -> EntityId {
        self.id
    }

    fn world_position(&self) -> Vec3 {
        self.position
    }
}

impl Damageable for EnemyAgent {
    fn combatant(&self) -> &Combatant {
        &self.combatant
    }

    fn combatant_mut(&mut self) -> &mut Combatant {
        &mut self.combatant
    }

    fn on_defeated(&mut self, presentation: &mut dyn Presentation) {
        self.die(presentation);
    }
}

// =============================================================================
// Roster
// =============================================================================

/// Live enemies of the active map, keyed by entity id.
///
/// Iteration follows id order, which is also spawn order.
#[derive(Debug, Default)]
pub struct EnemyRoster {
    agents: BTreeMap<EntityId, EnemyAgent>,
}

impl EnemyRoster {
    /// Creates an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self {
            agents: BTreeMap::new(),
        }
    }

    /// Adds an agent, replacing any with the same id.
    pub fn insert(&mut self, agent: EnemyAgent) {
        self.agents.insert(agent.id(), agent);
    }

    /// Removes an agent.
    pub fn remove(&mut self, id: EntityId) -> Option<EnemyAgent> {
        self.agents.remove(&id)
    }

    /// Returns an agent by id.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&EnemyAgent> {
        self.agents.get(&id)
    }

    /// Returns an agent by id, mutably.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut EnemyAgent> {
        self.agents.get_mut(&id)
    }

    /// Iterates agents in id order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemyAgent> + '_ {
        self.agents.values()
    }

    /// Iterates agents mutably in id order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut EnemyAgent> + '_ {
        self.agents.values_mut()
    }

    /// Number of agents, removed ones included until cleanup.
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// True if the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Drops every agent without running removal effects.
    pub fn clear(&mut self) -> Vec<EntityId> {
        let ids: Vec<EntityId> = self.agents.keys().copied().collect();
        for agent in self.agents.values_mut() {
            agent.brain.shutdown();
        }
        self.agents.clear();
        ids
    }

    /// Takes out every agent marked removed, in id order.
    pub fn drain_removed(&mut self) -> Vec<EnemyAgent> {
        let ids: Vec<EntityId> = self
            .agents
            .values()
            .filter(|a| a.is_removed())
            .map(EnemyAgent::id)
            .collect();
        ids.into_iter()
            .filter_map(|id| self.agents.remove(&id))
            .collect()
    }
}

impl TargetLookup for EnemyRoster {
    fn nearest_target(&self, from: Vec3) -> Option<(EntityId, Vec3)> {
        let mut best: Option<(f32, EntityId, Vec3)> = None;
        for agent in self.agents.values().filter(|a| !a.is_removed()) {
            let distance = from.distance(agent.position());
            if best.map_or(true, |(d, _, _)| distance < d) {
                best = Some((distance, agent.id(), agent.position()));
            }
        }
        best.map(|(_, id, pos)| (id, pos))
    }

    fn target_position(&self, id: EntityId) -> Option<Vec3> {
        self.agents
            .get(&id)
            .filter(|a| !a.is_removed())
            .map(EnemyAgent::position)
    }
}
