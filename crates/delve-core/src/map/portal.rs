//! Portal trigger detection.

use std::collections::BTreeSet;

use glam::Vec3;

use crate::arena::Arena;
use crate::entity::{EntityId, EntityTag, PortalLink};

/// Tracks which portal triggers the player is standing in.
///
/// A portal fires when the player enters its box, not while it stays inside.
/// After a map load, [`PortalTracker::reseed`] records the triggers the
/// player was placed in so arriving on a portal does not bounce it back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortalTracker {
    inside: BTreeSet<EntityId>,
}

impl PortalTracker {
    /// Creates a tracker that is inside no trigger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Portals containing `position`, in id order.
    fn overlapping(arena: &Arena, position: Vec3) -> impl Iterator<Item = (EntityId, &PortalLink)> + '_ {
        arena
            .entities_tagged(EntityTag::Portal)
            .filter_map(move |entity| {
                let portal = entity.inner().as_portal()?;
                portal
                    .contains(entity.transform().position, position)
                    .then_some((entity.id(), &portal.link))
            })
    }

    /// Forgets previous overlaps and records the current ones.
    pub fn reseed(&mut self, arena: &Arena, position: Vec3) {
        self.inside = Self::overlapping(arena, position).map(|(id, _)| id).collect();
    }

    /// Updates overlaps and returns the link of the first portal entered
    /// since the last call.
    pub fn check(&mut self, arena: &Arena, position: Vec3) -> Option<PortalLink> {
        let mut entered = None;
        let mut now = BTreeSet::new();
        for (id, link) in Self::overlapping(arena, position) {
            if entered.is_none() && !self.inside.contains(&id) {
                entered = Some(link.clone());
            }
            now.insert(id);
        }
        self.inside = now;
        entered
    }

    /// True while the player overlaps `portal`.
    #[must_use]
    pub fn is_inside(&self, portal: EntityId) -> bool {
        self.inside.contains(&portal)
    }

    /// Forgets every overlap.
    pub fn clear(&mut self) {
        self.inside.clear();
    }
}
