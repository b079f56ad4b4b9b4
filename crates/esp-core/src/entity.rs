//! World entities as seen by the overlay.
//!
//! The overlay never owns entities. A host exposes its live object table
//! through [`EntitySource`], and the filtering here is generic over the
//! [`Entity`] trait so hosts can hand out their own types.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::search::SearchState;

/// Trait for world objects the overlay can mark.
pub trait Entity {
    /// Display name as shown by the client.
    fn name(&self) -> &str;

    fn position(&self) -> Vec3;

    /// False for table slots the client is tearing down.
    fn is_valid(&self) -> bool;

    fn is_targetable(&self) -> bool;

    fn is_dead(&self) -> bool;
}

/// Read-only view over the entities loaded this frame.
pub trait EntitySource {
    type Entity: Entity;

    fn entities(&self) -> impl Iterator<Item = &Self::Entity>;
}

/// Names of whatever the player currently has targeted.
pub trait TargetSource {
    /// Mouse-over or tab-cycle target, preferred when present.
    fn soft_target_name(&self) -> Option<String>;

    fn hard_target_name(&self) -> Option<String>;

    fn current_target_name(&self) -> Option<String> {
        self.soft_target_name()
            .filter(|name| !name.is_empty())
            .or_else(|| self.hard_target_name().filter(|name| !name.is_empty()))
    }
}

/// Plain-data entity used by the simulator, the C ABI and tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub name: String,
    pub position: Vec3,
    #[serde(default = "default_true")]
    pub is_valid: bool,
    #[serde(default = "default_true")]
    pub is_targetable: bool,
    #[serde(default)]
    pub is_dead: bool,
}

fn default_true() -> bool {
    true
}

impl EntitySnapshot {
    /// A valid, targetable, living entity.
    pub fn new(name: impl Into<String>, position: Vec3) -> Self {
        Self {
            name: name.into(),
            position,
            is_valid: true,
            is_targetable: true,
            is_dead: false,
        }
    }

    pub fn dead(mut self) -> Self {
        self.is_dead = true;
        self
    }

    pub fn untargetable(mut self) -> Self {
        self.is_targetable = false;
        self
    }

    pub fn invalid(mut self) -> Self {
        self.is_valid = false;
        self
    }
}

impl Entity for EntitySnapshot {
    #[inline]
    fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    fn is_valid(&self) -> bool {
        self.is_valid
    }

    #[inline]
    fn is_targetable(&self) -> bool {
        self.is_targetable
    }

    #[inline]
    fn is_dead(&self) -> bool {
        self.is_dead
    }
}

impl EntitySource for [EntitySnapshot] {
    type Entity = EntitySnapshot;

    fn entities(&self) -> impl Iterator<Item = &EntitySnapshot> {
        self.iter()
    }
}

impl EntitySource for Vec<EntitySnapshot> {
    type Entity = EntitySnapshot;

    fn entities(&self) -> impl Iterator<Item = &EntitySnapshot> {
        self.iter()
    }
}

/// Whether the client would let the player interact with this entity at all.
#[inline]
pub fn is_eligible<E: Entity + ?Sized>(entity: &E) -> bool {
    entity.is_valid() && entity.is_targetable() && !entity.is_dead()
}

/// Eligible entities whose name matches the search, in source order.
pub fn filter_candidates<'a, E, I>(entities: I, search: &SearchState) -> impl Iterator<Item = &'a E>
where
    E: Entity + 'a,
    I: IntoIterator<Item = &'a E>,
{
    entities
        .into_iter()
        .filter(move |entity| is_eligible(*entity) && search.matches(entity.name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedTargets {
        soft: Option<&'static str>,
        hard: Option<&'static str>,
    }

    impl TargetSource for FixedTargets {
        fn soft_target_name(&self) -> Option<String> {
            self.soft.map(str::to_owned)
        }

        fn hard_target_name(&self) -> Option<String> {
            self.hard.map(str::to_owned)
        }
    }

    #[test]
    fn filter_keeps_only_eligible_matches() {
        let entities = vec![
            EntitySnapshot::new("Goblin", Vec3::ZERO),
            EntitySnapshot::new("Chest", Vec3::ZERO).dead(),
        ];
        let mut search = SearchState::new();
        search.set_substring("gob");

        let names: Vec<&str> = filter_candidates(entities.entities(), &search)
            .map(|e| e.name())
            .collect();
        assert_eq!(names, vec!["Goblin"]);
    }

    #[test]
    fn ineligible_entities_are_dropped_even_when_matching() {
        let entities = vec![
            EntitySnapshot::new("Goblin A", Vec3::ZERO).dead(),
            EntitySnapshot::new("Goblin B", Vec3::ZERO).untargetable(),
            EntitySnapshot::new("Goblin C", Vec3::ZERO).invalid(),
            EntitySnapshot::new("Goblin D", Vec3::ZERO),
        ];
        let mut search = SearchState::new();
        search.set_glob("goblin *").unwrap();

        let names: Vec<&str> = filter_candidates(&entities, &search)
            .map(|e| e.name())
            .collect();
        assert_eq!(names, vec!["Goblin D"]);
    }

    #[test]
    fn no_search_filters_everything_out() {
        let entities = vec![EntitySnapshot::new("Goblin", Vec3::ZERO)];
        let search = SearchState::new();
        assert_eq!(filter_candidates(&entities, &search).count(), 0);
    }

    #[test]
    fn soft_target_wins_over_hard_target() {
        let targets = FixedTargets {
            soft: Some("Imp"),
            hard: Some("Goblin"),
        };
        assert_eq!(targets.current_target_name().as_deref(), Some("Imp"));

        let targets = FixedTargets {
            soft: Some(""),
            hard: Some("Goblin"),
        };
        assert_eq!(targets.current_target_name().as_deref(), Some("Goblin"));

        let targets = FixedTargets {
            soft: None,
            hard: None,
        };
        assert_eq!(targets.current_target_name(), None);
    }

    #[test]
    fn snapshot_flags_default_from_json() {
        let entity: EntitySnapshot =
            serde_json::from_str(r#"{"name":"Goblin","position":[1.0,2.0,3.0]}"#).unwrap();
        assert!(is_eligible(&entity));
        assert_eq!(entity.position, Vec3::new(1.0, 2.0, 3.0));
    }
}
