// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stage storage: entity slots, section membership, and flag access.

use alloc::vec::Vec;
use kurbo::Rect;
use smallvec::SmallVec;

use crate::config::ForestConfig;
use crate::types::{EntityFlags, EntityId, EntityKind, LocalEntity};

pub(crate) type Children = SmallVec<[EntityId; 4]>;

/// All entities on a stage and the section membership between them.
///
/// Membership is the children list of each section and nothing else: the
/// geometry of a section is free to disagree with it (for example while a
/// section is collapsed, or in the middle of a drag).
///
/// The raw membership primitives [`Forest::attach`] and [`Forest::detach`]
/// accept any structure, including shared membership and cycles. Every query
/// in this crate stays total on such input. Use the checked operations such as
/// [`Forest::go_in_sections`] to keep the hierarchy a proper forest.
///
/// ## Example
///
/// ```rust
/// use kurbo::Rect;
/// use understory_section::{EntityKind, Forest, LocalEntity};
///
/// let mut forest = Forest::new();
/// let outer = forest.insert(
///     None,
///     EntityKind::Section,
///     LocalEntity {
///         bounds: Rect::new(0.0, 0.0, 400.0, 300.0),
///         ..LocalEntity::default()
///     },
/// );
/// let note = forest.insert(
///     Some(outer),
///     EntityKind::Leaf,
///     LocalEntity {
///         bounds: Rect::new(20.0, 40.0, 120.0, 80.0),
///         ..LocalEntity::default()
///     },
/// );
///
/// assert!(forest.is_entity_in_section(note, outer));
/// assert_eq!(forest.parent_sections(note), [outer]);
/// ```
pub struct Forest {
    /// slots
    entities: Vec<Option<Entity>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    next_order: u64,
    config: ForestConfig,
}

impl core::fmt::Debug for Forest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.entities.len();
        let alive = self.entities.iter().filter(|e| e.is_some()).count();
        let sections = self.sections().count();
        f.debug_struct("Forest")
            .field("entities_total", &total)
            .field("entities_alive", &alive)
            .field("sections", &sections)
            .field("free_list", &self.free_list.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for Forest {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Entity {
    generation: u32,
    pub(crate) local: LocalEntity,
    order: u64,
    /// `Some` exactly for sections.
    pub(crate) children: Option<Children>,
}

impl Forest {
    /// Create an empty forest with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ForestConfig::default())
    }

    /// Create an empty forest with the given configuration.
    pub fn with_config(config: ForestConfig) -> Self {
        Self {
            entities: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            next_order: 0,
            config,
        }
    }

    /// The configuration this forest was created with.
    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Insert a new entity, as a child of `parent` or at root level if `None`.
    ///
    /// A `parent` that is stale or not a section is ignored and the entity is
    /// placed at root level.
    pub fn insert(
        &mut self,
        parent: Option<EntityId>,
        kind: EntityKind,
        local: LocalEntity,
    ) -> EntityId {
        let order = self.stamp();
        let entity = Entity {
            generation: 1,
            local,
            order,
            children: match kind {
                EntityKind::Leaf => None,
                EntityKind::Section => Some(Children::new()),
            },
        };
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.entities[idx] = Some(Entity {
                generation,
                ..entity
            });
            (idx, generation)
        } else {
            self.entities.push(Some(entity));
            self.generations.push(1);
            (self.entities.len() - 1, 1)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "EntityId uses 32-bit indices by design."
        )]
        let id = EntityId::new(idx as u32, generation);
        if let Some(p) = parent
            && !self.attach(p, id)
        {
            log::debug!(parent:? = p, entity:? = id; "parent is not a live section, inserted at root level");
        }
        id
    }

    /// Remove an entity from the stage.
    ///
    /// The id is purged from every children list it appears in. When a section
    /// is removed its children stay on the stage at root level; use
    /// [`Forest::unpack_section`] to hand them to the section's parents instead.
    pub fn remove(&mut self, id: EntityId) {
        if !self.is_alive(id) {
            return;
        }
        for children in self.entities.iter_mut().flatten().filter_map(|e| e.children.as_mut()) {
            children.retain(|c| *c != id);
        }
        self.entities[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Append `child` to the children of `section`.
    ///
    /// Returns `false` (and changes nothing) when either id is stale, `section`
    /// is not a section, or `child` is already a direct member. The child's
    /// order stamp is refreshed on success.
    ///
    /// This does **not** check for cycles or shared membership. Callers are
    /// expected to validate with [`Forest::is_entity_in_section`] first, or to
    /// go through [`Forest::go_in_sections`].
    pub fn attach(&mut self, section: EntityId, child: EntityId) -> bool {
        if !self.is_alive(child) {
            return false;
        }
        let Some(children) = self.entity_mut(section).and_then(|e| e.children.as_mut()) else {
            return false;
        };
        if children.contains(&child) {
            return false;
        }
        children.push(child);
        let order = self.stamp();
        if let Some(e) = self.entity_mut(child) {
            e.order = order;
        }
        true
    }

    /// Remove `child` from the children of `section`.
    ///
    /// Returns whether `child` was a direct member.
    pub fn detach(&mut self, section: EntityId, child: EntityId) -> bool {
        let Some(children) = self.entity_mut(section).and_then(|e| e.children.as_mut()) else {
            return false;
        };
        let before = children.len();
        children.retain(|c| *c != child);
        children.len() != before
    }

    /// Turn a live leaf into an empty section, keeping its id, bounds, and flags.
    ///
    /// Returns `false` (and changes nothing) when `id` is stale or already a section.
    pub fn convert_to_section(&mut self, id: EntityId) -> bool {
        match self.entity_mut(id) {
            Some(e) if e.children.is_none() => {
                e.children = Some(Children::new());
                true
            }
            _ => false,
        }
    }

    /// Returns true if `id` refers to a live entity.
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entity(id).is_some()
    }

    /// Returns the kind of a live entity.
    pub fn kind(&self, id: EntityId) -> Option<EntityKind> {
        self.entity(id).map(|e| {
            if e.children.is_some() {
                EntityKind::Section
            } else {
                EntityKind::Leaf
            }
        })
    }

    /// Returns true if `id` is a live section.
    pub fn is_section(&self, id: EntityId) -> bool {
        self.entity(id).is_some_and(|e| e.children.is_some())
    }

    /// Returns the collision box of a live entity.
    pub fn bounds(&self, id: EntityId) -> Option<Rect> {
        self.entity(id).map(|e| e.local.bounds)
    }

    /// Update the collision box.
    pub fn set_bounds(&mut self, id: EntityId, bounds: Rect) {
        if let Some(e) = self.entity_mut(id) {
            e.local.bounds = bounds;
        }
    }

    /// Returns the flags of a live entity.
    pub fn flags(&self, id: EntityId) -> Option<EntityFlags> {
        self.entity(id).map(|e| e.local.flags)
    }

    /// Replace all flags.
    pub fn set_flags(&mut self, id: EntityId, flags: EntityFlags) {
        if let Some(e) = self.entity_mut(id) {
            e.local.flags = flags;
        }
    }

    /// Lock or unlock a section. Has no effect on leaves.
    pub fn set_locked(&mut self, id: EntityId, locked: bool) {
        if let Some(e) = self.entity_mut(id)
            && e.children.is_some()
        {
            e.local.flags.set(EntityFlags::LOCKED, locked);
        }
    }

    /// Collapse or expand a section. Has no effect on leaves.
    pub fn set_collapsed(&mut self, id: EntityId, collapsed: bool) {
        if let Some(e) = self.entity_mut(id)
            && e.children.is_some()
        {
            e.local.flags.set(EntityFlags::COLLAPSED, collapsed);
        }
    }

    /// Add or remove an entity from the selection.
    pub fn set_selected(&mut self, id: EntityId, selected: bool) {
        if let Some(e) = self.entity_mut(id) {
            e.local.flags.set(EntityFlags::SELECTED, selected);
        }
    }

    /// Whether `id` is a live section with its own lock set.
    ///
    /// This ignores locks on ancestors; see [`Forest::is_locked_by_section`].
    pub fn is_locked(&self, id: EntityId) -> bool {
        self.entity(id)
            .is_some_and(|e| e.children.is_some() && e.local.flags.contains(EntityFlags::LOCKED))
    }

    /// Whether `id` is a live, collapsed section.
    pub fn is_collapsed(&self, id: EntityId) -> bool {
        self.entity(id)
            .is_some_and(|e| e.children.is_some() && e.local.flags.contains(EntityFlags::COLLAPSED))
    }

    /// Direct members of a section, in insertion order.
    ///
    /// Empty for leaves and stale ids.
    pub fn children_of(&self, id: EntityId) -> &[EntityId] {
        self.entity(id)
            .and_then(|e| e.children.as_deref())
            .unwrap_or(&[])
    }

    /// Order stamp of a live entity.
    ///
    /// Stamps increase monotonically across the forest. An entity is stamped
    /// when inserted and again each time it is attached to a section, so a
    /// higher stamp means "placed more recently".
    pub fn order(&self, id: EntityId) -> Option<u64> {
        self.entity(id).map(|e| e.order)
    }

    /// Iterate all live entities in slot order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter().enumerate().filter_map(|(i, slot)| {
            let e = slot.as_ref()?;
            #[allow(
                clippy::cast_possible_truncation,
                reason = "EntityId uses 32-bit indices by design."
            )]
            let idx = i as u32;
            Some(EntityId::new(idx, e.generation))
        })
    }

    /// Iterate all live sections in slot order.
    pub fn sections(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities().filter(|id| self.is_section(*id))
    }

    /// Iterate all live entities with [`EntityFlags::SELECTED`] set.
    pub fn selected_entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities().filter(|id| {
            self.flags(*id)
                .is_some_and(|f| f.contains(EntityFlags::SELECTED))
        })
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.entities.len() - self.free_list.len()
    }

    /// Whether the forest has no live entities.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // --- internals ---

    pub(crate) fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities
            .get(id.idx())?
            .as_ref()
            .filter(|e| e.generation == id.1)
    }

    fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities
            .get_mut(id.idx())?
            .as_mut()
            .filter(|e| e.generation == id.1)
    }

    fn stamp(&mut self) -> u64 {
        let order = self.next_order;
        self.next_order += 1;
        order
    }
}
