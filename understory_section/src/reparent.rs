// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Checked re-parenting: moving entities between sections without breaking the forest.
//!
//! The membership primitives on [`Forest`] accept anything. The operations
//! here validate a move against the containment and lock predicates first and
//! only mutate once the whole move is known to be legal, so a rejected move
//! leaves the hierarchy untouched.

use alloc::vec::Vec;
use kurbo::{Point, Rect};

use crate::forest::Forest;
use crate::lock::StageObject;
use crate::types::{EntityFlags, EntityId, EntityKind, LocalEntity};
use crate::util::union_bounds;

/// Why a hierarchy change was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    /// The id does not refer to a live entity.
    #[error("entity {0:?} is not on the stage")]
    StaleEntity(EntityId),
    /// The id was expected to be a section.
    #[error("entity {0:?} is not a section")]
    NotASection(EntityId),
    /// The destination is locked, directly or through an ancestor.
    #[error("section {0:?} is locked")]
    TargetLocked(EntityId),
    /// The entity being changed sits inside a locked section.
    #[error("entity {0:?} is inside a locked section")]
    SourceLocked(EntityId),
    /// A move into sections named no section to move into.
    #[error("no target section given")]
    NoTargetSections,
    /// A pack was asked to wrap no entities.
    #[error("nothing to pack")]
    EmptySelection,
    /// The move would nest a section inside itself.
    #[error("moving {moving:?} into {target:?} would nest a section inside itself")]
    WouldCreateCycle {
        /// The entity being moved.
        moving: EntityId,
        /// The section it was going to be moved into.
        target: EntityId,
    },
}

/// What a drop at a point resolves to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropPlan {
    /// Move into every listed section.
    Into(Vec<EntityId>),
    /// Turn the leaf under the point into a section and move into it.
    IntoNewSection(EntityId),
    /// Leave all current sections and go to root level.
    ToRoot,
}

impl Forest {
    /// Check whether `entities` may be moved into every section in `targets`.
    ///
    /// Checks run in this order, and the first failure is returned:
    /// 1. there is at least one target, every target is a live section, and
    ///    every entity is live;
    /// 2. no target is locked by a section (itself or an ancestor);
    /// 3. no entity is held by a locked ancestor. A section that is itself
    ///    locked may still be moved as a unit;
    /// 4. no entity is one of the targets, and no target is nested inside a
    ///    moving entity.
    pub fn check_go_in(
        &self,
        entities: &[EntityId],
        targets: &[EntityId],
    ) -> Result<(), HierarchyError> {
        if targets.is_empty() {
            return Err(HierarchyError::NoTargetSections);
        }
        for &target in targets {
            if !self.is_alive(target) {
                return Err(HierarchyError::StaleEntity(target));
            }
            if !self.is_section(target) {
                return Err(HierarchyError::NotASection(target));
            }
        }
        if let Some(&stale) = entities.iter().find(|e| !self.is_alive(**e)) {
            return Err(HierarchyError::StaleEntity(stale));
        }
        if let Some(&locked) = targets
            .iter()
            .find(|t| self.is_locked_by_section(StageObject::Entity(**t)))
        {
            return Err(HierarchyError::TargetLocked(locked));
        }
        self.check_movable(entities)?;
        for &moving in entities {
            for &target in targets {
                if moving == target || self.is_entity_in_section(target, moving) {
                    return Err(HierarchyError::WouldCreateCycle { moving, target });
                }
            }
        }
        Ok(())
    }

    /// Move `entities` out of their current sections and into every section in `targets`.
    ///
    /// Validated with [`Forest::check_go_in`] first; on error nothing changes.
    /// An empty `targets` is rejected; use [`DropPlan::ToRoot`] to leave every section.
    pub fn go_in_sections(
        &mut self,
        entities: &[EntityId],
        targets: &[EntityId],
    ) -> Result<(), HierarchyError> {
        if let Err(err) = self.check_go_in(entities, targets) {
            log::debug!(error:% = err; "rejected move into sections");
            return Err(err);
        }
        self.move_into(entities, targets);
        Ok(())
    }

    /// Take `entities` out of `section`.
    ///
    /// Entities that are not direct members of `section` are left alone.
    /// The moved entities end up at root level with respect to `section`;
    /// membership in other sections is not touched.
    pub fn go_out_section(
        &mut self,
        entities: &[EntityId],
        section: EntityId,
    ) -> Result<(), HierarchyError> {
        if !self.is_alive(section) {
            return Err(HierarchyError::StaleEntity(section));
        }
        if !self.is_section(section) {
            return Err(HierarchyError::NotASection(section));
        }
        if let Err(err) = self.check_movable(entities) {
            log::debug!(error:% = err; "rejected move out of section");
            return Err(err);
        }
        for &entity in entities {
            self.detach(section, entity);
        }
        Ok(())
    }

    /// Decide what dropping `selected` at `point` should do.
    ///
    /// A leaf under the point ([`Forest::entity_at_point`]) takes precedence:
    /// the drop turns it into a section and moves the selection into it. This
    /// is refused when the leaf is one of the moving entities or sits inside a
    /// moving section, since the section would end up nested in itself.
    ///
    /// Otherwise the targets are [`Forest::sections_at_point`]. With no target
    /// the drop means "leave every section"; with targets the move is
    /// validated with [`Forest::check_go_in`].
    pub fn plan_drop(
        &self,
        selected: &[EntityId],
        point: Point,
    ) -> Result<DropPlan, HierarchyError> {
        if let Some(leaf) = self
            .entity_at_point(point)
            .filter(|e| !self.is_section(*e))
        {
            self.check_drop_on_leaf(selected, leaf)?;
            return Ok(DropPlan::IntoNewSection(leaf));
        }
        let targets = self.sections_at_point(point);
        if targets.is_empty() {
            self.check_movable(selected)?;
            return Ok(DropPlan::ToRoot);
        }
        self.check_go_in(selected, &targets)?;
        Ok(DropPlan::Into(targets))
    }

    /// Carry out a plan produced by [`Forest::plan_drop`].
    ///
    /// The plan is not re-validated; apply it before anything else changes the hierarchy.
    pub fn apply_drop(&mut self, selected: &[EntityId], plan: &DropPlan) {
        match plan {
            DropPlan::Into(targets) => self.move_into(selected, targets),
            DropPlan::IntoNewSection(leaf) => {
                if self.convert_to_section(*leaf) {
                    self.move_into(selected, &[*leaf]);
                }
            }
            DropPlan::ToRoot => {
                for &entity in selected {
                    for parent in self.parent_sections(entity) {
                        self.detach(parent, entity);
                    }
                }
            }
        }
    }

    /// Wrap `entities` in a new section.
    ///
    /// An empty `entities` is rejected with [`HierarchyError::EmptySelection`].
    ///
    /// The new section's bounds are the union of the entities' bounds, and it
    /// is placed in every section that directly holds all of the entities (or
    /// at root level if there is none). The entities are then moved into it.
    pub fn pack_section(
        &mut self,
        entities: &[EntityId],
        flags: EntityFlags,
    ) -> Result<EntityId, HierarchyError> {
        if entities.is_empty() {
            return Err(HierarchyError::EmptySelection);
        }
        if let Some(&stale) = entities.iter().find(|e| !self.is_alive(**e)) {
            return Err(HierarchyError::StaleEntity(stale));
        }
        self.check_movable(entities)?;

        let mut shared: Vec<EntityId> = entities
            .first()
            .map(|e| self.parent_sections(*e))
            .unwrap_or_default();
        for &entity in entities.iter().skip(1) {
            let parents = self.parent_sections(entity);
            shared.retain(|p| parents.contains(p));
        }
        if let Some(&locked) = shared
            .iter()
            .find(|s| self.is_locked_by_section(StageObject::Entity(**s)))
        {
            return Err(HierarchyError::TargetLocked(locked));
        }

        let bounds = union_bounds(entities.iter().filter_map(|e| self.bounds(*e)))
            .unwrap_or(Rect::ZERO);
        let section = self.insert(None, EntityKind::Section, LocalEntity { bounds, flags });
        for &parent in &shared {
            self.attach(parent, section);
        }
        self.move_into(entities, &[section]);
        Ok(section)
    }

    /// Dissolve a section, handing its children to the section's own parents.
    ///
    /// Children of a root-level section become root-level. Returns the former children.
    pub fn unpack_section(&mut self, section: EntityId) -> Result<Vec<EntityId>, HierarchyError> {
        if !self.is_alive(section) {
            return Err(HierarchyError::StaleEntity(section));
        }
        if !self.is_section(section) {
            return Err(HierarchyError::NotASection(section));
        }
        if self.is_locked_by_section(StageObject::Entity(section)) {
            return Err(HierarchyError::SourceLocked(section));
        }
        let children: Vec<EntityId> = self.children_of(section).to_vec();
        let parents = self.parent_sections(section);
        self.remove(section);
        for &child in &children {
            for &parent in &parents {
                self.attach(parent, child);
            }
        }
        Ok(children)
    }

    /// Check that every section in `sections` may be edited (renamed, restyled).
    ///
    /// A section locked by itself or by an ancestor is read-only.
    pub fn check_editable(&self, sections: &[EntityId]) -> Result<(), HierarchyError> {
        match sections
            .iter()
            .find(|s| self.is_locked_by_section(StageObject::Entity(**s)))
        {
            Some(&locked) => Err(HierarchyError::SourceLocked(locked)),
            None => Ok(()),
        }
    }

    // --- internals ---

    fn check_movable(&self, entities: &[EntityId]) -> Result<(), HierarchyError> {
        for &entity in entities {
            let held = if self.is_section(entity) {
                self.has_locked_ancestor(entity)
            } else {
                self.is_locked_by_section(StageObject::Entity(entity))
            };
            if held {
                return Err(HierarchyError::SourceLocked(entity));
            }
        }
        Ok(())
    }

    fn check_drop_on_leaf(
        &self,
        selected: &[EntityId],
        leaf: EntityId,
    ) -> Result<(), HierarchyError> {
        if let Some(&stale) = selected.iter().find(|e| !self.is_alive(**e)) {
            return Err(HierarchyError::StaleEntity(stale));
        }
        if self.is_locked_by_section(StageObject::Entity(leaf)) {
            return Err(HierarchyError::TargetLocked(leaf));
        }
        self.check_movable(selected)?;
        if let Some(&moving) = selected
            .iter()
            .find(|m| **m == leaf || self.is_entity_in_section(leaf, **m))
        {
            return Err(HierarchyError::WouldCreateCycle {
                moving,
                target: leaf,
            });
        }
        Ok(())
    }

    fn move_into(&mut self, entities: &[EntityId], targets: &[EntityId]) {
        for &entity in entities {
            for parent in self.parent_sections(entity) {
                self.detach(parent, entity);
            }
            for &target in targets {
                self.attach(target, entity);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn insert(
        forest: &mut Forest,
        parent: Option<EntityId>,
        kind: EntityKind,
        bounds: Rect,
    ) -> EntityId {
        forest.insert(
            parent,
            kind,
            LocalEntity {
                bounds,
                ..LocalEntity::default()
            },
        )
    }

    fn unit(forest: &mut Forest, parent: Option<EntityId>, kind: EntityKind) -> EntityId {
        insert(forest, parent, kind, Rect::new(0.0, 0.0, 1.0, 1.0))
    }

    #[test]
    fn cannot_nest_section_inside_its_descendant() {
        let mut forest = Forest::new();
        let a = unit(&mut forest, None, EntityKind::Section);
        let b = unit(&mut forest, Some(a), EntityKind::Section);

        assert!(forest.is_entity_in_section(b, a));
        assert_eq!(
            forest.go_in_sections(&[a], &[b]),
            Err(HierarchyError::WouldCreateCycle {
                moving: a,
                target: b
            })
        );
        assert_eq!(forest.children_of(b), &[] as &[EntityId], "rejected moves change nothing");
        assert!(forest.is_tree_pack(a));
    }

    #[test]
    fn cannot_nest_section_inside_itself() {
        let mut forest = Forest::new();
        let a = unit(&mut forest, None, EntityKind::Section);
        assert_eq!(
            forest.check_go_in(&[a], &[a]),
            Err(HierarchyError::WouldCreateCycle {
                moving: a,
                target: a
            })
        );
    }

    #[test]
    fn go_in_moves_out_of_old_parent() {
        let mut forest = Forest::new();
        let a = unit(&mut forest, None, EntityKind::Section);
        let b = unit(&mut forest, None, EntityKind::Section);
        let x = unit(&mut forest, Some(a), EntityKind::Leaf);

        forest.go_in_sections(&[x], &[b]).unwrap();
        assert_eq!(forest.parent_sections(x), vec![b]);
        assert!(forest.children_of(a).is_empty());
    }

    #[test]
    fn locked_target_is_rejected() {
        let mut forest = Forest::new();
        let a = unit(&mut forest, None, EntityKind::Section);
        let b = unit(&mut forest, Some(a), EntityKind::Section);
        let x = unit(&mut forest, None, EntityKind::Leaf);
        forest.set_locked(a, true);
        assert_eq!(
            forest.go_in_sections(&[x], &[b]),
            Err(HierarchyError::TargetLocked(b)),
            "b inherits a's lock"
        );
    }

    #[test]
    fn locked_section_moves_as_unit_but_contents_stay() {
        let mut forest = Forest::new();
        let a = unit(&mut forest, None, EntityKind::Section);
        let x = unit(&mut forest, Some(a), EntityKind::Leaf);
        let dest = unit(&mut forest, None, EntityKind::Section);
        forest.set_locked(a, true);

        assert_eq!(
            forest.check_go_in(&[x], &[dest]),
            Err(HierarchyError::SourceLocked(x))
        );
        forest.go_in_sections(&[a], &[dest]).unwrap();
        assert_eq!(forest.parent_sections(a), vec![dest]);

        // Once its new parent is locked, a is held in place.
        let outer = unit(&mut forest, None, EntityKind::Section);
        forest.set_locked(dest, true);
        assert_eq!(
            forest.check_go_in(&[a], &[outer]),
            Err(HierarchyError::SourceLocked(a))
        );
    }

    #[test]
    fn stale_and_leaf_targets() {
        let mut forest = Forest::new();
        let x = unit(&mut forest, None, EntityKind::Leaf);
        let y = unit(&mut forest, None, EntityKind::Leaf);
        let gone = unit(&mut forest, None, EntityKind::Section);
        forest.remove(gone);
        assert_eq!(forest.check_go_in(&[x], &[y]), Err(HierarchyError::NotASection(y)));
        assert_eq!(forest.check_go_in(&[x], &[gone]), Err(HierarchyError::StaleEntity(gone)));
    }

    #[test]
    fn go_out_detaches_only_from_given_section() {
        let mut forest = Forest::new();
        let a = unit(&mut forest, None, EntityKind::Section);
        let b = unit(&mut forest, Some(a), EntityKind::Section);
        let x = unit(&mut forest, Some(b), EntityKind::Leaf);
        forest.go_out_section(&[x], b).unwrap();
        assert!(forest.parent_sections(x).is_empty());
        assert!(!forest.is_entity_in_section(x, a));

        forest.set_locked(a, true);
        assert_eq!(forest.go_out_section(&[b], a), Err(HierarchyError::SourceLocked(b)));
    }

    #[test]
    fn drop_into_innermost_section() {
        let mut forest = Forest::new();
        let a = insert(&mut forest, None, EntityKind::Section, Rect::new(0.0, 0.0, 300.0, 300.0));
        let b = insert(&mut forest, Some(a), EntityKind::Section, Rect::new(100.0, 100.0, 200.0, 200.0));
        let x = insert(&mut forest, None, EntityKind::Leaf, Rect::new(400.0, 0.0, 420.0, 20.0));

        let plan = forest.plan_drop(&[x], Point::new(150.0, 150.0)).unwrap();
        assert_eq!(plan, DropPlan::Into(vec![b]));
        forest.apply_drop(&[x], &plan);
        assert_eq!(forest.parent_sections(x), vec![b]);

        let plan = forest.plan_drop(&[x], Point::new(500.0, 500.0)).unwrap();
        assert_eq!(plan, DropPlan::ToRoot);
        forest.apply_drop(&[x], &plan);
        assert!(forest.parent_sections(x).is_empty());
    }

    #[test]
    fn drop_section_into_own_descendant_is_rejected() {
        let mut forest = Forest::new();
        let a = insert(&mut forest, None, EntityKind::Section, Rect::new(0.0, 0.0, 300.0, 300.0));
        let b = insert(&mut forest, Some(a), EntityKind::Section, Rect::new(100.0, 100.0, 200.0, 200.0));
        assert_eq!(
            forest.plan_drop(&[a], Point::new(150.0, 150.0)),
            Err(HierarchyError::WouldCreateCycle { moving: a, target: b })
        );
    }

    #[test]
    fn drop_on_leaf_turns_it_into_a_section() {
        let mut forest = Forest::new();
        let a = insert(&mut forest, None, EntityKind::Section, Rect::new(0.0, 0.0, 300.0, 300.0));
        let note = insert(&mut forest, Some(a), EntityKind::Leaf, Rect::new(10.0, 10.0, 50.0, 30.0));
        let s = insert(&mut forest, None, EntityKind::Section, Rect::new(400.0, 0.0, 500.0, 100.0));
        let y = insert(&mut forest, None, EntityKind::Leaf, Rect::new(600.0, 0.0, 620.0, 20.0));

        let plan = forest.plan_drop(&[s, y], Point::new(20.0, 20.0)).unwrap();
        assert_eq!(plan, DropPlan::IntoNewSection(note));
        forest.apply_drop(&[s, y], &plan);

        assert!(forest.is_section(note));
        assert_eq!(forest.children_of(note), &[s, y]);
        assert_eq!(forest.parent_sections(note), vec![a], "the new section keeps its place");
        assert!(forest.is_entity_in_section(s, a));
        assert!(forest.is_tree_pack(a));
    }

    #[test]
    fn drop_on_leaf_inside_moving_section_is_rejected() {
        let mut forest = Forest::new();
        let s = insert(&mut forest, None, EntityKind::Section, Rect::new(0.0, 0.0, 300.0, 300.0));
        let b = insert(&mut forest, Some(s), EntityKind::Section, Rect::new(20.0, 20.0, 200.0, 200.0));
        let note = insert(&mut forest, Some(b), EntityKind::Leaf, Rect::new(40.0, 40.0, 80.0, 60.0));

        assert_eq!(
            forest.plan_drop(&[s], Point::new(50.0, 50.0)),
            Err(HierarchyError::WouldCreateCycle {
                moving: s,
                target: note
            })
        );
        assert_eq!(
            forest.plan_drop(&[note], Point::new(50.0, 50.0)),
            Err(HierarchyError::WouldCreateCycle {
                moving: note,
                target: note
            }),
            "a leaf cannot be dropped onto itself"
        );
        assert!(!forest.is_section(note), "rejected drops change nothing");
    }

    #[test]
    fn drop_on_leaf_in_locked_section_is_rejected() {
        let mut forest = Forest::new();
        let a = insert(&mut forest, None, EntityKind::Section, Rect::new(0.0, 0.0, 300.0, 300.0));
        let note = insert(&mut forest, Some(a), EntityKind::Leaf, Rect::new(10.0, 10.0, 50.0, 30.0));
        let x = insert(&mut forest, None, EntityKind::Leaf, Rect::new(400.0, 0.0, 420.0, 20.0));
        forest.set_locked(a, true);
        assert_eq!(
            forest.plan_drop(&[x], Point::new(20.0, 20.0)),
            Err(HierarchyError::TargetLocked(note))
        );
    }

    #[test]
    fn go_in_without_targets_is_rejected() {
        let mut forest = Forest::new();
        let a = unit(&mut forest, None, EntityKind::Section);
        let x = unit(&mut forest, Some(a), EntityKind::Leaf);
        assert_eq!(forest.go_in_sections(&[x], &[]), Err(HierarchyError::NoTargetSections));
        assert_eq!(forest.parent_sections(x), vec![a], "rejected moves change nothing");
    }

    #[test]
    fn pack_with_nothing_is_rejected() {
        let mut forest = Forest::new();
        assert_eq!(
            forest.pack_section(&[], EntityFlags::empty()),
            Err(HierarchyError::EmptySelection)
        );
        assert_eq!(forest.sections().count(), 0);
        assert!(forest.is_empty());
    }

    #[test]
    fn pack_places_new_section_under_shared_parent() {
        let mut forest = Forest::new();
        let a = insert(&mut forest, None, EntityKind::Section, Rect::new(0.0, 0.0, 500.0, 500.0));
        let x = insert(&mut forest, Some(a), EntityKind::Leaf, Rect::new(10.0, 10.0, 20.0, 20.0));
        let y = insert(&mut forest, Some(a), EntityKind::Leaf, Rect::new(50.0, 40.0, 60.0, 80.0));

        let s = forest.pack_section(&[x, y], EntityFlags::empty()).unwrap();
        assert_eq!(forest.children_of(a), &[s]);
        assert_eq!(forest.children_of(s), &[x, y]);
        assert_eq!(forest.bounds(s), Some(Rect::new(10.0, 10.0, 60.0, 80.0)));
        assert_eq!(forest.section_max_depth(a), 2);
    }

    #[test]
    fn pack_inside_locked_section_is_rejected() {
        let mut forest = Forest::new();
        let a = unit(&mut forest, None, EntityKind::Section);
        let x = unit(&mut forest, Some(a), EntityKind::Leaf);
        forest.set_locked(a, true);
        assert_eq!(
            forest.pack_section(&[x], EntityFlags::empty()),
            Err(HierarchyError::SourceLocked(x))
        );
        assert_eq!(forest.sections().count(), 1);
    }

    #[test]
    fn unpack_hands_children_to_parent() {
        let mut forest = Forest::new();
        let a = unit(&mut forest, None, EntityKind::Section);
        let b = unit(&mut forest, Some(a), EntityKind::Section);
        let x = unit(&mut forest, Some(b), EntityKind::Leaf);
        let y = unit(&mut forest, Some(b), EntityKind::Leaf);

        assert_eq!(forest.unpack_section(b), Ok(vec![x, y]));
        assert!(!forest.is_alive(b));
        assert_eq!(forest.children_of(a), &[x, y]);

        assert_eq!(forest.unpack_section(a), Ok(vec![x, y]));
        assert!(forest.parent_sections(x).is_empty());
        assert_eq!(forest.unpack_section(x), Err(HierarchyError::NotASection(x)));
    }

    #[test]
    fn editing_locked_sections_is_rejected() {
        let mut forest = Forest::new();
        let a = unit(&mut forest, None, EntityKind::Section);
        let b = unit(&mut forest, Some(a), EntityKind::Section);
        let c = unit(&mut forest, None, EntityKind::Section);
        assert_eq!(forest.check_editable(&[b, c]), Ok(()));
        forest.set_locked(a, true);
        assert_eq!(forest.check_editable(&[c, b]), Err(HierarchyError::SourceLocked(b)));
    }

    #[test]
    fn errors_render() {
        let a = EntityId::new(3, 1);
        let msg = alloc::format!("{}", HierarchyError::TargetLocked(a));
        assert!(msg.contains("locked"), "unexpected message: {msg}");
    }
}
