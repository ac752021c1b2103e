// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural containment: "is this entity inside that section?" and ancestor lookup.

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use hashbrown::HashSet;

use crate::config::AncestorOrder;
use crate::forest::Forest;
use crate::types::EntityId;

impl Forest {
    /// Whether `entity` is a member of `section`, directly or through any
    /// chain of nested sections.
    ///
    /// Returns `false` when `section` is not a live section. The search is
    /// breadth-first and visits each section at most once, so it terminates on
    /// cyclic input. Sections nested deeper than
    /// [`ForestConfig::max_search_depth`](crate::ForestConfig::max_search_depth)
    /// are not searched; containment that is only reachable beyond that depth
    /// is reported as `false`.
    ///
    /// A section is not considered to contain itself unless the hierarchy is
    /// cyclic.
    pub fn is_entity_in_section(&self, entity: EntityId, section: EntityId) -> bool {
        if !self.is_section(section) {
            return false;
        }
        let max_depth = self.config().max_search_depth;
        let mut visited: HashSet<EntityId> = HashSet::new();
        let mut queue = VecDeque::from([(section, 0_usize)]);
        visited.insert(section);
        let mut pruned = false;

        while let Some((current, depth)) = queue.pop_front() {
            let children = self.children_of(current);
            if children.contains(&entity) {
                return true;
            }
            for &child in children {
                if !self.is_section(child) || !visited.insert(child) {
                    continue;
                }
                if depth + 1 > max_depth {
                    pruned = true;
                    continue;
                }
                queue.push_back((child, depth + 1));
            }
        }

        if pruned {
            log::debug!(
                entity:? = entity,
                section:? = section,
                max_depth = max_depth;
                "containment search hit the depth limit"
            );
        }
        false
    }

    /// Sections that list `entity` as a direct child.
    ///
    /// In a well-formed forest this has at most one element. Scans every section once.
    pub fn parent_sections(&self, entity: EntityId) -> Vec<EntityId> {
        self.sections()
            .filter(|s| self.children_of(*s).contains(&entity))
            .collect()
    }

    /// All sections that contain `entity` at any depth.
    ///
    /// The set is exactly `{ s | is_entity_in_section(entity, s) }`. Its order
    /// follows [`ForestConfig::ancestor_order`](crate::ForestConfig::ancestor_order);
    /// callers that need only membership (lock checks, for instance) should not
    /// depend on it.
    pub fn ancestor_sections(&self, entity: EntityId) -> Vec<EntityId> {
        let mut ancestors: Vec<EntityId> = self
            .sections()
            .filter(|s| self.is_entity_in_section(entity, *s))
            .collect();
        self.sort_ancestors(&mut ancestors);
        ancestors
    }

    fn sort_ancestors(&self, ancestors: &mut [EntityId]) {
        match self.config().ancestor_order {
            AncestorOrder::VerticalPosition => {
                let top = |id: &EntityId| self.bounds(*id).map_or(0.0, |r| r.y0.min(r.y1));
                ancestors.sort_by(|a, b| top(a).total_cmp(&top(b)));
                ancestors.reverse();
            }
            AncestorOrder::Nesting => {
                // Number of other ancestors enclosing each one; the innermost has the most.
                let enclosing: Vec<(EntityId, usize)> = ancestors
                    .iter()
                    .map(|&a| {
                        let n = ancestors
                            .iter()
                            .filter(|&&b| b != a && self.is_entity_in_section(a, b))
                            .count();
                        (a, n)
                    })
                    .collect();
                let key = |id: &EntityId| {
                    let n = enclosing
                        .iter()
                        .find(|(a, _)| a == id)
                        .map_or(0, |(_, n)| *n);
                    (n, self.order(*id).unwrap_or(0))
                };
                ancestors.sort_by_key(|id| core::cmp::Reverse(key(id)));
            }
        }
    }
}
