// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural analyses over sections: tree validity, nesting depth, and selection roots.

use alloc::{vec, vec::Vec};
use hashbrown::{HashMap, HashSet};

use crate::forest::Forest;
use crate::types::{DepthReport, EntityId};

#[derive(Copy, Clone)]
enum Visit {
    /// Still on the expansion stack.
    Open,
    /// Fully expanded, with its depth.
    Done(usize),
}

impl Forest {
    /// Whether everything reachable from `root` forms a proper tree.
    ///
    /// Returns `false` as soon as any entity is reached a second time, which
    /// covers both a cycle and an entity listed under two sections (or twice
    /// under the same one). A leaf is trivially a tree.
    pub fn is_tree_pack(&self, root: EntityId) -> bool {
        let mut visited: HashSet<EntityId> = HashSet::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                return false;
            }
            stack.extend(self.children_of(node).iter().rev());
        }
        true
    }

    /// Longest chain of nested sections below and including `section`.
    ///
    /// A section with no section children has depth 1; each level of nesting
    /// adds one. Returns 0 when `section` is not a live section.
    ///
    /// Cycles are truncated silently; use [`Forest::section_max_depth_report`]
    /// to find out whether that happened.
    pub fn section_max_depth(&self, section: EntityId) -> usize {
        self.section_max_depth_report(section).depth
    }

    /// Like [`Forest::section_max_depth`], also reporting whether a cycle was cut.
    ///
    /// A section reached again while still being expanded counts as one level
    /// and is not expanded further. A section shared by several parents is
    /// expanded once and its depth reused.
    pub fn section_max_depth_report(&self, section: EntityId) -> DepthReport {
        if !self.is_section(section) {
            return DepthReport::default();
        }
        let mut visits: HashMap<EntityId, Visit> = HashMap::new();
        let mut cycle_detected = false;
        // (section, next child index, deepest child seen so far)
        let mut stack: Vec<(EntityId, usize, usize)> = vec![(section, 0, 0)];
        visits.insert(section, Visit::Open);
        let mut depth = 0;

        while let Some(frame) = stack.last_mut() {
            let (node, next, best) = *frame;
            let children = self.children_of(node);
            if let Some(&child) = children.get(next) {
                frame.1 += 1;
                if !self.is_section(child) {
                    continue;
                }
                match visits.get(&child).copied() {
                    Some(Visit::Open) => {
                        cycle_detected = true;
                        frame.2 = frame.2.max(1);
                    }
                    Some(Visit::Done(d)) => frame.2 = frame.2.max(d),
                    None => {
                        visits.insert(child, Visit::Open);
                        stack.push((child, 0, 0));
                    }
                }
            } else {
                stack.pop();
                let d = best + 1;
                visits.insert(node, Visit::Done(d));
                match stack.last_mut() {
                    Some(parent) => parent.2 = parent.2.max(d),
                    None => depth = d,
                }
            }
        }

        if cycle_detected {
            log::debug!(section:? = section, depth = depth; "nesting depth truncated by a cycle");
        }
        DepthReport {
            depth,
            cycle_detected,
        }
    }

    /// Sections from `sections` that are not a direct child of another one in the set.
    ///
    /// These are the roots of the sub-forest induced by the input. Input order
    /// is preserved and duplicates are dropped. Ids that are not live sections
    /// are ignored.
    pub fn shallower_sections(&self, sections: &[EntityId]) -> Vec<EntityId> {
        let mut seen: HashSet<EntityId> = HashSet::new();
        let candidates: Vec<EntityId> = sections
            .iter()
            .copied()
            .filter(|s| self.is_section(*s) && seen.insert(*s))
            .collect();
        let nested: HashSet<EntityId> = candidates
            .iter()
            .flat_map(|s| self.children_of(*s).iter().copied())
            .collect();
        candidates
            .into_iter()
            .filter(|s| !nested.contains(s))
            .collect()
    }

    /// Reduce a selection so nothing is represented twice.
    ///
    /// Returns the non-section entities of `entities` that are not inside any
    /// section of `entities` (at any depth), followed by the root sections of
    /// `entities` as computed by [`Forest::shallower_sections`].
    pub fn shallower_not_section_entities(&self, entities: &[EntityId]) -> Vec<EntityId> {
        let (sections, others): (Vec<EntityId>, Vec<EntityId>) = entities
            .iter()
            .copied()
            .filter(|e| self.is_alive(*e))
            .partition(|e| self.is_section(*e));
        let mut seen: HashSet<EntityId> = HashSet::new();
        let mut result: Vec<EntityId> = others
            .into_iter()
            .filter(|e| seen.insert(*e))
            .filter(|e| !sections.iter().any(|s| self.is_entity_in_section(*e, *s)))
            .collect();
        result.extend(self.shallower_sections(&sections));
        result
    }

    /// Flatten a mixed selection into every selected entity plus all descendants
    /// of selected sections.
    ///
    /// Each entity appears once, in depth-first pre-order of the input. Used
    /// when copying sections so that edges between their contents come along.
    pub fn all_entities_in_selection(&self, selected: &[EntityId]) -> Vec<EntityId> {
        let mut seen: HashSet<EntityId> = HashSet::new();
        let mut result = Vec::new();
        for &start in selected {
            let mut stack = vec![start];
            while let Some(node) = stack.pop() {
                if !self.is_alive(node) || !seen.insert(node) {
                    continue;
                }
                result.push(node);
                stack.extend(self.children_of(node).iter().rev());
            }
        }
        result
    }
}
