// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point location: which sections does a world-space point land in.

use alloc::vec::Vec;
use kurbo::Point;

use crate::forest::Forest;
use crate::types::EntityId;
use crate::util::contains_point;

impl Forest {
    /// Innermost shown sections whose collision box contains `point`.
    ///
    /// Collapsed sections and sections hidden by a collapsed ancestor are
    /// skipped. Among the remaining candidates, any section that structurally
    /// contains another candidate is dropped (see [`Forest::deeper_sections`]).
    ///
    /// Edges are inclusive: a point on a border is inside the box.
    pub fn sections_at_point(&self, point: Point) -> Vec<EntityId> {
        let candidates: Vec<EntityId> = self
            .sections()
            .filter(|s| {
                let Some(e) = self.entity(*s) else {
                    return false;
                };
                e.local.flags.is_shown() && contains_point(e.local.bounds, point)
            })
            .collect();
        self.deeper_sections(&candidates)
    }

    /// The shown entity drawn on top at `point`, if any.
    ///
    /// Leaves are drawn over section backgrounds, so a leaf under the point
    /// wins over any section. Among entities of the same kind the most
    /// recently placed one (highest [`Forest::order`]) wins.
    pub fn entity_at_point(&self, point: Point) -> Option<EntityId> {
        self.entities()
            .filter_map(|id| {
                let e = self.entity(id)?;
                (e.local.flags.is_shown() && contains_point(e.local.bounds, point))
                    .then(|| (e.children.is_none(), self.order(id).unwrap_or(0), id))
            })
            .max_by_key(|(is_leaf, order, _)| (*is_leaf, *order))
            .map(|(_, _, id)| id)
    }

    /// Remove every candidate that structurally contains another candidate.
    ///
    /// For each ordered pair `(i, j)`, if `i` is inside `j` and `j` is not
    /// inside `i`, `j` is an outer section and is excluded. Candidates that
    /// merely overlap on screen without any membership relation are all kept;
    /// resolving that ambiguity is up to the caller.
    ///
    /// Order of the input is preserved. This is quadratic in the number of
    /// candidates, which is expected to be the handful of sections under a point.
    pub fn deeper_sections(&self, candidates: &[EntityId]) -> Vec<EntityId> {
        let mut outer: Vec<EntityId> = Vec::new();
        for &i in candidates {
            for &j in candidates {
                if i == j || outer.contains(&j) {
                    continue;
                }
                if self.is_entity_in_section(i, j) && !self.is_entity_in_section(j, i) {
                    outer.push(j);
                }
            }
        }
        candidates
            .iter()
            .copied()
            .filter(|s| !outer.contains(s))
            .collect()
    }
}
