// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lock propagation from sections to everything nested inside them.

use crate::forest::Forest;
use crate::types::EntityId;

/// Any object on the stage that a lock check can be asked about.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StageObject<'a> {
    /// A placeable entity (leaf or section).
    Entity(EntityId),
    /// An edge from `source` to `target`.
    DirectedEdge {
        /// Tail of the edge.
        source: EntityId,
        /// Head of the edge.
        target: EntityId,
    },
    /// An undirected edge joining any number of entities.
    MultiEdge(&'a [EntityId]),
    /// A stage object that references no entity.
    ///
    /// Never considered locked.
    Other,
}

impl Forest {
    /// Whether a lock on some section applies to `object`.
    ///
    /// - An entity is locked if it is itself a locked section, or if any
    ///   section containing it (at any depth) is locked.
    /// - A directed edge is locked if either endpoint has a locked ancestor.
    ///   An endpoint that is itself a locked section does not count.
    /// - A multi-target edge is locked if any of its entities has a locked ancestor.
    /// - [`StageObject::Other`] is never locked.
    ///
    /// Locks only flow downward: a locked child never locks its parent.
    pub fn is_locked_by_section(&self, object: StageObject<'_>) -> bool {
        match object {
            StageObject::Entity(id) => self.is_locked(id) || self.has_locked_ancestor(id),
            StageObject::DirectedEdge { source, target } => {
                self.has_locked_ancestor(source) || self.has_locked_ancestor(target)
            }
            StageObject::MultiEdge(entities) => {
                entities.iter().any(|e| self.has_locked_ancestor(*e))
            }
            StageObject::Other => false,
        }
    }

    /// Whether any section containing `entity` at any depth is locked.
    ///
    /// Same answer as checking [`Forest::ancestor_sections`] for a locked
    /// section, but only locked sections are searched.
    pub fn has_locked_ancestor(&self, entity: EntityId) -> bool {
        self.sections()
            .filter(|s| self.is_locked(*s))
            .any(|s| self.is_entity_in_section(entity, s))
    }
}
