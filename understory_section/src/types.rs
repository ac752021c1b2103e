// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the section forest: entity identifiers, kinds, flags, and local geometry.

use kurbo::Rect;

/// Identifier for an entity on the stage (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct EntityId(pub(crate) u32, pub(crate) u32);

impl EntityId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// What an entity is.
///
/// Only sections own children. Everything else placeable on the stage
/// (text nodes, images, pen strokes with a bounding box) is a leaf.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub enum EntityKind {
    /// A placeable entity with no membership of its own.
    #[default]
    Leaf,
    /// A container that owns an ordered list of child entities.
    Section,
}

bitflags::bitflags! {
    /// Per-entity state flags.
    ///
    /// [`LOCKED`](Self::LOCKED) and [`COLLAPSED`](Self::COLLAPSED) are only
    /// meaningful on sections and are ignored on leaves.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct EntityFlags: u8 {
        /// Entity is part of the current selection.
        const SELECTED           = 0b0000_0001;
        /// Section is locked; the lock applies to everything nested inside it.
        const LOCKED             = 0b0000_0010;
        /// Section is collapsed and does not take part in point location.
        const COLLAPSED          = 0b0000_0100;
        /// Entity sits inside a collapsed section and is not drawn.
        const HIDDEN_BY_COLLAPSE = 0b0000_1000;
    }
}

impl Default for EntityFlags {
    fn default() -> Self {
        Self::empty()
    }
}

impl EntityFlags {
    /// Whether an entity with these flags is shown on the stage.
    pub fn is_shown(self) -> bool {
        !self.intersects(Self::COLLAPSED | Self::HIDDEN_BY_COLLAPSE)
    }
}

/// Insertion data for an entity.
#[derive(Clone, Debug, Default)]
pub struct LocalEntity {
    /// World-space collision box.
    ///
    /// For sections this generally encloses the children, but nothing
    /// relies on it: membership is only ever read from the children list.
    pub bounds: Rect,
    /// Selection, lock, and collapse state.
    pub flags: EntityFlags,
}

/// Result of [`Forest::section_max_depth_report`](crate::Forest::section_max_depth_report).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct DepthReport {
    /// Longest chain of nested sections, counting the queried section as 1.
    pub depth: usize,
    /// A section was reached again while it was still being expanded.
    ///
    /// The depth is truncated at that point instead of looping.
    pub cycle_detected: bool,
}
