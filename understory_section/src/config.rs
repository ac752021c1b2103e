// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Forest configuration.

/// Default nesting depth at which containment search stops expanding.
pub const DEFAULT_MAX_SEARCH_DEPTH: usize = 996;

/// How [`Forest::ancestor_sections`](crate::Forest::ancestor_sections) orders its result.
///
/// The set of returned sections is the same under every policy; only the order differs.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum AncestorOrder {
    /// Sort by the top edge of each section's bounds, lowest on screen first.
    ///
    /// Nested boxes usually start below their container's top edge, so this
    /// tends to put the innermost section first. It is a screen-space
    /// approximation and can be wrong when boxes are moved around freely.
    #[default]
    VerticalPosition,
    /// Innermost to outermost by structural nesting.
    ///
    /// Sections that are not nested within each other (possible when an entity
    /// belongs to several sections) are ordered by their order stamp, newest first.
    Nesting,
}

/// Tuning knobs for a [`Forest`](crate::Forest).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ForestConfig {
    /// Deepest level of nested sections containment search will expand.
    ///
    /// The queried section is level 0. Sections nested deeper than this are
    /// not searched and are reported as not containing the entity. This only
    /// matters for malformed or absurdly deep hierarchies.
    pub max_search_depth: usize,
    /// Ordering policy for ancestor lists.
    pub ancestor_order: AncestorOrder,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            max_search_depth: DEFAULT_MAX_SEARCH_DEPTH,
            ancestor_order: AncestorOrder::default(),
        }
    }
}
