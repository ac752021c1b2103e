// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_section --heading-base-level=0

//! Understory Section: the containment hierarchy behind nested canvas sections.
//!
//! On an infinite-canvas whiteboard, entities can be grouped into resizable
//! container boxes called sections, and sections can nest. This crate answers
//! the structural questions that drag-and-drop, lock enforcement, and copy
//! need answered before they touch anything:
//!
//! - Is this entity inside that section, at any depth? Which sections hold it?
//! - Which section does a drop at this point land in, when boxes overlap?
//! - Is this entity (or edge) frozen by a locked section above it?
//! - Is this subtree a proper tree, how deep does it nest, and which parts of
//!   a selection are already covered by a selected container?
//!
//! Membership is the explicit children list of each section. Geometry is only
//! used to find candidate sections under a point; it never decides who owns
//! whom. A collapsed section keeps its children even though they are not drawn.
//!
//! ## Malformed input
//!
//! The hierarchy is supposed to be a forest, and the checked operations in
//! this crate keep it one. The raw primitives ([`Forest::attach`],
//! [`Forest::detach`]) do not, so that corrupted state from elsewhere can be
//! represented. Every query stays total on such input: containment search
//! visits each section once and stops at
//! [`ForestConfig::max_search_depth`], and the depth metric cuts cycles and
//! reports them through [`DepthReport::cycle_detected`].
//!
//! ## API overview
//!
//! - [`Forest`]: stage storage; entities, section membership, flags.
//! - [`EntityId`]: generational handle of an entity.
//! - [`EntityKind`], [`LocalEntity`], [`EntityFlags`]: insertion data and state.
//! - [`ForestConfig`], [`AncestorOrder`]: search depth limit and ancestor ordering.
//! - [`StageObject`]: entities and edges, for lock checks.
//! - [`HierarchyError`], [`DropPlan`]: results of checked re-parenting.
//!
//! Key operations:
//! - Containment: [`Forest::is_entity_in_section`], [`Forest::parent_sections`],
//!   [`Forest::ancestor_sections`].
//! - Point location: [`Forest::sections_at_point`], [`Forest::deeper_sections`],
//!   [`Forest::entity_at_point`].
//! - Locks: [`Forest::is_locked_by_section`], [`Forest::has_locked_ancestor`].
//! - Metrics: [`Forest::is_tree_pack`], [`Forest::section_max_depth`],
//!   [`Forest::shallower_sections`], [`Forest::shallower_not_section_entities`],
//!   [`Forest::all_entities_in_selection`].
//! - Re-parenting: [`Forest::check_go_in`], [`Forest::go_in_sections`],
//!   [`Forest::go_out_section`], [`Forest::plan_drop`] / [`Forest::apply_drop`],
//!   [`Forest::pack_section`], [`Forest::unpack_section`], [`Forest::check_editable`].
//!
//! ## Example
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use understory_section::{DropPlan, EntityKind, Forest, LocalEntity, StageObject};
//!
//! let mut forest = Forest::new();
//! let boxed = |bounds| LocalEntity { bounds, ..LocalEntity::default() };
//!
//! let a = forest.insert(None, EntityKind::Section, boxed(Rect::new(0.0, 0.0, 300.0, 300.0)));
//! let b = forest.insert(Some(a), EntityKind::Section, boxed(Rect::new(50.0, 50.0, 150.0, 150.0)));
//! let note = forest.insert(None, EntityKind::Leaf, boxed(Rect::new(400.0, 0.0, 450.0, 20.0)));
//!
//! // Dropping inside B resolves to B, not to the enclosing A.
//! let plan = forest.plan_drop(&[note], Point::new(100.0, 100.0)).unwrap();
//! assert_eq!(plan, DropPlan::Into(vec![b]));
//! forest.apply_drop(&[note], &plan);
//! assert!(forest.is_entity_in_section(note, a));
//!
//! // Locking A freezes everything below it.
//! forest.set_locked(a, true);
//! assert!(forest.is_locked_by_section(StageObject::Entity(note)));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod config;
mod containment;
mod forest;
mod locate;
mod lock;
mod metrics;
mod reparent;
mod types;
mod util;

pub use config::{AncestorOrder, DEFAULT_MAX_SEARCH_DEPTH, ForestConfig};
pub use forest::Forest;
pub use lock::StageObject;
pub use reparent::{DropPlan, HierarchyError};
pub use types::{DepthReport, EntityFlags, EntityId, EntityKind, LocalEntity};
