// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Rect};

/// Point-in-rectangle test with edges included.
///
/// `Rect::contains` is half-open; a drop exactly on a section's right or
/// bottom border should still land inside it.
pub(crate) fn contains_point(rect: Rect, point: Point) -> bool {
    let r = rect.abs();
    point.x >= r.x0 && point.x <= r.x1 && point.y >= r.y0 && point.y <= r.y1
}

/// Union of all rectangles, or `None` for an empty input.
pub(crate) fn union_bounds(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
    let mut it = rects.into_iter();
    let first = it.next()?;
    Some(it.fold(first, |acc, r| acc.union(r)))
}
