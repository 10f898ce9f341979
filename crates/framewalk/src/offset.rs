//! Offset-ancestor search and the small layout facts derived from it.

use crate::geom::{Size, Vector, size, vector};
use crate::provider::{ComputedGeometry, Document, NodeKind, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetInfo<N> {
    /// Nearest ancestor establishing a local frame, or the body.
    pub offset_parent: N,
    /// The search passed `last_parent` or ran out of ancestors.
    pub is_end: bool,
}

/// Finds the offset ancestor of `el`.
///
/// The search starts at `el`'s parent, or at `el` itself when `include_self` is set, and stops
/// at the body, at an `<svg>`, at a non-static node or at a transformed node.
pub fn offset_info<D: Document>(
    doc: &D,
    el: Option<D::Node>,
    last_parent: Option<D::Node>,
    include_self: bool,
) -> OffsetInfo<D::Node> {
    let body = doc.body();
    let mut target = match el {
        Some(n) if !include_self => doc.parent(n),
        other => other,
    };
    let mut is_end = el == last_parent || target == last_parent;

    while let Some(t) = target {
        if t == body {
            break;
        }
        if Some(t) == last_parent {
            is_end = true;
        }
        let style = doc.computed_geometry(t);
        if doc.kind(t) == NodeKind::Svg
            || style.position != Position::Static
            || style.has_transform()
        {
            break;
        }
        target = doc.parent(t);
    }

    OffsetInfo {
        offset_parent: target.unwrap_or(body),
        is_end: is_end || target.is_none() || target == Some(body),
    }
}

/// Margin the body adds to offsets measured against it.
///
/// Only applies when the body is positioned, or unconditionally for SVG content. An absolutely
/// positioned node with a non-auto inset on an axis is placed against the body's padding edge,
/// so that axis gets no margin.
pub fn body_offset<D: Document>(doc: &D, style: &ComputedGeometry, is_svg: bool) -> Vector {
    let body_style = doc.computed_geometry(doc.body());
    if !is_svg && body_style.position == Position::Static {
        return Vector::zero();
    }
    let mut margin = vector(body_style.margin.left.trunc(), body_style.margin.top.trunc());

    if style.position == Position::Absolute {
        if style.inset.top.is_some() || style.inset.bottom.is_some() {
            margin.y = 0.0;
        }
        if style.inset.left.is_some() || style.inset.right.is_some() {
            margin.x = 0.0;
        }
    }
    margin
}

/// Border-box size used for projection.
///
/// HTML elements report their offset size, SVG content its local bbox, and `<svg>` its client
/// size plus borders.
pub fn element_size<D: Document>(doc: &D, node: D::Node) -> Size {
    if let Some(offset) = doc.offset_box(node) {
        return size(offset.width, offset.height);
    }
    if doc.kind(node) != NodeKind::Svg {
        return doc
            .local_bbox(node)
            .map(|bbox| size(bbox.width, bbox.height))
            .unwrap_or_else(Size::zero);
    }
    let client = doc.client_box(node);
    let border = doc.computed_geometry(node).border;
    size(
        client.width + border.left + border.right,
        client.height + border.top + border.bottom,
    )
}
