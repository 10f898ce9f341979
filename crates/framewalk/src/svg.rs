//! `<svg>` viewport mapping and the bbox-based offset of SVG content.

use crate::geom::{Point, Vector, point, vector};
use crate::matrix::{Dimension, Matrix};
use crate::provider::Document;
use svgtypes::Align;

/// The viewBox actually in effect: a missing or zero-sized viewBox falls back to the client box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub client_width: f64,
    pub client_height: f64,
}

pub fn effective_view_box<D: Document>(doc: &D, svg: D::Node) -> EffectiveViewBox {
    let client = doc.client_box(svg);
    let base = doc.svg_view_box(svg).unwrap_or_default();
    EffectiveViewBox {
        x: base.x,
        y: base.y,
        width: if base.width != 0.0 {
            base.width
        } else {
            client.width
        },
        height: if base.height != 0.0 {
            base.height
        } else {
            client.height
        },
        client_width: client.width,
        client_height: client.height,
    }
}

/// Alignment factors (0 = min, 1 = mid, 2 = max) per axis; `None` for `align="none"`.
fn align_factors(align: Align) -> Option<(f64, f64)> {
    let (x, y) = match align {
        Align::None => return None,
        Align::XMinYMin => (0, 0),
        Align::XMidYMin => (1, 0),
        Align::XMaxYMin => (2, 0),
        Align::XMinYMid => (0, 1),
        Align::XMidYMid => (1, 1),
        Align::XMaxYMid => (2, 1),
        Align::XMinYMax => (0, 2),
        Align::XMidYMax => (1, 2),
        Align::XMaxYMax => (2, 2),
    };
    Some((f64::from(x), f64::from(y)))
}

fn ratio(client: f64, view: f64) -> f64 {
    let r = client / view;
    if r.is_finite() && r != 0.0 { r } else { 1.0 }
}

/// Matrix mapping an `<svg>`'s user space onto its client box.
///
/// With `align="none"` each axis scales independently. Otherwise the scale is uniform (the
/// smaller ratio for `meet`, the larger for `slice`) and the viewBox is shifted inside the
/// client box according to the alignment.
pub fn view_box_matrix<D: Document>(doc: &D, svg: D::Node, dim: Dimension) -> Matrix {
    let vb = effective_view_box(doc, svg);
    let scale_x = ratio(vb.client_width, vb.width);
    let scale_y = ratio(vb.client_height, vb.height);
    let aspect = doc.preserve_aspect_ratio(svg);

    let mut origin = Point::zero();
    let mut scale = (scale_x, scale_y);
    let mut translate = Vector::zero();

    if let Some((x_align, y_align)) = align_factors(aspect.align) {
        origin = point(vb.width * x_align / 2.0, vb.height * y_align / 2.0);
        let uniform = if aspect.slice {
            scale_x.max(scale_y)
        } else {
            scale_x.min(scale_y)
        };
        scale = (uniform, uniform);
        translate = vector(
            (vb.client_width - vb.width) / 2.0 * x_align,
            (vb.client_height - vb.height) / 2.0 * y_align,
        );
    }

    Matrix::translation(dim, translate)
        .multiply(&Matrix::scale(dim, scale.0, scale.1))
        .about_origin(origin)
}

/// Offset of SVG content taken from its bbox, with the transform-origin re-based onto it.
///
/// Returns `(offset, origin)`.
pub fn graphics_offset<D: Document>(doc: &D, node: D::Node, origin: Point) -> (Vector, Point) {
    let Some(bbox) = doc.local_bbox(node) else {
        return (Vector::zero(), origin);
    };
    let (vx, vy) = doc
        .owner_svg(node)
        .map(|svg| {
            let vb = effective_view_box(doc, svg);
            (vb.x, vb.y)
        })
        .unwrap_or((0.0, 0.0));
    let offset = vector(bbox.left - vx, bbox.top - vy);
    (offset, origin - offset)
}
