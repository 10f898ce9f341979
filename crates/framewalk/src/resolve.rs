//! Resolver facade: chain walking, composition and projection for one target at a time.

use crate::composer::{ComposedResult, MatrixStack, compose_stack};
use crate::error::Result;
use crate::geom::{ClientBox, Point, point, vector};
use crate::matrix::Dimension;
use crate::offset::{element_size, offset_info};
use crate::options::ResolveOptions;
use crate::parse::{ComputedTransformParser, TransformParser};
use crate::projector::{Direction, ProjectedBox, project, rotation_rad};
use crate::provider::Document;
use crate::walker::{ChainEnd, ChainWalk, walk};
use serde::Serialize;

/// Size, rotation, composed matrices and projected box of a target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementInfo {
    pub width: f64,
    pub height: f64,
    /// Rotation in radians, measured on a 100×100 reference square.
    pub rotation: f64,
    #[serde(flatten)]
    pub composed: ComposedResult,
    #[serde(flatten)]
    pub projected: ProjectedBox,
}

impl ElementInfo {
    /// Identity matrices and a zero box: the target is not measurable yet.
    pub fn unmeasured(dim: Dimension) -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            composed: ComposedResult::identity(dim),
            projected: ProjectedBox::default(),
        }
    }
}

/// Client rect of an element; the body and document element report the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MeasuredRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientBox>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetInfo {
    #[serde(flatten)]
    pub element: ElementInfo,
    /// Winding of the box before the target's own transform.
    pub before_direction: Direction,
    /// Transform-origin before the target's own transform, relative to the final box.
    pub before_origin: Point,
    pub target_client_rect: MeasuredRect,
    pub container_client_rect: MeasuredRect,
}

pub struct Resolver<'a, D, P = ComputedTransformParser> {
    doc: &'a D,
    parser: P,
    options: ResolveOptions,
}

impl<'a, D: Document> Resolver<'a, D> {
    pub fn new(doc: &'a D) -> Self {
        Self {
            doc,
            parser: ComputedTransformParser,
            options: ResolveOptions::default(),
        }
    }
}

impl<'a, D: Document, P: TransformParser> Resolver<'a, D, P> {
    pub fn with_parser<Q: TransformParser>(self, parser: Q) -> Resolver<'a, D, Q> {
        Resolver {
            doc: self.doc,
            parser,
            options: self.options,
        }
    }

    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// The raw chain of `target` up to `container`, pending SVG offsets unresolved.
    pub fn walk(&self, target: D::Node, container: Option<D::Node>) -> Result<ChainWalk<D::Node>> {
        walk(
            self.doc,
            &self.parser,
            target,
            container,
            ChainEnd::BeforeContainer,
            &self.options,
        )
    }

    /// Resolved chains and composed matrices. `root_container` defaults to `container`.
    pub fn matrix_stack(
        &self,
        target: D::Node,
        container: Option<D::Node>,
        root_container: Option<D::Node>,
    ) -> Result<MatrixStack<D::Node>> {
        compose_stack(
            self.doc,
            &self.parser,
            target,
            container,
            root_container.or(container),
            &self.options,
        )
    }

    pub fn compose(
        &self,
        target: D::Node,
        container: Option<D::Node>,
        root_container: Option<D::Node>,
    ) -> Result<ComposedResult> {
        self.matrix_stack(target, container, root_container)
            .map(|stack| stack.result)
    }

    pub fn element_info(
        &self,
        target: Option<D::Node>,
        container: Option<D::Node>,
        root_container: Option<D::Node>,
    ) -> Result<ElementInfo> {
        let Some(target) = target else {
            let dim = if self.options.force_3d {
                Dimension::Spatial
            } else {
                Dimension::Planar
            };
            return Ok(ElementInfo::unmeasured(dim));
        };

        let size = element_size(self.doc, target);
        let composed = self.compose(target, container, root_container)?;
        let projected = project(
            &composed.all_matrix,
            composed.transform_origin,
            size.width,
            size.height,
        );
        let reference = project(&composed.all_matrix, point(50.0, 50.0), 100.0, 100.0);
        let rotation = rotation_rad(reference.pos1, reference.pos2, reference.direction);

        Ok(ElementInfo {
            width: size.width,
            height: size.height,
            rotation,
            composed,
            projected,
        })
    }

    /// Element info plus the pre-transform origin/winding and the client rects interaction
    /// code anchors to. `parent_container` is the frame the container rect is reported for.
    pub fn target_info(
        &self,
        target: Option<D::Node>,
        container: Option<D::Node>,
        parent_container: Option<D::Node>,
        root_container: Option<D::Node>,
    ) -> Result<TargetInfo> {
        let element = self.element_info(target, container, root_container)?;
        let Some(target) = target else {
            return Ok(TargetInfo {
                element,
                before_direction: Direction::Clockwise,
                before_origin: Point::zero(),
                target_client_rect: MeasuredRect::default(),
                container_client_rect: MeasuredRect::default(),
            });
        };

        let composed = &element.composed;
        let before = project(
            &composed.offset_matrix,
            composed.transform_origin + composed.target_matrix.translation_part(),
            element.width,
            element.height,
        );
        let before_origin = before.origin
            + vector(
                before.left - element.projected.left,
                before.top - element.projected.top,
            );
        let frame = offset_info(self.doc, parent_container, parent_container, true).offset_parent;

        Ok(TargetInfo {
            before_direction: before.direction,
            before_origin,
            target_client_rect: self.client_rect(target, false),
            container_client_rect: self.client_rect(frame, true),
            element,
        })
    }

    pub fn client_rect(&self, node: D::Node, with_client: bool) -> MeasuredRect {
        let doc = self.doc;
        let (left, top, width, height) =
            if node == doc.body() || node == doc.document_element() {
                let viewport = doc.viewport();
                (
                    -viewport.scroll_x,
                    -viewport.scroll_y,
                    viewport.width,
                    viewport.height,
                )
            } else {
                let rect = doc.bounding_rect(node);
                (rect.left, rect.top, rect.width, rect.height)
            };
        MeasuredRect {
            left,
            top,
            right: left + width,
            bottom: top + height,
            width,
            height,
            client: with_client.then(|| doc.client_box(node)),
        }
    }
}
