//! # Display List
//!
//! Flattens a subtree into draw commands for the host renderer.
//!
//! ## Responsibilities
//! - **Scene Traversal**: depth-first, children in draw order (`collect_recursive`).
//! - **Opacity**: alpha multiplies down the tree; hidden subtrees are skipped.
//! - **Masking**: a masked node hands its mask rectangle, in global space, to
//!   every command below it.

use crate::errors::SceneError;
use crate::scene::SceneGraph;
use crate::systems::assets::TextureRef;
use crate::types::{Bounds, NodeId};
use glam::Affine2;
use scenery_data::model::TextFill;
use scenery_data::particle::EmitterConfig;
use serde::Serialize;

const MAX_DEPTH: usize = 100;

/// What to draw for one element, in its local space.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Paint {
    Sprite {
        texture: TextureRef,
        width: f32,
        height: f32,
    },
    NineSlice {
        texture: TextureRef,
        width: f32,
        height: f32,
        /// Left, top, right, bottom.
        insets: [f32; 4],
    },
    Text {
        text: String,
        font: Option<String>,
        size: f32,
        fill: Option<TextFill>,
        align: Option<String>,
    },
    BitmapText {
        text: String,
        font: String,
        size: f32,
        align: Option<String>,
    },
    Particles {
        texture: Option<TextureRef>,
        emitting: bool,
        #[serde(skip)]
        config: EmitterConfig,
    },
    Skeleton {
        skeleton: String,
        skin: Option<String>,
        animation: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct DrawCommand {
    pub node: NodeId,
    pub name: String,
    pub paint: Paint,
    /// Column-major 2x3 world matrix: `[a, b, c, d, tx, ty]`.
    pub transform: [f32; 6],
    pub alpha: f32,
    pub clip: Option<Bounds>,
}

fn matrix_to_array(m: &Affine2) -> [f32; 6] {
    let c = m.matrix2.to_cols_array();
    [c[0], c[1], c[2], c[3], m.translation.x, m.translation.y]
}

/// Collects draw commands for `root` and everything visible below it.
pub fn collect(graph: &SceneGraph, root: NodeId) -> Result<Vec<DrawCommand>, SceneError> {
    let mut out = Vec::new();
    let parent_matrix = graph
        .parent(root)
        .map(|p| graph.world_transform(p))
        .unwrap_or(Affine2::IDENTITY);
    collect_recursive(graph, root, parent_matrix, 1.0, None, 0, &mut out)?;
    Ok(out)
}

fn collect_recursive(
    graph: &SceneGraph,
    id: NodeId,
    parent_matrix: Affine2,
    parent_alpha: f32,
    parent_clip: Option<Bounds>,
    depth: usize,
    out: &mut Vec<DrawCommand>,
) -> Result<(), SceneError> {
    if depth > MAX_DEPTH {
        return Err(SceneError::RecursionLimit);
    }
    let Some(node) = graph.get_node(id) else {
        return Ok(());
    };
    if !node.transform.visible {
        return Ok(());
    }

    let matrix = parent_matrix * node.transform.local_matrix();
    let alpha = parent_alpha * node.transform.alpha;

    let mut clip = parent_clip;
    if let Some(mask) = node.mask {
        if let Some(rect) = graph.bounds(mask) {
            clip = Some(match clip {
                Some(c) => c.intersection(&rect).unwrap_or(Bounds::from_xywh(rect.x, rect.y, 0.0, 0.0)),
                None => rect,
            });
        }
    }

    if let Some(paint) = node.element.paint() {
        out.push(DrawCommand {
            node: id,
            name: node.name.clone(),
            paint,
            transform: matrix_to_array(&matrix),
            alpha,
            clip,
        });
    }

    for &child in &node.children {
        collect_recursive(graph, child, matrix, alpha, clip, depth + 1, out)?;
    }
    Ok(())
}
