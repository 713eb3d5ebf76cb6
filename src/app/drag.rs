use eframe::egui::{Pos2, Vec2, pos2};
use tracing::debug;

use crate::flow::GraphDocument;

use super::scene::Scene;

/// Allowed range for node centers, `(min, max)` per axis.
pub(in crate::app) type CenterBounds = ((f32, f32), (f32, f32));

pub(in crate::app) fn clamp_center(point: Pos2, bounds: CenterBounds) -> Pos2 {
    let ((min_x, min_y), (max_x, max_y)) = bounds;
    pos2(point.x.clamp(min_x, max_x), point.y.clamp(min_y, max_y))
}

struct ActiveDrag {
    node: usize,
    grab_offset: Vec2,
    moved: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) struct DragEnd {
    pub(in crate::app) node: usize,
    /// The node actually changed position; the release must not count as a click.
    pub(in crate::app) moved: bool,
}

#[derive(Default)]
pub(in crate::app) struct DragController {
    active: Option<ActiveDrag>,
}

impl DragController {
    pub(in crate::app) fn start(&mut self, scene: &mut Scene, node: usize, pointer: Pos2) {
        let Some(visual) = scene.node(node) else {
            return;
        };
        let grab_offset = visual.center - pointer;
        scene.raise(node);
        self.active = Some(ActiveDrag {
            node,
            grab_offset,
            moved: false,
        });
    }

    /// Moves the grabbed node under `pointer`, writing the clamped center into
    /// both the document and the scene. Returns whether anything moved.
    pub(in crate::app) fn drag(
        &mut self,
        scene: &mut Scene,
        document: &mut GraphDocument,
        pointer: Pos2,
        bounds: CenterBounds,
    ) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        let Some(visual) = scene.node(active.node) else {
            return false;
        };

        let center = clamp_center(pointer + active.grab_offset, bounds);
        if center == visual.center {
            return false;
        }

        if let Some(node) = document.nodes.get_mut(active.node) {
            node.set_position(center.x, center.y);
        }
        scene.move_node(active.node, center);
        scene.update_links();
        active.moved = true;
        true
    }

    pub(in crate::app) fn end(&mut self) -> Option<DragEnd> {
        let active = self.active.take()?;
        debug!(node = active.node, moved = active.moved, "drag ended");
        Some(DragEnd {
            node: active.node,
            moved: active.moved,
        })
    }

    /// Drops any drag in progress without reporting it.
    pub(in crate::app) fn cancel(&mut self) {
        self.active = None;
    }

    pub(in crate::app) fn dragged_node(&self) -> Option<usize> {
        self.active.as_ref().map(|active| active.node)
    }
}
