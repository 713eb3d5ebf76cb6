use eframe::egui::{self, PointerButton, Pos2, Rect, Response, Ui};
use tracing::debug;

use super::super::ViewModel;
use super::super::events::{DiagramEvent, Selection};

impl ViewModel {
    /// Applies this frame's pointer input to the canvas: hover, node drag and
    /// click dispatch. Returns the node under the pointer.
    pub(in crate::app) fn handle_canvas_pointer(
        &mut self,
        ui: &Ui,
        response: &Response,
        rect: Rect,
        overlay_rect: Option<Rect>,
    ) -> Option<usize> {
        let to_canvas = |screen: Pos2| screen - rect.min.to_vec2();
        let over_overlay =
            |screen: Pos2| overlay_rect.is_some_and(|overlay| overlay.contains(screen));

        let hover = response.hover_pos();
        let hovered_node = hover
            .filter(|&screen| !over_overlay(screen))
            .and_then(|screen| self.scene.node_at(to_canvas(screen)));
        self.hovered_link = match hover {
            Some(screen)
                if hovered_node.is_none()
                    && !over_overlay(screen)
                    && self.drag.dragged_node().is_none() =>
            {
                self.scene.link_at(to_canvas(screen))
            }
            _ => None,
        };

        if self.drag.dragged_node().is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::Grabbing);
        } else if hovered_node.is_some() && !self.sequencer.is_playing() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::Grab);
        } else if hovered_node.is_some()
            || self.hovered_link.is_some()
            || hover.is_some_and(over_overlay)
        {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        if response.drag_started_by(PointerButton::Primary) && !self.sequencer.is_playing() {
            let press = ui
                .input(|input| input.pointer.press_origin())
                .or_else(|| response.interact_pointer_pos());
            if let Some(press) = press.filter(|&screen| !over_overlay(screen))
                && let Some(node) = self.scene.node_at(to_canvas(press))
            {
                self.drag.start(&mut self.scene, node, to_canvas(press));
            }
        }

        if response.dragged_by(PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
        {
            let bounds = self.config.canvas.center_bounds((rect.width(), rect.height()));
            self.drag.drag(
                &mut self.scene,
                &mut self.document,
                to_canvas(pointer),
                bounds,
            );
        }

        let mut suppress_click = false;
        if response.drag_stopped()
            && let Some(end) = self.drag.end()
            && end.moved
        {
            debug!(node = end.node, "node moved, saving diagram");
            suppress_click = true;
            self.request_save();
        }

        if response.clicked_by(PointerButton::Primary)
            && !suppress_click
            && let Some(pointer) = response.interact_pointer_pos()
        {
            self.dispatch_click(pointer, rect, overlay_rect);
        }

        hovered_node
    }

    fn dispatch_click(&mut self, screen: Pos2, rect: Rect, overlay_rect: Option<Rect>) {
        if overlay_rect.is_some_and(|overlay| overlay.contains(screen)) {
            if let Some(overlay) = &self.overlay {
                self.events
                    .push(DiagramEvent::ItemClicked(Selection::Link(overlay.link)));
            }
            return;
        }

        let point = screen - rect.min.to_vec2();
        let selection = self
            .scene
            .node_at(point)
            .map(Selection::Node)
            .or_else(|| self.scene.link_at(point).map(Selection::Link));
        if let Some(selection) = selection {
            self.events.push(DiagramEvent::ItemClicked(selection));
        }
    }
}
