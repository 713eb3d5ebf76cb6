use std::sync::Arc;
use std::time::Duration;

use eframe::egui::{
    Color32, FontId, Galley, Painter, Pos2, Rect, Sense, Shape, Stroke, Ui, Vec2, pos2, vec2,
};
use tracing::debug;

use crate::geometry::LinkEndpoints;

use super::super::ViewModel;
use super::super::events::Selection;
use super::super::overlay::{OVERLAY_WIDTH, overlay_size, place_overlay};
use super::super::style::{
    OVERLAY_FILL, SEARCH_MATCH, SELECTION, blend_color, dim_color, draw_background, draw_link,
    draw_node, link_style, node_fill,
};

const OVERLAY_PADDING: Vec2 = vec2(16.0, 12.0);
const OVERLAY_GAP: f32 = 6.0;

struct OverlayLayout {
    rect: Rect,
    anchor: Pos2,
    badge: Arc<Galley>,
    body: Arc<Galley>,
    hint: Arc<Galley>,
}

impl ViewModel {
    /// Fits the document to a canvas of `size` the first time that size is
    /// seen, then rebuilds the scene if anything changed.
    pub(in crate::app) fn sync_canvas(&mut self, size: Vec2) {
        if self.canvas_size != Some(size) {
            let (min, max) = self.config.canvas.center_bounds((size.x, size.y));
            let placed = self.document.place_missing(min, max);
            let clamped = self.document.clamp_positions(min, max);
            if placed > 0 || clamped > 0 {
                debug!(
                    placed,
                    clamped,
                    width = size.x,
                    height = size.y,
                    "fitted nodes to canvas"
                );
            }
            self.canvas_size = Some(size);
            self.scene_dirty = true;
        }

        if self.scene_dirty {
            self.scene.render(&self.document, &self.config.canvas);
            self.scene_dirty = false;
        }
    }

    pub(in crate::app) fn draw_canvas(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        let now = ui.input(|input| input.time);

        self.sync_canvas(rect.size());
        self.sequencer.tick(now, &mut self.events);

        let overlay = self.layout_overlay(&painter, rect);
        let hovered_node =
            self.handle_canvas_pointer(ui, &response, rect, overlay.as_ref().map(|layout| layout.rect));

        draw_background(&painter, rect);
        let origin = rect.min.to_vec2();

        let phases = self.sequencer.link_phases(self.scene.links().len(), now);
        for (index, (link, phase)) in self.scene.links().iter().zip(phases).enumerate() {
            let endpoints = LinkEndpoints {
                start: link.endpoints.start + origin,
                end: link.endpoints.end + origin,
            };
            if self.selected == Some(Selection::Link(index)) {
                painter.line_segment(
                    [endpoints.start, endpoints.end],
                    Stroke::new(9.0, SELECTION.gamma_multiply(0.55)),
                );
            }
            draw_link(
                &painter,
                endpoints,
                link_style(phase, self.hovered_link == Some(index)),
            );
        }

        let search = self
            .search_cache
            .results(&self.document, self.document_revision, &self.search);
        let search_active = search.as_ref().is_some_and(|results| !results.nodes.is_empty());
        for &index in self.scene.paint_order() {
            let (Some(node), Some(node_rect)) = (self.scene.node(index), self.scene.node_rect(index))
            else {
                continue;
            };
            let is_match = search
                .as_ref()
                .is_some_and(|results| results.nodes.contains(&index));

            let mut fill = node_fill(&node.node_type);
            if search_active && !is_match {
                fill = dim_color(fill, 0.45);
            }
            if hovered_node == Some(index) || self.drag.dragged_node() == Some(index) {
                fill = blend_color(fill, Color32::WHITE, 0.15);
            }

            let outline = if self.selected == Some(Selection::Node(index)) {
                Some(Stroke::new(3.0, SELECTION))
            } else if is_match {
                Some(Stroke::new(2.0, SEARCH_MATCH))
            } else {
                None
            };
            draw_node(
                &painter,
                node_rect.translate(origin),
                fill,
                outline,
                &node.label_lines,
            );
        }

        if let Some(layout) = overlay {
            draw_overlay(&painter, &layout);
        }

        if self.sequencer.is_drawing() || self.drag.dragged_node().is_some() {
            ui.ctx().request_repaint();
        } else if let Some(due_at) = self.sequencer.next_wakeup() {
            ui.ctx()
                .request_repaint_after(Duration::from_secs_f64((due_at - now).max(0.0)));
        }
    }

    fn layout_overlay(&self, painter: &Painter, rect: Rect) -> Option<OverlayLayout> {
        let overlay = self.overlay.as_ref()?;

        let anchor = self
            .scene
            .link(overlay.link)
            .filter(|link| !link.is_dangling())
            .map(|link| link.endpoints.midpoint() + rect.min.to_vec2())
            .unwrap_or_else(|| rect.center());

        let wrap_width = OVERLAY_WIDTH - OVERLAY_PADDING.x * 2.0;
        let badge = painter.layout_no_wrap(
            overlay.badge.to_uppercase(),
            FontId::proportional(10.0),
            Color32::from_rgb(15, 23, 42),
        );
        let mut body_text = overlay.summary.clone();
        if let Some(detail) = &overlay.detail {
            body_text.push('\n');
            body_text.push_str(detail);
        }
        let body = painter.layout(
            body_text,
            FontId::proportional(13.0),
            Color32::from_rgb(241, 245, 249),
            wrap_width,
        );
        let hint = painter.layout_no_wrap(
            "Click for full details".to_owned(),
            FontId::proportional(10.0),
            Color32::from_rgb(148, 163, 184),
        );

        let text_height = badge.size().y + body.size().y + hint.size().y + OVERLAY_GAP * 3.0;
        let rect = place_overlay(anchor, overlay_size(text_height), rect);

        Some(OverlayLayout {
            rect,
            anchor,
            badge,
            body,
            hint,
        })
    }
}

fn draw_overlay(painter: &Painter, layout: &OverlayLayout) {
    let rect = layout.rect;
    if layout.anchor.y > rect.bottom() {
        let tip = pos2(
            layout.anchor.x.clamp(rect.left() + 12.0, rect.right() - 12.0),
            rect.bottom() + 6.0,
        );
        painter.add(Shape::convex_polygon(
            vec![
                pos2(tip.x - 6.0, rect.bottom()),
                pos2(tip.x + 6.0, rect.bottom()),
                tip,
            ],
            OVERLAY_FILL,
            Stroke::NONE,
        ));
    }
    painter.rect_filled(rect, 12.0, OVERLAY_FILL);

    let mut cursor = rect.min + OVERLAY_PADDING;
    let badge_rect = Rect::from_min_size(cursor, layout.badge.size() + vec2(12.0, 4.0));
    painter.rect_filled(badge_rect, 4.0, Color32::from_rgb(0x00, 0xD4, 0xAA));
    painter.galley(cursor + vec2(6.0, 2.0), Arc::clone(&layout.badge), Color32::BLACK);
    cursor.y += badge_rect.height() + OVERLAY_GAP;

    painter.galley(cursor, Arc::clone(&layout.body), Color32::WHITE);
    cursor.y += layout.body.size().y + OVERLAY_GAP;

    painter.galley(cursor, Arc::clone(&layout.hint), Color32::GRAY);
}
