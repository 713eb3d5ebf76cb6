use eframe::egui::{
    Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, StrokeKind, Vec2,
};

use crate::flow::NodeType;
use crate::geometry::LinkEndpoints;

use super::animation::LinkPhase;

pub(super) const CONTRACT_FILL: Color32 = Color32::from_rgb(0x4F, 0x46, 0xE5);
pub(super) const ADDRESS_FILL: Color32 = Color32::from_rgb(0x10, 0xB9, 0x81);
pub(super) const LINK_DEFAULT: Color32 = Color32::from_rgb(0x33, 0x33, 0x33);
pub(super) const LINK_HOVER: Color32 = Color32::from_rgb(0x00, 0x66, 0xCC);
pub(super) const LINK_DIMMED: Color32 = Color32::from_rgb(0x55, 0x55, 0x55);
pub(super) const LINK_ACTIVE: Color32 = Color32::from_rgb(0x00, 0xD4, 0xAA);
pub(super) const LINK_COMPLETED: Color32 = Color32::from_rgb(0xFF, 0x6B, 0x35);
pub(super) const SELECTION: Color32 = Color32::from_rgb(245, 206, 93);
pub(super) const SEARCH_MATCH: Color32 = Color32::from_rgb(241, 146, 94);
pub(super) const OVERLAY_FILL: Color32 = Color32::from_rgba_premultiplied(15, 23, 42, 242);

const DIMMED_OPACITY: f32 = 0.4;
const ARROW_LENGTH: f32 = 10.0;
const ARROW_HALF_WIDTH: f32 = 5.0;
const LABEL_LINE_HEIGHT: f32 = 14.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct LinkStyle {
    pub(super) color: Color32,
    pub(super) width: f32,
    /// Drawn fraction of the segment, from the start point.
    pub(super) reveal: f32,
}

pub(super) fn link_style(phase: LinkPhase, hovered: bool) -> LinkStyle {
    let style = match phase {
        LinkPhase::Default => LinkStyle {
            color: LINK_DEFAULT,
            width: 2.0,
            reveal: 1.0,
        },
        LinkPhase::Dimmed => LinkStyle {
            color: LINK_DIMMED.gamma_multiply(DIMMED_OPACITY),
            width: 1.5,
            reveal: 1.0,
        },
        LinkPhase::Active { reveal } => LinkStyle {
            color: LINK_ACTIVE,
            width: 5.0,
            reveal,
        },
        LinkPhase::Completed => LinkStyle {
            color: LINK_COMPLETED,
            width: 3.0,
            reveal: 1.0,
        },
    };

    if hovered && !matches!(phase, LinkPhase::Active { .. }) {
        LinkStyle {
            color: LINK_HOVER,
            width: style.width.max(3.0),
            ..style
        }
    } else {
        style
    }
}

pub(super) fn node_fill(node_type: &NodeType) -> Color32 {
    if node_type.is_contract() {
        CONTRACT_FILL
    } else {
        ADDRESS_FILL
    }
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

/// Darkens toward black and fades, for nodes outside the current search.
pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(248, 250, 252));

    let step = 40.0;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(203, 213, 225, 90));

    let mut x = rect.left() + step;
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + step;
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

/// Link segment cut at `style.reveal`, with an arrowhead at the drawn tip.
pub(super) fn draw_link(painter: &Painter, endpoints: LinkEndpoints, style: LinkStyle) {
    if style.reveal <= 0.0 {
        return;
    }

    let start = endpoints.start;
    let tip = endpoints.point_at(style.reveal);
    let direction = tip - start;
    let length = direction.length();
    if length <= f32::EPSILON {
        return;
    }

    let unit = direction / length;
    let arrow_length = ARROW_LENGTH.min(length);
    let base = tip - unit * arrow_length;
    painter.line_segment([start, base], Stroke::new(style.width, style.color));

    let normal = Vec2::new(-unit.y, unit.x) * (ARROW_HALF_WIDTH + style.width * 0.5);
    painter.add(Shape::convex_polygon(
        vec![tip, base + normal, base - normal],
        style.color,
        Stroke::NONE,
    ));
}

pub(super) fn draw_node(
    painter: &Painter,
    rect: Rect,
    fill: Color32,
    outline: Option<Stroke>,
    label_lines: &[String],
) {
    painter.rect_filled(rect, 6.0, fill);
    if let Some(outline) = outline {
        painter.rect_stroke(rect, 6.0, outline, StrokeKind::Outside);
    }

    let text_color = if fill.a() < 200 {
        Color32::from_rgba_unmultiplied(255, 255, 255, fill.a())
    } else {
        Color32::WHITE
    };
    let first_line_y =
        rect.center().y - (label_lines.len().saturating_sub(1) as f32 * LABEL_LINE_HEIGHT) / 2.0;
    for (index, line) in label_lines.iter().enumerate() {
        painter.text(
            Pos2::new(rect.center().x, first_line_y + index as f32 * LABEL_LINE_HEIGHT),
            Align2::CENTER_CENTER,
            line,
            FontId::proportional(12.0),
            text_color,
        );
    }
}
