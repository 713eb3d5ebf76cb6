use eframe::egui::{Pos2, Rect, Vec2, pos2, vec2};

use crate::flow::{Link, SummaryTable, description_headline};

pub(in crate::app) const OVERLAY_WIDTH: f32 = 280.0;
const OVERLAY_MARGIN: f32 = 8.0;

/// Text of the floating step card for the announced step.
#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) struct StepOverlay {
    pub(in crate::app) link: usize,
    pub(in crate::app) badge: String,
    pub(in crate::app) summary: String,
    pub(in crate::app) detail: Option<String>,
}

impl StepOverlay {
    pub(in crate::app) fn build(
        step: usize,
        total: usize,
        link_index: usize,
        link: &Link,
        summaries: &SummaryTable,
    ) -> Self {
        Self {
            link: link_index,
            badge: format!("Step {}/{}", step + 1, total),
            summary: summaries.phrase(&link.from, &link.to),
            detail: description_headline(link.description()),
        }
    }
}

/// Card of `size` centered above `anchor`, kept inside `canvas`.
pub(in crate::app) fn place_overlay(anchor: Pos2, size: Vec2, canvas: Rect) -> Rect {
    let lift = size.y * 0.2;
    let mut min = pos2(anchor.x - size.x / 2.0, anchor.y - size.y - lift);

    let max_x = (canvas.right() - size.x - OVERLAY_MARGIN).max(canvas.left() + OVERLAY_MARGIN);
    let max_y = (canvas.bottom() - size.y - OVERLAY_MARGIN).max(canvas.top() + OVERLAY_MARGIN);
    min.x = min.x.clamp(canvas.left() + OVERLAY_MARGIN, max_x);
    min.y = min.y.clamp(canvas.top() + OVERLAY_MARGIN, max_y);

    Rect::from_min_size(min, size)
}

pub(in crate::app) fn overlay_size(text_height: f32) -> Vec2 {
    vec2(OVERLAY_WIDTH, text_height + 24.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(from: &str, to: &str, description: Option<&str>) -> Link {
        Link {
            name: format!("{from}_{to}"),
            from: from.to_owned(),
            to: to.to_owned(),
            description: description.map(str::to_owned),
            ..Link::default()
        }
    }

    #[test]
    fn build_uses_table_phrase_and_cleaned_headline() {
        let link = link(
            "User",
            "Farm Contract",
            Some("**[1] Deposit** into the farm\nsecond line"),
        );
        let overlay = StepOverlay::build(0, 5, 3, &link, &SummaryTable::builtin());

        assert_eq!(overlay.link, 3);
        assert_eq!(overlay.badge, "Step 1/5");
        assert_eq!(overlay.summary, "User sends tokens to the Farm");
        assert_eq!(overlay.detail.as_deref(), Some("Deposit into the farm"));
    }

    #[test]
    fn build_falls_back_to_generic_phrase() {
        let link = link("Vault", "Bridge", None);
        let overlay = StepOverlay::build(2, 3, 0, &link, &SummaryTable::builtin());

        assert_eq!(overlay.badge, "Step 3/3");
        assert_eq!(overlay.summary, "Vault transfers to Bridge");
        assert_eq!(overlay.detail, None);
    }

    #[test]
    fn overlay_sits_centered_above_anchor() {
        let canvas = Rect::from_min_size(Pos2::ZERO, vec2(1000.0, 800.0));
        let rect = place_overlay(pos2(500.0, 400.0), vec2(280.0, 100.0), canvas);

        assert_eq!(rect.center().x, 500.0);
        assert_eq!(rect.bottom(), 380.0);
    }

    #[test]
    fn overlay_is_clamped_inside_canvas() {
        let canvas = Rect::from_min_size(pos2(100.0, 50.0), vec2(1000.0, 800.0));
        let size = vec2(280.0, 100.0);

        let top_left = place_overlay(pos2(110.0, 60.0), size, canvas);
        assert_eq!(top_left.min, pos2(108.0, 58.0));

        let bottom_right = place_overlay(pos2(1200.0, 2000.0), size, canvas);
        assert_eq!(bottom_right.max, pos2(1092.0, 842.0));
    }
}
