use eframe::egui::{Pos2, Vec2, pos2, vec2};

const AXIS_EPSILON: f32 = 0.001;

/// Point where the ray from `center` toward `target` leaves the axis-aligned
/// box of `size` centered at `center`.
pub fn intersect(center: Pos2, target: Pos2, size: Vec2) -> Pos2 {
    let half_width = size.x / 2.0;
    let half_height = size.y / 2.0;

    let dx = target.x - center.x;
    let dy = target.y - center.y;

    if dx.abs() < AXIS_EPSILON {
        let y = if dy > 0.0 { half_height } else { -half_height };
        return pos2(center.x, center.y + y);
    }

    if dy.abs() < AXIS_EPSILON {
        let x = if dx > 0.0 { half_width } else { -half_width };
        return pos2(center.x + x, center.y);
    }

    let slope = dy / dx;
    let inverse_slope = dx / dy;
    let top = center.y - half_height;
    let bottom = center.y + half_height;

    let (edge_x, edge_y) = if dx > 0.0 {
        (center.x + half_width, center.y + slope * half_width)
    } else {
        (center.x - half_width, center.y - slope * half_width)
    };
    if (top..=bottom).contains(&edge_y) {
        return pos2(edge_x, edge_y);
    }

    if dy > 0.0 {
        pos2(center.x + inverse_slope * half_height, bottom)
    } else {
        pos2(center.x - inverse_slope * half_height, top)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LinkEndpoints {
    pub start: Pos2,
    pub end: Pos2,
}

impl LinkEndpoints {
    pub fn midpoint(&self) -> Pos2 {
        self.start + (self.end - self.start) * 0.5
    }

    /// Point `fraction` of the way from start to end.
    pub fn point_at(&self, fraction: f32) -> Pos2 {
        self.start + (self.end - self.start) * fraction.clamp(0.0, 1.0)
    }

    pub fn distance_to(&self, point: Pos2) -> f32 {
        let segment = self.end - self.start;
        let length_sq = segment.length_sq();
        if length_sq <= f32::EPSILON {
            return self.start.distance(point);
        }

        let t = ((point - self.start).dot(segment) / length_sq).clamp(0.0, 1.0);
        (self.start + segment * t).distance(point)
    }
}

/// Unit normal of the `from -> to` direction, rotated a quarter turn so a
/// positive offset moves a left-to-right link upward on screen.
fn offset_normal(from: Pos2, to: Pos2) -> Vec2 {
    let angle = (to.y - from.y).atan2(to.x - from.x);
    vec2(angle.sin(), -angle.cos())
}

/// Border-anchored endpoints for a link between two boxes of `size`,
/// translated `offset` units along the perpendicular.
pub fn link_endpoints(from: Pos2, to: Pos2, size: Vec2, offset: f32) -> LinkEndpoints {
    let start = intersect(from, to, size);
    let end = intersect(to, from, size);
    let shift = offset_normal(from, to) * offset;

    LinkEndpoints {
        start: start + shift,
        end: end + shift,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 1e-3;
    const BOX: Vec2 = vec2(150.0, 60.0);

    fn assert_close(actual: Pos2, expected: Pos2) {
        assert!(
            (actual.x - expected.x).abs() < TOLERANCE && (actual.y - expected.y).abs() < TOLERANCE,
            "expected {expected:?}, got {actual:?}"
        );
    }

    fn assert_on_boundary(point: Pos2, center: Pos2, size: Vec2) {
        let half = size / 2.0;
        let on_vertical_edge = ((point.x - center.x).abs() - half.x).abs() < TOLERANCE;
        let on_horizontal_edge = ((point.y - center.y).abs() - half.y).abs() < TOLERANCE;
        assert!(
            on_vertical_edge || on_horizontal_edge,
            "{point:?} is not on the edge of the box at {center:?}"
        );
        assert!((point.x - center.x).abs() <= half.x + TOLERANCE);
        assert!((point.y - center.y).abs() <= half.y + TOLERANCE);
    }

    fn assert_colinear(point: Pos2, center: Pos2, target: Pos2) {
        let ray = target - center;
        let hit = point - center;
        let cross = ray.x * hit.y - ray.y * hit.x;
        assert!(
            cross.abs() / ray.length() < TOLERANCE * 10.0,
            "{point:?} is off the ray {center:?} -> {target:?}"
        );
        assert!(ray.dot(hit) > 0.0);
    }

    #[test]
    fn facing_boxes_touch_at_facing_edges() {
        let endpoints = link_endpoints(pos2(0.0, 0.0), pos2(200.0, 0.0), BOX, 0.0);
        assert_close(endpoints.start, pos2(75.0, 0.0));
        assert_close(endpoints.end, pos2(125.0, 0.0));
    }

    #[test]
    fn axis_aligned_targets_snap_to_edge_midpoints() {
        let center = pos2(100.0, 100.0);
        assert_close(intersect(center, pos2(100.0, 400.0), BOX), pos2(100.0, 130.0));
        assert_close(intersect(center, pos2(100.0, -50.0), BOX), pos2(100.0, 70.0));
        assert_close(intersect(center, pos2(100.0005, 400.0), BOX), pos2(100.0, 130.0));
        assert_close(intersect(center, pos2(-300.0, 100.0), BOX), pos2(25.0, 100.0));
        assert_close(intersect(center, pos2(300.0, 100.0004), BOX), pos2(175.0, 100.0));
    }

    #[test]
    fn coincident_centers_do_not_produce_nan() {
        let point = intersect(pos2(10.0, 10.0), pos2(10.0, 10.0), BOX);
        assert!(point.x.is_finite() && point.y.is_finite());
        assert_close(point, pos2(10.0, -20.0));
    }

    #[test]
    fn steep_and_shallow_rays_hit_the_expected_edge() {
        let center = pos2(0.0, 0.0);
        assert_close(intersect(center, pos2(150.0, 30.0), BOX), pos2(75.0, 15.0));
        assert_close(intersect(center, pos2(20.0, 200.0), BOX), pos2(3.0, 30.0));
        assert_close(intersect(center, pos2(-20.0, -200.0), BOX), pos2(-3.0, -30.0));
        assert_close(intersect(center, pos2(-150.0, 30.0), BOX), pos2(-75.0, 15.0));
    }

    #[test]
    fn intersections_lie_on_boundary_along_the_ray() {
        let centers = [pos2(0.0, 0.0), pos2(320.0, -45.5), pos2(-17.25, 260.0)];
        let sizes = [BOX, vec2(40.0, 90.0), vec2(10.0, 10.0)];
        for center in centers {
            for size in sizes {
                for step in 0..72 {
                    let angle = (step as f32) * std::f32::consts::TAU / 72.0 + 0.013;
                    let distance = 400.0 + step as f32 * 7.0;
                    let target = center + vec2(angle.cos(), angle.sin()) * distance;
                    let point = intersect(center, target, size);
                    assert_on_boundary(point, center, size);
                    assert_colinear(point, center, target);
                }
            }
        }
    }

    #[test]
    fn offset_translates_both_endpoints_along_the_normal() {
        let straight = link_endpoints(pos2(0.0, 0.0), pos2(200.0, 0.0), BOX, 0.0);
        let curved = link_endpoints(pos2(0.0, 0.0), pos2(200.0, 0.0), BOX, 20.0);
        assert_close(curved.start, straight.start + vec2(0.0, -20.0));
        assert_close(curved.end, straight.end + vec2(0.0, -20.0));

        let reverse = link_endpoints(pos2(200.0, 0.0), pos2(0.0, 0.0), BOX, 20.0);
        assert_close(reverse.start, pos2(125.0, 20.0));
    }

    #[test]
    fn link_endpoints_are_deterministic() {
        let first = link_endpoints(pos2(12.0, 40.0), pos2(310.0, 220.0), BOX, 8.0);
        let second = link_endpoints(pos2(12.0, 40.0), pos2(310.0, 220.0), BOX, 8.0);
        assert_eq!(first, second);
    }

    #[test]
    fn segment_helpers() {
        let endpoints = LinkEndpoints {
            start: pos2(0.0, 0.0),
            end: pos2(100.0, 0.0),
        };
        assert_close(endpoints.midpoint(), pos2(50.0, 0.0));
        assert_close(endpoints.point_at(0.25), pos2(25.0, 0.0));
        assert!((endpoints.distance_to(pos2(50.0, 7.0)) - 7.0).abs() < TOLERANCE);
        assert!((endpoints.distance_to(pos2(-3.0, 4.0)) - 5.0).abs() < TOLERANCE);
    }
}
