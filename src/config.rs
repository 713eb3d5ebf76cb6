use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::flow::SummaryTable;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub summaries: SummaryTable,
}

impl ViewerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid config file {}", path.display()))
    }
}

/// Node box size and pointer tolerances, in canvas units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    #[serde(default = "default_node_width")]
    pub node_width: f32,
    #[serde(default = "default_node_height")]
    pub node_height: f32,
    #[serde(default = "default_drag_padding")]
    pub drag_padding: f32,
    #[serde(default = "default_hit_width")]
    pub hit_width: f32,
    #[serde(default = "default_fallback_width")]
    pub fallback_width: f32,
    #[serde(default = "default_fallback_height")]
    pub fallback_height: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            node_width: default_node_width(),
            node_height: default_node_height(),
            drag_padding: default_drag_padding(),
            hit_width: default_hit_width(),
            fallback_width: default_fallback_width(),
            fallback_height: default_fallback_height(),
        }
    }
}

impl CanvasConfig {
    pub fn half_extent(&self) -> (f32, f32) {
        (self.node_width / 2.0, self.node_height / 2.0)
    }

    /// Range node centers may occupy on a canvas of `size`, as `(min, max)`.
    pub fn center_bounds(&self, size: (f32, f32)) -> ((f32, f32), (f32, f32)) {
        let width = if size.0 > 0.0 { size.0 } else { self.fallback_width };
        let height = if size.1 > 0.0 { size.1 } else { self.fallback_height };
        let (half_width, half_height) = self.half_extent();
        let min = (
            half_width + self.drag_padding,
            half_height + self.drag_padding,
        );
        let max = (
            (width - half_width - self.drag_padding).max(min.0),
            (height - half_height - self.drag_padding).max(min.1),
        );
        (min, max)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Dim-all phase before the first step starts drawing.
    #[serde(default = "default_lead_in_ms")]
    pub lead_in_ms: u64,
    #[serde(default = "default_draw_duration_ms")]
    pub draw_duration_ms: u64,
    /// Pause between a finished draw and the next step.
    #[serde(default = "default_step_duration_ms")]
    pub step_duration_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            lead_in_ms: default_lead_in_ms(),
            draw_duration_ms: default_draw_duration_ms(),
            step_duration_ms: default_step_duration_ms(),
        }
    }
}

impl AnimationConfig {
    pub fn lead_in(&self) -> Duration {
        Duration::from_millis(self.lead_in_ms)
    }

    pub fn draw_duration(&self) -> Duration {
        Duration::from_millis(self.draw_duration_ms)
    }

    pub fn step_duration(&self) -> Duration {
        Duration::from_millis(self.step_duration_ms)
    }
}

fn default_node_width() -> f32 {
    150.0
}

fn default_node_height() -> f32 {
    60.0
}

fn default_drag_padding() -> f32 {
    10.0
}

fn default_hit_width() -> f32 {
    16.0
}

fn default_fallback_width() -> f32 {
    800.0
}

fn default_fallback_height() -> f32 {
    600.0
}

fn default_lead_in_ms() -> u64 {
    600
}

fn default_draw_duration_ms() -> u64 {
    1500
}

fn default_step_duration_ms() -> u64 {
    3000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: ViewerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.canvas.node_width, 150.0);
        assert_eq!(config.animation.step_duration(), Duration::from_secs(3));
        assert_eq!(config.summaries, SummaryTable::builtin());
    }

    #[test]
    fn partial_config_overrides_only_named_fields() {
        let config: ViewerConfig = serde_json::from_str(
            r#"{ "canvas": { "node_width": 200 }, "animation": { "draw_duration_ms": 400 } }"#,
        )
        .unwrap();
        assert_eq!(config.canvas.node_width, 200.0);
        assert_eq!(config.canvas.node_height, 60.0);
        assert_eq!(config.animation.draw_duration(), Duration::from_millis(400));
        assert_eq!(config.animation.lead_in_ms, 600);
    }

    #[test]
    fn center_bounds_keep_box_and_padding_inside_canvas() {
        let canvas = CanvasConfig::default();
        assert_eq!(
            canvas.center_bounds((1000.0, 700.0)),
            ((85.0, 40.0), (915.0, 660.0))
        );
        assert_eq!(
            canvas.center_bounds((0.0, 0.0)),
            ((85.0, 40.0), (715.0, 560.0))
        );
        let (min, max) = canvas.center_bounds((100.0, 50.0));
        assert_eq!(min, max);
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let error = ViewerConfig::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(error.to_string().contains("failed to read config file"));
    }
}
