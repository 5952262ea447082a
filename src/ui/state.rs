use std::time::Duration;

use surface3d::{HeightExtent, RefreshStats};

/// What the HUD shows. Filled in by the app after each refresh attempt.
pub struct HudState {
    pub expression: String,
    pub triangles: usize,
    pub extent: Option<HeightExtent>,
    pub surface_height: Option<f64>,
    pub refresh_time: Duration,
    pub refresh_count: u64,
    pub last_error: Option<String>,
    pub fps: f32,
    pub show_stats: bool,
}

impl Default for HudState {
    fn default() -> Self {
        Self {
            expression: String::new(),
            triangles: 0,
            extent: None,
            surface_height: None,
            refresh_time: Duration::ZERO,
            refresh_count: 0,
            last_error: None,
            fps: 0.0,
            show_stats: true,
        }
    }
}

impl HudState {
    pub fn record_refresh(&mut self, stats: &RefreshStats) {
        self.triangles = stats.triangles;
        self.extent = Some(stats.extent);
        self.surface_height = Some(stats.surface_height);
        self.refresh_time = stats.elapsed;
        self.refresh_count += 1;
        self.last_error = None;
    }

    pub fn record_error(&mut self, err: impl std::fmt::Display) {
        self.last_error = Some(err.to_string());
    }
}
