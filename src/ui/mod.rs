pub mod hud;
pub mod state;
pub mod theme;

pub use hud::{draw_help_overlay, draw_stats_panel};
pub use state::HudState;
pub use theme::apply_theme;
