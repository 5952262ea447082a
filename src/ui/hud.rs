use egui::{Context, RichText};

use crate::ui::state::HudState;
use crate::ui::theme::*;

pub fn draw_stats_panel(ctx: &Context, state: &HudState) {
    if !state.show_stats {
        return;
    }

    egui::Area::new(egui::Id::new("stats_overlay"))
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-12.0, 12.0))
        .show(ctx, |ui| {
            egui::Frame::default()
                .fill(BG_OVERLAY)
                .stroke(egui::Stroke::new(1.0, BORDER_SUBTLE))
                .rounding(6.0)
                .inner_margin(10.0)
                .show(ui, |ui| {
                    ui.style_mut().override_font_id =
                        Some(egui::FontId::new(11.0, egui::FontFamily::Monospace));

                    ui.label(RichText::new(format!("y = {}", state.expression)).color(ACCENT_YELLOW));
                    ui.add_space(4.0);

                    let fps_color = if state.fps >= 60.0 {
                        ACCENT_GREEN
                    } else if state.fps >= 30.0 {
                        ACCENT_ORANGE
                    } else {
                        ACCENT_RED
                    };

                    egui::Grid::new("stats").num_columns(2).spacing([20.0, 2.0]).show(ui, |ui| {
                        ui.label(RichText::new("FPS").color(TEXT_MUTED));
                        ui.label(RichText::new(format!("{:.0}", state.fps)).color(fps_color));
                        ui.end_row();

                        ui.label(RichText::new("Triangles").color(TEXT_MUTED));
                        ui.label(fmt_num(state.triangles));
                        ui.end_row();

                        ui.label(RichText::new("Refreshes").color(TEXT_MUTED));
                        ui.label(fmt_num(state.refresh_count as usize));
                        ui.end_row();

                        ui.label(RichText::new("Refresh ms").color(TEXT_MUTED));
                        ui.label(format!("{:.1}", state.refresh_time.as_secs_f64() * 1000.0));
                        ui.end_row();

                        if let Some(extent) = state.extent {
                            ui.label(RichText::new("Height").color(TEXT_MUTED));
                            ui.label(format!("{:.2} .. {:.2}", extent.min, extent.max));
                            ui.end_row();
                        }

                        if let Some(height) = state.surface_height {
                            ui.label(RichText::new("Below cam").color(TEXT_MUTED));
                            ui.label(format!("{height:.2}"));
                            ui.end_row();
                        }
                    });
                });
        });

    if let Some(err) = &state.last_error {
        egui::Area::new(egui::Id::new("error_overlay"))
            .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 12.0))
            .show(ctx, |ui| {
                egui::Frame::default()
                    .fill(BG_ERROR)
                    .stroke(egui::Stroke::new(1.0, ACCENT_RED))
                    .rounding(4.0)
                    .inner_margin(8.0)
                    .show(ui, |ui| {
                        ui.label(RichText::new(err).color(ACCENT_RED).size(12.0));
                    });
            });
    }
}

pub fn draw_help_overlay(ctx: &Context, pos: [f32; 3], speed: f32) {
    egui::Area::new(egui::Id::new("help_overlay"))
        .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(12.0, -12.0))
        .show(ctx, |ui| {
            egui::Frame::default()
                .fill(BG_OVERLAY)
                .rounding(6.0)
                .inner_margin(10.0)
                .show(ui, |ui| {
                    ui.style_mut().override_font_id = Some(egui::FontId::new(11.0, egui::FontFamily::Monospace));
                    ui.label(RichText::new("WASD - Move | Space/Shift - Up/Down | RMB+Drag - Look | Scroll - Speed | F1 - Stats").color(TEXT_MUTED));
                    ui.label(RichText::new(format!("Pos: ({:.1}, {:.1}, {:.1}) | Speed: {:.0}", pos[0], pos[1], pos[2], speed)).color(TEXT_MUTED));
                });
        });
}

fn fmt_num(n: usize) -> String {
    if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::fmt_num;

    #[test]
    fn formats_counts() {
        assert_eq!(fmt_num(12), "12");
        assert_eq!(fmt_num(6368), "6.4K");
        assert_eq!(fmt_num(2_500_000), "2.50M");
    }
}
