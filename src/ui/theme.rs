use egui::{Color32, FontFamily, FontId, Rounding, Stroke, Style, TextStyle, Visuals};

pub const BG_OVERLAY: Color32 = Color32::from_rgba_premultiplied(12, 12, 16, 200);
pub const BG_ERROR: Color32 = Color32::from_rgb(40, 15, 15);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(200, 200, 205);
pub const TEXT_MUTED: Color32 = Color32::from_rgb(130, 130, 136);

pub const ACCENT_GREEN: Color32 = Color32::from_rgb(46, 172, 35);
pub const ACCENT_RED: Color32 = Color32::from_rgb(172, 35, 35);
pub const ACCENT_YELLOW: Color32 = Color32::from_rgb(214, 190, 40);
pub const ACCENT_ORANGE: Color32 = Color32::from_rgb(172, 117, 35);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgba_premultiplied(50, 51, 113, 77);

pub fn apply_theme(ctx: &egui::Context) {
    let mut style = Style {
        visuals: Visuals {
            override_text_color: Some(TEXT_PRIMARY),
            window_fill: BG_OVERLAY,
            window_stroke: Stroke::new(1.0, BORDER_SUBTLE),
            window_rounding: Rounding::same(6.0),
            error_fg_color: ACCENT_RED,
            warn_fg_color: ACCENT_ORANGE,
            ..Visuals::dark()
        },
        ..Style::default()
    };

    style.spacing.item_spacing = egui::vec2(8.0, 4.0);

    style.text_styles = [
        (TextStyle::Small, FontId::new(11.0, FontFamily::Proportional)),
        (TextStyle::Body, FontId::new(13.0, FontFamily::Proportional)),
        (TextStyle::Button, FontId::new(13.0, FontFamily::Proportional)),
        (TextStyle::Heading, FontId::new(16.0, FontFamily::Proportional)),
        (TextStyle::Monospace, FontId::new(12.0, FontFamily::Monospace)),
    ]
    .into();

    ctx.set_style(style);
}
