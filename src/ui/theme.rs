use egui::{Color32, FontFamily, FontId, Rounding, Stroke, TextStyle, Visuals};

pub const BG_PURE_BLACK: Color32 = Color32::from_rgb(0, 0, 0);
pub const BG_PANEL: Color32 = Color32::from_rgb(8, 8, 10);
pub const BG_WIDGET: Color32 = Color32::from_rgb(18, 18, 22);
pub const BG_WIDGET_HOVER: Color32 = Color32::from_rgb(30, 28, 32);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(168, 168, 171);
pub const TEXT_MUTED: Color32 = Color32::from_rgb(107, 107, 112);
pub const TEXT_BRIGHT: Color32 = Color32::from_rgb(220, 220, 225);

pub const ACCENT_GREEN: Color32 = Color32::from_rgb(46, 172, 35);
pub const ACCENT_RED: Color32 = Color32::from_rgb(200, 50, 40);
pub const ACCENT_BLUE: Color32 = Color32::from_rgb(84, 102, 206);
pub const ACCENT_ORANGE: Color32 = Color32::from_rgb(172, 117, 35);
/// Matches the default surface color (1.0, 0.1, 0.0).
pub const ACCENT_SURFACE: Color32 = Color32::from_rgb(255, 26, 0);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgba_premultiplied(60, 40, 40, 77);

pub fn apply_theme(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    let mut visuals = Visuals::dark();
    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.panel_fill = BG_PANEL;
    visuals.window_fill = BG_PANEL;
    visuals.extreme_bg_color = BG_PURE_BLACK;
    visuals.faint_bg_color = BG_PANEL;
    visuals.error_fg_color = ACCENT_RED;
    visuals.warn_fg_color = ACCENT_ORANGE;
    visuals.slider_trailing_fill = true;
    visuals.selection.bg_fill = ACCENT_SURFACE.gamma_multiply(0.5);
    visuals.selection.stroke = Stroke::new(1.0, ACCENT_SURFACE);

    for widget in [
        &mut visuals.widgets.noninteractive,
        &mut visuals.widgets.inactive,
    ] {
        widget.bg_fill = BG_WIDGET;
        widget.weak_bg_fill = BG_WIDGET;
        widget.bg_stroke = Stroke::new(1.0, BORDER_SUBTLE);
        widget.rounding = Rounding::same(4.0);
    }
    visuals.widgets.hovered.bg_fill = BG_WIDGET_HOVER;
    visuals.widgets.hovered.weak_bg_fill = BG_WIDGET_HOVER;
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, TEXT_BRIGHT);
    visuals.widgets.active.bg_stroke = Stroke::new(2.0, ACCENT_SURFACE);
    visuals.widgets.active.fg_stroke = Stroke::new(1.0, TEXT_BRIGHT);

    style.visuals = visuals;
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);
    style.spacing.slider_width = 170.0;

    style.text_styles = [
        (TextStyle::Small, FontId::new(11.0, FontFamily::Proportional)),
        (TextStyle::Body, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Button, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Heading, FontId::new(18.0, FontFamily::Proportional)),
        (TextStyle::Monospace, FontId::new(13.0, FontFamily::Monospace)),
    ]
    .into();

    ctx.set_style(style);
}
