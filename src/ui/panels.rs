use egui::{Color32, Context, RichText, Ui};

use crate::config::MAX_STEPS;
use crate::ui::state::{FrameStats, UiState};
use crate::ui::theme::*;

#[derive(Default)]
pub struct UiActions {
    pub regenerate: Option<(u32, u32)>,
    pub reset_view: bool,
    pub quit: bool,
}

pub fn draw_side_panel(
    ctx: &Context,
    state: &mut UiState,
    stats: &FrameStats,
    last_error: &Option<String>,
) -> UiActions {
    let mut actions = UiActions::default();

    egui::SidePanel::right("control_panel")
        .min_width(260.0)
        .max_width(360.0)
        .default_width(280.0)
        .frame(egui::Frame::default().fill(BG_PANEL).inner_margin(16.0))
        .show(ctx, |ui| {
            ui.heading(RichText::new("RICHMOND").strong());
            ui.add_space(4.0);
            ui.label(RichText::new("Minimal surface viewer").color(TEXT_MUTED).size(11.0));
            ui.add_space(16.0);

            section_header(ui, "GRANULARITY");
            let u_changed = ui
                .add(egui::Slider::new(&mut state.u_steps, 1..=MAX_STEPS).text("u"))
                .changed();
            let v_changed = ui
                .add(egui::Slider::new(&mut state.v_steps, 1..=MAX_STEPS).text("v"))
                .changed();
            if u_changed || v_changed {
                actions.regenerate = Some((state.u_steps, state.v_steps));
            }

            if let Some(err) = last_error {
                ui.add_space(8.0);
                ui.label(RichText::new(err).color(ACCENT_RED).size(11.0));
            }
            ui.add_space(16.0);

            section_header(ui, "VIEW");
            ui.horizontal(|ui| {
                if ui.button("Reset rotation").clicked() {
                    actions.reset_view = true;
                }
                ui.checkbox(&mut state.show_help, "Help");
                ui.checkbox(&mut state.show_stats, "Stats");
            });
            ui.add_space(16.0);

            ui.separator();
            ui.add_space(12.0);

            if state.show_stats {
                stats_panel(ui, stats);
                ui.add_space(16.0);
            }

            if ui
                .add(
                    egui::Button::new(RichText::new("Quit").color(BG_PURE_BLACK))
                        .fill(ACCENT_SURFACE)
                        .min_size(egui::vec2(ui.available_width(), 28.0)),
                )
                .clicked()
            {
                actions.quit = true;
            }
        });

    actions
}

fn section_header(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).color(TEXT_MUTED).size(11.0).strong());
    ui.add_space(4.0);
}

fn stats_panel(ui: &mut Ui, stats: &FrameStats) {
    section_header(ui, "STATISTICS");
    egui::Frame::default()
        .fill(BG_WIDGET)
        .stroke(egui::Stroke::new(1.0, BORDER_SUBTLE))
        .rounding(6.0)
        .inner_margin(12.0)
        .show(ui, |ui| {
            ui.style_mut().override_font_id = Some(egui::FontId::new(11.0, egui::FontFamily::Monospace));

            let fps_color = if stats.fps >= 29.0 { ACCENT_GREEN } else if stats.fps >= 20.0 { ACCENT_ORANGE } else { ACCENT_RED };

            egui::Grid::new("stats").num_columns(2).spacing([20.0, 4.0]).show(ui, |ui| {
                ui.label(RichText::new("FPS").color(TEXT_MUTED));
                ui.label(RichText::new(format!("{:.0}", stats.fps)).color(fps_color));
                ui.end_row();

                ui.label(RichText::new("Grid").color(TEXT_MUTED));
                ui.label(RichText::new(format!("{} x {}", stats.u_steps, stats.v_steps)).color(TEXT_PRIMARY));
                ui.end_row();

                ui.label(RichText::new("Vertices").color(TEXT_MUTED));
                ui.label(RichText::new(fmt_num(stats.vertices)).color(ACCENT_BLUE));
                ui.end_row();

                ui.label(RichText::new("Triangles").color(TEXT_MUTED));
                ui.label(RichText::new(fmt_num(stats.triangles)).color(ACCENT_SURFACE));
                ui.end_row();
            });
        });
}

pub fn draw_help_overlay(ctx: &Context) {
    egui::Area::new(egui::Id::new("help_overlay"))
        .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(12.0, -12.0))
        .show(ctx, |ui| {
            egui::Frame::default()
                .fill(Color32::from_black_alpha(180))
                .rounding(6.0)
                .inner_margin(10.0)
                .show(ui, |ui| {
                    ui.style_mut().override_font_id = Some(egui::FontId::new(11.0, egui::FontFamily::Monospace));
                    ui.label(RichText::new("LMB+Drag - Rotate | R - Reset | Esc - Quit").color(TEXT_MUTED));
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
    use super::*;

    #[test]
    fn formats_counts() {
        assert_eq!(fmt_num(999), "999");
        assert_eq!(fmt_num(2_601), "2.6K");
        assert_eq!(fmt_num(40_401), "40.4K");
        assert_eq!(fmt_num(1_250_000), "1.25M");
    }
}
