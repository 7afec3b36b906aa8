//! UI overlay module
//!
//! Paints the ROI rectangle, the status banner and the action bar.

use eframe::egui;
use roi_tool::config::Config;
use roi_tool::{DisplayPoint, DisplayRect, OverlayStyle, RoiOverlay};

/// What the action bar asks the app to do this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarAction {
    StartDiagnosis,
    Cancel,
}

pub fn to_rect(rect: DisplayRect) -> egui::Rect {
    egui::Rect::from_min_size(
        egui::pos2(rect.x, rect.y),
        egui::vec2(rect.width, rect.height),
    )
}

pub fn to_point(pos: egui::Pos2) -> DisplayPoint {
    DisplayPoint::new(pos.x, pos.y)
}

pub fn rgb(rgb: [u8; 3]) -> egui::Color32 {
    egui::Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}

/// Draw the live or selected rectangle.
/// Drawing uses the provisional colour, a selected ROI the final one.
pub fn paint_roi(painter: &egui::Painter, overlay: &RoiOverlay, config: &Config) {
    let base = match overlay.style {
        OverlayStyle::Provisional => config.provisional_rgb,
        OverlayStyle::Final => config.final_rgb,
    };
    let rect = to_rect(overlay.rect);
    let fill = egui::Color32::from_rgba_unmultiplied(base[0], base[1], base[2], config.fill_alpha);
    painter.rect_filled(rect, 0.0, fill);
    painter.rect_stroke(rect, 0.0, egui::Stroke::new(config.stroke_width, rgb(base)));
}

/// Semi-transparent banner at the top centre of the window
pub fn status_banner(ctx: &egui::Context, text: &str) {
    egui::Area::new(egui::Id::new("roi_status"))
        .anchor(egui::Align2::CENTER_TOP, [0.0, 16.0])
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::none()
                .fill(egui::Color32::from_black_alpha(128))
                .rounding(8.0)
                .inner_margin(egui::Margin::symmetric(16.0, 8.0))
                .show(ui, |ui| {
                    ui.label(egui::RichText::new(text).color(egui::Color32::WHITE).size(16.0));
                });
        });
}

/// Bottom bar with "Start Diagnosis" and "Cancel"
pub fn action_bar(
    ctx: &egui::Context,
    can_submit: bool,
    notice: Option<&str>,
) -> Option<BarAction> {
    let mut action = None;
    egui::TopBottomPanel::bottom("roi_actions")
        .frame(egui::Frame::none().fill(egui::Color32::from_gray(243)).inner_margin(12.0))
        .show(ctx, |ui| {
            let width = ui.available_width();
            let primary = egui::Button::new(
                egui::RichText::new("Start Diagnosis").color(egui::Color32::WHITE).strong(),
            )
            .fill(if can_submit {
                egui::Color32::from_rgb(0, 30, 87)
            } else {
                egui::Color32::GRAY
            })
            .min_size(egui::vec2(width, 36.0));
            if ui.add_enabled(can_submit, primary).clicked() {
                action = Some(BarAction::StartDiagnosis);
            }
            ui.add_space(6.0);
            let cancel = egui::Button::new(
                egui::RichText::new("Cancel").color(egui::Color32::from_gray(55)).strong(),
            )
            .fill(egui::Color32::from_gray(229))
            .min_size(egui::vec2(width, 36.0));
            if ui.add(cancel).clicked() {
                action = Some(BarAction::Cancel);
            }
            if let Some(notice) = notice {
                ui.add_space(4.0);
                ui.label(egui::RichText::new(notice).color(egui::Color32::from_gray(80)));
            }
        });
    action
}
