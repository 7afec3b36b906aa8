//! Main application module
//!
//! Hosts the ROI tool in an egui window: feeds it layout measurements and
//! pointer events, paints the frame and the rectangle, and forwards the
//! committed ROI to the diagnosis submitter.

use eframe::egui;
use tracing::{debug, error, info};

use roi_tool::config::{Action, Config, InputBinding};
use roi_tool::frame_source::RepresentativeFrame;
use roi_tool::submission::{DiagnosisRequest, RoiSubmitter};
use roi_tool::{DisplayPoint, ImageLayout, PointerId, Roi, RoiObserver, RoiTool, ViewportGeometry};

use crate::ui::{self, BarAction};

/// Egui only reports one primary pointer.
const PRIMARY: PointerId = PointerId(0);

/// Collects callbacks from the ROI tool until the app handles them
#[derive(Debug, Default)]
pub struct SelectionInbox {
    pub selected: Option<Roi>,
    pub cancelled: bool,
}

impl RoiObserver for SelectionInbox {
    fn on_roi_selected(&mut self, roi: Roi) {
        self.selected = Some(roi);
    }

    fn on_cancelled(&mut self) {
        self.selected = None;
        self.cancelled = true;
    }
}

/// Where to report a release. Releases outside the window come without a
/// position; the gesture must still end.
fn release_point(current: Option<egui::Pos2>, last: Option<egui::Pos2>) -> DisplayPoint {
    ui::to_point(current.or(last).unwrap_or(egui::Pos2::ZERO))
}

/// Application state
pub struct RoiApp {
    /// Configuration
    config: Config,
    /// Gesture state machine and coordinate mapping
    tool: RoiTool<SelectionInbox>,
    /// Frame waiting to be bound once the panel has a size
    pending_frame: Option<RepresentativeFrame>,
    /// Texture of the representative frame
    texture: egui::TextureHandle,
    /// Destination for diagnosis requests
    submitter: Box<dyn RoiSubmitter>,
    /// Reference to the video the frame was taken from
    video: Option<String>,
    /// Last viewport handed to the tool
    last_viewport: Option<ViewportGeometry>,
    /// Last layout handed to the tool
    last_layout: Option<ImageLayout>,
    /// Feedback under the action bar
    notice: Option<String>,
    /// Last pointer position seen over the window
    last_pointer: Option<egui::Pos2>,
}

impl RoiApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: Config,
        frame: RepresentativeFrame,
        submitter: Box<dyn RoiSubmitter>,
        video: Option<String>,
    ) -> Self {
        let mut visuals = egui::Visuals::light();
        let bg = ui::rgb(config.background_rgb);
        visuals.window_fill = bg;
        visuals.panel_fill = bg;
        cc.egui_ctx.set_visuals(visuals);

        let image = egui::ColorImage::from_rgba_unmultiplied(
            [frame.pixel_width as usize, frame.pixel_height as usize],
            &frame.rgba,
        );
        let texture = cc
            .egui_ctx
            .load_texture("roi_frame", image, egui::TextureOptions::LINEAR);

        let tool = RoiTool::new(SelectionInbox::default())
            .with_min_size(config.min_roi_size)
            .with_vertical_align(config.vertical_align());

        Self {
            config,
            tool,
            pending_frame: Some(frame),
            texture,
            submitter,
            video,
            last_viewport: None,
            last_layout: None,
            notice: None,
            last_pointer: None,
        }
    }

    fn run_action(&mut self, ctx: &egui::Context, action: Action) {
        match action {
            Action::Cancel => self.tool.cancel(),
            Action::Confirm => self.start_diagnosis(),
            Action::Exit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
        }
    }

    fn start_diagnosis(&mut self) {
        let Some(roi) = self.tool.committed() else {
            debug!("confirm without a selected roi ignored");
            return;
        };
        let request = DiagnosisRequest::new(roi, self.video.clone());
        match self.submitter.submit(&request) {
            Ok(()) => {
                info!(?roi, "diagnosis requested");
                self.notice = Some(format!(
                    "Diagnosis requested for {}×{} px at ({}, {})",
                    roi.width, roi.height, roi.x, roi.y
                ));
            }
            Err(e) => {
                error!("diagnosis request failed: {e}");
                self.notice = Some("Failed to process diagnosis. Please try again.".to_string());
            }
        }
    }

    /// Handle keyboard shortcuts
    fn handle_input(&mut self, ctx: &egui::Context) {
        let pressed: Vec<InputBinding> = ctx.input(|input| {
            input
                .events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        repeat: false,
                        modifiers,
                        ..
                    } => Some(InputBinding::from_key_press(*key, *modifiers)),
                    _ => None,
                })
                .collect()
        });
        let actions: Vec<Action> = pressed
            .iter()
            .filter_map(|binding| self.config.action_for(binding))
            .collect();
        for action in actions {
            self.run_action(ctx, action);
        }
    }

    /// Keep the tool's viewport and layout in step with the panel.
    fn sync_layout(&mut self, ctx: &egui::Context, area: egui::Rect) {
        let screen_height = ctx
            .input(|i| i.raw.viewport().monitor_size)
            .map(|size| size.y)
            .unwrap_or_else(|| ctx.screen_rect().height());
        let viewport = ViewportGeometry::with_fallback_height(
            area.width(),
            area.height(),
            screen_height,
            self.config.fallback_height_fraction,
        );

        if let Some(frame) = self.pending_frame.take() {
            if let Err(e) = self.tool.initialize(frame.frame.clone(), viewport) {
                // Retry once the panel has a usable size.
                debug!("frame not bound yet: {e}");
                self.pending_frame = Some(frame);
                return;
            }
            self.last_viewport = Some(viewport);
        } else if self.last_viewport != Some(viewport) {
            self.tool.viewport_resized(viewport);
            self.last_viewport = Some(viewport);
        }

        let layout = ImageLayout::new(area.min.x, area.min.y, area.width(), area.height());
        if self.last_layout != Some(layout) {
            self.tool.viewport_measured(layout);
            self.last_layout = Some(layout);
        }
    }

    /// Translate primary-button input over the frame area into pointer events
    fn handle_pointer(&mut self, ctx: &egui::Context, response: &egui::Response) {
        let (pressed, released, down, pos) = ctx.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.primary_down(),
                i.pointer.interact_pos(),
            )
        });
        if let Some(pos) = pos {
            self.last_pointer = Some(pos);
            let point = ui::to_point(pos);
            if pressed && response.hovered() {
                self.tool.pointer_down(PRIMARY, point);
            } else if down && self.tool.in_progress().is_some() {
                self.tool.pointer_move(PRIMARY, point);
            }
        }
        if released {
            self.tool
                .pointer_up(PRIMARY, release_point(pos, self.last_pointer));
        }
    }

    /// Draw the frame and the ROI rectangle
    fn draw_frame(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(ui::rgb(self.config.background_rgb)))
            .show(ctx, |ui| {
                let area = ui.available_rect_before_wrap();
                let response = ui.allocate_rect(area, egui::Sense::click_and_drag());
                self.sync_layout(ctx, area);
                self.handle_pointer(ctx, &response);

                let painter = ui.painter_at(area);
                let image_rect = self.tool.mapper().ok().and_then(|m| m.image_rect());
                match image_rect {
                    Some(rect) => {
                        painter.image(
                            self.texture.id(),
                            ui::to_rect(rect),
                            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                            egui::Color32::WHITE,
                        );
                    }
                    None => {
                        painter.text(
                            area.center(),
                            egui::Align2::CENTER_CENTER,
                            "Loading ROI frame...",
                            egui::FontId::proportional(16.0),
                            egui::Color32::GRAY,
                        );
                    }
                }

                if let Some(overlay) = self.tool.overlay() {
                    ui::paint_roi(&painter, &overlay, &self.config);
                }
                if self.tool.in_progress().is_some() {
                    ctx.set_cursor_icon(egui::CursorIcon::Crosshair);
                }
            });
    }
}

impl eframe::App for RoiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_input(ctx);

        let can_submit = self.tool.committed().is_some();
        match ui::action_bar(ctx, can_submit, self.notice.as_deref()) {
            Some(BarAction::StartDiagnosis) => self.start_diagnosis(),
            Some(BarAction::Cancel) => self.tool.cancel(),
            None => {}
        }

        self.draw_frame(ctx);
        ui::status_banner(ctx, &self.tool.status_label());

        let inbox = self.tool.observer_mut();
        if let Some(roi) = inbox.selected.take() {
            self.notice = None;
            debug!(?roi, "roi ready for diagnosis");
        }
        if std::mem::take(&mut inbox.cancelled) {
            info!("selection cancelled, closing");
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_outside_window_uses_last_position() {
        let last = Some(egui::pos2(120.0, 80.0));
        assert_eq!(release_point(None, last), DisplayPoint::new(120.0, 80.0));
        assert_eq!(
            release_point(Some(egui::pos2(5.0, 6.0)), last),
            DisplayPoint::new(5.0, 6.0)
        );
        assert_eq!(release_point(None, None), DisplayPoint::new(0.0, 0.0));
    }

    #[test]
    fn test_release_without_position_ends_drawing() {
        let mut tool = RoiTool::new(SelectionInbox::default());
        tool.initialize(
            roi_tool::Frame::new(400, 225, "frame.png").unwrap(),
            ViewportGeometry::new(400.0, 800.0),
        )
        .unwrap();
        tool.viewport_measured(ImageLayout::new(0.0, 0.0, 400.0, 800.0));
        tool.pointer_down(PRIMARY, DisplayPoint::new(10.0, 10.0));
        tool.pointer_move(PRIMARY, DisplayPoint::new(120.0, 80.0));
        tool.pointer_up(PRIMARY, release_point(None, Some(egui::pos2(120.0, 80.0))));
        assert!(tool.in_progress().is_none());
        assert_eq!(
            tool.observer().selected,
            Some(Roi { x: 10, y: 10, width: 110, height: 70 })
        );
    }
}
