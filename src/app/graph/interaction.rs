use eframe::egui::{self, Pos2, Ui};

use super::super::ViewModel;

const ORBIT_RADIANS_PER_POINT: f32 = 0.008;

/// A sphere as it landed on screen this frame.
#[derive(Clone, Copy, Debug)]
pub(super) struct ScreenTarget {
    pub slot: usize,
    pub screen: Pos2,
    pub radius: f32,
    pub depth: f32,
}

impl ViewModel {
    pub(in crate::app) fn handle_camera_dolly(&mut self, ui: &Ui, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let factor = (1.0 - (scroll * 0.0018)).clamp(0.85, 1.15);
        self.controller.camera_mut().dolly(factor);
    }

    pub(in crate::app) fn handle_camera_orbit(&mut self, response: &egui::Response) {
        if !(response.dragged_by(egui::PointerButton::Primary)
            || response.dragged_by(egui::PointerButton::Secondary))
        {
            return;
        }

        let delta = response.drag_delta();
        if delta.length_sq() <= f32::EPSILON {
            return;
        }
        self.controller.camera_mut().orbit(
            -delta.x * ORBIT_RADIANS_PER_POINT,
            delta.y * ORBIT_RADIANS_PER_POINT,
        );
    }
}

/// The sphere under the pointer; overlapping hits resolve to the one nearest the camera.
pub(super) fn hovered_target(ui: &Ui, targets: &[ScreenTarget]) -> Option<ScreenTarget> {
    let pointer = ui.input(|input| input.pointer.hover_pos())?;
    pick_target(pointer, targets)
}

fn pick_target(pointer: Pos2, targets: &[ScreenTarget]) -> Option<ScreenTarget> {
    targets
        .iter()
        .filter(|target| target.screen.distance(pointer) <= target.radius)
        .min_by(|a, b| a.depth.total_cmp(&b.depth))
        .copied()
}
