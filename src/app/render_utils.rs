use eframe::egui::{Color32, Painter, Pos2, Rect, pos2};
use glam::Vec3;

use super::camera::OrbitCamera;

const FOG_NEAR: f32 = 10.0;
const FOG_FAR_BASE: f32 = 150.0;
const FOG_FAR_PER_LEVEL: f32 = 20.0;
const LOCKED_GRAY: Color32 = Color32::from_rgb(90, 96, 106);

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    color.gamma_multiply(opacity.clamp(0.0, 1.0))
}

/// Fog far plane; it recedes as the path gets deeper.
pub(super) fn fog_far(path_len: usize) -> f32 {
    FOG_FAR_BASE + path_len as f32 * FOG_FAR_PER_LEVEL
}

/// Linear fog amount in `[0, 1]` for a point `depth` units in front of the camera.
pub(super) fn fog_amount(depth: f32, far: f32) -> f32 {
    if far <= FOG_NEAR {
        return 1.0;
    }
    ((depth - FOG_NEAR) / (far - FOG_NEAR)).clamp(0.0, 1.0)
}

/// Emissive strength of a node sphere: grows with progress, peaks when mastered.
pub(super) fn emissive_intensity(progress: f32, completed: bool) -> f32 {
    if completed {
        1.2
    } else {
        0.2 + (progress.clamp(0.0, 100.0) / 100.0) * 0.6
    }
}

pub(super) fn node_color(primary: Color32, glow: Color32, progress: f32, completed: bool, locked: bool) -> Color32 {
    let emissive = emissive_intensity(progress, completed);
    let lit = blend_color(primary, glow, (emissive - 0.2).max(0.0) * 0.5);
    let base = blend_color(Color32::BLACK, lit, 0.55 + emissive * 0.375);
    if locked {
        blend_color(base, LOCKED_GRAY, 0.65)
    } else {
        base
    }
}

pub(super) fn draw_starfield(
    painter: &Painter,
    rect: Rect,
    camera: &OrbitCamera,
    stars: &[Vec3],
    color: Color32,
) {
    for (index, star) in stars.iter().enumerate() {
        let Some(projected) = camera.project(*star, rect) else {
            continue;
        };
        if !rect.contains(projected.screen) {
            continue;
        }
        // Cheap per-star variation in brightness.
        let brightness = 0.35 + ((index * 7919) % 100) as f32 / 160.0;
        painter.circle_filled(
            projected.screen,
            (projected.scale * 0.6).clamp(0.5, 1.8),
            with_opacity(color, brightness),
        );
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min = pos2(start.x.min(end.x) - padding, start.y.min(end.y) - padding);
    let max = pos2(start.x.max(end.x) + padding, start.y.max(end.y) + padding);
    rect.intersects(Rect::from_min_max(min, max))
}
