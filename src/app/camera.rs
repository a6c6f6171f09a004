use eframe::egui::{Pos2, Rect, pos2};
use glam::Vec3;

pub const FIELD_OF_VIEW_DEGREES: f32 = 60.0;
pub const FLY_DURATION_SECS: f64 = 1.5;
pub const OVERVIEW_DURATION_SECS: f64 = 2.0;
const NEAR_PLANE: f32 = 0.1;
const MIN_ORBIT_DISTANCE: f32 = 4.0;
const MAX_ORBIT_DISTANCE: f32 = 450.0;
const MAX_PITCH: f32 = 1.45;

/// Distance kept between camera and subject when flying to a node.
pub fn framing_distance(size: f32) -> f32 {
    15.0 + size * 3.0
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Easing {
    /// Overshoots past the end and settles back; the value is the overshoot strength.
    BackOut(f32),
    Power2InOut,
    Power3InOut,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::BackOut(overshoot) => {
                let shifted = t - 1.0;
                1.0 + (overshoot + 1.0) * shifted.powi(3) + overshoot * shifted.powi(2)
            }
            Self::Power2InOut => {
                if t < 0.5 {
                    4.0 * t.powi(3)
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Self::Power3InOut => {
                if t < 0.5 {
                    8.0 * t.powi(4)
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    pub start: Vec3,
    pub end: Vec3,
    pub start_time: f64,
    pub duration: f64,
    pub easing: Easing,
}

impl Tween {
    /// Value at `now` and whether the tween has run its course.
    pub fn sample(&self, now: f64) -> (Vec3, bool) {
        if self.duration <= 0.0 || now >= self.start_time + self.duration {
            return (self.end, true);
        }
        let t = ((now - self.start_time) / self.duration).max(0.0) as f32;
        (self.start.lerp(self.end, self.easing.apply(t)), false)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitCamera {
    pub position: Vec3,
    pub pivot: Vec3,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 100.0),
            pivot: Vec3::ZERO,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    pub screen: Pos2,
    /// Screen pixels per world unit at the point's depth.
    pub scale: f32,
    pub depth: f32,
}

impl OrbitCamera {
    fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let forward = (self.pivot - self.position).try_normalize().unwrap_or(Vec3::NEG_Z);
        let right = forward.cross(Vec3::Y).try_normalize().unwrap_or(Vec3::X);
        let up = right.cross(forward);
        (forward, right, up)
    }

    pub fn project(&self, world: Vec3, rect: Rect) -> Option<Projected> {
        let (forward, right, up) = self.basis();
        let relative = world - self.position;
        let depth = relative.dot(forward);
        if depth <= NEAR_PLANE {
            return None;
        }

        let focal = (rect.height() * 0.5) / (FIELD_OF_VIEW_DEGREES.to_radians() * 0.5).tan();
        let scale = focal / depth;
        let center = rect.center();
        Some(Projected {
            screen: pos2(
                center.x + relative.dot(right) * scale,
                center.y - relative.dot(up) * scale,
            ),
            scale,
            depth,
        })
    }

    pub fn distance(&self) -> f32 {
        self.position.distance(self.pivot)
    }
}

/// Drives the orbit camera through replaceable tweens, one per animated entity.
#[derive(Clone, Debug, Default)]
pub struct CameraDirector {
    camera: OrbitCamera,
    position_tween: Option<Tween>,
    pivot_tween: Option<Tween>,
}

impl CameraDirector {
    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    #[cfg(test)]
    pub fn position_tween(&self) -> Option<&Tween> {
        self.position_tween.as_ref()
    }

    #[cfg(test)]
    pub fn pivot_tween(&self) -> Option<&Tween> {
        self.pivot_tween.as_ref()
    }

    pub fn is_animating(&self) -> bool {
        self.position_tween.is_some() || self.pivot_tween.is_some()
    }

    pub fn fly_to(&mut self, target: Vec3, size: f32, now: f64) {
        let direction = (self.camera.position - target)
            .try_normalize()
            .unwrap_or(Vec3::Z);
        let destination = target + direction * framing_distance(size);
        tracing::debug!(?target, size, "camera fly-to");

        self.position_tween = Some(Tween {
            start: self.camera.position,
            end: destination,
            start_time: now,
            duration: FLY_DURATION_SECS,
            easing: Easing::BackOut(1.2),
        });
        self.pivot_tween = Some(Tween {
            start: self.camera.pivot,
            end: target,
            start_time: now,
            duration: FLY_DURATION_SECS,
            easing: Easing::Power2InOut,
        });
    }

    pub fn return_to_overview(&mut self, home: Vec3, now: f64) {
        tracing::debug!(?home, "camera returning to overview");
        self.position_tween = Some(Tween {
            start: self.camera.position,
            end: home,
            start_time: now,
            duration: OVERVIEW_DURATION_SECS,
            easing: Easing::Power3InOut,
        });
        self.pivot_tween = Some(Tween {
            start: self.camera.pivot,
            end: Vec3::ZERO,
            start_time: now,
            duration: OVERVIEW_DURATION_SECS,
            easing: Easing::Power3InOut,
        });
    }

    /// Advances running tweens; returns true while anything is still moving.
    pub fn tick(&mut self, now: f64) -> bool {
        if let Some(tween) = self.position_tween {
            let (value, done) = tween.sample(now);
            self.camera.position = value;
            if done {
                self.position_tween = None;
            }
        }
        if let Some(tween) = self.pivot_tween {
            let (value, done) = tween.sample(now);
            self.camera.pivot = value;
            if done {
                self.pivot_tween = None;
            }
        }
        self.is_animating()
    }

    fn cancel(&mut self) {
        self.position_tween = None;
        self.pivot_tween = None;
    }

    /// Rotates the camera around its pivot; manual input cancels tweens.
    pub fn orbit(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.cancel();
        let offset = self.camera.position - self.camera.pivot;
        let radius = offset.length().max(MIN_ORBIT_DISTANCE);
        let yaw = offset.x.atan2(offset.z) + yaw_delta;
        let pitch = ((offset.y / radius).clamp(-1.0, 1.0).asin() + pitch_delta)
            .clamp(-MAX_PITCH, MAX_PITCH);

        self.camera.position = self.camera.pivot
            + Vec3::new(
                radius * pitch.cos() * yaw.sin(),
                radius * pitch.sin(),
                radius * pitch.cos() * yaw.cos(),
            );
    }

    pub fn dolly(&mut self, factor: f32) {
        self.cancel();
        let offset = self.camera.position - self.camera.pivot;
        let Some(direction) = offset.try_normalize() else {
            return;
        };
        let distance = (offset.length() * factor).clamp(MIN_ORBIT_DISTANCE, MAX_ORBIT_DISTANCE);
        self.camera.position = self.camera.pivot + direction * distance;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        a.distance(b) < 1e-3
    }

    #[test]
    fn easings_hit_their_endpoints() {
        for easing in [Easing::BackOut(1.2), Easing::Power2InOut, Easing::Power3InOut] {
            assert!(easing.apply(0.0).abs() < 1e-6);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6);
        }
        assert!((Easing::Power2InOut.apply(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn back_out_overshoots_before_settling() {
        let peak = (1..100)
            .map(|step| Easing::BackOut(1.2).apply(step as f32 / 100.0))
            .fold(f32::MIN, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn fly_to_frames_target_along_view_direction() {
        let mut director = CameraDirector::default();
        let target = Vec3::new(0.0, 0.0, 40.0);
        director.fly_to(target, 3.0, 0.0);

        assert!(director.is_animating());
        assert!(!director.tick(FLY_DURATION_SECS + 0.01));

        let camera = director.camera();
        assert!(approx(camera.pivot, target));
        assert!(approx(camera.position, Vec3::new(0.0, 0.0, 40.0 + framing_distance(3.0))));
    }

    #[test]
    fn fly_to_handles_camera_sitting_on_target() {
        let mut director = CameraDirector::default();
        let target = director.camera().position;
        director.fly_to(target, 1.0, 0.0);
        director.tick(10.0);
        assert!(approx(director.camera().position, target + Vec3::Z * framing_distance(1.0)));
    }

    #[test]
    fn retargeting_replaces_the_running_tween() {
        let mut director = CameraDirector::default();
        director.fly_to(Vec3::new(30.0, 0.0, 0.0), 2.0, 0.0);
        director.tick(0.5);
        let midway = director.camera().pivot;

        director.fly_to(Vec3::new(-30.0, 0.0, 0.0), 2.0, 0.5);
        let tween = director.pivot_tween().unwrap();
        assert_eq!(tween.start, midway);
        assert_eq!(tween.end, Vec3::new(-30.0, 0.0, 0.0));
        assert_eq!(tween.start_time, 0.5);

        director.tick(0.5 + FLY_DURATION_SECS);
        assert!(approx(director.camera().pivot, Vec3::new(-30.0, 0.0, 0.0)));
        assert!(!director.is_animating());
    }

    #[test]
    fn overview_returns_home_over_longer_duration() {
        let mut director = CameraDirector::default();
        director.fly_to(Vec3::new(10.0, 5.0, 0.0), 2.0, 0.0);
        director.tick(FLY_DURATION_SECS);

        let home = Vec3::new(0.0, 0.0, 100.0);
        director.return_to_overview(home, 10.0);
        assert!(director.tick(10.0 + FLY_DURATION_SECS));
        assert!(!director.tick(10.0 + OVERVIEW_DURATION_SECS));
        assert!(approx(director.camera().position, home));
        assert!(approx(director.camera().pivot, Vec3::ZERO));
    }

    #[test]
    fn manual_orbit_cancels_tweens_and_keeps_distance() {
        let mut director = CameraDirector::default();
        director.fly_to(Vec3::X * 20.0, 2.0, 0.0);
        director.orbit(0.4, 0.2);
        assert!(!director.is_animating());

        let before = director.camera().distance();
        director.orbit(1.0, -0.3);
        assert!((director.camera().distance() - before).abs() < 1e-3);

        director.dolly(0.5);
        assert!((director.camera().distance() - before * 0.5).abs() < 1e-3);
    }

    #[test]
    fn projection_centers_pivot_and_culls_behind_camera() {
        let camera = OrbitCamera::default();
        let rect = Rect::from_min_size(Pos2::ZERO, eframe::egui::vec2(800.0, 600.0));

        let center = camera.project(Vec3::ZERO, rect).unwrap();
        assert!((center.screen.x - 400.0).abs() < 1e-3);
        assert!((center.screen.y - 300.0).abs() < 1e-3);

        let right = camera.project(Vec3::new(10.0, 0.0, 0.0), rect).unwrap();
        assert!(right.screen.x > 400.0);
        let up = camera.project(Vec3::new(0.0, 10.0, 0.0), rect).unwrap();
        assert!(up.screen.y < 300.0);

        let near = camera.project(Vec3::new(0.0, 0.0, 50.0), rect).unwrap();
        assert!(near.scale > center.scale);
        assert!(camera.project(Vec3::new(0.0, 0.0, 150.0), rect).is_none());
    }
}
