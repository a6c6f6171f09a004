use std::f32::consts::{PI, TAU};

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const ROOT_SHELL_RADIUS: f32 = 40.0;
pub const SHELL_FALLOFF: f32 = 15.0;

/// `theta` is the polar angle measured from +Y, `phi` the azimuth in the XZ plane.
pub fn spherical_to_cartesian(radius: f32, theta: f32, phi: f32) -> Vec3 {
    Vec3::new(
        radius * theta.sin() * phi.cos(),
        radius * theta.cos(),
        radius * theta.sin() * phi.sin(),
    )
}

/// Places the `index`-th of `total` siblings on a shell around `parent`.
///
/// Polar angles are spread by the inverse cosine of evenly spaced heights, the
/// azimuth winds with `sqrt(total * PI)`, so siblings land on a Fibonacci-like
/// spiral. `total` must be at least 1.
pub fn child_position(parent: Vec3, index: usize, total: usize, radius: f32) -> Vec3 {
    let total = total.max(1) as f32;
    let phi = (-1.0 + (2.0 * (index as f32 + 0.5)) / total).acos();
    let theta = (total * PI).sqrt() * phi;

    parent
        + Vec3::new(
            radius * phi.sin() * theta.cos(),
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
        )
}

pub fn shell_radius(depth: usize) -> f32 {
    if depth == 0 {
        ROOT_SHELL_RADIUS
    } else {
        SHELL_FALLOFF / depth as f32
    }
}

pub fn random_point_on_sphere<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vec3 {
    let u: f32 = rng.r#gen();
    let v: f32 = rng.r#gen();
    let theta = (2.0 * u - 1.0).clamp(-1.0, 1.0).acos();
    let phi = TAU * v;
    spherical_to_cartesian(radius, theta, phi)
}

pub fn random_point_in_shell<R: Rng + ?Sized>(rng: &mut R, min_radius: f32, max_radius: f32) -> Vec3 {
    let radius = if max_radius > min_radius {
        rng.gen_range(min_radius..=max_radius)
    } else {
        min_radius
    };
    random_point_on_sphere(rng, radius)
}

/// Background scatter for a universe; stable for a given seed.
pub fn ambient_scatter(seed: u64, count: usize, min_radius: f32, max_radius: f32) -> Vec<Vec3> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| random_point_in_shell(&mut rng, min_radius, max_radius))
        .collect()
}
