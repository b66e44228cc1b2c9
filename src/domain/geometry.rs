// Planar collision primitives shared by the collision phases and interpolation.

use std::f32::consts::{PI, TAU};

/// Unit normal from a reference point toward another, plus the distance between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub nx: f32,
    pub nz: f32,
    pub distance: f32,
}

impl Contact {
    /// How far the two circles interpenetrate for a given minimum distance.
    pub fn overlap(&self, min_distance: f32) -> f32 {
        min_distance - self.distance
    }
}

pub fn distance_sq(ax: f32, az: f32, bx: f32, bz: f32) -> f32 {
    let dx = ax - bx;
    let dz = az - bz;
    dx * dx + dz * dz
}

pub fn distance(ax: f32, az: f32, bx: f32, bz: f32) -> f32 {
    distance_sq(ax, az, bx, bz).sqrt()
}

/// True when the points are strictly closer than `radius`.
pub fn within(ax: f32, az: f32, bx: f32, bz: f32, radius: f32) -> bool {
    distance_sq(ax, az, bx, bz) < radius * radius
}

/// Contact between circles separated by (`dx`, `dz`) when closer than `min_distance`.
///
/// Returns `None` when they do not touch, and also when the centers coincide: there is
/// no usable normal then, so the caller skips resolution for this tick.
pub fn contact(dx: f32, dz: f32, min_distance: f32) -> Option<Contact> {
    let distance = (dx * dx + dz * dz).sqrt();
    if distance >= min_distance || distance <= 0.0 {
        return None;
    }
    Some(Contact {
        nx: dx / distance,
        nz: dz / distance,
        distance,
    })
}

/// Clamps a coordinate to `[-limit, limit]`, reporting whether it moved.
pub fn clamp_axis(value: f32, limit: f32) -> (f32, bool) {
    if value < -limit {
        (-limit, true)
    } else if value > limit {
        (limit, true)
    } else {
        (value, false)
    }
}

/// Wraps an angle into (-PI, PI].
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Interpolates headings along the shorter arc; the result is wrapped into (-PI, PI].
pub fn lerp_angle(a: f32, b: f32, t: f32) -> f32 {
    let delta = wrap_angle(b - a);
    wrap_angle(a + delta * t)
}
