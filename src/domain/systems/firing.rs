use crate::domain::events::RoomEvent;
use crate::domain::state::{Player, Projectile};
use crate::domain::tuning::{CannonTuning, ChargeAuthority, Tuning};

/// Tracks the charge-and-release cycle and fires on the release edge.
///
/// Pressing `shoot` stamps the charge start; letting go fires when the cannon is off
/// cooldown. Trishot spawns three projectiles but still produces a single fire event.
pub fn update_cannon(
    p: &mut Player,
    now: f32,
    tuning: &Tuning,
    next_projectile_id: &mut u64,
    projectiles: &mut Vec<Projectile>,
) -> Option<RoomEvent> {
    let cannon = &tuning.cannon;
    let shooting = p.input.shoot;

    if shooting && !p.was_shooting {
        p.charge_start = now;
    }
    let released = p.was_shooting && !shooting;
    p.was_shooting = shooting;

    if !released || p.fire_cooldown > 0.0 {
        return None;
    }
    p.fire_cooldown = cannon.cooldown;

    let power = charge_power(p, now, cannon);
    let launch_speed = cannon.launch_speed(power);
    let horizontal = launch_speed * cannon.launch_angle.cos();
    let vertical = launch_speed * cannon.launch_angle.sin();
    let bow = tuning.boat.length * cannon.bow_offset;

    let trishot = p.buffs.trishot_active();
    let spread = [-cannon.trishot_spread, 0.0, cannon.trishot_spread];
    let offsets: &[f32] = if trishot { &spread } else { &spread[1..2] };

    for offset in offsets {
        let angle = p.heading + offset;
        let (sin, cos) = angle.sin_cos();
        projectiles.push(Projectile {
            id: *next_projectile_id,
            owner_id: p.id,
            x: p.x + sin * bow,
            y: cannon.spawn_height,
            z: p.z + cos * bow,
            vx: sin * horizontal,
            vy: vertical,
            vz: cos * horizontal,
        });
        *next_projectile_id = next_projectile_id.wrapping_add(1);
    }

    Some(RoomEvent::Fire {
        player_id: p.id,
        x: p.x + p.heading.sin() * bow,
        z: p.z + p.heading.cos() * bow,
        angle: p.heading,
        power,
        trishot,
    })
}

/// Charge fraction for a release at `now`.
///
/// With client authority a positive declared fraction wins; otherwise (and always in
/// server mode) the fraction comes from the server-side charge start.
fn charge_power(p: &Player, now: f32, cannon: &CannonTuning) -> f32 {
    let elapsed = ((now - p.charge_start) / cannon.charge_time).min(1.0);
    let declared = match cannon.charge_authority {
        ChargeAuthority::Client => p.input.charge_fraction.filter(|f| *f > 0.0),
        ChargeAuthority::Server => None,
    };
    declared.unwrap_or(elapsed).clamp(0.0, 1.0)
}
