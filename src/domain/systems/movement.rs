use crate::domain::events::RoomEvent;
use crate::domain::geometry::{clamp_axis, lerp, wrap_angle};
use crate::domain::state::{DashState, Player, countdown};
use crate::domain::tuning::{ArenaTuning, Tuning};

/// Runs every per-boat countdown by one step.
pub fn advance_timers(p: &mut Player, dt: f32) {
    p.buffs.advance(dt);
    p.dash = p.dash.advance(dt);
    p.fire_cooldown = countdown(p.fire_cooldown, dt);
    p.mine_cooldown = countdown(p.mine_cooldown, dt);
}

/// Advances a living boat by one tick: timers, dash, steering, speed and position.
///
/// Returns the dash event when a dash started this tick. The event carries the
/// position the dash started from.
pub fn tick_boat(p: &mut Player, tuning: &Tuning, dt: f32) -> Option<RoomEvent> {
    let boat = &tuning.boat;
    let dash = &tuning.dash;

    advance_timers(p, dt);

    let mut dash_event = None;
    if p.input.dash && p.dash == DashState::Ready && p.speed.abs() > dash.min_speed {
        p.dash = DashState::Active {
            remaining: dash.duration,
            cooldown: dash.cooldown,
        };
        dash_event = Some(RoomEvent::Dash {
            player_id: p.id,
            x: p.x,
            z: p.z,
            angle: p.heading,
        });
    }

    // Turning is sluggish near a standstill.
    let speed_fraction = (p.speed.abs() / boat.max_speed).min(1.0);
    let turn_rate = boat.angular_speed * lerp(boat.min_turn_fraction, 1.0, speed_fraction);
    if p.input.left {
        p.heading += turn_rate * dt;
    }
    if p.input.right {
        p.heading -= turn_rate * dt;
    }
    p.heading = wrap_angle(p.heading);

    let boosted = p.buffs.speed_active();
    let (accel_mult, max_speed) = if boosted {
        (
            boat.speed_buff_acceleration,
            boat.max_speed * boat.speed_buff_max_speed,
        )
    } else {
        (1.0, boat.max_speed)
    };

    if p.input.forward {
        p.speed += boat.acceleration * accel_mult * dt;
    } else if p.input.backward {
        p.speed -= boat.reverse_acceleration * dt;
    }

    if p.dash.is_active() {
        p.speed = dash.speed;
    } else {
        p.speed = p
            .speed
            .clamp(-max_speed * boat.reverse_fraction, max_speed);
        // Drag is normalized to the tick rate so it does not depend on the step size.
        p.speed *= boat.drag.powf(dt * tuning.arena.tick_rate);
        if p.speed.abs() < boat.stop_threshold {
            p.speed = 0.0;
        }
    }

    p.sync_velocity();
    p.x += p.vx * dt;
    p.z += p.vz * dt;

    dash_event
}

/// Keeps a boat inside the playable square, bouncing it off each wall it touches.
pub fn clamp_to_map(p: &mut Player, arena: &ArenaTuning) {
    let limit = arena.map_half() - arena.boundary_margin;

    let (x, hit_x) = clamp_axis(p.x, limit);
    if hit_x {
        p.x = x;
        p.speed *= arena.wall_bounce;
    }

    let (z, hit_z) = clamp_axis(p.z, limit);
    if hit_z {
        p.z = z;
        p.speed *= arena.wall_bounce;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state::PlayerInput;
    use assert_approx_eq::assert_approx_eq;

    fn boat() -> Player {
        Player::new(1, "p1".to_string(), 0, 0, 100.0)
    }

    #[test]
    fn when_forward_is_held_then_speed_follows_the_drag_recurrence() {
        let tuning = Tuning::default();
        let dt = tuning.dt();
        let mut p = boat();
        p.input = PlayerInput {
            forward: true,
            ..PlayerInput::default()
        };

        let ticks = (2.0 / dt).round() as i32;
        for _ in 0..ticks {
            tick_boat(&mut p, &tuning, dt);
        }

        // s(n+1) = (s(n) + a*dt) * drag  =>  s(n) = a*dt*drag/(1-drag) * (1 - drag^n)
        let step = tuning.boat.acceleration * dt;
        let drag = tuning.boat.drag;
        let expected = step * drag / (1.0 - drag) * (1.0 - drag.powi(ticks));
        assert_approx_eq!(p.speed, expected, 1e-2);
        assert!(p.speed <= (tuning.boat.acceleration * 2.0).min(tuning.boat.max_speed));

        // Heading 0 faces +Z.
        assert_approx_eq!(p.x, 0.0, 1e-4);
        assert!(p.z > 0.0);
    }

    #[test]
    fn when_speed_buff_is_active_then_acceleration_and_cap_are_raised() {
        let tuning = Tuning::default();
        let dt = tuning.dt();
        let boat_tuning = tuning.boat;
        let mut p = boat();
        p.buffs.speed = 1_000.0;
        p.input = PlayerInput {
            forward: true,
            ..PlayerInput::default()
        };

        tick_boat(&mut p, &tuning, dt);
        let first_step = boat_tuning.acceleration * boat_tuning.speed_buff_acceleration * dt;
        assert_approx_eq!(p.speed, first_step * boat_tuning.drag, 1e-4);

        for _ in 0..600 {
            tick_boat(&mut p, &tuning, dt);
        }

        let boosted_cap = boat_tuning.max_speed * boat_tuning.speed_buff_max_speed;
        assert!(p.speed > boat_tuning.max_speed);
        assert!(p.speed <= boosted_cap);
        assert_approx_eq!(p.speed, boosted_cap * boat_tuning.drag, 1e-3);
    }

    #[test]
    fn when_speed_buff_expires_then_speed_falls_back_under_the_base_cap() {
        let tuning = Tuning::default();
        let dt = tuning.dt();
        let mut p = boat();
        p.speed = tuning.boat.max_speed * tuning.boat.speed_buff_max_speed;
        p.buffs.speed = dt;
        p.input = PlayerInput {
            forward: true,
            ..PlayerInput::default()
        };

        tick_boat(&mut p, &tuning, dt);

        assert!(!p.buffs.speed_active());
        assert!(p.speed <= tuning.boat.max_speed);
    }

    #[test]
    fn when_forward_and_backward_are_both_held_then_forward_wins() {
        let tuning = Tuning::default();
        let mut p = boat();
        p.input = PlayerInput {
            forward: true,
            backward: true,
            ..PlayerInput::default()
        };

        tick_boat(&mut p, &tuning, tuning.dt());
        assert!(p.speed > 0.0);
    }

    #[test]
    fn when_reversing_then_speed_is_capped_at_reverse_fraction() {
        let tuning = Tuning::default();
        let mut p = boat();
        p.speed = -100.0;
        p.input = PlayerInput {
            backward: true,
            ..PlayerInput::default()
        };

        tick_boat(&mut p, &tuning, tuning.dt());
        let cap = tuning.boat.max_speed * tuning.boat.reverse_fraction;
        assert!(p.speed >= -cap);
    }

    #[test]
    fn when_dash_is_requested_while_moving_then_speed_is_forced() {
        let tuning = Tuning::default();
        let mut p = boat();
        p.speed = 50.0;
        p.input = PlayerInput {
            dash: true,
            ..PlayerInput::default()
        };

        let event = tick_boat(&mut p, &tuning, tuning.dt());

        assert!(matches!(event, Some(RoomEvent::Dash { player_id: 1, .. })));
        assert!(p.dash.is_active());
        assert_eq!(p.speed, tuning.dash.speed);

        // Held dash does not retrigger during the cooldown.
        assert!(tick_boat(&mut p, &tuning, tuning.dt()).is_none());
    }

    #[test]
    fn when_boat_is_idle_then_dash_is_refused() {
        let tuning = Tuning::default();
        let mut p = boat();
        p.input = PlayerInput {
            dash: true,
            ..PlayerInput::default()
        };

        assert!(tick_boat(&mut p, &tuning, tuning.dt()).is_none());
        assert_eq!(p.dash, DashState::Ready);
    }

    #[test]
    fn when_stationary_then_turn_rate_is_reduced() {
        let tuning = Tuning::default();
        let dt = tuning.dt();
        let mut p = boat();
        p.input = PlayerInput {
            left: true,
            ..PlayerInput::default()
        };

        tick_boat(&mut p, &tuning, dt);
        assert_approx_eq!(
            p.heading,
            tuning.boat.angular_speed * tuning.boat.min_turn_fraction * dt,
            1e-6
        );
    }

    #[test]
    fn when_boat_crosses_the_edge_then_it_is_clamped_and_bounced() {
        let arena = ArenaTuning::default();
        let mut p = boat();
        p.x = arena.map_half() + 10.0;
        p.speed = 40.0;

        clamp_to_map(&mut p, &arena);

        assert_eq!(p.x, arena.map_half() - arena.boundary_margin);
        assert_approx_eq!(p.speed, -20.0, 1e-6);
    }
}
