use crate::domain::events::RoomEvent;
use crate::domain::geometry::contact;
use crate::domain::state::Player;
use crate::domain::world::{World, pair_mut};

impl World {
    /// Resolves every unordered pair of living boats once.
    pub(crate) fn resolve_ramming(&mut self, now: f32) {
        let count = self.players.len();
        for i in 0..count {
            for j in (i + 1)..count {
                self.ram_pair(i, j, now);
            }
        }
    }

    fn ram_pair(&mut self, i: usize, j: usize, now: f32) {
        let ram = self.tuning.ram;
        let min_distance = 2.0 * ram.collision_radius;

        let (a, b) = pair_mut(&mut self.players, i, j);
        if !a.is_alive() || !b.is_alive() {
            return;
        }
        // Normal points from a to b.
        let Some(c) = contact(b.x - a.x, b.z - a.z, min_distance) else {
            return;
        };

        // Separation runs even while the pair is cooling down.
        let push = c.overlap(min_distance) / 2.0;
        a.x -= c.nx * push;
        a.z -= c.nz * push;
        b.x += c.nx * push;
        b.z += c.nz * push;

        if let Some(last) = a.ram_cooldowns.get(&b.id) {
            if now - last < ram.cooldown {
                return;
            }
        }
        a.ram_cooldowns.insert(b.id, now);
        b.ram_cooldowns.insert(a.id, now);

        let closing = (a.vx - b.vx) * c.nx + (a.vz - b.vz) * c.nz;
        if closing <= ram.min_relative_speed {
            return;
        }

        let mut base = (closing * ram.damage_factor).min(ram.max_damage);
        if a.dash.is_active() || b.dash.is_active() {
            base *= ram.dash_multiplier;
        }

        // The faster boat is the rammer and takes the smaller share.
        let a_rams = a.speed.abs() >= b.speed.abs();
        let (damage_a, damage_b) = if a_rams {
            (base * ram.faster_ratio, base * ram.slower_ratio)
        } else {
            (base * ram.slower_ratio, base * ram.faster_ratio)
        };
        let (rammer, target) = if a_rams { (a.id, b.id) } else { (b.id, a.id) };

        let mid_x = (a.x + b.x) / 2.0;
        let mid_z = (a.z + b.z) / 2.0;
        let (a_id, b_id) = (a.id, b.id);
        let (a_pos, b_pos) = ((a.x, a.z), (b.x, b.z));

        knock_back(a, ram.knockback_force);
        knock_back(b, ram.knockback_force);

        self.events.push(RoomEvent::Ram {
            x: mid_x,
            z: mid_z,
            player_a: rammer,
            player_b: target,
            intensity: (base / ram.max_damage).min(1.0),
        });

        if !self.absorb_with_shield(i, a_pos.0, a_pos.1) {
            self.damage_player(i, damage_a, Some(b_id));
        }
        if !self.absorb_with_shield(j, b_pos.0, b_pos.1) {
            self.damage_player(j, damage_b, Some(a_id));
        }
    }
}

fn knock_back(p: &mut Player, force: f32) {
    p.speed = -p.speed.abs() * 0.3 - force * 0.3;
    p.sync_velocity();
    p.dash = p.dash.cancel();
}

#[cfg(test)]
mod tests {
    use crate::domain::events::RoomEvent;
    use crate::domain::state::DashState;
    use crate::domain::test_support::{place, test_world};
    use assert_approx_eq::assert_approx_eq;

    fn head_on(speed: f32) -> crate::domain::World {
        let mut world = test_world(&[1, 2]);
        place(&mut world, 1, 0.0, 0.0);
        place(&mut world, 2, 10.0, 0.0);
        world.players[0].speed = speed;
        world.players[0].vx = speed;
        world.players[1].speed = speed;
        world.players[1].vx = -speed;
        world
    }

    fn hp_lost(world: &crate::domain::World) -> (f32, f32) {
        let max = world.tuning.arena.max_hp;
        (max - world.players[0].hp, max - world.players[1].hp)
    }

    #[test]
    fn when_boats_collide_head_on_then_damage_shares_sum_to_the_base() {
        let mut world = head_on(60.0);

        world.resolve_ramming(0.0);

        // Closing speed 120 -> base min(120 * 0.4, 80) = 48.
        let (lost_a, lost_b) = hp_lost(&world);
        assert_approx_eq!(lost_a + lost_b, 48.0, 1e-3);
        assert_approx_eq!(lost_a, 48.0 * world.tuning.ram.faster_ratio, 1e-3);
        assert!(world.events.iter().any(|e| matches!(
            e,
            RoomEvent::Ram {
                player_a: 1,
                player_b: 2,
                ..
            }
        )));
    }

    #[test]
    fn when_boats_overlap_then_they_are_separated() {
        let mut world = head_on(0.0);

        world.resolve_ramming(0.0);

        let gap = world.players[1].x - world.players[0].x;
        assert_approx_eq!(gap, 2.0 * world.tuning.ram.collision_radius, 1e-4);
        // Too slow to hurt.
        assert_eq!(hp_lost(&world), (0.0, 0.0));
    }

    #[test]
    fn when_pair_is_on_cooldown_then_no_second_damage_is_dealt() {
        let mut world = head_on(60.0);
        world.resolve_ramming(0.0);
        let first = hp_lost(&world);

        place(&mut world, 2, 10.0, 0.0);
        world.players[0].vx = 60.0;
        world.players[1].vx = -60.0;
        world.resolve_ramming(0.5);

        assert_eq!(hp_lost(&world), first);
    }

    #[test]
    fn when_a_boat_is_dashing_then_damage_is_multiplied_and_dash_cancelled() {
        let mut world = head_on(60.0);
        world.players[0].dash = DashState::Active {
            remaining: 0.2,
            cooldown: 4.0,
        };

        world.resolve_ramming(0.0);

        let (lost_a, lost_b) = hp_lost(&world);
        assert_approx_eq!(lost_a + lost_b, 48.0 * world.tuning.ram.dash_multiplier, 1e-3);
        assert!(!world.players[0].dash.is_active());
    }

    #[test]
    fn when_rammed_boat_has_a_shield_then_only_the_other_side_is_hurt() {
        let mut world = head_on(60.0);
        world.players[1].buffs.shield = 2.0;

        world.resolve_ramming(0.0);

        let (lost_a, lost_b) = hp_lost(&world);
        assert!(lost_a > 0.0);
        assert_eq!(lost_b, 0.0);
        assert!(world.events.iter().any(|e| matches!(
            e,
            RoomEvent::ShieldBreak { player_id: 2, .. }
        )));
    }

    #[test]
    fn when_boats_are_rammed_then_both_are_knocked_back() {
        let mut world = head_on(60.0);

        world.resolve_ramming(0.0);

        let expected = -60.0 * 0.3 - world.tuning.ram.knockback_force * 0.3;
        assert_approx_eq!(world.players[0].speed, expected, 1e-4);
        assert_approx_eq!(world.players[1].speed, expected, 1e-4);
    }
}
