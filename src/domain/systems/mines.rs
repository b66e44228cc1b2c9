use crate::domain::events::RoomEvent;
use crate::domain::geometry::within;
use crate::domain::state::{Mine, Player};
use crate::domain::tuning::Tuning;
use crate::domain::world::World;

/// Drops a mine behind the stern when requested and off cooldown.
pub fn drop_mine(
    p: &mut Player,
    now: f32,
    tuning: &Tuning,
    next_mine_id: &mut u64,
    mines: &mut Vec<Mine>,
) -> Option<RoomEvent> {
    if !p.input.mine || p.mine_cooldown > 0.0 {
        return None;
    }
    p.mine_cooldown = tuning.mine.cooldown;

    let stern = tuning.boat.length * tuning.mine.stern_offset;
    let x = p.x - p.heading.sin() * stern;
    let z = p.z - p.heading.cos() * stern;

    mines.push(Mine {
        id: *next_mine_id,
        owner_id: p.id,
        x,
        z,
        spawned_at: now,
    });
    *next_mine_id = next_mine_id.wrapping_add(1);

    Some(RoomEvent::MineDrop {
        player_id: p.id,
        x,
        z,
    })
}

impl World {
    /// Expires old mines and detonates the rest against the first boat in reach.
    pub(crate) fn detonate_mines(&mut self, now: f32) {
        let tuning = self.tuning.mine;
        let reach = tuning.radius + self.tuning.boat.width;

        let mut mines = std::mem::take(&mut self.mines);
        mines.retain(|mine| {
            let age = now - mine.spawned_at;
            if age >= tuning.lifetime {
                return false;
            }

            // Owners get a short grace period so a fresh mine does not sink its dropper.
            let Some(idx) = self.players.iter().position(|p| {
                p.is_alive()
                    && !(p.id == mine.owner_id && age < tuning.owner_arming_time)
                    && within(p.x, p.z, mine.x, mine.z, reach)
            }) else {
                return true;
            };

            let target_id = self.players[idx].id;
            self.events.push(RoomEvent::MineExplode {
                x: mine.x,
                z: mine.z,
                target_id,
            });
            if !self.absorb_with_shield(idx, mine.x, mine.z) {
                let killer = (mine.owner_id != target_id).then_some(mine.owner_id);
                self.damage_player(idx, tuning.damage, killer);
            }
            false
        });
        self.mines = mines;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{place, test_world};
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn when_mine_is_requested_then_it_lands_behind_the_stern() {
        let tuning = Tuning::default();
        let mut p = Player::new(1, "p1".to_string(), 0, 0, 100.0);
        p.input.mine = true;
        let mut next_id = 1;
        let mut mines = Vec::new();

        let event = drop_mine(&mut p, 2.0, &tuning, &mut next_id, &mut mines);

        assert!(matches!(event, Some(RoomEvent::MineDrop { player_id: 1, .. })));
        assert_eq!(mines.len(), 1);
        assert_approx_eq!(mines[0].z, -tuning.boat.length * tuning.mine.stern_offset, 1e-5);
        assert_eq!(p.mine_cooldown, tuning.mine.cooldown);

        // Cooldown blocks the next drop.
        assert!(drop_mine(&mut p, 2.05, &tuning, &mut next_id, &mut mines).is_none());
    }

    #[test]
    fn when_owner_sits_on_a_fresh_mine_then_it_does_not_detonate() {
        let mut world = test_world(&[1]);
        place(&mut world, 1, 0.0, 0.0);
        world.mines.push(Mine {
            id: 1,
            owner_id: 1,
            x: 0.0,
            z: 0.0,
            spawned_at: 0.0,
        });

        world.detonate_mines(0.5);
        assert_eq!(world.mines.len(), 1);

        world.detonate_mines(2.0);
        assert!(world.mines.is_empty());
        assert_eq!(world.players[0].deaths, 1);
    }

    #[test]
    fn when_owner_triggers_own_mine_then_death_has_no_killer() {
        let mut world = test_world(&[1]);
        place(&mut world, 1, 0.0, 0.0);
        world.mines.push(Mine {
            id: 1,
            owner_id: 1,
            x: 0.0,
            z: 0.0,
            spawned_at: 0.0,
        });

        world.detonate_mines(5.0);

        assert!(world.events.iter().any(|e| matches!(
            e,
            RoomEvent::Kill {
                victim_id: 1,
                killer_id: None,
                ..
            }
        )));
        assert_eq!(world.players[0].kills, 0);
    }

    #[test]
    fn when_enemy_hits_a_mine_then_owner_is_credited() {
        let mut world = test_world(&[1, 2]);
        place(&mut world, 1, 500.0, 0.0);
        place(&mut world, 2, 0.0, 0.0);
        world.mines.push(Mine {
            id: 1,
            owner_id: 1,
            x: 5.0,
            z: 0.0,
            spawned_at: 0.0,
        });

        world.detonate_mines(0.1);

        assert!(!world.players[1].is_alive());
        assert_eq!(world.players[0].kills, 1);
        assert!(world.events.iter().any(|e| matches!(
            e,
            RoomEvent::MineExplode { target_id: 2, .. }
        )));
    }

    #[test]
    fn when_mine_outlives_its_lifetime_then_it_vanishes_silently() {
        let mut world = test_world(&[1]);
        place(&mut world, 1, 1000.0, 0.0);
        world.mines.push(Mine {
            id: 1,
            owner_id: 1,
            x: 0.0,
            z: 0.0,
            spawned_at: 0.0,
        });

        world.detonate_mines(world.tuning.mine.lifetime);

        assert!(world.mines.is_empty());
        assert!(world.events.is_empty());
    }
}
