use rand::Rng;

use crate::domain::events::RoomEvent;
use crate::domain::geometry::within;
use crate::domain::state::{Powerup, PowerupKind};
use crate::domain::systems::islands::sample_spawn;
use crate::domain::world::World;

impl World {
    /// Spawns one power-up every interval while the room is occupied and below the cap.
    pub(crate) fn spawn_powerup_if_due(&mut self, now: f32) {
        let tuning = self.tuning.powerup;
        if self.players.is_empty() || now - self.last_powerup_spawn < tuning.spawn_interval {
            return;
        }
        self.last_powerup_spawn = now;
        if self.powerups.len() >= tuning.max_active {
            return;
        }

        let (x, z) = sample_spawn(&mut self.rng, &self.islands, &self.tuning.arena);
        let kind = PowerupKind::ALL[self.rng.gen_range(0..PowerupKind::ALL.len())];
        let id = self.next_powerup_id;
        self.next_powerup_id = self.next_powerup_id.wrapping_add(1);

        self.powerups.push(Powerup { id, x, z, kind });
        self.events.push(RoomEvent::PowerupSpawn { id, x, z, kind });
    }

    /// Applies and removes every power-up the boat is touching.
    pub(crate) fn collect_powerups(&mut self, idx: usize) {
        let tuning = self.tuning.powerup;
        let reach = tuning.radius + self.tuning.boat.width;
        let max_hp = self.tuning.arena.max_hp;
        let p = &mut self.players[idx];

        let mut picked = Vec::new();
        self.powerups.retain(|pu| {
            if !within(p.x, p.z, pu.x, pu.z, reach) {
                return true;
            }
            match pu.kind {
                PowerupKind::Health => p.hp = (p.hp + tuning.heal).min(max_hp),
                kind => p.buffs.grant(kind, tuning.duration(kind)),
            }
            picked.push(RoomEvent::PowerupPickup {
                id: pu.id,
                player_id: p.id,
                kind: pu.kind,
            });
            false
        });
        self.events.append(&mut picked);
    }
}
