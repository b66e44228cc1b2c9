// Damage, death, kill credit and respawn.

use std::f32::consts::TAU;

use rand::Rng;

use crate::domain::events::RoomEvent;
use crate::domain::geometry::wrap_angle;
use crate::domain::king::select_king;
use crate::domain::state::{Buffs, DashState, Lifecycle, PlayerId};
use crate::domain::systems::islands::sample_spawn;
use crate::domain::world::World;

impl World {
    /// Applies damage to a living player. Returns true when this hit sank them.
    ///
    /// Hit points are clamped to the valid range and the death transition runs exactly
    /// once per crossing: further damage to a sunk boat is ignored.
    pub(crate) fn damage_player(
        &mut self,
        idx: usize,
        amount: f32,
        killer: Option<PlayerId>,
    ) -> bool {
        let max_hp = self.tuning.arena.max_hp;
        let p = &mut self.players[idx];
        if !p.is_alive() {
            return false;
        }

        p.hp = (p.hp - amount).clamp(0.0, max_hp);
        if p.hp > 0.0 {
            return false;
        }

        self.kill(idx, killer);
        true
    }

    /// Consumes an active shield instead of taking damage.
    pub(crate) fn absorb_with_shield(&mut self, idx: usize, x: f32, z: f32) -> bool {
        let p = &mut self.players[idx];
        if !p.buffs.shield_active() {
            return false;
        }
        p.buffs.shield = 0.0;
        self.events.push(RoomEvent::ShieldBreak {
            player_id: p.id,
            x,
            z,
        });
        true
    }

    fn kill(&mut self, idx: usize, killer: Option<PlayerId>) {
        let arena = self.tuning.arena;
        let bounty = self.tuning.bounty;

        let victim = &mut self.players[idx];
        victim.hp = 0.0;
        victim.lifecycle = Lifecycle::Dead {
            respawn_timer: arena.respawn_seconds,
        };
        victim.deaths += 1;
        let victim_id = victim.id;
        let victim_name = victim.name.clone();
        let victim_was_king = self.king == Some(victim_id);

        // Killers that already left the room get no credit.
        let credited = killer
            .filter(|id| *id != victim_id)
            .and_then(|id| self.players.iter_mut().find(|p| p.id == id));

        let (killer_id, killer_name, is_king_kill) = match credited {
            Some(k) => {
                k.kills += 1;
                k.score += arena.kill_score;
                if victim_was_king {
                    k.score += bounty.kill_bonus;
                }
                (Some(k.id), Some(k.name.clone()), victim_was_king)
            }
            None => (None, None, false),
        };

        tracing::debug!(
            victim_id,
            killer_id = ?killer_id,
            is_king_kill,
            "player sunk"
        );

        self.events.push(RoomEvent::Kill {
            victim_id,
            victim_name,
            killer_id,
            killer_name,
            is_king_kill,
        });

        self.refresh_king();
    }

    /// Recomputes the king and announces a change.
    pub(crate) fn refresh_king(&mut self) {
        let next = select_king(&self.players, self.king, self.tuning.bounty.min_kills);
        if next == self.king {
            return;
        }

        let new_king_name = next.and_then(|id| {
            self.players
                .iter()
                .find(|p| p.id == id)
                .map(|p| p.name.clone())
        });
        self.events.push(RoomEvent::KingChange {
            new_king_id: next,
            new_king_name,
            prev_king_id: self.king,
        });
        self.king = next;
    }

    /// Brings a sunk boat back at a fresh spawn point with a clean slate.
    pub(crate) fn respawn(&mut self, idx: usize) {
        let (x, z) = sample_spawn(&mut self.rng, &self.islands, &self.tuning.arena);
        let heading = wrap_angle(self.rng.gen_range(0.0..TAU));
        let max_hp = self.tuning.arena.max_hp;

        let p = &mut self.players[idx];
        p.lifecycle = Lifecycle::Alive;
        p.hp = max_hp;
        p.x = x;
        p.z = z;
        p.heading = heading;
        p.speed = 0.0;
        p.vx = 0.0;
        p.vz = 0.0;
        p.dash = DashState::Ready;
        p.buffs = Buffs::default();
        // A trigger held or released while sunk must not fire on the first live tick.
        p.was_shooting = false;
        p.charge_start = 0.0;
    }
}
