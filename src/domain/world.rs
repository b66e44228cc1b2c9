// One room's simulation universe and its fixed-step tick.

use std::f32::consts::TAU;

use rand::Rng;
use rand::rngs::StdRng;

use super::events::RoomEvent;
use super::geometry::wrap_angle;
use super::state::{
    Island, Lifecycle, Mine, Player, PlayerId, PlayerInput, Powerup, Projectile, WorldSnapshot,
    countdown,
};
use super::systems::{firing, islands, mines, movement};
use super::tuning::{PLAYER_COLORS, Tuning};

/// Why a player could not be added to a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinRejected {
    RoomFull,
    AlreadyJoined,
}

/// Everything a tick produced: the authoritative snapshot and the events queued
/// while producing it, in emission order.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub snapshot: WorldSnapshot,
    pub events: Vec<RoomEvent>,
}

pub struct World {
    pub(crate) tuning: Tuning,
    pub(crate) players: Vec<Player>,
    pub(crate) projectiles: Vec<Projectile>,
    pub(crate) mines: Vec<Mine>,
    pub(crate) powerups: Vec<Powerup>,
    pub(crate) islands: Vec<Island>,

    pub(crate) tick: u64,
    pub(crate) next_projectile_id: u64,
    pub(crate) next_mine_id: u64,
    pub(crate) next_powerup_id: u64,
    /// Room time of the last power-up spawn check that fired.
    pub(crate) last_powerup_spawn: f32,
    pub(crate) king: Option<PlayerId>,

    pub(crate) rng: StdRng,
    /// Outbound events, drained once at the end of every tick.
    pub(crate) events: Vec<RoomEvent>,
}

impl World {
    /// Creates a room with a freshly generated island layout.
    pub fn new(tuning: Tuning, mut rng: StdRng) -> Self {
        let islands = islands::generate_islands(&mut rng, &tuning.arena);
        Self::with_islands(tuning, islands, rng)
    }

    pub fn with_islands(tuning: Tuning, islands: Vec<Island>, rng: StdRng) -> Self {
        Self {
            tuning,
            players: Vec::new(),
            projectiles: Vec::new(),
            mines: Vec::new(),
            powerups: Vec::new(),
            islands,
            tick: 0,
            next_projectile_id: 1,
            next_mine_id: 1,
            next_powerup_id: 1,
            last_powerup_spawn: 0.0,
            king: None,
            rng,
            events: Vec::new(),
        }
    }

    pub fn islands(&self) -> &[Island] {
        &self.islands
    }

    pub fn powerups(&self) -> &[Powerup] {
        &self.powerups
    }

    pub fn map_size(&self) -> f32 {
        self.tuning.arena.map_size
    }

    pub fn max_players(&self) -> usize {
        self.tuning.arena.max_players
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Adds a boat at a collision-free spawn point with the lowest free color.
    pub fn add_player(&mut self, id: PlayerId, name: String) -> Result<&Player, JoinRejected> {
        if self.players.iter().any(|p| p.id == id) {
            return Err(JoinRejected::AlreadyJoined);
        }
        if self.players.len() >= self.tuning.arena.max_players {
            return Err(JoinRejected::RoomFull);
        }

        let color_index = self.assign_color();
        let mut player = Player::new(
            id,
            name,
            color_index,
            PLAYER_COLORS[color_index],
            self.tuning.arena.max_hp,
        );
        let (x, z) = islands::sample_spawn(&mut self.rng, &self.islands, &self.tuning.arena);
        player.x = x;
        player.z = z;
        player.heading = wrap_angle(self.rng.gen_range(0.0..TAU));

        self.events.push(RoomEvent::PlayerJoined {
            id,
            name: player.name.clone(),
            color: player.color,
        });
        self.players.push(player);
        Ok(&self.players[self.players.len() - 1])
    }

    /// Removes a boat. Its projectiles and mines stay in play.
    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        let idx = self.players.iter().position(|p| p.id == id)?;
        let player = self.players.remove(idx);

        for other in &mut self.players {
            other.ram_cooldowns.remove(&id);
        }
        self.events.push(RoomEvent::PlayerLeft { id });

        if self.king == Some(id) {
            self.refresh_king();
        }
        Some(player)
    }

    /// Overwrites the buffered input; only the last write before a tick is seen.
    pub fn set_input(&mut self, id: PlayerId, input: PlayerInput) -> bool {
        match self.players.iter_mut().find(|p| p.id == id) {
            Some(p) => {
                p.input = input;
                true
            }
            None => false,
        }
    }

    /// Lowest palette index not in use; random when the palette is exhausted.
    pub fn assign_color(&mut self) -> usize {
        (0..PLAYER_COLORS.len())
            .find(|i| self.players.iter().all(|p| p.color_index != *i))
            .unwrap_or_else(|| self.rng.gen_range(0..PLAYER_COLORS.len()))
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            tick: self.tick,
            king_id: self.king,
            players: self.players.iter().map(Into::into).collect(),
            projectiles: self.projectiles.iter().map(Into::into).collect(),
            mines: self.mines.iter().map(Into::into).collect(),
            powerups: self.powerups.clone(),
        }
    }

    /// Advances the room by one fixed step.
    ///
    /// Phase order: power-up spawner, then per boat (respawn countdown or movement,
    /// map bounds, islands, pickups, cannon, mines), then ramming, projectiles and
    /// mine detonation.
    pub fn tick(&mut self) -> TickOutcome {
        let dt = self.tuning.dt();
        let now = self.tick as f32 * dt;
        self.tick += 1;

        self.spawn_powerup_if_due(now);

        for idx in 0..self.players.len() {
            self.step_player(idx, now, dt);
        }

        self.resolve_ramming(now);
        self.advance_projectiles(dt);
        self.detonate_mines(now);

        TickOutcome {
            snapshot: self.snapshot(),
            events: std::mem::take(&mut self.events),
        }
    }

    fn step_player(&mut self, idx: usize, now: f32, dt: f32) {
        if let Lifecycle::Dead { respawn_timer } = self.players[idx].lifecycle {
            let left = countdown(respawn_timer, dt);
            if left > 0.0 {
                self.players[idx].lifecycle = Lifecycle::Dead {
                    respawn_timer: left,
                };
            } else {
                self.respawn(idx);
            }
            return;
        }

        let p = &mut self.players[idx];
        if let Some(dash) = movement::tick_boat(p, &self.tuning, dt) {
            self.events.push(dash);
        }
        movement::clamp_to_map(p, &self.tuning.arena);

        let touched =
            islands::collide_with_islands(p, &self.islands, self.tuning.boat.length, &self.tuning.arena);
        if touched > 0 {
            let penalty = touched as f32 * self.tuning.arena.island_penalty;
            if self.damage_player(idx, penalty, None) {
                return;
            }
        }

        self.collect_powerups(idx);

        let p = &mut self.players[idx];
        if let Some(fire) = firing::update_cannon(
            p,
            now,
            &self.tuning,
            &mut self.next_projectile_id,
            &mut self.projectiles,
        ) {
            self.events.push(fire);
        }
        if let Some(drop) = mines::drop_mine(
            p,
            now,
            &self.tuning,
            &mut self.next_mine_id,
            &mut self.mines,
        ) {
            self.events.push(drop);
        }
    }
}

/// Mutable access to two distinct elements, `i < j`.
pub(crate) fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    debug_assert!(i < j);
    let (head, tail) = items.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::distance;
    use crate::domain::test_support::{place, seeded_world, test_world};
    use rand::SeedableRng;

    #[test]
    fn when_room_is_full_then_join_is_rejected() {
        let mut world = test_world(&[]);
        let max = world.max_players() as u64;
        for id in 0..max {
            assert!(world.add_player(id, format!("p{id}")).is_ok());
        }

        assert_eq!(
            world.add_player(max, "late".to_string()).err(),
            Some(JoinRejected::RoomFull)
        );
        assert_eq!(
            world.add_player(0, "again".to_string()).err(),
            Some(JoinRejected::AlreadyJoined)
        );
    }

    #[test]
    fn when_colors_are_assigned_then_lowest_free_slot_is_used() {
        let mut world = test_world(&[1, 2, 3]);
        world.remove_player(2);

        let p = world.add_player(4, "p4".to_string()).expect("join");
        assert_eq!(p.color_index, 1);
        assert_eq!(p.color, PLAYER_COLORS[1]);
    }

    #[test]
    fn when_palette_is_exhausted_then_a_random_color_is_reused() {
        let mut world = test_world(&[]);
        world.tuning.arena.max_players = PLAYER_COLORS.len() + 1;
        for id in 0..PLAYER_COLORS.len() as u64 {
            world.add_player(id, format!("p{id}")).expect("join");
        }

        let extra = world.add_player(99, "extra".to_string()).expect("join");
        assert!(extra.color_index < PLAYER_COLORS.len());
    }

    #[test]
    fn when_inputs_arrive_between_ticks_then_only_the_last_one_counts() {
        let mut world = test_world(&[1]);
        world.set_input(
            1,
            PlayerInput {
                forward: true,
                ..PlayerInput::default()
            },
        );
        world.set_input(1, PlayerInput::default());

        world.tick();

        assert_eq!(world.players[0].speed, 0.0);
    }

    #[test]
    fn when_ticking_then_tick_counter_and_snapshot_advance() {
        let mut world = test_world(&[1]);

        let first = world.tick();
        let second = world.tick();

        assert_eq!(first.snapshot.tick, 1);
        assert_eq!(second.snapshot.tick, 2);
        assert_eq!(second.snapshot.players.len(), 1);
    }

    #[test]
    fn when_forward_is_held_for_two_seconds_then_speed_matches_the_formula() {
        let mut world = test_world(&[1]);
        place(&mut world, 1, 0.0, 0.0);
        world.players[0].heading = 0.0;
        world.set_input(
            1,
            PlayerInput {
                forward: true,
                ..PlayerInput::default()
            },
        );

        let ticks = (2.0 * world.tuning.arena.tick_rate) as i32;
        let mut last = None;
        for _ in 0..ticks {
            last = Some(world.tick());
        }

        let boat = world.tuning.boat;
        let step = boat.acceleration * world.tuning.dt();
        let expected = step * boat.drag / (1.0 - boat.drag) * (1.0 - boat.drag.powi(ticks));
        let snapshot = last.expect("ticked").snapshot;
        assert!((snapshot.players[0].speed - expected).abs() < 1e-2);
        assert!(snapshot.players[0].speed <= (boat.acceleration * 2.0).min(boat.max_speed));
    }

    #[test]
    fn when_hp_hits_zero_then_next_snapshot_shows_death_and_respawn_follows() {
        let mut world = seeded_world(11, &[1, 2]);
        world.damage_player(0, world.tuning.arena.max_hp, None);

        let outcome = world.tick();
        let victim = &outcome.snapshot.players[0];
        assert!(!victim.alive);
        assert_eq!(victim.deaths, 1);
        assert_eq!(victim.hp, 0.0);

        let respawn_ticks =
            (world.tuning.arena.respawn_seconds * world.tuning.arena.tick_rate) as usize;
        let mut revived = None;
        for _ in 0..respawn_ticks + 1 {
            let outcome = world.tick();
            if outcome.snapshot.players[0].alive {
                revived = Some(outcome.snapshot.players[0].clone());
                break;
            }
        }

        let revived = revived.expect("player should respawn");
        assert_eq!(revived.deaths, 1);
        assert_eq!(revived.hp, world.tuning.arena.max_hp);
        for island in world.islands() {
            let d = distance(revived.x, revived.z, island.x, island.z);
            assert!(d >= island.radius + world.tuning.arena.spawn_clearance);
        }
    }

    #[test]
    fn when_fully_charged_trishot_is_released_then_three_shells_and_one_fire_event() {
        let mut world = test_world(&[1]);
        place(&mut world, 1, 0.0, 0.0);
        world.players[0].buffs.trishot = world.tuning.powerup.trishot_duration;

        world.set_input(
            1,
            PlayerInput {
                shoot: true,
                ..PlayerInput::default()
            },
        );
        let hold = (world.tuning.cannon.charge_time * world.tuning.arena.tick_rate) as usize + 2;
        for _ in 0..hold {
            world.tick();
        }
        world.set_input(1, PlayerInput::default());
        let heading = world.players[0].heading;
        let outcome = world.tick();

        assert_eq!(world.projectiles.len(), 3);
        let spread = world.tuning.cannon.trishot_spread;
        for (shell, offset) in world.projectiles.iter().zip([-spread, 0.0, spread]) {
            let angle = shell.vx.atan2(shell.vz);
            assert!((wrap_angle(angle - (heading + offset))).abs() < 1e-4);
        }

        let fires: Vec<_> = outcome
            .events
            .iter()
            .filter(|e| matches!(e, RoomEvent::Fire { .. }))
            .collect();
        assert_eq!(fires.len(), 1);
        assert!(matches!(
            fires[0],
            RoomEvent::Fire { trishot: true, power, .. } if (*power - 1.0).abs() < 1e-6
        ));
    }

    #[test]
    fn when_shielded_boat_is_shot_then_hp_is_kept_and_only_shield_break_is_sent() {
        let mut world = test_world(&[1, 2]);
        place(&mut world, 1, 800.0, 0.0);
        place(&mut world, 2, 0.0, 0.0);
        world.players[1].buffs.shield = world.tuning.powerup.shield_duration;
        world.projectiles.push(Projectile {
            id: 1,
            owner_id: 1,
            x: 0.0,
            y: 5.0,
            z: 0.0,
            vx: 0.0,
            vy: 0.0,
            vz: 0.0,
        });

        let outcome = world.tick();

        let target = &outcome.snapshot.players[1];
        assert_eq!(target.hp, world.tuning.arena.max_hp);
        assert!(!target.shield_buff);
        assert_eq!(world.players[1].buffs.shield, 0.0);
        assert!(outcome.events.iter().any(|e| matches!(
            e,
            RoomEvent::ShieldBreak { player_id: 2, .. }
        )));
        assert!(!outcome.events.iter().any(|e| matches!(
            e,
            RoomEvent::Hit { damage, .. } if *damage > 0.0
        )));
    }

    #[test]
    fn when_boats_roam_randomly_then_hp_stays_in_bounds() {
        let mut world = seeded_world(5, &[1, 2, 3, 4]);
        let mut rng = StdRng::seed_from_u64(99);

        for _ in 0..2_000 {
            for id in 1..=4 {
                let input = PlayerInput {
                    forward: rng.gen_bool(0.7),
                    backward: rng.gen_bool(0.1),
                    left: rng.gen_bool(0.3),
                    right: rng.gen_bool(0.3),
                    shoot: rng.gen_bool(0.5),
                    dash: rng.gen_bool(0.05),
                    mine: rng.gen_bool(0.01),
                    charge_fraction: None,
                };
                world.set_input(id, input);
            }

            let outcome = world.tick();
            let boat = world.tuning.boat;
            for p in &outcome.snapshot.players {
                assert!((0.0..=world.tuning.arena.max_hp).contains(&p.hp));
                if p.alive {
                    assert!(p.hp > 0.0);
                }
                // Bounces and ram knockback only ever shrink the clamped speed.
                if !p.dashing {
                    let cap = if p.speed_buff {
                        boat.max_speed * boat.speed_buff_max_speed
                    } else {
                        boat.max_speed
                    };
                    assert!(p.speed.abs() <= cap + 1e-3, "speed {} over cap {cap}", p.speed);
                }
            }
        }
    }

    #[test]
    fn when_the_king_leaves_then_the_crown_moves_on() {
        let mut world = test_world(&[1, 2]);
        world.players[0].kills = 5;
        world.players[1].kills = 4;
        world.refresh_king();
        world.events.clear();

        world.remove_player(1);

        assert_eq!(world.king, Some(2));
        assert!(world.events.iter().any(|e| matches!(
            e,
            RoomEvent::KingChange {
                new_king_id: Some(2),
                prev_king_id: Some(1),
                ..
            }
        )));
    }
}
