use crate::domain::events::RoomEvent;
use crate::domain::geometry::{distance, within};
use crate::domain::state::Projectile;
use crate::domain::world::World;

impl World {
    /// Integrates every projectile and resolves boat, water and island impacts.
    ///
    /// Boats are tested first while the shot is in the boat band; the first boat in
    /// iteration order that is within splash range takes the hit.
    pub(crate) fn advance_projectiles(&mut self, dt: f32) {
        let mut projectiles = std::mem::take(&mut self.projectiles);
        projectiles.retain_mut(|proj| self.advance_projectile(proj, dt));
        self.projectiles = projectiles;
    }

    // Returns false once the projectile is spent.
    fn advance_projectile(&mut self, proj: &mut Projectile, dt: f32) -> bool {
        let cannon = self.tuning.cannon;
        let half = self.tuning.arena.map_half();

        proj.x += proj.vx * dt;
        proj.z += proj.vz * dt;
        proj.y += proj.vy * dt;
        proj.vy -= cannon.gravity * dt;

        if proj.x.abs() > half || proj.z.abs() > half {
            return false;
        }

        if proj.y > cannon.boat_band_low && proj.y < cannon.boat_band_high {
            let struck = self.players.iter().enumerate().find_map(|(idx, p)| {
                if p.id == proj.owner_id || !p.is_alive() {
                    return None;
                }
                let d = distance(proj.x, proj.z, p.x, p.z);
                if d <= cannon.direct_radius {
                    Some((idx, cannon.direct_damage))
                } else if d <= cannon.splash_radius {
                    Some((idx, cannon.splash_damage))
                } else {
                    None
                }
            });

            if let Some((idx, damage)) = struck {
                if !self.absorb_with_shield(idx, proj.x, proj.z) {
                    self.events.push(RoomEvent::Hit {
                        x: proj.x,
                        z: proj.z,
                        target_id: Some(self.players[idx].id),
                        shooter_id: proj.owner_id,
                        damage,
                    });
                    self.damage_player(idx, damage, Some(proj.owner_id));
                }
                return false;
            }
        }

        if proj.y <= 0.0 {
            self.splash(proj);
            return false;
        }

        if proj.y < cannon.island_height {
            let reach = cannon.direct_radius;
            let struck_island = self
                .islands
                .iter()
                .any(|i| within(proj.x, proj.z, i.x, i.z, i.radius + reach));
            if struck_island {
                self.splash(proj);
                return false;
            }
        }

        true
    }

    fn splash(&mut self, proj: &Projectile) {
        self.events.push(RoomEvent::Hit {
            x: proj.x,
            z: proj.z,
            target_id: None,
            shooter_id: proj.owner_id,
            damage: 0.0,
        });
    }
}
