// Per-room world task: owns one `World` and ticks it at a fixed interval.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{Notify, broadcast, mpsc};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::types::{Departure, RoomCommand, RoomUpdate, Welcome};
use crate::domain::World;

pub async fn room_task(
    room: Arc<str>,
    mut world: World,
    mut commands_rx: mpsc::Receiver<RoomCommand>,
    updates_tx: broadcast::Sender<RoomUpdate>,
    player_count: Arc<AtomicUsize>,
    tick_interval: Duration,
    shutdown: Arc<Notify>,
) {
    let mut interval = tokio::time::interval(tick_interval);
    // A stalled runtime should not cause a burst of catch-up ticks.
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(room = %room, islands = world.islands().len(), "room started");

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                break;
            }
            _ = interval.tick() => {}
        }

        // Apply everything that arrived since the last tick; inputs overwrite.
        let mut closed = false;
        loop {
            match commands_rx.try_recv() {
                Ok(command) => apply_command(&room, &mut world, command, &player_count),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    closed = true;
                    break;
                }
            }
        }
        if closed {
            break;
        }

        let outcome = world.tick();
        // No receivers just means nobody is watching this room right now.
        let _ = updates_tx.send(RoomUpdate::from(outcome));
    }

    info!(room = %room, "room stopped");
}

fn apply_command(room: &Arc<str>, world: &mut World, command: RoomCommand, count: &AtomicUsize) {
    match command {
        RoomCommand::Join {
            player_id,
            name,
            reply,
        } => {
            let result = world.add_player(player_id, name).map(|player| {
                info!(room = %room, player_id, name = %player.name, "player joined");
                player_id
            });
            let result = result.map(|player_id| Welcome {
                player_id,
                room_name: room.clone(),
                islands: world.islands().to_vec(),
                map_size: world.map_size(),
                powerups: world.powerups().to_vec(),
            });
            count.store(world.player_count(), Ordering::Release);
            if reply.send(result).is_err() {
                // The connection went away while waiting; undo the join.
                debug!(room = %room, player_id, "join reply dropped");
                world.remove_player(player_id);
                count.store(world.player_count(), Ordering::Release);
            }
        }
        RoomCommand::Leave { player_id, reply } => {
            let departure = world.remove_player(player_id).map(|player| {
                info!(room = %room, player_id, kills = player.kills, "player left");
                Departure {
                    name: player.name,
                    kills: player.kills,
                    remaining: world.player_count(),
                }
            });
            count.store(world.player_count(), Ordering::Release);
            let _ = reply.send(departure);
        }
        RoomCommand::Input { player_id, input } => {
            world.set_input(player_id, input);
        }
    }
}
