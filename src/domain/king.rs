// King selection for the bounty system.

use super::state::{Player, PlayerId};

/// Picks the living player with the most kills, if anyone reached `min_kills`.
///
/// Among tied leaders the current king keeps the crown; otherwise the first leader in
/// iteration order wins.
pub fn select_king(
    players: &[Player],
    current: Option<PlayerId>,
    min_kills: u32,
) -> Option<PlayerId> {
    let contenders = || {
        players
            .iter()
            .filter(move |p| p.is_alive() && p.kills >= min_kills)
    };

    let top = contenders().map(|p| p.kills).max()?;
    let mut leaders = contenders().filter(|p| p.kills == top);

    if let Some(current) = current {
        if contenders().any(|p| p.id == current && p.kills == top) {
            return Some(current);
        }
    }

    leaders.next().map(|p| p.id)
}
