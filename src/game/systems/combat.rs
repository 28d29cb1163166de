//! Combat resolution
//!
//! Every alive player engages the first opponent (in roster order) inside
//! firing range and takes exactly one shot at it. Deaths are not detected
//! here: a player whose health was knocked to zero earlier in the same pass
//! still fires, so both sides of a duel resolve simultaneously.

use rand::Rng;

use crate::config::SimConfig;
use crate::game::state::{CombatState, GameState, TickEffects};

/// Shot accounting for one combat pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombatStats {
    /// Players that had an opponent in range
    pub engagements: u32,
    /// Shots that landed
    pub hits: u32,
}

/// Resolve engagement and one shot per alive player
pub fn update<R: Rng + ?Sized>(
    state: &mut GameState,
    config: &SimConfig,
    effects: &mut TickEffects,
    rng: &mut R,
) -> CombatStats {
    let mut stats = CombatStats::default();

    for shooter in 0..state.players.len() {
        if !state.players[shooter].alive {
            continue;
        }
        let shooter_id = state.players[shooter].id;

        match find_target(state, shooter, config.player_range) {
            Some(target) => {
                let (target_id, target_location) = {
                    let p = &state.players[target];
                    (p.id, p.location)
                };
                state.players[shooter].state = CombatState::Engaged(target_id);
                effects.assists.remove(&shooter_id);
                stats.engagements += 1;

                if rng.gen::<f32>() < config.hit_probability {
                    let health = &mut state.players[target].health;
                    *health = health.saturating_sub(config.hit_health_cost);
                    effects.shots.insert(shooter_id, target_location);
                    stats.hits += 1;
                } else {
                    effects.shots.remove(&shooter_id);
                }
            }
            None => {
                state.players[shooter].state = CombatState::Exploring;
                effects.shots.remove(&shooter_id);
            }
        }
    }

    stats
}

/// Index of the first alive opponent strictly inside `range` of `shooter`
fn find_target(state: &GameState, shooter: usize, range: f32) -> Option<usize> {
    let attacker = &state.players[shooter];
    state.players.iter().position(|other| {
        other.is_live_opponent_of(attacker)
            && attacker.location.distance_to(other.location) < range
    })
}
