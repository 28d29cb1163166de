//! Movement and steering for exploring players
//!
//! Decisions are computed from the roster as it stood before this stage and
//! then applied in one pass. Random numbers are drawn up front, in roster
//! order, so a seeded source reproduces the same run regardless of how the
//! decision step is scheduled across threads.

use std::f32::consts::PI;

use rand::Rng;
use rayon::prelude::*;

use crate::config::SimConfig;
use crate::game::state::{CombatState, GameState, Player, SeekState, TeamId, TickEffects};
use crate::game::systems::arena;
use crate::util::vec2::{normalize_angle, Vec2};

/// Random inputs for one player's steering step
#[derive(Debug, Clone, Copy)]
pub struct TurnDraw {
    /// Compared against the randomness probability
    pub chance: f32,
    /// Uniform [0, 1) turn amount before bias
    pub turn: f32,
}

impl TurnDraw {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            chance: rng.gen(),
            turn: rng.gen(),
        }
    }
}

/// Result of steering one player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringDecision {
    pub location: Vec2,
    pub direction: f32,
    pub seek: SeekState,
    pub assist: Option<Vec2>,
    pub bounced: bool,
}

/// Whether steering applies to this player this tick
#[inline]
fn is_exploring(player: &Player) -> bool {
    player.alive && player.state == CombatState::Exploring
}

/// Move and re-steer every alive, exploring player
pub fn update<R: Rng + ?Sized>(
    state: &mut GameState,
    config: &SimConfig,
    effects: &mut TickEffects,
    rng: &mut R,
) {
    let draws: Vec<Option<TurnDraw>> = state
        .players
        .iter()
        .map(|p| is_exploring(p).then(|| TurnDraw::sample(rng)))
        .collect();

    let roster = &state.players;
    let decisions: Vec<Option<SteeringDecision>> = roster
        .par_iter()
        .zip(draws.par_iter())
        .map(|(player, &draw)| draw.map(|d| steer_player(player, roster, config, d)))
        .collect();

    for (player, decision) in state.players.iter_mut().zip(decisions) {
        let Some(decision) = decision else { continue };
        player.location = decision.location;
        player.direction = decision.direction;
        player.seek = decision.seek;
        match decision.assist {
            Some(target) => {
                effects.assists.insert(player.id, target);
            }
            None => {
                effects.assists.remove(&player.id);
            }
        }
    }
}

/// Compute one player's next location and heading
pub fn steer_player(
    player: &Player,
    roster: &[Player],
    config: &SimConfig,
    draw: TurnDraw,
) -> SteeringDecision {
    let moved = player.location + Vec2::from_angle(player.direction) * config.player_speed;
    let (location, bounced) = arena::clamp_to_bounds(moved, config);

    let mut direction = player.direction;
    if bounced {
        direction += PI;
    }

    let (seek, assist) = match find_assist_target(player.team, location, roster, config) {
        Some(target) => {
            direction = location.heading_to(target.location);
            (SeekState::Seeking(target.id), Some(target.location))
        }
        None => {
            if draw.chance < config.player_randomness {
                // After a bounce the turn is biased away from the wall
                let bias = if bounced { 1.0 } else { 0.5 };
                direction += (draw.turn - bias) * config.max_change_direction;
            }
            (SeekState::NotSeeking, None)
        }
    };

    SteeringDecision {
        location,
        direction: normalize_angle(direction),
        seek,
        assist,
        bounced,
    }
}

/// Nearest opponent currently fighting one of our teammates, within the assist band.
///
/// The band is open on both ends: `range < d < range * 5 * collaboration`.
/// Anything at or under firing range is left to combat.
pub fn find_assist_target<'a>(
    team: TeamId,
    location: Vec2,
    roster: &'a [Player],
    config: &SimConfig,
) -> Option<&'a Player> {
    let min_distance = config.player_range;
    let max_distance = config.assist_radius(team);

    roster
        .iter()
        .filter(|other| other.alive && other.team != team && other.is_engaged())
        .map(|other| (other, location.distance_to(other.location)))
        .filter(|(_, distance)| *distance > min_distance && *distance < max_distance)
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(other, _)| other)
}
