//! Game state definitions and structures
//!
//! Contains the player roster for one game plus the per-tick transient
//! effects (firing and assist lines) consumed by snapshots.

use std::fmt;
use std::time::Duration;

use hashbrown::HashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::game::constants::teams;
use crate::game::systems::arena;
use crate::util::vec2::Vec2;

/// Player identifier, unique across the whole tournament
pub type PlayerId = u64;

/// One of the two teams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamId {
    A,
    B,
}

impl TeamId {
    pub const ALL: [TeamId; 2] = [TeamId::A, TeamId::B];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            TeamId::A => 0,
            TeamId::B => 1,
        }
    }

    /// Team for a roster slot; slots alternate between teams
    #[inline]
    pub fn from_slot(slot: usize) -> Self {
        if slot % 2 == 0 {
            TeamId::A
        } else {
            TeamId::B
        }
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamId::A => write!(f, "A"),
            TeamId::B => write!(f, "B"),
        }
    }
}

/// Engagement state of a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CombatState {
    /// Wandering the arena
    #[default]
    Exploring,
    /// An opponent is inside firing range; position is frozen
    Engaged(PlayerId),
}

impl CombatState {
    pub fn is_engaged(&self) -> bool {
        matches!(self, CombatState::Engaged(_))
    }
}

/// Assist-seeking state of a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SeekState {
    #[default]
    NotSeeking,
    /// Heading for the opponent that is currently fighting a teammate
    Seeking(PlayerId),
}

/// Player state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub team: TeamId,
    pub location: Vec2,
    /// Heading in radians, kept in [0, 2π)
    pub direction: f32,
    /// Frozen at its final value once the player dies
    pub health: i32,
    pub alive: bool,
    pub state: CombatState,
    pub seek: SeekState,
}

impl Player {
    pub fn new(id: PlayerId, team: TeamId, location: Vec2, direction: f32, health: i32) -> Self {
        Self {
            id,
            team,
            location,
            direction,
            health,
            alive: true,
            state: CombatState::Exploring,
            seek: SeekState::NotSeeking,
        }
    }

    pub fn is_engaged(&self) -> bool {
        self.state.is_engaged()
    }

    /// Alive and on the other team
    pub fn is_live_opponent_of(&self, other: &Player) -> bool {
        self.alive && self.team != other.team
    }
}

/// Team identity and cumulative score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub color: String,
    /// Decisive games won over the whole tournament
    pub wins: u32,
}

impl Team {
    pub fn new(id: TeamId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: teams::COLORS[id.index()].to_string(),
            wins: 0,
        }
    }
}

/// Derive a tournament-unique id: the game number followed by the roster slot.
///
/// Game 0 with eight players yields 10..=17, game 1 yields 20..=27.
pub fn roster_player_id(game_index: u32, slot: usize, roster_size: usize) -> PlayerId {
    let highest_slot = roster_size.saturating_sub(1) as u64;
    let mut scale: u64 = 10;
    while scale <= highest_slot {
        scale *= 10;
    }
    (game_index as u64 + 1) * scale + slot as u64
}

/// State of a single game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub game_index: u32,
    /// Ticks executed in this game
    pub tick: u64,
    /// Simulated time since the game started, one tick interval per executed
    /// tick. Paused time and ticks skipped by the session's interval do not age the game.
    pub elapsed: Duration,
    /// Fixed roster order; combat resolves targets in this order
    pub players: Vec<Player>,
}

impl GameState {
    pub fn new(game_index: u32, players: Vec<Player>) -> Self {
        Self {
            game_index,
            tick: 0,
            elapsed: Duration::ZERO,
            players,
        }
    }

    /// Generate a fresh roster for `game_index`
    pub fn spawn<R: Rng + ?Sized>(config: &SimConfig, game_index: u32, rng: &mut R) -> Self {
        let roster_size = config.roster_size();
        let players = (0..roster_size)
            .map(|slot| {
                Player::new(
                    roster_player_id(game_index, slot, roster_size),
                    TeamId::from_slot(slot),
                    arena::random_spawn_position(config, rng),
                    arena::random_heading(rng),
                    config.initial_health,
                )
            })
            .collect();
        Self::new(game_index, players)
    }

    /// Summed health per team, dead members included
    pub fn team_health(&self) -> [i64; 2] {
        let mut totals = [0i64; 2];
        for player in &self.players {
            totals[player.team.index()] += player.health as i64;
        }
        totals
    }

    pub fn alive_count(&self, team: TeamId) -> usize {
        self.players
            .iter()
            .filter(|p| p.alive && p.team == team)
            .count()
    }
}

/// Transient outputs of one tick, keyed by player id.
///
/// Rebuilt from scratch every tick so nothing from an earlier tick can leak
/// into the next snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickEffects {
    /// Location a player hit this tick
    pub shots: HashMap<PlayerId, Vec2>,
    /// Location a player is moving toward to assist
    pub assists: HashMap<PlayerId, Vec2>,
}

impl TickEffects {
    pub fn shot(&self, id: PlayerId) -> Option<Vec2> {
        self.shots.get(&id).copied()
    }

    pub fn assist(&self, id: PlayerId) -> Option<Vec2> {
        self.assists.get(&id).copied()
    }

    /// Drop every effect belonging to `id`
    pub fn clear_player(&mut self, id: PlayerId) {
        self.shots.remove(&id);
        self.assists.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_roster_ids_follow_game_index() {
        assert_eq!(roster_player_id(0, 0, 8), 10);
        assert_eq!(roster_player_id(0, 7, 8), 17);
        assert_eq!(roster_player_id(1, 3, 8), 23);
        assert_eq!(roster_player_id(11, 0, 8), 120);
    }

    #[test]
    fn test_roster_ids_widen_for_large_rosters() {
        assert_eq!(roster_player_id(0, 10, 12), 110);
        assert_eq!(roster_player_id(1, 0, 12), 200);
    }

    #[test]
    fn test_roster_ids_unique_across_games() {
        let mut seen = std::collections::HashSet::new();
        for game in 0..50 {
            for slot in 0..8 {
                assert!(seen.insert(roster_player_id(game, slot, 8)));
            }
        }
    }

    #[test]
    fn test_spawn_roster() {
        let config = SimConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let state = GameState::spawn(&config, 2, &mut rng);

        assert_eq!(state.players.len(), 8);
        assert_eq!(state.game_index, 2);
        assert_eq!(state.alive_count(TeamId::A), 4);
        assert_eq!(state.alive_count(TeamId::B), 4);
        assert_eq!(state.team_health(), [400, 400]);

        let (lo, hi) = config.bounds();
        for (slot, player) in state.players.iter().enumerate() {
            assert_eq!(player.id, 30 + slot as u64);
            assert_eq!(player.team, TeamId::from_slot(slot));
            assert!(player.alive);
            assert_eq!(player.state, CombatState::Exploring);
            assert_eq!(player.seek, SeekState::NotSeeking);
            assert!(player.location.x >= lo && player.location.x <= hi);
            assert!(player.location.y >= lo && player.location.y <= hi);
            assert!((0.0..std::f32::consts::TAU).contains(&player.direction));
        }
    }

    #[test]
    fn test_team_health_counts_dead_members() {
        let mut state = GameState::new(
            0,
            vec![
                Player::new(10, TeamId::A, Vec2::new(100.0, 100.0), 0.0, 100),
                Player::new(11, TeamId::B, Vec2::new(200.0, 100.0), 0.0, 100),
            ],
        );
        state.players[0].health = -2;
        state.players[0].alive = false;

        assert_eq!(state.team_health(), [-2, 100]);
        assert_eq!(state.alive_count(TeamId::A), 0);
    }

    #[test]
    fn test_team_id_helpers() {
        assert_eq!(TeamId::from_slot(3), TeamId::B);
        assert_eq!(TeamId::B.index(), 1);
        assert_eq!(TeamId::A.to_string(), "A");
    }

    #[test]
    fn test_tick_effects_clear_player() {
        let mut effects = TickEffects::default();
        effects.shots.insert(1, Vec2::new(1.0, 1.0));
        effects.assists.insert(1, Vec2::new(2.0, 2.0));
        effects.shots.insert(2, Vec2::new(3.0, 3.0));

        effects.clear_player(1);

        assert!(effects.shot(1).is_none());
        assert!(effects.assist(1).is_none());
        assert!(effects.shot(2).is_some());
    }
}
