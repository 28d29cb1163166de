use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::game::constants::{arena, combat, player, teams, tournament};
use crate::game::state::TeamId;

/// Simulation and tournament configuration
///
/// Built once at startup. Only the collaboration pair can change afterwards,
/// and only through the tournament while no game is running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Side length of the square arena
    pub arena_size: f32,
    /// Players on each team
    pub players_per_team: usize,
    /// Health each player spawns with
    pub initial_health: i32,
    /// Firing range and wall margin
    pub player_range: f32,
    /// Distance moved per tick while exploring
    pub player_speed: f32,
    /// Per-tick chance of a random heading change
    pub player_randomness: f32,
    /// Largest random heading change (radians)
    pub max_change_direction: f32,
    /// Chance a shot hits
    pub hit_probability: f32,
    /// Health removed per hit
    pub hit_health_cost: i32,
    /// Games in the tournament
    pub total_games: u32,
    /// Simulation speed; higher means shorter ticks
    pub game_speed: u32,
    /// Game time limit (simulated time)
    pub game_length: Duration,
    /// Wall-clock pause between games when driven by the session
    pub inter_game_delay: Duration,
    /// Assist radius multiplier per team, each in [0, 1]
    pub collaboration: [f32; 2],
    /// Display names per team
    pub team_names: [String; 2],
    /// Fixed RNG seed (unseeded when None)
    pub rng_seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            arena_size: arena::SIZE,
            players_per_team: player::PER_TEAM,
            initial_health: player::INITIAL_HEALTH,
            player_range: player::RANGE,
            player_speed: player::SPEED,
            player_randomness: player::RANDOMNESS,
            max_change_direction: player::MAX_CHANGE_DIRECTION,
            hit_probability: combat::HIT_PROBABILITY,
            hit_health_cost: combat::HIT_HEALTH_COST,
            total_games: tournament::TOTAL_GAMES,
            game_speed: tournament::GAME_SPEED,
            game_length: Duration::from_millis(tournament::GAME_LENGTH_MS),
            inter_game_delay: Duration::from_millis(tournament::INTER_GAME_DELAY_MS),
            collaboration: tournament::COLLABORATION,
            team_names: [teams::NAMES[0].to_string(), teams::NAMES[1].to_string()],
            rng_seed: None,
        }
    }
}

/// Read and parse an environment variable, warning (and returning None) on bad input
fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Invalid {} '{}', using default", name, raw);
            None
        }
    }
}

impl SimConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Some(size) = env_parse::<f32>("ARENA_SIZE") {
            config.arena_size = size;
        }
        if let Some(count) = env_parse::<usize>("PLAYERS_PER_TEAM") {
            config.players_per_team = count;
        }
        if let Some(health) = env_parse::<i32>("INITIAL_HEALTH") {
            config.initial_health = health;
        }
        if let Some(range) = env_parse::<f32>("PLAYER_RANGE") {
            config.player_range = range;
        }
        if let Some(speed) = env_parse::<f32>("PLAYER_SPEED") {
            config.player_speed = speed;
        }
        if let Some(randomness) = env_parse::<f32>("PLAYER_RANDOMNESS") {
            config.player_randomness = randomness;
        }
        if let Some(degrees) = env_parse::<f32>("MAX_CHANGE_DIRECTION_DEG") {
            config.max_change_direction = degrees.to_radians();
        }
        if let Some(probability) = env_parse::<f32>("HIT_PROBABILITY") {
            config.hit_probability = probability;
        }
        if let Some(cost) = env_parse::<i32>("HIT_HEALTH_COST") {
            config.hit_health_cost = cost;
        }
        if let Some(games) = env_parse::<u32>("TOTAL_GAMES") {
            config.total_games = games;
        }
        if let Some(speed) = env_parse::<u32>("GAME_SPEED") {
            config.game_speed = speed;
        }
        if let Some(ms) = env_parse::<u64>("GAME_LENGTH_MS") {
            config.game_length = Duration::from_millis(ms);
        }
        if let Some(ms) = env_parse::<u64>("INTER_GAME_DELAY_MS") {
            config.inter_game_delay = Duration::from_millis(ms);
        }
        if let Some(value) = env_parse::<f32>("COLLABORATION_A") {
            config.collaboration[TeamId::A.index()] = value;
        }
        if let Some(value) = env_parse::<f32>("COLLABORATION_B") {
            config.collaboration[TeamId::B.index()] = value;
        }
        if let Ok(name) = std::env::var("TEAM_A_NAME") {
            config.team_names[TeamId::A.index()] = name;
        }
        if let Ok(name) = std::env::var("TEAM_B_NAME") {
            config.team_names[TeamId::B.index()] = name;
        }
        if let Some(seed) = env_parse::<u64>("RNG_SEED") {
            config.rng_seed = Some(seed);
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("arena_size", self.arena_size)?;
        positive("player_range", self.player_range)?;
        positive("player_speed", self.player_speed)?;
        if !self.max_change_direction.is_finite() || self.max_change_direction < 0.0 {
            return Err(ConfigError::NotPositive("max_change_direction"));
        }
        if self.arena_size < 2.0 * self.player_range {
            return Err(ConfigError::ArenaTooSmall {
                arena_size: self.arena_size,
                player_range: self.player_range,
            });
        }
        if self.players_per_team == 0 {
            return Err(ConfigError::NotPositive("players_per_team"));
        }
        if self.initial_health <= 0 {
            return Err(ConfigError::NotPositive("initial_health"));
        }
        if self.hit_health_cost <= 0 {
            return Err(ConfigError::NotPositive("hit_health_cost"));
        }
        if self.total_games == 0 {
            return Err(ConfigError::NotPositive("total_games"));
        }
        if self.game_speed == 0 {
            return Err(ConfigError::NotPositive("game_speed"));
        }
        if self.game_length.is_zero() {
            return Err(ConfigError::NotPositive("game_length"));
        }
        probability("player_randomness", self.player_randomness)?;
        probability("hit_probability", self.hit_probability)?;
        for team in TeamId::ALL {
            validate_collaboration(team, self.collaboration[team.index()])?;
        }
        Ok(())
    }

    /// Duration of one simulation tick
    pub fn tick_interval(&self) -> Duration {
        Duration::from_micros(tournament::TICK_BASE_MS * 1_000 / self.game_speed.max(1) as u64)
    }

    /// Lowest and highest legal coordinate on either axis
    pub fn bounds(&self) -> (f32, f32) {
        (self.player_range, self.arena_size - self.player_range)
    }

    /// Upper (exclusive) distance at which a player on `team` answers an assist call
    pub fn assist_radius(&self, team: TeamId) -> f32 {
        self.player_range * player::ASSIST_RANGE_FACTOR * self.collaboration[team.index()]
    }

    /// Total players in a game
    pub fn roster_size(&self) -> usize {
        self.players_per_team * 2
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive(name))
    }
}

fn probability(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange { name, value })
    }
}

/// Check a single collaboration value
pub fn validate_collaboration(team: TeamId, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::CollaborationOutOfRange { team, value })
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be positive")]
    NotPositive(&'static str),
    #[error("{name} must be within [0, 1], got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f32 },
    #[error("collaboration for team {team} must be within [0, 1], got {value}")]
    CollaborationOutOfRange { team: TeamId, value: f32 },
    #[error("arena size {arena_size} leaves no room for player range {player_range}")]
    ArenaTooSmall { arena_size: f32, player_range: f32 },
}
