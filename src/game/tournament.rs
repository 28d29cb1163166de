//! Tournament loop
//!
//! Owns the roster, team win counters and result history. One `tick` runs
//! steering, combat, cleanup and adjudication in that order; a concluded game
//! leaves the tournament in `Intermission` until `begin_next_game` respawns.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{validate_collaboration, ConfigError, SimConfig};
use crate::game::match_result::{check_game_end, GameOutcome, GameRecord};
use crate::game::snapshot::TournamentSnapshot;
use crate::game::state::{GameState, Team, TeamId, TickEffects};
use crate::game::systems::combat::{self, CombatStats};
use crate::game::systems::mortality::{self, Deaths};
use crate::game::systems::steering;

/// Where the tournament is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentPhase {
    /// Not started, or stopped
    Idle,
    /// Ticks advance the current game
    Running,
    /// A game just ended; waiting for the next roster
    Intermission,
    /// Every game has been played
    Finished,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TournamentError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("collaboration cannot change while a game is running")]
    GameInProgress,
    #[error("tournament already finished")]
    Finished,
}

/// A game that ended on this tick
#[derive(Debug, Clone, PartialEq)]
pub struct GameEnd {
    pub game: u32,
    pub outcome: GameOutcome,
    /// Appended to the history (decisive games only)
    pub record: Option<GameRecord>,
    pub tournament_finished: bool,
}

/// What one call to `tick` did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// False when the tournament was not running
    pub executed: bool,
    pub tick: u64,
    pub combat: CombatStats,
    pub deaths: Deaths,
    pub game_end: Option<GameEnd>,
}

pub struct Tournament<R = StdRng> {
    config: SimConfig,
    rng: R,
    teams: [Team; 2],
    history: Vec<GameRecord>,
    games_played: u32,
    phase: TournamentPhase,
    /// The roster on the field belongs to a concluded game
    roster_stale: bool,
    game: GameState,
    effects: TickEffects,
}

impl Tournament<StdRng> {
    /// Build a tournament seeded from `config.rng_seed`, or from entropy
    pub fn new(config: SimConfig) -> Result<Self, TournamentError> {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> Tournament<R> {
    pub fn with_rng(config: SimConfig, mut rng: R) -> Result<Self, TournamentError> {
        config.validate()?;

        let teams = [
            Team::new(TeamId::A, config.team_names[0].clone()),
            Team::new(TeamId::B, config.team_names[1].clone()),
        ];
        let game = GameState::spawn(&config, 0, &mut rng);

        Ok(Self {
            config,
            rng,
            teams,
            history: Vec::new(),
            games_played: 0,
            phase: TournamentPhase::Idle,
            roster_stale: false,
            game,
            effects: TickEffects::default(),
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn teams(&self) -> &[Team; 2] {
        &self.teams
    }

    pub fn history(&self) -> &[GameRecord] {
        &self.history
    }

    pub fn games_played(&self) -> u32 {
        self.games_played
    }

    pub fn phase(&self) -> TournamentPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == TournamentPhase::Running
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn effects(&self) -> &TickEffects {
        &self.effects
    }

    pub fn snapshot(&self) -> TournamentSnapshot {
        TournamentSnapshot::from_tournament(self)
    }

    /// Start or resume play.
    ///
    /// During an intermission this is a no-op; the next game begins through
    /// `begin_next_game`.
    pub fn start(&mut self) -> Result<(), TournamentError> {
        match self.phase {
            TournamentPhase::Idle => {
                if self.roster_stale {
                    self.spawn_next_game();
                }
                self.phase = TournamentPhase::Running;
                info!(game = self.game.game_index, "Tournament running");
                Ok(())
            }
            TournamentPhase::Running | TournamentPhase::Intermission => Ok(()),
            TournamentPhase::Finished => Err(TournamentError::Finished),
        }
    }

    /// Pause play. A stopped intermission respawns on the next `start`.
    pub fn stop(&mut self) {
        match self.phase {
            TournamentPhase::Running | TournamentPhase::Intermission => {
                self.phase = TournamentPhase::Idle;
                info!(game = self.game.game_index, "Tournament stopped");
            }
            TournamentPhase::Idle | TournamentPhase::Finished => {}
        }
    }

    pub fn toggle(&mut self) -> Result<(), TournamentError> {
        match self.phase {
            TournamentPhase::Running | TournamentPhase::Intermission => {
                self.stop();
                Ok(())
            }
            _ => self.start(),
        }
    }

    /// Change one team's assist radius multiplier
    pub fn set_collaboration(&mut self, team: TeamId, value: f32) -> Result<(), TournamentError> {
        if self.is_running() {
            return Err(TournamentError::GameInProgress);
        }
        validate_collaboration(team, value)?;
        self.config.collaboration[team.index()] = value;
        info!(%team, value, "Collaboration updated");
        Ok(())
    }

    /// Respawn the roster and resume play after an intermission
    pub fn begin_next_game(&mut self) {
        if self.phase != TournamentPhase::Intermission {
            return;
        }
        self.spawn_next_game();
        self.phase = TournamentPhase::Running;
    }

    fn spawn_next_game(&mut self) {
        self.game = GameState::spawn(&self.config, self.games_played, &mut self.rng);
        self.effects.shots.clear();
        self.effects.assists.clear();
        self.roster_stale = false;
        debug!(game = self.game.game_index, "Roster spawned");
    }

    /// Advance the current game by one tick
    pub fn tick(&mut self) -> TickReport {
        if !self.is_running() {
            return TickReport::default();
        }

        self.effects.shots.clear();
        self.effects.assists.clear();

        steering::update(&mut self.game, &self.config, &mut self.effects, &mut self.rng);
        let combat = combat::update(&mut self.game, &self.config, &mut self.effects, &mut self.rng);
        let deaths = mortality::update(&mut self.game, &mut self.effects);
        for id in &deaths {
            debug!(game = self.game.game_index, player = id, "Player died");
        }

        self.game.tick += 1;
        self.game.elapsed += self.config.tick_interval();

        let outcome = check_game_end(&self.game, self.config.game_length);
        let game_end = outcome.is_over().then(|| self.conclude(outcome));

        TickReport {
            executed: true,
            tick: self.game.tick,
            combat,
            deaths,
            game_end,
        }
    }

    fn conclude(&mut self, outcome: GameOutcome) -> GameEnd {
        let game = self.game.game_index;
        let team_health = self.game.team_health();

        let record = match outcome {
            GameOutcome::Won { winner, reason } => {
                let team = &mut self.teams[winner.index()];
                team.wins += 1;
                let record = GameRecord {
                    game,
                    winner,
                    winner_name: team.name.clone(),
                    reason,
                    duration_ms: self.game.elapsed.as_millis() as u64,
                    team_health,
                };
                info!(game, ticks = self.game.tick, "{}", record);
                self.history.push(record.clone());
                Some(record)
            }
            _ => {
                info!(game, ticks = self.game.tick, ?team_health, "Game tied on timeout");
                None
            }
        };

        self.games_played += 1;
        self.roster_stale = true;

        let tournament_finished = self.games_played >= self.config.total_games;
        if tournament_finished {
            self.phase = TournamentPhase::Finished;
            info!(
                games = self.games_played,
                wins_a = self.teams[0].wins,
                wins_b = self.teams[1].wins,
                "Tournament finished"
            );
        } else {
            self.phase = TournamentPhase::Intermission;
        }

        GameEnd {
            game,
            outcome,
            record,
            tournament_finished,
        }
    }

    /// Play every remaining game back to back without timers
    pub fn run_to_completion(&mut self) -> Result<&[GameRecord], TournamentError> {
        loop {
            match self.phase {
                TournamentPhase::Idle => self.start()?,
                TournamentPhase::Running => {
                    self.tick();
                }
                TournamentPhase::Intermission => self.begin_next_game(),
                TournamentPhase::Finished => break,
            }
        }
        Ok(&self.history)
    }
}
