//! Game adjudication and result records
//!
//! Decides, once per tick, whether the current game is over and who won.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::game::constants::reasons;
use crate::game::state::{GameState, TeamId};

/// Why a game was won
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinReason {
    /// The other team's summed health reached zero
    Elimination,
    /// Time ran out with strictly more summed health
    Timeout,
}

impl WinReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            WinReason::Elimination => reasons::ELIMINATION,
            WinReason::Timeout => reasons::TIMEOUT,
        }
    }
}

impl fmt::Display for WinReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adjudication result for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    Running,
    Won { winner: TeamId, reason: WinReason },
    /// Time ran out with equal summed health; nothing is recorded
    Tied,
}

impl GameOutcome {
    pub fn is_over(&self) -> bool {
        !matches!(self, GameOutcome::Running)
    }

    pub fn winner(&self) -> Option<TeamId> {
        match self {
            GameOutcome::Won { winner, .. } => Some(*winner),
            _ => None,
        }
    }
}

/// One entry of the append-only result log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game: u32,
    pub winner: TeamId,
    pub winner_name: String,
    pub reason: WinReason,
    /// Simulated game length in milliseconds
    pub duration_ms: u64,
    /// Summed health per team when the game ended
    pub team_health: [i64; 2],
}

impl fmt::Display for GameRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Team {} won {}", self.winner_name, self.reason)
    }
}

/// Check whether the game has ended.
///
/// Dead players still count with their frozen (zero or negative) health.
/// Team A's elimination is checked first, so if both teams hit zero in the
/// same tick team B takes the game.
pub fn check_game_end(state: &GameState, game_length: Duration) -> GameOutcome {
    let [team_a, team_b] = state.team_health();

    if team_a <= 0 {
        GameOutcome::Won {
            winner: TeamId::B,
            reason: WinReason::Elimination,
        }
    } else if team_b <= 0 {
        GameOutcome::Won {
            winner: TeamId::A,
            reason: WinReason::Elimination,
        }
    } else if state.elapsed >= game_length {
        match team_a.cmp(&team_b) {
            std::cmp::Ordering::Greater => GameOutcome::Won {
                winner: TeamId::A,
                reason: WinReason::Timeout,
            },
            std::cmp::Ordering::Less => GameOutcome::Won {
                winner: TeamId::B,
                reason: WinReason::Timeout,
            },
            std::cmp::Ordering::Equal => GameOutcome::Tied,
        }
    } else {
        GameOutcome::Running
    }
}
