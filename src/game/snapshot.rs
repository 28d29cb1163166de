//! Read-only views of the tournament for renderers and UI
//!
//! Snapshots are plain copies; nothing here can reach back into live state.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game::match_result::GameRecord;
use crate::game::state::{Player, PlayerId, TeamId, TickEffects};
use crate::game::tournament::{Tournament, TournamentPhase};
use crate::util::vec2::Vec2;

/// One player as seen by a renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub alive: bool,
    pub team: TeamId,
    pub location: Vec2,
    pub health: i32,
    /// Location hit this tick (firing line)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shoot: Option<Vec2>,
    /// Location being moved toward to assist (assist line)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assist: Option<Vec2>,
}

impl PlayerSnapshot {
    pub fn from_player(player: &Player, effects: &TickEffects) -> Self {
        Self {
            id: player.id,
            alive: player.alive,
            team: player.team,
            location: player.location,
            health: player.health,
            shoot: effects.shot(player.id),
            assist: effects.assist(player.id),
        }
    }
}

/// A team's standing in the result feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStanding {
    pub team: TeamId,
    pub name: String,
    pub color: String,
    pub wins: u32,
    /// Percentage of concluded games won (ties count as played)
    pub win_rate: f32,
}

/// Live wins plus the ordered log of decisive games
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultFeed {
    pub teams: Vec<TeamStanding>,
    pub history: Vec<GameRecord>,
}

/// Everything published once per tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentSnapshot {
    pub phase: TournamentPhase,
    /// Index of the game on the field
    pub game_index: u32,
    /// Concluded games, decisive or tied
    pub games_played: u32,
    pub total_games: u32,
    pub tick: u64,
    pub elapsed_ms: u64,
    pub collaboration: [f32; 2],
    pub players: Vec<PlayerSnapshot>,
    pub results: ResultFeed,
}

impl TournamentSnapshot {
    pub fn from_tournament<R: Rng>(tournament: &Tournament<R>) -> Self {
        let game = tournament.game();
        let effects = tournament.effects();
        let games_played = tournament.games_played();

        let teams = tournament
            .teams()
            .iter()
            .map(|team| TeamStanding {
                team: team.id,
                name: team.name.clone(),
                color: team.color.clone(),
                wins: team.wins,
                win_rate: win_rate(team.wins, games_played),
            })
            .collect();

        Self {
            phase: tournament.phase(),
            game_index: game.game_index,
            games_played,
            total_games: tournament.config().total_games,
            tick: game.tick,
            elapsed_ms: game.elapsed.as_millis() as u64,
            collaboration: tournament.config().collaboration,
            players: game
                .players
                .iter()
                .map(|p| PlayerSnapshot::from_player(p, effects))
                .collect(),
            results: ResultFeed {
                teams,
                history: tournament.history().to_vec(),
            },
        }
    }

    pub fn alive_count(&self, team: TeamId) -> usize {
        self.players
            .iter()
            .filter(|p| p.alive && p.team == team)
            .count()
    }

    pub fn total_wins(&self) -> u32 {
        self.results.teams.iter().map(|t| t.wins).sum()
    }
}

fn win_rate(wins: u32, games_played: u32) -> f32 {
    if games_played == 0 {
        0.0
    } else {
        wins as f32 / games_played as f32 * 100.0
    }
}
