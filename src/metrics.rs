//! Prometheus-compatible metrics endpoint
//!
//! Exposes tournament counters in Prometheus text format and as JSON.
//! Default endpoint: http://localhost:9090/metrics

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde_json::json;

use crate::game::match_result::GameOutcome;
use crate::game::state::{GameState, TeamId};
use crate::game::tournament::GameEnd;

const TICK_HISTORY_LEN: usize = 1000;

/// Metrics registry for the tournament
#[derive(Debug)]
pub struct Metrics {
    // Tick timing (microseconds)
    pub tick_time_us: AtomicU64,
    pub tick_time_p95_us: AtomicU64,
    pub tick_time_p99_us: AtomicU64,
    pub tick_time_max_us: AtomicU64,
    pub tick_count: AtomicU64,

    // Combat
    pub hits_total: AtomicU64,
    pub deaths_total: AtomicU64,

    // Tournament progress
    pub current_game: AtomicU64,
    pub games_played: AtomicU64,
    pub games_tied: AtomicU64,
    pub wins: [AtomicU64; 2],
    pub running: AtomicU64, // 0 or 1

    // Current game
    pub alive: [AtomicU64; 2],
    pub team_health: [AtomicU64; 2], // Clamped at zero
    pub game_time_ms: AtomicU64,

    start_time: Instant,

    // Rolling tick times for percentile calculation
    tick_history: RwLock<VecDeque<u64>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            tick_time_us: AtomicU64::new(0),
            tick_time_p95_us: AtomicU64::new(0),
            tick_time_p99_us: AtomicU64::new(0),
            tick_time_max_us: AtomicU64::new(0),
            tick_count: AtomicU64::new(0),
            hits_total: AtomicU64::new(0),
            deaths_total: AtomicU64::new(0),
            current_game: AtomicU64::new(0),
            games_played: AtomicU64::new(0),
            games_tied: AtomicU64::new(0),
            wins: [AtomicU64::new(0), AtomicU64::new(0)],
            running: AtomicU64::new(0),
            alive: [AtomicU64::new(0), AtomicU64::new(0)],
            team_health: [AtomicU64::new(0), AtomicU64::new(0)],
            game_time_ms: AtomicU64::new(0),
            start_time: Instant::now(),
            tick_history: RwLock::new(VecDeque::with_capacity(TICK_HISTORY_LEN)),
        }
    }

    /// Record a tick time and update percentiles
    pub fn record_tick_time(&self, duration: Duration) {
        let us = duration.as_micros() as u64;
        self.tick_time_us.store(us, Ordering::Relaxed);
        self.tick_count.fetch_add(1, Ordering::Relaxed);

        let mut history = self.tick_history.write();
        history.push_back(us);
        while history.len() > TICK_HISTORY_LEN {
            history.pop_front();
        }

        if history.len() >= 10 {
            let mut sorted: Vec<u64> = history.iter().copied().collect();
            sorted.sort_unstable();

            let p95_idx = (sorted.len() as f32 * 0.95) as usize;
            let p99_idx = (sorted.len() as f32 * 0.99) as usize;

            self.tick_time_p95_us.store(sorted[p95_idx.min(sorted.len() - 1)], Ordering::Relaxed);
            self.tick_time_p99_us.store(sorted[p99_idx.min(sorted.len() - 1)], Ordering::Relaxed);
            self.tick_time_max_us.store(sorted.last().copied().unwrap_or(0), Ordering::Relaxed);
        }
    }

    pub fn record_combat(&self, hits: u32, deaths: usize) {
        self.hits_total.fetch_add(hits as u64, Ordering::Relaxed);
        self.deaths_total.fetch_add(deaths as u64, Ordering::Relaxed);
    }

    /// Mirror the game on the field
    pub fn observe_game(&self, game: &GameState, running: bool) {
        self.current_game.store(game.game_index as u64, Ordering::Relaxed);
        self.game_time_ms.store(game.elapsed.as_millis() as u64, Ordering::Relaxed);
        self.running.store(running as u64, Ordering::Relaxed);

        let health = game.team_health();
        for team in TeamId::ALL {
            let i = team.index();
            self.alive[i].store(game.alive_count(team) as u64, Ordering::Relaxed);
            self.team_health[i].store(health[i].max(0) as u64, Ordering::Relaxed);
        }
    }

    pub fn record_game_end(&self, end: &GameEnd) {
        self.games_played.fetch_add(1, Ordering::Relaxed);
        match end.outcome {
            GameOutcome::Won { winner, .. } => {
                self.wins[winner.index()].fetch_add(1, Ordering::Relaxed);
            }
            GameOutcome::Tied => {
                self.games_tied.fetch_add(1, Ordering::Relaxed);
            }
            GameOutcome::Running => {}
        }
        if end.tournament_finished {
            self.running.store(0, Ordering::Relaxed);
        }
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Generate Prometheus-format metrics output
    pub fn to_prometheus(&self) -> String {
        let mut output = String::with_capacity(4096);

        macro_rules! metric {
            ($name:expr, $help:expr, $type:expr, $value:expr) => {
                output.push_str(&format!(
                    "# HELP {} {}\n# TYPE {} {}\n{} {}\n",
                    $name, $help, $name, $type, $name, $value
                ));
            };
        }

        macro_rules! team_metric {
            ($name:expr, $help:expr, $type:expr, $values:expr) => {
                output.push_str(&format!(
                    "# HELP {} {}\n# TYPE {} {}\n",
                    $name, $help, $name, $type
                ));
                for team in TeamId::ALL {
                    output.push_str(&format!(
                        "{}{{team=\"{}\"}} {}\n",
                        $name,
                        team,
                        $values[team.index()].load(Ordering::Relaxed)
                    ));
                }
            };
        }

        // Performance
        metric!("assist_arena_tick_time_microseconds", "Current tick time in microseconds", "gauge",
            self.tick_time_us.load(Ordering::Relaxed));
        metric!("assist_arena_tick_time_p95_microseconds", "95th percentile tick time", "gauge",
            self.tick_time_p95_us.load(Ordering::Relaxed));
        metric!("assist_arena_tick_time_p99_microseconds", "99th percentile tick time", "gauge",
            self.tick_time_p99_us.load(Ordering::Relaxed));
        metric!("assist_arena_tick_time_max_microseconds", "Maximum tick time", "gauge",
            self.tick_time_max_us.load(Ordering::Relaxed));
        metric!("assist_arena_tick_count", "Total ticks processed", "counter",
            self.tick_count.load(Ordering::Relaxed));

        // Combat
        metric!("assist_arena_hits_total", "Shots that landed", "counter",
            self.hits_total.load(Ordering::Relaxed));
        metric!("assist_arena_deaths_total", "Players killed", "counter",
            self.deaths_total.load(Ordering::Relaxed));

        // Tournament
        metric!("assist_arena_current_game", "Index of the game on the field", "gauge",
            self.current_game.load(Ordering::Relaxed));
        metric!("assist_arena_games_played_total", "Concluded games, ties included", "counter",
            self.games_played.load(Ordering::Relaxed));
        metric!("assist_arena_games_tied_total", "Games that ended tied on timeout", "counter",
            self.games_tied.load(Ordering::Relaxed));
        team_metric!("assist_arena_wins_total", "Decisive games won", "counter", self.wins);
        metric!("assist_arena_running", "Tournament running (0/1)", "gauge",
            self.running.load(Ordering::Relaxed));

        // Current game
        team_metric!("assist_arena_players_alive", "Alive players per team", "gauge", self.alive);
        team_metric!("assist_arena_team_health", "Summed team health", "gauge", self.team_health);
        metric!("assist_arena_game_time_milliseconds", "Simulated time in the current game", "gauge",
            self.game_time_ms.load(Ordering::Relaxed));
        metric!("assist_arena_uptime_seconds", "Process uptime in seconds", "counter",
            self.uptime_seconds());

        output
    }

    /// Generate JSON format metrics (alternative for direct API access)
    pub fn to_json(&self) -> String {
        let per_team = |values: &[AtomicU64; 2]| {
            json!({
                "A": values[0].load(Ordering::Relaxed),
                "B": values[1].load(Ordering::Relaxed),
            })
        };

        let body = json!({
            "performance": {
                "tick_time_us": self.tick_time_us.load(Ordering::Relaxed),
                "tick_time_p95_us": self.tick_time_p95_us.load(Ordering::Relaxed),
                "tick_time_p99_us": self.tick_time_p99_us.load(Ordering::Relaxed),
                "tick_time_max_us": self.tick_time_max_us.load(Ordering::Relaxed),
                "tick_count": self.tick_count.load(Ordering::Relaxed),
            },
            "combat": {
                "hits": self.hits_total.load(Ordering::Relaxed),
                "deaths": self.deaths_total.load(Ordering::Relaxed),
            },
            "tournament": {
                "current_game": self.current_game.load(Ordering::Relaxed),
                "games_played": self.games_played.load(Ordering::Relaxed),
                "games_tied": self.games_tied.load(Ordering::Relaxed),
                "wins": per_team(&self.wins),
                "running": self.running.load(Ordering::Relaxed) == 1,
            },
            "game": {
                "alive": per_team(&self.alive),
                "team_health": per_team(&self.team_health),
                "time_ms": self.game_time_ms.load(Ordering::Relaxed),
                "uptime_seconds": self.uptime_seconds(),
            },
        });

        serde_json::to_string_pretty(&body).unwrap_or_default()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "metrics_endpoint")]
pub use server::start_metrics_server;

#[cfg(feature = "metrics_endpoint")]
mod server {
    use std::sync::Arc;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tracing::{debug, info};

    use super::Metrics;

    /// Start the metrics HTTP server
    pub async fn start_metrics_server(metrics: Arc<Metrics>, port: u16) -> anyhow::Result<()> {
        let addr = format!("0.0.0.0:{}", port);
        let listener = TcpListener::bind(&addr).await?;

        info!("Metrics server listening on http://{}/metrics", addr);

        loop {
            let (mut socket, peer) = listener.accept().await?;
            let metrics = metrics.clone();

            tokio::spawn(async move {
                let mut buffer = [0u8; 1024];

                match socket.read(&mut buffer).await {
                    Ok(n) if n > 0 => {
                        let request = String::from_utf8_lossy(&buffer[..n]);
                        let response = route(&metrics, &request);

                        if let Err(e) = socket.write_all(response.as_bytes()).await {
                            debug!("Failed to write metrics response to {}: {}", peer, e);
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        debug!("Failed to read from metrics socket {}: {}", peer, e);
                    }
                }
            });
        }
    }

    /// Build the full HTTP response for a raw request
    pub(super) fn route(metrics: &Metrics, request: &str) -> String {
        let path = request
            .strip_prefix("GET ")
            .and_then(|rest| rest.split_whitespace().next());

        match path {
            Some("/metrics/json") | Some("/json") => ok("application/json", &metrics.to_json()),
            Some("/metrics") => ok("text/plain; version=0.0.4", &metrics.to_prometheus()),
            Some("/health") | Some("/") => ok("text/plain", "OK"),
            _ => "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string(),
        }
    }

    fn ok(content_type: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            content_type,
            body.len(),
            body
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::match_result::WinReason;
    use crate::game::state::Player;
    use crate::util::vec2::Vec2;

    #[test]
    fn test_metrics_new() {
        let metrics = Metrics::new();
        assert_eq!(metrics.games_played.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.tick_count.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_record_tick_time() {
        let metrics = Metrics::new();

        for i in 0..100 {
            metrics.record_tick_time(Duration::from_micros(100 + i * 10));
        }

        assert_eq!(metrics.tick_count.load(Ordering::Relaxed), 100);
        assert!(metrics.tick_time_p95_us.load(Ordering::Relaxed) >= 1000);
        assert_eq!(metrics.tick_time_max_us.load(Ordering::Relaxed), 1090);
    }

    #[test]
    fn test_game_end_counters() {
        let metrics = Metrics::new();
        metrics.record_game_end(&GameEnd {
            game: 0,
            outcome: GameOutcome::Won {
                winner: TeamId::B,
                reason: WinReason::Elimination,
            },
            record: None,
            tournament_finished: false,
        });
        metrics.record_game_end(&GameEnd {
            game: 1,
            outcome: GameOutcome::Tied,
            record: None,
            tournament_finished: true,
        });

        assert_eq!(metrics.games_played.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.games_tied.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.wins[1].load(Ordering::Relaxed), 1);
        assert_eq!(metrics.wins[0].load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_observe_game() {
        let metrics = Metrics::new();
        let mut dead = Player::new(11, TeamId::B, Vec2::new(100.0, 100.0), 0.0, -4);
        dead.alive = false;
        let game = GameState::new(
            3,
            vec![Player::new(10, TeamId::A, Vec2::new(100.0, 100.0), 0.0, 60), dead],
        );

        metrics.observe_game(&game, true);

        assert_eq!(metrics.current_game.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.alive[0].load(Ordering::Relaxed), 1);
        assert_eq!(metrics.alive[1].load(Ordering::Relaxed), 0);
        assert_eq!(metrics.team_health[0].load(Ordering::Relaxed), 60);
        assert_eq!(metrics.team_health[1].load(Ordering::Relaxed), 0);
        assert_eq!(metrics.running.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_prometheus_format() {
        let metrics = Metrics::new();
        metrics.wins[0].store(7, Ordering::Relaxed);
        metrics.games_played.store(9, Ordering::Relaxed);

        let output = metrics.to_prometheus();

        assert!(output.contains("assist_arena_games_played_total 9"));
        assert!(output.contains("assist_arena_wins_total{team=\"A\"} 7"));
        assert!(output.contains("assist_arena_wins_total{team=\"B\"} 0"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_json_format() {
        let metrics = Metrics::new();
        metrics.wins[1].store(4, Ordering::Relaxed);

        let value: serde_json::Value = serde_json::from_str(&metrics.to_json()).unwrap();

        assert_eq!(value["tournament"]["wins"]["B"], 4);
        assert_eq!(value["tournament"]["running"], false);
        assert!(value["performance"].is_object());
    }

    #[cfg(feature = "metrics_endpoint")]
    #[test]
    fn test_routes() {
        let metrics = Metrics::new();

        let json = server::route(&metrics, "GET /metrics/json HTTP/1.1\r\n\r\n");
        assert!(json.contains("application/json"));

        let text = server::route(&metrics, "GET /metrics HTTP/1.1\r\n\r\n");
        assert!(text.contains("assist_arena_tick_count"));

        let health = server::route(&metrics, "GET /health HTTP/1.1\r\n\r\n");
        assert!(health.ends_with("OK"));

        let missing = server::route(&metrics, "GET /nope HTTP/1.1\r\n\r\n");
        assert!(missing.starts_with("HTTP/1.1 404"));
    }
}
