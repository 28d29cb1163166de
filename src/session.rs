//! Timer-driven tournament session
//!
//! A single task owns the tournament. Ticks, control commands and the
//! inter-game delay are raced in one `select!`, so a roster reset can never
//! overlap a tick.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::Rng;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::game::snapshot::TournamentSnapshot;
use crate::game::state::TeamId;
use crate::game::tournament::{Tournament, TournamentError, TournamentPhase};
use crate::metrics::Metrics;

const CONTROL_QUEUE: usize = 32;

/// Input from the UI side
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlCommand {
    Start,
    Stop,
    Toggle,
    SetCollaboration { team: TeamId, value: f32 },
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("tournament session has ended")]
    Closed,
    #[error("tournament task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Handle to a running session
pub struct SessionHandle<R = StdRng> {
    control: mpsc::Sender<ControlCommand>,
    snapshots: watch::Receiver<TournamentSnapshot>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<Tournament<R>>,
}

impl<R> SessionHandle<R> {
    pub async fn send(&self, command: ControlCommand) -> Result<(), SessionError> {
        self.control
            .send(command)
            .await
            .map_err(|_| SessionError::Closed)
    }

    /// Receiver that sees a new snapshot after every tick or control change
    pub fn subscribe(&self) -> watch::Receiver<TournamentSnapshot> {
        self.snapshots.clone()
    }

    pub fn latest(&self) -> TournamentSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Stop the loop and hand the tournament back
    pub async fn shutdown(self) -> Result<Tournament<R>, SessionError> {
        let _ = self.shutdown.send(true);
        Ok(self.task.await?)
    }

    /// Wait for the tournament to finish on its own
    pub async fn join(self) -> Result<Tournament<R>, SessionError> {
        let SessionHandle { shutdown, task, .. } = self;
        let tournament = task.await?;
        drop(shutdown);
        Ok(tournament)
    }
}

/// Spawn the tick loop for `tournament`
pub fn start_tournament_loop<R>(tournament: Tournament<R>, metrics: Arc<Metrics>) -> SessionHandle<R>
where
    R: Rng + Send + 'static,
{
    let (control_tx, mut control_rx) = mpsc::channel(CONTROL_QUEUE);
    let (snapshot_tx, snapshot_rx) = watch::channel(tournament.snapshot());
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut tournament = tournament;
        let tick_duration = tournament.config().tick_interval();
        let inter_game_delay = tournament.config().inter_game_delay;

        let mut ticker = interval(tick_duration);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // Pending roster reset; cleared by an explicit stop
        let mut next_game_at: Option<Instant> = None;

        info!("Tournament loop started, tick every {:?}", tick_duration);
        metrics.observe_game(tournament.game(), tournament.is_running());

        loop {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("Tournament loop shutting down");
                        break;
                    }
                }

                Some(command) = control_rx.recv() => {
                    apply_command(&mut tournament, command, &mut next_game_at, inter_game_delay);
                    metrics.observe_game(tournament.game(), tournament.is_running());
                    snapshot_tx.send_replace(tournament.snapshot());
                }

                _ = wait_for(next_game_at) => {
                    next_game_at = None;
                    tournament.begin_next_game();
                    debug!(game = tournament.game().game_index, "Next game started");
                    metrics.observe_game(tournament.game(), tournament.is_running());
                    snapshot_tx.send_replace(tournament.snapshot());
                }

                _ = ticker.tick() => {
                    if !tournament.is_running() {
                        continue;
                    }

                    let started = std::time::Instant::now();
                    let report = tournament.tick();
                    metrics.record_tick_time(started.elapsed());
                    metrics.record_combat(report.combat.hits, report.deaths.len());
                    metrics.observe_game(tournament.game(), tournament.is_running());

                    let finished = match &report.game_end {
                        Some(end) => {
                            metrics.record_game_end(end);
                            if !end.tournament_finished {
                                next_game_at = Some(Instant::now() + inter_game_delay);
                            }
                            end.tournament_finished
                        }
                        None => false,
                    };

                    snapshot_tx.send_replace(tournament.snapshot());
                    if finished {
                        break;
                    }
                }
            }
        }

        tournament
    });

    SessionHandle {
        control: control_tx,
        snapshots: snapshot_rx,
        shutdown: shutdown_tx,
        task,
    }
}

fn apply_command<R: Rng>(
    tournament: &mut Tournament<R>,
    command: ControlCommand,
    next_game_at: &mut Option<Instant>,
    inter_game_delay: std::time::Duration,
) {
    let result: Result<(), TournamentError> = match command {
        ControlCommand::Start => tournament.start(),
        ControlCommand::Stop => {
            tournament.stop();
            Ok(())
        }
        ControlCommand::Toggle => tournament.toggle(),
        ControlCommand::SetCollaboration { team, value } => tournament.set_collaboration(team, value),
    };

    if let Err(e) = result {
        warn!("Control command {:?} rejected: {}", command, e);
    }

    match tournament.phase() {
        TournamentPhase::Intermission => {
            if next_game_at.is_none() {
                *next_game_at = Some(Instant::now() + inter_game_delay);
            }
        }
        _ => *next_game_at = None,
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
