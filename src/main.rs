use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use assist_arena::config::SimConfig;
use assist_arena::game::tournament::{Tournament, TournamentPhase};
use assist_arena::metrics::Metrics;
use assist_arena::session::{start_tournament_loop, ControlCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Assist Arena v{}", env!("CARGO_PKG_VERSION"));

    let config = SimConfig::load_or_default();
    info!(
        "Configuration loaded: {} games, {} per team, collaboration {:?}, tick {:?}",
        config.total_games,
        config.players_per_team,
        config.collaboration,
        config.tick_interval()
    );

    let metrics = Arc::new(Metrics::new());

    #[cfg(feature = "metrics_endpoint")]
    {
        let metrics_port: u16 = std::env::var("METRICS_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(9090);

        let metrics_clone = metrics.clone();
        tokio::spawn(async move {
            if let Err(e) = assist_arena::metrics::start_metrics_server(metrics_clone, metrics_port).await {
                error!("Metrics server error: {}", e);
            }
        });
    }

    let headless = std::env::var("HEADLESS")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let mut tournament = Tournament::new(config)?;

    let tournament = if headless {
        info!("Running headless");
        tournament.run_to_completion()?;
        tournament
    } else {
        let session = start_tournament_loop(tournament, metrics.clone());
        session.send(ControlCommand::Start).await?;

        let mut updates = session.subscribe();
        let finished = async {
            while updates.changed().await.is_ok() {
                if updates.borrow().phase == TournamentPhase::Finished {
                    break;
                }
            }
        };

        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received");
        };

        tokio::select! {
            _ = finished => {
                info!("All games played");
            }
            _ = shutdown => {
                info!("Shutting down...");
            }
        }

        session.shutdown().await?
    };

    let results = tournament.snapshot().results;
    for standing in &results.teams {
        info!(
            "Team {} ({}): {} wins, {:.1}%",
            standing.name, standing.color, standing.wins, standing.win_rate
        );
    }
    println!("{}", serde_json::to_string_pretty(&results)?);

    Ok(())
}
