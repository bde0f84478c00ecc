// Pitchboard entry point.
//
// Report cycle:
// 1. Initialize tracing
// 2. Load config
// 3. Fetch pitch-level data for the requested window (optionally one batter)
// 4. Validate batting averages through the fallback cascade
// 5. Run the pitch analytics (value, umpire, fatigue, profile)
// 6. Pull today's games and conditions-driven insights
// 7. Print the combined report as JSON on stdout

use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use pitchboard::analytics::barrel::{self, ValueReport};
use pitchboard::analytics::fatigue::{self, FatigueReport};
use pitchboard::analytics::insights::{self, Insight};
use pitchboard::analytics::profile::{self, BatterProfile};
use pitchboard::analytics::zone::{self, UmpireReport};
use pitchboard::cache::ResponseCache;
use pitchboard::clock::SystemClock;
use pitchboard::config;
use pitchboard::providers::live::{GameSummary, StatsApiClient};
use pitchboard::providers::statcast::{PitchRecord, SavantClient, StatcastProvider};
use pitchboard::table::StatTable;
use pitchboard::validator::{FallbackValidator, ValidatedPlayer, ValidationStats};

#[derive(Debug, Default)]
struct CliArgs {
    player_id: Option<String>,
    days: i64,
}

#[derive(Serialize)]
struct Report {
    generated_at: DateTime<Utc>,
    window_start: NaiveDate,
    window_end: NaiveDate,
    player_id: Option<String>,
    pitches: usize,
    repairs: usize,
    validation: ValidationStats,
    value: ValueReport,
    umpire: UmpireReport,
    fatigue: FatigueReport,
    profile: Option<BatterProfile>,
    player: Option<ValidatedPlayer>,
    games: Vec<GameSummary>,
    insights: Vec<Insight>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (stderr; stdout carries the report)
    init_tracing()?;
    info!("Pitchboard starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    let args = parse_args().context("failed to parse arguments")?;

    let today = Utc::now().date_naive();
    let start = today - Duration::days(args.days);
    info!(
        "Report window {start} to {today}{}",
        args.player_id
            .as_deref()
            .map(|id| format!(", batter {id}"))
            .unwrap_or_default()
    );

    // 3. Fetch pitch data; a provider outage degrades to an empty window
    let savant = Arc::new(
        SavantClient::new(&config.providers).context("failed to build Statcast client")?,
    );
    let pitches = match &args.player_id {
        Some(id) => savant.fetch_player_record_data(start, today, id).await,
        None => savant.fetch_range(start, today).await,
    };
    let pitches = match pitches {
        Ok(pitches) => pitches,
        Err(e) => {
            warn!("pitch data unavailable, continuing with empty window: {e}");
            Vec::new()
        }
    };
    info!("Fetched {} pitches", pitches.len());

    // 4. Validate averages derived from the window
    let validator = FallbackValidator::new(
        config.validator.clone(),
        savant.clone(),
        Arc::new(SystemClock),
    );
    let table = pitch_table(&pitches)?;
    let validated = validator
        .validate_batting_averages(table, args.player_id.as_deref())
        .await;
    info!("Validation made {} repairs", validated.repairs.len());

    // 5. Pitch analytics
    let value = barrel::weekly_value_report(&pitches);
    let umpire = zone::umpire_report(&pitches);
    let fatigue = fatigue::fatigue_report(&pitches);
    let profile = args
        .player_id
        .as_ref()
        .and_then(|_| profile::batter_profile(&pitches));

    // 6. Today's games and conditions; each failure degrades independently
    let response_cache = Arc::new(ResponseCache::new());
    let statsapi = StatsApiClient::new(&config.providers, config.cache.clone(), response_cache)
        .context("failed to build StatsAPI client")?;
    let (games, game_insights) = fetch_game_context(&statsapi, today).await;

    // A numeric batter id also gets a validated season record
    let mut player = None;
    if let Some(pid) = args.player_id.as_deref().and_then(|id| id.parse::<u64>().ok()) {
        match statsapi.player_season_stats(pid, today.year()).await {
            Ok(stats) => player = Some(validator.validate_player_data(Some(stats.into()))),
            Err(e) => warn!(player_id = pid, "season stats unavailable: {e}"),
        }
    }

    // 7. Emit the report
    let report = Report {
        generated_at: Utc::now(),
        window_start: start,
        window_end: today,
        player_id: args.player_id,
        pitches: pitches.len(),
        repairs: validated.repairs.len(),
        validation: validator.validation_stats(),
        value,
        umpire,
        fatigue,
        profile,
        player,
        games,
        insights: game_insights,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    info!("Pitchboard report complete");
    Ok(())
}

/// Schedule plus weather insights for every game with a live feed. Feed
/// errors are logged per game and skipped.
async fn fetch_game_context(
    statsapi: &StatsApiClient,
    date: NaiveDate,
) -> (Vec<GameSummary>, Vec<Insight>) {
    let games = match statsapi.games_for_date(date).await {
        Ok(games) => games,
        Err(e) => {
            warn!("schedule unavailable: {e}");
            return (Vec::new(), Vec::new());
        }
    };

    let mut all_insights = Vec::new();
    for game in &games {
        match statsapi.live_game(game.game_pk).await {
            Ok(live) => all_insights.extend(insights::weather_insights(&live.weather)),
            Err(e) => warn!(game_pk = game.game_pk, "live feed unavailable: {e}"),
        }
    }
    (games, all_insights)
}

/// Tabulate the columns the validator derives averages from.
fn pitch_table(pitches: &[PitchRecord]) -> anyhow::Result<StatTable> {
    let mut table = StatTable::new();
    table.set_text_column(
        "events",
        pitches.iter().map(|p| p.events.clone()).collect(),
    )?;
    table.set_text_column(
        "player_name",
        pitches.iter().map(|p| p.player_name.clone()).collect(),
    )?;
    table.set_text_column(
        "player_id",
        pitches
            .iter()
            .map(|p| p.batter.map(|b| b.to_string()))
            .collect(),
    )?;
    Ok(table)
}

fn parse_args() -> anyhow::Result<CliArgs> {
    let mut parsed = CliArgs {
        player_id: None,
        days: 3,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--player" => {
                parsed.player_id = Some(args.next().context("--player requires an id")?);
            }
            "--days" => {
                let value = args.next().context("--days requires a number")?;
                parsed.days = value.parse().context("--days must be a number")?;
            }
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }
    if parsed.days <= 0 {
        anyhow::bail!("--days must be positive");
    }
    Ok(parsed)
}

/// Initialize tracing to stderr so stdout stays clean for the JSON report.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pitchboard=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
