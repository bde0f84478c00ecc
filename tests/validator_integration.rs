// End-to-end validation tests: the fallback cascade, table repair, player
// record defaulting, and cache behavior, driven through the public API with
// a stubbed pitch-data provider and a manual clock.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, TimeZone, Utc};

use pitchboard::clock::{Clock, ManualClock};
use pitchboard::config::ValidatorSettings;
use pitchboard::providers::statcast::{PitchRecord, StatcastProvider};
use pitchboard::providers::ProviderError;
use pitchboard::table::{StatTable, StatTableBuilder};
use pitchboard::validator::{
    DataQuality, FallbackTier, FallbackValidator, RawPlayerRecord, LEAGUE_AVERAGE,
};

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ---------------------------------------------------------------------------
// Stub provider
// ---------------------------------------------------------------------------

struct StubStatcast {
    rows: Vec<PitchRecord>,
    fail: bool,
    fetches: AtomicUsize,
}

impl StubStatcast {
    fn with_events(events: &[Option<&str>]) -> Self {
        let rows = events
            .iter()
            .map(|e| PitchRecord {
                events: e.map(str::to_string),
                ..PitchRecord::default()
            })
            .collect();
        Self {
            rows,
            fail: false,
            fetches: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            rows: Vec::new(),
            fail: true,
            fetches: AtomicUsize::new(0),
        }
    }

    fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatcastProvider for StubStatcast {
    async fn fetch_player_record_data(
        &self,
        _start: NaiveDate,
        _end: NaiveDate,
        _player_id: &str,
    ) -> Result<Vec<PitchRecord>, ProviderError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProviderError::MissingField("stub outage"));
        }
        Ok(self.rows.clone())
    }

    async fn fetch_range(
        &self,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<PitchRecord>, ProviderError> {
        Ok(self.rows.clone())
    }
}

fn setup(provider: Arc<StubStatcast>) -> (FallbackValidator, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 7, 10, 15, 0, 0).unwrap(),
    ));
    let validator =
        FallbackValidator::new(ValidatorSettings::default(), provider, clock.clone());
    (validator, clock)
}

// ---------------------------------------------------------------------------
// Cascade tier precedence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fresh_cache_beats_season_average() {
    let provider = Arc::new(StubStatcast::with_events(&[Some("single"), None]));
    let (validator, _) = setup(provider.clone());

    validator.cache_player_average("660271", 0.321);
    let table = StatTableBuilder::new()
        .floats("batting_avg", vec![None])
        .texts("player_id", vec!["660271"])
        .build();

    let result = validator.validate_batting_averages(table, None).await;
    assert!(approx_eq(
        result.table.float_column("batting_avg").unwrap()[0].unwrap(),
        0.321
    ));
    assert_eq!(result.repairs[0].tier, FallbackTier::PreviousGame);
    // The cascade never reached the provider.
    assert_eq!(provider.fetch_count(), 0);
}

#[tokio::test]
async fn stale_cache_is_skipped_in_favor_of_season_average() {
    // 2 hits over 4 pitches -> 0.500 season average.
    let provider = Arc::new(StubStatcast::with_events(&[
        Some("single"),
        Some("home_run"),
        Some("strikeout"),
        None,
    ]));
    let (validator, clock) = setup(provider.clone());

    validator.cache_player_average("660271", 0.321);
    clock.advance(Duration::hours(25));

    let (value, tier) = validator.fallback_average(Some("660271")).await;
    assert!(approx_eq(value, 0.5));
    assert_eq!(tier, FallbackTier::SeasonAverage);
    assert_eq!(provider.fetch_count(), 1);
}

#[tokio::test]
async fn season_average_is_reused_from_cache_on_second_lookup() {
    let provider = Arc::new(StubStatcast::with_events(&[Some("double"), None]));
    let (validator, _) = setup(provider.clone());

    let (first, _) = validator.fallback_average(Some("42")).await;
    let (second, tier) = validator.fallback_average(Some("42")).await;
    assert!(approx_eq(first, second));
    assert_eq!(tier, FallbackTier::SeasonAverage);
    assert_eq!(provider.fetch_count(), 1);
}

#[tokio::test]
async fn provider_outage_always_resolves_to_league_average() {
    let provider = Arc::new(StubStatcast::failing());
    let (validator, _) = setup(provider);

    let (value, tier) = validator.fallback_average(Some("660271")).await;
    assert!(approx_eq(value, LEAGUE_AVERAGE));
    assert_eq!(tier, FallbackTier::LeagueAverage);
}

// ---------------------------------------------------------------------------
// Table validation guarantees
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validated_table_never_contains_invalid_averages() {
    let provider = Arc::new(StubStatcast::failing());
    let (validator, _) = setup(provider);

    let table = StatTableBuilder::new()
        .floats(
            "batting_avg",
            vec![Some(0.295), None, Some(0.0), Some(-0.3), Some(2.1)],
        )
        .build();

    let result = validator.validate_batting_averages(table, None).await;
    let values = result.table.float_column("batting_avg").unwrap();
    for value in values {
        let v = value.expect("no cell left empty");
        assert!(v > 0.0 && v <= 1.0);
    }
    // The one valid value is untouched.
    assert!(approx_eq(values[0].unwrap(), 0.295));
    assert_eq!(result.repairs.len(), 4);
}

#[tokio::test]
async fn hits_over_at_bats_derivation_matches_hand_computation() {
    let provider = Arc::new(StubStatcast::failing());
    let (validator, _) = setup(provider);

    let table = StatTableBuilder::new()
        .floats("hits", vec![Some(85.0), Some(92.0), Some(78.0)])
        .floats("at_bats", vec![Some(300.0), Some(320.0), Some(295.0)])
        .build();

    let result = validator.validate_batting_averages(table, None).await;
    let derived = result.table.float_column("calculated_avg").unwrap();
    assert!(approx_eq(derived[0].unwrap(), 85.0 / 300.0));
    assert!(approx_eq(derived[1].unwrap(), 92.0 / 320.0));
    assert!(approx_eq(derived[2].unwrap(), 78.0 / 295.0));
    for value in derived {
        assert!(value.unwrap().is_finite());
    }
}

#[tokio::test]
async fn empty_table_is_returned_unchanged() {
    let provider = Arc::new(StubStatcast::failing());
    let (validator, _) = setup(provider);

    let result = validator.validate_batting_averages(StatTable::new(), None).await;
    assert!(result.table.is_empty());
    assert!(result.repairs.is_empty());
}

#[tokio::test]
async fn mixed_avg_and_id_columns_repair_per_player() {
    let provider = Arc::new(StubStatcast::with_events(&[
        Some("single"),
        Some("field_out"),
    ]));
    let (validator, _) = setup(provider);
    validator.cache_player_average("1", 0.300);

    let table = StatTableBuilder::new()
        .floats("avg", vec![None, None])
        .texts("player_id", vec!["1", "2"])
        .build();

    let result = validator.validate_batting_averages(table, None).await;
    let values = result.table.float_column("avg").unwrap();
    // Row 0 from the cache, row 1 from the stub's season data (0.500).
    assert!(approx_eq(values[0].unwrap(), 0.300));
    assert!(approx_eq(values[1].unwrap(), 0.5));
    assert_eq!(result.repairs[0].tier, FallbackTier::PreviousGame);
    assert_eq!(result.repairs[1].tier, FallbackTier::SeasonAverage);
}

#[tokio::test]
async fn table_wide_player_id_reaches_the_cache() {
    // Single-player dumps often carry no id column; the caller supplies
    // the id for every row instead.
    let provider = Arc::new(StubStatcast::failing());
    let (validator, _) = setup(provider.clone());
    validator.cache_player_average("660271", 0.318);

    let table = StatTableBuilder::new()
        .floats("batting_avg", vec![None, None, None])
        .build();

    let result = validator
        .validate_batting_averages(table, Some("660271"))
        .await;
    let values = result.table.float_column("batting_avg").unwrap();
    for value in values {
        assert!(approx_eq(value.unwrap(), 0.318));
    }
    assert!(result
        .repairs
        .iter()
        .all(|r| r.tier == FallbackTier::PreviousGame));
    assert_eq!(provider.fetch_count(), 0);
}

#[tokio::test]
async fn per_row_id_wins_over_table_wide_id() {
    let provider = Arc::new(StubStatcast::failing());
    let (validator, _) = setup(provider);
    validator.cache_player_average("1", 0.300);
    validator.cache_player_average("2", 0.200);

    let table = StatTableBuilder::new()
        .floats("avg", vec![None, None])
        .texts("player_id", vec!["2", "2"])
        .build();

    let result = validator.validate_batting_averages(table, Some("1")).await;
    let values = result.table.float_column("avg").unwrap();
    assert!(approx_eq(values[0].unwrap(), 0.200));
    assert!(approx_eq(values[1].unwrap(), 0.200));
}

#[tokio::test]
async fn derived_out_of_range_ratio_is_repaired() {
    let provider = Arc::new(StubStatcast::failing());
    let (validator, _) = setup(provider);

    // Row 0 claims more hits than at-bats; row 1 is clean.
    let table = StatTableBuilder::new()
        .floats("hits", vec![Some(5.0), Some(2.0)])
        .floats("at_bats", vec![Some(4.0), Some(8.0)])
        .build();

    let result = validator.validate_batting_averages(table, None).await;
    let derived = result.table.float_column("calculated_avg").unwrap();
    assert!(approx_eq(derived[0].unwrap(), LEAGUE_AVERAGE));
    assert!(approx_eq(derived[1].unwrap(), 0.25));
    assert_eq!(result.repairs.len(), 1);
    assert_eq!(result.repairs[0].column, "calculated_avg");
    assert_eq!(result.repairs[0].tier, FallbackTier::LeagueAverage);
}

#[tokio::test]
async fn hitless_season_window_bottoms_out_at_league_average() {
    let provider = Arc::new(StubStatcast::with_events(&[
        Some("strikeout"),
        Some("field_out"),
        None,
    ]));
    let (validator, _) = setup(provider.clone());

    let (value, tier) = validator.fallback_average(Some("660271")).await;
    assert!(approx_eq(value, LEAGUE_AVERAGE));
    assert_eq!(tier, FallbackTier::LeagueAverage);
    assert_eq!(provider.fetch_count(), 1);
    // A hitless window is not cached; the next lookup asks again.
    let (_, tier) = validator.fallback_average(Some("660271")).await;
    assert_eq!(tier, FallbackTier::LeagueAverage);
    assert_eq!(provider.fetch_count(), 2);
}

// ---------------------------------------------------------------------------
// Player records and cache management
// ---------------------------------------------------------------------------

#[tokio::test]
async fn absent_player_record_defaults_every_field() {
    let provider = Arc::new(StubStatcast::failing());
    let (validator, _) = setup(provider);

    let validated = validator.validate_player_data(None);
    assert_eq!(validated.record.name, "Unknown Player");
    assert_eq!(validated.record.position, "Unknown");
    assert_eq!(validated.record.team, "Free Agent");
    assert_eq!(validated.record.player_id, None);
    assert!(approx_eq(validated.record.batting_avg, LEAGUE_AVERAGE));
    assert_eq!(validated.quality, DataQuality::InsufficientData);
}

#[tokio::test]
async fn complete_player_record_grades_high() {
    let provider = Arc::new(StubStatcast::failing());
    let (validator, _) = setup(provider);

    let validated = validator.validate_player_data(Some(RawPlayerRecord {
        player_id: Some("592450".into()),
        name: Some("Aaron Judge".into()),
        position: Some("RF".into()),
        team: Some("New York Yankees".into()),
        batting_avg: Some(0.287),
    }));
    assert_eq!(validated.quality, DataQuality::High);
    assert!(approx_eq(validated.record.batting_avg, 0.287));
}

#[tokio::test]
async fn clear_cache_resets_stats_and_future_lookups() {
    let provider = Arc::new(StubStatcast::failing());
    let (validator, _) = setup(provider);

    validator.cache_player_average("660271", 0.310);
    assert_eq!(validator.validation_stats().cached_entries, 1);

    validator.clear_cache();
    assert_eq!(validator.validation_stats().cached_entries, 0);

    // With nothing cached and the provider down, the cascade bottoms out.
    let (value, tier) = validator.fallback_average(Some("660271")).await;
    assert!(approx_eq(value, LEAGUE_AVERAGE));
    assert_eq!(tier, FallbackTier::LeagueAverage);
}

#[tokio::test]
async fn stats_report_configuration_and_clock() {
    let provider = Arc::new(StubStatcast::failing());
    let (validator, clock) = setup(provider);

    let stats = validator.validation_stats();
    assert_eq!(stats.cache_duration_hours, 24);
    assert!(approx_eq(stats.league_average, LEAGUE_AVERAGE));
    assert_eq!(stats.generated_at, clock.now());
}
