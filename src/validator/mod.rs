// Batting-average validation with a three-tier fallback cascade.
//
// Invalid averages (missing, zero, negative, above 1.0) are repaired from the
// first tier that can answer: a recent cached value for the player, then a
// season average computed from pitch-level data, then the league-wide
// constant. The league tier always resolves, so validation never fails and
// never leaves an invalid value in place.

pub mod cache;
pub mod quality;

use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::config::ValidatorSettings;
use crate::providers::statcast::StatcastProvider;
use crate::table::StatTable;

pub use cache::AverageCache;
pub use quality::DataQuality;

/// League-wide batting average used as the final fallback tier.
pub const LEAGUE_AVERAGE: f64 = 0.244;

/// Batted-ball events that count as hits when deriving averages.
const HIT_EVENTS: [&str; 4] = ["single", "double", "triple", "home_run"];

const DEFAULT_NAME: &str = "Unknown Player";
const DEFAULT_POSITION: &str = "Unknown";
const DEFAULT_TEAM: &str = "Free Agent";

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Which fallback tier produced a repaired value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FallbackTier {
    PreviousGame,
    SeasonAverage,
    LeagueAverage,
}

/// One repaired cell: where it was, which tier answered, and the value
/// written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepairRecord {
    pub column: String,
    pub row: usize,
    pub tier: FallbackTier,
    pub value: f64,
}

/// A validated table plus the log of every repair made to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedTable {
    pub table: StatTable,
    pub repairs: Vec<RepairRecord>,
}

/// A player record after defaulting and average repair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerRecord {
    pub player_id: Option<String>,
    pub name: String,
    pub position: String,
    pub team: String,
    pub batting_avg: f64,
}

/// Raw player fields as they arrive from an upstream source.
#[derive(Debug, Clone, Default)]
pub struct RawPlayerRecord {
    pub player_id: Option<String>,
    pub name: Option<String>,
    pub position: Option<String>,
    pub team: Option<String>,
    pub batting_avg: Option<f64>,
}

impl From<crate::providers::live::PlayerSeasonStats> for RawPlayerRecord {
    fn from(stats: crate::providers::live::PlayerSeasonStats) -> Self {
        Self {
            player_id: Some(stats.player_id.to_string()),
            name: stats.full_name,
            position: stats.position,
            team: stats.team,
            batting_avg: stats.batting_avg,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedPlayer {
    pub record: PlayerRecord,
    pub quality: DataQuality,
}

/// Snapshot of the validator's state for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationStats {
    pub cached_entries: usize,
    pub cache_duration_hours: i64,
    pub league_average: f64,
    pub generated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

pub struct FallbackValidator {
    settings: ValidatorSettings,
    cache: AverageCache,
    provider: Arc<dyn StatcastProvider>,
    clock: Arc<dyn Clock>,
}

impl FallbackValidator {
    pub fn new(
        settings: ValidatorSettings,
        provider: Arc<dyn StatcastProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            settings,
            cache: AverageCache::new(),
            provider,
            clock,
        }
    }

    fn cache_duration(&self) -> Duration {
        Duration::hours(self.settings.cache_duration_hours)
    }

    // -- cascade ------------------------------------------------------------

    /// Resolve a replacement average for a player through the fallback
    /// cascade. Always returns a value; the tier tells the caller how far
    /// down it had to go. A tier answer of zero is itself invalid, so both
    /// upper tiers only resolve with a positive value.
    pub async fn fallback_average(&self, player_id: Option<&str>) -> (f64, FallbackTier) {
        if let Some(id) = player_id {
            let now = self.clock.now();
            match self.cache.get_fresh(id, now, self.cache_duration()) {
                Some(value) if value > 0.0 => {
                    debug!(player_id = id, value, "fallback from cached average");
                    return (value, FallbackTier::PreviousGame);
                }
                _ => {}
            }

            if let Some(value) = self.season_average(id).await {
                debug!(player_id = id, value, "fallback from season average");
                return (value, FallbackTier::SeasonAverage);
            }
        }

        (LEAGUE_AVERAGE, FallbackTier::LeagueAverage)
    }

    /// Season-to-date average from pitch-level data: hit events over total
    /// rows, over the window from March 1 of the current year to today.
    /// Cached under a season-prefixed key. Provider failure, an empty
    /// window, or a hitless window yields None and the cascade falls
    /// through.
    async fn season_average(&self, player_id: &str) -> Option<f64> {
        let key = format!("season_avg_{player_id}");
        let now = self.clock.now();
        if let Some(value) = self.cache.get_fresh(&key, now, self.cache_duration()) {
            return Some(value);
        }

        let today = now.date_naive();
        let season_start =
            NaiveDate::from_ymd_opt(today.year(), 3, 1).expect("March 1 is always valid");

        let rows = match self
            .provider
            .fetch_player_record_data(season_start, today, player_id)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                warn!(player_id, "season average fetch failed: {e}");
                return None;
            }
        };
        if rows.is_empty() {
            return None;
        }

        let hits = rows
            .iter()
            .filter(|r| {
                r.events
                    .as_deref()
                    .is_some_and(|e| HIT_EVENTS.contains(&e))
            })
            .count();
        let average = hits as f64 / rows.len() as f64;
        if average <= 0.0 {
            return None;
        }

        self.cache.insert(key, average, now);
        Some(average)
    }

    // -- table validation ---------------------------------------------------

    /// Repair every invalid batting average in the table. Columns named in
    /// the configured average list are repaired in place through the cascade;
    /// when no such column exists, an average column is derived from whatever
    /// inputs are present, then repaired the same way (a derivation can
    /// still produce a zero or an over-1.0 value).
    ///
    /// `player_id` is the table-wide identifier used for rows that carry no
    /// value in the configured id column.
    pub async fn validate_batting_averages(
        &self,
        mut table: StatTable,
        player_id: Option<&str>,
    ) -> ValidatedTable {
        let mut repairs = Vec::new();
        if table.is_empty() {
            return ValidatedTable { table, repairs };
        }

        let mut target_columns: Vec<String> = table
            .column_names()
            .filter(|name| {
                self.settings
                    .average_columns
                    .iter()
                    .any(|c| c.eq_ignore_ascii_case(name))
            })
            .map(str::to_string)
            .collect();

        if target_columns.is_empty() {
            self.derive_average_column(&mut table);
            target_columns = vec![self.settings.derived_column.clone()];
        }

        let player_ids: Vec<Option<String>> = table
            .text_column(&self.settings.player_id_column)
            .map(<[Option<String>]>::to_vec)
            .unwrap_or_else(|| vec![None; table.num_rows()]);

        for column_name in target_columns {
            let invalid_rows: Vec<usize> = match table.float_column(&column_name) {
                Some(values) => values
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| !is_valid_average(**v))
                    .map(|(i, _)| i)
                    .collect(),
                // A textual column under an average name has nothing to
                // repair numerically.
                None => continue,
            };

            for row in invalid_rows {
                let id = player_ids
                    .get(row)
                    .and_then(|v| v.as_deref())
                    .or(player_id);
                let (value, tier) = self.fallback_average(id).await;
                if let Some(values) = table.float_column_mut(&column_name) {
                    values[row] = Some(value);
                }
                repairs.push(RepairRecord {
                    column: column_name.clone(),
                    row,
                    tier,
                    value,
                });
            }
        }

        ValidatedTable { table, repairs }
    }

    /// Build the derived average column when no configured average column is
    /// present: hits over at-bats when both exist, else per-player event
    /// rates. Underivable cells (zero at-bats, no usable inputs) are left
    /// empty; the cascade repairs them like any other invalid value.
    fn derive_average_column(&self, table: &mut StatTable) {
        let rows = table.num_rows();
        let derived_name = self.settings.derived_column.clone();

        let hits = table.float_column(&self.settings.hits_column).map(<[_]>::to_vec);
        let at_bats = table
            .float_column(&self.settings.at_bats_column)
            .map(<[_]>::to_vec);

        let values: Vec<Option<f64>> = if let (Some(hits), Some(at_bats)) = (hits, at_bats) {
            (0..rows)
                .map(|i| match (hits[i], at_bats[i]) {
                    (Some(h), Some(ab)) if ab > 0.0 => Some(h / ab),
                    _ => None,
                })
                .collect()
        } else if let Some(events) = table.text_column(&self.settings.events_column) {
            let events = events.to_vec();
            let names: Vec<Option<String>> = table
                .text_column(&self.settings.player_column)
                .map(<[_]>::to_vec)
                .unwrap_or_else(|| vec![None; rows]);
            self.event_rate_averages(&events, &names)
        } else {
            vec![None; rows]
        };

        // Lengths match by construction.
        let _ = table.set_float_column(derived_name, values);
    }

    /// Per-player hit rates from an events column: each row gets its
    /// player's share of hit events. Rows without a player name share one
    /// group.
    fn event_rate_averages(
        &self,
        events: &[Option<String>],
        names: &[Option<String>],
    ) -> Vec<Option<f64>> {
        use std::collections::HashMap;

        let mut totals: HashMap<Option<&str>, (usize, usize)> = HashMap::new();
        for (event, name) in events.iter().zip(names) {
            let entry = totals.entry(name.as_deref()).or_default();
            entry.1 += 1;
            if event.as_deref().is_some_and(|e| HIT_EVENTS.contains(&e)) {
                entry.0 += 1;
            }
        }

        names
            .iter()
            .map(|name| {
                let (hits, total) = totals[&name.as_deref()];
                if total > 0 {
                    Some(hits as f64 / total as f64)
                } else {
                    Some(LEAGUE_AVERAGE)
                }
            })
            .collect()
    }

    // -- player record validation -------------------------------------------

    /// Default every missing identity field and repair an out-of-range
    /// average, then grade how much of the record held real data. A zero
    /// average is kept as-is (an 0-for-the-season call-up is real data); only
    /// missing or out-of-range averages are replaced.
    pub fn validate_player_data(&self, raw: Option<RawPlayerRecord>) -> ValidatedPlayer {
        let raw = raw.unwrap_or_default();

        let name = non_blank(raw.name).unwrap_or_else(|| DEFAULT_NAME.to_string());
        let position = non_blank(raw.position).unwrap_or_else(|| DEFAULT_POSITION.to_string());
        let team = non_blank(raw.team).unwrap_or_else(|| DEFAULT_TEAM.to_string());
        let player_id = non_blank(raw.player_id);

        let batting_avg = match raw.batting_avg {
            Some(v) if (0.0..=1.0).contains(&v) => v,
            _ => LEAGUE_AVERAGE,
        };

        let checks = [
            name != DEFAULT_NAME,
            player_id.is_some(),
            position != DEFAULT_POSITION,
            team != DEFAULT_TEAM,
            batting_avg != LEAGUE_AVERAGE && batting_avg != 0.0,
        ];
        let satisfied = checks.iter().filter(|&&c| c).count();
        let quality = DataQuality::from_ratio(satisfied as f64 / checks.len() as f64);

        ValidatedPlayer {
            record: PlayerRecord {
                player_id,
                name,
                position,
                team,
                batting_avg,
            },
            quality,
        }
    }

    // -- cache management ---------------------------------------------------

    /// Cache a known-good average for a player. Out-of-range values are
    /// ignored so one bad write cannot poison later fallbacks.
    pub fn cache_player_average(&self, player_id: &str, value: f64) {
        if (0.0..=1.0).contains(&value) {
            self.cache.insert(player_id, value, self.clock.now());
        } else {
            warn!(player_id, value, "refusing to cache out-of-range average");
        }
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn validation_stats(&self) -> ValidationStats {
        ValidationStats {
            cached_entries: self.cache.len(),
            cache_duration_hours: self.settings.cache_duration_hours,
            league_average: LEAGUE_AVERAGE,
            generated_at: self.clock.now(),
        }
    }
}

/// A usable average is present, positive, and at most 1.0. Zero is treated
/// as missing here: a literal 0.000 in a stat dump is overwhelmingly a
/// placeholder, not an 0-for-the-season line.
fn is_valid_average(value: Option<f64>) -> bool {
    matches!(value, Some(v) if v > 0.0 && v <= 1.0)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
