// Historical pitch-data provider: Baseball Savant's Statcast CSV search feed.
//
// Rows are deserialized into `PitchRecord` with serde; Savant encodes missing
// measurements as empty fields or the literal string "null", so every
// measurement field goes through a tolerant deserializer. Malformed rows are
// skipped with a warning rather than failing the whole fetch.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use crate::config::ProviderSettings;
use crate::providers::ProviderError;

// ---------------------------------------------------------------------------
// Pitch record
// ---------------------------------------------------------------------------

/// One Statcast pitch row. Identity fields are optional because the feed
/// omits them for some pitch types; numeric measurements are optional because
/// tracking data is frequently missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PitchRecord {
    #[serde(default, deserialize_with = "de_opt_date")]
    pub game_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub player_name: Option<String>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub batter: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub pitcher: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub events: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub stand: Option<String>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub launch_speed: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub launch_angle: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub plate_x: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub plate_z: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub sz_top: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub sz_bot: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub at_bat_number: Option<u64>,
    #[serde(
        default,
        rename = "estimated_woba_using_speedangle",
        deserialize_with = "de_opt_f64"
    )]
    pub estimated_woba: Option<f64>,
    #[serde(default, rename = "hit_distance_sc", deserialize_with = "de_opt_f64")]
    pub hit_distance: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub home_team: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub away_team: Option<String>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub game_pk: Option<u64>,
}

// ---------------------------------------------------------------------------
// Tolerant field deserializers
// ---------------------------------------------------------------------------

fn is_missing(s: &str) -> bool {
    let t = s.trim();
    t.is_empty() || t.eq_ignore_ascii_case("null") || t.eq_ignore_ascii_case("na")
}

fn de_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(raw.and_then(|s| {
        if is_missing(&s) {
            None
        } else {
            Some(s.trim().to_string())
        }
    }))
}

fn de_opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    match raw {
        Some(s) if !is_missing(&s) => match s.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Ok(None),
        },
        _ => Ok(None),
    }
}

fn de_opt_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    match raw {
        Some(s) if !is_missing(&s) => match s.trim().parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => Ok(Some(v.round() as u64)),
            _ => Ok(None),
        },
        _ => Ok(None),
    }
}

fn de_opt_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    match raw {
        Some(s) if !is_missing(&s) => {
            // Savant emits either plain dates or datetime strings.
            let t = s.trim();
            let date_part = t.split('T').next().unwrap_or(t);
            Ok(NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok())
        }
        _ => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// Historical pitch-data source. The validator's tier-2 season lookup and the
/// report binary both go through this seam; tests substitute stub
/// implementations.
#[async_trait]
pub trait StatcastProvider: Send + Sync {
    /// Fetch pitch-level rows for one batter over a date range.
    async fn fetch_player_record_data(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        player_id: &str,
    ) -> Result<Vec<PitchRecord>, ProviderError>;

    /// Fetch pitch-level rows for all games in a date range.
    async fn fetch_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PitchRecord>, ProviderError>;
}

// ---------------------------------------------------------------------------
// Savant HTTP client
// ---------------------------------------------------------------------------

const SEARCH_PATH: &str = "/statcast_search/csv";

pub struct SavantClient {
    http: reqwest::Client,
    base_url: String,
}

impl SavantClient {
    pub fn new(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(settings.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: settings.savant_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_csv(&self, query: &[(&str, String)]) -> Result<Vec<PitchRecord>, ProviderError> {
        let url = format!("{}{}", self.base_url, SEARCH_PATH);
        let response = self.http.get(&url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        Ok(parse_pitch_csv(&body))
    }
}

/// Parse a Savant CSV body, skipping rows that fail to deserialize.
pub fn parse_pitch_csv(body: &str) -> Vec<PitchRecord> {
    let mut reader = csv::Reader::from_reader(body.as_bytes());
    let mut records = Vec::new();
    for result in reader.deserialize::<PitchRecord>() {
        match result {
            Ok(record) => records.push(record),
            Err(e) => warn!("skipping malformed pitch row: {e}"),
        }
    }
    debug!("parsed {} pitch rows", records.len());
    records
}

#[async_trait]
impl StatcastProvider for SavantClient {
    async fn fetch_player_record_data(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        player_id: &str,
    ) -> Result<Vec<PitchRecord>, ProviderError> {
        let query = [
            ("all", "true".to_string()),
            ("player_type", "batter".to_string()),
            ("game_date_gt", start.format("%Y-%m-%d").to_string()),
            ("game_date_lt", end.format("%Y-%m-%d").to_string()),
            ("batters_lookup[]", player_id.to_string()),
            ("type", "details".to_string()),
        ];
        self.fetch_csv(&query).await
    }

    async fn fetch_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PitchRecord>, ProviderError> {
        let query = [
            ("all", "true".to_string()),
            ("player_type", "batter".to_string()),
            ("game_date_gt", start.format("%Y-%m-%d").to_string()),
            ("game_date_lt", end.format("%Y-%m-%d").to_string()),
            ("type", "details".to_string()),
        ];
        self.fetch_csv(&query).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
