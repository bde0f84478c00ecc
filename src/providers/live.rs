// Live game data provider: the MLB StatsAPI.
//
// All endpoints read through a shared `ResponseCache` keyed per request, with
// per-endpoint TTLs from config. Payloads arrive as JSON and are picked apart
// into small typed summaries; fields the API omits become None rather than
// errors, except where the payload shape itself is wrong.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::ResponseCache;
use crate::config::{CacheTtls, ProviderSettings};
use crate::providers::ProviderError;

// ---------------------------------------------------------------------------
// Typed summaries
// ---------------------------------------------------------------------------

/// One scheduled or in-progress game from the daily schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSummary {
    pub game_pk: u64,
    pub state: String,
    pub home_team: String,
    pub away_team: String,
    pub home_score: Option<u64>,
    pub away_score: Option<u64>,
    pub venue: Option<String>,
}

/// Ballpark weather attached to a live game feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Weather {
    pub temp_f: Option<f64>,
    pub wind: Option<String>,
    pub condition: Option<String>,
}

/// The slice of the live feed the analyzers consume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveGame {
    pub game_pk: u64,
    pub state: String,
    pub weather: Weather,
    pub inning: Option<u64>,
}

/// Season hitting line for one player.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerSeasonStats {
    pub player_id: u64,
    pub full_name: Option<String>,
    pub position: Option<String>,
    pub team: Option<String>,
    pub batting_avg: Option<f64>,
    pub home_runs: Option<u64>,
    pub at_bats: Option<u64>,
}

/// One team's standings row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamStanding {
    pub team: String,
    pub wins: u64,
    pub losses: u64,
    pub win_pct: Option<f64>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct StatsApiClient {
    http: reqwest::Client,
    base_url: String,
    cache: Arc<ResponseCache>,
    ttls: CacheTtls,
}

impl StatsApiClient {
    pub fn new(
        settings: &ProviderSettings,
        ttls: CacheTtls,
        cache: Arc<ResponseCache>,
    ) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: settings.statsapi_base_url.trim_end_matches('/').to_string(),
            cache,
            ttls,
        })
    }

    /// GET a JSON payload, reading through the response cache.
    async fn fetch_json(
        &self,
        cache_key: &str,
        ttl_secs: u64,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Value, ProviderError> {
        if let Some(cached) = self.cache.get(cache_key) {
            return Ok(cached);
        }

        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "statsapi request");
        let response = self.http.get(&url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let payload: Value = response.json().await?;
        self.cache
            .set(cache_key, payload.clone(), Duration::from_secs(ttl_secs));
        Ok(payload)
    }

    /// Games scheduled for a date.
    pub async fn games_for_date(&self, date: NaiveDate) -> Result<Vec<GameSummary>, ProviderError> {
        let date_str = date.format("%Y-%m-%d").to_string();
        let payload = self
            .fetch_json(
                &format!("games_{date_str}"),
                self.ttls.games_secs,
                "/api/v1/schedule",
                &[("sportId", "1".to_string()), ("date", date_str.clone())],
            )
            .await?;
        parse_schedule(&payload)
    }

    /// The live feed for one game, reduced to state and weather.
    pub async fn live_game(&self, game_pk: u64) -> Result<LiveGame, ProviderError> {
        let payload = self
            .fetch_json(
                &format!("live_game_{game_pk}"),
                self.ttls.live_game_secs,
                &format!("/api/v1.1/game/{game_pk}/feed/live"),
                &[],
            )
            .await?;
        parse_live_game(game_pk, &payload)
    }

    /// Season hitting stats for one player.
    pub async fn player_season_stats(
        &self,
        player_id: u64,
        season: i32,
    ) -> Result<PlayerSeasonStats, ProviderError> {
        let hydrate = format!("stats(group=[hitting],type=[season],season={season})");
        let payload = self
            .fetch_json(
                &format!("player_stats_{player_id}_{season}"),
                self.ttls.player_stats_secs,
                &format!("/api/v1/people/{player_id}"),
                &[("hydrate", hydrate)],
            )
            .await?;
        parse_player_stats(player_id, &payload)
    }

    /// League standings as of a date.
    pub async fn standings(&self, date: NaiveDate) -> Result<Vec<TeamStanding>, ProviderError> {
        let date_str = date.format("%Y-%m-%d").to_string();
        let season = date.format("%Y").to_string();
        let payload = self
            .fetch_json(
                &format!("standings_{date_str}"),
                self.ttls.standings_secs,
                "/api/v1/standings",
                &[
                    ("leagueId", "103,104".to_string()),
                    ("season", season),
                    ("date", date_str.clone()),
                ],
            )
            .await?;
        Ok(parse_standings(&payload))
    }
}

// ---------------------------------------------------------------------------
// Payload extraction
// ---------------------------------------------------------------------------

fn parse_schedule(payload: &Value) -> Result<Vec<GameSummary>, ProviderError> {
    let dates = payload["dates"]
        .as_array()
        .ok_or(ProviderError::MissingField("dates"))?;

    let mut games = Vec::new();
    for date_block in dates {
        let Some(day_games) = date_block["games"].as_array() else {
            continue;
        };
        for game in day_games {
            let Some(game_pk) = game["gamePk"].as_u64() else {
                warn!("schedule entry without gamePk, skipping");
                continue;
            };
            games.push(GameSummary {
                game_pk,
                state: game["status"]["detailedState"]
                    .as_str()
                    .unwrap_or("Unknown")
                    .to_string(),
                home_team: team_name(&game["teams"]["home"]),
                away_team: team_name(&game["teams"]["away"]),
                home_score: game["teams"]["home"]["score"].as_u64(),
                away_score: game["teams"]["away"]["score"].as_u64(),
                venue: game["venue"]["name"].as_str().map(str::to_string),
            });
        }
    }
    Ok(games)
}

fn team_name(side: &Value) -> String {
    side["team"]["name"]
        .as_str()
        .unwrap_or("Unknown")
        .to_string()
}

fn parse_live_game(game_pk: u64, payload: &Value) -> Result<LiveGame, ProviderError> {
    let game_data = payload
        .get("gameData")
        .ok_or(ProviderError::MissingField("gameData"))?;

    let weather_block = &game_data["weather"];
    // Temperature arrives as a string, e.g. "78".
    let temp_f = weather_block["temp"]
        .as_str()
        .and_then(|t| t.trim().parse::<f64>().ok())
        .or_else(|| weather_block["temp"].as_f64());

    Ok(LiveGame {
        game_pk,
        state: game_data["status"]["detailedState"]
            .as_str()
            .unwrap_or("Unknown")
            .to_string(),
        weather: Weather {
            temp_f,
            wind: weather_block["wind"].as_str().map(str::to_string),
            condition: weather_block["condition"].as_str().map(str::to_string),
        },
        inning: payload["liveData"]["linescore"]["currentInning"].as_u64(),
    })
}

fn parse_player_stats(player_id: u64, payload: &Value) -> Result<PlayerSeasonStats, ProviderError> {
    let person = payload["people"]
        .as_array()
        .and_then(|p| p.first())
        .ok_or(ProviderError::MissingField("people"))?;

    let split_stat = person["stats"]
        .as_array()
        .and_then(|groups| groups.first())
        .and_then(|group| group["splits"].as_array())
        .and_then(|splits| splits.first())
        .map(|split| &split["stat"]);

    // StatsAPI formats averages as strings like ".287".
    let batting_avg = split_stat
        .and_then(|s| s["avg"].as_str())
        .and_then(|a| a.trim().parse::<f64>().ok());

    Ok(PlayerSeasonStats {
        player_id,
        full_name: person["fullName"].as_str().map(str::to_string),
        position: person["primaryPosition"]["abbreviation"]
            .as_str()
            .map(str::to_string),
        team: person["currentTeam"]["name"].as_str().map(str::to_string),
        batting_avg,
        home_runs: split_stat.and_then(|s| s["homeRuns"].as_u64()),
        at_bats: split_stat.and_then(|s| s["atBats"].as_u64()),
    })
}

fn parse_standings(payload: &Value) -> Vec<TeamStanding> {
    let mut standings = Vec::new();
    let Some(records) = payload["records"].as_array() else {
        return standings;
    };
    for division in records {
        let Some(team_records) = division["teamRecords"].as_array() else {
            continue;
        };
        for record in team_records {
            let Some(team) = record["team"]["name"].as_str() else {
                continue;
            };
            standings.push(TeamStanding {
                team: team.to_string(),
                wins: record["wins"].as_u64().unwrap_or(0),
                losses: record["losses"].as_u64().unwrap_or(0),
                win_pct: record["winningPercentage"]
                    .as_str()
                    .and_then(|p| p.trim().parse::<f64>().ok()),
            });
        }
    }
    standings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
