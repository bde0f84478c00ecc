// Barrel classification and the weekly expected-vs-actual home run model.
//
// A barrel is a batted ball whose exit velocity and launch angle fall inside
// Statcast's banded definition: the qualifying angle window opens by one
// degree on each side per mph above 98, with wider jumps at 100 and 116.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::analytics::{is_batted_ball, DEFAULT_XWOBA};
use crate::providers::statcast::PitchRecord;

// ---------------------------------------------------------------------------
// Barrel bands
// ---------------------------------------------------------------------------

// (minimum exit velocity, lowest angle, highest angle), descending by speed.
const BARREL_BANDS: [(f64, f64, f64); 19] = [
    (116.0, 8.0, 50.0),
    (115.0, 9.0, 48.0),
    (114.0, 10.0, 47.0),
    (113.0, 11.0, 46.0),
    (112.0, 12.0, 45.0),
    (111.0, 13.0, 44.0),
    (110.0, 14.0, 43.0),
    (109.0, 15.0, 42.0),
    (108.0, 16.0, 41.0),
    (107.0, 17.0, 40.0),
    (106.0, 18.0, 39.0),
    (105.0, 19.0, 38.0),
    (104.0, 20.0, 37.0),
    (103.0, 21.0, 36.0),
    (102.0, 22.0, 35.0),
    (101.0, 23.0, 34.0),
    (100.0, 24.0, 33.0),
    (99.0, 25.0, 31.0),
    (98.0, 26.0, 30.0),
];

/// Banded barrel test on raw measurements.
pub fn is_barrel(exit_velocity: f64, launch_angle: f64) -> bool {
    for (min_speed, low, high) in BARREL_BANDS {
        if exit_velocity >= min_speed {
            return (low..=high).contains(&launch_angle);
        }
    }
    false
}

/// Barrel test on a pitch record; pitches without both measurements never
/// qualify.
pub fn pitch_is_barrel(pitch: &PitchRecord) -> bool {
    match (pitch.launch_speed, pitch.launch_angle) {
        (Some(speed), Some(angle)) => is_barrel(speed, angle),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Weekly expected home runs
// ---------------------------------------------------------------------------

/// One ISO week of batted-ball production for a batter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyValue {
    pub week_start: NaiveDate,
    pub batted_balls: usize,
    pub barrels: usize,
    pub actual_hr: usize,
    pub avg_xwoba: f64,
    pub expected_hr: f64,
    /// Expected minus actual; positive means production lagged the
    /// underlying contact quality.
    pub value_gap: f64,
}

/// Direction the recent value gap points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValueTrend {
    Undervalued,
    Overvalued,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueReport {
    pub weeks: Vec<WeeklyValue>,
    pub trend: ValueTrend,
}

/// Blend weights for the expected-HR model: barrels carry most of the
/// signal, expected wOBA volume the rest.
const BARREL_WEIGHT: f64 = 0.6;
const XWOBA_WEIGHT: f64 = 0.3;

/// How many recent weeks the trend looks at, and the mean-gap band treated
/// as noise.
const TREND_WINDOW_WEEKS: usize = 3;
const TREND_THRESHOLD: f64 = 0.5;

/// Group a batter's pitches into ISO weeks and compare expected home run
/// production against actual. Pitches without a game date are dropped.
pub fn weekly_value_report(pitches: &[PitchRecord]) -> ValueReport {
    let mut weeks: BTreeMap<NaiveDate, Vec<&PitchRecord>> = BTreeMap::new();
    for pitch in pitches {
        if let Some(date) = pitch.game_date {
            weeks.entry(week_start(date)).or_default().push(pitch);
        }
    }

    let weeks: Vec<WeeklyValue> = weeks
        .into_iter()
        .map(|(week_start, pitches)| summarize_week(week_start, &pitches))
        .collect();

    let trend = trend_from(&weeks);
    ValueReport { weeks, trend }
}

fn summarize_week(week_start: NaiveDate, pitches: &[&PitchRecord]) -> WeeklyValue {
    let batted: Vec<&&PitchRecord> = pitches.iter().filter(|p| is_batted_ball(p)).collect();
    let barrels = batted.iter().filter(|p| pitch_is_barrel(p)).count();
    let actual_hr = pitches
        .iter()
        .filter(|p| p.events.as_deref() == Some("home_run"))
        .count();

    let xwobas: Vec<f64> = batted.iter().filter_map(|p| p.estimated_woba).collect();
    let avg_xwoba = if xwobas.is_empty() {
        DEFAULT_XWOBA
    } else {
        xwobas.iter().sum::<f64>() / xwobas.len() as f64
    };

    let expected_hr =
        barrels as f64 * BARREL_WEIGHT + avg_xwoba * batted.len() as f64 * XWOBA_WEIGHT;

    WeeklyValue {
        week_start,
        batted_balls: batted.len(),
        barrels,
        actual_hr,
        avg_xwoba,
        expected_hr,
        value_gap: expected_hr - actual_hr as f64,
    }
}

fn trend_from(weeks: &[WeeklyValue]) -> ValueTrend {
    let recent: Vec<&WeeklyValue> = weeks.iter().rev().take(TREND_WINDOW_WEEKS).collect();
    if recent.is_empty() {
        return ValueTrend::Neutral;
    }
    let mean_gap = recent.iter().map(|w| w.value_gap).sum::<f64>() / recent.len() as f64;

    if mean_gap > TREND_THRESHOLD {
        ValueTrend::Undervalued
    } else if mean_gap < -TREND_THRESHOLD {
        ValueTrend::Overvalued
    } else {
        ValueTrend::Neutral
    }
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - chrono::Duration::days(date.weekday().num_days_from_monday() as i64)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
