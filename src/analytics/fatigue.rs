// Pitcher fatigue by times through the batting order.
//
// Pass number is derived from the at-bat number (nine batters per pass,
// capped at four passes). Contact quality per pass exposes the classic
// third-time-through penalty.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::providers::statcast::PitchRecord;

const BATTERS_PER_PASS: u64 = 9;
const MAX_PASSES: u64 = 4;

/// Which pass through the order an at-bat belongs to, clamped to 1..=4.
pub fn times_through_order(at_bat_number: u64) -> u64 {
    let pass = (at_bat_number.saturating_sub(1) / BATTERS_PER_PASS) + 1;
    pass.clamp(1, MAX_PASSES)
}

/// Contact quality for one pass through the order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassStats {
    pub times_through: u64,
    pub total_pitches: usize,
    pub avg_exit_velo: Option<f64>,
    pub avg_launch_angle: Option<f64>,
    pub home_runs: usize,
    pub hr_rate_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FatigueReport {
    pub passes: Vec<PassStats>,
    /// Exit velocity change from the first to the third pass, when both
    /// exist.
    pub exit_velo_delta: Option<f64>,
    /// Home run rate change (percentage points) from first to third pass.
    pub hr_rate_delta: Option<f64>,
}

/// Aggregate pitches by pass through the order. Pitches without a pitcher or
/// at-bat number are dropped; averages skip pitches without tracking data.
pub fn fatigue_report(pitches: &[PitchRecord]) -> FatigueReport {
    #[derive(Default)]
    struct Tally {
        total: usize,
        speed_sum: f64,
        speed_n: usize,
        angle_sum: f64,
        angle_n: usize,
        home_runs: usize,
    }

    let mut tallies: BTreeMap<u64, Tally> = BTreeMap::new();
    for pitch in pitches {
        let (Some(_), Some(ab)) = (pitch.pitcher, pitch.at_bat_number) else {
            continue;
        };
        let tally = tallies.entry(times_through_order(ab)).or_default();
        tally.total += 1;
        if let Some(speed) = pitch.launch_speed {
            tally.speed_sum += speed;
            tally.speed_n += 1;
        }
        if let Some(angle) = pitch.launch_angle {
            tally.angle_sum += angle;
            tally.angle_n += 1;
        }
        if pitch.events.as_deref() == Some("home_run") {
            tally.home_runs += 1;
        }
    }

    let passes: Vec<PassStats> = tallies
        .into_iter()
        .map(|(times_through, t)| PassStats {
            times_through,
            total_pitches: t.total,
            avg_exit_velo: (t.speed_n > 0).then(|| t.speed_sum / t.speed_n as f64),
            avg_launch_angle: (t.angle_n > 0).then(|| t.angle_sum / t.angle_n as f64),
            home_runs: t.home_runs,
            hr_rate_pct: t.home_runs as f64 / t.total as f64 * 100.0,
        })
        .collect();

    let first = passes.iter().find(|p| p.times_through == 1);
    let third = passes.iter().find(|p| p.times_through == 3);

    let exit_velo_delta = match (first, third) {
        (Some(f), Some(t)) => match (f.avg_exit_velo, t.avg_exit_velo) {
            (Some(fv), Some(tv)) => Some(tv - fv),
            _ => None,
        },
        _ => None,
    };
    let hr_rate_delta = match (first, third) {
        (Some(f), Some(t)) => Some(t.hr_rate_pct - f.hr_rate_pct),
        _ => None,
    };

    FatigueReport {
        passes,
        exit_velo_delta,
        hr_rate_delta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_boundaries() {
        assert_eq!(times_through_order(1), 1);
        assert_eq!(times_through_order(9), 1);
        assert_eq!(times_through_order(10), 2);
        assert_eq!(times_through_order(18), 2);
        assert_eq!(times_through_order(19), 3);
        assert_eq!(times_through_order(28), 4);
        // Caps at four however deep the game goes.
        assert_eq!(times_through_order(45), 4);
        assert_eq!(times_through_order(0), 1);
    }

    fn pitch(ab: u64, speed: Option<f64>, events: Option<&str>) -> PitchRecord {
        PitchRecord {
            pitcher: Some(660271),
            at_bat_number: Some(ab),
            launch_speed: speed,
            launch_angle: speed.map(|_| 15.0),
            events: events.map(str::to_string),
            ..PitchRecord::default()
        }
    }

    #[test]
    fn aggregates_by_pass_and_computes_deltas() {
        let pitches = vec![
            // First pass: 90 mph, no HR.
            pitch(2, Some(90.0), Some("field_out")),
            pitch(5, Some(90.0), None),
            // Third pass: 100 mph, one HR of two pitches.
            pitch(20, Some(100.0), Some("home_run")),
            pitch(22, Some(100.0), Some("single")),
        ];

        let report = fatigue_report(&pitches);
        assert_eq!(report.passes.len(), 2);
        assert_eq!(report.passes[0].times_through, 1);
        assert_eq!(report.passes[1].times_through, 3);
        assert_eq!(report.passes[1].home_runs, 1);
        assert!((report.passes[1].hr_rate_pct - 50.0).abs() < 1e-9);
        assert_eq!(report.exit_velo_delta, Some(10.0));
        assert_eq!(report.hr_rate_delta, Some(50.0));
    }

    #[test]
    fn missing_identity_rows_are_dropped() {
        let mut orphan = pitch(3, Some(95.0), None);
        orphan.pitcher = None;
        let report = fatigue_report(&[orphan]);
        assert!(report.passes.is_empty());
        assert_eq!(report.exit_velo_delta, None);
    }

    #[test]
    fn averages_skip_untracked_pitches() {
        let pitches = vec![pitch(1, Some(92.0), None), pitch(2, None, None)];
        let report = fatigue_report(&pitches);
        assert_eq!(report.passes[0].total_pitches, 2);
        assert_eq!(report.passes[0].avg_exit_velo, Some(92.0));
    }
}
