// Strike-zone classification and per-zone umpire call accuracy.
//
// The rule-book zone is a fixed 0.83 ft half-width horizontally and the
// batter's measured top/bottom vertically. Locations are bucketed into seven
// labels; in-zone pitches split Inside/Middle/Outside relative to the
// batter's stand side.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::providers::statcast::PitchRecord;

const ZONE_HALF_WIDTH: f64 = 0.83;
const INNER_HALF_WIDTH: f64 = 0.28;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ZoneLabel {
    Inside,
    Middle,
    Outside,
    Low,
    High,
    WideLeft,
    WideRight,
}

impl ZoneLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneLabel::Inside => "Inside",
            ZoneLabel::Middle => "Middle",
            ZoneLabel::Outside => "Outside",
            ZoneLabel::Low => "Low",
            ZoneLabel::High => "High",
            ZoneLabel::WideLeft => "Wide Left",
            ZoneLabel::WideRight => "Wide Right",
        }
    }
}

/// Rule-book strike zone test.
pub fn in_strike_zone(plate_x: f64, plate_z: f64, sz_bot: f64, sz_top: f64) -> bool {
    (-ZONE_HALF_WIDTH..=ZONE_HALF_WIDTH).contains(&plate_x)
        && (sz_bot..=sz_top).contains(&plate_z)
}

/// Bucket a pitch location. Out-of-zone pitches are labeled vertically
/// first, then horizontally; in-zone pitches split on the inner band with
/// Inside/Outside flipped for left-handed batters.
pub fn classify_zone(
    plate_x: f64,
    plate_z: f64,
    sz_bot: f64,
    sz_top: f64,
    stand: Option<&str>,
) -> ZoneLabel {
    if in_strike_zone(plate_x, plate_z, sz_bot, sz_top) {
        let lefty = stand == Some("L");
        if plate_x < -INNER_HALF_WIDTH {
            if lefty {
                ZoneLabel::Inside
            } else {
                ZoneLabel::Outside
            }
        } else if plate_x > INNER_HALF_WIDTH {
            if lefty {
                ZoneLabel::Outside
            } else {
                ZoneLabel::Inside
            }
        } else {
            ZoneLabel::Middle
        }
    } else if plate_z < sz_bot {
        ZoneLabel::Low
    } else if plate_z > sz_top {
        ZoneLabel::High
    } else if plate_x < -ZONE_HALF_WIDTH {
        ZoneLabel::WideLeft
    } else {
        ZoneLabel::WideRight
    }
}

/// A called strike is any description mentioning a strike.
pub fn is_called_strike(description: &str) -> bool {
    description.contains("strike") || description.contains("Strike")
}

// ---------------------------------------------------------------------------
// Umpire accuracy report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneStats {
    pub zone: ZoneLabel,
    pub total_pitches: usize,
    pub strikes_in_zone: usize,
    pub called_strikes: usize,
    pub accuracy_pct: f64,
    pub call_rate_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UmpireReport {
    pub zones: Vec<ZoneStats>,
    pub total_pitches: usize,
    pub overall_accuracy_pct: f64,
    pub strike_call_rate_pct: f64,
}

/// Per-zone call accuracy over a set of pitches. Pitches missing location,
/// zone bounds, or a description are dropped. The accuracy figure credits an
/// umpire for called strikes inside the zone and uncalled pitches outside
/// it, netted against the zone's pitch count.
pub fn umpire_report(pitches: &[PitchRecord]) -> UmpireReport {
    struct Tally {
        total: usize,
        in_zone: usize,
        called: usize,
    }

    let mut tallies: BTreeMap<ZoneLabel, Tally> = BTreeMap::new();
    let mut total = 0usize;
    let mut total_called = 0usize;

    for pitch in pitches {
        let (Some(x), Some(z), Some(bot), Some(top), Some(description)) = (
            pitch.plate_x,
            pitch.plate_z,
            pitch.sz_bot,
            pitch.sz_top,
            pitch.description.as_deref(),
        ) else {
            continue;
        };

        let zone = classify_zone(x, z, bot, top, pitch.stand.as_deref());
        let called = is_called_strike(description);

        let tally = tallies.entry(zone).or_insert(Tally {
            total: 0,
            in_zone: 0,
            called: 0,
        });
        tally.total += 1;
        if in_strike_zone(x, z, bot, top) {
            tally.in_zone += 1;
        }
        if called {
            tally.called += 1;
        }
        total += 1;
        if called {
            total_called += 1;
        }
    }

    let zones: Vec<ZoneStats> = tallies
        .into_iter()
        .map(|(zone, t)| {
            let n = t.total as f64;
            let correct =
                t.in_zone as f64 + (n - t.total as f64 - t.called as f64 + t.in_zone as f64);
            ZoneStats {
                zone,
                total_pitches: t.total,
                strikes_in_zone: t.in_zone,
                called_strikes: t.called,
                accuracy_pct: correct / n * 100.0,
                call_rate_pct: t.called as f64 / n * 100.0,
            }
        })
        .collect();

    let overall_accuracy_pct = if zones.is_empty() {
        0.0
    } else {
        zones.iter().map(|z| z.accuracy_pct).sum::<f64>() / zones.len() as f64
    };
    let strike_call_rate_pct = if total == 0 {
        0.0
    } else {
        total_called as f64 / total as f64 * 100.0
    };

    UmpireReport {
        zones,
        total_pitches: total,
        overall_accuracy_pct,
        strike_call_rate_pct,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_book_zone_edges_are_inclusive() {
        assert!(in_strike_zone(0.83, 2.0, 1.5, 3.5));
        assert!(in_strike_zone(-0.83, 1.5, 1.5, 3.5));
        assert!(!in_strike_zone(0.84, 2.0, 1.5, 3.5));
        assert!(!in_strike_zone(0.0, 3.51, 1.5, 3.5));
    }

    #[test]
    fn in_zone_labels_flip_with_stand() {
        // Negative x is the catcher's left.
        assert_eq!(
            classify_zone(-0.5, 2.5, 1.5, 3.5, Some("R")),
            ZoneLabel::Outside
        );
        assert_eq!(
            classify_zone(-0.5, 2.5, 1.5, 3.5, Some("L")),
            ZoneLabel::Inside
        );
        assert_eq!(
            classify_zone(0.5, 2.5, 1.5, 3.5, Some("R")),
            ZoneLabel::Inside
        );
        assert_eq!(classify_zone(0.0, 2.5, 1.5, 3.5, Some("R")), ZoneLabel::Middle);
        // Unknown stand reads as right-handed.
        assert_eq!(classify_zone(-0.5, 2.5, 1.5, 3.5, None), ZoneLabel::Outside);
    }

    #[test]
    fn out_of_zone_vertical_beats_horizontal() {
        // Low and wide classifies as Low.
        assert_eq!(classify_zone(-1.2, 1.0, 1.5, 3.5, None), ZoneLabel::Low);
        assert_eq!(classify_zone(0.0, 3.8, 1.5, 3.5, None), ZoneLabel::High);
        assert_eq!(classify_zone(-1.2, 2.5, 1.5, 3.5, None), ZoneLabel::WideLeft);
        assert_eq!(classify_zone(1.2, 2.5, 1.5, 3.5, None), ZoneLabel::WideRight);
    }

    #[test]
    fn called_strike_matches_either_case() {
        assert!(is_called_strike("called_strike"));
        assert!(is_called_strike("Swinging Strike"));
        assert!(!is_called_strike("ball"));
        assert!(!is_called_strike("foul"));
    }

    fn located(x: f64, z: f64, description: &str) -> PitchRecord {
        PitchRecord {
            plate_x: Some(x),
            plate_z: Some(z),
            sz_bot: Some(1.5),
            sz_top: Some(3.5),
            stand: Some("R".to_string()),
            description: Some(description.to_string()),
            ..PitchRecord::default()
        }
    }

    #[test]
    fn report_drops_unlocated_pitches() {
        let pitches = vec![located(0.0, 2.5, "called_strike"), PitchRecord::default()];
        let report = umpire_report(&pitches);
        assert_eq!(report.total_pitches, 1);
        assert_eq!(report.zones.len(), 1);
    }

    #[test]
    fn middle_zone_accuracy_counts_called_strikes() {
        // Two in-zone pitches in Middle, one called.
        let pitches = vec![
            located(0.0, 2.5, "called_strike"),
            located(0.1, 2.5, "ball"),
        ];
        let report = umpire_report(&pitches);
        let middle = report
            .zones
            .iter()
            .find(|z| z.zone == ZoneLabel::Middle)
            .unwrap();
        assert_eq!(middle.total_pitches, 2);
        assert_eq!(middle.strikes_in_zone, 2);
        assert_eq!(middle.called_strikes, 1);
        // correct = 2 + (2 - 2 - 1 + 2) = 3 of 2 pitches -> 150%.
        assert!((middle.accuracy_pct - 150.0).abs() < 1e-9);
        assert!((middle.call_rate_pct - 50.0).abs() < 1e-9);
        assert!((report.strike_call_rate_pct - 50.0).abs() < 1e-9);
    }

    #[test]
    fn empty_input_yields_zeroed_report() {
        let report = umpire_report(&[]);
        assert!(report.zones.is_empty());
        assert_eq!(report.total_pitches, 0);
        assert_eq!(report.overall_accuracy_pct, 0.0);
    }
}
