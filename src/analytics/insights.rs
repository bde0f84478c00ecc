// Game-context insights from live conditions and team batting form.

use serde::Serialize;

use crate::providers::live::Weather;
use crate::validator::LEAGUE_AVERAGE;

const HOT_TEMP_F: f64 = 80.0;
const COLD_TEMP_F: f64 = 55.0;
const AVG_GAP_THRESHOLD: f64 = 0.050;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InsightKind {
    Weather,
    TeamPerformance,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub confidence: Confidence,
    pub message: String,
}

/// Conditions-driven insights: extreme temperatures move run totals, wind
/// direction moves home run odds.
pub fn weather_insights(weather: &Weather) -> Vec<Insight> {
    let mut insights = Vec::new();

    if let Some(temp) = weather.temp_f {
        if temp > HOT_TEMP_F {
            insights.push(Insight {
                kind: InsightKind::Weather,
                confidence: Confidence::Medium,
                message: format!("Hot weather ({temp:.0}°F) favors hitters - consider OVER bets"),
            });
        } else if temp < COLD_TEMP_F {
            insights.push(Insight {
                kind: InsightKind::Weather,
                confidence: Confidence::Medium,
                message: format!("Cold weather ({temp:.0}°F) hurts offense - consider UNDER bets"),
            });
        }
    }

    if let Some(wind) = weather.wind.as_deref() {
        let wind = wind.to_lowercase();
        if wind.contains("out") {
            insights.push(Insight {
                kind: InsightKind::Weather,
                confidence: Confidence::High,
                message: "Tailwind detected - favorable for home runs".to_string(),
            });
        } else if wind.contains("in") {
            insights.push(Insight {
                kind: InsightKind::Weather,
                confidence: Confidence::High,
                message: "Headwind detected - unfavorable for home runs".to_string(),
            });
        }
    }

    insights
}

/// Clamp a team batting average to something usable: anything missing or out
/// of range reads as the league average.
pub fn sanitize_team_average(avg: Option<f64>) -> f64 {
    match avg {
        Some(v) if v != 0.0 && (0.0..=1.0).contains(&v) => v,
        _ => LEAGUE_AVERAGE,
    }
}

/// Flag a meaningful batting-average gap between the two teams. Averages are
/// sanitized first so a feed glitch cannot fabricate an edge.
pub fn team_performance_insight(home_avg: Option<f64>, away_avg: Option<f64>) -> Option<Insight> {
    let home = sanitize_team_average(home_avg);
    let away = sanitize_team_average(away_avg);

    if (home - away).abs() > AVG_GAP_THRESHOLD {
        let better = if home > away { "Home" } else { "Away" };
        Some(Insight {
            kind: InsightKind::TeamPerformance,
            confidence: Confidence::High,
            message: format!(
                "{better} team has significant batting average advantage ({home:.3} vs {away:.3})"
            ),
        })
    } else {
        None
    }
}
