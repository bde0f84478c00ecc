// Data-quality grading for validated player records.

use std::fmt;

use serde::Serialize;

/// Coarse quality bucket derived from how many identity and stat fields held
/// real (non-default) data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataQuality {
    High,
    Medium,
    Low,
    InsufficientData,
}

impl DataQuality {
    /// Bucket a ratio of satisfied checks (0.0..=1.0).
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= 0.8 {
            DataQuality::High
        } else if ratio >= 0.6 {
            DataQuality::Medium
        } else if ratio >= 0.4 {
            DataQuality::Low
        } else {
            DataQuality::InsufficientData
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataQuality::High => "HIGH",
            DataQuality::Medium => "MEDIUM",
            DataQuality::Low => "LOW",
            DataQuality::InsufficientData => "INSUFFICIENT_DATA",
        }
    }
}

impl fmt::Display for DataQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_buckets() {
        assert_eq!(DataQuality::from_ratio(1.0), DataQuality::High);
        assert_eq!(DataQuality::from_ratio(0.8), DataQuality::High);
        assert_eq!(DataQuality::from_ratio(0.6), DataQuality::Medium);
        assert_eq!(DataQuality::from_ratio(0.4), DataQuality::Low);
        assert_eq!(DataQuality::from_ratio(0.2), DataQuality::InsufficientData);
        assert_eq!(DataQuality::from_ratio(0.0), DataQuality::InsufficientData);
    }

    #[test]
    fn display_matches_report_labels() {
        assert_eq!(DataQuality::High.to_string(), "HIGH");
        assert_eq!(
            DataQuality::InsufficientData.to_string(),
            "INSUFFICIENT_DATA"
        );
    }
}
