pub mod compare;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analytics::SectionStatistics;

pub use compare::{
    classify, compare, compare_overall, compare_with_tolerance, DEFAULT_TOLERANCE,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    AuditHigher,
    SurveyHigher,
    Similar,
    NoData,
}

impl Classification {
    pub const ALL: [Classification; 4] = [
        Classification::AuditHigher,
        Classification::SurveyHigher,
        Classification::Similar,
        Classification::NoData,
    ];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::AuditHigher => "audit_higher",
            Self::SurveyHigher => "survey_higher",
            Self::Similar => "similar",
            Self::NoData => "no_data",
        }
    }
}

impl Display for Classification {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::AuditHigher => "Audit higher",
            Self::SurveyHigher => "Survey higher",
            Self::Similar => "Similar",
            Self::NoData => "No data",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error)]
#[error("unknown classification: {0}")]
pub struct ClassificationParseError(pub String);

impl FromStr for Classification {
    type Err = ClassificationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "audit_higher" | "audit" => Ok(Self::AuditHigher),
            "survey_higher" | "survey" => Ok(Self::SurveyHigher),
            "similar" => Ok(Self::Similar),
            "no_data" | "none" => Ok(Self::NoData),
            _ => Err(ClassificationParseError(s.to_string())),
        }
    }
}

/// One section of the merged survey/audit view.
///
/// A side that has no data for the section is `None`; it is never filled
/// with zeros. `difference` is present only when both sides have an average.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonRow {
    pub section_id: String,
    pub title: Option<String>,
    pub order_index: Option<i64>,
    pub survey: Option<SectionStatistics>,
    pub audit: Option<SectionStatistics>,
    pub difference: Option<f64>,
    pub classification: Classification,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverallComparison {
    pub survey_average: Option<f64>,
    pub audit_average: Option<f64>,
    pub difference: Option<f64>,
    pub classification: Classification,
}
