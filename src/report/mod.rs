use serde::{Deserialize, Serialize};

use crate::analytics::aggregate::analyze_survey;
use crate::analytics::{OtherQuestionCounts, OverallStats, SectionStatistics};
use crate::comparison::{compare_overall, compare_with_tolerance, ComparisonRow, OverallComparison};
use crate::responses::SurveyData;

/// Audit-side section statistics; statistic fields carry an `audit_` prefix
/// so both sides can be merged into one dashboard record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditSectionStatistics {
    pub section_id: String,
    pub title: Option<String>,
    pub order_index: i64,
    pub audit_rating_average: Option<f64>,
    pub audit_rating_count: usize,
    pub audit_rating_variance: Option<f64>,
    pub audit_rating_std_dev: Option<f64>,
    pub audit_other_question_counts: OtherQuestionCounts,
    pub audit_total_questions: usize,
    pub audit_total_responses: usize,
}

impl From<&SectionStatistics> for AuditSectionStatistics {
    fn from(stats: &SectionStatistics) -> Self {
        Self {
            section_id: stats.section_id.clone(),
            title: stats.title.clone(),
            order_index: stats.order_index,
            audit_rating_average: stats.rating_average,
            audit_rating_count: stats.rating_count,
            audit_rating_variance: stats.rating_variance,
            audit_rating_std_dev: stats.rating_std_dev,
            audit_other_question_counts: stats.other_question_counts,
            audit_total_questions: stats.total_questions,
            audit_total_responses: stats.total_responses,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverallStatistics {
    pub survey: OverallStats,
    pub audit: OverallStats,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub survey_id: String,
    pub survey_title: Option<String>,
    pub section_analytics: Vec<SectionStatistics>,
    pub audit_section_analytics: Vec<AuditSectionStatistics>,
    pub overall_statistics: OverallStatistics,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonView {
    pub survey_id: String,
    pub survey_title: Option<String>,
    pub tolerance: f64,
    pub rows: Vec<ComparisonRow>,
    pub overall: OverallComparison,
}

pub fn build_report(data: &SurveyData) -> AnalyticsReport {
    let analytics = analyze_survey(data);
    AnalyticsReport {
        survey_id: data.survey_id.clone(),
        survey_title: data.title.clone(),
        audit_section_analytics: analytics
            .audit
            .per_section
            .iter()
            .map(AuditSectionStatistics::from)
            .collect(),
        section_analytics: analytics.survey.per_section,
        overall_statistics: OverallStatistics {
            survey: analytics.survey.overall,
            audit: analytics.audit.overall,
        },
    }
}

pub fn build_comparison(data: &SurveyData, tolerance: f64) -> ComparisonView {
    let analytics = analyze_survey(data);
    ComparisonView {
        survey_id: data.survey_id.clone(),
        survey_title: data.title.clone(),
        tolerance,
        rows: compare_with_tolerance(
            &analytics.survey.per_section,
            &analytics.audit.per_section,
            tolerance,
        ),
        overall: compare_overall(&analytics.survey.overall, &analytics.audit.overall, tolerance),
    }
}
