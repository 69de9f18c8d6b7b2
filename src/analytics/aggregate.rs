use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::analytics::section::{compute_section_statistics, rating_values};
use crate::analytics::{OverallStats, SetAnalytics, SurveyAnalytics};
use crate::responses::{SectionQuestions, SurveyData};
use crate::stats::RatingSummary;

/// Per-section and survey-wide statistics for one response set.
///
/// Sections are reported by ascending `order_index`; ties keep their input
/// order. A repeated section id keeps only its first occurrence in that
/// order, for both the per-section rows and the pool. The overall figures pool raw values across sections rather than
/// averaging section means, so sections with more answers weigh more.
pub fn aggregate(sections: &[SectionQuestions]) -> SetAnalytics {
    let mut ordered: Vec<&SectionQuestions> = sections.iter().collect();
    ordered.sort_by_key(|s| s.section.order_index);
    let mut seen = BTreeSet::new();
    ordered.retain(|s| {
        let first = seen.insert(s.section.id.as_str());
        if !first {
            warn!("duplicate section {}, keeping first occurrence", s.section.id);
        }
        first
    });

    let per_section = ordered
        .iter()
        .map(|s| compute_section_statistics(&s.section, &s.questions))
        .collect::<Vec<_>>();

    let pooled: Vec<f64> = ordered
        .iter()
        .flat_map(|s| rating_values(&s.questions))
        .collect();
    let rating = RatingSummary::from_values(&pooled);

    let overall = OverallStats {
        rating_average: rating.average,
        total_rating_responses: rating.count,
        rating_variance: rating.variance,
        rating_std_dev: rating.std_dev,
        total_sections: per_section.len(),
        total_questions: per_section.iter().map(|s| s.total_questions).sum(),
        total_responses: per_section.iter().map(|s| s.total_responses).sum(),
    };
    debug!(
        "aggregated {} sections, {} rating values",
        overall.total_sections, overall.total_rating_responses
    );

    SetAnalytics {
        per_section,
        overall,
    }
}

pub fn analyze_survey(data: &SurveyData) -> SurveyAnalytics {
    SurveyAnalytics {
        survey: aggregate(&data.sections),
        audit: aggregate(&data.audit_sections),
    }
}
