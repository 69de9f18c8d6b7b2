use anyhow::Result;

use crate::analytics::{OverallStats, SectionStatistics, SetAnalytics, SurveyAnalytics};
use crate::output::{format_stat, NOT_AVAILABLE};
use crate::report::{ComparisonView, OverallStatistics};
use crate::source::SurveySummary;

pub fn surveys_to_csv(surveys: &[SurveySummary]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["survey_id", "title", "section_count", "audit_section_count"])?;
    for survey in surveys {
        writer.write_record([
            survey.id.clone(),
            survey
                .title
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            survey.section_count.to_string(),
            survey.audit_section_count.to_string(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn sections_to_csv(sections: &[SectionStatistics]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "section_id",
        "title",
        "order_index",
        "rating_average",
        "rating_count",
        "rating_variance",
        "rating_std_dev",
        "text_questions",
        "yes_no_questions",
        "radio_questions",
        "checkbox_questions",
        "select_questions",
        "total_questions",
        "total_responses",
    ])?;
    for s in sections {
        let other = &s.other_question_counts;
        writer.write_record([
            s.section_id.clone(),
            s.title.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            s.order_index.to_string(),
            format_stat(s.rating_average, 4),
            s.rating_count.to_string(),
            format_stat(s.rating_variance, 4),
            format_stat(s.rating_std_dev, 4),
            other.text.to_string(),
            other.yes_no.to_string(),
            other.radio.to_string(),
            other.checkbox.to_string(),
            other.select.to_string(),
            s.total_questions.to_string(),
            s.total_responses.to_string(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn overall_to_csv(overall: &OverallStatistics) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "set",
        "rating_average",
        "total_rating_responses",
        "rating_variance",
        "rating_std_dev",
        "total_sections",
        "total_questions",
        "total_responses",
    ])?;
    for (set, stats) in [("survey", &overall.survey), ("audit", &overall.audit)] {
        writer.write_record(overall_record(set, stats))?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

fn overall_record(set: &str, stats: &OverallStats) -> [String; 8] {
    [
        set.to_string(),
        format_stat(stats.rating_average, 4),
        stats.total_rating_responses.to_string(),
        format_stat(stats.rating_variance, 4),
        format_stat(stats.rating_std_dev, 4),
        stats.total_sections.to_string(),
        stats.total_questions.to_string(),
        stats.total_responses.to_string(),
    ]
}

/// Both response sets in one table: a `section` row per section followed by
/// the set's `overall` row.
pub fn report_to_csv(analytics: &SurveyAnalytics) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "set",
        "scope",
        "section_id",
        "title",
        "rating_average",
        "rating_count",
        "rating_variance",
        "rating_std_dev",
        "total_sections",
        "total_questions",
        "total_responses",
    ])?;
    for (set, stats) in [("survey", &analytics.survey), ("audit", &analytics.audit)] {
        write_set(&mut writer, set, stats)?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

fn write_set(writer: &mut csv::Writer<Vec<u8>>, set: &str, stats: &SetAnalytics) -> Result<()> {
    for s in &stats.per_section {
        writer.write_record([
            set.to_string(),
            "section".to_string(),
            s.section_id.clone(),
            s.title.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            format_stat(s.rating_average, 4),
            s.rating_count.to_string(),
            format_stat(s.rating_variance, 4),
            format_stat(s.rating_std_dev, 4),
            "1".to_string(),
            s.total_questions.to_string(),
            s.total_responses.to_string(),
        ])?;
    }
    let overall = &stats.overall;
    writer.write_record([
        set.to_string(),
        "overall".to_string(),
        NOT_AVAILABLE.to_string(),
        NOT_AVAILABLE.to_string(),
        format_stat(overall.rating_average, 4),
        overall.total_rating_responses.to_string(),
        format_stat(overall.rating_variance, 4),
        format_stat(overall.rating_std_dev, 4),
        overall.total_sections.to_string(),
        overall.total_questions.to_string(),
        overall.total_responses.to_string(),
    ])?;
    Ok(())
}

pub fn comparison_to_csv(view: &ComparisonView) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "section_id",
        "title",
        "survey_average",
        "survey_rating_count",
        "audit_average",
        "audit_rating_count",
        "difference",
        "classification",
    ])?;
    for row in &view.rows {
        writer.write_record([
            row.section_id.clone(),
            row.title.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            format_stat(row.survey.as_ref().and_then(|s| s.rating_average), 4),
            count_or_na(row.survey.as_ref()),
            format_stat(row.audit.as_ref().and_then(|a| a.rating_average), 4),
            count_or_na(row.audit.as_ref()),
            format_stat(row.difference, 4),
            row.classification.as_slug().to_string(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

/// A side with no section at all has no count, which differs from zero ratings.
fn count_or_na(stats: Option<&SectionStatistics>) -> String {
    stats
        .map(|s| s.rating_count.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
