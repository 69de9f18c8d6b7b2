use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::analytics::{OverallStats, SectionStatistics};
use crate::comparison::Classification;
use crate::output::{format_difference, format_stat, NOT_AVAILABLE};
use crate::report::{ComparisonView, OverallStatistics};
use crate::source::SurveySummary;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn render_surveys_table(surveys: &[SurveySummary]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Survey", "Title", "Sections", "Audit Sections"]);
    for survey in surveys {
        table.add_row(vec![
            survey.id.clone(),
            survey
                .title
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            survey.section_count.to_string(),
            survey.audit_section_count.to_string(),
        ]);
    }
    table.to_string()
}

pub fn render_sections_table(sections: &[SectionStatistics]) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Order",
        "Section",
        "Average",
        "Ratings",
        "Variance",
        "Std Dev",
        "Questions",
        "Responses",
        "Text/YesNo/Radio/Checkbox/Select",
    ]);
    for s in sections {
        let other = &s.other_question_counts;
        table.add_row(vec![
            s.order_index.to_string(),
            section_label(&s.section_id, s.title.as_deref()),
            format_stat(s.rating_average, 2),
            s.rating_count.to_string(),
            format_stat(s.rating_variance, 3),
            format_stat(s.rating_std_dev, 3),
            s.total_questions.to_string(),
            s.total_responses.to_string(),
            format!(
                "{}/{}/{}/{}/{}",
                other.text, other.yes_no, other.radio, other.checkbox, other.select
            ),
        ]);
    }
    table.to_string()
}

pub fn render_overall_table(overall: &OverallStatistics) -> String {
    let mut table = new_table();
    table.set_header(vec!["Metric", "Survey", "Audit"]);
    let rows: [(&str, fn(&OverallStats) -> String); 7] = [
        ("Rating average", |o| format_stat(o.rating_average, 2)),
        ("Rating responses", |o| o.total_rating_responses.to_string()),
        ("Rating variance", |o| format_stat(o.rating_variance, 3)),
        ("Rating std dev", |o| format_stat(o.rating_std_dev, 3)),
        ("Sections", |o| o.total_sections.to_string()),
        ("Questions", |o| o.total_questions.to_string()),
        ("Responses", |o| o.total_responses.to_string()),
    ];
    for (label, render) in rows {
        table.add_row(vec![
            label.to_string(),
            render(&overall.survey),
            render(&overall.audit),
        ]);
    }
    table.to_string()
}

pub fn render_comparison_table(view: &ComparisonView) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Section",
        "Survey Avg",
        "Audit Avg",
        "Difference",
        "Classification",
    ]);
    for row in &view.rows {
        table.add_row(Row::from(vec![
            Cell::new(section_label(&row.section_id, row.title.as_deref())),
            Cell::new(format_stat(
                row.survey.as_ref().and_then(|s| s.rating_average),
                2,
            )),
            Cell::new(format_stat(
                row.audit.as_ref().and_then(|a| a.rating_average),
                2,
            )),
            Cell::new(format_difference(row.difference, 2)),
            classification_cell(row.classification),
        ]));
    }
    table.add_row(Row::from(vec![
        Cell::new("Overall"),
        Cell::new(format_stat(view.overall.survey_average, 2)),
        Cell::new(format_stat(view.overall.audit_average, 2)),
        Cell::new(format_difference(view.overall.difference, 2)),
        classification_cell(view.overall.classification),
    ]));
    table.to_string()
}

fn classification_cell(classification: Classification) -> Cell {
    let cell = Cell::new(classification.to_string());
    match classification {
        Classification::AuditHigher => cell.fg(Color::Green),
        Classification::SurveyHigher => cell.fg(Color::Yellow),
        Classification::Similar => cell,
        Classification::NoData => cell.fg(Color::DarkGrey),
    }
}

fn section_label(section_id: &str, title: Option<&str>) -> String {
    match title {
        Some(title) => title.to_string(),
        None => format!("(untitled {section_id})"),
    }
}
