use std::collections::BTreeMap;

use tracing::warn;

use crate::analytics::{OverallStats, SectionStatistics};
use crate::comparison::{Classification, ComparisonRow, OverallComparison};

/// Band within which audit and survey averages count as similar.
pub const DEFAULT_TOLERANCE: f64 = 0.2;

pub fn classify(difference: Option<f64>, tolerance: f64) -> Classification {
    match difference {
        None => Classification::NoData,
        Some(d) if d > tolerance => Classification::AuditHigher,
        Some(d) if d < -tolerance => Classification::SurveyHigher,
        Some(_) => Classification::Similar,
    }
}

pub fn compare(survey: &[SectionStatistics], audit: &[SectionStatistics]) -> Vec<ComparisonRow> {
    compare_with_tolerance(survey, audit, DEFAULT_TOLERANCE)
}

/// Outer join of the two per-section lists by section id.
///
/// Rows follow the survey order; sections only the audit set knows about
/// are appended in audit order. Every id yields exactly one row.
pub fn compare_with_tolerance(
    survey: &[SectionStatistics],
    audit: &[SectionStatistics],
    tolerance: f64,
) -> Vec<ComparisonRow> {
    let (survey_order, survey_by_id) = index_by_id(survey, "survey");
    let (audit_order, audit_by_id) = index_by_id(audit, "audit");

    let mut ids = survey_order;
    ids.extend(
        audit_order
            .into_iter()
            .filter(|id| !survey_by_id.contains_key(id)),
    );

    ids.into_iter()
        .map(|id| {
            build_row(
                id,
                survey_by_id.get(id).copied(),
                audit_by_id.get(id).copied(),
                tolerance,
            )
        })
        .collect()
}

pub fn compare_overall(
    survey: &OverallStats,
    audit: &OverallStats,
    tolerance: f64,
) -> OverallComparison {
    let difference = signed_difference(survey.rating_average, audit.rating_average);
    OverallComparison {
        survey_average: survey.rating_average,
        audit_average: audit.rating_average,
        difference,
        classification: classify(difference, tolerance),
    }
}

fn build_row(
    section_id: &str,
    survey: Option<&SectionStatistics>,
    audit: Option<&SectionStatistics>,
    tolerance: f64,
) -> ComparisonRow {
    let difference = signed_difference(
        survey.and_then(|s| s.rating_average),
        audit.and_then(|a| a.rating_average),
    );
    let title = survey
        .and_then(|s| s.title.clone())
        .or_else(|| audit.and_then(|a| a.title.clone()));
    if title.is_none() {
        warn!("section {section_id} has no title on either side");
    }

    ComparisonRow {
        section_id: section_id.to_string(),
        title,
        order_index: survey.or(audit).map(|s| s.order_index),
        survey: survey.cloned(),
        audit: audit.cloned(),
        difference,
        classification: classify(difference, tolerance),
    }
}

fn signed_difference(survey: Option<f64>, audit: Option<f64>) -> Option<f64> {
    match (survey, audit) {
        (Some(s), Some(a)) => Some(a - s),
        _ => None,
    }
}

fn index_by_id<'a>(
    stats: &'a [SectionStatistics],
    side: &str,
) -> (Vec<&'a str>, BTreeMap<&'a str, &'a SectionStatistics>) {
    let mut order = Vec::with_capacity(stats.len());
    let mut by_id = BTreeMap::new();
    for entry in stats {
        let id = entry.section_id.as_str();
        if by_id.contains_key(id) {
            warn!("duplicate {side} section {id}, keeping first occurrence");
            continue;
        }
        by_id.insert(id, entry);
        order.push(id);
    }
    (order, by_id)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use proptest::prelude::*;

    use super::{classify, compare, compare_overall, DEFAULT_TOLERANCE};
    use crate::analytics::{OtherQuestionCounts, OverallStats, SectionStatistics};
    use crate::comparison::Classification;

    fn stats(id: &str, title: Option<&str>, average: Option<f64>) -> SectionStatistics {
        SectionStatistics {
            section_id: id.to_string(),
            title: title.map(str::to_string),
            order_index: 0,
            rating_average: average,
            rating_count: usize::from(average.is_some()),
            rating_variance: average.map(|_| 0.0),
            rating_std_dev: average.map(|_| 0.0),
            other_question_counts: OtherQuestionCounts::default(),
            total_questions: 1,
            total_responses: 1,
        }
    }

    #[test]
    fn classifies_against_tolerance_band() {
        assert_eq!(classify(Some(0.75), DEFAULT_TOLERANCE), Classification::AuditHigher);
        assert_eq!(classify(Some(-0.5), DEFAULT_TOLERANCE), Classification::SurveyHigher);
        assert_eq!(classify(Some(0.2), DEFAULT_TOLERANCE), Classification::Similar);
        assert_eq!(classify(Some(-0.2), DEFAULT_TOLERANCE), Classification::Similar);
        assert_eq!(classify(Some(0.0), DEFAULT_TOLERANCE), Classification::Similar);
        assert_eq!(classify(None, DEFAULT_TOLERANCE), Classification::NoData);
    }

    #[test]
    fn audit_higher_when_audit_average_exceeds_band() {
        let rows = compare(
            &[stats("culture", Some("Culture"), Some(4.25))],
            &[stats("culture", Some("Culture"), Some(5.0))],
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].difference, Some(0.75));
        assert_eq!(rows[0].classification, Classification::AuditHigher);
    }

    #[test]
    fn survey_only_section_keeps_empty_audit_side() {
        let rows = compare(
            &[
                stats("culture", Some("Culture"), Some(4.0)),
                stats("benefits", Some("Benefits"), Some(3.5)),
            ],
            &[stats("culture", Some("Culture"), Some(4.1))],
        );
        assert_eq!(rows.len(), 2);
        let benefits = &rows[1];
        assert_eq!(benefits.section_id, "benefits");
        assert!(benefits.audit.is_none());
        assert!(benefits.survey.is_some());
        assert_eq!(benefits.difference, None);
        assert_eq!(benefits.classification, Classification::NoData);
        assert_eq!(rows[0].classification, Classification::Similar);
    }

    #[test]
    fn audit_only_sections_are_appended_in_audit_order() {
        let rows = compare(
            &[stats("a", Some("A"), Some(3.0))],
            &[
                stats("z", Some("Z"), Some(4.0)),
                stats("a", Some("A"), Some(3.0)),
                stats("m", None, None),
            ],
        );
        let ids: Vec<&str> = rows.iter().map(|r| r.section_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "z", "m"]);
        assert!(rows[1].survey.is_none());
        assert_eq!(rows[2].title, None);
        assert_eq!(rows[2].classification, Classification::NoData);
    }

    #[test]
    fn missing_survey_title_falls_back_to_audit_title() {
        let rows = compare(
            &[stats("a", None, Some(3.0))],
            &[stats("a", Some("Leadership"), Some(2.0))],
        );
        assert_eq!(rows[0].title.as_deref(), Some("Leadership"));
        assert_eq!(rows[0].classification, Classification::SurveyHigher);
    }

    #[test]
    fn side_with_no_ratings_yields_no_difference() {
        let rows = compare(
            &[stats("a", Some("A"), None)],
            &[stats("a", Some("A"), Some(4.0))],
        );
        assert_eq!(rows[0].difference, None);
        assert_eq!(rows[0].classification, Classification::NoData);
        assert!(rows[0].survey.is_some());
    }

    #[test]
    fn duplicate_ids_produce_a_single_row() {
        let rows = compare(
            &[stats("a", Some("A"), Some(3.0)), stats("a", Some("A2"), Some(1.0))],
            &[stats("a", Some("A"), Some(3.0))],
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title.as_deref(), Some("A"));
        assert_eq!(rows[0].difference, Some(0.0));
    }

    #[test]
    fn overall_comparison_uses_same_rule() {
        let survey = OverallStats {
            rating_average: Some(4.25),
            total_rating_responses: 4,
            rating_variance: Some(0.6875),
            rating_std_dev: Some(0.829),
            total_sections: 1,
            total_questions: 1,
            total_responses: 4,
        };
        let mut audit = survey.clone();
        audit.rating_average = Some(5.0);
        let overall = compare_overall(&survey, &audit, DEFAULT_TOLERANCE);
        assert_eq!(overall.difference, Some(0.75));
        assert_eq!(overall.classification, Classification::AuditHigher);

        audit.rating_average = None;
        let overall = compare_overall(&survey, &audit, DEFAULT_TOLERANCE);
        assert_eq!(overall.difference, None);
        assert_eq!(overall.classification, Classification::NoData);
    }

    fn mirrored(classification: Classification) -> Classification {
        match classification {
            Classification::AuditHigher => Classification::SurveyHigher,
            Classification::SurveyHigher => Classification::AuditHigher,
            other => other,
        }
    }

    fn side_strategy() -> impl Strategy<Value = Vec<SectionStatistics>> {
        prop::collection::btree_map(0u8..12, prop::option::of(1.0f64..=5.0), 0..10).prop_map(
            |entries| {
                entries
                    .into_iter()
                    .map(|(id, average)| stats(&format!("s{id}"), Some("S"), average))
                    .collect()
            },
        )
    }

    proptest! {
        /// Property: swapping the sets negates differences and mirrors the
        /// higher/lower classification.
        #[test]
        fn swapping_sets_mirrors_the_comparison(
            left in side_strategy(),
            right in side_strategy()
        ) {
            let forward: BTreeMap<String, _> = compare(&left, &right)
                .into_iter()
                .map(|row| (row.section_id.clone(), row))
                .collect();
            let backward: BTreeMap<String, _> = compare(&right, &left)
                .into_iter()
                .map(|row| (row.section_id.clone(), row))
                .collect();

            prop_assert_eq!(forward.len(), backward.len());
            for (id, row) in &forward {
                let other = backward.get(id).expect("row missing after swap");
                prop_assert_eq!(row.difference.map(|d| -d), other.difference);
                prop_assert_eq!(mirrored(row.classification), other.classification);
            }
        }

        /// Property: every section id from either side appears exactly once.
        #[test]
        fn every_section_appears_once(
            left in side_strategy(),
            right in side_strategy()
        ) {
            let rows = compare(&left, &right);
            let mut expected: Vec<&str> = left
                .iter()
                .chain(right.iter())
                .map(|s| s.section_id.as_str())
                .collect();
            expected.sort_unstable();
            expected.dedup();
            let mut actual: Vec<&str> = rows.iter().map(|r| r.section_id.as_str()).collect();
            actual.sort_unstable();
            prop_assert_eq!(actual, expected);
            for row in &rows {
                prop_assert_eq!(
                    row.difference.is_some(),
                    row.survey.as_ref().and_then(|s| s.rating_average).is_some()
                        && row.audit.as_ref().and_then(|a| a.rating_average).is_some()
                );
            }
        }
    }
}
