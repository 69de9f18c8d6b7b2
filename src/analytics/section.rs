use crate::analytics::{OtherQuestionCounts, SectionStatistics};
use crate::responses::extract::extract_numeric_values;
use crate::responses::{Question, Section};
use crate::stats::RatingSummary;

/// Values from every rating question, pooled into one distribution.
pub fn rating_values(questions: &[Question]) -> Vec<f64> {
    questions
        .iter()
        .filter(|q| q.question_type.is_rating())
        .flat_map(|q| extract_numeric_values(&q.responses))
        .collect()
}

pub fn compute_section_statistics(section: &Section, questions: &[Question]) -> SectionStatistics {
    let rating = RatingSummary::from_values(&rating_values(questions));

    let mut other_question_counts = OtherQuestionCounts::default();
    let mut total_responses = 0usize;
    for question in questions {
        other_question_counts.record(question.question_type);
        total_responses += question.responses.len();
    }

    SectionStatistics {
        section_id: section.id.clone(),
        title: section.title.clone(),
        order_index: section.order_index,
        rating_average: rating.average,
        rating_count: rating.count,
        rating_variance: rating.variance,
        rating_std_dev: rating.std_dev,
        other_question_counts,
        total_questions: questions.len(),
        total_responses,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map};

    use super::compute_section_statistics;
    use crate::analytics::OtherQuestionCounts;
    use crate::responses::{Question, QuestionType, RawResponse, Section};

    fn section(id: &str, title: &str) -> Section {
        Section {
            id: id.to_string(),
            title: Some(title.to_string()),
            order_index: 0,
        }
    }

    fn question(id: &str, question_type: QuestionType, responses: Vec<RawResponse>) -> Question {
        Question {
            id: id.to_string(),
            question_type,
            question_text: None,
            order_index: 0,
            responses,
        }
    }

    fn numbers(values: &[f64]) -> Vec<RawResponse> {
        values.iter().map(|v| RawResponse::Number(Some(*v))).collect()
    }

    #[test]
    fn single_rating_question_statistics() {
        let questions = vec![question(
            "q1",
            QuestionType::Rating,
            numbers(&[4.0, 5.0, 3.0, 5.0]),
        )];
        let stats = compute_section_statistics(&section("culture", "Culture"), &questions);
        assert_eq!(stats.rating_average, Some(4.25));
        assert_eq!(stats.rating_count, 4);
        assert_eq!(stats.rating_variance, Some(0.6875));
        assert!((stats.rating_std_dev.expect("missing std dev") - 0.829).abs() < 1e-3);
        assert_eq!(stats.total_questions, 1);
        assert_eq!(stats.total_responses, 4);
    }

    #[test]
    fn mixed_encodings_only_count_coercible_records() {
        let mut main = Map::new();
        main.insert("main".to_string(), json!(5));
        let questions = vec![question(
            "q1",
            QuestionType::Rating,
            vec![
                RawResponse::Object(Some(main)),
                RawResponse::Text(Some("n/a".to_string())),
            ],
        )];
        let stats = compute_section_statistics(&section("culture", "Culture"), &questions);
        assert_eq!(stats.rating_count, 1);
        assert_eq!(stats.rating_average, Some(5.0));
        assert_eq!(stats.total_responses, 2);
    }

    #[test]
    fn section_without_rating_questions_counts_other_types() {
        let questions = vec![
            question("q1", QuestionType::Text, Vec::new()),
            question(
                "q2",
                QuestionType::Text,
                vec![RawResponse::Text(Some("fine".to_string()))],
            ),
            question("q3", QuestionType::Checkbox, Vec::new()),
        ];
        let stats = compute_section_statistics(&section("open", "Open feedback"), &questions);
        assert_eq!(stats.rating_average, None);
        assert_eq!(stats.rating_variance, None);
        assert_eq!(stats.rating_std_dev, None);
        assert_eq!(stats.rating_count, 0);
        assert_eq!(
            stats.other_question_counts,
            OtherQuestionCounts {
                text: 2,
                yes_no: 0,
                radio: 0,
                checkbox: 1,
                select: 0,
            }
        );
        assert_eq!(stats.total_questions, 3);
        assert_eq!(stats.total_responses, 1);
    }

    #[test]
    fn rating_questions_in_one_section_are_pooled() {
        let questions = vec![
            question("q1", QuestionType::Rating, numbers(&[1.0])),
            question("q2", QuestionType::Rating, numbers(&[5.0, 5.0, 5.0])),
            question("q3", QuestionType::Radio, numbers(&[1.0])),
        ];
        let stats = compute_section_statistics(&section("mix", "Mix"), &questions);
        assert_eq!(stats.rating_count, 4);
        assert_eq!(stats.rating_average, Some(4.0));
        assert_eq!(stats.other_question_counts.radio, 1);
        assert_eq!(stats.total_responses, 5);
    }

    #[test]
    fn empty_section_is_all_none() {
        let stats = compute_section_statistics(&section("empty", "Empty"), &[]);
        assert_eq!(stats.rating_average, None);
        assert_eq!(stats.rating_count, 0);
        assert_eq!(stats.total_questions, 0);
        assert_eq!(stats.total_responses, 0);
        assert_eq!(stats.other_question_counts.total(), 0);
    }
}
