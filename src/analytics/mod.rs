pub mod aggregate;
pub mod section;

use serde::{Deserialize, Serialize};

use crate::responses::QuestionType;

/// Question definitions per non-rating type in one section.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OtherQuestionCounts {
    pub text: usize,
    pub yes_no: usize,
    pub radio: usize,
    pub checkbox: usize,
    pub select: usize,
}

impl OtherQuestionCounts {
    pub fn record(&mut self, question_type: QuestionType) {
        match question_type {
            QuestionType::Text => self.text += 1,
            QuestionType::YesNo => self.yes_no += 1,
            QuestionType::Radio => self.radio += 1,
            QuestionType::Checkbox => self.checkbox += 1,
            QuestionType::Select => self.select += 1,
            QuestionType::Rating => {}
        }
    }

    pub fn total(&self) -> usize {
        self.text + self.yes_no + self.radio + self.checkbox + self.select
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionStatistics {
    pub section_id: String,
    pub title: Option<String>,
    pub order_index: i64,
    pub rating_average: Option<f64>,
    pub rating_count: usize,
    pub rating_variance: Option<f64>,
    pub rating_std_dev: Option<f64>,
    pub other_question_counts: OtherQuestionCounts,
    pub total_questions: usize,
    pub total_responses: usize,
}

/// Survey-wide statistics for one response set, computed over the pooled
/// raw values of every section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverallStats {
    pub rating_average: Option<f64>,
    pub total_rating_responses: usize,
    pub rating_variance: Option<f64>,
    pub rating_std_dev: Option<f64>,
    pub total_sections: usize,
    pub total_questions: usize,
    pub total_responses: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetAnalytics {
    pub per_section: Vec<SectionStatistics>,
    pub overall: OverallStats,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SurveyAnalytics {
    pub survey: SetAnalytics,
    pub audit: SetAnalytics,
}
