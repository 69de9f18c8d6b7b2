pub mod extract;
pub mod record;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::responses::record::{string_or_number, StoredResponse};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Text,
    YesNo,
    Radio,
    Checkbox,
    Rating,
    Select,
}

impl QuestionType {
    pub fn is_rating(self) -> bool {
        matches!(self, Self::Rating)
    }
}

/// One stored answer, decoded by its `response_type` tag.
///
/// Each variant carries only the field that is valid for its storage
/// encoding. Tags the platform does not know about are kept as
/// `Unrecognized` so that a single odd row never fails a whole fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredResponse", into = "StoredResponse")]
pub enum RawResponse {
    Number(Option<f64>),
    Text(Option<String>),
    Boolean(Option<bool>),
    Array(Vec<Value>),
    Object(Option<Map<String, Value>>),
    Unrecognized(String),
}

impl RawResponse {
    pub fn tag(&self) -> &str {
        match self {
            Self::Number(_) => "number",
            Self::Text(_) => "text",
            Self::Boolean(_) => "boolean",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Unrecognized(tag) => tag.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub question_type: QuestionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_text: Option<String>,
    #[serde(default)]
    pub order_index: i64,
    #[serde(default, alias = "audit_responses")]
    pub responses: Vec<RawResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub order_index: i64,
}

/// A section together with the questions one response set holds for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionQuestions {
    #[serde(flatten)]
    pub section: Section,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Everything the engine needs for one survey: the primary question set and
/// the audit overlay, both grouped by section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyData {
    #[serde(alias = "id", deserialize_with = "string_or_number")]
    pub survey_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub sections: Vec<SectionQuestions>,
    #[serde(default)]
    pub audit_sections: Vec<SectionQuestions>,
}

impl SurveyData {
    pub fn empty(survey_id: impl Into<String>) -> Self {
        Self {
            survey_id: survey_id.into(),
            title: None,
            sections: Vec::new(),
            audit_sections: Vec::new(),
        }
    }
}
