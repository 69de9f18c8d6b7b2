use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::responses::record::string_or_number;
use crate::responses::{Question, Section, SectionQuestions, SurveyData};
use crate::source::{SourceError, SourceResult, SurveySource, SurveySummary};

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 6;
const DEFAULT_PAGE_SIZE: usize = 1000;
const RESPONSE_COLUMNS: &str =
    "response_type,number_response,text_response,boolean_response,array_response,object_response";

/// Surveys served by a PostgREST-style relational backend.
pub struct RestSource {
    client: Client,
    base_url: String,
    api_key: String,
    page_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SurveyRow {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// A question row with its embedded responses and owning section.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionRow {
    #[serde(deserialize_with = "string_or_number")]
    pub section_id: String,
    #[serde(flatten)]
    pub question: Question,
}

#[derive(Debug, Clone, Deserialize)]
struct SectionLink {
    #[serde(deserialize_with = "string_or_number")]
    survey_id: String,
    #[serde(deserialize_with = "string_or_number")]
    section_id: String,
}

impl RestSource {
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> SourceResult<Self> {
        if timeout_secs == 0 {
            return Err(SourceError::Unavailable(
                "request timeout must be at least 1 second".to_string(),
            ));
        }
        let client = Client::builder()
            .user_agent(concat!("survey-analytics/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(
                DEFAULT_CONNECT_TIMEOUT_SECS.min(timeout_secs),
            ))
            .build()
            .map_err(|err| SourceError::Unavailable(format!("failed building HTTP client: {err}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, String)],
    ) -> SourceResult<Vec<T>> {
        let url = self.endpoint(table);
        let mut request = self.client.get(&url).query(params);
        if !self.api_key.is_empty() {
            request = request
                .header("apikey", self.api_key.as_str())
                .bearer_auth(&self.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|err| SourceError::Unavailable(format!("failed GET request: {url}: {err}")))?;
        let status = response.status();
        let body = response.text().await.map_err(|err| {
            SourceError::Unavailable(format!("failed reading response body: {url}: {err}"))
        })?;
        if !status.is_success() {
            let preview: String = body.chars().take(180).collect();
            return Err(SourceError::Unavailable(format!(
                "GET {url} returned {status}: {preview}"
            )));
        }
        let rows: Vec<T> = serde_json::from_str(&body)
            .map_err(|err| SourceError::Decode(format!("invalid JSON response: {url}: {err}")))?;
        debug!("fetched {} rows from {table}", rows.len());
        Ok(rows)
    }

    /// Reads a whole table through `limit`/`offset` pages.
    ///
    /// Stops only on an empty page: a server-side row cap may return short
    /// pages before the table is exhausted. `params` must carry a total order.
    async fn fetch_all_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, String)],
    ) -> SourceResult<Vec<T>> {
        let mut rows = Vec::new();
        loop {
            let mut paged = params.to_vec();
            paged.push(("limit", self.page_size.to_string()));
            paged.push(("offset", rows.len().to_string()));
            let page: Vec<T> = self.fetch_rows(table, &paged).await?;
            if page.is_empty() {
                break;
            }
            rows.extend(page);
        }
        Ok(rows)
    }

    async fn fetch_questions(&self, table: &str, survey_id: &str) -> SourceResult<Vec<QuestionRow>> {
        let embedded = if table == "audit_questions" {
            "audit_responses"
        } else {
            "responses"
        };
        self.fetch_all_rows(
            table,
            &[
                (
                    "select",
                    format!(
                        "id,section_id,question_type,question_text,order_index,{embedded}({RESPONSE_COLUMNS})"
                    ),
                ),
                ("survey_id", format!("eq.{survey_id}")),
                ("order", "order_index.asc,id.asc".to_string()),
            ],
        )
        .await
    }
}

#[async_trait]
impl SurveySource for RestSource {
    fn name(&self) -> &str {
        "rest"
    }

    async fn list_surveys(&self) -> SourceResult<Vec<SurveySummary>> {
        let surveys: Vec<SurveyRow> = self
            .fetch_all_rows(
                "surveys",
                &[
                    ("select", "id,title".to_string()),
                    ("order", "id.asc".to_string()),
                ],
            )
            .await?;
        let sections: Vec<SectionLink> = self
            .fetch_all_rows(
                "sections",
                &[
                    ("select", "survey_id,section_id:id".to_string()),
                    ("order", "id.asc".to_string()),
                ],
            )
            .await?;
        let audit_links: Vec<SectionLink> = self
            .fetch_all_rows(
                "audit_questions",
                &[
                    ("select", "survey_id,section_id".to_string()),
                    ("order", "id.asc".to_string()),
                ],
            )
            .await?;

        let section_counts = count_distinct_sections(&sections);
        let audit_counts = count_distinct_sections(&audit_links);
        Ok(surveys
            .into_iter()
            .map(|row| SurveySummary {
                section_count: section_counts.get(&row.id).copied().unwrap_or(0),
                audit_section_count: audit_counts.get(&row.id).copied().unwrap_or(0),
                id: row.id,
                title: row.title,
            })
            .collect())
    }

    async fn fetch_survey(&self, survey_id: &str) -> SourceResult<SurveyData> {
        let survey = self
            .fetch_rows::<SurveyRow>(
                "surveys",
                &[
                    ("select", "id,title".to_string()),
                    ("id", format!("eq.{survey_id}")),
                ],
            )
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::NotFound(survey_id.to_string()))?;

        let sections: Vec<Section> = self
            .fetch_all_rows(
                "sections",
                &[
                    ("select", "id,title,order_index".to_string()),
                    ("survey_id", format!("eq.{survey_id}")),
                    ("order", "order_index.asc,id.asc".to_string()),
                ],
            )
            .await?;
        let questions = self.fetch_questions("questions", survey_id).await?;
        let audit_questions = self.fetch_questions("audit_questions", survey_id).await?;

        info!(
            "fetched survey {survey_id}: {} sections, {} questions, {} audit questions",
            sections.len(),
            questions.len(),
            audit_questions.len()
        );
        Ok(assemble_survey(survey, &sections, questions, audit_questions))
    }
}

/// Builds the engine input from flat backend rows.
///
/// The survey set carries every section, even ones without questions. The
/// audit set carries only sections that audit questions point at.
pub fn assemble_survey(
    survey: SurveyRow,
    sections: &[Section],
    questions: Vec<QuestionRow>,
    audit_questions: Vec<QuestionRow>,
) -> SurveyData {
    SurveyData {
        survey_id: survey.id,
        title: survey.title,
        sections: group_by_section(sections, questions, true),
        audit_sections: group_by_section(sections, audit_questions, false),
    }
}

/// Groups question rows under their sections, in section order.
///
/// Rows pointing at a section the survey does not define get an untitled
/// placeholder section sorted after every known one.
pub fn group_by_section(
    sections: &[Section],
    questions: Vec<QuestionRow>,
    keep_empty: bool,
) -> Vec<SectionQuestions> {
    let known: BTreeSet<&str> = sections.iter().map(|s| s.id.as_str()).collect();
    let mut grouped: BTreeMap<String, Vec<Question>> = BTreeMap::new();
    let mut unknown = Vec::new();
    for row in questions {
        if !known.contains(row.section_id.as_str()) && !grouped.contains_key(&row.section_id) {
            unknown.push(row.section_id.clone());
        }
        grouped.entry(row.section_id).or_default().push(row.question);
    }

    let mut out = Vec::new();
    for section in sections {
        match grouped.remove(&section.id) {
            Some(questions) => out.push(section_with(section.clone(), questions)),
            None if keep_empty => out.push(section_with(section.clone(), Vec::new())),
            None => {}
        }
    }
    for section_id in unknown {
        let Some(questions) = grouped.remove(&section_id) else {
            continue;
        };
        warn!("questions reference unknown section {section_id}; using an untitled placeholder");
        let placeholder = Section {
            id: section_id,
            title: None,
            order_index: i64::MAX,
        };
        out.push(section_with(placeholder, questions));
    }
    out
}

fn section_with(section: Section, mut questions: Vec<Question>) -> SectionQuestions {
    questions.sort_by_key(|q| q.order_index);
    SectionQuestions { section, questions }
}

fn count_distinct_sections(links: &[SectionLink]) -> BTreeMap<String, usize> {
    let mut distinct: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for link in links {
        distinct
            .entry(link.survey_id.as_str())
            .or_default()
            .insert(link.section_id.as_str());
    }
    distinct
        .into_iter()
        .map(|(survey_id, ids)| (survey_id.to_string(), ids.len()))
        .collect()
}
