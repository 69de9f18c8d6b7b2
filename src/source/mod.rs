pub mod file;
pub mod rest;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{Config, SourceKind};
use crate::responses::SurveyData;
use crate::source::file::FileSource;
use crate::source::rest::RestSource;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("survey not found: {0}")]
    NotFound(String),
    #[error("survey source unavailable: {0}")]
    Unavailable(String),
    #[error("failed decoding survey data: {0}")]
    Decode(String),
    #[error("failed reading survey data: {0}")]
    Io(#[from] std::io::Error),
}

pub type SourceResult<T> = std::result::Result<T, SourceError>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SurveySummary {
    pub id: String,
    pub title: Option<String>,
    pub section_count: usize,
    pub audit_section_count: usize,
}

impl From<&SurveyData> for SurveySummary {
    fn from(data: &SurveyData) -> Self {
        Self {
            id: data.survey_id.clone(),
            title: data.title.clone(),
            section_count: data.sections.len(),
            audit_section_count: data.audit_sections.len(),
        }
    }
}

/// Where survey definitions and their stored responses come from.
///
/// A failed fetch aborts the request; there is no partial result.
#[async_trait]
pub trait SurveySource: Send + Sync {
    fn name(&self) -> &str;
    async fn list_surveys(&self) -> SourceResult<Vec<SurveySummary>>;
    async fn fetch_survey(&self, survey_id: &str) -> SourceResult<SurveyData>;
}

pub fn build_source(config: &Config) -> Result<Arc<dyn SurveySource>> {
    let source: Arc<dyn SurveySource> = match config.source.kind {
        SourceKind::File => Arc::new(FileSource::new(config.resolved_data_path())),
        SourceKind::Rest => Arc::new(
            RestSource::new(
                &config.source.base_url,
                &config.source.api_key,
                config.source.timeout_secs,
            )
            .with_context(|| {
                format!("failed creating REST source for {}", config.source.base_url)
            })?,
        ),
    };
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::{build_source, SurveySummary};
    use crate::config::{Config, ConfigOverrides};
    use crate::responses::SurveyData;

    #[test]
    fn builds_source_matching_configured_kind() {
        let mut config = Config::default();
        config.apply_overrides(ConfigOverrides {
            data_path: Some("/tmp/surveys.json".to_string()),
            ..ConfigOverrides::default()
        });
        let source = build_source(&config).expect("failed to build file source");
        assert_eq!(source.name(), "file");

        config.apply_overrides(ConfigOverrides {
            base_url: Some("http://127.0.0.1:54321".to_string()),
            ..ConfigOverrides::default()
        });
        let source = build_source(&config).expect("failed to build rest source");
        assert_eq!(source.name(), "rest");
    }

    #[test]
    fn summary_counts_both_section_sets() {
        let summary = SurveySummary::from(&SurveyData::empty("s1"));
        assert_eq!(summary.id, "s1");
        assert_eq!(summary.section_count, 0);
        assert_eq!(summary.audit_section_count, 0);
    }
}
