use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::responses::SurveyData;
use crate::source::{SourceError, SourceResult, SurveySource, SurveySummary};

/// Surveys read from a JSON export on disk.
pub struct FileSource {
    path: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Export {
    Many { surveys: Vec<SurveyData> },
    One(SurveyData),
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> SourceResult<Vec<SurveyData>> {
        let data = tokio::fs::read_to_string(&self.path).await?;
        let export: Export = serde_json::from_str(&data)
            .map_err(|err| SourceError::Decode(format!("{}: {err}", self.path.display())))?;
        let surveys = match export {
            Export::Many { surveys } => surveys,
            Export::One(survey) => vec![survey],
        };
        debug!("loaded {} surveys from {}", surveys.len(), self.path.display());
        Ok(surveys)
    }
}

#[async_trait]
impl SurveySource for FileSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn list_surveys(&self) -> SourceResult<Vec<SurveySummary>> {
        Ok(self.load().await?.iter().map(SurveySummary::from).collect())
    }

    async fn fetch_survey(&self, survey_id: &str) -> SourceResult<SurveyData> {
        let survey = self
            .load()
            .await?
            .into_iter()
            .find(|s| s.survey_id == survey_id)
            .ok_or_else(|| SourceError::NotFound(survey_id.to_string()))?;
        info!("read survey {survey_id} from {}", self.path.display());
        Ok(survey)
    }
}
