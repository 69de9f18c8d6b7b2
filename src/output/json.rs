use anyhow::Result;
use serde::Serialize;

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::render_json;
    use crate::report::build_comparison;
    use crate::responses::SurveyData;

    #[test]
    fn keeps_null_for_missing_statistics() {
        let view = build_comparison(&SurveyData::empty("s1"), 0.2);
        let rendered = render_json(&view).expect("failed to render json");
        assert!(rendered.contains("\"surveyId\": \"s1\""));
        assert!(rendered.contains("\"survey_average\": null"));
        assert!(rendered.contains("\"classification\": \"no_data\""));
    }
}
