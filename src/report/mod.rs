//! Report generation: the analyst model that turns the aggregated context
//! into a structured background report, and the deterministic fallback
//! used when it fails.

pub mod llm;

use crate::types::{
    AggregatedData, CheckRequest, CheckVerdict, IdentityVerification, Result,
};
use crate::util::truncate;
use async_trait::async_trait;
use llm::ChatClient;
use serde_json::Value;

const SYSTEM_PROMPT: &str = r#"You are a professional background research analyst and due-diligence investigator. Given data about a person collected from their resume, LinkedIn, GitHub, Google search, and news articles, produce a structured background report WITH a verdict on whether their background checks out.

IMPORTANT: The data may contain information about MULTIPLE different people with the same name. You must carefully analyze whether all the data points refer to the same individual or different people.

You MUST respond with valid JSON containing exactly these keys:

- "summary": A 2-4 sentence executive summary of who this person is.
- "professional_background": A 2-3 paragraph narrative of their career trajectory, expertise, and notable positions.
- "key_highlights": A list of 3-7 bullet points (strings) covering the most important facts.

- "identity_verification": An object with these keys:
  - "confidence": One of "high", "medium", or "low".
  - "reasoning": 1-3 sentences explaining why.
  - "multiple_people_detected": boolean.
  - "profiles_found": List of objects with "source", "name", "description".
  - "cross_reference_notes": List of strings noting matches or mismatches across sources.

- "verdict": An object with these keys:
  - "rating": One of "clean", "caution", or "red_flags".
    - "clean" = background looks solid, claims match online presence, no concerns.
    - "caution" = some inconsistencies or missing data, but nothing alarming. Needs more verification.
    - "red_flags" = significant mismatches, false claims, or concerning findings.
  - "score": Integer 0-100. 100 = perfect background, 0 = completely fraudulent.
    - 80-100: Clean. 50-79: Caution. 0-49: Red flags.
  - "summary": 2-3 sentence overall verdict explaining the rating.
  - "resume_vs_online": List of strings comparing resume claims to what was found online. For each claim, note whether it was VERIFIED, UNVERIFIED, or CONTRADICTED.
  - "red_flags": List of strings describing any red flags found. If none, return empty list.
  - "green_flags": List of strings describing positive signals. If none, return empty list.
  - "recommendations": List of strings suggesting next steps for verification.

Be factual and objective. Do not invent information. If data is sparse, note it as a limitation. Base the verdict ONLY on what the data shows."#;

/// What the analyst produced (or the fallback substituted).
#[derive(Debug, Clone, Default)]
pub struct GeneratedReport {
    pub summary: String,
    pub professional_background: String,
    pub key_highlights: Vec<String>,
    pub identity_verification: Option<IdentityVerification>,
    pub verdict: Option<CheckVerdict>,
}

/// The summarization collaborator consumed by the aggregator.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn summarize(
        &self,
        request: &CheckRequest,
        data: &AggregatedData,
    ) -> Result<GeneratedReport>;
}

/// Analyst backed by an OpenAI-compatible chat endpoint.
pub struct LlmReportGenerator {
    chat: ChatClient,
}

impl LlmReportGenerator {
    pub fn new(chat: ChatClient) -> Self {
        Self { chat }
    }
}

#[async_trait]
impl ReportGenerator for LlmReportGenerator {
    async fn summarize(
        &self,
        request: &CheckRequest,
        data: &AggregatedData,
    ) -> Result<GeneratedReport> {
        let mut user_message = format!(
            "Generate a background report and verdict for: {}\n",
            request.name
        );
        if let Some(company) = &request.company {
            user_message.push_str(&format!("Company context: {}\n", company));
        }
        if let Some(title) = &request.title {
            user_message.push_str(&format!("Title context: {}\n", title));
        }
        if let Some(location) = &request.location {
            user_message.push_str(&format!("Location context: {}\n", location));
        }
        user_message.push_str(&format!(
            "\n--- Collected Data ---\n{}\n--- End Data ---",
            data.raw_context
        ));

        let content = self
            .chat
            .complete_json(SYSTEM_PROMPT, &user_message, 0.3, 4000)
            .await?;

        Ok(parse_report_content(&content))
    }
}

/// Parse the analyst's JSON. Unparseable content degrades to a
/// summary-only report rather than an error.
fn parse_report_content(content: &str) -> GeneratedReport {
    let parsed: Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(error = %err, "analyst output was not valid JSON");
            return GeneratedReport {
                summary: truncate(content, 1000).to_string(),
                ..Default::default()
            };
        }
    };

    GeneratedReport {
        summary: parsed
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        professional_background: parsed
            .get("professional_background")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        key_highlights: parsed
            .get("key_highlights")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        identity_verification: parsed
            .get("identity_verification")
            .filter(|v| v.is_object())
            .and_then(|v| serde_json::from_value(v.clone()).ok()),
        verdict: parsed
            .get("verdict")
            .filter(|v| v.is_object())
            .and_then(|v| serde_json::from_value(v.clone()).ok()),
    }
}

/// Deterministic report built purely from counts, used when the analyst
/// fails so the run still terminates with a usable result.
pub fn fallback_report(request: &CheckRequest, data: &AggregatedData) -> GeneratedReport {
    GeneratedReport {
        summary: format!(
            "Background data collected for {} but LLM summarization failed.",
            request.name
        ),
        professional_background: truncate(&data.raw_context, 2000).to_string(),
        key_highlights: vec![
            format!(
                "LinkedIn profile: {}",
                if data.linkedin.is_some() { "found" } else { "not found" }
            ),
            format!("GitHub profiles: {} found", data.github_profiles.len()),
            format!("Google results: {} found", data.search_results.len()),
            format!("News articles: {} found", data.news_articles.len()),
        ],
        identity_verification: None,
        verdict: None,
    }
}
