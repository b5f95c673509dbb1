//! Structured résumé extraction via the chat endpoint.

use crate::report::llm::ChatClient;
use crate::sources::ResumeExtractor;
use crate::types::{ResumeData, Result};
use crate::util::truncate;
use async_trait::async_trait;

const EXTRACT_PROMPT: &str = r#"You are a resume parsing expert. Extract structured information from the following resume text.

You MUST respond with valid JSON containing these keys:
- "name": Full name of the person (string, or null if not found)
- "email": Email address (string, or null)
- "phone": Phone number (string, or null)
- "location": City/state/country (string, or null)
- "title": Current or most recent job title (string, or null)
- "company": Current or most recent company (string, or null)
- "linkedin_url": LinkedIn profile URL if mentioned (string, or null)
- "github_url": GitHub profile URL if mentioned (string, or null)
- "website": Personal website if mentioned (string, or null)
- "skills": List of technical and professional skills (list of strings)
- "experience": List of objects with "title", "company", "duration", "description" keys
- "education": List of objects with "school", "degree", "field" keys
- "certifications": List of strings
- "key_search_terms": List of 5-10 unique search terms that would help verify this person's background (e.g. specific project names, publication titles, unique company+role combos, conference talks, awards). These should be specific enough to distinguish this person from others with the same name.

Extract ONLY what is explicitly stated. Do not invent information."#;

/// Caps keep prompt and stored text bounded on pathological inputs.
const MAX_INPUT_CHARS: usize = 8000;
const MAX_STORED_CHARS: usize = 5000;

pub struct LlmResumeExtractor {
    chat: ChatClient,
}

impl LlmResumeExtractor {
    pub fn new(chat: ChatClient) -> Self {
        Self { chat }
    }
}

#[async_trait]
impl ResumeExtractor for LlmResumeExtractor {
    /// Extract structured fields from raw résumé text.
    ///
    /// Extraction problems degrade to a raw-text-only `ResumeData`; the
    /// run proceeds either way.
    async fn extract(&self, raw_text: &str) -> Result<ResumeData> {
        let stored = truncate(raw_text, MAX_STORED_CHARS).to_string();
        let user_message = format!("Resume text:\n\n{}", truncate(raw_text, MAX_INPUT_CHARS));

        let content = match self
            .chat
            .complete_json(EXTRACT_PROMPT, &user_message, 0.1, 2048)
            .await
        {
            Ok(content) => content,
            Err(err) => {
                tracing::error!(error = %err, "resume extraction request failed");
                return Ok(ResumeData {
                    raw_text: Some(stored),
                    ..Default::default()
                });
            }
        };

        match serde_json::from_str::<ResumeData>(&content) {
            Ok(mut resume) => {
                resume.raw_text = Some(stored);
                Ok(resume)
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to parse resume extraction output");
                Ok(ResumeData {
                    raw_text: Some(stored),
                    ..Default::default()
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::types::ResumeData;

    #[test]
    fn extraction_output_deserializes_with_partial_fields() {
        // The model may omit any key; everything defaults.
        let content = r#"{
            "name": "Jane Doe",
            "company": "Acme",
            "experience": [
                {"title": "Engineer", "company": "Globex", "duration": "2019-2021"}
            ],
            "education": [{"school": "MIT"}]
        }"#;
        let resume: ResumeData = serde_json::from_str(content).expect("deserializes");
        assert_eq!(resume.name.as_deref(), Some("Jane Doe"));
        assert_eq!(resume.experience.len(), 1);
        assert_eq!(resume.experience[0].company.as_deref(), Some("Globex"));
        assert!(resume.experience[0].description.is_none());
        assert_eq!(resume.education[0].school.as_deref(), Some("MIT"));
        assert!(resume.skills.is_empty());
    }
}
