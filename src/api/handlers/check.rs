//! Background-check handler: accepts the multipart form, runs the
//! pre-phases (résumé parse, photo upload), then streams pipeline events
//! as SSE frames until the terminal report.

use crate::pipeline::{Phase, PipelineEvent, ProgressEvent, TaskState};
use crate::types::{AppError, CheckRequest, ProviderKind, Result};
use crate::AppState;
use axum::extract::{Multipart, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::stream::Stream;
use serde::Serialize;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::mpsc;

const MAX_RESUME_SIZE: usize = 10 * 1024 * 1024;
const MAX_PHOTO_SIZE: usize = 5 * 1024 * 1024;

#[derive(Debug, Default)]
struct CheckForm {
    name: Option<String>,
    company: Option<String>,
    location: Option<String>,
    title: Option<String>,
    linkedin_url: Option<String>,
    photo_url: Option<String>,
    provider: Option<ProviderKind>,
    resume_text: Option<String>,
    photo_bytes: Option<Vec<u8>>,
}

/// Start a background check and stream progress as server-sent events.
///
/// The stream carries `status` events while sources run and ends with a
/// single `result` event holding the report.
#[utoipa::path(
    post,
    path = "/api/v1/check",
    responses(
        (status = 200, description = "SSE stream of status events ending in one result event"),
        (status = 400, description = "Invalid input"),
        (status = 413, description = "Uploaded file too large")
    ),
    tag = "background-check"
)]
pub async fn create_check(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let form = parse_form(multipart).await?;
    let name = form
        .name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput("'name' is required".to_string()))?;

    let request = CheckRequest {
        name,
        company: form.company,
        location: form.location,
        title: form.title,
        linkedin_url: form.linkedin_url,
        provider: form.provider,
    };
    let resume_text = form.resume_text;
    let photo_bytes = form.photo_bytes;
    let photo_url = form.photo_url;

    let stream = async_stream::stream! {
        // Résumé parsing phase.
        let mut resume_data = None;
        if let Some(text) = resume_text {
            yield status_frame(&ProgressEvent::step(
                Phase::ResumeParse, "Parsing resume...", TaskState::Running, None,
            ));
            if text.trim().is_empty() {
                yield status_frame(&ProgressEvent::step(
                    Phase::ResumeParse, "Could not parse resume", TaskState::Error, None,
                ));
            } else {
                match state.sources.resume.extract(&text).await {
                    Ok(data) => {
                        let detail = format!(
                            "{} skills, {} roles extracted",
                            data.skills.len(),
                            data.experience.len(),
                        );
                        yield status_frame(&ProgressEvent::step(
                            Phase::ResumeParse, "Resume parsed", TaskState::Done, Some(detail),
                        ));
                        resume_data = Some(data);
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "resume extraction failed");
                        yield status_frame(&ProgressEvent::step(
                            Phase::ResumeParse, "Could not parse resume", TaskState::Error, None,
                        ));
                    }
                }
            }
        }

        // Photo upload phase: a pasted URL wins over an uploaded file.
        let mut resolved_photo_url = photo_url;
        if resolved_photo_url.is_none() {
            if let Some(bytes) = &photo_bytes {
                yield status_frame(&ProgressEvent::step(
                    Phase::PhotoUpload, "Uploading photo...", TaskState::Running, None,
                ));
                match state.sources.photo.upload(bytes).await {
                    Ok(Some(url)) => {
                        yield status_frame(&ProgressEvent::step(
                            Phase::PhotoUpload,
                            "Photo uploaded",
                            TaskState::Done,
                            Some("Ready for reverse search".to_string()),
                        ));
                        resolved_photo_url = Some(url);
                    }
                    Ok(None) | Err(_) => {
                        yield status_frame(&ProgressEvent::step(
                            Phase::PhotoUpload,
                            "Photo upload failed (check IMGBB_API_KEY)",
                            TaskState::Error,
                            None,
                        ));
                    }
                }
            }
        }

        // The pipeline run. The channel closes once the report is sent.
        let (tx, mut rx) = mpsc::channel(32);
        let aggregator = state.aggregator.clone();
        tokio::spawn(async move {
            aggregator
                .run_streaming(request, resume_data, resolved_photo_url, tx)
                .await;
        });

        while let Some(event) = rx.recv().await {
            match event {
                PipelineEvent::Status(status) => yield status_frame(&status),
                PipelineEvent::Result(report) => yield json_frame("result", &report),
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}

async fn parse_form(mut multipart: Multipart) -> Result<CheckForm> {
    let mut form = CheckForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::InvalidInput(format!("malformed multipart body: {}", err)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => form.name = text_field(field).await?,
            "company" => form.company = text_field(field).await?,
            "location" => form.location = text_field(field).await?,
            "title" => form.title = text_field(field).await?,
            "linkedin_url" => form.linkedin_url = text_field(field).await?,
            "photo_url" => form.photo_url = text_field(field).await?,
            "provider" => {
                // Unknown provider names are ignored, not rejected.
                form.provider = text_field(field).await?.and_then(|p| ProviderKind::parse(&p));
            }
            "resume" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| AppError::InvalidInput(format!("resume upload failed: {}", err)))?;
                if bytes.len() > MAX_RESUME_SIZE {
                    return Err(AppError::PayloadTooLarge(
                        "Resume file too large (max 10MB)".to_string(),
                    ));
                }
                if !bytes.is_empty() {
                    form.resume_text = Some(String::from_utf8_lossy(&bytes).into_owned());
                }
            }
            "photo" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| AppError::InvalidInput(format!("photo upload failed: {}", err)))?;
                if bytes.len() > MAX_PHOTO_SIZE {
                    return Err(AppError::PayloadTooLarge(
                        "Photo too large (max 5MB)".to_string(),
                    ));
                }
                if !bytes.is_empty() {
                    form.photo_bytes = Some(bytes.to_vec());
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn text_field(field: axum::extract::multipart::Field<'_>) -> Result<Option<String>> {
    let value = field
        .text()
        .await
        .map_err(|err| AppError::InvalidInput(format!("unreadable form field: {}", err)))?;
    let trimmed = value.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

fn status_frame(event: &ProgressEvent) -> std::result::Result<Event, Infallible> {
    json_frame("status", event)
}

fn json_frame<T: Serialize>(
    event_type: &str,
    data: &T,
) -> std::result::Result<Event, Infallible> {
    match serde_json::to_string(data) {
        Ok(json) => Ok(Event::default().event(event_type).data(json)),
        Err(err) => {
            tracing::warn!(event_type, error = %err, "failed to serialize SSE event");
            Ok(Event::default().comment("serialization error"))
        }
    }
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses((status = 200, description = "Service is up")),
    tag = "background-check"
)]
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}
