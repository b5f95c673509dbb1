//! Run orchestration: build the task set, fan out, merge, assemble
//! context, and produce the terminal report.

use crate::pipeline::context::{assemble, confidence_note};
use crate::pipeline::events::{PipelineEvent, ProgressEvent, TaskAnnouncement, TaskState};
use crate::pipeline::executor::{self, PreparedTask, TaskFuture};
use crate::pipeline::merge::{fold_photo_profiles, select_best_profile, ResultMerger};
use crate::pipeline::tasks::{build_tasks, label_for, TaskDescriptor, TaskKind};
use crate::report::{fallback_report, ReportGenerator};
use crate::sources::Sources;
use crate::types::{
    AggregatedData, AppError, BackgroundReport, CheckRequest, ProviderKind, ResumeData,
    SourceResult,
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// The aggregation engine. Owns nothing mutable; all state lives in the
/// per-run locals, so one instance serves concurrent runs.
#[derive(Clone)]
pub struct Aggregator {
    sources: Arc<Sources>,
    reporter: Arc<dyn ReportGenerator>,
    default_provider: ProviderKind,
}

impl Aggregator {
    pub fn new(
        sources: Arc<Sources>,
        reporter: Arc<dyn ReportGenerator>,
        default_provider: ProviderKind,
    ) -> Self {
        Self {
            sources,
            reporter,
            default_provider,
        }
    }

    /// Collect-all mode: wait for every source, return the report.
    pub async fn run(
        &self,
        request: CheckRequest,
        resume: Option<ResumeData>,
        photo_url: Option<String>,
    ) -> BackgroundReport {
        self.execute(request, resume, photo_url, None).await
    }

    /// Streaming mode: emit progress events while the run executes, then
    /// the terminal report. The channel closes when this returns; that
    /// closure is the end-of-stream signal.
    pub async fn run_streaming(
        &self,
        request: CheckRequest,
        resume: Option<ResumeData>,
        photo_url: Option<String>,
        events: mpsc::Sender<PipelineEvent>,
    ) {
        let report = self.execute(request, resume, photo_url, Some(&events)).await;
        if events
            .send(PipelineEvent::Result(Box::new(report)))
            .await
            .is_err()
        {
            tracing::debug!("result receiver dropped before the report was delivered");
        }
    }

    async fn execute(
        &self,
        request: CheckRequest,
        resume: Option<ResumeData>,
        photo_url: Option<String>,
        events: Option<&mpsc::Sender<PipelineEvent>>,
    ) -> BackgroundReport {
        let chosen = request.provider.unwrap_or(self.default_provider);

        // Résumé fields fill request gaps; explicit input always wins.
        let request = match &resume {
            Some(resume) => request.merged_with_resume(resume),
            None => request,
        };

        let descriptors = build_tasks(&request, resume.as_ref(), chosen, photo_url.as_deref());
        let total = descriptors.len();

        if let Some(tx) = events {
            let announcements = descriptors
                .iter()
                .map(|descriptor| TaskAnnouncement {
                    id: descriptor.id.clone(),
                    label: label_for(&descriptor.id),
                    state: TaskState::Running,
                })
                .collect();
            let event = PipelineEvent::Status(ProgressEvent::search_start(announcements));
            let _ = tx.send(event).await;
        }

        let run_id = uuid::Uuid::new_v4();
        tracing::info!(
            %run_id,
            tasks = total,
            subject = %request.name,
            "running concurrent source tasks"
        );
        let prepared = self.prepare(&descriptors, &request, resume.as_ref());
        let results = executor::run_all(prepared, events).await;

        if let Some(tx) = events {
            let _ = tx
                .send(PipelineEvent::Status(ProgressEvent::analyzing(total)))
                .await;
        }

        self.assemble_report(&request, chosen, resume, &descriptors, results)
            .await
    }

    /// Bind each descriptor to its concrete source operation. Binding
    /// happens here, once, by matching the closed task taxonomy.
    fn prepare(
        &self,
        descriptors: &[TaskDescriptor],
        request: &CheckRequest,
        resume: Option<&ResumeData>,
    ) -> Vec<PreparedTask> {
        descriptors
            .iter()
            .map(|descriptor| {
                let future = self.bind(&descriptor.kind, request, resume);
                PreparedTask::new(descriptor.id.clone(), label_for(&descriptor.id), future)
            })
            .collect()
    }

    fn bind(
        &self,
        kind: &TaskKind,
        request: &CheckRequest,
        resume: Option<&ResumeData>,
    ) -> TaskFuture {
        match kind {
            TaskKind::WebSearch { query } => {
                let search = Arc::clone(&self.sources.search);
                let query = query.clone();
                Box::pin(async move { Ok(SourceResult::Search(search.search_web(&query).await?)) })
            }
            TaskKind::NewsSearch { query } => {
                let search = Arc::clone(&self.sources.search);
                let query = query.clone();
                Box::pin(async move { Ok(SourceResult::News(search.search_news(&query).await?)) })
            }
            TaskKind::GitHubSearch { query } => {
                let github = Arc::clone(&self.sources.github);
                let query = query.clone();
                Box::pin(
                    async move { Ok(SourceResult::GitHub(github.search_users(&query).await?)) },
                )
            }
            TaskKind::GitHubUser { username } => {
                let github = Arc::clone(&self.sources.github);
                let username = username.clone();
                Box::pin(async move {
                    let profile = github.get_user(&username).await?;
                    Ok(SourceResult::GitHub(profile.into_iter().collect()))
                })
            }
            TaskKind::LinkedInProfile { provider } => match self.sources.provider(*provider) {
                Some(linkedin) => {
                    let request = request.clone();
                    Box::pin(async move {
                        Ok(SourceResult::Profile(linkedin.fetch_profile(&request).await?))
                    })
                }
                None => {
                    let name = provider.name();
                    Box::pin(async move {
                        Err(AppError::Internal(format!(
                            "profile provider '{}' is not registered",
                            name
                        )))
                    })
                }
            },
            TaskKind::CompanyVerify => {
                let company = Arc::clone(&self.sources.company);
                let resume = resume.cloned().unwrap_or_default();
                Box::pin(async move {
                    Ok(SourceResult::Companies(
                        company.verify_companies(&resume).await?,
                    ))
                })
            }
            TaskKind::SocialScan => {
                let social = Arc::clone(&self.sources.social);
                let request = request.clone();
                Box::pin(async move { Ok(SourceResult::Social(social.scan(&request).await?)) })
            }
            TaskKind::ReverseImage { image_url } => {
                let photo = Arc::clone(&self.sources.photo);
                let image_url = image_url.clone();
                Box::pin(async move {
                    Ok(SourceResult::Photo(photo.reverse_search(&image_url).await?))
                })
            }
            TaskKind::References => {
                let references = Arc::clone(&self.sources.references);
                let request = request.clone();
                let resume = resume.cloned();
                Box::pin(async move {
                    Ok(SourceResult::References(
                        references.discover(&request, resume.as_ref()).await?,
                    ))
                })
            }
        }
    }

    /// Merge raw results in task order, assemble the context, and produce
    /// the terminal report (falling back to the count-based report when
    /// the analyst fails).
    async fn assemble_report(
        &self,
        request: &CheckRequest,
        chosen: ProviderKind,
        resume: Option<ResumeData>,
        descriptors: &[TaskDescriptor],
        results: HashMap<String, Option<SourceResult>>,
    ) -> BackgroundReport {
        let mut profile_candidates: Vec<Option<crate::types::LinkedInProfile>> = Vec::new();
        let mut providers_used: Vec<String> = Vec::new();
        let mut merger = ResultMerger::new();
        let mut company_checks = Vec::new();
        let mut social_profiles = Vec::new();
        let mut reference_contacts = Vec::new();
        let mut photo_outcome = None;

        for descriptor in descriptors {
            let Some(result) = results.get(&descriptor.id).cloned().flatten() else {
                continue;
            };
            match result {
                SourceResult::Profile(candidate) => {
                    if candidate.is_some() {
                        if let TaskKind::LinkedInProfile { provider } = &descriptor.kind {
                            providers_used.push(provider.name().to_string());
                        }
                    }
                    profile_candidates.push(candidate);
                }
                result @ (SourceResult::Search(_)
                | SourceResult::News(_)
                | SourceResult::GitHub(_)) => merger.absorb(&descriptor.id, &result),
                SourceResult::Companies(checks) => company_checks = checks,
                SourceResult::Social(profiles) => social_profiles = profiles,
                SourceResult::References(contacts) => reference_contacts = contacts,
                SourceResult::Photo(outcome) => photo_outcome = Some(outcome),
            }
        }

        let linkedin = select_best_profile(&profile_candidates);

        let mut photo_matches = Vec::new();
        if let Some(outcome) = photo_outcome {
            fold_photo_profiles(&mut social_profiles, &outcome);
            photo_matches = outcome.visual_matches;
        }

        let mut aggregated = AggregatedData {
            linkedin,
            github_profiles: merger.github_profiles,
            resume,
            company_checks,
            social_profiles,
            photo_matches,
            reference_contacts,
            search_results: merger.web_hits,
            news_articles: merger.news_hits,
            raw_context: String::new(),
        };
        let (raw_context, sources_used) = assemble(&aggregated, &providers_used);
        aggregated.raw_context = raw_context;

        let confidence = confidence_note(aggregated.linkedin.as_ref());

        let generated = match self.reporter.summarize(request, &aggregated).await {
            Ok(generated) => generated,
            Err(err) => {
                tracing::error!(error = %err, "report generation failed, using fallback");
                fallback_report(request, &aggregated)
            }
        };

        let provider_used = if providers_used.is_empty() {
            chosen.name().to_string()
        } else {
            providers_used.join(" + ")
        };

        BackgroundReport {
            name: request.name.clone(),
            generated_at: Utc::now(),
            linkedin_profile: aggregated.linkedin,
            github_profiles: aggregated.github_profiles,
            resume_data: aggregated.resume,
            company_checks: aggregated.company_checks,
            social_profiles: aggregated.social_profiles,
            photo_matches: aggregated.photo_matches,
            reference_contacts: aggregated.reference_contacts,
            identity_verification: generated.identity_verification,
            verdict: generated.verdict,
            summary: generated.summary,
            professional_background: generated.professional_background,
            key_highlights: generated.key_highlights,
            news_mentions: aggregated.news_articles,
            sources_used,
            provider_used,
            confidence_note: confidence,
        }
    }
}
