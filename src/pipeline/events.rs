//! Progress events streamed to the caller while a run executes.
//!
//! A run emits one `search_start` burst announcing every task, exactly one
//! `task_done` per task in real completion order, one `analyzing` marker,
//! and finally the terminal report. Channel closure after the report is the
//! end-of-stream signal.

use crate::types::{BackgroundReport, SourceResult};
use serde::{Deserialize, Serialize};

/// Which stage of the run an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    ResumeParse,
    PhotoUpload,
    SearchStart,
    TaskDone,
    Analyzing,
}

/// Lifecycle state of a task (or pre-phase step).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Running,
    Done,
    Error,
}

/// One entry in the initial announcement burst.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskAnnouncement {
    pub id: String,
    pub label: String,
    pub state: TaskState,
}

/// A status notification for the activity feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub step: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    pub label: String,
    pub state: TaskState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub completed: usize,
    pub total: usize,
    /// Present only on the `search_start` burst: every task of the run,
    /// including ones not yet polled, announced as running.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<TaskAnnouncement>>,
}

impl ProgressEvent {
    /// The announcement burst emitted when the fan-out launches.
    pub fn search_start(announcements: Vec<TaskAnnouncement>) -> Self {
        let total = announcements.len();
        Self {
            step: Phase::SearchStart,
            task_id: None,
            label: format!("Launching {} concurrent searches...", total),
            state: TaskState::Running,
            detail: None,
            completed: 0,
            total,
            tasks: Some(announcements),
        }
    }

    /// Terminal event for one task, emitted as it completes.
    pub fn task_done(
        id: &str,
        label: &str,
        result: Option<&SourceResult>,
        completed: usize,
        total: usize,
    ) -> Self {
        let state = if result.is_some() {
            TaskState::Done
        } else {
            TaskState::Error
        };
        Self {
            step: Phase::TaskDone,
            task_id: Some(id.to_string()),
            label: label.to_string(),
            state,
            detail: result.and_then(result_detail),
            completed,
            total,
            tasks: None,
        }
    }

    /// Marker emitted after all tasks have reported, before the report is
    /// generated.
    pub fn analyzing(total: usize) -> Self {
        Self {
            step: Phase::Analyzing,
            task_id: None,
            label: "Analyzing all collected data...".to_string(),
            state: TaskState::Running,
            detail: None,
            completed: total,
            total,
            tasks: None,
        }
    }

    /// Status event for a pre-pipeline step (résumé parse, photo upload).
    pub fn step(phase: Phase, label: &str, state: TaskState, detail: Option<String>) -> Self {
        Self {
            step: phase,
            task_id: None,
            label: label.to_string(),
            state,
            detail,
            completed: 0,
            total: 0,
            tasks: None,
        }
    }
}

/// Everything a streaming run sends to its consumer.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    Status(ProgressEvent),
    Result(Box<BackgroundReport>),
}

/// Short human detail for a completed task, derived from its result shape.
fn result_detail(result: &SourceResult) -> Option<String> {
    match result {
        SourceResult::Profile(Some(profile)) => Some(
            profile
                .name
                .clone()
                .unwrap_or_else(|| "Profile found".to_string()),
        ),
        SourceResult::Profile(None) => None,
        SourceResult::Search(hits) | SourceResult::News(hits) => {
            if hits.is_empty() {
                Some("No results".to_string())
            } else {
                Some(format!("{} results", hits.len()))
            }
        }
        SourceResult::GitHub(items) => Some(format!("{} found", items.len())),
        SourceResult::Companies(items) => Some(format!("{} found", items.len())),
        SourceResult::Social(items) => Some(format!("{} found", items.len())),
        SourceResult::References(items) => Some(format!("{} found", items.len())),
        SourceResult::Photo(outcome) => Some(format!("{} found", outcome.visual_matches.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LinkedInProfile, SearchHit};

    fn hit(url: &str) -> SearchHit {
        SearchHit {
            title: "t".to_string(),
            url: url.to_string(),
            snippet: "s".to_string(),
            source: "google".to_string(),
        }
    }

    #[test]
    fn task_done_marks_missing_result_as_error() {
        let event = ProgressEvent::task_done("google:main", "Google Search", None, 1, 4);
        assert_eq!(event.state, TaskState::Error);
        assert!(event.detail.is_none());
    }

    #[test]
    fn detail_prefers_profile_name() {
        let profile = LinkedInProfile {
            name: Some("Jane Doe".to_string()),
            ..Default::default()
        };
        let result = SourceResult::Profile(Some(profile));
        let event = ProgressEvent::task_done("linkedin:scraper", "LinkedIn", Some(&result), 1, 4);
        assert_eq!(event.state, TaskState::Done);
        assert_eq!(event.detail.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn detail_counts_search_results() {
        let result = SourceResult::Search(vec![hit("https://a"), hit("https://b")]);
        let event = ProgressEvent::task_done("google:main", "Google Search", Some(&result), 2, 4);
        assert_eq!(event.detail.as_deref(), Some("2 results"));
    }

    #[test]
    fn search_start_announces_every_task() {
        let announcements = vec![
            TaskAnnouncement {
                id: "google:main".to_string(),
                label: "Google Search".to_string(),
                state: TaskState::Running,
            },
            TaskAnnouncement {
                id: "news:main".to_string(),
                label: "News Search".to_string(),
                state: TaskState::Running,
            },
        ];
        let event = ProgressEvent::search_start(announcements);
        assert_eq!(event.total, 2);
        assert_eq!(event.completed, 0);
        assert_eq!(event.tasks.as_ref().map(Vec::len), Some(2));
    }
}
