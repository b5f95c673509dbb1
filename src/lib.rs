//! # Dossier
//!
//! A concurrent background-check aggregation server. Given a person's
//! name (and optionally a résumé and photo), Dossier fans out across
//! independent public data sources — LinkedIn providers, web and news
//! search, GitHub, company registries, social platforms, reverse image
//! search, reference discovery — merges the overlapping findings, and
//! hands a consolidated context to an analyst LLM that produces a
//! structured report with a verdict.
//!
//! Dossier can be used two ways:
//!
//! 1. **As a standalone server** - run the `dossier-server` binary and
//!    POST to `/api/v1/check`; progress streams back as server-sent
//!    events ending in the report.
//! 2. **As a library** - drive [`pipeline::Aggregator`] directly with
//!    your own source implementations.
//!
//! ## Architecture
//!
//! Every source sits behind an async trait in [`sources`]; the
//! [`pipeline`] derives a task set from the request, executes all tasks
//! concurrently with per-task failure isolation, resolves redundant
//! results (several providers may return candidate profiles for the same
//! person), and assembles a deterministic textual context for the report
//! generator in [`report`]. A failed source never fails a run: it
//! surfaces as a per-task error event and an absent result.
//!
//! ## Modules
//!
//! - [`api`] - HTTP handlers and routes (multipart in, SSE out)
//! - [`config`] - environment-backed settings
//! - [`pipeline`] - task building, fan-out execution, merge, context
//! - [`providers`] - LinkedIn profile providers
//! - [`report`] - analyst LLM client and fallback report
//! - [`sources`] - data-source adapters and the capability table
//! - [`types`] - data model and error handling

/// HTTP API handlers and routes.
pub mod api;
/// Environment-backed configuration.
pub mod config;
/// The concurrent aggregation pipeline.
pub mod pipeline;
/// LinkedIn profile providers.
pub mod providers;
/// Report generation (analyst LLM + fallback).
pub mod report;
/// External data-source adapters.
pub mod sources;
/// Core types (requests, payloads, reports, errors).
pub mod types;

pub(crate) mod util;

// Re-export commonly used types
pub use config::Settings;
pub use pipeline::{Aggregator, PipelineEvent, ProgressEvent};
pub use report::{LlmReportGenerator, ReportGenerator};
pub use sources::Sources;
pub use types::{AppError, BackgroundReport, CheckRequest, ProviderKind, Result};

use std::sync::Arc;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Runtime settings loaded at startup.
    pub settings: Arc<Settings>,
    /// The data-source capability table.
    pub sources: Arc<Sources>,
    /// The aggregation engine.
    pub aggregator: Aggregator,
}
