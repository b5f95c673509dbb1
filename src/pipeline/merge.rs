//! Redundancy resolution: best-of-N profile selection and identity-keyed
//! dedup of list-shaped results.

use crate::types::{GitHubProfile, LinkedInProfile, PhotoSearchOutcome, SearchHit, SocialProfile, SourceResult};
use std::collections::HashSet;

/// Domain served by the dedicated profile pipeline; general web hits
/// pointing there are dropped rather than deduplicated.
const PROFILE_DOMAIN: &str = "linkedin.com";

fn present(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.is_empty())
}

/// Data-richness score for a profile candidate.
///
/// The weights are load-bearing: selection behavior depends on experience
/// entries dominating (3 points each) over summary text (2 points).
pub fn profile_score(profile: &LinkedInProfile) -> i64 {
    let mut score = 0i64;
    if present(&profile.name) {
        score += 1;
    }
    if present(&profile.headline) {
        score += 1;
    }
    if present(&profile.summary) {
        score += 2;
    }
    if present(&profile.location) {
        score += 1;
    }
    score += profile.experience.len() as i64 * 3;
    score += profile.education.len() as i64 * 2;
    score += profile.skills.len() as i64;
    score
}

/// Pick the candidate with the most data. Ties keep the first-seen
/// maximum; an entirely empty candidate (score 0) still wins over nothing.
pub fn select_best_profile(candidates: &[Option<LinkedInProfile>]) -> Option<LinkedInProfile> {
    let mut best: Option<&LinkedInProfile> = None;
    let mut best_score = -1i64;
    for profile in candidates.iter().flatten() {
        let score = profile_score(profile);
        if score > best_score {
            best_score = score;
            best = Some(profile);
        }
    }
    best.cloned()
}

/// Accumulates list-shaped results across tasks, keeping the first
/// occurrence per identity key (URL for hits, username for GitHub).
#[derive(Debug, Default)]
pub struct ResultMerger {
    seen_urls: HashSet<String>,
    seen_usernames: HashSet<String>,
    pub web_hits: Vec<SearchHit>,
    pub news_hits: Vec<SearchHit>,
    pub github_profiles: Vec<GitHubProfile>,
}

impl ResultMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one task's result into the merged lists. Results must be fed
    /// in task order; later duplicates are discarded.
    pub fn absorb(&mut self, task_id: &str, result: &SourceResult) {
        match result {
            SourceResult::Search(hits) => {
                for hit in hits {
                    if hit.url.contains(PROFILE_DOMAIN) {
                        continue;
                    }
                    if self.seen_urls.insert(hit.url.clone()) {
                        let mut kept = hit.clone();
                        // Provenance: which query surfaced this hit.
                        kept.source = format!("google ({})", query_origin(task_id));
                        self.web_hits.push(kept);
                    }
                }
            }
            SourceResult::News(hits) => {
                for hit in hits {
                    if self.seen_urls.insert(hit.url.clone()) {
                        self.news_hits.push(hit.clone());
                    }
                }
            }
            SourceResult::GitHub(profiles) => {
                for profile in profiles {
                    if self.seen_usernames.insert(profile.username.clone()) {
                        self.github_profiles.push(profile.clone());
                    }
                }
            }
            // Single-valued and pass-through categories are handled by the
            // aggregator directly.
            _ => {}
        }
    }
}

/// The human-readable query origin embedded in a task id: everything after
/// the leading category segment.
fn query_origin(task_id: &str) -> &str {
    task_id
        .split_once(':')
        .map(|(_, rest)| rest)
        .unwrap_or(task_id)
}

/// Fold photo-derived social profiles into the social list, skipping URLs
/// already present.
pub fn fold_photo_profiles(social: &mut Vec<SocialProfile>, photo: &PhotoSearchOutcome) {
    let mut seen: HashSet<String> = social.iter().map(|p| p.url.clone()).collect();
    for profile in &photo.profiles {
        if seen.insert(profile.url.clone()) {
            social.push(profile.clone());
        }
    }
}
