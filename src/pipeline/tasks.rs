//! Task descriptor construction.
//!
//! Pure derivation of the fan-out set from a request and optional résumé.
//! No I/O happens here; each descriptor is bound to a concrete operation by
//! the aggregator. Descriptor order is deterministic for identical inputs
//! (résumé-derived company lists are kept in first-seen order).

use crate::types::{CheckRequest, ProviderKind, ResumeData};

/// A named, independent unit of external work.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDescriptor {
    /// Stable id, unique within a run (e.g. `google:company:Globex`).
    pub id: String,
    pub kind: TaskKind,
}

/// Closed taxonomy of task kinds, each carrying its typed query.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskKind {
    WebSearch { query: String },
    NewsSearch { query: String },
    GitHubSearch { query: String },
    GitHubUser { username: String },
    LinkedInProfile { provider: ProviderKind },
    CompanyVerify,
    SocialScan,
    ReverseImage { image_url: String },
    References,
}

impl TaskDescriptor {
    fn new(id: impl Into<String>, kind: TaskKind) -> Self {
        Self { id: id.into(), kind }
    }
}

const MAX_PAST_COMPANY_SEARCHES: usize = 3;
const MAX_KEY_TERM_SEARCHES: usize = 3;
const MAX_PAST_COMPANY_NEWS: usize = 2;

/// Build the full task set for one run.
///
/// Always includes the identity search, news search, GitHub name search,
/// the profile-provider fan (chosen + baselines), the social scan and the
/// reference discovery. Résumé data adds past-company, education and
/// key-term searches plus company verification; a photo reference adds the
/// reverse-image task.
pub fn build_tasks(
    request: &CheckRequest,
    resume: Option<&ResumeData>,
    chosen_provider: ProviderKind,
    photo_url: Option<&str>,
) -> Vec<TaskDescriptor> {
    let name = request.name.as_str();
    let mut tasks = Vec::new();

    // Profile providers: the chosen one, plus both baselines unless one of
    // them is the chosen one. Running several maximizes the odds that at
    // least one recovers a usable profile.
    for provider in provider_fan(chosen_provider) {
        tasks.push(TaskDescriptor::new(
            format!("linkedin:{}", provider.id()),
            TaskKind::LinkedInProfile { provider },
        ));
    }

    // Identity search: name + current company + title.
    let mut base_query = name.to_string();
    if let Some(company) = &request.company {
        base_query.push(' ');
        base_query.push_str(company);
    }
    if let Some(title) = &request.title {
        base_query.push(' ');
        base_query.push_str(title);
    }
    tasks.push(TaskDescriptor::new(
        "google:main",
        TaskKind::WebSearch { query: base_query },
    ));

    // News: name + current company.
    let mut news_query = name.to_string();
    if let Some(company) = &request.company {
        news_query.push(' ');
        news_query.push_str(company);
    }
    tasks.push(TaskDescriptor::new(
        "news:main",
        TaskKind::NewsSearch { query: news_query },
    ));

    // GitHub: name search, optionally location-qualified.
    let mut gh_query = name.to_string();
    if let Some(location) = &request.location {
        gh_query.push_str(&format!(" location:{}", location));
    }
    tasks.push(TaskDescriptor::new(
        "github:name",
        TaskKind::GitHubSearch { query: gh_query },
    ));

    if let Some(resume) = resume {
        let past = past_companies(resume, request.company.as_deref());

        // Name + each past company (the current one is already covered).
        for company in past.iter().take(MAX_PAST_COMPANY_SEARCHES) {
            tasks.push(TaskDescriptor::new(
                format!("google:company:{}", company),
                TaskKind::WebSearch {
                    query: format!("\"{}\" \"{}\"", name, company),
                },
            ));
        }

        // Name + first school only, to limit query volume.
        if let Some(school) = resume
            .education
            .iter()
            .filter_map(|entry| entry.school.as_deref())
            .map(str::trim)
            .find(|school| !school.is_empty())
        {
            tasks.push(TaskDescriptor::new(
                format!("google:edu:{}", school),
                TaskKind::WebSearch {
                    query: format!("\"{}\" \"{}\"", name, school),
                },
            ));
        }

        // Distinguishing terms extracted from the résumé.
        for (i, term) in resume
            .key_search_terms
            .iter()
            .take(MAX_KEY_TERM_SEARCHES)
            .enumerate()
        {
            tasks.push(TaskDescriptor::new(
                format!("google:term:{}", i),
                TaskKind::WebSearch {
                    query: format!("\"{}\" {}", name, term),
                },
            ));
        }

        // Direct GitHub fetch if the résumé links a profile.
        if let Some(username) = resume
            .github_url
            .as_deref()
            .and_then(crate::sources::github::extract_github_username)
        {
            tasks.push(TaskDescriptor::new(
                "github:direct",
                TaskKind::GitHubUser {
                    username: username.to_string(),
                },
            ));
        }

        // GitHub search qualified by the résumé's company.
        if let Some(company) = &resume.company {
            tasks.push(TaskDescriptor::new(
                "github:company",
                TaskKind::GitHubSearch {
                    query: format!("{} {}", name, company),
                },
            ));
        }

        // News: name + past companies.
        for company in past.iter().take(MAX_PAST_COMPANY_NEWS) {
            tasks.push(TaskDescriptor::new(
                format!("news:company:{}", company),
                TaskKind::NewsSearch {
                    query: format!("{} {}", name, company),
                },
            ));
        }

        tasks.push(TaskDescriptor::new("company_verify", TaskKind::CompanyVerify));
    }

    tasks.push(TaskDescriptor::new("social_media", TaskKind::SocialScan));
    tasks.push(TaskDescriptor::new("references", TaskKind::References));

    if let Some(url) = photo_url {
        tasks.push(TaskDescriptor::new(
            "photo_search",
            TaskKind::ReverseImage {
                image_url: url.to_string(),
            },
        ));
    }

    tasks
}

/// The providers to run for the profile category: chosen first, then the
/// two baselines (scraper, SerpAPI) when they are not the chosen one.
fn provider_fan(chosen: ProviderKind) -> Vec<ProviderKind> {
    let mut fan = vec![chosen];
    for baseline in [ProviderKind::Scraper, ProviderKind::Serpapi] {
        if baseline != chosen {
            fan.push(baseline);
        }
    }
    fan
}

/// Companies from the work history, excluding the current one, deduplicated
/// case-insensitively in first-seen order.
fn past_companies(resume: &ResumeData, current_company: Option<&str>) -> Vec<String> {
    let current = current_company.unwrap_or("").to_lowercase();
    let mut seen = std::collections::HashSet::new();
    let mut companies = Vec::new();
    for entry in &resume.experience {
        let Some(company) = entry.company.as_deref().map(str::trim) else {
            continue;
        };
        if company.is_empty() || company.to_lowercase() == current {
            continue;
        }
        if seen.insert(company.to_lowercase()) {
            companies.push(company.to_string());
        }
    }
    companies
}

/// Human-friendly label for a task id: exact matches first, then pattern
/// synthesis for parameterized ids.
pub fn label_for(task_id: &str) -> String {
    match task_id {
        "linkedin:scraper" => return "LinkedIn (page scraper)".to_string(),
        "linkedin:serpapi" => return "LinkedIn (SerpAPI)".to_string(),
        "linkedin:proxycurl" => return "LinkedIn (Proxycurl)".to_string(),
        "linkedin:rapidapi" => return "LinkedIn (RapidAPI)".to_string(),
        "google:main" => return "Google Search".to_string(),
        "news:main" => return "News Search".to_string(),
        "github:name" => return "GitHub (name search)".to_string(),
        "github:direct" => return "GitHub (direct profile)".to_string(),
        "github:company" => return "GitHub (company search)".to_string(),
        "company_verify" => return "Company Verification".to_string(),
        "social_media" => return "Social Media Scan".to_string(),
        "references" => return "Reference Discovery".to_string(),
        "photo_search" => return "Reverse Photo Search".to_string(),
        _ => {}
    }
    if let Some(company) = task_id.strip_prefix("google:company:") {
        return format!("Google: {}", company);
    }
    if let Some(school) = task_id.strip_prefix("google:edu:") {
        return format!("Google: {}", school);
    }
    if let Some(index) = task_id.strip_prefix("google:term:") {
        if let Ok(i) = index.parse::<usize>() {
            return format!("Google: key term #{}", i + 1);
        }
    }
    if let Some(company) = task_id.strip_prefix("news:company:") {
        return format!("News: {}", company);
    }
    task_id.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EducationEntry, ExperienceEntry};

    fn experience(company: &str) -> ExperienceEntry {
        ExperienceEntry {
            company: Some(company.to_string()),
            ..Default::default()
        }
    }

    fn ids(tasks: &[TaskDescriptor]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn minimal_request_builds_the_baseline_set() {
        let request = CheckRequest::named("Jane Doe");
        let tasks = build_tasks(&request, None, ProviderKind::Scraper, None);

        assert_eq!(
            ids(&tasks),
            vec![
                "linkedin:scraper",
                "linkedin:serpapi",
                "google:main",
                "news:main",
                "github:name",
                "social_media",
                "references",
            ]
        );
    }

    #[test]
    fn chosen_provider_runs_alongside_both_baselines() {
        let request = CheckRequest::named("Jane Doe");
        let tasks = build_tasks(&request, None, ProviderKind::Proxycurl, None);
        let ids = ids(&tasks);

        assert!(ids.contains(&"linkedin:proxycurl"));
        assert!(ids.contains(&"linkedin:scraper"));
        assert!(ids.contains(&"linkedin:serpapi"));
        // A baseline chosen as primary is not duplicated.
        let serpapi_only = build_tasks(&request, None, ProviderKind::Serpapi, None);
        let count = serpapi_only
            .iter()
            .filter(|t| t.id.starts_with("linkedin:"))
            .count();
        assert_eq!(count, 2);
    }

    #[test]
    fn duplicate_and_current_companies_collapse_to_one_task() {
        // Work history lists the current company twice plus one past one.
        let resume = ResumeData {
            experience: vec![experience("Acme"), experience("Acme"), experience("Globex")],
            ..Default::default()
        };
        let request = CheckRequest {
            company: Some("Acme".to_string()),
            ..CheckRequest::named("Jane Doe")
        };

        let tasks = build_tasks(&request, Some(&resume), ProviderKind::Scraper, None);
        let company_tasks: Vec<&str> = tasks
            .iter()
            .filter(|t| t.id.starts_with("google:company:"))
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(company_tasks, vec!["google:company:Globex"]);

        let news_tasks: Vec<&str> = tasks
            .iter()
            .filter(|t| t.id.starts_with("news:company:"))
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(news_tasks, vec!["news:company:Globex"]);
    }

    #[test]
    fn past_company_order_is_first_seen() {
        let resume = ResumeData {
            experience: vec![
                experience("Initech"),
                experience("Globex"),
                experience("initech"),
                experience("Hooli"),
                experience("Umbrella"),
            ],
            ..Default::default()
        };
        let request = CheckRequest::named("Jane Doe");
        let tasks = build_tasks(&request, Some(&resume), ProviderKind::Scraper, None);

        let company_tasks: Vec<&str> = tasks
            .iter()
            .filter(|t| t.id.starts_with("google:company:"))
            .map(|t| t.id.as_str())
            .collect();
        // Capped at 3, first-seen order, case-insensitive dedup.
        assert_eq!(
            company_tasks,
            vec![
                "google:company:Initech",
                "google:company:Globex",
                "google:company:Hooli",
            ]
        );
    }

    #[test]
    fn resume_extras_appear_once_each() {
        let resume = ResumeData {
            company: Some("Acme".to_string()),
            github_url: Some("https://github.com/janedoe".to_string()),
            education: vec![
                EducationEntry {
                    school: Some("MIT".to_string()),
                    ..Default::default()
                },
                EducationEntry {
                    school: Some("Stanford".to_string()),
                    ..Default::default()
                },
            ],
            key_search_terms: vec![
                "rustconf talk".to_string(),
                "acme open source".to_string(),
                "jane doe blog".to_string(),
                "ignored extra".to_string(),
            ],
            ..Default::default()
        };
        let request = CheckRequest {
            company: Some("Acme".to_string()),
            ..CheckRequest::named("Jane Doe")
        };

        let tasks = build_tasks(&request, Some(&resume), ProviderKind::Scraper, None);
        let ids = ids(&tasks);

        // First school only.
        assert!(ids.contains(&"google:edu:MIT"));
        assert!(!ids.iter().any(|id| id.contains("Stanford")));
        // Key terms capped at 3.
        assert!(ids.contains(&"google:term:0"));
        assert!(ids.contains(&"google:term:2"));
        assert!(!ids.contains(&"google:term:3"));
        assert!(ids.contains(&"github:direct"));
        assert!(ids.contains(&"github:company"));
        assert!(ids.contains(&"company_verify"));
    }

    #[test]
    fn photo_reference_adds_the_reverse_image_task() {
        let request = CheckRequest::named("Jane Doe");
        let tasks = build_tasks(
            &request,
            None,
            ProviderKind::Scraper,
            Some("https://img.example/photo.jpg"),
        );
        assert!(tasks.iter().any(|t| t.id == "photo_search"));
    }

    #[test]
    fn identical_inputs_build_identical_task_sets() {
        let resume = ResumeData {
            experience: vec![experience("Globex"), experience("Initech")],
            key_search_terms: vec!["kubernetes migration".to_string()],
            ..Default::default()
        };
        let request = CheckRequest {
            company: Some("Acme".to_string()),
            ..CheckRequest::named("Jane Doe")
        };

        let first = build_tasks(&request, Some(&resume), ProviderKind::Scraper, None);
        let second = build_tasks(&request, Some(&resume), ProviderKind::Scraper, None);
        assert_eq!(first, second);
    }

    #[test]
    fn labels_resolve_exact_then_by_pattern() {
        assert_eq!(label_for("google:main"), "Google Search");
        assert_eq!(label_for("google:company:Globex"), "Google: Globex");
        assert_eq!(label_for("google:term:1"), "Google: key term #2");
        assert_eq!(label_for("news:company:Acme"), "News: Acme");
        assert_eq!(label_for("something:else"), "something:else");
    }
}
