//! Deterministic rendering of the merged aggregate into the textual
//! context handed to the report generator, plus the source manifest.
//!
//! Section order is fixed: résumé and the selected profile lead as ground
//! truth, corroborating evidence follows. Sections are omitted when empty.

use crate::types::{AggregatedData, GitHubProfile, LinkedInProfile, ResumeData};
use crate::util::truncate;

/// Render the aggregate into `(context_text, source_manifest)`.
///
/// `providers_used` names the profile providers that returned data and
/// appears in the manifest's LinkedIn entry.
pub fn assemble(data: &AggregatedData, providers_used: &[String]) -> (String, Vec<String>) {
    let mut sources_used = Vec::new();
    let mut raw_parts: Vec<String> = Vec::new();

    if let Some(resume) = &data.resume {
        sources_used.push("Resume (uploaded)".to_string());
        raw_parts.push(resume_to_text(resume));
    }

    if let Some(profile) = &data.linkedin {
        sources_used.push(format!("LinkedIn ({})", providers_used.join(" + ")));
        raw_parts.push(linkedin_to_text(profile));
    }

    if !data.github_profiles.is_empty() {
        sources_used.push(format!("GitHub ({} profiles)", data.github_profiles.len()));
        for (i, profile) in data.github_profiles.iter().enumerate() {
            raw_parts.push(github_to_text(profile, i + 1));
        }
    }

    if !data.search_results.is_empty() {
        sources_used.push(format!("Google ({} results)", data.search_results.len()));
        for hit in &data.search_results {
            raw_parts.push(format!("[{}] {}: {}", hit.source, hit.title, hit.snippet));
        }
    }

    if !data.news_articles.is_empty() {
        sources_used.push(format!("News ({} articles)", data.news_articles.len()));
        for hit in &data.news_articles {
            raw_parts.push(format!("[news] {}: {}", hit.title, hit.snippet));
        }
    }

    if !data.company_checks.is_empty() {
        sources_used.push(format!("Company Verify ({})", data.company_checks.len()));
        for check in &data.company_checks {
            let status = if check.verified { "VERIFIED" } else { "NOT VERIFIED" };
            raw_parts.push(format!(
                "[company check] {}: {} - {}",
                check.name, status, check.description
            ));
        }
    }

    if !data.social_profiles.is_empty() {
        sources_used.push(format!("Social Media ({})", data.social_profiles.len()));
        for profile in &data.social_profiles {
            raw_parts.push(format!(
                "[social: {}] {} - {}",
                profile.platform, profile.url, profile.snippet
            ));
        }
    }

    if !data.photo_matches.is_empty() {
        sources_used.push(format!("Reverse Photo ({} matches)", data.photo_matches.len()));
        for photo in &data.photo_matches {
            let platform_tag = photo
                .platform
                .as_deref()
                .map(|p| format!(" [{}]", p))
                .unwrap_or_default();
            raw_parts.push(format!(
                "[photo match{}] {} - {}",
                platform_tag, photo.url, photo.title
            ));
        }
    }

    if !data.reference_contacts.is_empty() {
        sources_used.push(format!(
            "References ({} contacts found)",
            data.reference_contacts.len()
        ));
        for contact in &data.reference_contacts {
            raw_parts.push(format!(
                "[reference: {}] {} - {} at {} ({})",
                contact.category,
                contact.name,
                contact.title,
                contact.company,
                contact.linkedin_url.as_deref().unwrap_or("no url"),
            ));
        }
    }

    (raw_parts.join("\n\n"), sources_used)
}

/// Advisory note about how much profile data the run recovered.
pub fn confidence_note(profile: Option<&LinkedInProfile>) -> String {
    match profile {
        None => "No LinkedIn profile found. Report is based on web search results only.".to_string(),
        Some(p) if p.raw_text.is_some() && p.experience.is_empty() => {
            "LinkedIn data was partially extracted. Some details may be missing.".to_string()
        }
        Some(_) => String::new(),
    }
}

fn resume_to_text(resume: &ResumeData) -> String {
    let mut parts = vec!["[SOURCE: Uploaded Resume]".to_string()];
    if let Some(name) = &resume.name {
        parts.push(format!("Name: {}", name));
    }
    if let Some(title) = &resume.title {
        parts.push(format!("Current Title: {}", title));
    }
    if let Some(company) = &resume.company {
        parts.push(format!("Current Company: {}", company));
    }
    if let Some(location) = &resume.location {
        parts.push(format!("Location: {}", location));
    }
    if let Some(email) = &resume.email {
        parts.push(format!("Email: {}", email));
    }
    if let Some(url) = &resume.linkedin_url {
        parts.push(format!("LinkedIn: {}", url));
    }
    if let Some(url) = &resume.github_url {
        parts.push(format!("GitHub: {}", url));
    }
    if let Some(website) = &resume.website {
        parts.push(format!("Website: {}", website));
    }
    if !resume.skills.is_empty() {
        let shown: Vec<&str> = resume.skills.iter().take(20).map(String::as_str).collect();
        parts.push(format!("Skills: {}", shown.join(", ")));
    }
    for exp in &resume.experience {
        parts.push(format!(
            "Experience: {} at {} ({})",
            exp.title.as_deref().unwrap_or(""),
            exp.company.as_deref().unwrap_or(""),
            exp.duration.as_deref().unwrap_or(""),
        ));
        if let Some(description) = &exp.description {
            parts.push(format!("  Details: {}", truncate(description, 200)));
        }
    }
    for edu in &resume.education {
        parts.push(format!(
            "Education: {} in {} from {}",
            edu.degree.as_deref().unwrap_or(""),
            edu.field.as_deref().unwrap_or(""),
            edu.school.as_deref().unwrap_or(""),
        ));
    }
    if !resume.certifications.is_empty() {
        parts.push(format!("Certifications: {}", resume.certifications.join(", ")));
    }
    if !resume.key_search_terms.is_empty() {
        parts.push(format!(
            "Key identifiers from resume: {}",
            resume.key_search_terms.join(", ")
        ));
    }
    parts.join("\n")
}

fn linkedin_to_text(profile: &LinkedInProfile) -> String {
    let mut parts = vec![
        "[SOURCE: LinkedIn]".to_string(),
        format!("Name: {}", profile.name.as_deref().unwrap_or("")),
    ];
    if let Some(headline) = &profile.headline {
        parts.push(format!("Headline: {}", headline));
    }
    if let Some(location) = &profile.location {
        parts.push(format!("Location: {}", location));
    }
    if let Some(summary) = &profile.summary {
        parts.push(format!("About: {}", summary));
    }
    for exp in &profile.experience {
        parts.push(format!(
            "Experience: {} at {} ({})",
            exp.title.as_deref().unwrap_or(""),
            exp.company.as_deref().unwrap_or(""),
            exp.duration.as_deref().unwrap_or(""),
        ));
    }
    for edu in &profile.education {
        parts.push(format!(
            "Education: {} from {}",
            edu.degree.as_deref().unwrap_or(""),
            edu.school.as_deref().unwrap_or(""),
        ));
    }
    if !profile.skills.is_empty() {
        let shown: Vec<&str> = profile.skills.iter().take(15).map(String::as_str).collect();
        parts.push(format!("Skills: {}", shown.join(", ")));
    }
    // A raw-text fallback means structured extraction failed; include the
    // text so the analyst still has something to work with.
    if let Some(raw) = &profile.raw_text {
        if profile.experience.is_empty() {
            parts.push(format!("Raw profile text:\n{}", truncate(raw, 3000)));
        }
    }
    parts.join("\n")
}

fn github_to_text(profile: &GitHubProfile, index: usize) -> String {
    let mut parts = vec![
        format!("[SOURCE: GitHub Profile #{}]", index),
        format!("Username: {}", profile.username),
    ];
    if let Some(name) = &profile.name {
        parts.push(format!("Display Name: {}", name));
    }
    if let Some(bio) = &profile.bio {
        parts.push(format!("Bio: {}", bio));
    }
    if let Some(company) = &profile.company {
        parts.push(format!("Company: {}", company));
    }
    if let Some(location) = &profile.location {
        parts.push(format!("Location: {}", location));
    }
    if let Some(blog) = &profile.blog {
        parts.push(format!("Website: {}", blog));
    }
    parts.push(format!(
        "Public Repos: {}, Followers: {}",
        profile.public_repos, profile.followers
    ));
    if !profile.top_repos.is_empty() {
        let repos: Vec<String> = profile
            .top_repos
            .iter()
            .map(|r| {
                format!(
                    "  - {} ({}, {} stars): {}",
                    r.name,
                    if r.language.is_empty() { "N/A" } else { &r.language },
                    r.stars,
                    r.description
                )
            })
            .collect();
        parts.push(format!("Top Repositories:\n{}", repos.join("\n")));
    }
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CompanyCheck, ReferenceContact, SearchHit, SocialProfile};

    fn hit(url: &str, source: &str) -> SearchHit {
        SearchHit {
            title: "Title".to_string(),
            url: url.to_string(),
            snippet: "Snippet".to_string(),
            source: source.to_string(),
        }
    }

    #[test]
    fn sections_render_in_fixed_order() {
        let data = AggregatedData {
            resume: Some(ResumeData {
                name: Some("Jane Doe".to_string()),
                ..Default::default()
            }),
            linkedin: Some(LinkedInProfile {
                name: Some("Jane Doe".to_string()),
                ..Default::default()
            }),
            github_profiles: vec![GitHubProfile {
                username: "janedoe".to_string(),
                url: "https://github.com/janedoe".to_string(),
                ..Default::default()
            }],
            search_results: vec![hit("https://example.com/a", "google (main)")],
            news_articles: vec![hit("https://news.example.com/b", "news")],
            company_checks: vec![CompanyCheck {
                name: "Acme".to_string(),
                verified: true,
                evidence_url: None,
                description: "Knowledge graph".to_string(),
            }],
            social_profiles: vec![SocialProfile {
                platform: "Twitter/X".to_string(),
                url: "https://x.com/janedoe".to_string(),
                username: None,
                snippet: "tweets".to_string(),
            }],
            reference_contacts: vec![ReferenceContact {
                name: "Sam Smith".to_string(),
                title: "HR Manager".to_string(),
                company: "Acme".to_string(),
                linkedin_url: None,
                category: "HR / People Ops".to_string(),
                snippet: String::new(),
            }],
            ..Default::default()
        };

        let (context, sources) = assemble(&data, &["Scraper".to_string()]);

        let markers = [
            "[SOURCE: Uploaded Resume]",
            "[SOURCE: LinkedIn]",
            "[SOURCE: GitHub Profile #1]",
            "[google (main)]",
            "[news]",
            "[company check]",
            "[social: Twitter/X]",
            "[reference: HR / People Ops]",
        ];
        let positions: Vec<usize> = markers
            .iter()
            .map(|m| context.find(m).unwrap_or_else(|| panic!("missing {}", m)))
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted, "section order must be fixed");

        assert_eq!(sources[0], "Resume (uploaded)");
        assert_eq!(sources[1], "LinkedIn (Scraper)");
        assert!(sources.iter().any(|s| s.starts_with("GitHub (1 profiles")));
    }

    #[test]
    fn empty_sections_are_omitted() {
        let data = AggregatedData::default();
        let (context, sources) = assemble(&data, &[]);
        assert!(context.is_empty());
        assert!(sources.is_empty());
    }

    #[test]
    fn company_checks_render_verification_status() {
        let data = AggregatedData {
            company_checks: vec![
                CompanyCheck {
                    name: "Acme".to_string(),
                    verified: true,
                    evidence_url: Some("https://acme.example".to_string()),
                    description: "site found".to_string(),
                },
                CompanyCheck {
                    name: "Fake Corp".to_string(),
                    verified: false,
                    evidence_url: None,
                    description: "nothing found".to_string(),
                },
            ],
            ..Default::default()
        };
        let (context, _) = assemble(&data, &[]);
        assert!(context.contains("Acme: VERIFIED"));
        assert!(context.contains("Fake Corp: NOT VERIFIED"));
    }

    #[test]
    fn confidence_note_reflects_profile_state() {
        assert!(confidence_note(None).contains("No LinkedIn profile found"));

        let partial = LinkedInProfile {
            raw_text: Some("scraped text".to_string()),
            ..Default::default()
        };
        assert!(confidence_note(Some(&partial)).contains("partially extracted"));

        let full = LinkedInProfile {
            experience: vec![Default::default()],
            ..Default::default()
        };
        assert!(confidence_note(Some(&full)).is_empty());
    }

    #[test]
    fn raw_text_renders_only_without_structured_experience() {
        let partial = LinkedInProfile {
            raw_text: Some("scraped".to_string()),
            ..Default::default()
        };
        assert!(linkedin_to_text(&partial).contains("Raw profile text:"));

        let full = LinkedInProfile {
            raw_text: Some("scraped".to_string()),
            experience: vec![Default::default()],
            ..Default::default()
        };
        assert!(!linkedin_to_text(&full).contains("Raw profile text:"));
    }
}
