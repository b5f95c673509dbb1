//! Verification that claimed employers actually exist.

use crate::sources::serp::{organic_results, str_field, SerpClient};
use crate::sources::CompanySource;
use crate::types::{CompanyCheck, ResumeData, Result};
use crate::util::truncate;
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashSet;

pub struct CompanyVerifier {
    serp: SerpClient,
}

impl CompanyVerifier {
    pub fn new(serp: SerpClient) -> Self {
        Self { serp }
    }

    /// Search for one company and judge whether it exists.
    ///
    /// Search failures are findings, not errors: the check comes back
    /// unverified with the reason in its description.
    async fn check_company(&self, company_name: &str) -> CompanyCheck {
        let query = format!("\"{}\" company", company_name);
        let data = match self
            .serp
            .search(&[("engine", "google"), ("q", query.as_str()), ("num", "5")])
            .await
        {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!(company = company_name, error = %err, "company search failed");
                return CompanyCheck {
                    name: company_name.to_string(),
                    verified: false,
                    evidence_url: None,
                    description: "Search failed".to_string(),
                };
            }
        };

        let company_lower = company_name.to_lowercase();

        // Knowledge graph first: Google's own verification.
        if let Some(knowledge) = data.get("knowledge_graph") {
            let kg_title = str_field(knowledge, "title").to_lowercase();
            if !kg_title.is_empty()
                && (kg_title.contains(&company_lower) || company_lower.contains(&kg_title))
            {
                let description = str_field(knowledge, "description");
                let website = str_field(knowledge, "website");
                return CompanyCheck {
                    name: company_name.to_string(),
                    verified: true,
                    evidence_url: (!website.is_empty()).then_some(website),
                    description: if description.is_empty() {
                        "Found in Google Knowledge Graph".to_string()
                    } else {
                        format!("Google Knowledge Graph: {}", truncate(&description, 150))
                    },
                };
            }
        }

        // Organic results: the company's own site or LinkedIn page.
        let organic = organic_results(&data);
        for result in organic.iter().take(5) {
            let url = str_field(result, "link");
            let title = str_field(result, "title").to_lowercase();
            let snippet = str_field(result, "snippet");

            if url.contains("linkedin.com/company/") || title.contains(&company_lower) {
                return CompanyCheck {
                    name: company_name.to_string(),
                    verified: true,
                    evidence_url: Some(url.clone()),
                    description: if snippet.is_empty() {
                        format!("Found at {}", url)
                    } else {
                        truncate(&snippet, 150).to_string()
                    },
                };
            }
        }

        if !organic.is_empty() {
            return CompanyCheck {
                name: company_name.to_string(),
                verified: false,
                evidence_url: None,
                description: format!(
                    "Search returned results but no strong match for '{}' as a company",
                    company_name
                ),
            };
        }

        CompanyCheck {
            name: company_name.to_string(),
            verified: false,
            evidence_url: None,
            description: "No search results found for this company".to_string(),
        }
    }
}

#[async_trait]
impl CompanySource for CompanyVerifier {
    async fn verify_companies(&self, resume: &ResumeData) -> Result<Vec<CompanyCheck>> {
        let companies = companies_to_check(resume);
        if companies.is_empty() || !self.serp.is_configured() {
            return Ok(Vec::new());
        }

        let checks = join_all(
            companies
                .iter()
                .map(|company| self.check_company(company)),
        )
        .await;
        Ok(checks)
    }
}

/// Every distinct company named in the résumé, first-seen order.
fn companies_to_check(resume: &ResumeData) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut companies = Vec::new();
    let mut add = |name: &str| {
        let name = name.trim();
        if !name.is_empty() && seen.insert(name.to_string()) {
            companies.push(name.to_string());
        }
    };

    if let Some(company) = &resume.company {
        add(company);
    }
    for entry in &resume.experience {
        if let Some(company) = &entry.company {
            add(company);
        }
    }
    companies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExperienceEntry;

    #[test]
    fn companies_collect_in_first_seen_order_without_duplicates() {
        let resume = ResumeData {
            company: Some("Acme".to_string()),
            experience: vec![
                ExperienceEntry {
                    company: Some("Globex".to_string()),
                    ..Default::default()
                },
                ExperienceEntry {
                    company: Some("Acme".to_string()),
                    ..Default::default()
                },
                ExperienceEntry {
                    company: Some("  ".to_string()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert_eq!(companies_to_check(&resume), vec!["Acme", "Globex"]);
    }
}
