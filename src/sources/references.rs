//! Reference discovery: people at the subject's claimed employers who
//! could verify employment, grouped by how useful they are as a reference.

use crate::sources::serp::{organic_results, str_field, SerpClient};
use crate::sources::ReferenceSource;
use crate::types::{CheckRequest, ReferenceContact, ResumeData, Result};
use crate::util::truncate;
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashSet;

const MAX_COMPANIES: usize = 4;

/// Job-title keyword → department search expansion.
const DEPARTMENT_MAP: &[(&str, &str)] = &[
    ("machine learning", "ML OR AI OR Machine Learning"),
    ("full stack", "Full Stack OR Fullstack OR Developer"),
    ("fullstack", "Full Stack OR Fullstack OR Developer"),
    ("frontend", "Frontend OR React OR UI"),
    ("backend", "Backend OR API OR Server"),
    ("engineer", "Engineer OR Developer OR Software"),
    ("developer", "Engineer OR Developer OR Software"),
    ("software", "Engineer OR Developer OR Software"),
    ("devops", "Operations OR DevOps OR SRE"),
    ("data", "Data OR Analytics OR ML"),
    ("design", "Design OR UX OR UI"),
    ("product", "Product OR PM"),
    ("market", "Marketing OR Growth"),
    ("sales", "Sales OR Business Development"),
    ("finance", "Finance OR Accounting"),
    ("legal", "Legal OR Compliance"),
    ("ops", "Operations OR DevOps OR SRE"),
    ("security", "Security OR InfoSec OR Cybersecurity"),
    ("research", "Research OR Scientist OR R&D"),
    ("python", "Python OR Backend OR Developer"),
];

pub struct ReferenceDiscovery {
    serp: SerpClient,
}

impl ReferenceDiscovery {
    pub fn new(serp: SerpClient) -> Self {
        Self { serp }
    }

    /// Find HR people, managers and colleagues at one company.
    async fn find_contacts_at_company(
        &self,
        person_name: &str,
        company: &str,
        person_title: &str,
    ) -> Vec<ReferenceContact> {
        let mut queries = vec![
            (
                format!(
                    "site:linkedin.com/in/ \"{}\" (HR OR \"Human Resources\" OR \"Talent Acquisition\" OR \"People Operations\")",
                    company
                ),
                "HR / People Ops",
            ),
            (
                format!(
                    "site:linkedin.com/in/ \"{}\" (Manager OR Director OR \"Team Lead\" OR VP OR Founder OR CEO OR CTO)",
                    company
                ),
                "Management",
            ),
            // Broadest: anyone at the company; catches small employers.
            (format!("site:linkedin.com/in/ \"{}\"", company), "Colleague"),
        ];

        if !person_title.is_empty() {
            if let Some(dept_keywords) = extract_department(person_title) {
                queries.push((
                    format!("site:linkedin.com/in/ \"{}\" ({})", company, dept_keywords),
                    "Same Department",
                ));
            }
        }

        let person_first = person_name
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_lowercase();

        let mut contacts = Vec::new();
        for (query, category) in &queries {
            let data = match self
                .serp
                .search(&[("engine", "google"), ("q", query.as_str()), ("num", "5")])
                .await
            {
                Ok(data) => data,
                Err(err) => {
                    tracing::debug!(company, category = %category, error = %err, "reference query failed");
                    continue;
                }
            };

            for item in organic_results(&data) {
                let url = str_field(item, "link");
                let title = str_field(item, "title");
                let snippet = str_field(item, "snippet");

                if !url.contains("linkedin.com/in/") {
                    continue;
                }
                // Skip the subject themselves.
                let title_name = title.split(" - ").next().unwrap_or("").to_lowercase();
                if !person_first.is_empty() && title_name.contains(&person_first) {
                    continue;
                }

                let (name, role) = parse_linkedin_title(&title);
                if name.is_empty() {
                    continue;
                }

                contacts.push(ReferenceContact {
                    name,
                    title: role,
                    company: company.to_string(),
                    linkedin_url: Some(url),
                    category: category.to_string(),
                    snippet: truncate(&snippet, 200).to_string(),
                });
            }
        }
        contacts
    }
}

#[async_trait]
impl ReferenceSource for ReferenceDiscovery {
    async fn discover(
        &self,
        request: &CheckRequest,
        resume: Option<&ResumeData>,
    ) -> Result<Vec<ReferenceContact>> {
        if !self.serp.is_configured() {
            return Ok(Vec::new());
        }

        // All companies in the person's background with the role they held.
        let mut companies: Vec<(String, String)> = Vec::new();
        if let Some(company) = &request.company {
            companies.push((
                company.clone(),
                request.title.clone().unwrap_or_default(),
            ));
        }
        if let Some(resume) = resume {
            for entry in &resume.experience {
                let Some(company) = entry.company.as_deref().map(str::trim) else {
                    continue;
                };
                if company.is_empty() || companies.iter().any(|(c, _)| c == company) {
                    continue;
                }
                companies.push((
                    company.to_string(),
                    entry.title.clone().unwrap_or_default(),
                ));
            }
        }

        if companies.is_empty() {
            return Ok(Vec::new());
        }

        let searches = companies
            .iter()
            .take(MAX_COMPANIES)
            .map(|(company, title)| self.find_contacts_at_company(&request.name, company, title));
        let results = join_all(searches).await;

        // Dedup by profile URL, falling back to the contact's name.
        let mut seen = HashSet::new();
        let mut all_contacts = Vec::new();
        for contacts in results {
            for contact in contacts {
                let key = contact
                    .linkedin_url
                    .clone()
                    .unwrap_or_else(|| contact.name.clone());
                if seen.insert(key) {
                    all_contacts.push(contact);
                }
            }
        }
        Ok(all_contacts)
    }
}

/// Parse `"John Doe - Senior Manager - Company | LinkedIn"` into
/// `(name, role)`.
fn parse_linkedin_title(title: &str) -> (String, String) {
    let normalized = title.replace('–', "-").replace('|', "-");
    let mut parts: Vec<&str> = normalized
        .split('-')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    while parts
        .last()
        .is_some_and(|p| p.to_lowercase().starts_with("linkedin"))
    {
        parts.pop();
    }
    match parts.as_slice() {
        [] => (String::new(), String::new()),
        [name] => (name.to_string(), String::new()),
        [name, role, ..] => (name.to_string(), role.to_string()),
    }
}

/// Department keywords for a job title, used to find peers in the same
/// function. First matching keyword wins.
fn extract_department(title: &str) -> Option<&'static str> {
    let title_lower = title.to_lowercase();
    DEPARTMENT_MAP
        .iter()
        .find(|(keyword, _)| title_lower.contains(keyword))
        .map(|(_, dept)| *dept)
}
