//! Source adapters exercised against a mock HTTP server.

use dossier::sources::company::CompanyVerifier;
use dossier::sources::github::GitHubClient;
use dossier::sources::search::SerpApiSearch;
use dossier::sources::serp::SerpClient;
use dossier::sources::{CodeHostSource, CompanySource, SearchSource};
use dossier::types::{ExperienceEntry, ResumeData};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn serp_client(server: &MockServer) -> SerpClient {
    SerpClient::new(reqwest::Client::new(), "test-key".to_string())
        .with_base_url(format!("{}/search.json", server.uri()))
}

#[tokio::test]
async fn web_search_parses_organic_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("engine", "google"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "organic_results": [
                {"title": "Jane Doe - Acme", "link": "https://example.com/jane", "snippet": "Engineer at Acme"},
                {"title": "Jane Doe profile", "link": "https://www.linkedin.com/in/janedoe", "snippet": "profile"},
            ]
        })))
        .mount(&server)
        .await;

    let search = SerpApiSearch::new(serp_client(&server));
    let hits = search.search_web("Jane Doe Acme").await.expect("search ok");

    // The fetcher reports everything; profile-domain filtering happens in
    // the merge step.
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].url, "https://example.com/jane");
    assert_eq!(hits[0].source, "google");
}

#[tokio::test]
async fn news_search_reads_the_news_results_array() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("tbm", "nws"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "news_results": [
                {"title": "Acme hires Jane Doe", "link": "https://news.example.com/1", "snippet": "announcement"}
            ]
        })))
        .mount(&server)
        .await;

    let search = SerpApiSearch::new(serp_client(&server));
    let hits = search.search_news("Jane Doe").await.expect("search ok");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].source, "news");
}

#[tokio::test]
async fn search_errors_propagate_for_the_executor_to_isolate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let search = SerpApiSearch::new(serp_client(&server));
    assert!(search.search_web("Jane Doe").await.is_err());
}

#[tokio::test]
async fn unconfigured_search_returns_empty_without_calling_out() {
    let serp = SerpClient::new(reqwest::Client::new(), String::new());
    let search = SerpApiSearch::new(serp);
    let hits = search.search_web("Jane Doe").await.expect("ok");
    assert!(hits.is_empty());
}

#[tokio::test]
async fn github_search_hydrates_each_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"login": "janedoe"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/janedoe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "login": "janedoe",
            "html_url": "https://github.com/janedoe",
            "name": "Jane Doe",
            "bio": "Builds things",
            "public_repos": 12,
            "followers": 80,
            "following": 3
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/janedoe/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "widget", "description": "A widget", "stargazers_count": 42,
             "language": "Rust", "html_url": "https://github.com/janedoe/widget"}
        ])))
        .mount(&server)
        .await;

    let github = GitHubClient::new(reqwest::Client::new()).with_base_url(server.uri());
    let profiles = github.search_users("Jane Doe").await.expect("search ok");

    assert_eq!(profiles.len(), 1);
    let profile = &profiles[0];
    assert_eq!(profile.username, "janedoe");
    assert_eq!(profile.name.as_deref(), Some("Jane Doe"));
    assert_eq!(profile.public_repos, 12);
    assert_eq!(profile.top_repos.len(), 1);
    assert_eq!(profile.top_repos[0].stars, 42);
}

#[tokio::test]
async fn github_missing_user_is_none_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/ghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let github = GitHubClient::new(reqwest::Client::new()).with_base_url(server.uri());
    let profile = github.get_user("ghost").await.expect("fetch ok");
    assert!(profile.is_none());
}

#[tokio::test]
async fn company_verification_trusts_the_knowledge_graph() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "knowledge_graph": {
                "title": "Acme Corporation",
                "description": "A maker of everything",
                "website": "https://acme.example"
            },
            "organic_results": []
        })))
        .mount(&server)
        .await;

    let verifier = CompanyVerifier::new(serp_client(&server));
    let resume = ResumeData {
        company: Some("Acme".to_string()),
        ..Default::default()
    };
    let checks = verifier.verify_companies(&resume).await.expect("verify ok");

    assert_eq!(checks.len(), 1);
    assert!(checks[0].verified);
    assert_eq!(checks[0].evidence_url.as_deref(), Some("https://acme.example"));
    assert!(checks[0].description.contains("Knowledge Graph"));
}

#[tokio::test]
async fn company_with_no_results_comes_back_unverified() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let verifier = CompanyVerifier::new(serp_client(&server));
    let resume = ResumeData {
        experience: vec![ExperienceEntry {
            company: Some("Nonexistent Widgets".to_string()),
            ..Default::default()
        }],
        ..Default::default()
    };
    let checks = verifier.verify_companies(&resume).await.expect("verify ok");

    assert_eq!(checks.len(), 1);
    assert!(!checks[0].verified);
    assert!(checks[0].description.contains("No search results"));
}
