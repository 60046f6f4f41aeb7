//! GitHub REST API interactions.
//!
//! A thin blocking client over the endpoints brn needs:
//! - repository listing for an org, user or the authenticated user
//! - pull request listing and repository info
//! - pull request creation (callers gate this on `github_auto_pr`)

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// GitHub API base URL
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// User-Agent header required by GitHub API
const USER_AGENT: &str = "brn-cli";

const API_VERSION: &str = "2022-11-28";

const SERVICE: &str = "GitHub";

/// Repository as returned by the list and get endpoints (only fields we use).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub full_name: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub clone_url: Option<String>,
    #[serde(default)]
    pub ssh_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRef {
    #[serde(rename = "ref")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubUser {
    pub login: String,
}

/// Pull request (only fields we care about).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub draft: bool,
    pub html_url: String,
    #[serde(default)]
    pub head: Option<BranchRef>,
    #[serde(default)]
    pub base: Option<BranchRef>,
    #[serde(default)]
    pub user: Option<GitHubUser>,
}

/// Body of POST /repos/{owner}/{repo}/pulls.
#[derive(Debug, Clone, Serialize)]
pub struct NewPullRequest<'a> {
    pub title: &'a str,
    pub head: &'a str,
    pub base: &'a str,
    pub body: &'a str,
}

#[derive(Debug, Deserialize)]
struct GitHubErrorBody {
    message: Option<String>,
}

/// Blocking GitHub client bound to one token.
pub struct GitHubClient {
    agent: ureq::Agent,
    base_url: String,
    token: String,
}

impl GitHubClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, GITHUB_API_BASE)
    }

    /// Create a client against a different API root (GitHub Enterprise).
    pub fn with_base_url(token: impl Into<String>, base_url: &str) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout(Duration::from_secs(30))
                .build(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// List repositories.
    ///
    /// With an owner, tries the org endpoint first and falls back to the
    /// user endpoint when the org has no repos or does not exist. Without an
    /// owner, lists the authenticated user's repositories.
    pub fn list_repos(&self, owner: Option<&str>) -> Result<Vec<Repository>> {
        let Some(owner) = owner else {
            return self.get("/user/repos", &[("per_page", "100")]);
        };

        let org_repos = self.get::<Vec<Repository>>(
            &format!("/orgs/{}/repos", owner),
            &[("per_page", "100")],
        );
        match org_repos {
            Ok(repos) if !repos.is_empty() => Ok(repos),
            Ok(_) | Err(Error::Api { status: 404, .. }) => {
                tracing::debug!(owner, "no org repos, trying user endpoint");
                self.get(&format!("/users/{}/repos", owner), &[("per_page", "100")])
            }
            Err(e) => Err(e),
        }
    }

    /// List pull requests of `owner/repo` in `state` (open, closed, all).
    pub fn list_pull_requests(&self, repo: &str, state: &str) -> Result<Vec<PullRequest>> {
        self.get(
            &format!("/repos/{}/pulls", repo),
            &[("state", state), ("per_page", "30")],
        )
    }

    pub fn get_repo(&self, repo: &str) -> Result<Repository> {
        self.get(&format!("/repos/{}", repo), &[])
    }

    pub fn create_pull_request(&self, repo: &str, pr: &NewPullRequest<'_>) -> Result<PullRequest> {
        let url = format!("{}/repos/{}/pulls", self.base_url, repo);
        tracing::info!(repo, head = pr.head, base = pr.base, "creating pull request");
        let response = self
            .request("POST", &url)
            .send_json(pr)
            .map_err(api_error)?;
        parse(response)
    }

    fn get<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!(%url, "GET");
        let mut request = self.request("GET", &url);
        for (key, value) in query {
            request = request.query(key, value);
        }
        let response = request.call().map_err(api_error)?;
        parse(response)
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        self.agent
            .request(method, url)
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Accept", "application/vnd.github+json")
            .set("User-Agent", USER_AGENT)
            .set("X-GitHub-Api-Version", API_VERSION)
    }
}

fn parse<T: DeserializeOwned>(response: ureq::Response) -> Result<T> {
    response
        .into_json()
        .map_err(|e| Error::Http(format!("Failed to parse GitHub response: {}", e)))
}

fn api_error(err: ureq::Error) -> Error {
    match err {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            let message = serde_json::from_str::<GitHubErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or(body);
            Error::Api {
                service: SERVICE,
                status,
                message,
            }
        }
        other => Error::Http(other.to_string()),
    }
}
