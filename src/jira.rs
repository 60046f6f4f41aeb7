//! JIRA Cloud REST API (v3) interactions.
//!
//! Covers the ticket operations brn exposes. Comment and transition are
//! side effects; callers gate them on `jira_auto_comment` and
//! `jira_auto_transition` before calling.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::credentials::JiraConfig;
use crate::{Error, Result};

const SERVICE: &str = "JIRA";

/// Maximum number of issues returned by a search.
pub const MAX_RESULTS: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Named {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueFields {
    pub summary: String,
    pub status: Named,
    #[serde(default)]
    pub issuetype: Option<Named>,
    #[serde(default)]
    pub priority: Option<Named>,
    #[serde(default)]
    pub assignee: Option<Person>,
    #[serde(default)]
    pub reporter: Option<Person>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    /// Atlassian Document Format tree
    #[serde(default)]
    pub description: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub key: String,
    pub fields: IssueFields,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    issues: Vec<Issue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct TransitionsResponse {
    #[serde(default)]
    transitions: Vec<Transition>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JiraErrorBody {
    #[serde(default)]
    error_messages: Vec<String>,
}

/// Flatten an ADF node into plain text.
pub fn extract_text(node: &Value) -> String {
    match node {
        Value::Object(obj) => {
            if obj.get("type").and_then(Value::as_str) == Some("text") {
                if let Some(text) = obj.get("text").and_then(Value::as_str) {
                    return text.to_string();
                }
            }
            match obj.get("content") {
                Some(Value::Array(children)) => children
                    .iter()
                    .map(extract_text)
                    .collect::<Vec<_>>()
                    .join(" "),
                _ => String::new(),
            }
        }
        _ => String::new(),
    }
}

/// Build an ADF document holding one paragraph of `text`.
pub fn adf_paragraph(text: &str) -> Value {
    json!({
        "type": "doc",
        "version": 1,
        "content": [
            {
                "type": "paragraph",
                "content": [{"type": "text", "text": text}]
            }
        ]
    })
}

/// JQL for issues assigned to the caller, newest first.
pub fn assigned_jql(status: Option<&str>) -> String {
    match status {
        Some(status) => format!(
            "assignee = currentUser() AND status = \"{}\" ORDER BY updated DESC",
            status.replace('"', "\\\"")
        ),
        None => "assignee = currentUser() ORDER BY updated DESC".to_string(),
    }
}

/// Pick the transition whose name matches `target`, ignoring case.
pub fn find_transition<'t>(transitions: &'t [Transition], target: &str) -> Option<&'t Transition> {
    transitions
        .iter()
        .find(|t| t.name.to_lowercase() == target.to_lowercase())
}

/// Blocking JIRA client for one site and account.
pub struct JiraClient {
    agent: ureq::Agent,
    base_url: String,
    auth: String,
}

impl JiraClient {
    pub fn new(config: &JiraConfig) -> Self {
        let credentials = STANDARD.encode(format!("{}:{}", config.email, config.token));
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout(Duration::from_secs(30))
                .build(),
            base_url: config.url.clone(),
            auth: format!("Basic {}", credentials),
        }
    }

    /// Browser URL of a ticket.
    pub fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{}", self.base_url, key)
    }

    pub fn get_issue(&self, key: &str) -> Result<Issue> {
        self.get(&format!("/rest/api/3/issue/{}", key), &[])
    }

    /// Issues assigned to the caller, optionally filtered by status name.
    pub fn search_assigned(&self, status: Option<&str>) -> Result<Vec<Issue>> {
        let jql = assigned_jql(status);
        let max_results = MAX_RESULTS.to_string();
        let result: SearchResult = self.get(
            "/rest/api/3/search",
            &[("jql", jql.as_str()), ("maxResults", max_results.as_str())],
        )?;
        Ok(result.issues)
    }

    pub fn add_comment(&self, key: &str, text: &str) -> Result<()> {
        tracing::info!(ticket = key, "adding comment");
        self.post(
            &format!("/rest/api/3/issue/{}/comment", key),
            &json!({ "body": adf_paragraph(text) }),
        )
    }

    pub fn transitions(&self, key: &str) -> Result<Vec<Transition>> {
        let response: TransitionsResponse =
            self.get(&format!("/rest/api/3/issue/{}/transitions", key), &[])?;
        Ok(response.transitions)
    }

    /// Move `key` to the status named `target`.
    ///
    /// Fails with `InvalidInput` listing the available transitions when none
    /// matches.
    pub fn transition(&self, key: &str, target: &str) -> Result<Transition> {
        let transitions = self.transitions(key)?;
        let Some(transition) = find_transition(&transitions, target) else {
            let available: Vec<&str> = transitions.iter().map(|t| t.name.as_str()).collect();
            return Err(Error::InvalidInput(format!(
                "Transition '{}' not available for {}. Available: {}",
                target,
                key,
                available.join(", ")
            )));
        };
        tracing::info!(ticket = key, to = %transition.name, "transitioning ticket");
        self.post(
            &format!("/rest/api/3/issue/{}/transitions", key),
            &json!({ "transition": { "id": transition.id } }),
        )?;
        Ok(transition.clone())
    }

    fn get<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!(%url, "GET");
        let mut request = self.request("GET", &url);
        for (key, value) in query {
            request = request.query(key, value);
        }
        let response = request.call().map_err(api_error)?;
        response
            .into_json()
            .map_err(|e| Error::Http(format!("Failed to parse JIRA response: {}", e)))
    }

    /// POST a JSON body; the response body is ignored (JIRA often answers 204).
    fn post(&self, endpoint: &str, body: &Value) -> Result<()> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!(%url, "POST");
        self.request("POST", &url)
            .send_json(body)
            .map_err(api_error)?;
        Ok(())
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        self.agent
            .request(method, url)
            .set("Authorization", &self.auth)
            .set("Accept", "application/json")
    }
}

fn api_error(err: ureq::Error) -> Error {
    match err {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            let message = serde_json::from_str::<JiraErrorBody>(&body)
                .ok()
                .filter(|b| !b.error_messages.is_empty())
                .map(|b| b.error_messages.join("; "))
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
