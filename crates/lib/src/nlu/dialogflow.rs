//! Dialogflow v2 REST client: detectIntent against the pinned global endpoint.

use serde::{Deserialize, Serialize};

const DEFAULT_ENDPOINT: &str = "https://dialogflow.googleapis.com";

/// Language the agent is trained for; every query is tagged with it.
pub const LANGUAGE_CODE: &str = "ru";

#[derive(Debug, thiserror::Error)]
pub enum DialogflowError {
    #[error("dialogflow request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("dialogflow api error: {0}")]
    Api(String),
}

/// Session path scoping conversational state within the NLU service.
/// Same session id, same context; different ids are isolated.
pub fn session_path(project_id: &str, session_id: &str) -> String {
    format!("projects/{}/agent/sessions/{}", project_id, session_id)
}

/// Client for the Dialogflow detectIntent REST API.
#[derive(Clone)]
pub struct DialogflowClient {
    project_id: String,
    endpoint: String,
    access_token: Option<String>,
    client: reqwest::Client,
}

impl DialogflowClient {
    /// `endpoint` overrides the default https://dialogflow.googleapis.com (tests).
    /// `access_token` is attached as a bearer when present; without it the service
    /// rejects the call and the error surfaces to the caller.
    pub fn new(project_id: String, access_token: Option<String>, endpoint: Option<String>) -> Self {
        let endpoint = endpoint
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        Self {
            project_id,
            endpoint,
            access_token,
            client: reqwest::Client::new(),
        }
    }

    /// POST /v2/{session}:detectIntent; returns the agent's fulfillment text.
    /// May be empty when the agent matched no intent; that is the service's answer, not an error.
    pub async fn detect_intent(&self, text: &str, session_id: &str) -> Result<String, DialogflowError> {
        let session = session_path(&self.project_id, session_id);
        let url = format!("{}/v2/{}:detectIntent", self.endpoint, session);
        let body = DetectIntentRequest {
            query_input: QueryInput {
                text: TextInput {
                    text: text.to_string(),
                    language_code: LANGUAGE_CODE.to_string(),
                },
            },
        };
        let mut req = self.client.post(&url).json(&body);
        if let Some(ref token) = self.access_token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }
        let res = req.send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(DialogflowError::Api(format!("{} {}", status, body)));
        }
        let data: DetectIntentResponse = res.json().await?;
        Ok(data
            .query_result
            .map(|q| q.fulfillment_text)
            .unwrap_or_default())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DetectIntentRequest {
    query_input: QueryInput,
}

#[derive(Debug, Serialize)]
struct QueryInput {
    text: TextInput,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextInput {
    text: String,
    language_code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectIntentResponse {
    #[serde(default)]
    query_result: Option<QueryResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResult {
    #[serde(default)]
    fulfillment_text: String,
}
