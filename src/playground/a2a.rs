//! Agent messaging (A2A) client.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Duration;
use url::Url;

use super::error::PlaygroundError;
use super::jsonrpc::RpcTransport;

pub const AGENT_CARD_PATH: &str = ".well-known/agent.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub skills: Vec<AgentSkill>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSkill {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub context_id: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TaskStatus {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub message: Option<Value>,
}

/// `message/send` answers with either a task or a direct message.
#[derive(Debug, Clone, PartialEq)]
pub enum SendResult {
    Task(Task),
    Message(Value),
}

#[derive(Debug)]
pub struct A2aClient {
    transport: RpcTransport,
}

impl A2aClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, PlaygroundError> {
        Ok(Self {
            transport: RpcTransport::new(endpoint, timeout)?,
        })
    }

    /// `GET <endpoint>/.well-known/agent.json`.
    pub async fn agent_card(&self) -> Result<AgentCard, PlaygroundError> {
        let url = card_url(self.transport.endpoint())?;
        let transport = |source| PlaygroundError::Transport {
            url: url.to_string(),
            source,
        };
        let response = self
            .transport
            .http()
            .get(url.clone())
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        if !status.is_success() {
            return Err(PlaygroundError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|e| PlaygroundError::Malformed(e.to_string()))
    }

    /// Send a user text message.
    pub async fn send_message(&self, text: &str, context_id: Option<&str>) -> Result<SendResult, PlaygroundError> {
        let mut message = json!({
            "kind": "message",
            "role": "user",
            "messageId": uuid::Uuid::new_v4().to_string(),
            "parts": [{"kind": "text", "text": text}],
        });
        if let (Some(context), Some(obj)) = (context_id, message.as_object_mut()) {
            obj.insert("contextId".into(), json!(context));
        }

        let result = self
            .transport
            .call("message/send", Some(json!({"message": message})))
            .await?;
        if result.get("kind").and_then(Value::as_str) == Some("task") {
            let task = serde_json::from_value(result)
                .map_err(|e| PlaygroundError::Malformed(e.to_string()))?;
            return Ok(SendResult::Task(task));
        }
        Ok(SendResult::Message(result))
    }

    pub async fn get_task(&self, id: &str) -> Result<Task, PlaygroundError> {
        self.task_call("tasks/get", id).await
    }

    pub async fn cancel_task(&self, id: &str) -> Result<Task, PlaygroundError> {
        self.task_call("tasks/cancel", id).await
    }

    async fn task_call(&self, method: &str, id: &str) -> Result<Task, PlaygroundError> {
        let result = self.transport.call(method, Some(json!({"id": id}))).await?;
        serde_json::from_value(result).map_err(|e| PlaygroundError::Malformed(e.to_string()))
    }
}

fn card_url(endpoint: &Url) -> Result<Url, PlaygroundError> {
    let mut base = endpoint.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(AGENT_CARD_PATH)
        .map_err(|e| PlaygroundError::InvalidUrl(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_url_under_agent_path() {
        let endpoint = Url::parse("http://localhost:3000/a2a/agent").unwrap();
        assert_eq!(
            card_url(&endpoint).unwrap().as_str(),
            "http://localhost:3000/a2a/agent/.well-known/agent.json"
        );
    }

    #[test]
    fn test_task_parses_status() {
        let task: Task = serde_json::from_value(json!({
            "kind": "task",
            "id": "t-1",
            "contextId": "c-1",
            "status": {"state": "working"}
        }))
        .unwrap();
        assert_eq!(task.status.state, "working");
        assert_eq!(task.extra.get("kind"), Some(&json!("task")));
    }
}
