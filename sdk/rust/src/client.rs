use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub partition: String,
    pub session: String,
    #[serde(default)]
    pub resources: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Status {
    pub mode: String,
    pub version: String,
    pub timeout_secs: u64,
    pub resource_plugins: Vec<String>,
    pub request_triggers: Vec<String>,
    pub restore_id: Option<String>,
    pub sessions: Vec<Session>,
}

#[derive(Debug, Serialize)]
pub struct CreateSession {
    pub partition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,
    pub resources: String,
}

impl CreateSession {
    pub fn new(partition: &str) -> Self {
        Self {
            partition: partition.to_string(),
            plugin: None,
            resources: String::new(),
        }
    }

    pub fn with_plugin(mut self, plugin: &str, resources: &str) -> Self {
        self.plugin = Some(plugin.to_string());
        self.resources = resources.to_string();
        self
    }
}

pub struct ControlClient {
    client: Client,
    base_url: String,
}

impl ControlClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .no_proxy()
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// True when the controller answers its health probe.
    pub async fn health(&self) -> Result<bool, reqwest::Error> {
        let resp = self.client.get(format!("{}/health", self.base_url)).send().await?;
        Ok(resp.status().is_success())
    }

    pub async fn status(&self) -> Result<Status, Box<dyn std::error::Error>> {
        let resp = self.client.get(format!("{}/status", self.base_url)).send().await?;
        Self::decode(resp).await
    }

    pub async fn list_sessions(&self) -> Result<Vec<Session>, Box<dyn std::error::Error>> {
        let resp = self.client.get(format!("{}/sessions", self.base_url)).send().await?;
        Self::decode(resp).await
    }

    pub async fn create_session(&self, req: &CreateSession) -> Result<Session, Box<dyn std::error::Error>> {
        let resp = self
            .client
            .post(format!("{}/sessions", self.base_url))
            .json(req)
            .send()
            .await?;
        Self::decode(resp).await
    }

    /// Returns `None` when no session exists for `partition`.
    pub async fn delete_session(&self, partition: &str) -> Result<Option<Session>, Box<dyn std::error::Error>> {
        let resp = self.client.delete(self.session_url(partition)?).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::decode(resp).await.map(Some)
    }

    /// `<base>/sessions/<partition>` with the partition encoded as one path segment.
    fn session_url(&self, partition: &str) -> Result<Url, Box<dyn std::error::Error>> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| format!("{} cannot be used as a base URL", self.base_url))?
            .pop_if_empty()
            .extend(["sessions", partition]);
        Ok(url)
    }

    async fn decode<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T, Box<dyn std::error::Error>> {
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(format!("Control server returned error status {}: {}", status, text).into());
        }

        Ok(serde_json::from_str::<T>(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_url_encodes_partition() {
        let client = ControlClient::new("http://127.0.0.1:50051/");
        let url = client.session_url("rack/1?x").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:50051/sessions/rack%2F1%3Fx");

        let client = ControlClient::new("http://127.0.0.1:50051/api");
        let url = client.session_url("p1").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:50051/api/sessions/p1");
    }
}
