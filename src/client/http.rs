use log::debug;
use reqwest::{Response, StatusCode};
use serde_json::json;

use crate::client::config::ClientConfig;
use crate::core::models::{OutgoingMessage, Space};
use crate::core::ports::api::{CollaborationApi, DeleteOutcome};
use crate::error::{Error, ValidationErrors};

/// HTTP adapter for the collaboration service. Poll operations carry no
/// per-request timeout: the UI waits for resolution or rejection and the
/// user retries manually.
#[derive(Debug, Clone)]
pub struct HttpCollaborationApi {
    http: reqwest::Client,
    config: ClientConfig,
}

impl HttpCollaborationApi {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn check(response: Response) -> Result<Response, Error> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(status.as_u16(), &body))
    }
}

/// A 422 with a parseable `{"errors": {...}}` body becomes a validation
/// error whose field messages are shown verbatim; everything else is a
/// generic service failure.
fn classify_failure(status: u16, body: &str) -> Error {
    if status == StatusCode::UNPROCESSABLE_ENTITY.as_u16() {
        if let Ok(errors) = serde_json::from_str::<ValidationErrors>(body) {
            return Error::Validation(errors);
        }
    }
    Error::Api {
        status,
        body: body.to_string(),
    }
}

impl CollaborationApi for HttpCollaborationApi {
    async fn vote_on_poll(&self, space_id: &str, poll_id: &str, option_ids: &[String]) -> Result<(), Error> {
        debug!("POST votes for poll {} in space {}", poll_id, space_id);
        let response = self
            .http
            .post(self.url(&format!("spaces/{}/polls/{}/votes", space_id, poll_id)))
            .bearer_auth(&self.config.token)
            .json(&json!({ "option_ids": option_ids }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn close_poll(&self, space_id: &str, poll_id: &str) -> Result<(), Error> {
        debug!("POST close for poll {} in space {}", poll_id, space_id);
        let response = self
            .http
            .post(self.url(&format!("spaces/{}/polls/{}/close", space_id, poll_id)))
            .bearer_auth(&self.config.token)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete_poll(&self, space_id: &str, poll_id: &str) -> Result<DeleteOutcome, Error> {
        debug!("DELETE poll {} in space {}", poll_id, space_id);
        let response = self
            .http
            .delete(self.url(&format!("spaces/{}/polls/{}", space_id, poll_id)))
            .bearer_auth(&self.config.token)
            .send()
            .await?;
        let outcome = Self::check(response).await?.json().await?;
        Ok(outcome)
    }

    async fn forward_poll(&self, poll_id: &str, target_space_ids: &[String]) -> Result<(), Error> {
        debug!("POST forward for poll {} to {} space(s)", poll_id, target_space_ids.len());
        let response = self
            .http
            .post(self.url(&format!("polls/{}/forward", poll_id)))
            .bearer_auth(&self.config.token)
            .json(&json!({ "target_space_ids": target_space_ids }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn send_message(&self, space_id: &str, message: &OutgoingMessage) -> Result<(), Error> {
        debug!("POST message to space {}", space_id);
        let response = self
            .http
            .post(self.url(&format!("spaces/{}/messages", space_id)))
            .bearer_auth(&self.config.token)
            .json(message)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn fetch_user_spaces(&self, user_id: &str) -> Result<Vec<Space>, Error> {
        debug!("GET spaces for user {}", user_id);
        let response = self
            .http
            .get(self.url(&format!("users/{}/spaces", user_id)))
            .bearer_auth(&self.config.token)
            .send()
            .await?;
        let spaces = Self::check(response).await?.json().await?;
        Ok(spaces)
    }
}
