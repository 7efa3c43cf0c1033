//! Authenticated HTTP session with the Elasticpath API.
//!
//! Tokens come from `POST /oauth/access_token` and are cached until the
//! `expires` timestamp the API hands back. A 401 on any call drops the cached
//! token and the call is sent once more with a fresh one.

use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use url::Url;

use super::error::{self, CommerceError};
use super::models::{Envelope, TokenResponse};
use crate::core::config::{self, ElasticpathSettings};

/// Seconds shaved off the token lifetime so a request never races the expiry.
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 30;

struct AccessToken {
    value: SecretString,
    expires_at: i64,
}

impl AccessToken {
    fn is_fresh(&self, now: i64) -> bool {
        now < self.expires_at - TOKEN_EXPIRY_MARGIN_SECS
    }
}

/// Client for the Elasticpath (Moltin) v2 REST API.
///
/// Resource operations are split across `products.rs`, `carts.rs`,
/// `files.rs`, `customers.rs` and `flows.rs`.
pub struct ElasticpathClient {
    http: reqwest::Client,
    base_url: Url,
    client_id: String,
    client_secret: Option<SecretString>,
    token: RwLock<Option<AccessToken>>,
}

impl ElasticpathClient {
    /// Creates a client from startup settings with the default HTTP timeout.
    pub fn new(settings: &ElasticpathSettings) -> Result<Self, CommerceError> {
        let http = reqwest::Client::builder().timeout(config::network::timeout()).build()?;
        Ok(Self::with_http_client(
            http,
            settings.api_url.clone(),
            settings.client_id.clone(),
            settings
                .client_secret
                .as_ref()
                .map(|secret| SecretString::from(secret.expose_secret().to_string())),
        ))
    }

    /// Creates a client around an existing `reqwest::Client`.
    pub fn with_http_client(
        http: reqwest::Client,
        base_url: Url,
        client_id: String,
        client_secret: Option<SecretString>,
    ) -> Self {
        Self {
            http,
            base_url,
            client_id,
            client_secret,
            token: RwLock::new(None),
        }
    }

    /// Builds an API URL from path segments. Segments are percent-encoded,
    /// so ids coming from chat input cannot escape their path position.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, CommerceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CommerceError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Returns a valid bearer token, authorizing if needed.
    async fn access_token(&self) -> Result<String, CommerceError> {
        let now = chrono::Utc::now().timestamp();
        if let Some(token) = self.token.read().await.as_ref() {
            if token.is_fresh(now) {
                return Ok(token.value.expose_secret().to_string());
            }
        }

        let mut guard = self.token.write().await;
        // Another request may have refreshed the token while we waited.
        if let Some(token) = guard.as_ref() {
            if token.is_fresh(now) {
                return Ok(token.value.expose_secret().to_string());
            }
        }

        let fresh = self.authorize().await?;
        let value = fresh.value.expose_secret().to_string();
        *guard = Some(fresh);
        Ok(value)
    }

    async fn authorize(&self) -> Result<AccessToken, CommerceError> {
        let mut form = vec![("client_id", self.client_id.as_str())];
        match self.client_secret {
            Some(ref secret) => {
                form.push(("client_secret", secret.expose_secret()));
                form.push(("grant_type", "client_credentials"));
            }
            None => form.push(("grant_type", "implicit")),
        }

        log::info!("Authorizing at Elasticpath ({})", form[form.len() - 1].1);
        let response = self
            .http
            .post(self.endpoint(&["oauth", "access_token"])?)
            .form(&form)
            .send()
            .await?;
        let body = Self::checked_body(response).await?;
        let token: TokenResponse = serde_json::from_str(&body)?;

        Ok(AccessToken {
            value: SecretString::from(token.access_token),
            expires_at: token.expires,
        })
    }

    /// Sends an authorized request and rejects non-success statuses.
    ///
    /// On a 401 the token is dropped and the request is retried once with a
    /// fresh one. Streaming bodies (multipart uploads) cannot be replayed, so
    /// their 401 is returned as is and only the next call re-authorizes.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<String, CommerceError> {
        let replay = request.try_clone();
        let token = self.access_token().await?;
        let response = request.bearer_auth(token).send().await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::checked_body(response).await;
        }

        self.token.write().await.take();
        match replay {
            Some(request) => {
                log::warn!("Elasticpath rejected the access token, authorizing again");
                let token = self.access_token().await?;
                Self::checked_body(request.bearer_auth(token).send().await?).await
            }
            None => {
                log::warn!("Elasticpath rejected the access token, will re-authorize on next request");
                Self::checked_body(response).await
            }
        }
    }

    async fn checked_body(response: Response) -> Result<String, CommerceError> {
        let status = response.status();
        let url = response.url().clone();
        let body = response.text().await?;

        if status.is_success() {
            Ok(body)
        } else {
            log::error!("Elasticpath {} returned {}: {}", url.path(), status, body);
            Err(error::from_status(status, &body))
        }
    }

    pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T, CommerceError> {
        let envelope: Envelope<T> = serde_json::from_str(body)?;
        Ok(envelope.data)
    }

    pub(crate) async fn get_data<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, CommerceError> {
        let body = self.send(self.http.get(url).query(query)).await?;
        Self::decode(&body)
    }

    pub(crate) async fn post_data<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: Url,
        payload: &B,
    ) -> Result<T, CommerceError> {
        let body = self.send(self.http.post(url).json(payload)).await?;
        Self::decode(&body)
    }

    pub(crate) async fn post_ignore<B: Serialize + ?Sized>(&self, url: Url, payload: &B) -> Result<(), CommerceError> {
        self.send(self.http.post(url).json(payload)).await?;
        Ok(())
    }

    pub(crate) async fn delete(&self, url: Url) -> Result<(), CommerceError> {
        self.send(self.http.delete(url)).await?;
        Ok(())
    }
}
