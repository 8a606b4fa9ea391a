//! [`HubClient`] implementation over `reqwest`.

use std::future::Future;

use ipadha_app::ports::HubClient;
use ipadha_domain::entity::Entity;
use ipadha_domain::error::IpadhaError;
use ipadha_domain::id::EntityId;
use ipadha_domain::service::ServiceCall;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use url::Url;

use crate::config::HubRestConfig;
use crate::error::HubRestError;

/// `{hub}/api/` for a hub base URL, keeping any path prefix.
///
/// # Errors
///
/// Returns [`HubRestError::InvalidUrl`] when `hub_url` does not parse and
/// [`HubRestError::UnsupportedScheme`] unless it is `http` or `https`.
pub fn api_base_url(hub_url: &str) -> Result<Url, HubRestError> {
    let mut base = Url::parse(hub_url)?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(HubRestError::UnsupportedScheme(base.scheme().to_string()));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join("api/")?)
}

/// Hub client speaking the REST API.
#[derive(Debug, Clone)]
pub struct RestHubClient {
    http: Client,
    api_base: Url,
    token: String,
}

impl RestHubClient {
    /// Build a client for the configured hub.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL is invalid or the HTTP client cannot be
    /// built.
    pub fn new(config: &HubRestConfig) -> Result<Self, HubRestError> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(HubRestError::Client)?;
        Ok(Self {
            http,
            api_base: api_base_url(&config.url)?,
            token: config.token.clone(),
        })
    }

    #[must_use]
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    fn endpoint(&self, path: &str) -> Result<Url, HubRestError> {
        Ok(self.api_base.join(path)?)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.token)
    }

    async fn get_states(&self) -> Result<Vec<Entity>, HubRestError> {
        let url = self.endpoint("states")?;
        let response = self.authorized(self.http.get(url)).send().await?;
        let states = check_status(response)?.json().await?;
        Ok(states)
    }

    async fn get_state(&self, entity_id: &EntityId) -> Result<Option<Entity>, HubRestError> {
        let url = self.endpoint(&format!("states/{entity_id}"))?;
        let response = self.authorized(self.http.get(url)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let entity = check_status(response)?.json().await?;
        Ok(Some(entity))
    }

    async fn post_service(&self, call: &ServiceCall) -> Result<(), HubRestError> {
        let url = self.endpoint(&call.path())?;
        tracing::debug!(%url, entity_id = %call.entity_id, "calling hub service");
        let response = self
            .authorized(self.http.post(url))
            .json(&call.body())
            .send()
            .await?;
        check_status(response)?;
        Ok(())
    }
}

fn check_status(response: Response) -> Result<Response, HubRestError> {
    if response.status() == StatusCode::UNAUTHORIZED {
        return Err(HubRestError::Unauthorized);
    }
    Ok(response.error_for_status()?)
}

impl HubClient for RestHubClient {
    fn fetch_states(&self) -> impl Future<Output = Result<Vec<Entity>, IpadhaError>> + Send {
        async move { self.get_states().await.map_err(HubRestError::into_domain) }
    }

    fn fetch_state(
        &self,
        entity_id: &EntityId,
    ) -> impl Future<Output = Result<Option<Entity>, IpadhaError>> + Send {
        async move { self.get_state(entity_id).await.map_err(HubRestError::into_domain) }
    }

    fn call_service(
        &self,
        call: &ServiceCall,
    ) -> impl Future<Output = Result<(), IpadhaError>> + Send {
        async move { self.post_service(call).await.map_err(HubRestError::into_domain) }
    }
}
