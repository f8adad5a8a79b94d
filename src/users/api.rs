use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};

use super::models::{SavedUser, UserPayload, UserRecord};

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Http { status: StatusCode, body: String },

    #[error("JSON parsing error: {0}")]
    Decode(String),
}

/// The four calls the user manager makes against the remote collection
#[async_trait]
pub trait UserApi: Send + Sync {
    async fn list(&self) -> Result<Vec<UserRecord>, ApiError>;

    async fn create(&self, payload: &UserPayload) -> Result<SavedUser, ApiError>;

    async fn update(&self, id: u64, payload: &UserPayload) -> Result<SavedUser, ApiError>;

    async fn delete(&self, id: u64) -> Result<(), ApiError>;
}

/// `UserApi` backed by a REST collection such as
/// `https://jsonplaceholder.typicode.com/users`
#[derive(Debug, Clone)]
pub struct HttpUserApi {
    client: Client,
    base_url: String,
}

impl HttpUserApi {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn item_url(&self, id: u64) -> String {
        format!("{}/{}", self.base_url, id)
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(ApiError::Http { status, body })
}

async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let response = check_status(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl UserApi for HttpUserApi {
    async fn list(&self) -> Result<Vec<UserRecord>, ApiError> {
        let response = self
            .client
            .get(&self.base_url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        read_json(response).await
    }

    async fn create(&self, payload: &UserPayload) -> Result<SavedUser, ApiError> {
        let response = self
            .client
            .post(&self.base_url)
            .header("Accept", "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        read_json(response).await
    }

    async fn update(&self, id: u64, payload: &UserPayload) -> Result<SavedUser, ApiError> {
        let response = self
            .client
            .put(self.item_url(id))
            .header("Accept", "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        read_json(response).await
    }

    async fn delete(&self, id: u64) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.item_url(id))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        check_status(response).await.map(|_| ())
    }
}
