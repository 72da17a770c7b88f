//! HTTP transport for the post service.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::Instrument;
use uuid::Uuid;

use super::{ApiResponse, PostsApi};
use crate::auth::{auth_headers, REQUEST_ID_HEADER};
use crate::config::Config;
use crate::errors::{ClientError, ErrorResponse};
use crate::models::{CreatePostRequest, Post, PostWithAuthor};

const POSTS_PATH: &str = "/api/posts";

/// [`PostsApi`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpPostsApi {
    client: Client,
    base_url: String,
}

impl HttpPostsApi {
    /// Build a client with the configured timeout and session token.
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let client = Client::builder()
            .default_headers(auth_headers(config.session_token.as_deref())?)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self::with_client(client, &config.api_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and unwrap the success envelope.
    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let request_id = Uuid::new_v4();
        let span = tracing::debug_span!("post_api", %request_id);

        async move {
            let response = request
                .header(REQUEST_ID_HEADER, request_id.to_string())
                .send()
                .await?;
            tracing::debug!("Response status {}", response.status());
            decode(response).await
        }
        .instrument(span)
        .await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.bytes().await?;

    if status.is_success() {
        let envelope: ApiResponse<T> = serde_json::from_slice(&body)?;
        return Ok(envelope.data);
    }

    let envelope = serde_json::from_slice::<ErrorResponse>(&body).ok();
    let err = ClientError::from_response(status.as_u16(), envelope);
    tracing::warn!("Post service rejected request: {}", err);
    Err(err)
}

#[async_trait]
impl PostsApi for HttpPostsApi {
    async fn list_posts(&self) -> Result<Vec<PostWithAuthor>, ClientError> {
        self.call(self.client.get(self.url(POSTS_PATH))).await
    }

    async fn create_post(&self, request: CreatePostRequest) -> Result<Post, ClientError> {
        self.call(self.client.post(self.url(POSTS_PATH)).json(&request))
            .await
    }
}
