pub mod api;
pub mod bird;
pub mod error;
pub mod parser;

pub use api::XApiClient;
pub use bird::BirdClient;
pub use error::{ClientError, Result};

use crate::config::Config;
use crate::credentials::Credentials;
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: String,
    pub username: String,
    pub followers: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Engagement {
    pub likes: u64,
    pub replies: u64,
    pub reposts: u64,
    pub quotes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: String,
    pub text: String,
    pub author_id: Option<String>,
    /// Resolved from the search expansion; `None` when the platform did not
    /// return the author record.
    pub author: Option<Author>,
    pub engagement: Option<Engagement>,
}

impl Post {
    pub fn username(&self) -> Option<&str> {
        self.author.as_ref().map(|a| a.username.as_str())
    }

    pub fn followers(&self) -> u64 {
        self.author.as_ref().map(|a| a.followers).unwrap_or(0)
    }

    /// Canonical link to the post, only known once the author is resolved.
    pub fn url(&self) -> Option<String> {
        self.username().map(|u| status_url(u, &self.id))
    }
}

pub fn status_url(username: &str, post_id: &str) -> String {
    format!("https://twitter.com/{}/status/{}", username, post_id)
}

/// Thin binding over the platform's search and reply endpoints.
#[async_trait]
pub trait SocialClient: Send + Sync {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<Post>>;

    /// Posts `text` as a reply to `post` and returns the new post's id.
    async fn reply(&self, post: &Post, text: &str) -> Result<String>;
}

#[async_trait]
impl<T: SocialClient + ?Sized> SocialClient for Box<T> {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<Post>> {
        (**self).search(query, max_results).await
    }

    async fn reply(&self, post: &Post, text: &str) -> Result<String> {
        (**self).reply(post, text).await
    }
}

#[async_trait]
impl<T: SocialClient + ?Sized> SocialClient for Arc<T> {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<Post>> {
        (**self).search(query, max_results).await
    }

    async fn reply(&self, post: &Post, text: &str) -> Result<String> {
        (**self).reply(post, text).await
    }
}

/// Build the client for the configured backend.
pub fn client_for(config: &Config, credentials: Credentials) -> Box<dyn SocialClient> {
    match credentials {
        Credentials::Api {
            bearer_token,
            user_token,
        } => Box::new(
            XApiClient::new(config.api_base_url.clone(), bearer_token)
                .with_user_token(user_token)
                .with_wait_on_rate_limit(config.wait_on_rate_limit),
        ),
        Credentials::Bird => Box::new(BirdClient::default()),
    }
}
