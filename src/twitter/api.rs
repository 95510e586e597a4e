use super::{Author, ClientError, Engagement, Post, Result, SocialClient};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.twitter.com";

const TWEET_FIELDS: &str = "created_at,author_id,public_metrics";
const USER_FIELDS: &str = "username,public_metrics";

/// The recent-search endpoint rejects page sizes outside this range.
const MIN_PAGE: u32 = 10;
const MAX_PAGE: u32 = 100;

const MAX_RATE_LIMIT_WAIT: Duration = Duration::from_secs(15 * 60);
const UNKNOWN_RESET_WAIT: Duration = Duration::from_secs(60);

/// Client for the X (Twitter) API v2.
///
/// Searching uses the app-only bearer token; replying needs an OAuth 2.0
/// user-context access token.
pub struct XApiClient {
    base_url: String,
    bearer_token: String,
    user_token: Option<String>,
    wait_on_rate_limit: bool,
    client: reqwest::Client,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<ApiTweet>,
    #[serde(default)]
    includes: Includes,
}

#[derive(Debug, Default, Deserialize)]
struct Includes {
    #[serde(default)]
    users: Vec<ApiUser>,
}

#[derive(Debug, Deserialize)]
struct ApiTweet {
    id: String,
    text: String,
    author_id: Option<String>,
    public_metrics: Option<TweetMetrics>,
}

#[derive(Debug, Deserialize)]
struct TweetMetrics {
    #[serde(default)]
    like_count: u64,
    #[serde(default)]
    reply_count: u64,
    #[serde(default)]
    retweet_count: u64,
    #[serde(default)]
    quote_count: u64,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    id: String,
    username: String,
    public_metrics: Option<UserMetrics>,
}

#[derive(Debug, Deserialize)]
struct UserMetrics {
    #[serde(default)]
    followers_count: u64,
}

#[derive(Debug, Serialize)]
struct CreateTweet<'a> {
    text: &'a str,
    reply: InReplyTo<'a>,
}

#[derive(Debug, Serialize)]
struct InReplyTo<'a> {
    in_reply_to_tweet_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateTweetResponse {
    data: CreatedTweet,
}

#[derive(Debug, Deserialize)]
struct CreatedTweet {
    id: String,
}

impl XApiClient {
    pub fn new(base_url: impl Into<String>, bearer_token: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .user_agent(concat!("leadbot/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer_token,
            user_token: None,
            wait_on_rate_limit: true,
            client,
        }
    }

    pub fn with_user_token(mut self, token: Option<String>) -> Self {
        self.user_token = token;
        self
    }

    pub fn with_wait_on_rate_limit(mut self, wait: bool) -> Self {
        self.wait_on_rate_limit = wait;
        self
    }

    fn search_url(&self, query: &str, max_results: u32) -> String {
        format!(
            "{}/2/tweets/search/recent?query={}&max_results={}&tweet.fields={}&user.fields={}&expansions=author_id",
            self.base_url,
            urlencoding::encode(query),
            max_results.clamp(MIN_PAGE, MAX_PAGE),
            urlencoding::encode(TWEET_FIELDS),
            urlencoding::encode(USER_FIELDS),
        )
    }

    /// Sends the request, sleeping through a single 429 when configured to.
    async fn send(&self, build: impl Fn() -> RequestBuilder) -> Result<Response> {
        let response = build().send().await?;
        if response.status() != StatusCode::TOO_MANY_REQUESTS {
            return check_status(response).await;
        }

        let reset = rate_limit_reset(&response);
        if !self.wait_on_rate_limit {
            return Err(ClientError::RateLimited { reset });
        }

        let wait = rate_limit_wait(reset, chrono::Utc::now().timestamp());
        tracing::warn!(wait_secs = wait.as_secs(), "Rate limited, waiting for reset");
        tokio::time::sleep(wait).await;

        let response = build().send().await?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(ClientError::RateLimited {
                reset: rate_limit_reset(&response),
            });
        }
        check_status(response).await
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Api {
        status: status.as_u16(),
        message: body,
    })
}

fn rate_limit_reset(response: &Response) -> Option<i64> {
    response
        .headers()
        .get("x-rate-limit-reset")?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

/// Time to sleep until the window given by `x-rate-limit-reset` (epoch
/// seconds) reopens, with one second of slack.
fn rate_limit_wait(reset: Option<i64>, now: i64) -> Duration {
    match reset {
        Some(reset) => {
            let secs = (reset - now + 1).max(0) as u64;
            Duration::from_secs(secs).min(MAX_RATE_LIMIT_WAIT)
        }
        None => UNKNOWN_RESET_WAIT,
    }
}

/// Joins each tweet with its author from the `includes.users` expansion.
fn into_posts(response: SearchResponse) -> Vec<Post> {
    let users = response.includes.users;

    response
        .data
        .into_iter()
        .map(|tweet| {
            let author = tweet.author_id.as_deref().and_then(|author_id| {
                users.iter().find(|u| u.id == author_id).map(|u| Author {
                    id: u.id.clone(),
                    username: u.username.clone(),
                    followers: u
                        .public_metrics
                        .as_ref()
                        .map(|m| m.followers_count)
                        .unwrap_or(0),
                })
            });

            Post {
                id: tweet.id,
                text: tweet.text,
                author_id: tweet.author_id,
                author,
                engagement: tweet.public_metrics.map(|m| Engagement {
                    likes: m.like_count,
                    replies: m.reply_count,
                    reposts: m.retweet_count,
                    quotes: m.quote_count,
                }),
            }
        })
        .collect()
}

#[async_trait]
impl SocialClient for XApiClient {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<Post>> {
        let url = self.search_url(query, max_results);
        let response = self
            .send(|| self.client.get(&url).bearer_auth(&self.bearer_token))
            .await?;

        let body = response.text().await?;
        let parsed: SearchResponse = serde_json::from_str(&body)?;
        let posts = into_posts(parsed);
        tracing::debug!(query, count = posts.len(), "Search complete");
        Ok(posts)
    }

    async fn reply(&self, post: &Post, text: &str) -> Result<String> {
        let token = self.user_token.as_deref().ok_or_else(|| ClientError::Api {
            status: 401,
            message: "posting requires TWITTER_USER_ACCESS_TOKEN".to_string(),
        })?;

        let url = format!("{}/2/tweets", self.base_url);
        let payload = CreateTweet {
            text,
            reply: InReplyTo {
                in_reply_to_tweet_id: &post.id,
            },
        };

        let response = self
            .send(|| self.client.post(&url).bearer_auth(token).json(&payload))
            .await?;

        let created: CreateTweetResponse = response.json().await?;
        Ok(created.data.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn target(id: &str) -> Post {
        Post {
            id: id.to_string(),
            text: "how to repurpose content?".to_string(),
            author_id: None,
            author: None,
            engagement: None,
        }
    }

    #[test]
    fn test_rate_limit_wait_until_reset() {
        assert_eq!(rate_limit_wait(Some(1_000), 990), Duration::from_secs(11));
    }

    #[test]
    fn test_rate_limit_wait_reset_in_past() {
        assert_eq!(rate_limit_wait(Some(900), 1_000), Duration::ZERO);
    }

    #[test]
    fn test_rate_limit_wait_capped() {
        assert_eq!(rate_limit_wait(Some(100_000), 0), MAX_RATE_LIMIT_WAIT);
    }

    #[test]
    fn test_rate_limit_wait_unknown_reset() {
        assert_eq!(rate_limit_wait(None, 0), UNKNOWN_RESET_WAIT);
    }

    #[test]
    fn test_search_url_clamps_page_size() {
        let client = XApiClient::new("https://api.example.com/", "t".to_string());
        let url = client.search_url("thread writer -is:retweet", 5);
        assert!(url.starts_with("https://api.example.com/2/tweets/search/recent?"));
        assert!(url.contains("query=thread%20writer%20-is%3Aretweet"));
        assert!(url.contains("max_results=10"));
        assert!(url.contains("expansions=author_id"));
    }

    #[test]
    fn test_into_posts_joins_authors() {
        let response: SearchResponse = serde_json::from_value(json!({
            "data": [
                {"id": "1", "text": "a", "author_id": "u1",
                 "public_metrics": {"like_count": 3, "reply_count": 1, "retweet_count": 0, "quote_count": 0}},
                {"id": "2", "text": "b", "author_id": "missing"}
            ],
            "includes": {"users": [
                {"id": "u1", "username": "alice", "public_metrics": {"followers_count": 1200}}
            ]}
        }))
        .unwrap();

        let posts = into_posts(response);
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].username(), Some("alice"));
        assert_eq!(posts[0].followers(), 1200);
        assert_eq!(posts[0].engagement.map(|e| e.likes), Some(3));
        assert_eq!(posts[1].author, None);
        assert_eq!(posts[1].author_id.as_deref(), Some("missing"));
    }

    #[tokio::test]
    async fn test_search_sends_bearer_and_parses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2/tweets/search/recent"))
            .and(query_param("query", "thread writer lang:en"))
            .and(query_param("expansions", "author_id"))
            .and(header("authorization", "Bearer app-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": "10", "text": "need a thread writer", "author_id": "u9"}],
                "includes": {"users": [{"id": "u9", "username": "bob", "public_metrics": {"followers_count": 5}}]},
                "meta": {"result_count": 1}
            })))
            .mount(&server)
            .await;

        let client = XApiClient::new(server.uri(), "app-token".to_string());
        let posts = client.search("thread writer lang:en", 10).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, "10");
        assert_eq!(posts[0].username(), Some("bob"));
    }

    #[tokio::test]
    async fn test_search_without_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2/tweets/search/recent"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"meta": {"result_count": 0}})),
            )
            .mount(&server)
            .await;

        let client = XApiClient::new(server.uri(), "t".to_string());
        let posts = client.search("nothing", 10).await.unwrap();
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn test_search_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let client = XApiClient::new(server.uri(), "t".to_string());
        match client.search("q", 10).await {
            Err(ClientError::Api { status, message }) => {
                assert_eq!(status, 403);
                assert_eq!(message, "forbidden");
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rate_limited_without_waiting() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("x-rate-limit-reset", "1700000000"))
            .mount(&server)
            .await;

        let client = XApiClient::new(server.uri(), "t".to_string()).with_wait_on_rate_limit(false);
        match client.search("q", 10).await {
            Err(ClientError::RateLimited { reset }) => assert_eq!(reset, Some(1_700_000_000)),
            other => panic!("expected rate limit, got {:?}", other),
        }
    }

    // A reset already in the past makes the wait zero, so these run in real time
    #[tokio::test]
    async fn test_rate_limited_waits_then_retries_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("x-rate-limit-reset", "1"))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": "77", "text": "thread writer?", "author_id": "u1"}],
                "includes": {"users": [{"id": "u1", "username": "dana", "public_metrics": {"followers_count": 9}}]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = XApiClient::new(server.uri(), "t".to_string());
        let posts = client.search("q", 10).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, "77");
        server.verify().await;
    }

    #[tokio::test]
    async fn test_rate_limited_twice_gives_up() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("x-rate-limit-reset", "1"))
            .expect(2)
            .mount(&server)
            .await;

        let client = XApiClient::new(server.uri(), "t".to_string());
        match client.search("q", 10).await {
            Err(ClientError::RateLimited { reset }) => assert_eq!(reset, Some(1)),
            other => panic!("expected rate limit, got {:?}", other),
        }
        server.verify().await;
    }

    #[tokio::test]
    async fn test_reply_posts_in_reply_to() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .and(header("authorization", "Bearer user-token"))
            .and(body_partial_json(json!({
                "text": "@alice hi",
                "reply": {"in_reply_to_tweet_id": "77"}
            })))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"data": {"id": "78", "text": "@alice hi"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = XApiClient::new(server.uri(), "app".to_string())
            .with_user_token(Some("user-token".to_string()));
        let id = client.reply(&target("77"), "@alice hi").await.unwrap();
        assert_eq!(id, "78");
    }

    #[tokio::test]
    async fn test_reply_requires_user_token() {
        let client = XApiClient::new("http://127.0.0.1:9", "app".to_string());
        assert!(matches!(
            client.reply(&target("1"), "hi").await,
            Err(ClientError::Api { status: 401, .. })
        ));
    }
}
