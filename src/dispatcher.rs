use crate::ledger::ReplyLedger;
use crate::limiter::RateLimiter;
use crate::twitter::{Post, SocialClient};
use anyhow::{Context, Result};
use rand::seq::IndexedRandom;
use rand::Rng;

/// Handle used when the search did not resolve the post's author.
const FALLBACK_HANDLE: &str = "user";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent { reply_id: String },
    Failed(String),
}

impl DispatchOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, DispatchOutcome::Sent { .. })
    }
}

#[derive(Debug, Clone)]
pub struct ReplyDispatcher {
    templates: Vec<String>,
}

impl ReplyDispatcher {
    pub fn new(templates: Vec<String>) -> Self {
        Self { templates }
    }

    pub fn templates(&self) -> &[String] {
        &self.templates
    }

    /// Uniformly pick a template. Empty lists are rejected by config
    /// validation, so this only returns `None` for a hand-built dispatcher.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.templates.choose(rng).map(String::as_str)
    }

    pub fn compose<R: Rng + ?Sized>(&self, post: &Post, rng: &mut R) -> Option<String> {
        let template = self.pick(rng)?;
        let handle = post.username().unwrap_or(FALLBACK_HANDLE);
        Some(format!("@{} {}", handle, template))
    }

    /// Send one reply. On success the post id is recorded in the ledger and
    /// the daily counter advances; a platform failure changes nothing and is
    /// reported as [`DispatchOutcome::Failed`].
    ///
    /// The only error is a failed ledger write. The reply was sent and is
    /// counted, and the id stays in the in-memory ledger.
    pub async fn dispatch<C>(
        &self,
        client: &C,
        post: &Post,
        ledger: &mut ReplyLedger,
        limiter: &mut RateLimiter,
    ) -> Result<DispatchOutcome>
    where
        C: SocialClient + ?Sized,
    {
        let Some(text) = self.compose(post, &mut rand::rng()) else {
            return Ok(DispatchOutcome::Failed(
                "no reply templates configured".to_string(),
            ));
        };

        let reply_id = match client.reply(post, &text).await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(post_id = %post.id, error = %e, "Reply failed");
                return Ok(DispatchOutcome::Failed(e.to_string()));
            }
        };

        limiter.record();
        ledger
            .record(&post.id)
            .with_context(|| format!("recording reply to {}", post.id))?;

        tracing::info!(
            author = post.username().unwrap_or(FALLBACK_HANDLE),
            post_id = %post.id,
            reply_id = %reply_id,
            sent_today = limiter.sent_today(),
            ceiling = limiter.ceiling(),
            "Replied"
        );

        Ok(DispatchOutcome::Sent { reply_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::twitter::{Author, ClientError};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    struct StubClient {
        fail: bool,
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl SocialClient for StubClient {
        async fn search(
            &self,
            _query: &str,
            _max_results: u32,
        ) -> crate::twitter::Result<Vec<Post>> {
            Ok(Vec::new())
        }

        async fn reply(&self, post: &Post, text: &str) -> crate::twitter::Result<String> {
            if self.fail {
                return Err(ClientError::Api {
                    status: 403,
                    message: "duplicate content".to_string(),
                });
            }
            self.sent
                .lock()
                .unwrap()
                .push((post.id.clone(), text.to_string()));
            Ok("reply-1".to_string())
        }
    }

    fn post(username: Option<&str>) -> Post {
        Post {
            id: "500".to_string(),
            text: "turn article into thread?".to_string(),
            author_id: None,
            author: username.map(|u| Author {
                id: "1".to_string(),
                username: u.to_string(),
                followers: 10,
            }),
            engagement: None,
        }
    }

    fn limiter() -> RateLimiter {
        RateLimiter::new(3, Duration::ZERO, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap())
    }

    #[test]
    fn test_pick_covers_all_templates() {
        let dispatcher =
            ReplyDispatcher::new(vec!["a".to_string(), "b".to_string(), "c".to_string()]);
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(dispatcher.pick(&mut rng).unwrap().to_string());
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_compose_mentions_author() {
        let dispatcher = ReplyDispatcher::new(vec!["try it".to_string()]);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            dispatcher.compose(&post(Some("alice")), &mut rng),
            Some("@alice try it".to_string())
        );
        assert_eq!(
            dispatcher.compose(&post(None), &mut rng),
            Some("@user try it".to_string())
        );
    }

    #[test]
    fn test_empty_templates() {
        let dispatcher = ReplyDispatcher::new(Vec::new());
        assert_eq!(dispatcher.pick(&mut StdRng::seed_from_u64(1)), None);
    }

    #[tokio::test]
    async fn test_success_updates_ledger_and_counter() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ReplyLedger::load(dir.path().join("l.json")).unwrap();
        let mut limiter = limiter();
        let client = StubClient {
            fail: false,
            sent: Mutex::new(Vec::new()),
        };
        let dispatcher = ReplyDispatcher::new(vec!["hello".to_string()]);

        let outcome = dispatcher
            .dispatch(&client, &post(Some("bob")), &mut ledger, &mut limiter)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            DispatchOutcome::Sent {
                reply_id: "reply-1".to_string()
            }
        );
        assert!(ledger.contains("500"));
        assert_eq!(limiter.sent_today(), 1);
        assert_eq!(
            client.sent.lock().unwrap().as_slice(),
            &[("500".to_string(), "@bob hello".to_string())]
        );
    }

    #[tokio::test]
    async fn test_failure_leaves_state_untouched() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ReplyLedger::load(dir.path().join("l.json")).unwrap();
        let mut limiter = limiter();
        let client = StubClient {
            fail: true,
            sent: Mutex::new(Vec::new()),
        };
        let dispatcher = ReplyDispatcher::new(vec!["hello".to_string()]);

        let outcome = dispatcher
            .dispatch(&client, &post(Some("bob")), &mut ledger, &mut limiter)
            .await
            .unwrap();

        assert!(!outcome.is_sent());
        assert!(!ledger.contains("500"));
        assert_eq!(limiter.sent_today(), 0);
    }
}
