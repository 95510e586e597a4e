use crate::config::Config;
use crate::dispatcher::{DispatchOutcome, ReplyDispatcher};
use crate::filter::{KeywordFilter, Verdict};
use crate::lead::{self, Lead};
use crate::ledger::ReplyLedger;
use crate::limiter::{Clock, LocalClock, RateLimiter};
use crate::twitter::SocialClient;
use anyhow::Result;
use std::future::Future;
use tracing::{debug, error, info, warn};

/// Outcome of a find-mode pass.
#[derive(Debug, Clone, Default)]
pub struct FindReport {
    /// Distinct accepted posts, before truncation to `find_top`.
    pub total_found: usize,
    /// Highest-follower leads first.
    pub leads: Vec<Lead>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub searches: usize,
    pub search_errors: usize,
    pub skipped: usize,
    pub replied: usize,
    pub failed: usize,
    pub hit_daily_limit: bool,
}

/// Owns the ledger, the daily counter and the platform client, and runs
/// the find and reply cycles over them.
pub struct LeadBot<C, K = LocalClock> {
    client: C,
    config: Config,
    filter: KeywordFilter,
    dispatcher: ReplyDispatcher,
    ledger: ReplyLedger,
    limiter: RateLimiter,
    clock: K,
}

impl<C: SocialClient> LeadBot<C, LocalClock> {
    pub fn new(client: C, config: Config, ledger: ReplyLedger) -> Self {
        Self::with_clock(client, config, ledger, LocalClock)
    }
}

impl<C: SocialClient, K: Clock> LeadBot<C, K> {
    pub fn with_clock(client: C, config: Config, ledger: ReplyLedger, clock: K) -> Self {
        let limiter = RateLimiter::new(
            config.max_replies_per_day,
            config.reply_delay(),
            clock.today(),
        );
        Self {
            filter: KeywordFilter::new(&config.skip_keywords),
            dispatcher: ReplyDispatcher::new(config.reply_templates()),
            client,
            config,
            ledger,
            limiter,
            clock,
        }
    }

    pub fn ledger(&self) -> &ReplyLedger {
        &self.ledger
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Search the first `find_keyword_limit` keywords and rank what passes
    /// the filter. Nothing is posted and the ledger is only read.
    pub async fn find_leads(&self) -> FindReport {
        let mut found = Vec::new();

        for (keyword, query) in self.config.queries().take(self.config.find_keyword_limit) {
            info!(keyword, "Searching");
            let posts = match self
                .client
                .search(&query, self.config.search_max_results)
                .await
            {
                Ok(posts) => posts,
                Err(e) => {
                    warn!(keyword, error = %e, "Search failed");
                    continue;
                }
            };

            for post in posts {
                match self.filter.check(&post, &self.ledger) {
                    Verdict::Accept => found.push(Lead::from(post)),
                    verdict => debug!(post_id = %post.id, ?verdict, "Skipping"),
                }
            }
        }

        let mut leads = lead::rank(found);
        let total_found = leads.len();
        leads.truncate(self.config.find_top);
        FindReport { total_found, leads }
    }

    /// One search-and-reply pass over every keyword, stopping early once the
    /// daily ceiling is hit. Search and reply failures are logged and
    /// skipped; only a failed ledger write is returned as an error.
    pub async fn run_once(&mut self) -> Result<CycleSummary> {
        let mut summary = CycleSummary::default();

        if self.limiter.roll_over(self.clock.today()) {
            info!("New day, reply counter reset");
        }
        if self.limiter.exhausted() {
            info!(ceiling = self.limiter.ceiling(), "Daily limit reached");
            summary.hit_daily_limit = true;
            return Ok(summary);
        }

        let queries: Vec<(String, String)> = self
            .config
            .queries()
            .map(|(keyword, query)| (keyword.to_string(), query))
            .collect();

        'keywords: for (keyword, query) in queries {
            if self.limiter.exhausted() {
                break;
            }

            info!(keyword = %keyword, "Searching");
            summary.searches += 1;
            let posts = match self
                .client
                .search(&query, self.config.search_max_results)
                .await
            {
                Ok(posts) => posts,
                Err(e) => {
                    warn!(keyword = %keyword, error = %e, "Search failed");
                    summary.search_errors += 1;
                    continue;
                }
            };

            if posts.is_empty() {
                debug!(keyword = %keyword, "No results");
                continue;
            }

            for post in posts {
                if self.limiter.exhausted() {
                    break 'keywords;
                }

                let verdict = self.filter.check(&post, &self.ledger);
                if !verdict.is_accept() {
                    debug!(post_id = %post.id, ?verdict, "Skipping");
                    summary.skipped += 1;
                    continue;
                }

                info!(
                    author = post.username().unwrap_or("unknown"),
                    post = %lead::snippet(&post.text, 100),
                    "Found candidate"
                );

                let outcome = self
                    .dispatcher
                    .dispatch(&self.client, &post, &mut self.ledger, &mut self.limiter)
                    .await?;

                match outcome {
                    DispatchOutcome::Sent { .. } => {
                        summary.replied += 1;
                        let delay = self.limiter.delay();
                        if !delay.is_zero() {
                            info!(secs = delay.as_secs(), "Waiting before next reply");
                            tokio::time::sleep(delay).await;
                        }
                    }
                    DispatchOutcome::Failed(_) => summary.failed += 1,
                }
            }
        }

        summary.hit_daily_limit = self.limiter.exhausted();
        Ok(summary)
    }

    /// Run cycles every `interval_minutes` until Ctrl-C.
    pub async fn run_continuous(&mut self) {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Could not listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run cycles until `shutdown` resolves. A failed cycle is retried after
    /// `error_backoff_secs` instead of the regular interval.
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!(
            interval_minutes = self.config.interval_minutes,
            max_per_day = self.config.max_replies_per_day,
            "Starting lead bot"
        );

        tokio::pin!(shutdown);
        loop {
            let pause = tokio::select! {
                result = self.run_once() => match result {
                    Ok(summary) => {
                        info!(
                            replied = summary.replied,
                            failed = summary.failed,
                            skipped = summary.skipped,
                            search_errors = summary.search_errors,
                            sent_today = self.limiter.sent_today(),
                            "Cycle complete"
                        );
                        self.config.interval()
                    }
                    Err(e) => {
                        let message = format!("{:#}", e);
                        error!(error = %message, "Cycle failed");
                        self.config.error_backoff()
                    }
                },
                _ = &mut shutdown => break,
            };

            info!(secs = pause.as_secs(), "Sleeping");
            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                _ = &mut shutdown => break,
            }
        }

        info!("Stopping bot");
    }
}
