use super::{parser, status_url, ClientError, Post, Result, SocialClient};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

/// Drives the `bird` CLI, which authenticates with the `CT0` and
/// `AUTH_TOKEN` browser cookies from the environment.
pub struct BirdClient {
    program: String,
}

impl Default for BirdClient {
    fn default() -> Self {
        Self::new("bird")
    }
}

impl BirdClient {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn execute(&self, args: &[&str]) -> Result<String> {
        let check = Command::new("which")
            .arg(&self.program)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        if !matches!(check, Ok(status) if status.success()) {
            return Err(ClientError::BirdMissing);
        }

        let output = Command::new(&self.program)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            Err(ClientError::Command(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ))
        }
    }
}

#[async_trait]
impl SocialClient for BirdClient {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<Post>> {
        let limit = max_results.to_string();
        let output = self.execute(&["search", query, "-n", &limit]).await?;
        Ok(parser::parse_search_results(&output))
    }

    async fn reply(&self, post: &Post, text: &str) -> Result<String> {
        let url = post
            .url()
            .unwrap_or_else(|| status_url("i/web", &post.id));
        let output = self.execute(&["reply", &url, text]).await?;
        Ok(parser::status_id(&output).unwrap_or_default())
    }
}
