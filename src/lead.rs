use crate::twitter::Post;
use std::collections::HashSet;

const SNIPPET_CHARS: usize = 100;

/// A candidate post surfaced in find mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lead {
    pub post_id: String,
    pub username: Option<String>,
    pub followers: u64,
    pub text: String,
    pub url: Option<String>,
}

impl From<Post> for Lead {
    fn from(post: Post) -> Self {
        let url = post.url();
        let followers = post.followers();
        Self {
            post_id: post.id,
            username: post.author.map(|a| a.username),
            followers,
            text: post.text,
            url,
        }
    }
}

impl Lead {
    pub fn handle(&self) -> &str {
        self.username.as_deref().unwrap_or("unknown")
    }

    pub fn snippet(&self) -> String {
        snippet(&self.text, SNIPPET_CHARS)
    }
}

/// First `max` characters followed by an ellipsis when truncated.
pub fn snippet(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max).collect();
        format!("{}...", cut.trim_end())
    }
}

/// Drop repeated post ids (keeping the first) and sort by follower count
/// descending.
pub fn rank(leads: Vec<Lead>) -> Vec<Lead> {
    let mut seen = HashSet::new();
    let mut unique: Vec<Lead> = leads
        .into_iter()
        .filter(|lead| seen.insert(lead.post_id.clone()))
        .collect();

    // Stable, so equal follower counts keep search order
    unique.sort_by(|a, b| b.followers.cmp(&a.followers));
    unique
}
