use super::{Author, Post};

/// Parse `bird search` output into posts.
/// Expected format:
/// @username: Post text
/// URL: https://twitter.com/username/status/123
/// ---
///
/// Entries without a status URL are dropped since they cannot be replied to.
pub fn parse_search_results(output: &str) -> Vec<Post> {
    let mut posts = Vec::new();
    let mut current: Option<Entry> = None;

    for line in output.lines() {
        let line = line.trim();

        if line.starts_with('@') {
            finish(current.take(), &mut posts);
            if let Some((author, text)) = line.split_once(':') {
                current = Some(Entry {
                    author: author.trim_start_matches('@').trim().to_string(),
                    text: text.trim().to_string(),
                    url: String::new(),
                });
            }
        } else if line.starts_with("URL:") || line.starts_with("http") {
            if let Some(entry) = current.as_mut() {
                entry.url = line.trim_start_matches("URL:").trim().to_string();
            }
        } else if line == "---" || line.is_empty() {
            finish(current.take(), &mut posts);
        } else if let Some(entry) = current.as_mut() {
            // Continuation of a multi-line post
            if !entry.text.is_empty() {
                entry.text.push(' ');
            }
            entry.text.push_str(line);
        }
    }

    finish(current, &mut posts);
    posts
}

struct Entry {
    author: String,
    text: String,
    url: String,
}

fn finish(entry: Option<Entry>, posts: &mut Vec<Post>) {
    let Some(entry) = entry else {
        return;
    };
    let Some(id) = status_id(&entry.url) else {
        return;
    };

    posts.push(Post {
        id,
        text: entry.text,
        author_id: None,
        author: Some(Author {
            id: entry.author.clone(),
            username: entry.author,
            followers: 0,
        }),
        engagement: None,
    });
}

/// Extract the numeric post id from a `.../status/<id>` URL.
pub fn status_id(url: &str) -> Option<String> {
    let after = url.split("/status/").nth(1)?;
    let id: String = after.chars().take_while(|c| c.is_ascii_digit()).collect();
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}
