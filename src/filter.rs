use crate::ledger::ReplyLedger;
use crate::twitter::Post;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    NegativeKeyword(String),
    AlreadyReplied,
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

/// Rejects posts mentioning any negative keyword or already in the ledger.
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    negative: Vec<String>,
}

impl KeywordFilter {
    pub fn new<I, S>(negative: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            negative: negative
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn negative_match(&self, text: &str) -> Option<&str> {
        let text = text.to_lowercase();
        self.negative
            .iter()
            .find(|k| text.contains(k.as_str()))
            .map(String::as_str)
    }

    pub fn check(&self, post: &Post, ledger: &ReplyLedger) -> Verdict {
        if let Some(keyword) = self.negative_match(&post.text) {
            return Verdict::NegativeKeyword(keyword.to_string());
        }
        if ledger.contains(&post.id) {
            return Verdict::AlreadyReplied;
        }
        Verdict::Accept
    }
}
