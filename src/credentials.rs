use crate::config::Backend;
use thiserror::Error;

pub const BEARER_TOKEN_VAR: &str = "TWITTER_BEARER_TOKEN";
pub const USER_TOKEN_VAR: &str = "TWITTER_USER_ACCESS_TOKEN";
pub const BIRD_CT0_VAR: &str = "CT0";
pub const BIRD_AUTH_TOKEN_VAR: &str = "AUTH_TOKEN";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Api {
        bearer_token: String,
        user_token: Option<String>,
    },
    /// `bird` reads its cookies from the environment itself.
    Bird,
}

/// Every variable that was required but unset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing credentials!\nSet these environment variables:\n{}", indented(.vars))]
pub struct MissingCredentials {
    pub vars: Vec<&'static str>,
}

fn indented(vars: &[&'static str]) -> String {
    vars.iter()
        .map(|var| format!("  {}", var))
        .collect::<Vec<_>>()
        .join("\n")
}

impl Credentials {
    pub fn from_env(backend: Backend, needs_write: bool) -> Result<Self, MissingCredentials> {
        Self::resolve(backend, needs_write, |name| std::env::var(name).ok())
    }

    /// `needs_write` is true for modes that post replies.
    pub fn resolve(
        backend: Backend,
        needs_write: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, MissingCredentials> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        match backend {
            Backend::Api => {
                let bearer_token = get(BEARER_TOKEN_VAR);
                let user_token = get(USER_TOKEN_VAR);

                let mut vars = Vec::new();
                if bearer_token.is_none() {
                    vars.push(BEARER_TOKEN_VAR);
                }
                if needs_write && user_token.is_none() {
                    vars.push(USER_TOKEN_VAR);
                }

                match bearer_token {
                    Some(bearer_token) if vars.is_empty() => Ok(Credentials::Api {
                        bearer_token,
                        user_token,
                    }),
                    _ => Err(MissingCredentials { vars }),
                }
            }
            Backend::Bird => {
                let vars: Vec<&'static str> = [BIRD_CT0_VAR, BIRD_AUTH_TOKEN_VAR]
                    .into_iter()
                    .filter(|v| get(*v).is_none())
                    .collect();
                if vars.is_empty() {
                    Ok(Credentials::Bird)
                } else {
                    Err(MissingCredentials { vars })
                }
            }
        }
    }
}
