use crate::domain::ports::AdminPolicy;

/// Admin capability backed by a single shared token, supplied in the
/// `X-Admin-Token` header. With no token configured the admin surface is
/// closed entirely rather than open.
pub struct TokenAdminPolicy {
    token: Option<String>,
}

impl TokenAdminPolicy {
    pub fn new(token: Option<String>) -> Self {
        if token.is_none() {
            log::warn!("ADMIN_TOKEN is not set; the admin surface is disabled");
        }
        Self { token }
    }
}

impl AdminPolicy for TokenAdminPolicy {
    fn is_admin(&self, token: &str) -> bool {
        self.token.as_deref() == Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_token_is_admin() {
        let policy = TokenAdminPolicy::new(Some("s3cret".to_string()));
        assert!(policy.is_admin("s3cret"));
        assert!(!policy.is_admin("guess"));
        assert!(!policy.is_admin(""));
    }

    #[test]
    fn unconfigured_policy_denies_everyone() {
        let policy = TokenAdminPolicy::new(None);
        assert!(!policy.is_admin("anything"));
        assert!(!policy.is_admin(""));
    }
}
