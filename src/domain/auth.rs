use crate::domain::error::DomainError;

/// Kiosk credentials. Any non-empty pair is accepted; there is no user
/// store behind the kiosk yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Result<Self, DomainError> {
        let username = username.trim();
        if username.is_empty() || password.trim().is_empty() {
            return Err(DomainError::MissingCredentials);
        }

        Ok(Self {
            username: username.to_string(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}
