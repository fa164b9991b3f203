use super::authenticator::{AuthenticationError, Authenticator};
use async_trait::async_trait;
use dashmap::DashMap;

/// An [`Authenticator`] backed by a concurrent in-memory map.
///
/// Passwords are stored as given; hashing them first is the concern of
/// whatever populates the map. Lookups from many sessions at once are fine,
/// as are `add_user`/`remove_user` calls while the server is running.
///
/// ```rust
/// use sandftp::auth::InMemoryAuthenticator;
///
/// let users = InMemoryAuthenticator::new();
/// users.add_user("alice", "correct-horse");
/// users.remove_user("alice");
/// ```
#[derive(Debug, Default)]
pub struct InMemoryAuthenticator {
    users: DashMap<String, String>,
}

impl InMemoryAuthenticator {
    /// Creates an authenticator with no users.
    pub fn new() -> InMemoryAuthenticator {
        InMemoryAuthenticator { users: DashMap::new() }
    }

    /// Adds a user or replaces the password of an existing one.
    pub fn add_user<U: Into<String>, P: Into<String>>(&self, username: U, password: P) {
        self.users.insert(username.into(), password.into());
    }

    /// Removes a user. Removing an unknown user is a no-op.
    pub fn remove_user(&self, username: &str) {
        self.users.remove(username);
    }
}

#[async_trait]
impl Authenticator for InMemoryAuthenticator {
    async fn authenticate(&self, username: &str, password: &str) -> Result<(), AuthenticationError> {
        match self.users.get(username) {
            Some(stored) if stored.value() == password => Ok(()),
            _ => Err(AuthenticationError::BadCredentials),
        }
    }
}
