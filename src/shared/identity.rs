use std::sync::RwLock;

/// Boundary to the authentication provider: the current user identifier,
/// or none. Absence of an identity is never an error.
pub trait IdentityProvider: Send + Sync {
    fn current_uid(&self) -> Option<String>;
}

/// Session-held identity, set at sign-in and cleared at sign-out.
#[derive(Debug, Default)]
pub struct AuthSession {
    uid: RwLock<Option<String>>,
}

impl AuthSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(uid: impl Into<String>) -> Self {
        Self {
            uid: RwLock::new(Some(uid.into())),
        }
    }

    pub fn sign_in(&self, uid: impl Into<String>) {
        match self.uid.write() {
            Ok(mut guard) => *guard = Some(uid.into()),
            Err(poisoned) => *poisoned.into_inner() = Some(uid.into()),
        }
    }

    pub fn sign_out(&self) {
        match self.uid.write() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }
}

impl IdentityProvider for AuthSession {
    fn current_uid(&self) -> Option<String> {
        match self.uid.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
