//! WeChat account session.
//!
//! Connecting is mocked: any non-empty credential pair is accepted and the
//! workspace is seeded with the demo batch, the same flow the platform pull
//! would follow. Dropping the session is the disconnect.

use crate::seed;
use crate::store::MemoryStore;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("please enter both AppID and App Secret")]
    MissingCredentials,
}

/// A connected account: the credentials it was opened with plus the working
/// set pulled at connect time.
#[derive(Debug)]
pub struct Session {
    pub app_id: String,
    pub app_secret: String,
    pub store: MemoryStore,
}

impl Session {
    /// Open a session with account credentials. Both are required.
    pub fn connect(app_id: &str, app_secret: &str) -> Result<Self, SessionError> {
        if app_id.is_empty() || app_secret.is_empty() {
            return Err(SessionError::MissingCredentials);
        }

        Ok(Self {
            app_id: app_id.to_string(),
            app_secret: app_secret.to_string(),
            store: seed::demo_store(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ArticleStore;

    #[test]
    fn connect_requires_both_credentials() {
        assert!(matches!(
            Session::connect("", "secret"),
            Err(SessionError::MissingCredentials)
        ));
        assert!(matches!(
            Session::connect("wx123", ""),
            Err(SessionError::MissingCredentials)
        ));
    }

    #[test]
    fn any_non_empty_pair_connects_and_seeds_the_workspace() {
        let session = Session::connect("wx123", "secret").unwrap();
        assert_eq!(session.app_id, "wx123");
        assert_eq!(session.store.articles().len(), 5);
        assert_eq!(session.store.categories().len(), 4);
    }
}
