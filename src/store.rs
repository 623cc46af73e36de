//! Shared authorization with single-flight refresh.

use crate::error::Result;
use crate::oauth::{Authorization, FenixEduOAuth};
use crate::transport::Transport;
use tokio::sync::Mutex;
use tracing::debug;

/// Holds the current [`Authorization`] for callers that share one login.
///
/// When several calls fail with the same expired access token, only the first
/// one to reach [`refresh_after_failure`](Self::refresh_after_failure) talks to
/// the server; the others get the authorization it produced.
#[derive(Debug)]
pub struct AuthorizationStore {
    current: Mutex<Authorization>,
}

impl AuthorizationStore {
    pub fn new(authorization: Authorization) -> Self {
        Self {
            current: Mutex::new(authorization),
        }
    }

    pub async fn current(&self) -> Authorization {
        self.current.lock().await.clone()
    }

    /// Replace the stored authorization, e.g. after a new login.
    pub async fn replace(&self, authorization: Authorization) {
        *self.current.lock().await = authorization;
    }

    /// Refresh the stored authorization after `stale` was rejected.
    ///
    /// If the stored access token no longer matches `stale`, another caller has
    /// already refreshed and the stored value is returned as is.
    ///
    /// # Errors
    ///
    /// Whatever [`FenixEduOAuth::refresh`] returns. The stored value is left
    /// untouched on failure.
    pub async fn refresh_after_failure<T: Transport + ?Sized>(
        &self,
        oauth: &FenixEduOAuth<'_, T>,
        stale: &Authorization,
    ) -> Result<Authorization> {
        let mut current = self.current.lock().await;
        if current.access_token() != stale.access_token() {
            debug!("authorization was already refreshed");
            return Ok(current.clone());
        }

        let refreshed = oauth.refresh(&current).await?;
        *current = refreshed.clone();
        Ok(refreshed)
    }
}
