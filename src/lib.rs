//! Client for the FenixEdu REST API.
//!
//! Public endpoints are reached through [`FenixEduClient::public_scope`],
//! endpoints acting on behalf of a user take an [`Authorization`] obtained
//! through [`FenixEduClient::oauth`]. Access tokens are never refreshed behind
//! the caller's back: on [`Error::Authorization`] refresh and call again, or
//! share an [`AuthorizationStore`] between callers.

use crate::oauth::FenixEduOAuth;
use crate::public::PublicScope;
use crate::request::QueryParams;
use std::sync::Arc;

pub mod config;
pub mod dispatch;
pub mod endpoint;
pub mod error;
pub mod oauth;
mod person;
pub mod public;
pub mod request;
pub mod store;
pub mod task;
pub mod transport;

pub use config::{ApplicationConfig, Locale};
pub use dispatch::Response;
pub use endpoint::{Endpoint, ResultShape};
pub use error::{classify, Error, OAuthErrorKind, Result};
pub use oauth::Authorization;
pub use store::AuthorizationStore;
pub use task::{spawn_with_callback, TaskHandle};
pub use transport::{ClientResponse, ReqwestTransport, Transport, TransportError};

/// The FenixEdu API.
pub struct FenixEduClient<T: ?Sized = ReqwestTransport> {
    config: Arc<ApplicationConfig>,
    transport: Arc<T>,
}

impl<T: ?Sized> Clone for FenixEduClient<T> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl FenixEduClient {
    /// Create a new FenixEdu client sending requests with [reqwest].
    ///
    /// # Errors
    ///
    /// If creating a [reqwest::Client] fails.
    pub fn new(config: ApplicationConfig) -> Result<Self> {
        let transport = ReqwestTransport::new().map_err(TransportError::from)?;
        Ok(Self::with_transport(config, transport))
    }

    /// Create a new FenixEdu client using a specific `User-Agent`.
    ///
    /// # Errors
    ///
    /// If creating a [reqwest::Client] fails.
    pub fn new_with_user_agent(config: ApplicationConfig, user_agent: &str) -> Result<Self> {
        let transport =
            ReqwestTransport::new_with_user_agent(user_agent).map_err(TransportError::from)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> FenixEduClient<T> {
    /// Create a client that sends requests through `transport`.
    pub fn with_transport(config: ApplicationConfig, transport: T) -> Self {
        Self::with_shared_transport(config, Arc::new(transport))
    }
}

impl<T: Transport + ?Sized> FenixEduClient<T> {
    /// Create a client around a transport that is shared with other code.
    pub fn with_shared_transport(config: ApplicationConfig, transport: Arc<T>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    /// The application settings every request is built from.
    pub fn config(&self) -> &ApplicationConfig {
        &self.config
    }

    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    /// Access FenixEdu's OAuth2 API.
    pub fn oauth(&self) -> FenixEduOAuth<'_, T> {
        FenixEduOAuth::new(self)
    }

    /// Endpoints that need no authorization.
    pub fn public_scope(&self) -> PublicScope<'_, T> {
        PublicScope::new(self)
    }

    /// Call `endpoint` and decode the response in its declared shape.
    ///
    /// `path_args` fill the endpoint template in order. The configured locale
    /// is sent as `lang` unless `query` contains one.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedEndpoint`] if `path_args` does not fit the template.
    /// - [`Error::InvalidPathArgument`] if a path argument is empty, `.` or `..`.
    /// - [`Error::UnsupportedResponseType`] if the endpoint has nothing to decode.
    /// - [`Error::Authorization`] or [`Error::UnmappedAuthorization`] on a 401.
    /// - [`Error::Decode`] if the body does not have the declared shape.
    /// - [`Error::Transport`] if no response was received.
    pub async fn invoke(
        &self,
        endpoint: &Endpoint,
        authorization: Option<&Authorization>,
        query: Option<QueryParams>,
        path_args: &[&str],
    ) -> Result<Response> {
        dispatch::invoke(
            &self.config,
            self.transport.as_ref(),
            endpoint,
            authorization,
            query,
            path_args,
        )
        .await
    }
}
