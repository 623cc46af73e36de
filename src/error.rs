use crate::endpoint::ResultShape;
use crate::transport::TransportError;
use std::fmt;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every way a FenixEdu call can fail.
#[derive(Debug, Error)]
pub enum Error {
    /// The transport could not produce an HTTP response.
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The server rejected the credentials with a known OAuth error code.
    #[error("authorization failure ({kind}){}", describe(.description))]
    Authorization {
        kind: OAuthErrorKind,
        description: Option<String>,
    },

    /// The server rejected the credentials with an error code we do not know.
    #[error("authorization failure ({code}){}", describe(.description))]
    UnmappedAuthorization {
        code: String,
        description: Option<String>,
    },

    /// The body did not match the shape declared by the endpoint.
    #[error("could not decode response as {shape}: {message}")]
    Decode { shape: ResultShape, message: String },

    /// The endpoint declares a shape that cannot be dispatched.
    #[error("endpoint `{endpoint}` has no decodable response type")]
    UnsupportedResponseType { endpoint: &'static str },

    /// A response or decoded value had a different shape than expected.
    #[error("unexpected response type: {message}")]
    UnexpectedResponseType { message: String },

    /// Path argument count does not match the URL template.
    #[error("endpoint template `{template}` expects {expected} path arguments, got {actual}")]
    MalformedEndpoint {
        template: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A path argument would not stay a single path segment.
    #[error("path argument `{argument}` is not a valid segment for `{template}`")]
    InvalidPathArgument {
        template: &'static str,
        argument: String,
    },

    /// A request could not be assembled from the given values.
    #[error("could not build request for `{endpoint}`: {message}")]
    InvalidRequest {
        endpoint: &'static str,
        message: String,
    },

    /// The server answered with a non-success status that is not an OAuth error.
    #[error("request failed with status {status}: {body}")]
    Client { status: u16, body: String },

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

fn describe(description: &Option<String>) -> String {
    match description {
        Some(d) => format!(": {d}"),
        None => String::new(),
    }
}

impl Error {
    /// Whether the caller should refresh the authorization or log in again.
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::Authorization { .. } | Self::UnmappedAuthorization { .. }
        )
    }
}

/// OAuth error codes known to FenixEdu and the OAuth2 RFCs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OAuthErrorKind {
    InvalidRequest,
    InvalidClient,
    InvalidGrant,
    UnauthorizedClient,
    UnsupportedGrantType,
    InvalidScope,
    InvalidToken,
    InsufficientScope,
    AccessTokenExpired,
    AccessTokenInvalid,
    AccessTokenInvalidFormat,
    RefreshTokenInvalid,
    RefreshTokenInvalidFormat,
    ClientIdInvalid,
}

impl OAuthErrorKind {
    pub const ALL: [OAuthErrorKind; 14] = [
        Self::InvalidRequest,
        Self::InvalidClient,
        Self::InvalidGrant,
        Self::UnauthorizedClient,
        Self::UnsupportedGrantType,
        Self::InvalidScope,
        Self::InvalidToken,
        Self::InsufficientScope,
        Self::AccessTokenExpired,
        Self::AccessTokenInvalid,
        Self::AccessTokenInvalidFormat,
        Self::RefreshTokenInvalid,
        Self::RefreshTokenInvalidFormat,
        Self::ClientIdInvalid,
    ];

    /// The code as it appears in the `error` field.
    pub fn code(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::InvalidClient => "invalid_client",
            Self::InvalidGrant => "invalid_grant",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::UnsupportedGrantType => "unsupported_grant_type",
            Self::InvalidScope => "invalid_scope",
            Self::InvalidToken => "invalid_token",
            Self::InsufficientScope => "insufficient_scope",
            Self::AccessTokenExpired => "accessTokenExpired",
            Self::AccessTokenInvalid => "accessTokenInvalid",
            Self::AccessTokenInvalidFormat => "accessTokenInvalidFormat",
            Self::RefreshTokenInvalid => "refreshTokenInvalid",
            Self::RefreshTokenInvalidFormat => "refreshTokenInvalidFormat",
            Self::ClientIdInvalid => "clientIdInvalid",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    /// Whether a refresh can recover from this error.
    pub fn is_refreshable(self) -> bool {
        matches!(self, Self::AccessTokenExpired | Self::InvalidToken)
    }
}

impl fmt::Display for OAuthErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Map an OAuth error code to its typed error.
///
/// Unknown codes are kept verbatim in [`Error::UnmappedAuthorization`].
pub fn classify(code: &str, description: Option<String>) -> Error {
    match OAuthErrorKind::from_code(code) {
        Some(kind) => Error::Authorization { kind, description },
        None => Error::UnmappedAuthorization {
            code: code.to_owned(),
            description,
        },
    }
}
