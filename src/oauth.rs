use crate::dispatch::{self, oauth_failure};
use crate::endpoint::{ResultShape, OAUTH_ACCESS_TOKEN, OAUTH_REFRESH_ACCESS_TOKEN, OAUTH_USER_DIALOG};
use crate::error::{Error, Result};
use crate::request::{self, QueryParams};
use crate::transport::Transport;
use crate::FenixEduClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use time::{Duration, OffsetDateTime};
use tracing::debug;
use url::Url;

/// FenixEdu's OAuth2 authorization-code flow.
pub struct FenixEduOAuth<'a, T: ?Sized> {
    client: &'a FenixEduClient<T>,
}

/// An OAuth2 access/refresh token pair.
///
/// Values are never modified; refreshing yields a new `Authorization`.
#[derive(Clone, PartialEq, Eq)]
pub struct Authorization {
    access_token: String,
    refresh_token: String,
    expires_at: Option<OffsetDateTime>,
}

impl Authorization {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_at: None,
        }
    }

    pub fn with_expires_at(mut self, expires_at: OffsetDateTime) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    /// When the access token expires, if the server said so.
    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        self.expires_at
    }

    /// Whether the access token is known to have expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|at| at <= OffsetDateTime::now_utc())
    }
}

impl fmt::Debug for Authorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authorization")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl<'a, T: Transport + ?Sized> FenixEduOAuth<'a, T> {
    pub(crate) fn new(client: &'a FenixEduClient<T>) -> Self {
        Self { client }
    }

    /// Get the URL where the user should be redirected to grant access.
    ///
    /// # Errors
    ///
    /// If the configured base URL cannot hold the consent path.
    pub fn authorization_url(&self) -> Result<Url> {
        let config = self.client.config();
        let query = QueryParams::from([
            ("client_id".to_owned(), config.consumer_key().to_owned()),
            ("redirect_uri".to_owned(), config.callback_url().to_string()),
        ]);

        Ok(request::build(config, &OAUTH_USER_DIALOG, &[], query, None)?.url())
    }

    /// Exchange an authorization code for an [`Authorization`].
    ///
    /// # Errors
    ///
    /// - If the request fails.
    /// - If the code is rejected, as a mapped OAuth error.
    /// - If the server answers with any other failure, as [`Error::Client`].
    pub async fn exchange_code<S: AsRef<str>>(&self, code: S) -> Result<Authorization> {
        let config = self.client.config();
        let form = ExchangeRequest::new_exchange_code(code.as_ref(), config);
        let request = request::form(config, &OAUTH_ACCESS_TOKEN, &form)?;

        let response = dispatch::send(self.client.transport(), request).await?;
        if !response.is_success() {
            return Err(oauth_failure(&response));
        }

        let response: ExchangeResponse =
            serde_json::from_slice(&response.body).map_err(|e| Error::Decode {
                shape: ResultShape::JsonObject,
                message: e.to_string(),
            })?;
        debug!("exchanged authorization code for tokens");
        Ok(response.into())
    }

    /// Obtain a new access token using the refresh token of `authorization`.
    ///
    /// The returned value keeps the refresh token of `authorization`.
    ///
    /// # Errors
    ///
    /// - If the request fails.
    /// - If the refresh token is rejected, as a mapped OAuth error.
    /// - If the response is not a JSON object, as [`Error::UnexpectedResponseType`].
    pub async fn refresh(&self, authorization: &Authorization) -> Result<Authorization> {
        debug!("refreshing OAuth access token using refresh token");
        let config = self.client.config();
        let form = ExchangeRequest::new_refresh_token(&authorization.refresh_token, config);
        let request = request::form(config, &OAUTH_REFRESH_ACCESS_TOKEN, &form)?;

        let response = dispatch::send(self.client.transport(), request).await?;
        if !response.is_success() {
            return Err(oauth_failure(&response));
        }

        let object = match serde_json::from_slice::<Value>(&response.body) {
            Ok(Value::Object(object)) => object,
            Ok(other) => {
                return Err(Error::UnexpectedResponseType {
                    message: format!("refresh returned {}", dispatch::json_kind(&other)),
                })
            }
            Err(e) => {
                return Err(Error::UnexpectedResponseType {
                    message: format!("refresh returned a non-JSON body: {e}"),
                })
            }
        };

        let response: RefreshResponse =
            serde_json::from_value(Value::Object(object)).map_err(|e| Error::Decode {
                shape: ResultShape::JsonObject,
                message: e.to_string(),
            })?;

        Ok(Authorization {
            access_token: response.access_token,
            refresh_token: authorization.refresh_token.clone(),
            expires_at: expires_at(response.expires_in),
        })
    }
}

#[derive(Debug, Serialize)]
struct ExchangeRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<&'a str>,
    grant_type: GrantType,
}

impl<'a> ExchangeRequest<'a> {
    fn new_exchange_code(code: &'a str, config: &'a crate::ApplicationConfig) -> Self {
        Self {
            client_id: config.consumer_key(),
            client_secret: config.consumer_secret(),
            redirect_uri: config.callback_url().as_str(),
            code: Some(code),
            refresh_token: None,
            grant_type: GrantType::AuthorizationCode,
        }
    }

    fn new_refresh_token(refresh_token: &'a str, config: &'a crate::ApplicationConfig) -> Self {
        Self {
            client_id: config.consumer_key(),
            client_secret: config.consumer_secret(),
            redirect_uri: config.callback_url().as_str(),
            code: None,
            refresh_token: Some(refresh_token),
            grant_type: GrantType::RefreshToken,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum GrantType {
    AuthorizationCode,
    RefreshToken,
}

#[derive(Deserialize)]
struct ExchangeResponse {
    access_token: String,
    refresh_token: String,
    expires_in: Option<i64>,
}

impl From<ExchangeResponse> for Authorization {
    fn from(value: ExchangeResponse) -> Self {
        Self {
            access_token: value.access_token,
            refresh_token: value.refresh_token,
            expires_at: expires_at(value.expires_in),
        }
    }
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: Option<i64>,
}

fn expires_at(expires_in: Option<i64>) -> Option<OffsetDateTime> {
    expires_in
        .filter(|secs| *secs > 0)
        .map(|secs| OffsetDateTime::now_utc() + Duration::seconds(secs))
}
