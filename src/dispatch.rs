//! Sends requests and turns responses into typed results or errors.

use crate::config::ApplicationConfig;
use crate::endpoint::{Endpoint, ResultShape};
use crate::error::{classify, Error, Result};
use crate::oauth::Authorization;
use crate::request::{self, HttpRequest, QueryParams};
use crate::transport::{ClientResponse, Transport};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

const UNAUTHORIZED: u16 = 401;

/// A decoded response body, in the shape the endpoint declares.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    JsonObject(Map<String, Value>),
    JsonArray(Vec<Value>),
    Bytes(Vec<u8>),
}

impl Response {
    pub fn shape(&self) -> ResultShape {
        match self {
            Self::JsonObject(_) => ResultShape::JsonObject,
            Self::JsonArray(_) => ResultShape::JsonArray,
            Self::Bytes(_) => ResultShape::Bytes,
        }
    }

    pub fn into_object(self) -> Result<Map<String, Value>> {
        match self {
            Self::JsonObject(object) => Ok(object),
            other => Err(other.mismatch(ResultShape::JsonObject)),
        }
    }

    pub fn into_array(self) -> Result<Vec<Value>> {
        match self {
            Self::JsonArray(array) => Ok(array),
            other => Err(other.mismatch(ResultShape::JsonArray)),
        }
    }

    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            Self::Bytes(bytes) => Ok(bytes),
            other => Err(other.mismatch(ResultShape::Bytes)),
        }
    }

    /// Deserialize the result into a caller-defined type.
    pub fn deserialize<D: DeserializeOwned>(self) -> Result<D> {
        let shape = self.shape();
        let decoded = match self {
            Self::JsonObject(object) => serde_json::from_value(Value::Object(object)),
            Self::JsonArray(array) => serde_json::from_value(Value::Array(array)),
            Self::Bytes(bytes) => serde_json::from_slice(&bytes),
        };
        decoded.map_err(|e| Error::Decode {
            shape,
            message: e.to_string(),
        })
    }

    fn mismatch(&self, wanted: ResultShape) -> Error {
        Error::UnexpectedResponseType {
            message: format!("wanted {wanted}, response is {}", self.shape()),
        }
    }
}

#[derive(Deserialize)]
struct OAuthErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Resolve, send and decode one call to `endpoint`.
///
/// The configured locale is added as `lang` unless `query` already has one.
/// A 401 always fails with the server's OAuth error, whatever the declared shape.
pub(crate) async fn invoke<T: Transport + ?Sized>(
    config: &ApplicationConfig,
    transport: &T,
    endpoint: &Endpoint,
    authorization: Option<&Authorization>,
    query: Option<QueryParams>,
    path_args: &[&str],
) -> Result<Response> {
    endpoint.validate()?;

    let query = request::with_locale(query.unwrap_or_default(), config);
    let request = request::build(config, endpoint, path_args, query, authorization)?;
    let response = send(transport, request).await?;

    if response.status == UNAUTHORIZED {
        warn!(endpoint = endpoint.name, "request was not authorized");
        return Err(oauth_failure(&response));
    }
    if !response.is_success() {
        return Err(client_error(&response));
    }

    decode(endpoint, &response.body)
}

pub(crate) async fn send<T: Transport + ?Sized>(
    transport: &T,
    request: HttpRequest,
) -> Result<ClientResponse> {
    let method = request.method.clone();
    let path = request.url.path().to_owned();
    let response = transport.send(request).await?;
    debug!(%method, path = %path, status = response.status, "request completed");
    Ok(response)
}

/// The error for a failed response that may carry an OAuth error payload.
pub(crate) fn oauth_failure(response: &ClientResponse) -> Error {
    match serde_json::from_slice::<OAuthErrorBody>(&response.body) {
        Ok(body) => classify(&body.error, body.error_description),
        Err(_) => client_error(response),
    }
}

fn client_error(response: &ClientResponse) -> Error {
    Error::Client {
        status: response.status,
        body: response.text(),
    }
}

fn decode(endpoint: &Endpoint, body: &[u8]) -> Result<Response> {
    let shape = endpoint.shape;
    let decode_error = |message: String| Error::Decode { shape, message };

    match shape {
        ResultShape::JsonObject => match parse(body).map_err(decode_error)? {
            Value::Object(object) => Ok(Response::JsonObject(object)),
            other => Err(decode_error(format!("found {}", json_kind(&other)))),
        },
        ResultShape::JsonArray => match parse(body).map_err(decode_error)? {
            Value::Array(array) => Ok(Response::JsonArray(array)),
            other => Err(decode_error(format!("found {}", json_kind(&other)))),
        },
        ResultShape::Bytes => Ok(Response::Bytes(body.to_vec())),
        ResultShape::None => Err(Error::UnsupportedResponseType {
            endpoint: endpoint.name,
        }),
    }
}

fn parse(body: &[u8]) -> std::result::Result<Value, String> {
    serde_json::from_slice(body).map_err(|e| e.to_string())
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{CANTEEN, DEGREES, SPACE_BLUEPRINT};
    use serde_json::json;

    #[test]
    fn decodes_each_declared_shape() {
        assert_eq!(
            decode(&DEGREES, br#"[{"id":1}]"#).unwrap(),
            Response::JsonArray(vec![json!({"id": 1})])
        );
        assert!(matches!(
            decode(&CANTEEN, br#"{"menu":[]}"#).unwrap(),
            Response::JsonObject(_)
        ));
        assert_eq!(
            decode(&SPACE_BLUEPRINT, b"\x89PNG").unwrap(),
            Response::Bytes(b"\x89PNG".to_vec())
        );
    }

    #[test]
    fn wrong_json_kind_is_a_decode_error() {
        match decode(&DEGREES, br#"{"id":1}"#) {
            Err(Error::Decode { shape, message }) => {
                assert_eq!(shape, ResultShape::JsonArray);
                assert!(message.contains("an object"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(matches!(
            decode(&CANTEEN, b"<html>"),
            Err(Error::Decode { shape: ResultShape::JsonObject, .. })
        ));
    }

    #[test]
    fn oauth_failure_falls_back_to_client_error() {
        let response = ClientResponse::new(401, "Unauthorized");
        match oauth_failure(&response) {
            Error::Client { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "Unauthorized");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn oauth_failure_without_description() {
        let response = ClientResponse::new(401, r#"{"error":"accessTokenExpired"}"#);
        assert!(matches!(
            oauth_failure(&response),
            Error::Authorization { description: None, .. }
        ));
    }

    #[test]
    fn response_accessors_check_the_shape() {
        let response = Response::JsonArray(vec![json!(1)]);
        assert!(matches!(
            response.clone().into_object(),
            Err(Error::UnexpectedResponseType { .. })
        ));
        assert_eq!(response.clone().into_array().unwrap(), vec![json!(1)]);
        assert_eq!(response.deserialize::<Vec<u32>>().unwrap(), vec![1]);
    }
}
