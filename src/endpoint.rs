//! Descriptors for every FenixEdu operation the client knows about.
//!
//! Templates are relative to the configured base URL and use `{}` for each
//! positional path argument.

use crate::error::{Error, Result};
use reqwest::Method;
use std::fmt;

const SLOT: &str = "{}";

/// What a successful response body decodes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    JsonObject,
    JsonArray,
    /// Raw bytes, e.g. images.
    Bytes,
    /// Nothing to decode; the endpoint is only used to build a URL.
    None,
}

impl fmt::Display for ResultShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::JsonObject => "JSON object",
            Self::JsonArray => "JSON array",
            Self::Bytes => "bytes",
            Self::None => "no result",
        })
    }
}

/// A remote operation: method, URL template and declared result shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub name: &'static str,
    pub method: Method,
    pub template: &'static str,
    pub shape: ResultShape,
}

impl Endpoint {
    pub const fn new(
        name: &'static str,
        method: Method,
        template: &'static str,
        shape: ResultShape,
    ) -> Self {
        Self {
            name,
            method,
            template,
            shape,
        }
    }

    /// Number of positional path arguments the template takes.
    pub fn slots(&self) -> usize {
        self.template.matches(SLOT).count()
    }

    /// Check that the endpoint can be dispatched.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedResponseType`] if the endpoint declares no result shape.
    pub fn validate(&self) -> Result<()> {
        match self.shape {
            ResultShape::None => Err(Error::UnsupportedResponseType {
                endpoint: self.name,
            }),
            _ => Ok(()),
        }
    }

    /// Substitute the path arguments into the template, percent-encoding each one.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedEndpoint`] if the argument count does not match the slots.
    /// - [`Error::InvalidPathArgument`] if an argument is empty, `.` or `..`.
    pub fn resolve_path(&self, args: &[&str]) -> Result<String> {
        let expected = self.slots();
        if args.len() != expected {
            return Err(Error::MalformedEndpoint {
                template: self.template,
                expected,
                actual: args.len(),
            });
        }

        // URL parsers collapse dot segments, encoded or not.
        if let Some(arg) = args.iter().find(|arg| matches!(**arg, "" | "." | "..")) {
            return Err(Error::InvalidPathArgument {
                template: self.template,
                argument: (*arg).to_owned(),
            });
        }

        let mut parts = self.template.split(SLOT);
        let mut path = parts.next().unwrap_or_default().to_owned();
        for (part, arg) in parts.zip(args) {
            path.push_str(&urlencoding::encode(arg));
            path.push_str(part);
        }

        Ok(path)
    }
}

macro_rules! endpoints {
    ($($ident:ident => $method:ident $template:literal as $shape:ident;)*) => {
        $(
            pub const $ident: Endpoint =
                Endpoint::new(stringify!($ident), Method::$method, $template, ResultShape::$shape);
        )*

        /// Every endpoint in the registry.
        pub const ALL: &[Endpoint] = &[$($ident),*];
    };
}

endpoints! {
    OAUTH_USER_DIALOG => GET "/oauth/userdialog" as None;
    OAUTH_ACCESS_TOKEN => POST "/oauth/access_token" as JsonObject;
    OAUTH_REFRESH_ACCESS_TOKEN => POST "/oauth/refresh_token" as JsonObject;

    ABOUT => GET "/api/fenix/v1/about" as JsonObject;
    ACADEMIC_TERMS => GET "/api/fenix/v1/academicterms" as JsonObject;
    CANTEEN => GET "/api/fenix/v1/canteen" as JsonObject;
    CONTACTS => GET "/api/fenix/v1/contacts" as JsonObject;
    DEGREES => GET "/api/fenix/v1/degrees" as JsonArray;
    DEGREE => GET "/api/fenix/v1/degrees/{}" as JsonObject;
    COURSE => GET "/api/fenix/v1/courses/{}" as JsonObject;
    COURSE_GROUPS => GET "/api/fenix/v1/courses/{}/groups" as JsonArray;
    COURSE_EVALUATIONS => GET "/api/fenix/v1/courses/{}/evaluations" as JsonArray;
    SPACES => GET "/api/fenix/v1/spaces" as JsonArray;
    SPACE => GET "/api/fenix/v1/spaces/{}" as JsonObject;
    SPACE_BLUEPRINT => GET "/api/fenix/v1/spaces/{}/blueprint" as Bytes;

    PERSON => GET "/api/fenix/v1/person" as JsonObject;
    PERSON_CURRICULUM => GET "/api/fenix/v1/person/curriculum" as JsonArray;
    PERSON_COURSES => GET "/api/fenix/v1/person/courses" as JsonObject;
    PERSON_EVALUATIONS => GET "/api/fenix/v1/person/evaluations" as JsonArray;
    PERSON_PAYMENTS => GET "/api/fenix/v1/person/payments" as JsonObject;
}
