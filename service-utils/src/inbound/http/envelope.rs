//! Response envelope written once per request.
//!
//! Successful outcomes are sent as plain JSON with status 200. Failures are
//! wrapped as `{"err": ...}` with the status taken from the error's
//! `httpCode`, falling back to 500. Error bodies are built by explicit field
//! extraction so `message` and the numeric codes always survive.

use actix_web::{http::StatusCode, HttpRequest, HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::domain::LogicError;

/// Outcome of a service call: success data or a [`ServiceError`].
pub type ServiceOutcome<T> = Result<T, ServiceError>;

/// Failure side of a [`ServiceOutcome`].
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// Intentional, application-raised failure. Safe to return verbatim.
    Logic(LogicError),
    /// Anything else. Logged and surfaced with a best-effort status.
    Unexpected(UnexpectedError),
}

impl ServiceError {
    /// Wrap any error as an unexpected failure.
    pub fn unexpected(err: impl std::error::Error) -> Self {
        Self::Unexpected(UnexpectedError::from_error(&err))
    }

    /// Returns `true` for application-raised logic errors.
    pub fn is_logic(&self) -> bool {
        matches!(self, Self::Logic(_))
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        match self {
            Self::Logic(err) => err.message(),
            Self::Unexpected(err) => err.message(),
        }
    }

    /// HTTP status the envelope will carry.
    pub fn status(&self) -> StatusCode {
        let http_code = match self {
            Self::Logic(err) => Some(f64::from(err.http_code())),
            Self::Unexpected(err) => err.http_code,
        };
        http_code
            .and_then(status_from_number)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// JSON placed under the envelope's `err` key.
    pub fn to_body(&self) -> Value {
        match self {
            Self::Logic(err) => err.to_json(),
            Self::Unexpected(err) => err.to_body(self.status()),
        }
    }
}

impl From<LogicError> for ServiceError {
    fn from(value: LogicError) -> Self {
        Self::Logic(value)
    }
}

impl From<UnexpectedError> for ServiceError {
    fn from(value: UnexpectedError) -> Self {
        Self::Unexpected(value)
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(value: serde_json::Error) -> Self {
        Self::unexpected(value)
    }
}

impl From<actix_web::Error> for ServiceError {
    fn from(err: actix_web::Error) -> Self {
        let status = err.as_response_error().status_code();
        Self::Unexpected(UnexpectedError::new(err.to_string()).with_http_code(status.as_u16()))
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ServiceError {}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status()).json(json!({ "err": self.to_body() }))
    }
}

/// Failure that is not an application [`LogicError`].
///
/// Carries the fields the envelope needs explicitly instead of relying on a
/// generic serialisation of the source error.
#[derive(Debug, Clone, PartialEq)]
pub struct UnexpectedError {
    message: Option<String>,
    http_code: Option<f64>,
    code: Option<i64>,
    extra: Map<String, Value>,
}

impl UnexpectedError {
    /// Create an unexpected error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            http_code: None,
            code: None,
            extra: Map::new(),
        }
    }

    /// Capture the display message of a Rust error.
    pub fn from_error(err: &dyn std::error::Error) -> Self {
        Self::new(err.to_string())
    }

    /// Extract an error from an arbitrary JSON error object.
    ///
    /// `message`, `httpCode` and `code` are read explicitly; any other fields
    /// are kept and echoed in the envelope. A bare string becomes the message.
    ///
    /// # Examples
    /// ```
    /// use service_utils::inbound::http::UnexpectedError;
    /// use serde_json::json;
    ///
    /// let err = UnexpectedError::from_value(json!({"httpCode": 404, "message": "nf"}));
    /// assert_eq!(err.message(), "nf");
    /// ```
    pub fn from_value(value: Value) -> Self {
        let mut fields = match value {
            Value::Object(map) => map,
            Value::String(text) => return Self::new(text),
            Value::Null => Map::new(),
            other => return Self::new(other.to_string()),
        };

        let message = match fields.remove("message") {
            Some(Value::String(text)) => Some(text),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };
        let http_code = fields.remove("httpCode").as_ref().and_then(Value::as_f64);
        let code = fields.remove("code").as_ref().and_then(Value::as_i64);

        Self {
            message,
            http_code,
            code,
            extra: fields,
        }
    }

    /// Attach the HTTP status to respond with.
    #[must_use]
    pub fn with_http_code(mut self, http_code: u16) -> Self {
        self.http_code = Some(f64::from(http_code));
        self
    }

    /// Attach an application error code.
    #[must_use]
    pub fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }

    /// Attach an extra field echoed in the envelope.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Message, or an empty string when none was supplied.
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }

    /// Numeric application code, if any.
    pub fn code(&self) -> Option<i64> {
        self.code
    }

    fn to_body(&self, status: StatusCode) -> Value {
        let mut body = self.extra.clone();
        let message = self
            .message
            .clone()
            .or_else(|| status.canonical_reason().map(str::to_owned))
            .unwrap_or_default();
        body.insert("message".to_owned(), Value::String(message));
        body.insert(
            "code".to_owned(),
            json!(self.code.unwrap_or_else(|| i64::from(status.as_u16()))),
        );
        if let Some(http_code) = self.http_code {
            body.insert("httpCode".to_owned(), http_code_as_json(http_code));
        }
        Value::Object(body)
    }
}

impl std::fmt::Display for UnexpectedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for UnexpectedError {}

fn status_from_number(code: f64) -> Option<StatusCode> {
    if !code.is_finite() || code.fract() != 0.0 || !(100.0..1000.0).contains(&code) {
        return None;
    }
    StatusCode::from_u16(code as u16).ok()
}

fn http_code_as_json(code: f64) -> Value {
    if code.fract() == 0.0 && code.is_finite() && code.abs() < 1e15 {
        json!(code as i64)
    } else {
        json!(code)
    }
}

/// Single-use terminal callback for a request.
///
/// `send` consumes the callback, so a response can only be produced once.
pub trait ServiceCallback {
    /// Turn the outcome into the one response for this request.
    fn send<T: Serialize>(self, outcome: ServiceOutcome<T>) -> HttpResponse;
}

/// Derives the terminal [`ServiceCallback`] from a request.
pub trait CallbackProvider: 'static {
    /// Callback produced for each request.
    type Callback: ServiceCallback + 'static;

    /// Build the callback for `request`.
    fn provide(&self, request: &HttpRequest) -> Self::Callback;
}

/// Default provider producing an [`EnvelopeWriter`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeProvider;

impl CallbackProvider for EnvelopeProvider {
    type Callback = EnvelopeWriter;

    fn provide(&self, request: &HttpRequest) -> Self::Callback {
        create_service_callback(request)
    }
}

/// Writes the standard response envelope.
#[derive(Debug)]
pub struct EnvelopeWriter {
    method: String,
    path: String,
}

/// Create the envelope writer for a request.
///
/// # Examples
/// ```
/// use actix_web::{http::StatusCode, test::TestRequest};
/// use service_utils::inbound::http::{create_service_callback, ServiceCallback, ServiceOutcome};
/// use serde_json::json;
///
/// let request = TestRequest::default().to_http_request();
/// let outcome: ServiceOutcome<_> = Ok(json!({"a": 1}));
/// let response = create_service_callback(&request).send(outcome);
/// assert_eq!(response.status(), StatusCode::OK);
/// ```
pub fn create_service_callback(request: &HttpRequest) -> EnvelopeWriter {
    EnvelopeWriter {
        method: request.method().to_string(),
        path: request.path().to_owned(),
    }
}

impl ServiceCallback for EnvelopeWriter {
    fn send<T: Serialize>(self, outcome: ServiceOutcome<T>) -> HttpResponse {
        let outcome = outcome.and_then(|data| serde_json::to_value(data).map_err(ServiceError::from));
        match outcome {
            Ok(data) => HttpResponse::Ok().json(data),
            Err(err) => {
                let status = err.status();
                debug!(
                    method = %self.method,
                    path = %self.path,
                    status = status.as_u16(),
                    logic = err.is_logic(),
                    "writing error envelope"
                );
                HttpResponse::build(status).json(json!({ "err": err.to_body() }))
            }
        }
    }
}
