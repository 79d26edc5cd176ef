//! Middleware validating or rewriting the request body and query string.
//!
//! - [`validate_body`] / [`validate_query`] short-circuit with `400` and
//!   `{"errors": [...]}` when the validator rejects the payload.
//! - [`transform_body`] / [`transform_query`] rewrite the payload on a best
//!   effort basis: any failure leaves the request untouched and the chain
//!   continues.
//!
//! Bodies are buffered in memory up to a limit ([`DEFAULT_BODY_LIMIT`] unless
//! changed with [`PayloadGuard::with_body_limit`]) and re-injected, so
//! downstream extractors see exactly the bytes the client sent.

use std::fmt::Display;
use std::rc::Rc;
use std::task::{Context, Poll};

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderValue, CONTENT_LENGTH};
use actix_web::http::uri::{PathAndQuery, Uri};
use actix_web::http::StatusCode;
use actix_web::web::Bytes;
use actix_web::{Error, HttpResponse};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use serde_json::{json, Map, Value};
use tracing::debug;

use super::body::{buffer_body, bytes_to_payload, BodyReadError, DEFAULT_BODY_LIMIT};
use super::validation::{IssueCode, ValidationErrors, ValidationIssue, Validator};

/// Failures while rewriting a payload. Logged, never surfaced to clients.
#[derive(Debug, thiserror::Error)]
enum RewriteError {
    #[error("request payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("transform rejected the payload: {0}")]
    Transform(String),
    #[error("query values must form a JSON object")]
    QueryShape,
    #[error("rewritten query is not a valid URI: {0}")]
    Uri(String),
    #[error(transparent)]
    Read(#[from] BodyReadError),
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

/// Parse a buffered body. An empty body is `null`.
fn parse_body(bytes: &[u8]) -> Result<Value, serde_json::Error> {
    if is_blank(bytes) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes)
}

/// Decode a query string into an object of strings. Repeated keys keep the
/// last value.
pub(crate) fn query_to_value(query: &str) -> Value {
    let map: Map<String, Value> = url::form_urlencoded::parse(query.as_bytes())
        .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
        .collect();
    Value::Object(map)
}

/// Encode an object back into a query string.
///
/// Arrays become repeated keys, `null` drops the key, nested objects are
/// written as JSON text.
fn value_to_query(value: &Value) -> Result<String, RewriteError> {
    let object = value.as_object().ok_or(RewriteError::QueryShape)?;
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, item) in object {
        match item {
            Value::Null => {}
            Value::Array(items) => {
                for entry in items {
                    serializer.append_pair(key, &scalar_text(entry));
                }
            }
            other => {
                serializer.append_pair(key, &scalar_text(other));
            }
        }
    }
    Ok(serializer.finish())
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn rewrite_query(req: &mut ServiceRequest, query: &str) -> Result<(), RewriteError> {
    let path = req.path().to_owned();
    let path_and_query = if query.is_empty() {
        path
    } else {
        format!("{path}?{query}")
    };

    let mut parts = req.head().uri.clone().into_parts();
    parts.path_and_query = Some(
        PathAndQuery::try_from(path_and_query.as_str())
            .map_err(|err| RewriteError::Uri(err.to_string()))?,
    );
    let uri = Uri::from_parts(parts).map_err(|err| RewriteError::Uri(err.to_string()))?;
    req.head_mut().uri = uri;
    Ok(())
}

/// Part of the request a guard inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RequestPart {
    /// The JSON body.
    Body,
    /// The query string, seen as an object of strings.
    Query,
}

impl RequestPart {
    fn as_str(self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Query => "query",
        }
    }
}

type TransformFn = dyn Fn(Value) -> Result<Value, String>;

#[derive(Clone)]
enum GuardAction {
    Validate(Rc<dyn Validator>),
    Transform(Rc<TransformFn>),
}

/// Middleware factory produced by the `validate_*` and `transform_*`
/// functions.
#[derive(Clone)]
pub struct PayloadGuard {
    part: RequestPart,
    action: GuardAction,
    body_limit: usize,
}

impl PayloadGuard {
    fn new(part: RequestPart, action: GuardAction) -> Self {
        Self {
            part,
            action,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Buffer at most `limit` body bytes.
    ///
    /// Larger bodies fail validation with `413`; transforms pass them through
    /// unmodified.
    #[must_use]
    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }
}

/// Reject requests whose JSON body fails `validator`.
///
/// Unparseable JSON is reported as an `invalid_json` issue. A body that
/// cannot be read, including one over the body limit, is reported as
/// `unreadable_body` with status `413` or `400`.
///
/// # Examples
/// ```
/// use actix_web::{web, App, HttpResponse};
/// use service_utils::inbound::http::{validate_body, FieldRules};
///
/// let _app = App::new().service(
///     web::resource("/signup")
///         .wrap(validate_body(FieldRules::new().required("email").email("email")))
///         .post(HttpResponse::Created),
/// );
/// ```
pub fn validate_body(validator: impl Validator) -> PayloadGuard {
    PayloadGuard::new(RequestPart::Body, GuardAction::Validate(Rc::new(validator)))
}

/// Reject requests whose query string fails `validator`.
pub fn validate_query(validator: impl Validator) -> PayloadGuard {
    PayloadGuard::new(RequestPart::Query, GuardAction::Validate(Rc::new(validator)))
}

/// Rewrite the JSON body with `transform`, leaving it untouched on failure.
pub fn transform_body<F, E>(transform: F) -> PayloadGuard
where
    F: Fn(Value) -> Result<Value, E> + 'static,
    E: Display,
{
    PayloadGuard::new(RequestPart::Body, GuardAction::Transform(erase_transform(transform)))
}

/// Rewrite the query string with `transform`, leaving it untouched on
/// failure.
pub fn transform_query<F, E>(transform: F) -> PayloadGuard
where
    F: Fn(Value) -> Result<Value, E> + 'static,
    E: Display,
{
    PayloadGuard::new(RequestPart::Query, GuardAction::Transform(erase_transform(transform)))
}

fn erase_transform<F, E>(transform: F) -> Rc<TransformFn>
where
    F: Fn(Value) -> Result<Value, E> + 'static,
    E: Display,
{
    Rc::new(move |value| transform(value).map_err(|err| err.to_string()))
}

impl<S, B> Transform<S, ServiceRequest> for PayloadGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = PayloadGuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(PayloadGuardMiddleware {
            service: Rc::new(service),
            part: self.part,
            action: self.action.clone(),
            body_limit: self.body_limit,
        }))
    }
}

/// Service wrapper produced by [`PayloadGuard`].
pub struct PayloadGuardMiddleware<S> {
    service: Rc<S>,
    part: RequestPart,
    action: GuardAction,
    body_limit: usize,
}

impl<S, B> Service<ServiceRequest> for PayloadGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let part = self.part;
        let action = self.action.clone();
        let body_limit = self.body_limit;

        Box::pin(async move {
            let mut req = req;
            let verdict = match (&action, part) {
                (GuardAction::Validate(validator), RequestPart::Body) => {
                    validate_body_of(&mut req, validator.as_ref(), body_limit).await
                }
                (GuardAction::Validate(validator), RequestPart::Query) => validator
                    .validate(&query_to_value(req.query_string()))
                    .map_err(|errors| (StatusCode::BAD_REQUEST, errors)),
                (GuardAction::Transform(transform), RequestPart::Body) => {
                    let rewritten =
                        transform_body_of(&mut req, transform.as_ref(), body_limit).await;
                    if let Err(error) = rewritten {
                        debug!(%error, part = part.as_str(), "payload left unmodified");
                    }
                    Ok(())
                }
                (GuardAction::Transform(transform), RequestPart::Query) => {
                    if let Err(error) = transform_query_of(&mut req, transform.as_ref()) {
                        debug!(%error, part = part.as_str(), "payload left unmodified");
                    }
                    Ok(())
                }
            };

            match verdict {
                Ok(()) => {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err((status, errors)) => {
                    debug!(
                        part = part.as_str(),
                        status = status.as_u16(),
                        issues = errors.issues().len(),
                        path = %req.path(),
                        "request rejected by validator"
                    );
                    let response = HttpResponse::build(status).json(json!({ "errors": errors }));
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

async fn validate_body_of(
    req: &mut ServiceRequest,
    validator: &dyn Validator,
    limit: usize,
) -> Result<(), (StatusCode, ValidationErrors)> {
    let bytes = buffer_body(req, limit).await.map_err(|err| {
        let issue = ValidationIssue::payload(IssueCode::UnreadableBody, err.to_string());
        (err.status(), ValidationErrors::single(issue))
    })?;
    let value = parse_body(&bytes).map_err(|err| {
        let issue = ValidationIssue::payload(
            IssueCode::InvalidJson,
            format!("request body is not valid JSON: {err}"),
        );
        (StatusCode::BAD_REQUEST, ValidationErrors::single(issue))
    })?;
    validator
        .validate(&value)
        .map_err(|errors| (StatusCode::BAD_REQUEST, errors))
}

/// Rewrite the buffered body. Blank and oversized bodies are left alone.
async fn transform_body_of(
    req: &mut ServiceRequest,
    transform: &TransformFn,
    limit: usize,
) -> Result<(), RewriteError> {
    let bytes = buffer_body(req, limit).await?;
    if is_blank(&bytes) {
        return Ok(());
    }
    let value = serde_json::from_slice::<Value>(&bytes)?;
    let value = transform(value).map_err(RewriteError::Transform)?;
    let rewritten = serde_json::to_vec(&value)?;

    req.headers_mut()
        .insert(CONTENT_LENGTH, HeaderValue::from(rewritten.len()));
    req.set_payload(bytes_to_payload(Bytes::from(rewritten)));
    Ok(())
}

fn transform_query_of(
    req: &mut ServiceRequest,
    transform: &TransformFn,
) -> Result<(), RewriteError> {
    let value =
        transform(query_to_value(req.query_string())).map_err(RewriteError::Transform)?;
    let query = value_to_query(&value)?;
    rewrite_query(req, &query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(b"".as_slice(), Value::Null)]
    #[case(b"  \n".as_slice(), Value::Null)]
    #[case(br#"{"a":1}"#.as_slice(), json!({"a": 1}))]
    fn parse_body_treats_blank_as_null(#[case] raw: &[u8], #[case] expected: Value) {
        assert_eq!(parse_body(raw).expect("parse body"), expected);
    }

    #[rstest]
    fn query_round_trip_keeps_values() {
        let value = query_to_value("name=Ada%20L&tag=a&tag=b");
        assert_eq!(value, json!({"name": "Ada L", "tag": "b"}));
    }

    #[rstest]
    fn value_to_query_expands_arrays_and_drops_nulls() {
        let query = value_to_query(&json!({"a": [1, "x"], "b": null, "c": true}))
            .expect("object encodes");
        assert_eq!(query, "a=1&a=x&c=true");
    }

    #[rstest]
    fn value_to_query_rejects_non_objects() {
        assert!(matches!(
            value_to_query(&json!([1])),
            Err(RewriteError::QueryShape)
        ));
    }
}
