//! HTTP inbound adapter: response envelope, route adaptation and payload
//! middleware for actix-web.

pub mod body;
pub mod envelope;
pub mod payload;
pub mod route;
pub mod validation;

pub use envelope::{
    create_service_callback, CallbackProvider, EnvelopeProvider, EnvelopeWriter,
    ServiceCallback, ServiceError, ServiceOutcome, UnexpectedError,
};
pub use body::DEFAULT_BODY_LIMIT;
pub use payload::{transform_body, transform_query, validate_body, validate_query, PayloadGuard};
pub use route::{
    route_async, route_async_with, route_nextable_async, route_nextable_async_with,
    NextableRoute, RouteRequest,
};
pub use validation::{
    FieldRules, IssueCode, JsonKind, ValidationErrors, ValidationIssue, Validator,
};
