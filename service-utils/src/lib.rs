//! Utility toolkit for JSON web services built on actix-web.
//!
//! The crate root re-exports every helper so call sites need a single import
//! path; the modules group them by concern.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;

/// Public OpenAPI surface for the shared error shapes.
pub use doc::ApiDoc;

pub use config::ServiceSettings;
pub use domain::{
    find, format_date, get_date_from_uuid, get_time_int_from_uuid, group_by, is_email, is_empty,
    is_valid_date, logic_error, map_values, pack, pack_pairs, parse_date, parse_int_null,
    pick_keys, random_string, range, standarlize, upsert_sql, DateFormatError, Emptiness,
    LogicError, Maybe, Pair, Primitive, SqlTemplateError, TraceId, TRACE_ID_HEADER,
    UUID_EPOCH_OFFSET_TICKS,
};
pub use inbound::http::{
    create_service_callback, route_async, route_nextable_async, transform_body, transform_query,
    validate_body, validate_query, FieldRules, RouteRequest, ServiceCallback, ServiceError,
    ServiceOutcome, UnexpectedError, Validator,
};
pub use middleware::Trace;
