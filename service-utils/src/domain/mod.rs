//! Transport-agnostic helpers.
//!
//! Purpose: stateless building blocks shared by service code. Nothing here
//! knows about HTTP; inbound adapters translate these types onto the wire.
//!
//! Public surface:
//! - LogicError / Primitive: business-rule failure with its HTTP status.
//! - Maybe: safe navigation over JSON values.
//! - Pair, pack, pack_pairs: ordered pairs and longest-input zipping.
//! - UUID v1 timestamp recovery, text, date and SQL templating helpers.
//! - TraceId: request-scoped correlation identifier.

pub mod collections;
pub mod dates;
pub mod emptiness;
pub mod logic_error;
pub mod maybe;
pub mod pairing;
pub mod sql;
pub mod text;
pub mod trace_id;
pub mod uuid_time;

pub use self::collections::{find, group_by, map_values, pick_keys};
pub use self::dates::{format_date, is_valid_date, parse_date, DateFormatError};
pub use self::emptiness::{is_empty, Emptiness};
pub use self::logic_error::{logic_error, LogicError, Primitive};
pub use self::maybe::Maybe;
pub use self::pairing::{pack, pack_pairs, Pair};
pub use self::sql::{upsert_sql, SqlTemplateError};
pub use self::text::{is_email, parse_int_null, random_string, range, standarlize};
pub use self::trace_id::{TraceId, TRACE_ID_HEADER};
pub use self::uuid_time::{get_date_from_uuid, get_time_int_from_uuid, UUID_EPOCH_OFFSET_TICKS};
