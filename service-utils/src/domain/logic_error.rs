//! Application-level errors that carry their own HTTP status.
//!
//! A [`LogicError`] is raised when a business rule rejects a request. It is
//! always safe to serialise and return to the caller, so inbound adapters
//! send it verbatim inside the response envelope.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Primitive context parameter attached to a [`LogicError`].
///
/// Serialised untagged so `pars` renders as a plain JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Primitive {
    /// Boolean flag.
    Bool(bool),
    /// Whole number.
    Integer(i64),
    /// Fractional number.
    Float(f64),
    /// Free text.
    Text(String),
}

impl From<&str> for Primitive {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Primitive {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for Primitive {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Primitive {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Primitive {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for Primitive {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Primitive {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// Business-rule violation surfaced to an HTTP caller.
///
/// ## Invariants
/// - Immutable after construction; accessors only.
/// - Serialises to exactly `{httpCode, code, title, message, pars}`.
///
/// # Examples
/// ```
/// use service_utils::domain::logic_error;
/// use serde_json::json;
///
/// let err = logic_error("T", "M", 404, 10, ["x"]);
/// assert_eq!(
///     err.to_json(),
///     json!({"httpCode": 404, "code": 10, "title": "T", "message": "M", "pars": ["x"]})
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogicError {
    #[schema(example = 404)]
    http_code: u16,
    #[schema(example = 1001)]
    code: i64,
    #[schema(example = "Order not found")]
    title: String,
    #[schema(example = "No order exists with the supplied reference")]
    message: String,
    #[schema(value_type = Vec<Object>)]
    pars: Vec<Primitive>,
}

impl LogicError {
    /// Build a logic error from its parts.
    pub fn new<I, P>(
        title: impl Into<String>,
        message: impl Into<String>,
        http_code: u16,
        code: i64,
        pars: I,
    ) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Primitive>,
    {
        Self {
            http_code,
            code,
            title: title.into(),
            message: message.into(),
            pars: pars.into_iter().map(Into::into).collect(),
        }
    }

    /// HTTP status the caller should receive.
    pub fn http_code(&self) -> u16 {
        self.http_code
    }

    /// Application-specific error code.
    pub fn code(&self) -> i64 {
        self.code
    }

    /// Short human-readable title.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Human-readable explanation.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Context parameters in the order supplied.
    pub fn pars(&self) -> &[Primitive] {
        &self.pars
    }

    /// Render the wire representation.
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "httpCode": self.http_code,
            "code": self.code,
            "title": self.title,
            "message": self.message,
            "pars": self.pars,
        })
    }
}

impl fmt::Display for LogicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LogicError {}

/// Construct a [`LogicError`].
///
/// Free-function form of [`LogicError::new`] for call sites that build errors
/// inline.
pub fn logic_error<I, P>(
    title: impl Into<String>,
    message: impl Into<String>,
    http_code: u16,
    logic_err_code: i64,
    pars: I,
) -> LogicError
where
    I: IntoIterator<Item = P>,
    P: Into<Primitive>,
{
    LogicError::new(title, message, http_code, logic_err_code, pars)
}

#[cfg(test)]
mod tests {
    //! Wire-shape coverage for logic errors.

    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn to_json_matches_wire_shape() {
        let err = logic_error("T", "M", 404, 10, ["x"]);
        assert_eq!(
            err.to_json(),
            json!({"httpCode": 404, "code": 10, "title": "T", "message": "M", "pars": ["x"]})
        );
    }

    #[rstest]
    fn serde_and_to_json_agree() {
        let err = logic_error(
            "Quota",
            "quota exceeded",
            429,
            7,
            [Primitive::from("daily"), Primitive::from(3), Primitive::from(true)],
        );
        let serialised = serde_json::to_value(&err).expect("serialise logic error");
        assert_eq!(serialised, err.to_json());
        assert_eq!(serialised["pars"], json!(["daily", 3, true]));
    }

    #[rstest]
    fn empty_pars_render_as_empty_array() {
        let err = logic_error("T", "M", 400, 1, Vec::<Primitive>::new());
        assert_eq!(err.to_json()["pars"], json!([]));
    }

    #[rstest]
    fn display_uses_message() {
        let err = logic_error("Title", "the message", 409, 2, ["a"]);
        assert_eq!(err.to_string(), "the message");
    }

    #[rstest]
    #[case(Primitive::from(1.5), "1.5")]
    #[case(Primitive::from(false), "false")]
    #[case(Primitive::from(-4), "-4")]
    #[case(Primitive::from("id"), "id")]
    fn primitives_display_plainly(#[case] value: Primitive, #[case] expected: &str) {
        assert_eq!(value.to_string(), expected);
    }

    #[rstest]
    fn deserialises_from_wire_shape() {
        let err: LogicError = serde_json::from_value(json!({
            "httpCode": 403, "code": 5, "title": "T", "message": "M", "pars": [1, "b"]
        }))
        .expect("deserialise logic error");
        assert_eq!(err.http_code(), 403);
        assert_eq!(err.pars(), &[Primitive::Integer(1), Primitive::from("b")]);
    }
}
