//! Request payload validators.
//!
//! Validators inspect a JSON value (the request body, or the query string as
//! an object of strings) and report every problem they find as a
//! [`ValidationIssue`]. The payload middleware turns a failed validation into
//! a 400 response.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::domain::{is_email, is_valid_date};

/// Validation failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueCode {
    /// A required field is absent or `null`.
    MissingField,
    /// A field holds the wrong JSON kind.
    InvalidType,
    /// A field is not an e-mail address.
    InvalidEmail,
    /// A field is not a date in the expected format.
    InvalidDate,
    /// The payload is not parseable JSON.
    InvalidJson,
    /// The body could not be read in full.
    UnreadableBody,
    /// Reported by a caller-supplied validator.
    Custom,
}

impl IssueCode {
    /// Stable wire identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidType => "invalid_type",
            Self::InvalidEmail => "invalid_email",
            Self::InvalidDate => "invalid_date",
            Self::InvalidJson => "invalid_json",
            Self::UnreadableBody => "unreadable_body",
            Self::Custom => "custom",
        }
    }
}

/// One validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
    code: &'static str,
    message: String,
}

impl ValidationIssue {
    /// Issue attached to a named field.
    pub fn field(field: impl Into<String>, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            code: code.as_str(),
            message: message.into(),
        }
    }

    /// Issue about the payload as a whole.
    pub fn payload(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            field: None,
            code: code.as_str(),
            message: message.into(),
        }
    }

    /// Offending field, if any.
    pub fn field_name(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Wire identifier of the failure category.
    pub fn code(&self) -> &str {
        self.code
    }

    /// Human-readable explanation.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Every issue reported by a validator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<ValidationIssue>);

impl ValidationErrors {
    /// Empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collection holding a single issue.
    pub fn single(issue: ValidationIssue) -> Self {
        Self(vec![issue])
    }

    /// Record another issue.
    pub fn push(&mut self, issue: ValidationIssue) {
        self.0.push(issue);
    }

    /// Returns `true` when nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Recorded issues in report order.
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.0
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(ValidationIssue::message).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Checks a JSON payload.
pub trait Validator: 'static {
    /// `Ok(())` when the payload is acceptable.
    fn validate(&self, value: &Value) -> Result<(), ValidationErrors>;
}

impl<F> Validator for F
where
    F: Fn(&Value) -> Result<(), ValidationErrors> + 'static,
{
    fn validate(&self, value: &Value) -> Result<(), ValidationErrors> {
        self(value)
    }
}

/// JSON kinds a field may be constrained to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    /// JSON string.
    String,
    /// Any JSON number.
    Number,
    /// A number without a fractional part.
    Integer,
    /// `true` or `false`.
    Boolean,
    /// JSON array.
    Array,
    /// JSON object.
    Object,
}

impl JsonKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Number => "a number",
            Self::Integer => "an integer",
            Self::Boolean => "a boolean",
            Self::Array => "an array",
            Self::Object => "an object",
        }
    }
}

#[derive(Debug, Clone)]
enum Rule {
    Required,
    Kind(JsonKind),
    Email,
    Date(String),
}

/// Declarative per-field validator.
///
/// Rules other than `required` only apply when the field is present, so
/// optional fields can still be constrained.
///
/// # Examples
/// ```
/// use service_utils::inbound::http::{FieldRules, JsonKind, Validator};
/// use serde_json::json;
///
/// let rules = FieldRules::new()
///     .required("email")
///     .email("email")
///     .kind("age", JsonKind::Integer);
///
/// assert!(rules.validate(&json!({"email": "a@example.com", "age": 3})).is_ok());
/// assert!(rules.validate(&json!({"age": "3"})).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FieldRules {
    rules: Vec<(String, Rule)>,
}

impl FieldRules {
    /// No rules; accepts any object.
    pub fn new() -> Self {
        Self::default()
    }

    /// `field` must be present and not `null`.
    #[must_use]
    pub fn required(self, field: impl Into<String>) -> Self {
        self.with_rule(field, Rule::Required)
    }

    /// `field`, when present, must be of `kind`.
    #[must_use]
    pub fn kind(self, field: impl Into<String>, kind: JsonKind) -> Self {
        self.with_rule(field, Rule::Kind(kind))
    }

    /// `field`, when present, must be an e-mail address.
    #[must_use]
    pub fn email(self, field: impl Into<String>) -> Self {
        self.with_rule(field, Rule::Email)
    }

    /// `field`, when present, must be a date string in `format`.
    #[must_use]
    pub fn date(self, field: impl Into<String>, format: impl Into<String>) -> Self {
        self.with_rule(field, Rule::Date(format.into()))
    }

    fn with_rule(mut self, field: impl Into<String>, rule: Rule) -> Self {
        self.rules.push((field.into(), rule));
        self
    }
}

fn check_rule(field: &str, rule: &Rule, value: Option<&Value>) -> Option<ValidationIssue> {
    let present = value.filter(|v| !v.is_null());
    match (rule, present) {
        (Rule::Required, None) => Some(ValidationIssue::field(
            field,
            IssueCode::MissingField,
            format!("missing required field: {field}"),
        )),
        (Rule::Kind(kind), Some(v)) if !kind.matches(v) => Some(ValidationIssue::field(
            field,
            IssueCode::InvalidType,
            format!("{field} must be {}", kind.name()),
        )),
        (Rule::Email, Some(v)) if !v.as_str().is_some_and(is_email) => Some(ValidationIssue::field(
            field,
            IssueCode::InvalidEmail,
            format!("{field} must be a valid e-mail address"),
        )),
        (Rule::Date(format), Some(v))
            if !v.as_str().is_some_and(|text| is_valid_date(text, format)) =>
        {
            Some(ValidationIssue::field(
                field,
                IssueCode::InvalidDate,
                format!("{field} must be a date in format {format}"),
            ))
        }
        _ => None,
    }
}

impl Validator for FieldRules {
    fn validate(&self, value: &Value) -> Result<(), ValidationErrors> {
        let Some(object) = value.as_object() else {
            return Err(ValidationErrors::single(ValidationIssue::payload(
                IssueCode::InvalidType,
                "payload must be a JSON object",
            )));
        };

        let mut errors = ValidationErrors::new();
        for (field, rule) in &self.rules {
            if let Some(issue) = check_rule(field, rule, object.get(field)) {
                errors.push(issue);
            }
        }
        errors.into_result()
    }
}
