//! OpenAPI documentation of the wire shapes services share.
//!
//! Services built on this crate answer failures with the `{"err": ...}`
//! envelope; [`ApiDoc`] registers that envelope and the [`LogicError`] body so
//! consumers can merge them into their own documents.

use utoipa::{OpenApi, ToSchema};

use crate::domain::LogicError;

/// Failure envelope written by the response callback.
#[derive(ToSchema)]
#[schema(as = ErrorEnvelope)]
pub struct ErrorEnvelopeSchema {
    /// The error body.
    pub err: LogicError,
}

/// OpenAPI document for the shared error shapes.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "service-utils",
        description = "Error envelope shared by services using the route adapters."
    ),
    components(schemas(LogicError, ErrorEnvelopeSchema))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI schema field structure.

    use super::*;
    use utoipa::openapi::schema::Schema;
    use utoipa::openapi::RefOr;

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn logic_error_schema_uses_wire_field_names() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get("LogicError").expect("LogicError schema");

        for field in ["httpCode", "code", "title", "message", "pars"] {
            assert_object_schema_has_field(schema, field);
        }
    }

    #[test]
    fn envelope_schema_wraps_err() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get("ErrorEnvelope").expect("ErrorEnvelope schema");

        assert_object_schema_has_field(schema, "err");
    }
}
