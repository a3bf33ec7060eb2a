//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the provisioning endpoints and the schema wrappers
//! from [`crate::inbound::http::schemas`], keeping domain types free of utoipa
//! derives. Swagger UI serves the document in debug builds.

use crate::inbound::http::schemas::{
    AuthenticatedUserSchema, ErrorCodeSchema, ErrorSchema, LoginEnvelopeSchema,
    ProvisionedUserSchema,
};
use crate::inbound::http::users::CreateUserRequest;
use crate::inbound::http::login::LoginRequest;
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Accounts API",
        description = "Provisioning of user accounts across the identity store and the profile service."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::get_user,
        crate::inbound::http::login::login,
    ),
    components(schemas(
        CreateUserRequest,
        LoginRequest,
        ProvisionedUserSchema,
        AuthenticatedUserSchema,
        LoginEnvelopeSchema,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "users", description = "Account provisioning and sign-in")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI schema field structure.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

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

    #[rstest]
    #[case("Error", &["code", "message", "traceId"])]
    #[case("ProvisionedUser", &["id", "email", "created"])]
    #[case("LoginEnvelope", &["succeeded", "statusCode", "errorMessage", "data"])]
    #[case("CreateUserRequest", &["firstName", "lastName", "email", "password"])]
    fn registered_schemas_expose_wire_fields(#[case] name: &str, #[case] fields: &[&str]) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get(name).expect("schema registered");
        for field in fields {
            assert_object_schema_has_field(schema, field);
        }
    }

    #[rstest]
    fn provisioning_paths_are_documented() {
        let doc = ApiDoc::openapi();
        for path in ["/api/v1/users", "/api/v1/users/{id}", "/api/v1/login"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
