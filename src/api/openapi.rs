use crate::api::handlers;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::register::register,
        handlers::login::login,
        handlers::session::session,
        handlers::logout::logout,
    ),
    components(schemas(
        handlers::ErrorBody,
        handlers::register::RegistrationRequest,
        handlers::register::RegisteredBody,
        handlers::login::LoginRequest,
        handlers::login::SessionIssued,
        handlers::logout::SignedOut,
        crate::session::SessionView,
        crate::session::SessionUser,
    )),
    modifiers(&SessionTokenSecurity),
    tags(
        (name = "auth", description = "Registration, login and session endpoints"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

struct SessionTokenSecurity;

impl Modify for SessionTokenSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_token",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}
