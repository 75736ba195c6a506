use axum::{http::StatusCode, response::IntoResponse, Json};
use utoipa::OpenApi;

use crate::handlers;
use crate::lead::{CreateLeadData, LeadContact, LeadStatus};
use crate::models::LeadResource;

#[derive(OpenApi)]
#[openapi(
    info(title = "Company Leads API", description = "Create, list, accept and decline leads"),
    paths(
        handlers::health,
        handlers::query_leads,
        handlers::get_lead,
        handlers::create_lead,
        handlers::accept_lead,
        handlers::decline_lead,
        handlers::delete_lead,
    ),
    components(schemas(LeadResource, LeadContact, CreateLeadData, LeadStatus)),
    tags(
        (name = "leads", description = "Lead management"),
        (name = "health", description = "Liveness and storage probe")
    )
)]
pub struct ApiDoc;

/// Serves the OpenAPI document generated from the handler annotations.
pub async fn serve_openapi_spec() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Serves the Swagger UI HTML page.
///
/// The page loads the Swagger UI bundle from a CDN and points it at [`serve_openapi_spec`].
pub async fn serve_swagger_ui() -> impl IntoResponse {
    let html = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Company Leads API - Swagger UI</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        body { margin: 0; padding: 0; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = function() {
            window.ui = SwaggerUIBundle({
                url: "/api-docs/openapi.json",
                dom_id: '#swagger-ui',
                deepLinking: true,
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout"
            });
        };
    </script>
</body>
</html>
"#;
    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
}
