//! OpenAPI specification for the gatecard relay.

use utoipa::OpenApi;

use gatecard_core::{AnalysisReport, Branch, Condition, Project, QualityGate};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::sonar_webhook,
        crate::routes::healthz,
        crate::routes::openapi_json
    ),
    components(schemas(AnalysisReport, Project, Branch, QualityGate, Condition)),
    tags(
        (name = "webhook", description = "Inbound analysis notifications"),
        (name = "system", description = "System endpoints")
    )
)]
/// OpenAPI specification for the gatecard relay.
pub struct ApiDoc;
