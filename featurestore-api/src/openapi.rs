//! OpenAPI document for the feature store's `/api/v1` surface, gated behind
//! the `openapi` feature.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::{ErrorBody, ErrorCode};
use crate::types::*;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Feature Store API",
        version = "0.4.0",
        description = "Two-tier cache-plus-durable-store online and batch feature serving"
    ),
    tags(
        (name = "Features", description = "Online and batch feature reads, registration"),
        (name = "Cache", description = "Cache invalidation"),
        (name = "Health", description = "Liveness and readiness probes")
    ),
    components(
        schemas(
            Source, OnlineFeatureRequest, FeatureReading, OnlineFeatureResponse,
            BatchFeatureRequest, BatchFeatureValue, BatchFeatureResponse,
            RegisterFeatureRequest, RegisterFeatureResponse, ListFeaturesResponse,
            InvalidateResponse, HealthResponse, ReadyResponse,
            ErrorCode, ErrorBody,
            featurestore_core::FeatureSchema, featurestore_core::DType,
            featurestore_core::FeatureValueData,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-API-Key"))),
            );
        }
    }
}

impl ApiDoc {
    pub fn to_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_has_expected_metadata() {
        let doc = ApiDoc::openapi();
        assert_eq!(doc.info.title, "Feature Store API");
        let components = doc.components.expect("components present");
        assert!(components.security_schemes.contains_key("api_key"));
    }

    #[test]
    fn openapi_serializes_to_json() {
        let json = ApiDoc::to_json().expect("serializes");
        assert!(json.contains("Feature Store API"));
    }
}
