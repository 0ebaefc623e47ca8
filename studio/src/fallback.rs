//! Single-endpoint fallback catalog built from the legacy secret.
//!
//! Used only when `models.yaml` is missing or invalid. The secret is looked up through a
//! [`SecretSource`] (normally `secrets.toml` with env fallback).

use env_config::SecretSource;

use crate::catalog::ModelConfig;

/// Secret holding the legacy single model endpoint.
pub const LEGACY_ENDPOINT_KEY: &str = "REPLICATE_MODEL_ENDPOINTSTABILITY";
/// Secret holding the API token; consumed by the generation call, only reported here.
pub const API_TOKEN_KEY: &str = "REPLICATE_API_TOKEN";
/// Test sentinel that means "endpoint not configured".
pub const PLACEHOLDER_ENDPOINT: &str = "stability-ai/sdxl:test-version";
/// Test sentinel that means "token not configured".
pub const PLACEHOLDER_API_TOKEN: &str = "test-token-12345";

pub const FALLBACK_MODEL_ID: &str = "default";
pub const FALLBACK_MODEL_NAME: &str = "Default Model (from secrets.toml)";

/// Legacy endpoint when it is set, non-blank and not the placeholder.
pub fn legacy_endpoint(secrets: &impl SecretSource) -> Option<String> {
    let value = secrets.secret(LEGACY_ENDPOINT_KEY)?;
    let value = value.trim();
    if value.is_empty() || value == PLACEHOLDER_ENDPOINT {
        return None;
    }
    Some(value.to_string())
}

/// Synthesizes the one-entry fallback catalog, or `None` when no usable endpoint exists.
pub fn resolve_fallback(secrets: &impl SecretSource) -> Option<ModelConfig> {
    let Some(endpoint) = legacy_endpoint(secrets) else {
        tracing::warn!(key = LEGACY_ENDPOINT_KEY, "no usable fallback endpoint");
        return None;
    };
    tracing::info!(endpoint = %endpoint, "using fallback model from secrets");
    Some(ModelConfig::new(FALLBACK_MODEL_ID, FALLBACK_MODEL_NAME, endpoint))
}

/// Whether a real (non-placeholder, non-blank) API token is available.
pub fn api_token_configured(secrets: &impl SecretSource) -> bool {
    secrets
        .secret(API_TOKEN_KEY)
        .map(|t| {
            let t = t.trim();
            !t.is_empty() && t != PLACEHOLDER_API_TOKEN
        })
        .unwrap_or(false)
}
