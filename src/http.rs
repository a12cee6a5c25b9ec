//! HTTP surface: language management, overrides, and the public message
//! endpoint.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{FromRequestParts, Path, State};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::compose::{compose, MessageCache};
use crate::error::ApiError;
use crate::lifecycle::TranslationStatus;
use crate::orchestrator::{spawn_translation_job, JobRegistry};
use crate::provider::TranslationProvider;
use crate::store::Store;
use crate::tenant::{resolve_tenant, RequestIdentity, Tenant};

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub provider: Arc<dyn TranslationProvider>,
    pub jobs: JobRegistry,
    pub base_template: Arc<Value>,
    pub messages: MessageCache,
    pub provider_timeout: Duration,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/messages/:lang", get(get_messages))
        .route("/api/translation/languages/:tenant", get(list_languages))
        .route("/api/translation/add-language", post(add_language))
        .route(
            "/api/translation/language/:tenant/:lang",
            delete(delete_language),
        )
        .route("/api/translation/publish", post(publish_language))
        .route(
            "/api/translation/overrides/:tenant/:lang",
            get(list_overrides),
        )
        .route("/api/translation/save-override", post(save_override))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The tenant resolved for this request. Resolution failure rejects the
/// request with 404 before the handler runs.
pub struct ActiveTenant(pub Tenant);

#[axum::async_trait]
impl FromRequestParts<AppState> for ActiveTenant {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = RequestIdentity {
            force_tenant: query_param(parts.uri.query(), "forceTenant")
                .and_then(|v| v.parse().ok()),
            header_tenant: parts
                .headers
                .get("x-tenant-id")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok()),
            host: parts
                .headers
                .get(header::HOST)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        };
        let tenant = resolve_tenant(&state.store, &identity)?;
        tenant.map(ActiveTenant).ok_or(ApiError::TenantNotFound)
    }
}

fn query_param<'a>(query: Option<&'a str>, name: &str) -> Option<&'a str> {
    query?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Language codes are stored lowercase; every handler normalizes the same
/// way so "SK" and "sk" address the same binding.
fn normalize_language(raw: &str) -> Result<String, ApiError> {
    let language = raw.trim().to_lowercase();
    if language.is_empty() {
        return Err(ApiError::EmptyLanguageCode);
    }
    Ok(language)
}

// ==================== Request / Response Bodies ====================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LanguageSummary {
    language_code: String,
    status: TranslationStatus,
    is_default: bool,
    progress: u8,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddLanguageRequest {
    company_id: i64,
    target_language: String,
    /// Flat key→text map of the source-language UI strings, captured by the
    /// caller when the job is requested.
    #[serde(default)]
    base_ui_translations: Option<BTreeMap<String, String>>,
    #[serde(default = "default_use_ai")]
    use_ai: bool,
}

fn default_use_ai() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishRequest {
    company_id: i64,
    language_code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveOverrideRequest {
    company_id: i64,
    language_code: String,
    key: String,
    value: String,
}

// ==================== Handlers ====================

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Every language the tenant serves, the default language first as an
/// implicit `Published`/100 entry that is never stored.
async fn list_languages(
    State(state): State<AppState>,
    Path(tenant_id): Path<i64>,
) -> Result<Json<Vec<LanguageSummary>>, ApiError> {
    let tenant = state
        .store
        .get_tenant(tenant_id)?
        .ok_or(ApiError::TenantNotFound)?;

    let mut languages = vec![LanguageSummary {
        language_code: tenant.default_language.clone(),
        status: TranslationStatus::Published,
        is_default: true,
        progress: 100,
    }];
    for binding in state.store.list_bindings(tenant_id)? {
        languages.push(LanguageSummary {
            language_code: binding.language_code,
            status: binding.status,
            is_default: false,
            progress: binding.progress,
        });
    }
    Ok(Json(languages))
}

/// Add a language to a tenant. With `useAi` a detached translation job is
/// started (202); without, the binding goes straight to `ReviewPending` for
/// manual translation (200).
async fn add_language(
    State(state): State<AppState>,
    Json(request): Json<AddLanguageRequest>,
) -> Result<Response, ApiError> {
    let language = normalize_language(&request.target_language)?;
    let tenant = state
        .store
        .get_tenant(request.company_id)?
        .ok_or(ApiError::TenantNotFound)?;
    if tenant.default_language.eq_ignore_ascii_case(&language) {
        return Err(ApiError::DefaultLanguageAdd(language));
    }

    if !request.use_ai {
        state
            .store
            .upsert_binding(tenant.id, &language, TranslationStatus::ReviewPending, 0)?;
        info!(
            "Language '{}' added without AI for tenant {}",
            language, tenant.id
        );
        return Ok((
            StatusCode::OK,
            Json(json!({ "languageCode": language, "status": TranslationStatus::ReviewPending })),
        )
            .into_response());
    }

    let permit = state
        .jobs
        .try_acquire(tenant.id, &language)
        .ok_or_else(|| ApiError::JobAlreadyRunning(language.clone()))?;

    state
        .store
        .upsert_binding(tenant.id, &language, TranslationStatus::Translating, 0)?;
    info!(
        "Starting translation job for tenant {} language '{}'",
        tenant.id, language
    );
    spawn_translation_job(
        state.store.clone(),
        Arc::clone(&state.provider),
        state.provider_timeout,
        tenant.id,
        language.clone(),
        request.base_ui_translations,
        permit,
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "languageCode": language, "status": TranslationStatus::Translating })),
    )
        .into_response())
}

/// Remove a language: its binding and override entries go; translated values
/// inside multilingual content fields stay behind as unreferenced keys.
async fn delete_language(
    State(state): State<AppState>,
    Path((tenant_id, language)): Path<(i64, String)>,
) -> Result<StatusCode, ApiError> {
    let language = normalize_language(&language)?;
    let tenant = state
        .store
        .get_tenant(tenant_id)?
        .ok_or(ApiError::TenantNotFound)?;
    if tenant.default_language.eq_ignore_ascii_case(&language) {
        return Err(ApiError::DefaultLanguageDeletion);
    }

    if !state.store.delete_binding(tenant_id, &language)? {
        return Err(ApiError::LanguageNotFound(language));
    }
    let removed = state
        .store
        .delete_overrides_for_language(tenant_id, &language)?;
    state.messages.invalidate(tenant_id, &language);
    info!(
        "Removed language '{}' from tenant {} ({} overrides dropped)",
        language, tenant_id, removed
    );
    Ok(StatusCode::NO_CONTENT)
}

/// Promote a reviewed language to `Published`. Only valid from
/// `ReviewPending`.
async fn publish_language(
    State(state): State<AppState>,
    Json(request): Json<PublishRequest>,
) -> Result<Json<Value>, ApiError> {
    let language = normalize_language(&request.language_code)?;
    state
        .store
        .get_tenant(request.company_id)?
        .ok_or(ApiError::TenantNotFound)?;
    let binding = state
        .store
        .get_binding(request.company_id, &language)?
        .ok_or_else(|| ApiError::LanguageNotFound(language.clone()))?;

    if binding.status != TranslationStatus::ReviewPending {
        return Err(ApiError::PublishNotAllowed {
            code: language,
            status: binding.status,
        });
    }

    state.store.update_binding_status(
        request.company_id,
        &language,
        TranslationStatus::Published,
    )?;
    info!(
        "Published language '{}' for tenant {}",
        language, request.company_id
    );
    Ok(Json(
        json!({ "languageCode": language, "status": TranslationStatus::Published }),
    ))
}

async fn list_overrides(
    State(state): State<AppState>,
    Path((tenant_id, language)): Path<(i64, String)>,
) -> Result<Json<BTreeMap<String, String>>, ApiError> {
    let language = normalize_language(&language)?;
    state
        .store
        .get_tenant(tenant_id)?
        .ok_or(ApiError::TenantNotFound)?;
    Ok(Json(state.store.list_overrides(tenant_id, &language)?))
}

async fn save_override(
    State(state): State<AppState>,
    Json(request): Json<SaveOverrideRequest>,
) -> Result<Json<Value>, ApiError> {
    let key = request.key.trim();
    if key.is_empty() {
        return Err(ApiError::EmptyOverrideKey);
    }
    let language = normalize_language(&request.language_code)?;
    state
        .store
        .get_tenant(request.company_id)?
        .ok_or(ApiError::TenantNotFound)?;

    state
        .store
        .upsert_override(request.company_id, &language, key, &request.value)?;
    state.messages.invalidate(request.company_id, &language);
    Ok(Json(json!({ "status": "ok" })))
}

/// The public read path: the complete message tree for one language of the
/// resolved tenant. Base template, then the cached composed tree, then live
/// overrides, later layers winning per key.
async fn get_messages(
    State(state): State<AppState>,
    ActiveTenant(tenant): ActiveTenant,
    Path(language): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let language = normalize_language(&language)?;
    let cached = state.messages.get(tenant.id, &language);
    let overrides = state.store.list_overrides(tenant.id, &language)?;
    let tree = compose(&state.base_template, cached.as_ref(), &overrides);
    state.messages.put(tenant.id, &language, tree.clone());
    Ok(Json(tree))
}
