//! Query source resolution.
//!
//! The filter/sort specification driving a navigation call comes from one of
//! three origins: the browse query last stored in the session, a persisted
//! per-resource-type setting, or an explicit query supplied by the caller.
//! The caller's source hint is authoritative; there is no implicit fallback
//! from one origin to another.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use tower_sessions::Session;
use tracing::warn;

use super::UiScope;
use super::filter_spec::FilterSpec;
use crate::models::ResourceType;

/// Origin of the active filter/sort specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuerySource {
    Session,
    Setting,
    Explicit,
}

impl QuerySource {
    /// Parse a source hint. Unknown hints are treated as absent.
    pub fn from_hint(hint: &str) -> Option<Self> {
        match hint {
            "session" => Some(Self::Session),
            "setting" => Some(Self::Setting),
            "url" | "query" => Some(Self::Explicit),
            _ => None,
        }
    }
}

/// Explicit query supplied directly by the caller.
#[derive(Debug, Clone)]
pub enum ExplicitQuery {
    /// Already-parsed key/value pairs.
    Spec(FilterSpec),
    /// A single URL-encoded query string needing parse-back.
    Encoded(String),
}

impl ExplicitQuery {
    /// True when the caller supplied nothing usable.
    pub fn is_empty(&self) -> bool {
        match self {
            ExplicitQuery::Spec(spec) => spec.is_empty(),
            ExplicitQuery::Encoded(raw) => raw.is_empty(),
        }
    }

    fn into_spec(self) -> FilterSpec {
        match self {
            ExplicitQuery::Spec(spec) => spec,
            ExplicitQuery::Encoded(raw) => FilterSpec::from_query_string(&raw),
        }
    }
}

/// Per-session stored browse queries, keyed by (scope, resource type).
///
/// The navigation core only reads this store; the browse listing writes it.
#[async_trait]
pub trait QueryStore: Send + Sync {
    async fn browse_query(
        &self,
        scope: UiScope,
        resource_type: ResourceType,
    ) -> Result<Option<FilterSpec>>;
}

/// Persisted settings holding browse defaults.
#[async_trait]
pub trait SettingStore: Send + Sync {
    async fn setting(&self, key: &str) -> Result<Option<FilterSpec>>;
}

/// Session key under which the browse listing stores its last query.
pub fn browse_query_key(scope: UiScope, resource_type: ResourceType) -> String {
    format!("browse_query.{}.{}", scope.bucket(), resource_type.name())
}

/// Browse-query store backed by the request session.
///
/// Each instance wraps one request's session, so the resolver consumes a
/// per-call snapshot and never observes concurrent mutation.
#[derive(Clone)]
pub struct SessionQueryStore {
    session: Session,
}

impl SessionQueryStore {
    /// Wrap the current request's session.
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

#[async_trait]
impl QueryStore for SessionQueryStore {
    async fn browse_query(
        &self,
        scope: UiScope,
        resource_type: ResourceType,
    ) -> Result<Option<FilterSpec>> {
        self.session
            .get::<FilterSpec>(&browse_query_key(scope, resource_type))
            .await
            .context("failed to read browse query from session")
    }
}

/// Setting store backed by the `setting` table.
///
/// Values are stored either as a URL-encoded query string or as a flat JSON
/// object of filter keys; both decode to a `FilterSpec`.
#[derive(Clone)]
pub struct PgSettingStore {
    pool: PgPool,
}

impl PgSettingStore {
    /// Create a new store over the shared pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingStore for PgSettingStore {
    async fn setting(&self, key: &str) -> Result<Option<FilterSpec>> {
        let value: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT value FROM setting WHERE name = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .context("failed to read setting")?;

        Ok(value.and_then(|value| decode_setting(key, &value)))
    }
}

/// Decode a stored setting value into a `FilterSpec`.
fn decode_setting(key: &str, value: &serde_json::Value) -> Option<FilterSpec> {
    match value {
        serde_json::Value::String(raw) => Some(FilterSpec::from_query_string(raw)),
        serde_json::Value::Object(map) => {
            let mut spec = FilterSpec::new();
            for (k, v) in map {
                let v = match v {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Number(n) => n.to_string(),
                    serde_json::Value::Bool(b) => b.to_string(),
                    _ => continue,
                };
                spec.push(k.clone(), v);
            }
            Some(spec)
        }
        _ => {
            warn!(setting = key, "unsupported setting value shape; ignoring");
            None
        }
    }
}

/// Resolves the effective filter/sort specification for a navigation call.
pub struct QuerySourceResolver {
    settings: Arc<dyn SettingStore>,
}

impl QuerySourceResolver {
    /// Create a resolver over the persisted setting store.
    pub fn new(settings: Arc<dyn SettingStore>) -> Self {
        Self { settings }
    }

    /// Resolve the active `FilterSpec`.
    ///
    /// - No hint, no explicit query: the session-stored browse query.
    /// - No hint, explicit query present: the explicit query, no lookup.
    /// - Hinted source: that source only. A Setting hint for a type without
    ///   a defined setting key yields an empty spec.
    ///
    /// Read-only and infallible: store failures degrade to an empty spec
    /// with a warning, deferring any hard failure to sequencing.
    pub async fn resolve(
        &self,
        queries: &dyn QueryStore,
        resource_type: ResourceType,
        scope: UiScope,
        hint: Option<&str>,
        explicit: Option<ExplicitQuery>,
    ) -> FilterSpec {
        let source = match hint.and_then(QuerySource::from_hint) {
            Some(source) => source,
            None => match &explicit {
                Some(query) if !query.is_empty() => QuerySource::Explicit,
                _ => QuerySource::Session,
            },
        };

        match source {
            QuerySource::Explicit => explicit
                .map(ExplicitQuery::into_spec)
                .unwrap_or_default(),
            QuerySource::Session => match queries.browse_query(scope, resource_type).await {
                Ok(spec) => spec.unwrap_or_default(),
                Err(e) => {
                    warn!(
                        error = %e,
                        resource_type = resource_type.name(),
                        "failed to read stored browse query; navigating unfiltered"
                    );
                    FilterSpec::default()
                }
            },
            QuerySource::Setting => {
                let Some(key) = resource_type.setting_key() else {
                    return FilterSpec::default();
                };
                match self.settings.setting(key).await {
                    Ok(spec) => spec.unwrap_or_default(),
                    Err(e) => {
                        warn!(error = %e, setting = key, "failed to read browse default setting");
                        FilterSpec::default()
                    }
                }
            }
        }
    }
}
