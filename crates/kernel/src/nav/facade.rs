//! Navigation facade: the public previous/next/bundle entry points.
//!
//! Dispatches media to the parent-local sequencer and everything else
//! through query-source resolution, collection sequencing, and neighbor
//! location, then resolves neighbor ids back to full resources.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use super::UiScope;
use super::filter_spec::FilterSpec;
use super::locate::locate;
use super::media::{MediaSequencer, SiblingSource};
use super::sequencer::SequenceSource;
use super::source::{ExplicitQuery, QuerySourceResolver, QueryStore, SettingStore};
use crate::error::AppResult;
use crate::models::{Resource, ResourceReader, ResourceType};

/// Options for the combined previous/next bundle.
#[derive(Debug, Default, Clone)]
pub struct BundleOptions {
    /// Query source hint: "session", "setting", or "url".
    pub source_hint: Option<String>,

    /// Explicit query, used when the source is (or defaults to) explicit.
    pub explicit: Option<ExplicitQuery>,

    /// Opaque presentation template identifier, passed through untouched.
    pub template: Option<String>,

    /// Derive a "back to last browse" link from the session-stored query.
    pub include_back_link: bool,

    /// Return data only, even when a template identifier is present.
    pub raw: bool,
}

/// The previous/next bundle, consumable by any rendering layer.
#[derive(Debug, Serialize)]
pub struct NavBundle {
    pub previous: Option<Resource>,
    pub next: Option<Resource>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub back_link: Option<String>,

    /// Template identifier to render with, when the caller asked for a
    /// rendered presentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

/// Sequential resource navigation service.
#[derive(Clone)]
pub struct Navigator {
    inner: Arc<NavigatorInner>,
}

struct NavigatorInner {
    resolver: QuerySourceResolver,
    sequencer: Arc<dyn SequenceSource>,
    media: MediaSequencer,
    reader: Arc<dyn ResourceReader>,
}

impl Navigator {
    /// Create a navigator over its collaborators.
    pub fn new(
        settings: Arc<dyn SettingStore>,
        sequencer: Arc<dyn SequenceSource>,
        siblings: Arc<dyn SiblingSource>,
        reader: Arc<dyn ResourceReader>,
    ) -> Self {
        Self {
            inner: Arc::new(NavigatorInner {
                resolver: QuerySourceResolver::new(settings),
                sequencer,
                media: MediaSequencer::new(siblings),
                reader,
            }),
        }
    }

    /// The resource immediately preceding `resource` in its active
    /// collection, or None when there is none or it cannot be resolved.
    pub async fn previous_of(
        &self,
        resource: &Resource,
        scope: UiScope,
        queries: &dyn QueryStore,
        hint: Option<&str>,
        explicit: Option<ExplicitQuery>,
    ) -> AppResult<Option<Resource>> {
        let (previous, _) = self
            .neighbor_ids(resource, scope, queries, hint, explicit)
            .await?;
        Ok(self
            .read_neighbor(resource.resource_type(), previous)
            .await)
    }

    /// The resource immediately following `resource` in its active
    /// collection, or None when there is none or it cannot be resolved.
    pub async fn next_of(
        &self,
        resource: &Resource,
        scope: UiScope,
        queries: &dyn QueryStore,
        hint: Option<&str>,
        explicit: Option<ExplicitQuery>,
    ) -> AppResult<Option<Resource>> {
        let (_, next) = self
            .neighbor_ids(resource, scope, queries, hint, explicit)
            .await?;
        Ok(self.read_neighbor(resource.resource_type(), next).await)
    }

    /// Both neighbors plus the optional back link, in one call.
    pub async fn bundle_of(
        &self,
        resource: &Resource,
        scope: UiScope,
        queries: &dyn QueryStore,
        options: BundleOptions,
    ) -> AppResult<NavBundle> {
        let (previous_id, next_id) = self
            .neighbor_ids(
                resource,
                scope,
                queries,
                options.source_hint.as_deref(),
                options.explicit.clone(),
            )
            .await?;

        let resource_type = resource.resource_type();
        let previous = self.read_neighbor(resource_type, previous_id).await;
        let next = self.read_neighbor(resource_type, next_id).await;

        let back_link = if options.include_back_link {
            self.back_link(resource, scope, queries).await
        } else {
            None
        };

        Ok(NavBundle {
            previous,
            next,
            back_link,
            template: if options.raw { None } else { options.template },
        })
    }

    /// Neighbor ids for one navigation call.
    async fn neighbor_ids(
        &self,
        resource: &Resource,
        scope: UiScope,
        queries: &dyn QueryStore,
        hint: Option<&str>,
        explicit: Option<ExplicitQuery>,
    ) -> AppResult<(Option<Uuid>, Option<Uuid>)> {
        match resource {
            // Media navigates within its parent and ignores the query
            // machinery entirely.
            Resource::Media(media) => self.inner.media.adjacent(media).await,
            _ => {
                let resource_type = resource.resource_type();
                let spec = self
                    .inner
                    .resolver
                    .resolve(queries, resource_type, scope, hint, explicit)
                    .await;
                let sequence = self
                    .inner
                    .sequencer
                    .sequence(resource_type, scope, &spec)
                    .await?;
                Ok(locate(&sequence, resource.id()))
            }
        }
    }

    /// Resolve a neighbor id to a full resource.
    ///
    /// A read-back failure for one neighbor must not fail the whole call;
    /// the record may have been deleted between sequencing and read.
    async fn read_neighbor(
        &self,
        resource_type: ResourceType,
        id: Option<Uuid>,
    ) -> Option<Resource> {
        let id = id?;
        match self.inner.reader.read(resource_type, id).await {
            Ok(resource) => resource,
            Err(e) => {
                warn!(error = %e, %id, "neighbor read-back failed");
                None
            }
        }
    }

    /// Link back to the browse view the user last saw, re-encoded from the
    /// session-stored query. Media links back to its parent item instead.
    async fn back_link(
        &self,
        resource: &Resource,
        scope: UiScope,
        queries: &dyn QueryStore,
    ) -> Option<String> {
        if let Resource::Media(media) = resource {
            return Some(match scope {
                UiScope::Admin => format!("/admin/items/{}", media.item_id),
                UiScope::Public(site_id) => format!("/s/{}/items/{}", site_id, media.item_id),
            });
        }

        let resource_type = resource.resource_type();
        let spec = match queries.browse_query(scope, resource_type).await {
            Ok(spec) => spec.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "failed to read stored browse query for back link");
                FilterSpec::default()
            }
        };

        let base = match scope {
            UiScope::Admin => format!("/admin/{}", resource_type.name()),
            UiScope::Public(site_id) => format!("/s/{}/{}", site_id, resource_type.name()),
        };
        let query = spec.to_query_string();
        Some(if query.is_empty() {
            base
        } else {
            format!("{base}?{query}")
        })
    }
}
