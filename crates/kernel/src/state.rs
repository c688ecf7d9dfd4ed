//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tera::Tera;
use tracing::info;

use crate::config::Config;
use crate::db;
use crate::models::{PgResourceReader, ResourceReader};
use crate::nav::{CollectionSequencer, Navigator, PgSettingStore, PgSiblingSource};

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// PostgreSQL connection pool.
    db: PgPool,

    /// Navigation service over its PostgreSQL-backed collaborators.
    navigator: Navigator,

    /// Point read-back for resolving the resource being viewed.
    reader: Arc<dyn ResourceReader>,

    /// Template engine for rendered navigation fragments, when configured.
    templates: Option<Tera>,
}

impl AppState {
    /// Initialize application state: connect to the database and wire the
    /// navigation collaborators.
    pub async fn new(config: &Config) -> Result<Self> {
        let db = db::create_pool(config).await?;
        Self::with_pool(config, db)
    }

    /// Build state over an existing pool (used by tests).
    pub fn with_pool(config: &Config, db: PgPool) -> Result<Self> {
        let reader: Arc<dyn ResourceReader> = Arc::new(PgResourceReader::new(db.clone()));
        let navigator = Navigator::new(
            Arc::new(PgSettingStore::new(db.clone())),
            Arc::new(CollectionSequencer::new(db.clone())),
            Arc::new(PgSiblingSource::new(db.clone())),
            reader.clone(),
        );

        let templates = match &config.templates_dir {
            Some(dir) => {
                let pattern = format!("{}/**/*.html", dir.display());
                let tera = Tera::new(&pattern).context("failed to initialize Tera templates")?;
                info!(dir = %dir.display(), "Templates loaded");
                Some(tera)
            }
            None => None,
        };

        Ok(Self {
            inner: Arc::new(AppStateInner {
                db,
                navigator,
                reader,
                templates,
            }),
        })
    }

    /// Database connection pool.
    pub fn db(&self) -> &PgPool {
        &self.inner.db
    }

    /// Navigation service.
    pub fn navigator(&self) -> &Navigator {
        &self.inner.navigator
    }

    /// Resource read-back service.
    pub fn reader(&self) -> &Arc<dyn ResourceReader> {
        &self.inner.reader
    }

    /// Template engine, when a template directory is configured.
    pub fn templates(&self) -> Option<&Tera> {
        self.inner.templates.as_ref()
    }

    /// Check PostgreSQL connectivity.
    pub async fn postgres_healthy(&self) -> bool {
        db::check_health(&self.inner.db).await
    }
}
