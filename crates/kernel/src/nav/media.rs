//! Media navigation within a parent item.
//!
//! Media has no independent browse surface, only an ordering inside its
//! parent, so its navigation bypasses the query-source and sequencing
//! machinery entirely: previous/next is a single walk over the parent's
//! ordered media list.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::locate::locate;
use crate::error::AppResult;
use crate::models::Media;

/// Capability: the ordered media ids of one parent item, in the order the
/// parent maintains them.
#[async_trait]
pub trait SiblingSource: Send + Sync {
    async fn sibling_ids(&self, item_id: Uuid) -> Result<Vec<Uuid>>;
}

/// PostgreSQL-backed sibling source.
#[derive(Clone)]
pub struct PgSiblingSource {
    pool: PgPool,
}

impl PgSiblingSource {
    /// Create a new source over the shared pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SiblingSource for PgSiblingSource {
    async fn sibling_ids(&self, item_id: Uuid) -> Result<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM media WHERE item_id = $1 ORDER BY position ASC, id ASC",
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await
        .context("failed to load sibling media order")
    }
}

/// Previous/next navigation over a parent's media order.
pub struct MediaSequencer {
    source: Arc<dyn SiblingSource>,
}

impl MediaSequencer {
    /// Create a sequencer over the sibling-order source.
    pub fn new(source: Arc<dyn SiblingSource>) -> Self {
        Self { source }
    }

    /// Neighbor ids of a media record within its parent's order.
    ///
    /// A target missing from the parent's list degrades to `(None, None)`,
    /// matching the top-level locator's policy.
    pub async fn adjacent(&self, media: &Media) -> AppResult<(Option<Uuid>, Option<Uuid>)> {
        let siblings = self.source.sibling_ids(media.item_id).await?;
        Ok(locate(&siblings, media.id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    struct FakeSiblings(Vec<Uuid>);

    #[async_trait]
    impl SiblingSource for FakeSiblings {
        async fn sibling_ids(&self, _item_id: Uuid) -> Result<Vec<Uuid>> {
            Ok(self.0.clone())
        }
    }

    fn media_record(id: Uuid, item_id: Uuid) -> Media {
        Media {
            id,
            item_id,
            position: 1,
            title: "m".to_string(),
            media_type: None,
            source: None,
            is_public: true,
            created: 0,
            modified: None,
        }
    }

    #[tokio::test]
    async fn walks_the_parent_order() {
        let (m1, m2, m3) = (Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7());
        let parent = Uuid::now_v7();
        let sequencer = MediaSequencer::new(Arc::new(FakeSiblings(vec![m1, m2, m3])));

        assert_eq!(
            sequencer.adjacent(&media_record(m2, parent)).await.unwrap(),
            (Some(m1), Some(m3))
        );
        assert_eq!(
            sequencer.adjacent(&media_record(m1, parent)).await.unwrap(),
            (None, Some(m2))
        );
        assert_eq!(
            sequencer.adjacent(&media_record(m3, parent)).await.unwrap(),
            (Some(m2), None)
        );
    }

    #[tokio::test]
    async fn unknown_target_degrades_silently() {
        let parent = Uuid::now_v7();
        let sequencer =
            MediaSequencer::new(Arc::new(FakeSiblings(vec![Uuid::now_v7(), Uuid::now_v7()])));

        let stranger = media_record(Uuid::now_v7(), parent);
        assert_eq!(sequencer.adjacent(&stranger).await.unwrap(), (None, None));
    }

    #[tokio::test]
    async fn empty_parent_yields_no_neighbors() {
        let parent = Uuid::now_v7();
        let sequencer = MediaSequencer::new(Arc::new(FakeSiblings(Vec::new())));

        let media = media_record(Uuid::now_v7(), parent);
        assert_eq!(sequencer.adjacent(&media).await.unwrap(), (None, None));
    }
}
