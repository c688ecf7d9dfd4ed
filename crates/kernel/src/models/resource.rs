//! Resource records and the closed resource-type registry.
//!
//! Items, item sets, and media are the navigable content records. Each
//! `ResourceType` variant carries its backend table, site-scoping rule, and
//! persisted browse-defaults setting key as data, so callers never branch on
//! type strings.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// The resource kinds that support navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Items,
    ItemSets,
    Media,
}

/// How a resource type is scoped to a site in public navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteScope {
    /// No site membership join; media is reachable only through its parent.
    None,
    /// Direct membership join table.
    Direct {
        join_table: &'static str,
        fk: &'static str,
    },
    /// Membership via the site's ordered assignment list. When this join is
    /// added, ordering by the assignment position is injected as well.
    Assignment {
        join_table: &'static str,
        fk: &'static str,
    },
}

impl ResourceType {
    /// Parse a resource type from its machine name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "items" => Some(Self::Items),
            "item_sets" => Some(Self::ItemSets),
            "media" => Some(Self::Media),
            _ => None,
        }
    }

    /// Machine name, also the admin browse path segment.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Items => "items",
            Self::ItemSets => "item_sets",
            Self::Media => "media",
        }
    }

    /// Backend table holding records of this type.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Items => "item",
            Self::ItemSets => "item_set",
            Self::Media => "media",
        }
    }

    /// Site membership rule applied in public scope.
    pub fn site_scope(&self) -> SiteScope {
        match self {
            Self::Items => SiteScope::Direct {
                join_table: "site_item",
                fk: "item_id",
            },
            Self::ItemSets => SiteScope::Assignment {
                join_table: "site_item_set",
                fk: "item_set_id",
            },
            Self::Media => SiteScope::None,
        }
    }

    /// Persisted browse-defaults setting key, when one is defined.
    ///
    /// Only items and item sets have a stored browse default; media has no
    /// independent browse surface.
    pub fn setting_key(&self) -> Option<&'static str> {
        match self {
            Self::Items => Some("sfoglia_browse_defaults_items"),
            Self::ItemSets => Some("sfoglia_browse_defaults_item_sets"),
            Self::Media => None,
        }
    }

    /// Whether a field is a legal primary sort column for this type.
    pub fn is_sortable(&self, field: &str) -> bool {
        matches!(field, "id" | "title" | "created" | "modified")
    }
}

/// Item record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Item title.
    pub title: String,

    /// Owning user ID.
    pub owner_id: Option<Uuid>,

    /// Public visibility flag.
    pub is_public: bool,

    /// Unix timestamp when created.
    pub created: i64,

    /// Unix timestamp when last modified.
    pub modified: Option<i64>,
}

/// Item set record (curated collection of items).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ItemSet {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Item set title.
    pub title: String,

    /// Owning user ID.
    pub owner_id: Option<Uuid>,

    /// Public visibility flag.
    pub is_public: bool,

    /// Unix timestamp when created.
    pub created: i64,

    /// Unix timestamp when last modified.
    pub modified: Option<i64>,
}

/// Media record, always attached to a parent item.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Media {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Parent item ID.
    pub item_id: Uuid,

    /// Position within the parent's media order.
    pub position: i32,

    /// Media title.
    pub title: String,

    /// MIME type of the stored file, when known.
    pub media_type: Option<String>,

    /// Original source (filename or URL).
    pub source: Option<String>,

    /// Public visibility flag.
    pub is_public: bool,

    /// Unix timestamp when created.
    pub created: i64,

    /// Unix timestamp when last modified.
    pub modified: Option<i64>,
}

impl Item {
    /// Load an item by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT id, title, owner_id, is_public, created, modified FROM item WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to load item")
    }
}

impl ItemSet {
    /// Load an item set by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT id, title, owner_id, is_public, created, modified FROM item_set WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to load item set")
    }
}

impl Media {
    /// Load a media record by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT id, item_id, position, title, media_type, source, is_public, created, \
             modified FROM media WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to load media")
    }
}

/// A navigable resource of any registered kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Resource {
    Item(Item),
    ItemSet(ItemSet),
    Media(Media),
}

impl Resource {
    /// Stable identifier of the underlying record.
    pub fn id(&self) -> Uuid {
        match self {
            Resource::Item(i) => i.id,
            Resource::ItemSet(s) => s.id,
            Resource::Media(m) => m.id,
        }
    }

    /// Resource kind of the underlying record.
    pub fn resource_type(&self) -> ResourceType {
        match self {
            Resource::Item(_) => ResourceType::Items,
            Resource::ItemSet(_) => ResourceType::ItemSets,
            Resource::Media(_) => ResourceType::Media,
        }
    }
}

/// Point read-back capability: resolve an id to a full resource.
///
/// "Not found" is `Ok(None)`, never an error: a neighbor may have been
/// deleted between sequencing and read-back.
#[async_trait]
pub trait ResourceReader: Send + Sync {
    async fn read(&self, resource_type: ResourceType, id: Uuid) -> Result<Option<Resource>>;
}

/// PostgreSQL-backed resource reader.
#[derive(Clone)]
pub struct PgResourceReader {
    pool: PgPool,
}

impl PgResourceReader {
    /// Create a new reader over the shared pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResourceReader for PgResourceReader {
    async fn read(&self, resource_type: ResourceType, id: Uuid) -> Result<Option<Resource>> {
        let resource = match resource_type {
            ResourceType::Items => Item::find_by_id(&self.pool, id).await?.map(Resource::Item),
            ResourceType::ItemSets => ItemSet::find_by_id(&self.pool, id)
                .await?
                .map(Resource::ItemSet),
            ResourceType::Media => Media::find_by_id(&self.pool, id)
                .await?
                .map(Resource::Media),
        };
        Ok(resource)
    }
}
