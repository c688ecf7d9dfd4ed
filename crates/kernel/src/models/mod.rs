//! Database models.

pub mod resource;

pub use resource::{
    Item, ItemSet, Media, PgResourceReader, Resource, ResourceReader, ResourceType, SiteScope,
};
