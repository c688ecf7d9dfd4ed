//! End-to-end navigation tests over the public library API.
//!
//! Exercise the facade through its collaborator traits with in-memory
//! fakes, mirroring how a host application wires the navigator.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use sfoglia_kernel::error::AppResult;
use sfoglia_kernel::models::{Item, Resource, ResourceReader, ResourceType};
use sfoglia_kernel::nav::{
    BundleOptions, CollectionSequencer, FilterSpec, Navigator, QueryStore, SequenceSource,
    SettingStore, SiblingSource, UiScope,
};

/// Backend fake: a fixed membership list, ordered by id ascending, filtered
/// the way the real sequencer filters (only the is_public key here).
struct MembershipBackend {
    rows: Vec<(Uuid, bool)>,
}

#[async_trait]
impl SequenceSource for MembershipBackend {
    async fn sequence(
        &self,
        resource_type: ResourceType,
        scope: UiScope,
        spec: &FilterSpec,
    ) -> AppResult<Vec<Uuid>> {
        // Delegate validation to the real SQL builder so configuration
        // errors behave identically to the PostgreSQL-backed sequencer.
        CollectionSequencer::build_sql(resource_type, scope, spec)?;

        let mut ids: Vec<Uuid> = self
            .rows
            .iter()
            .filter(|(_, is_public)| match spec.get("is_public") {
                Some("1") | Some("true") => *is_public,
                _ => true,
            })
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        Ok(ids)
    }
}

struct MapReader(HashMap<Uuid, Resource>);

#[async_trait]
impl ResourceReader for MapReader {
    async fn read(&self, _resource_type: ResourceType, id: Uuid) -> Result<Option<Resource>> {
        Ok(self.0.get(&id).cloned())
    }
}

struct StoredQuery(Option<FilterSpec>);

#[async_trait]
impl QueryStore for StoredQuery {
    async fn browse_query(
        &self,
        _scope: UiScope,
        _resource_type: ResourceType,
    ) -> Result<Option<FilterSpec>> {
        Ok(self.0.clone())
    }
}

struct NoSettings;

#[async_trait]
impl SettingStore for NoSettings {
    async fn setting(&self, _key: &str) -> Result<Option<FilterSpec>> {
        Ok(None)
    }
}

struct NoSiblings;

#[async_trait]
impl SiblingSource for NoSiblings {
    async fn sibling_ids(&self, _item_id: Uuid) -> Result<Vec<Uuid>> {
        Ok(Vec::new())
    }
}

fn item(id: Uuid) -> Item {
    Item {
        id,
        title: format!("item {id}"),
        owner_id: None,
        is_public: true,
        created: 0,
        modified: None,
    }
}

fn navigator(rows: Vec<(Uuid, bool)>) -> Navigator {
    let reader = MapReader(
        rows.iter()
            .map(|(id, _)| (*id, Resource::Item(item(*id))))
            .collect(),
    );
    Navigator::new(
        Arc::new(NoSettings),
        Arc::new(MembershipBackend { rows }),
        Arc::new(NoSiblings),
        Arc::new(reader),
    )
}

#[tokio::test]
async fn public_site_navigation_walks_the_membership_order() {
    // Site members [a, b, c] in id order with an empty browse query:
    // nextOf(b) is c, previousOf(a) is None.
    let mut ids: Vec<Uuid> = (0..3).map(|_| Uuid::now_v7()).collect();
    ids.sort();
    let nav = navigator(ids.iter().map(|id| (*id, true)).collect());
    let queries = StoredQuery(None);
    let scope = UiScope::Public(Uuid::now_v7());

    let next = nav
        .next_of(&Resource::Item(item(ids[1])), scope, &queries, None, None)
        .await
        .unwrap();
    assert_eq!(next.map(|r| r.id()), Some(ids[2]));

    let previous = nav
        .previous_of(&Resource::Item(item(ids[0])), scope, &queries, None, None)
        .await
        .unwrap();
    assert!(previous.is_none());
}

#[tokio::test]
async fn session_filter_narrows_the_sequence() {
    // Three items, the middle one private. With a stored is_public filter
    // the private item drops out, so its neighbors become adjacent.
    let mut ids: Vec<Uuid> = (0..3).map(|_| Uuid::now_v7()).collect();
    ids.sort();
    let rows = vec![(ids[0], true), (ids[1], false), (ids[2], true)];
    let nav = navigator(rows);
    let queries = StoredQuery(Some(FilterSpec::from_pairs([("is_public", "1")])));

    let next = nav
        .next_of(
            &Resource::Item(item(ids[0])),
            UiScope::Admin,
            &queries,
            None,
            None,
        )
        .await
        .unwrap();
    assert_eq!(next.map(|r| r.id()), Some(ids[2]));

    // The filtered-out resource itself degrades to no neighbors.
    let bundle = nav
        .bundle_of(
            &Resource::Item(item(ids[1])),
            UiScope::Admin,
            &queries,
            BundleOptions::default(),
        )
        .await
        .unwrap();
    assert!(bundle.previous.is_none());
    assert!(bundle.next.is_none());
}

#[tokio::test]
async fn bundle_includes_back_link_from_session_query() {
    let mut ids: Vec<Uuid> = (0..2).map(|_| Uuid::now_v7()).collect();
    ids.sort();
    let nav = navigator(ids.iter().map(|id| (*id, true)).collect());
    let queries = StoredQuery(Some(FilterSpec::from_pairs([("sort_by", "title")])));

    let bundle = nav
        .bundle_of(
            &Resource::Item(item(ids[0])),
            UiScope::Admin,
            &queries,
            BundleOptions {
                include_back_link: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(bundle.back_link.as_deref(), Some("/admin/items?sort_by=title"));
    assert_eq!(bundle.next.map(|r| r.id()), Some(ids[1]));
}

#[tokio::test]
async fn explicit_query_overrides_the_stored_one() {
    let mut ids: Vec<Uuid> = (0..3).map(|_| Uuid::now_v7()).collect();
    ids.sort();
    let rows = vec![(ids[0], true), (ids[1], false), (ids[2], true)];
    let nav = navigator(rows);
    // The session would filter to public only; the explicit empty-ish query
    // (just a sort) wins and keeps all three in sequence.
    let queries = StoredQuery(Some(FilterSpec::from_pairs([("is_public", "1")])));

    let next = nav
        .next_of(
            &Resource::Item(item(ids[0])),
            UiScope::Admin,
            &queries,
            Some("url"),
            Some(sfoglia_kernel::nav::ExplicitQuery::Encoded(
                "sort_by=id".to_string(),
            )),
        )
        .await
        .unwrap();
    assert_eq!(next.map(|r| r.id()), Some(ids[1]));
}
