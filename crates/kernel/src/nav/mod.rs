//! Sequential resource navigation.
//!
//! Given a resource currently being viewed, determine the resources
//! immediately preceding and following it within the ordered, filtered
//! collection the user last browsed, without offset pagination or window
//! functions. The full ordered id sequence is materialized per call, the
//! target located in it, and the neighbor ids read back to full resources.

use uuid::Uuid;

pub mod facade;
pub mod filter_spec;
pub mod locate;
pub mod media;
pub mod sequencer;
pub mod source;

pub use facade::{BundleOptions, NavBundle, Navigator};
pub use filter_spec::{FilterSpec, SortDirection};
pub use locate::locate;
pub use media::{MediaSequencer, PgSiblingSource, SiblingSource};
pub use sequencer::{CollectionSequencer, SequenceSource};
pub use source::{
    ExplicitQuery, PgSettingStore, QuerySource, QuerySourceResolver, QueryStore,
    SessionQueryStore, SettingStore, browse_query_key,
};

/// Where navigation is happening.
///
/// The admin UI sees every resource; a public site sees only resources
/// assigned to it, and stored browse queries are bucketed per site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiScope {
    Admin,
    Public(Uuid),
}

impl UiScope {
    /// Stable bucket name used to key per-scope stored queries.
    pub fn bucket(&self) -> String {
        match self {
            UiScope::Admin => "admin".to_string(),
            UiScope::Public(site_id) => format!("site:{site_id}"),
        }
    }
}
