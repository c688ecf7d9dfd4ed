//! Collection sequencing: the full ordered id list for a browse view.
//!
//! Builds the same filter/sort query the browse listing uses, but unwindowed
//! and reduced to the identifier column, so navigation order always matches
//! the order the user last saw. The sequence is recomputed per call and
//! never cached; the O(n) scan is the accepted cost of avoiding server-side
//! cursors and window functions.

use async_trait::async_trait;
use sea_query::{Alias, Expr, Order, PostgresQueryBuilder, Query, SelectStatement};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::UiScope;
use super::filter_spec::{FilterSpec, SortDirection};
use crate::error::{AppError, AppResult};
use crate::models::{ResourceType, SiteScope};

/// Capability: materialize the full ordered identifier sequence for a
/// resource type, scope, and filter.
#[async_trait]
pub trait SequenceSource: Send + Sync {
    async fn sequence(
        &self,
        resource_type: ResourceType,
        scope: UiScope,
        spec: &FilterSpec,
    ) -> AppResult<Vec<Uuid>>;
}

/// PostgreSQL-backed sequencer.
#[derive(Clone)]
pub struct CollectionSequencer {
    pool: PgPool,
}

impl CollectionSequencer {
    /// Create a new sequencer over the shared pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build the ordered-id SELECT for one navigation call.
    ///
    /// Media carries no independent browse surface, so asking for its global
    /// sequence is a caller bug and fails as a configuration error.
    pub fn build_sql(
        resource_type: ResourceType,
        scope: UiScope,
        spec: &FilterSpec,
    ) -> AppResult<String> {
        if resource_type == ResourceType::Media {
            return Err(AppError::Configuration(
                "media has no browse sequence; navigate within the parent item instead"
                    .to_string(),
            ));
        }

        let spec = spec.clone().without_pagination();
        let base = resource_type.table();

        let mut query = Query::select();
        query
            .column((Alias::new(base), Alias::new("id")))
            .from(Alias::new(base));

        add_filters(&mut query, base, &spec);

        let direction = spec.sort_order();

        // Site scoping applies only when no explicit filter overrides it.
        if let UiScope::Public(site_id) = scope {
            if !spec.has_filters() {
                match resource_type.site_scope() {
                    SiteScope::Direct { join_table, fk } => {
                        add_site_join(&mut query, base, join_table, fk, site_id);
                    }
                    SiteScope::Assignment { join_table, fk } => {
                        add_site_join(&mut query, base, join_table, fk, site_id);
                        query.order_by(
                            (Alias::new(join_table), Alias::new("position")),
                            Order::Asc,
                        );
                    }
                    SiteScope::None => {}
                }
            }
        }

        if let Some(field) = spec.sort_by() {
            if resource_type.is_sortable(field) {
                query.order_by((Alias::new(base), Alias::new(field)), sql_order(direction));
            } else {
                debug!(field, "ignoring unsortable sort field");
            }
        }

        // Final deterministic tiebreak, mirroring the primary direction, so
        // ties in the primary sort field never reorder between calls.
        if spec.sort_by() != Some("id") {
            query.order_by((Alias::new(base), Alias::new("id")), sql_order(direction));
        }

        Ok(query.to_string(PostgresQueryBuilder))
    }
}

fn sql_order(direction: SortDirection) -> Order {
    match direction {
        SortDirection::Asc => Order::Asc,
        SortDirection::Desc => Order::Desc,
    }
}

/// Map filter entries onto WHERE conditions.
///
/// The keys mirror the browse listing's filter surface; unknown keys and
/// unparseable values are ignored rather than failing the call.
fn add_filters(query: &mut SelectStatement, base: &str, spec: &FilterSpec) {
    for (key, value) in spec.entries() {
        match key.as_str() {
            "owner_id" => {
                if let Ok(owner) = Uuid::parse_str(value) {
                    query.and_where(
                        Expr::col((Alias::new(base), Alias::new("owner_id"))).eq(owner),
                    );
                }
            }
            "is_public" => {
                if let Some(flag) = parse_bool(value) {
                    query.and_where(
                        Expr::col((Alias::new(base), Alias::new("is_public"))).eq(flag),
                    );
                }
            }
            "search" => {
                if !value.is_empty() {
                    query.and_where(
                        Expr::col((Alias::new(base), Alias::new("title")))
                            .like(format!("%{}%", escape_like_wildcards(value))),
                    );
                }
            }
            "created_after" => {
                if let Ok(ts) = value.parse::<i64>() {
                    query.and_where(Expr::col((Alias::new(base), Alias::new("created"))).gt(ts));
                }
            }
            "created_before" => {
                if let Ok(ts) = value.parse::<i64>() {
                    query.and_where(Expr::col((Alias::new(base), Alias::new("created"))).lt(ts));
                }
            }
            // Sort keys are handled by the caller; anything else is a browse
            // key this sequencer does not understand.
            _ => {}
        }
    }
}

/// Inner-join the site membership table and pin it to one site.
fn add_site_join(
    query: &mut SelectStatement,
    base: &str,
    join_table: &'static str,
    fk: &'static str,
    site_id: Uuid,
) {
    let on = Expr::col((Alias::new(base), Alias::new("id")))
        .equals((Alias::new(join_table), Alias::new(fk)));
    query.join(sea_query::JoinType::InnerJoin, Alias::new(join_table), on);
    query.and_where(Expr::col((Alias::new(join_table), Alias::new("site_id"))).eq(site_id));
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

/// Escape SQL LIKE wildcard characters (`%`, `_`, `\`) in a value.
fn escape_like_wildcards(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
impl SequenceSource for CollectionSequencer {
    async fn sequence(
        &self,
        resource_type: ResourceType,
        scope: UiScope,
        spec: &FilterSpec,
    ) -> AppResult<Vec<Uuid>> {
        let sql = Self::build_sql(resource_type, scope, spec)?;
        debug!(resource_type = resource_type.name(), "executing sequence query");
        let ids = sqlx::query_scalar::<_, Uuid>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }
}
