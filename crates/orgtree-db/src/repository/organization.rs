//! SurrealDB implementation of [`OrganizationRepository`].

use chrono::{DateTime, Utc};
use orgtree_core::error::OrgTreeResult;
use orgtree_core::lifecycle::{RowFilter, Transition};
use orgtree_core::models::organization::{CreateOrganization, Organization, OrganizationId};
use orgtree_core::repository::{OrganizationRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;

/// DB-side row struct for queries where the id is already known.
#[derive(Debug, SurrealValue)]
struct OrganizationRow {
    parent_id: Option<i64>,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    disabled_at: Option<DateTime<Utc>>,
    deleted_at: Option<DateTime<Utc>>,
}

impl OrganizationRow {
    fn into_organization(self, id: OrganizationId) -> Organization {
        Organization {
            id,
            parent_id: self.parent_id,
            name: self.name,
            created_at: self.created_at,
            updated_at: self.updated_at,
            disabled_at: self.disabled_at,
            deleted_at: self.deleted_at,
        }
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct OrganizationRowWithId {
    record_id: i64,
    parent_id: Option<i64>,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    disabled_at: Option<DateTime<Utc>>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<OrganizationRowWithId> for Organization {
    fn from(row: OrganizationRowWithId) -> Self {
        Organization {
            id: row.record_id,
            parent_id: row.parent_id,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
            disabled_at: row.disabled_at,
            deleted_at: row.deleted_at,
        }
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// WHERE fragment selecting the rows a [`RowFilter`] admits.
fn filter_clause(filter: RowFilter) -> &'static str {
    match filter {
        RowFilter::Existing => "deleted_at IS NONE",
        RowFilter::Active => "deleted_at IS NONE AND disabled_at IS NONE",
    }
}

/// SET fragment written by a lifecycle transition.
fn transition_clause(transition: Transition) -> &'static str {
    match transition {
        Transition::Disable => "disabled_at = time::now()",
        Transition::Enable => "disabled_at = NONE",
        Transition::SoftDelete => "deleted_at = time::now()",
        Transition::Restore => "deleted_at = NONE",
    }
}

/// Array literal of record ids, so updates go straight to the rows by key.
fn record_list(ids: &[OrganizationId]) -> String {
    let records: Vec<String> = ids.iter().map(|id| format!("organization:{id}")).collect();
    format!("[{}]", records.join(", "))
}

fn not_found(id: OrganizationId) -> DbError {
    DbError::NotFound {
        entity: "organization".into(),
        id: id.to_string(),
    }
}

/// SurrealDB implementation of the Organization repository.
///
/// Records live at `organization:⟨id⟩` with integer ids drawn from the
/// `id_counter:organization` sequence record.
#[derive(Clone)]
pub struct SurrealOrganizationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOrganizationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OrganizationRepository for SurrealOrganizationRepository<C> {
    async fn insert(&self, input: CreateOrganization) -> OrgTreeResult<Organization> {
        let result = self
            .db
            .query(
                "LET $seq = (UPDATE ONLY id_counter:organization SET value += 1); \
                 CREATE type::record('organization', $seq.value) SET \
                 parent_id = $parent_id, name = $name; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('organization', $seq.value);",
            )
            .bind(("parent_id", input.parent_id))
            .bind(("name", input.name))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<OrganizationRowWithId> = result.take(2).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::Query("inserted organization not returned".into()))?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: OrganizationId, filter: RowFilter) -> OrgTreeResult<Organization> {
        let query = format!(
            "SELECT * FROM type::record('organization', $id) WHERE {}",
            filter_clause(filter)
        );

        let mut result = self
            .db
            .query(&query)
            .bind(("id", id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| not_found(id))?;

        Ok(row.into_organization(id))
    }

    async fn find_by_name(&self, name: &str, filter: RowFilter) -> OrgTreeResult<Vec<Organization>> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM organization \
             WHERE name = $name AND {} \
             ORDER BY created_at ASC, id ASC",
            filter_clause(filter)
        );

        let mut result = self
            .db
            .query(&query)
            .bind(("name", name.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().map(Organization::from).collect())
    }

    async fn find_by_parent(
        &self,
        parent_id: OrganizationId,
        filter: RowFilter,
    ) -> OrgTreeResult<Vec<Organization>> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM organization \
             WHERE parent_id = $parent_id AND {} \
             ORDER BY created_at ASC, id ASC",
            filter_clause(filter)
        );

        let mut result = self
            .db
            .query(&query)
            .bind(("parent_id", parent_id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().map(Organization::from).collect())
    }

    async fn find_roots(&self, filter: RowFilter) -> OrgTreeResult<Vec<Organization>> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM organization \
             WHERE parent_id IS NONE AND {} \
             ORDER BY created_at ASC, id ASC",
            filter_clause(filter)
        );

        let mut result = self.db.query(&query).await.map_err(DbError::from)?;

        let rows: Vec<OrganizationRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().map(Organization::from).collect())
    }

    async fn list_children(
        &self,
        parent_id: Option<OrganizationId>,
        filter: RowFilter,
        pagination: Pagination,
    ) -> OrgTreeResult<PaginatedResult<Organization>> {
        let parent_clause = match parent_id {
            Some(_) => "parent_id = $parent_id",
            None => "parent_id IS NONE",
        };
        let filter_clause = filter_clause(filter);

        let mut count_result = self
            .db
            .query(format!(
                "SELECT count() AS total FROM organization \
                 WHERE {parent_clause} AND {filter_clause} GROUP ALL"
            ))
            .bind(("parent_id", parent_id))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(format!(
                "SELECT meta::id(id) AS record_id, * FROM organization \
                 WHERE {parent_clause} AND {filter_clause} \
                 ORDER BY created_at ASC, id ASC \
                 LIMIT $limit START $offset"
            ))
            .bind(("parent_id", parent_id))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(PaginatedResult {
            items: rows.into_iter().map(Organization::from).collect(),
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn update_name(
        &self,
        id: OrganizationId,
        name: Option<String>,
    ) -> OrgTreeResult<Organization> {
        let mut sets = Vec::new();
        if name.is_some() {
            sets.push("name = $name");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('organization', $id) SET {} WHERE {}",
            sets.join(", "),
            filter_clause(RowFilter::Active)
        );

        let mut builder = self.db.query(&query).bind(("id", id));
        if let Some(name) = name {
            builder = builder.bind(("name", name));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| not_found(id))?;

        Ok(row.into_organization(id))
    }

    async fn apply_transition(
        &self,
        ids: &[OrganizationId],
        transition: Transition,
    ) -> OrgTreeResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let guard = transition
            .guard()
            .map(|filter| format!(" WHERE {}", filter_clause(filter)))
            .unwrap_or_default();
        let query = format!(
            "UPDATE {} SET {}, updated_at = time::now(){guard}",
            record_list(ids),
            transition_clause(transition)
        );

        let result = self.db.query(&query).await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.len() as u64)
    }
}
