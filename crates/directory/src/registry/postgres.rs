//! Postgres-backed registries.
//!
//! Paths are stored as canonical storage keys (`/a/b/c`). Subtree reads use
//! `node_path = key OR node_path LIKE 'key/%'` with LIKE metacharacters in the
//! key escaped, so a deep read of `/ab` never returns `/abc`.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;

use grocery_auth::{PathFilter, Role, ScopeQuery};
use grocery_core::{NodePath, PersonId};

use super::{NodeRegistry, PersonRegistry, RegistryError};
use crate::{NewPerson, Node, Person, PersonChanges};

const SCHEMA: &str = include_str!("../../migrations/0001_directory.sql");

/// Both registries on a single connection pool.
#[derive(Debug, Clone)]
pub struct PostgresDirectory {
    pool: Arc<PgPool>,
}

impl PostgresDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Create tables and indexes if they are missing.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), RegistryError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

#[async_trait]
impl NodeRegistry for PostgresDirectory {
    #[instrument(skip(self), fields(path = %path), err)]
    async fn get(&self, path: &NodePath) -> Result<Option<Node>, RegistryError> {
        let row = sqlx::query("SELECT path, name FROM nodes WHERE path = $1")
            .bind(path.to_storage_key())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_node", e))?;

        row.map(|r| node_from_row(&r)).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list(&self, within: Option<&NodePath>) -> Result<Vec<Node>, RegistryError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT path, name FROM nodes");
        if let Some(root) = within {
            qb.push(" WHERE ");
            push_path_filter(&mut qb, "path", &ScopeQuery::resolve(root.clone(), true, None).storage_filter().path);
        }
        qb.push(" ORDER BY path");

        let rows = qb
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_nodes", e))?;

        rows.iter().map(node_from_row).collect()
    }

    #[instrument(skip(self), fields(path = %node.path), err)]
    async fn insert(&self, node: Node) -> Result<Node, RegistryError> {
        sqlx::query("INSERT INTO nodes (path, name) VALUES ($1, $2)")
            .bind(node.path.to_storage_key())
            .bind(&node.name)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_node", e))?;
        Ok(node)
    }
}

#[async_trait]
impl PersonRegistry for PostgresDirectory {
    #[instrument(skip(self), fields(target = %query.target, deep = query.deep), err)]
    async fn find(&self, query: &ScopeQuery) -> Result<Vec<Person>, RegistryError> {
        let filter = query.storage_filter();

        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT id, name, email, node_path, role FROM people WHERE ");
        push_path_filter(&mut qb, "node_path", &filter.path);
        if let Some(role) = filter.role {
            qb.push(" AND role = ").push_bind(role.as_str());
        }
        qb.push(" ORDER BY node_path, name");

        let rows = qb
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_people", e))?;

        rows.iter().map(person_from_row).collect()
    }

    #[instrument(skip(self), fields(path = %path, id = %id), err)]
    async fn get(&self, path: &NodePath, id: PersonId, role: Role) -> Result<Option<Person>, RegistryError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, node_path, role
            FROM people
            WHERE id = $1 AND node_path = $2 AND role = $3
            "#,
        )
        .bind(id.as_uuid())
        .bind(path.to_storage_key())
        .bind(role.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_person", e))?;

        row.map(|r| person_from_row(&r)).transpose()
    }

    #[instrument(skip(self, person), fields(path = %person.node_path), err)]
    async fn create(&self, person: NewPerson) -> Result<Person, RegistryError> {
        let created = person.into_person(PersonId::new());
        sqlx::query(
            r#"
            INSERT INTO people (id, name, email, node_path, role)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(created.id.as_uuid())
        .bind(&created.name)
        .bind(&created.email)
        .bind(created.node_path.to_storage_key())
        .bind(created.role.as_str())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_person", e))?;

        Ok(created)
    }

    #[instrument(skip(self, changes), fields(path = %path, id = %id), err)]
    async fn update(
        &self,
        path: &NodePath,
        id: PersonId,
        role: Role,
        changes: PersonChanges,
    ) -> Result<Option<Person>, RegistryError> {
        let row = sqlx::query(
            r#"
            UPDATE people SET
                name = COALESCE($4, name),
                email = COALESCE($5, email),
                node_path = COALESCE($6, node_path),
                role = COALESCE($7, role)
            WHERE id = $1 AND node_path = $2 AND role = $3
            RETURNING id, name, email, node_path, role
            "#,
        )
        .bind(id.as_uuid())
        .bind(path.to_storage_key())
        .bind(role.as_str())
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.node_path.map(|p| p.to_storage_key()))
        .bind(changes.role.map(|r| r.as_str()))
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_person", e))?;

        row.map(|r| person_from_row(&r)).transpose()
    }

    #[instrument(skip(self), fields(path = %path, id = %id), err)]
    async fn delete(&self, path: &NodePath, id: PersonId, role: Role) -> Result<bool, RegistryError> {
        let result = sqlx::query("DELETE FROM people WHERE id = $1 AND node_path = $2 AND role = $3")
            .bind(id.as_uuid())
            .bind(path.to_storage_key())
            .bind(role.as_str())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_person", e))?;

        Ok(result.rows_affected() > 0)
    }
}

fn push_path_filter(qb: &mut QueryBuilder<'_, Postgres>, column: &'static str, filter: &PathFilter) {
    match filter {
        PathFilter::Exact(key) => {
            qb.push(column).push(" = ").push_bind(key.clone());
        }
        PathFilter::Subtree { key, descendant_prefix } => {
            qb.push("(")
                .push(column)
                .push(" = ")
                .push_bind(key.clone())
                .push(" OR ")
                .push(column)
                .push(" LIKE ")
                .push_bind(format!("{}%", escape_like(descendant_prefix)))
                .push(r" ESCAPE '\')");
        }
    }
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn node_from_row(row: &sqlx::postgres::PgRow) -> Result<Node, RegistryError> {
    let path: String = row.try_get("path").map_err(|e| corrupt("nodes.path", e))?;
    let name: String = row.try_get("name").map_err(|e| corrupt("nodes.name", e))?;
    let path = NodePath::parse(&path).map_err(|e| RegistryError::Corrupt(format!("nodes.path: {e}")))?;
    Ok(Node { path, name })
}

fn person_from_row(row: &sqlx::postgres::PgRow) -> Result<Person, RegistryError> {
    let id: uuid::Uuid = row.try_get("id").map_err(|e| corrupt("people.id", e))?;
    let node_path: String = row.try_get("node_path").map_err(|e| corrupt("people.node_path", e))?;
    let role: String = row.try_get("role").map_err(|e| corrupt("people.role", e))?;

    Ok(Person {
        id: PersonId::from_uuid(id),
        name: row.try_get("name").map_err(|e| corrupt("people.name", e))?,
        email: row.try_get("email").map_err(|e| corrupt("people.email", e))?,
        node_path: NodePath::parse(&node_path)
            .map_err(|e| RegistryError::Corrupt(format!("people.node_path: {e}")))?,
        role: role
            .parse()
            .map_err(|e| RegistryError::Corrupt(format!("people.role: {e}")))?,
    })
}

fn corrupt(column: &str, err: sqlx::Error) -> RegistryError {
    RegistryError::Corrupt(format!("failed to read {column}: {err}"))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RegistryError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                // unique_violation
                Some("23505") => RegistryError::Conflict(msg),
                _ => RegistryError::Unavailable(msg),
            }
        }
        sqlx::Error::PoolClosed => RegistryError::Unavailable(format!("connection pool closed in {operation}")),
        other => RegistryError::Unavailable(format!("sqlx error in {operation}: {other}")),
    }
}
