use async_trait::async_trait;
use shared::models::{Role, User};
use sqlx::PgPool;

use crate::db::{NewUser, RepoError, RepoResult, UserAccount, UserChanges, UserRepository};

const COLUMNS: &str = "id, email, name, address, password_hash, role";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    name: String,
    address: Option<String>,
    password_hash: String,
    role: String,
}

impl TryFrom<UserRow> for UserAccount {
    type Error = RepoError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row.role.parse().map_err(RepoError::Database)?;
        Ok(UserAccount {
            user: User {
                id: row.id,
                email: row.email,
                name: row.name,
                address: row.address,
                role,
            },
            password_hash: row.password_hash,
        })
    }
}

fn into_users(rows: Vec<UserRow>) -> RepoResult<Vec<User>> {
    rows.into_iter()
        .map(|row| UserAccount::try_from(row).map(|a| a.user))
        .collect()
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn list(&self) -> RepoResult<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!("SELECT {COLUMNS} FROM users ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        into_users(rows)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(|r| UserAccount::try_from(r).map(|a| a.user))
            .transpose()
    }

    async fn find_many(&self, ids: &[i64]) -> RepoResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<UserRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM users WHERE id = ANY($1)"))
                .bind(ids.to_vec())
                .fetch_all(&self.pool)
                .await?;
        into_users(rows)
    }

    async fn find_account_by_email(&self, email: &str) -> RepoResult<Option<UserAccount>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM users WHERE email = $1"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        row.map(UserAccount::try_from).transpose()
    }

    async fn create(&self, data: NewUser) -> RepoResult<User> {
        let row: UserRow = sqlx::query_as(&format!(
            "INSERT INTO users (email, name, address, password_hash, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        ))
        .bind(&data.email)
        .bind(&data.name)
        .bind(&data.address)
        .bind(&data.password_hash)
        .bind(data.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match RepoError::from(e) {
            RepoError::Duplicate(_) => RepoError::Duplicate(format!("email {}", data.email)),
            other => other,
        })?;
        UserAccount::try_from(row).map(|a| a.user)
    }

    async fn update(&self, id: i64, changes: UserChanges) -> RepoResult<User> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "UPDATE users SET
                name = COALESCE($2, name),
                address = COALESCE($3, address),
                password_hash = COALESCE($4, password_hash),
                role = COALESCE($5, role)
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.address)
        .bind(changes.password_hash)
        .bind(changes.role.map(|r| r.as_str()))
        .fetch_optional(&self.pool)
        .await?;
        let row = row.ok_or_else(|| RepoError::NotFound(format!("User {id}")))?;
        UserAccount::try_from(row).map(|a| a.user)
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("User {id}")));
        }
        Ok(())
    }
}
