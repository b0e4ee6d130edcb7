use log::trace;
use sqlx::{sqlite::SqliteRow, FromRow, QueryBuilder, Row, SqliteConnection};

use crate::{
    api::account_objects::UserQueryFilter,
    db_types::{NewUser, Order, User},
};

const DEFAULT_PAGE_SIZE: u32 = 50;

impl FromRow<'_, SqliteRow> for User {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let raw: String = row.try_get("addresses")?;
        let addresses = serde_json::from_str(&raw)
            .map_err(|e| sqlx::Error::ColumnDecode { index: "addresses".to_string(), source: Box::new(e) })?;
        Ok(User {
            id: row.try_get("id")?,
            phone_number: row.try_get("phone_number")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            is_verified: row.try_get("is_verified")?,
            addresses,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Newest accounts first, with search over name, phone and email.
pub async fn fetch_users(query: UserQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<User>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM users ");
    let has_search = query.search.is_some();
    let has_verified = query.verified.is_some();
    if has_search || has_verified {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(search) = query.search {
        let pattern = format!("%{search}%");
        where_clause.push("(name LIKE ");
        where_clause.push_bind_unseparated(pattern.clone());
        where_clause.push_unseparated(" OR phone_number LIKE ");
        where_clause.push_bind_unseparated(pattern.clone());
        where_clause.push_unseparated(" OR email LIKE ");
        where_clause.push_bind_unseparated(pattern);
        where_clause.push_unseparated(")");
    }
    if let Some(verified) = query.verified {
        where_clause.push("is_verified = ");
        where_clause.push_bind_unseparated(verified);
    }
    builder.push(" ORDER BY created_at DESC LIMIT ");
    builder.push_bind(query.limit.unwrap_or(DEFAULT_PAGE_SIZE) as i64);
    builder.push(" OFFSET ");
    builder.push_bind(query.offset.unwrap_or(0) as i64);
    trace!("🗃️ Executing query: {}", builder.sql());
    builder.build_query_as::<User>().fetch_all(conn).await
}

pub async fn fetch_user_by_phone(phone: &str, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE phone_number = $1").bind(phone).fetch_optional(conn).await
}

/// Creates or refreshes an account keyed on phone number.
pub async fn upsert_user(user: NewUser, conn: &mut SqliteConnection) -> Result<User, sqlx::Error> {
    let addresses = serde_json::to_string(&user.addresses).unwrap_or_else(|_| "[]".to_string());
    sqlx::query_as(
        r#"
            INSERT INTO users (phone_number, name, email, is_verified, addresses)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (phone_number) DO UPDATE SET
                name = excluded.name,
                email = excluded.email,
                is_verified = excluded.is_verified,
                addresses = excluded.addresses,
                updated_at = CURRENT_TIMESTAMP
            RETURNING *;
        "#,
    )
    .bind(&user.phone_number)
    .bind(&user.name)
    .bind(&user.email)
    .bind(user.is_verified)
    .bind(addresses)
    .fetch_one(conn)
    .await
}

pub async fn delete_user(phone: &str, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE phone_number = $1").bind(phone).execute(conn).await?;
    Ok(result.rows_affected())
}

/// The phone-number join: a user's orders, newest first.
pub async fn fetch_orders_for_phone(phone: &str, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE mobile_number = $1 ORDER BY order_date DESC")
        .bind(phone)
        .fetch_all(conn)
        .await
}

pub async fn count_orders_for_phone(phone: &str, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE mobile_number = $1").bind(phone).fetch_one(conn).await
}
