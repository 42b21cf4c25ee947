//! Queries for the `users` table

use shared::models::{LeaveBalance, LeaveType, User};
use sqlx::{PgPool, Postgres, QueryBuilder};

const ALL_COLUMNS: &str = "id, name, email, hashed_password, role, department, position, \
     manager_id, balance_annual, balance_sick, balance_casual, balance_unpaid, \
     avatar, phone, is_active, joined_date, created_at";

/// Filters for user listing
#[derive(Debug, Default)]
pub struct UserFilter<'a> {
    pub role: Option<&'a str>,
    pub department: Option<&'a str>,
    pub manager_id: Option<&'a str>,
    pub is_active: Option<bool>,
    /// Case-insensitive substring match on name, email, or department
    pub search: Option<&'a str>,
}

pub async fn insert(pool: &PgPool, user: &User) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (id, name, email, hashed_password, role, department, position, \
         manager_id, balance_annual, balance_sick, balance_casual, balance_unpaid, \
         avatar, phone, is_active, joined_date, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.hashed_password)
    .bind(&user.role)
    .bind(&user.department)
    .bind(&user.position)
    .bind(&user.manager_id)
    .bind(user.balance_annual)
    .bind(user.balance_sick)
    .bind(user.balance_casual)
    .bind(user.balance_unpaid)
    .bind(&user.avatar)
    .bind(&user.phone)
    .bind(user.is_active)
    .bind(user.joined_date)
    .bind(user.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {ALL_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {ALL_COLUMNS} FROM users WHERE email = $1"))
        .bind(email)
        .fetch_optional(pool)
        .await
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter<'_>) {
    if let Some(role) = filter.role {
        qb.push(" AND role = ").push_bind(role.to_string());
    }
    if let Some(department) = filter.department {
        qb.push(" AND department = ")
            .push_bind(department.to_string());
    }
    if let Some(manager_id) = filter.manager_id {
        qb.push(" AND manager_id = ")
            .push_bind(manager_id.to_string());
    }
    if let Some(is_active) = filter.is_active {
        qb.push(" AND is_active = ").push_bind(is_active);
    }
    if let Some(search) = filter.search {
        let pattern = format!("%{search}%");
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR department ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// List users matching `filter`, ordered by `order_by` (a static SQL
/// fragment chosen by the caller), with the matching total.
pub async fn list(
    pool: &PgPool,
    filter: &UserFilter<'_>,
    order_by: &str,
    page: u32,
    limit: u32,
) -> Result<(Vec<User>, u64), sqlx::Error> {
    let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users WHERE 1 = 1");
    push_filters(&mut count_qb, filter);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb = QueryBuilder::<Postgres>::new(format!(
        "SELECT {ALL_COLUMNS} FROM users WHERE 1 = 1"
    ));
    push_filters(&mut qb, filter);
    let offset = (page as i64 - 1) * limit as i64;
    qb.push(format!(" ORDER BY {order_by} LIMIT "))
        .push_bind(limit as i64)
        .push(" OFFSET ")
        .push_bind(offset);

    let users = qb.build_query_as::<User>().fetch_all(pool).await?;
    Ok((users, total as u64))
}

/// All active users holding the manager role, for assignment dropdowns
pub async fn list_managers(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {ALL_COLUMNS} FROM users WHERE role = 'manager' AND is_active = TRUE ORDER BY name"
    ))
    .fetch_all(pool)
    .await
}

/// IDs of a manager's direct reports
pub async fn team_member_ids(pool: &PgPool, manager_id: &str) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT id FROM users WHERE manager_id = $1")
        .bind(manager_id)
        .fetch_all(pool)
        .await
}

/// Partial profile update; unset fields keep their current value.
pub async fn update_profile(
    pool: &PgPool,
    id: &str,
    name: Option<&str>,
    department: Option<&str>,
    position: Option<&str>,
    phone: Option<&str>,
    avatar: Option<&str>,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET \
         name = COALESCE($2, name), \
         department = COALESCE($3, department), \
         position = COALESCE($4, position), \
         phone = COALESCE($5, phone), \
         avatar = COALESCE($6, avatar) \
         WHERE id = $1 RETURNING {ALL_COLUMNS}"
    ))
    .bind(id)
    .bind(name)
    .bind(department)
    .bind(position)
    .bind(phone)
    .bind(avatar)
    .fetch_optional(pool)
    .await
}

pub async fn update_password(pool: &PgPool, id: &str, hashed: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET hashed_password = $2 WHERE id = $1")
        .bind(id)
        .bind(hashed)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_role(pool: &PgPool, id: &str, role: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET role = $2 WHERE id = $1 RETURNING {ALL_COLUMNS}"
    ))
    .bind(id)
    .bind(role)
    .fetch_optional(pool)
    .await
}

pub async fn set_active(
    pool: &PgPool,
    id: &str,
    is_active: bool,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET is_active = $2 WHERE id = $1 RETURNING {ALL_COLUMNS}"
    ))
    .bind(id)
    .bind(is_active)
    .fetch_optional(pool)
    .await
}

pub async fn set_manager(
    pool: &PgPool,
    id: &str,
    manager_id: Option<&str>,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET manager_id = $2 WHERE id = $1 RETURNING {ALL_COLUMNS}"
    ))
    .bind(id)
    .bind(manager_id)
    .fetch_optional(pool)
    .await
}

/// Set balances to absolute values; unset fields are left untouched.
pub async fn set_balances(
    pool: &PgPool,
    id: &str,
    annual: Option<f64>,
    sick: Option<f64>,
    casual: Option<f64>,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET \
         balance_annual = COALESCE($2, balance_annual), \
         balance_sick = COALESCE($3, balance_sick), \
         balance_casual = COALESCE($4, balance_casual) \
         WHERE id = $1 RETURNING {ALL_COLUMNS}"
    ))
    .bind(id)
    .bind(annual)
    .bind(sick)
    .bind(casual)
    .fetch_optional(pool)
    .await
}

/// Atomically add `delta` (may be negative) to the balance column for
/// `leave_type`. This is the only balance mutation the ledger performs;
/// a single-row UPDATE keeps it race-free against concurrent reviews.
pub async fn increment_balance(
    pool: &PgPool,
    id: &str,
    leave_type: LeaveType,
    delta: f64,
) -> Result<(), sqlx::Error> {
    let sql = match leave_type {
        LeaveType::Annual => "UPDATE users SET balance_annual = balance_annual + $2 WHERE id = $1",
        LeaveType::Sick => "UPDATE users SET balance_sick = balance_sick + $2 WHERE id = $1",
        LeaveType::Casual => "UPDATE users SET balance_casual = balance_casual + $2 WHERE id = $1",
        LeaveType::Unpaid => "UPDATE users SET balance_unpaid = balance_unpaid + $2 WHERE id = $1",
    };
    sqlx::query(sql).bind(id).bind(delta).execute(pool).await?;
    Ok(())
}

pub async fn get_balance(pool: &PgPool, id: &str) -> Result<Option<LeaveBalance>, sqlx::Error> {
    sqlx::query_as::<_, LeaveBalance>(
        "SELECT balance_annual AS annual, balance_sick AS sick, \
         balance_casual AS casual, balance_unpaid AS unpaid \
         FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Hard-delete a user and all their leave and reimbursement records in
/// one transaction. Returns the deleted user's name, or `None` if the
/// user did not exist.
pub async fn delete_cascade(pool: &PgPool, id: &str) -> Result<Option<String>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM leaves WHERE employee_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM reimbursements WHERE employee_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let name: Option<String> =
        sqlx::query_scalar("DELETE FROM users WHERE id = $1 RETURNING name")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

    tx.commit().await?;
    Ok(name)
}
