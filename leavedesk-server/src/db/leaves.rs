//! Queries for the `leaves` table

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

/// Leave row as stored
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Leave {
    pub id: String,
    pub employee_id: String,
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: f64,
    pub is_half_day: bool,
    pub half_day_period: Option<String>,
    pub reason: String,
    pub status: String,
    pub reviewed_by: Option<String>,
    pub review_comment: String,
    pub reviewed_at: Option<i64>,
    pub emergency_contact: String,
    pub created_at: i64,
}

/// Leave row joined with employee and reviewer names, for API output
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LeaveDetail {
    pub id: String,
    pub employee_id: String,
    pub employee_name: String,
    pub employee_email: String,
    pub employee_department: String,
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: f64,
    pub is_half_day: bool,
    pub half_day_period: Option<String>,
    pub reason: String,
    pub status: String,
    pub reviewed_by: Option<String>,
    pub reviewer_name: Option<String>,
    pub review_comment: String,
    pub reviewed_at: Option<i64>,
    pub emergency_contact: String,
    pub created_at: i64,
}

const DETAIL_SELECT: &str = "SELECT l.id, l.employee_id, \
     u.name AS employee_name, u.email AS employee_email, u.department AS employee_department, \
     l.leave_type, l.start_date, l.end_date, l.total_days, l.is_half_day, l.half_day_period, \
     l.reason, l.status, l.reviewed_by, r.name AS reviewer_name, l.review_comment, \
     l.reviewed_at, l.emergency_contact, l.created_at \
     FROM leaves l \
     JOIN users u ON u.id = l.employee_id \
     LEFT JOIN users r ON r.id = l.reviewed_by";

/// Filters for leave listing
#[derive(Debug, Default)]
pub struct LeaveFilter<'a> {
    /// Visible employee scope; `None` means unrestricted (admin)
    pub employee_ids: Option<&'a [String]>,
    /// Exact employee filter on top of the scope
    pub employee_id: Option<&'a str>,
    pub status: Option<&'a str>,
    pub leave_type: Option<&'a str>,
    pub department: Option<&'a str>,
    /// start_date >= from
    pub from: Option<NaiveDate>,
    /// start_date <= to
    pub to: Option<NaiveDate>,
}

pub async fn insert(pool: &PgPool, leave: &Leave) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO leaves (id, employee_id, leave_type, start_date, end_date, total_days, \
         is_half_day, half_day_period, reason, status, reviewed_by, review_comment, \
         reviewed_at, emergency_contact, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
    )
    .bind(&leave.id)
    .bind(&leave.employee_id)
    .bind(&leave.leave_type)
    .bind(leave.start_date)
    .bind(leave.end_date)
    .bind(leave.total_days)
    .bind(leave.is_half_day)
    .bind(&leave.half_day_period)
    .bind(&leave.reason)
    .bind(&leave.status)
    .bind(&leave.reviewed_by)
    .bind(&leave.review_comment)
    .bind(leave.reviewed_at)
    .bind(&leave.emergency_contact)
    .bind(leave.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Leave>, sqlx::Error> {
    sqlx::query_as::<_, Leave>("SELECT * FROM leaves WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_detail(pool: &PgPool, id: &str) -> Result<Option<LeaveDetail>, sqlx::Error> {
    sqlx::query_as::<_, LeaveDetail>(&format!("{DETAIL_SELECT} WHERE l.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// First pending/approved request of this employee whose inclusive date
/// range intersects [start, end], if any.
pub async fn find_overlapping(
    pool: &PgPool,
    employee_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Option<Leave>, sqlx::Error> {
    sqlx::query_as::<_, Leave>(
        "SELECT * FROM leaves \
         WHERE employee_id = $1 AND status IN ('pending', 'approved') \
         AND start_date <= $3 AND end_date >= $2 \
         LIMIT 1",
    )
    .bind(employee_id)
    .bind(start)
    .bind(end)
    .fetch_optional(pool)
    .await
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &LeaveFilter<'_>) {
    if let Some(ids) = filter.employee_ids {
        qb.push(" AND l.employee_id = ANY(").push_bind(ids.to_vec()).push(")");
    }
    if let Some(employee_id) = filter.employee_id {
        qb.push(" AND l.employee_id = ")
            .push_bind(employee_id.to_string());
    }
    if let Some(status) = filter.status {
        qb.push(" AND l.status = ").push_bind(status.to_string());
    }
    if let Some(leave_type) = filter.leave_type {
        qb.push(" AND l.leave_type = ")
            .push_bind(leave_type.to_string());
    }
    if let Some(department) = filter.department {
        qb.push(" AND u.department = ")
            .push_bind(department.to_string());
    }
    if let Some(from) = filter.from {
        qb.push(" AND l.start_date >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        qb.push(" AND l.start_date <= ").push_bind(to);
    }
}

/// List leave requests matching `filter`, newest first, with the total.
pub async fn list(
    pool: &PgPool,
    filter: &LeaveFilter<'_>,
    page: u32,
    limit: u32,
) -> Result<(Vec<LeaveDetail>, u64), sqlx::Error> {
    let mut count_qb = QueryBuilder::<Postgres>::new(
        "SELECT COUNT(*) FROM leaves l JOIN users u ON u.id = l.employee_id WHERE 1 = 1",
    );
    push_filters(&mut count_qb, filter);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb = QueryBuilder::<Postgres>::new(format!("{DETAIL_SELECT} WHERE 1 = 1"));
    push_filters(&mut qb, filter);
    let offset = (page as i64 - 1) * limit as i64;
    qb.push(" ORDER BY l.created_at DESC LIMIT ")
        .push_bind(limit as i64)
        .push(" OFFSET ")
        .push_bind(offset);

    let leaves = qb.build_query_as::<LeaveDetail>().fetch_all(pool).await?;
    Ok((leaves, total as u64))
}

/// Unpaginated rows for calendar rendering, ordered by start date.
///
/// `window` is an inclusive [first, last] day pair; a row qualifies when
/// its date range intersects the window.
pub async fn list_for_calendar(
    pool: &PgPool,
    employee_ids: Option<&[String]>,
    status: Option<&str>,
    window: Option<(NaiveDate, NaiveDate)>,
) -> Result<Vec<LeaveDetail>, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new(format!("{DETAIL_SELECT} WHERE 1 = 1"));
    if let Some(ids) = employee_ids {
        qb.push(" AND l.employee_id = ANY(").push_bind(ids.to_vec()).push(")");
    }
    if let Some(status) = status {
        qb.push(" AND l.status = ").push_bind(status.to_string());
    }
    if let Some((first, last)) = window {
        qb.push(" AND l.start_date <= ")
            .push_bind(last)
            .push(" AND l.end_date >= ")
            .push_bind(first);
    }
    qb.push(" ORDER BY l.start_date ASC");

    qb.build_query_as::<LeaveDetail>().fetch_all(pool).await
}

/// Record a review outcome (approved/rejected).
pub async fn mark_reviewed(
    pool: &PgPool,
    id: &str,
    status: &str,
    reviewed_by: &str,
    review_comment: &str,
    reviewed_at: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE leaves SET status = $2, reviewed_by = $3, review_comment = $4, reviewed_at = $5 \
         WHERE id = $1",
    )
    .bind(id)
    .bind(status)
    .bind(reviewed_by)
    .bind(review_comment)
    .bind(reviewed_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn mark_cancelled(pool: &PgPool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE leaves SET status = 'cancelled' WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
