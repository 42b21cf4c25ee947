//! Queries for the `reimbursements` table

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

/// Claim row as stored
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Claim {
    pub id: String,
    pub employee_id: String,
    pub claim_type: String,
    pub amount: f64,
    pub description: String,
    pub receipt_url: String,
    pub expense_date: NaiveDate,
    pub status: String,
    pub reviewed_by: Option<String>,
    pub review_comment: String,
    pub reviewed_at: Option<i64>,
    pub created_at: i64,
}

/// Claim row joined with employee and reviewer names, for API output
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ClaimDetail {
    pub id: String,
    pub employee_id: String,
    pub employee_name: String,
    pub employee_email: String,
    pub employee_department: String,
    pub claim_type: String,
    pub amount: f64,
    pub description: String,
    pub receipt_url: String,
    pub expense_date: NaiveDate,
    pub status: String,
    pub reviewed_by: Option<String>,
    pub reviewer_name: Option<String>,
    pub review_comment: String,
    pub reviewed_at: Option<i64>,
    pub created_at: i64,
}

const DETAIL_SELECT: &str = "SELECT c.id, c.employee_id, \
     u.name AS employee_name, u.email AS employee_email, u.department AS employee_department, \
     c.claim_type, c.amount, c.description, c.receipt_url, c.expense_date, c.status, \
     c.reviewed_by, r.name AS reviewer_name, c.review_comment, c.reviewed_at, c.created_at \
     FROM reimbursements c \
     JOIN users u ON u.id = c.employee_id \
     LEFT JOIN users r ON r.id = c.reviewed_by";

/// Filters for claim listing
#[derive(Debug, Default)]
pub struct ClaimFilter<'a> {
    /// Visible employee scope; `None` means unrestricted (admin)
    pub employee_ids: Option<&'a [String]>,
    pub employee_id: Option<&'a str>,
    pub status: Option<&'a str>,
    pub claim_type: Option<&'a str>,
}

pub async fn insert(pool: &PgPool, claim: &Claim) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO reimbursements (id, employee_id, claim_type, amount, description, \
         receipt_url, expense_date, status, reviewed_by, review_comment, reviewed_at, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
    )
    .bind(&claim.id)
    .bind(&claim.employee_id)
    .bind(&claim.claim_type)
    .bind(claim.amount)
    .bind(&claim.description)
    .bind(&claim.receipt_url)
    .bind(claim.expense_date)
    .bind(&claim.status)
    .bind(&claim.reviewed_by)
    .bind(&claim.review_comment)
    .bind(claim.reviewed_at)
    .bind(claim.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Claim>, sqlx::Error> {
    sqlx::query_as::<_, Claim>("SELECT * FROM reimbursements WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_detail(pool: &PgPool, id: &str) -> Result<Option<ClaimDetail>, sqlx::Error> {
    sqlx::query_as::<_, ClaimDetail>(&format!("{DETAIL_SELECT} WHERE c.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ClaimFilter<'_>) {
    if let Some(ids) = filter.employee_ids {
        qb.push(" AND c.employee_id = ANY(").push_bind(ids.to_vec()).push(")");
    }
    if let Some(employee_id) = filter.employee_id {
        qb.push(" AND c.employee_id = ")
            .push_bind(employee_id.to_string());
    }
    if let Some(status) = filter.status {
        qb.push(" AND c.status = ").push_bind(status.to_string());
    }
    if let Some(claim_type) = filter.claim_type {
        qb.push(" AND c.claim_type = ")
            .push_bind(claim_type.to_string());
    }
}

/// List claims matching `filter`, newest first, with the total.
pub async fn list(
    pool: &PgPool,
    filter: &ClaimFilter<'_>,
    page: u32,
    limit: u32,
) -> Result<(Vec<ClaimDetail>, u64), sqlx::Error> {
    let mut count_qb = QueryBuilder::<Postgres>::new(
        "SELECT COUNT(*) FROM reimbursements c JOIN users u ON u.id = c.employee_id WHERE 1 = 1",
    );
    push_filters(&mut count_qb, filter);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb = QueryBuilder::<Postgres>::new(format!("{DETAIL_SELECT} WHERE 1 = 1"));
    push_filters(&mut qb, filter);
    let offset = (page as i64 - 1) * limit as i64;
    qb.push(" ORDER BY c.created_at DESC LIMIT ")
        .push_bind(limit as i64)
        .push(" OFFSET ")
        .push_bind(offset);

    let claims = qb.build_query_as::<ClaimDetail>().fetch_all(pool).await?;
    Ok((claims, total as u64))
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
        "UPDATE reimbursements SET status = $2, reviewed_by = $3, review_comment = $4, \
         reviewed_at = $5 WHERE id = $1",
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
