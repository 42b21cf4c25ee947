//! Aggregation queries for stats and the admin dashboard

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

/// Per-status leave counts with approved-day sums
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
    pub days: f64,
}

/// Per-type leave counts over approved requests
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TypeCount {
    pub leave_type: String,
    pub count: i64,
    pub days: f64,
}

/// Headline user counts for the admin dashboard
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserCounts {
    pub total: i64,
    pub employees: i64,
    pub managers: i64,
    pub active: i64,
}

/// Headline leave counts for the admin dashboard
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LeaveCounts {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

/// One (year, month) bucket of the rolling trend
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TrendBucket {
    pub year: i32,
    pub month: i32,
    pub total: i64,
    pub approved: i64,
    pub pending: i64,
    pub rejected: i64,
}

/// Per-department leave distribution
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DepartmentCount {
    pub department: String,
    pub total: i64,
    pub approved: i64,
    pub pending: i64,
}

/// Per-status claim counts with amount sums
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ClaimStatusCount {
    pub status: String,
    pub count: i64,
    pub total_amount: f64,
}

/// Per-type claim counts over approved claims
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ClaimTypeCount {
    pub claim_type: String,
    pub count: i64,
    pub total_amount: f64,
}

fn push_scope(qb: &mut QueryBuilder<'_, Postgres>, column: &str, scope: Option<&[String]>) {
    if let Some(ids) = scope {
        qb.push(format!(" AND {column} = ANY("))
            .push_bind(ids.to_vec())
            .push(")");
    }
}

/// Leave counts and day sums grouped by status, within the visible scope.
pub async fn leave_status_counts(
    pool: &PgPool,
    scope: Option<&[String]>,
) -> Result<Vec<StatusCount>, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new(
        "SELECT status, COUNT(*) AS count, COALESCE(SUM(total_days), 0) AS days \
         FROM leaves WHERE 1 = 1",
    );
    push_scope(&mut qb, "employee_id", scope);
    qb.push(" GROUP BY status");
    qb.build_query_as::<StatusCount>().fetch_all(pool).await
}

/// Approved leave grouped by type, within the visible scope.
pub async fn leave_type_counts(
    pool: &PgPool,
    scope: Option<&[String]>,
) -> Result<Vec<TypeCount>, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new(
        "SELECT leave_type, COUNT(*) AS count, COALESCE(SUM(total_days), 0) AS days \
         FROM leaves WHERE status = 'approved'",
    );
    push_scope(&mut qb, "employee_id", scope);
    qb.push(" GROUP BY leave_type ORDER BY count DESC");
    qb.build_query_as::<TypeCount>().fetch_all(pool).await
}

/// Per-status summary of a single employee's leave history.
pub async fn leave_summary_for(
    pool: &PgPool,
    employee_id: &str,
) -> Result<Vec<StatusCount>, sqlx::Error> {
    sqlx::query_as::<_, StatusCount>(
        "SELECT status, COUNT(*) AS count, COALESCE(SUM(total_days), 0) AS days \
         FROM leaves WHERE employee_id = $1 GROUP BY status",
    )
    .bind(employee_id)
    .fetch_all(pool)
    .await
}

pub async fn user_counts(pool: &PgPool) -> Result<UserCounts, sqlx::Error> {
    sqlx::query_as::<_, UserCounts>(
        "SELECT COUNT(*) AS total, \
         COUNT(*) FILTER (WHERE role = 'employee') AS employees, \
         COUNT(*) FILTER (WHERE role = 'manager') AS managers, \
         COUNT(*) FILTER (WHERE is_active) AS active \
         FROM users",
    )
    .fetch_one(pool)
    .await
}

pub async fn leave_counts(pool: &PgPool) -> Result<LeaveCounts, sqlx::Error> {
    sqlx::query_as::<_, LeaveCounts>(
        "SELECT COUNT(*) AS total, \
         COUNT(*) FILTER (WHERE status = 'pending') AS pending, \
         COUNT(*) FILTER (WHERE status = 'approved') AS approved, \
         COUNT(*) FILTER (WHERE status = 'rejected') AS rejected \
         FROM leaves",
    )
    .fetch_one(pool)
    .await
}

/// Requests created since `since_millis`, bucketed by calendar month.
pub async fn monthly_trend(
    pool: &PgPool,
    since_millis: i64,
) -> Result<Vec<TrendBucket>, sqlx::Error> {
    sqlx::query_as::<_, TrendBucket>(
        "SELECT EXTRACT(YEAR FROM to_timestamp(created_at / 1000.0))::INT AS year, \
         EXTRACT(MONTH FROM to_timestamp(created_at / 1000.0))::INT AS month, \
         COUNT(*) AS total, \
         COUNT(*) FILTER (WHERE status = 'approved') AS approved, \
         COUNT(*) FILTER (WHERE status = 'pending') AS pending, \
         COUNT(*) FILTER (WHERE status = 'rejected') AS rejected \
         FROM leaves WHERE created_at >= $1 \
         GROUP BY 1, 2 ORDER BY 1, 2",
    )
    .bind(since_millis)
    .fetch_all(pool)
    .await
}

/// Leave distribution joined through the employee's department.
pub async fn department_stats(pool: &PgPool) -> Result<Vec<DepartmentCount>, sqlx::Error> {
    sqlx::query_as::<_, DepartmentCount>(
        "SELECT u.department AS department, COUNT(*) AS total, \
         COUNT(*) FILTER (WHERE l.status = 'approved') AS approved, \
         COUNT(*) FILTER (WHERE l.status = 'pending') AS pending \
         FROM leaves l JOIN users u ON u.id = l.employee_id \
         GROUP BY u.department ORDER BY total DESC",
    )
    .fetch_all(pool)
    .await
}

/// Claim counts and amount sums grouped by status, within the scope.
pub async fn claim_status_counts(
    pool: &PgPool,
    scope: Option<&[String]>,
) -> Result<Vec<ClaimStatusCount>, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new(
        "SELECT status, COUNT(*) AS count, COALESCE(SUM(amount), 0) AS total_amount \
         FROM reimbursements WHERE 1 = 1",
    );
    push_scope(&mut qb, "employee_id", scope);
    qb.push(" GROUP BY status");
    qb.build_query_as::<ClaimStatusCount>().fetch_all(pool).await
}

/// Approved claims grouped by type, within the scope.
pub async fn claim_type_counts(
    pool: &PgPool,
    scope: Option<&[String]>,
) -> Result<Vec<ClaimTypeCount>, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new(
        "SELECT claim_type, COUNT(*) AS count, COALESCE(SUM(amount), 0) AS total_amount \
         FROM reimbursements WHERE status = 'approved'",
    );
    push_scope(&mut qb, "employee_id", scope);
    qb.push(" GROUP BY claim_type ORDER BY count DESC");
    qb.build_query_as::<ClaimTypeCount>().fetch_all(pool).await
}

/// First day of the month five months before `today`'s month, so the
/// trend covers six calendar months including the current one.
pub fn trend_window_start(today: NaiveDate) -> NaiveDate {
    let months = today.year() * 12 + today.month() as i32 - 1 - 5;
    let (year, month) = (months.div_euclid(12), months.rem_euclid(12) as u32 + 1);
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(today)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_trend_window_start() {
        assert_eq!(trend_window_start(d(2026, 8, 24)), d(2026, 3, 1));
        // Wraps into the previous year
        assert_eq!(trend_window_start(d(2026, 3, 15)), d(2025, 10, 1));
        assert_eq!(trend_window_start(d(2026, 1, 1)), d(2025, 8, 1));
        // Six buckets inclusive: June window starts in January
        assert_eq!(trend_window_start(d(2026, 6, 30)), d(2026, 1, 1));
    }
}
