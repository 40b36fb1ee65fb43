use anyhow::Context;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::models::DATETIME_FORMAT;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_therapists: i64,
    pub total_bookings: i64,
    pub total_revenue: f64,
    pub pending_applications: i64,
    pub active_bookings: i64,
}

pub fn dashboard_stats(conn: &Connection) -> anyhow::Result<DashboardStats> {
    let count = |sql: &str| -> anyhow::Result<i64> {
        conn.query_row(sql, [], |row| row.get(0))
            .with_context(|| format!("stats query failed: {sql}"))
    };

    Ok(DashboardStats {
        total_users: count("SELECT COUNT(*) FROM users WHERE role = 'client'")?,
        total_therapists: count("SELECT COUNT(*) FROM therapists WHERE status = 'approved'")?,
        total_bookings: count("SELECT COUNT(*) FROM bookings")?,
        total_revenue: conn.query_row(
            "SELECT COALESCE(SUM(total_amount), 0) FROM bookings WHERE payment_status = 'paid'",
            [],
            |row| row.get(0),
        )?,
        pending_applications: count(
            "SELECT COUNT(*) FROM therapist_applications WHERE status = 'pending'",
        )?,
        active_bookings: count(
            "SELECT COUNT(*) FROM bookings WHERE status IN ('confirmed', 'in_progress')",
        )?,
    })
}

/// `(created_at, total_amount)` for every paid booking created at or after `since`.
pub fn paid_bookings_since(
    conn: &Connection,
    since: &NaiveDateTime,
) -> anyhow::Result<Vec<(NaiveDateTime, f64)>> {
    let mut stmt = conn.prepare(
        "SELECT created_at, total_amount FROM bookings
         WHERE payment_status = 'paid' AND created_at >= ?1
         ORDER BY created_at ASC",
    )?;
    let rows = stmt.query_map(params![since.format(DATETIME_FORMAT).to_string()], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
    })?;

    let mut out = vec![];
    for row in rows {
        let (created_at, amount) = row?;
        let created_at = NaiveDateTime::parse_from_str(&created_at, DATETIME_FORMAT)
            .with_context(|| format!("invalid stored timestamp: {created_at}"))?;
        out.push((created_at, amount));
    }
    Ok(out)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PopularService {
    pub service_id: String,
    pub service_name: String,
    pub category: String,
    pub total_bookings: i64,
    pub total_revenue: f64,
    pub avg_revenue: f64,
}

/// Services ranked by confirmed or completed bookings.
pub fn popular_services(conn: &Connection, limit: i64) -> anyhow::Result<Vec<PopularService>> {
    let mut stmt = conn.prepare(
        "SELECT b.service_id, s.name, s.category, COUNT(*) AS total, COALESCE(SUM(b.total_amount), 0)
         FROM bookings b JOIN services s ON s.id = b.service_id
         WHERE b.status IN ('confirmed', 'completed')
         GROUP BY b.service_id
         ORDER BY total DESC, s.name ASC
         LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], |row| {
        let total_bookings: i64 = row.get(3)?;
        let total_revenue: f64 = row.get(4)?;
        Ok(PopularService {
            service_id: row.get(0)?,
            service_name: row.get(1)?,
            category: row.get(2)?,
            total_bookings,
            total_revenue,
            avg_revenue: if total_bookings > 0 {
                total_revenue / total_bookings as f64
            } else {
                0.0
            },
        })
    })?;

    let mut out = vec![];
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
