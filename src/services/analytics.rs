use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime};
use rusqlite::Connection;
use serde::Serialize;

use crate::db::analytics;
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevenuePeriod {
    Week,
    Month,
    Quarter,
    Year,
}

impl RevenuePeriod {
    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "week" => Ok(RevenuePeriod::Week),
            "month" => Ok(RevenuePeriod::Month),
            "quarter" => Ok(RevenuePeriod::Quarter),
            "year" => Ok(RevenuePeriod::Year),
            other => Err(AppError::invalid(format!(
                "invalid period '{other}', expected week, month, quarter or year"
            ))),
        }
    }

    pub fn days(&self) -> i64 {
        match self {
            RevenuePeriod::Week => 7,
            RevenuePeriod::Month => 30,
            RevenuePeriod::Quarter => 90,
            RevenuePeriod::Year => 365,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RevenuePeriod::Week => "week",
            RevenuePeriod::Month => "month",
            RevenuePeriod::Quarter => "quarter",
            RevenuePeriod::Year => "year",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RevenueReport {
    pub period: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub total_revenue: f64,
    pub total_bookings: usize,
    pub average_booking_value: f64,
    pub daily_revenue: BTreeMap<String, f64>,
}

/// Folds paid bookings into per-day totals, keyed `YYYY-MM-DD`.
pub fn summarize(
    period: RevenuePeriod,
    start: NaiveDateTime,
    end: NaiveDateTime,
    paid: &[(NaiveDateTime, f64)],
) -> RevenueReport {
    let mut daily_revenue = BTreeMap::new();
    for (created_at, amount) in paid {
        *daily_revenue
            .entry(created_at.format("%Y-%m-%d").to_string())
            .or_insert(0.0) += amount;
    }

    let total_revenue: f64 = paid.iter().map(|(_, amount)| amount).sum();
    let total_bookings = paid.len();

    RevenueReport {
        period: period.as_str().to_string(),
        start_date: start,
        end_date: end,
        total_revenue,
        total_bookings,
        average_booking_value: if total_bookings > 0 {
            total_revenue / total_bookings as f64
        } else {
            0.0
        },
        daily_revenue,
    }
}

pub fn revenue_report(
    conn: &Connection,
    period: RevenuePeriod,
    now: NaiveDateTime,
) -> Result<RevenueReport, AppError> {
    let start = now - Duration::days(period.days());
    let paid = analytics::paid_bookings_since(conn, &start)?;
    Ok(summarize(period, start, now, &paid))
}
