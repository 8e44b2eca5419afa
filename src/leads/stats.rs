//! Dashboard statistics derived from the lead collection.
//!
//! Pure functions: recomputed from the current collection on every change.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;

use crate::types::{Lead, LeadStatus};
use crate::util::round_one_decimal;

/// Days covered by the activity series.
pub const ACTIVITY_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total: usize,
    /// Percentage of closed leads, one decimal.
    pub conversion_rate: f64,
    pub predicted_revenue: f64,
    pub closed_revenue: f64,
    pub funnel: Vec<FunnelStage>,
    pub activity: Vec<ActivityPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelStage {
    pub status: LeadStatus,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPoint {
    pub date: NaiveDate,
    pub label: String,
    pub leads: usize,
}

pub fn compute_stats(leads: &[Lead], today: NaiveDate, tz: chrono_tz::Tz) -> DashboardStats {
    let total = leads.len();
    let closed: Vec<&Lead> = leads
        .iter()
        .filter(|l| l.status == LeadStatus::Closed)
        .collect();

    DashboardStats {
        total,
        conversion_rate: conversion_rate(closed.len(), total),
        predicted_revenue: leads.iter().map(|l| l.revenue).sum(),
        closed_revenue: closed.iter().map(|l| l.revenue).sum(),
        funnel: funnel(leads),
        activity: activity_series(leads, today, tz),
    }
}

/// `100 * closed / total` rounded to one decimal; 0 for an empty collection.
pub fn conversion_rate(closed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_one_decimal(closed as f64 / total as f64 * 100.0)
}

/// Count and share of every status, in funnel order.
///
/// Shares are taken over the whole collection, so leads with a status outside
/// the funnel fall in no bucket.
pub fn funnel(leads: &[Lead]) -> Vec<FunnelStage> {
    let total = leads.len();
    LeadStatus::ALL
        .iter()
        .map(|status| {
            let count = leads.iter().filter(|l| l.status == *status).count();
            let percentage = if total > 0 {
                count as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            FunnelStage {
                status: status.clone(),
                count,
                percentage,
            }
        })
        .collect()
}

/// Leads created on each of the last seven calendar days, oldest first.
///
/// Days are taken in `tz`; leads without a creation time are not counted.
pub fn activity_series(leads: &[Lead], today: NaiveDate, tz: chrono_tz::Tz) -> Vec<ActivityPoint> {
    (0..ACTIVITY_DAYS)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let count = leads
                .iter()
                .filter_map(|l| l.created_at)
                .filter(|at| at.with_timezone(&tz).date_naive() == date)
                .count();
            ActivityPoint {
                date,
                label: weekday_label(date.weekday()).to_string(),
                leads: count,
            }
        })
        .collect()
}

/// Abbreviated pt-BR weekday, as the pt-BR locale writes it ("seg.").
fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "seg.",
        Weekday::Tue => "ter.",
        Weekday::Wed => "qua.",
        Weekday::Thu => "qui.",
        Weekday::Fri => "sex.",
        Weekday::Sat => "sáb.",
        Weekday::Sun => "dom.",
    }
}
