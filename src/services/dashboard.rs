// Dashboard service
// Assembles what the dashboard and lead table render: statistics over the
// full collection, table rows over the search-filtered one.

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::leads::{compute_stats, DashboardStats};
use crate::notification::Toast;
use crate::state::AppState;
use crate::types::{Lead, LeadStatus};
use crate::util::{format_brl, format_date_br};

/// Display-ready table row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRow {
    pub id: String,
    pub initial: String,
    pub name: String,
    pub company: String,
    pub status: LeadStatus,
    pub revenue: String,
    pub created: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub loading: bool,
    pub stats: DashboardStats,
    pub search_term: String,
    pub rows: Vec<LeadRow>,
    pub toast: Option<Toast>,
}

/// Today's calendar date in the given zone.
pub fn today_in(tz: chrono_tz::Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

pub fn build_snapshot(state: &AppState, today: NaiveDate) -> DashboardSnapshot {
    let tz = state.config.read().tz();
    let stats = state
        .store
        .with_leads(|leads| compute_stats(leads, today, tz));
    let rows = state
        .filtered_leads()
        .iter()
        .map(|lead| lead_row(lead, tz))
        .collect();

    DashboardSnapshot {
        loading: state.store.is_loading(),
        stats,
        search_term: state.search_term(),
        rows,
        toast: state.toasts.current(),
    }
}

fn lead_row(lead: &Lead, tz: chrono_tz::Tz) -> LeadRow {
    LeadRow {
        id: lead.id.clone(),
        initial: lead.name.chars().next().map(String::from).unwrap_or_default(),
        name: lead.name.clone(),
        company: lead.company.clone(),
        status: lead.status.clone(),
        revenue: format_brl(lead.revenue),
        created: lead
            .created_at
            .as_ref()
            .map(|at| format_date_br(at, tz))
            .unwrap_or_default(),
    }
}
