//! Remote data gateway for the `leads` table.
//!
//! The managed backend is Supabase; rows are reached through its PostgREST
//! endpoint. No business logic lives here: the gateway maps requests and
//! responses and classifies failures.

pub mod client;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RemoteError;
use crate::types::{
    Lead, LeadFields, LeadPatch, LeadStatus, DEFAULT_EMAIL, DEFAULT_PHONE, MANUAL_SOURCE,
};
use crate::util::{coerce_revenue, id_to_string};

pub use client::SupabaseClient;

/// Supabase project configuration stored in ~/.vortex/config.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anon_key: Option<String>,
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_table() -> String {
    "leads".to_string()
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: None,
            table: default_table(),
        }
    }
}

/// CRUD contract against the leads collection.
///
/// Performs no validation; callers guarantee required fields.
#[async_trait]
pub trait LeadGateway: Send + Sync {
    /// All rows, newest `created_at` first.
    async fn list_leads(&self) -> Result<Vec<RawLead>, RemoteError>;

    /// Insert one row and return it as stored.
    async fn create_lead(&self, lead: &NewLead) -> Result<RawLead, RemoteError>;

    async fn update_lead(&self, id: &str, patch: &LeadPatch) -> Result<(), RemoteError>;

    async fn delete_lead(&self, id: &str) -> Result<(), RemoteError>;
}

/// A row as returned by the backend. Every column is optional on read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLead {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub revenue: Value,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl RawLead {
    /// Map a stored row into the canonical lead shape.
    pub fn into_lead(self) -> Result<Lead, RemoteError> {
        let id = id_to_string(&self.id)
            .ok_or_else(|| RemoteError::Decode(format!("lead row without id: {}", self.id)))?;

        let status = self
            .status
            .as_deref()
            .map(LeadStatus::from_stored)
            .unwrap_or_default();
        if !status.is_funnel() {
            log::warn!("Lead {}: status '{}' is outside the funnel", id, status);
        }

        let created_at = self.created_at.as_deref().and_then(parse_timestamp);

        Ok(Lead {
            revenue: coerce_revenue(&self.revenue),
            id,
            name: self.name.unwrap_or_default(),
            company: self.company.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            status,
            source: self
                .source
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| MANUAL_SOURCE.to_string()),
            tags: Vec::new(),
            created_at,
        })
    }
}

/// Parse a `timestamptz` (RFC 3339) or bare `timestamp` column as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .ok()
}

/// Insert payload: user fields plus fixed contact defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewLead {
    pub name: String,
    pub company: String,
    pub revenue: f64,
    pub status: LeadStatus,
    pub email: String,
    pub phone: String,
    pub source: String,
}

impl From<LeadFields> for NewLead {
    fn from(fields: LeadFields) -> Self {
        Self {
            name: fields.name,
            company: fields.company,
            revenue: fields.revenue,
            status: fields.status,
            email: DEFAULT_EMAIL.to_string(),
            phone: DEFAULT_PHONE.to_string(),
            source: MANUAL_SOURCE.to_string(),
        }
    }
}
