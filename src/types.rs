use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::gemini::GeminiConfig;
use crate::supabase::SupabaseConfig;

/// Default placeholder contact data sent with leads created from the form.
pub const DEFAULT_EMAIL: &str = "contato@vortex.com";
pub const DEFAULT_PHONE: &str = "0000";
/// Source tag for leads entered by hand.
pub const MANUAL_SOURCE: &str = "Manual";

/// Configuration stored in ~/.vortex/config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub supabase: SupabaseConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// IANA zone used to decide which calendar day a lead was created on.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_campaign_context: Option<String>,
}

fn default_timezone() -> String {
    "America/Sao_Paulo".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            supabase: SupabaseConfig::default(),
            gemini: GeminiConfig::default(),
            timezone: default_timezone(),
            default_campaign_context: None,
        }
    }
}

impl Config {
    /// Parsed timezone, falling back to UTC for unknown names.
    pub fn tz(&self) -> chrono_tz::Tz {
        self.timezone.parse().unwrap_or_else(|_| {
            log::warn!("Unknown timezone '{}', using UTC", self.timezone);
            chrono_tz::UTC
        })
    }
}

/// Funnel position of a lead. Any status may be set to any other.
///
/// Serialized with the labels stored in the `leads.status` column. A stored
/// label outside the funnel is kept verbatim as `Other` so it survives edits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Interested,
    Negotiation,
    Closed,
    Lost,
    Other(String),
}

impl LeadStatus {
    /// Funnel order.
    pub const ALL: [LeadStatus; 6] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Interested,
        LeadStatus::Negotiation,
        LeadStatus::Closed,
        LeadStatus::Lost,
    ];

    /// Stored label.
    pub fn label(&self) -> &str {
        match self {
            LeadStatus::New => "Novo",
            LeadStatus::Contacted => "Contatado",
            LeadStatus::Interested => "Interessado",
            LeadStatus::Negotiation => "Negociação",
            LeadStatus::Closed => "Fechado",
            LeadStatus::Lost => "Perdido",
            LeadStatus::Other(label) => label.as_str(),
        }
    }

    /// Funnel status for a known label.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.iter().find(|s| s.label() == label).cloned()
    }

    /// Status as stored, unknown labels included.
    pub fn from_stored(label: &str) -> Self {
        Self::from_label(label).unwrap_or_else(|| LeadStatus::Other(label.to_string()))
    }

    pub fn is_funnel(&self) -> bool {
        !matches!(self, LeadStatus::Other(_))
    }
}

impl From<String> for LeadStatus {
    fn from(label: String) -> Self {
        Self::from_stored(&label)
    }
}

impl From<LeadStatus> for String {
    fn from(status: LeadStatus) -> Self {
        match status {
            LeadStatus::Other(label) => label,
            known => known.label().to_string(),
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A prospective customer tracked through the funnel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub status: LeadStatus,
    pub source: String,
    /// Carried for shape compatibility; no operation reads or writes tags.
    #[serde(default)]
    pub tags: Vec<String>,
    pub revenue: f64,
    pub created_at: Option<DateTime<Utc>>,
}

/// Fields the user supplies when adding a lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadFields {
    pub name: String,
    pub company: String,
    pub revenue: f64,
    pub status: LeadStatus,
}

/// Partial update. Only `Some` fields are sent and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LeadStatus>,
}

impl LeadPatch {
    pub fn status(status: LeadStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.company.is_none() && self.revenue.is_none() && self.status.is_none()
    }

    /// Merge into an existing lead, leaving unset fields untouched.
    pub fn apply_to(&self, lead: &mut Lead) {
        if let Some(ref name) = self.name {
            lead.name = name.clone();
        }
        if let Some(ref company) = self.company {
            lead.company = company.clone();
        }
        if let Some(revenue) = self.revenue {
            lead.revenue = revenue;
        }
        if let Some(ref status) = self.status {
            lead.status = status.clone();
        }
    }
}

impl From<LeadFields> for LeadPatch {
    fn from(fields: LeadFields) -> Self {
        Self {
            name: Some(fields.name),
            company: Some(fields.company),
            revenue: Some(fields.revenue),
            status: Some(fields.status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels_round_trip_through_serde() {
        let json = serde_json::to_string(&LeadStatus::Negotiation).unwrap();
        assert_eq!(json, "\"Negociação\"");
        let parsed: LeadStatus = serde_json::from_str("\"Fechado\"").unwrap();
        assert_eq!(parsed, LeadStatus::Closed);
    }

    #[test]
    fn test_from_label_rejects_unknown() {
        assert_eq!(LeadStatus::from_label(" Perdido "), Some(LeadStatus::Lost));
        assert_eq!(LeadStatus::from_label("Won"), None);
    }

    #[test]
    fn test_unknown_stored_label_is_kept_verbatim() {
        let parsed: LeadStatus = serde_json::from_str("\"Ganhou\"").unwrap();
        assert_eq!(parsed, LeadStatus::Other("Ganhou".into()));
        assert!(!parsed.is_funnel());
        assert_eq!(parsed.label(), "Ganhou");
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"Ganhou\"");
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let patch = LeadPatch::status(LeadStatus::Closed);
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "Fechado" }));
    }

    #[test]
    fn test_patch_apply_leaves_unset_fields() {
        let mut lead = Lead {
            id: "1".into(),
            name: "Ana".into(),
            email: String::new(),
            phone: String::new(),
            company: "Acme".into(),
            status: LeadStatus::New,
            source: MANUAL_SOURCE.into(),
            tags: vec![],
            revenue: 100.0,
            created_at: None,
        };
        let patch = LeadPatch {
            revenue: Some(250.0),
            ..Default::default()
        };
        patch.apply_to(&mut lead);
        assert_eq!(lead.revenue, 250.0);
        assert_eq!(lead.name, "Ana");
        assert_eq!(lead.status, LeadStatus::New);
    }

    #[test]
    fn test_config_defaults_from_empty_json() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.timezone, "America/Sao_Paulo");
        assert_eq!(config.supabase.table, "leads");
        assert!(config.gemini.enabled);
        assert_eq!(config.tz(), chrono_tz::America::Sao_Paulo);
    }

    #[test]
    fn test_unknown_timezone_falls_back_to_utc() {
        let config = Config {
            timezone: "Mars/Olympus".into(),
            ..Default::default()
        };
        assert_eq!(config.tz(), chrono_tz::UTC);
    }
}
