//! In-memory fakes for the gateway and text generator.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::Notify;

use crate::error::{GenerationError, RemoteError};
use crate::gemini::TextGenerator;
use crate::supabase::{LeadGateway, NewLead, RawLead};
use crate::types::{Lead, LeadPatch, LeadStatus, MANUAL_SOURCE};

pub fn lead(id: &str, name: &str, company: &str) -> Lead {
    Lead {
        id: id.to_string(),
        name: name.to_string(),
        email: String::new(),
        phone: String::new(),
        company: company.to_string(),
        status: LeadStatus::New,
        source: MANUAL_SOURCE.to_string(),
        tags: Vec::new(),
        revenue: 0.0,
        created_at: None,
    }
}

pub fn lead_with(id: &str, status: LeadStatus, revenue: f64, created_at: Option<DateTime<Utc>>) -> Lead {
    Lead {
        status,
        revenue,
        created_at,
        ..lead(id, &format!("Lead {}", id), &format!("Company {}", id))
    }
}

pub fn raw(id: &str, name: &str, company: &str, status: &str, revenue: f64) -> RawLead {
    serde_json::from_value(json!({
        "id": id,
        "name": name,
        "company": company,
        "status": status,
        "revenue": revenue,
        "created_at": "2025-02-10T12:00:00+00:00"
    }))
    .unwrap()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Network,
    Permission,
    Rejected,
}

impl Failure {
    fn to_error(self) -> RemoteError {
        match self {
            Failure::Network => RemoteError::Unavailable("connection refused".into()),
            Failure::Permission => RemoteError::Api {
                status: 403,
                code: "42501".into(),
                message: "permission denied for table leads".into(),
            },
            Failure::Rejected => RemoteError::Api {
                status: 409,
                code: "23505".into(),
                message: "duplicate key value violates unique constraint".into(),
            },
        }
    }
}

/// Scripted gateway: serves `rows`, records every call, fails on demand.
#[derive(Default)]
pub struct FakeGateway {
    rows: Mutex<Vec<RawLead>>,
    failure: Mutex<Option<Failure>>,
    calls: Mutex<Vec<String>>,
    gate: Mutex<Option<Arc<Notify>>>,
    next_id: Mutex<u32>,
    create_without_id: Mutex<bool>,
}

impl FakeGateway {
    pub fn with_rows(rows: Vec<RawLead>) -> Arc<Self> {
        let gateway = Self::default();
        *gateway.rows.lock() = rows;
        Arc::new(gateway)
    }

    pub fn fail_with(&self, failure: Failure) {
        *self.failure.lock() = Some(failure);
    }

    /// Block the next gateway call until the returned handle is notified.
    pub fn hold(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock() = Some(notify.clone());
        notify
    }

    /// Store created rows but answer with the id column missing.
    pub fn answer_create_without_id(&self) {
        *self.create_without_id.lock() = true;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: String) -> Result<(), RemoteError> {
        self.calls.lock().push(call);
        match *self.failure.lock() {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }

    async fn wait_gate(&self) {
        let gate = self.gate.lock().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl LeadGateway for FakeGateway {
    async fn list_leads(&self) -> Result<Vec<RawLead>, RemoteError> {
        self.wait_gate().await;
        self.record("list".into())?;
        Ok(self.rows.lock().clone())
    }

    async fn create_lead(&self, lead: &NewLead) -> Result<RawLead, RemoteError> {
        self.wait_gate().await;
        self.record(format!("create {}", lead.name))?;
        let id = {
            let mut next = self.next_id.lock();
            *next += 1;
            format!("new-{}", next)
        };
        let row: RawLead = serde_json::from_value(json!({
            "id": id,
            "name": lead.name,
            "company": lead.company,
            "email": lead.email,
            "phone": lead.phone,
            "status": lead.status,
            "source": lead.source,
            "revenue": lead.revenue,
            "created_at": Utc::now().to_rfc3339()
        }))
        .map_err(|e| RemoteError::Decode(e.to_string()))?;
        self.rows.lock().insert(0, row.clone());
        if *self.create_without_id.lock() {
            return Ok(RawLead {
                id: serde_json::Value::Null,
                ..row
            });
        }
        Ok(row)
    }

    async fn update_lead(&self, id: &str, patch: &LeadPatch) -> Result<(), RemoteError> {
        self.wait_gate().await;
        let body = serde_json::to_string(patch).map_err(|e| RemoteError::Decode(e.to_string()))?;
        self.record(format!("update {} {}", id, body))
    }

    async fn delete_lead(&self, id: &str) -> Result<(), RemoteError> {
        self.wait_gate().await;
        self.record(format!("delete {}", id))?;
        self.rows
            .lock()
            .retain(|r| crate::util::id_to_string(&r.id).as_deref() != Some(id));
        Ok(())
    }
}

/// Generator returning a fixed completion or always failing.
pub struct ScriptedGenerator {
    reply: Option<String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedGenerator {
    pub fn ok(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(model, prompt)` pairs.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        self.calls.lock().push((model.to_string(), prompt.to_string()));
        match self.reply {
            Some(ref reply) => Ok(reply.clone()),
            None => Err(GenerationError::Api {
                status: 429,
                message: "RESOURCE_EXHAUSTED: Quota exceeded".into(),
            }),
        }
    }
}
