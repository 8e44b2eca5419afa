// Leads service: add/edit form flow.
// Business logic behind the lead modal: prefill, validation, and routing a
// submission to create or update.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::leads::LeadStore;
use crate::types::{Lead, LeadFields, LeadPatch, LeadStatus};
use crate::util::parse_revenue;

/// Raw form input. Revenue stays text until submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadForm {
    pub name: String,
    pub company: String,
    pub revenue: String,
    pub status: LeadStatus,
}

/// What a successful submission did.
#[derive(Debug, Clone, PartialEq)]
pub enum Saved {
    Created(Lead),
    Updated(String),
}

impl LeadForm {
    /// Blank form for a new lead.
    pub fn open_add() -> Self {
        Self::default()
    }

    /// Form prefilled from an existing lead.
    pub fn open_edit(lead: &Lead) -> Self {
        Self {
            name: lead.name.clone(),
            company: lead.company.clone(),
            revenue: lead.revenue.to_string(),
            status: lead.status.clone(),
        }
    }

    /// Name and company are required.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.name.trim().is_empty() {
            return Err(StoreError::Invalid("o nome é obrigatório".to_string()));
        }
        if self.company.trim().is_empty() {
            return Err(StoreError::Invalid("a empresa é obrigatória".to_string()));
        }
        Ok(())
    }

    pub fn to_fields(&self) -> LeadFields {
        LeadFields {
            name: self.name.clone(),
            company: self.company.clone(),
            revenue: parse_revenue(&self.revenue),
            status: self.status.clone(),
        }
    }
}

/// Submit the modal: create when `editing_id` is `None`, otherwise update
/// that lead with the form's name, company and revenue. Status is sent only
/// when it differs from the loaded lead, so a stored label outside the funnel
/// is not overwritten by an unrelated edit.
pub async fn submit(
    store: &LeadStore,
    editing_id: Option<&str>,
    form: &LeadForm,
) -> Result<Saved, StoreError> {
    form.validate()?;
    let fields = form.to_fields();

    match editing_id {
        Some(id) => {
            let mut patch = LeadPatch::from(fields);
            if store.get(id).map(|lead| lead.status) == patch.status {
                patch.status = None;
            }
            store.update(id, patch).await?;
            Ok(Saved::Updated(id.to_string()))
        }
        None => store.create(fields).await.map(Saved::Created),
    }
}
