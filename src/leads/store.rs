//! Lead store and reconciler.
//!
//! Holds the in-memory mirror of the `leads` table. Every mutation goes to the
//! gateway first; the local list is patched only after the backend confirms,
//! never re-fetched. Outcomes are reported through the `Notifier`.
//!
//! At most one update or delete per lead, and one refresh, may be in flight.
//! Duplicates are rejected before they reach the gateway.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::error::{RemoteError, StoreError};
use crate::notification::{Notifier, Toast};
use crate::supabase::{LeadGateway, NewLead, RawLead};
use crate::types::{Lead, LeadFields, LeadPatch};

/// Question shown before a lead is deleted.
pub const DELETE_PROMPT: &str =
    "Esta ação removerá o lead permanentemente da nuvem. Confirmar exclusão?";

/// Explicit user confirmation step required before a delete.
pub trait Confirm {
    fn confirm(&self, lead_id: &str, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str, &str) -> bool,
{
    fn confirm(&self, lead_id: &str, prompt: &str) -> bool {
        self(lead_id, prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Refresh,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Refresh => "refresh",
            Operation::Update => "update",
            Operation::Delete => "delete",
        })
    }
}

type InFlightKey = (String, Operation);

/// Releases an in-flight key when the call completes, on every path.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<InFlightKey>>,
    key: InFlightKey,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set.lock().remove(&self.key);
    }
}

#[derive(Debug, Default)]
struct StoreState {
    leads: Vec<Lead>,
    loading: bool,
}

pub struct LeadStore {
    gateway: Arc<dyn LeadGateway>,
    notifier: Arc<dyn Notifier>,
    state: RwLock<StoreState>,
    in_flight: Mutex<HashSet<InFlightKey>>,
}

impl LeadStore {
    pub fn new(gateway: Arc<dyn LeadGateway>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            gateway,
            notifier,
            state: RwLock::new(StoreState::default()),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Snapshot of the collection, newest first.
    pub fn leads(&self) -> Vec<Lead> {
        self.state.read().leads.clone()
    }

    /// Run a read-only projection without cloning the collection.
    pub fn with_leads<R>(&self, f: impl FnOnce(&[Lead]) -> R) -> R {
        f(&self.state.read().leads)
    }

    pub fn get(&self, id: &str) -> Option<Lead> {
        self.state.read().leads.iter().find(|l| l.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.read().leads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().leads.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    pub fn is_in_flight(&self, lead_id: &str, operation: Operation) -> bool {
        self.in_flight
            .lock()
            .contains(&(lead_id.to_string(), operation))
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Replace the collection with the backend's, in backend order.
    ///
    /// On failure the previous collection stays and a network toast is raised.
    pub async fn refresh(&self) -> Result<usize, StoreError> {
        let _guard = self.begin("*", Operation::Refresh)?;
        self.state.write().loading = true;

        match self.gateway.list_leads().await {
            Ok(rows) => {
                let leads = map_rows(rows);
                let count = leads.len();
                {
                    let mut state = self.state.write();
                    state.leads = leads;
                    state.loading = false;
                }
                log::info!("Lead store: loaded {} leads", count);
                Ok(count)
            }
            Err(e) => {
                self.state.write().loading = false;
                log::error!("Lead store: sync failed: {}", e);
                self.notifier.notify(Toast::error(
                    "Falha de Rede",
                    "Não foi possível conectar ao banco de dados.",
                ));
                Err(e.into())
            }
        }
    }

    /// Insert a lead and put the stored record at the head of the list.
    ///
    /// A row the backend stored but returned without a usable id is reported
    /// apart from a failed save; the next refresh picks it up.
    pub async fn create(&self, fields: LeadFields) -> Result<Lead, StoreError> {
        let new_lead = NewLead::from(fields);
        let row = match self.gateway.create_lead(&new_lead).await {
            Ok(row) => row,
            Err(e) => {
                self.save_failed("create", &e);
                return Err(e.into());
            }
        };

        match row.into_lead() {
            Ok(lead) => {
                self.state.write().leads.insert(0, lead.clone());
                log::info!("Lead store: created lead {}", lead.id);
                self.notifier.notify(Toast::success(
                    "Lead Cadastrado",
                    "Novo cliente adicionado ao funil.",
                ));
                Ok(lead)
            }
            Err(e) => {
                log::error!("Lead store: lead stored but response not decodable: {}", e);
                self.notifier.notify(Toast::error(
                    "Resposta Incompleta",
                    "O lead foi salvo, mas o banco não devolveu o registro. Atualize a lista.",
                ));
                Err(e.into())
            }
        }
    }

    /// Send a partial update and merge it into the matching entry.
    pub async fn update(&self, id: &str, patch: LeadPatch) -> Result<(), StoreError> {
        if patch.is_empty() {
            return Err(StoreError::Invalid("empty update".to_string()));
        }
        let _guard = self.begin(id, Operation::Update)?;

        match self.gateway.update_lead(id, &patch).await {
            Ok(()) => {
                {
                    let mut state = self.state.write();
                    match state.leads.iter_mut().find(|l| l.id == id) {
                        Some(lead) => patch.apply_to(lead),
                        None => log::debug!("Lead store: updated lead {} is not loaded locally", id),
                    }
                }
                log::info!("Lead store: updated lead {}", id);
                self.notifier
                    .notify(Toast::success("Lead Atualizado", "Os dados foram salvos com sucesso."));
                Ok(())
            }
            Err(e) => {
                self.save_failed("update", &e);
                Err(e.into())
            }
        }
    }

    /// Delete after explicit confirmation; local removal only once the
    /// backend confirms.
    pub async fn delete(&self, id: &str, confirm: &dyn Confirm) -> Result<(), StoreError> {
        let _guard = self.begin(id, Operation::Delete)?;
        if !confirm.confirm(id, DELETE_PROMPT) {
            log::debug!("Lead store: delete of {} not confirmed", id);
            return Err(StoreError::Cancelled);
        }

        match self.gateway.delete_lead(id).await {
            Ok(()) => {
                self.state.write().leads.retain(|l| l.id != id);
                log::info!("Lead store: deleted lead {}", id);
                self.notifier
                    .notify(Toast::success("Lead Removido", "O registro foi excluído com sucesso."));
                Ok(())
            }
            Err(e) => {
                log::error!("Lead store: delete of {} failed: {}", id, e);
                let toast = if e.is_permission_denied() {
                    Toast::error(
                        "Erro de Segurança",
                        "Ação bloqueada. Libere a política de exclusão da tabela leads no Supabase.",
                    )
                } else {
                    Toast::error("Erro na Exclusão", &e.user_message())
                };
                self.notifier.notify(toast);
                Err(e.into())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn begin(&self, lead_id: &str, operation: Operation) -> Result<InFlightGuard<'_>, StoreError> {
        let key = (lead_id.to_string(), operation);
        if !self.in_flight.lock().insert(key.clone()) {
            log::warn!("Lead store: {} already in flight for {}", operation, lead_id);
            return Err(StoreError::AlreadyInFlight {
                lead_id: lead_id.to_string(),
                operation: operation.to_string(),
            });
        }
        Ok(InFlightGuard {
            set: &self.in_flight,
            key,
        })
    }

    fn save_failed(&self, action: &str, e: &RemoteError) {
        log::error!("Lead store: {} failed: {}", action, e);
        self.notifier.notify(Toast::error(
            "Erro ao Salvar",
            "Verifique sua conexão ou permissões SQL.",
        ));
    }
}

fn map_rows(rows: Vec<RawLead>) -> Vec<Lead> {
    rows.into_iter()
        .filter_map(|row| match row.into_lead() {
            Ok(lead) => Some(lead),
            Err(e) => {
                log::warn!("Lead store: skipping row: {}", e);
                None
            }
        })
        .collect()
}
