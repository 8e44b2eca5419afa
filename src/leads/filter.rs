use crate::types::Lead;

/// Leads whose name or company contains `query`, ignoring case.
///
/// An empty query keeps every lead. Order is preserved.
pub fn filter_leads<'a>(leads: &'a [Lead], query: &str) -> Vec<&'a Lead> {
    if query.is_empty() {
        return leads.iter().collect();
    }
    let needle = query.to_lowercase();
    leads
        .iter()
        .filter(|l| {
            l.name.to_lowercase().contains(&needle) || l.company.to_lowercase().contains(&needle)
        })
        .collect()
}
