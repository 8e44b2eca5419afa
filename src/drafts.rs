//! AI-drafted outreach messages.
//!
//! Best effort: a failed generation never reaches the caller. The lead gets a
//! fixed templated message instead.

use crate::gemini::{GeminiClient, GeminiConfig, TextGenerator};
use crate::types::Lead;

/// PT-BR prompt asking for a short WhatsApp pitch for a new website.
pub fn build_prompt(lead: &Lead, campaign_context: &str) -> String {
    format!(
        "Gere uma mensagem curta e profissional para o WhatsApp visando vender a criação de um site para o lead abaixo.\n\
         Lead: {name}\n\
         Empresa: {company}\n\
         Status Atual: {status}\n\
         Contexto da Campanha: {context}\n\
         \n\
         Diretrizes:\n\
         - Seja amigável mas profissional.\n\
         - Mencione como um novo site pode ajudar o negócio ({company}).\n\
         - Peça uma reunião de 15 minutos.\n\
         - Use PT-BR.\n\
         - NÃO use emojis em excesso.\n\
         - A resposta deve ser APENAS o texto da mensagem.",
        name = lead.name,
        company = lead.company,
        status = lead.status,
        context = campaign_context,
    )
}

/// Deterministic message used whenever generation fails.
pub fn fallback_message(lead: &Lead) -> String {
    format!(
        "Olá {}, notei que a {} pode se beneficiar muito de um site moderno. Vamos conversar?",
        lead.name, lead.company
    )
}

/// Request one completion; any error or empty result yields the fallback.
pub async fn generate_draft(
    generator: &dyn TextGenerator,
    model: &str,
    lead: &Lead,
    campaign_context: &str,
) -> String {
    let prompt = build_prompt(lead, campaign_context);
    match generator.generate(model, &prompt).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            log::warn!("Draft for lead {}: empty completion, using fallback", lead.id);
            fallback_message(lead)
        }
        Err(e) => {
            log::error!("Draft for lead {}: generation failed: {}", lead.id, e);
            fallback_message(lead)
        }
    }
}

/// Draft using configured Gemini settings; falls back when generation is
/// disabled or has no key.
pub async fn draft_with_config(config: &GeminiConfig, lead: &Lead, campaign_context: &str) -> String {
    if !config.is_usable() {
        log::info!("Draft for lead {}: Gemini not configured, using fallback", lead.id);
        return fallback_message(lead);
    }
    let api_key = config.api_key.as_deref().unwrap_or_default();
    let client = GeminiClient::new(api_key);
    generate_draft(&client, &config.model, lead, campaign_context).await
}
