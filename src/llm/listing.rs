//! Used-vehicle sales listing ("repasse") produced from a dictated
//! description.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::completion::{ChatMessage, CompletionRequest, LlmError};

/// Instruction for the listing assistant, including the JSON schema.
pub const SYSTEM_PROMPT: &str = r#"Você é um assistente especialista em criação de anúncios de veículos usados. Analise o texto fornecido pelo usuário (que descreve o veículo para repasse) e estruture as informações de forma clara, profissional e atraente. Gere uma resposta em formato JSON estrito.

SCHEMA:
{
  "titulo": "string, título chamativo para o anúncio",
  "modelo_ano": "string, Ex: Honda Civic 2018/2019",
  "descricao_sumario": "string, resumo dos pontos fortes",
  "lista_detalhes": ["string", "string", "lista de 5 a 8 características importantes (Ex: Quilometragem baixa, Teto solar, Pneus novos, Manutenção em dia)"],
  "preco": "string, sugestão de preço ou 'A consultar'",
  "contato": "string, Mensagem padrão de contato"
}

Sua saída deve ser APENAS o objeto JSON."#;

/// Bullet count the assistant is asked for.
pub const DETAIL_RANGE: RangeInclusive<usize> = 5..=8;

/// Structured listing as returned by the assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingDraft {
    pub titulo: String,
    pub modelo_ano: String,
    pub descricao_sumario: String,
    pub lista_detalhes: Vec<String>,
    pub preco: String,
    pub contato: String,
}

pub fn user_message(transcript: &str) -> String {
    format!("Detalhes ditados: {transcript}")
}

/// The chat request for one transcript.
pub fn request(transcript: &str) -> CompletionRequest {
    CompletionRequest {
        messages: vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(user_message(transcript)),
        ],
        json: true,
    }
}

/// Strictly parse the assistant's content.
pub fn parse(content: &str) -> Result<ListingDraft, LlmError> {
    let draft: ListingDraft =
        serde_json::from_str(content.trim()).map_err(|e| LlmError::Parse(e.to_string()))?;

    if !DETAIL_RANGE.contains(&draft.lista_detalhes.len()) {
        log::warn!(
            "repass: listing has {} detail(s), expected {}..={}",
            draft.lista_detalhes.len(),
            DETAIL_RANGE.start(),
            DETAIL_RANGE.end()
        );
    }
    Ok(draft)
}

impl ListingDraft {
    /// Plain-text rendering shown in the repass panel.
    pub fn render(&self) -> String {
        format!(
            "--- {} ---\n\n\
             Modelo/Ano: {}\n\n\
             Sumário: {}\n\n\
             Características Principais:\n- {}\n\n\
             Preço: {}\n\n\
             Contato: {}",
            self.titulo,
            self.modelo_ano,
            self.descricao_sumario,
            self.lista_detalhes.join("\n- "),
            self.preco,
            self.contato
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
