//! Port to the external narrative-generation service.
//!
//! The service writes flavor text and decides what a defeated cultivator
//! does. It is remote and may fail; [`NarrativeClient`] turns every failure
//! into a fallback payload so callers always reach a terminal state.

mod client;

pub use client::{NarrativeClient, UsageStats};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::PersonalityTag;

#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    #[error("narrative request failed: {0}")]
    RequestFailed(String),
    #[error("invalid narrative response: {0}")]
    InvalidResponse(String),
    #[error("narrative payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRequest {
    pub prompt_context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedLoot {
    pub item_name: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionPayload {
    pub dialogue: String,
    #[serde(default)]
    pub loot: Vec<NamedLoot>,
    #[serde(default)]
    pub linh_thach: Option<u64>,
}

/// Everything the service needs to voice a defeated NPC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefeatRequest {
    pub npc_name: String,
    pub npc_realm: u32,
    pub npc_level: u32,
    pub player_name: String,
    pub player_realm: u32,
    pub player_level: u32,
    pub personality_tags: Vec<PersonalityTag>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Spare,
    Kill,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefeatDecision {
    pub decision: Verdict,
    pub dialogue: String,
}

/// A service response plus the tokens it cost.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated<T> {
    pub payload: T,
    pub tokens: u64,
}

impl<T> Generated<T> {
    pub fn free(payload: T) -> Self {
        Self { payload, tokens: 0 }
    }
}

#[async_trait]
pub trait NarrativeService: Send + Sync {
    async fn generate_interaction(
        &self,
        request: &InteractionRequest,
    ) -> Result<Generated<InteractionPayload>, NarrativeError>;

    async fn decide_defeat(
        &self,
        request: &DefeatRequest,
    ) -> Result<Generated<DefeatDecision>, NarrativeError>;
}

/// Parse a raw interaction JSON body as returned by a text-generation
/// backend.
pub fn parse_interaction(raw: &str) -> Result<InteractionPayload, NarrativeError> {
    let payload: InteractionPayload = serde_json::from_str(raw.trim())?;
    if payload.dialogue.trim().is_empty() {
        return Err(NarrativeError::InvalidResponse("empty dialogue".into()));
    }
    Ok(payload)
}

pub fn parse_defeat_decision(raw: &str) -> Result<DefeatDecision, NarrativeError> {
    Ok(serde_json::from_str(raw.trim())?)
}

pub fn fallback_interaction() -> InteractionPayload {
    InteractionPayload {
        dialogue: "The wind stirs the leaves, but nothing of note happens.".to_string(),
        loot: Vec::new(),
        linh_thach: None,
    }
}

pub fn fallback_decision(npc_name: &str) -> DefeatDecision {
    DefeatDecision {
        decision: Verdict::Spare,
        dialogue: format!("{npc_name} lowers their head and begs for mercy."),
    }
}

/// Offline service: always answers with the fallback payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackNarrative;

#[async_trait]
impl NarrativeService for FallbackNarrative {
    async fn generate_interaction(
        &self,
        _request: &InteractionRequest,
    ) -> Result<Generated<InteractionPayload>, NarrativeError> {
        Ok(Generated::free(fallback_interaction()))
    }

    async fn decide_defeat(
        &self,
        request: &DefeatRequest,
    ) -> Result<Generated<DefeatDecision>, NarrativeError> {
        Ok(Generated::free(fallback_decision(&request.npc_name)))
    }
}
