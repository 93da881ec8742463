//! `GET /teams/members` (spec.md §6): the full developer roster.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use sdlc_synth_domain::{Seniority, TeamEnvelope};

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MemberDto {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub seniority: Seniority,
    pub ai_preference: f64,
    pub active: bool,
}

pub async fn members(State(state): State<Arc<AppState>>) -> Json<TeamEnvelope<Vec<MemberDto>>> {
    let mut devs: Vec<MemberDto> = state
        .store
        .developers()
        .iter()
        .map(|d| MemberDto {
            id: d.id.to_string(),
            display_name: d.display_name.clone(),
            email: d.email.clone(),
            seniority: d.seniority,
            ai_preference: d.ai_preference,
            active: d.active,
        })
        .collect();
    // Stable order regardless of generation-sweep order.
    devs.sort_by(|a, b| a.id.cmp(&b.id));

    Json(TeamEnvelope {
        data: devs,
        params: serde_json::json!({}),
    })
}
