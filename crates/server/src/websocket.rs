//! The one concrete transport binding: a per-session `GET /ws/:session_id`
//! WebSocket upgrade. Grounded in the reference implementation's
//! `websocket.rs` split-sender/receiver pattern: inbound frames are read in
//! a loop on this task, outbound frames are drained from an mpsc channel by
//! a sibling task so a slow/blocked client write never stalls message
//! dispatch.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use voice_agent_pipeline::VadConfig;

use crate::state::AppState;
use crate::wire::{WsInbound, WsOutbound};

pub async fn ws_handler(ws: WebSocketUpgrade, Path(session_id): Path<String>, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, session_id, state))
}

async fn handle_socket(socket: WebSocket, session_id: String, state: Arc<AppState>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<WsOutbound>();

    let service = match state.build_service_context() {
        Ok(service) => service,
        Err(e) => {
            tracing::error!(session_id, error = %e, "failed to build service context for new session");
            let error = WsOutbound::Error { message: e.to_string(), seq: None };
            if let Ok(text) = serde_json::to_string(&error) {
                let _ = ws_sender.send(Message::Text(text)).await;
            }
            return;
        }
    };

    state.sessions.on_connect(session_id.clone(), service, VadConfig::default(), outbound_tx).await;

    let send_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            let text = match serde_json::to_string(&message) {
                Ok(t) => t,
                Err(e) => {
                    tracing::error!(error = %e, "failed to serialize outbound message");
                    continue;
                }
            };
            if ws_sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(message)) = ws_receiver.next().await {
        match message {
            Message::Text(text) => match serde_json::from_str::<WsInbound>(&text) {
                Ok(inbound) => dispatch(&state, &session_id, inbound).await,
                Err(e) => tracing::warn!(session_id, error = %e, "dropping malformed inbound message"),
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    state.sessions.on_disconnect(&session_id).await;
    send_task.abort();
}

async fn dispatch(state: &Arc<AppState>, session_id: &str, inbound: WsInbound) {
    let sessions = &state.sessions;
    match inbound {
        WsInbound::TextInput { text, metadata, .. } => {
            sessions.on_text(session_id, text, value_to_map(metadata)).await;
        }
        WsInbound::MicAudioData { audio } | WsInbound::RawAudioData { audio } => {
            sessions.on_raw_audio_chunk(session_id, audio).await;
        }
        WsInbound::MicAudioEnd { .. } => {
            // The VAD state machine drives end-of-utterance from the audio
            // stream itself; an explicit end marker needs no extra action.
        }
        WsInbound::InterruptSignal { text } => {
            sessions.on_interrupt(session_id, text).await;
        }
        WsInbound::FetchHistoryList {} => sessions.on_fetch_history_list(session_id).await,
        WsInbound::FetchHistory { history_uid } => sessions.on_fetch_history(session_id, &history_uid).await,
        WsInbound::CreateNewHistory {} => sessions.on_create_new_history(session_id).await,
        WsInbound::ClearHistory {} => sessions.on_clear_history(session_id).await,
        WsInbound::SwitchConfig { file } => {
            sessions.on_switch_config(session_id, &file).await;
            if let Err(e) = state.reload_config(&file) {
                tracing::warn!(session_id, error = %e, "config reload failed");
            }
        }
        WsInbound::Heartbeat {} => sessions.on_heartbeat(session_id).await,
    }
}

fn value_to_map(metadata: Option<serde_json::Value>) -> HashMap<String, serde_json::Value> {
    metadata.and_then(|v| v.as_object().cloned()).map(|m| m.into_iter().collect()).unwrap_or_default()
}
