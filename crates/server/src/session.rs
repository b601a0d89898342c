//! Owns every per-connection piece of state: the orchestrator, the VAD
//! state machine, the in-progress audio buffer, and the utterance timeout
//! tracker. Grounded in the reference implementation's `session.rs`
//! `SessionManager`/`start_cleanup_task` shape, generalized from "one
//! domain agent per session" to "one orchestrator per session".

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::{watch, Mutex, RwLock};
use voice_agent_core::{AudioFrame, RawInput};
use voice_agent_orchestrator::{Orchestrator, ServiceContext};
use voice_agent_pipeline::{VadConfig, VadStateMachine};

use crate::wire::{control, HistoryMessage, HistoryPreview, WsOutbound};

/// How long a session may sit idle before the reaper evicts it.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(15 * 60);
/// How often the reaper sweeps for idle sessions.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);
/// §4.3/§4.11: force end-of-utterance if a session stays mid-speech this long.
pub const VAD_TIMEOUT: Duration = Duration::from_secs(15);

/// External collaborator seam for conversation history persistence. No
/// implementation ships in this crate; `NoopHistoryStore` keeps the socket
/// frontend fully exercisable without one attached.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn list(&self) -> Vec<HistoryPreview>;
    async fn fetch(&self, history_uid: &str) -> Vec<HistoryMessage>;
    async fn create_new(&self) -> String;
    async fn clear(&self);
    async fn switch_config(&self, file: &str);
}

#[derive(Default)]
pub struct NoopHistoryStore;

#[async_trait]
impl HistoryStore for NoopHistoryStore {
    async fn list(&self) -> Vec<HistoryPreview> {
        Vec::new()
    }
    async fn fetch(&self, _history_uid: &str) -> Vec<HistoryMessage> {
        Vec::new()
    }
    async fn create_new(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
    async fn clear(&self) {}
    async fn switch_config(&self, _file: &str) {}
}

/// Stands in for a VAD provider when a session has none configured, so
/// `raw_audio_data` chunks can still flow through the same state machine
/// instead of requiring a separate code path.
struct AlwaysSilentVad;

#[async_trait]
impl voice_agent_core::VoiceActivityDetector for AlwaysSilentVad {
    async fn speech_probability(&self, _window: &[f32]) -> f32 {
        0.0
    }
    fn provider_name(&self) -> &str {
        "always-silent"
    }
}

struct UtteranceTracker {
    start: Instant,
}

struct SessionEntry {
    orchestrator: Arc<Orchestrator>,
    vad: Mutex<VadStateMachine>,
    audio_buffer: Mutex<Vec<u8>>,
    tracker: Mutex<Option<UtteranceTracker>>,
    turn_lock: Mutex<()>,
    last_activity: Mutex<Instant>,
    outbound: UnboundedSender<WsOutbound>,
}

pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<SessionEntry>>>,
    history: Arc<dyn HistoryStore>,
    session_timeout: Duration,
    cleanup_interval: Duration,
}

impl SessionManager {
    pub fn new(history: Arc<dyn HistoryStore>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            history,
            session_timeout: DEFAULT_SESSION_TIMEOUT,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = timeout;
        self
    }

    /// Creates the session, wires the socket adapter onto its bus, and
    /// sends the opening handshake. Sessions with no configured VAD provider
    /// still get a state machine wired to a detector that never reports
    /// speech, so raw-audio chunks are accepted without panicking; such a
    /// session simply never produces a `speech-end`.
    pub async fn on_connect(
        &self,
        session_id: String,
        service: ServiceContext,
        vad_config: VadConfig,
        outbound: UnboundedSender<WsOutbound>,
    ) {
        let detector = service.vad.clone().unwrap_or_else(|| Arc::new(AlwaysSilentVad));
        let orchestrator = Arc::new(Orchestrator::new(service));

        let adapter = Arc::new(crate::socket_adapter::SocketAdapter::new(outbound.clone()));
        orchestrator.register_many(
            &[
                voice_agent_pipeline::output_pipeline::EVENT_SENTENCE,
                voice_agent_orchestrator::EVENT_EXPRESSION,
                voice_agent_orchestrator::EVENT_AUDIO,
                voice_agent_orchestrator::EVENT_AUDIO_WITH_EXPRESSION,
                voice_agent_orchestrator::EVENT_ERROR,
            ],
            adapter,
            voice_agent_bus::EventPriority::NORMAL,
        );
        orchestrator.start();

        let entry = Arc::new(SessionEntry {
            orchestrator,
            vad: Mutex::new(VadStateMachine::new(detector, vad_config)),
            audio_buffer: Mutex::new(Vec::new()),
            tracker: Mutex::new(None),
            turn_lock: Mutex::new(()),
            last_activity: Mutex::new(Instant::now()),
            outbound: outbound.clone(),
        });
        self.sessions.write().await.insert(session_id.clone(), entry);

        let _ = outbound.send(WsOutbound::ConnectionEstablished {
            message: "connected".to_string(),
            sid: session_id,
        });
        let _ = outbound.send(WsOutbound::Control { text: control::START_MIC });
    }

    async fn touch(&self, session_id: &str) {
        if let Some(entry) = self.sessions.read().await.get(session_id) {
            *entry.last_activity.lock().await = Instant::now();
        }
    }

    fn entry(entries: &HashMap<String, Arc<SessionEntry>>, session_id: &str) -> Option<Arc<SessionEntry>> {
        entries.get(session_id).cloned()
    }

    pub async fn on_text(&self, session_id: &str, text: String, metadata: HashMap<String, Value>) {
        self.touch(session_id).await;
        let entry = match Self::entry(&*self.sessions.read().await, session_id) {
            Some(e) => e,
            None => return,
        };
        let _guard = entry.turn_lock.lock().await;
        let result = entry.orchestrator.process_input(RawInput::Text(text), metadata, "User").await;
        if !result.success && !result.interrupted {
            let _ = entry.outbound.send(WsOutbound::Error {
                message: result.error.unwrap_or_else(|| "turn failed".to_string()),
                seq: None,
            });
        }
    }

    pub async fn on_raw_audio_chunk(&self, session_id: &str, pcm: Vec<f32>) {
        self.touch(session_id).await;
        let entry = match Self::entry(&*self.sessions.read().await, session_id) {
            Some(e) => e,
            None => return,
        };

        let window_bytes = AudioFrame::new(pcm.clone(), 16_000).to_i16_bytes();
        let vad_result = entry.vad.lock().await.process_window(&window_bytes, &pcm).await;

        if vad_result.is_speech_start {
            *entry.tracker.lock().await = Some(UtteranceTracker { start: Instant::now() });
            return;
        }

        let timed_out = entry
            .tracker
            .lock()
            .await
            .as_ref()
            .is_some_and(|tracker| tracker.start.elapsed() > VAD_TIMEOUT);

        if timed_out {
            *entry.tracker.lock().await = None;
            let audio = entry.vad.lock().await.force_end();
            tracing::warn!(session_id, "vad timeout rescue firing, forcing end of utterance");
            Self::finish_utterance(&entry, audio).await;
            return;
        }

        if vad_result.is_speech_end {
            *entry.tracker.lock().await = None;
            Self::finish_utterance(&entry, vad_result.audio_data).await;
        }
    }

    /// Shared tail of a finished utterance, whether it ended because the
    /// state machine detected speech-end or because the timeout rescue
    /// forced one: flush the buffer, run the turn, bracket it with the
    /// wire's mic/conversation control markers.
    async fn finish_utterance(entry: &Arc<SessionEntry>, audio_bytes: Vec<u8>) {
        let mut buffer = entry.audio_buffer.lock().await;
        buffer.clear();
        buffer.extend_from_slice(&audio_bytes);
        let samples = AudioFrame::from_i16_bytes(&buffer, 16_000).samples;
        buffer.clear();
        drop(buffer);

        let _ = entry.outbound.send(WsOutbound::Control { text: control::MIC_AUDIO_END });
        let _ = entry.outbound.send(WsOutbound::Control { text: control::CONVERSATION_START });

        let _guard = entry.turn_lock.lock().await;
        let result = entry.orchestrator.process_input(RawInput::Audio(samples), HashMap::new(), "User").await;
        if !result.success && !result.interrupted {
            let _ = entry.outbound.send(WsOutbound::Error {
                message: result.error.unwrap_or_else(|| "turn failed".to_string()),
                seq: None,
            });
        }
        let _ = entry.outbound.send(WsOutbound::Control { text: control::CONVERSATION_END });
    }

    pub async fn on_interrupt(&self, session_id: &str, _heard_text: Option<String>) {
        self.touch(session_id).await;
        if let Some(entry) = Self::entry(&*self.sessions.read().await, session_id) {
            entry.orchestrator.interrupt();
            let _ = entry.outbound.send(WsOutbound::Control { text: control::INTERRUPTED });
        }
    }

    pub async fn on_fetch_history_list(&self, session_id: &str) {
        if let Some(entry) = Self::entry(&*self.sessions.read().await, session_id) {
            let histories = self.history.list().await;
            let _ = entry.outbound.send(WsOutbound::HistoryList { histories });
        }
    }

    pub async fn on_fetch_history(&self, session_id: &str, history_uid: &str) {
        if let Some(entry) = Self::entry(&*self.sessions.read().await, session_id) {
            let messages = self.history.fetch(history_uid).await;
            let _ = entry.outbound.send(WsOutbound::HistoryData { messages });
        }
    }

    pub async fn on_create_new_history(&self, session_id: &str) {
        if let Some(entry) = Self::entry(&*self.sessions.read().await, session_id) {
            let history_uid = self.history.create_new().await;
            let _ = entry.outbound.send(WsOutbound::NewHistoryCreated { history_uid });
        }
    }

    pub async fn on_clear_history(&self, session_id: &str) {
        if let Some(entry) = Self::entry(&*self.sessions.read().await, session_id) {
            self.history.clear().await;
            let _ = entry.outbound.send(WsOutbound::HistoryCleared {});
        }
    }

    pub async fn on_switch_config(&self, session_id: &str, file: &str) {
        self.history.switch_config(file).await;
        let _ = session_id;
    }

    pub async fn on_heartbeat(&self, session_id: &str) {
        if let Some(entry) = Self::entry(&*self.sessions.read().await, session_id) {
            let _ = entry.outbound.send(WsOutbound::HeartbeatAck {});
        }
    }

    pub async fn on_disconnect(&self, session_id: &str) {
        let removed = self.sessions.write().await.remove(session_id);
        if let Some(entry) = removed {
            entry.orchestrator.stop();
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn cleanup_expired(&self) {
        let expired: Vec<String> = {
            let sessions = self.sessions.read().await;
            let mut expired = Vec::new();
            for (id, entry) in sessions.iter() {
                if entry.last_activity.lock().await.elapsed() > self.session_timeout {
                    expired.push(id.clone());
                }
            }
            expired
        };
        for id in expired {
            tracing::info!(session_id = %id, "evicting idle session");
            self.on_disconnect(&id).await;
        }
    }

    /// Grounded in the reference implementation's `start_cleanup_task`:
    /// a periodic sweep, stoppable via a watch channel.
    pub fn start_cleanup_task(self: &Arc<Self>) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let manager = self.clone();
        let interval = self.cleanup_interval;
        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = interval_timer.tick() => manager.cleanup_expired().await,
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });
        shutdown_tx
    }
}
