//! Conversation controller
//!
//! Owns the conversation state and the views. User actions and backend
//! completions go through the pure transition function; the resulting
//! effects are applied here, one event at a time.

use crate::backend::{ChatBackend, ChatRequest};
use crate::state_machine::{transition, ConversationState, Effect, Event};
use crate::view::{ChatHeader, InputSurface, SessionDirectory, TranscriptView};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Drives one conversation view against any backend implementation
pub struct ConversationController<B>
where
    B: ChatBackend + 'static,
{
    state: ConversationState,
    backend: Arc<B>,
    transcript: TranscriptView,
    directory: SessionDirectory,
    input: InputSurface,
    header: ChatHeader,
    /// Backend tasks report back through this channel
    completion_tx: mpsc::UnboundedSender<Event>,
    completion_rx: mpsc::UnboundedReceiver<Event>,
    /// Requests spawned whose completion has not been handled yet
    in_flight: usize,
}

impl<B> ConversationController<B>
where
    B: ChatBackend + 'static,
{
    pub fn new(backend: B) -> Self {
        Self::with_shared(Arc::new(backend))
    }

    pub fn with_shared(backend: Arc<B>) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        Self {
            state: ConversationState::new(),
            backend,
            transcript: TranscriptView::new(),
            directory: SessionDirectory::new(),
            input: InputSurface::new(),
            header: ChatHeader::new(),
            completion_tx,
            completion_rx,
            in_flight: 0,
        }
    }

    // ============================================================
    // User actions
    // ============================================================

    /// Reset to an unsaved conversation. Local only.
    pub fn start_new(&mut self) {
        self.dispatch(Event::NewConversation);
    }

    /// Send a turn; blank text is ignored
    pub fn send(&mut self, text: &str) {
        self.dispatch(Event::submit(text));
    }

    /// Open a session the directory lists
    pub fn select_session(&mut self, session_id: &str) {
        self.dispatch(Event::select(session_id));
    }

    pub fn refresh_sessions(&mut self) {
        self.dispatch(Event::RefreshSessions);
    }

    // ============================================================
    // Event loop
    // ============================================================

    /// Wait for the next backend completion. Pending forever when nothing is
    /// in flight, so it can sit in a `select!` next to input events.
    pub async fn next_completion(&mut self) -> Event {
        loop {
            if let Some(event) = self.completion_rx.recv().await {
                self.in_flight = self.in_flight.saturating_sub(1);
                return event;
            }
            // Unreachable while we hold the sender; park rather than spin
            std::future::pending::<()>().await;
        }
    }

    /// Handle the next backend completion. Returns false when nothing is in
    /// flight.
    pub async fn process_next(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        let event = self.next_completion().await;
        self.dispatch(event);
        true
    }

    /// Handle completions until no request is outstanding
    pub async fn settle(&mut self) {
        while self.process_next().await {}
    }

    /// Run one event through the state machine and apply its effects
    pub fn dispatch(&mut self, event: Event) {
        let name = event.name();
        let result = match transition(&self.state, event) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(event = name, error = %e, "Rejected conversation event");
                return;
            }
        };

        let old_state = std::mem::replace(&mut self.state, result.new_state);
        if old_state.active_session_id != self.state.active_session_id {
            tracing::info!(
                event = name,
                from = ?old_state.active_session_id,
                to = ?self.state.active_session_id,
                "Active session changed"
            );
        }

        for effect in result.effects {
            self.execute_effect(effect);
        }
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::RenderTurn { role, content } => self.transcript.append(role, &content),
            Effect::RenderTool { invocation } => {
                self.transcript.append_tool(&invocation.name, &invocation.args);
            }
            Effect::ShowPending => self.transcript.show_pending(),
            Effect::DismissPending => self.transcript.dismiss_pending(),
            Effect::ClearTranscript => self.transcript.clear(),
            Effect::ReplaceTranscript { turns } => self.transcript.replace(&turns),

            Effect::ClearInput => self.input.clear(),
            Effect::SetInputEnabled { enabled } => self.input.set_enabled(enabled),
            Effect::FocusInput => self.input.focus(),

            Effect::SetTitle { title } => self.header.title = title,
            Effect::SetSessionLabel { label } => self.header.session_label = label,

            Effect::HighlightSession { session_id } => {
                self.directory.highlight(session_id.as_deref());
            }
            Effect::RenderSessions { sessions, active } => {
                self.directory.render(&sessions, active.as_deref());
            }

            Effect::SendTurn { request } => self.spawn_send(request),
            Effect::FetchSessions { seq } => self.spawn_list(seq),
            Effect::FetchHistory { session_id, epoch } => self.spawn_history(session_id, epoch),

            Effect::ReportBackgroundFailure { operation, message } => {
                tracing::warn!(operation, error = %message, "Background request failed");
            }
            Effect::DiscardStale { operation, reason } => {
                tracing::debug!(operation, reason = %reason, "Discarded stale response");
            }
        }
    }

    // ============================================================
    // Backend requests
    // ============================================================

    fn spawn_send(&mut self, request: ChatRequest) {
        tracing::info!(
            session_id = ?request.session_id,
            chars = request.message.chars().count(),
            "Sending message"
        );
        self.spawn(move |backend| async move {
            match backend.send_turn(&request).await {
                Ok(reply) => Event::SendSucceeded { reply },
                Err(error) => Event::SendFailed { error },
            }
        });
    }

    fn spawn_list(&mut self, seq: u64) {
        self.spawn(move |backend| async move {
            match backend.list_sessions().await {
                Ok(sessions) => Event::SessionsLoaded { seq, sessions },
                Err(error) => Event::SessionsFailed { seq, error },
            }
        });
    }

    fn spawn_history(&mut self, session_id: String, epoch: u64) {
        tracing::debug!(session_id = %session_id, epoch, "Loading session history");
        self.spawn(move |backend| async move {
            match backend.fetch_history(&session_id).await {
                Ok(messages) => Event::HistoryLoaded {
                    session_id,
                    epoch,
                    messages,
                },
                Err(error) => Event::HistoryFailed {
                    session_id,
                    epoch,
                    error,
                },
            }
        });
    }

    /// Run a backend call as a task that reports its outcome as an event.
    /// There is no cancellation; stale answers are sorted out by the state
    /// machine when they arrive.
    fn spawn<F, Fut>(&mut self, call: F)
    where
        F: FnOnce(Arc<B>) -> Fut,
        Fut: std::future::Future<Output = Event> + Send + 'static,
    {
        let future = call(Arc::clone(&self.backend));
        let tx = self.completion_tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let event = future.await;
            if tx.send(event).is_err() {
                tracing::debug!("Controller dropped before request completed");
            }
        });
    }

    // ============================================================
    // Accessors
    // ============================================================

    #[cfg(test)]
    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    pub fn transcript(&self) -> &TranscriptView {
        &self.transcript
    }

    pub fn transcript_mut(&mut self) -> &mut TranscriptView {
        &mut self.transcript
    }

    pub fn directory(&self) -> &SessionDirectory {
        &self.directory
    }

    pub fn directory_mut(&mut self) -> &mut SessionDirectory {
        &mut self.directory
    }

    pub fn input(&self) -> &InputSurface {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputSurface {
        &mut self.input
    }

    pub fn header(&self) -> &ChatHeader {
        &self.header
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }
}
