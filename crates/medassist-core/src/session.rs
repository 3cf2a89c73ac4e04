//! One chat session: the conversation store and avatar status, advanced
//! together through the lifecycle of each turn.
//!
//! A turn is split in two so a UI can run the network call elsewhere:
//! [`ChatSession::begin_turn`] records the user message and hands back what
//! to send, [`ChatSession::complete_turn`] applies the outcome.
//! [`ChatSession::submit`] does both around a [`ChatBackend`] call.

use crate::api::{ApiError, ChatBackend, ChatReply};
use crate::avatar::{AvatarMachine, AvatarStatus, TurnId};
use crate::state::ConversationStore;

pub const FALLBACK_REPLY: &str = "I apologize, but I'm having trouble processing your request right now. \
Please try again or consult with a healthcare professional for immediate assistance.";

pub const FALLBACK_DISCLAIMER: &str = "This information is provided for educational purposes only.";

/// A turn whose request has not completed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    pub turn: TurnId,
    pub message: String,
    pub conversation_id: Option<String>,
}

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The avatar is speaking; call `finish_speaking` after the speech delay.
    Replied(TurnId),
    /// The fallback reply was shown.
    Failed(ApiError),
    /// The turn was no longer awaited (reset or superseded); nothing changed.
    Stale(TurnId),
}

/// Result of pressing the voice input toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceToggle {
    /// Listening started; call `finish_voice` after
    /// [`VOICE_DURATION`](crate::avatar::VOICE_DURATION).
    Started(TurnId),
    /// Listening was stopped early.
    Stopped,
    /// A chat request is in flight.
    Unavailable,
}

#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    store: ConversationStore,
    avatar: AvatarMachine,
    pending: Option<TurnId>,
    voice: Option<TurnId>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn avatar(&self) -> AvatarStatus {
        self.avatar.status()
    }

    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    /// Starts a turn for `text`. Returns `None` for blank input or while a
    /// request is outstanding.
    pub fn begin_turn(&mut self, text: &str) -> Option<PendingTurn> {
        let message = text.trim();
        if message.is_empty() || self.store.is_loading() {
            return None;
        }

        let turn = self.avatar.begin_turn();
        self.pending = Some(turn);
        self.voice = None;
        self.store.append_user_message(message);
        self.store.set_loading(true);

        Some(PendingTurn {
            turn,
            message: message.to_string(),
            conversation_id: self.store.conversation_id().map(str::to_string),
        })
    }

    pub fn complete_turn(
        &mut self,
        turn: TurnId,
        result: Result<ChatReply, ApiError>,
    ) -> TurnOutcome {
        if self.pending != Some(turn) {
            tracing::debug!(turn = turn.get(), "ignoring reply for a turn no longer awaited");
            return TurnOutcome::Stale(turn);
        }
        self.pending = None;
        self.store.set_loading(false);

        match result {
            Ok(reply) => {
                self.store.set_conversation_id(reply.conversation_id);
                self.avatar.turn_succeeded(turn);
                self.store
                    .append_assistant_message(reply.response, reply.disclaimer.as_deref());
                TurnOutcome::Replied(turn)
            }
            Err(err) => {
                tracing::error!(turn = turn.get(), error = %err, "chat turn failed");
                self.avatar.turn_failed(turn);
                self.store
                    .append_assistant_message(FALLBACK_REPLY, Some(FALLBACK_DISCLAIMER));
                TurnOutcome::Failed(err)
            }
        }
    }

    /// Ends the speaking phase of `turn`. Stale turns are ignored.
    pub fn finish_speaking(&mut self, turn: TurnId) -> bool {
        self.avatar.finish_speaking(turn)
    }

    pub fn is_voice_active(&self) -> bool {
        self.voice.is_some()
    }

    /// Simulated voice input: starts listening, or stops it early when it is
    /// already on. Disabled while a chat request is outstanding.
    pub fn toggle_voice(&mut self) -> VoiceToggle {
        if self.store.is_loading() {
            return VoiceToggle::Unavailable;
        }
        if self.voice.take().is_some() {
            self.avatar.set_status(AvatarStatus::Idle);
            return VoiceToggle::Stopped;
        }
        let turn = self.avatar.begin_voice();
        self.voice = Some(turn);
        VoiceToggle::Started(turn)
    }

    /// Ends a listening window that ran its full length. Stale windows are
    /// ignored.
    pub fn finish_voice(&mut self, turn: TurnId) -> bool {
        if self.voice != Some(turn) {
            return false;
        }
        self.voice = None;
        self.avatar.set_status(AvatarStatus::Idle);
        true
    }

    /// Runs a whole turn against `backend`.
    pub async fn submit<B>(&mut self, backend: &B, text: &str) -> Option<TurnOutcome>
    where
        B: ChatBackend + ?Sized,
    {
        let pending = self.begin_turn(text)?;
        let result = backend
            .send_message(&pending.message, pending.conversation_id.as_deref())
            .await;
        Some(self.complete_turn(pending.turn, result))
    }

    pub fn reset(&mut self) {
        self.pending = None;
        self.voice = None;
        self.store.reset();
        self.avatar.reset();
    }
}
