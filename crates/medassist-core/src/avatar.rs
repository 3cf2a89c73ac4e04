//! Presentation status of the assistant avatar
//!
//! `Idle -> Listening -> Speaking -> Idle`, with failures dropping straight
//! back to `Idle`. Each turn gets a [`TurnId`]; the timed return from
//! `Speaking` only applies to the turn that is still speaking, so a reversion
//! scheduled for an older turn cannot cut a newer one short.

use std::time::Duration;

/// How long the avatar stays in `Speaking` after a reply arrives.
pub const SPEECH_DURATION: Duration = Duration::from_secs(2);

/// How long simulated voice input listens before giving up.
pub const VOICE_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AvatarStatus {
    #[default]
    Idle,
    Listening,
    Speaking,
}

impl AvatarStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvatarStatus::Idle => "idle",
            AvatarStatus::Listening => "listening",
            AvatarStatus::Speaking => "speaking",
        }
    }

    /// Unknown names coerce to `Idle`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "idle" => AvatarStatus::Idle,
            "listening" => AvatarStatus::Listening,
            "speaking" => AvatarStatus::Speaking,
            other => {
                tracing::warn!(status = other, "invalid avatar status, defaulting to idle");
                AvatarStatus::Idle
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AvatarStatus::Idle => "Ready",
            AvatarStatus::Listening => "Listening",
            AvatarStatus::Speaking => "Speaking",
        }
    }
}

/// Identity of one user turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TurnId(u64);

impl TurnId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct AvatarMachine {
    status: AvatarStatus,
    last_turn: u64,
    speaking_turn: Option<TurnId>,
}

impl AvatarMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> AvatarStatus {
        self.status
    }

    /// The user submitted input. Supersedes any pending speech reversion.
    pub fn begin_turn(&mut self) -> TurnId {
        self.last_turn += 1;
        let turn = TurnId(self.last_turn);
        self.speaking_turn = None;
        self.transition(AvatarStatus::Listening);
        turn
    }

    /// Listening without a chat request behind it. Shares the turn sequence
    /// so a speech reversion from an earlier reply cannot end it.
    pub fn begin_voice(&mut self) -> TurnId {
        self.last_turn += 1;
        self.set_status(AvatarStatus::Listening);
        TurnId(self.last_turn)
    }

    /// A reply for `turn` arrived.
    pub fn turn_succeeded(&mut self, turn: TurnId) {
        self.speaking_turn = Some(turn);
        self.transition(AvatarStatus::Speaking);
    }

    /// The request for `turn` failed; no speaking phase.
    pub fn turn_failed(&mut self, turn: TurnId) {
        if self.speaking_turn == Some(turn) {
            self.speaking_turn = None;
        }
        self.transition(AvatarStatus::Idle);
    }

    /// Speech for `turn` is over. Returns false when the reversion is stale.
    pub fn finish_speaking(&mut self, turn: TurnId) -> bool {
        if self.speaking_turn != Some(turn) {
            tracing::debug!(turn = turn.get(), "ignoring stale speech reversion");
            return false;
        }
        self.speaking_turn = None;
        self.transition(AvatarStatus::Idle);
        true
    }

    /// Direct status override. Drops any pending speech reversion.
    pub fn set_status(&mut self, status: AvatarStatus) {
        self.speaking_turn = None;
        self.transition(status);
    }

    pub fn reset(&mut self) {
        self.speaking_turn = None;
        self.transition(AvatarStatus::Idle);
    }

    fn transition(&mut self, next: AvatarStatus) {
        if self.status != next {
            tracing::trace!(from = self.status.as_str(), to = next.as_str(), "avatar status");
        }
        self.status = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unknown_defaults_to_idle() {
        assert_eq!(AvatarStatus::parse("speaking"), AvatarStatus::Speaking);
        assert_eq!(AvatarStatus::parse("LISTENING"), AvatarStatus::Listening);
        assert_eq!(AvatarStatus::parse("dancing"), AvatarStatus::Idle);
        assert_eq!(AvatarStatus::parse(""), AvatarStatus::Idle);
    }

    #[test]
    fn test_success_path() {
        let mut avatar = AvatarMachine::new();
        assert_eq!(avatar.status(), AvatarStatus::Idle);

        let turn = avatar.begin_turn();
        assert_eq!(avatar.status(), AvatarStatus::Listening);

        avatar.turn_succeeded(turn);
        assert_eq!(avatar.status(), AvatarStatus::Speaking);

        assert!(avatar.finish_speaking(turn));
        assert_eq!(avatar.status(), AvatarStatus::Idle);
    }

    #[test]
    fn test_failure_never_speaks() {
        let mut avatar = AvatarMachine::new();
        let turn = avatar.begin_turn();
        avatar.turn_failed(turn);
        assert_eq!(avatar.status(), AvatarStatus::Idle);
        assert!(!avatar.finish_speaking(turn));
        assert_eq!(avatar.status(), AvatarStatus::Idle);
    }

    #[test]
    fn test_stale_reversion_does_not_interrupt_new_turn() {
        let mut avatar = AvatarMachine::new();
        let first = avatar.begin_turn();
        avatar.turn_succeeded(first);

        let second = avatar.begin_turn();
        assert!(!avatar.finish_speaking(first));
        assert_eq!(avatar.status(), AvatarStatus::Listening);

        avatar.turn_succeeded(second);
        assert!(!avatar.finish_speaking(first));
        assert_eq!(avatar.status(), AvatarStatus::Speaking);
        assert!(avatar.finish_speaking(second));
        assert_eq!(avatar.status(), AvatarStatus::Idle);
    }

    #[test]
    fn test_voice_listening_outlives_old_speech() {
        let mut avatar = AvatarMachine::new();
        let turn = avatar.begin_turn();
        avatar.turn_succeeded(turn);

        let voice = avatar.begin_voice();
        assert!(voice > turn);
        assert_eq!(avatar.status(), AvatarStatus::Listening);
        assert!(!avatar.finish_speaking(turn));
        assert_eq!(avatar.status(), AvatarStatus::Listening);

        avatar.set_status(AvatarStatus::Idle);
        assert_eq!(avatar.status(), AvatarStatus::Idle);
    }

    #[test]
    fn test_turn_ids_increase() {
        let mut avatar = AvatarMachine::new();
        let a = avatar.begin_turn();
        let b = avatar.begin_turn();
        assert!(b > a);
    }
}
