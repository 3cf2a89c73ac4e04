use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use medassist_core::api::{AppointmentResponse, MedicineSearchResponse};
use medassist_core::appointment::DOCTOR_CATEGORIES;
use medassist_core::{
    ApiClient, ApiError, AppointmentForm, ChatBackend, ChatReply, ChatSession, FormField,
    MedicineCatalog, MedicineSearch, TurnId, TurnOutcome, VoiceToggle, SPEECH_DURATION,
    VOICE_DURATION,
};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Chat,
    Medicine,
    Appointment,
}

impl Screen {
    pub fn all() -> [Screen; 3] {
        [Screen::Chat, Screen::Medicine, Screen::Appointment]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Screen::Chat => "Medical Assistant",
            Screen::Medicine => "Medicine Information",
            Screen::Appointment => "Book an Appointment",
        }
    }

    pub fn next(&self) -> Screen {
        match self {
            Screen::Chat => Screen::Medicine,
            Screen::Medicine => Screen::Appointment,
            Screen::Appointment => Screen::Chat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Result of the last appointment submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppointmentStatus {
    Submitted(AppointmentResponse),
    Invalid(String),
    Failed(String),
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,

    // Chat state
    pub session: ChatSession,
    pub chat_input: String,
    pub chat_cursor: usize, // cursor position in chat_input
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub follow_chat: bool,
    pub speech_timer: Option<JoinHandle<()>>,
    pub voice_timer: Option<JoinHandle<()>>,

    // Medicine state
    pub medicine: MedicineSearch,
    pub medicine_input: String,
    pub medicine_state: ListState,
    pub remote_medicine: bool,
    pub medicine_loading: bool,
    pub medicine_notice: Option<String>,

    // Appointment state
    pub form: AppointmentForm,
    pub category_state: ListState,
    pub form_field: usize,
    pub appointment_status: Option<AppointmentStatus>,
    pub appointment_loading: bool,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Chat area for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,

    // Backend
    pub api: ApiClient,
    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(api: ApiClient, events: UnboundedSender<AppEvent>) -> Self {
        let mut category_state = ListState::default();
        category_state.select(Some(0));
        let mut medicine_state = ListState::default();
        medicine_state.select(Some(0));

        Self {
            should_quit: false,
            screen: Screen::Chat,
            input_mode: InputMode::Editing,

            session: ChatSession::new(),
            chat_input: String::new(),
            chat_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            follow_chat: true,
            speech_timer: None,
            voice_timer: None,

            medicine: MedicineSearch::new(MedicineCatalog::sample()),
            medicine_input: String::new(),
            medicine_state,
            remote_medicine: false,
            medicine_loading: false,
            medicine_notice: None,

            form: AppointmentForm::new(),
            category_state,
            form_field: 0,
            appointment_status: None,
            appointment_loading: false,

            animation_frame: 0,
            chat_area: None,

            api,
            events,
        }
    }

    pub fn tick_animation(&mut self) {
        if self.session.is_loading() || self.medicine_loading || self.appointment_loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn switch_screen(&mut self, screen: Screen) {
        self.screen = screen;
        self.input_mode = match screen {
            Screen::Chat | Screen::Medicine => InputMode::Editing,
            Screen::Appointment => InputMode::Normal,
        };
    }

    // Chat

    /// Sends the current input as a new turn. The reply comes back as an
    /// `AppEvent::ChatReply`.
    pub fn submit_chat(&mut self) {
        let Some(pending) = self.session.begin_turn(&self.chat_input) else {
            return;
        };

        // A new turn supersedes whatever speech or voice input was running
        self.cancel_timers();

        self.chat_input.clear();
        self.chat_cursor = 0;
        self.follow_chat = true;

        let api = self.api.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = api
                .send_message(&pending.message, pending.conversation_id.as_deref())
                .await;
            let _ = tx.send(AppEvent::ChatReply {
                turn: pending.turn,
                result,
            });
        });
    }

    pub fn on_chat_reply(&mut self, turn: TurnId, result: Result<ChatReply, ApiError>) {
        self.follow_chat = true;
        if let TurnOutcome::Replied(turn) = self.session.complete_turn(turn, result) {
            let tx = self.events.clone();
            self.speech_timer = Some(tokio::spawn(async move {
                tokio::time::sleep(SPEECH_DURATION).await;
                let _ = tx.send(AppEvent::SpeechFinished(turn));
            }));
        }
    }

    pub fn on_speech_finished(&mut self, turn: TurnId) {
        if self.session.finish_speaking(turn) {
            self.speech_timer = None;
        }
    }

    pub fn toggle_voice(&mut self) {
        match self.session.toggle_voice() {
            VoiceToggle::Started(turn) => {
                self.cancel_timers();
                let tx = self.events.clone();
                self.voice_timer = Some(tokio::spawn(async move {
                    tokio::time::sleep(VOICE_DURATION).await;
                    let _ = tx.send(AppEvent::VoiceFinished(turn));
                }));
            }
            VoiceToggle::Stopped => {
                if let Some(timer) = self.voice_timer.take() {
                    timer.abort();
                }
            }
            VoiceToggle::Unavailable => {}
        }
    }

    pub fn on_voice_finished(&mut self, turn: TurnId) {
        if self.session.finish_voice(turn) {
            self.voice_timer = None;
        }
    }

    fn cancel_timers(&mut self) {
        for timer in [self.speech_timer.take(), self.voice_timer.take()].into_iter().flatten() {
            timer.abort();
        }
    }

    pub fn reset_chat(&mut self) {
        self.cancel_timers();
        self.session.reset();
        self.chat_scroll = 0;
        self.follow_chat = true;
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.follow_chat = false;
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }

    // Medicine

    pub fn submit_medicine_search(&mut self) {
        let query = self.medicine_input.trim().to_string();
        if query.is_empty() || self.medicine_loading {
            return;
        }
        self.medicine_notice = None;

        if !self.remote_medicine {
            self.medicine.submit(&query);
            return;
        }

        self.medicine_loading = true;
        let api = self.api.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = api.search_medicine(&query).await;
            let _ = tx.send(AppEvent::MedicineResults { query, result });
        });
    }

    pub fn on_medicine_results(
        &mut self,
        query: String,
        result: Result<MedicineSearchResponse, ApiError>,
    ) {
        self.medicine_loading = false;
        match result {
            Ok(response) => {
                self.medicine_notice = response.disclaimer;
                self.medicine.set_results(&query, response.results);
            }
            Err(err) => {
                // Fall back to the built-in list
                tracing::warn!(error = %err, "remote medicine search failed");
                self.medicine_notice = Some(format!("Search service unavailable ({}), showing offline results", err));
                self.medicine.submit(&query);
            }
        }
    }

    pub fn clear_medicine_search(&mut self) {
        self.medicine_input.clear();
        self.medicine.clear();
        self.medicine_notice = None;
    }

    pub fn medicine_nav_down(&mut self) {
        let len = self.medicine.catalog().all().len();
        if len > 0 {
            let i = self.medicine_state.selected().unwrap_or(0);
            self.medicine_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn medicine_nav_up(&mut self) {
        let i = self.medicine_state.selected().unwrap_or(0);
        self.medicine_state.select(Some(i.saturating_sub(1)));
    }

    /// "View details" on the highlighted popular medicine.
    pub fn show_selected_medicine(&mut self) {
        let selected = self
            .medicine_state
            .selected()
            .and_then(|i| self.medicine.catalog().all().get(i).cloned());
        if let Some(medicine) = selected {
            self.medicine_input = medicine.name.clone();
            self.medicine.show(&medicine);
        }
    }

    // Appointment

    pub fn current_field(&self) -> FormField {
        FormField::all()[self.form_field]
    }

    pub fn next_field(&mut self) {
        self.form_field = (self.form_field + 1) % FormField::all().len();
    }

    pub fn prev_field(&mut self) {
        let len = FormField::all().len();
        self.form_field = (self.form_field + len - 1) % len;
    }

    pub fn category_nav_down(&mut self) {
        let i = self.category_state.selected().unwrap_or(0);
        self.category_state.select(Some((i + 1).min(DOCTOR_CATEGORIES.len() - 1)));
    }

    pub fn category_nav_up(&mut self) {
        let i = self.category_state.selected().unwrap_or(0);
        self.category_state.select(Some(i.saturating_sub(1)));
    }

    pub fn select_category(&mut self) {
        if let Some(i) = self.category_state.selected() {
            self.form.select_category(i);
            self.appointment_status = None;
        }
    }

    pub fn submit_appointment(&mut self) {
        if self.appointment_loading {
            return;
        }
        let today = chrono::Local::now().date_naive();
        let request = match self.form.validate(today) {
            Ok(request) => request,
            Err(err) => {
                self.appointment_status = Some(AppointmentStatus::Invalid(err.to_string()));
                return;
            }
        };

        self.appointment_loading = true;
        self.appointment_status = None;
        let api = self.api.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = api.request_appointment(&request).await;
            let _ = tx.send(AppEvent::AppointmentSubmitted(result));
        });
    }

    pub fn on_appointment_submitted(&mut self, result: Result<AppointmentResponse, ApiError>) {
        self.appointment_loading = false;
        self.appointment_status = Some(match result {
            Ok(response) => {
                self.input_mode = InputMode::Normal;
                AppointmentStatus::Submitted(response)
            }
            Err(err) => AppointmentStatus::Failed(err.user_message()),
        });
    }

    pub fn reset_appointment(&mut self) {
        self.form.reset();
        self.form_field = 0;
        self.appointment_status = None;
        self.category_state.select(Some(0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medassist_core::api::DEFAULT_TIMEOUT;
    use medassist_core::session::FALLBACK_REPLY;
    use medassist_core::{AvatarStatus, SearchView};
    use tokio::sync::mpsc;

    fn unreachable_app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = ApiClient::new(&format!("http://{}", addr), DEFAULT_TIMEOUT).unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(api, tx), rx)
    }

    #[tokio::test]
    async fn test_failed_turn_round_trip_through_events() {
        let (mut app, mut rx) = unreachable_app();
        app.chat_input = "I have a headache".to_string();
        app.chat_cursor = app.chat_input.chars().count();

        app.submit_chat();
        assert!(app.chat_input.is_empty());
        assert_eq!(app.session.avatar(), AvatarStatus::Listening);
        assert!(app.session.is_loading());

        match rx.recv().await.unwrap() {
            AppEvent::ChatReply { turn, result } => {
                assert!(matches!(result, Err(ApiError::Transport(_))));
                app.on_chat_reply(turn, result);
            }
            other => panic!("unexpected event: {:?}", other),
        }

        let messages = app.session.store().messages();
        assert_eq!(messages.len(), 3);
        assert!(messages[2].content.starts_with(FALLBACK_REPLY));
        assert_eq!(app.session.avatar(), AvatarStatus::Idle);
        assert!(app.speech_timer.is_none());
    }

    #[tokio::test]
    async fn test_reply_schedules_speech_reversion() {
        let (mut app, mut rx) = unreachable_app();
        let pending = app.session.begin_turn("hello").unwrap();

        app.on_chat_reply(
            pending.turn,
            Ok(ChatReply {
                response: "Hi there".to_string(),
                disclaimer: None,
                conversation_id: Some("c1".to_string()),
            }),
        );
        assert_eq!(app.session.avatar(), AvatarStatus::Speaking);
        assert!(app.speech_timer.is_some());

        match rx.recv().await.unwrap() {
            AppEvent::SpeechFinished(turn) => app.on_speech_finished(turn),
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(app.session.avatar(), AvatarStatus::Idle);
    }

    #[tokio::test]
    async fn test_local_medicine_search() {
        let (mut app, _rx) = unreachable_app();
        app.medicine_input = "xyz".to_string();
        app.submit_medicine_search();
        assert!(matches!(app.medicine.view(), SearchView::NoResults { .. }));

        app.clear_medicine_search();
        app.medicine_state.select(Some(0));
        app.show_selected_medicine();
        assert_eq!(app.medicine_input, "Paracetamol");
    }

    #[tokio::test]
    async fn test_invalid_appointment_is_not_sent() {
        let (mut app, _rx) = unreachable_app();
        app.submit_appointment();
        assert!(!app.appointment_loading);
        assert_eq!(
            app.appointment_status,
            Some(AppointmentStatus::Invalid("Please select a doctor category first".to_string()))
        );
    }

    #[tokio::test]
    async fn test_reply_after_new_conversation_is_ignored() {
        let (mut app, _rx) = unreachable_app();
        let old = app.session.begin_turn("old question").unwrap();
        app.reset_chat();

        app.on_chat_reply(
            old.turn,
            Ok(ChatReply {
                response: "answer to old".to_string(),
                disclaimer: None,
                conversation_id: Some("old-conv".to_string()),
            }),
        );

        assert_eq!(app.session.store().len(), 1);
        assert!(app.session.store().conversation_id().is_none());
        assert_eq!(app.session.avatar(), AvatarStatus::Idle);
        assert!(app.speech_timer.is_none());
    }

    #[tokio::test]
    async fn test_voice_toggle_times_out() {
        let (mut app, mut rx) = unreachable_app();
        app.toggle_voice();
        assert_eq!(app.session.avatar(), AvatarStatus::Listening);
        assert!(app.voice_timer.is_some());

        match rx.recv().await.unwrap() {
            AppEvent::VoiceFinished(turn) => app.on_voice_finished(turn),
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(app.session.avatar(), AvatarStatus::Idle);
        assert!(app.voice_timer.is_none());
    }

    #[tokio::test]
    async fn test_voice_toggle_stops_early() {
        let (mut app, _rx) = unreachable_app();
        app.toggle_voice();
        app.toggle_voice();
        assert_eq!(app.session.avatar(), AvatarStatus::Idle);
        assert!(app.voice_timer.is_none());
        assert!(!app.session.is_voice_active());
    }
}
