pub mod api;
pub mod appointment;
pub mod avatar;
pub mod config;
pub mod medicine;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use api::{ApiClient, ApiError, ChatBackend, ChatReply};
pub use appointment::{AppointmentForm, AppointmentRequest, FormError, FormField, DOCTOR_CATEGORIES};
pub use avatar::{AvatarStatus, TurnId, SPEECH_DURATION, VOICE_DURATION};
pub use config::Config;
pub use medicine::{Medicine, MedicineCatalog, MedicineSearch, SearchView};
pub use session::{ChatSession, PendingTurn, TurnOutcome, VoiceToggle};
pub use state::{ConversationStore, Message, MessageKind};
