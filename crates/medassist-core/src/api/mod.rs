pub mod appointment;
pub mod chat;
pub mod client;
pub mod error;
pub mod medicine;

pub use appointment::AppointmentResponse;
pub use chat::{ChatBackend, ChatReply, ChatRequest};
pub use client::{ApiClient, HealthStatus, DEFAULT_TIMEOUT};
pub use error::ApiError;
pub use medicine::MedicineSearchResponse;
