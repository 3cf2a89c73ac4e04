//! Appointment request form: doctor categories, field collection and
//! validation before anything is sent to the backend.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoctorCategory {
    pub name: &'static str,
    pub description: &'static str,
}

pub const DOCTOR_CATEGORIES: &[DoctorCategory] = &[
    DoctorCategory {
        name: "General Physician",
        description: "General health checkups, common illnesses, and preventive care",
    },
    DoctorCategory {
        name: "Cardiologist",
        description: "Heart and cardiovascular system health",
    },
    DoctorCategory {
        name: "Dermatologist",
        description: "Skin, hair, and nail conditions",
    },
    DoctorCategory {
        name: "Pediatrician",
        description: "Child health and development",
    },
    DoctorCategory {
        name: "Orthopedist",
        description: "Bones, joints, and musculoskeletal system",
    },
    DoctorCategory {
        name: "Neurologist",
        description: "Brain, nervous system, and neurological conditions",
    },
];

const MAX_NAME: usize = 200;
const MAX_PHONE: usize = 20;
const MAX_REASON: usize = 1000;

/// Validated payload for `POST /appointment/request`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppointmentRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub category: String,
    pub preferred_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Please select a doctor category first")]
    MissingCategory,
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Date must be in YYYY-MM-DD format")]
    InvalidDate,
    #[error("Preferred date cannot be in the past.")]
    DateInPast,
    #[error("Time must be in HH:MM format")]
    InvalidTime,
}

/// Editable fields of the form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Email,
    Phone,
    Date,
    Time,
    Reason,
}

impl FormField {
    pub fn all() -> [FormField; 6] {
        [
            FormField::Name,
            FormField::Email,
            FormField::Phone,
            FormField::Date,
            FormField::Time,
            FormField::Reason,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Full Name *",
            FormField::Email => "Email Address *",
            FormField::Phone => "Phone Number *",
            FormField::Date => "Preferred Date * (YYYY-MM-DD)",
            FormField::Time => "Preferred Time (HH:MM)",
            FormField::Reason => "Reason for Visit",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentForm {
    pub category: Option<usize>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date: String,
    pub time: String,
    pub reason: String,
}

impl AppointmentForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_category(&self) -> Option<&'static DoctorCategory> {
        self.category.and_then(|i| DOCTOR_CATEGORIES.get(i))
    }

    pub fn select_category(&mut self, index: usize) {
        if index < DOCTOR_CATEGORIES.len() {
            self.category = Some(index);
        }
    }

    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Email => &self.email,
            FormField::Phone => &self.phone,
            FormField::Date => &self.date,
            FormField::Time => &self.time,
            FormField::Reason => &self.reason,
        }
    }

    pub fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::Email => &mut self.email,
            FormField::Phone => &mut self.phone,
            FormField::Date => &mut self.date,
            FormField::Time => &mut self.time,
            FormField::Reason => &mut self.reason,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Checks every field and builds the request. `today` bounds the date.
    pub fn validate(&self, today: NaiveDate) -> Result<AppointmentRequest, FormError> {
        let category = self.selected_category().ok_or(FormError::MissingCategory)?;

        let name = required(&self.name, "Full name")?;
        check_len(name, "Full name", MAX_NAME)?;

        let email = required(&self.email, "Email address")?;
        if !is_plausible_email(email) {
            return Err(FormError::InvalidEmail);
        }

        let phone = required(&self.phone, "Phone number")?;
        check_len(phone, "Phone number", MAX_PHONE)?;

        let date = required(&self.date, "Preferred date")?;
        let preferred_date =
            NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| FormError::InvalidDate)?;
        if preferred_date < today {
            return Err(FormError::DateInPast);
        }

        let preferred_time = match self.time.trim() {
            "" => None,
            time => {
                NaiveTime::parse_from_str(time, "%H:%M").map_err(|_| FormError::InvalidTime)?;
                Some(time.to_string())
            }
        };

        let reason = match self.reason.trim() {
            "" => None,
            reason => {
                check_len(reason, "Reason", MAX_REASON)?;
                Some(reason.to_string())
            }
        };

        Ok(AppointmentRequest {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            category: category.name.to_string(),
            preferred_date,
            preferred_time,
            reason,
        })
    }
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, FormError> {
    let value = value.trim();
    if value.is_empty() {
        Err(FormError::Required(field))
    } else {
        Ok(value)
    }
}

fn check_len(value: &str, field: &'static str, max: usize) -> Result<(), FormError> {
    if value.chars().count() > max {
        Err(FormError::TooLong { field, max })
    } else {
        Ok(())
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 10).unwrap()
    }

    fn filled() -> AppointmentForm {
        AppointmentForm {
            category: Some(2),
            name: "Jane Doe".to_string(),
            email: "jane.doe@example.com".to_string(),
            phone: "+1-555-123-4567".to_string(),
            date: "2026-01-12".to_string(),
            time: "10:00".to_string(),
            reason: "Routine skin checkup".to_string(),
        }
    }

    #[test]
    fn test_valid_form() {
        let request = filled().validate(today()).unwrap();
        assert_eq!(request.category, "Dermatologist");
        assert_eq!(request.preferred_date, NaiveDate::from_ymd_opt(2026, 1, 12).unwrap());
        assert_eq!(request.preferred_time.as_deref(), Some("10:00"));
        assert_eq!(request.reason.as_deref(), Some("Routine skin checkup"));
    }

    #[test]
    fn test_category_required() {
        let mut form = filled();
        form.category = None;
        assert_eq!(form.validate(today()), Err(FormError::MissingCategory));
    }

    #[test]
    fn test_required_fields() {
        let mut form = filled();
        form.name = "   ".to_string();
        assert_eq!(form.validate(today()), Err(FormError::Required("Full name")));
    }

    #[test]
    fn test_bad_email() {
        let mut form = filled();
        for bad in ["jane", "jane@", "@example.com", "jane@example", "ja ne@example.com"] {
            form.email = bad.to_string();
            assert_eq!(form.validate(today()), Err(FormError::InvalidEmail), "{}", bad);
        }
    }

    #[test]
    fn test_date_rules() {
        let mut form = filled();
        form.date = "12/01/2026".to_string();
        assert_eq!(form.validate(today()), Err(FormError::InvalidDate));

        form.date = "2026-01-09".to_string();
        assert_eq!(form.validate(today()), Err(FormError::DateInPast));

        form.date = "2026-01-10".to_string();
        assert!(form.validate(today()).is_ok());
    }

    #[test]
    fn test_optional_fields() {
        let mut form = filled();
        form.time = String::new();
        form.reason = String::new();
        let request = form.validate(today()).unwrap();
        assert!(request.preferred_time.is_none());
        assert!(request.reason.is_none());

        form.time = "25:00".to_string();
        assert_eq!(form.validate(today()), Err(FormError::InvalidTime));
    }

    #[test]
    fn test_length_limits() {
        let mut form = filled();
        form.phone = "1".repeat(21);
        assert_eq!(
            form.validate(today()),
            Err(FormError::TooLong { field: "Phone number", max: 20 })
        );
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut form = filled();
        form.reset();
        assert_eq!(form, AppointmentForm::new());
        assert!(form.selected_category().is_none());
    }
}
