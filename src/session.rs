//! Signed-in session state and the password-reset step machine

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Digits in an emailed reset code
pub const CODE_LENGTH: usize = 6;
pub const MIN_PASSWORD_CHARS: usize = 6;

/// `local@host.tld`: no whitespace, a single `@`, a non-empty host label before a dot
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@.][^\s@]*\.[^\s@]+$").expect("Invalid regex pattern")
});

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("a session is already active")]
    AlreadySignedIn,

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("code slot {0} is out of range")]
    SlotOutOfRange(usize),

    #[error("code digits must be 0-9, got '{0}'")]
    NotADigit(char),

    #[error("code is incomplete: {filled} of 6 digits")]
    IncompleteCode { filled: usize },

    #[error("password must be at least 6 characters")]
    PasswordTooShort,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("action not allowed at step {0}")]
    WrongStep(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub access_token: String,
    pub created_at: DateTime<Utc>,
}

/// Holder for at most one active session
#[derive(Debug, Default)]
pub struct SessionSlot {
    current: Option<Session>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, user_id: &str, email: &str, access_token: &str) -> Result<&Session, SessionError> {
        if self.current.is_some() {
            return Err(SessionError::AlreadySignedIn);
        }
        Ok(self.current.insert(Session {
            user_id: user_id.to_string(),
            email: email.to_string(),
            access_token: access_token.to_string(),
            created_at: Utc::now(),
        }))
    }

    pub fn read(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Sign out, returning the session that was active
    pub fn clear(&mut self) -> Option<Session> {
        self.current.take()
    }
}

/// Password-reset steps: email, emailed code, new password
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResetFlow {
    #[default]
    EnterEmail,
    EnterCode {
        email: String,
        digits: [Option<char>; CODE_LENGTH],
    },
    EnterPassword {
        email: String,
        code: String,
    },
    Done {
        email: String,
    },
}

/// What the caller must send to the auth backend once the flow finishes
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordUpdate {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

impl ResetFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step_name(&self) -> &'static str {
        match self {
            ResetFlow::EnterEmail => "email",
            ResetFlow::EnterCode { .. } => "code",
            ResetFlow::EnterPassword { .. } => "password",
            ResetFlow::Done { .. } => "done",
        }
    }

    pub fn submit_email(&mut self, email: &str) -> Result<(), SessionError> {
        if !matches!(self, ResetFlow::EnterEmail) {
            return Err(SessionError::WrongStep(self.step_name()));
        }
        let email = email.trim();
        if !is_plausible_email(email) {
            return Err(SessionError::InvalidEmail(email.to_string()));
        }
        *self = ResetFlow::EnterCode {
            email: email.to_string(),
            digits: [None; CODE_LENGTH],
        };
        Ok(())
    }

    pub fn set_digit(&mut self, index: usize, digit: char) -> Result<(), SessionError> {
        let digits = self.code_slots()?;
        if index >= CODE_LENGTH {
            return Err(SessionError::SlotOutOfRange(index));
        }
        if !digit.is_ascii_digit() {
            return Err(SessionError::NotADigit(digit));
        }
        digits[index] = Some(digit);
        Ok(())
    }

    pub fn clear_digit(&mut self, index: usize) -> Result<(), SessionError> {
        let digits = self.code_slots()?;
        match digits.get_mut(index) {
            Some(slot) => {
                *slot = None;
                Ok(())
            }
            None => Err(SessionError::SlotOutOfRange(index)),
        }
    }

    /// Next empty slot, for moving input focus
    pub fn next_empty_slot(&self) -> Option<usize> {
        match self {
            ResetFlow::EnterCode { digits, .. } => digits.iter().position(Option::is_none),
            _ => None,
        }
    }

    pub fn submit_code(&mut self) -> Result<(), SessionError> {
        let step = self.step_name();
        let ResetFlow::EnterCode { email, digits } = self else {
            return Err(SessionError::WrongStep(step));
        };
        let code: String = digits.iter().flatten().collect();
        if code.len() != CODE_LENGTH {
            return Err(SessionError::IncompleteCode { filled: code.len() });
        }
        *self = ResetFlow::EnterPassword {
            email: std::mem::take(email),
            code,
        };
        Ok(())
    }

    pub fn submit_password(&mut self, password: &str, confirmation: &str) -> Result<PasswordUpdate, SessionError> {
        let step = self.step_name();
        let ResetFlow::EnterPassword { email, code } = self else {
            return Err(SessionError::WrongStep(step));
        };
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(SessionError::PasswordTooShort);
        }
        if password != confirmation {
            return Err(SessionError::PasswordMismatch);
        }
        let update = PasswordUpdate {
            email: email.clone(),
            code: code.clone(),
            new_password: password.to_string(),
        };
        *self = ResetFlow::Done {
            email: update.email.clone(),
        };
        Ok(update)
    }

    fn code_slots(&mut self) -> Result<&mut [Option<char>; CODE_LENGTH], SessionError> {
        let step = self.step_name();
        match self {
            ResetFlow::EnterCode { digits, .. } => Ok(digits),
            _ => Err(SessionError::WrongStep(step)),
        }
    }
}

fn is_plausible_email(email: &str) -> bool {
    EMAIL.is_match(email)
}
