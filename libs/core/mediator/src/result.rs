//! The uniform outcome envelope returned by every handler.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use utoipa::ToSchema;

/// Outcome category of a dispatched request.
///
/// The integer codes are stable and part of the wire contract for clients
/// that log them.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
    ToSchema,
)]
pub enum CrudStatus {
    Failed,
    Succeeded,
    DatabaseException,
    InputNotValid,
    NotAccess,
    NotFound,
    IdentityError,
    DeletedError,
    UserNotFound,
    ServerError,
    ExpiryOtpCode,
    NotAuthorize,
}

impl CrudStatus {
    pub fn code(&self) -> i32 {
        match self {
            Self::Failed => 0,
            Self::Succeeded => 1,
            Self::DatabaseException => -1,
            Self::InputNotValid => -2,
            Self::NotAccess => -3,
            Self::NotFound => -4,
            Self::IdentityError => -5,
            Self::DeletedError => -6,
            Self::UserNotFound => -7,
            Self::ServerError => -8,
            Self::ExpiryOtpCode => -9,
            Self::NotAuthorize => -10,
        }
    }
}

/// A single field-level message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CrudMessage {
    /// Field the message refers to; empty for request-level messages
    pub property_name: String,
    pub message: String,
}

impl CrudMessage {
    pub fn new(property_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            message: message.into(),
        }
    }

    /// A message that is not tied to a particular field.
    pub fn general(message: impl Into<String>) -> Self {
        Self::new(String::new(), message)
    }
}

/// Status, messages and an optional payload.
///
/// `CrudResult<()>` is the payload-less form used by most commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CrudResult<T> {
    pub status: CrudStatus,
    #[serde(default)]
    pub messages: Vec<CrudMessage>,
    pub result: Option<T>,
}

impl<T> CrudResult<T> {
    pub fn succeeded(value: T) -> Self {
        Self {
            status: CrudStatus::Succeeded,
            messages: Vec::new(),
            result: Some(value),
        }
    }

    /// A result with the given status and no payload.
    pub fn with_status(status: CrudStatus) -> Self {
        Self {
            status,
            messages: Vec::new(),
            result: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::with_status(CrudStatus::Failed).with_message(CrudMessage::general(message))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_status(CrudStatus::NotFound).with_message(CrudMessage::general(message))
    }

    pub fn invalid(messages: Vec<CrudMessage>) -> Self {
        Self {
            status: CrudStatus::InputNotValid,
            messages,
            result: None,
        }
    }

    pub fn with_message(mut self, message: CrudMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn is_succeeded(&self) -> bool {
        self.status == CrudStatus::Succeeded
    }

    pub fn is_failed(&self) -> bool {
        !self.is_succeeded()
    }

    /// All messages joined with `-`, or the status name when there are none.
    pub fn message(&self) -> String {
        if self.messages.is_empty() {
            return self.status.to_string();
        }

        self.messages
            .iter()
            .map(|m| m.message.as_str())
            .collect::<Vec<_>>()
            .join("-")
    }

    pub fn into_result(self) -> Option<T> {
        self.result
    }

    /// Converts the payload, keeping status and messages.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CrudResult<U> {
        CrudResult {
            status: self.status,
            messages: self.messages,
            result: self.result.map(f),
        }
    }
}

impl CrudResult<()> {
    pub fn ok() -> Self {
        Self::succeeded(())
    }
}

/// OpenAPI shape of a payload-less `CrudResult<()>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CrudOutcome {
    pub status: CrudStatus,
    #[serde(default)]
    pub messages: Vec<CrudMessage>,
}
