//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use crate::domain::{
    DomainId, Error, FqdnValidationError, RecordId, RecordValidationError, UserId,
    UserValidationError,
};

/// Message returned when a path identifier is not an integer.
pub const INVALID_ID_MESSAGE: &str = "Invalid query ID";

/// Validation error codes surfaced in `details.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidId,
    InvalidFqdn,
    InvalidRecord,
    InvalidUser,
}

impl ErrorCode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidId => "invalid_id",
            Self::InvalidFqdn => "invalid_fqdn",
            Self::InvalidRecord => "invalid_record",
            Self::InvalidUser => "invalid_user",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    const fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(
        field,
        ErrorCode::MissingField,
        format!("missing required field: {name}"),
    )
}

/// Unwrap an optional payload field or report it as missing.
pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

fn parse_raw_id(raw: &str) -> Result<i64, Error> {
    raw.trim().parse::<i64>().map_err(|_| {
        Error::invalid_request(INVALID_ID_MESSAGE).with_details(json!({
            "field": "id",
            "value": raw,
            "code": ErrorCode::InvalidId.as_str(),
        }))
    })
}

pub(crate) fn parse_domain_id(raw: &str) -> Result<DomainId, Error> {
    parse_raw_id(raw).map(DomainId::new)
}

pub(crate) fn parse_record_id(raw: &str) -> Result<RecordId, Error> {
    parse_raw_id(raw).map(RecordId::new)
}

pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    parse_raw_id(raw).map(UserId::new)
}

pub(crate) fn map_fqdn_error(field: FieldName, err: &FqdnValidationError) -> Error {
    field_error(field, ErrorCode::InvalidFqdn, err.to_string())
}

pub(crate) fn map_record_error(field: FieldName, err: &RecordValidationError) -> Error {
    field_error(field, ErrorCode::InvalidRecord, err.to_string())
}

pub(crate) fn map_user_error(err: &UserValidationError) -> Error {
    let field = match err {
        UserValidationError::EmptyEmail | UserValidationError::InvalidEmail => "email",
        UserValidationError::EmptyPassword => "password",
        _ => "username",
    };
    field_error(FieldName::new(field), ErrorCode::InvalidUser, err.to_string())
}
