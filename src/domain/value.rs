use serde::{Deserialize, Serialize};

use crate::domain::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// SMSLink gateway `connection_id`.
///
/// Invariant: non-empty after trimming.
pub struct ConnectionId(String);

impl ConnectionId {
    /// Form field name used by the gateway (`connection_id`).
    pub const FIELD: &'static str = "connection_id";

    /// Create a validated [`ConnectionId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated connection id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
/// SMSLink gateway password.
///
/// Invariant: must not be empty (whitespace is preserved and allowed).
pub struct Password(String);

impl Password {
    /// Form field name used by the gateway (`password`).
    pub const FIELD: &'static str = "password";

    /// Create a validated [`Password`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the password as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Caller-assigned message id, round-tripped by the gateway in its reply.
///
/// Invariant: non-empty, ASCII digits only.
pub struct LocalMessageId(String);

impl LocalMessageId {
    /// Field name used in validation errors.
    pub const FIELD: &'static str = "localMessageId";

    /// Validate the string form of `value`.
    ///
    /// Integers are accepted directly: `LocalMessageId::new(42)`.
    pub fn new(value: impl ToString) -> Result<Self, ValidationError> {
        let value = value.to_string();
        if !is_digits(&value) {
            return Err(ValidationError::NotNumeric {
                field: Self::FIELD,
                input: value,
            });
        }
        Ok(Self(value))
    }

    /// Borrow the id as sent on the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Destination phone number, normalized to digits only.
///
/// A leading `+` becomes `00` and every other non-digit character is dropped, so
/// `+40 712-345-678` and `0040712345678` normalize to the same value.
pub struct ReceiverNumber(String);

impl ReceiverNumber {
    /// Normalize and validate a destination number.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let normalized = normalize_number(&value);
        if !is_digits(&normalized) {
            return Err(ValidationError::InvalidReceiverNumber { input: value });
        }
        Ok(Self(normalized))
    }

    /// Normalized digits as sent to the gateway.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Replace a leading `+` with `00`, then strip all characters outside `0-9`.
pub fn normalize_number(raw: &str) -> String {
    let raw = raw.trim_start();
    let (prefix, rest) = match raw.strip_prefix('+') {
        Some(rest) => ("00", rest),
        None => ("", raw),
    };
    prefix
        .chars()
        .chain(rest.chars().filter(char::is_ascii_digit))
        .collect()
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Sender identity: a numeric shortcode, a pre-approved alphanumeric sender, or
/// the test sender `SMSLink.ro`.
///
/// The value is passed through untouched; the gateway decides whether it is
/// allowed for a destination.
pub struct SenderId(String);

impl SenderId {
    /// Wrap a sender string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the sender string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SenderId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SenderId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Message body, sanitized for the `;`/CRLF framed package format.
pub struct MessageText(String);

impl MessageText {
    /// Sanitize a raw message body. See [`sanitize_text`].
    pub fn new(value: impl AsRef<str>) -> Self {
        Self(sanitize_text(value.as_ref()))
    }

    /// Borrow the sanitized text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Trim, fold CRLF to LF, escape the framing characters (`\n` as `%0A`, `;` as
/// `%3B`), then drop tabs and stray carriage returns.
pub fn sanitize_text(raw: &str) -> String {
    raw.trim()
        .replace("\r\n", "\n")
        .replace('\n', "%0A")
        .replace(';', "%3B")
        .replace(['\t', '\r'], "")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
/// Unix timestamp in seconds for scheduled delivery.
///
/// `0` means "send immediately". Future-ness is not checked.
pub struct UnixTimestamp(u64);

impl UnixTimestamp {
    /// Immediate delivery.
    pub const IMMEDIATE: Self = Self(0);

    /// Create a timestamp value (no range validation is performed).
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the underlying timestamp in seconds.
    pub fn value(self) -> u64 {
        self.0
    }

    pub fn is_immediate(self) -> bool {
        self.0 == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Per-message status code assigned by the gateway.
///
/// The raw value is preserved as-is even when it is unknown to this crate.
pub struct MessageStatusCode(String);

impl MessageStatusCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Raw code as returned by the gateway.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Map this code to a known status, if one exists.
    pub fn known(&self) -> Option<KnownMessageStatus> {
        KnownMessageStatus::from_code(self.0.trim())
    }

    /// Returns `true` only for code `3` (accepted for delivery).
    pub fn is_success(&self) -> bool {
        matches!(self.known(), Some(kind) if kind.is_success())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
/// Known per-message outcomes of a bulk package.
pub enum KnownMessageStatus {
    /// Sender is not allowed for this destination.
    SenderFailed,
    /// Destination number is invalid.
    IncorrectNumber,
    /// Accepted for delivery.
    Accepted,
    /// Gateway internal error, or the number is on the account blacklist.
    InternalErrorOrBlacklisted,
    /// Not enough account credit.
    InsufficientCredit,
}

impl KnownMessageStatus {
    /// Convert a raw gateway code into a known variant.
    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "1" => Self::SenderFailed,
            "2" => Self::IncorrectNumber,
            "3" => Self::Accepted,
            "4" => Self::InternalErrorOrBlacklisted,
            "5" => Self::InsufficientCredit,
            _ => return None,
        })
    }

    pub fn code(self) -> u8 {
        match self {
            Self::SenderFailed => 1,
            Self::IncorrectNumber => 2,
            Self::Accepted => 3,
            Self::InternalErrorOrBlacklisted => 4,
            Self::InsufficientCredit => 5,
        }
    }

    pub fn is_success(self) -> bool {
        self == Self::Accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_trim_or_validate() {
        let id = ConnectionId::new("  conn ").unwrap();
        assert_eq!(id.as_str(), "conn");
        assert!(ConnectionId::new("  ").is_err());

        let password = Password::new(" secret ").unwrap();
        assert_eq!(password.as_str(), " secret ");
        assert!(Password::new("").is_err());
        assert_eq!(format!("{password:?}"), "Password(***)");
    }

    #[test]
    fn local_message_id_accepts_digits_only() {
        assert_eq!(LocalMessageId::new(42).unwrap().as_str(), "42");
        assert_eq!(LocalMessageId::new("007").unwrap().as_str(), "007");
        assert!(LocalMessageId::new(-1).is_err());
        assert!(LocalMessageId::new("").is_err());
        assert!(LocalMessageId::new("12a").is_err());
        assert!(LocalMessageId::new(" 12").is_err());
    }

    #[test]
    fn receiver_number_plus_prefix_matches_double_zero() {
        let plus = ReceiverNumber::new("+40712345678").unwrap();
        let zeros = ReceiverNumber::new("0040712345678").unwrap();
        assert_eq!(plus, zeros);
        assert_eq!(plus.as_str(), "0040712345678");

        let formatted = ReceiverNumber::new(" +40 (712) 345-678 ").unwrap();
        assert_eq!(formatted.as_str(), "0040712345678");
    }

    #[test]
    fn receiver_number_rejects_empty_after_normalization() {
        assert!(matches!(
            ReceiverNumber::new("abc-def"),
            Err(ValidationError::InvalidReceiverNumber { .. })
        ));
        assert!(ReceiverNumber::new("").is_err());
        assert!(ReceiverNumber::new("   ").is_err());
        assert_eq!(ReceiverNumber::new("+").unwrap().as_str(), "00");
    }

    #[test]
    fn normalize_number_only_expands_leading_plus() {
        assert_eq!(normalize_number("+407xyz12"), "0040712");
        assert_eq!(normalize_number("00407xyz12"), "0040712");
        assert_eq!(normalize_number("07+12"), "0712");
    }

    #[test]
    fn sanitize_text_escapes_framing_characters() {
        assert_eq!(sanitize_text("  hello  "), "hello");
        assert_eq!(sanitize_text("a\r\nb"), "a%0Ab");
        assert_eq!(sanitize_text("a\nb;c"), "a%0Ab%3Bc");
        assert_eq!(sanitize_text("a\tb\rc"), "abc");
        assert_eq!(MessageText::new(" x;y ").as_str(), "x%3By");
    }

    #[test]
    fn message_status_code_known_mapping() {
        let accepted = MessageStatusCode::new("3");
        assert_eq!(accepted.known(), Some(KnownMessageStatus::Accepted));
        assert!(accepted.is_success());

        let credit = MessageStatusCode::new("5");
        assert_eq!(credit.known(), Some(KnownMessageStatus::InsufficientCredit));
        assert!(!credit.is_success());

        let unknown = MessageStatusCode::new("42");
        assert_eq!(unknown.known(), None);
        assert!(!unknown.is_success());
        assert_eq!(unknown.as_str(), "42");
    }

    #[test]
    fn known_status_codes_round_trip() {
        for code in 1..=5u8 {
            let kind = KnownMessageStatus::from_code(&code.to_string()).unwrap();
            assert_eq!(kind.code(), code);
        }
    }

    #[test]
    fn timestamp_zero_is_immediate() {
        assert!(UnixTimestamp::IMMEDIATE.is_immediate());
        assert!(UnixTimestamp::default().is_immediate());
        assert!(!UnixTimestamp::new(1_700_000_000).is_immediate());
    }
}
