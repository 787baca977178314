use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },
    NotNumeric { field: &'static str, input: String },
    InvalidReceiverNumber { input: String },
    UnknownCompression { id: u8 },
    UnknownProtocol { input: String },
    PackageLocked,
    PackageSent,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::NotNumeric { field, input } => {
                write!(f, "{field} must contain digits only: {input}")
            }
            Self::InvalidReceiverNumber { input } => {
                write!(f, "invalid receiver number: {input}")
            }
            Self::UnknownCompression { id } => write!(f, "unknown compression method: {id}"),
            Self::UnknownProtocol { input } => {
                write!(f, "unknown protocol: {input} (expected HTTP or HTTPS)")
            }
            Self::PackageLocked => write!(f, "package was sent and is locked for changes"),
            Self::PackageSent => write!(f, "package was already sent"),
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::ValidationError;

    #[test]
    fn display_messages_are_human_readable() {
        let err = ValidationError::Empty {
            field: "connection_id",
        };
        assert_eq!(err.to_string(), "connection_id must not be empty");

        let err = ValidationError::NotNumeric {
            field: "localMessageId",
            input: "12a".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "localMessageId must contain digits only: 12a"
        );

        let err = ValidationError::InvalidReceiverNumber {
            input: "abc".to_owned(),
        };
        assert_eq!(err.to_string(), "invalid receiver number: abc");

        let err = ValidationError::UnknownCompression { id: 9 };
        assert_eq!(err.to_string(), "unknown compression method: 9");

        let err = ValidationError::UnknownProtocol {
            input: "ftp".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "unknown protocol: ftp (expected HTTP or HTTPS)"
        );
    }
}
