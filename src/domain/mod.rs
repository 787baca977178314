//! Domain layer: strong types with validation and invariants (no I/O).

mod compression;
mod message;
mod response;
mod validation;
mod value;

pub use compression::{Codec, CompressionMethod, Identity};
pub use message::{MessageEntry, MessageStore};
pub use response::{
    BulkResponse, PackageStatus, RemoteMessage, RemoteMessages, StatusCounts,
};
pub use validation::ValidationError;
pub use value::{
    ConnectionId, KnownMessageStatus, LocalMessageId, MessageStatusCode, MessageText, Password,
    ReceiverNumber, SenderId, UnixTimestamp, normalize_number, sanitize_text,
};
