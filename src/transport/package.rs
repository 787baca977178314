use md5::{Digest, Md5};

use crate::domain::{CompressionMethod, MessageEntry, MessageStore};

/// Field separator inside a package line.
pub const FIELD_SEPARATOR: &str = ";";
/// Line separator between package entries.
pub const LINE_SEPARATOR: &str = "\r\n";

/// Serialized package as uploaded in one request.
///
/// Rebuilt from the message store on every send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagePayload {
    pub compression: CompressionMethod,
    pub plain: String,
    pub compressed: Vec<u8>,
    pub md5_plain: String,
    pub md5_compressed: String,
}

impl PackagePayload {
    pub fn build(store: &MessageStore, compression: CompressionMethod) -> Self {
        let plain = encode_plain_content(store);
        let compressed = compression.apply(plain.as_bytes()).into_owned();
        Self {
            compression,
            md5_plain: md5_hex(plain.as_bytes()),
            md5_compressed: md5_hex(&compressed),
            plain,
            compressed,
        }
    }

    /// Byte length of the plain content (`SizePlain`).
    pub fn size_plain(&self) -> usize {
        self.plain.len()
    }

    /// Byte length of the uploaded content (`SizeCompressed`).
    pub fn size_compressed(&self) -> usize {
        self.compressed.len()
    }
}

/// `localMessageId;receiverNumber;senderId;messageText;timestampProgrammed`
pub fn encode_package_line(entry: &MessageEntry) -> String {
    let timestamp = entry.timestamp_programmed.value().to_string();
    [
        entry.local_message_id.as_str(),
        entry.receiver_number.as_str(),
        entry.sender_id.as_str(),
        entry.message_text.as_str(),
        timestamp.as_str(),
    ]
    .join(FIELD_SEPARATOR)
}

pub fn encode_plain_content(store: &MessageStore) -> String {
    store
        .iter()
        .map(encode_package_line)
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR)
}

/// Lowercase hex MD5 digest.
pub fn md5_hex(content: &[u8]) -> String {
    hex::encode(Md5::digest(content))
}
