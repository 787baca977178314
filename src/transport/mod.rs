//! Transport layer: package wire format, form encoding and reply decoding.

mod bulk_form;
mod bulk_response;
mod package;

pub use bulk_form::{BulkForm, PACKAGE_FIELD, TIMESTAMP_QUERY, encode_bulk_form};
pub use bulk_response::{BulkReply, TransportError, decode_bulk_response};
pub use package::{PackagePayload, encode_package_line, encode_plain_content, md5_hex};
