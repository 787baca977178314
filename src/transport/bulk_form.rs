use super::package::PackagePayload;
use crate::domain::CompressionMethod;

/// Multipart file field carrying the package.
pub const PACKAGE_FIELD: &str = "Package";
/// Query parameter appended to the endpoint URL.
pub const TIMESTAMP_QUERY: &str = "timestamp";

/// Package-level form fields, after the credential fields.
pub struct BulkForm<'a> {
    pub test_mode: bool,
    pub payload: &'a PackagePayload,
    pub receivers: usize,
    pub timestamp: u64,
    pub client_version: &'a str,
}

pub fn encode_bulk_form(form: &BulkForm<'_>) -> Vec<(String, String)> {
    let payload = form.payload;
    vec![
        ("test".to_owned(), flag(form.test_mode)),
        (
            CompressionMethod::FIELD.to_owned(),
            payload.compression.id().to_string(),
        ),
        ("MD5Plain".to_owned(), payload.md5_plain.clone()),
        ("MD5Compressed".to_owned(), payload.md5_compressed.clone()),
        ("SizePlain".to_owned(), payload.size_plain().to_string()),
        (
            "SizeCompressed".to_owned(),
            payload.size_compressed().to_string(),
        ),
        ("Timestamp".to_owned(), form.timestamp.to_string()),
        ("Buffering".to_owned(), "1".to_owned()),
        ("Version".to_owned(), form.client_version.to_owned()),
        ("Receivers".to_owned(), form.receivers.to_string()),
    ]
}

fn flag(value: bool) -> String {
    let flag = if value { "1" } else { "0" };
    flag.to_owned()
}
