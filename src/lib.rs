//! Typed Rust client for the SMSLink bulk SMS gateway.
//!
//! A [`BulkPackage`] collects messages locally, serializes them into the
//! gateway's `;`/CRLF framed package format, and uploads the whole batch in a
//! single multipart request. The reply is decoded into a remote package id and
//! a per-message outcome.
//!
//! The crate is split into a domain layer of strong types, a transport layer
//! for wire-format details, and a small client layer orchestrating the send.
//!
//! ```rust,no_run
//! use smslink_bulk::{BulkPackage, Credentials};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut package = BulkPackage::new(Credentials::new("...", "...")?, true);
//!     package.insert_message(1, "+40712345678", "numeric", "hello", 0)?;
//!     package.try_send().await?;
//!     println!("package {:?}", package.remote_package_id());
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod transport;

pub use client::{BulkPackage, BulkPackageBuilder, BulkPackageError, Credentials, Protocol};
pub use domain::{
    Codec, CompressionMethod, KnownMessageStatus, LocalMessageId, MessageEntry, MessageStatusCode,
    MessageStore, MessageText, PackageStatus, ReceiverNumber, RemoteMessage, RemoteMessages,
    SenderId, StatusCounts, UnixTimestamp, ValidationError,
};
pub use transport::{PackagePayload, encode_package_line, encode_plain_content, md5_hex};
