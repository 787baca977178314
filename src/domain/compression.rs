use std::borrow::Cow;

use crate::domain::validation::ValidationError;

/// Payload transform applied to the serialized package before upload.
pub trait Codec: Send + Sync {
    fn compress<'a>(&self, plain: &'a [u8]) -> Cow<'a, [u8]>;
}

/// Pass-through codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Codec for Identity {
    fn compress<'a>(&self, plain: &'a [u8]) -> Cow<'a, [u8]> {
        Cow::Borrowed(plain)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
/// Compression methods understood by the gateway (`Compression` form field).
///
/// Only [`CompressionMethod::None`] has a real transform today; the other ids are
/// accepted and sent, but the payload goes out uncompressed.
pub enum CompressionMethod {
    #[default]
    None,
    Gzip,
    Bzip2,
    Lzf,
}

impl CompressionMethod {
    /// Form field name used by the gateway (`Compression`).
    pub const FIELD: &'static str = "Compression";

    pub const ALL: [Self; 4] = [Self::None, Self::Gzip, Self::Bzip2, Self::Lzf];

    pub fn from_id(id: u8) -> Result<Self, ValidationError> {
        Ok(match id {
            0 => Self::None,
            1 => Self::Gzip,
            2 => Self::Bzip2,
            3 => Self::Lzf,
            _ => return Err(ValidationError::UnknownCompression { id }),
        })
    }

    pub fn id(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Gzip => 1,
            Self::Bzip2 => 2,
            Self::Lzf => 3,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::None => "No Compression",
            Self::Gzip => "Compression using Zlib Gzip",
            Self::Bzip2 => "Compression using bzip2",
            Self::Lzf => "Compression using LZF",
        }
    }

    /// Codec that implements this method.
    pub fn codec(self) -> &'static dyn Codec {
        // Gzip, bzip2 and LZF have no encoder yet and upload the plain bytes.
        match self {
            Self::None | Self::Gzip | Self::Bzip2 | Self::Lzf => &Identity,
        }
    }

    pub fn apply<'a>(self, plain: &'a [u8]) -> Cow<'a, [u8]> {
        self.codec().compress(plain)
    }
}
