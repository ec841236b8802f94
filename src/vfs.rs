use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};

/// Lenient decoder for data-URL payloads: padding is optional.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// How the `content` of a [`VirtualFile`] is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// UTF-8 text, written to the archive as-is.
    Text,
    /// Base64 payload, decoded to raw bytes when written to the archive.
    Base64,
}

/// A file found inside a response, staged in memory before it is packaged.
///
/// `path` and `content` are never empty: the extractor drops matches that would
/// produce an empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualFile {
    /// Relative path used verbatim as the archive entry name.
    pub path: String,
    pub content: String,
    pub encoding: Encoding,
}
impl VirtualFile {
    pub fn text(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            encoding: Encoding::Text,
        }
    }

    pub fn base64(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            encoding: Encoding::Base64,
        }
    }

    /// Returns the raw bytes this file stands for.
    ///
    /// Text content is returned as its UTF-8 bytes. Base64 content is decoded,
    /// ignoring ASCII whitespace inside the payload.
    pub fn bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        match self.encoding {
            Encoding::Text => Ok(self.content.as_bytes().to_vec()),
            Encoding::Base64 => {
                let compact: String = self
                    .content
                    .chars()
                    .filter(|c| !c.is_ascii_whitespace())
                    .collect();

                PAYLOAD_ENGINE.decode(compact)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_bytes_are_utf8() {
        let file = VirtualFile::text("a.txt", "héllo");

        assert_eq!(file.bytes().unwrap(), "héllo".as_bytes());
    }

    #[test]
    fn base64_bytes_are_decoded() {
        let file = VirtualFile::base64("a.png", "iVBORw0KGgo=");

        assert_eq!(
            file.bytes().unwrap(),
            vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]
        );
    }

    #[test]
    fn base64_tolerates_whitespace_and_missing_padding() {
        let file = VirtualFile::base64("a.bin", "aGVs\nbG8");

        assert_eq!(file.bytes().unwrap(), b"hello");
    }

    #[test]
    fn malformed_base64_is_an_error() {
        let file = VirtualFile::base64("a.png", "not*base64!");

        assert!(file.bytes().is_err());
    }
}
