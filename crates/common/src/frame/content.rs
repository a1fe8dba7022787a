use mime::Mime;

use super::{parse_mime, ContentType, Frame, FrameError};
use crate::board::BoardRecord;
use crate::codec;
use crate::crypto::{KdfParams, Passphrase};

/// Plaintext content, before sealing or after opening a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Image { mime: Mime, data: Vec<u8> },
    Record(BoardRecord),
}

impl Content {
    pub fn text(message: impl Into<String>) -> Self {
        Content::Text(message.into())
    }

    pub fn image(mime: &str, data: Vec<u8>) -> Result<Self, FrameError> {
        Ok(Content::Image {
            mime: parse_mime(mime)?,
            data,
        })
    }

    pub fn content_type(&self) -> ContentType {
        match self {
            Content::Text(_) => ContentType::Text,
            Content::Image { .. } => ContentType::Image,
            Content::Record(_) => ContentType::Record,
        }
    }

    /// Encrypt under `passphrase` and attach the matching type token
    pub fn seal(&self, passphrase: &Passphrase, params: &KdfParams) -> Result<Frame, FrameError> {
        let frame = match self {
            Content::Text(message) => Frame::Text {
                ciphertext: passphrase.encrypt_with(message, params)?,
            },
            Content::Image { mime, data } => {
                // re-check, the fields are public
                let mime = parse_mime(mime.as_ref())?;
                Frame::Image {
                    mime,
                    ciphertext: passphrase.encrypt_with(&codec::to_hex(data), params)?,
                }
            }
            Content::Record(record) => {
                let json =
                    serde_json::to_string(record).map_err(|e| FrameError::Serialize(e.to_string()))?;
                Frame::Record {
                    ciphertext: passphrase.encrypt_with(&json, params)?,
                }
            }
        };
        Ok(frame)
    }
}

impl Frame {
    /// Decrypt the frame back into content
    ///
    /// Legacy frames are tried as an envelope first. If they do not parse as
    ///  one they are returned verbatim as text; if they decrypt to a board
    ///  record they are returned as a record.
    pub fn open(&self, passphrase: &Passphrase) -> Result<Content, FrameError> {
        match self {
            Frame::Text { ciphertext } => Ok(Content::Text(passphrase.decrypt(ciphertext)?)),
            Frame::Image { mime, ciphertext } => {
                let hex = passphrase.decrypt(ciphertext)?;
                let data = codec::from_hex(&hex).map_err(FrameError::ImageEncoding)?;
                Ok(Content::Image {
                    mime: mime.clone(),
                    data,
                })
            }
            Frame::Record { ciphertext } => {
                let json = passphrase.decrypt(ciphertext)?;
                let record =
                    serde_json::from_str(&json).map_err(|e| FrameError::Record(e.to_string()))?;
                Ok(Content::Record(record))
            }
            Frame::Legacy { content } => match passphrase.decrypt(content) {
                Ok(plaintext) => match serde_json::from_str::<BoardRecord>(&plaintext) {
                    Ok(record) => Ok(Content::Record(record)),
                    Err(_) => Ok(Content::Text(plaintext)),
                },
                Err(e) if e.is_structural() => Ok(Content::Text(content.clone())),
                Err(e) => Err(e.into()),
            },
        }
    }
}

#[cfg(test)]
mod test {
    use time::macros::datetime;

    use super::*;
    use crate::crypto::CipherError;

    fn fast() -> KdfParams {
        KdfParams::new(256, 1, 1).unwrap()
    }

    fn passphrase(value: &str) -> Passphrase {
        Passphrase::new(value).unwrap()
    }

    #[test]
    fn test_text_seal_open() {
        let key = passphrase("secret123");
        let frame = Content::text("hello").seal(&key, &fast()).unwrap();
        assert!(frame.encode().starts_with(b"TEXT:"));
        assert_eq!(frame.open(&key).unwrap(), Content::text("hello"));

        let err = frame.open(&passphrase("wrong")).unwrap_err();
        assert!(err.is_decryption());
    }

    #[test]
    fn test_image_seal_open() {
        let key = passphrase("k");
        let content = Content::image("image/png", vec![0x89, 0x50, 0x4e]).unwrap();
        let frame = content.seal(&key, &fast()).unwrap();
        assert!(frame.encode().starts_with(b"IMG:image/png:"));

        let decoded = Frame::decode(&frame.encode()).unwrap();
        assert_eq!(decoded.open(&key).unwrap(), content);
    }

    #[test]
    fn test_empty_image() {
        let key = passphrase("k");
        let content = Content::image("image/gif", Vec::new()).unwrap();
        let frame = content.seal(&key, &fast()).unwrap();
        assert_eq!(frame.open(&key).unwrap(), content);
    }

    #[test]
    fn test_record_seal_open() {
        let key = passphrase("board");
        let record = BoardRecord {
            author: "ada".to_string(),
            message: "first".to_string(),
            timestamp: datetime!(2024-05-01 12:00 UTC),
        };
        let frame = Content::Record(record.clone()).seal(&key, &fast()).unwrap();
        assert_eq!(frame.content_type(), ContentType::Record);
        assert_eq!(frame.open(&key).unwrap(), Content::Record(record));
    }

    #[test]
    fn test_legacy_encrypted_text() {
        let key = passphrase("old");
        let envelope = key.encrypt_with("from before tokens", &fast()).unwrap();
        let frame = Frame::decode(envelope.as_bytes()).unwrap();
        assert_eq!(frame.content_type(), ContentType::Legacy);
        assert_eq!(
            frame.open(&key).unwrap(),
            Content::text("from before tokens")
        );
        assert!(matches!(
            frame.open(&passphrase("other")),
            Err(FrameError::Cipher(CipherError::Authentication))
        ));
    }

    #[test]
    fn test_legacy_encrypted_record() {
        let key = passphrase("old");
        let json = r#"{"author":"bo","message":"hi","timestamp":"2023-01-02T03:04:05Z"}"#;
        let envelope = key.encrypt_with(json, &fast()).unwrap();
        let frame = Frame::decode(envelope.as_bytes()).unwrap();
        match frame.open(&key).unwrap() {
            Content::Record(record) => {
                assert_eq!(record.author, "bo");
                assert_eq!(record.timestamp, datetime!(2023-01-02 03:04:05 UTC));
            }
            other => panic!("expected record, got {:?}", other),
        }
    }

    #[test]
    fn test_legacy_plain_text() {
        let frame = Frame::decode(b"just some words").unwrap();
        assert_eq!(
            frame.open(&passphrase("any")).unwrap(),
            Content::text("just some words")
        );
    }

    #[test]
    fn test_record_frame_with_text_inside() {
        let key = passphrase("k");
        let frame = Frame::Record {
            ciphertext: key.encrypt_with("not json", &fast()).unwrap(),
        };
        let err = frame.open(&key).unwrap_err();
        assert!(matches!(err, FrameError::Record(_)));
        assert!(err.is_decryption());
    }
}
