//! Property-based tests for framing, encoding and encryption.
//!
//! These tests verify invariants hold for arbitrary inputs:
//!
//! - Hex and base64 conversions are lossless
//! - Frames survive encode/decode for any payload and image MIME type
//! - Sealed content opens to itself under the same passphrase
//! - Envelopes never open under a different key
//! - Namespaces keep the version-0 layout for any identifier

use proptest::prelude::*;

use crate::codec;
use crate::crypto::{CipherError, DeviceKey, KdfParams, Passphrase, DEVICE_KEY_SIZE};
use crate::frame::{Content, ContentType, Frame, FrameError, HEADER_WINDOW};
use crate::namespace::{Namespace, MAX_ID_SIZE, NAMESPACE_SIZE, RESERVED_ZERO_BYTES};

fn fast_params() -> KdfParams {
    KdfParams::new(256, 1, 1).unwrap()
}

fn image_mime() -> impl Strategy<Value = String> {
    "image/[a-z0-9][a-z0-9.+-]{0,19}"
}

fn passphrase() -> impl Strategy<Value = String> {
    "[!-~][ -~]{0,31}"
}

// ==================== Codec Property Tests ====================

proptest! {
    /// Hex encoding is lossless and always lowercase.
    #[test]
    fn hex_roundtrip(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let hex = codec::to_hex(&data);
        prop_assert_eq!(hex.len(), data.len() * 2);
        prop_assert!(!hex.chars().any(|c| c.is_ascii_uppercase()));
        prop_assert_eq!(codec::from_hex(&hex).unwrap(), data.clone());
        prop_assert_eq!(codec::from_hex(&hex.to_uppercase()).unwrap(), data);
    }

    /// Base64 encoding is lossless, and base64_to_hex agrees with the
    /// two-step conversion.
    #[test]
    fn base64_roundtrip(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let b64 = codec::to_base64(&data);
        prop_assert_eq!(codec::from_base64(&b64).unwrap(), data.clone());
        prop_assert_eq!(codec::base64_to_hex(&b64).unwrap(), codec::to_hex(&data));
    }
}

// ==================== Frame Property Tests ====================

proptest! {
    /// Text and record frames decode to themselves for any payload.
    #[test]
    fn tagged_frame_roundtrip(ciphertext in ".{0,300}") {
        for frame in [
            Frame::Text { ciphertext: ciphertext.clone() },
            Frame::Record { ciphertext: ciphertext.clone() },
        ] {
            let decoded = Frame::decode(&frame.encode()).unwrap();
            prop_assert_eq!(decoded, frame);
        }
    }

    /// Image frames keep their MIME type and payload, even when the payload
    /// itself contains colons.
    #[test]
    fn image_frame_roundtrip(mime in image_mime(), ciphertext in ".{0,300}") {
        let frame = Frame::image(&mime, ciphertext.clone()).unwrap();
        let encoded = frame.encode();
        let terminator = "IMG:".len() + mime.len();
        prop_assert!(terminator < HEADER_WINDOW);
        prop_assert_eq!(encoded[terminator], b':');

        let decoded = Frame::decode(&encoded).unwrap();
        prop_assert_eq!(decoded.content_type(), ContentType::Image);
        prop_assert_eq!(decoded.mime().unwrap().as_ref(), mime.as_str());
        prop_assert_eq!(decoded.ciphertext(), ciphertext.as_str());
        prop_assert_eq!(Frame::from_hex(&frame.to_hex()).unwrap(), frame);
    }

    /// Any MIME type containing a colon is refused.
    #[test]
    fn colon_mime_rejected(prefix in "[a-z]{1,10}", suffix in "[a-z:]{0,10}") {
        let mime = format!("{}/{}:{}", prefix, prefix, suffix);
        prop_assert!(matches!(
            Frame::image(&mime, String::new()),
            Err(FrameError::ColonInMime(_))
        ));
    }
}

// ==================== Encryption Property Tests ====================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Sealed text opens to the same text, including through encode/decode.
    #[test]
    fn seal_open_text(secret in passphrase(), message in ".{0,200}") {
        let passphrase = Passphrase::new(secret).unwrap();
        let content = Content::text(message);

        let frame = content.seal(&passphrase, &fast_params()).unwrap();
        let decoded = Frame::decode(&frame.encode()).unwrap();
        prop_assert_eq!(decoded.open(&passphrase).unwrap(), content);
    }

    /// Sealed images open to the same bytes and MIME type.
    #[test]
    fn seal_open_image(
        secret in passphrase(),
        mime in image_mime(),
        data in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let passphrase = Passphrase::new(secret).unwrap();
        let content = Content::image(&mime, data).unwrap();

        let frame = content.seal(&passphrase, &fast_params()).unwrap();
        let decoded = Frame::decode(&frame.encode()).unwrap();
        prop_assert_eq!(decoded.open(&passphrase).unwrap(), content);
    }

    /// A different passphrase never authenticates.
    #[test]
    fn wrong_passphrase_rejected(a in passphrase(), b in passphrase(), message in ".{0,64}") {
        prop_assume!(a != b);
        let sealer = Passphrase::new(a).unwrap();
        let other = Passphrase::new(b).unwrap();

        let envelope = sealer.encrypt_with(&message, &fast_params()).unwrap();
        prop_assert_eq!(other.decrypt(&envelope), Err(CipherError::Authentication));
    }

    /// A different device key never authenticates.
    #[test]
    fn wrong_device_key_rejected(
        a in any::<[u8; DEVICE_KEY_SIZE]>(),
        b in any::<[u8; DEVICE_KEY_SIZE]>(),
    ) {
        prop_assume!(a != b);
        let sealer = DeviceKey::from_slice(&a).unwrap().passphrase();
        let other = DeviceKey::from_slice(&b).unwrap().passphrase();

        let frame = Content::text("device bound").seal(&sealer, &fast_params()).unwrap();
        prop_assert!(matches!(
            frame.open(&other),
            Err(FrameError::Cipher(CipherError::Authentication))
        ));
    }
}

// ==================== Namespace Property Tests ====================

proptest! {
    /// `pad` always yields a version-0 tag with reserved zeros, the
    /// identifier prefix and zero padding.
    #[test]
    fn pad_layout(id in prop::collection::vec(any::<u8>(), 0..64)) {
        let namespace = Namespace::pad(&id);
        let bytes = namespace.bytes();
        let id_offset = 1 + RESERVED_ZERO_BYTES;
        let kept = id.len().min(MAX_ID_SIZE);

        prop_assert_eq!(bytes.len(), NAMESPACE_SIZE);
        prop_assert_eq!(bytes[0], 0);
        prop_assert!(bytes[1..id_offset].iter().all(|b| *b == 0));
        prop_assert_eq!(&bytes[id_offset..id_offset + kept], &id[..kept]);
        prop_assert!(bytes[id_offset + kept..].iter().all(|b| *b == 0));

        // a valid tag parses back to itself
        prop_assert_eq!(Namespace::from_slice(bytes).unwrap(), namespace);
        prop_assert_eq!(Namespace::try_from_id(&id).is_ok(), id.len() <= MAX_ID_SIZE);
    }
}
