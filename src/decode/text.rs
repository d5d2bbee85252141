//! Best-effort recovery of `char[N]` buffers into text
//!
//! rFactor 2 writes driver, vehicle and track names as fixed-size C buffers.
//! Most are UTF-8, some carry Windows-1252 accented or Scandinavian letters,
//! and a few are plain garbage after a partial write.

use tracing::warn;

/// Windows-1252 code points for bytes 0x80..=0x9F. `None` marks the five
/// positions the code page leaves undefined.
const CP1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

/// Recover legible text from a raw byte buffer. Never fails.
///
/// The buffer is cut at its first NUL, then decoded as UTF-8, then as
/// Windows-1252, and finally as UTF-8 with invalid sequences dropped.
/// Trailing whitespace is trimmed in every case.
pub fn recover_text(bytes: &[u8]) -> String {
    let bytes = until_nul(bytes);

    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.trim_end().to_owned();
    }

    if let Some(text) = decode_windows_1252(bytes) {
        return text.trim_end().to_owned();
    }

    warn!(len = bytes.len(), "Text is neither UTF-8 nor Windows-1252, dropping invalid bytes");
    decode_utf8_dropping_invalid(bytes).trim_end().to_owned()
}

fn until_nul(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}

/// Decode Windows-1252, failing on the code page's undefined bytes.
pub fn decode_windows_1252(bytes: &[u8]) -> Option<String> {
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0x9F => CP1252_HIGH[usize::from(b - 0x80)],
            _ => Some(char::from(b)),
        })
        .collect()
}

fn decode_utf8_dropping_invalid(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn stops_at_first_nul() {
        assert_eq!(recover_text(b"Spa\0\xff\xfegarbage"), "Spa");
        assert_eq!(recover_text(b"\0Monza"), "");
    }

    #[test]
    fn trims_trailing_whitespace_only() {
        assert_eq!(recover_text(b"  Le Mans  \t\0"), "  Le Mans");
    }

    #[test]
    fn utf8_is_preferred() {
        assert_eq!(recover_text("Nürburgring".as_bytes()), "Nürburgring");
    }

    #[test]
    fn falls_back_to_windows_1252() {
        // "Åre Östersund" as Windows-1252 is not valid UTF-8
        assert_eq!(recover_text(b"\xc5re \xd6stersund"), "Åre Östersund");
        assert_eq!(recover_text(b"Pi\xe8ce \x80"), "Pièce €");
    }

    #[test]
    fn undefined_windows_1252_bytes_drop_out() {
        // 0x81 is undefined in Windows-1252 and a stray continuation byte in UTF-8
        assert_eq!(decode_windows_1252(b"A\x81B"), None);
        assert_eq!(recover_text(b"A\x81B  "), "AB");
    }

    #[test]
    fn empty_buffer_is_empty_text() {
        assert_eq!(recover_text(b""), "");
        assert_eq!(recover_text(&[0u8; 32]), "");
    }

    proptest! {
        #[test]
        fn nul_terminated_prefix_is_all_that_survives(
            prefix in "[a-zA-Z0-9 ]{0,24}",
            garbage in prop::collection::vec(any::<u8>(), 0..32),
        ) {
            let mut bytes = prefix.as_bytes().to_vec();
            bytes.push(0);
            bytes.extend(garbage);
            prop_assert_eq!(recover_text(&bytes), prefix.trim_end());
        }

        #[test]
        fn valid_utf8_round_trips(text in "[^\u{0}]{0,32}") {
            prop_assert_eq!(recover_text(text.as_bytes()), text.trim_end());
        }

        #[test]
        fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
            let text = recover_text(&bytes);
            prop_assert!(!text.contains('\0'));
        }
    }
}
