//! Text encoding for content streams and document metadata.

use unicode_normalization::UnicodeNormalization;

/// How a font maps text to bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// Windows-1252, used by every core text font.
    WinAnsi,
    /// The font's built-in encoding: code points 0..=255 map to the same byte.
    Builtin,
}

impl TextEncoding {
    /// NFC-normalizes `text` and encodes it. Unrepresentable characters become `?`.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        let mut result = Vec::with_capacity(text.len());
        let mut substituted = 0usize;
        for ch in text.nfc() {
            let byte = match self {
                TextEncoding::WinAnsi => winansi_byte(ch),
                TextEncoding::Builtin => u8::try_from(ch as u32).ok(),
            };
            match byte {
                Some(b) => result.push(b),
                None => {
                    substituted += 1;
                    result.push(b'?');
                }
            }
        }
        if substituted > 0 {
            tracing::warn!(
                substituted,
                encoding = ?self,
                "characters not representable in the font encoding were replaced with '?'"
            );
        }
        result
    }
}

fn winansi_byte(ch: char) -> Option<u8> {
    let byte = match ch as u32 {
        0x00..=0x7F => ch as u8,
        0xA0..=0xFF => ch as u8,
        0x20AC => 0x80, // Euro sign
        0x201A => 0x82, // Single low quotation mark
        0x0192 => 0x83, // Latin small letter f with hook
        0x201E => 0x84, // Double low quotation mark
        0x2026 => 0x85, // Horizontal ellipsis
        0x2020 => 0x86, // Dagger
        0x2021 => 0x87, // Double dagger
        0x02C6 => 0x88, // Circumflex accent
        0x2030 => 0x89, // Per mille sign
        0x0160 => 0x8A, // S with caron
        0x2039 => 0x8B, // Single left angle quotation mark
        0x0152 => 0x8C, // OE ligature
        0x017D => 0x8E, // Z with caron
        0x2018 => 0x91, // Left single quotation mark
        0x2019 => 0x92, // Right single quotation mark
        0x201C => 0x93, // Left double quotation mark
        0x201D => 0x94, // Right double quotation mark
        0x2022 => 0x95, // Bullet
        0x2013 => 0x96, // En dash
        0x2014 => 0x97, // Em dash
        0x02DC => 0x98, // Small tilde
        0x2122 => 0x99, // Trade mark sign
        0x0161 => 0x9A, // s with caron
        0x203A => 0x9B, // Single right angle quotation mark
        0x0153 => 0x9C, // oe ligature
        0x017E => 0x9E, // z with caron
        0x0178 => 0x9F, // Y with diaeresis
        _ => return None,
    };
    Some(byte)
}

/// Escapes bytes for a literal string: `\`, `(`, `)` and CR are backslash-escaped.
pub fn escape(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 8);
    for &b in bytes {
        match b {
            b'\\' => out.extend_from_slice(b"\\\\"),
            b'(' => out.extend_from_slice(b"\\("),
            b')' => out.extend_from_slice(b"\\)"),
            b'\r' => out.extend_from_slice(b"\\r"),
            _ => out.push(b),
        }
    }
    out
}

/// Encodes a text string (metadata, link URIs): ASCII as-is, anything else as
/// UTF-16BE with a byte order mark.
pub fn text_string(text: &str) -> Vec<u8> {
    if text.is_ascii() {
        return text.as_bytes().to_vec();
    }
    let mut out = Vec::with_capacity(2 + text.len() * 2);
    out.extend_from_slice(&[0xFE, 0xFF]);
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_be_bytes());
    }
    out
}
