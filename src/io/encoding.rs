//! Text encoding detection and Windows-1251 conversion.
//!
//! Survey files arrive either as UTF-8 (with or without BOM) or as legacy
//! Windows-1251 exports. Everything inside the crate is UTF-8; conversion
//! happens only at the read/write boundary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Supported text encodings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum TextEncoding {
    #[default]
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    #[serde(rename = "windows-1251", alias = "cp1251")]
    Windows1251,
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8 => write!(f, "utf-8"),
            Self::Windows1251 => write!(f, "windows-1251"),
        }
    }
}

impl FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "windows-1251" | "cp1251" | "win1251" => Ok(Self::Windows1251),
            other => Err(format!("unknown encoding '{other}'")),
        }
    }
}

/// Windows-1251 code points for bytes 0x80..=0xBF. Bytes 0xC0..=0xFF map to U+0410..=U+044F.
const CP1251_HIGH: [u16; 64] = [
    0x0402, 0x0403, 0x201A, 0x0453, 0x201E, 0x2026, 0x2020, 0x2021, //
    0x20AC, 0x2030, 0x0409, 0x2039, 0x040A, 0x040C, 0x040B, 0x040F, //
    0x0452, 0x2018, 0x2019, 0x201C, 0x201D, 0x2022, 0x2013, 0x2014, //
    0x0098, 0x2122, 0x0459, 0x203A, 0x045A, 0x045C, 0x045B, 0x045F, //
    0x00A0, 0x040E, 0x045E, 0x0408, 0x00A4, 0x0490, 0x00A6, 0x00A7, //
    0x0401, 0x00A9, 0x0404, 0x00AB, 0x00AC, 0x00AD, 0x00AE, 0x0407, //
    0x00B0, 0x00B1, 0x0406, 0x0456, 0x0491, 0x00B5, 0x00B6, 0x00B7, //
    0x0451, 0x2116, 0x0454, 0x00BB, 0x0458, 0x0405, 0x0455, 0x0457, //
];

fn cp1251_to_char(byte: u8) -> char {
    let code = match byte {
        0x00..=0x7F => u32::from(byte),
        0x80..=0xBF => u32::from(CP1251_HIGH[usize::from(byte - 0x80)]),
        0xC0..=0xFF => 0x0410 + u32::from(byte - 0xC0),
    };
    char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
}

fn char_to_cp1251(c: char) -> Option<u8> {
    let code = u32::from(c);
    if code < 0x80 {
        return u8::try_from(code).ok();
    }
    if (0x0410..=0x044F).contains(&code) {
        return u8::try_from(code - 0x0410 + 0xC0).ok();
    }
    CP1251_HIGH
        .iter()
        .position(|&u| u32::from(u) == code)
        .and_then(|i| u8::try_from(i + 0x80).ok())
}

/// Detected encoding with a confidence in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodingGuess {
    pub encoding: TextEncoding,
    pub confidence: f64,
    pub bom: bool,
}

/// BOM sniff, then UTF-8 validity, then Cyrillic byte frequency.
pub fn detect_encoding(bytes: &[u8]) -> EncodingGuess {
    if bytes.starts_with(UTF8_BOM) {
        return EncodingGuess { encoding: TextEncoding::Utf8, confidence: 1.0, bom: true };
    }
    if std::str::from_utf8(bytes).is_ok() {
        let ascii_only = bytes.is_ascii();
        return EncodingGuess {
            encoding: TextEncoding::Utf8,
            confidence: if ascii_only { 1.0 } else { 0.95 },
            bom: false,
        };
    }
    let high: Vec<u8> = bytes.iter().copied().filter(|b| *b >= 0x80).collect();
    let cyrillic = high.iter().filter(|&&b| b >= 0xC0 || b == 0xA8 || b == 0xB8).count();
    let ratio = if high.is_empty() { 0.0 } else { cyrillic as f64 / high.len() as f64 };
    EncodingGuess {
        encoding: TextEncoding::Windows1251,
        confidence: 0.5 + 0.5 * ratio,
        bom: false,
    }
}

/// Decode with a known encoding. A UTF-8 BOM is stripped; invalid sequences are replaced.
pub fn decode(bytes: &[u8], encoding: TextEncoding) -> String {
    match encoding {
        TextEncoding::Utf8 => {
            let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
            String::from_utf8_lossy(body).into_owned()
        }
        TextEncoding::Windows1251 => bytes.iter().map(|&b| cp1251_to_char(b)).collect(),
    }
}

/// Detect and decode in one step.
pub fn decode_auto(bytes: &[u8]) -> (String, EncodingGuess) {
    let guess = detect_encoding(bytes);
    (decode(bytes, guess.encoding), guess)
}

/// Encode UTF-8 text. Characters with no Windows-1251 form become `?`.
pub fn encode(text: &str, encoding: TextEncoding) -> Vec<u8> {
    match encoding {
        TextEncoding::Utf8 => text.as_bytes().to_vec(),
        TextEncoding::Windows1251 => text.chars().map(|c| char_to_cp1251(c).unwrap_or(b'?')).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cp1251_roundtrip_of_cyrillic() {
        let text = "Скважина №12; Глубина;Зенит;Азимут Ёё";
        let bytes = encode(text, TextEncoding::Windows1251);
        assert!(std::str::from_utf8(&bytes).is_err());
        let guess = detect_encoding(&bytes);
        assert_eq!(guess.encoding, TextEncoding::Windows1251);
        assert!(guess.confidence > 0.9);
        assert_eq!(decode(&bytes, TextEncoding::Windows1251), text);
    }

    #[test]
    fn test_utf8_with_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("Глубина;Зенит".as_bytes());
        let (text, guess) = decode_auto(&bytes);
        assert!(guess.bom);
        assert_eq!(text, "Глубина;Зенит");
    }

    #[test]
    fn test_unmappable_characters() {
        assert_eq!(encode("a→b", TextEncoding::Windows1251), b"a?b".to_vec());
    }

    #[test]
    fn test_encoding_names() {
        assert_eq!("CP1251".parse::<TextEncoding>().unwrap(), TextEncoding::Windows1251);
        assert_eq!(TextEncoding::Utf8.to_string(), "utf-8");
        assert!("latin1".parse::<TextEncoding>().is_err());
    }
}
