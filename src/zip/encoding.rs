//! Entry-name encodings for zip containers.
//!
//! Zip entry names carry no encoding declaration unless general-purpose flag
//! bit 11 is set (name is UTF-8). Archives authored by legacy tooling store
//! names in a platform code page instead; CP437 is the format's nominal
//! default and covers the archives this crate is asked to migrate. The
//! encoding setting affects only how entry names are decoded and re-encoded,
//! never the content-transformation logic.

use crate::{Error, Result};

/// CP437 code points for bytes `0x80..=0xFF`. Bytes below `0x80` map to
/// ASCII.
const CP437_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å', //
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ', //
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»', //
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐', //
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧', //
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀', //
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩', //
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{a0}',
];

/// How to interpret entry names whose UTF-8 flag is not set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameEncoding {
    /// Treat names as UTF-8 (modern tooling).
    #[default]
    Utf8,
    /// Treat names as CP437, the zip format's nominal default code page.
    Cp437,
}

impl NameEncoding {
    /// Decodes raw entry-name bytes.
    ///
    /// When `utf8_flag` is set the name is UTF-8 regardless of the
    /// configured encoding, per the zip specification.
    pub fn decode(&self, bytes: &[u8], utf8_flag: bool) -> Result<String> {
        if utf8_flag || *self == NameEncoding::Utf8 {
            return String::from_utf8(bytes.to_vec())
                .map_err(|_| Error::InvalidName(String::from_utf8_lossy(bytes).into_owned()));
        }

        Ok(bytes
            .iter()
            .map(|&b| {
                if b < 0x80 {
                    b as char
                } else {
                    CP437_HIGH[(b - 0x80) as usize]
                }
            })
            .collect())
    }

    /// Encodes an entry name back to bytes.
    ///
    /// Returns the bytes plus whether the writer must set the UTF-8 flag
    /// (only for UTF-8 names containing non-ASCII characters).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] for a CP437 target containing a
    /// character outside the code page.
    pub fn encode(&self, name: &str) -> Result<(Vec<u8>, bool)> {
        match self {
            NameEncoding::Utf8 => Ok((name.as_bytes().to_vec(), !name.is_ascii())),
            NameEncoding::Cp437 => {
                let mut bytes = Vec::with_capacity(name.len());
                for c in name.chars() {
                    if c.is_ascii() {
                        bytes.push(c as u8);
                    } else if let Some(pos) = CP437_HIGH.iter().position(|&t| t == c) {
                        bytes.push(0x80 + pos as u8);
                    } else {
                        return Err(Error::InvalidName(format!(
                            "'{name}' contains '{c}', which CP437 cannot represent"
                        )));
                    }
                }
                Ok((bytes, false))
            }
        }
    }
}
