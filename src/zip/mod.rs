//! Minimal zip container codec with byte-level fidelity.
//!
//! This is not a general-purpose zip library: it implements exactly what
//! container transformation needs. The reader exposes both the raw stored
//! form of every entry (so unchanged entries can be copied without
//! recompression) and an inflated view for entries an action wants to
//! rewrite. The writer can splice raw entries back out byte-for-byte,
//! preserving compression method, flags, timestamps, and extra fields.
//!
//! Unsupported corners (zip64, multi-volume, encryption) fail with
//! structured errors; entries using exotic compression methods can still be
//! raw-copied, they just cannot be rewritten.

mod encoding;
mod reader;
mod writer;

pub use encoding::NameEncoding;
pub use reader::{ZipEntry, ZipReader};
pub use writer::ZipWriter;

use std::io::{Read, Write};

use crate::Result;

/// Local file header signature (`PK\x03\x04`).
pub(crate) const LOCAL_HEADER_SIG: u32 = 0x0403_4b50;
/// Central directory file header signature (`PK\x01\x02`).
pub(crate) const CENTRAL_HEADER_SIG: u32 = 0x0201_4b50;
/// End of central directory signature (`PK\x05\x06`).
pub(crate) const EOCD_SIG: u32 = 0x0605_4b50;

/// Compression method: stored (no compression).
pub const METHOD_STORED: u16 = 0;
/// Compression method: deflate.
pub const METHOD_DEFLATED: u16 = 8;

/// General-purpose flag bit 3: sizes and CRC follow the data in a
/// descriptor record.
pub(crate) const FLAG_DATA_DESCRIPTOR: u16 = 1 << 3;
/// General-purpose flag bit 11: the entry name is UTF-8.
pub(crate) const FLAG_UTF8: u16 = 1 << 11;

pub(crate) fn read_u16(reader: &mut impl Read) -> Result<u16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

pub(crate) fn read_u32(reader: &mut impl Read) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub(crate) fn write_u16(writer: &mut impl Write, value: u16) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub(crate) fn write_u32(writer: &mut impl Write, value: u32) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trip_through_writer_and_reader() {
        let mut buf = Cursor::new(Vec::new());
        let mut writer = ZipWriter::new(&mut buf, NameEncoding::Utf8);
        writer
            .add_new("dir/hello.txt", b"hello zip", METHOD_DEFLATED)
            .unwrap();
        writer.add_new("empty.bin", b"", METHOD_STORED).unwrap();
        writer.finish().unwrap();

        let mut reader = ZipReader::new(Cursor::new(buf.into_inner()), NameEncoding::Utf8).unwrap();
        let names: Vec<String> = reader.entries().iter().map(|e| e.name.clone()).collect();
        assert_eq!(names, vec!["dir/hello.txt", "empty.bin"]);

        let entry = reader.entries()[0].clone();
        assert_eq!(entry.method, METHOD_DEFLATED);
        assert_eq!(reader.read_data(&entry).unwrap(), b"hello zip");

        let entry = reader.entries()[1].clone();
        assert_eq!(entry.method, METHOD_STORED);
        assert_eq!(reader.read_data(&entry).unwrap(), b"");
    }

    #[test]
    fn raw_copy_preserves_entry_bytes() {
        let mut buf = Cursor::new(Vec::new());
        let mut writer = ZipWriter::new(&mut buf, NameEncoding::Utf8);
        writer
            .add_new("a.txt", b"some deflatable content, repeated repeated", METHOD_DEFLATED)
            .unwrap();
        writer.finish().unwrap();

        let mut reader = ZipReader::new(Cursor::new(buf.into_inner()), NameEncoding::Utf8).unwrap();
        let entry = reader.entries()[0].clone();
        let (local_extra, raw) = reader.read_raw(&entry).unwrap();

        let mut out = Cursor::new(Vec::new());
        let mut writer = ZipWriter::new(&mut out, NameEncoding::Utf8);
        assert!(!writer.add_raw(&entry, &local_extra, &raw).unwrap());
        writer.finish().unwrap();

        let mut reread = ZipReader::new(Cursor::new(out.into_inner()), NameEncoding::Utf8).unwrap();
        let copied = reread.entries()[0].clone();
        assert_eq!(copied.name, entry.name);
        assert_eq!(copied.method, entry.method);
        assert_eq!(copied.crc32, entry.crc32);
        assert_eq!(copied.compressed_size, entry.compressed_size);
        let (_, raw_again) = reread.read_raw(&copied).unwrap();
        assert_eq!(raw_again, raw);
    }
}
