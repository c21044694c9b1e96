//! Zip archive writing with raw-entry splicing and last-wins duplicates.

use std::collections::HashMap;
use std::io::{Seek, Write};

use flate2::Compression;

use crate::{Error, Result};

use super::{
    CENTRAL_HEADER_SIG, EOCD_SIG, FLAG_DATA_DESCRIPTOR, FLAG_UTF8, LOCAL_HEADER_SIG,
    METHOD_DEFLATED, METHOD_STORED, NameEncoding, ZipEntry, write_u16, write_u32,
};

/// One pending central directory record.
struct CentralRecord {
    name: String,
    raw_name: Vec<u8>,
    flags: u16,
    method: u16,
    dos_time: u16,
    dos_date: u16,
    crc32: u32,
    compressed_size: u32,
    uncompressed_size: u32,
    extra: Vec<u8>,
    comment: Vec<u8>,
    version_made_by: u16,
    version_needed: u16,
    internal_attributes: u16,
    external_attributes: u32,
    local_header_offset: u32,
}

/// Writes a zip archive sequentially: local entries as they are added, the
/// central directory and end record on [`finish`](ZipWriter::finish).
///
/// Duplicate entry names are legal in the input corpus (some malformed wars
/// repeat names), so the writer does not error on them: a later entry at an
/// already-written name replaces the earlier central directory record.
/// The earlier local bytes are left orphaned, which readers ignore, and the
/// archive ends up with exactly one live entry at that name.
pub struct ZipWriter<W: Write + Seek> {
    inner: W,
    encoding: NameEncoding,
    central: Vec<CentralRecord>,
    index_by_name: HashMap<String, usize>,
}

impl<W: Write + Seek> ZipWriter<W> {
    /// Creates a writer over any seekable sink.
    pub fn new(inner: W, encoding: NameEncoding) -> Self {
        Self {
            inner,
            encoding,
            central: Vec::new(),
            index_by_name: HashMap::new(),
        }
    }

    /// Splices a source entry through unchanged: original raw data bytes,
    /// name bytes, method, CRC, sizes, timestamps, and extra fields.
    ///
    /// The data-descriptor flag is cleared because the sizes are written
    /// directly into the local header.
    ///
    /// Returns true if the name had already been written (duplicate,
    /// last-wins).
    pub fn add_raw(&mut self, entry: &ZipEntry, local_extra: &[u8], raw: &[u8]) -> Result<bool> {
        let flags = entry.flags & !FLAG_DATA_DESCRIPTOR;
        let record = CentralRecord {
            name: entry.name.clone(),
            raw_name: entry.raw_name.clone(),
            flags,
            method: entry.method,
            dos_time: entry.dos_time,
            dos_date: entry.dos_date,
            crc32: entry.crc32,
            compressed_size: entry.compressed_size,
            uncompressed_size: entry.uncompressed_size,
            extra: entry.extra.clone(),
            comment: entry.comment.clone(),
            version_made_by: entry.version_made_by,
            version_needed: entry.version_needed,
            internal_attributes: entry.internal_attributes,
            external_attributes: entry.external_attributes,
            local_header_offset: 0,
        };
        self.write_entry(record, local_extra, raw)
    }

    /// Writes transformed content in place of a source entry, keeping the
    /// source's compression method, timestamps, and attributes.
    ///
    /// Only entries whose content actually changed go through here; stored
    /// entries stay stored, everything else is re-deflated.
    pub fn add_transformed(&mut self, template: &ZipEntry, name: &str, data: &[u8]) -> Result<bool> {
        let (raw_name, needs_utf8) = self.encoding.encode(name)?;
        let mut flags = template.flags & !(FLAG_DATA_DESCRIPTOR | FLAG_UTF8);
        if needs_utf8 {
            flags |= FLAG_UTF8;
        }

        let method = if template.method == METHOD_STORED {
            METHOD_STORED
        } else {
            METHOD_DEFLATED
        };
        let compressed = compress(data, method)?;

        let record = CentralRecord {
            name: name.to_string(),
            raw_name,
            flags,
            method,
            dos_time: template.dos_time,
            dos_date: template.dos_date,
            crc32: crc32fast::hash(data),
            compressed_size: as_u32(compressed.len() as u64)?,
            uncompressed_size: as_u32(data.len() as u64)?,
            extra: Vec::new(),
            comment: Vec::new(),
            version_made_by: template.version_made_by,
            version_needed: 20,
            internal_attributes: template.internal_attributes,
            external_attributes: template.external_attributes,
            local_header_offset: 0,
        };
        self.write_entry(record, &[], &compressed)
    }

    /// Writes a brand-new entry with default metadata.
    pub fn add_new(&mut self, name: &str, data: &[u8], method: u16) -> Result<bool> {
        let (raw_name, needs_utf8) = self.encoding.encode(name)?;
        let flags = if needs_utf8 { FLAG_UTF8 } else { 0 };
        let compressed = compress(data, method)?;

        let record = CentralRecord {
            name: name.to_string(),
            raw_name,
            flags,
            method,
            dos_time: 0,
            dos_date: 0,
            crc32: crc32fast::hash(data),
            compressed_size: as_u32(compressed.len() as u64)?,
            uncompressed_size: as_u32(data.len() as u64)?,
            extra: Vec::new(),
            comment: Vec::new(),
            version_made_by: 20,
            version_needed: 20,
            internal_attributes: 0,
            external_attributes: 0,
            local_header_offset: 0,
        };
        self.write_entry(record, &[], &compressed)
    }

    fn write_entry(
        &mut self,
        mut record: CentralRecord,
        local_extra: &[u8],
        raw: &[u8],
    ) -> Result<bool> {
        record.local_header_offset = as_u32(self.inner.stream_position()?)?;

        write_u32(&mut self.inner, LOCAL_HEADER_SIG)?;
        write_u16(&mut self.inner, record.version_needed)?;
        write_u16(&mut self.inner, record.flags)?;
        write_u16(&mut self.inner, record.method)?;
        write_u16(&mut self.inner, record.dos_time)?;
        write_u16(&mut self.inner, record.dos_date)?;
        write_u32(&mut self.inner, record.crc32)?;
        write_u32(&mut self.inner, record.compressed_size)?;
        write_u32(&mut self.inner, record.uncompressed_size)?;
        write_u16(&mut self.inner, as_u16(record.raw_name.len())?)?;
        write_u16(&mut self.inner, as_u16(local_extra.len())?)?;
        self.inner.write_all(&record.raw_name)?;
        self.inner.write_all(local_extra)?;
        self.inner.write_all(raw)?;

        Ok(self.register(record))
    }

    /// Registers a central record, replacing any earlier record at the same
    /// name. Returns true when a replacement happened.
    fn register(&mut self, record: CentralRecord) -> bool {
        match self.index_by_name.get(&record.name) {
            Some(&index) => {
                self.central[index] = record;
                true
            }
            None => {
                self.index_by_name
                    .insert(record.name.clone(), self.central.len());
                self.central.push(record);
                false
            }
        }
    }

    /// Writes the central directory and end record, returning the sink.
    pub fn finish(mut self) -> Result<W> {
        let cd_offset = as_u32(self.inner.stream_position()?)?;

        for record in &self.central {
            write_u32(&mut self.inner, CENTRAL_HEADER_SIG)?;
            write_u16(&mut self.inner, record.version_made_by)?;
            write_u16(&mut self.inner, record.version_needed)?;
            write_u16(&mut self.inner, record.flags)?;
            write_u16(&mut self.inner, record.method)?;
            write_u16(&mut self.inner, record.dos_time)?;
            write_u16(&mut self.inner, record.dos_date)?;
            write_u32(&mut self.inner, record.crc32)?;
            write_u32(&mut self.inner, record.compressed_size)?;
            write_u32(&mut self.inner, record.uncompressed_size)?;
            write_u16(&mut self.inner, as_u16(record.raw_name.len())?)?;
            write_u16(&mut self.inner, as_u16(record.extra.len())?)?;
            write_u16(&mut self.inner, as_u16(record.comment.len())?)?;
            write_u16(&mut self.inner, 0)?; // disk number start
            write_u16(&mut self.inner, record.internal_attributes)?;
            write_u32(&mut self.inner, record.external_attributes)?;
            write_u32(&mut self.inner, record.local_header_offset)?;
            self.inner.write_all(&record.raw_name)?;
            self.inner.write_all(&record.extra)?;
            self.inner.write_all(&record.comment)?;
        }

        let cd_end = as_u32(self.inner.stream_position()?)?;
        let entry_count = as_u16(self.central.len())?;

        write_u32(&mut self.inner, EOCD_SIG)?;
        write_u16(&mut self.inner, 0)?; // this disk
        write_u16(&mut self.inner, 0)?; // central directory disk
        write_u16(&mut self.inner, entry_count)?;
        write_u16(&mut self.inner, entry_count)?;
        write_u32(&mut self.inner, cd_end - cd_offset)?;
        write_u32(&mut self.inner, cd_offset)?;
        write_u16(&mut self.inner, 0)?; // comment length

        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Compresses content for the given method (stored or deflate).
fn compress(data: &[u8], method: u16) -> Result<Vec<u8>> {
    match method {
        METHOD_STORED => Ok(data.to_vec()),
        METHOD_DEFLATED => {
            let mut encoder =
                flate2::write::DeflateEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data)?;
            Ok(encoder.finish()?)
        }
        _ => Err(Error::UnsupportedFeature {
            feature: "compression method",
        }),
    }
}

fn as_u32(value: u64) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::UnsupportedFeature { feature: "zip64" })
}

fn as_u16(value: usize) -> Result<u16> {
    u16::try_from(value).map_err(|_| Error::UnsupportedFeature { feature: "zip64" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zip::ZipReader;
    use std::io::Cursor;

    #[test]
    fn oversized_offsets_are_rejected_on_every_target() {
        // Positions past the 32-bit range need zip64, which is unsupported;
        // the u64 position must be range-checked without truncation.
        assert!(as_u32(u32::MAX as u64).is_ok());
        assert!(matches!(
            as_u32(u32::MAX as u64 + 1),
            Err(Error::UnsupportedFeature { feature: "zip64" })
        ));
        assert!(matches!(
            as_u32(u64::MAX),
            Err(Error::UnsupportedFeature { feature: "zip64" })
        ));
    }

    #[test]
    fn duplicate_names_keep_the_later_entry() {
        let mut buf = Cursor::new(Vec::new());
        let mut writer = ZipWriter::new(&mut buf, NameEncoding::Utf8);
        assert!(!writer.add_new("a.txt", b"first", METHOD_STORED).unwrap());
        assert!(writer.add_new("a.txt", b"second", METHOD_STORED).unwrap());
        writer.finish().unwrap();

        let mut reader = ZipReader::new(Cursor::new(buf.into_inner()), NameEncoding::Utf8).unwrap();
        assert_eq!(reader.entries().len(), 1);
        let entry = reader.entries()[0].clone();
        assert_eq!(reader.read_data(&entry).unwrap(), b"second");
    }

    #[test]
    fn stored_method_is_kept_for_transformed_entries() {
        let mut buf = Cursor::new(Vec::new());
        let mut writer = ZipWriter::new(&mut buf, NameEncoding::Utf8);
        writer.add_new("s.txt", b"stored stays stored", METHOD_STORED).unwrap();
        writer.finish().unwrap();

        let mut reader = ZipReader::new(Cursor::new(buf.into_inner()), NameEncoding::Utf8).unwrap();
        let template = reader.entries()[0].clone();

        let mut out = Cursor::new(Vec::new());
        let mut writer = ZipWriter::new(&mut out, NameEncoding::Utf8);
        writer.add_transformed(&template, "s.txt", b"rewritten").unwrap();
        writer.finish().unwrap();

        let mut reread = ZipReader::new(Cursor::new(out.into_inner()), NameEncoding::Utf8).unwrap();
        let entry = reread.entries()[0].clone();
        assert_eq!(entry.method, METHOD_STORED);
        assert_eq!(reread.read_data(&entry).unwrap(), b"rewritten");
    }
}
