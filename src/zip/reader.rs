//! Zip archive reading: central directory parsing and entry access.

use std::io::{Read, Seek, SeekFrom};

use crate::{Error, Result};

use super::{
    CENTRAL_HEADER_SIG, EOCD_SIG, FLAG_UTF8, LOCAL_HEADER_SIG, METHOD_DEFLATED, METHOD_STORED,
    NameEncoding, read_u16, read_u32,
};

/// Maximum distance from end-of-file to the end-of-central-directory
/// record: the fixed 22-byte record plus a maximal comment.
const EOCD_SEARCH_LIMIT: u64 = 22 + u16::MAX as u64;

/// Metadata for one archive entry, taken from the central directory.
#[derive(Debug, Clone)]
pub struct ZipEntry {
    /// Decoded entry name with `/` separators.
    pub name: String,
    /// Compression method (0 = stored, 8 = deflated).
    pub method: u16,
    /// General-purpose flags as stored in the archive.
    pub flags: u16,
    /// CRC-32 of the uncompressed content.
    pub crc32: u32,
    /// Size of the stored (possibly compressed) data.
    pub compressed_size: u32,
    /// Size of the content after decompression.
    pub uncompressed_size: u32,
    /// DOS modification time.
    pub dos_time: u16,
    /// DOS modification date.
    pub dos_date: u16,
    pub(crate) raw_name: Vec<u8>,
    pub(crate) extra: Vec<u8>,
    pub(crate) comment: Vec<u8>,
    pub(crate) version_made_by: u16,
    pub(crate) version_needed: u16,
    pub(crate) internal_attributes: u16,
    pub(crate) external_attributes: u32,
    pub(crate) local_header_offset: u32,
}

impl ZipEntry {
    /// Returns true for directory placeholder entries.
    pub fn is_directory(&self) -> bool {
        self.name.ends_with('/')
    }
}

/// Reads a zip archive from any seekable byte source.
///
/// The central directory is parsed eagerly at construction; entry content is
/// read on demand. Entries are exposed in physical order (by local header
/// offset) so a transforming writer can reproduce the original layout.
pub struct ZipReader<R: Read + Seek> {
    inner: R,
    entries: Vec<ZipEntry>,
}

impl<R: Read + Seek> ZipReader<R> {
    /// Opens an archive and parses its central directory.
    ///
    /// `encoding` applies to entry names without the UTF-8 flag set.
    pub fn new(mut inner: R, encoding: NameEncoding) -> Result<Self> {
        let len = inner.seek(SeekFrom::End(0))?;
        let eocd = Self::find_eocd(&mut inner, len)?;

        let disk_number = u16::from_le_bytes([eocd[4], eocd[5]]);
        let cd_disk = u16::from_le_bytes([eocd[6], eocd[7]]);
        let total_entries = u16::from_le_bytes([eocd[10], eocd[11]]);
        let cd_size = u32::from_le_bytes([eocd[12], eocd[13], eocd[14], eocd[15]]);
        let cd_offset = u32::from_le_bytes([eocd[16], eocd[17], eocd[18], eocd[19]]);

        if disk_number != 0 || cd_disk != 0 {
            return Err(Error::UnsupportedFeature {
                feature: "multi-volume archive",
            });
        }
        if total_entries == u16::MAX || cd_size == u32::MAX || cd_offset == u32::MAX {
            return Err(Error::UnsupportedFeature { feature: "zip64" });
        }

        inner.seek(SeekFrom::Start(cd_offset as u64))?;
        let mut entries = Vec::with_capacity(total_entries as usize);
        for _ in 0..total_entries {
            entries.push(Self::read_central_record(&mut inner, encoding)?);
        }

        // Physical entry order must be preserved in output; the central
        // directory is not guaranteed to be in that order.
        entries.sort_by_key(|e| e.local_header_offset);

        Ok(Self { inner, entries })
    }

    /// Locates the end-of-central-directory record by scanning backwards
    /// from the end of the file.
    fn find_eocd(inner: &mut R, len: u64) -> Result<Vec<u8>> {
        let search_len = len.min(EOCD_SEARCH_LIMIT);
        let search_start = len - search_len;
        inner.seek(SeekFrom::Start(search_start))?;
        let mut tail = vec![0u8; search_len as usize];
        inner.read_exact(&mut tail)?;

        let sig = EOCD_SIG.to_le_bytes();
        let mut pos = tail.len().checked_sub(22);
        while let Some(i) = pos {
            if tail[i..i + 4] == sig {
                let comment_len =
                    u16::from_le_bytes([tail[i + 20], tail[i + 21]]) as usize;
                if i + 22 + comment_len == tail.len() {
                    return Ok(tail[i..i + 22].to_vec());
                }
            }
            pos = i.checked_sub(1);
        }

        Err(Error::CorruptArchive {
            offset: len,
            reason: "end of central directory record not found".into(),
        })
    }

    fn read_central_record(inner: &mut R, encoding: NameEncoding) -> Result<ZipEntry> {
        let offset = inner.stream_position()?;
        let sig = read_u32(inner)?;
        if sig != CENTRAL_HEADER_SIG {
            return Err(Error::CorruptArchive {
                offset,
                reason: format!("bad central directory signature {sig:#010x}"),
            });
        }

        let version_made_by = read_u16(inner)?;
        let version_needed = read_u16(inner)?;
        let flags = read_u16(inner)?;
        let method = read_u16(inner)?;
        let dos_time = read_u16(inner)?;
        let dos_date = read_u16(inner)?;
        let crc32 = read_u32(inner)?;
        let compressed_size = read_u32(inner)?;
        let uncompressed_size = read_u32(inner)?;
        let name_len = read_u16(inner)? as usize;
        let extra_len = read_u16(inner)? as usize;
        let comment_len = read_u16(inner)? as usize;
        let _disk_start = read_u16(inner)?;
        let internal_attributes = read_u16(inner)?;
        let external_attributes = read_u32(inner)?;
        let local_header_offset = read_u32(inner)?;

        if compressed_size == u32::MAX
            || uncompressed_size == u32::MAX
            || local_header_offset == u32::MAX
        {
            return Err(Error::UnsupportedFeature { feature: "zip64" });
        }

        let mut raw_name = vec![0u8; name_len];
        inner.read_exact(&mut raw_name)?;
        let mut extra = vec![0u8; extra_len];
        inner.read_exact(&mut extra)?;
        let mut comment = vec![0u8; comment_len];
        inner.read_exact(&mut comment)?;

        let name = encoding.decode(&raw_name, flags & FLAG_UTF8 != 0)?;

        Ok(ZipEntry {
            name,
            method,
            flags,
            crc32,
            compressed_size,
            uncompressed_size,
            dos_time,
            dos_date,
            raw_name,
            extra,
            comment,
            version_made_by,
            version_needed,
            internal_attributes,
            external_attributes,
            local_header_offset,
        })
    }

    /// Returns the entries in physical order.
    pub fn entries(&self) -> &[ZipEntry] {
        &self.entries
    }

    /// Reads an entry's stored form without decompressing: the local-header
    /// extra field plus the raw (possibly compressed) data bytes.
    pub fn read_raw(&mut self, entry: &ZipEntry) -> Result<(Vec<u8>, Vec<u8>)> {
        let offset = entry.local_header_offset as u64;
        self.inner.seek(SeekFrom::Start(offset))?;

        let sig = read_u32(&mut self.inner)?;
        if sig != LOCAL_HEADER_SIG {
            return Err(Error::CorruptArchive {
                offset,
                reason: format!("bad local header signature {sig:#010x}"),
            });
        }

        // Fixed local header fields after the signature; only the name and
        // extra lengths matter here, the rest is taken from the central
        // directory (local copies may be zeroed under the data-descriptor
        // flag).
        let mut fixed = [0u8; 26];
        self.inner.read_exact(&mut fixed)?;
        let name_len = u16::from_le_bytes([fixed[22], fixed[23]]) as i64;
        let extra_len = u16::from_le_bytes([fixed[24], fixed[25]]) as usize;

        self.inner.seek(SeekFrom::Current(name_len))?;
        let mut local_extra = vec![0u8; extra_len];
        self.inner.read_exact(&mut local_extra)?;

        let mut raw = vec![0u8; entry.compressed_size as usize];
        self.inner.read_exact(&mut raw)?;
        Ok((local_extra, raw))
    }

    /// Reads and decompresses an entry's content, verifying its CRC.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedFeature`] for compression methods other than
    /// stored/deflate (such entries can still be raw-copied), and
    /// [`Error::CorruptArchive`] for inflate failures or CRC mismatches.
    pub fn read_data(&mut self, entry: &ZipEntry) -> Result<Vec<u8>> {
        let (_, raw) = self.read_raw(entry)?;

        let data = match entry.method {
            METHOD_STORED => raw,
            METHOD_DEFLATED => {
                let mut decoder = flate2::read::DeflateDecoder::new(raw.as_slice());
                let mut data = Vec::with_capacity(entry.uncompressed_size as usize);
                decoder
                    .read_to_end(&mut data)
                    .map_err(|e| Error::CorruptArchive {
                        offset: entry.local_header_offset as u64,
                        reason: format!("inflate failed for '{}': {e}", entry.name),
                    })?;
                data
            }
            _ => {
                return Err(Error::UnsupportedFeature {
                    feature: "compression method",
                });
            }
        };

        let actual = crc32fast::hash(&data);
        if actual != entry.crc32 {
            return Err(Error::CorruptArchive {
                offset: entry.local_header_offset as u64,
                reason: format!(
                    "CRC mismatch for '{}': expected {:#010x}, got {actual:#010x}",
                    entry.name, entry.crc32
                ),
            });
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn rejects_non_archives() {
        let result = ZipReader::new(Cursor::new(b"not a zip file at all".to_vec()), NameEncoding::Utf8);
        assert!(matches!(result, Err(Error::CorruptArchive { .. })));
    }

    #[test]
    fn rejects_empty_input() {
        let result = ZipReader::new(Cursor::new(Vec::new()), NameEncoding::Utf8);
        assert!(result.is_err());
    }

    #[test]
    fn reads_empty_archive() {
        // A bare EOCD record with zero entries.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&EOCD_SIG.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 16]);
        bytes.extend_from_slice(&0u16.to_le_bytes());

        let reader = ZipReader::new(Cursor::new(bytes), NameEncoding::Utf8).unwrap();
        assert!(reader.entries().is_empty());
    }
}
