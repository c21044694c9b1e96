//! Shared test utilities for integration tests.
//!
//! Archives are built here by hand, independently of the crate's own
//! writer. That keeps the round-trip honest and lets tests produce inputs
//! the writer refuses to create: duplicate entry names and entries with a
//! corrupt checksum.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test
//! file compiles as a separate crate and may only use a subset of these
//! helpers.

#![allow(dead_code)]

use std::io::{Cursor, Read};

use repkg::NameEncoding;
use repkg::zip::{METHOD_DEFLATED, METHOD_STORED, ZipReader};

/// One entry to place in a hand-built archive.
pub struct RawEntry<'a> {
    pub name: &'a str,
    pub data: &'a [u8],
    pub method: u16,
    /// Overrides the stored CRC-32 to fabricate a corrupt entry.
    pub bad_crc: bool,
}

impl<'a> RawEntry<'a> {
    pub fn stored(name: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            data,
            method: METHOD_STORED,
            bad_crc: false,
        }
    }

    pub fn deflated(name: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            data,
            method: METHOD_DEFLATED,
            bad_crc: false,
        }
    }

    pub fn corrupt(name: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            data,
            method: METHOD_DEFLATED,
            bad_crc: true,
        }
    }
}

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder =
        flate2::read::DeflateEncoder::new(data, flate2::Compression::default());
    let mut out = Vec::new();
    encoder.read_to_end(&mut out).unwrap();
    out
}

/// Builds a zip archive byte-by-byte, with no deduplication or validation.
pub fn build_archive(entries: &[RawEntry<'_>]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut central = Vec::new();

    for entry in entries {
        let compressed = match entry.method {
            METHOD_STORED => entry.data.to_vec(),
            METHOD_DEFLATED => deflate(entry.data),
            other => panic!("unsupported test method {other}"),
        };
        let crc = if entry.bad_crc {
            !crc32fast::hash(entry.data)
        } else {
            crc32fast::hash(entry.data)
        };
        let offset = out.len() as u32;
        let name = entry.name.as_bytes();

        // Local file header.
        push_u32(&mut out, 0x0403_4b50);
        push_u16(&mut out, 20); // version needed
        push_u16(&mut out, 0); // flags
        push_u16(&mut out, entry.method);
        push_u16(&mut out, 0x6000); // dos time
        push_u16(&mut out, 0x5991); // dos date
        push_u32(&mut out, crc);
        push_u32(&mut out, compressed.len() as u32);
        push_u32(&mut out, entry.data.len() as u32);
        push_u16(&mut out, name.len() as u16);
        push_u16(&mut out, 0); // extra length
        out.extend_from_slice(name);
        out.extend_from_slice(&compressed);

        // Matching central directory record.
        push_u32(&mut central, 0x0201_4b50);
        push_u16(&mut central, 20); // version made by
        push_u16(&mut central, 20); // version needed
        push_u16(&mut central, 0); // flags
        push_u16(&mut central, entry.method);
        push_u16(&mut central, 0x6000);
        push_u16(&mut central, 0x5991);
        push_u32(&mut central, crc);
        push_u32(&mut central, compressed.len() as u32);
        push_u32(&mut central, entry.data.len() as u32);
        push_u16(&mut central, name.len() as u16);
        push_u16(&mut central, 0); // extra length
        push_u16(&mut central, 0); // comment length
        push_u16(&mut central, 0); // disk number
        push_u16(&mut central, 0); // internal attributes
        push_u32(&mut central, 0); // external attributes
        push_u32(&mut central, offset);
        central.extend_from_slice(name);
    }

    let central_offset = out.len() as u32;
    out.extend_from_slice(&central);

    // End of central directory.
    push_u32(&mut out, 0x0605_4b50);
    push_u16(&mut out, 0); // disk number
    push_u16(&mut out, 0); // central directory disk
    push_u16(&mut out, entries.len() as u16);
    push_u16(&mut out, entries.len() as u16);
    push_u32(&mut out, central.len() as u32);
    push_u32(&mut out, central_offset);
    push_u16(&mut out, 0); // comment length

    out
}

/// Convenience builder: deflated entries from (name, data) pairs.
pub fn build_simple_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let raw: Vec<RawEntry<'_>> = entries
        .iter()
        .map(|(name, data)| RawEntry::deflated(name, data))
        .collect();
    build_archive(&raw)
}

/// Lists entry names in physical order.
pub fn list_names(archive: &[u8]) -> Vec<String> {
    let reader = ZipReader::new(Cursor::new(archive), NameEncoding::Utf8).unwrap();
    reader.entries().iter().map(|e| e.name.clone()).collect()
}

/// Reads the content of the last entry with the given name.
pub fn read_entry(archive: &[u8], name: &str) -> Vec<u8> {
    let mut reader = ZipReader::new(Cursor::new(archive), NameEncoding::Utf8).unwrap();
    let entry = reader
        .entries()
        .iter()
        .rev()
        .find(|e| e.name == name)
        .unwrap_or_else(|| panic!("no entry named '{name}'"))
        .clone();
    reader.read_data(&entry).unwrap()
}

/// Returns the compression method of the last entry with the given name.
pub fn entry_method(archive: &[u8], name: &str) -> u16 {
    let reader = ZipReader::new(Cursor::new(archive), NameEncoding::Utf8).unwrap();
    reader
        .entries()
        .iter()
        .rev()
        .find(|e| e.name == name)
        .unwrap_or_else(|| panic!("no entry named '{name}'"))
        .method
}
