//! Minimal property list reader.
//!
//! Only top-level string values are needed: bundle identifiers and names from
//! `Info.plist`, and the owning identifier recorded in a sandbox container's
//! metadata file. XML property lists are matched with a regex; binary
//! (`bplist00`) property lists are decoded far enough to walk the top-level
//! dictionary.

use std::fs;

use camino::Utf8Path;
use regex::Regex;

use crate::error::PlistError;

const BINARY_MAGIC: &[u8] = b"bplist00";
const TRAILER_LEN: usize = 32;

/// Reads the string stored under `key` in the top-level dictionary.
///
/// Returns `Ok(None)` when the key is absent or holds a non-string value.
///
/// # Errors
///
/// Returns [`PlistError::Io`] if the file cannot be read and
/// [`PlistError::Malformed`] if a binary property list is corrupt.
pub fn read_string(path: &Utf8Path, key: &str) -> Result<Option<String>, PlistError> {
    let bytes = fs::read(path).map_err(|source| PlistError::Io {
        path: path.to_owned(),
        source,
    })?;

    if bytes.starts_with(BINARY_MAGIC) {
        return binary_string_value(&bytes, key).map_err(|reason| PlistError::Malformed {
            path: path.to_owned(),
            reason,
        });
    }

    let content = String::from_utf8_lossy(&bytes);
    Ok(xml_string_value(&content, key))
}

/// Extracts `<key>key</key><string>value</string>` from XML content.
#[must_use]
pub fn xml_string_value(content: &str, key: &str) -> Option<String> {
    let pattern = format!(
        r"<key>{}</key>\s*<string>([^<]*)</string>",
        regex::escape(key)
    );
    let regex = Regex::new(&pattern).ok()?;
    regex
        .captures(content)
        .and_then(|captures| captures.get(1))
        .map(|value| unescape_xml(value.as_str().trim()))
}

fn unescape_xml(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Layout values from the 32-byte binary plist trailer.
struct Trailer {
    offset_size: usize,
    ref_size: usize,
    object_count: usize,
    top_object: usize,
    offset_table: usize,
}

/// Looks up a string value in the top-level dictionary of a binary plist.
fn binary_string_value(bytes: &[u8], key: &str) -> Result<Option<String>, &'static str> {
    let trailer = read_trailer(bytes)?;
    let top = object_offset(bytes, &trailer, trailer.top_object)?;

    let marker = *bytes.get(top).ok_or("top object out of bounds")?;
    if marker >> 4 != 0xD {
        return Err("top object is not a dictionary");
    }
    let (count, refs_start) = object_length(bytes, top)?;

    // Key refs then value refs, each `ref_size` wide, must fit in the file
    let refs_len = count
        .checked_mul(2)
        .and_then(|refs| refs.checked_mul(trailer.ref_size))
        .ok_or("dictionary too large")?;
    if refs_len > bytes.len() {
        return Err("dictionary too large");
    }

    for index in 0..count {
        let key_ref_at = ref_position(refs_start, index, trailer.ref_size)?;
        let key_ref = read_uint(bytes, key_ref_at, trailer.ref_size)?;
        let key_offset = object_offset(bytes, &trailer, key_ref)?;
        if string_at(bytes, key_offset)?.as_deref() != Some(key) {
            continue;
        }

        let value_ref_at = ref_position(refs_start, count + index, trailer.ref_size)?;
        let value_ref = read_uint(bytes, value_ref_at, trailer.ref_size)?;
        let value_offset = object_offset(bytes, &trailer, value_ref)?;
        return string_at(bytes, value_offset);
    }

    Ok(None)
}

fn ref_position(refs_start: usize, slot: usize, ref_size: usize) -> Result<usize, &'static str> {
    slot.checked_mul(ref_size)
        .and_then(|delta| delta.checked_add(refs_start))
        .ok_or("object reference out of bounds")
}

fn read_trailer(bytes: &[u8]) -> Result<Trailer, &'static str> {
    if bytes.len() < BINARY_MAGIC.len() + TRAILER_LEN {
        return Err("truncated trailer");
    }
    let start = bytes.len() - TRAILER_LEN;
    let trailer = Trailer {
        offset_size: usize::from(bytes[start + 6]),
        ref_size: usize::from(bytes[start + 7]),
        object_count: read_uint(bytes, start + 8, 8)?,
        top_object: read_uint(bytes, start + 16, 8)?,
        offset_table: read_uint(bytes, start + 24, 8)?,
    };
    if !(1..=8).contains(&trailer.offset_size) || !(1..=8).contains(&trailer.ref_size) {
        return Err("invalid integer sizes in trailer");
    }
    Ok(trailer)
}

fn object_offset(bytes: &[u8], trailer: &Trailer, object: usize) -> Result<usize, &'static str> {
    if object >= trailer.object_count {
        return Err("object reference out of range");
    }
    let at = object
        .checked_mul(trailer.offset_size)
        .and_then(|delta| delta.checked_add(trailer.offset_table))
        .ok_or("offset table overflow")?;
    read_uint(bytes, at, trailer.offset_size)
}

/// Decodes the element count of the object at `at`.
///
/// Returns the count and the position where the object's payload begins.
fn object_length(bytes: &[u8], at: usize) -> Result<(usize, usize), &'static str> {
    let marker = *bytes.get(at).ok_or("object out of bounds")?;
    let info = usize::from(marker & 0x0F);
    if info != 0x0F {
        return Ok((info, at + 1));
    }

    let int_marker = *bytes.get(at + 1).ok_or("length marker out of bounds")?;
    if int_marker >> 4 != 0x1 {
        return Err("length is not an integer");
    }
    let width = 1usize << (int_marker & 0x0F);
    let count = read_uint(bytes, at + 2, width)?;
    Ok((count, at + 2 + width))
}

/// Reads an ASCII or UTF-16 string object. Other object types yield `None`.
fn string_at(bytes: &[u8], at: usize) -> Result<Option<String>, &'static str> {
    let marker = *bytes.get(at).ok_or("object out of bounds")?;
    match marker >> 4 {
        0x5 => {
            let (len, start) = object_length(bytes, at)?;
            let raw = bytes
                .get(start..start.saturating_add(len))
                .ok_or("string out of bounds")?;
            Ok(Some(String::from_utf8_lossy(raw).into_owned()))
        }
        0x6 => {
            let (len, start) = object_length(bytes, at)?;
            let raw = bytes
                .get(start..start.saturating_add(len.saturating_mul(2)))
                .ok_or("string out of bounds")?;
            let units: Vec<u16> = raw
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            Ok(Some(String::from_utf16_lossy(&units)))
        }
        _ => Ok(None),
    }
}

fn read_uint(bytes: &[u8], at: usize, width: usize) -> Result<usize, &'static str> {
    let raw = bytes
        .get(at..at.saturating_add(width))
        .filter(|raw| raw.len() == width && width <= 8)
        .ok_or("integer out of bounds")?;
    let value = raw
        .iter()
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));
    usize::try_from(value).map_err(|_| "integer too large")
}
