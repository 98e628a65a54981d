//! Chunk-payload decoding: heightmaps prefix probing, section streams, and
//! bit-packed paletted containers.

use thiserror::Error;
use tracing::trace;

use wayfarer_proto::{nbt, VarInt};

use crate::chunk::{DecodedSection, BIOME_VOLUME, SECTION_COUNT, SECTION_VOLUME};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("chunk body truncated at offset {0}")]
    Truncated(usize),

    #[error("bad varint at offset {0}")]
    BadVarint(usize),

    #[error("no heightmaps strategy matched")]
    NoPrefixStrategy,

    #[error("bad paletted container: {0}")]
    BadContainer(String),
}

fn read_varint(data: &[u8], pos: &mut usize) -> Result<i32, DecodeError> {
    let (value, consumed) =
        VarInt::decode(&data[*pos..]).map_err(|_| DecodeError::BadVarint(*pos))?;
    *pos += consumed;
    Ok(value.0)
}

fn read_i16(data: &[u8], pos: &mut usize) -> Result<i16, DecodeError> {
    if *pos + 2 > data.len() {
        return Err(DecodeError::Truncated(*pos));
    }
    let v = i16::from_be_bytes([data[*pos], data[*pos + 1]]);
    *pos += 2;
    Ok(v)
}

fn read_u8(data: &[u8], pos: &mut usize) -> Result<u8, DecodeError> {
    if *pos >= data.len() {
        return Err(DecodeError::Truncated(*pos));
    }
    let v = data[*pos];
    *pos += 1;
    Ok(v)
}

// ---------------------------------------------------------------------------
// Heightmaps prefix probe
// ---------------------------------------------------------------------------

/// How the heightmaps block at the start of a chunk body is packaged varies
/// between upstream packagings; probe the known layouts in order and accept
/// the first whose continuation (the section-data size varint plus that many
/// bytes) also lands inside the body.
fn probe_section_data(body: &[u8]) -> Result<(usize, usize), DecodeError> {
    let strategies: [fn(&[u8]) -> Option<usize>; 3] = [
        |b| nbt::skip_named_root(b).ok(),
        |b| nbt::skip_nameless_root(b).ok(),
        |b| {
            let mut pos = 0;
            let len = read_varint(b, &mut pos).ok()?;
            if len < 0 {
                return None;
            }
            let end = pos.checked_add(len as usize)?;
            (end <= b.len()).then_some(end)
        },
    ];

    for (i, strategy) in strategies.iter().enumerate() {
        let Some(mut pos) = strategy(body) else {
            continue;
        };
        let Ok(data_len) = read_varint(body, &mut pos) else {
            continue;
        };
        if data_len < 0 {
            continue;
        }
        let data_len = data_len as usize;
        if pos + data_len <= body.len() {
            trace!(strategy = i, data_len, "heightmaps prefix matched");
            return Ok((pos, data_len));
        }
    }
    Err(DecodeError::NoPrefixStrategy)
}

// ---------------------------------------------------------------------------
// Paletted containers
// ---------------------------------------------------------------------------

/// Decode one paletted container holding `expected` entries.
pub fn decode_container(
    data: &[u8],
    pos: &mut usize,
    expected: usize,
) -> Result<Vec<u32>, DecodeError> {
    let bits_per_entry = read_u8(data, pos)?;

    if bits_per_entry == 0 {
        // Single-value: one id fills the whole container; the data-longs
        // count must be zero.
        let value = read_varint(data, pos)?;
        if value < 0 {
            return Err(DecodeError::BadContainer(format!(
                "negative single value {value}"
            )));
        }
        let data_longs = read_varint(data, pos)?;
        if data_longs != 0 {
            return Err(DecodeError::BadContainer(format!(
                "single-value container with {data_longs} data longs"
            )));
        }
        return Ok(vec![value as u32; expected]);
    }

    let palette: Option<Vec<u32>> = if bits_per_entry <= 8 {
        let palette_len = read_varint(data, pos)?;
        if palette_len < 0 {
            return Err(DecodeError::BadContainer(format!(
                "negative palette length {palette_len}"
            )));
        }
        let mut palette = Vec::with_capacity(palette_len as usize);
        for _ in 0..palette_len {
            let id = read_varint(data, pos)?;
            palette.push(id.max(0) as u32);
        }
        Some(palette)
    } else {
        // Direct: entries are raw state ids.
        None
    };

    let long_count = read_varint(data, pos)?;
    if long_count < 0 {
        return Err(DecodeError::BadContainer(format!(
            "negative long count {long_count}"
        )));
    }
    let long_count = long_count as usize;
    if *pos + long_count * 8 > data.len() {
        return Err(DecodeError::Truncated(*pos));
    }

    if bits_per_entry > 32 {
        return Err(DecodeError::BadContainer(format!(
            "unsupported entry width {bits_per_entry}"
        )));
    }
    let entries_per_word = 64 / bits_per_entry as usize;
    let words_needed = expected.div_ceil(entries_per_word);
    if long_count < words_needed {
        return Err(DecodeError::BadContainer(format!(
            "{long_count} data longs cannot hold {expected} entries at {bits_per_entry} bits"
        )));
    }

    let mask = (1u64 << bits_per_entry) - 1;
    let mut out = Vec::with_capacity(expected);
    'words: for word_idx in 0..long_count {
        let offset = *pos + word_idx * 8;
        let mut word_bytes = [0u8; 8];
        word_bytes.copy_from_slice(&data[offset..offset + 8]);
        let word = u64::from_be_bytes(word_bytes);
        for slot in 0..entries_per_word {
            if out.len() == expected {
                break 'words;
            }
            let raw = (word >> (bits_per_entry as u64 * slot as u64)) & mask;
            let id = match &palette {
                // Out-of-range palette indices map to air.
                Some(palette) => palette.get(raw as usize).copied().unwrap_or(0),
                None => raw as u32,
            };
            out.push(id);
        }
    }
    *pos += long_count * 8;

    if out.len() < expected {
        return Err(DecodeError::BadContainer(format!(
            "container produced {} of {expected} entries",
            out.len()
        )));
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Decode the full chunk body (heightmaps + section data; block entities and
/// lighting trailers are ignored).
pub fn decode_chunk_body(body: &[u8]) -> Result<Vec<DecodedSection>, DecodeError> {
    let (data_start, data_len) = probe_section_data(body)?;
    let data = &body[data_start..data_start + data_len];

    let mut sections = Vec::new();
    let mut pos = 0;
    while pos < data.len() && sections.len() < SECTION_COUNT {
        let block_count = read_i16(data, &mut pos)?;
        let states = decode_container(data, &mut pos, SECTION_VOLUME)?;
        let biomes = decode_container(data, &mut pos, BIOME_VOLUME)?;
        sections.push(DecodedSection {
            block_count,
            states,
            biomes,
        });
    }
    Ok(sections)
}

// ===========================================================================
// Tests
// ===========================================================================
