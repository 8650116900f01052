//! content-defined chunking
//!
//! a Gear rolling hash decides chunk boundaries, so a small edit shifts only
//! the blocks around it. parameters and the gear table are frozen: two
//! repositories chunking the same bytes must produce identical block
//! sequences, or deduplication and repair both break.

use std::io::Read;

use crate::hash::BlockHash;
use crate::types::BlockRef;

/// no split before this many bytes
pub const MIN_CHUNK: usize = 2 * 1024 * 1024;
/// forced split at this many bytes
pub const MAX_CHUNK: usize = 8 * 1024 * 1024;
/// boundary condition: rolling hash divisible by this
pub const SPLIT_MOD: u32 = 4096;

/// gear table entry for byte value `i`
///
/// splitmix32-style finalizer over the byte value. this exact sequence is
/// part of the on-disk format: changing it changes every block hash.
const fn gear_entry(i: u32) -> u32 {
    let mut z = i.wrapping_mul(0x9e37_79b9).wrapping_add(0x6a09_e667);
    z = (z ^ (z >> 16)).wrapping_mul(0x21f0_aaad);
    z = (z ^ (z >> 15)).wrapping_mul(0x735a_2d97);
    z ^ (z >> 15)
}

/// the 256-entry gear table, generated at compile time
static GEAR: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = gear_entry(i as u32);
        i += 1;
    }
    table
};

/// split a byte stream into content-defined blocks
///
/// per byte: `rh = (rh << 1) + GEAR[byte]`. a block ends when
/// `len >= MIN_CHUNK && rh % SPLIT_MOD == 0`, or unconditionally at
/// `MAX_CHUNK`. trailing bytes form a final block. offsets are contiguous
/// and cover the input exactly.
pub fn split_reader<R: Read>(reader: &mut R) -> std::io::Result<Vec<BlockRef>> {
    let mut refs = Vec::new();
    let mut chunk: Vec<u8> = Vec::with_capacity(MAX_CHUNK);
    let mut rh: u32 = 0;
    let mut offset: u64 = 0;
    let mut buf = [0u8; 64 * 1024];

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        for &byte in &buf[..n] {
            chunk.push(byte);
            rh = (rh << 1).wrapping_add(GEAR[byte as usize]);
            let len = chunk.len();
            if (len >= MIN_CHUNK && rh % SPLIT_MOD == 0) || len == MAX_CHUNK {
                refs.push(emit(&mut chunk, &mut offset));
                rh = 0;
            }
        }
    }

    if !chunk.is_empty() {
        refs.push(emit(&mut chunk, &mut offset));
    }

    Ok(refs)
}

/// split an in-memory buffer
pub fn split_bytes(data: &[u8]) -> Vec<BlockRef> {
    let mut cursor = data;
    // reading from a slice cannot fail
    split_reader(&mut cursor).expect("in-memory read")
}

fn emit(chunk: &mut Vec<u8>, offset: &mut u64) -> BlockRef {
    let size = chunk.len() as u64;
    let hash = BlockHash::of(chunk);
    let block = BlockRef {
        hash,
        size,
        offset: *offset,
    };
    *offset += size;
    chunk.clear();
    block
}

#[cfg(test)]
mod tests {
    use super::*;

    // deterministic pseudo-random bytes so boundaries fall naturally
    fn noise(len: usize, seed: u64) -> Vec<u8> {
        let mut state = seed;
        (0..len)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                (state >> 33) as u8
            })
            .collect()
    }

    fn assert_cover(data: &[u8], refs: &[BlockRef]) {
        let mut expected_offset = 0u64;
        for r in refs {
            assert_eq!(r.offset, expected_offset);
            assert!(r.size > 0);
            let lo = r.offset as usize;
            let hi = lo + r.size as usize;
            assert_eq!(r.hash, BlockHash::of(&data[lo..hi]));
            expected_offset = hi as u64;
        }
        assert_eq!(expected_offset, data.len() as u64);
    }

    #[test]
    fn test_empty_input_no_blocks() {
        assert!(split_bytes(b"").is_empty());
    }

    #[test]
    fn test_small_input_single_block() {
        let refs = split_bytes(b"hello");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].offset, 0);
        assert_eq!(refs[0].size, 5);
        assert_eq!(refs[0].hash, BlockHash::of(b"hello"));
    }

    #[test]
    fn test_chunks_cover_input_exactly() {
        let data = noise(18 * 1024 * 1024, 7);
        let refs = split_bytes(&data);
        assert!(refs.len() >= 3, "18 MiB must split at least at MAX_CHUNK");
        assert_cover(&data, &refs);
    }

    #[test]
    fn test_chunk_size_bounds() {
        let data = noise(20 * 1024 * 1024, 42);
        let refs = split_bytes(&data);
        for r in &refs[..refs.len() - 1] {
            assert!(r.size as usize >= MIN_CHUNK);
            assert!(r.size as usize <= MAX_CHUNK);
        }
        assert!(refs.last().unwrap().size as usize <= MAX_CHUNK);
    }

    #[test]
    fn test_deterministic() {
        let data = noise(12 * 1024 * 1024, 99);
        let a = split_bytes(&data);
        let b = split_bytes(&data);
        assert_eq!(a, b);
    }

    #[test]
    fn test_streaming_matches_oneshot() {
        let data = noise(9 * 1024 * 1024, 3);
        // feed through a reader that returns small odd-sized reads
        struct Dribble<'a>(&'a [u8]);
        impl Read for Dribble<'_> {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                let n = self.0.len().min(buf.len()).min(4097);
                buf[..n].copy_from_slice(&self.0[..n]);
                self.0 = &self.0[n..];
                Ok(n)
            }
        }
        let streamed = split_reader(&mut Dribble(&data)).unwrap();
        assert_eq!(streamed, split_bytes(&data));
    }

    #[test]
    fn test_local_edit_shifts_few_blocks() {
        let mut data = noise(16 * 1024 * 1024, 11);
        let before = split_bytes(&data);
        data[0] ^= 0xff;
        let after = split_bytes(&data);
        // only a prefix of blocks may differ; the tail resynchronizes
        let unchanged = before
            .iter()
            .filter(|b| after.iter().any(|a| a.hash == b.hash && a.size == b.size))
            .count();
        assert!(unchanged > 0, "an edit at offset 0 must not rewrite every block");
    }

    #[test]
    fn test_gear_table_frozen() {
        // literal values pin the table; if these change, the on-disk format changed
        assert_eq!(GEAR[0], 0xefaa_c93f);
        assert_eq!(GEAR[1], 0x66e2_8642);
        assert_eq!(GEAR[2], 0xef37_b339);
        assert_eq!(GEAR[128], 0xd328_66e1);
        assert_eq!(GEAR[255], 0x0628_d257);
        let sum = GEAR.iter().fold(0u64, |acc, &v| acc.wrapping_add(v as u64));
        assert_eq!(sum, 0x82_ada7_74e1);

        let mut distinct = std::collections::HashSet::new();
        for v in GEAR.iter() {
            distinct.insert(*v);
        }
        assert!(distinct.len() > 250, "gear table must be well mixed");
    }
}
