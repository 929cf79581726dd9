//! .ct2 cassette image parser and half-wave expansion.
//!
//! The ROM records data on tape with frequency shift keying: a "1" bit
//! is a 1 ms cycle (two 0.5 ms half-cycles) and a "0" bit a 0.5 ms
//! cycle (two 0.25 ms half-cycles). A .ct2 file stores the byte stream
//! plus the two pilot-tone headers the loader syncs on.
//!
//! # File layout
//!
//! A 4-byte magic header, then a sequence of 4-byte chunk headers:
//!
//! - `CA` — pilot header A, no payload
//! - `CB` — sync header B, no payload
//! - `DA` + little-endian u16 length — followed by that many data bytes
//!
//! Unknown tags are skipped; a trailing partial header ends the file.
//!
//! # Half-wave expansion
//!
//! Playback works on a flat buffer of half-cycle durations in CPU
//! cycles. Each chunk expands to a fixed shape, so the buffer length is
//! `2*CA_CYCLES` per CA, `2*CB_CYCLES + 4` per CB and `16*N` per DA.

/// Full cycles in an "A" pilot header.
///
/// Public so a stubborn tape can be retimed by rebuilding the image;
/// 500 matches the loader in the system ROM.
pub const CA_CYCLES: usize = 500;

/// Full cycles in the body of a "B" sync header.
pub const CB_CYCLES: usize = 32;

/// One chunk of a .ct2 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// "CA" pilot tone.
    HeaderA,
    /// "CB" sync tone.
    HeaderB,
    /// "DA" payload bytes.
    Data(Vec<u8>),
}

/// A parsed .ct2 cassette image.
#[derive(Debug, Clone)]
pub struct Ct2File {
    pub chunks: Vec<Chunk>,
}

impl Ct2File {
    /// Parse a raw .ct2 image.
    pub fn parse(data: &[u8]) -> Result<Self, String> {
        if data.len() < 4 {
            return Err("truncated .ct2 image: missing magic header".into());
        }

        let mut chunks = Vec::new();
        let mut pos = 4;

        while pos + 4 <= data.len() {
            let tag = &data[pos..pos + 2];
            match tag {
                b"CA" => {
                    chunks.push(Chunk::HeaderA);
                    pos += 4;
                }
                b"CB" => {
                    chunks.push(Chunk::HeaderB);
                    pos += 4;
                }
                b"DA" => {
                    let len = u16::from_le_bytes([data[pos + 2], data[pos + 3]]) as usize;
                    pos += 4;
                    if pos + len > data.len() {
                        return Err(format!(
                            "truncated DA chunk: need {len} bytes, have {}",
                            data.len() - pos
                        ));
                    }
                    chunks.push(Chunk::Data(data[pos..pos + len].to_vec()));
                    pos += len;
                }
                _ => {
                    // Unknown tag: skip its header
                    pos += 4;
                }
            }
        }

        Ok(Self { chunks })
    }

    /// Length of the half-wave buffer this image expands to.
    #[must_use]
    pub fn wave_len(&self) -> usize {
        self.chunks
            .iter()
            .map(|chunk| match chunk {
                Chunk::HeaderA => CA_CYCLES * 2,
                Chunk::HeaderB => CB_CYCLES * 2 + 4,
                Chunk::Data(data) => data.len() * 16,
            })
            .sum()
    }

    /// Expand the image to per-half-cycle durations in CPU cycles.
    #[must_use]
    pub fn expand_wave(&self) -> Vec<u32> {
        let mut wave = Vec::with_capacity(self.wave_len());

        for chunk in &self.chunks {
            match chunk {
                Chunk::HeaderA => {
                    for _ in 0..CA_CYCLES {
                        wave.push(502);
                        wave.push(502);
                    }
                }
                Chunk::HeaderB => {
                    wave.push(464);
                    wave.push(679);
                    for _ in 0..CB_CYCLES {
                        wave.push(679);
                        wave.push(679);
                    }
                    wave.push(199);
                    wave.push(250);
                }
                Chunk::Data(data) => {
                    for &byte in data {
                        for bit in 0..8 {
                            let duration = if byte & (0x80 >> bit) != 0 { 500 } else { 250 };
                            wave.push(duration);
                            wave.push(duration);
                        }
                    }
                }
            }
        }

        wave
    }
}
