use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest incomplete prefix of a UTF-8 sequence (lead byte of a 4-byte
/// sequence plus two continuation bytes)
pub const MAX_CARRY_OVER: usize = 3;

/// How definitively invalid bytes are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecodeMode {
    /// Substitute U+FFFD and keep going
    #[default]
    Lossy,
    /// Report the malformed bytes as an error
    Strict,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed UTF-8 sequence {bytes:02X?}")]
pub struct MalformedSequence {
    pub bytes: Vec<u8>,
}

/// Streaming UTF-8 decoder that survives chunk boundaries.
///
/// A multi-byte code point split across two reads is held back as
/// carry-over until the rest arrives, so the concatenated output of all
/// `decode` calls plus the final `flush` matches decoding the whole stream
/// at once.
///
/// Malformed input in lossy mode becomes U+FFFD, one per maximal invalid
/// subsequence, which is the rule `String::from_utf8_lossy` applies. Since
/// carry-over is re-decoded together with the bytes that follow it, a
/// malformed run that straddles a chunk boundary gets the same replacements
/// it would in a single pass. Only strict mode diverges: it stops at the
/// first malformed run and discards the rest of that chunk.
///
/// ```
/// use decoders::Utf8StreamDecoder;
///
/// let mut decoder = Utf8StreamDecoder::new();
/// assert_eq!(decoder.decode(&[0xE3, 0x81]).unwrap(), "");
/// assert_eq!(decoder.decode(&[0x82]).unwrap(), "あ");
/// ```
#[derive(Debug, Default, Clone)]
pub struct Utf8StreamDecoder {
    mode: DecodeMode,
    carry: Vec<u8>,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: DecodeMode) -> Self {
        Self {
            mode,
            carry: Vec::with_capacity(MAX_CARRY_OVER),
        }
    }

    pub fn mode(&self) -> DecodeMode {
        self.mode
    }

    /// Bytes currently withheld as an incomplete code point
    pub fn pending(&self) -> &[u8] {
        &self.carry
    }

    /// Decode one chunk, prepending any carry-over from the previous call.
    ///
    /// In lossy mode this never fails. In strict mode the carry-over is
    /// discarded along with the rest of the chunk when an error is returned.
    pub fn decode(&mut self, chunk: &[u8]) -> Result<String, MalformedSequence> {
        let joined;
        let input: &[u8] = if self.carry.is_empty() {
            chunk
        } else {
            let mut buf = std::mem::take(&mut self.carry);
            buf.extend_from_slice(chunk);
            joined = buf;
            &joined
        };

        let mut out = String::with_capacity(input.len());
        let mut pieces = input.utf8_chunks().peekable();

        while let Some(piece) = pieces.next() {
            out.push_str(piece.valid());

            let invalid = piece.invalid();
            if invalid.is_empty() {
                continue;
            }

            if pieces.peek().is_none() && is_incomplete_prefix(invalid) {
                self.carry.extend_from_slice(invalid);
                break;
            }

            match self.mode {
                DecodeMode::Lossy => out.push(char::REPLACEMENT_CHARACTER),
                DecodeMode::Strict => {
                    self.carry.clear();
                    return Err(MalformedSequence {
                        bytes: invalid.to_vec(),
                    });
                }
            }
        }

        Ok(out)
    }

    /// Release any carry-over at end of stream.
    ///
    /// A dangling prefix becomes a single U+FFFD in lossy mode. With no
    /// carry-over this returns an empty string, so calling it twice is safe.
    pub fn flush(&mut self) -> Result<String, MalformedSequence> {
        if self.carry.is_empty() {
            return Ok(String::new());
        }

        let dangling = std::mem::take(&mut self.carry);
        match self.mode {
            DecodeMode::Lossy => Ok(String::from_utf8_lossy(&dangling).into_owned()),
            DecodeMode::Strict => Err(MalformedSequence { bytes: dangling }),
        }
    }

    /// Drop carry-over without emitting anything
    pub fn reset(&mut self) {
        self.carry.clear();
    }
}

/// True when `bytes` could still become a valid code point with more input
fn is_incomplete_prefix(bytes: &[u8]) -> bool {
    if bytes.len() > MAX_CARRY_OVER {
        return false;
    }
    match std::str::from_utf8(bytes) {
        Ok(_) => false,
        Err(e) => e.valid_up_to() == 0 && e.error_len().is_none(),
    }
}
