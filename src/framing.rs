//! Headset protocol framing logic.
//!
//! Each frame is laid out as:
//!
//! ```text
//! [0x5A 0xB1] [type] [msg_id: u32 le] [len: u16 le] [payload; len] [crc: u16 le]
//! ```
//!
//! The message ID is 0 on pure sensor-stream frames. The CRC is
//! CRC-16/CCITT-FALSE over everything between the magic pair and the
//! trailer. [`FrameDecoder`] buffers incoming transport chunks and extracts
//! complete frames; on corruption (bad magic, oversized length, CRC
//! mismatch) it drops bytes up to the next occurrence of the magic pair and
//! reports how much was discarded. A corrupt region is never reinterpreted
//! as a different message: the frame that failed its check is gone for good.

use bytes::{Buf, Bytes, BytesMut};
use log::{trace, warn};

use crate::error::CoreError;

pub const FRAME_MAGIC: [u8; 2] = [0x5A, 0xB1];
pub const FRAME_HEADER_SIZE: usize = 9;
pub const FRAME_CRC_SIZE: usize = 2;
/// Declared payload lengths above this are treated as corruption rather
/// than allowed to stall the buffer waiting for bytes that never come.
pub const MAX_PAYLOAD_LEN: usize = 4096;

/// One complete decoded protocol frame. Only ever produced whole; partial
/// byte ranges never escape the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub msg_type: u8,
    pub msg_id: u32,
    pub payload: Bytes,
}

/// CRC-16/CCITT-FALSE, bitwise.
pub(crate) fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Encodes a payload into a complete frame ready for the transport.
pub fn encode_frame(msg_type: u8, msg_id: u32, payload: &[u8]) -> Result<Vec<u8>, CoreError> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(CoreError::InvalidParameter("payload exceeds maximum frame size"));
    }
    let mut data = Vec::with_capacity(FRAME_HEADER_SIZE + payload.len() + FRAME_CRC_SIZE);
    data.extend_from_slice(&FRAME_MAGIC);
    data.push(msg_type);
    data.extend_from_slice(&msg_id.to_le_bytes());
    data.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    data.extend_from_slice(payload);
    let crc = crc16(&data[FRAME_MAGIC.len()..]);
    data.extend_from_slice(&crc.to_le_bytes());
    Ok(data)
}

/// A frame decoder that buffers incoming data and extracts complete frames.
///
/// One instance per device; the buffer is never shared across devices.
pub struct FrameDecoder {
    buffer: BytesMut,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self { buffer: BytesMut::new() }
    }

    /// Number of bytes buffered and awaiting more data.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Appends newly received transport bytes. The slice is copied; the
    /// caller keeps ownership.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Discards all buffered bytes (disconnect/reset).
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Attempts to extract the next complete frame from the front of the
    /// buffer.
    ///
    /// Returns `Ok(None)` when the buffered bytes are insufficient to
    /// complete a frame. On corruption the buffer has already been
    /// resynced to the next plausible frame start when the error returns;
    /// the following call picks up from there.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, CoreError> {
        if self.buffer.is_empty() {
            return Ok(None);
        }

        if self.buffer[0] != FRAME_MAGIC[0]
            || (self.buffer.len() >= 2 && self.buffer[1] != FRAME_MAGIC[1])
        {
            return Err(self.resync("bad frame magic"));
        }

        if self.buffer.len() < FRAME_HEADER_SIZE {
            return Ok(None);
        }

        let payload_len = u16::from_le_bytes([self.buffer[7], self.buffer[8]]) as usize;
        if payload_len > MAX_PAYLOAD_LEN {
            return Err(self.resync("oversized payload length"));
        }

        let total = FRAME_HEADER_SIZE + payload_len + FRAME_CRC_SIZE;
        if self.buffer.len() < total {
            return Ok(None);
        }

        let crc_offset = FRAME_HEADER_SIZE + payload_len;
        let declared = u16::from_le_bytes([self.buffer[crc_offset], self.buffer[crc_offset + 1]]);
        let actual = crc16(&self.buffer[FRAME_MAGIC.len()..crc_offset]);
        if declared != actual {
            return Err(self.resync("CRC mismatch"));
        }

        let msg_type = self.buffer[2];
        let msg_id = u32::from_le_bytes([
            self.buffer[3],
            self.buffer[4],
            self.buffer[5],
            self.buffer[6],
        ]);
        self.buffer.advance(FRAME_HEADER_SIZE);
        let payload = self.buffer.split_to(payload_len).freeze();
        self.buffer.advance(FRAME_CRC_SIZE);

        trace!("<-- frame type=0x{msg_type:02x} msg_id={msg_id} payload={payload_len}B");
        Ok(Some(Frame { msg_type, msg_id, payload }))
    }

    /// Drops bytes up to the next occurrence of the magic pair (the whole
    /// buffer if none is found, keeping a trailing half-magic byte).
    fn resync(&mut self, reason: &str) -> CoreError {
        let skip = self.find_resync_point();
        let head = hex::encode(&self.buffer[..skip.min(16)]);
        warn!("{reason}: dropping {skip} bytes to resync (head: {head})");
        self.buffer.advance(skip);
        CoreError::FramingCorruption { dropped: skip }
    }

    fn find_resync_point(&self) -> usize {
        // Skip at least one byte so a corrupt frame that begins with the
        // magic pair cannot be re-parsed forever.
        let buf = &self.buffer[..];
        let mut i = 1;
        while i + 1 < buf.len() {
            if buf[i] == FRAME_MAGIC[0] && buf[i + 1] == FRAME_MAGIC[1] {
                return i;
            }
            i += 1;
        }
        if !buf.is_empty() && buf[buf.len() - 1] == FRAME_MAGIC[0] {
            buf.len() - 1
        } else {
            buf.len()
        }
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_decode_one_frame() {
        let encoded = encode_frame(0x14, 7, &[1, 2, 3]).unwrap();
        let mut decoder = FrameDecoder::new();
        decoder.extend(&encoded);
        let frame = decoder.next_frame().unwrap().unwrap();
        assert_eq!(frame.msg_type, 0x14);
        assert_eq!(frame.msg_id, 7);
        assert_eq!(&frame.payload[..], &[1, 2, 3]);
        assert_eq!(decoder.buffered(), 0);
        assert!(decoder.next_frame().unwrap().is_none());
    }

    #[test]
    fn partial_frame_waits_for_more_bytes() {
        let encoded = encode_frame(0x10, 0, &[9; 20]).unwrap();
        let mut decoder = FrameDecoder::new();
        decoder.extend(&encoded[..encoded.len() - 5]);
        assert!(decoder.next_frame().unwrap().is_none());
        assert_eq!(decoder.buffered(), encoded.len() - 5);
        decoder.extend(&encoded[encoded.len() - 5..]);
        let frame = decoder.next_frame().unwrap().unwrap();
        assert_eq!(frame.payload.len(), 20);
    }

    #[test]
    fn byte_at_a_time_extraction_matches_whole() {
        let a = encode_frame(0x20, 0, &[2]).unwrap();
        let b = encode_frame(0x21, 0, &[55]).unwrap();
        let stream: Vec<u8> = a.iter().chain(b.iter()).copied().collect();

        let mut whole = FrameDecoder::new();
        whole.extend(&stream);
        let mut expected = Vec::new();
        while let Some(f) = whole.next_frame().unwrap() {
            expected.push(f);
        }

        let mut trickle = FrameDecoder::new();
        let mut got = Vec::new();
        for &byte in &stream {
            trickle.extend(&[byte]);
            while let Some(f) = trickle.next_frame().unwrap() {
                got.push(f);
            }
        }
        assert_eq!(got, expected);
        assert_eq!(got.len(), 2);
    }

    #[test]
    fn garbage_before_frame_resyncs() {
        let encoded = encode_frame(0x22, 0, &[1]).unwrap();
        let mut decoder = FrameDecoder::new();
        decoder.extend(&[0x00, 0xFF, 0x13]);
        decoder.extend(&encoded);
        match decoder.next_frame() {
            Err(CoreError::FramingCorruption { dropped }) => assert_eq!(dropped, 3),
            other => panic!("expected corruption, got {other:?}"),
        }
        // After resync the valid frame is still extractable.
        let frame = decoder.next_frame().unwrap().unwrap();
        assert_eq!(frame.msg_type, 0x22);
    }

    #[test]
    fn crc_mismatch_drops_frame() {
        let mut encoded = encode_frame(0x10, 0, &[5, 6, 7]).unwrap();
        let idx = encoded.len() - 3; // flip a payload byte
        encoded[idx] ^= 0xFF;
        let follow = encode_frame(0x21, 0, &[80]).unwrap();
        let mut decoder = FrameDecoder::new();
        decoder.extend(&encoded);
        decoder.extend(&follow);
        assert!(matches!(
            decoder.next_frame(),
            Err(CoreError::FramingCorruption { .. })
        ));
        let frame = decoder.next_frame().unwrap().unwrap();
        assert_eq!(frame.msg_type, 0x21);
        assert_eq!(&frame.payload[..], &[80]);
    }

    #[test]
    fn oversized_length_is_corruption_not_growth() {
        let mut bogus = Vec::new();
        bogus.extend_from_slice(&FRAME_MAGIC);
        bogus.push(0x10);
        bogus.extend_from_slice(&0u32.to_le_bytes());
        bogus.extend_from_slice(&u16::MAX.to_le_bytes());
        let mut decoder = FrameDecoder::new();
        decoder.extend(&bogus);
        assert!(matches!(
            decoder.next_frame(),
            Err(CoreError::FramingCorruption { .. })
        ));
    }

    #[test]
    fn oversized_encode_rejected() {
        let payload = vec![0u8; MAX_PAYLOAD_LEN + 1];
        assert!(matches!(
            encode_frame(0x10, 0, &payload),
            Err(CoreError::InvalidParameter(_))
        ));
    }

    #[test]
    fn trailing_half_magic_is_kept() {
        let mut decoder = FrameDecoder::new();
        decoder.extend(&[0x01, 0x02, FRAME_MAGIC[0]]);
        assert!(matches!(
            decoder.next_frame(),
            Err(CoreError::FramingCorruption { dropped: 2 })
        ));
        assert_eq!(decoder.buffered(), 1);
    }
}
