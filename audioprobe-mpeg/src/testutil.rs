//! Synthetic stream builders shared by the unit tests.

use byteorder::{BigEndian, ByteOrder};

use crate::header::FrameHeader;

/// One MPEG-1 Layer III frame at 44.1 kHz, stereo, zero-filled payload.
///
/// 128 kbps yields the classic 417-byte frame.
pub fn cbr_frame(bitrate_kbps: u32) -> Vec<u8> {
    let index: u8 = match bitrate_kbps {
        32 => 1,
        40 => 2,
        48 => 3,
        56 => 4,
        64 => 5,
        80 => 6,
        96 => 7,
        112 => 8,
        128 => 9,
        160 => 10,
        192 => 11,
        224 => 12,
        256 => 13,
        320 => 14,
        other => panic!("no bitrate index for {other} kbps"),
    };
    let header_bytes = [0xFF, 0xFB, index << 4, 0x00];
    let header = FrameHeader::parse(&header_bytes);
    assert!(header.valid);
    let mut frame = vec![0u8; header.frame_len as usize];
    frame[..4].copy_from_slice(&header_bytes);
    frame
}

/// `count` consecutive 128 kbps frames.
pub fn cbr_stream(count: usize) -> Vec<u8> {
    let frame = cbr_frame(128);
    let mut data = Vec::with_capacity(frame.len() * count);
    for _ in 0..count {
        data.extend_from_slice(&frame);
    }
    data
}

/// Filler bytes free of sync patterns and tag markers.
pub fn junk(len: usize) -> Vec<u8> {
    vec![0x55; len]
}

/// A minimal ID3v2.3 tag block: 10-byte header plus a zeroed body.
pub fn v2_tag(body_len: u32) -> Vec<u8> {
    let mut tag = Vec::with_capacity(10 + body_len as usize);
    tag.extend_from_slice(b"ID3");
    tag.extend_from_slice(&[3, 0, 0]);
    tag.extend_from_slice(&synchsafe(body_len));
    tag.extend(std::iter::repeat(0u8).take(body_len as usize));
    tag
}

/// An ID3v2.3 tag block declaring a track length of `millis` milliseconds.
pub fn v2_tag_with_tlen(millis: u64, padding: usize) -> Vec<u8> {
    let text = format!("\u{0}{millis}");
    let mut frames = Vec::new();
    frames.extend_from_slice(b"TLEN");
    frames.extend_from_slice(&(text.len() as u32).to_be_bytes());
    frames.extend_from_slice(&[0, 0]);
    frames.extend_from_slice(text.as_bytes());

    let body_len = frames.len() + padding;
    let mut tag = Vec::with_capacity(10 + body_len);
    tag.extend_from_slice(b"ID3");
    tag.extend_from_slice(&[3, 0, 0]);
    tag.extend_from_slice(&synchsafe(body_len as u32));
    tag.extend_from_slice(&frames);
    tag.extend(std::iter::repeat(0u8).take(padding));
    tag
}

/// A 128-byte ID3v1 tag block.
pub fn v1_tag() -> Vec<u8> {
    let mut tag = vec![0u8; 128];
    tag[..3].copy_from_slice(b"TAG");
    tag
}

/// A 128 kbps frame carrying an `Xing` block with frame and byte totals.
pub fn xing_frame(frame_count: u32, byte_count: u32) -> Vec<u8> {
    let mut frame = cbr_frame(128);
    // MPEG-1 stereo side information spans 32 bytes after the header.
    frame[36..40].copy_from_slice(b"Xing");
    BigEndian::write_u32(&mut frame[40..44], 0x03);
    BigEndian::write_u32(&mut frame[44..48], frame_count);
    BigEndian::write_u32(&mut frame[48..52], byte_count);
    frame
}

/// A 128 kbps frame carrying a `VBRI` block with frame and byte totals.
pub fn vbri_frame(frame_count: u32, byte_count: u32) -> Vec<u8> {
    let mut frame = cbr_frame(128);
    frame[36..40].copy_from_slice(b"VBRI");
    // version, delay, quality
    BigEndian::write_u16(&mut frame[40..42], 1);
    BigEndian::write_u16(&mut frame[42..44], 0);
    BigEndian::write_u16(&mut frame[44..46], 0);
    BigEndian::write_u32(&mut frame[46..50], byte_count);
    BigEndian::write_u32(&mut frame[50..54], frame_count);
    frame
}

fn synchsafe(value: u32) -> [u8; 4] {
    [
        ((value >> 21) & 0x7F) as u8,
        ((value >> 14) & 0x7F) as u8,
        ((value >> 7) & 0x7F) as u8,
        (value & 0x7F) as u8,
    ]
}
