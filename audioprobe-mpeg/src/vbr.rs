//! VBR summary frame parsing.
//!
//! Variable-bitrate encoders place a summary block inside the first frame
//! of the stream: `Xing` (or `Info`, the same layout written for CBR
//! output) at an offset that depends on the version and channel mode, or
//! `VBRI` at a fixed offset. The block's total-frame count turns an
//! otherwise full-stream scan into a single read, so duration and average
//! bitrate come straight from it.

use byteorder::{BigEndian, ByteOrder};

use crate::header::FrameHeader;

/// `Xing` summary marker.
pub const XING_MARKER: &[u8; 4] = b"Xing";

/// `Info` summary marker: identical layout, written by CBR encodes.
pub const INFO_MARKER: &[u8; 4] = b"Info";

/// `VBRI` summary marker, always 32 bytes past the frame header.
pub const VBRI_MARKER: &[u8; 4] = b"VBRI";

/// Offset of the `VBRI` block relative to the frame start.
const VBRI_OFFSET: usize = 4 + 32;

/// Xing flag: the total-frame-count field is present.
const XING_HAS_FRAMES: u32 = 0x01;

/// Xing flag: the total-byte-count field is present.
const XING_HAS_BYTES: u32 = 0x02;

/// Which summary block variant was recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryKind {
    /// `Xing`: a variable-bitrate stream.
    Xing,
    /// `Info`: the same block written for a constant-bitrate stream.
    Info,
    /// `VBRI`: the Fraunhofer variable-bitrate block.
    Vbri,
}

impl SummaryKind {
    /// Whether this block marks the stream as variable-bitrate.
    pub fn is_vbr(self) -> bool {
        !matches!(self, SummaryKind::Info)
    }
}

/// Totals recovered from a summary block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VbrSummary {
    /// Block variant.
    pub kind: SummaryKind,
    /// Total number of frames in the stream.
    pub frame_count: u32,
    /// Total audio byte count, when the block declares one.
    pub byte_count: Option<u32>,
}

impl VbrSummary {
    /// Look for a summary block inside the first frame's bytes.
    ///
    /// `frame` starts at the frame's sync word and may be shorter than
    /// the full frame on a truncated stream; every read is bounds-checked
    /// and a block without a usable frame count is ignored.
    pub fn parse(frame: &[u8], header: &FrameHeader) -> Option<Self> {
        let xing_at = 4 + header.side_info_len() as usize;
        if let Some(summary) = parse_xing(frame, xing_at) {
            return Some(summary);
        }
        parse_vbri(frame)
    }
}

fn parse_xing(frame: &[u8], offset: usize) -> Option<VbrSummary> {
    let marker = frame.get(offset..offset + 4)?;
    let kind = if marker == XING_MARKER {
        SummaryKind::Xing
    } else if marker == INFO_MARKER {
        SummaryKind::Info
    } else {
        return None;
    };

    let flags = BigEndian::read_u32(frame.get(offset + 4..offset + 8)?);
    if flags & XING_HAS_FRAMES == 0 {
        return None;
    }
    let frame_count = BigEndian::read_u32(frame.get(offset + 8..offset + 12)?);
    if frame_count == 0 {
        return None;
    }

    let byte_count = if flags & XING_HAS_BYTES != 0 {
        frame
            .get(offset + 12..offset + 16)
            .map(BigEndian::read_u32)
            .filter(|&bytes| bytes > 0)
    } else {
        None
    };

    Some(VbrSummary {
        kind,
        frame_count,
        byte_count,
    })
}

fn parse_vbri(frame: &[u8]) -> Option<VbrSummary> {
    let marker = frame.get(VBRI_OFFSET..VBRI_OFFSET + 4)?;
    if marker != VBRI_MARKER {
        return None;
    }

    // Layout after the marker: version (2), delay (2), quality (2),
    // byte count (4), frame count (4).
    let byte_count = BigEndian::read_u32(frame.get(VBRI_OFFSET + 10..VBRI_OFFSET + 14)?);
    let frame_count = BigEndian::read_u32(frame.get(VBRI_OFFSET + 14..VBRI_OFFSET + 18)?);
    if frame_count == 0 {
        return None;
    }

    Some(VbrSummary {
        kind: SummaryKind::Vbri,
        frame_count,
        byte_count: (byte_count > 0).then_some(byte_count),
    })
}
