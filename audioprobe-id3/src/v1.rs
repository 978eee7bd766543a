//! ID3v1 trailing tag detection.
//!
//! An ID3v1 tag is a fixed 128-byte block at the very end of the file,
//! recognized by the `TAG` marker at its first three bytes. The block
//! carries no size field and no duration information; detection is a
//! single fixed-offset probe.

use std::io::{Read, Seek, SeekFrom};

use audioprobe_core::{stream_len, Result};

use crate::{TagInfo, TagLocation};

/// Total size of an ID3v1 tag block.
pub const V1_TAG_LEN: u64 = 128;

/// Marker at the first three bytes of the block.
pub const V1_MARKER: &[u8; 3] = b"TAG";

/// Probe the final 128 bytes of the stream for an ID3v1 tag.
///
/// Streams shorter than one tag block report an absent tag; only a read
/// or seek fault propagates.
pub fn read<S: Read + Seek>(stream: &mut S) -> Result<TagInfo> {
    let len = stream_len(stream);
    if len < V1_TAG_LEN {
        return Ok(TagInfo::absent());
    }

    let offset = len - V1_TAG_LEN;
    stream.seek(SeekFrom::Start(offset))?;
    let mut marker = [0u8; 3];
    stream.read_exact(&mut marker)?;

    if &marker != V1_MARKER {
        return Ok(TagInfo::absent());
    }

    Ok(TagInfo {
        exists: true,
        len: V1_TAG_LEN,
        offset,
        location: TagLocation::Foot,
        declared_duration_secs: None,
    })
}
