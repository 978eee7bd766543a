//! # Audioprobe ID3
//!
//! ID3 tag boundary detection for MPEG audio streams.
//!
//! The audio-frame scanners need exactly three things from the tag blocks
//! that bracket an audio payload: does a tag exist, how many bytes does it
//! occupy, and (for the leading variant) what playback duration, if any,
//! does it declare. This crate answers those questions and nothing more;
//! full field-level tag decoding (title, artist, pictures) is out of scope.
//!
//! ## Features
//!
//! - **ID3v1**: fixed 128-byte trailing tag, recognized by its `TAG` marker
//! - **ID3v2**: variable-length leading tag with synch-safe size decoding,
//!   versions 2.2 through 2.4
//! - **Footer variant**: appended ID3v2 tags located from the `3DI` footer
//!   at the end of the file
//! - **Duration hint**: the declared track length (`TLEN`) in whole
//!   seconds, when the leading tag carries one
//!
//! ## Example
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! let file = File::open("track.mp3").unwrap();
//! let mut reader = BufReader::new(file);
//! let (v2, v1) = audioprobe_id3::detect(&mut reader).unwrap();
//! if v2.exists {
//!     println!("leading tag: {} bytes at {}", v2.len, v2.offset);
//! }
//! if v1.exists {
//!     println!("trailing tag present");
//! }
//! ```

use std::io::{Read, Seek};

use serde::{Deserialize, Serialize};

use audioprobe_core::Result;

pub mod v1;
pub mod v2;

pub use v1::{V1_MARKER, V1_TAG_LEN};
pub use v2::{Id3v2Header, V2_FOOTER_MARKER, V2_HEADER_LEN, V2_MARKER};

/// Where a tag block sits relative to the audio payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TagLocation {
    /// Before the audio payload.
    #[default]
    Head,
    /// After the audio payload.
    Foot,
}

/// Presence, size, and location of one tag block.
///
/// Constructed once per analyzed stream and immutable thereafter. An
/// absent tag reports `exists = false` with all numeric fields zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TagInfo {
    /// Whether the tag block is present.
    pub exists: bool,
    /// Declared byte length of the whole block, header and footer included.
    pub len: u64,
    /// Byte offset of the block within the file.
    pub offset: u64,
    /// Head or foot placement.
    pub location: TagLocation,
    /// Track length declared inside the tag, in whole seconds.
    ///
    /// Only ever populated for a head-located ID3v2 tag carrying a `TLEN`
    /// frame.
    pub declared_duration_secs: Option<u32>,
}

impl TagInfo {
    /// An absent tag.
    pub fn absent() -> Self {
        Self::default()
    }
}

/// Detect the tag blocks bracketing the audio payload.
///
/// Returns `(id3v2, id3v1)`. Neither detection raises on malformed or
/// truncated tag data; only a stream fault propagates. A zero-length
/// stream yields two absent tags.
pub fn detect<S: Read + Seek>(stream: &mut S) -> Result<(TagInfo, TagInfo)> {
    let v2 = v2::read(stream)?;
    let v1 = v1::read(stream)?;
    Ok((v2, v1))
}
