//! # Audioprobe MPEG
//!
//! Playback metadata extraction for MPEG audio (MP3) streams.
//!
//! This crate scans the frame sequence of an MPEG audio stream, without
//! decoding any samples, and reports duration, bitrate, VBR status,
//! sample rate, and the byte range the audio payload occupies. It is
//! built for cataloguing workloads: large collections scanned quickly,
//! with real-world damage (truncated headers, injected junk, duplicated
//! or misplaced tags) degrading to zeroed metrics instead of failures.
//!
//! ## Features
//!
//! - **Frame header decoding**: bit-exact 4-byte window decoding with all
//!   reserved and free-format encodings rejected up front
//! - **Resumable scanning**: a forward-only frame cursor that recovers
//!   from junk and embedded tag blocks, and never runs away on corrupt
//!   tails
//! - **VBR summaries**: `Xing`/`Info` and `VBRI` blocks for single-read
//!   duration, with a full-scan fallback when no block is present
//! - **Tag-aware boundaries**: leading/trailing ID3 blocks excluded from
//!   audio calculations, with the tag-declared duration reconciled
//!   against what the frames actually hold
//!
//! ## Example
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! let file = File::open("track.mp3").unwrap();
//! let mut reader = BufReader::new(file);
//! let summary = audioprobe_mpeg::analyze(&mut reader).unwrap();
//! println!(
//!     "{} kbps{}, {} s, audio at {}..{}",
//!     summary.bitrate_kbps,
//!     if summary.vbr { " (VBR)" } else { "" },
//!     summary.duration_secs,
//!     summary.audio_offset,
//!     summary.audio_offset + summary.audio_size,
//! );
//! ```
//!
//! ## Error model
//!
//! Byte-level anomalies are never errors: a malformed header decodes to
//! an invalid one, a truncated stream means "no more frames", and
//! conflicting duration signals are resolved by policy. Only a fault of
//! the underlying stream (read/seek failure) surfaces, as
//! [`audioprobe_core::Error::Io`].

pub mod analyzer;
pub mod browser;
pub mod header;
pub mod vbr;

#[cfg(test)]
pub(crate) mod testutil;

pub use analyzer::{analyze, AnalyzerConfig, MpegAnalyzer, MpegSummary};
pub use browser::{FrameBrowser, ScanStats};
pub use header::{ChannelMode, FrameHeader, Layer, Version, FRAME_HEADER_LEN};
pub use vbr::{SummaryKind, VbrSummary};

// Re-export the collaborator types callers see in the summary.
pub use audioprobe_id3::{TagInfo, TagLocation};
