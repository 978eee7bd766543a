//! Resumable frame cursor over an MPEG audio stream.
//!
//! The browser locates the first valid frame in a byte stream that may
//! open with junk, false sync patterns, or stray tag blocks, then advances
//! frame-by-frame. Advancing never skips ahead on failure: once a
//! candidate header fails to decode, the cursor stays put and keeps
//! reporting an invalid frame, so a corrupt tail can never send the scan
//! running off through garbage.

use std::io::{Read, Seek, SeekFrom};

use tracing::{debug, trace};

use audioprobe_core::{position_or_zero, read_up_to, Result};
use audioprobe_id3::{Id3v2Header, V2_HEADER_LEN, V2_MARKER};

use crate::header::{FrameHeader, FRAME_HEADER_LEN};

/// Read granularity of the sync search.
const SCAN_CHUNK: usize = 8192;

/// Bytes re-examined across chunk boundaries so a sync word or tag marker
/// straddling two chunks is still seen.
const SCAN_OVERLAP: usize = 3;

/// Aggregate result of a forward scan over consecutive valid frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Number of consecutive valid frames.
    pub frame_count: u64,
    /// Sum of those frames' byte lengths.
    pub total_bytes: u64,
    /// Sum of those frames' sample counts.
    pub total_samples: u64,
    /// Smallest bitrate seen across the scan, in kbps.
    pub min_bitrate_kbps: u32,
    /// Largest bitrate seen across the scan, in kbps.
    pub max_bitrate_kbps: u32,
}

impl ScanStats {
    /// Whether the scanned frames carry more than one bitrate.
    pub fn is_vbr(&self) -> bool {
        self.frame_count > 0 && self.min_bitrate_kbps != self.max_bitrate_kbps
    }
}

/// A forward-only cursor over the frames of one borrowed stream.
///
/// The browser does not own the stream and never mutates its contents;
/// it only reads and seeks. One browser must not be shared across
/// concurrent callers.
#[derive(Debug)]
pub struct FrameBrowser<'a, S: Read + Seek> {
    stream: &'a mut S,
    /// Start of the readable region the browser was anchored at.
    anchor: u64,
    /// Byte offset of the current frame's sync word.
    position: u64,
    /// Index of the current frame, counted from the first valid one.
    frame_index: u64,
    current: FrameHeader,
    /// Offset of the first valid frame, once found.
    first_pos: Option<u64>,
    searched: bool,
}

impl<'a, S: Read + Seek> FrameBrowser<'a, S> {
    /// Bind a browser to the stream and locate the first valid frame.
    ///
    /// The anchor is the stream's position at entry; a source that cannot
    /// report one is anchored at 0. After construction the cursor already
    /// sits on the first valid frame, if the stream holds any.
    pub fn new(stream: &'a mut S) -> Result<Self> {
        let anchor = position_or_zero(stream);
        let mut browser = Self {
            stream,
            anchor,
            position: anchor,
            frame_index: 0,
            current: FrameHeader::invalid(),
            first_pos: None,
            searched: false,
        };
        browser.locate_first()?;
        Ok(browser)
    }

    /// Offset of the current frame's sync word.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Index of the current frame, 0 for the first valid frame.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// The current frame header.
    pub fn current(&self) -> FrameHeader {
        self.current
    }

    /// Reset the cursor to the first valid frame and return its header.
    ///
    /// Idempotent: repeated calls without an intervening advance return
    /// bitwise-identical headers without re-scanning. Once the first
    /// frame's offset is known, later calls seek straight back to it.
    pub fn first(&mut self) -> Result<FrameHeader> {
        if !self.searched {
            self.locate_first()?;
        } else if let Some(pos) = self.first_pos {
            if self.frame_index != 0 || self.position != pos {
                let header = match self.read_window(pos)? {
                    Some(window) => FrameHeader::parse(&window),
                    None => FrameHeader::invalid(),
                };
                self.position = pos;
                self.frame_index = 0;
                self.current = header;
            }
        }
        Ok(self.current)
    }

    /// Advance to the next frame and return its header.
    ///
    /// On success `position` strictly increases and `frame_index` is
    /// incremented. When the stream is exhausted or the next candidate
    /// does not decode, an invalid header is returned and the cursor does
    /// not move; further calls report the same invalid header.
    pub fn next_frame(&mut self) -> Result<FrameHeader> {
        if !self.current.valid {
            return Ok(self.current);
        }

        let candidate = self.position + u64::from(self.current.frame_len);
        let header = match self.read_window(candidate)? {
            Some(window) => FrameHeader::parse(&window),
            None => FrameHeader::invalid(),
        };
        if header.valid {
            self.position = candidate;
            self.frame_index += 1;
            self.current = header;
        }
        Ok(header)
    }

    /// Scan forward from the first frame, counting consecutive valid
    /// frames and summing their lengths until an invalid frame or the end
    /// of the stream.
    pub fn stats(&mut self) -> Result<ScanStats> {
        let mut stats = ScanStats::default();
        let mut header = self.first()?;
        while header.valid {
            stats.frame_count += 1;
            stats.total_bytes += u64::from(header.frame_len);
            stats.total_samples += u64::from(header.samples_per_frame());
            if stats.frame_count == 1 {
                stats.min_bitrate_kbps = header.bitrate_kbps;
                stats.max_bitrate_kbps = header.bitrate_kbps;
            } else {
                stats.min_bitrate_kbps = stats.min_bitrate_kbps.min(header.bitrate_kbps);
                stats.max_bitrate_kbps = stats.max_bitrate_kbps.max(header.bitrate_kbps);
            }
            header = self.next_frame()?;
        }
        Ok(stats)
    }

    /// Find the first valid frame at or after the anchor.
    fn locate_first(&mut self) -> Result<()> {
        self.searched = true;
        self.frame_index = 0;
        match self.sync_forward(self.anchor)? {
            Some((pos, header)) => {
                self.first_pos = Some(pos);
                self.position = pos;
                self.current = header;
            }
            None => {
                self.first_pos = None;
                self.position = self.anchor;
                self.current = FrameHeader::invalid();
            }
        }
        Ok(())
    }

    /// Byte-by-byte sync search from `start`.
    ///
    /// A literal tag marker found mid-scan aborts the search: the block's
    /// declared length is decoded and the search restarts past it, so a
    /// false sync inside tag data is never mistaken for a frame. Progress
    /// is monotonic; the search terminates on any fixed-size input.
    fn sync_forward(&mut self, start: u64) -> Result<Option<(u64, FrameHeader)>> {
        let mut pos = start;
        'chunks: loop {
            self.stream.seek(SeekFrom::Start(pos))?;
            let mut buf = [0u8; SCAN_CHUNK];
            let filled = read_up_to(self.stream, &mut buf)?;
            if filled < FRAME_HEADER_LEN {
                return Ok(None);
            }
            let at_end = filled < SCAN_CHUNK;

            let mut i = 0usize;
            while i < filled {
                if i + V2_MARKER.len() <= filled && &buf[i..i + V2_MARKER.len()] == V2_MARKER {
                    if let Some(skip) = self.embedded_tag_len(pos + i as u64)? {
                        debug!(
                            "skipping embedded tag block of {} bytes at offset {}",
                            skip,
                            pos + i as u64
                        );
                        pos = pos + i as u64 + skip;
                        continue 'chunks;
                    }
                }
                if buf[i] == 0xFF
                    && i + FRAME_HEADER_LEN <= filled
                    && buf[i + 1] & 0xE0 == 0xE0
                {
                    let header = FrameHeader::parse(&buf[i..i + FRAME_HEADER_LEN]);
                    if header.valid {
                        trace!("sync found at offset {}", pos + i as u64);
                        return Ok(Some((pos + i as u64, header)));
                    }
                }
                i += 1;
            }

            if at_end {
                return Ok(None);
            }
            pos += (filled - SCAN_OVERLAP) as u64;
        }
    }

    /// Declared length of a tag block starting at `offset`, if the bytes
    /// there form a well-formed tag header.
    fn embedded_tag_len(&mut self, offset: u64) -> Result<Option<u64>> {
        self.stream.seek(SeekFrom::Start(offset))?;
        let mut header = [0u8; V2_HEADER_LEN as usize];
        let filled = read_up_to(self.stream, &mut header)?;
        if filled < header.len() {
            return Ok(None);
        }
        Ok(Id3v2Header::parse(&header).map(|h| h.total_len()))
    }

    /// Read a 4-byte candidate window at `pos`, or `None` when the stream
    /// ends before a full window.
    fn read_window(&mut self, pos: u64) -> Result<Option<[u8; FRAME_HEADER_LEN]>> {
        self.stream.seek(SeekFrom::Start(pos))?;
        let mut window = [0u8; FRAME_HEADER_LEN];
        let filled = read_up_to(self.stream, &mut window)?;
        if filled < FRAME_HEADER_LEN {
            return Ok(None);
        }
        Ok(Some(window))
    }
}
