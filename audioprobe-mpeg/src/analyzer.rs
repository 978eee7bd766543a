//! Top-level playback metadata extraction.
//!
//! The analyzer composes the tag boundary detector and the frame browser:
//! tags delimit the audio payload, the browser anchors on the first real
//! frame, and the bitrate/duration figures come from a VBR summary block,
//! a full frame scan, or the payload size, reconciled against the
//! duration the leading tag declares when it declares one.

use std::io::{Read, Seek, SeekFrom};

use serde::{Deserialize, Serialize};
use tracing::debug;

use audioprobe_core::{read_up_to, stream_len, Result};
use audioprobe_id3::{TagInfo, TagLocation};

use crate::browser::FrameBrowser;
use crate::header::FrameHeader;
use crate::vbr::VbrSummary;

/// Tuning knobs for the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// How many seconds the scan-measured duration may fall short of the
    /// declared/nominal one before the scan wins.
    ///
    /// A tag-declared duration beats the size-derived one because trailing
    /// garbage inflates the payload size; but when the stream stops
    /// producing valid frames far earlier than either figure, the file
    /// cannot play that long and the measured duration is the truth. The
    /// divergence point is a calibration question; tune it against the
    /// corpus being catalogued.
    pub duration_slack_secs: u32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            duration_slack_secs: 5,
        }
    }
}

/// Playback metadata for one MPEG audio stream.
///
/// Computed once per analyzed stream; read-only to callers. A stream with
/// no decodable audio (empty, truncated below one header, or garbage
/// throughout) reports zeros everywhere rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MpegSummary {
    /// Total stream length in bytes.
    pub file_size: u64,
    /// Bitrate in kbps: the constant rate for CBR, the average for VBR.
    pub bitrate_kbps: u32,
    /// Playback duration in whole seconds.
    pub duration_secs: u32,
    /// Whether the stream is variable-bitrate.
    pub vbr: bool,
    /// Sample rate in Hz, from the first valid frame.
    pub sample_rate_hz: u32,
    /// Byte offset where audio data starts.
    pub audio_offset: u64,
    /// Byte length of the audio payload, tag blocks excluded.
    pub audio_size: u64,
    /// The ID3v2 tag block, if any.
    pub id3v2: TagInfo,
    /// The ID3v1 tag block, if any.
    pub id3v1: TagInfo,
}

/// Metadata extractor for MPEG audio streams.
#[derive(Debug, Clone, Copy, Default)]
pub struct MpegAnalyzer {
    config: AnalyzerConfig,
}

impl MpegAnalyzer {
    /// Analyzer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyzer with explicit configuration.
    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Extract playback metadata from one stream.
    ///
    /// Malformed input of any shape yields a well-formed summary; the only
    /// error this reports is a fault in the stream itself.
    pub fn analyze<S: Read + Seek>(&self, stream: &mut S) -> Result<MpegSummary> {
        let file_size = stream_len(stream);
        let (id3v2, id3v1) = audioprobe_id3::detect(stream)?;

        let mut summary = MpegSummary {
            file_size,
            id3v2,
            id3v1,
            ..Default::default()
        };
        if file_size == 0 {
            return Ok(summary);
        }

        // The declared tag length is only the starting point; junk or a
        // stray duplicated tag may still sit between it and the audio.
        let anchor = if id3v2.exists && id3v2.location == TagLocation::Head {
            id3v2.len.min(file_size)
        } else {
            0
        };

        stream.seek(SeekFrom::Start(anchor))?;
        let mut browser = FrameBrowser::new(stream)?;
        let first = browser.first()?;
        if !first.valid {
            return Ok(summary);
        }
        let audio_offset = browser.position();

        let mut trailing = 0u64;
        if id3v1.exists {
            trailing += id3v1.len;
        }
        if id3v2.exists && id3v2.location == TagLocation::Foot {
            trailing += id3v2.len;
        }

        summary.audio_offset = audio_offset;
        summary.audio_size = file_size
            .saturating_sub(audio_offset)
            .saturating_sub(trailing);
        summary.sample_rate_hz = first.sample_rate_hz;

        let frame = read_first_frame(stream, audio_offset, first.frame_len)?;
        if let Some(block) = VbrSummary::parse(&frame, &first) {
            self.apply_summary_block(&mut summary, &first, block);
            return Ok(summary);
        }

        self.measure(stream, &mut summary, &first, audio_offset)?;
        Ok(summary)
    }

    /// Derive duration and bitrate from a VBR summary block.
    fn apply_summary_block(
        &self,
        summary: &mut MpegSummary,
        first: &FrameHeader,
        block: VbrSummary,
    ) {
        let total_samples =
            u64::from(block.frame_count) * u64::from(first.samples_per_frame());
        let rate = u64::from(first.sample_rate_hz);

        summary.vbr = block.kind.is_vbr();
        summary.duration_secs = (total_samples / rate) as u32;
        summary.bitrate_kbps = if block.kind.is_vbr() {
            let audio_bytes = block
                .byte_count
                .map(u64::from)
                .unwrap_or(summary.audio_size);
            average_bitrate_kbps(audio_bytes, total_samples, rate)
        } else {
            first.bitrate_kbps
        };
    }

    /// Measurement path: scan every frame in the audio region.
    fn measure<S: Read + Seek>(
        &self,
        stream: &mut S,
        summary: &mut MpegSummary,
        first: &FrameHeader,
        audio_offset: u64,
    ) -> Result<()> {
        stream.seek(SeekFrom::Start(audio_offset))?;
        let mut browser = FrameBrowser::new(stream)?;
        let stats = browser.stats()?;

        let rate = u64::from(first.sample_rate_hz);
        let scanned_secs = (stats.total_samples / rate) as u32;

        if stats.is_vbr() {
            // Variable bitrate without a summary block: the scan itself
            // is the duration measurement.
            summary.vbr = true;
            summary.duration_secs = scanned_secs;
            summary.bitrate_kbps =
                average_bitrate_kbps(stats.total_bytes, stats.total_samples, rate);
            return Ok(());
        }

        summary.bitrate_kbps = first.bitrate_kbps;
        let nominal =
            (summary.audio_size * 8 / (u64::from(first.bitrate_kbps) * 1000)) as u32;
        let candidate = summary.id3v2.declared_duration_secs.unwrap_or(nominal);

        summary.duration_secs =
            if scanned_secs.saturating_add(self.config.duration_slack_secs) < candidate {
                debug!(
                    "scanned duration {}s falls well short of {}s; trusting the scan",
                    scanned_secs, candidate
                );
                scanned_secs
            } else {
                candidate
            };
        Ok(())
    }
}

/// Extract playback metadata with the default configuration.
pub fn analyze<S: Read + Seek>(stream: &mut S) -> Result<MpegSummary> {
    MpegAnalyzer::new().analyze(stream)
}

/// Average bitrate in kbps, rounded to the nearest integer.
fn average_bitrate_kbps(audio_bytes: u64, total_samples: u64, sample_rate_hz: u64) -> u32 {
    let num = audio_bytes * 8 * sample_rate_hz;
    let den = total_samples * 1000;
    ((num + den / 2) / den) as u32
}

/// The first frame's bytes, or as many of them as the stream still holds.
fn read_first_frame<S: Read + Seek>(
    stream: &mut S,
    offset: u64,
    frame_len: u32,
) -> Result<Vec<u8>> {
    stream.seek(SeekFrom::Start(offset))?;
    let mut frame = vec![0u8; frame_len as usize];
    let filled = read_up_to(stream, &mut frame)?;
    frame.truncate(filled);
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{
        cbr_frame, cbr_stream, junk, v1_tag, v2_tag, v2_tag_with_tlen, vbri_frame, xing_frame,
    };
    use std::io::Cursor;

    #[test]
    fn test_zero_length_file() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        let summary = analyze(&mut cursor).unwrap();
        assert_eq!(summary, MpegSummary::default());
    }

    #[test]
    fn test_garbage_only_file() {
        let mut cursor = Cursor::new(junk(1000));
        let summary = analyze(&mut cursor).unwrap();
        assert_eq!(summary.file_size, 1000);
        assert_eq!(summary.bitrate_kbps, 0);
        assert_eq!(summary.duration_secs, 0);
        assert_eq!(summary.audio_offset, 0);
        assert_eq!(summary.audio_size, 0);
        assert!(!summary.id3v2.exists);
        assert!(!summary.id3v1.exists);
    }

    #[test]
    fn test_cbr_with_both_tags() {
        // 147 seconds of 128 kbps audio behind a 0x9A1-byte leading tag,
        // with a trailing 128-byte tag.
        let mut data = v2_tag(0x9A1 - 10);
        data.extend_from_slice(&cbr_stream(5641));
        data.extend_from_slice(&v1_tag());
        let total = data.len() as u64;

        let mut cursor = Cursor::new(data);
        let summary = analyze(&mut cursor).unwrap();
        assert_eq!(summary.file_size, total);
        assert_eq!(summary.audio_offset, 0x9A1);
        assert_eq!(summary.audio_size, total - 0x9A1 - 128);
        assert_eq!(summary.bitrate_kbps, 128);
        assert_eq!(summary.duration_secs, 147);
        assert_eq!(summary.sample_rate_hz, 44_100);
        assert!(!summary.vbr);
        assert!(summary.id3v2.exists);
        assert!(summary.id3v1.exists);
    }

    #[test]
    fn test_cbr_without_tags() {
        let data = cbr_stream(5641);
        let total = data.len() as u64;
        let mut cursor = Cursor::new(data);
        let summary = analyze(&mut cursor).unwrap();
        assert_eq!(summary.audio_offset, 0);
        assert_eq!(summary.audio_size, total);
        assert_eq!(summary.bitrate_kbps, 128);
        assert_eq!(summary.duration_secs, 147);
        assert!(!summary.id3v2.exists);
        assert!(!summary.id3v1.exists);
    }

    #[test]
    fn test_junk_between_tag_and_audio() {
        // The tag's declared length undershoots; the real first frame sits
        // past some junk and audio_offset must point at it.
        let mut data = v2_tag(0x200);
        data.extend_from_slice(&junk(0x41));
        let audio_at = data.len() as u64;
        data.extend_from_slice(&cbr_stream(40));

        let mut cursor = Cursor::new(data);
        let summary = analyze(&mut cursor).unwrap();
        assert_eq!(summary.audio_offset, audio_at);
        assert_eq!(summary.bitrate_kbps, 128);
    }

    #[test]
    fn test_declared_duration_beats_inflated_nominal() {
        // 10 s of real frames, garbage tail inflating the nominal figure,
        // and a tag declaring the true 10 s.
        let mut data = v2_tag_with_tlen(10_000, 64);
        data.extend_from_slice(&cbr_stream(390));
        data.extend_from_slice(&junk(64_000));

        let mut cursor = Cursor::new(data);
        let summary = analyze(&mut cursor).unwrap();
        assert_eq!(summary.duration_secs, 10);
        assert_eq!(summary.bitrate_kbps, 128);
        assert!(!summary.vbr);
    }

    #[test]
    fn test_scan_beats_overstated_declared_duration() {
        // The tag declares 29 s but only one real second of frames exists.
        let mut data = v2_tag_with_tlen(29_000, 64);
        data.extend_from_slice(&cbr_stream(39));
        data.extend_from_slice(&junk(400_000));

        let mut cursor = Cursor::new(data);
        let summary = analyze(&mut cursor).unwrap();
        assert_eq!(summary.duration_secs, 1);
    }

    #[test]
    fn test_scan_beats_inflated_nominal_without_tag() {
        // No declared duration: the scan still caps a garbage-inflated
        // nominal figure.
        let mut data = cbr_stream(390);
        data.extend_from_slice(&junk(400_000));

        let mut cursor = Cursor::new(data);
        let summary = analyze(&mut cursor).unwrap();
        assert_eq!(summary.duration_secs, 10);
    }

    #[test]
    fn test_xing_summary_block() {
        let mut data = xing_frame(18_000, 11_000_000);
        data.extend_from_slice(&cbr_stream(3));
        let mut cursor = Cursor::new(data);
        let summary = analyze(&mut cursor).unwrap();
        assert!(summary.vbr);
        // 18000 frames * 1152 samples / 44100 Hz.
        assert_eq!(summary.duration_secs, 470);
        assert_eq!(summary.bitrate_kbps, 187);
    }

    #[test]
    fn test_info_summary_block_is_cbr() {
        let mut frame = xing_frame(5_000, 0);
        frame[36..40].copy_from_slice(b"Info");
        let mut data = frame;
        data.extend_from_slice(&cbr_stream(3));
        let mut cursor = Cursor::new(data);
        let summary = analyze(&mut cursor).unwrap();
        assert!(!summary.vbr);
        // 5000 frames * 1152 / 44100.
        assert_eq!(summary.duration_secs, 130);
        assert_eq!(summary.bitrate_kbps, 128);
    }

    #[test]
    fn test_vbri_summary_block() {
        let mut data = vbri_frame(7_500, 9_000_000);
        data.extend_from_slice(&cbr_stream(3));
        let mut cursor = Cursor::new(data);
        let summary = analyze(&mut cursor).unwrap();
        assert!(summary.vbr);
        assert_eq!(summary.duration_secs, 195);
        assert_eq!(summary.bitrate_kbps, 368);
    }

    #[test]
    fn test_vbr_detected_without_summary_block() {
        // Alternating bitrates and no summary marker anywhere.
        let mut data = Vec::new();
        for _ in 0..20 {
            data.extend_from_slice(&cbr_frame(128));
            data.extend_from_slice(&cbr_frame(160));
        }
        let mut cursor = Cursor::new(data);
        let summary = analyze(&mut cursor).unwrap();
        assert!(summary.vbr);
        assert_eq!(summary.duration_secs, 1);
        assert_eq!(summary.bitrate_kbps, 144);
    }

    #[test]
    fn test_foot_located_tag_excluded_from_audio() {
        let mut data = cbr_stream(39);
        let audio_len = data.len() as u64;
        // Appended v2.4 tag with footer.
        let body = vec![0u8; 0x1F6];
        data.extend_from_slice(b"ID3");
        data.extend_from_slice(&[4, 0, 0x10]);
        data.extend_from_slice(&synchsafe(body.len() as u32));
        data.extend_from_slice(&body);
        data.extend_from_slice(b"3DI");
        data.extend_from_slice(&[4, 0, 0x10]);
        data.extend_from_slice(&synchsafe(body.len() as u32));

        let mut cursor = Cursor::new(data);
        let summary = analyze(&mut cursor).unwrap();
        assert!(summary.id3v2.exists);
        assert_eq!(summary.id3v2.location, TagLocation::Foot);
        assert_eq!(summary.audio_offset, 0);
        assert_eq!(summary.audio_size, audio_len);
    }

    #[test]
    fn test_slack_is_configurable() {
        // 10 s of frames against a declared 14 s: within a wide slack the
        // declared figure holds, within a tight one the scan wins.
        let mut data = v2_tag_with_tlen(14_000, 64);
        data.extend_from_slice(&cbr_stream(390));

        let wide = MpegAnalyzer::with_config(AnalyzerConfig {
            duration_slack_secs: 10,
        });
        let mut cursor = Cursor::new(data.clone());
        assert_eq!(wide.analyze(&mut cursor).unwrap().duration_secs, 14);

        let tight = MpegAnalyzer::with_config(AnalyzerConfig {
            duration_slack_secs: 1,
        });
        let mut cursor = Cursor::new(data);
        assert_eq!(tight.analyze(&mut cursor).unwrap().duration_secs, 10);
    }

    fn synchsafe(value: u32) -> [u8; 4] {
        [
            ((value >> 21) & 0x7F) as u8,
            ((value >> 14) & 0x7F) as u8,
            ((value >> 7) & 0x7F) as u8,
            (value & 0x7F) as u8,
        ]
    }
}
