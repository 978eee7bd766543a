//! MPEG audio frame header decoding.
//!
//! A frame header is a 4-byte window: 11 sync bits followed by the
//! version, layer, bitrate index, sample-rate index, padding bit, and
//! channel mode. Decoding is a pure function over those 32 bits, with no
//! I/O and no failure path. Any window that does not decode to a playable frame
//! (bad sync, reserved field values, free-format bitrate, or a computed
//! frame length of zero) yields an invalid header with zeroed numeric
//! fields, so downstream arithmetic never sees a zero divisor.

use serde::{Deserialize, Serialize};

/// Frame header size in bytes.
pub const FRAME_HEADER_LEN: usize = 4;

/// MPEG audio version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Version {
    /// MPEG version 1.
    #[default]
    Mpeg1,
    /// MPEG version 2.
    Mpeg2,
    /// MPEG version 2.5 (unofficial low-rate extension).
    Mpeg25,
}

impl Version {
    /// Parse from the 2-bit version field. Bit pattern `01` is reserved.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits & 0x03 {
            0 => Some(Version::Mpeg25),
            2 => Some(Version::Mpeg2),
            3 => Some(Version::Mpeg1),
            _ => None,
        }
    }
}

/// MPEG audio layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Layer {
    /// Layer I.
    I,
    /// Layer II.
    II,
    /// Layer III.
    #[default]
    III,
}

impl Layer {
    /// Parse from the 2-bit layer field. Bit pattern `00` is reserved.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits & 0x03 {
            1 => Some(Layer::III),
            2 => Some(Layer::II),
            3 => Some(Layer::I),
            _ => None,
        }
    }
}

/// Channel mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChannelMode {
    /// Two independent channels.
    #[default]
    Stereo,
    /// Two channels with shared stereo information.
    JointStereo,
    /// Two independent mono channels.
    DualChannel,
    /// Single channel.
    Mono,
}

impl ChannelMode {
    /// Parse from the 2-bit channel mode field.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => ChannelMode::Stereo,
            1 => ChannelMode::JointStereo,
            2 => ChannelMode::DualChannel,
            _ => ChannelMode::Mono,
        }
    }
}

/// Bitrate table in kbps, indexed by bitrate-index minus one.
///
/// Index 0 (free format) and index 15 (reserved) are rejected before the
/// lookup.
const BITRATES_V1_L1: [u32; 14] = [
    32, 64, 96, 128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448,
];
const BITRATES_V1_L2: [u32; 14] = [
    32, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384,
];
const BITRATES_V1_L3: [u32; 14] = [
    32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320,
];
const BITRATES_V2_L1: [u32; 14] = [
    32, 48, 56, 64, 80, 96, 112, 128, 144, 160, 176, 192, 224, 256,
];
const BITRATES_V2_L2_L3: [u32; 14] = [
    8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160,
];

/// Sample rates in Hz, indexed by sample-rate index. Index 3 is reserved.
const SAMPLE_RATES_V1: [u32; 3] = [44_100, 48_000, 32_000];
const SAMPLE_RATES_V2: [u32; 3] = [22_050, 24_000, 16_000];
const SAMPLE_RATES_V25: [u32; 3] = [11_025, 12_000, 8_000];

fn bitrate_kbps(version: Version, layer: Layer, index: u8) -> Option<u32> {
    if index == 0 || index >= 15 {
        // Free format or reserved.
        return None;
    }
    let table = match (version, layer) {
        (Version::Mpeg1, Layer::I) => &BITRATES_V1_L1,
        (Version::Mpeg1, Layer::II) => &BITRATES_V1_L2,
        (Version::Mpeg1, Layer::III) => &BITRATES_V1_L3,
        (_, Layer::I) => &BITRATES_V2_L1,
        (_, _) => &BITRATES_V2_L2_L3,
    };
    Some(table[usize::from(index) - 1])
}

fn sample_rate_hz(version: Version, index: u8) -> Option<u32> {
    if index >= 3 {
        return None;
    }
    let table = match version {
        Version::Mpeg1 => &SAMPLE_RATES_V1,
        Version::Mpeg2 => &SAMPLE_RATES_V2,
        Version::Mpeg25 => &SAMPLE_RATES_V25,
    };
    Some(table[usize::from(index)])
}

/// Decoded MPEG audio frame header.
///
/// Constructed once per candidate 4-byte window and never mutated. When
/// `valid` is true, `frame_len`, `bitrate_kbps`, and `sample_rate_hz` are
/// all non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameHeader {
    /// Whether the window decoded to a playable frame.
    pub valid: bool,
    /// MPEG version.
    pub version: Version,
    /// MPEG layer.
    pub layer: Layer,
    /// Bitrate in kbps; 0 for an invalid header.
    pub bitrate_kbps: u32,
    /// Sample rate in Hz; 0 for an invalid header.
    pub sample_rate_hz: u32,
    /// Whether the padding bit is set.
    pub padding: bool,
    /// Whole frame length in bytes, header included; 0 for an invalid header.
    pub frame_len: u32,
    /// Channel mode.
    pub channel_mode: ChannelMode,
}

impl FrameHeader {
    /// The invalid header: all numeric fields zero.
    pub fn invalid() -> Self {
        Self::default()
    }

    /// Decode a 4-byte candidate window.
    ///
    /// Never panics and never errors; every malformed window decodes to
    /// [`FrameHeader::invalid`].
    pub fn parse(data: &[u8]) -> Self {
        if data.len() < FRAME_HEADER_LEN {
            return Self::invalid();
        }
        // 11 sync bits, all set.
        if data[0] != 0xFF || data[1] & 0xE0 != 0xE0 {
            return Self::invalid();
        }

        let version = match Version::from_bits(data[1] >> 3) {
            Some(version) => version,
            None => return Self::invalid(),
        };
        let layer = match Layer::from_bits(data[1] >> 1) {
            Some(layer) => layer,
            None => return Self::invalid(),
        };
        let bitrate_kbps = match bitrate_kbps(version, layer, data[2] >> 4) {
            Some(bitrate) => bitrate,
            None => return Self::invalid(),
        };
        let sample_rate_hz = match sample_rate_hz(version, (data[2] >> 2) & 0x03) {
            Some(rate) => rate,
            None => return Self::invalid(),
        };
        let padding = data[2] & 0x02 != 0;
        let channel_mode = ChannelMode::from_bits(data[3] >> 6);

        let frame_len = frame_len(version, layer, bitrate_kbps, sample_rate_hz, padding);
        if frame_len == 0 {
            return Self::invalid();
        }

        Self {
            valid: true,
            version,
            layer,
            bitrate_kbps,
            sample_rate_hz,
            padding,
            frame_len,
            channel_mode,
        }
    }

    /// Samples per frame for this version/layer combination.
    pub fn samples_per_frame(&self) -> u32 {
        samples_per_frame(self.version, self.layer)
    }

    /// Side information length in bytes, following the 4-byte header.
    ///
    /// This is where a VBR summary block begins inside the first frame.
    pub fn side_info_len(&self) -> u32 {
        match (self.version, self.channel_mode) {
            (Version::Mpeg1, ChannelMode::Mono) => 17,
            (Version::Mpeg1, _) => 32,
            (_, ChannelMode::Mono) => 9,
            (_, _) => 17,
        }
    }
}

fn samples_per_frame(version: Version, layer: Layer) -> u32 {
    match layer {
        Layer::I => 384,
        Layer::II => 1152,
        Layer::III => match version {
            Version::Mpeg1 => 1152,
            _ => 576,
        },
    }
}

/// Frame length in bytes from the standard formula.
///
/// Layer I counts in 4-byte slots; Layers II/III in single bytes.
fn frame_len(version: Version, layer: Layer, bitrate_kbps: u32, sample_rate_hz: u32, padding: bool) -> u32 {
    let bitrate_bps = bitrate_kbps * 1000;
    let pad = u32::from(padding);
    match layer {
        Layer::I => (12 * bitrate_bps / sample_rate_hz + pad) * 4,
        _ => samples_per_frame(version, layer) / 8 * bitrate_bps / sample_rate_hz + pad,
    }
}
