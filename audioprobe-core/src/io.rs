//! Defensive stream helpers.
//!
//! The scanners operate on any `Read + Seek` source: a file, an in-memory
//! buffer, or a network-backed reader. Some sources report their current
//! position unreliably; the helpers here pin down the fallback behavior in
//! one place so every scanner treats such sources identically.

use std::io::{Read, Seek, SeekFrom};

/// Current stream position, or 0 when the source cannot report one.
///
/// An unseekable or freshly-wrapped source that fails `stream_position()`
/// is treated as positioned at the start rather than as an error.
pub fn position_or_zero<S: Seek>(stream: &mut S) -> u64 {
    stream.stream_position().unwrap_or(0)
}

/// Total length of the stream, restoring the current position afterwards.
///
/// Returns 0 when the length cannot be determined.
pub fn stream_len<S: Seek>(stream: &mut S) -> u64 {
    let pos = position_or_zero(stream);
    let len = stream.seek(SeekFrom::End(0)).unwrap_or(0);
    // Best effort: a source that cannot seek back will be re-seeked by the
    // caller before any read.
    let _ = stream.seek(SeekFrom::Start(pos));
    len
}

/// Fill as much of `buf` as the stream allows, returning the byte count.
///
/// A short count means the stream ended; that is data for the caller to
/// interpret, not an error.
pub fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_stream_len_restores_position() {
        let mut cursor = Cursor::new(vec![0u8; 100]);
        cursor.set_position(42);
        assert_eq!(stream_len(&mut cursor), 100);
        assert_eq!(cursor.position(), 42);
    }

    #[test]
    fn test_stream_len_empty() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        assert_eq!(stream_len(&mut cursor), 0);
        assert_eq!(position_or_zero(&mut cursor), 0);
    }

    #[test]
    fn test_read_up_to_short_stream() {
        let mut cursor = Cursor::new(vec![1u8, 2, 3]);
        let mut buf = [0u8; 8];
        assert_eq!(read_up_to(&mut cursor, &mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], &[1, 2, 3]);
    }
}
