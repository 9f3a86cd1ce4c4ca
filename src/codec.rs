//! Inbound line framing
//!
//! Splits the byte stream at `\n`. Lines longer than the maximum are cut
//! into maximum-length pieces rather than rejected, and a partial line
//! pending at end of stream is still delivered.

use bytes::BytesMut;
use tokio_util::codec::Decoder;

/// Maximum line length in bytes (one read buffer)
pub const MAX_LINE_LENGTH: usize = 2048;

/// `Decoder` yielding one `String` per line, without the terminator
#[derive(Debug, Clone)]
pub struct LineCodec {
    max_length: usize,
}

impl LineCodec {
    /// Create a codec with the default maximum line length
    pub fn new() -> Self {
        Self::with_max_length(MAX_LINE_LENGTH)
    }

    /// Create a codec with a custom maximum line length
    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            max_length: max_length.max(1),
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

fn to_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, Self::Error> {
        let scan = src.len().min(self.max_length);
        if let Some(pos) = src[..scan].iter().position(|b| *b == b'\n') {
            let line = src.split_to(pos + 1);
            return Ok(Some(to_line(&line)));
        }

        if src.len() >= self.max_length {
            let chunk = src.split_to(self.max_length);
            return Ok(Some(to_line(&chunk)));
        }

        Ok(None)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>, Self::Error> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }
        if src.is_empty() {
            return Ok(None);
        }
        let rest = src.split();
        Ok(Some(to_line(&rest)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_complete_lines() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("hello\r\n!list\n");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some("hello".to_string()));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("!list".to_string()));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_decode_reassembles_split_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("hel");

        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        buf.extend_from_slice(b"lo\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("hello".to_string()));
    }

    #[test]
    fn test_decode_cuts_overlong_line() {
        let mut codec = LineCodec::with_max_length(4);
        let mut buf = BytesMut::from("abcdefg\n");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some("abcd".to_string()));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("efg".to_string()));
    }

    #[test]
    fn test_decode_eof_flushes_partial_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("bye");

        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), Some("bye".to_string()));
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_decode_invalid_utf8_is_lossy() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"a\xffb\n"[..]);

        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some("a\u{fffd}b".to_string())
        );
    }
}
