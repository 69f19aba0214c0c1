use super::{Error, Word};
use std::io::Read;

type Result<T> = std::result::Result<T, Error>;

/// ## Program image reader
///
/// A program image is a headerless sequence of 16-bit little-endian
/// words. The same reader consumes the binary tail of a snapshot file;
/// a bare image and a snapshot differ only by the optional text header
/// in front of this stream. No opcode or operand validation happens at
/// load time.
pub fn read_words<R: Read>(reader: &mut R) -> Result<Vec<Word>> {
    let mut raw = Vec::new();
    reader.read_to_end(&mut raw)?;
    if raw.len() % 2 != 0 {
        return Err(Error::MalformedImage);
    }
    Ok(raw
        .chunks_exact(2)
        .map(|pair| Word::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

/// Encode words back to the image byte layout.
pub fn write_words<W: std::io::Write>(writer: &mut W, words: &[Word]) -> Result<()> {
    for word in words {
        writer.write_all(&word.to_le_bytes())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn decodes_little_endian_words() {
        let mut bytes = Cursor::new(vec![0x13, 0x00, 0x48, 0x00, 0xff, 0x7f]);
        assert_eq!(read_words(&mut bytes).unwrap(), vec![19, 72, 32767]);
    }

    #[test]
    fn empty_stream_is_an_empty_image() {
        let mut bytes = Cursor::new(vec![]);
        assert_eq!(read_words(&mut bytes).unwrap(), vec![]);
    }

    #[test]
    fn odd_byte_count_is_malformed() {
        let mut bytes = Cursor::new(vec![0x13, 0x00, 0x48]);
        assert!(matches!(read_words(&mut bytes), Err(Error::MalformedImage)));
    }

    #[test]
    fn words_round_trip_through_bytes() {
        let words = vec![0, 1, 32767, 32768, 65535];
        let mut bytes = Vec::new();
        write_words(&mut bytes, &words).unwrap();
        assert_eq!(read_words(&mut Cursor::new(bytes)).unwrap(), words);
    }
}
