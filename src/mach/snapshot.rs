use super::{image, word, Error, Word};
use std::io::{Read, Write};

type Result<T> = std::result::Result<T, Error>;

/// Delimiter byte between the text header and the binary memory words.
pub const SENTINEL: u8 = b'~';

/// ## Saved machine state
///
/// The file format is a text header followed by raw memory. The header
/// holds the decimal program counter, the 8 registers, the stack size,
/// and that many stack values bottom-to-top, one per line, and ends at
/// the `~` sentinel byte. After the sentinel come the memory contents
/// as raw little-endian words. The binary tail is
/// byte-identical to a bare program image, so a snapshot is an image
/// with an optional header prefix and nothing more.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Counter captured at the start of the instruction being executed,
    /// so resumption re-runs that instruction.
    pub pc: Word,
    pub registers: [Word; word::REGISTERS],
    /// Bottom-to-top.
    pub stack: Vec<Word>,
    pub memory: Vec<Word>,
}

impl Snapshot {
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(writer, "{}", self.pc)?;
        for register in &self.registers {
            writeln!(writer, "{}", register)?;
        }
        writeln!(writer, "{}", self.stack.len())?;
        for value in &self.stack {
            writeln!(writer, "{}", value)?;
        }
        writer.write_all(&[SENTINEL])?;
        image::write_words(writer, &self.memory)
    }

    /// Reverse of [`write_to`](Snapshot::write_to): header fields, skip
    /// past the sentinel, then the rest of the stream is a normal image
    /// load.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Snapshot> {
        let (pc, registers, stack) = {
            let mut bytes = ByteReader::new(reader);
            let pc = bytes.number()?;
            let mut registers = [0; word::REGISTERS];
            for register in registers.iter_mut() {
                *register = bytes.number()?;
            }
            let depth = bytes.count()?;
            let mut stack = Vec::with_capacity(depth);
            for _ in 0..depth {
                stack.push(bytes.number()?);
            }
            bytes.skip_past_sentinel()?;
            (pc, registers, stack)
        };
        let memory = image::read_words(reader)?;
        Ok(Snapshot {
            pc,
            registers,
            stack,
            memory,
        })
    }
}

/// Byte cursor with one byte of lookahead, enough to parse the decimal
/// header without consuming into the binary tail.
struct ByteReader<'a, R: Read> {
    reader: &'a mut R,
    peeked: Option<u8>,
}

impl<'a, R: Read> ByteReader<'a, R> {
    fn new(reader: &'a mut R) -> ByteReader<'a, R> {
        ByteReader {
            reader,
            peeked: None,
        }
    }

    fn peek(&mut self) -> Result<Option<u8>> {
        if self.peeked.is_none() {
            let mut buf = [0u8; 1];
            self.peeked = match self.reader.read(&mut buf)? {
                0 => None,
                _ => Some(buf[0]),
            };
        }
        Ok(self.peeked)
    }

    fn next(&mut self) -> Result<Option<u8>> {
        let byte = self.peek()?;
        self.peeked = None;
        Ok(byte)
    }

    /// One whitespace-delimited decimal word value.
    fn number(&mut self) -> Result<Word> {
        let value = self.count()?;
        if value > Word::MAX as usize {
            return Err(Error::MalformedImage);
        }
        Ok(value as Word)
    }

    /// One whitespace-delimited decimal count. The stack depth is
    /// unbounded, so counts are wider than a word.
    fn count(&mut self) -> Result<usize> {
        while matches!(self.peek()?, Some(byte) if byte.is_ascii_whitespace()) {
            self.next()?;
        }
        let mut value: usize = 0;
        let mut digits = false;
        while let Some(byte) = self.peek()? {
            if !byte.is_ascii_digit() {
                break;
            }
            self.next()?;
            digits = true;
            value = value
                .checked_mul(10)
                .and_then(|value| value.checked_add((byte - b'0') as usize))
                .ok_or(Error::MalformedImage)?;
        }
        if digits {
            Ok(value)
        } else {
            Err(Error::MalformedImage)
        }
    }

    fn skip_past_sentinel(&mut self) -> Result<()> {
        loop {
            match self.next()? {
                Some(SENTINEL) => return Ok(()),
                Some(_) => {}
                None => return Err(Error::MalformedImage),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample() -> Snapshot {
        Snapshot {
            pc: 1531,
            registers: [0, 1, 2, 3, 4, 5, 6, 32767],
            stack: vec![10, 20, 30],
            memory: vec![19, 72, 19, 73, 0],
        }
    }

    #[test]
    fn round_trips_bit_identical() {
        let snapshot = sample();
        let mut bytes = Vec::new();
        snapshot.write_to(&mut bytes).unwrap();
        let restored = Snapshot::read_from(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn header_is_text_then_sentinel_then_raw_words() {
        let snapshot = Snapshot {
            pc: 7,
            registers: [0; 8],
            stack: vec![9],
            memory: vec![513],
        };
        let mut bytes = Vec::new();
        snapshot.write_to(&mut bytes).unwrap();
        assert_eq!(
            bytes,
            b"7\n0\n0\n0\n0\n0\n0\n0\n0\n1\n9\n~\x01\x02".to_vec()
        );
    }

    #[test]
    fn deep_stack_round_trips() {
        // The stack can outgrow the word range; its depth field must
        // not be clamped to it.
        let snapshot = Snapshot {
            pc: 0,
            registers: [0; 8],
            stack: vec![1; 70000],
            memory: vec![0],
        };
        let mut bytes = Vec::new();
        snapshot.write_to(&mut bytes).unwrap();
        let restored = Snapshot::read_from(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn empty_stack_round_trips() {
        let snapshot = Snapshot {
            pc: 0,
            registers: [0; 8],
            stack: vec![],
            memory: vec![0],
        };
        let mut bytes = Vec::new();
        snapshot.write_to(&mut bytes).unwrap();
        let restored = Snapshot::read_from(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn truncated_header_is_malformed() {
        let mut bytes = Cursor::new(b"12\n34\n".to_vec());
        assert!(matches!(
            Snapshot::read_from(&mut bytes),
            Err(Error::MalformedImage)
        ));
    }

    #[test]
    fn garbage_header_is_malformed() {
        let mut bytes = Cursor::new(b"abc~".to_vec());
        assert!(matches!(
            Snapshot::read_from(&mut bytes),
            Err(Error::MalformedImage)
        ));
    }
}
