use super::{Address, Word};

/// ## Growable zero-extended word store
///
/// Reads past the end yield 0 without growing storage. Writes past the
/// end grow to the target address, zero-filling the gap. Every address
/// that reaches here came from value resolution or modulo-32768
/// arithmetic, so it is already in the number range; any `usize` is
/// still accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct Memory {
    words: Vec<Word>,
}

impl Memory {
    pub fn new(words: Vec<Word>) -> Memory {
        Memory { words }
    }

    pub fn load(&self, addr: Address) -> Word {
        match self.words.get(addr) {
            Some(word) => *word,
            None => 0,
        }
    }

    pub fn store(&mut self, addr: Address, word: Word) {
        if addr >= self.words.len() {
            self.words.resize(addr + 1, 0);
        }
        self.words[addr] = word;
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }
}
