use super::{Error, Word};

type Result<T> = std::result::Result<T, Error>;

/// ## Stack enforced vector of words
///
/// One stack serves both the explicit `push`/`pop` instructions and the
/// return addresses of `call`/`ret`; program data and return addresses
/// interleave here by design.
#[derive(Clone, PartialEq)]
pub struct Stack {
    vec: Vec<Word>,
}

impl std::fmt::Debug for Stack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.vec)
    }
}

impl Stack {
    pub fn new() -> Stack {
        Stack { vec: vec![] }
    }

    /// Rebuild a stack from saved values, bottom first.
    pub fn from_bottom_up(values: Vec<Word>) -> Stack {
        Stack { vec: values }
    }

    pub fn len(&self) -> usize {
        self.vec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }

    pub fn push(&mut self, word: Word) {
        self.vec.push(word)
    }

    pub fn pop(&mut self) -> Result<Word> {
        match self.vec.pop() {
            Some(word) => Ok(word),
            None => Err(Error::StackUnderflow),
        }
    }

    /// Bottom-to-top iteration, the snapshot serialization order.
    pub fn iter(&self) -> std::slice::Iter<'_, Word> {
        self.vec.iter()
    }
}

impl Default for Stack {
    fn default() -> Stack {
        Stack::new()
    }
}
