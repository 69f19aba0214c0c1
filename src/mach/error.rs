use super::Word;
use thiserror::Error;

/// ## Machine fault taxonomy
///
/// Every way a program image can fail to load or a running machine can
/// fault. `ret` on an empty stack is deliberately absent: it is the
/// normal-termination signal, not an error.
#[derive(Error, Debug)]
pub enum Error {
    /// The byte stream ended in the middle of a 16-bit word.
    #[error("malformed image: odd byte count")]
    MalformedImage,
    /// Fetched word is not one of the 22 defined operation codes.
    #[error("invalid opcode {0}")]
    InvalidOpcode(Word),
    /// Word outside the literal and register-reference ranges where an
    /// operand is required, or a literal where a register is required.
    #[error("invalid operand {0}")]
    InvalidOperand(Word),
    /// `pop` on an empty stack.
    #[error("pop on empty stack")]
    StackUnderflow,
    /// `mod` with a zero divisor.
    #[error("division by zero")]
    DivisionByZero,
    /// `in` with the input source closed and nothing buffered.
    #[error("input exhausted")]
    InputExhausted,
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
