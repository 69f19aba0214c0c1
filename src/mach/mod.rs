/*!
## Machine module

The virtual machine: a 16-bit word store, 8 registers, one stack, and a
fetch-decode-execute loop over 22 operations, with an optional debugger
and exact state snapshots.

Words in [0,32767] are literal numbers and words in [32768,32775] name
registers; nothing above 32775 is ever a legal operand. The machine is
single-threaded and never blocks: [`Machine::execute`] yields an
[`Event`] whenever it needs a console line or has output to show, and
the front-end pumps it.
*/

/// Machine storage unit.
pub type Word = u16;
/// Index into memory.
pub type Address = usize;

mod debug;
mod error;
pub mod image;
mod machine;
mod memory;
mod opcode;
mod snapshot;
mod stack;
mod word;

pub use debug::{Command, ParseError, SIGIL};
pub use error::Error;
pub use machine::{Event, Machine, State};
pub use memory::Memory;
pub use opcode::Opcode;
pub use snapshot::Snapshot;
pub use stack::Stack;

#[cfg(test)]
mod tests;
