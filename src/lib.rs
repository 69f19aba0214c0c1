//! # vm16
//!
//! A virtual machine for a 16-bit word bytecode with character I/O, an
//! interactive debugger, and resumable state snapshots.
//!
//! Load a program image and run it:
//! ```text
//! vm16 IMAGEFILE
//! ```
//! `-g` turns on the debugger, `-s` loads the file as a saved session,
//! and `-d` disables the snapshot normally written on Ctrl-C.

pub mod mach;
pub mod term;
