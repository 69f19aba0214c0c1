use super::{Address, Word};
use thiserror::Error;

/// Input lines starting with this character are debugger commands when
/// debug mode is on.
pub const SIGIL: char = '~';

/// ## Debugger command grammar
///
/// Every command the debug console recognizes, one variant per command.
/// The console words are the external interface:
///
/// | input | command |
/// |---|---|
/// | `c` | continue, stop stepping |
/// | `n` | run one instruction |
/// | `step on`/`step off` | toggle instruction stepping |
/// | `quit` | end the session |
/// | `dump FILE` | save machine state to FILE |
/// | `showr N` / `showx N` | show register N in decimal / hex |
/// | `showallr` | show all 8 registers |
/// | `showpc` | show the program counter |
/// | `setr N V` | set register N to hex value V |
/// | `setpc A` | set the program counter to hex address A |
/// | `break A` | set a breakpoint at hex address A |
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Continue,
    Next,
    Step(bool),
    Quit,
    Dump(String),
    ShowRegister { index: usize, hex: bool },
    ShowRegisters,
    ShowPc,
    SetRegister { index: usize, value: Word },
    SetPc(Address),
    Break(Address),
}

/// Command parse failures are local: the console reports them and
/// re-prompts.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown command")]
pub struct ParseError;

impl std::str::FromStr for Command {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Command, ParseError> {
        let mut tokens = s.split_whitespace();
        Ok(match tokens.next().ok_or(ParseError)? {
            "c" => Command::Continue,
            "n" => Command::Next,
            "step" => match tokens.next() {
                Some("on") => Command::Step(true),
                Some("off") => Command::Step(false),
                _ => return Err(ParseError),
            },
            "quit" => Command::Quit,
            "dump" => Command::Dump(tokens.next().ok_or(ParseError)?.to_string()),
            "showr" => Command::ShowRegister {
                index: decimal(tokens.next())?,
                hex: false,
            },
            "showx" => Command::ShowRegister {
                index: decimal(tokens.next())?,
                hex: true,
            },
            "showallr" => Command::ShowRegisters,
            "showpc" => Command::ShowPc,
            "setr" => Command::SetRegister {
                index: decimal(tokens.next())?,
                value: hexadecimal(tokens.next())? as Word,
            },
            "setpc" => Command::SetPc(hexadecimal(tokens.next())?),
            "break" => Command::Break(hexadecimal(tokens.next())?),
            _ => return Err(ParseError),
        })
    }
}

fn decimal(token: Option<&str>) -> Result<usize, ParseError> {
    token.ok_or(ParseError)?.parse().map_err(|_| ParseError)
}

fn hexadecimal(token: Option<&str>) -> Result<usize, ParseError> {
    let token = token.ok_or(ParseError)?;
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    usize::from_str_radix(digits, 16).map_err(|_| ParseError)
}
