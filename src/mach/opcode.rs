use super::{Error, Word};

/// ## Virtual machine instruction set
///
/// Twenty-two operations over a fixed word encoding: the opcode word
/// followed by zero to three operand words. Destinations are always
/// register references; sources resolve to either a literal number or
/// the contents of a register.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Halt,
    Set,
    Push,
    Pop,
    Eq,
    Gt,
    Jmp,
    Jt,
    Jf,
    Add,
    Mult,
    Mod,
    And,
    Or,
    Not,
    Rmem,
    Wmem,
    Call,
    Ret,
    Out,
    In,
    Noop,
}

impl Opcode {
    /// Number of operand words following the opcode word.
    pub fn arity(self) -> usize {
        use Opcode::*;
        match self {
            Halt | Ret | Noop => 0,
            Push | Pop | Jmp | Call | Out | In => 1,
            Set | Jt | Jf | Not | Rmem | Wmem => 2,
            Eq | Gt | Add | Mult | Mod | And | Or => 3,
        }
    }
}

impl TryFrom<Word> for Opcode {
    type Error = Error;
    fn try_from(word: Word) -> Result<Opcode, Error> {
        use Opcode::*;
        Ok(match word {
            0 => Halt,
            1 => Set,
            2 => Push,
            3 => Pop,
            4 => Eq,
            5 => Gt,
            6 => Jmp,
            7 => Jt,
            8 => Jf,
            9 => Add,
            10 => Mult,
            11 => Mod,
            12 => And,
            13 => Or,
            14 => Not,
            15 => Rmem,
            16 => Wmem,
            17 => Call,
            18 => Ret,
            19 => Out,
            20 => In,
            21 => Noop,
            _ => return Err(Error::InvalidOpcode(word)),
        })
    }
}

impl std::fmt::Debug for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Opcode::*;
        match self {
            Halt => write!(f, "HALT"),
            Set => write!(f, "SET"),
            Push => write!(f, "PUSH"),
            Pop => write!(f, "POP"),
            Eq => write!(f, "EQ"),
            Gt => write!(f, "GT"),
            Jmp => write!(f, "JMP"),
            Jt => write!(f, "JT"),
            Jf => write!(f, "JF"),
            Add => write!(f, "ADD"),
            Mult => write!(f, "MULT"),
            Mod => write!(f, "MOD"),
            And => write!(f, "AND"),
            Or => write!(f, "OR"),
            Not => write!(f, "NOT"),
            Rmem => write!(f, "RMEM"),
            Wmem => write!(f, "WMEM"),
            Call => write!(f, "CALL"),
            Ret => write!(f, "RET"),
            Out => write!(f, "OUT"),
            In => write!(f, "IN"),
            Noop => write!(f, "NOOP"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mach::Error;

    #[test]
    fn decodes_all_defined_codes() {
        for code in 0..22 {
            assert!(Opcode::try_from(code).is_ok(), "opcode {}", code);
        }
        assert_eq!(Opcode::try_from(0).unwrap(), Opcode::Halt);
        assert_eq!(Opcode::try_from(19).unwrap(), Opcode::Out);
        assert_eq!(Opcode::try_from(21).unwrap(), Opcode::Noop);
    }

    #[test]
    fn rejects_undefined_codes() {
        assert!(matches!(Opcode::try_from(22), Err(Error::InvalidOpcode(22))));
        assert!(matches!(
            Opcode::try_from(65535),
            Err(Error::InvalidOpcode(65535))
        ));
    }

    #[test]
    fn arities_match_the_instruction_set() {
        assert_eq!(Opcode::Halt.arity(), 0);
        assert_eq!(Opcode::Ret.arity(), 0);
        assert_eq!(Opcode::Out.arity(), 1);
        assert_eq!(Opcode::Set.arity(), 2);
        assert_eq!(Opcode::Add.arity(), 3);
    }
}
