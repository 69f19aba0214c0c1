use super::Word;

/// Modulus for all machine arithmetic.
pub const MODULUS: Word = 32768;

/// First word encoding a register reference.
pub const REGISTER_BASE: Word = 32768;

/// Number of general-purpose registers.
pub const REGISTERS: usize = 8;

/// Words in [0,32767] are literal numbers.
pub fn is_number(word: Word) -> bool {
    word < REGISTER_BASE
}

/// Words in [32768,32775] select one of the 8 registers.
pub fn is_register(word: Word) -> bool {
    (REGISTER_BASE..REGISTER_BASE + REGISTERS as Word).contains(&word)
}

/// Register index encoded by a register reference. Callers must have
/// checked `is_register` first.
pub fn to_register(word: Word) -> usize {
    debug_assert!(is_register(word));
    (word - REGISTER_BASE) as usize
}

/// Mask to the 15 bits of the number range. `not` complements over the
/// full storage word, so it must mask or the high bit would turn its
/// result into a register reference.
pub fn low15(word: Word) -> Word {
    word & 0x7fff
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_ranges() {
        assert!(is_number(0));
        assert!(is_number(32767));
        assert!(!is_number(32768));
        assert!(is_register(32768));
        assert!(is_register(32775));
        assert!(!is_register(32767));
        assert!(!is_register(32776));
        assert!(!is_number(32776));
    }

    #[test]
    fn register_indices() {
        assert_eq!(to_register(32768), 0);
        assert_eq!(to_register(32775), 7);
    }

    #[test]
    fn complement_is_self_inverse() {
        for x in [0, 1, 0x2aaa, 0x5555, 32767] {
            assert_eq!(low15(!low15(!x)), x);
        }
    }
}
