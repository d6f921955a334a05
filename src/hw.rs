use crate::common;
use derive_more::Display;
use static_assertions::const_assert;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

pub type Byte = u8;

/// An absolute memory address. Kept wider than a `Byte` so that a layout which
/// runs off the end of memory can be detected rather than wrapping.
pub type Addr = usize;

pub const MEMORY_SIZE: Addr = 0o400;

/// Addresses 0-3 hold the initial contents of A, B, X and the program counter.
pub const PROGRAM_START: Addr = 0o004;

pub const DISPLAY: Addr = 0o200;
pub const INPUT: Addr = 0o377;

/// One past the last address of the display register and the three overflow
/// flags. The only program bytes in `DISPLAY..RESERVED_END` are the NOOPs padding
/// out a jump over the block.
pub const RESERVED_END: Addr = 0o204;

/// A jump occupies its opcode cell and its destination cell.
pub const JUMP_CELLS: Addr = 2;

/// The latest running address after which a skip jump may still be inserted.
pub const SAFE_JUMP_LIMIT: Addr = 0o176;

const_assert!(SAFE_JUMP_LIMIT + JUMP_CELLS <= DISPLAY);
const_assert!(PROGRAM_START < SAFE_JUMP_LIMIT);
const_assert!(RESERVED_END <= INPUT);

pub mod opcode {
    use super::Byte;

    pub const HALT: Byte = 0o000;
    pub const ADD: Byte = 0o003;
    pub const SUBTRACT: Byte = 0o013;
    pub const LET: Byte = 0o023;
    pub const MEMCOPY: Byte = 0o034;
    pub const NOT_ZERO: Byte = 0o043;
    pub const IS_ZERO: Byte = 0o044;
    pub const OVERFLOW_PROBE: Byte = 0o212;
    pub const NOOP: Byte = 0o300;
    pub const OR: Byte = 0o303;
    pub const AND: Byte = 0o323;
    pub const JUMP: Byte = 0o344;
    pub const SYSCALL: Byte = 0o360;

    /// Set on LET/MEMCOPY/ADD/SUBTRACT when the operand is an address (or a
    /// register) rather than an immediate value.
    pub const INDIRECT: Byte = 0o001;

    pub const SHIFT: Byte = 0o001;
    pub const SHIFT_LEFT: Byte = 0o200;
    pub const SHIFT_B: Byte = 0o040;
    pub const SHIFT_COUNT: Byte = 0o010;
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Register {
    A,
    B,
    X,
}

impl Register {
    pub fn parse(name: &str) -> Option<Self> {
        Register::iter().find(|reg| common::eq_ignore_case(name, &reg.to_string()))
    }

    /// The amount added to a register-relative base opcode.
    pub const fn offset(self) -> Byte {
        match self {
            Register::A => 0o000,
            Register::B => 0o100,
            Register::X => 0o200,
        }
    }

    /// The memory cell backing this register.
    pub const fn address(self) -> Byte {
        match self {
            Register::A => 0o000,
            Register::B => 0o001,
            Register::X => 0o002,
        }
    }

    /// The memory cell holding this register's overflow/carry flag.
    pub const fn overflow_flag(self) -> Byte {
        match self {
            Register::A => 0o201,
            Register::B => 0o202,
            Register::X => 0o203,
        }
    }

    pub const fn apply(self, base: Byte) -> Byte {
        base + self.offset()
    }
}

/// Names which may stand in for a raw address operand.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum MemoryAlias {
    A,
    B,
    X,
    P,
    #[display(fmt = "DISPLAY")]
    Display,
    #[display(fmt = "INPUT")]
    Input,
}

impl MemoryAlias {
    pub fn parse(name: &str) -> Option<Self> {
        MemoryAlias::iter().find(|alias| common::eq_ignore_case(name, &alias.to_string()))
    }

    pub const fn address(self) -> Byte {
        match self {
            MemoryAlias::A => Register::A.address(),
            MemoryAlias::B => Register::B.address(),
            MemoryAlias::X => Register::X.address(),
            MemoryAlias::P => 0o003,
            MemoryAlias::Display => DISPLAY as Byte,
            MemoryAlias::Input => INPUT as Byte,
        }
    }
}

pub fn format_octal(val: Addr) -> String {
    format!("{:04o}", val)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn register_offsets() {
        assert_eq!(Register::A.apply(opcode::LET), 0o023);
        assert_eq!(Register::B.apply(opcode::LET), 0o123);
        assert_eq!(Register::X.apply(opcode::LET), 0o223);
    }

    #[test]
    fn register_names_ignore_case() {
        assert_eq!(Register::parse("b"), Some(Register::B));
        assert_eq!(Register::parse("X"), Some(Register::X));
        assert_eq!(Register::parse("BX"), None);
        assert_eq!(Register::parse("P"), None);
    }

    #[test]
    fn memory_aliases() {
        assert_eq!(MemoryAlias::parse("display").map(MemoryAlias::address), Some(0o200));
        assert_eq!(MemoryAlias::parse("Input").map(MemoryAlias::address), Some(0o377));
        assert_eq!(MemoryAlias::parse("p").map(MemoryAlias::address), Some(0o003));
        assert_eq!(MemoryAlias::parse("0200"), None);
    }

    #[test]
    fn octal_is_zero_padded() {
        assert_eq!(format_octal(0), "0000");
        assert_eq!(format_octal(0o344), "0344");
        assert_eq!(format_octal(10), "0012");
    }
}
