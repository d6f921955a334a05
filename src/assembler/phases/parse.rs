use super::tokenize::COMMENT_CHAR;
use super::types::{Direction, ErrorKind, Instruction, LabelName, Operand, Test};
use crate::common;
use crate::hw::{Byte, MemoryAlias, Register};
use std::convert::TryFrom;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum Mnemonic {
    #[strum(to_string = "LABEL")]
    Label,
    #[strum(to_string = "LET")]
    Let,
    #[strum(to_string = "GOTO")]
    Goto,
    #[strum(to_string = "SYSCALL")]
    Syscall,
    #[strum(to_string = "MEMCOPY")]
    Memcopy,
    #[strum(to_string = "AND")]
    And,
    #[strum(to_string = "OR")]
    Or,
    #[strum(to_string = "ADD")]
    Add,
    #[strum(to_string = "SUBTRACT")]
    Subtract,
    #[strum(to_string = "IF")]
    If,
    #[strum(to_string = "HALT")]
    Halt,
    #[strum(to_string = "BITSHIFT")]
    Bitshift,
    #[strum(to_string = "NOOP")]
    Noop,
    #[strum(to_string = "BYTES")]
    Bytes,
}

impl Mnemonic {
    pub fn parse(name: &str) -> Option<Self> {
        Mnemonic::iter().find(|m| common::eq_ignore_case(name, &m.to_string()))
    }

    /// The accepted shape of the statement, used in error messages.
    pub fn usage(self) -> &'static str {
        match self {
            Mnemonic::Label => "LABEL name",
            Mnemonic::Let => "LET register = [VALUEIN] value",
            Mnemonic::Goto => "GOTO label",
            Mnemonic::Syscall => "SYSCALL",
            Mnemonic::Memcopy => "MEMCOPY register TO [ADDRESSIN] address",
            Mnemonic::And => "AND value",
            Mnemonic::Or => "OR value",
            Mnemonic::Add => "ADD register|value TO register",
            Mnemonic::Subtract => "SUBTRACT register|value FROM register",
            Mnemonic::If => "IF register ISZERO|NOTZERO|OVERFLOW GOTO label",
            Mnemonic::Halt => "HALT",
            Mnemonic::Bitshift => "BITSHIFT A|B LEFT|RIGHT [1-4]",
            Mnemonic::Noop => "NOOP",
            Mnemonic::Bytes => "BYTES value [value ...]",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    EmptyStatement,
    UndefinedKeyword(String),
    Malformed(Mnemonic),
    NotNumeric(String),
    ByteOutOfRange(String),
    ShiftCountOutOfRange(i64),
    BadRegisterName(String),
    UnsupportedRegister(Mnemonic, Register),
    LabelNameHasSpaces(Mnemonic, String),
    ReservedLabelName(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptyStatement
            | Error::UndefinedKeyword(_)
            | Error::Malformed(_)
            | Error::NotNumeric(_) => ErrorKind::Syntax,
            Error::ByteOutOfRange(_) | Error::ShiftCountOutOfRange(_) => ErrorKind::Range,
            Error::BadRegisterName(_)
            | Error::UnsupportedRegister(..)
            | Error::LabelNameHasSpaces(..)
            | Error::ReservedLabelName(_) => ErrorKind::Name,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::EmptyStatement => write!(f, "Empty statement"),
            Error::UndefinedKeyword(kw) => write!(f, "Undefined keyword: {}", kw),
            Error::Malformed(m) => write!(f, "{} requires the form '{}'", m, m.usage()),
            Error::NotNumeric(raw) => write!(
                f,
                "Value must be a decimal, octal (leading 0) or hexadecimal (leading 0x) integer (found: {})",
                raw
            ),
            Error::ByteOutOfRange(raw) => {
                write!(f, "Byte value must be in range 0-0377 (found: {})", raw)
            }
            Error::ShiftCountOutOfRange(count) => {
                write!(f, "BITSHIFT count must be in range 1-4 (found: {})", count)
            }
            Error::BadRegisterName(name) => {
                write!(f, "Variable name must be A, B, or X (found: {})", name)
            }
            Error::UnsupportedRegister(m, reg) => {
                write!(f, "{} does not support register {}", m, reg)
            }
            Error::LabelNameHasSpaces(m, name) => write!(
                f,
                "{} takes a single label name, and label names may not contain spaces (found: {})",
                m, name
            ),
            Error::ReservedLabelName(name) => write!(
                f,
                "Label names may not start with '{}' (found: {})",
                COMMENT_CHAR, name
            ),
        }
    }
}

impl std::error::Error for Error {}

/// Names starting with the comment character are kept for labels the assembler synthesizes.
fn label_name(name: &str) -> Result<LabelName, Error> {
    if name.starts_with(COMMENT_CHAR) {
        Err(Error::ReservedLabelName(name.to_owned()))
    } else {
        Ok(name.to_owned())
    }
}

const ASSIGN: &str = "=";
const TO: &str = "TO";
const FROM: &str = "FROM";
const GOTO: &str = "GOTO";
const VALUEIN: &str = "VALUEIN";
const ADDRESSIN: &str = "ADDRESSIN";
const ISZERO: &str = "ISZERO";
const NOTZERO: &str = "NOTZERO";
const OVERFLOW: &str = "OVERFLOW";
const LEFT: &str = "LEFT";
const RIGHT: &str = "RIGHT";

const DEFAULT_SHIFT_COUNT: i64 = 1;
const MAX_SHIFT_COUNT: i64 = 4;

fn parse_integer(raw: &str) -> Result<i64, Error> {
    let not_numeric = || Error::NotNumeric(raw.to_owned());

    let (negative, digits) = match raw.chars().next() {
        Some('-') => (true, &raw[1..]),
        Some('+') => (false, &raw[1..]),
        _ => (false, raw),
    };

    let (radix, digits) = if digits.starts_with("0x") || digits.starts_with("0X") {
        (16, &digits[2..])
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };

    // `from_str_radix` would otherwise accept a second sign.
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(not_numeric());
    }

    let val = i64::from_str_radix(digits, radix)
        // Only possible on overflow, so the value is certainly not a byte.
        .map_err(|_| Error::ByteOutOfRange(raw.to_owned()))?;

    Ok(if negative { -val } else { val })
}

pub fn parse_byte(raw: &str) -> Result<Byte, Error> {
    let val = parse_integer(raw)?;
    Byte::try_from(val).map_err(|_| Error::ByteOutOfRange(raw.to_owned()))
}

pub fn parse_register(raw: &str) -> Result<Register, Error> {
    Register::parse(raw).ok_or_else(|| Error::BadRegisterName(raw.to_owned()))
}

/// Resolve a raw address operand, which may be one of the `MemoryAlias` names.
pub fn parse_address(raw: &str) -> Result<Byte, Error> {
    match MemoryAlias::parse(raw) {
        Some(alias) => Ok(alias.address()),
        None => parse_byte(raw),
    }
}

fn is_keyword(raw: &str, keyword: &str) -> bool {
    common::eq_ignore_case(raw, keyword)
}

impl Instruction {
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Instruction, Error> {
        let tokens: Vec<&str> = tokens.iter().map(AsRef::as_ref).collect();
        let (first, args) = tokens.split_first().ok_or(Error::EmptyStatement)?;
        let mnemonic =
            Mnemonic::parse(first).ok_or_else(|| Error::UndefinedKeyword((*first).to_owned()))?;

        match mnemonic {
            Mnemonic::Label => Instruction::parse_label_name(mnemonic, args).map(Instruction::Label),
            Mnemonic::Let => Instruction::parse_let(args),
            Mnemonic::Goto => Instruction::parse_label_name(mnemonic, args).map(Instruction::Goto),
            Mnemonic::Syscall => Instruction::parse_bare(mnemonic, args, Instruction::Syscall),
            Mnemonic::Memcopy => Instruction::parse_memcopy(args),
            Mnemonic::And => Instruction::parse_logical(mnemonic, args).map(Instruction::And),
            Mnemonic::Or => Instruction::parse_logical(mnemonic, args).map(Instruction::Or),
            Mnemonic::Add => Instruction::parse_arithmetic(mnemonic, TO, args)
                .map(|(source, reg)| Instruction::Add { source, reg }),
            Mnemonic::Subtract => Instruction::parse_arithmetic(mnemonic, FROM, args)
                .map(|(source, reg)| Instruction::Subtract { source, reg }),
            Mnemonic::If => Instruction::parse_if(args),
            Mnemonic::Halt => Instruction::parse_bare(mnemonic, args, Instruction::Halt),
            Mnemonic::Bitshift => Instruction::parse_bitshift(args),
            Mnemonic::Noop => Instruction::parse_bare(mnemonic, args, Instruction::Noop),
            Mnemonic::Bytes => Instruction::parse_bytes(args),
        }
    }

    fn parse_bare(
        mnemonic: Mnemonic,
        args: &[&str],
        inst: Instruction,
    ) -> Result<Instruction, Error> {
        if args.is_empty() {
            Ok(inst)
        } else {
            Err(Error::Malformed(mnemonic))
        }
    }

    fn parse_label_name(mnemonic: Mnemonic, args: &[&str]) -> Result<LabelName, Error> {
        match args {
            [] => Err(Error::Malformed(mnemonic)),
            [name] => label_name(name),
            names => Err(Error::LabelNameHasSpaces(mnemonic, names.join(" "))),
        }
    }

    fn parse_let(args: &[&str]) -> Result<Instruction, Error> {
        let (reg, value, indirect) = match args {
            [reg, ASSIGN, value] => (reg, parse_byte(value)?, false),
            [reg, ASSIGN, mode, value] if is_keyword(mode, VALUEIN) => {
                (reg, parse_address(value)?, true)
            }
            _ => return Err(Error::Malformed(Mnemonic::Let)),
        };

        Ok(Instruction::Let {
            reg: parse_register(reg)?,
            value,
            indirect,
        })
    }

    fn parse_memcopy(args: &[&str]) -> Result<Instruction, Error> {
        let (reg, target, indirect) = match args {
            [reg, to, target] if is_keyword(to, TO) => (reg, target, false),
            [reg, to, mode, target] if is_keyword(to, TO) && is_keyword(mode, ADDRESSIN) => {
                (reg, target, true)
            }
            _ => return Err(Error::Malformed(Mnemonic::Memcopy)),
        };

        Ok(Instruction::Memcopy {
            reg: parse_register(reg)?,
            address: parse_address(target)?,
            indirect,
        })
    }

    fn parse_logical(mnemonic: Mnemonic, args: &[&str]) -> Result<Byte, Error> {
        match args {
            [value] => parse_byte(value),
            _ => Err(Error::Malformed(mnemonic)),
        }
    }

    fn parse_arithmetic(
        mnemonic: Mnemonic,
        connector: &str,
        args: &[&str],
    ) -> Result<(Operand, Register), Error> {
        match args {
            [source, conn, reg] if is_keyword(conn, connector) => {
                let source = match Register::parse(source) {
                    Some(src) => Operand::Register(src),
                    None => Operand::Literal(parse_byte(source)?),
                };
                Ok((source, parse_register(reg)?))
            }
            _ => Err(Error::Malformed(mnemonic)),
        }
    }

    fn parse_if(args: &[&str]) -> Result<Instruction, Error> {
        let (reg, test, target) = match args {
            [reg, test, goto, target] if is_keyword(goto, GOTO) => (reg, test, target),
            _ => return Err(Error::Malformed(Mnemonic::If)),
        };

        let reg = parse_register(reg)?;
        let test = if is_keyword(test, ISZERO) {
            Test::IsZero
        } else if is_keyword(test, NOTZERO) {
            Test::NotZero
        } else if is_keyword(test, OVERFLOW) {
            Test::Overflow
        } else {
            return Err(Error::Malformed(Mnemonic::If));
        };

        Ok(Instruction::If {
            reg,
            test,
            target: label_name(target)?,
        })
    }

    fn parse_bitshift(args: &[&str]) -> Result<Instruction, Error> {
        let (reg, direction, count) = match args {
            [reg, direction] => (reg, direction, None),
            [reg, direction, count] => (reg, direction, Some(count)),
            _ => return Err(Error::Malformed(Mnemonic::Bitshift)),
        };

        let reg = match parse_register(reg)? {
            Register::X => return Err(Error::UnsupportedRegister(Mnemonic::Bitshift, Register::X)),
            reg => reg,
        };

        let direction = if is_keyword(direction, LEFT) {
            Direction::Left
        } else if is_keyword(direction, RIGHT) {
            Direction::Right
        } else {
            return Err(Error::Malformed(Mnemonic::Bitshift));
        };

        let count = count
            .map(|count| parse_integer(count))
            .transpose()?
            .unwrap_or(DEFAULT_SHIFT_COUNT);
        if count < DEFAULT_SHIFT_COUNT || count > MAX_SHIFT_COUNT {
            return Err(Error::ShiftCountOutOfRange(count));
        }

        Ok(Instruction::Bitshift {
            reg,
            direction,
            // The range check above makes this lossless.
            count: count as Byte,
        })
    }

    fn parse_bytes(args: &[&str]) -> Result<Instruction, Error> {
        if args.is_empty() {
            return Err(Error::Malformed(Mnemonic::Bytes));
        }

        Ok(Instruction::Bytes(
            args.iter()
                .map(|raw| parse_byte(raw))
                .collect::<Result<Vec<_>, _>>()?,
        ))
    }
}
