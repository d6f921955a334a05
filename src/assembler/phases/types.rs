use crate::hw::{Byte, Register};
use derive_more::{Constructor, Display};

/*
    Phases:

        1.  Tokenization: each source line is trimmed and split at whitespace. Everything from the
            first token beginning with '#' onward is a comment and is dropped. Lines which end up
            empty never become statements.

        2.  Parsing: the first token of each line selects a `Mnemonic`, and the remaining tokens are
            checked against the exact shape that mnemonic expects, producing an `Instruction`. All
            validation (token counts, connector words, register names, byte ranges) happens here,
            so that nothing downstream can fail on a malformed line.

        3.  Generation: each `Instruction` is expanded into its `ByteContent`s (operation bytes,
            labels, and jumps whose destinations are still unresolved). The token list and the
            generated bytes together form a `Statement`.

        4.  Resolution: the `Program` lays out every statement from address 4, moves code out of
            the way of the display/overflow-flag block if it would land there, and then resolves
            each jump against the final label addresses.

        5.  Flattening: the resolved bytes are rendered as octal lines, prefixed with the initial
            register and program counter values.
*/

pub type LabelName = String;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Range,
    Name,
    Layout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Literal(Byte),
    Register(Register),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Test {
    IsZero,
    NotZero,
    Overflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Label(LabelName),
    Let {
        reg: Register,
        value: Byte,
        indirect: bool,
    },
    Goto(LabelName),
    Syscall,
    Memcopy {
        reg: Register,
        address: Byte,
        indirect: bool,
    },
    And(Byte),
    Or(Byte),
    Add {
        source: Operand,
        reg: Register,
    },
    Subtract {
        source: Operand,
        reg: Register,
    },
    If {
        reg: Register,
        test: Test,
        target: LabelName,
    },
    Halt,
    Bitshift {
        reg: Register,
        direction: Direction,
        count: Byte,
    },
    Noop,
    Bytes(Vec<Byte>),
}

#[derive(Debug, PartialEq, Clone, Eq, Constructor)]
pub struct Loc {
    line: usize,
}

impl Loc {
    pub fn line(&self) -> usize {
        self.line
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Located<T: Sized> {
    loc: Loc,
    val: T,
}

impl<T> Located<T> {
    pub fn with_loc(loc: Loc, val: T) -> Self {
        Located { loc, val }
    }

    pub fn loc(&self) -> &Loc {
        &self.loc
    }

    pub fn value(self) -> T {
        self.val
    }

    pub fn as_value(&self) -> &T {
        &self.val
    }

    pub fn map_result<S, E, F>(self, f: F) -> Result<Located<S>, Located<E>>
    where
        F: FnOnce(T) -> Result<S, E>,
    {
        let loc = self.loc;
        match f(self.val) {
            Ok(s) => Ok(Located::with_loc(loc, s)),
            Err(err) => Err(Located::with_loc(loc, err)),
        }
    }
}
