use super::phases::{parse, types::Instruction, types::LabelName};
use crate::hw::{self, opcode, Addr, Byte, Register};
use itertools::Itertools;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    name: LabelName,
    used: bool,
}

impl Label {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_used(&self) -> bool {
        self.used
    }

    pub(super) fn mark_used(&mut self) {
        self.used = true;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    Unconditional,
    IsZero(Register),
    NotZero(Register),
    /// The flag-test half of an `IF ... OVERFLOW` sequence.
    Overflow(Register),
}

impl JumpKind {
    pub fn opcode(self) -> Byte {
        match self {
            JumpKind::Unconditional => opcode::JUMP,
            JumpKind::IsZero(reg) => reg.apply(opcode::IS_ZERO),
            JumpKind::NotZero(reg) => reg.apply(opcode::NOT_ZERO),
            JumpKind::Overflow(reg) => reg.overflow_flag(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Jump {
    kind: JumpKind,
    target: LabelName,
    destination: Option<Byte>,
}

impl Jump {
    pub fn kind(&self) -> JumpKind {
        self.kind
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// `None` until the owning program has been laid out.
    pub fn destination(&self) -> Option<Byte> {
        self.destination
    }

    pub(super) fn set_destination(&mut self, dest: Byte) {
        self.destination = Some(dest);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Operation(Byte),
    Label(Label),
    Jump(Jump),
}

/// Something which occupies zero or more cells of memory in the final image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteContent {
    location: Addr,
    content: Content,
}

impl ByteContent {
    fn new(content: Content) -> Self {
        ByteContent {
            location: 0,
            content,
        }
    }

    pub fn operation(op: Byte) -> Self {
        ByteContent::new(Content::Operation(op))
    }

    pub fn label(name: LabelName) -> Self {
        ByteContent::new(Content::Label(Label { name, used: false }))
    }

    pub fn jump(kind: JumpKind, target: LabelName) -> Self {
        ByteContent::new(Content::Jump(Jump {
            kind,
            target,
            destination: None,
        }))
    }

    pub fn location(&self) -> Addr {
        self.location
    }

    pub(super) fn set_location(&mut self, location: Addr) {
        self.location = location;
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub(super) fn content_mut(&mut self) -> &mut Content {
        &mut self.content
    }

    pub fn cells(&self) -> Addr {
        match self.content {
            Content::Operation(_) => 1,
            Content::Label(_) => 0,
            Content::Jump(_) => hw::JUMP_CELLS,
        }
    }

    /// The bytes this content places in memory. An unresolved jump has destination zero.
    pub fn values(&self) -> Vec<Byte> {
        match &self.content {
            Content::Operation(op) => vec![*op],
            Content::Label(_) => vec![],
            Content::Jump(jump) => vec![jump.kind.opcode(), jump.destination.unwrap_or(0)],
        }
    }

    /// One zero-padded octal line per occupied cell, or `None` for a label.
    pub fn formatted(&self) -> Option<String> {
        match self.content {
            Content::Label(_) => None,
            _ => Some(
                self.values()
                    .into_iter()
                    .map(|val| hw::format_octal(val.into()))
                    .join("\n"),
            ),
        }
    }
}

impl Display for ByteContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.content {
            Content::Label(label) => write!(f, "(label {})", label.name),
            _ => {
                for (offset, val) in self.values().into_iter().enumerate() {
                    if offset != 0 {
                        writeln!(f)?;
                    }
                    write!(
                        f,
                        "{}: {}",
                        hw::format_octal(self.location + offset),
                        hw::format_octal(val.into())
                    )?;
                }
                Ok(())
            }
        }
    }
}

/// The bytes generated by one source line, along with the tokens they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    tokens: Vec<String>,
    bytes: Vec<ByteContent>,
}

impl Statement {
    pub fn new<S: AsRef<str>>(tokens: &[S]) -> Result<Self, parse::Error> {
        let inst = Instruction::parse(tokens)?;
        Ok(Statement::from_instruction(
            tokens.iter().map(|tk| tk.as_ref().to_owned()).collect(),
            inst,
        ))
    }

    /// Build a statement from an already-validated instruction.
    pub(super) fn from_instruction(tokens: Vec<String>, inst: Instruction) -> Self {
        Statement {
            tokens,
            bytes: inst.generate(),
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn bytes(&self) -> &[ByteContent] {
        &self.bytes
    }

    pub(super) fn bytes_mut(&mut self) -> &mut [ByteContent] {
        &mut self.bytes
    }

    pub fn cells(&self) -> Addr {
        self.bytes.iter().map(ByteContent::cells).sum()
    }

    /// The source tokens joined by single spaces.
    pub fn formatted(&self) -> String {
        self.tokens.iter().join(" ")
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.formatted())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn statement(line: &str) -> Statement {
        Statement::new(&line.split_whitespace().collect::<Vec<_>>()).unwrap()
    }

    #[test]
    fn cell_counts() {
        assert_eq!(ByteContent::operation(0o300).cells(), 1);
        assert_eq!(ByteContent::label("top".to_owned()).cells(), 0);
        assert_eq!(
            ByteContent::jump(JumpKind::Unconditional, "top".to_owned()).cells(),
            2
        );
    }

    #[test]
    fn jump_opcodes() {
        assert_eq!(JumpKind::Unconditional.opcode(), 0o344);
        assert_eq!(JumpKind::IsZero(Register::A).opcode(), 0o044);
        assert_eq!(JumpKind::NotZero(Register::A).opcode(), 0o043);
        assert_eq!(JumpKind::IsZero(Register::B).opcode(), 0o144);
        assert_eq!(JumpKind::NotZero(Register::B).opcode(), 0o143);
        assert_eq!(JumpKind::IsZero(Register::X).opcode(), 0o244);
        assert_eq!(JumpKind::NotZero(Register::X).opcode(), 0o243);
        assert_eq!(JumpKind::Overflow(Register::A).opcode(), 0o201);
        assert_eq!(JumpKind::Overflow(Register::B).opcode(), 0o202);
        assert_eq!(JumpKind::Overflow(Register::X).opcode(), 0o203);
    }

    #[test]
    fn formatted_bytes() {
        assert_eq!(ByteContent::operation(0o23).formatted().as_deref(), Some("0023"));
        assert_eq!(ByteContent::label("top".to_owned()).formatted(), None);

        let mut jump = ByteContent::jump(JumpKind::NotZero(Register::B), "top".to_owned());
        assert_eq!(jump.formatted().as_deref(), Some("0143\n0000"));
        if let Content::Jump(jump) = jump.content_mut() {
            jump.set_destination(0o204);
        }
        assert_eq!(jump.formatted().as_deref(), Some("0143\n0204"));
    }

    #[test]
    fn displayed_with_location() {
        let mut op = ByteContent::operation(0o377);
        op.set_location(0o12);
        assert_eq!(op.to_string(), "0012: 0377");

        let mut jump = ByteContent::jump(JumpKind::Unconditional, "top".to_owned());
        jump.set_location(0o6);
        assert_eq!(jump.to_string(), "0006: 0344\n0007: 0000");

        assert_eq!(ByteContent::label("top".to_owned()).to_string(), "(label top)");
    }

    #[test]
    fn statement_keeps_tokens() {
        let stmt = statement("IF B NOTZERO GOTO TopLoop");
        assert_eq!(stmt.formatted(), "IF B NOTZERO GOTO TopLoop");
        assert_eq!(stmt.to_string(), "IF B NOTZERO GOTO TopLoop");
        assert_eq!(stmt.cells(), 2);
    }

    #[test]
    fn statement_rejects_bad_tokens() {
        assert_eq!(
            Statement::new(&["LET", "Q", "=", "1"]),
            Err(parse::Error::BadRegisterName("Q".to_owned()))
        );
    }
}
