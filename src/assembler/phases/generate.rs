use super::types::{Direction, Instruction, Operand, Test};
use crate::assembler::model::{ByteContent, JumpKind};
use crate::hw::{opcode, Byte, Register};

fn with_mode(base: Byte, set: bool) -> Byte {
    if set {
        base + opcode::INDIRECT
    } else {
        base
    }
}

impl Instruction {
    /// Expand into the `ByteContent`s making up this instruction. Everything which could be
    /// wrong with a statement was rejected during parsing, so this cannot fail.
    pub fn generate(self) -> Vec<ByteContent> {
        match self {
            Instruction::Label(name) => vec![ByteContent::label(name)],
            Instruction::Let {
                reg,
                value,
                indirect,
            } => Instruction::generate_pair(with_mode(reg.apply(opcode::LET), indirect), value),
            Instruction::Goto(target) => {
                vec![ByteContent::jump(JumpKind::Unconditional, target)]
            }
            Instruction::Syscall => vec![ByteContent::operation(opcode::SYSCALL)],
            Instruction::Memcopy {
                reg,
                address,
                indirect,
            } => {
                Instruction::generate_pair(with_mode(reg.apply(opcode::MEMCOPY), indirect), address)
            }
            Instruction::And(value) => Instruction::generate_pair(opcode::AND, value),
            Instruction::Or(value) => Instruction::generate_pair(opcode::OR, value),
            Instruction::Add { source, reg } => {
                Instruction::generate_arithmetic(opcode::ADD, source, reg)
            }
            Instruction::Subtract { source, reg } => {
                Instruction::generate_arithmetic(opcode::SUBTRACT, source, reg)
            }
            Instruction::If { reg, test, target } => Instruction::generate_if(reg, test, target),
            Instruction::Halt => vec![ByteContent::operation(opcode::HALT)],
            Instruction::Bitshift {
                reg,
                direction,
                count,
            } => vec![ByteContent::operation(Instruction::shift_opcode(
                reg, direction, count,
            ))],
            Instruction::Noop => vec![ByteContent::operation(opcode::NOOP)],
            Instruction::Bytes(values) => values.into_iter().map(ByteContent::operation).collect(),
        }
    }

    fn generate_pair(op: Byte, operand: Byte) -> Vec<ByteContent> {
        vec![ByteContent::operation(op), ByteContent::operation(operand)]
    }

    fn generate_arithmetic(base: Byte, source: Operand, reg: Register) -> Vec<ByteContent> {
        let (operand, from_register) = match source {
            Operand::Literal(value) => (value, false),
            Operand::Register(src) => (src.address(), true),
        };
        Instruction::generate_pair(with_mode(reg.apply(base), from_register), operand)
    }

    fn generate_if(reg: Register, test: Test, target: String) -> Vec<ByteContent> {
        match test {
            Test::IsZero => vec![ByteContent::jump(JumpKind::IsZero(reg), target)],
            Test::NotZero => vec![ByteContent::jump(JumpKind::NotZero(reg), target)],
            // There is no jump-on-overflow, so probe the flag and skip the jump when it is clear.
            Test::Overflow => vec![
                ByteContent::operation(opcode::OVERFLOW_PROBE),
                ByteContent::operation(JumpKind::Overflow(reg).opcode()),
                ByteContent::jump(JumpKind::Unconditional, target),
            ],
        }
    }

    fn shift_opcode(reg: Register, direction: Direction, count: Byte) -> Byte {
        let mut op = opcode::SHIFT;
        if direction == Direction::Left {
            op += opcode::SHIFT_LEFT;
        }
        if reg == Register::B {
            op += opcode::SHIFT_B;
        }
        // A count of 4 is encoded as zero count bits.
        if count < 4 {
            op += count * opcode::SHIFT_COUNT;
        }
        op
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn values(line: &str) -> Vec<Vec<Byte>> {
        Instruction::parse(&line.split_whitespace().collect::<Vec<_>>())
            .unwrap()
            .generate()
            .iter()
            .map(ByteContent::values)
            .collect()
    }

    fn flat(line: &str) -> Vec<Byte> {
        values(line).into_iter().flatten().collect()
    }

    #[test]
    fn let_immediate() {
        assert_eq!(flat("LET A = 0105"), vec![0o023, 0o105]);
        assert_eq!(flat("LET B = 0217"), vec![0o123, 0o217]);
        assert_eq!(flat("LET X = 0x7F"), vec![0o223, 0o177]);
    }

    #[test]
    fn let_indirect() {
        assert_eq!(flat("LET A = VALUEIN 0377"), vec![0o024, 0o377]);
        assert_eq!(flat("LET B = VALUEIN INPUT"), vec![0o124, 0o377]);
        assert_eq!(flat("LET X = VALUEIN P"), vec![0o224, 0o003]);
    }

    #[test]
    fn memcopy() {
        assert_eq!(flat("MEMCOPY A TO DISPLAY"), vec![0o034, 0o200]);
        assert_eq!(flat("MEMCOPY B TO 0150"), vec![0o134, 0o150]);
        assert_eq!(flat("MEMCOPY X TO ADDRESSIN B"), vec![0o235, 0o001]);
    }

    #[test]
    fn logical() {
        assert_eq!(flat("AND 0177"), vec![0o323, 0o177]);
        assert_eq!(flat("OR 1"), vec![0o303, 0o001]);
    }

    #[test]
    fn add_and_subtract() {
        assert_eq!(flat("ADD 1 TO A"), vec![0o003, 0o001]);
        assert_eq!(flat("ADD B TO A"), vec![0o004, 0o001]);
        assert_eq!(flat("ADD X TO B"), vec![0o104, 0o002]);
        assert_eq!(flat("ADD A TO X"), vec![0o204, 0o000]);
        assert_eq!(flat("SUBTRACT 012 FROM B"), vec![0o113, 0o012]);
        assert_eq!(flat("SUBTRACT A FROM X"), vec![0o214, 0o000]);
    }

    #[test]
    fn fixed_opcodes() {
        assert_eq!(flat("SYSCALL"), vec![0o360]);
        assert_eq!(flat("HALT"), vec![0o000]);
        assert_eq!(flat("NOOP"), vec![0o300]);
    }

    #[test]
    fn raw_bytes() {
        assert_eq!(values("BYTES 1 0377 0x10"), vec![vec![1], vec![0o377], vec![0x10]]);
    }

    #[test]
    fn label_occupies_nothing() {
        assert_eq!(values("LABEL here"), vec![Vec::<Byte>::new()]);
    }

    #[test]
    fn jumps_are_unresolved() {
        assert_eq!(values("GOTO somewhere"), vec![vec![0o344, 0]]);
        assert_eq!(values("IF A ISZERO GOTO top"), vec![vec![0o044, 0]]);
        assert_eq!(values("IF B NOTZERO GOTO top"), vec![vec![0o143, 0]]);
        assert_eq!(values("IF X ISZERO GOTO top"), vec![vec![0o244, 0]]);
    }

    #[test]
    fn overflow_is_three_contents() {
        for (reg, flag) in &[("A", 0o201), ("B", 0o202), ("X", 0o203)] {
            let line = format!("IF {} OVERFLOW GOTO top", reg);
            assert_eq!(values(&line), vec![vec![0o212], vec![*flag], vec![0o344, 0]]);
        }
    }

    #[test]
    fn bitshift() {
        assert_eq!(flat("BITSHIFT A LEFT 1"), vec![0o211]);
        assert_eq!(flat("BITSHIFT A LEFT"), vec![0o211]);
        assert_eq!(flat("BITSHIFT B RIGHT"), vec![0o051]);
        assert_eq!(flat("BITSHIFT B LEFT 2"), vec![0o261]);
        assert_eq!(flat("BITSHIFT A RIGHT 3"), vec![0o031]);
        assert_eq!(flat("BITSHIFT B RIGHT 3"), vec![0o071]);
    }

    #[test]
    fn bitshift_by_four_has_no_count_bits() {
        assert_eq!(flat("BITSHIFT B LEFT 4"), vec![0o241]);
        assert_eq!(flat("BITSHIFT A RIGHT 4"), vec![0o001]);
        assert_ne!(flat("BITSHIFT B LEFT 4"), flat("BITSHIFT B LEFT 1"));
    }
}
