use kenbak::assembler::{model::Statement, Program};

pub const HEADER: &str = "0000\n0000\n0000\n0004\n";

pub fn statement(line: &str) -> Statement {
    Statement::new(&line.split_whitespace().collect::<Vec<_>>())
        .unwrap_or_else(|err| panic!("'{}' did not parse: {}", line, err))
}

pub fn program_from<'a>(lines: impl IntoIterator<Item = &'a str>) -> Program {
    let mut prog = Program::new();
    for line in lines {
        prog.add_statement(statement(line));
    }
    prog
}

/// `count` NOOPs followed by `tail`, for pushing code up against the display memory.
pub fn padded<'a>(count: usize, tail: &[&'a str]) -> Program {
    program_from(
        std::iter::repeat("NOOP")
            .take(count)
            .chain(tail.iter().copied()),
    )
}

macro_rules! program {
    ($($line:expr),* $(,)?) => {
        common::program_from(vec![$(AsRef::<str>::as_ref($line)),*])
    };
}

macro_rules! assert_codes {
    ($prog:expr, $($code:expr),* $(,)?) => {{
        let mut expected = String::from(common::HEADER);
        $(
            expected.push_str($code);
            expected.push('\n');
        )*
        assert_eq!($prog.instructions(false), Ok(expected));
    }};
}
