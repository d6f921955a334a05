use super::model::Statement;
use super::phases::{
    parse, resolve,
    tokenize,
    types::{ErrorKind, Located},
};
use super::program::Program;
use log::debug;
use std::fmt::Display;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    Parse {
        err: Located<parse::Error>,
        statement: String,
    },
    Layout(resolve::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Parse { err, .. } => err.as_value().kind(),
            Error::Layout(err) => err.kind(),
        }
    }
}

impl From<resolve::Error> for Error {
    fn from(err: resolve::Error) -> Self {
        Error::Layout(err)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Parse { err, statement } => {
                writeln!(f, "{} error at line {}", self.kind(), err.loc().line())?;
                writeln!(f, "Statement: {}", statement)?;
                write!(f, "Error: {}", err.as_value())
            }
            Error::Layout(err) => write!(f, "{} error: {}", self.kind(), err),
        }
    }
}

impl std::error::Error for Error {}

/// Encode every non-blank line of `source`, stopping at the first malformed statement.
pub fn parse(source: &str) -> Result<Program, Error> {
    let mut prog = Program::new();

    for tokens in tokenize::tokenize(source) {
        let statement = tokens.as_value().join(" ");
        debug!("statement at line {}: {}", tokens.loc().line(), statement);

        let stmt = tokens
            .map_result(|tks| Statement::new(&tks))
            .map_err(|err| Error::Parse { err, statement })?;
        prog.add_statement(stmt.value());
    }

    Ok(prog)
}

/// Assemble `source` all the way to the octal upload format.
pub fn assemble(source: &str, eot: bool) -> Result<String, Error> {
    Ok(parse(source)?.instructions(eot)?)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::assembler::phases::types::Loc;

    #[test]
    fn skips_comments_and_blank_lines() {
        assert_eq!(
            assemble("# start\n\n  LET A = 0105  # load\nLET B = 01\n", false),
            Ok("0000\n0000\n0000\n0004\n0023\n0105\n0123\n0001\n".to_owned())
        );
    }

    #[test]
    fn reports_line_and_statement() {
        let err = parse("NOOP\n\nLET   Q = 1\nHALT").unwrap_err();
        assert_eq!(
            err,
            Error::Parse {
                err: Located::with_loc(Loc::new(3), parse::Error::BadRegisterName("Q".to_owned())),
                statement: "LET Q = 1".to_owned(),
            }
        );
        assert_eq!(err.kind(), ErrorKind::Name);
        assert_eq!(
            err.to_string(),
            "Name error at line 3\nStatement: LET Q = 1\nError: Variable name must be A, B, or X (found: Q)"
        );
    }

    #[test]
    fn layout_errors_surface() {
        let err = assemble("LABEL begin\nLABEL begin", true).unwrap_err();
        assert_eq!(
            err,
            Error::Layout(resolve::Error::DuplicateLabel("begin".to_owned()))
        );
        assert_eq!(err.kind(), ErrorKind::Layout);
    }

    #[test]
    fn counts_statements() {
        assert_eq!(parse("NOOP\n# x\nHALT\n").map(|prog| prog.len()), Ok(2));
    }
}
