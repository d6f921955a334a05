use super::model::Statement;
use super::phases::resolve::{self, Diagnostic, Layout};
use crate::hw::{self, Byte};

/// Marks the end of an upload to the machine.
pub const END_OF_TRANSMISSION: &str = "s";

/// Initial contents of A, B, X and the program counter.
pub const HEADER: [Byte; 4] = [0, 0, 0, hw::PROGRAM_START as Byte];

/// An append-only list of statements. The memory layout is computed on demand and cached
/// until the next statement is added.
#[derive(Debug, Clone, Default)]
pub struct Program {
    source: Vec<Statement>,
    layout: Option<Layout>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_statement(&mut self, stmt: Statement) {
        self.source.push(stmt);
        self.layout = None;
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    fn layout(&mut self) -> Result<&Layout, resolve::Error> {
        let layout = match self.layout.take() {
            Some(layout) => layout,
            None => resolve::layout(&self.source)?,
        };
        Ok(self.layout.get_or_insert(layout))
    }

    /// The statements with their final addresses, including any inserted to skip the
    /// display memory.
    pub fn statements(&mut self) -> Result<&[Statement], resolve::Error> {
        Ok(self.layout()?.statements())
    }

    pub fn diagnostics(&mut self) -> Result<&[Diagnostic], resolve::Error> {
        Ok(self.layout()?.diagnostics())
    }

    /// Every byte of the memory image in address order, starting from address 0.
    pub fn image(&mut self) -> Result<Vec<Byte>, resolve::Error> {
        let body = self
            .statements()?
            .iter()
            .flat_map(Statement::bytes)
            .flat_map(|byte| byte.values());
        Ok(HEADER.iter().copied().chain(body).collect())
    }

    /// The image as zero-padded octal lines, ready to upload.
    pub fn instructions(&mut self, eot: bool) -> Result<String, resolve::Error> {
        let mut out: String = HEADER
            .iter()
            .map(|val| hw::format_octal((*val).into()) + "\n")
            .collect();

        for formatted in self
            .statements()?
            .iter()
            .flat_map(Statement::bytes)
            .filter_map(|byte| byte.formatted())
        {
            out.push_str(&formatted);
            out.push('\n');
        }

        if eot {
            out.push_str(END_OF_TRANSMISSION);
            out.push('\n');
        }

        Ok(out)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn program(lines: &[&str]) -> Program {
        let mut prog = Program::new();
        for line in lines {
            prog.add_statement(
                Statement::new(&line.split_whitespace().collect::<Vec<_>>()).unwrap(),
            );
        }
        prog
    }

    #[test]
    fn empty_program_is_just_the_header() {
        assert_eq!(
            Program::new().instructions(false),
            Ok("0000\n0000\n0000\n0004\n".to_owned())
        );
    }

    #[test]
    fn instructions_with_and_without_eot() {
        let mut prog = program(&["LABEL top", "LET A = 0105", "LET B = 01"]);
        assert_eq!(
            prog.instructions(false),
            Ok("0000\n0000\n0000\n0004\n0023\n0105\n0123\n0001\n".to_owned())
        );
        assert_eq!(
            prog.instructions(true),
            Ok("0000\n0000\n0000\n0004\n0023\n0105\n0123\n0001\ns\n".to_owned())
        );
    }

    #[test]
    fn image_matches_instructions() {
        let mut prog = program(&["LET B = 0217", "GOTO skipA", "LET A = 0035", "LABEL skipA"]);
        assert_eq!(
            prog.image(),
            Ok(vec![0, 0, 0, 4, 0o123, 0o217, 0o344, 0o12, 0o023, 0o035])
        );
    }

    #[test]
    fn adding_invalidates_layout() {
        let mut prog = program(&["GOTO later"]);
        assert_eq!(
            prog.instructions(false),
            Err(resolve::Error::UndefinedLabel("later".to_owned()))
        );

        prog.add_statement(Statement::new(&["LABEL", "later"]).unwrap());
        assert_eq!(
            prog.instructions(false),
            Ok("0000\n0000\n0000\n0004\n0344\n0006\n".to_owned())
        );
    }

    #[test]
    fn repeated_layout_is_stable() {
        let mut lines: Vec<&str> = std::iter::repeat("NOOP").take(125).collect();
        lines.push("LABEL end");
        lines.push("GOTO end");
        let mut prog = program(&lines);

        let first = prog.instructions(true).unwrap();
        let count = prog.statements().unwrap().len();
        assert_eq!(prog.instructions(true).unwrap(), first);
        assert_eq!(prog.statements().unwrap().len(), count);
        assert_eq!(prog.len(), 127);
    }

    #[test]
    fn diagnostics_list_unused_labels() {
        let mut prog = program(&["LABEL unused", "HALT"]);
        let diags = prog.diagnostics().unwrap();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].label(), "unused");
    }
}
