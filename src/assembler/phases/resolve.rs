use super::parse::Mnemonic;
use super::types::{ErrorKind, Instruction, LabelName};
use crate::assembler::model::{Content, Statement};
use crate::hw::{self, Addr, Byte};
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};
use std::convert::TryFrom;
use std::fmt::Display;
use std::iter;

/// Target of the jump over the reserved block. The parser rejects label names starting with the
/// comment character, so this cannot collide with a user label.
pub const SKIP_LABEL: &str = "#skip_display";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    DuplicateLabel(LabelName),
    UndefinedLabel(LabelName),
    NoSafeInsertionPoint,
    ProgramTooLarge(Addr),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Layout
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::DuplicateLabel(name) => write!(
                f,
                "A label may only be defined once in a program. The label name {} is repeated",
                name
            ),
            Error::UndefinedLabel(name) => write!(f, "Label {} is not defined", name),
            Error::NoSafeInsertionPoint => write!(
                f,
                "No statement ends early enough to place a jump over the display memory at {}",
                hw::format_octal(hw::DISPLAY)
            ),
            Error::ProgramTooLarge(end) => write!(
                f,
                "Program does not fit in memory (ends at {}, limit {})",
                hw::format_octal(*end),
                hw::format_octal(hw::MEMORY_SIZE)
            ),
        }
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    UnusedLabel,
}

/// A non-fatal finding about a laid out program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    label: LabelName,
    kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            DiagnosticKind::UnusedLabel => write!(f, "Label {} is never used", self.label),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    statements: Vec<Statement>,
    diagnostics: Vec<Diagnostic>,
}

impl Layout {
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

struct Pass {
    end: Addr,
    /// Index of, and running address after, the last statement after which a jump still fits.
    last_safe: Option<(usize, Addr)>,
}

fn assign_addresses(stmts: &mut [Statement], start: Addr) -> Pass {
    let mut addr = start;
    let mut last_safe = None;

    for (idx, stmt) in stmts.iter_mut().enumerate() {
        for byte in stmt.bytes_mut() {
            byte.set_location(addr);
            addr += byte.cells();
        }

        if addr <= hw::SAFE_JUMP_LIMIT {
            last_safe = Some((idx, addr));
        }
    }

    Pass {
        end: addr,
        last_safe,
    }
}

fn build_label_map(stmts: &[Statement]) -> Result<HashMap<&str, Addr>, Error> {
    let mut label_map = HashMap::new();

    for byte in stmts.iter().flat_map(Statement::bytes) {
        if let Content::Label(label) = byte.content() {
            if label_map.insert(label.name(), byte.location()).is_some() {
                return Err(Error::DuplicateLabel(label.name().to_owned()));
            }
        }
    }

    Ok(label_map)
}

fn synthesize(mnemonic: Mnemonic, arg: Option<&str>, inst: Instruction) -> Statement {
    let tokens = iter::once(mnemonic.to_string())
        .chain(arg.map(ToOwned::to_owned))
        .collect();
    Statement::from_instruction(tokens, inst)
}

/// Insert a jump after statement `idx` (which ends at `resume`) to a label placed just past the
/// reserved block, padding the cells in between with NOOPs.
fn insert_skip(stmts: Vec<Statement>, idx: usize, resume: Addr) -> Vec<Statement> {
    let padding = hw::RESERVED_END - (resume + hw::JUMP_CELLS);

    let mut rest = stmts.into_iter();
    let mut corrected: Vec<Statement> = rest.by_ref().take(idx + 1).collect();

    corrected.push(synthesize(
        Mnemonic::Goto,
        Some(SKIP_LABEL),
        Instruction::Goto(SKIP_LABEL.to_owned()),
    ));
    corrected.extend(
        iter::repeat_with(|| synthesize(Mnemonic::Noop, None, Instruction::Noop)).take(padding),
    );
    corrected.push(synthesize(
        Mnemonic::Label,
        Some(SKIP_LABEL),
        Instruction::Label(SKIP_LABEL.to_owned()),
    ));
    corrected.extend(rest);

    corrected
}

fn resolve_jumps(stmts: &mut [Statement]) -> Result<(), Error> {
    let label_map: HashMap<String, Addr> = build_label_map(stmts)?
        .into_iter()
        .map(|(name, addr)| (name.to_owned(), addr))
        .collect();
    let mut used = HashSet::new();

    for byte in stmts.iter_mut().flat_map(Statement::bytes_mut) {
        if let Content::Jump(jump) = byte.content_mut() {
            let addr = *label_map
                .get(jump.target())
                .ok_or_else(|| Error::UndefinedLabel(jump.target().to_owned()))?;
            let dest = Byte::try_from(addr).map_err(|_| Error::ProgramTooLarge(addr))?;
            jump.set_destination(dest);
            used.insert(jump.target().to_owned());
        }
    }

    for byte in stmts.iter_mut().flat_map(Statement::bytes_mut) {
        if let Content::Label(label) = byte.content_mut() {
            if used.contains(label.name()) {
                label.mark_used();
            }
        }
    }

    Ok(())
}

fn collect_diagnostics(stmts: &[Statement]) -> Vec<Diagnostic> {
    stmts
        .iter()
        .flat_map(Statement::bytes)
        .filter_map(|byte| match byte.content() {
            Content::Label(label) if !label.is_used() => Some(Diagnostic {
                label: label.name().to_owned(),
                kind: DiagnosticKind::UnusedLabel,
            }),
            _ => None,
        })
        .inspect(|diag| warn!("{}", diag))
        .collect()
}

/// Lay out a copy of `source` in memory, moving code clear of the display and overflow-flag
/// block if necessary, and resolve every jump. `source` itself is never modified, so calling
/// this repeatedly gives identical results.
pub fn layout(source: &[Statement]) -> Result<Layout, Error> {
    let mut stmts = source.to_vec();

    let pass = assign_addresses(&mut stmts, hw::PROGRAM_START);
    build_label_map(&stmts)?;
    debug!(
        "layout: {} statements end at {}",
        stmts.len(),
        hw::format_octal(pass.end)
    );

    let mut end = pass.end;
    if end >= hw::DISPLAY {
        let (idx, resume) = pass.last_safe.ok_or(Error::NoSafeInsertionPoint)?;
        info!(
            "program reaches {}, jumping over the reserved block after statement {} (at {})",
            hw::format_octal(end),
            idx + 1,
            hw::format_octal(resume)
        );

        stmts = insert_skip(stmts, idx, resume);
        end = assign_addresses(&mut stmts[idx + 1..], resume).end;
        debug!(
            "layout: corrected to {} statements ending at {}",
            stmts.len(),
            hw::format_octal(end)
        );
    }

    if end > hw::MEMORY_SIZE {
        return Err(Error::ProgramTooLarge(end));
    }

    resolve_jumps(&mut stmts)?;
    let diagnostics = collect_diagnostics(&stmts);

    Ok(Layout {
        statements: stmts,
        diagnostics,
    })
}
