use crate::assembler;
use crate::assets;
use ansi_term::Color::{Green, Red};
use anyhow::Context;
use derive_more::Constructor;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Prefix of an `.expected` file which names the kind of error assembly must fail with.
const EXPECT_ERROR: &str = "error:";

#[derive(Constructor)]
struct UnitSrc {
    name: OsString,
    prog_src: PathBuf,
    expected: PathBuf,
}

enum Outcome {
    Pass,
    Mismatch { line: usize },
    UnexpectedError(assembler::Error),
    WrongError(assembler::ErrorKind),
    MissingError,
}

impl UnitSrc {
    fn run(&self) -> anyhow::Result<Outcome> {
        let source = std::fs::read_to_string(&self.prog_src)
            .with_context(|| format!("Could not read {}", self.prog_src.display()))?;
        let expected = std::fs::read_to_string(&self.expected)
            .with_context(|| format!("Could not read {}", self.expected.display()))?;

        let actual = assembler::assemble(&source, true);
        let expected_kind = expected.trim().strip_prefix(EXPECT_ERROR).map(str::trim);

        Ok(match (actual, expected_kind) {
            (Ok(actual), None) => match actual.lines().zip(expected.lines()).position(|(a, e)| a != e) {
                Some(idx) => Outcome::Mismatch { line: idx + 1 },
                None if actual.lines().count() != expected.lines().count() => Outcome::Mismatch {
                    line: actual.lines().count().min(expected.lines().count()) + 1,
                },
                None => Outcome::Pass,
            },
            (Ok(_), Some(_)) => Outcome::MissingError,
            (Err(err), None) => Outcome::UnexpectedError(err),
            (Err(err), Some(kind)) if err.kind().to_string().eq_ignore_ascii_case(kind) => {
                Outcome::Pass
            }
            (Err(err), Some(_)) => Outcome::WrongError(err.kind()),
        })
    }
}

pub fn run_suite(
    suite_name: &OsString,
    suite_root_dir: &Path,
    only_this: Option<&OsString>,
) -> anyhow::Result<bool> {
    let suite_dir = suite_root_dir.join(suite_name);
    let all_units = find_units(&suite_dir)?;

    let mut selected_units = match only_this {
        None => all_units,
        Some(only_this) => vec![all_units
            .into_iter()
            .find(|unit| &unit.name == only_this)
            .with_context(|| {
                format!(
                    "No unit named '{}' in {}",
                    only_this.to_string_lossy(),
                    suite_dir.display()
                )
            })?],
    };

    selected_units.sort_unstable_by(|unit1, unit2| unit1.name.cmp(&unit2.name));

    Ok(run_units(&suite_name.to_string_lossy(), &selected_units))
}

fn find_file_unit(path: &Path) -> Option<UnitSrc> {
    if !path.extension().map_or(false, |ext| ext == assets::SOURCE_EXT) {
        return None;
    }

    Some(UnitSrc::new(
        path.file_stem()?.to_owned(),
        PathBuf::from(path),
        path.with_extension(assets::EXPECTED_EXT),
    ))
}

fn find_units(suite_dir: &Path) -> anyhow::Result<Vec<UnitSrc>> {
    let mut units = Vec::new();

    for entry in suite_dir
        .read_dir()
        .with_context(|| format!("Could not open suite {}", suite_dir.display()))?
    {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            units.extend(find_file_unit(&entry.path()));
        }
    }

    Ok(units)
}

fn run_units(name: &str, units: &[UnitSrc]) -> bool {
    let name_pad = units.iter().map(|unit| unit.name.len()).max().unwrap_or(0);

    println!("Running suite: '{}' ({} units)", name, units.len());
    println!("{:-<line_len$}", "", line_len = name_pad + 45);

    let passes = units
        .iter()
        .enumerate()
        .filter(|(num, unit)| run_unit(unit, num + 1, name_pad))
        .count();
    let success = passes == units.len();

    println!("{:-<line_len$}", "", line_len = name_pad + 45);
    println!(
        "Suite Result: {}, {}/{} passes",
        if success {
            Green.bold().paint("SUCCESS")
        } else {
            Red.bold().paint("FAILED")
        },
        passes,
        units.len()
    );

    success
}

fn run_unit(src: &UnitSrc, num: usize, name_pad: usize) -> bool {
    let (success, msg) = match src.run() {
        Err(err) => (false, format!("{}: {:#}", Red.bold().paint("FAIL: IO ERROR"), err)),
        Ok(Outcome::Pass) => (true, format!("{}", Green.bold().paint("PASS"))),
        Ok(Outcome::Mismatch { line }) => (
            false,
            format!("{} at line {}", Red.bold().paint("FAIL: OUTPUT MISMATCH"), line),
        ),
        Ok(Outcome::UnexpectedError(err)) => (
            false,
            format!(
                "{}:\n\t{}",
                Red.bold().paint("FAIL: ASSEMBLY ERROR"),
                err.to_string().replace("\n", "\n\t")
            ),
        ),
        Ok(Outcome::WrongError(kind)) => (
            false,
            format!("{} ({} error)", Red.bold().paint("FAIL: WRONG ERROR"), kind),
        ),
        Ok(Outcome::MissingError) => (false, format!("{}", Red.bold().paint("FAIL: NO ERROR"))),
    };

    println!(
        "Unit {:2 }: {} {}{}",
        num,
        src.name.to_string_lossy(),
        " ".repeat(name_pad - src.name.len()),
        msg
    );

    success
}
