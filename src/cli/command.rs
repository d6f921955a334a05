use super::suite;
use crate::assembler::{self, listing, Program};
use crate::assets;
use ansi_term::Color::{Red, Yellow};
use anyhow::Context;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use structopt::StructOpt;

#[cfg(windows)]
pub fn terminal_init() {
    // Colours are cosmetic, so a console without ANSI support is not an error.
    let _ = ansi_term::enable_ansi_support();
}

#[cfg(not(windows))]
pub fn terminal_init() {}

pub fn assemble_path(path: &Path) -> anyhow::Result<Program> {
    let prog_src = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    assembler::parse(&prog_src).with_context(|| format!("Could not assemble {}", path.display()))
}

/// `<path>.html`, keeping the original extension.
pub fn listing_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(assets::HTML_EXT);
    PathBuf::from(name)
}

#[derive(StructOpt, Debug)]
#[structopt(name = "kenbak")]
pub enum CommandRoot {
    Asm(SubcommandAsm),
    Suite(SubcommandSuite),
}

#[derive(StructOpt, Debug)]
#[structopt(name = "kbasm")]
pub struct SubcommandAsm {
    #[structopt(name = "in.kbs", parse(from_os_str))]
    in_src: PathBuf,

    /// Write the upload file here instead of printing the codes.
    #[structopt(name = "out", parse(from_os_str))]
    out: Option<PathBuf>,

    /// Also write an HTML listing next to the source file.
    #[structopt(long)]
    html: bool,

    /// Leave the end-of-transmission marker off the upload file.
    #[structopt(long)]
    no_eot: bool,
}

#[derive(StructOpt, Debug)]
pub struct SubcommandSuite {
    #[structopt(name = "suite_name", parse(from_os_str))]
    suite_name: OsString,

    #[structopt(name = "suite/root/dir", parse(from_os_str))]
    suite_root_dir: Option<PathBuf>,

    #[structopt(short, long, parse(from_os_str))]
    only: Option<OsString>,
}

pub fn exit_with(result: anyhow::Result<bool>) -> ! {
    match result {
        Ok(success) => std::process::exit(if success { 0 } else { 1 }),
        Err(err) => {
            eprintln!("{}: {:#}", Red.bold().paint("error"), err);
            std::process::exit(1);
        }
    }
}

pub fn root(cmd: CommandRoot) -> ! {
    exit_with(match cmd {
        CommandRoot::Asm(scmd) => asm(scmd),
        CommandRoot::Suite(scmd) => suite(scmd),
    });
}

fn print_diagnostics(prog: &mut Program) -> Result<(), assembler::Error> {
    for diag in prog.diagnostics()? {
        println!("{}: {}", Yellow.bold().paint("WARNING"), diag);
    }
    Ok(())
}

pub fn asm(cmd: SubcommandAsm) -> anyhow::Result<bool> {
    let mut prog = assemble_path(&cmd.in_src)?;
    print_diagnostics(&mut prog)?;

    if cmd.html {
        let out_name = listing_path(&cmd.in_src);
        let stmts = prog.statements().map_err(assembler::Error::from)?;
        std::fs::write(&out_name, listing::html(&cmd.in_src.to_string_lossy(), stmts))
            .with_context(|| format!("Could not write {}", out_name.display()))?;
    }

    match cmd.out {
        Some(out_name) => {
            let codes = prog
                .instructions(!cmd.no_eot)
                .map_err(assembler::Error::from)?;
            std::fs::write(&out_name, codes)
                .with_context(|| format!("Could not write {}", out_name.display()))?;
        }
        None if !cmd.html => {
            let codes = prog.instructions(false).map_err(assembler::Error::from)?;
            println!("Resulting operating codes:");
            print!("{}", codes);
        }
        None => (),
    }

    Ok(true)
}

pub fn suite(cmd: SubcommandSuite) -> anyhow::Result<bool> {
    suite::run_suite(
        &cmd.suite_name,
        &cmd.suite_root_dir.unwrap_or_else(assets::default_suite_dir),
        cmd.only.as_ref(),
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn listing_path_appends_extension() {
        assert_eq!(
            listing_path(Path::new("asm/demo.kbs")),
            PathBuf::from("asm/demo.kbs.html")
        );
    }

    #[test]
    fn asm_arguments() {
        let cmd = SubcommandAsm::from_iter_safe(vec!["kbasm", "prog.kbs", "prog.txt", "--no-eot"])
            .unwrap();
        assert_eq!(cmd.in_src, PathBuf::from("prog.kbs"));
        assert_eq!(cmd.out, Some(PathBuf::from("prog.txt")));
        assert!(cmd.no_eot);
        assert!(!cmd.html);
    }
}
