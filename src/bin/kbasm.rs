use kenbak::cli::command;
use structopt::StructOpt;

fn main() {
    env_logger::init();
    command::terminal_init();
    command::exit_with(command::asm(command::SubcommandAsm::from_args()));
}
