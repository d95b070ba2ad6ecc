//! # Command Line Interface
//!
//! Simple subcommands are directly in `main.rs`.
//! More elaborate subcommands are in the `commands` module.

use env_logger;
use simhdd::commands;
use simhdd::STDRESULT;

mod cli;

fn main() -> STDRESULT
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let matches = cli::build_cli().get_matches();

    // Execute driver commands

    if let Some(cmd) = matches.subcommand_matches("run") {
        return commands::run::run(cmd);
    }

    // Geometry

    if let Some(cmd) = matches.subcommand_matches("geometry") {
        let geometry = commands::run::geometry_from_args(cmd)?;
        let root = geometry.to_json();
        match cmd.get_one::<u16>("indent") {
            Some(spaces) => println!("{}",json::stringify_pretty(root,*spaces)),
            None => println!("{}",json::stringify(root))
        }
        return Ok(());
    }

    eprintln!("No subcommand was found, try `simhdd --help`");
    return Err(Box::new(commands::CommandError::InvalidCommand));
}
