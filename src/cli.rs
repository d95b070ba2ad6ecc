use clap::{value_parser, crate_version, Arg, ArgAction, Command, ValueHint};

const SCRIPT_LONG_HELP: &str = "each line is `<command> [filename] [data]`, where command is one of
create, read, write, delete, list, format, swap-write, swap-read, swap-delete;
data runs to the end of the line and may be enclosed in double quotes;
`inspect <t:s:b>` shows a hex dump of one block, lines starting with `#` are ignored";

fn geometry_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("tracks").long("tracks").help("number of tracks, track 0 is the directory")
            .value_name("COUNT")
            .value_parser(value_parser!(usize))
            .default_value("4"))
        .arg(Arg::new("sectors").long("sectors").help("sectors per track")
            .value_name("COUNT")
            .value_parser(value_parser!(usize))
            .default_value("8"))
        .arg(Arg::new("blocks").long("blocks").help("blocks per sector")
            .value_name("COUNT")
            .value_parser(value_parser!(usize))
            .default_value("8"))
        .arg(Arg::new("block-size").long("block-size").help("bytes per block, including the 4 byte header")
            .value_name("BYTES")
            .value_parser(value_parser!(usize))
            .default_value("64"))
}

fn indent_arg() -> Arg {
    Arg::new("indent").long("indent").help("JSON indentation, omit to minify")
        .value_name("SPACES")
        .value_parser(value_parser!(u16).range(0..16))
        .required(false)
}

pub fn build_cli() -> Command {
    let long_help = "simhdd is always invoked with exactly one of several subcommands.
Each run starts from a freshly formatted drive, nothing is saved between runs.
Set RUST_LOG environment variable to control logging level.
  levels: trace,debug,info,warn,error

Examples:
---------
interactive session:   `simhdd run`
run a script:          `simhdd run -s session.txt`
show the drive:        `echo \"create a.txt\" | simhdd run --dump --indent 2`
bigger drive:          `simhdd run --tracks 8 --block-size 128`";

    let mut main_cmd = Command::new("simhdd")
        .about("Simulated hard drive with a linked allocation file system.")
        .after_long_help(long_help)
        .version(crate_version!());

    main_cmd = main_cmd.subcommand(geometry_args(Command::new("run")
        .arg(Arg::new("script").short('s').long("script").help("read command lines from a file instead of stdin")
            .long_help(SCRIPT_LONG_HELP)
            .value_name("PATH")
            .value_hint(ValueHint::FilePath)
            .required(false))
        .arg(Arg::new("mbr").long("mbr").help("name written to the master boot record")
            .value_name("NAME")
            .required(false))
        .arg(Arg::new("dump").long("dump").help("print the drive contents as JSON when done")
            .action(ArgAction::SetTrue))
        .arg(indent_arg())
        .about("execute driver commands on a fresh drive")));
    main_cmd = main_cmd.subcommand(geometry_args(Command::new("geometry")
        .arg(indent_arg())
        .about("write the drive geometry as JSON")));

    main_cmd
}
