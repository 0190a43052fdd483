use clap::{Arg, ArgAction, ArgGroup, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the formats registered by quire-babel's FormatRegistry::with_defaults
// We need to duplicate this here since build scripts can't access the library
const AVAILABLE_FORMATS: &[&str] = &["html", "json", "treeviz"];

fn content_path_arg() -> Arg {
    Arg::new("content_path")
        .help("Page directory, relative to the store root")
        .required(true)
        .index(1)
        .value_hint(ValueHint::DirPath)
}

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let formats = clap::builder::PossibleValuesParser::new(AVAILABLE_FORMATS);

    let mut cmd = Command::new("quire")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Migrate legacy editor pages to structured block documents")
        .arg_required_else_help(true)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available formats")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Path to a quire.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("root")
                .long("root")
                .help("Store root for page commands")
                .value_hint(ValueHint::DirPath)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between document formats")
                .arg(
                    Arg::new("input")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(Arg::new("from").long("from").value_parser(formats.clone()))
                .arg(
                    Arg::new("to")
                        .long("to")
                        .required(true)
                        .value_parser(formats),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("migrate")
                .about("Migrate a stored page to its canonical block document")
                .arg(content_path_arg()),
        )
        .subcommand(
            Command::new("load")
                .about("Print a stored page and the format it is stored in")
                .arg(content_path_arg()),
        )
        .subcommand(
            Command::new("cover")
                .about("Set or remove a stored page's cover image")
                .arg(content_path_arg())
                .arg(Arg::new("url").long("url").value_hint(ValueHint::Url))
                .arg(Arg::new("position").long("position"))
                .arg(Arg::new("remove").long("remove").action(ArgAction::SetTrue))
                .group(ArgGroup::new("change").args(["url", "remove"])),
        );

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "quire", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "quire", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "quire", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
