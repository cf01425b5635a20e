//! Command-line interface for pupfmt
//! Reads a manifest, reformats it and writes the result.
//!
//! Usage:
//!   pupfmt `<path>`                      - Print the formatted manifest (`-` reads stdin)
//!   pupfmt `<path>` -o `<out>`           - Write the formatted manifest to a file
//!   pupfmt `<path>` --check              - Exit with 1 when the file is not formatted
//!   pupfmt `<path>` --format treeviz     - Show the parsed tree instead
//!   pupfmt --list-formats                - List the available output formats

use clap::{Arg, ArgAction, ArgMatches, Command};
use pupfmt::manifest::{parse_source, Error, FormatRegistry, Loader, PupfmtConfig};
use std::io::Read;

fn cli() -> Command {
    Command::new("pupfmt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A canonical formatter for Puppet-style manifests")
        .arg(
            Arg::new("path")
                .help("Manifest to format, or '-' for stdin")
                .default_value("-")
                .index(1),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Write the result to this file instead of stdout"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format (e.g., 'puppet', 'json', 'treeviz')")
                .default_value("puppet"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("TOML file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("indent-width")
                .long("indent-width")
                .help("Spaces per nesting level")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("split-resources")
                .long("split-resources")
                .help("How multi-title resources are split")
                .value_parser(["render", "splice"]),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .help("Exit with status 1 if the input is not already formatted")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .short('d')
                .help("Log parser decisions to stderr")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available output formats")
                .action(ArgAction::SetTrue),
        )
}

fn main() {
    let matches = cli().get_matches();

    let level = if matches.get_flag("debug") {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    match run(&matches) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_config(matches: &ArgMatches) -> Result<PupfmtConfig, Error> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if let Some(width) = matches.get_one::<i64>("indent-width") {
        loader = loader.set_override("formatting.indent_width", *width)?;
    }
    if let Some(mode) = matches.get_one::<String>("split-resources") {
        loader = loader.set_override("parsing.split_resources", mode.as_str())?;
    }
    Ok(loader.build()?)
}

fn read_input(path: &str) -> Result<String, Error> {
    if path == "-" {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source)?;
        Ok(source)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

fn run(matches: &ArgMatches) -> Result<i32, Error> {
    let config = load_config(matches)?;
    let registry = FormatRegistry::with_config(&config);

    if matches.get_flag("list-formats") {
        println!("Available formats:\n");
        for name in registry.list_formats() {
            let description = registry.get(&name).map_or("", |f| f.description());
            println!("  {}", name);
            println!("    {}", description);
        }
        return Ok(0);
    }

    let path = matches
        .get_one::<String>("path")
        .map_or("-", |p| p.as_str());
    let format = matches
        .get_one::<String>("format")
        .map_or("puppet", |f| f.as_str());

    let source = read_input(path)?;
    let ast = parse_source(&source, &config)?;
    let output = registry.serialize(&ast, format)?;

    if matches.get_flag("check") {
        if output == source {
            return Ok(0);
        }
        log::debug!("{} is not formatted", path);
        return Ok(1);
    }

    match matches.get_one::<String>("output") {
        Some(out) => std::fs::write(out, &output)?,
        None => print!("{}", output),
    }
    Ok(0)
}
