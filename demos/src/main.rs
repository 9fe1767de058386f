// SPDX-License-Identifier: Apache-2.0

//! `jsonfmt`: reformat or inspect a JSON document.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::Parser as ClapParser;
use hostjson::{dump, parse, stringify, Indent, NativeInvoker, Replacer};

#[derive(ClapParser)]
#[command(name = "jsonfmt")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Parse a JSON document and print it back", long_about = None)]
struct Cli {
    /// Input file (reads stdin when omitted)
    file: Option<PathBuf>,

    /// Spaces per indentation level (capped at 10)
    #[arg(long, conflicts_with = "indent_str")]
    indent: Option<usize>,

    /// Literal indentation unit, e.g. a tab (capped at 10 characters)
    #[arg(long)]
    indent_str: Option<String>,

    /// Print the console dump instead of JSON
    #[arg(long)]
    dump: bool,

    /// With --dump, print a top-level string without quotes
    #[arg(long, requires = "dump")]
    console: bool,
}

fn read_input(file: Option<&PathBuf>) -> io::Result<Vec<u8>> {
    match file {
        Some(path) => fs::read(path),
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let text = match read_input(cli.file.as_ref()) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: unable to read input: {e}");
            process::exit(1);
        }
    };
    log::info!("read {} bytes", text.len());

    let mut invoker = NativeInvoker::new();
    let value = match parse(&text, None, &mut invoker) {
        Ok(value) => value,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let output = if cli.dump {
        dump(&value, cli.console, cli.indent.unwrap_or(0)).map(Some)
    } else {
        let indent = match (&cli.indent_str, cli.indent) {
            (Some(unit), _) => Indent::string(unit),
            (None, Some(count)) => Indent::spaces(count),
            (None, None) => Indent::none(),
        };
        stringify(&value, &Replacer::None, &indent, &mut invoker)
    };

    match output {
        Ok(Some(out)) => println!("{out}"),
        Ok(None) => println!("undefined"),
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    }
}
