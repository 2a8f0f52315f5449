#[macro_use]
extern crate clap;

use std::fs::File;
use std::io::{self, Read};

use clap::Arg;

#[derive(Debug)]
enum Error {
    Io(io::Error),
    Scmc(scmc::Error),
}

fn main() -> Result<(), Error> {
    env_logger::init();

    let matches = app_from_crate!()
        .arg(
            Arg::with_name("INPUT")
                .help("Sets the source file to compile")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .value_name("OUTPUT")
                .help("Writes the masked source to a file instead of stdout"),
        )
        .arg(
            Arg::with_name("check")
                .short("c")
                .long("check")
                .help("Exhaustively checks functional equivalence of each compiled function"),
        )
        .get_matches();

    let mut source = String::new();
    File::open(matches.value_of("INPUT").unwrap())
        .map_err(Error::Io)?
        .read_to_string(&mut source)
        .map_err(Error::Io)?;

    let options = scmc::Options {
        check: matches.is_present("check"),
    };
    match matches.value_of("output") {
        Some(path) => {
            let mut file = File::create(path).map_err(Error::Io)?;
            scmc::compile_source(&source, options, &mut file).map_err(Error::Scmc)?;
        }
        None => {
            let stdout = io::stdout();
            scmc::compile_source(&source, options, &mut stdout.lock()).map_err(Error::Scmc)?;
        }
    }
    Ok(())
}
