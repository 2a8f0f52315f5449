//! Drives the scmask pipeline over whole source files: parse every function,
//! transform each one independently, emit the masked source.

use std::io::{self, Write};

use log::{debug, info, warn};
use scmask::eval::Evaluator;
use scmask::ir::{reset_fresh_randoms, Region, VProp, ValueInfo};


/// Free-bit ceiling for `--check`: beyond this the exhaustive comparison is
/// skipped with a warning.
const CHECK_BIT_LIMIT: u32 = 18;

#[derive(Debug)]
pub enum Error {
    Parse(Box<scfront::Error>),
    Compile(scmask::Error),
    Io(io::Error),
    /// `--check` found an input where source and masked programs disagree.
    Check(String),
}

impl From<scfront::Error> for Error {
    fn from(err: scfront::Error) -> Error {
        Error::Parse(Box::new(err))
    }
}

impl From<scmask::Error> for Error {
    fn from(err: scmask::Error) -> Error {
        Error::Compile(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Options {
    pub check: bool,
}

/// Compiles every function in `source`, writing masked C to `out`.
pub fn compile_source<W: Write>(source: &str, options: Options, out: &mut W) -> Result<(), Error> {
    let functions = scfront::parse_program(source)?;
    for function in functions {
        reset_fresh_randoms();
        info!("compiling {}", function.name);
        let original = function.region.clone();
        let masked = scmask::transform(function.region, &function.ret)?;
        if options.check {
            check_function(&original, &masked, &function.params, &function.ret)?;
        }
        scemit::write_function(out, &function.name, &masked, &function.params, &function.ret)?;
    }
    Ok(())
}

/// Exhaustively compares the source and masked regions on every input and
/// random assignment, as long as the total free-bit count stays tractable.
fn check_function(
    original: &Region,
    masked: &Region,
    params: &[String],
    ret: &ValueInfo,
) -> Result<(), Error> {
    let inputs: Vec<ValueInfo> = params
        .iter()
        .filter_map(|param| original.symbols.get(param).cloned())
        .collect();
    let randoms: Vec<String> = masked
        .symbols
        .values()
        .filter(|value| value.prop == VProp::Rnd && !original.symbols.contains_key(&value.name))
        .map(|value| value.name.clone())
        .collect();
    let input_bits: u32 = inputs.iter().map(|value| value.width.abs() as u32).sum();
    let total = input_bits + randoms.len() as u32;
    if total > CHECK_BIT_LIMIT {
        warn!(
            "skipping equivalence check for {}: {} free bits",
            ret.name, total
        );
        return Ok(());
    }

    for assignment in 0..(1u64 << input_bits) {
        let mut bound = Evaluator::new();
        let mut offset = 0;
        for input in &inputs {
            let bits = input.width.abs() as u32;
            bound.bind(&input.name, (assignment >> offset) & ((1u64 << bits) - 1));
            offset += bits;
        }
        let mut reference = bound.clone();
        reference.run(original)?;
        let expected = match reference.value(&ret.name) {
            Some(value) => value,
            None => {
                return Err(Error::Check(format!(
                    "\"{}\" is never assigned by the source program",
                    ret.name
                )))
            }
        };
        for random_assignment in 0..(1u64 << randoms.len()) {
            let mut run = bound.clone();
            for (i, name) in randoms.iter().enumerate() {
                run.bind(name, (random_assignment >> i) & 1);
            }
            run.run(masked)?;
            if run.value(&ret.name) != Some(expected) {
                return Err(Error::Check(format!(
                    "{} disagrees at inputs {:#x}, randoms {:#x}",
                    ret.name, assignment, random_assignment
                )));
            }
        }
    }
    debug!(
        "{} verified over {} input bits and {} random bits",
        ret.name,
        input_bits,
        randoms.len()
    );
    Ok(())
}
