//! Renders a compiled region as masked C source.
//!
//! The emitted function takes the original parameters first, in their
//! declaration order, then every random bit the pipeline introduced; all
//! other symbols become locals. Identifiers produced by the pipeline can
//! contain `#` (bit labels) and `!` (solver labels), which are rewritten to
//! underscores to stay valid in the target syntax.

use std::io::{self, Write};

use scmask::ir::{Region, VProp, ValueInfo};


/// Rewrites `name` so every character is valid in a C identifier. Numeric
/// literals pass through untouched.
pub fn regularize(name: &str) -> String {
    if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
        return name.to_string();
    }
    let mut result = String::with_capacity(name.len());
    for (i, c) in name.chars().enumerate() {
        let valid = if i == 0 {
            c.is_ascii_alphabetic() || c == '_'
        } else {
            c.is_ascii_alphanumeric() || c == '_'
        };
        result.push(if valid { c } else { '_' });
    }
    result
}

/// Writes one compiled function to `writer`.
pub fn write_function<W: Write>(
    writer: &mut W,
    name: &str,
    region: &Region,
    params: &[String],
    ret: &ValueInfo,
) -> io::Result<()> {
    write!(writer, "bool masked_{}(", name)?;
    let mut first = true;
    for param in params {
        if first {
            first = false;
        } else {
            write!(writer, ",")?;
        }
        write!(writer, "bool {}=0", regularize(param))?;
    }

    let mut locals: Vec<&ValueInfo> = Vec::new();
    for value in region.symbols.values() {
        if params.iter().any(|param| param == &value.name) {
            continue;
        }
        if value.prop == VProp::Rnd {
            if first {
                first = false;
            } else {
                write!(writer, ",")?;
            }
            write!(writer, "bool {}=0", regularize(&value.name))?;
        } else {
            locals.push(value);
        }
    }
    writeln!(writer, "){{")?;

    for local in locals {
        writeln!(writer, "bool {};", regularize(&local.name))?;
    }
    for inst in &region.insts {
        writeln!(writer, "{}", inst.render(regularize))?;
    }
    writeln!(writer, "return {};", regularize(&ret.name))?;
    writeln!(writer, "}}")?;
    Ok(())
}
