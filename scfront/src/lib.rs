//! Front end for the [scmask](../scmask/index.html) masking compiler.
//!
//! Parses a small C dialect — straight-line three-address function bodies —
//! into the compiler's region form. A translation unit is one or more
//! functions of the shape
//!
//! ```c
//! bool f(bool a, bool k1) {
//!     bool t;
//!     t = a ^ k1;
//!     return t;
//! }
//! ```
//!
//! Statements are either local declarations or three-address assignments
//! (`x = a OP b;`, `x = OP a;`, `x = a;`); a single `return` of a declared
//! variable ends the body. Integer literals may appear as operands.
//!
//! Parameters are classified by convention:
//!
//!  Shape            | Property
//! ------------------|----------
//! pointer type      | output
//! name starts `r`   | random
//! name starts `k`   | secret
//! anything else     | public
//!
//! Widths come from `uintN` / `intN` substrings of the type name with
//! N ∈ {2, 8, 16, 32, 64}; any other type is one bit wide.
//!
//! Parsing is implemented with [pest], and the [`Error`](type.Error.html)
//! type is an alias of `pest::error::Error`, so every rejection carries the
//! offending source span.
//!
//! [pest]: https://docs.rs/pest/

mod parser;

#[cfg(test)]
mod test;

use log::debug;
use parser::{CDialectParser, Rule};
use pest::iterators::Pair;
use pest::{Parser, Span};
use scmask::ir::{is_reserved_name, DeclId, Instruction, Op, Region, VProp, ValueInfo, Width};

pub type Error = pest::error::Error<Rule>;

pub type Result<T> = std::result::Result<T, Error>;

/// A parsed function, ready for the masking pipeline.
#[derive(Clone, Debug)]
pub struct Function {
    pub name: String,
    pub region: Region,
    /// Parameter names in declaration order.
    pub params: Vec<String>,
    pub ret: ValueInfo,
}

/// Parses a translation unit into its functions.
pub fn parse_program(input: &str) -> Result<Vec<Function>> {
    let program = parse(input)?;
    let mut functions = Vec::new();
    for pair in program.into_inner() {
        if pair.as_rule() == Rule::function {
            functions.push(process_function(pair)?);
        }
    }
    Ok(functions)
}

fn parse(input: &str) -> Result<Pair<Rule>> {
    Ok(CDialectParser::parse(Rule::program, input)?.next().unwrap())
}

fn new_parser_error(span: Span, message: String) -> Error {
    Error::new_from_span(pest::error::ErrorVariant::CustomError { message }, span)
}

fn process_function(pair: Pair<Rule>) -> Result<Function> {
    let mut pairs = pair.into_inner();
    let _return_type = pairs.next().unwrap();
    let name = pairs.next().unwrap().as_str().to_string();

    let mut region = Region::new();
    let mut params = Vec::new();
    let mut ret = None;
    let mut next_decl: DeclId = 0;

    for item in pairs {
        match item.as_rule() {
            Rule::parameters => {
                for parameter in item.into_inner() {
                    process_parameter(parameter, &mut region, &mut params, &mut next_decl)?;
                }
            }
            Rule::declaration => process_declaration(item, &mut region, &mut next_decl)?,
            Rule::assignment => process_assignment(item, &mut region)?,
            Rule::return_statement => ret = Some(process_return(item, &region)?),
            _ => unreachable!(),
        }
    }
    let ret = ret.unwrap();
    debug!(
        "parsed {} with {} parameters and {} instructions",
        name,
        params.len(),
        region.count()
    );
    Ok(Function {
        name,
        region,
        params,
        ret,
    })
}

fn process_parameter(
    pair: Pair<Rule>,
    region: &mut Region,
    params: &mut Vec<String>,
    next_decl: &mut DeclId,
) -> Result<()> {
    let mut pairs = pair.into_inner();
    let type_name = pairs.next().unwrap();
    let mut ident = pairs.next().unwrap();
    let pointer = ident.as_rule() == Rule::pointer;
    if pointer {
        ident = pairs.next().unwrap();
    }
    let name = ident.as_str();
    check_declarable(name, &ident, region)?;

    let prop = if pointer {
        VProp::Output
    } else if name.starts_with('r') {
        VProp::Rnd
    } else if name.starts_with('k') {
        VProp::Secret
    } else {
        VProp::Pub
    };
    let width = width_from_type(type_name.as_str());
    region.declare(ValueInfo::with_origin(name, width, prop, *next_decl));
    *next_decl += 1;
    params.push(name.to_string());
    Ok(())
}

fn process_declaration(pair: Pair<Rule>, region: &mut Region, next_decl: &mut DeclId) -> Result<()> {
    let mut pairs = pair.into_inner();
    let type_name = pairs.next().unwrap();
    let ident = pairs.next().unwrap();
    check_declarable(ident.as_str(), &ident, region)?;

    let width = width_from_type(type_name.as_str());
    region.declare(ValueInfo::with_origin(
        ident.as_str(),
        width,
        VProp::Unk,
        *next_decl,
    ));
    *next_decl += 1;
    Ok(())
}

fn process_assignment(pair: Pair<Rule>, region: &mut Region) -> Result<()> {
    let span = pair.as_span();
    let mut pairs = pair.into_inner();
    let res = lookup(region, &pairs.next().unwrap())?;
    let expression = pairs.next().unwrap().into_inner().next().unwrap();
    match expression.as_rule() {
        Rule::binary_expression => {
            let mut inner = expression.into_inner();
            let lhs = process_operand(region, inner.next().unwrap())?;
            let op = process_operator(&inner.next().unwrap())?;
            let rhs = process_operand(region, inner.next().unwrap())?;
            region.push(Instruction::binary(op, res, lhs, rhs));
        }
        Rule::unary_expression => {
            let mut inner = expression.into_inner();
            let op = process_operator(&inner.next().unwrap())?;
            let lhs = process_operand(region, inner.next().unwrap())?;
            region.push(Instruction::unary(op, res, lhs));
        }
        Rule::operand => {
            let lhs = process_operand(region, expression)?;
            region.push(Instruction::unary(Op::Assign, res, lhs));
        }
        _ => {
            return Err(new_parser_error(
                span,
                "expected a three-address expression".to_string(),
            ))
        }
    }
    Ok(())
}

fn process_return(pair: Pair<Rule>, region: &Region) -> Result<ValueInfo> {
    let ident = pair.into_inner().next().unwrap();
    let value = lookup(region, &ident)?;
    Ok(ValueInfo::new(value.name, value.width, VProp::Output))
}

fn process_operator(pair: &Pair<Rule>) -> Result<Op> {
    pair.as_str()
        .parse()
        .map_err(|err| new_parser_error(pair.as_span(), format!("{}", err)))
}

fn process_operand(region: &Region, pair: Pair<Rule>) -> Result<ValueInfo> {
    let inner = pair.into_inner().next().unwrap();
    match inner.as_rule() {
        Rule::identifier => lookup(region, &inner),
        Rule::integer => Ok(ValueInfo::literal(inner.as_str())),
        _ => unreachable!(),
    }
}

fn lookup(region: &Region, pair: &Pair<Rule>) -> Result<ValueInfo> {
    match region.symbols.get(pair.as_str()) {
        Some(value) => Ok(value.clone()),
        None => Err(new_parser_error(
            pair.as_span(),
            format!("\"{}\" is not declared", pair.as_str()),
        )),
    }
}

fn check_declarable(name: &str, pair: &Pair<Rule>, region: &Region) -> Result<()> {
    if is_reserved_name(name) {
        return Err(new_parser_error(
            pair.as_span(),
            format!("\"{}\" collides with a compiler-reserved name", name),
        ));
    }
    if region.symbols.contains_key(name) {
        return Err(new_parser_error(
            pair.as_span(),
            format!("\"{}\" is declared twice", name),
        ));
    }
    Ok(())
}

/// Width from the type name. `uintN` is checked before `intN` so the
/// unsigned spellings are not caught by their signed suffixes.
fn width_from_type(type_name: &str) -> Width {
    const WIDTHS: [(&str, Width); 9] = [
        ("uint2", 2),
        ("uint8", 8),
        ("uint16", 16),
        ("uint32", 32),
        ("uint64", 64),
        ("int8", -8),
        ("int16", -16),
        ("int32", -32),
        ("int64", -64),
    ];
    for (pattern, width) in &WIDTHS {
        if type_name.contains(pattern) {
            return *width;
        }
    }
    1
}
