use std::error::Error as StdError;
use std::fmt;

/// Errors reported by the compiler core.
///
/// Input-shaped problems are reported with the offending name so the driver
/// can point at the source; the remaining variants are pipeline invariants
/// that abort the current function.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// A token that is not part of the instruction set.
    UnknownOp(String),
    /// A variable was referenced but never declared.
    UnknownSymbol(String),
    /// A declared name collides with a compiler-reserved namespace.
    ReservedName(String),
    /// An XOR classified as more than one of def, lhs-use and rhs-use.
    AmbiguousXor(String),
    /// A masked output was used before any definition was recorded.
    MissingDef(String),
    /// The solver backend failed or produced an unusable formula.
    Smt(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UnknownOp(op) => write!(f, "Failed to parse \"{}\" as an operator.", op),
            Error::UnknownSymbol(name) => write!(f, "\"{}\" is not in the symbol table.", name),
            Error::ReservedName(name) => write!(f, "\"{}\" collides with a reserved name.", name),
            Error::AmbiguousXor(inst) => {
                write!(f, "Ambiguous def/use classification for \"{}\".", inst)
            }
            Error::MissingDef(name) => write!(f, "Use of \"{}\" precedes its definition.", name),
            Error::Smt(message) => write!(f, "Solver failure: {}", message),
        }
    }
}

impl StdError for Error {}

pub type Result<T> = std::result::Result<T, Error>;
