//! The three-address intermediate representation the pipeline operates on.
//!
//! Instructions hold their operand [`ValueInfo`]s by value and regions own
//! both their instructions and their symbol tables, so there is no sharing
//! between pipeline stages: each stage consumes its input by move.

mod alias;
mod instruction;
mod region;
mod value;

pub use alias::AliasGraph;
pub use instruction::{Instruction, Op};
pub use region::{Region, SymbolTable};
pub use value::{
    is_reserved_name, reset_fresh_randoms, DeclId, VProp, ValueInfo, Width, RESERVED_RANDOM_BASE,
};
