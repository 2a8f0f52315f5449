use pest_derive::Parser;

/// Pest parser for the straight-line C dialect.
#[derive(Parser)]
#[grammar = "cdialect.pest"]
pub struct CDialectParser;
