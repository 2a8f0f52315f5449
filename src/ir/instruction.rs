use std::fmt;
use std::str::FromStr;

use super::value::{VProp, ValueInfo};
use crate::error::Error;

/// Instruction operators.
///
/// The first group mirrors the source language; the marshalling group is
/// introduced by the bit-blaster to move bits between a multi-bit variable
/// and its single-bit labels.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Op {
    /// Move: `x = a`.
    Assign,
    /// Exclusive-or.
    Xor,
    /// Bitwise and.
    And,
    /// Bitwise or.
    Or,
    /// Boolean negation.
    Not,
    /// Bitwise complement.
    BitNot,
    /// Equality test.
    Eq,
    /// Boolean and.
    LogAnd,
    /// Boolean or.
    LogOr,
    Add,
    Sub,
    Mul,
    /// Comment line; the text travels in the result name.
    Comment,
    /// `/var=>z3/`: extract bit `rhs` of `lhs` into the single-bit `res`.
    BitExtract,
    /// `/z3=>var/`: or the single-bit `lhs`, shifted to position `rhs`, into `res`.
    BitInsert,
    /// `/clear/`: zero a multi-bit variable.
    Clear,
}

impl Op {
    pub fn token(self) -> &'static str {
        match self {
            Op::Assign => "=",
            Op::Xor => "^",
            Op::And => "&",
            Op::Or => "|",
            Op::Not => "!",
            Op::BitNot => "~",
            Op::Eq => "==",
            Op::LogAnd => "&&",
            Op::LogOr => "||",
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Comment => "//",
            Op::BitExtract => "/var=>z3/",
            Op::BitInsert => "/z3=>var/",
            Op::Clear => "/clear/",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Op {
    type Err = Error;

    fn from_str(s: &str) -> Result<Op, Error> {
        let op = match s {
            "=" => Op::Assign,
            "^" => Op::Xor,
            "&" => Op::And,
            "|" => Op::Or,
            "!" => Op::Not,
            "~" => Op::BitNot,
            "==" => Op::Eq,
            "&&" => Op::LogAnd,
            "||" => Op::LogOr,
            "+" => Op::Add,
            "-" => Op::Sub,
            "*" => Op::Mul,
            "//" => Op::Comment,
            "/var=>z3/" => Op::BitExtract,
            "/z3=>var/" => Op::BitInsert,
            "/clear/" => Op::Clear,
            _ => return Err(Error::UnknownOp(s.to_string())),
        };
        Ok(op)
    }
}

/// Three-address instruction: `res = lhs op rhs`, with `rhs` absent for
/// unary forms. Operands are held by value.
#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    pub op: Op,
    pub res: ValueInfo,
    pub lhs: ValueInfo,
    pub rhs: ValueInfo,
}

impl Instruction {
    pub fn binary(op: Op, res: ValueInfo, lhs: ValueInfo, rhs: ValueInfo) -> Instruction {
        Instruction { op, res, lhs, rhs }
    }

    pub fn unary(op: Op, res: ValueInfo, lhs: ValueInfo) -> Instruction {
        Instruction {
            op,
            res,
            lhs,
            rhs: ValueInfo::none(),
        }
    }

    pub fn comment(text: impl Into<String>) -> Instruction {
        Instruction {
            op: Op::Comment,
            res: ValueInfo::new(text, 0, VProp::Pub),
            lhs: ValueInfo::none(),
            rhs: ValueInfo::none(),
        }
    }

    pub fn is_unary(&self) -> bool {
        self.rhs.is_none()
    }

    /// Renders the instruction as a line of surface syntax, mapping every
    /// identifier through `map`.
    pub fn render<F: Fn(&str) -> String>(&self, map: F) -> String {
        match self.op {
            Op::BitInsert => format!(
                "{} |= {} << {}; // =>",
                map(&self.res.name),
                map(&self.lhs.name),
                map(&self.rhs.name)
            ),
            Op::BitExtract => format!(
                "{} = {} & (1 << {}); // <=",
                map(&self.res.name),
                map(&self.lhs.name),
                map(&self.rhs.name)
            ),
            Op::Clear => format!("{} = 0; // <=0", map(&self.res.name)),
            Op::Assign => format!("{} = {};", map(&self.res.name), map(&self.lhs.name)),
            Op::Comment => format!("//{}", self.res.name),
            _ if self.is_unary() => format!(
                "{} = {}{};",
                map(&self.res.name),
                self.op,
                map(&self.lhs.name)
            ),
            _ => format!(
                "{} = {}{}{};",
                map(&self.res.name),
                map(&self.lhs.name),
                self.op,
                map(&self.rhs.name)
            ),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.render(|name| name.to_string()))
    }
}
