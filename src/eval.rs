//! Straight-line evaluation of regions over concrete bit-vector values.
//!
//! The test suite uses this to confirm that a masked program still computes
//! what its source computed, and the driver's `--check` mode exposes the
//! same comparison to users.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::ir::{Instruction, Op, Region, VProp, ValueInfo, Width};

/// Executes a region instruction by instruction over named `u64` values.
///
/// Every write is truncated to the destination's declared width; a width-1
/// destination stores `0` or `1` the way a C `bool` conversion would.
#[derive(Clone, Debug, Default)]
pub struct Evaluator {
    values: BTreeMap<String, u64>,
}

impl Evaluator {
    pub fn new() -> Evaluator {
        Evaluator::default()
    }

    pub fn bind(&mut self, name: &str, value: u64) {
        self.values.insert(name.to_string(), value);
    }

    pub fn value(&self, name: &str) -> Option<u64> {
        self.values.get(name).copied()
    }

    /// Runs the region, returning one observed value per executed
    /// instruction. Comments are skipped.
    pub fn run(&mut self, region: &Region) -> Result<Vec<u64>> {
        let mut trace = Vec::with_capacity(region.insts.len());
        for inst in &region.insts {
            if inst.op == Op::Comment {
                continue;
            }
            trace.push(self.step(region, inst)?);
        }
        Ok(trace)
    }

    fn step(&mut self, region: &Region, inst: &Instruction) -> Result<u64> {
        let value = match inst.op {
            Op::Assign => self.operand(&inst.lhs)?,
            Op::Xor => self.operand(&inst.lhs)? ^ self.operand(&inst.rhs)?,
            Op::And => self.operand(&inst.lhs)? & self.operand(&inst.rhs)?,
            Op::Or => self.operand(&inst.lhs)? | self.operand(&inst.rhs)?,
            Op::LogAnd => {
                (self.operand(&inst.lhs)? != 0 && self.operand(&inst.rhs)? != 0) as u64
            }
            Op::LogOr => (self.operand(&inst.lhs)? != 0 || self.operand(&inst.rhs)? != 0) as u64,
            Op::Not => (self.operand(&inst.lhs)? == 0) as u64,
            Op::BitNot => !self.operand(&inst.lhs)?,
            Op::Eq => (self.operand(&inst.lhs)? == self.operand(&inst.rhs)?) as u64,
            Op::Add => self.operand(&inst.lhs)?.wrapping_add(self.operand(&inst.rhs)?),
            Op::Sub => self.operand(&inst.lhs)?.wrapping_sub(self.operand(&inst.rhs)?),
            Op::Mul => self.operand(&inst.lhs)?.wrapping_mul(self.operand(&inst.rhs)?),
            Op::Clear => 0,
            Op::BitExtract => {
                let bit = self.operand(&inst.rhs)?;
                (self.operand(&inst.lhs)? >> bit) & 1
            }
            Op::BitInsert => {
                let bit = self.operand(&inst.rhs)?;
                self.operand(&inst.res)? | (self.operand(&inst.lhs)? << bit)
            }
            Op::Comment => unreachable!("comments are skipped by run"),
        };
        let width = region
            .symbols
            .get(&inst.res.name)
            .map(|v| v.width)
            .unwrap_or(inst.res.width);
        let value = truncate(value, width);
        self.values.insert(inst.res.name.clone(), value);
        Ok(value)
    }

    fn operand(&self, value: &ValueInfo) -> Result<u64> {
        if value.prop == VProp::Cst {
            if let Ok(literal) = value.name.parse::<u64>() {
                return Ok(literal);
            }
        }
        self.values
            .get(&value.name)
            .copied()
            .ok_or_else(|| Error::UnknownSymbol(value.name.clone()))
    }
}

fn truncate(value: u64, width: Width) -> u64 {
    let bits = width.abs() as u32;
    if bits == 0 || bits >= 64 {
        value
    } else if bits == 1 {
        (value != 0) as u64
    } else {
        value & ((1u64 << bits) - 1)
    }
}
