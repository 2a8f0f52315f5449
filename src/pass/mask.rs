//! The region masker: replaces every instruction with a functionally
//! equivalent gadget whose intermediate values carry fresh random masks.

use std::collections::HashSet;

use log::debug;

use crate::error::{Error, Result};
use crate::ir::{Instruction, Op, Region, SymbolTable, VProp, ValueInfo};
use crate::pass::collect::RegionCollector;
use crate::pass::concat::RegionConcatenator;
use crate::pass::divide::TrivialRegionDivider;

/// A masked region together with the values flowing in and out of it.
#[derive(Clone, Debug)]
pub struct MaskedRegion {
    pub region: Region,
    pub inputs: HashSet<ValueInfo>,
    pub outputs: HashSet<ValueInfo>,
}

impl MaskedRegion {
    fn new(symbols: SymbolTable) -> MaskedRegion {
        MaskedRegion {
            region: Region::with_symbols(symbols),
            inputs: HashSet::new(),
            outputs: HashSet::new(),
        }
    }
}

/// Masks each divided region with the fixed gadget library.
#[derive(Clone, Debug)]
pub struct TrivialRegionMasker {
    pub regions: Vec<MaskedRegion>,
    pub symbols: SymbolTable,
}

impl TrivialRegionMasker {
    pub fn new(divided: TrivialRegionDivider) -> Result<TrivialRegionMasker> {
        let symbols = divided.symbols;
        let mut regions = Vec::with_capacity(divided.regions.len());
        for region in divided.regions {
            regions.push(mask_one(region, &symbols)?);
        }
        Ok(TrivialRegionMasker { regions, symbols })
    }
}

/// Masks a single sub-region, recording its input and output sets.
fn mask_one(original: Region, globals: &SymbolTable) -> Result<MaskedRegion> {
    let mut masked = MaskedRegion::new(original.symbols);
    for inst in original.insts {
        if inst.op == Op::Comment {
            masked.region.push(inst);
            continue;
        }
        masked.inputs.insert(inst.lhs.clone());
        if !inst.is_unary() {
            masked.inputs.insert(inst.rhs.clone());
        }
        masked.outputs.insert(inst.res.clone());
        mask_instruction(&mut masked.region, globals, inst)?;
    }
    Ok(masked)
}

fn mask_instruction(region: &mut Region, globals: &SymbolTable, inst: Instruction) -> Result<()> {
    match inst.op {
        Op::Or | Op::LogOr => mask_or(region, &inst),
        Op::Eq => {
            mask_eq(region, &inst);
            Ok(())
        }
        Op::Xor => {
            mask_xor(region, &inst);
            Ok(())
        }
        Op::Not | Op::BitNot => {
            mask_not(region, &inst);
            Ok(())
        }
        Op::And | Op::LogAnd => mask_and(region, globals, &inst),
        _ => {
            // moves and marshalling pass through; moves become aliases in
            // the collector
            region.push(inst);
            Ok(())
        }
    }
}

fn masked_temp(res: &ValueInfo, suffix: &str) -> ValueInfo {
    ValueInfo::new(format!("{}{}", res.name, suffix), 1, VProp::Masked)
}

fn unknown_temp(res: &ValueInfo, suffix: &str) -> ValueInfo {
    ValueInfo::new(format!("{}{}", res.name, suffix), 1, VProp::Unk)
}

/// `T = A ^ B` → `mA=A^r1; mB=B^r2; mT=mA^mB; mR=r1^r2; T=mR^mT`.
fn mask_xor(region: &mut Region, inst: &Instruction) {
    let r1 = ValueInfo::fresh_random();
    let r2 = ValueInfo::fresh_random();
    let m_a = masked_temp(&inst.res, "xormA");
    let m_b = masked_temp(&inst.res, "xormB");
    let m_r = masked_temp(&inst.res, "xormR");
    let m_t = masked_temp(&inst.res, "xormT");
    for value in &[&r1, &r2, &m_a, &m_b, &m_r, &m_t] {
        region.declare((*value).clone());
    }
    region.push(Instruction::binary(Op::Xor, m_a.clone(), inst.lhs.clone(), r1.clone()));
    region.push(Instruction::binary(Op::Xor, m_b.clone(), inst.rhs.clone(), r2.clone()));
    region.push(Instruction::binary(Op::Xor, m_t.clone(), m_a, m_b));
    region.push(Instruction::binary(Op::Xor, m_r.clone(), r1, r2));
    region.push(Instruction::binary(Op::Xor, inst.res.clone(), m_r, m_t));
}

/// `T = !A` → `mA=A^r1; mT=!mA; T=mT^r1`.
fn mask_not(region: &mut Region, inst: &Instruction) {
    let r1 = ValueInfo::fresh_random();
    let m_a = masked_temp(&inst.res, "notmA");
    let m_t = masked_temp(&inst.res, "notmT");
    for value in &[&r1, &m_a, &m_t] {
        region.declare((*value).clone());
    }
    region.push(Instruction::binary(Op::Xor, m_a.clone(), inst.lhs.clone(), r1.clone()));
    region.push(Instruction::unary(Op::Not, m_t.clone(), m_a));
    region.push(Instruction::binary(Op::Xor, inst.res.clone(), m_t, r1));
}

/// `T = (A == B)` is `!(A ^ B)`: mask the XOR, negate under a third random,
/// unmask.
fn mask_eq(region: &mut Region, inst: &Instruction) {
    let r1 = ValueInfo::fresh_random();
    let r2 = ValueInfo::fresh_random();
    let r3 = ValueInfo::fresh_random();
    let m_a = masked_temp(&inst.res, "xormA");
    let m_b = masked_temp(&inst.res, "xormB");
    let m_r = masked_temp(&inst.res, "xormR");
    let m_t = masked_temp(&inst.res, "xormT");
    let t_shifted = masked_temp(&inst.res, "xormT_");
    let m_c = masked_temp(&inst.res, "xormC");
    let t_r3 = masked_temp(&inst.res, "xormTr3");
    for value in &[&r1, &r2, &r3, &m_a, &m_b, &m_r, &m_t, &t_shifted, &m_c, &t_r3] {
        region.declare((*value).clone());
    }
    region.push(Instruction::binary(Op::Xor, m_a.clone(), inst.lhs.clone(), r1.clone()));
    region.push(Instruction::binary(Op::Xor, m_b.clone(), inst.rhs.clone(), r2.clone()));
    region.push(Instruction::binary(Op::Xor, m_t.clone(), m_a, m_b));
    region.push(Instruction::binary(Op::Xor, m_r.clone(), r1, r2));
    region.push(Instruction::binary(Op::Xor, t_shifted.clone(), m_t, r3.clone()));
    region.push(Instruction::binary(Op::Xor, m_c.clone(), t_shifted, m_r));
    region.push(Instruction::unary(Op::Not, t_r3.clone(), m_c));
    region.push(Instruction::binary(Op::Xor, inst.res.clone(), t_r3, r3));
}

/// The 12-instruction masked AND. Emission order matters for soundness.
///
/// The negated rail (`andneg2`, `andtmp1`, `andtmp4`) must run on the same
/// random that masks the left operand: with an independent bit the sequence
/// computes `A&B ^ (B & (r1^r3))` instead of `A&B`.
fn mask_and(region: &mut Region, globals: &SymbolTable, inst: &Instruction) -> Result<()> {
    lookup_operand(globals, region, &inst.lhs)?;
    lookup_operand(globals, region, &inst.rhs)?;

    let r1 = ValueInfo::fresh_random();
    let r2 = ValueInfo::fresh_random();
    let m_a = masked_temp(&inst.res, "andmA");
    let m_b = masked_temp(&inst.res, "andmB");
    let neg_mb = unknown_temp(&inst.res, "andneg1");
    let m_ar2 = unknown_temp(&inst.res, "andr2");
    let neg_r1 = unknown_temp(&inst.res, "andneg2");
    let tmp1 = unknown_temp(&inst.res, "andtmp1");
    let tmp2 = unknown_temp(&inst.res, "andtmp2");
    let tmp3 = unknown_temp(&inst.res, "andtmp3");
    let tmp4 = unknown_temp(&inst.res, "andtmp4");
    let tmp5 = unknown_temp(&inst.res, "andtmp5");
    let tmp6 = unknown_temp(&inst.res, "andtmp6");
    for value in &[
        &r1, &r2, &m_a, &m_b, &neg_mb, &m_ar2, &neg_r1, &tmp1, &tmp2, &tmp3, &tmp4, &tmp5, &tmp6,
    ] {
        region.declare((*value).clone());
    }

    region.push(Instruction::binary(Op::Xor, m_a.clone(), inst.lhs.clone(), r1.clone()));
    region.push(Instruction::binary(Op::Xor, m_b.clone(), inst.rhs.clone(), r2.clone()));
    region.push(Instruction::unary(Op::Not, neg_mb.clone(), m_b.clone()));
    region.push(Instruction::binary(Op::LogAnd, m_ar2.clone(), m_a.clone(), r2.clone()));
    region.push(Instruction::unary(Op::Not, neg_r1.clone(), r1.clone()));
    region.push(Instruction::binary(Op::LogAnd, tmp1.clone(), neg_mb, r1));
    region.push(Instruction::binary(Op::LogAnd, tmp2.clone(), m_b, m_a));
    region.push(Instruction::unary(Op::Not, tmp3.clone(), m_ar2));
    region.push(Instruction::binary(Op::LogOr, tmp4.clone(), neg_r1, r2));
    region.push(Instruction::binary(Op::LogOr, tmp5.clone(), tmp1, tmp2));
    region.push(Instruction::binary(Op::Xor, tmp6.clone(), tmp3, tmp4));
    region.push(Instruction::binary(Op::Xor, inst.res.clone(), tmp5, tmp6));
    Ok(())
}

/// `A|B == !((!A) & (!B))`: the expansion is masked by running it through
/// its own divide → mask → collect → concatenate pipeline.
fn mask_or(region: &mut Region, inst: &Instruction) -> Result<()> {
    debug!("expanding or into masked De Morgan form for {}", inst.res.name);
    let n_a = unknown_temp(&inst.res, "ornA");
    let n_b = unknown_temp(&inst.res, "ornB");
    let and_nn = masked_temp(&inst.res, "orand");

    let mut expansion = Region::new();
    for value in &[&inst.lhs, &inst.rhs, &inst.res, &n_a, &n_b, &and_nn] {
        if value.prop != VProp::Cst {
            expansion.declare((*value).clone());
        }
    }
    expansion.push(Instruction::unary(Op::Not, n_a.clone(), inst.lhs.clone()));
    expansion.push(Instruction::unary(Op::Not, n_b.clone(), inst.rhs.clone()));
    expansion.push(Instruction::binary(Op::LogAnd, and_nn.clone(), n_a, n_b));
    expansion.push(Instruction::unary(Op::Not, inst.res.clone(), and_nn));

    let divided = TrivialRegionDivider::new(expansion);
    let masked = TrivialRegionMasker::new(divided)?;
    let collected = RegionCollector::collect(masked)?;
    let concatenated = RegionConcatenator::new(collected)?;

    let inner = concatenated.into_region();
    region.absorb_symbols(inner.symbols);
    region.insts.extend(inner.insts);
    Ok(())
}

fn lookup_operand(globals: &SymbolTable, region: &Region, value: &ValueInfo) -> Result<()> {
    if value.prop == VProp::Cst
        || globals.contains_key(&value.name)
        || region.symbols.contains_key(&value.name)
    {
        Ok(())
    } else {
        Err(Error::UnknownSymbol(value.name.clone()))
    }
}
