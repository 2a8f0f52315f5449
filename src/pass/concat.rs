//! Swap-and-patch concatenation of masked regions.
//!
//! A masked region unmasks its outputs, so a later region that consumes one
//! would momentarily observe a true value. Only a change to a definition has
//! global visibility, so the first use of an output swaps its fresh random
//! with the definition's recorded random; every later use is followed by two
//! patch XORs that restore the value the swap displaced.

use std::collections::HashMap;

use log::debug;

use crate::error::{Error, Result};
use crate::ir::{Instruction, Op, Region, VProp, ValueInfo};
use crate::pass::collect::{rand_side, RegionCollector, XorMap};

/// Stitches every masked region into one output region, rewriting XOR uses
/// and defs so that random bits introduced in one region cancel consistently
/// in later ones.
#[derive(Clone, Debug)]
pub struct RegionConcatenator {
    pub region: Region,
}

impl RegionConcatenator {
    pub fn new(collected: RegionCollector) -> Result<RegionConcatenator> {
        let RegionCollector {
            regions,
            symbols,
            output2xors,
            mut aliases,
        } = collected;

        let mut out = Region::with_symbols(symbols);
        let mut var2def: HashMap<String, usize> = HashMap::new();
        let mut xor_diff: HashMap<String, [String; 2]> = HashMap::new();

        for masked in regions {
            for inst in masked.region.insts {
                if inst.op != Op::Xor {
                    if inst.op == Op::Assign {
                        let root = aliases.find(&inst.lhs.name);
                        aliases.record(&inst.res.name, &root);
                    }
                    out.push(inst);
                    continue;
                }
                if !cfg!(feature = "gap-filling") {
                    out.push(inst);
                    continue;
                }

                // the target is not resolved through the alias chain: a new
                // def overrides it
                let assign_to = inst.res.name.clone();
                let lhs_root = aliases.find(&inst.lhs.name);
                let rhs_root = aliases.find(&inst.rhs.name);
                let is_def = output2xors.contains_key(&assign_to);
                let is_l_use = in_xor_set(&output2xors, &lhs_root, &rhs_root);
                let is_r_use = in_xor_set(&output2xors, &rhs_root, &lhs_root);

                if (is_def as u8) + (is_l_use as u8) + (is_r_use as u8) > 1 {
                    return Err(Error::AmbiguousXor(inst.to_string()));
                }

                if is_def {
                    out.push(Instruction::comment("def:"));
                    var2def.insert(assign_to, out.insts.len());
                    out.push(inst);
                } else if is_l_use {
                    patch_use(&mut out, &var2def, &mut xor_diff, inst, lhs_root, rhs_root, UseSide::Lhs)?;
                } else if is_r_use {
                    patch_use(&mut out, &var2def, &mut xor_diff, inst, rhs_root, lhs_root, UseSide::Rhs)?;
                } else {
                    out.push(inst);
                }
            }
            out.absorb_symbols(masked.region.symbols);
        }
        Ok(RegionConcatenator { region: out })
    }

    pub fn into_region(self) -> Region {
        self.region
    }
}

fn in_xor_set(output2xors: &XorMap, target: &str, rand: &str) -> bool {
    output2xors
        .get(target)
        .map(|set| set.contains(rand))
        .unwrap_or(false)
}

#[derive(Clone, Copy)]
enum UseSide {
    Lhs,
    Rhs,
}

fn patch_use(
    out: &mut Region,
    var2def: &HashMap<String, usize>,
    xor_diff: &mut HashMap<String, [String; 2]>,
    inst: Instruction,
    target: String,
    use_rand_root: String,
    side: UseSide,
) -> Result<()> {
    if let Some(diff) = xor_diff.get(&target) {
        // later use: the new random first, then both recorded differences
        debug!("patching later use of {}", target);
        out.push(Instruction::comment(format!("{{replaced({}):", target)));
        let res = inst.res.clone();
        out.push(inst);
        for name in diff {
            out.push(Instruction::binary(
                Op::Xor,
                res.clone(),
                res.clone(),
                ValueInfo::new(name.clone(), 1, VProp::Rnd),
            ));
        }
        out.push(Instruction::comment(":replaced}"));
        return Ok(());
    }

    // first use: swap this use's random with the def's random
    let def_index = match var2def.get(&target) {
        Some(&index) => index,
        None => return Err(Error::MissingDef(target)),
    };
    let def_rand = rand_side(&out.insts[def_index]).clone();
    let def_rand_on_rhs = out.insts[def_index].rhs == def_rand;
    debug!(
        "first use of {}: swapping {} with its def's {}",
        target, use_rand_root, def_rand.name
    );
    xor_diff.insert(target, [use_rand_root, def_rand.name.clone()]);

    let use_rand = match side {
        UseSide::Lhs => {
            out.push(Instruction::binary(
                Op::Xor,
                inst.res.clone(),
                inst.lhs.clone(),
                def_rand,
            ));
            inst.rhs
        }
        UseSide::Rhs => {
            out.push(Instruction::binary(
                Op::Xor,
                inst.res.clone(),
                def_rand,
                inst.rhs.clone(),
            ));
            inst.lhs
        }
    };
    if def_rand_on_rhs {
        out.insts[def_index].rhs = use_rand;
    } else {
        out.insts[def_index].lhs = use_rand;
    }
    Ok(())
}
