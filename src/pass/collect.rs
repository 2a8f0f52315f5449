//! Dataflow collection over masked regions: which random bits each region
//! output has been XOR'd with, and which names alias which.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::error::Result;
use crate::ir::{AliasGraph, Instruction, Op, SymbolTable, VProp, ValueInfo};
use crate::pass::mask::{MaskedRegion, TrivialRegionMasker};

/// Random-bit names a variable has been XOR'd with.
pub type XorSet = BTreeSet<String>;

/// Variable name → its accumulated XOR set.
pub type XorMap = BTreeMap<String, XorSet>;

/// Scans the masked regions in order, accumulating the XOR map and the alias
/// equivalence structure the concatenator patches with.
#[derive(Clone, Debug)]
pub struct RegionCollector {
    pub regions: Vec<MaskedRegion>,
    pub symbols: SymbolTable,
    pub output2xors: XorMap,
    pub aliases: AliasGraph,
}

impl RegionCollector {
    pub fn collect(masked: TrivialRegionMasker) -> Result<RegionCollector> {
        let mut collector = RegionCollector {
            regions: Vec::with_capacity(masked.regions.len()),
            symbols: masked.symbols,
            output2xors: XorMap::new(),
            aliases: AliasGraph::new(),
        };
        for region in masked.regions {
            collector.add(region);
        }
        Ok(collector)
    }

    fn add(&mut self, masked: MaskedRegion) {
        let mut regional = XorMap::new();
        for inst in &masked.region.insts {
            if inst.op == Op::Comment {
                continue;
            }
            if inst.op == Op::Assign {
                debug!("alias: {} = {}", inst.res.name, inst.lhs.name);
                self.aliases.record(&inst.res.name, &inst.lhs.name);
            }
            if masked.outputs.contains(&inst.res) {
                // a def: this value is exposed to later regions
                if inst.op != Op::Xor {
                    continue;
                }
                let rand = rand_side(inst);
                debug!("def: {} masked by {}", inst.res.name, rand.name);
                regional
                    .entry(inst.res.name.clone())
                    .or_insert_with(XorSet::new)
                    .insert(rand.name.clone());
                self.aliases.make_root(&inst.res.name);
                continue;
            }
            if !inst.is_unary() && self.aliases.contains(&inst.rhs.name) {
                if inst.op != Op::Xor {
                    continue;
                }
                let root = self.aliases.find(&inst.rhs.name);
                assert!(
                    inst.lhs.prop == VProp::Rnd,
                    "use of {} must pair with a random bit",
                    root
                );
                debug!("use: {} xored with {}", root, inst.lhs.name);
                regional
                    .entry(root)
                    .or_insert_with(XorSet::new)
                    .insert(inst.lhs.name.clone());
                continue;
            }
            if self.aliases.contains(&inst.lhs.name) {
                if inst.op != Op::Xor {
                    continue;
                }
                let root = self.aliases.find(&inst.lhs.name);
                assert!(
                    inst.rhs.prop == VProp::Rnd,
                    "use of {} must pair with a random bit",
                    root
                );
                debug!("use: {} xored with {}", root, inst.rhs.name);
                regional
                    .entry(root)
                    .or_insert_with(XorSet::new)
                    .insert(inst.rhs.name.clone());
                continue;
            }
        }
        for (var, set) in regional {
            self.output2xors
                .entry(var)
                .or_insert_with(XorSet::new)
                .extend(set);
        }
        self.regions.push(masked);
    }
}

/// The operand recorded as a definition's random side. The right side wins
/// when both or neither operand is random.
pub(crate) fn rand_side(inst: &Instruction) -> &ValueInfo {
    if inst.lhs.prop == VProp::Rnd && inst.rhs.prop != VProp::Rnd {
        &inst.lhs
    } else {
        &inst.rhs
    }
}
