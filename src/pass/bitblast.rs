//! Bit-blasting: reduce multi-bit operations to single-bit ones.
//!
//! Each instruction is encoded as a bit-vector goal together with the mask
//! constraints tying every variable to its named bits (`v#i`), run through
//! the solver's `simplify → bit-blast → simplify` chain, and the resulting
//! boolean formulas are decoded back into single-bit 3AIR. Input bits are
//! made nameable with `/var=>z3/` marshalling instructions and output
//! variables are reassembled from their bits at the end.

use std::collections::HashMap;

use crate::ir::{Op, Region, VProp};

#[cfg(feature = "z3-blast")]
pub use self::solver::blast;

/// Topological order ids: for each instruction in program order,
/// `topo(res) = 1 + max(topo(operands))`. Later stages use the ids to
/// orient solver equalities into assignments.
pub fn topological_ids(region: &Region) -> HashMap<String, u32> {
    let mut topo: HashMap<String, u32> = HashMap::new();
    for inst in &region.insts {
        if inst.op == Op::Comment {
            continue;
        }
        let left = topo.get(&inst.lhs.name).copied().unwrap_or(0);
        let id = if inst.is_unary() {
            left + 1
        } else {
            left.max(topo.get(&inst.rhs.name).copied().unwrap_or(0)) + 1
        };
        topo.insert(inst.res.name.clone(), id);
    }
    topo
}

/// Which side of a solver equality receives the assignment.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EqDirection {
    /// `lhs = rhs`
    IntoLhs,
    /// `rhs = lhs`
    IntoRhs,
}

/// Chooses the assignment direction for `lhs == rhs`. In order: a
/// PUB/SECRET/RND side is never the target; otherwise the larger
/// topological id is the target; on a tie the side already present in the
/// symbol table is the target. The second component is false when the tie
/// break had to decide, which callers surface as a warning.
pub fn equality_direction(
    lhs_prop: Option<VProp>,
    rhs_prop: Option<VProp>,
    lhs_topo: u32,
    rhs_topo: u32,
    lhs_declared: bool,
) -> (EqDirection, bool) {
    let lhs_input = is_input(lhs_prop);
    let rhs_input = is_input(rhs_prop);
    if lhs_input && !rhs_input {
        return (EqDirection::IntoRhs, true);
    }
    if rhs_input && !lhs_input {
        return (EqDirection::IntoLhs, true);
    }
    if lhs_topo > rhs_topo {
        return (EqDirection::IntoLhs, true);
    }
    if rhs_topo > lhs_topo {
        return (EqDirection::IntoRhs, true);
    }
    if lhs_declared {
        (EqDirection::IntoLhs, false)
    } else {
        (EqDirection::IntoRhs, false)
    }
}

fn is_input(prop: Option<VProp>) -> bool {
    match prop {
        Some(VProp::Pub) | Some(VProp::Secret) | Some(VProp::Rnd) => true,
        _ => false,
    }
}

/// `out#3` → `("out", 3)`.
pub fn split_bit_name(name: &str) -> Option<(&str, u32)> {
    let pos = name.find('#')?;
    let index = name[pos + 1..].parse().ok()?;
    Some((&name[..pos], index))
}

/// Solver-internal label id: `k!7` → `7`.
pub fn solver_id(name: &str) -> Option<i64> {
    let pos = name.find('!')?;
    name[pos + 1..].parse().ok()
}

/// `("out", 3)` → `out#3`.
pub fn bit_name(var: &str, index: u32) -> String {
    format!("{}#{}", var, index)
}

#[cfg(feature = "z3-blast")]
mod solver {
    use std::collections::{HashMap, HashSet};

    use log::{debug, warn};
    use z3::ast::{Ast, Bool, Dynamic, BV};
    use z3::{AstKind, Config, Context, DeclKind, FuncDecl, Goal, Params, Tactic};

    use super::{
        bit_name, equality_direction, solver_id, split_bit_name, topological_ids, EqDirection,
    };
    use crate::error::{Error, Result};
    use crate::ir::{Instruction, Op, Region, VProp, ValueInfo};

    /// Blasts `region` into an equivalent region whose operations act only
    /// on single-bit values. `ret` names the observable output to
    /// reassemble. The solver context lives exactly as long as this call.
    pub fn blast(ret: &ValueInfo, region: Region) -> Result<Region> {
        debug!("bit-blasting {} instructions", region.count());
        let config = Config::new();
        let context = Context::new(&config);
        let declared: Vec<ValueInfo> = region.symbols.values().cloned().collect();

        let mut blaster = Blaster {
            context: &context,
            topo: topological_ids(&region),
            bitvecs: HashMap::new(),
            bits: HashMap::new(),
            masks: HashMap::new(),
            id2varbit: HashMap::new(),
            varbit2id: HashMap::new(),
            split: HashSet::new(),
            next_temp: 0,
            blasted: Region::with_symbols(region.symbols),
            ret: ret.clone(),
        };
        for value in &declared {
            blaster.register_variable(value);
        }
        blaster.register_return();
        for inst in region.insts {
            blaster.id2varbit.clear();
            blaster.varbit2id.clear();
            blaster.blast_instruction(inst)?;
        }
        blaster.assemble_outputs();
        Ok(blaster.blasted)
    }

    struct Decoded {
        name: String,
        topo: u32,
    }

    impl Decoded {
        fn named(name: String, topo: u32) -> Decoded {
            Decoded { name, topo }
        }

        fn none() -> Decoded {
            Decoded {
                name: String::new(),
                topo: 0,
            }
        }
    }

    struct Blaster<'ctx> {
        context: &'ctx Context,
        topo: HashMap<String, u32>,
        bitvecs: HashMap<ValueInfo, BV<'ctx>>,
        bits: HashMap<ValueInfo, Vec<Bool<'ctx>>>,
        masks: HashMap<ValueInfo, Vec<Bool<'ctx>>>,
        /// solver label id → variable bit name; cleared per instruction
        id2varbit: HashMap<i64, String>,
        varbit2id: HashMap<String, i64>,
        split: HashSet<ValueInfo>,
        next_temp: usize,
        blasted: Region,
        ret: ValueInfo,
    }

    impl<'ctx> Blaster<'ctx> {
        /// Allocates the bit vector, the named bits `v#0..v#w-1` and the
        /// mask constraints `v#i ⇔ ((v & (1<<i)) == (1<<i))` for one
        /// variable; inputs additionally get their bits marshalled out.
        fn register_variable(&mut self, value: &ValueInfo) {
            let width = value.width.abs() as u32;
            if width == 0 {
                return;
            }
            let vector = BV::new_const(self.context, value.name.as_str(), width);
            let mut bits = Vec::with_capacity(width as usize);
            let mut masks = Vec::with_capacity(width as usize);
            for i in 0..width {
                let bit = Bool::new_const(self.context, bit_name(&value.name, i));
                let mask = BV::from_u64(self.context, 1u64 << i, width);
                masks.push(bit._eq(&vector.bvand(&mask)._eq(&mask)));
                bits.push(bit);
            }
            self.bitvecs.insert(value.clone(), vector);
            self.bits.insert(value.clone(), bits);
            self.masks.insert(value.clone(), masks);

            if value.prop == VProp::Pub || value.prop == VProp::Secret {
                self.split_into_bits(value);
            }
        }

        /// The return value is tracked separately from its symbol-table
        /// entry: its bits are what the epilogue reassembles.
        fn register_return(&mut self) {
            let width = self.ret.width.abs() as u32;
            let mut bits = Vec::with_capacity(width as usize);
            for i in 0..width {
                bits.push(Bool::new_const(self.context, bit_name(&self.ret.name, i)));
            }
            let ret = self.ret.clone();
            self.bits.insert(ret, bits);
        }

        fn split_into_bits(&mut self, value: &ValueInfo) {
            let width = value.width.abs() as u32;
            debug!("splitting input {} into {} bits", value.name, width);
            for i in 0..width {
                let bit = ValueInfo::new(bit_name(&value.name, i), 1, value.prop);
                self.blasted.declare(bit.clone());
                self.blasted.push(Instruction::binary(
                    Op::BitExtract,
                    bit,
                    value.clone(),
                    ValueInfo::literal(i.to_string()),
                ));
            }
            self.split.insert(value.clone());
        }

        /// Reassembles every OUTPUT variable from its bits at program end.
        fn assemble_outputs(&mut self) {
            let mut outputs: Vec<ValueInfo> = self
                .bits
                .keys()
                .filter(|value| value.prop == VProp::Output)
                .cloned()
                .collect();
            outputs.sort_by(|a, b| a.name.cmp(&b.name));
            for value in outputs {
                let width = self.bits[&value].len() as u32;
                self.blasted
                    .push(Instruction::unary(Op::Clear, value.clone(), ValueInfo::literal("0")));
                for i in 0..width {
                    let name = bit_name(&value.name, i);
                    if !self.blasted.symbols.contains_key(&name) {
                        self.blasted.declare(ValueInfo::new(name.clone(), 1, VProp::Unk));
                    }
                    self.blasted.push(Instruction::binary(
                        Op::BitInsert,
                        value.clone(),
                        ValueInfo::new(name, 1, VProp::Unk),
                        ValueInfo::literal(i.to_string()),
                    ));
                }
            }
        }

        fn blast_instruction(&mut self, inst: Instruction) -> Result<()> {
            if inst.op == Op::Comment {
                self.blasted.push(inst);
                return Ok(());
            }
            self.blasted.push(Instruction::comment(inst.to_string()));
            debug!("blast: {}", inst);

            let goal = Goal::new(self.context, false, false, false);
            self.assert_masks(&goal, &inst.lhs);
            self.assert_masks(&goal, &inst.res);
            if !inst.is_unary() {
                self.assert_masks(&goal, &inst.rhs);
            }
            if !self.encode(&goal, &inst)? {
                warn!("operator {} has no bit-vector encoding", inst.op);
                self.blasted
                    .push(Instruction::comment(format!("!not blasted: {}", inst)));
                return Ok(());
            }
            self.extract(&goal)?;

            // first definition of an input-properted result splits it late
            if (inst.res.prop == VProp::Pub || inst.res.prop == VProp::Secret)
                && !self.split.contains(&inst.res)
            {
                let res = inst.res.clone();
                self.split_into_bits(&res);
            }
            Ok(())
        }

        fn assert_masks(&self, goal: &Goal<'ctx>, value: &ValueInfo) {
            if let Some(masks) = self.masks.get(value) {
                for mask in masks {
                    goal.assert(mask);
                }
            }
        }

        /// Adds the bit-vector equation defining the operation. `false`
        /// means the operator has no encoding and the instruction is kept
        /// as a warning comment.
        fn encode(&mut self, goal: &Goal<'ctx>, inst: &Instruction) -> Result<bool> {
            let res = self.operand_vector(&inst.res, inst)?;
            let lhs = self.operand_vector(&inst.lhs, inst)?;
            match inst.op {
                Op::Assign => goal.assert(&res._eq(&lhs)),
                Op::Xor => {
                    let rhs = self.operand_vector(&inst.rhs, inst)?;
                    goal.assert(&res._eq(&lhs.bvxor(&rhs)));
                }
                Op::Or | Op::LogOr => {
                    let rhs = self.operand_vector(&inst.rhs, inst)?;
                    goal.assert(&res._eq(&lhs.bvor(&rhs)));
                }
                Op::And | Op::LogAnd => {
                    let rhs = self.operand_vector(&inst.rhs, inst)?;
                    goal.assert(&res._eq(&lhs.bvand(&rhs)));
                }
                Op::BitNot => goal.assert(&res._eq(&lhs.bvnot())),
                Op::Not => {
                    if inst.lhs.width.abs() == 1 {
                        goal.assert(&res._eq(&lhs.bvnot()));
                    } else {
                        return Ok(false);
                    }
                }
                Op::Add => {
                    let rhs = self.operand_vector(&inst.rhs, inst)?;
                    goal.assert(&res._eq(&lhs.bvadd(&rhs)));
                }
                Op::Sub => {
                    let rhs = self.operand_vector(&inst.rhs, inst)?;
                    goal.assert(&res._eq(&lhs.bvsub(&rhs)));
                }
                Op::Mul => {
                    let rhs = self.operand_vector(&inst.rhs, inst)?;
                    goal.assert(&res._eq(&lhs.bvmul(&rhs)));
                }
                Op::Eq => {
                    let rhs = self.operand_vector(&inst.rhs, inst)?;
                    let width = inst.res.width.abs().max(1) as u32;
                    let one = BV::from_u64(self.context, 1, width);
                    let zero = BV::from_u64(self.context, 0, width);
                    goal.assert(&res._eq(&lhs._eq(&rhs).ite(&one, &zero)));
                }
                _ => return Ok(false),
            }
            Ok(true)
        }

        fn operand_vector(&mut self, value: &ValueInfo, inst: &Instruction) -> Result<BV<'ctx>> {
            if value.prop == VProp::Cst {
                let literal: u64 = value
                    .name
                    .parse()
                    .map_err(|_| Error::UnknownSymbol(value.name.clone()))?;
                let width = inst.res.width.abs().max(1) as u32;
                return Ok(BV::from_u64(self.context, literal, width));
            }
            match self.bitvecs.get(value) {
                Some(vector) => Ok(vector.clone()),
                None => Err(Error::UnknownSymbol(value.name.clone())),
            }
        }

        /// Applies `simplify → bit-blast(blast_full) → simplify` and decodes
        /// every resulting formula. The goal is quantifier-free and in the
        /// decidable bit-vector logic; a tactic failure is fatal.
        fn extract(&mut self, goal: &Goal<'ctx>) -> Result<()> {
            let simplify = Tactic::new(self.context, "simplify");
            let bit_blast = Tactic::new(self.context, "bit-blast");
            let simplify_again = Tactic::new(self.context, "simplify");
            let chain = simplify.and_then(&bit_blast).and_then(&simplify_again);

            let mut params = Params::new(self.context);
            params.set_bool("blast_full", true);

            let result = chain
                .apply(goal, Some(&params))
                .map_err(|e| Error::Smt(format!("tactic failed: {:?}", e)))?;
            for subgoal in result.list_subgoals() {
                for formula in subgoal.get_formulas::<Bool>() {
                    let node = Dynamic::from_ast(&formula);
                    self.decode(&node, 1, false)?;
                }
            }
            Ok(())
        }

        /// Walks one formula node, emitting single-bit 3AIR. `depth` 1 is a
        /// top-level statement position; `expression` marks positions whose
        /// value feeds an enclosing operation.
        fn decode(&mut self, node: &Dynamic<'ctx>, depth: u32, expression: bool) -> Result<Decoded> {
            match node.kind() {
                AstKind::Numeral => Ok(Decoded::named(node.to_string(), 0)),
                AstKind::Var => {
                    warn!("bound variable in blasted formula: {}", node);
                    Ok(Decoded::named(node.to_string(), 0))
                }
                AstKind::Quantifier => {
                    warn!("quantifier in blasted formula");
                    self.blasted
                        .push(Instruction::comment(format!("!unknown quantifier {}", node)));
                    Ok(Decoded::none())
                }
                AstKind::App => {
                    let decl = node.decl();
                    if node.children().is_empty() {
                        return Ok(self.decode_constant(&decl));
                    }
                    match decl.kind() {
                        DeclKind::NOT => self.decode_not(node, depth, expression),
                        DeclKind::EQ | DeclKind::IFF => self.decode_eq(node, depth, expression),
                        DeclKind::AND if depth == 1 && !expression => {
                            // a conjunction of statements: decode each
                            for child in &node.children() {
                                self.decode(child, 1, false)?;
                            }
                            Ok(Decoded::none())
                        }
                        DeclKind::AND => self.decode_fold(node, Op::LogAnd, depth),
                        DeclKind::OR => self.decode_fold(node, Op::LogOr, depth),
                        DeclKind::XOR => self.decode_fold(node, Op::Xor, depth),
                        DeclKind::ITE => self.decode_ite(node, depth),
                        DeclKind::DISTINCT => self.decode_distinct(node, depth, expression),
                        _ => {
                            warn!("unknown application {} in blasted formula", decl.name());
                            self.blasted
                                .push(Instruction::comment(format!("!unknown node {}", node)));
                            Ok(Decoded::none())
                        }
                    }
                }
                _ => {
                    warn!("unknown node kind in blasted formula");
                    self.blasted
                        .push(Instruction::comment(format!("!unknown node {}", node)));
                    Ok(Decoded::none())
                }
            }
        }

        /// A constant is a named bit (`v#i`), a solver label (`k!7`) that an
        /// earlier alias tied to a named bit, or a boolean literal.
        fn decode_constant(&mut self, decl: &FuncDecl<'ctx>) -> Decoded {
            match decl.kind() {
                DeclKind::TRUE => return Decoded::named("1".to_string(), 0),
                DeclKind::FALSE => return Decoded::named("0".to_string(), 0),
                _ => {}
            }
            let name = decl.name();
            if let Some(id) = solver_id(&name) {
                if let Some(varbit) = self.id2varbit.get(&id) {
                    let topo = self.topo_of_bit(varbit);
                    return Decoded::named(varbit.clone(), topo);
                }
            }
            let topo = self.topo_of_bit(&name);
            Decoded::named(name, topo)
        }

        fn topo_of_bit(&self, name: &str) -> u32 {
            match split_bit_name(name) {
                Some((base, _)) => self.topo.get(base).copied().unwrap_or(0),
                None => 0,
            }
        }

        fn decode_not(&mut self, node: &Dynamic<'ctx>, depth: u32, expression: bool) -> Result<Decoded> {
            let children = node.children();
            let operand = self.decode(&children[0], depth + 1, expression)?;
            if depth == 1 && !expression {
                // `not (v == expr)` at statement position folds into the
                // assignment just emitted
                match self.blasted.insts.last_mut() {
                    Some(last) if last.op == Op::Assign => {
                        last.op = Op::Not;
                        let name = last.res.name.clone();
                        return Ok(Decoded::named(name, 0));
                    }
                    _ => {
                        return Err(Error::Smt(
                            "top-level negation without a preceding assignment".to_string(),
                        ))
                    }
                }
            }
            let temp = self.fresh_temp();
            self.blasted.declare(temp.clone());
            self.blasted.push(Instruction::unary(
                Op::Not,
                temp.clone(),
                ValueInfo::new(operand.name, 1, VProp::Unk),
            ));
            Ok(Decoded::named(temp.name, 0))
        }

        fn decode_eq(&mut self, node: &Dynamic<'ctx>, depth: u32, expression: bool) -> Result<Decoded> {
            let children = node.children();
            if children.len() != 2 {
                return Err(Error::Smt(format!(
                    "equality with {} operands",
                    children.len()
                )));
            }
            if depth == 1 && !expression {
                if let Some(done) = self.try_record_alias(&children) {
                    return Ok(done);
                }
                return self.equality_to_assignment(&children);
            }
            let lhs = self.decode(&children[0], depth + 1, true)?;
            let rhs = self.decode(&children[1], depth + 1, true)?;
            self.blasted.push(Instruction::comment(format!(
                "== l={}.{} r={}.{}",
                lhs.name, lhs.topo, rhs.name, rhs.topo
            )));
            let temp = self.fresh_temp();
            self.blasted.declare(temp.clone());
            self.blasted.push(Instruction::binary(
                Op::Eq,
                temp.clone(),
                ValueInfo::new(lhs.name, 1, VProp::Unk),
                ValueInfo::new(rhs.name, 1, VProp::Unk),
            ));
            Ok(Decoded::named(temp.name, 0))
        }

        /// A top-level `v#i == k!j` (either order) names a solver label:
        /// record the mapping both ways and surface the bit in the symbol
        /// table with the property of its base variable.
        fn try_record_alias(&mut self, children: &[Dynamic<'ctx>]) -> Option<Decoded> {
            let first = constant_name(&children[0])?;
            let second = constant_name(&children[1])?;
            let (varbit, id) = alias_pair(&first, &second).or_else(|| alias_pair(&second, &first))?;

            let base = match split_bit_name(&varbit) {
                Some((base, _)) => base.to_string(),
                None => return None,
            };
            debug!("alias: {} -> {}", varbit, id);
            self.id2varbit.insert(id, varbit.clone());
            self.varbit2id.insert(varbit.clone(), id);
            self.blasted
                .push(Instruction::comment(format!("{} -> {}", varbit, id)));
            let prop = self
                .blasted
                .symbols
                .get(&base)
                .map(|value| value.prop)
                .unwrap_or(VProp::Unk);
            if !self.blasted.symbols.contains_key(&varbit) {
                self.blasted.declare(ValueInfo::new(varbit.clone(), 1, prop));
            }
            let topo = self.topo_of_bit(&varbit);
            Some(Decoded::named(varbit, topo))
        }

        /// Rewrites a top-level equality into a directed move.
        fn equality_to_assignment(&mut self, children: &[Dynamic<'ctx>]) -> Result<Decoded> {
            let lhs = self.decode(&children[0], 2, true)?;
            let rhs = self.decode(&children[1], 2, true)?;

            let lhs_prop = self.blasted.symbols.get(&lhs.name).map(|value| value.prop);
            let rhs_prop = self.blasted.symbols.get(&rhs.name).map(|value| value.prop);
            let (direction, determined) =
                equality_direction(lhs_prop, rhs_prop, lhs.topo, rhs.topo, lhs_prop.is_some());

            let tag = if !determined {
                warn!(
                    "cannot determine assignment direction for {} == {}",
                    lhs.name, rhs.name
                );
                "(?)"
            } else if direction == EqDirection::IntoRhs {
                "(L)"
            } else {
                "(R)"
            };
            self.blasted.push(Instruction::comment(format!(
                "{}eq2assign: l={}.{} r={}.{}",
                tag, lhs.name, lhs.topo, rhs.name, rhs.topo
            )));

            let (target, source) = match direction {
                EqDirection::IntoLhs => (lhs, rhs),
                EqDirection::IntoRhs => (rhs, lhs),
            };
            for name in &[&target.name, &source.name] {
                if !self.blasted.symbols.contains_key(*name) {
                    self.blasted
                        .declare(ValueInfo::new((*name).clone(), 1, VProp::Unk));
                }
            }
            self.blasted.push(Instruction::unary(
                Op::Assign,
                ValueInfo::new(target.name.clone(), 1, VProp::Unk),
                ValueInfo::new(source.name, 1, VProp::Unk),
            ));
            Ok(Decoded::named(target.name, 0))
        }

        /// AND / OR / XOR applications become a left-associated chain of
        /// single-bit instructions through fresh intermediates.
        fn decode_fold(&mut self, node: &Dynamic<'ctx>, op: Op, depth: u32) -> Result<Decoded> {
            let children = node.children();
            self.blasted.push(Instruction::comment(format!(
                "op '{}' with {} operands",
                op,
                children.len()
            )));
            let mut previous: Option<Decoded> = None;
            for child in &children {
                let decoded = self.decode(child, depth + 1, true)?;
                previous = Some(match previous {
                    None => decoded,
                    Some(previous) => {
                        let temp = self.fresh_temp();
                        self.blasted.declare(temp.clone());
                        self.blasted.push(Instruction::binary(
                            op,
                            temp.clone(),
                            ValueInfo::new(previous.name, 1, VProp::Unk),
                            ValueInfo::new(decoded.name, 1, VProp::Unk),
                        ));
                        Decoded::named(temp.name, 0)
                    }
                });
            }
            previous.ok_or_else(|| Error::Smt(format!("empty {} application", op)))
        }

        /// `ite(c, t, e)` → `nc = !c; th = t & c; el = e & nc; r = th | el`.
        fn decode_ite(&mut self, node: &Dynamic<'ctx>, depth: u32) -> Result<Decoded> {
            let children = node.children();
            if children.len() != 3 {
                return Err(Error::Smt(format!(
                    "if-then-else with {} operands",
                    children.len()
                )));
            }
            let cond = self.decode(&children[0], depth + 1, true)?;
            let then = self.decode(&children[1], depth + 1, true)?;
            let other = self.decode(&children[2], depth + 1, true)?;

            let neg_cond = self.fresh_temp();
            let then_value = self.fresh_temp();
            let else_value = self.fresh_temp();
            let mut result = self.fresh_temp();
            result.name.push_str("_ite");
            for value in &[&neg_cond, &then_value, &else_value, &result] {
                self.blasted.declare((*value).clone());
            }
            self.blasted.push(Instruction::unary(
                Op::Not,
                neg_cond.clone(),
                ValueInfo::new(cond.name.clone(), 1, VProp::Unk),
            ));
            self.blasted.push(Instruction::binary(
                Op::And,
                then_value.clone(),
                ValueInfo::new(then.name, 1, VProp::Unk),
                ValueInfo::new(cond.name, 1, VProp::Unk),
            ));
            self.blasted.push(Instruction::binary(
                Op::And,
                else_value.clone(),
                ValueInfo::new(other.name, 1, VProp::Unk),
                neg_cond,
            ));
            self.blasted.push(Instruction::binary(
                Op::Or,
                result.clone(),
                then_value,
                else_value,
            ));
            Ok(Decoded::named(result.name, 0))
        }

        /// A two-operand `distinct` is a negated equality.
        fn decode_distinct(
            &mut self,
            node: &Dynamic<'ctx>,
            depth: u32,
            expression: bool,
        ) -> Result<Decoded> {
            let children = node.children();
            if children.len() != 2 {
                warn!("distinct with {} operands", children.len());
                self.blasted
                    .push(Instruction::comment(format!("!unknown node {}", node)));
                return Ok(Decoded::none());
            }
            if depth == 1 && !expression {
                let target = self.equality_to_assignment(&children)?;
                if let Some(last) = self.blasted.insts.last_mut() {
                    if last.op == Op::Assign {
                        last.op = Op::Not;
                    }
                }
                return Ok(target);
            }
            let lhs = self.decode(&children[0], depth + 1, true)?;
            let rhs = self.decode(&children[1], depth + 1, true)?;
            let equal = self.fresh_temp();
            let negated = self.fresh_temp();
            for value in &[&equal, &negated] {
                self.blasted.declare((*value).clone());
            }
            self.blasted.push(Instruction::binary(
                Op::Eq,
                equal.clone(),
                ValueInfo::new(lhs.name, 1, VProp::Unk),
                ValueInfo::new(rhs.name, 1, VProp::Unk),
            ));
            self.blasted
                .push(Instruction::unary(Op::Not, negated.clone(), equal));
            Ok(Decoded::named(negated.name, 0))
        }

        fn fresh_temp(&mut self) -> ValueInfo {
            let name = format!("z3_{}", self.next_temp);
            self.next_temp += 1;
            ValueInfo::new(name, 1, VProp::Unk)
        }
    }

    /// The declaration name of a zero-arity application, `None` otherwise.
    fn constant_name(node: &Dynamic) -> Option<String> {
        if node.kind() == AstKind::App && node.children().is_empty() {
            Some(node.decl().name())
        } else {
            None
        }
    }

    /// `(a, b)` where `a` is a variable bit and `b` a bare solver label.
    fn alias_pair(bit: &str, label: &str) -> Option<(String, i64)> {
        if split_bit_name(bit).is_some() && split_bit_name(label).is_none() {
            solver_id(label).map(|id| (bit.to_string(), id))
        } else {
            None
        }
    }
}
