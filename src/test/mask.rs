use matches::assert_matches;

use super::*;
use crate::error::Error;
use crate::pass::{MaskedRegion, TrivialRegionDivider, TrivialRegionMasker};

fn mask_single(inst: Instruction) -> MaskedRegion {
    let region = region_of(vec![inst]);
    let divided = TrivialRegionDivider::new(region);
    let mut masked = TrivialRegionMasker::new(divided).unwrap();
    assert_eq!(masked.regions.len(), 1);
    masked.regions.remove(0)
}

fn ops_of(masked: &MaskedRegion) -> Vec<Op> {
    core_insts(&masked.region).iter().map(|inst| inst.op).collect()
}

fn distinct_randoms(masked: &MaskedRegion) -> usize {
    fresh_randoms(&masked.region, &SymbolTable::new()).len()
}

#[test]
fn xor_gadget_is_five_xors() {
    let masked = mask_single(Instruction::binary(Op::Xor, var("t"), pub_bit("a"), pub_bit("b")));
    assert_eq!(ops_of(&masked), vec![Op::Xor; 5]);
    assert_eq!(distinct_randoms(&masked), 2);
    let core = core_insts(&masked.region);
    assert_eq!(core[4].res.name, "t");
}

#[test]
fn not_gadget_is_two_xors_around_a_not() {
    let masked = mask_single(Instruction::unary(Op::Not, var("t"), pub_bit("a")));
    assert_eq!(ops_of(&masked), vec![Op::Xor, Op::Not, Op::Xor]);
    assert_eq!(distinct_randoms(&masked), 1);
}

#[test]
fn and_gadget_shape_and_order() {
    let masked = mask_single(Instruction::binary(Op::And, var("t"), pub_bit("a"), pub_bit("b")));
    assert_eq!(
        ops_of(&masked),
        vec![
            Op::Xor,
            Op::Xor,
            Op::Not,
            Op::LogAnd,
            Op::Not,
            Op::LogAnd,
            Op::LogAnd,
            Op::Not,
            Op::LogOr,
            Op::LogOr,
            Op::Xor,
            Op::Xor,
        ]
    );
    assert_eq!(distinct_randoms(&masked), 2);
    let core = core_insts(&masked.region);
    assert_eq!(core[11].res.name, "t");
    // the rail random is the one that masks the left operand
    assert_eq!(core[4].lhs, core[0].rhs);
    assert_eq!(core[5].rhs, core[0].rhs);
}

#[test]
fn eq_gadget_uses_a_third_random() {
    let masked = mask_single(Instruction::binary(Op::Eq, var("t"), pub_bit("a"), pub_bit("b")));
    let ops = ops_of(&masked);
    assert_eq!(ops.len(), 8);
    assert_eq!(ops.iter().filter(|&&op| op == Op::Xor).count(), 7);
    assert_eq!(ops.iter().filter(|&&op| op == Op::Not).count(), 1);
    assert_eq!(distinct_randoms(&masked), 3);
}

#[test]
fn or_expands_through_the_nested_pipeline() {
    let masked = mask_single(Instruction::binary(Op::Or, var("t"), pub_bit("a"), pub_bit("b")));
    let ops = ops_of(&masked);
    // two NOT gadgets, the AND gadget and a final NOT gadget
    assert_eq!(ops.len(), 21);
    // the nested concatenation marked the inner defs
    assert!(masked
        .region
        .insts
        .iter()
        .any(|inst| inst.op == Op::Comment && inst.res.name == "def:"));
    assert_eq!(core_insts(&masked.region).last().unwrap().res.name, "t");
}

#[test]
fn gadget_temporaries_are_declared_with_their_property() {
    let masked = mask_single(Instruction::binary(Op::Xor, var("t"), pub_bit("a"), pub_bit("b")));
    let symbols = &masked.region.symbols;
    assert_eq!(symbols.get("txormA").map(|v| v.prop), Some(VProp::Masked));
    assert_eq!(symbols.get("txormT").map(|v| v.prop), Some(VProp::Masked));
    let masked = mask_single(Instruction::binary(Op::And, var("t"), pub_bit("a"), pub_bit("b")));
    let symbols = &masked.region.symbols;
    assert_eq!(symbols.get("tandmA").map(|v| v.prop), Some(VProp::Masked));
    assert_eq!(symbols.get("tandtmp1").map(|v| v.prop), Some(VProp::Unk));
}

#[test]
fn inputs_and_outputs_are_recorded() {
    let masked = mask_single(Instruction::binary(Op::Xor, var("t"), pub_bit("a"), pub_bit("b")));
    assert_eq!(masked.inputs.len(), 2);
    assert!(masked.inputs.iter().any(|v| v.name == "a"));
    assert!(masked.inputs.iter().any(|v| v.name == "b"));
    assert_eq!(masked.outputs.len(), 1);
    assert!(masked.outputs.iter().any(|v| v.name == "t"));
}

#[test]
fn moves_and_comments_pass_through() {
    let masked = mask_single(Instruction::unary(Op::Assign, var("u"), var("t")));
    assert_eq!(ops_of(&masked), vec![Op::Assign]);

    let region = region_of(vec![Instruction::comment(" preserved")]);
    let divided = TrivialRegionDivider::new(region);
    let masked = TrivialRegionMasker::new(divided).unwrap();
    assert!(masked.regions[0]
        .region
        .insts
        .iter()
        .all(|inst| inst.op == Op::Comment));
    assert!(masked.regions[0].outputs.is_empty());
}

#[test]
fn and_operands_must_be_declared() {
    let mut region = region_of(vec![Instruction::binary(
        Op::And,
        var("t"),
        pub_bit("a"),
        pub_bit("b"),
    )]);
    region.symbols.clear();
    let divided = TrivialRegionDivider::new(region);
    assert_matches!(
        TrivialRegionMasker::new(divided),
        Err(Error::UnknownSymbol(_))
    );
}
