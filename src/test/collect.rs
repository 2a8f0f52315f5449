use super::*;
use crate::pass::{RegionCollector, TrivialRegionDivider, TrivialRegionMasker};

fn collect(insts: Vec<Instruction>) -> RegionCollector {
    let divided = TrivialRegionDivider::new(region_of(insts));
    let masked = TrivialRegionMasker::new(divided).unwrap();
    RegionCollector::collect(masked).unwrap()
}

#[test]
fn def_records_the_right_operand_of_the_gadget_tail() {
    let collector = collect(vec![Instruction::binary(
        Op::Xor,
        var("t"),
        pub_bit("a"),
        pub_bit("b"),
    )]);
    let set = collector.output2xors.get("t").unwrap();
    // the xor gadget ends in `t = mR ^ mT`; the preferred side is the rhs
    assert_eq!(set.len(), 1);
    assert!(set.contains("txormT"));
}

#[test]
fn later_use_extends_the_xor_set() {
    let collector = collect(vec![
        Instruction::binary(Op::Xor, var("t"), pub_bit("a"), pub_bit("b")),
        Instruction::binary(Op::Xor, var("u"), var("t"), pub_bit("c")),
    ]);
    let set = collector.output2xors.get("t").unwrap();
    assert_eq!(set.len(), 2);
    assert!(set.contains("txormT"));
    // the second element is the random drawn for u's first unmasking
    let mut aliases = collector.aliases.clone();
    let extra = set.iter().find(|name| *name != "txormT").unwrap();
    assert!(extra.starts_with('r'));
    assert_eq!(aliases.find("t"), "t");
}

#[test]
fn defs_become_roots_and_moves_become_edges() {
    let mut collector = collect(vec![
        Instruction::binary(Op::Xor, var("t"), pub_bit("a"), pub_bit("b")),
        Instruction::unary(Op::Assign, var("u"), var("t")),
    ]);
    assert!(collector.aliases.contains("t"));
    assert!(collector.aliases.contains("u"));
    assert!(collector.aliases.same_class("u", "t"));
}

#[test]
fn uses_resolve_through_the_alias_chain() {
    let collector = collect(vec![
        Instruction::binary(Op::Xor, var("t"), pub_bit("a"), pub_bit("b")),
        Instruction::unary(Op::Assign, var("u"), var("t")),
        Instruction::binary(Op::Xor, var("v"), var("u"), pub_bit("c")),
    ]);
    // v's gadget unmasks through u, which aliases t
    let set = collector.output2xors.get("t").unwrap();
    assert_eq!(set.len(), 2);
    assert!(!collector.output2xors.contains_key("u"));
}

#[test]
fn non_xor_instructions_are_ignored() {
    let collector = collect(vec![Instruction::unary(Op::Assign, var("u"), var("t"))]);
    assert!(collector.output2xors.is_empty());
}

#[test]
fn collection_is_idempotent() {
    let divided = TrivialRegionDivider::new(region_of(vec![
        Instruction::binary(Op::Xor, var("t"), pub_bit("a"), pub_bit("b")),
        Instruction::binary(Op::Xor, var("u"), var("t"), pub_bit("c")),
        Instruction::binary(Op::Xor, var("v"), var("t"), pub_bit("a")),
    ]));
    let masked = TrivialRegionMasker::new(divided).unwrap();
    let first = RegionCollector::collect(masked.clone()).unwrap();
    let second = RegionCollector::collect(masked).unwrap();
    assert_eq!(first.output2xors, second.output2xors);
    assert_eq!(
        first.aliases.clone().classes(),
        second.aliases.clone().classes()
    );
}
