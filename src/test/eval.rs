use matches::assert_matches;

use super::*;
use crate::error::Error;
use crate::ir::Width;

fn wide(name: &str, width: Width) -> ValueInfo {
    ValueInfo::new(name, width, VProp::Unk)
}

#[test]
fn boolean_operations() {
    let region = region_of(vec![
        Instruction::binary(Op::Xor, var("x"), pub_bit("a"), pub_bit("b")),
        Instruction::binary(Op::LogAnd, var("y"), var("x"), pub_bit("a")),
        Instruction::binary(Op::LogOr, var("z"), var("y"), pub_bit("b")),
        Instruction::unary(Op::Not, var("n"), var("z")),
        Instruction::binary(Op::Eq, var("e"), var("x"), pub_bit("b")),
    ]);
    let result = run_with(&region, &[("a", 1), ("b", 0)]);
    assert_eq!(result.value("x"), Some(1));
    assert_eq!(result.value("y"), Some(1));
    assert_eq!(result.value("z"), Some(1));
    assert_eq!(result.value("n"), Some(0));
    assert_eq!(result.value("e"), Some(0));
}

#[test]
fn width_truncation_and_wrapping() {
    let region = region_of(vec![
        Instruction::binary(Op::Add, wide("s", 8), wide("a", 8), wide("b", 8)),
        Instruction::binary(Op::Mul, wide("p", 8), wide("a", 8), wide("b", 8)),
        Instruction::unary(Op::BitNot, wide("n", 8), wide("a", 8)),
    ]);
    let result = run_with(&region, &[("a", 200), ("b", 100)]);
    assert_eq!(result.value("s"), Some(44));
    assert_eq!(result.value("p"), Some((200 * 100) % 256));
    assert_eq!(result.value("n"), Some(55));
}

#[test]
fn bool_destinations_normalize() {
    // a multi-bit value moved into a width-1 destination becomes 0 or 1
    let region = region_of(vec![Instruction::unary(
        Op::Assign,
        var("t"),
        wide("a", 8),
    )]);
    assert_eq!(run_with(&region, &[("a", 4)]).value("t"), Some(1));
    assert_eq!(run_with(&region, &[("a", 0)]).value("t"), Some(0));
}

#[test]
fn marshalling_round_trip() {
    let a = wide("a", 8);
    let t = wide("t", 8);
    let mut insts = Vec::new();
    for i in 0..8u32 {
        insts.push(Instruction::binary(
            Op::BitExtract,
            var(&format!("a#{}", i)),
            a.clone(),
            ValueInfo::literal(i.to_string()),
        ));
    }
    insts.push(Instruction::unary(Op::Clear, t.clone(), ValueInfo::literal("0")));
    for i in 0..8u32 {
        insts.push(Instruction::binary(
            Op::BitInsert,
            t.clone(),
            var(&format!("a#{}", i)),
            ValueInfo::literal(i.to_string()),
        ));
    }
    let region = region_of(insts);
    assert_eq!(run_with(&region, &[("a", 0xA7)]).value("t"), Some(0xA7));
}

#[test]
fn literal_operands() {
    let region = region_of(vec![Instruction::binary(
        Op::Xor,
        var("t"),
        pub_bit("a"),
        ValueInfo::literal("1"),
    )]);
    assert_eq!(run_with(&region, &[("a", 1)]).value("t"), Some(0));
}

#[test]
fn comments_are_skipped() {
    let region = region_of(vec![
        Instruction::comment("nothing to see"),
        Instruction::binary(Op::Xor, var("t"), pub_bit("a"), pub_bit("b")),
    ]);
    let mut evaluator = Evaluator::new();
    evaluator.bind("a", 1);
    evaluator.bind("b", 1);
    let trace = evaluator.run(&region).unwrap();
    assert_eq!(trace, vec![0]);
}

#[test]
fn unknown_operand_is_an_error() {
    let region = region_of(vec![Instruction::binary(
        Op::Xor,
        var("t"),
        pub_bit("a"),
        pub_bit("b"),
    )]);
    let mut evaluator = Evaluator::new();
    evaluator.bind("a", 1);
    assert_matches!(evaluator.run(&region), Err(Error::UnknownSymbol(_)));
}
