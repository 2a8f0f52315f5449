use super::*;

fn parse_one(input: &str) -> Function {
    let mut functions = parse_program(input).unwrap();
    assert_eq!(functions.len(), 1);
    functions.remove(0)
}

#[test]
fn parses_a_binary_assignment() {
    let function = parse_one("bool f(bool a, bool b){bool t; t = a ^ b; return t;}");
    assert_eq!(function.name, "f");
    assert_eq!(function.params, vec!["a", "b"]);
    assert_eq!(function.region.count(), 1);
    let inst = &function.region.insts[0];
    assert_eq!(inst.op, Op::Xor);
    assert_eq!(inst.res.name, "t");
    assert_eq!(inst.lhs.name, "a");
    assert_eq!(inst.rhs.name, "b");
    assert_eq!(function.ret.name, "t");
    assert_eq!(function.ret.prop, VProp::Output);
    assert_eq!(function.ret.width, 1);
}

#[test]
fn parses_unary_move_and_literal_forms() {
    let function = parse_one(
        "bool f(bool a){bool t; bool u; bool v; t = !a; u = t; v = u & 1; return v;}",
    );
    let ops: Vec<Op> = function.region.insts.iter().map(|inst| inst.op).collect();
    assert_eq!(ops, vec![Op::Not, Op::Assign, Op::And]);
    let literal = &function.region.insts[2].rhs;
    assert_eq!(literal.prop, VProp::Cst);
    assert_eq!(literal.name, "1");
}

#[test]
fn classifies_parameters_by_convention() {
    let function =
        parse_one("bool f(bool a, bool r1, bool k1, uint8* out){bool t; t = a; return t;}");
    let symbols = &function.region.symbols;
    assert_eq!(symbols.get("a").unwrap().prop, VProp::Pub);
    assert_eq!(symbols.get("r1").unwrap().prop, VProp::Rnd);
    assert_eq!(symbols.get("k1").unwrap().prop, VProp::Secret);
    assert_eq!(symbols.get("out").unwrap().prop, VProp::Output);
    assert_eq!(symbols.get("out").unwrap().width, 8);
    assert_eq!(function.params, vec!["a", "r1", "k1", "out"]);
}

#[test]
fn derives_widths_from_type_names() {
    let function = parse_one(
        "uint8 f(uint8 a, uint16 b, uint32 c, uint64 d, int64 e, uint2 g, bool h)\
         {uint8 t; t = a; return t;}",
    );
    let symbols = &function.region.symbols;
    assert_eq!(symbols.get("a").unwrap().width, 8);
    assert_eq!(symbols.get("b").unwrap().width, 16);
    assert_eq!(symbols.get("c").unwrap().width, 32);
    assert_eq!(symbols.get("d").unwrap().width, 64);
    assert_eq!(symbols.get("e").unwrap().width, -64);
    assert_eq!(symbols.get("g").unwrap().width, 2);
    assert_eq!(symbols.get("h").unwrap().width, 1);
    assert_eq!(function.ret.width, 8);
}

#[test]
fn width_substrings_resolve_like_the_reference() {
    assert_eq!(width_from_type("uint8_t"), 8);
    assert_eq!(width_from_type("fiat_uint1"), 1);
    assert_eq!(width_from_type("my_int16"), -16);
    assert_eq!(width_from_type("bool"), 1);
}

#[test]
fn declarations_carry_their_origin() {
    let function = parse_one("bool f(bool a){bool t; t = a; return t;}");
    let symbols = &function.region.symbols;
    assert_eq!(symbols.get("a").unwrap().origin, Some(0));
    assert_eq!(symbols.get("t").unwrap().origin, Some(1));
}

#[test]
fn accepts_comments_and_multiple_functions() {
    let input = "
        // complement
        bool f(bool a){bool t; t = !a; return t;}
        /* second one */
        bool g(bool b){bool u; u = ~b; return u;}
    ";
    let functions = parse_program(input).unwrap();
    assert_eq!(functions.len(), 2);
    assert_eq!(functions[0].name, "f");
    assert_eq!(functions[1].name, "g");
    assert_eq!(functions[1].region.insts[0].op, Op::BitNot);
}

#[test]
fn rejects_reserved_names() {
    assert!(parse_program("bool f(bool r10){bool t; t = r10; return t;}").is_err());
    assert!(parse_program("bool f(bool a){bool z3_0; z3_0 = a; return z3_0;}").is_err());
    // below the reserved base the prefix stays available
    assert!(parse_program("bool f(bool r9){bool t; t = r9; return t;}").is_ok());
}

#[test]
fn rejects_undeclared_variables() {
    assert!(parse_program("bool f(bool a){bool t; t = a ^ b; return t;}").is_err());
    assert!(parse_program("bool f(bool a){bool t; u = a; return t;}").is_err());
    assert!(parse_program("bool f(bool a){bool t; t = a; return u;}").is_err());
}

#[test]
fn rejects_duplicate_declarations() {
    assert!(parse_program("bool f(bool a, bool a){bool t; t = a; return t;}").is_err());
    assert!(parse_program("bool f(bool a){bool a; a = a; return a;}").is_err());
}

#[test]
fn rejects_malformed_bodies() {
    // no return
    assert!(parse_program("bool f(bool a){bool t; t = a;}").is_err());
    // returning an expression, not a variable
    assert!(parse_program("bool f(bool a){bool t; t = a; return a ^ t;}").is_err());
    // nested expressions are not three-address
    assert!(parse_program("bool f(bool a){bool t; t = a ^ (a & a); return t;}").is_err());
}

#[test]
fn error_reports_the_offending_span() {
    let error = parse_program("bool f(bool a){bool t; t = nope; return t;}").unwrap_err();
    assert!(format!("{}", error).contains("nope"));
}
