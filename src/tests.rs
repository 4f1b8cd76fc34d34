use crate::error::{CircuitError, ErrorKind};
use crate::sched::schedule;

fn syntax_location(source: &str) -> (usize, usize) {
    match crate::parse(source) {
        Err(CircuitError::Syntax { line, column, .. }) => (line, column),
        other => panic!("Expected a syntax error, got {other:?}"),
    }
}

#[test]
fn parse_simple_circuit() {
    let circuit = crate::parse(
        "# half adder carry
         And(a, b) := NAND(NAND(a, b), NAND(a, b))
         C = And(X, Y)",
    )
    .unwrap();

    assert_eq!(circuit.inputs(), &["X".to_string(), "Y".to_string()]);
    let output_names: Vec<&str> = circuit.outputs().iter().map(|(name, _id)| name.as_str()).collect();
    assert_eq!(output_names, vec!["C"]);
    // Three NANDs, no D elements.
    assert_eq!(circuit.gates().len(), 3);
    assert!(circuit.gates().iter().all(|gate| !gate.kind.is_sequential()));
}

#[test]
fn outputs_are_all_assignment_targets() {
    let circuit = crate::parse(
        "A = NAND(I, I)
         B = NAND(A, A)",
    )
    .unwrap();
    let output_names: Vec<&str> = circuit.outputs().iter().map(|(name, _id)| name.as_str()).collect();
    assert_eq!(output_names, vec!["A", "B"]);
    assert_eq!(circuit.inputs(), &["I".to_string()]);
}

#[test]
fn comments_and_blank_lines() {
    let circuit = crate::parse(
        "
         # a comment on its own line

         O = NAND(I, I) # a trailing comment
        ",
    )
    .unwrap();
    assert_eq!(circuit.outputs().len(), 1);
}

#[test]
fn syntax_error_positions() {
    assert_eq!(syntax_location("O = = 1"), (1, 5));
    assert_eq!(syntax_location("A = 1\nB = )"), (2, 5));
    assert_eq!(syntax_location("A = 1 B = 0"), (1, 7));
    // `2` is not a token of the language.
    assert_eq!(syntax_location("A = 2"), (1, 5));
    assert_eq!(syntax_location("O = NAND(I, I"), (1, 14));
}

#[test]
fn syntax_error_kind() {
    let err = crate::parse("O = ").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert!(err.location().is_some());
}

#[test]
fn unbalanced_parens_fail() {
    assert!(matches!(
        crate::parse("O = NAND(I, NAND(I, I)"),
        Err(CircuitError::Syntax { .. }),
    ));
    assert!(matches!(
        crate::parse("O = NAND(I, I))"),
        Err(CircuitError::Syntax { .. }),
    ));
}

#[test]
fn self_recursive_macro_fails() {
    let err = crate::parse("BAD(x) := BAD(x)").unwrap_err();
    assert_eq!(err, CircuitError::MacroCycle(vec!["BAD".to_string(), "BAD".to_string()]));
    assert_eq!(err.kind(), ErrorKind::MacroCycle);
    assert_eq!(err.to_string(), "Cyclic macro definition: BAD -> BAD");
}

#[test]
fn macro_cycle_fails_even_if_never_called() {
    // The macro table is rejected before any gate is realized.
    let err = crate::parse(
        "BAD(x) := BAD(x)
         O = NAND(I, I)",
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MacroCycle);
}

#[test]
fn indirect_macro_cycle_names_the_chain() {
    let err = crate::parse(
        "A(x) := B(x)
         B(x) := A(x)
         O = A(I)",
    )
    .unwrap_err();
    match err {
        CircuitError::MacroCycle(chain) => {
            assert_eq!(chain.len(), 3);
            assert_eq!(chain.first(), chain.last());
            assert!(chain.contains(&"A".to_string()));
            assert!(chain.contains(&"B".to_string()));
        },
        other => panic!("Expected MacroCycle, got {other:?}"),
    }
}

#[test]
fn duplicate_signal_fails() {
    let err = crate::parse("A = 1\nA = 0").unwrap_err();
    assert_eq!(err, CircuitError::DuplicateSignal("A".to_string()));
    assert_eq!(err.kind(), ErrorKind::Value);
}

#[test]
fn duplicate_macro_fails() {
    let err = crate::parse(
        "Not(x) := NAND(x, x)
         Not(y) := NAND(y, y)",
    )
    .unwrap_err();
    assert_eq!(err, CircuitError::DuplicateMacro("Not".to_string()));
}

#[test]
fn macro_shadowing_primitive_fails() {
    let err = crate::parse("NAND(a, b) := NAND(a, b)").unwrap_err();
    assert_eq!(err, CircuitError::ShadowsPrimitive("NAND".to_string()));
}

#[test]
fn unknown_call_fails() {
    let err = crate::parse("O = Foo(I)").unwrap_err();
    assert_eq!(err, CircuitError::UnknownCall("Foo".to_string()));
    assert_eq!(err.kind(), ErrorKind::Value);
}

#[test]
fn primitive_arity_mismatch_fails() {
    let err = crate::parse("O = NAND(I)").unwrap_err();
    assert_eq!(
        err,
        CircuitError::ArityMismatch {
            name: "NAND".to_string(),
            expected: 2,
            actual: 1,
        },
    );

    let err = crate::parse("O = D(I, I)").unwrap_err();
    assert_eq!(
        err,
        CircuitError::ArityMismatch {
            name: "D".to_string(),
            expected: 1,
            actual: 2,
        },
    );
}

#[test]
fn macro_arity_mismatch_fails() {
    let err = crate::parse(
        "And(a, b) := NAND(NAND(a, b), NAND(a, b))
         O = And(I)",
    )
    .unwrap_err();
    assert_eq!(
        err,
        CircuitError::ArityMismatch {
            name: "And".to_string(),
            expected: 2,
            actual: 1,
        },
    );
}

#[test]
fn nand_spelling_from_the_original_language() {
    let circuit = crate::parse("O = Nand(I, I)").unwrap();
    assert_eq!(circuit.gates().len(), 1);
}

#[test]
fn empty_parameter_macro() {
    let circuit = crate::parse(
        "High() := 1
         O = High()",
    )
    .unwrap();
    assert!(circuit.inputs().is_empty());
}

#[test]
fn forward_references_are_legal() {
    // B is assigned after A references it; the scheduler still finds an
    // order because there is no combinational cycle.
    let circuit = crate::parse(
        "A = NAND(B, B)
         B = NAND(I, I)",
    )
    .unwrap();
    assert!(schedule(&circuit).is_ok());
}

#[test]
fn macros_may_be_defined_after_use() {
    let circuit = crate::parse(
        "O = Not(I)
         Not(x) := NAND(x, x)",
    )
    .unwrap();
    assert_eq!(circuit.gates().len(), 1);
}

#[test]
fn schedule_is_a_topological_order() {
    let circuit = crate::parse(
        "Not(x) := NAND(x, x)
         A = Not(B)
         B = Not(C)
         C = Not(I)
         R = D(A)",
    )
    .unwrap();
    let order = schedule(&circuit).unwrap();

    // Every combinational gate appears exactly once, after its combinational
    // producers.
    let mut seen = vec![];
    for gate_id in &order {
        let gate = &circuit.gates()[*gate_id];
        assert!(!gate.kind.is_sequential());
        for input in &gate.inputs {
            if let Some(producer) = circuit
                .gates()
                .iter()
                .position(|g| !g.kind.is_sequential() && g.output == *input)
            {
                assert!(seen.contains(&producer), "gate {gate_id} ran before its producer {producer}");
            }
        }
        seen.push(*gate_id);
    }
    let comb_count = circuit.gates().iter().filter(|g| !g.kind.is_sequential()).count();
    assert_eq!(seen.len(), comb_count);
}

#[test]
fn schedule_is_deterministic() {
    let source = "A = NAND(I, I)
        B = NAND(I, I)
        C = NAND(A, B)";
    let circuit = crate::parse(source).unwrap();
    assert_eq!(schedule(&circuit).unwrap(), schedule(&circuit).unwrap());

    let again = crate::parse(source).unwrap();
    assert_eq!(schedule(&circuit).unwrap(), schedule(&again).unwrap());
}

#[test]
fn comb_cycle_only_reports_loop_signals() {
    let err = crate::parse(
        "A = NAND(B, B)
         B = NAND(A, A)
         C = NAND(B, B)",
    )
    .map(|circuit| schedule(&circuit))
    .unwrap()
    .unwrap_err();
    match err {
        CircuitError::CombCycle(signals) => {
            assert!(signals.contains(&"A".to_string()));
            assert!(signals.contains(&"B".to_string()));
            assert!(!signals.contains(&"C".to_string()));
        },
        other => panic!("Expected CombCycle, got {other:?}"),
    }
}

#[test]
fn cycle_hidden_behind_macros_is_still_caught() {
    // The loop only becomes visible after expansion.
    let err = crate::parse(
        "Not(x) := NAND(x, x)
         A = Not(B)
         B = Not(A)",
    )
    .map(|circuit| schedule(&circuit))
    .unwrap()
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CombCycle);
}

#[test]
fn macro_instantiations_do_not_alias() {
    let circuit = crate::parse(
        "Not(x) := NAND(x, x)
         A = Not(I)
         B = Not(J)",
    )
    .unwrap();
    // Two instantiations, two distinct gates driving distinct signals.
    assert_eq!(circuit.gates().len(), 2);
    let outs: Vec<usize> = circuit.gates().iter().map(|gate| gate.output).collect();
    assert_ne!(outs[0], outs[1]);
}

#[test]
fn error_messages_are_stable() {
    let err = crate::parse("O = NAND(I)").unwrap_err();
    assert_eq!(err.to_string(), "NAND called with 1 arguments, but expected 2");

    let err = crate::parse("A = 1\nA = 0").unwrap_err();
    assert_eq!(err.to_string(), "Signal is assigned more than once: A");
}
