use bit_set::BitSet;

use crate::fa::StateId;
use crate::syntax::{self, SyntaxError};
use crate::{check, compile, Dfa, DfaTable, Nfa, StructuralError};

#[test]
fn normalization() {
    let vectors = vec![
        ("ab", "a.b"),
        ("abc", "a.b.c"),
        ("a(b)", "a.(b)"),
        ("(a)b", "(a).b"),
        ("a*b", "a*.b"),
        ("a|b", "a|b"),
        ("(a|b)*c", "(a|b)*.c"),
        ("a.b", "a.b"),
        // boundary tokens receive no marker
        ("(a)(b)", "(a)(b)"),
        ("a*(b)", "a*(b)"),
    ];

    for (pattern, expected) in vectors {
        assert_eq!(
            syntax::normalize(pattern),
            expected,
            "normalization of '{}' went wrong",
            pattern
        );
    }
}

#[test]
fn syntax_validation() {
    assert_eq!(syntax::validate(""), Err(SyntaxError::Empty));
    assert_eq!(
        syntax::validate("a#b"),
        Err(SyntaxError::UnsupportedCharacter('#'))
    );
    assert_eq!(
        syntax::validate("(ab"),
        Err(SyntaxError::UnbalancedParentheses)
    );
    assert_eq!(
        syntax::validate("ab)"),
        Err(SyntaxError::UnbalancedParentheses)
    );
    assert_eq!(
        syntax::validate("|ab"),
        Err(SyntaxError::MisplacedOperator('|'))
    );
    assert_eq!(
        syntax::validate("*ab"),
        Err(SyntaxError::MisplacedOperator('*'))
    );
    assert_eq!(
        syntax::validate("ab|"),
        Err(SyntaxError::MisplacedOperator('|'))
    );
    assert_eq!(
        syntax::validate("a||b"),
        Err(SyntaxError::MisplacedOperator('|'))
    );
    assert_eq!(
        syntax::validate("a|*b"),
        Err(SyntaxError::MisplacedOperator('|'))
    );
    assert_eq!(
        syntax::validate("a|(b)"),
        Err(SyntaxError::MisplacedOperator('|'))
    );
    assert_eq!(
        syntax::validate("(*a)"),
        Err(SyntaxError::MisplacedOperator('*'))
    );

    for pattern in ["a", "ab", "a|b", "(a|b)*c", "a*(b)", "(a)(b)", "a.b"] {
        assert!(
            syntax::validate(pattern).is_ok(),
            "'{}' should pass syntax validation",
            pattern
        );
    }
}

#[test]
fn postfix_conversion() {
    let vectors = vec![
        ("a.b", "ab."),
        ("a.b.c", "ab.c."),
        ("a|b", "ab|"),
        ("a.b|c", "ab.c|"),
        ("(a|b)*.c", "ab|*c."),
        ("a.(b|c)*", "abc|*."),
    ];

    for (pattern, expected) in vectors {
        let postfix: String = syntax::to_postfix(pattern).into_iter().collect();
        assert_eq!(
            postfix, expected,
            "postfix conversion of '{}' went wrong",
            pattern
        );
    }
}

#[test]
fn concatenation_collapses_the_seam() {
    let nfa = Nfa::from_regex("ab").expect("failed to compile pattern");
    // two symbol fragments share one seam state, no epsilon hop
    assert_eq!(nfa.states().len(), 3);
    assert!(nfa.transitions().keys().all(|(_, label)| label.is_some()));
}

#[test]
fn alternation_and_star_shapes() {
    let nfa = Nfa::from_regex("a|b").expect("failed to compile pattern");
    assert_eq!(nfa.states().len(), 6);
    assert_eq!(count_epsilon_edges(&nfa), 4);

    let nfa = Nfa::from_regex("a*").expect("failed to compile pattern");
    assert_eq!(nfa.states().len(), 4);
    assert_eq!(count_epsilon_edges(&nfa), 4);
}

fn count_epsilon_edges(nfa: &Nfa) -> usize {
    nfa.transitions()
        .iter()
        .filter(|((_, label), _)| label.is_none())
        .map(|(_, targets)| targets.len())
        .sum()
}

#[test]
fn orphaned_fragments_are_rejected() {
    // no concatenation marker is inserted at these boundaries, so the
    // postfix evaluation ends with more or less than one fragment
    for pattern in ["(a)(b)", "a*(b)", "()"] {
        assert_eq!(
            Nfa::from_regex(pattern).err(),
            Some(SyntaxError::Malformed),
            "'{}' should not reduce to a single automaton",
            pattern
        );
    }
}

#[test]
fn epsilon_closure_is_idempotent() {
    let nfa = Nfa::from_regex("(a|b)*").expect("failed to compile pattern");

    let mut closure = BitSet::new();
    closure.insert(nfa.start().index());
    nfa.epsilon_closure(&mut closure);

    let mut again = closure.clone();
    nfa.epsilon_closure(&mut again);
    assert_eq!(closure, again);
}

#[test]
fn allocators_are_independent() {
    // two compilations must not leak ids into each other
    let first = Nfa::from_regex("ab").expect("failed to compile pattern");
    let second = Nfa::from_regex("ab").expect("failed to compile pattern");
    assert_eq!(first.states(), second.states());
    assert_eq!(first.start(), second.start());
    assert_eq!(first.accept(), second.accept());
}

#[test]
fn subset_construction_basics() {
    let nfa = Nfa::from_regex("(a|b)*").expect("failed to compile pattern");
    let dfa = Dfa::from_nfa(&nfa);

    // the start closure contains the accept state, so "" is in the language
    assert!(dfa.accepting().contains(&dfa.start()));
    assert_eq!(dfa.alphabet(), nfa.alphabet());
    assert!(dfa.validate().is_ok());
}

fn sample_dfa() -> Dfa {
    compile("ab").expect("failed to compile pattern")
}

#[test]
fn structural_checks_report_first_violation() {
    let mut dfa = sample_dfa();
    dfa.states.clear();
    assert_eq!(check::validate(&dfa), Err(StructuralError::EmptyStates));

    let mut dfa = sample_dfa();
    dfa.alphabet.clear();
    assert_eq!(check::validate(&dfa), Err(StructuralError::EmptyAlphabet));

    let mut dfa = sample_dfa();
    dfa.start = StateId::from_index(9);
    assert_eq!(
        check::validate(&dfa),
        Err(StructuralError::UnknownStartState(StateId::from_index(9)))
    );

    let mut dfa = sample_dfa();
    let start = dfa.start;
    dfa.transitions.retain(|(from, _), _| *from != start);
    assert_eq!(
        check::validate(&dfa),
        Err(StructuralError::NoStartTransition)
    );

    let mut dfa = sample_dfa();
    let start = dfa.start;
    dfa.transitions.insert((StateId::from_index(9), 'a'), start);
    assert_eq!(
        check::validate(&dfa),
        Err(StructuralError::UnknownSourceState(StateId::from_index(9)))
    );

    let mut dfa = sample_dfa();
    let start = dfa.start;
    dfa.transitions.insert((start, 'z'), start);
    assert_eq!(
        check::validate(&dfa),
        Err(StructuralError::UnknownSymbol('z'))
    );

    let mut dfa = sample_dfa();
    let start = dfa.start;
    dfa.transitions.insert((start, 'b'), StateId::from_index(9));
    assert_eq!(
        check::validate(&dfa),
        Err(StructuralError::UnknownTargetState(StateId::from_index(9)))
    );

    let mut dfa = sample_dfa();
    dfa.accepting.insert(StateId::from_index(9));
    assert_eq!(
        check::validate(&dfa),
        Err(StructuralError::UnknownAcceptingState(StateId::from_index(9)))
    );
}

#[test]
fn nfa_structural_checks() {
    let mut nfa = Nfa::from_regex("(a|b)*c").expect("failed to compile pattern");
    assert!(nfa.validate().is_ok());

    let accept = nfa.accept;
    nfa.states.remove(&accept);
    assert!(matches!(
        nfa.validate(),
        Err(StructuralError::UnknownTargetState(_))
            | Err(StructuralError::UnknownAcceptingState(_))
    ));
}

#[test]
fn table_agrees_with_dfa_and_round_trips() {
    let pattern = "a(b|c)*";
    let dfa = compile(pattern).expect("failed to compile pattern");
    let table = DfaTable::from_dfa(&dfa);

    let vectors = [
        "", "a", "b", "x", "ab", "ac", "abcbc", "acbcb", "bcbc", "abbbbbbbbbb",
    ];
    for word in vectors {
        assert_eq!(
            table.matches(word),
            dfa.simulate(word),
            "table and map simulation disagree on '{}'",
            word
        );
    }

    let bytes = table.to_bytes().expect("failed to serialize table");
    let restored = DfaTable::from_bytes(&bytes).expect("failed to deserialize table");
    assert_eq!(table, restored);
}
