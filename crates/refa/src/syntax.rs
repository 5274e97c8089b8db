// Pattern syntax layer: explicit-concatenation normalization, validation
// of the raw pattern, and shunting-yard conversion to postfix form.
//
// A pattern is a string over ASCII alphanumeric operands and the operator
// set ( ) | . *  where '.' is the concatenation marker. Users normally
// leave concatenation implicit; `normalize` inserts the markers before the
// postfix conversion runs.

use thiserror::Error;

use crate::Symbol;

const OPERATORS: [Symbol; 5] = ['(', ')', '|', '.', '*'];

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("pattern is empty")]
    Empty,
    #[error("pattern contains unsupported character '{0}'")]
    UnsupportedCharacter(Symbol),
    #[error("parentheses are not balanced")]
    UnbalancedParentheses,
    #[error("operator '{0}' is misplaced")]
    MisplacedOperator(Symbol),
    #[error("pattern does not reduce to a single automaton")]
    Malformed,
}

fn is_operator(c: Symbol) -> bool {
    OPERATORS.contains(&c)
}

fn is_operand(c: Symbol) -> bool {
    c.is_ascii_alphanumeric()
}

/// Checks the raw (pre-normalization) pattern. A pattern that fails here
/// is rejected before any automaton is built.
pub fn validate(pattern: &str) -> Result<(), SyntaxError> {
    let chars: Vec<Symbol> = pattern.chars().collect();
    if chars.is_empty() {
        return Err(SyntaxError::Empty);
    }
    if let Some(&stray) = chars.iter().find(|c| !is_operand(**c) && !is_operator(**c)) {
        return Err(SyntaxError::UnsupportedCharacter(stray));
    }
    verify_parentheses(&chars)?;
    verify_operators(&chars)
}

// every ')' must close a previously opened '('
fn verify_parentheses(chars: &[Symbol]) -> Result<(), SyntaxError> {
    let mut open: Vec<Symbol> = Vec::new();
    for &c in chars {
        match c {
            '(' => open.push(c),
            ')' => {
                if open.pop().is_none() {
                    return Err(SyntaxError::UnbalancedParentheses);
                }
            }
            _ => {}
        }
    }
    if open.is_empty() {
        Ok(())
    } else {
        Err(SyntaxError::UnbalancedParentheses)
    }
}

// '|' is binary and '*' is postfix, so neither may open the pattern and
// '|' may not close it. Interior '|' needs an operand on both sides;
// interior '*' needs something starrable on its left.
fn verify_operators(chars: &[Symbol]) -> Result<(), SyntaxError> {
    let first = chars[0];
    let last = chars[chars.len() - 1];
    if first == '|' || first == '*' {
        return Err(SyntaxError::MisplacedOperator(first));
    }
    if last == '|' {
        return Err(SyntaxError::MisplacedOperator('|'));
    }

    for i in 1..chars.len().saturating_sub(1) {
        let (prev, current, next) = (chars[i - 1], chars[i], chars[i + 1]);
        let neighbors = ['(', ')', '|', '*'];
        if current == '|' && (neighbors.contains(&prev) || neighbors.contains(&next)) {
            return Err(SyntaxError::MisplacedOperator('|'));
        }
        if current == '*' && (prev == '(' || prev == '*') {
            return Err(SyntaxError::MisplacedOperator('*'));
        }
    }

    Ok(())
}

/// Inserts the explicit concatenation marker '.' between adjacent
/// concatenable tokens, scanning left to right from the second character.
/// Boundaries like `)(` and `*(` receive no marker; the postfix evaluator
/// rejects the orphaned fragments they would produce.
pub fn normalize(pattern: &str) -> String {
    let chars: Vec<Symbol> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let Some(&head) = chars.first() else {
        return out;
    };
    out.push(head);

    for i in 1..chars.len() {
        let prev = chars[i - 1];
        let current = chars[i];
        let operand_pair = !is_operator(prev) && !is_operator(current);
        let operand_then_group = !is_operator(prev) && current == '(';
        let closed_then_operand = (prev == '*' || prev == ')') && !is_operator(current);
        if operand_pair || operand_then_group || closed_then_operand {
            out.push('.');
        }
        out.push(current);
    }

    out
}

fn precedence(op: Symbol) -> u8 {
    match op {
        '|' => 1,
        '.' => 2,
        '*' => 3,
        _ => 0,
    }
}

/// Shunting-yard conversion of a normalized pattern to postfix form.
/// Parentheses have the lowest precedence and are never emitted.
pub fn to_postfix(pattern: &str) -> Vec<Symbol> {
    let mut output: Vec<Symbol> = Vec::with_capacity(pattern.len());
    let mut operators: Vec<Symbol> = Vec::new();

    for c in pattern.chars() {
        if is_operand(c) {
            output.push(c);
        } else if c == '(' {
            operators.push(c);
        } else if c == ')' {
            while let Some(&top) = operators.last() {
                if top == '(' {
                    break;
                }
                output.push(top);
                operators.pop();
            }
            operators.pop(); // discard the '('
        } else {
            while let Some(&top) = operators.last() {
                if precedence(top) < precedence(c) {
                    break;
                }
                output.push(top);
                operators.pop();
            }
            operators.push(c);
        }
    }

    while let Some(op) = operators.pop() {
        output.push(op);
    }

    output
}
