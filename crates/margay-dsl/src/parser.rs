#![allow(clippy::result_large_err)]

use pest::Parser;
use pest_derive::Parser;

use crate::ast::{Direction, Formula, FormulaRef};
use crate::errors::ParseError;

#[derive(Parser)]
#[grammar = "grammar.pest"]
struct FormulaParser;

type Pair<'a> = pest::iterators::Pair<'a, Rule>;

/// Parse a formula string into an AST.
pub fn parse(source: &str) -> Result<FormulaRef, ParseError> {
    let mut pairs = FormulaParser::parse(Rule::formula, source).map_err(|e| {
        let (start, end) = match e.location {
            pest::error::InputLocation::Pos(p) => (p, p + 1),
            pest::error::InputLocation::Span((s, e)) => (s, e),
        };
        ParseError::syntax(format!("{e}"), start, end, source)
    })?;

    let formula_pair = pairs.next().expect("grammar yields one formula pair");
    let iff_pair = formula_pair
        .into_inner()
        .find(|p| p.as_rule() == Rule::iff_expr)
        .expect("formula rule contains an iff_expr");
    Ok(build_iff(iff_pair))
}

fn build_iff(pair: Pair<'_>) -> FormulaRef {
    fold_binary(pair, build_implies, Formula::iff)
}

fn build_implies(pair: Pair<'_>) -> FormulaRef {
    fold_binary(pair, build_or, Formula::implies)
}

fn build_or(pair: Pair<'_>) -> FormulaRef {
    fold_binary(pair, build_and, Formula::or)
}

fn build_and(pair: Pair<'_>) -> FormulaRef {
    fold_binary(pair, build_until, Formula::and)
}

fn build_until(pair: Pair<'_>) -> FormulaRef {
    fold_binary(pair, build_unary, Formula::until)
}

/// Fold `sub (op sub)*` left-associatively; every level of the grammar has
/// exactly one operator kind, so the operator pairs carry no information
/// beyond their position.
fn fold_binary(
    pair: Pair<'_>,
    sub: fn(Pair<'_>) -> FormulaRef,
    combine: fn(FormulaRef, FormulaRef) -> FormulaRef,
) -> FormulaRef {
    let mut inner = pair.into_inner();
    let mut node = sub(inner.next().expect("binary level has a first operand"));
    while inner.next().is_some() {
        let rhs = sub(inner.next().expect("operator is followed by an operand"));
        node = combine(node, rhs);
    }
    node
}

fn build_unary(pair: Pair<'_>) -> FormulaRef {
    let parts: Vec<Pair<'_>> = pair.into_inner().collect();
    let (primary, prefixes) = parts.split_last().expect("unary_expr ends in a primary");
    let mut node = build_primary(primary.clone());
    for op in prefixes.iter().rev() {
        node = apply_prefix(op, node);
    }
    node
}

fn apply_prefix(op: &Pair<'_>, operand: FormulaRef) -> FormulaRef {
    match op.as_rule() {
        Rule::not_op => Formula::not(operand),
        Rule::shift_op => Formula::shift(direction_of(op.as_str()), operand),
        Rule::next_op => Formula::next(operand),
        Rule::eventually_op => Formula::eventually(operand),
        Rule::always_op => Formula::always(operand),
        Rule::at_ref => Formula::at(op.as_str().trim_start_matches('@'), operand),
        Rule::bind_ref => {
            let name = op.as_str().trim_start_matches(['↓', ':']);
            Formula::bind(name, operand)
        }
        rule => unreachable!("prefix_op never yields {rule:?}"),
    }
}

fn direction_of(keyword: &str) -> Direction {
    match keyword {
        "Front" => Direction::Front,
        "Back" => Direction::Back,
        "Left" => Direction::Left,
        "Right" => Direction::Right,
        other => unreachable!("shift_op never yields {other:?}"),
    }
}

fn build_primary(pair: Pair<'_>) -> FormulaRef {
    match pair.as_rule() {
        Rule::verum => Formula::verum(),
        Rule::falsum => Formula::falsum(),
        Rule::prop => Formula::prop(pair.as_str()),
        Rule::nom => Formula::nom(pair.as_str()),
        Rule::iff_expr => build_iff(pair),
        rule => unreachable!("primary never yields {rule:?}"),
    }
}
