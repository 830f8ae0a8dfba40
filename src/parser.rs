//! This module provides the parser for machine specifications, utilizing the `pest` crate.
//! The specification is line oriented: a header of `key: value` fields, a `transitions:`
//! marker, and one `state,read -> next,write,move` rule per line.

use crate::types::{
    Direction, MachineDefinition, SpecError, Transition, DEFAULT_BLANK_SYMBOL,
    DEFAULT_INPUT_SYMBOLS,
};
use pest::{iterators::Pair, Parser as PestParser};
use pest_derive::Parser as PestParser;
use std::collections::{BTreeSet, HashMap};

/// The line separating header fields from transition rules.
const TRANSITIONS_MARKER: &str = "transitions:";
/// Header fields every specification must declare, in reporting order.
const REQUIRED_FIELDS: [&str; 5] = ["states", "blank", "start", "accept", "reject"];

/// Derives a `PestParser` for the line grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct SpecParser;

/// Parses a machine specification into a [`MachineDefinition`].
///
/// Blank lines and lines starting with `#` are ignored. Header keys are
/// case-insensitive, and values may be wrapped in one layer of matching quotes.
///
/// # Errors
///
/// * `SpecError::MissingSection` if no line is exactly `transitions:`.
/// * `SpecError::MissingField` if one of `states`, `blank`, `start`, `accept`, `reject` is absent.
/// * `SpecError::InvalidBlank` if the blank is not a single character.
/// * `SpecError::InvalidTransitionLine` if a rule is not `state,read -> next,write,move`.
/// * `SpecError::InvalidMove` if a rule's move is not `L`, `R` or `N`.
///
/// Rules repeating a `(state, read)` key replace earlier ones, and state names are
/// not cross-checked against `states:`; see [`crate::analyzer::analyze`] for that.
pub fn parse(input: &str) -> Result<MachineDefinition, SpecError> {
    let lines: Vec<&str> = input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();

    let marker = lines
        .iter()
        .position(|line| line.eq_ignore_ascii_case(TRANSITIONS_MARKER))
        .ok_or(SpecError::MissingSection)?;

    let header = parse_header(&lines[..marker]);
    for field in REQUIRED_FIELDS {
        if !header.contains_key(field) {
            return Err(SpecError::MissingField(field.to_string()));
        }
    }

    let blank = parse_blank(&header["blank"])?;

    let mut definition = MachineDefinition {
        states: parse_state_list(&header["states"]),
        input_symbols: BTreeSet::new(),
        tape_symbols: BTreeSet::from([blank]),
        blank,
        transitions: HashMap::new(),
        start_state: header["start"].clone(),
        accept_states: parse_state_list(&header["accept"]),
        reject_states: parse_state_list(&header["reject"]),
    };

    for line in &lines[marker + 1..] {
        let (state, read, transition) = parse_transition(line)?;

        definition.tape_symbols.insert(read);
        definition.tape_symbols.insert(transition.write);
        if read != blank {
            definition.input_symbols.insert(read);
        }

        if definition.transition(&state, read).is_some() {
            log::debug!("Rule for ({state}, {read:?}) replaced by: {line}");
        }
        definition.insert_transition(state, read, transition);
    }

    if definition.input_symbols.is_empty() {
        definition.input_symbols.extend(DEFAULT_INPUT_SYMBOLS);
    }

    log::debug!(
        "Parsed machine: {} states, {} transitions, blank {:?}",
        definition.states.len(),
        definition.transition_count(),
        definition.blank
    );

    Ok(definition)
}

/// Collects `key: value` header lines. Lines without a colon are skipped and
/// a repeated key keeps its last value.
fn parse_header(lines: &[&str]) -> HashMap<String, String> {
    let mut header = HashMap::new();

    for line in lines {
        match SpecParser::parse(Rule::header, line) {
            Ok(mut pairs) => {
                if let Some((key, value)) = pairs.next().and_then(parse_header_pair) {
                    header.insert(key, value);
                }
            }
            Err(_) => log::debug!("Ignoring header line without a key: {line}"),
        }
    }

    header
}

/// Extracts the lower-cased key and unquoted value from a `Pair<Rule::header>`.
fn parse_header_pair(pair: Pair<Rule>) -> Option<(String, String)> {
    let mut key = None;
    let mut value = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::key => key = Some(inner.as_str().trim().to_lowercase()),
            Rule::value => value = Some(unquote(inner.as_str().trim()).to_string()),
            _ => {}
        }
    }

    Some((key?, value.unwrap_or_default()))
}

/// Parses the declared blank, defaulting an empty value to `_`.
fn parse_blank(value: &str) -> Result<char, SpecError> {
    if value.is_empty() {
        return Ok(DEFAULT_BLANK_SYMBOL);
    }

    single_char(value).ok_or_else(|| SpecError::InvalidBlank(value.to_string()))
}

/// Splits a comma-separated state list, dropping empty entries.
fn parse_state_list(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|state| !state.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses one `state,read -> next,write,move` line.
fn parse_transition(line: &str) -> Result<(String, char, Transition), SpecError> {
    let invalid = || SpecError::InvalidTransitionLine(line.to_string());

    let root = SpecParser::parse(Rule::transition, line)
        .map_err(|_| invalid())?
        .next()
        .ok_or_else(invalid)?;

    let mut fields: HashMap<Rule, &str> = HashMap::new();
    for pair in root.into_inner() {
        fields.insert(pair.as_rule(), pair.as_str().trim());
    }
    let field = |rule: Rule| fields.get(&rule).copied().unwrap_or_default();

    let direction = parse_direction(field(Rule::direction))
        .ok_or_else(|| SpecError::InvalidMove(line.to_string()))?;

    let state = field(Rule::state);
    let next_state = field(Rule::next_state);
    if state.is_empty() || next_state.is_empty() {
        return Err(invalid());
    }

    let read = single_char(unquote(field(Rule::read))).ok_or_else(invalid)?;
    let write = single_char(unquote(field(Rule::write))).ok_or_else(invalid)?;

    Ok((
        state.to_string(),
        read,
        Transition {
            next_state: next_state.to_string(),
            write,
            direction,
        },
    ))
}

/// Parses a move token: `L`, `R` or `N`.
fn parse_direction(token: &str) -> Option<Direction> {
    match token {
        "L" => Some(Direction::Left),
        "R" => Some(Direction::Right),
        "N" => Some(Direction::Stay),
        _ => None,
    }
}

/// Strips one layer of matching single or double quotes.
fn unquote(value: &str) -> &str {
    let quoted = value.len() >= 2
        && ((value.starts_with('\'') && value.ends_with('\''))
            || (value.starts_with('"') && value.ends_with('"')));

    if quoted {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Returns the only character of `value`, if it has exactly one.
fn single_char(value: &str) -> Option<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARITY: &str = r#"
states: qeven,qodd,qaccept,qreject
blank: _
start: qeven
accept: qaccept
reject: qreject
transitions:
qeven,0 -> qeven,0,R
qeven,1 -> qodd,1,R
qeven,_ -> qaccept,_,N
qodd,0 -> qodd,0,R
qodd,1 -> qeven,1,R
qodd,_ -> qreject,_,N
"#;

    #[test]
    fn test_parse_parity_machine() {
        let definition = parse(PARITY).unwrap();

        assert_eq!(definition.states.len(), 4);
        assert!(definition.states.contains("qodd"));
        assert_eq!(definition.blank, '_');
        assert_eq!(definition.start_state, "qeven");
        assert!(definition.is_accepting("qaccept"));
        assert!(definition.is_rejecting("qreject"));
        assert_eq!(definition.transition_count(), 6);
        assert_eq!(
            definition.transition("qeven", '1'),
            Some(&Transition {
                next_state: "qodd".into(),
                write: '1',
                direction: Direction::Right,
            })
        );
        assert_eq!(definition.input_symbols, BTreeSet::from(['0', '1']));
        assert_eq!(definition.tape_symbols, BTreeSet::from(['0', '1', '_']));
    }

    #[test]
    fn test_parse_ignores_comments_and_blank_lines() {
        let input = r#"
# header comment
STATES: q0, qa

Blank: "_"
start: q0
accept: qa
reject:
# rules follow
Transitions:
  q0 , a -> qa , b , R
"#;
        let definition = parse(input).unwrap();

        assert_eq!(definition.states, BTreeSet::from(["q0".into(), "qa".into()]));
        assert!(definition.reject_states.is_empty());
        assert_eq!(definition.transition("q0", 'a').unwrap().write, 'b');
        assert_eq!(definition.input_symbols, BTreeSet::from(['a']));
    }

    #[test]
    fn test_parse_missing_transitions_section() {
        let input = "states: q0\nblank: _\nstart: q0\naccept:\nreject:\n";
        assert_eq!(parse(input), Err(SpecError::MissingSection));
    }

    #[test]
    fn test_parse_missing_field() {
        let input = "states: q0\nblank: _\nstart: q0\naccept: q0\ntransitions:\n";
        assert_eq!(
            parse(input),
            Err(SpecError::MissingField("reject".to_string()))
        );

        let error = parse("transitions:\n").unwrap_err();
        assert_eq!(error, SpecError::MissingField("states".to_string()));
    }

    #[test]
    fn test_parse_invalid_blank() {
        let input = "states: q0\nblank: __\nstart: q0\naccept:\nreject:\ntransitions:\n";
        assert_eq!(parse(input), Err(SpecError::InvalidBlank("__".to_string())));
    }

    #[test]
    fn test_parse_empty_blank_defaults_to_underscore() {
        let input = "states: q0\nblank: ''\nstart: q0\naccept:\nreject:\ntransitions:\n";
        let definition = parse(input).unwrap();
        assert_eq!(definition.blank, '_');
    }

    #[test]
    fn test_parse_quoted_space_blank() {
        let input = "states: q0\nblank: ' '\nstart: q0\naccept:\nreject:\ntransitions:\nq0,' ' -> q0,1,R\n";
        let definition = parse(input).unwrap();
        assert_eq!(definition.blank, ' ');
        assert!(definition.transition("q0", ' ').is_some());
    }

    #[test]
    fn test_parse_missing_third_field() {
        let input = "states: q0,q1\nblank: _\nstart: q0\naccept:\nreject:\ntransitions:\nq0,0->q1,1\n";
        assert_eq!(
            parse(input),
            Err(SpecError::InvalidTransitionLine("q0,0->q1,1".to_string()))
        );
    }

    #[test]
    fn test_parse_malformed_transition_lines() {
        let header = "states: q0\nblank: _\nstart: q0\naccept:\nreject:\ntransitions:\n";

        for line in [
            "q0 0 -> q1,1,R",
            "q0,0 q1,1,R",
            "q0 -> q1,1,R",
            "q0,00 -> q1,1,R",
            ",0 -> q1,1,R",
        ] {
            let result = parse(&format!("{header}{line}\n"));
            assert_eq!(
                result,
                Err(SpecError::InvalidTransitionLine(line.to_string())),
                "line {line:?}"
            );
        }
    }

    #[test]
    fn test_parse_invalid_move() {
        let header = "states: q0\nblank: _\nstart: q0\naccept:\nreject:\ntransitions:\n";

        for line in ["q0,0 -> q1,1,S", "q0,0 -> q1,1,r", "q0,0 -> q1,1,R,extra"] {
            let result = parse(&format!("{header}{line}\n"));
            assert_eq!(result, Err(SpecError::InvalidMove(line.to_string())));
        }
    }

    #[test]
    fn test_parse_duplicate_rule_last_wins() {
        let input = r#"
states: q0,q1,q2
blank: _
start: q0
accept:
reject:
transitions:
q0,0 -> q1,1,R
q0,0 -> q2,0,L
"#;
        let definition = parse(input).unwrap();

        assert_eq!(definition.transition_count(), 1);
        let transition = definition.transition("q0", '0').unwrap();
        assert_eq!(transition.next_state, "q2");
        assert_eq!(transition.direction, Direction::Left);
    }

    #[test]
    fn test_parse_default_input_symbols() {
        let input = "states: q0\nblank: _\nstart: q0\naccept:\nreject:\ntransitions:\nq0,_ -> q0,x,N\n";
        let definition = parse(input).unwrap();

        assert_eq!(definition.input_symbols, BTreeSet::from(['0', '1']));
        assert_eq!(definition.tape_symbols, BTreeSet::from(['_', 'x']));
    }

    #[test]
    fn test_parse_does_not_cross_check_states() {
        let input = "states: q0\nblank: _\nstart: qx\naccept: qy\nreject:\ntransitions:\nq0,0 -> qz,0,R\n";
        let definition = parse(input).unwrap();

        assert_eq!(definition.start_state, "qx");
        assert!(!definition.states.contains("qz"));
    }

    #[test]
    fn test_parse_comma_symbol() {
        let input = "states: q0\nblank: _\nstart: q0\naccept:\nreject:\ntransitions:\nq0,, -> q0,x,R\n";
        let definition = parse(input).unwrap();
        assert_eq!(definition.transition("q0", ',').unwrap().write, 'x');
        assert!(definition.input_symbols.contains(&','));
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("'a'"), "a");
        assert_eq!(unquote("\"ab\""), "ab");
        assert_eq!(unquote("'a\""), "'a\"");
        assert_eq!(unquote("'"), "'");
    }
}
