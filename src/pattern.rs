//! Spoken phrase patterns
//!
//! Vocabulary keys may use alternatives and optional words:
//! `(write | save) file` or `[turbo] quit`. Patterns are expanded into every
//! concrete phrase once, when the vocabulary is built.

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::map,
    multi::{many0, separated_list1},
    sequence::{delimited, preceded},
    IResult,
};

use crate::error::{GrammarError, Result};

/// Every word sequence a (sub)pattern can produce
type Phrases = Vec<Vec<String>>;

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '(' | ')' | '[' | ']' | '|')
}

/// Cartesian product of consecutive pattern parts, in declaration order
fn product(parts: Vec<Phrases>) -> Phrases {
    parts.into_iter().fold(vec![Vec::new()], |acc, options| {
        acc.iter()
            .flat_map(|prefix| {
                options.iter().map(move |option| {
                    let mut phrase = prefix.clone();
                    phrase.extend(option.iter().cloned());
                    phrase
                })
            })
            .collect()
    })
}

fn word(input: &str) -> IResult<&str, Phrases> {
    map(preceded(multispace0, take_while1(is_word_char)), |w: &str| {
        vec![vec![w.to_string()]]
    })(input)
}

/// `( alternatives )` or `[ alternatives ]`, the latter also matching nothing
fn group(input: &str) -> IResult<&str, Phrases> {
    alt((
        delimited(
            preceded(multispace0, char('(')),
            alternatives,
            preceded(multispace0, char(')')),
        ),
        map(
            delimited(
                preceded(multispace0, char('[')),
                alternatives,
                preceded(multispace0, char(']')),
            ),
            |mut inner: Phrases| {
                inner.push(Vec::new());
                inner
            },
        ),
    ))(input)
}

/// sequence := (word | group)*
fn sequence(input: &str) -> IResult<&str, Phrases> {
    map(many0(alt((word, group))), product)(input)
}

/// alternatives := sequence ('|' sequence)*
fn alternatives(input: &str) -> IResult<&str, Phrases> {
    map(
        separated_list1(preceded(multispace0, char('|')), sequence),
        |options: Vec<Phrases>| options.concat(),
    )(input)
}

/// Expand a pattern into every phrase it matches, in declaration order
pub fn expand(pattern: &str) -> Result<Vec<String>> {
    let error = |what: &str| GrammarError::config(format!("{} in pattern '{}'", what, pattern));

    let (rest, phrases) = alternatives(pattern).map_err(|_| error("malformed pattern"))?;
    if !rest.trim().is_empty() {
        return Err(error(&format!("unbalanced group at '{}'", rest.trim())));
    }

    let mut out: Vec<String> = Vec::new();
    for words in phrases {
        let phrase = words.join(" ");
        if phrase.is_empty() {
            return Err(error("pattern can be empty"));
        }
        if !out.contains(&phrase) {
            out.push(phrase);
        }
    }
    Ok(out)
}
