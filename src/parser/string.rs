use nom::{
    branch::alt,
    bytes::complete::is_not,
    character::complete::{anychar, char},
    combinator::{map, recognize, value},
    multi::{fold_many0, many0},
    sequence::{delimited, pair, preceded},
};

use super::result::{IResult, Span};

// Label values escape backslash, double quote and line feed.
#[derive(Clone)]
enum Fragment<'a> {
    Literal(&'a str),
    Escaped(char),
}

/// A double-quoted string literal with escape sequences resolved.
pub fn string_literal(input: Span) -> IResult<String> {
    delimited(
        char('"'),
        fold_many0(fragment, String::new(), |mut acc, frag| {
            match frag {
                Fragment::Literal(s) => acc.push_str(s),
                Fragment::Escaped(c) => acc.push(c),
            }
            acc
        }),
        char('"'),
    )(input)
}

/// Recognizes a string literal without building the unescaped value.
pub fn string_literal_raw(input: Span) -> IResult<Span> {
    recognize(delimited(
        char('"'),
        many0(alt((
            recognize(is_not("\"\\")),
            recognize(pair(char('\\'), anychar)),
        ))),
        char('"'),
    ))(input)
}

fn fragment(input: Span) -> IResult<Fragment> {
    alt((
        map(is_not("\"\\"), |s: Span| Fragment::Literal(*s.fragment())),
        preceded(
            char('\\'),
            alt((
                value(Fragment::Escaped('\\'), char('\\')),
                value(Fragment::Escaped('"'), char('"')),
                value(Fragment::Escaped('\n'), char('n')),
            )),
        ),
    ))(input)
}
