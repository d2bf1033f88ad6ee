use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, space0},
    combinator::recognize,
    multi::many0,
    sequence::{delimited, pair},
};

use super::result::{IResult, Span};

pub fn metric_identifier(input: Span) -> IResult<Span> {
    // [a-zA-Z_:][a-zA-Z0-9_:]*
    recognize(pair(
        alt((alpha1, tag("_"), tag(":"))),
        many0(alt((alphanumeric1, tag("_"), tag(":")))),
    ))(input)
}

pub fn label_identifier(input: Span) -> IResult<Span> {
    // [a-zA-Z_][a-zA-Z0-9_]*
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))(input)
}

pub fn maybe_padded<'a, F, O>(f: F) -> impl FnMut(Span<'a>) -> IResult<'a, O>
where
    F: FnMut(Span<'a>) -> IResult<'a, O>,
{
    delimited(space0, f, space0)
}
