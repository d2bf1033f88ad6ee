use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{char, digit1},
    combinator::{opt, recognize},
    number::complete::double,
    sequence::pair,
};

use super::result::{IResult, ParseError, Span};
use crate::model::{SampleValue, Timestamp};

pub fn sample_value(input: Span) -> IResult<SampleValue> {
    alt((special_value, double))(input)
}

// +Inf, -Inf and NaN are not recognized by the float parser.
fn special_value(input: Span) -> IResult<SampleValue> {
    let (rest, (sign, name)) = pair(
        opt(alt((char('+'), char('-')))),
        alt((tag_no_case("inf"), tag_no_case("nan"))),
    )(input)?;

    let value = match name.fragment().to_ascii_lowercase().as_str() {
        "inf" if sign == Some('-') => SampleValue::NEG_INFINITY,
        "inf" => SampleValue::INFINITY,
        _ => SampleValue::NAN,
    };
    Ok((rest, value))
}

/// A sample timestamp in milliseconds since epoch, possibly negative.
pub fn timestamp_literal(input: Span) -> IResult<Timestamp> {
    let (rest, m) = recognize(pair(opt(char('-')), digit1))(input)?;
    match m.fragment().parse::<Timestamp>() {
        Ok(t) => Ok((rest, t)),
        Err(_) => Err(nom::Err::Failure(ParseError::new(
            "timestamp out of range".to_string(),
            m,
        ))),
    }
}
