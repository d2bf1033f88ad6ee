use nom::{
    character::complete::{char, space0, space1},
    combinator::{all_consuming, opt, recognize},
    multi::many0,
    sequence::{delimited, pair, preceded, tuple},
    Slice,
};

use super::common::{label_identifier, maybe_padded, metric_identifier};
use super::result::{IResult, ParseError, Span};
use super::string::{string_literal, string_literal_raw};
use super::value::{sample_value, timestamp_literal};
use crate::error::Result;
use crate::model::{LabelName, LabelValue, Labels, SampleValue, Timestamp, METRIC_NAME_LABEL};

/// One logical line of an exposition-format buffer.
#[derive(Debug, PartialEq)]
pub enum Entry<'a> {
    Series(SeriesSample<'a>),
    Comment,
    Empty,
}

/// A single scraped sample.
///
/// The series identity is the raw `name{label="value",...}` slice of the
/// input, suitable for byte-for-byte cache keying. The label set is not
/// materialized until `metric()` is called.
#[derive(Debug, PartialEq)]
pub struct SeriesSample<'a> {
    identity: &'a str,
    value: SampleValue,
    timestamp: Option<Timestamp>,
}

impl<'a> SeriesSample<'a> {
    pub fn identity(&self) -> &'a str {
        self.identity
    }

    pub fn value(&self) -> SampleValue {
        self.value
    }

    pub fn timestamp(&self) -> Option<Timestamp> {
        self.timestamp
    }

    /// Resolves the raw identity into a label set, with the metric name
    /// stored under `__name__`.
    pub fn metric(&self) -> Result<Labels> {
        let (_, labels) = all_consuming(metric)(Span::new(self.identity))
            .map_err(|e| ParseError::from(e))?;
        Ok(labels)
    }
}

/// Lazily decodes an exposition-format buffer into entries.
///
/// The sequence is finite and non-restartable: end of input terminates it,
/// and so does the first malformed line, after yielding one `Err`.
pub struct TextParser<'a> {
    rest: Span<'a>,
    done: bool,
}

impl<'a> TextParser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            rest: Span::new(input),
            done: false,
        }
    }
}

impl<'a> Iterator for TextParser<'a> {
    type Item = Result<Entry<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.rest.fragment().is_empty() {
            self.done = true;
            return None;
        }

        let (rest, line) = next_line(self.rest);
        self.rest = rest;

        match entry(line) {
            Ok(e) => Some(Ok(e)),
            Err(err) => {
                self.done = true;
                Some(Err(ParseError::from(err).into()))
            }
        }
    }
}

fn next_line(input: Span) -> (Span, Span) {
    match input.fragment().find('\n') {
        Some(pos) => (input.slice(pos + 1..), input.slice(..pos)),
        None => (input.slice(input.fragment().len()..), input),
    }
}

fn entry(line: Span) -> std::result::Result<Entry, nom::Err<ParseError>> {
    if line.fragment().trim().is_empty() {
        return Ok(Entry::Empty);
    }
    // HELP, TYPE and free-form comments alike.
    if line.fragment().starts_with('#') {
        return Ok(Entry::Comment);
    }

    let (_, sample) = all_consuming(series)(line)?;
    Ok(Entry::Series(sample))
}

fn series(input: Span) -> IResult<SeriesSample> {
    // identity value [timestamp]
    let (rest, identity) = recognize(pair(metric_identifier, opt(label_set_raw)))(input)?;
    let (rest, _) = space1(rest)?;
    let (rest, value) = sample_value(rest)?;
    let (rest, timestamp) = opt(preceded(space1, timestamp_literal))(rest)?;
    let (rest, _) = space0(rest)?;

    Ok((
        rest,
        SeriesSample {
            identity: *identity.fragment(),
            value,
            timestamp,
        },
    ))
}

// The scan pass only validates the shape of the label set; unescaping and
// map building are deferred to `SeriesSample::metric`.
fn label_set_raw(input: Span) -> IResult<Span> {
    recognize(delimited(
        char('{'),
        opt(tuple((
            maybe_padded(label_pair_raw),
            many0(preceded(char(','), maybe_padded(label_pair_raw))),
            opt(char(',')),
        ))),
        char('}'),
    ))(input)
}

fn label_pair_raw(input: Span) -> IResult<Span> {
    recognize(tuple((
        label_identifier,
        maybe_padded(char('=')),
        string_literal_raw,
    )))(input)
}

fn metric(input: Span) -> IResult<Labels> {
    let (rest, name) = metric_identifier(input)?;
    let (rest, labels) = opt(label_set)(rest)?;

    let mut labels = labels.unwrap_or_default();
    labels.insert(METRIC_NAME_LABEL.into(), String::from(*name.fragment()));
    Ok((rest, labels))
}

fn label_set(input: Span) -> IResult<Labels> {
    let (rest, pairs) = delimited(
        char('{'),
        opt(tuple((
            maybe_padded(label_pair),
            many0(preceded(char(','), maybe_padded(label_pair))),
            opt(char(',')),
        ))),
        char('}'),
    )(input)?;

    let mut labels = Labels::new();
    if let Some((first, others, _)) = pairs {
        for (name, value) in std::iter::once(first).chain(others) {
            if labels.insert(name, value).is_some() {
                return Err(nom::Err::Failure(ParseError::new(
                    "duplicate label name".to_string(),
                    input,
                )));
            }
        }
    }
    Ok((rest, labels))
}

fn label_pair(input: Span) -> IResult<(LabelName, LabelValue)> {
    let (rest, (name, _, value)) = tuple((
        label_identifier,
        maybe_padded(char('=')),
        string_literal,
    ))(input)?;
    Ok((rest, (String::from(*name.fragment()), value)))
}
