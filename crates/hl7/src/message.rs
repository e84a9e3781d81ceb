//! Segment tokenizer for ER7-encoded HL7 v2 messages.
//!
//! Segments may be separated by `\r`, `\n` or `\r\n`. Fields are separated by `|`.
//!
//! `MSH` is special: its first field *is* the field separator (MSH-1), so the tokenizer inserts
//! `|` at index 1 and every MSH field can be addressed by its HL7 sequence number.

use crate::{Hl7Error, Hl7Result};
use std::collections::HashMap;

/// Field separator used by every segment.
pub const FIELD_SEPARATOR: char = '|';

/// Segment separator after line-ending normalisation.
pub const SEGMENT_SEPARATOR: char = '\r';

/// One segment occurrence: `fields[0]` is the type code (e.g. `PID`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Segment {
    fields: Vec<String>,
}

impl Segment {
    /// Tokenize one segment line into fields.
    pub fn parse(line: &str) -> Self {
        let mut fields: Vec<String> = line.split(FIELD_SEPARATOR).map(str::to_owned).collect();
        if fields.first().is_some_and(|code| code.trim() == "MSH") {
            fields.insert(1, FIELD_SEPARATOR.to_string());
        }
        Self { fields }
    }

    /// Segment type code, or `""` for a segment without fields.
    pub fn code(&self) -> &str {
        self.fields.first().map(|f| f.trim()).unwrap_or("")
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A tokenized message: segments in arrival order, indexed by type code.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Message {
    segments: Vec<Segment>,
    by_code: HashMap<String, Vec<usize>>,
}

impl Message {
    /// Tokenize raw message text.
    ///
    /// Line endings are normalised to `\r` and surrounding whitespace is trimmed before
    /// splitting. Empty lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Hl7Error::Empty`] if nothing but whitespace remains after normalisation.
    pub fn parse(raw: &str) -> Hl7Result<Self> {
        let normalised = normalise_line_endings(raw);
        let normalised = normalised.trim();
        if normalised.is_empty() {
            return Err(Hl7Error::Empty);
        }

        let mut message = Message::default();
        for line in normalised.split(SEGMENT_SEPARATOR) {
            if line.trim().is_empty() {
                continue;
            }
            message.push(Segment::parse(line));
        }
        Ok(message)
    }

    fn push(&mut self, segment: Segment) {
        let index = self.segments.len();
        self.by_code
            .entry(segment.code().to_owned())
            .or_default()
            .push(index);
        self.segments.push(segment);
    }

    /// All segments in arrival order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// First occurrence of a segment type, if any.
    pub fn first(&self, code: &str) -> Option<&Segment> {
        self.by_code
            .get(code)
            .and_then(|indices| indices.first())
            .map(|&i| &self.segments[i])
    }

    /// Every occurrence of a segment type, in arrival order.
    pub fn occurrences(&self, code: &str) -> Vec<&Segment> {
        self.by_code
            .get(code)
            .map(|indices| indices.iter().map(|&i| &self.segments[i]).collect())
            .unwrap_or_default()
    }

    /// First occurrence of a segment type that the caller cannot proceed without.
    ///
    /// # Errors
    ///
    /// Returns [`Hl7Error::MissingSegment`] naming `code` if there is no occurrence.
    pub fn require(&self, code: &str) -> Hl7Result<&Segment> {
        self.first(code)
            .ok_or_else(|| Hl7Error::MissingSegment(code.to_owned()))
    }
}

/// Replace `\r\n` and `\n` with `\r`.
pub fn normalise_line_endings(raw: &str) -> String {
    raw.replace("\r\n", "\r").replace('\n', "\r")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_segments_on_any_line_ending() {
        for text in [
            "MSH|^~\\&|A\rPID|1\rPV1|1",
            "MSH|^~\\&|A\nPID|1\nPV1|1",
            "MSH|^~\\&|A\r\nPID|1\r\nPV1|1",
        ] {
            let message = Message::parse(text).expect("parse");
            let codes: Vec<&str> = message.segments().iter().map(Segment::code).collect();
            assert_eq!(codes, vec!["MSH", "PID", "PV1"]);
        }
    }

    #[test]
    fn skips_blank_lines() {
        let message = Message::parse("\n\nMSH|^~\\&\n\n\nPID|1\n  \n").expect("parse");
        assert_eq!(message.segments().len(), 2);
    }

    #[test]
    fn rejects_whitespace_only_input() {
        assert_eq!(Message::parse("").unwrap_err(), Hl7Error::Empty);
        assert_eq!(Message::parse(" \r\n\t\n").unwrap_err(), Hl7Error::Empty);
    }

    #[test]
    fn msh_fields_are_addressed_by_sequence_number() {
        let message =
            Message::parse("MSH|^~\\&|AccMgr|1|||20050110045504||ADT^A01|599102|P|2.3").unwrap();
        let msh = message.first("MSH").unwrap();
        assert_eq!(msh.fields()[1], "|");
        assert_eq!(msh.fields()[2], "^~\\&");
        assert_eq!(msh.fields()[9], "ADT^A01");
        assert_eq!(msh.fields()[12], "2.3");
    }

    #[test]
    fn keeps_every_occurrence_but_first_wins() {
        let message = Message::parse("MSH|^~\\&\rPID|1||111\rPID|2||222").unwrap();
        assert_eq!(message.occurrences("PID").len(), 2);
        assert_eq!(message.first("PID").unwrap().fields()[3], "111");
        assert!(message.first("DG1").is_none());
        assert!(message.occurrences("DG1").is_empty());
    }

    #[test]
    fn require_names_the_missing_segment() {
        let message = Message::parse("MSH|^~\\&").unwrap();
        assert_eq!(
            message.require("PID").unwrap_err(),
            Hl7Error::MissingSegment("PID".into())
        );
    }
}
