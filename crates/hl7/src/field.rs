//! Total positional accessors.
//!
//! HL7 senders routinely drop trailing empty fields and components, so every accessor here
//! treats an index past the end as an empty value rather than an error.

use crate::message::Segment;

/// Component separator inside a composite field.
pub const COMPONENT_SEPARATOR: char = '^';

/// Field `index` of `segment`, trimmed; `""` when the segment is shorter.
pub fn field_at(segment: &Segment, index: usize) -> &str {
    segment
        .fields()
        .get(index)
        .map(|value| value.trim())
        .unwrap_or("")
}

/// Field `index` of an optional segment; `""` when the segment is absent.
pub fn optional_field_at(segment: Option<&Segment>, index: usize) -> &str {
    segment.map_or("", |s| field_at(s, index))
}

/// Component `index` of a `^`-separated field, trimmed; `""` when missing.
pub fn component_at(field: &str, index: usize) -> &str {
    field
        .split(COMPONENT_SEPARATOR)
        .nth(index)
        .map(str::trim)
        .unwrap_or("")
}
