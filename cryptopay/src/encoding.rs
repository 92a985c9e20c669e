//! Comma-joined list encoding for request fields.
//!
//! The gateway takes list parameters (`invoice_ids`, `check_ids`,
//! `transfer_ids`, `accepted_assets`) as a single string such as `"1,2,3"`
//! rather than a JSON array. Request types keep these as ordered `Vec`s and
//! translate them with [`join_list`] when building their wire shape.
//!
//! The encoding cannot represent items that themselves contain a comma.
//! Integer ids and asset symbols never do.

use std::fmt::{Display, Write};

/// Separator between list items on the wire.
pub const LIST_SEPARATOR: char = ',';

/// Joins the textual forms of `items` with commas, preserving order.
///
/// Returns `None` for an empty input so the field is omitted from the wire
/// body instead of being sent as `""`.
pub fn join_list<I, T>(items: I) -> Option<String>
where
    I: IntoIterator<Item = T>,
    T: Display,
{
    let mut joined = String::new();
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            joined.push(LIST_SEPARATOR);
        }
        let _ = write!(joined, "{item}");
    }
    if joined.is_empty() { None } else { Some(joined) }
}

/// Splits a comma-joined string back into items, skipping empty segments.
///
/// # Errors
///
/// Returns the first parse error encountered.
pub fn split_list<T>(s: &str) -> Result<Vec<T>, T::Err>
where
    T: std::str::FromStr,
{
    s.split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect()
}
