use crate::consts;
use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};

/// Resolves operator input to an AO3 work ID.
///
/// Accepts either the bare numeric ID or any work URL (with or without
/// scheme, `www.`, collection prefix, chapter suffix, query or fragment).
///
/// ```
/// use fictrack_source::parse_work_id;
/// assert_eq!(parse_work_id("21990778").unwrap(), 21990778);
/// assert_eq!(parse_work_id("https://archiveofourown.org/works/21990778/chapters/52434454").unwrap(), 21990778);
/// assert!(parse_work_id("https://example.com/works/21990778").is_err());
/// ```
pub fn parse_work_id(input: &str) -> Result<u64> {
    let input = input.trim();
    let invalid = || ErrorKind::InvalidWorkReference(input.to_string());
    let digits = if !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit()) {
        input
    } else {
        consts::WORK_URL_REGEX.captures(input).and_then(|c| c.get(1)).ok_or_raise(invalid)?.as_str()
    };
    digits.parse::<u64>().or_raise(invalid)
}
