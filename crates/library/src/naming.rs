//! Work directory names: `"<title> <work id>"`.

/// Characters that are not allowed in file names on at least one platform.
const FORBIDDEN: &[char] = &['\\', '/', ':', '"', '*', '?', '<', '>', '|'];
const UNTITLED: &str = "Untitled";

/// Removes characters that can't appear in a directory name.
pub fn sanitize_title(title: &str) -> String {
    let sanitized = title.replace(FORBIDDEN, "");
    match sanitized.trim() {
        "" => UNTITLED.to_string(),
        trimmed => trimmed.to_string(),
    }
}

pub fn work_dir_name(title: &str, work_id: u64) -> String {
    format!("{} {work_id}", sanitize_title(title))
}

/// Splits a work directory name back into its display name and work ID.
///
/// Directories that don't end in a numeric ID keep their whole name and have
/// no ID.
pub fn split_work_dir_name(name: &str) -> (&str, Option<u64>) {
    match name.rsplit_once(' ') {
        Some((title, id)) if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) => match id.parse() {
            Ok(id) => (title, Some(id)),
            Err(_) => (name, None),
        },
        _ => (name, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("A Plain Title", "A Plain Title")]
    #[case("What If? (A Story)", "What If (A Story)")]
    #[case(r#"Either/Or: "Both" <maybe> | *neither* \ end"#, "EitherOr Both maybe  neither  end")]
    #[case("  padded  ", "padded")]
    #[case("???", "Untitled")]
    #[case("", "Untitled")]
    #[case("日本語のタイトル", "日本語のタイトル")]
    fn test_sanitize_title(#[case] title: &str, #[case] expected: &str) {
        assert_eq!(sanitize_title(title), expected);
    }

    #[test]
    fn test_work_dir_name() {
        assert_eq!(work_dir_name("The Long Way Round", 21990778), "The Long Way Round 21990778");
        assert_eq!(work_dir_name("Why?", 5), "Why 5");
    }

    #[rstest]
    #[case("The Long Way Round 21990778", "The Long Way Round", Some(21990778))]
    #[case("Untitled 5", "Untitled", Some(5))]
    #[case("notes", "notes", None)]
    #[case("Chapter one", "Chapter one", None)]
    #[case("trailing space ", "trailing space ", None)]
    #[case("Overflow 99999999999999999999999", "Overflow 99999999999999999999999", None)]
    fn test_split_work_dir_name(#[case] name: &str, #[case] title: &str, #[case] work_id: Option<u64>) {
        assert_eq!(split_work_dir_name(name), (title, work_id));
    }

    #[test]
    fn test_name_roundtrip() {
        let name = work_dir_name("Heart: A Study", 42);
        assert_eq!(split_work_dir_name(&name), ("Heart A Study", Some(42)));
    }
}
