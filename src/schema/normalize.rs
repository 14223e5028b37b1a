use regex::Regex;
use std::sync::LazyLock;

// Everything that is not a letter or digit: whitespace, dashes,
// underscores, punctuation, symbols, emoji.
static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("valid pattern"));

/// Normalize a tag or field name for matching.
///
/// Strips every non-alphanumeric character and lowercases the rest, so
/// `"Due Date"`, `due_date`, `DUE-DATE`, and `"Due Date 📅"` all collapse
/// to `duedate`. Normalization is the sole key used to match a user-typed
/// identifier against the schema.
pub fn normalize_name(name: &str) -> String {
    NON_ALNUM.replace_all(name, "").to_lowercase()
}

#[test]
fn test_spelling_variants_collapse() {
    let cases = vec![
        ("Due Date", "duedate"),
        ("due_date", "duedate"),
        ("DUE-DATE", "duedate"),
        ("Due Date 📅", "duedate"),
        ("e-mail!", "email"),
        ("", ""),
    ];
    for (input, expected) in cases {
        assert_eq!(normalize_name(input), expected, "input: {:?}", input);
    }
}
