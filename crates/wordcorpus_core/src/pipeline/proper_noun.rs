//! Proper-noun classification from name casing.
//!
//! # Invariants
//! - A leading non-letter never satisfies the first-character rule.
//! - A name without letters is never classified as a proper noun.

/// Returns whether `name` looks like a proper noun.
///
/// True when the first character is an uppercase letter, or when the name
/// has at least one letter and every letter is uppercase.
pub fn classify_proper_noun(name: &str) -> bool {
    let starts_uppercase = name.chars().next().is_some_and(char::is_uppercase);
    starts_uppercase || is_all_uppercase(name)
}

fn is_all_uppercase(name: &str) -> bool {
    let mut letters = name.chars().filter(|ch| ch.is_alphabetic()).peekable();
    letters.peek().is_some() && letters.all(char::is_uppercase)
}
