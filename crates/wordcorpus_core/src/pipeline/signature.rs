//! Canonical anagram signature.

/// Derives the anagram signature of `name`.
///
/// Keeps ASCII letters only, lowercases them and sorts ascending, so two
/// words are anagrams exactly when their signatures are equal. The result is
/// empty when `name` has no ASCII letters.
pub fn derive_signature(name: &str) -> String {
    let mut letters: Vec<u8> = name
        .bytes()
        .filter(u8::is_ascii_alphabetic)
        .map(|byte| byte.to_ascii_lowercase())
        .collect();
    letters.sort_unstable();
    letters.into_iter().map(char::from).collect()
}
