//! Narration text normalization.
//!
//! Prepares raw LLM output for synthesis: strips links, emoji and markup,
//! collapses whitespace, and stretches isolated sentence-ending periods into
//! ellipses so the synthesizer produces natural pauses.

use once_cell::sync::Lazy;
use regex::Regex;

static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://\S+|www\.\S+").expect("link regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Remove URL-like substrings.
fn remove_links(text: &str) -> String {
    LINK_RE.replace_all(text, "").into_owned()
}

/// Remove emoji and other characters outside the Basic Multilingual Plane.
fn remove_emojis(text: &str) -> String {
    text.chars().filter(|c| (*c as u32) < 0x10000).collect()
}

/// Remove stray markup characters (emphasis asterisks).
fn remove_special_chars(text: &str) -> String {
    text.replace('*', "")
}

/// Normalize narration text for synthesis.
///
/// Total function: applies link removal, emoji removal, markup removal, then
/// collapses whitespace runs and trims the ends. Idempotent.
pub fn normalize(text: &str) -> String {
    let text = remove_links(text);
    let text = remove_emojis(&text);
    let text = remove_special_chars(&text);
    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

/// Replace every period that is not part of a multi-period run with `...`.
///
/// Periods already adjacent to another period are left untouched, which makes
/// the pass idempotent: an ellipsis never grows on re-application. The `regex`
/// crate has no lookarounds, so this is an explicit scan over the characters.
pub fn add_pauses(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for (i, &c) in chars.iter().enumerate() {
        if c == '.' {
            let prev_is_dot = i > 0 && chars[i - 1] == '.';
            let next_is_dot = i + 1 < chars.len() && chars[i + 1] == '.';
            if !prev_is_dot && !next_is_dot {
                out.push_str("...");
                continue;
            }
        }
        out.push(c);
    }
    out
}
