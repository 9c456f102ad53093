//! Numeric protection for machine translation.
//!
//! Translators happily rewrite "35" as "thirty-five" or localise the decimal
//! separator. Lab values must survive the round trip untouched, so every
//! numeric literal is swapped for an opaque `__NUM_<i>__` token before the
//! text leaves the process and swapped back afterwards.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Integers and plain decimals. No sign, no separators, no exponent.
static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid number pattern"));

static PLACEHOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__NUM_(\d+)__").expect("valid placeholder pattern"));

/// Original numeric literals, indexed by occurrence order.
///
/// Scoped to one `protect_numbers` / `restore_numbers` pairing; index spaces
/// from different calls must never be mixed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberPlaceholderMap {
    numbers: Vec<String>,
}

impl NumberPlaceholderMap {
    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.numbers.get(index).map(String::as_str)
    }
}

/// Placeholder token for the `index`-th number.
pub fn placeholder(index: usize) -> String {
    format!("__NUM_{index}__")
}

/// Replace every numeric literal, left to right, with its placeholder.
pub fn protect_numbers(text: &str) -> (String, NumberPlaceholderMap) {
    let mut numbers = Vec::new();
    let guarded = NUMBER_PATTERN.replace_all(text, |caps: &Captures| {
        let token = placeholder(numbers.len());
        numbers.push(caps[0].to_string());
        token
    });
    (guarded.into_owned(), NumberPlaceholderMap { numbers })
}

/// Swap placeholders back for the literals they replaced.
///
/// Tokens whose index is not in `map` are left verbatim.
pub fn restore_numbers(text: &str, map: &NumberPlaceholderMap) -> String {
    if map.is_empty() {
        return text.to_string();
    }
    PLACEHOLDER_PATTERN
        .replace_all(text, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|i| map.get(i))
                .map(str::to_string)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Byte ranges of every placeholder token in `text`.
pub fn placeholder_spans(text: &str) -> Vec<Range<usize>> {
    PLACEHOLDER_PATTERN
        .find_iter(text)
        .map(|m| m.range())
        .collect()
}
