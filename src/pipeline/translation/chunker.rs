use crate::config::ChunkStrategy;

use super::numeric_guard::placeholder_spans;

/// Split guarded text into translation requests of at most `size` characters.
///
/// Sizes count Unicode scalar values, never bytes, so a slice can never land
/// inside a multi-byte character. Segments are returned in order, untrimmed;
/// the caller decides what to do with blank ones.
pub fn split_chunks(text: &str, size: usize, strategy: ChunkStrategy) -> Vec<String> {
    let size = size.max(1);
    match strategy {
        ChunkStrategy::Fixed => fixed_chunks(text, size),
        ChunkStrategy::WordBoundary => word_chunks(text, size),
    }
}

/// Contiguous `size`-character slices. No overlap, no reordering.
fn fixed_chunks(text: &str, size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (i, _) in text.char_indices() {
        if count == size {
            chunks.push(text[start..i].to_string());
            start = i;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(text[start..].to_string());
    }
    chunks
}

/// Greedily pack whitespace-separated tokens, joined by single spaces.
fn word_chunks(text: &str, size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for token in text.split_whitespace() {
        let token_len = token.chars().count();

        if token_len > size {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            chunks.extend(split_long_token(token, size).into_iter().map(str::to_string));
            continue;
        }

        if current.is_empty() {
            current.push_str(token);
            current_len = token_len;
        } else if current_len + 1 + token_len <= size {
            current.push(' ');
            current.push_str(token);
            current_len += 1 + token_len;
        } else {
            chunks.push(std::mem::replace(&mut current, token.to_string()));
            current_len = token_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Hard-split a token longer than `size`, moving any cut that would land
/// inside a placeholder to the placeholder's start. A placeholder longer than
/// `size` on its own is kept whole.
fn split_long_token(token: &str, size: usize) -> Vec<&str> {
    let spans = placeholder_spans(token);
    let mut pieces = Vec::new();
    let mut start = 0;

    while start < token.len() {
        let mut end = token[start..]
            .char_indices()
            .nth(size)
            .map(|(i, _)| start + i)
            .unwrap_or(token.len());

        if let Some(span) = spans.iter().find(|s| s.start < end && end < s.end) {
            end = if span.start > start { span.start } else { span.end };
        }

        pieces.push(&token[start..end]);
        start = end;
    }
    pieces
}
