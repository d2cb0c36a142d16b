//! Fixed-window text chunking
//!
//! Splits a text blob into an ordered sequence of substrings of at most
//! `window` characters, covering the input exactly once. Only the last chunk
//! may be shorter. The window counts characters rather than bytes so that a
//! chunk boundary can never split a UTF-8 sequence; key files are base64
//! text, where the two coincide.

use keyferry_core::{KeyferryError, KeyferryResult};

/// Split `text` into ordered chunks of at most `window` characters.
///
/// Empty input yields an empty vector. Fails only when `window` is zero.
pub fn chunk(text: &str, window: usize) -> KeyferryResult<Vec<String>> {
    if window == 0 {
        return Err(KeyferryError::Chunk(
            "chunk window must be greater than zero".into(),
        ));
    }

    let mut chunks = Vec::with_capacity(text.len() / window + 1);
    let mut current = String::with_capacity(window.min(text.len()));
    let mut filled = 0usize;

    for ch in text.chars() {
        current.push(ch);
        filled += 1;
        if filled == window {
            chunks.push(std::mem::take(&mut current));
            filled = 0;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    Ok(chunks)
}

/// Concatenate chunks in the given order. Empty input yields empty text.
pub fn reassemble<I, S>(chunks: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut text = String::new();
    for chunk in chunks {
        text.push_str(chunk.as_ref());
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_text_yields_no_chunks() {
        let chunks = chunk("", 4096).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn zero_window_is_rejected() {
        assert!(chunk("abc", 0).is_err());
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = chunk("hello", 4096).unwrap();
        assert_eq!(chunks, vec!["hello".to_string()]);
    }

    #[test]
    fn exact_multiple_has_no_short_tail() {
        let text = "ab".repeat(8); // 16 chars
        let chunks = chunk(&text, 4).unwrap();
        assert_eq!(chunks.len(), 4);
        assert!(chunks.iter().all(|c| c.chars().count() == 4));
    }

    #[test]
    fn window_4096_over_10000_chars() {
        let text: String = std::iter::repeat('k').take(10000).collect();
        let chunks = chunk(&text, 4096).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 4096);
        assert_eq!(chunks[1].len(), 4096);
        assert_eq!(chunks[2].len(), 1808);
        assert_eq!(reassemble(&chunks), text);
    }

    #[test]
    fn multibyte_input_never_splits_a_char() {
        let text = "héllo wörld ☃".repeat(100);
        let chunks = chunk(&text, 7).unwrap();
        assert_eq!(reassemble(&chunks), text);
        assert!(chunks.iter().all(|c| c.chars().count() <= 7));
    }

    #[test]
    fn reassemble_of_nothing_is_empty() {
        let none: Vec<String> = vec![];
        assert_eq!(reassemble(&none), "");
    }

    proptest! {
        /// Round-trip identity: reassemble(chunk(T, W)) == T
        #[test]
        fn chunk_reassemble_roundtrip(
            text in ".{0,2000}",
            window in 1usize..=512,
        ) {
            let chunks = chunk(&text, window).unwrap();
            prop_assert_eq!(reassemble(&chunks), text);
        }

        /// Every chunk is at most W characters, and only the last may be shorter
        #[test]
        fn chunk_lengths_respect_window(
            text in ".{1,2000}",
            window in 1usize..=512,
        ) {
            let chunks = chunk(&text, window).unwrap();
            let last = chunks.len() - 1;
            for (i, c) in chunks.iter().enumerate() {
                let len = c.chars().count();
                prop_assert!(len <= window, "chunk {} exceeds window: {} > {}", i, len, window);
                if i < last {
                    prop_assert_eq!(len, window, "only the last chunk may be short");
                }
            }
        }
    }
}
