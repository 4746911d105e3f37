//! Token estimation and sentence splitting

/// Estimate tokens as one per four characters, rounded up
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Split text into sentences
///
/// A boundary is `.`, `!` or `?` followed by whitespace and an ASCII capital
/// letter. This is a heuristic, not a sentence grammar: "Dr. Smith" splits,
/// "e.g. the fund" does not. Returned sentences are trimmed and non-empty.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];
        if matches!(c, '.' | '!' | '?') {
            let mut j = i + 1;
            while j < chars.len() && chars[j].1.is_whitespace() {
                j += 1;
            }
            if j > i + 1 && j < chars.len() && chars[j].1.is_ascii_uppercase() {
                push_trimmed(&mut sentences, &text[start..pos + c.len_utf8()]);
                start = chars[j].0;
                i = j;
                continue;
            }
        }
        i += 1;
    }
    push_trimmed(&mut sentences, &text[start..]);
    sentences
}

fn push_trimmed<'a>(out: &mut Vec<&'a str>, s: &'a str) {
    let s = s.trim();
    if !s.is_empty() {
        out.push(s);
    }
}

/// The last `words` whitespace-delimited words of `text`, as a literal suffix
pub(crate) fn word_suffix(text: &str, words: usize) -> Option<&str> {
    if words == 0 {
        return None;
    }
    let mut starts = Vec::new();
    let mut in_word = false;
    for (pos, c) in text.char_indices() {
        if c.is_whitespace() {
            in_word = false;
        } else if !in_word {
            starts.push(pos);
            in_word = true;
        }
    }
    let first = *starts.get(starts.len().saturating_sub(words))?;
    Some(text[first..].trim_end())
}

/// Break an over-long sentence into pieces of at most `max_tokens` each
///
/// Pieces break between words; a single word longer than the budget is cut
/// at character boundaries.
pub(crate) fn wrap_words(sentence: &str, max_tokens: usize) -> Vec<String> {
    let max_chars = max_tokens.saturating_mul(4).max(1);
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0;

    for word in sentence.split_whitespace() {
        let word_chars = word.chars().count();
        if word_chars > max_chars {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
                current_chars = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            pieces.extend(chars.chunks(max_chars).map(|c| c.iter().collect::<String>()));
            continue;
        }
        let needed = if current.is_empty() { word_chars } else { current_chars + 1 + word_chars };
        if needed > max_chars {
            pieces.push(std::mem::take(&mut current));
            current.push_str(word);
            current_chars = word_chars;
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_chars = needed;
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_tokens_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
        // counted in characters, not bytes
        assert_eq!(estimate_tokens("€€€€"), 1);
    }

    #[test]
    fn test_split_sentences() {
        let s = split_sentences("The fund grew. NAV rose 5%! Did DPI move? yes it did.");
        assert_eq!(s, vec!["The fund grew.", "NAV rose 5%!", "Did DPI move? yes it did."]);
    }

    #[test]
    fn test_decimal_points_do_not_split() {
        let s = split_sentences("TVPI was 1.8x at year end. Next quarter follows.");
        assert_eq!(s.len(), 2);
        assert_eq!(s[0], "TVPI was 1.8x at year end.");
    }

    #[test]
    fn test_split_empty() {
        assert!(split_sentences("   \n ").is_empty());
    }

    #[test]
    fn test_word_suffix() {
        let text = "alpha beta\ngamma  delta";
        assert_eq!(word_suffix(text, 2), Some("gamma  delta"));
        assert_eq!(word_suffix(text, 10), Some(text));
        assert_eq!(word_suffix(text, 0), None);
        assert_eq!(word_suffix("", 3), None);
        assert!(text.ends_with(word_suffix(text, 3).unwrap()));
    }

    #[test]
    fn test_wrap_words_respects_budget() {
        let sentence = "word ".repeat(100);
        let pieces = wrap_words(&sentence, 5);
        assert!(pieces.len() > 1);
        for p in &pieces {
            assert!(estimate_tokens(p) <= 5);
        }
        let long_word = "x".repeat(50);
        let pieces = wrap_words(&long_word, 3);
        assert_eq!(pieces.len(), 5);
        assert!(pieces.iter().all(|p| p.chars().count() <= 12));
    }
}
