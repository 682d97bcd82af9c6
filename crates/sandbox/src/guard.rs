//! The lexical guard applied before parsing.
//!
//! A coarse denylist, not a soundness boundary: the real defense against
//! unbounded work is the evaluation step budget. This scan exists to
//! reject obviously program-shaped input early with a clear message.

/// Returns the reason the input is rejected, if any.
pub fn scan(input: &str) -> Option<&'static str> {
    let chars: Vec<char> = input.chars().collect();

    for (idx, keyword) in KEYWORDS.iter().flat_map(|kw| {
        find_keyword_positions(&chars, kw.word)
            .into_iter()
            .map(move |idx| (idx, kw))
    }) {
        let after = idx + keyword.word.len();
        match keyword.followed_by {
            Some(delimiter) => {
                // Loop keywords only count when a body or head opens.
                let mut rest = chars[after..].iter().skip_while(|c| c.is_whitespace());
                if rest.next() == Some(&delimiter) {
                    return Some(keyword.reason);
                }
            }
            None => return Some(keyword.reason),
        }
    }
    None
}

struct Keyword {
    word: &'static str,
    followed_by: Option<char>,
    reason: &'static str,
}

const KEYWORDS: &[Keyword] = &[
    Keyword {
        word: "for",
        followed_by: Some('('),
        reason: "loop constructs are not allowed",
    },
    Keyword {
        word: "while",
        followed_by: Some('('),
        reason: "loop constructs are not allowed",
    },
    Keyword {
        word: "do",
        followed_by: Some('{'),
        reason: "loop constructs are not allowed",
    },
    Keyword {
        word: "async",
        followed_by: None,
        reason: "async constructs are not allowed",
    },
];

fn find_keyword_positions(chars: &[char], word: &str) -> Vec<usize> {
    let word_chars: Vec<char> = word.chars().collect();
    let mut positions = Vec::new();

    for start in 0..chars.len().saturating_sub(word_chars.len() - 1) {
        if chars[start..start + word_chars.len()] != word_chars[..] {
            continue;
        }
        let boundary_before = start == 0 || !is_ident_char(chars[start - 1]);
        let end = start + word_chars.len();
        let boundary_after = end >= chars.len() || !is_ident_char(chars[end]);
        if boundary_before && boundary_after {
            positions.push(start);
        }
    }
    positions
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_loops() {
        assert!(scan("for(;;){}").is_some());
        assert!(scan("for (;;) {}").is_some());
        assert!(scan("while (true) {}").is_some());
        assert!(scan("do { } while(1)").is_some());
    }

    #[test]
    fn rejects_async() {
        assert!(scan("async () => {}").is_some());
    }

    #[test]
    fn allows_words_containing_keywords() {
        assert!(scan("{format: 'dollars'}").is_none());
        assert!(scan("{transform: 'x'}").is_none());
        assert!(scan("{dot: true}").is_none());
        assert!(scan("{label: 'await nothing forage'}").is_none());
    }

    #[test]
    fn allows_plain_chart_objects() {
        assert!(scan("{type:'bar',data:{labels:[1,2],datasets:[{data:[3,4]}]}}").is_none());
    }
}
