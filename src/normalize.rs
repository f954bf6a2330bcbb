//! Query normalization ahead of scoring

/// Punctuation dropped before matching: Arabic and Latin commas, period,
/// exclamation mark, Arabic and Latin question marks.
const STRIPPED: [char; 6] = ['،', ',', '.', '!', '؟', '?'];

/// Lowercase, drop terminators, collapse whitespace runs and trim.
pub fn normalize(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let stripped: String = lowered.chars().filter(|c| !STRIPPED.contains(c)).collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a normalized query on single spaces.
///
/// An empty query yields one empty token, not an empty list.
pub fn tokenize(normalized: &str) -> Vec<&str> {
    normalized.split(' ').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_arabic_question_mark() {
        assert_eq!(normalize("ما هي حقوق المستأجر؟"), "ما هي حقوق المستأجر");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize("  عقد   عمل \t جديد \n"), "عقد عمل جديد");
    }

    #[test]
    fn test_lowercases_latin() {
        assert_eq!(normalize("Contract, Review!"), "contract review");
    }

    #[test]
    fn test_punctuation_removed_without_space() {
        assert_eq!(normalize("عقد،عمل"), "عقدعمل");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" ?! "), "");
        assert_eq!(tokenize(""), vec![""]);
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("عقد عمل جديد"), vec!["عقد", "عمل", "جديد"]);
    }
}
