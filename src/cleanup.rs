//! Cleanup of completion text before it is shown
//!
//! Models often leak chat markup (role labels, instruction tags) or prefix
//! the answer with preamble. An ordered list of replacements strips them,
//! then a non-Arabic preamble ahead of the first recognized Arabic greeting
//! is dropped. Greetings that follow Arabic content are left alone.

use regex::Regex;

/// Greetings that mark the start of the real answer
const GREETINGS: [&str; 5] = ["السلام عليكم", "مرحباً", "مرحبا", "أهلاً", "أهلا"];

/// Compiled replacement table, applied in order
pub struct ResponseCleaner {
    replacements: Vec<(Regex, &'static str)>,
    arabic: Regex,
}

impl ResponseCleaner {
    pub fn new() -> Self {
        // Compile patterns once - these are fixed and never fail
        let replacements = vec![
            // ChatML and Llama instruction tags
            (Regex::new(r"<\|im_start\|>\s*(system|user|assistant)?").expect("Invalid regex pattern"), ""),
            (Regex::new(r"<\|im_end\|>|<\|eot_id\|>|<\|end_of_text\|>").expect("Invalid regex pattern"), ""),
            (Regex::new(r"\[/?INST\]|<</?SYS>>|</?s>").expect("Invalid regex pattern"), ""),
            (Regex::new(r"<\|start_header_id\|>\w*<\|end_header_id\|>").expect("Invalid regex pattern"), ""),
            // Markdown headers such as "### Response:"
            (Regex::new(r"(?mi)^#{1,6}\s*(response|answer|assistant)\s*:?\s*$").expect("Invalid regex pattern"), ""),
            // Role labels at line start, Latin and Arabic
            (Regex::new(r"(?mi)^\s*(assistant|user|system|المساعد|المستخدم)\s*:\s*").expect("Invalid regex pattern"), ""),
            // Collapse blank-line runs
            (Regex::new(r"\n{3,}").expect("Invalid regex pattern"), "\n\n"),
        ];

        let arabic = Regex::new(r"\p{Arabic}").expect("Invalid regex pattern");

        Self { replacements, arabic }
    }

    pub fn clean(&self, text: &str) -> String {
        let mut cleaned = text.to_string();
        for (pattern, replacement) in &self.replacements {
            cleaned = pattern.replace_all(&cleaned, *replacement).into_owned();
        }

        let start = GREETINGS
            .iter()
            .filter_map(|greeting| cleaned.find(greeting))
            .min();
        if let Some(start) = start {
            // Only a preamble with no Arabic text counts as leading chatter
            if !self.arabic.is_match(&cleaned[..start]) {
                cleaned = cleaned[start..].to_string();
            }
        }

        cleaned.trim().to_string()
    }
}

impl Default for ResponseCleaner {
    fn default() -> Self {
        Self::new()
    }
}
