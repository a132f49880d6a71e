use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use unidecode::unidecode;

lazy_static! {
    static ref NON_SLUG_CHARS: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

const WORDS_PER_MINUTE: usize = 200;

/// `"Hello, World!"` -> `"hello-world"`. Accents are transliterated first.
pub fn generate_slug(title: &str) -> String {
    let ascii = unidecode(title).to_lowercase();
    NON_SLUG_CHARS.replace_all(&ascii, "-")
        .trim_matches('-')
        .to_string()
}

/// Collapses whitespace and cuts at a word boundary, appending an ellipsis when shortened.
pub fn truncate_words(text: &str, max_chars: usize) -> String {
    let text = WHITESPACE.replace_all(text.trim(), " ");
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars).collect();
    let cut = match cut.rfind(' ') {
        Some(pos) if pos > 0 => &cut[..pos],
        _ => cut.as_str(),
    };
    format!("{}…", cut.trim_end_matches([',', '.', ';', ':']))
}

pub fn reading_time_minutes(text: &str) -> u32 {
    let words = text.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as u32
}

pub fn format_date(date_time: &DateTime<Utc>) -> String {
    date_time.format("%B %-d, %Y").to_string()
}
