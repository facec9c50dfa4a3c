//! reStructuredText rendering of speech-to-text output
//!
//! Two renderings are offered:
//! - [`render_plain`]: title plus one paragraph per transcript line
//! - [`render_clean`]: document title, docinfo fields and the text tidied
//!   into sentences and short paragraphs

use unicode_width::UnicodeWidthStr;

/// Placeholder paragraph for a transcript with no text
pub const EMPTY_TRANSCRIPT: &str = "*(no speech detected)*";

/// Maximum sentences per paragraph in the clean rendering
pub const SENTENCES_PER_PARAGRAPH: usize = 4;

const FILLER_WORDS: &[&str] = &["um", "umm", "uh", "uhh", "erm", "er", "ah", "hmm", "mm"];

/// Metadata shown in the clean rendering's field list
#[derive(Debug, Clone)]
pub struct DocInfo {
    pub source: String,
    pub model: String,
    pub date: String,
}

/// Render a transcript with a simple underlined title
pub fn render_plain(title: &str, text: &str) -> String {
    let mut out = section_title(title, false);

    let paragraphs: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(escape_line)
        .collect();

    push_paragraphs(&mut out, &paragraphs);
    out
}

/// Render a cleaned-up transcript as a titled document
pub fn render_clean(title: &str, text: &str, info: &DocInfo) -> String {
    let mut out = section_title(title, true);

    out.push_str(&format!(":Source: {}\n", info.source));
    out.push_str(&format!(":Model: {}\n", info.model));
    out.push_str(&format!(":Date: {}\n", info.date));
    out.push('\n');

    let sentences = split_sentences(&clean_text(text));
    let paragraphs: Vec<String> = sentences
        .chunks(SENTENCES_PER_PARAGRAPH)
        .map(|chunk| escape_line(&chunk.join(" ")))
        .collect();

    push_paragraphs(&mut out, &paragraphs);
    out
}

/// Normalise raw transcript text
///
/// Collapses whitespace, drops filler words and immediately repeated words.
pub fn clean_text(text: &str) -> String {
    let mut words: Vec<String> = Vec::new();

    for word in text.split_whitespace() {
        let bare = bare_word(word);
        if is_filler(bare) {
            // Carry a sentence end that trailed the filler onto the previous word
            if let (Some(end), Some(last)) = (sentence_end(word), words.last_mut()) {
                if sentence_end(last).is_none() {
                    let kept = last.trim_end_matches(',').len();
                    last.truncate(kept);
                    last.push(end);
                }
            }
            continue;
        }

        if let Some(prev) = words.last() {
            let prev_bare = bare_word(prev);
            if !prev.ends_with([',', '.', '?', '!', ';', ':'])
                && !prev_bare.is_empty()
                && prev_bare.eq_ignore_ascii_case(bare)
            {
                words.pop();
            }
        }
        words.push(word.to_string());
    }

    words.join(" ")
}

fn bare_word(word: &str) -> &str {
    word.trim_matches(|c: char| !c.is_alphanumeric())
}

fn sentence_end(word: &str) -> Option<char> {
    word.chars().last().filter(|c| matches!(c, '.' | '?' | '!'))
}

fn is_filler(word: &str) -> bool {
    FILLER_WORDS.iter().any(|f| f.eq_ignore_ascii_case(word))
}

/// Split text into sentences and capitalise each one
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);

        if sentence_end(word).is_some() {
            sentences.push(capitalize(&current));
            current.clear();
        }
    }

    if !current.is_empty() {
        sentences.push(capitalize(&current));
    }

    sentences
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn section_title(title: &str, overline: bool) -> String {
    let title = title.trim();
    let title = if title.is_empty() { "Transcript" } else { title };
    // Adornments must span the title's display columns, not its chars
    let rule = "=".repeat(title.width().max(1));

    let mut out = String::new();
    if overline {
        out.push_str(&rule);
        out.push('\n');
    }
    out.push_str(title);
    out.push('\n');
    out.push_str(&rule);
    out.push_str("\n\n");
    out
}

fn push_paragraphs(out: &mut String, paragraphs: &[String]) {
    if paragraphs.is_empty() {
        out.push_str(EMPTY_TRANSCRIPT);
        out.push('\n');
        return;
    }

    out.push_str(&paragraphs.join("\n\n"));
    out.push('\n');
}

/// Escape a line that a reader would take for a section adornment
fn escape_line(line: &str) -> String {
    let mut chars = line.chars();
    let is_adornment = match chars.next() {
        Some(first) if first.is_ascii_punctuation() => {
            line.chars().count() >= 4 && chars.all(|c| c == first)
        }
        _ => false,
    };

    if is_adornment {
        format!("\\{}", line)
    } else {
        line.to_string()
    }
}
