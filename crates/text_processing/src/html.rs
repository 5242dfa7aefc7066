//! HTML-to-speech and HTML-to-display conversion
//!
//! Backend answers arrive as small HTML fragments (`<br>` line breaks, bold
//! tags, the odd list). The display path keeps line structure; the speech
//! path turns breaks into sentence pauses and strips everything the
//! synthesizer would read aloud or stumble over.

use once_cell::sync::Lazy;
use regex::Regex;

static BR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static REPEAT_PUNCT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([.!?,])(?:\s*[.!?,])+").expect("valid regex"));
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").expect("valid regex"));

fn decode_entities(input: &str) -> String {
    input
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}

fn is_devanagari(c: char) -> bool {
    ('\u{0900}'..='\u{097F}').contains(&c)
}

/// Drop whitespace runs whose neighbours on both sides are Devanagari glyphs.
/// Synthesis engines insert an unnatural pause at every such gap when the
/// transcript arrives glyph-by-glyph.
fn rejoin_devanagari(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i].is_whitespace() {
            let mut j = i;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            let prev = out.chars().last();
            let next = chars.get(j).copied();
            let joined = matches!((prev, next), (Some(p), Some(n)) if is_devanagari(p) && is_devanagari(n));
            if !joined {
                out.push(' ');
            }
            i = j;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }

    out
}

/// Convert an HTML fragment to speech-ready plain text.
///
/// `<br>` variants become a sentence pause, other tags are stripped,
/// repeated punctuation collapses to one mark, and Devanagari glyph runs
/// separated only by whitespace are rejoined.
pub fn html_to_speech(html: &str) -> String {
    let text = BR_RE.replace_all(html, ". ");
    let text = TAG_RE.replace_all(&text, "");
    let text = decode_entities(&text);
    let text = REPEAT_PUNCT_RE.replace_all(&text, "$1");
    let text = WS_RE.replace_all(&text, " ");
    rejoin_devanagari(text.trim())
}

/// Segment an HTML fragment into speech-ready lines, one per `<br>` break.
///
/// Each segment goes through [`html_to_speech`]; empty segments (consecutive
/// breaks, leading/trailing breaks) are dropped. The synthesis queue speaks
/// one returned line per utterance.
pub fn speech_lines(html: &str) -> Vec<String> {
    BR_RE
        .split(html)
        .map(html_to_speech)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Convert an HTML fragment to display plain text, keeping line structure
pub fn html_to_display(html: &str) -> String {
    let text = BR_RE.replace_all(html, "\n");
    let text = TAG_RE.replace_all(&text, "");
    let text = decode_entities(&text);
    let text = WS_RE.replace_all(&text, " ");
    text.split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim_matches('\n')
        .to_string()
}

/// Strip punctuation and control characters irrelevant to speech from one
/// line before it is handed to the synthesizer.
pub fn strip_for_speech(line: &str) -> String {
    let cleaned: String = line
        .chars()
        .filter(|c| !c.is_control())
        .filter(|c| !matches!(c, '*' | '_' | '#' | '`' | '~' | '|' | '<' | '>' | '[' | ']' | '{' | '}'))
        .collect();
    WS_RE.replace_all(cleaned.trim(), " ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_br_becomes_sentence_pause() {
        let out = html_to_speech("Line1<br>Line2");
        assert!(!out.contains('<'));
        assert_eq!(out, "Line1. Line2");
    }

    #[test]
    fn test_br_variants() {
        assert_eq!(html_to_display("a<br>b<BR/>c<br />d"), "a\nb\nc\nd");
    }

    #[test]
    fn test_display_newlines() {
        assert_eq!(html_to_display("Line1<br>Line2"), "Line1\nLine2");
    }

    #[test]
    fn test_tags_stripped() {
        assert_eq!(html_to_speech("<b>Bold</b> and <i>italic</i>"), "Bold and italic");
        assert_eq!(html_to_display("<div>Hello</div>"), "Hello");
    }

    #[test]
    fn test_repeated_punctuation_collapses() {
        assert_eq!(html_to_speech("Done.<br>Next"), "Done. Next");
        assert_eq!(html_to_speech("Wait!!! Really??"), "Wait! Really?");
    }

    #[test]
    fn test_entities_decoded() {
        assert_eq!(html_to_display("a&nbsp;b &amp; c"), "a b & c");
    }

    #[test]
    fn test_devanagari_glyphs_rejoined() {
        // Glyph-by-glyph transcript with spaces between every Devanagari char
        assert_eq!(html_to_speech("न म स ् त े"), "नमस्ते");
        // Latin text around it keeps its spacing
        assert_eq!(html_to_speech("hello न म स ् त े world"), "hello नमस्ते world");
    }

    #[test]
    fn test_speech_lines_segmentation() {
        assert_eq!(
            speech_lines("First line<br><b>Second</b> line<br/>"),
            vec!["First line", "Second line"]
        );
        assert_eq!(speech_lines("no breaks here"), vec!["no breaks here"]);
        assert!(speech_lines("<br><br>").is_empty());
    }

    #[test]
    fn test_strip_for_speech() {
        assert_eq!(strip_for_speech("**Bold** line [1]"), "Bold line 1");
        assert_eq!(strip_for_speech("  spaced\tout  "), "spaced out");
        assert_eq!(strip_for_speech("keep, punctuation. ok?"), "keep, punctuation. ok?");
    }
}
