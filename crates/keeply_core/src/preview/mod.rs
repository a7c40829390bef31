//! Plain-text preview derivation from untrusted markup.
//!
//! # Responsibility
//! - Extract readable text from HTML-like markup without any DOM, script
//!   execution, or resource fetching.
//! - Produce bounded preview strings with a stable ellipsis convention.
//!
//! # Invariants
//! - Input is treated as untrusted text only; stripping has no side
//!   effects.
//! - Stripped output contains no tags and no runs of whitespace.
//! - `truncate` output never exceeds `max_chars + 3` characters and
//!   re-truncating is stable.

use once_cell::sync::Lazy;
use regex::Regex;

/// Default preview length in characters.
pub const DEFAULT_PREVIEW_CHARS: usize = 100;

const ELLIPSIS: &str = "...";
const MAX_ENTITY_CHARS: usize = 32;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Derives a bounded plain-text preview from markup.
///
/// Composes [`strip_markup`] and [`truncate`].
pub fn preview_of(markup: &str, max_chars: usize) -> String {
    truncate(&strip_markup(markup), max_chars)
}

/// [`preview_of`] with the default length bound.
pub fn default_preview(markup: &str) -> String {
    preview_of(markup, DEFAULT_PREVIEW_CHARS)
}

/// Removes markup tags from `markup` and decodes it to plain text.
///
/// Rules:
/// - Tags, comments and declarations are dropped; each leaves one space so
///   adjacent words do not fuse.
/// - `<script>` and `<style>` element bodies are dropped entirely.
/// - Named and numeric character references are decoded; unknown named
///   references pass through literally.
/// - Whitespace runs collapse to single spaces; ends are trimmed.
pub fn strip_markup(markup: &str) -> String {
    let chars: Vec<char> = markup.chars().collect();
    let mut raw = String::with_capacity(markup.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '<' => match chars.get(i + 1) {
                Some('!') => {
                    i = skip_comment_or_declaration(&chars, i);
                    raw.push(' ');
                }
                Some(next) if *next == '/' || next.is_ascii_alphabetic() => {
                    let (after_tag, name) = scan_tag(&chars, i);
                    raw.push(' ');
                    i = if is_raw_text_element(&name) {
                        skip_raw_text(&chars, after_tag, &name)
                    } else {
                        after_tag
                    };
                }
                // A `<` not opening a tag is ordinary text.
                _ => {
                    raw.push('<');
                    i += 1;
                }
            },
            '&' => {
                let (decoded, after_entity) = decode_entity(&chars, i);
                raw.push_str(&decoded);
                i = after_entity;
            }
            other => {
                raw.push(other);
                i += 1;
            }
        }
    }

    WHITESPACE_RE.replace_all(&raw, " ").trim().to_string()
}

/// Bounds `text` to `max_chars` characters with a three-dot ellipsis.
///
/// Text at or under the bound is returned unchanged. Otherwise the first
/// `max_chars` characters are kept, with trailing whitespace and trailing
/// dots dropped before the ellipsis so an already elided string cannot grow
/// extra dots on a second pass.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.is_empty() || text.chars().count() <= max_chars {
        return text.to_string();
    }

    let prefix: String = text.chars().take(max_chars).collect();
    let trimmed = prefix.trim_end_matches(|c: char| c.is_whitespace() || c == '.');
    format!("{trimmed}{ELLIPSIS}")
}

/// Skips `<!-- ... -->` comments and `<!...>` declarations.
fn skip_comment_or_declaration(chars: &[char], start: usize) -> usize {
    if chars[start..].starts_with(&['<', '!', '-', '-']) {
        let mut i = start + 4;
        while i < chars.len() {
            if chars[i..].starts_with(&['-', '-', '>']) {
                return i + 3;
            }
            i += 1;
        }
        return chars.len();
    }

    let mut i = start + 2;
    while i < chars.len() {
        if chars[i] == '>' {
            return i + 1;
        }
        i += 1;
    }
    chars.len()
}

/// Scans one tag starting at `<`. Returns the index after the closing `>`
/// (or end of input for unterminated tags) and the lowercase tag name.
fn scan_tag(chars: &[char], start: usize) -> (usize, String) {
    let mut i = start + 1;
    if chars.get(i) == Some(&'/') {
        i += 1;
    }

    let mut name = String::new();
    while let Some(c) = chars.get(i) {
        if c.is_ascii_alphanumeric() {
            name.push(c.to_ascii_lowercase());
            i += 1;
        } else {
            break;
        }
    }

    // Quoted attribute values may contain `>`.
    let mut quote: Option<char> = None;
    while let Some(c) = chars.get(i) {
        match quote {
            Some(open) if *c == open => quote = None,
            Some(_) => {}
            None if *c == '"' || *c == '\'' => quote = Some(*c),
            None if *c == '>' => return (i + 1, name),
            None => {}
        }
        i += 1;
    }

    (chars.len(), name)
}

fn is_raw_text_element(name: &str) -> bool {
    matches!(name, "script" | "style")
}

/// Skips the body of a raw-text element up to and including its closing
/// tag. Unterminated bodies consume the rest of the input.
fn skip_raw_text(chars: &[char], start: usize, name: &str) -> usize {
    let closer: Vec<char> = format!("</{name}").chars().collect();
    let mut i = start;

    while i < chars.len() {
        if matches_ignore_case(&chars[i..], &closer) {
            let (after_tag, _) = scan_tag(chars, i);
            return after_tag;
        }
        i += 1;
    }
    chars.len()
}

fn matches_ignore_case(haystack: &[char], needle: &[char]) -> bool {
    haystack.len() >= needle.len()
        && haystack
            .iter()
            .zip(needle)
            .all(|(a, b)| a.to_ascii_lowercase() == b.to_ascii_lowercase())
}

/// Decodes one character reference starting at `&`.
///
/// Returns the decoded text and the index after the reference. Anything not
/// recognized as a reference passes through literally.
fn decode_entity(chars: &[char], start: usize) -> (String, usize) {
    let limit = (start + 1 + MAX_ENTITY_CHARS).min(chars.len());
    let Some(offset) = chars[start + 1..limit].iter().position(|c| *c == ';') else {
        return ("&".to_string(), start + 1);
    };

    let end = start + 1 + offset;
    let body: String = chars[start + 1..end].iter().collect();
    if body.is_empty() {
        return ("&".to_string(), start + 1);
    }

    if let Some(rest) = body.strip_prefix('#') {
        let code = if let Some(hex) = rest.strip_prefix(['x', 'X']) {
            u32::from_str_radix(hex, 16).ok()
        } else {
            rest.parse::<u32>().ok()
        };
        let decoded = code
            .and_then(char::from_u32)
            .unwrap_or('\u{FFFD}')
            .to_string();
        return (decoded, end + 1);
    }

    match named_entity(&body) {
        Some(decoded) => (decoded.to_string(), end + 1),
        None => (format!("&{body};"), end + 1),
    }
}

fn named_entity(name: &str) -> Option<&'static str> {
    match name {
        "amp" => Some("&"),
        "lt" => Some("<"),
        "gt" => Some(">"),
        "quot" => Some("\""),
        "apos" => Some("'"),
        "nbsp" => Some("\u{A0}"),
        "ndash" => Some("\u{2013}"),
        "mdash" => Some("\u{2014}"),
        "hellip" => Some("\u{2026}"),
        "lsquo" => Some("\u{2018}"),
        "rsquo" => Some("\u{2019}"),
        "ldquo" => Some("\u{201C}"),
        "rdquo" => Some("\u{201D}"),
        "copy" => Some("\u{A9}"),
        "reg" => Some("\u{AE}"),
        "trade" => Some("\u{2122}"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{default_preview, preview_of, strip_markup, truncate};

    #[test]
    fn strip_drops_tags_and_decodes_entities() {
        assert_eq!(strip_markup("<p>Hello&nbsp;&nbsp;world</p>"), "Hello world");
        assert_eq!(strip_markup("a &amp; b &lt;ok&gt;"), "a & b <ok>");
    }

    #[test]
    fn strip_collapses_whitespace_runs() {
        assert_eq!(
            strip_markup("  line one\n\n\tline\ttwo   "),
            "line one line two"
        );
    }

    #[test]
    fn strip_drops_script_and_style_bodies() {
        let markup = "before<script>fetch('https://example.com')</script>after";
        assert_eq!(strip_markup(markup), "before after");

        let styled = "x<style>p { color: red; }</style>y";
        assert_eq!(strip_markup(styled), "x y");
    }

    #[test]
    fn strip_handles_comments_and_stray_angle_brackets() {
        assert_eq!(strip_markup("a<!-- hidden -->b"), "a b");
        assert_eq!(strip_markup("2 < 3 and 5 > 4"), "2 < 3 and 5 > 4");
    }

    #[test]
    fn strip_survives_unterminated_markup() {
        assert_eq!(strip_markup("text <div class='x"), "text");
        assert_eq!(strip_markup("text <script>never closed"), "text");
        assert_eq!(strip_markup(""), "");
    }

    #[test]
    fn strip_decodes_numeric_references() {
        assert_eq!(strip_markup("A&#66;&#x43;"), "ABC");
        assert_eq!(strip_markup("bad &#xD800; ref"), "bad \u{FFFD} ref");
        assert_eq!(strip_markup("unknown &zzz; stays"), "unknown &zzz; stays");
    }

    #[test]
    fn truncate_keeps_short_text_unchanged() {
        assert_eq!(truncate("short", 100), "short");
        assert_eq!(truncate("", 5), "");
        assert_eq!(truncate("exact", 5), "exact");
    }

    #[test]
    fn truncate_bounds_and_appends_ellipsis() {
        assert_eq!(truncate("Hello world", 5), "Hello...");
        assert_eq!(truncate("abcd e", 5), "abcd...");
    }

    #[test]
    fn truncate_is_stable_under_repeated_application() {
        for text in ["Hello world", "abcd e", "dots... and more text", "a.b.c.d.e.f"] {
            for max_chars in 4..12 {
                let once = truncate(text, max_chars);
                assert_eq!(truncate(&once, max_chars), once, "text={text} max={max_chars}");
            }
        }
    }

    #[test]
    fn preview_respects_length_bound() {
        let markup = "<article>".to_string() + &"word ".repeat(50) + "</article>";
        for max_chars in [0, 1, 5, 40, 100] {
            assert!(preview_of(&markup, max_chars).chars().count() <= max_chars + 3);
        }
    }

    #[test]
    fn preview_composes_strip_and_truncate() {
        assert_eq!(preview_of("<p>Hello&nbsp;&nbsp;world</p>", 5), "Hello...");
        assert_eq!(preview_of("short", 100), "short");
        assert_eq!(default_preview("<b>tiny</b>"), "tiny");
    }
}
