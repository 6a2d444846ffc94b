//! Joins selected prefix prompts, a free-text body and selected suffix prompts
//! into one string.

use serde::{Deserialize, Serialize};

use crate::prompt::Prompt;

/// Ellipsis appended to truncated previews.
pub const ELLIPSIS: char = '…';

/// Which separator is active, without the custom text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeparatorKind {
    #[default]
    Newline,
    Space,
    BlankLine,
    Custom,
}

impl SeparatorKind {
    pub const ALL: [SeparatorKind; 4] = [
        SeparatorKind::Newline,
        SeparatorKind::Space,
        SeparatorKind::BlankLine,
        SeparatorKind::Custom,
    ];

    pub fn next(self) -> Self {
        match self {
            Self::Newline => Self::Space,
            Self::Space => Self::BlankLine,
            Self::BlankLine => Self::Custom,
            Self::Custom => Self::Newline,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Newline => "New Line (\\n)",
            Self::Space => "Space",
            Self::BlankLine => "Blank Line (\\n\\n)",
            Self::Custom => "Custom",
        }
    }

    /// Pairs the kind with the text used when it is `Custom`.
    pub fn with_custom(self, custom: &str) -> Separator {
        match self {
            Self::Newline => Separator::Newline,
            Self::Space => Separator::Space,
            Self::BlankLine => Separator::BlankLine,
            Self::Custom => Separator::Custom(custom.to_string()),
        }
    }
}

/// How composed parts are joined.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Separator {
    #[default]
    Newline,
    Space,
    BlankLine,
    Custom(String),
}

impl Separator {
    pub fn as_str(&self) -> &str {
        match self {
            Separator::Newline => "\n",
            Separator::Space => " ",
            Separator::BlankLine => "\n\n",
            Separator::Custom(s) => s,
        }
    }

    pub fn kind(&self) -> SeparatorKind {
        match self {
            Separator::Newline => SeparatorKind::Newline,
            Separator::Space => SeparatorKind::Space,
            Separator::BlankLine => SeparatorKind::BlankLine,
            Separator::Custom(_) => SeparatorKind::Custom,
        }
    }
}

/// Joins prefixes, body and suffixes in that order.
///
/// Parts whose content is blank (empty or whitespace only) are dropped
/// entirely, so they never produce a stray separator. Returns an empty string
/// when nothing is left.
pub fn compose(prefixes: &[Prompt], body: &str, suffixes: &[Prompt], separator: &Separator) -> String {
    let mut parts: Vec<&str> = Vec::new();

    parts.extend(contributing(prefixes).map(|p| p.content.as_str()));
    if !body.trim().is_empty() {
        parts.push(body);
    }
    parts.extend(contributing(suffixes).map(|p| p.content.as_str()));

    parts.join(separator.as_str())
}

/// The prompts whose content ends up in a composition.
pub fn contributing(prompts: &[Prompt]) -> impl Iterator<Item = &Prompt> {
    prompts.iter().filter(|p| !p.content.trim().is_empty())
}

/// [`compose`], cut to `max_chars` characters plus [`ELLIPSIS`] when longer.
pub fn preview(
    prefixes: &[Prompt],
    body: &str,
    suffixes: &[Prompt],
    separator: &Separator,
    max_chars: usize,
) -> String {
    truncate_chars(&compose(prefixes, body, suffixes, separator), max_chars)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => {
            let mut out = text[..cut].to_string();
            out.push(ELLIPSIS);
            out
        }
    }
}

/// Describes what went into a composition, e.g. `2 prefixes + body + 1 suffix`.
pub fn summary(prefix_count: usize, has_body: bool, suffix_count: usize) -> String {
    let mut parts = Vec::new();
    if prefix_count > 0 {
        let noun = if prefix_count > 1 { "prefixes" } else { "prefix" };
        parts.push(format!("{} {}", prefix_count, noun));
    }
    if has_body {
        parts.push("body".to_string());
    }
    if suffix_count > 0 {
        let noun = if suffix_count > 1 { "suffixes" } else { "suffix" };
        parts.push(format!("{} {}", suffix_count, noun));
    }
    parts.join(" + ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::PromptRole;

    fn frag(content: &str) -> Prompt {
        Prompt::create("frag", content, PromptRole::Prefix, "").unwrap()
    }

    #[test]
    fn test_blank_prefix_dropped() {
        let out = compose(&[frag("Hello"), frag("  ")], "World", &[], &Separator::Newline);
        assert_eq!(out, "Hello\nWorld");
    }

    #[test]
    fn test_everything_empty() {
        assert_eq!(compose(&[], "", &[], &Separator::Space), "");
        assert_eq!(compose(&[frag(" \n ")], "\t", &[frag("")], &Separator::Space), "");
    }

    #[test]
    fn test_order_prefixes_body_suffixes() {
        let out = compose(
            &[frag("p1"), frag("p2")],
            "body",
            &[frag("s1"), frag("s2")],
            &Separator::Space,
        );
        assert_eq!(out, "p1 p2 body s1 s2");
    }

    #[test]
    fn test_blank_body_dropped() {
        let out = compose(&[frag("a")], "   ", &[frag("z")], &Separator::BlankLine);
        assert_eq!(out, "a\n\nz");
    }

    #[test]
    fn test_custom_separator() {
        let sep = SeparatorKind::Custom.with_custom(" | ");
        assert_eq!(compose(&[frag("a")], "b", &[frag("c")], &sep), "a | b | c");
    }

    #[test]
    fn test_content_kept_verbatim() {
        // Non-blank parts are not trimmed.
        let out = compose(&[frag("  indented")], "body\n", &[], &Separator::Newline);
        assert_eq!(out, "  indented\nbody\n");
    }

    #[test]
    fn test_preview_short_text_untouched() {
        assert_eq!(preview(&[], "short", &[], &Separator::Newline, 10), "short");
        assert_eq!(preview(&[], "exactly10!", &[], &Separator::Newline, 10), "exactly10!");
    }

    #[test]
    fn test_preview_truncates_with_ellipsis() {
        let out = preview(&[frag("abcdef")], "ghij", &[], &Separator::Space, 4);
        assert_eq!(out, "abcd…");
        assert_eq!(out.chars().count(), 5);
    }

    #[test]
    fn test_preview_counts_chars_not_bytes() {
        let out = preview(&[], "ééééé", &[], &Separator::Newline, 3);
        assert_eq!(out, "ééé…");
    }

    #[test]
    fn test_separator_kind_cycle() {
        let mut kind = SeparatorKind::Newline;
        for _ in 0..SeparatorKind::ALL.len() {
            kind = kind.next();
        }
        assert_eq!(kind, SeparatorKind::Newline);
        assert_eq!(SeparatorKind::BlankLine.with_custom("x").as_str(), "\n\n");
        assert_eq!(SeparatorKind::Custom.with_custom("x").kind(), SeparatorKind::Custom);
    }

    #[test]
    fn test_summary() {
        assert_eq!(summary(2, true, 1), "2 prefixes + body + 1 suffix");
        assert_eq!(summary(1, false, 3), "1 prefix + 3 suffixes");
        assert_eq!(summary(0, true, 0), "body");
        assert_eq!(summary(0, false, 0), "");
    }
}
