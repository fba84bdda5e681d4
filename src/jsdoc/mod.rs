//! JSDoc block parsing.
//!
//! A block is a free-text description followed by tags of the form
//! `@tag {type} name description`. A bracketed name (`[name=default]`) marks the
//! entry optional and may carry a default. A leading `- ` before the
//! description is dropped.

mod attach;
mod decorate;

pub use attach::{attachment_target, parse_jsdoc_for};
pub use decorate::{
    apply_common, apply_field_tags, apply_type, has_ignore, parameters_with_docs, return_info,
    Documented,
};

use phf::phf_set;

/// Tags whose text is all description (no name token).
static DESCRIPTION_ONLY_TAGS: phf::Set<&'static str> = phf_set! {
    "returns", "return", "summary", "deprecated", "default", "type", "example",
    "since", "see", "readonly", "reflect", "public", "private", "protected",
    "ignore", "internal", "description", "desc",
};

/// One `@tag` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsDocTag {
    /// Tag name without `@`.
    pub tag: String,
    /// Empty for description-only tags and unnamed entries (e.g. the default slot).
    pub name: String,
    pub type_text: Option<String>,
    pub description: String,
    pub optional: bool,
    pub default: Option<String>,
}

impl JsDocTag {
    /// Case-insensitive tag comparison.
    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }
}

/// One parsed `/** ... */` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsDocBlock {
    pub description: String,
    pub tags: Vec<JsDocTag>,
}

impl JsDocBlock {
    pub fn tags_named<'a>(&'a self, names: &'a [&'a str]) -> impl Iterator<Item = &'a JsDocTag> {
        self.tags
            .iter()
            .filter(move |t| names.iter().any(|n| t.is(n)))
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.is(name))
    }
}

/// Parse a raw comment. Returns `None` unless it is a `/** */` block.
pub fn parse_comment(raw: &str) -> Option<JsDocBlock> {
    let body = raw.trim().strip_prefix("/**")?.strip_suffix("*/")?;

    let lines = body.lines().map(|line| {
        let line = line.trim_start();
        let line = line.strip_prefix('*').unwrap_or(line);
        let line = line.strip_prefix(' ').unwrap_or(line);
        line.trim_end()
    });

    let mut description: Vec<&str> = Vec::new();
    let mut tag_texts: Vec<String> = Vec::new();
    for line in lines {
        if line.starts_with('@') {
            tag_texts.push(line.to_string());
        } else if let Some(current) = tag_texts.last_mut() {
            current.push('\n');
            current.push_str(line);
        } else {
            description.push(line);
        }
    }

    Some(JsDocBlock {
        description: description.join("\n").trim().to_string(),
        tags: tag_texts.iter().filter_map(|t| parse_tag(t)).collect(),
    })
}

/// Split off a balanced `{...}` group at the start of `text`.
fn take_braced(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix('{')?;
    let mut depth = 1usize;
    for (i, c) in rest.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((rest[..i].trim(), &rest[i + 1..]));
                }
            }
            _ => {}
        }
    }
    None
}

/// Split off a balanced `[...]` group at the start of `text`.
fn take_bracketed(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix('[')?;
    let mut depth = 1usize;
    for (i, c) in rest.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&rest[..i], &rest[i + 1..]));
                }
            }
            _ => {}
        }
    }
    None
}

fn strip_dash(text: &str) -> String {
    let text = text.trim();
    match text.strip_prefix('-') {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => {
            rest.trim().to_string()
        }
        _ => text.to_string(),
    }
}

fn parse_tag(text: &str) -> Option<JsDocTag> {
    let text = text.strip_prefix('@')?;
    let tag_end = text.find(char::is_whitespace).unwrap_or(text.len());
    let tag = &text[..tag_end];
    if tag.is_empty() {
        return None;
    }
    let mut rest = text[tag_end..].trim_start();

    let mut entry = JsDocTag {
        tag: tag.to_string(),
        ..Default::default()
    };

    if let Some((type_text, after)) = take_braced(rest) {
        entry.type_text = Some(type_text.to_string()).filter(|t| !t.is_empty());
        rest = after.trim_start();
    }

    if DESCRIPTION_ONLY_TAGS.contains(tag.to_ascii_lowercase().as_str()) {
        entry.description = strip_dash(rest);
        return Some(entry);
    }

    if let Some((inner, after)) = take_bracketed(rest) {
        entry.optional = true;
        match inner.split_once('=') {
            Some((name, default)) => {
                entry.name = name.trim().to_string();
                entry.default = Some(default.trim().to_string());
            }
            None => entry.name = inner.trim().to_string(),
        }
        entry.description = strip_dash(after);
        return Some(entry);
    }

    let name_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let name = &rest[..name_end];
    let after = &rest[name_end..];
    if name == "-" {
        // `@slot - description` documents the unnamed slot.
        entry.description = after.trim().to_string();
    } else {
        entry.name = name.to_string();
        entry.description = strip_dash(after);
    }
    Some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_and_tags() {
        let block = parse_comment(
            "/**\n * A button.\n * Second line.\n *\n * @attr {boolean} disabled - Disables it\n * @slot - Default content\n * @fires change\n */",
        )
        .unwrap();
        assert_eq!(block.description, "A button.\nSecond line.");
        assert_eq!(block.tags.len(), 3);

        let attr = &block.tags[0];
        assert_eq!(attr.tag, "attr");
        assert_eq!(attr.type_text.as_deref(), Some("boolean"));
        assert_eq!(attr.name, "disabled");
        assert_eq!(attr.description, "Disables it");

        let slot = &block.tags[1];
        assert_eq!(slot.name, "");
        assert_eq!(slot.description, "Default content");

        assert_eq!(block.tags[2].name, "change");
        assert_eq!(block.tags[2].description, "");
    }

    #[test]
    fn test_optional_name_with_default() {
        let block = parse_comment("/** @cssprop [--color=red] - Text color */").unwrap();
        let tag = &block.tags[0];
        assert!(tag.optional);
        assert_eq!(tag.name, "--color");
        assert_eq!(tag.default.as_deref(), Some("red"));
        assert_eq!(tag.description, "Text color");
    }

    #[test]
    fn test_description_only_tags() {
        let block = parse_comment(
            "/**\n * @type {string}\n * @deprecated use other\n * @summary Short\n * @returns {number} the count\n */",
        )
        .unwrap();
        assert_eq!(block.tags[0].type_text.as_deref(), Some("string"));
        assert_eq!(block.tags[0].name, "");
        assert_eq!(block.tags[1].description, "use other");
        assert_eq!(block.tags[2].description, "Short");
        assert_eq!(block.tags[3].type_text.as_deref(), Some("number"));
        assert_eq!(block.tags[3].description, "the count");
    }

    #[test]
    fn test_nested_braces_in_type() {
        let block = parse_comment("/** @param {{a: string}} opts options */").unwrap();
        assert_eq!(block.tags[0].type_text.as_deref(), Some("{a: string}"));
        assert_eq!(block.tags[0].name, "opts");
    }

    #[test]
    fn test_multiline_tag_description() {
        let block = parse_comment("/**\n * @fires my-event - first\n *   continued\n */").unwrap();
        assert_eq!(block.tags[0].description, "first\n  continued");
    }

    #[test]
    fn test_non_jsdoc_is_rejected() {
        assert!(parse_comment("/* plain */").is_none());
        assert!(parse_comment("// line").is_none());
    }

    #[test]
    fn test_tag_lookup_is_case_insensitive() {
        let block = parse_comment("/** @cssProp --gap */").unwrap();
        assert!(block.has_tag("cssprop"));
        assert_eq!(block.tags_named(&["cssprop", "cssproperty"]).count(), 1);
    }
}
