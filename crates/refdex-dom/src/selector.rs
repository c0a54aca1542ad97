//! A small CSS-like selector engine.
//!
//! Supports comma-separated lists of compound selectors, where a compound
//! selector is an optional tag name (or `*`) followed by any number of
//! `#id`, `.class`, `[attr]` and `[attr=value]` simple selectors. This is
//! the subset the indexing layer needs for eligibility filtering; callers
//! that hand in anything else get a parse error, which the public matching
//! entry points downgrade to "matches nothing".

use crate::element::Element;
use crate::error::SelectorError;

/// A parsed selector list (`a, b, c`). An element matches the list when it
/// matches any item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    items: Vec<Compound>,
}

/// One compound selector: `tag#id.class[attr=value]...`
#[derive(Debug, Clone, PartialEq, Eq)]
struct Compound {
    /// Tag name constraint; `None` means any tag (including explicit `*`)
    tag: Option<String>,
    parts: Vec<Simple>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Simple {
    /// `#name` - matches the `id` attribute exactly
    Id(String),
    /// `.name` - matches one whitespace-separated token of `class`
    Class(String),
    /// `[attr]` - attribute present
    Has(String),
    /// `[attr=value]` - attribute equals value
    Equals(String, String),
}

impl SelectorList {
    /// Parse a selector list. Empty list items are rejected.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        if input.trim().is_empty() {
            return Err(SelectorError::Empty);
        }

        let mut items = Vec::new();
        for item in input.split(',') {
            let item = item.trim();
            if item.is_empty() {
                return Err(SelectorError::Empty);
            }
            items.push(parse_compound(item)?);
        }

        Ok(Self { items })
    }

    /// Whether the element matches any item in the list.
    pub fn matches(&self, element: &Element) -> bool {
        self.items.iter().any(|c| c.matches(element))
    }
}

impl Compound {
    fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if element.tag() != *tag {
                return false;
            }
        }

        self.parts.iter().all(|part| match part {
            Simple::Id(id) => element.attribute("id").as_deref() == Some(id),
            Simple::Class(class) => element
                .attribute("class")
                .map(|v| v.split_whitespace().any(|t| t == class))
                .unwrap_or(false),
            Simple::Has(attr) => element.attribute(attr).is_some(),
            Simple::Equals(attr, value) => element.attribute(attr).as_deref() == Some(value),
        })
    }
}

fn parse_compound(input: &str) -> Result<Compound, SelectorError> {
    let mut chars = input.char_indices().peekable();
    let mut tag = None;

    // Leading tag name or universal selector
    if let Some(&(_, c)) = chars.peek() {
        if c == '*' {
            chars.next();
        } else if is_name_char(c) {
            let name = consume_name(input, &mut chars);
            tag = Some(name);
        }
    }

    let mut parts = Vec::new();
    while let Some(&(pos, c)) = chars.peek() {
        match c {
            '#' | '.' => {
                chars.next();
                let name = consume_name(input, &mut chars);
                if name.is_empty() {
                    return Err(SelectorError::MissingName {
                        prefix: c,
                        input: input.to_string(),
                    });
                }
                parts.push(if c == '#' {
                    Simple::Id(name)
                } else {
                    Simple::Class(name)
                });
            }
            '[' => {
                chars.next();
                let rest = &input[pos..];
                let close = rest
                    .find(']')
                    .ok_or_else(|| SelectorError::UnclosedAttribute(input.to_string()))?;
                let body = &rest[1..close];
                parts.push(parse_attribute(body, input)?);
                // Skip past the body and the closing bracket
                while let Some(&(p, _)) = chars.peek() {
                    if p > pos + close {
                        break;
                    }
                    chars.next();
                }
            }
            _ => {
                return Err(SelectorError::UnexpectedChar {
                    found: c,
                    input: input.to_string(),
                });
            }
        }
    }

    if tag.is_none() && parts.is_empty() {
        return Err(SelectorError::Empty);
    }

    Ok(Compound { tag, parts })
}

fn parse_attribute(body: &str, input: &str) -> Result<Simple, SelectorError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(SelectorError::MissingName {
            prefix: '[',
            input: input.to_string(),
        });
    }

    match body.split_once('=') {
        None => Ok(Simple::Has(body.to_string())),
        Some((attr, value)) => {
            let attr = attr.trim();
            if attr.is_empty() {
                return Err(SelectorError::MissingName {
                    prefix: '[',
                    input: input.to_string(),
                });
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            Ok(Simple::Equals(attr.to_string(), value.to_string()))
        }
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn consume_name(
    input: &str,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> String {
    let mut name = String::new();
    while let Some(&(pos, c)) = chars.peek() {
        if is_name_char(c) {
            name.push_str(&input[pos..pos + c.len_utf8()]);
            chars.next();
        } else {
            break;
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;

    fn parse(input: &str) -> SelectorList {
        SelectorList::parse(input).unwrap()
    }

    #[test]
    fn test_parse_attribute_presence() {
        let list = parse("[data-ref]");
        let el = Element::new("div");
        assert!(!list.matches(&el));

        el.set_attribute("data-ref", "header");
        assert!(list.matches(&el));
    }

    #[test]
    fn test_parse_selector_list() {
        let list = parse("[data-ref], [data-ref-array], [id]");
        let el = Element::new("div");
        assert!(!list.matches(&el));

        el.set_attribute("id", "main");
        assert!(list.matches(&el));
    }

    #[test]
    fn test_tag_and_attribute_compound() {
        let list = parse("div[data-ref=x]");

        let div = Element::new("div");
        div.set_attribute("data-ref", "x");
        assert!(list.matches(&div));

        let span = Element::new("span");
        span.set_attribute("data-ref", "x");
        assert!(!list.matches(&span));

        let wrong_value = Element::new("div");
        wrong_value.set_attribute("data-ref", "y");
        assert!(!list.matches(&wrong_value));
    }

    #[test]
    fn test_id_and_class_selectors() {
        let el = Element::new("div");
        el.set_attribute("id", "main");
        el.set_attribute("class", "card active");

        assert!(parse("#main").matches(&el));
        assert!(!parse("#other").matches(&el));
        assert!(parse(".active").matches(&el));
        assert!(!parse(".inactive").matches(&el));
        assert!(parse("div#main.card").matches(&el));
    }

    #[test]
    fn test_quoted_attribute_value() {
        let el = Element::new("div");
        el.set_attribute("data-ref", "a b");
        assert!(parse("[data-ref=\"a b\"]").matches(&el));
        assert!(parse("[data-ref='a b']").matches(&el));
    }

    #[test]
    fn test_universal_selector() {
        let el = Element::new("anything");
        assert!(parse("*").matches(&el));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(SelectorList::parse(""), Err(SelectorError::Empty));
        assert_eq!(SelectorList::parse("   "), Err(SelectorError::Empty));
        assert_eq!(SelectorList::parse("a,,b"), Err(SelectorError::Empty));
        assert!(matches!(
            SelectorList::parse("[data-ref"),
            Err(SelectorError::UnclosedAttribute(_))
        ));
        assert!(matches!(
            SelectorList::parse("div#"),
            Err(SelectorError::MissingName { prefix: '#', .. })
        ));
        assert!(matches!(
            SelectorList::parse("div > span"),
            Err(SelectorError::UnexpectedChar { .. })
        ));
    }
}
