//! Minimal CSS selector support for the mock document.
//!
//! Supports compound selectors (`tag`, `*`, `.class`, `#id`, `[attr]`,
//! `[attr=value]` with optional quotes) joined by the descendant combinator.
//! Anything else parses to a selector that matches nothing.

use super::MockNode;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
}

impl Compound {
    pub(crate) fn matches(&self, node: &MockNode) -> bool {
        if let Some(tag) = &self.tag {
            if !tag.eq_ignore_ascii_case(&node.tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if node.id.as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| node.classes.contains(c)) {
            return false;
        }
        self.attributes.iter().all(|(name, value)| {
            let actual = match name.as_str() {
                "id" => node.id.clone(),
                "class" => (!node.classes.is_empty()).then(|| node.classes.join(" ")),
                _ => node.attributes.get(name).cloned(),
            };
            match (actual, value) {
                (Some(_), None) => true,
                (Some(a), Some(v)) => &a == v,
                (None, _) => false,
            }
        })
    }
}

/// Parsed descendant chain, outermost compound first
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CssChain {
    pub(crate) compounds: Vec<Compound>,
}

pub(crate) fn parse(selector: &str) -> Option<CssChain> {
    let compounds = selector
        .split_whitespace()
        .map(parse_compound)
        .collect::<Option<Vec<_>>>()?;
    if compounds.is_empty() {
        return None;
    }
    Some(CssChain { compounds })
}

fn parse_compound(text: &str) -> Option<Compound> {
    let mut compound = Compound::default();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    let tag = take_ident(&chars, &mut i);
    if !tag.is_empty() {
        compound.tag = Some(tag);
    } else if chars.first() == Some(&'*') {
        i = 1;
    }

    while i < chars.len() {
        match chars[i] {
            '.' => {
                i += 1;
                let class = take_ident(&chars, &mut i);
                if class.is_empty() {
                    return None;
                }
                compound.classes.push(class);
            }
            '#' => {
                i += 1;
                let id = take_ident(&chars, &mut i);
                if id.is_empty() {
                    return None;
                }
                compound.id = Some(id);
            }
            '[' => {
                let end = chars[i..].iter().position(|c| *c == ']')? + i;
                let inner: String = chars[i + 1..end].iter().collect();
                compound.attributes.push(parse_attribute(&inner)?);
                i = end + 1;
            }
            _ => return None,
        }
    }
    Some(compound)
}

fn parse_attribute(inner: &str) -> Option<(String, Option<String>)> {
    match inner.split_once('=') {
        None => {
            let name = inner.trim();
            (!name.is_empty()).then(|| (name.to_string(), None))
        }
        Some((name, value)) => {
            let value = value.trim().trim_matches(|c| c == '\'' || c == '"');
            Some((name.trim().to_string(), Some(value.to_string())))
        }
    }
}

fn take_ident(chars: &[char], i: &mut usize) -> String {
    let start = *i;
    while *i < chars.len() && (chars[*i].is_alphanumeric() || chars[*i] == '-' || chars[*i] == '_') {
        *i += 1;
    }
    chars[start..*i].iter().collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compound() {
        let chain = parse("li.item.sale#first[data-id='7']").unwrap();
        assert_eq!(chain.compounds.len(), 1);
        let node = MockNode::new("li")
            .class("item")
            .class("sale")
            .id("first")
            .attr("data-id", "7");
        assert!(chain.compounds[0].matches(&node));
        assert!(!chain.compounds[0].matches(&MockNode::new("li").class("item")));
    }

    #[test]
    fn test_parse_descendant_chain() {
        let chain = parse("ul.catalog  .name").unwrap();
        assert_eq!(chain.compounds.len(), 2);
    }

    #[test]
    fn test_universal_and_attribute_presence() {
        let chain = parse("*[disabled]").unwrap();
        assert!(chain.compounds[0].matches(&MockNode::new("button").attr("disabled", "")));
        assert!(!chain.compounds[0].matches(&MockNode::new("button")));
    }

    #[test]
    fn test_unsupported_syntax() {
        assert!(parse("ul > li").is_none());
        assert!(parse("a:hover").is_none());
        assert!(parse("").is_none());
    }
}
