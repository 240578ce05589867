//! Small helpers over `kuchiki` nodes: id lookup, class lists, inline styles.
//!
//! Every helper is a no-op on non-element nodes.

use anyhow::anyhow;
use kuchiki::NodeRef;
use kuchiki::iter::NodeIterator as _;
use kuchiki::traits::TendrilSink as _;

pub fn parse_document(html: &str) -> NodeRef {
    kuchiki::parse_html().one(html)
}

pub fn serialize(node: &NodeRef) -> anyhow::Result<String> {
    let mut out = Vec::new();
    node.serialize(&mut out)?;
    Ok(String::from_utf8(out)?)
}

pub fn find_by_id(root: &NodeRef, id: &str) -> Option<NodeRef> {
    root.descendants()
        .elements()
        .find(|el| el.attributes.borrow().get("id") == Some(id))
        .map(|el| el.as_node().clone())
}

pub fn select_all(root: &NodeRef, selector: &str) -> anyhow::Result<Vec<NodeRef>> {
    let nodes = root
        .select(selector)
        .map_err(|()| anyhow!("invalid selector {selector:?}"))?;
    Ok(nodes.map(|n| n.as_node().clone()).collect())
}

pub fn select_first(root: &NodeRef, selector: &str) -> anyhow::Result<Option<NodeRef>> {
    let mut nodes = root
        .select(selector)
        .map_err(|()| anyhow!("invalid selector {selector:?}"))?;
    Ok(nodes.next().map(|n| n.as_node().clone()))
}

pub fn attr(node: &NodeRef, name: &str) -> Option<String> {
    let el = node.as_element()?;
    el.attributes.borrow().get(name).map(str::to_string)
}

pub fn set_attr(node: &NodeRef, name: &str, value: impl Into<String>) {
    if let Some(el) = node.as_element() {
        el.attributes.borrow_mut().insert(name, value.into());
    }
}

pub fn has_class(node: &NodeRef, class: &str) -> bool {
    attr(node, "class").is_some_and(|list| list.split_whitespace().any(|c| c == class))
}

pub fn add_class(node: &NodeRef, class: &str) {
    if node.as_element().is_none() || has_class(node, class) {
        return;
    }
    let mut list = attr(node, "class").unwrap_or_default();
    if !list.trim().is_empty() {
        list.push(' ');
    }
    list.push_str(class);
    set_attr(node, "class", list.trim_start().to_string());
}

pub fn remove_class(node: &NodeRef, class: &str) {
    let Some(list) = attr(node, "class") else {
        return;
    };
    let kept: Vec<_> = list.split_whitespace().filter(|c| *c != class).collect();
    set_attr(node, "class", kept.join(" "));
}

#[cfg(test)]
pub fn style(node: &NodeRef, property: &str) -> Option<String> {
    let inline = attr(node, "style")?;
    declarations(&inline)
        .into_iter()
        .find(|(p, _)| p.eq_ignore_ascii_case(property))
        .map(|(_, v)| v.to_string())
}

/// Sets one declaration of the inline `style`, replacing an existing one for
/// the same property and keeping the others in place.
pub fn set_style(node: &NodeRef, property: &str, value: &str) {
    if node.as_element().is_none() {
        return;
    }
    let inline = attr(node, "style").unwrap_or_default();
    let mut replaced = false;
    let mut parts: Vec<String> = declarations(&inline)
        .into_iter()
        .map(|(p, v)| {
            if p.eq_ignore_ascii_case(property) {
                replaced = true;
                format!("{property}: {value}")
            } else {
                format!("{p}: {v}")
            }
        })
        .collect();
    if !replaced {
        parts.push(format!("{property}: {value}"));
    }
    set_attr(node, "style", format!("{};", parts.join("; ")));
}

fn declarations(inline: &str) -> Vec<(&str, &str)> {
    inline
        .split(';')
        .filter_map(|decl| {
            let (p, v) = decl.split_once(':')?;
            let (p, v) = (p.trim(), v.trim());
            (!p.is_empty()).then_some((p, v))
        })
        .collect()
}
