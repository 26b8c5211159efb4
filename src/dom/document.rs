use std::collections::BTreeMap;

use crate::error::AnnotationError;

use super::{BoundaryPoint, RangeAnchor};

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    Element(Element),
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(value.into())
    }

    pub fn text_content(&self) -> String {
        match self {
            Node::Text(value) => value.clone(),
            Node::Element(element) => element.text_content(),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_text(self, value: impl Into<String>) -> Self {
        self.with_child(Node::text(value))
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|value| value.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn text_content(&self) -> String {
        self.children.iter().map(Node::text_content).collect()
    }

    fn collect_by_class<'a>(&'a self, class: &str, out: &mut Vec<&'a Element>) {
        if self.has_class(class) {
            out.push(self);
        }
        for child in &self.children {
            if let Node::Element(element) = child {
                element.collect_by_class(class, out);
            }
        }
    }

    fn collect_text_nodes<'a>(
        &'a self,
        prefix: &mut Vec<usize>,
        out: &mut Vec<(Vec<usize>, &'a str)>,
    ) {
        for (index, child) in self.children.iter().enumerate() {
            prefix.push(index);
            match child {
                Node::Text(value) => out.push((prefix.clone(), value.as_str())),
                Node::Element(element) => element.collect_text_nodes(prefix, out),
            }
            prefix.pop();
        }
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::text(value)
    }
}

/// Minimal document tree: a body element and its descendants.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub body: Element,
}

impl Document {
    pub fn new(body: Element) -> Self {
        Self { body }
    }

    pub fn text_content(&self) -> String {
        self.body.text_content()
    }

    pub fn node_at(&self, path: &[usize]) -> Option<&Node> {
        let (last, parents) = path.split_last()?;
        let mut current = &self.body;
        for index in parents {
            match current.children.get(*index)? {
                Node::Element(element) => current = element,
                Node::Text(_) => return None,
            }
        }
        current.children.get(*last)
    }

    fn element_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut current = &mut self.body;
        for index in path {
            match current.children.get_mut(*index)? {
                Node::Element(element) => current = element,
                Node::Text(_) => return None,
            }
        }
        Some(current)
    }

    pub fn elements_with_class(&self, class: &str) -> Vec<&Element> {
        let mut out = Vec::new();
        self.body.collect_by_class(class, &mut out);
        out
    }

    /// Anchor covering the first occurrence of `needle` inside a single text node.
    pub fn find_text(&self, needle: &str) -> Option<RangeAnchor> {
        if needle.is_empty() {
            return None;
        }
        self.text_nodes().into_iter().find_map(|(path, value)| {
            let byte_start = value.find(needle)?;
            let start = value[..byte_start].chars().count();
            let end = start + needle.chars().count();
            Some(RangeAnchor::new(
                BoundaryPoint::new(path.clone(), start),
                BoundaryPoint::new(path, end),
            ))
        })
    }

    /// Text covered by `anchor`, in document order.
    pub fn range_text(&self, anchor: &RangeAnchor) -> Result<String, AnnotationError> {
        self.validate(anchor)?;
        let mut out = String::new();
        for (path, value) in self.text_nodes() {
            if path < anchor.start.path || path > anchor.end.path {
                continue;
            }
            let from = if path == anchor.start.path {
                anchor.start.offset
            } else {
                0
            };
            let to = if path == anchor.end.path {
                anchor.end.offset
            } else {
                value.chars().count()
            };
            out.push_str(char_slice(value, from, to));
        }
        Ok(out)
    }

    /// Move the anchored content into `wrapper` and put the wrapper in its place.
    ///
    /// Only ranges whose boundary text nodes share a parent can be wrapped;
    /// anything else partially selects an element and is rejected before the
    /// tree is touched.
    pub fn surround_contents(
        &mut self,
        anchor: &RangeAnchor,
        mut wrapper: Element,
    ) -> Result<(), AnnotationError> {
        self.validate(anchor)?;
        if anchor.is_collapsed() {
            return Err(AnnotationError::Collapsed);
        }

        let (start_index, parent_path) = split_path(&anchor.start.path)?;
        let (end_index, end_parent) = split_path(&anchor.end.path)?;
        if parent_path != end_parent {
            return Err(AnnotationError::CrossesBoundary);
        }

        let parent = self
            .element_mut(parent_path)
            .ok_or_else(|| AnnotationError::StaleAnchor("parent element missing".into()))?;

        let removed: Vec<Node> = parent.children.drain(start_index..=end_index).collect();
        let mut replacement = Vec::with_capacity(3);

        if start_index == end_index {
            let text = text_of(&removed[0]);
            push_text(&mut replacement, char_slice(text, 0, anchor.start.offset));
            push_text(
                &mut wrapper.children,
                char_slice(text, anchor.start.offset, anchor.end.offset),
            );
            replacement.push(Node::Element(wrapper));
            push_text(&mut replacement, char_slice(text, anchor.end.offset, usize::MAX));
        } else {
            let last = removed.len() - 1;
            let first_text = text_of(&removed[0]);
            let last_text = text_of(&removed[last]);

            push_text(&mut replacement, char_slice(first_text, 0, anchor.start.offset));
            push_text(
                &mut wrapper.children,
                char_slice(first_text, anchor.start.offset, usize::MAX),
            );
            wrapper.children.extend(removed[1..last].iter().cloned());
            push_text(&mut wrapper.children, char_slice(last_text, 0, anchor.end.offset));
            replacement.push(Node::Element(wrapper));
            push_text(&mut replacement, char_slice(last_text, anchor.end.offset, usize::MAX));
        }

        let tail = parent.children.split_off(start_index);
        parent.children.extend(replacement);
        parent.children.extend(tail);
        Ok(())
    }

    fn text_nodes(&self) -> Vec<(Vec<usize>, &str)> {
        let mut out = Vec::new();
        self.body.collect_text_nodes(&mut Vec::new(), &mut out);
        out
    }

    fn validate(&self, anchor: &RangeAnchor) -> Result<(), AnnotationError> {
        for point in [&anchor.start, &anchor.end] {
            match self.node_at(&point.path) {
                Some(Node::Text(value)) => {
                    if point.offset > value.chars().count() {
                        return Err(AnnotationError::StaleAnchor(format!(
                            "offset {} past end of text node {:?}",
                            point.offset, point.path
                        )));
                    }
                }
                Some(Node::Element(_)) => {
                    return Err(AnnotationError::StaleAnchor(format!(
                        "boundary {:?} is not a text node",
                        point.path
                    )))
                }
                None => {
                    return Err(AnnotationError::StaleAnchor(format!(
                        "no node at {:?}",
                        point.path
                    )))
                }
            }
        }
        if anchor.start > anchor.end {
            return Err(AnnotationError::StaleAnchor("range end precedes start".into()));
        }
        Ok(())
    }
}

fn split_path(path: &[usize]) -> Result<(usize, &[usize]), AnnotationError> {
    path.split_last()
        .map(|(last, parent)| (*last, parent))
        .ok_or_else(|| AnnotationError::StaleAnchor("empty path".into()))
}

fn text_of(node: &Node) -> &str {
    match node {
        Node::Text(value) => value,
        Node::Element(_) => "",
    }
}

fn push_text(nodes: &mut Vec<Node>, value: &str) {
    if !value.is_empty() {
        nodes.push(Node::text(value));
    }
}

/// Slice by character positions, clamping `to` to the end of the string.
fn char_slice(value: &str, from: usize, to: usize) -> &str {
    let byte_at = |chars: usize| {
        value
            .char_indices()
            .nth(chars)
            .map(|(index, _)| index)
            .unwrap_or(value.len())
    };
    let start = byte_at(from);
    let end = byte_at(to).max(start);
    &value[start..end]
}
