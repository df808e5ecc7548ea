//! Ordered sibling traversal over mixed text and element nodes.
//!
//! APOD pages carry most of their content as loose text interleaved with
//! inline elements rather than inside dedicated containers. The extractors
//! therefore walk the siblings that follow a bold label, classifying each
//! node as text, element, or comment, and stop at a boundary predicate.

use std::borrow::Cow;
use std::ops::Deref;

use scraper::{ElementRef, Node};

use crate::parse::Element;

type NodeRef<'a> = <ElementRef<'a> as Deref>::Target;

/// A single node in an ordered child list.
#[derive(Debug, Clone)]
pub enum DomNode<'a> {
    /// A text node.
    Text(&'a str),
    /// An element node.
    Element(Element<'a>),
    /// A comment node. Its data counts as text content for boundary checks
    /// but it is never part of extracted output.
    Comment(&'a str),
    /// Doctype, processing instruction, and other node kinds.
    Other,
}

impl<'a> DomNode<'a> {
    fn classify(node: NodeRef<'a>) -> Self {
        match node.value() {
            Node::Text(text) => DomNode::Text(&**text),
            Node::Comment(comment) => DomNode::Comment(&**comment),
            Node::Element(_) => ElementRef::wrap(node).map_or(DomNode::Other, |el| DomNode::Element(el.into())),
            _ => DomNode::Other,
        }
    }

    /// Text content of the node, matching the DOM `textContent` property.
    pub fn text_content(&self) -> Cow<'a, str> {
        match self {
            DomNode::Text(text) | DomNode::Comment(text) => Cow::Borrowed(*text),
            DomNode::Element(el) => Cow::Owned(el.text()),
            DomNode::Other => Cow::Borrowed(""),
        }
    }

    /// Returns the element when this node is one.
    pub fn as_element(&self) -> Option<&Element<'a>> {
        match self {
            DomNode::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Checks whether this node is an element with the given tag.
    pub fn is_element(&self, tag: &str) -> bool {
        self.as_element().is_some_and(|el| el.is(tag))
    }
}

/// Iterates the direct children of an element in document order.
pub fn child_nodes<'a>(parent: &Element<'a>) -> impl Iterator<Item = DomNode<'a>> + 'a {
    parent.element_ref().children().map(DomNode::classify)
}

/// Iterates the siblings that follow an element, in document order.
///
/// This is the same run of nodes as the parent's child list after the
/// element's own position.
pub fn following_siblings<'a>(start: &Element<'a>) -> impl Iterator<Item = DomNode<'a>> + 'a {
    start.element_ref().next_siblings().map(DomNode::classify)
}

/// Walks the siblings after `start`, stopping before the first node that satisfies `stop`.
///
/// # Example
///
/// ```rust
/// use apod_core::dom_tree::walk_siblings;
/// use apod_core::parse::Document;
///
/// let doc = Document::parse("<p><b>Label:</b> one <i>two</i> <br> three</p>").unwrap();
/// let label = doc.select_first("b").unwrap().unwrap();
/// let text: String = walk_siblings(&label, |node| node.is_element("br"))
///     .map(|node| node.text_content().into_owned())
///     .collect();
/// assert_eq!(text, " one two ");
/// ```
pub fn walk_siblings<'a, P>(start: &Element<'a>, mut stop: P) -> impl Iterator<Item = DomNode<'a>> + 'a
where
    P: FnMut(&DomNode<'a>) -> bool + 'a,
{
    following_siblings(start).take_while(move |node| !stop(node))
}
