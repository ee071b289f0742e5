//! The output tree.
//!
//! A [`Dom`] owns every node it contains through its [`NodeArena`]. Nodes link
//! to their parent and siblings by [`NodeId`], so appending a child never
//! allocates beyond the node itself. Dropping the `Dom` releases the whole tree
//! block by block.

use crate::arena::{NodeArena, NodeId};
use crate::tag::Tag;
use std::borrow::Cow;
use std::ops::{Index, IndexMut};

/// One `name="value"` pair. Duplicates are kept, in source order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementData {
    /// Canonical spelling for known tags, the folded source name otherwise.
    pub name: Cow<'static, str>,
    /// `None` for names the tag table does not know.
    pub tag: Option<Tag>,
    pub attributes: Vec<Attribute>,
    /// Written as `<name/>` in the source.
    pub self_closing: bool,
}

impl ElementData {
    pub fn new(name: Cow<'static, str>, tag: Option<Tag>) -> Self {
        Self {
            name,
            tag,
            attributes: Vec::new(),
            self_closing: false,
        }
    }

    /// Value of the first attribute called `name`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Whether a close tag with this identity closes the element.
    ///
    /// Known tags compare by identity, unknown tags by folded spelling.
    pub fn is_closed_by(&self, tag: Option<Tag>, folded: &[u8]) -> bool {
        match (self.tag, tag) {
            (Some(open), Some(close)) => open == close,
            (None, None) => String::from_utf8_lossy(folded) == self.name,
            _ => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text(String),
    Comment(String),
    Doctype(String),
}

#[derive(Debug)]
pub struct Node {
    pub data: NodeData,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
}

impl Node {
    pub(crate) fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }

    pub fn last_child(&self) -> Option<NodeId> {
        self.last_child
    }

    pub fn prev_sibling(&self) -> Option<NodeId> {
        self.prev_sibling
    }

    pub fn next_sibling(&self) -> Option<NodeId> {
        self.next_sibling
    }

    pub fn element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }
}

/// A node tree rooted at a document node.
#[derive(Debug)]
pub struct Dom {
    arena: NodeArena,
    root: NodeId,
}

impl Dom {
    pub fn new() -> Self {
        let mut arena = NodeArena::new();
        let (root, _) = arena.new_node(NodeData::Document);
        Self { arena, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.arena.get_mut(id)
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id)?.element()
    }

    /// Allocate a detached node. Attach it with [`Dom::append_child`].
    pub fn new_node(&mut self, data: NodeData) -> NodeId {
        self.arena.new_node(data).0
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// # Panics
    /// If `child` is already attached, is the root, or is `parent` itself.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        assert!(parent != child, "cannot append {child:?} to itself");
        assert!(child != self.root, "cannot append the document root");
        let node = &self[child];
        assert!(
            node.parent.is_none() && node.prev_sibling.is_none() && node.next_sibling.is_none(),
            "{child:?} is already attached"
        );

        let last = self[parent].last_child;
        let node = &mut self[child];
        node.parent = Some(parent);
        node.prev_sibling = last;
        match last {
            Some(last) => self[last].next_sibling = Some(child),
            None => self[parent].first_child = Some(child),
        }
        self[parent].last_child = Some(child);
    }

    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            dom: self,
            next: self[id].first_child,
        }
    }

    /// Pre-order walk over everything below `id`, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            dom: self,
            top: id,
            next: self[id].first_child,
        }
    }

    /// Concatenated text of every text node below `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            if let NodeData::Text(text) = &self[node].data {
                out.push_str(text);
            }
        }
        out
    }

    /// Number of allocated nodes, attached or not, including the root.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Verify the parent/sibling links of every node.
    #[cfg(any(test, feature = "parser_invariants"))]
    pub fn check_invariants(&self) -> Result<(), String> {
        for (id, node) in self.arena.iter() {
            let mut prev = None;
            let mut child = node.first_child;
            while let Some(c) = child {
                let n = self
                    .get(c)
                    .ok_or_else(|| format!("{id:?} links to missing child {c:?}"))?;
                if n.parent != Some(id) {
                    return Err(format!("{c:?} is a child of {id:?} but names {:?}", n.parent));
                }
                if n.prev_sibling != prev {
                    return Err(format!("{c:?} has a broken prev_sibling link"));
                }
                prev = Some(c);
                child = n.next_sibling;
            }
            if node.last_child != prev {
                return Err(format!("{id:?} has a stale last_child"));
            }
        }
        Ok(())
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

/// Panics on an id from another `Dom`, like slice indexing.
impl Index<NodeId> for Dom {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        match self.arena.get(id) {
            Some(node) => node,
            None => panic!("{id:?} does not belong to this tree"),
        }
    }
}

impl IndexMut<NodeId> for Dom {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        match self.arena.get_mut(id) {
            Some(node) => node,
            None => panic!("{id:?} does not belong to this tree"),
        }
    }
}

pub struct Children<'a> {
    dom: &'a Dom,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.dom[current].next_sibling;
        Some(current)
    }
}

pub struct Descendants<'a> {
    dom: &'a Dom,
    top: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        let node = &self.dom[current];
        self.next = match node.first_child {
            Some(child) => Some(child),
            None => {
                // Climb until an ancestor below `top` has a next sibling.
                let mut at = current;
                loop {
                    if at == self.top {
                        break None;
                    }
                    let n = &self.dom[at];
                    if let Some(sibling) = n.next_sibling {
                        break Some(sibling);
                    }
                    match n.parent {
                        Some(parent) => at = parent,
                        None => break None,
                    }
                }
            }
        };
        Some(current)
    }
}
