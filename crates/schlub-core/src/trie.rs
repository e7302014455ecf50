//! Path trie keyed by slash-delimited segments.
//!
//! The trie knows nothing about services. Each node holds an ordered list of
//! values and an insertion-ordered map of named children. Lookups expand `*`
//! segments breadth-first, one segment across every candidate at a time, so
//! trailing (`a/*`) and mid-path (`a/*/b`) wildcards behave the same way.

use indexmap::IndexMap;

/// Segment separator.
pub const SEPARATOR: &str = "/";

/// Segment that matches every child during lookup. It is an ordinary literal
/// name when adding.
pub const WILDCARD: &str = "*";

#[cfg(test)]
#[path = "trie_tests.rs"]
mod tests;

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR)
}

/// One node of a [`PathTrie`].
#[derive(Debug, Clone)]
pub struct TrieNode<V> {
    segment: Option<String>,
    children: IndexMap<String, TrieNode<V>>,
    values: Vec<V>,
}

impl<V> TrieNode<V> {
    fn new(segment: Option<String>) -> Self {
        Self {
            segment,
            children: IndexMap::new(),
            values: Vec::new(),
        }
    }

    /// The segment this node represents; `None` for the root.
    pub fn segment(&self) -> Option<&str> {
        self.segment.as_deref()
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }

    pub fn child(&self, segment: &str) -> Option<&TrieNode<V>> {
        self.children.get(segment)
    }

    /// Children in insertion order.
    pub fn children(&self) -> impl Iterator<Item = &TrieNode<V>> {
        self.children.values()
    }

    /// No values and no children.
    pub fn is_inert(&self) -> bool {
        self.values.is_empty() && self.children.is_empty()
    }

    fn drain_into(self, out: &mut Vec<V>) {
        out.extend(self.values);
        for (_, child) in self.children {
            child.drain_into(out);
        }
    }

    fn collect_paths(&self, prefix: &mut Vec<String>, out: &mut Vec<String>) {
        if !self.values.is_empty() {
            out.push(prefix.join(SEPARATOR));
        }
        for (segment, child) in &self.children {
            prefix.push(segment.clone());
            child.collect_paths(prefix, out);
            prefix.pop();
        }
    }
}

/// Tree of values addressed by slash-delimited paths.
#[derive(Debug, Clone)]
pub struct PathTrie<V> {
    root: TrieNode<V>,
    len: usize,
}

impl<V> PathTrie<V> {
    pub fn new() -> Self {
        Self {
            root: TrieNode::new(None),
            len: 0,
        }
    }

    pub fn root(&self) -> &TrieNode<V> {
        &self.root
    }

    /// Number of values stored anywhere in the trie.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append `value` at `path`, creating missing nodes along the way.
    pub fn add(&mut self, path: &str, value: V) {
        let mut node = &mut self.root;
        for segment in segments(path) {
            node = node
                .children
                .entry(segment.to_string())
                .or_insert_with(|| TrieNode::new(Some(segment.to_string())));
        }
        node.values.push(value);
        self.len += 1;
    }

    /// Nodes matching `path`, breadth-first then insertion order.
    pub fn find_nodes(&self, path: &str) -> Vec<&TrieNode<V>> {
        let mut nodes = vec![&self.root];

        for segment in segments(path) {
            let mut next = Vec::new();
            for node in nodes {
                if segment == WILDCARD {
                    next.extend(node.children.values());
                } else if let Some(child) = node.children.get(segment) {
                    next.push(child);
                }
            }
            nodes = next;
        }

        nodes
    }

    /// Values of every node matching `path`, in node-visitation order.
    pub fn find(&self, path: &str) -> Vec<&V> {
        self.find_nodes(path)
            .into_iter()
            .flat_map(|node| node.values.iter())
            .collect()
    }

    /// Same expansion as [`find_nodes`](Self::find_nodes), but yielding the
    /// concrete segment chain of each match so it can be mutated afterwards.
    fn locate(&self, path: &str) -> Vec<Vec<String>> {
        let mut nodes: Vec<(&TrieNode<V>, Vec<String>)> = vec![(&self.root, Vec::new())];

        for segment in segments(path) {
            let mut next = Vec::new();
            for (node, address) in nodes {
                if segment == WILDCARD {
                    for (name, child) in &node.children {
                        let mut address = address.clone();
                        address.push(name.clone());
                        next.push((child, address));
                    }
                } else if let Some(child) = node.children.get(segment) {
                    let mut address = address;
                    address.push(segment.to_string());
                    next.push((child, address));
                }
            }
            nodes = next;
        }

        nodes.into_iter().map(|(_, address)| address).collect()
    }

    fn node_mut(&mut self, address: &[String]) -> Option<&mut TrieNode<V>> {
        let mut node = &mut self.root;
        for segment in address {
            node = node.children.get_mut(segment)?;
        }
        Some(node)
    }

    /// Remove values from, or whole subtrees at, every node matching `path`.
    ///
    /// With `Some(values)`, the first equal occurrence of each supplied value
    /// is taken out of each matched node; the nodes themselves stay. With
    /// `None`, each matched node is unlinked from its parent together with
    /// its subtree. Returns every value that left the trie.
    pub fn remove(&mut self, path: &str, values: Option<&[V]>) -> Vec<V>
    where
        V: PartialEq,
    {
        let mut removed = Vec::new();

        for address in self.locate(path) {
            match values {
                Some(values) => {
                    let Some(node) = self.node_mut(&address) else {
                        continue;
                    };
                    for value in values {
                        if let Some(position) = node.values.iter().position(|v| v == value) {
                            removed.push(node.values.remove(position));
                        }
                    }
                }
                None => {
                    // Paths always have at least one segment, so the root is never matched.
                    let Some((last, parent)) = address.split_last() else {
                        continue;
                    };
                    if let Some(child) = self
                        .node_mut(parent)
                        .and_then(|parent| parent.children.shift_remove(last))
                    {
                        child.drain_into(&mut removed);
                    }
                }
            }
        }

        self.len -= removed.len();
        removed
    }

    /// Every path holding at least one value, depth-first in insertion order.
    pub fn paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut prefix = Vec::new();
        for (segment, child) in &self.root.children {
            prefix.push(segment.clone());
            child.collect_paths(&mut prefix, &mut out);
            prefix.pop();
        }
        out
    }

    /// Drop every node and value.
    pub fn clear(&mut self) {
        self.root = TrieNode::new(None);
        self.len = 0;
    }
}

impl<V> Default for PathTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}
