//! Output identifiers.
//!
//! A [`Namespace`] is a tree with one node for the program (module level
//! names, which share the output's single top-level scope) and one node per
//! function below it. Names are unique per function body rather than per
//! block.
//!
//! A name is free in a node when no ancestor owns it (the new binding would
//! hide a captured outer binding) and no descendant owns it (a nested closure
//! would hide the new binding). Sibling functions never see each other, so
//! they reuse the same short names.
//!
//! Assignments are memoized per variable, so naming a variable twice is a
//! no-op.

use rustc_hash::{FxHashMap, FxHashSet};
use wtscript_core::VarId;

/// Words the output language doesn't accept as identifiers.
pub const OUTPUT_KEYWORDS: &[&str] = &[
    "arguments", "async", "await", "break", "case", "catch", "class", "const", "continue",
    "debugger", "default", "delete", "do", "else", "enum", "eval", "export", "extends", "false",
    "finally", "for", "function", "if", "implements", "import", "in", "instanceof", "interface",
    "let", "new", "null", "of", "package", "private", "protected", "public", "return", "static",
    "super", "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while", "with",
    "yield",
];

const FIRST: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const REST: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Handle of a namespace node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Who holds a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    /// Built-in globals and keywords.
    Reserved,
    Var(VarId),
}

// ============================================================================
// Name generator
// ============================================================================

/// Produces candidate names in a fixed order.
///
/// Readable mode yields the source name followed by numbered variants.
/// Compact mode ignores the source name and counts through the short names.
///
/// ```
/// use wtscript_compiler::namespace::NameGenerator;
///
/// let readable = NameGenerator::new(false);
/// assert_eq!(readable.candidate("count", 0), "count");
/// assert_eq!(readable.candidate("count", 2), "count2");
///
/// let compact = NameGenerator::new(true);
/// assert_eq!(compact.candidate("count", 0), "a");
/// assert_eq!(compact.candidate("count", 52), "aa");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct NameGenerator {
    compact: bool,
}

impl NameGenerator {
    pub fn new(compact: bool) -> Self {
        Self { compact }
    }

    pub fn is_compact(&self) -> bool {
        self.compact
    }

    /// The `index`-th candidate for a binding originally called `original`.
    pub fn candidate(&self, original: &str, index: usize) -> String {
        if self.compact {
            short_name(index)
        } else if index == 0 {
            original.to_string()
        } else {
            format!("{original}{index}")
        }
    }
}

/// Bijection from indices to identifiers: one letter, then letters and digits.
fn short_name(index: usize) -> String {
    let mut out = String::new();
    out.push(FIRST[index % FIRST.len()] as char);
    let mut rest = index / FIRST.len();
    while rest > 0 {
        rest -= 1;
        out.push(REST[rest % REST.len()] as char);
        rest /= REST.len();
    }
    out
}

// ============================================================================
// Namespace
// ============================================================================

#[derive(Debug, Default)]
struct Node {
    parent: Option<NodeId>,
    owned: FxHashMap<String, Owner>,
    /// Names owned anywhere below this node.
    below: FxHashSet<String>,
    /// Compact candidates below this index are taken for this node.
    cursor: usize,
}

#[derive(Debug)]
pub struct Namespace {
    generator: NameGenerator,
    nodes: Vec<Node>,
    assigned: FxHashMap<VarId, String>,
}

impl Namespace {
    pub fn new(generator: NameGenerator) -> Self {
        let mut namespace = Self {
            generator,
            nodes: vec![Node::default()],
            assigned: FxHashMap::default(),
        };
        for keyword in OUTPUT_KEYWORDS {
            namespace.reserve(keyword);
        }
        namespace
    }

    /// The program node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Open a function node below `parent`.
    pub fn child(&mut self, parent: NodeId) -> NodeId {
        self.nodes.push(Node {
            parent: Some(parent),
            ..Node::default()
        });
        NodeId(self.nodes.len() - 1)
    }

    /// Keep `name` out of every generated name.
    pub fn reserve(&mut self, name: &str) {
        self.nodes[0].owned.insert(name.to_string(), Owner::Reserved);
    }

    /// The name assigned to `var`, if any.
    pub fn name_of(&self, var: VarId) -> Option<&str> {
        self.assigned.get(&var).map(String::as_str)
    }

    fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.nodes[node.0].parent, |id| self.nodes[id.0].parent)
    }

    /// Who holds `name` as seen from `node`: the node itself, its ancestors,
    /// or below it.
    pub fn owner(&self, node: NodeId, name: &str) -> Option<Owner> {
        let here = &self.nodes[node.0];
        if let Some(owner) = here.owned.get(name) {
            return Some(*owner);
        }
        if let Some(owner) = self
            .ancestors(node)
            .find_map(|id| self.nodes[id.0].owned.get(name).copied())
        {
            return Some(owner);
        }
        here.below.contains(name).then(|| self.below_owner(node, name))
    }

    /// The owner of a name held somewhere below `node`.
    fn below_owner(&self, node: NodeId, name: &str) -> Owner {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(id, _)| self.ancestors(NodeId(*id)).any(|a| a == node))
            .find_map(|(_, n)| n.owned.get(name).copied())
            .unwrap_or(Owner::Reserved)
    }

    pub fn is_free(&self, node: NodeId, name: &str) -> bool {
        let here = &self.nodes[node.0];
        !here.owned.contains_key(name)
            && !here.below.contains(name)
            && self.ancestors(node).all(|id| !self.nodes[id.0].owned.contains_key(name))
    }

    /// Give `name` to `var` in `node`.
    pub fn claim(&mut self, node: NodeId, var: VarId, name: &str) {
        let ancestors: Vec<NodeId> = self.ancestors(node).collect();
        for id in ancestors {
            self.nodes[id.0].below.insert(name.to_string());
        }
        self.nodes[node.0].owned.insert(name.to_string(), Owner::Var(var));
        self.assigned.insert(var, name.to_string());
    }

    /// Generate, claim and return a name for `var`. A variable that already
    /// has one keeps it.
    pub fn unique(&mut self, node: NodeId, var: VarId, original: &str) -> String {
        if let Some(name) = self.assigned.get(&var) {
            return name.clone();
        }
        let start = if self.generator.is_compact() {
            self.nodes[node.0].cursor
        } else {
            0
        };
        let mut index = start;
        let name = loop {
            let candidate = self.generator.candidate(original, index);
            if self.is_free(node, &candidate) {
                break candidate;
            }
            index += 1;
        };
        if self.generator.is_compact() {
            self.nodes[node.0].cursor = index + 1;
        }
        self.claim(node, var, &name);
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(n: u32) -> VarId {
        VarId::new(n)
    }

    #[test]
    fn short_names_are_distinct() {
        let names: FxHashSet<String> = (0..5000).map(short_name).collect();
        assert_eq!(names.len(), 5000);
        assert_eq!(short_name(0), "a");
        assert_eq!(short_name(51), "Z");
        assert_eq!(short_name(53), "ba");
    }

    #[test]
    fn keywords_are_skipped() {
        let mut ns = Namespace::new(NameGenerator::new(false));
        assert_eq!(ns.unique(ns.root(), var(1), "new"), "new1");

        let mut ns = Namespace::new(NameGenerator::new(true));
        let root = ns.root();
        for i in 0..1040 {
            let name = ns.unique(root, var(i), "x");
            assert!(!OUTPUT_KEYWORDS.contains(&name.as_str()), "{name}");
        }
    }

    #[test]
    fn readable_names_get_suffixes() {
        let mut ns = Namespace::new(NameGenerator::new(false));
        let root = ns.root();
        assert_eq!(ns.unique(root, var(1), "x"), "x");
        assert_eq!(ns.unique(root, var(2), "x"), "x1");
        assert_eq!(ns.unique(root, var(3), "x"), "x2");
    }

    #[test]
    fn assignments_are_memoized() {
        let mut ns = Namespace::new(NameGenerator::new(true));
        let root = ns.root();
        let first = ns.unique(root, var(1), "x");
        assert_eq!(ns.unique(root, var(1), "x"), first);
        assert_eq!(ns.name_of(var(1)), Some(first.as_str()));
    }

    #[test]
    fn nested_functions_avoid_outer_and_inner_names() {
        let mut ns = Namespace::new(NameGenerator::new(true));
        let root = ns.root();
        assert_eq!(ns.unique(root, var(1), "f"), "a");

        let inner = ns.child(root);
        assert_eq!(ns.unique(inner, var(2), "p"), "b");

        // the outer scope can't take a name a closure already uses
        assert_eq!(ns.unique(root, var(3), "g"), "c");
    }

    #[test]
    fn siblings_share_names() {
        let mut ns = Namespace::new(NameGenerator::new(true));
        let root = ns.root();
        ns.unique(root, var(1), "f");
        let first = ns.child(root);
        let second = ns.child(root);
        assert_eq!(ns.unique(first, var(2), "p"), "b");
        assert_eq!(ns.unique(second, var(3), "q"), "b");
    }

    #[test]
    fn owners() {
        let mut ns = Namespace::new(NameGenerator::new(false));
        let root = ns.root();
        ns.reserve("console");
        let inner = ns.child(root);
        ns.claim(inner, var(4), "Point");

        assert_eq!(ns.owner(root, "console"), Some(Owner::Reserved));
        assert_eq!(ns.owner(root, "Point"), Some(Owner::Var(var(4))));
        assert_eq!(ns.owner(inner, "Point"), Some(Owner::Var(var(4))));
        assert_eq!(ns.owner(root, "free"), None);
    }
}
