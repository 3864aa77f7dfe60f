//! Include paths merged into a tree of relationship segments.

use indexmap::IndexMap;

/// Index of a node inside an [`IncludeTree`]. The root is `0`.
pub(crate) type NodeId = usize;

#[derive(Debug, Default)]
struct IncludeNode {
    children: IndexMap<String, NodeId>,
}

/// `["comments", "comments.post", "owner-user"]` becomes
/// `{comments: {post: {}}, owner-user: {}}`.
#[derive(Debug)]
pub(crate) struct IncludeTree {
    nodes: Vec<IncludeNode>,
}

impl IncludeTree {
    pub(crate) const ROOT: NodeId = 0;

    pub(crate) fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self {
            nodes: vec![IncludeNode::default()],
        };
        for path in paths {
            let mut node = Self::ROOT;
            for segment in path.as_ref().split('.').map(str::trim).filter(|s| !s.is_empty()) {
                let existing = tree.nodes[node].children.get(segment).copied();
                node = match existing {
                    Some(child) => child,
                    None => {
                        let child = tree.nodes.len();
                        tree.nodes.push(IncludeNode::default());
                        tree.nodes[node].children.insert(segment.to_owned(), child);
                        child
                    }
                };
            }
        }
        tree
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.nodes[Self::ROOT].children.is_empty()
    }

    pub(crate) fn children(&self, node: NodeId) -> impl Iterator<Item = (&str, NodeId)> {
        self.nodes[node]
            .children
            .iter()
            .map(|(segment, &child)| (segment.as_str(), child))
    }
}
