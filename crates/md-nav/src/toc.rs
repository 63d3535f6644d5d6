use serde::Serialize;

use crate::heading::Heading;

/// Index of a node in a [`HeadingTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingNode {
    pub heading: Heading,
    /// Non-owning back-reference into the same tree.
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Table-of-contents forest. Nodes live in a flat arena in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadingTree {
    nodes: Vec<HeadingNode>,
    roots: Vec<NodeId>,
}

/// Nest a flat heading list into an outline.
///
/// A heading becomes a child of the most recent heading with a strictly
/// smaller level; otherwise it is a sibling (or a root). Level gaps nest
/// directly: an H3 after an H1 is the H1's child.
pub fn build_heading_tree(headings: &[Heading]) -> HeadingTree {
    let mut tree = HeadingTree {
        nodes: Vec::with_capacity(headings.len()),
        roots: Vec::new(),
    };
    let mut stack: Vec<NodeId> = Vec::new();

    for heading in headings {
        while let Some(&top) = stack.last() {
            if tree.nodes[top.0].heading.level >= heading.level {
                stack.pop();
            } else {
                break;
            }
        }

        let id = NodeId(tree.nodes.len());
        let parent = stack.last().copied();
        tree.nodes.push(HeadingNode {
            heading: heading.clone(),
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(p) => tree.nodes[p.0].children.push(id),
            None => tree.roots.push(id),
        }
        stack.push(id);
    }

    tree
}

impl HeadingTree {
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> &HeadingNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&HeadingNode> {
        self.nodes.get(id.0)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Ancestors from the direct parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.parent(id);
        while let Some(p) = cursor {
            out.push(p);
            cursor = self.parent(p);
        }
        out
    }

    /// Find a node by anchor id.
    pub fn find(&self, anchor: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.heading.id == anchor)
            .map(NodeId)
    }

    /// Depth-first pre-order walk over the forest.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        out
    }

    /// Headings in pre-order; equals the input of [`build_heading_tree`].
    pub fn flatten(&self) -> Vec<&Heading> {
        self.preorder()
            .into_iter()
            .map(|id| &self.nodes[id.0].heading)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nested JSON: `[{id, text, level, children: [...]}]`.
    pub fn to_json(&self) -> serde_json::Value {
        fn node_json(tree: &HeadingTree, id: NodeId) -> serde_json::Value {
            let node = tree.node(id);
            let children: Vec<serde_json::Value> =
                node.children.iter().map(|&c| node_json(tree, c)).collect();
            serde_json::json!({
                "id": node.heading.id,
                "text": node.heading.text,
                "level": node.heading.level,
                "children": children,
            })
        }
        serde_json::Value::Array(self.roots.iter().map(|&r| node_json(self, r)).collect())
    }
}

fn active_path(tree: &HeadingTree, active_id: Option<&str>) -> (Option<NodeId>, Vec<NodeId>) {
    let active = active_id.and_then(|a| tree.find(a));
    let path = active.map(|a| tree.ancestors(a)).unwrap_or_default();
    (active, path)
}

/// Render the tree as nested `<ul class="toc">` lists linking to `#id`.
///
/// The active entry gets `class="active"`, its ancestors `class="active-path"`.
pub fn render_toc_html(tree: &HeadingTree, active_id: Option<&str>) -> String {
    fn render_list(
        tree: &HeadingTree,
        ids: &[NodeId],
        active: Option<NodeId>,
        path: &[NodeId],
        out: &mut String,
    ) {
        out.push_str("<ul class=\"toc\">\n");
        for &id in ids {
            let node = tree.node(id);
            let class = if Some(id) == active {
                " class=\"active\""
            } else if path.contains(&id) {
                " class=\"active-path\""
            } else {
                ""
            };
            out.push_str(&format!(
                "<li{class}><a href=\"#{}\" data-level=\"{}\">{}</a>",
                htmlescape::encode_minimal(&node.heading.id),
                node.heading.level,
                htmlescape::encode_minimal(&node.heading.text),
            ));
            if !node.children.is_empty() {
                out.push('\n');
                render_list(tree, &node.children, active, path, out);
            }
            out.push_str("</li>\n");
        }
        out.push_str("</ul>\n");
    }

    if tree.is_empty() {
        return String::new();
    }
    let (active, path) = active_path(tree, active_id);
    let mut out = String::new();
    render_list(tree, tree.roots(), active, &path, &mut out);
    out
}

/// Render the tree as an indented outline, marking the active entry with `>`.
pub fn render_toc_text(tree: &HeadingTree, active_id: Option<&str>) -> String {
    let (active, _) = active_path(tree, active_id);
    let mut out = String::new();
    for id in tree.preorder() {
        let depth = tree.ancestors(id).len();
        let marker = if Some(id) == active { ">" } else { " " };
        let heading = &tree.node(id).heading;
        out.push_str(&format!(
            "{marker} {}{} (#{})\n",
            "  ".repeat(depth),
            heading.text,
            heading.id
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(id: &str, level: u8) -> Heading {
        Heading::new(id, id.to_uppercase(), level)
    }

    #[test]
    fn test_siblings_and_children() {
        let tree = build_heading_tree(&[h("a", 1), h("b", 2), h("c", 2), h("d", 1)]);
        assert_eq!(tree.roots().len(), 2);
        let a = tree.roots()[0];
        let d = tree.roots()[1];
        let kids: Vec<&str> = tree
            .children(a)
            .iter()
            .map(|&c| tree.node(c).heading.id.as_str())
            .collect();
        assert_eq!(kids, vec!["b", "c"]);
        assert!(tree.children(d).is_empty());
        assert_eq!(tree.parent(tree.children(a)[1]), Some(a));
    }

    #[test]
    fn test_level_gap_nests() {
        let tree = build_heading_tree(&[h("a", 1), h("b", 3)]);
        assert_eq!(tree.roots().len(), 1);
        let b = tree.find("b").unwrap();
        assert_eq!(tree.parent(b), tree.find("a"));
    }

    #[test]
    fn test_deeper_then_shallower() {
        // H3 then H2: the H2 cannot nest under the H3.
        let tree = build_heading_tree(&[h("a", 1), h("b", 3), h("c", 2), h("d", 3)]);
        let a = tree.find("a").unwrap();
        assert_eq!(tree.children(a).len(), 2);
        assert_eq!(tree.parent(tree.find("d").unwrap()), tree.find("c"));
    }

    #[test]
    fn test_empty() {
        let tree = build_heading_tree(&[]);
        assert!(tree.is_empty());
        assert!(tree.roots().is_empty());
        assert_eq!(render_toc_html(&tree, None), "");
    }

    #[test]
    fn test_preorder_round_trip() {
        let input = vec![
            h("a", 2),
            h("b", 1),
            h("c", 3),
            h("d", 4),
            h("e", 2),
            h("f", 4),
            h("g", 1),
            h("h", 3),
        ];
        let tree = build_heading_tree(&input);
        let flat: Vec<Heading> = tree.flatten().into_iter().cloned().collect();
        assert_eq!(flat, input);
    }

    #[test]
    fn test_child_level_greater_than_parent() {
        let input = vec![h("a", 1), h("b", 2), h("c", 4), h("d", 2), h("e", 3)];
        let tree = build_heading_tree(&input);
        for id in tree.preorder() {
            if let Some(p) = tree.parent(id) {
                assert!(tree.node(p).heading.level < tree.node(id).heading.level);
            }
        }
        assert_eq!(tree.ancestors(tree.find("c").unwrap()).len(), 2);
    }

    #[test]
    fn test_render_toc_html_marks_active_path() {
        let tree = build_heading_tree(&[h("a", 1), h("b", 2), h("c", 3), h("d", 1)]);
        let html = render_toc_html(&tree, Some("c"));
        assert!(html.contains("<li class=\"active\"><a href=\"#c\""));
        assert!(html.contains("<li class=\"active-path\"><a href=\"#a\""));
        assert!(html.contains("<li class=\"active-path\"><a href=\"#b\""));
        assert!(html.contains("<li><a href=\"#d\""));
        assert_eq!(html.matches("<ul").count(), 3);
    }

    #[test]
    fn test_render_toc_html_dashed_ids_verbatim() {
        let tree = build_heading_tree(&[Heading::new("setup-install-1", "Install <now>", 2)]);
        let html = render_toc_html(&tree, None);
        assert!(html.contains("<a href=\"#setup-install-1\""));
        assert!(html.contains("Install &lt;now&gt;"));
    }

    #[test]
    fn test_render_toc_text() {
        let tree = build_heading_tree(&[h("a", 1), h("b", 2)]);
        assert_eq!(render_toc_text(&tree, Some("b")), "  A (#a)\n>   B (#b)\n");
    }

    #[test]
    fn test_to_json() {
        let tree = build_heading_tree(&[h("a", 1), h("b", 2)]);
        let json = tree.to_json();
        assert_eq!(json[0]["id"], "a");
        assert_eq!(json[0]["children"][0]["id"], "b");
    }
}
