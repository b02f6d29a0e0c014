use crate::dataset::dataset_key;
use crate::error::{DomError, DomResult};

/// Index of a node inside a [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowRootMode {
    #[default]
    Open,
    Closed,
}

impl ShadowRootMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ShadowRootMode::Open => "open",
            ShadowRootMode::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element {
        local_name: String,
        attributes: Vec<Attribute>,
        shadow_root: Option<NodeId>,
    },
    Text(String),
    ShadowRoot {
        host: NodeId,
        mode: ShadowRootMode,
    },
    Fragment,
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// A single host document. Node `0` is always the document node.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Document)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(Node::new(kind));
        NodeId(self.nodes.len() - 1)
    }

    /// Create a detached element. HTML element names are ASCII lower-cased.
    pub fn create_element(&mut self, local_name: &str) -> NodeId {
        self.alloc(NodeKind::Element {
            local_name: local_name.to_ascii_lowercase(),
            attributes: Vec::new(),
            shadow_root: None,
        })
    }

    pub fn create_text(&mut self, data: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Text(data.into()))
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.alloc(NodeKind::Fragment)
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.nodes.get(id.0).ok_or(DomError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.nodes.get_mut(id.0).ok_or(DomError::NodeNotFound(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn kind(&self, id: NodeId) -> DomResult<&NodeKind> {
        Ok(&self.node(id)?.kind)
    }

    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        match self.node(id).ok().map(|n| &n.kind) {
            Some(NodeKind::Element { local_name, .. }) => Some(local_name),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.local_name(id).is_some()
    }

    pub fn is_element_named(&self, id: NodeId, name: &str) -> bool {
        self.local_name(id) == Some(name)
    }

    pub fn is_shadow_root(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Ok(NodeKind::ShadowRoot { .. }))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).ok().and_then(|n| n.parent)
    }

    /// The parent element, if the parent is an element at all.
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|p| self.is_element(*p))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn has_child_nodes(&self, id: NodeId) -> bool {
        !self.children(id).is_empty()
    }

    // ---- shadow trees ----

    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        match self.node(host).ok().map(|n| &n.kind) {
            Some(NodeKind::Element { shadow_root, .. }) => *shadow_root,
            _ => None,
        }
    }

    /// Host element of a shadow root.
    pub fn host(&self, shadow: NodeId) -> Option<NodeId> {
        match self.node(shadow).ok().map(|n| &n.kind) {
            Some(NodeKind::ShadowRoot { host, .. }) => Some(*host),
            _ => None,
        }
    }

    pub fn attach_shadow(&mut self, host: NodeId, mode: ShadowRootMode) -> DomResult<NodeId> {
        match &self.node(host)?.kind {
            NodeKind::Element {
                shadow_root: Some(_),
                local_name,
                ..
            } => {
                return Err(DomError::ShadowRootExists {
                    tag: local_name.clone(),
                })
            }
            NodeKind::Element { .. } => {}
            _ => return Err(DomError::NotAnElement(host)),
        }
        let shadow = self.alloc(NodeKind::ShadowRoot { host, mode });
        if let NodeKind::Element { shadow_root, .. } = &mut self.node_mut(host)?.kind {
            *shadow_root = Some(shadow);
        }
        Ok(shadow)
    }

    /// Parent in the shadow-including tree: a shadow root's parent is its host.
    pub fn shadow_including_parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).or_else(|| self.host(id))
    }

    /// A node is connected when its shadow-including root is the document.
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root() {
                return true;
            }
            match self.shadow_including_parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn is_host_including_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.shadow_including_parent(id);
        }
        false
    }

    /// Nearest inclusive ancestor element named `local_name`, within one tree.
    pub fn closest(&self, id: NodeId, local_name: &str) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.is_element_named(node, local_name) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    // ---- traversal ----

    /// Descendants of `root` in document order, never entering shadow trees.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        self.descendants_pruned(root, |_| true)
    }

    /// Descendants in document order. `descend` decides, per visited node,
    /// whether its own children are visited; the node itself is always kept.
    pub fn descendants_pruned(
        &self,
        root: NodeId,
        mut descend: impl FnMut(NodeId) -> bool,
    ) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            if descend(id) {
                stack.extend(self.children(id).iter().rev().copied());
            }
        }
        out
    }

    /// Inclusive shadow-including descendants: a host is followed by its
    /// shadow tree, then by its light children.
    pub fn shadow_including_descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
            if let Some(shadow) = self.shadow_root(id) {
                stack.push(shadow);
            }
        }
        out
    }

    /// Replace every fragment in `nodes` with its children.
    pub fn flatten_fragments(&self, nodes: &[NodeId]) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(nodes.len());
        for &node in nodes {
            if matches!(self.kind(node), Ok(NodeKind::Fragment)) {
                out.extend_from_slice(self.children(node));
            } else if !out.contains(&node) {
                out.push(node);
            }
        }
        out
    }

    // ---- mutation ----

    fn ensure_insertable(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let reject = |reason| DomError::HierarchyRequest {
            parent,
            child,
            reason,
        };
        if matches!(self.kind(parent)?, NodeKind::Text(_)) {
            return Err(reject("text nodes cannot have children"));
        }
        match self.kind(child)? {
            NodeKind::Document => return Err(reject("a document cannot be inserted")),
            NodeKind::ShadowRoot { .. } => return Err(reject("a shadow root cannot be inserted")),
            _ => {}
        }
        if self.is_host_including_inclusive_ancestor(child, parent) {
            return Err(reject("the node is an ancestor of the parent"));
        }
        Ok(())
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.parent(node) {
            if let Ok(p) = self.node_mut(parent) {
                p.children.retain(|c| *c != node);
            }
            if let Ok(n) = self.node_mut(node) {
                n.parent = None;
            }
        }
    }

    /// Move `nodes` under `parent`, before `reference` (or at the end), in
    /// order. Every node is validated before anything moves.
    pub fn insert_children(
        &mut self,
        parent: NodeId,
        nodes: &[NodeId],
        reference: Option<NodeId>,
    ) -> DomResult<()> {
        let nodes = self.flatten_fragments(nodes);
        for &child in &nodes {
            self.ensure_insertable(parent, child)?;
            if reference == Some(child) {
                return Err(DomError::HierarchyRequest {
                    parent,
                    child,
                    reason: "the reference node is being moved",
                });
            }
        }
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) {
                return Err(DomError::HierarchyRequest {
                    parent,
                    child: reference,
                    reason: "the reference node is not a child of the parent",
                });
            }
        }

        for &child in &nodes {
            self.detach(child);
        }
        let index = match reference {
            Some(reference) => self
                .children(parent)
                .iter()
                .position(|c| *c == reference)
                .unwrap_or(self.children(parent).len()),
            None => self.children(parent).len(),
        };
        let p = self.node_mut(parent)?;
        for (offset, &child) in nodes.iter().enumerate() {
            p.children.insert(index + offset, child);
        }
        for &child in &nodes {
            self.node_mut(child)?.parent = Some(parent);
        }
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.insert_children(parent, &[child], None)
    }

    pub fn append_children(&mut self, parent: NodeId, nodes: &[NodeId]) -> DomResult<()> {
        self.insert_children(parent, nodes, None)
    }

    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<()> {
        self.insert_children(parent, &[child], reference)
    }

    pub fn remove(&mut self, node: NodeId) -> DomResult<()> {
        self.node(node)?;
        self.detach(node);
        Ok(())
    }

    // ---- attributes ----

    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        match self.node(id).ok().map(|n| &n.kind) {
            Some(NodeKind::Element { attributes, .. }) => attributes,
            _ => &[],
        }
    }

    /// Attribute lookup is ASCII case-insensitive, as for HTML elements.
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.get_attribute(id, name).is_some()
    }

    fn attributes_mut(&mut self, id: NodeId) -> DomResult<&mut Vec<Attribute>> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element { attributes, .. } => Ok(attributes),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    /// Set an attribute, returning the previous value.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> DomResult<Option<String>> {
        let value = value.into();
        let attributes = self.attributes_mut(id)?;
        match attributes.iter_mut().find(|a| a.name.eq_ignore_ascii_case(name)) {
            Some(existing) => Ok(Some(std::mem::replace(&mut existing.value, value))),
            None => {
                attributes.push(Attribute {
                    name: name.to_ascii_lowercase(),
                    value,
                });
                Ok(None)
            }
        }
    }

    /// Remove an attribute, returning the removed value.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<Option<String>> {
        let attributes = self.attributes_mut(id)?;
        let index = attributes.iter().position(|a| a.name.eq_ignore_ascii_case(name));
        Ok(index.map(|i| attributes.remove(i).value))
    }

    /// `data-*` attributes as `(camelCaseKey, value)` pairs, in attribute order.
    pub fn dataset(&self, id: NodeId) -> Vec<(String, String)> {
        self.attributes(id)
            .iter()
            .filter_map(|a| dataset_key(&a.name).map(|key| (key, a.value.clone())))
            .collect()
    }

    // ---- text ----

    pub fn text_content(&self, id: NodeId) -> String {
        if let Ok(NodeKind::Text(data)) = self.kind(id) {
            return data.clone();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|n| match self.kind(n) {
                Ok(NodeKind::Text(data)) => Some(data.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replace all children with a single text node (none for empty text).
    /// Returns the removed children.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> DomResult<Vec<NodeId>> {
        if let NodeKind::Text(data) = &mut self.node_mut(id)?.kind {
            *data = text.to_string();
            return Ok(Vec::new());
        }
        let removed = self.children(id).to_vec();
        for &child in &removed {
            self.detach(child);
        }
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.append_child(id, text_node)?;
        }
        Ok(removed)
    }

    // ---- slots ----

    fn slot_name_of(&self, node: NodeId) -> &str {
        self.get_attribute(node, "slot").unwrap_or("")
    }

    /// The slot in the parent's shadow tree that `node` is assigned to.
    pub fn assigned_slot(&self, node: NodeId) -> Option<NodeId> {
        let host = self.parent_element(node)?;
        let shadow = self.shadow_root(host)?;
        let wanted = match self.kind(node).ok()? {
            NodeKind::Element { .. } => self.slot_name_of(node),
            NodeKind::Text(_) => "",
            _ => return None,
        };
        self.descendants(shadow).into_iter().find(|&candidate| {
            self.is_element_named(candidate, "slot")
                && self.get_attribute(candidate, "name").unwrap_or("") == wanted
        })
    }

    /// Children of the slot's host that are assigned to `slot`.
    pub fn assigned_nodes(&self, slot: NodeId) -> Vec<NodeId> {
        let mut current = self.parent(slot);
        while let Some(id) = current {
            if let Some(host) = self.host(id) {
                return self
                    .children(host)
                    .iter()
                    .copied()
                    .filter(|&child| self.assigned_slot(child) == Some(slot))
                    .collect();
            }
            current = self.parent(id);
        }
        Vec::new()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
