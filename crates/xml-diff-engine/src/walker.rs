//! Simultaneous traversal of a control and a test tree
//!
//! The walker reports every difference it can find rather than stopping at
//! the first one. How the trees are viewed (comments, CDATA, whitespace,
//! attribute order) is decided by the [`EngineConfig`] it is given.

use xml_diff_traits::difference::{Difference, DifferenceKind, NodeDetail};
use xml_diff_traits::error::Result;
use xml_diff_traits::tree::{NodeType, XmlTree};

use crate::config::EngineConfig;

/// Compare the document elements of two trees under `config`
pub fn compare_trees<T: XmlTree>(
    control: &T,
    test: &T,
    config: &EngineConfig,
) -> Result<Vec<Difference>> {
    let mut walker = Walker {
        control,
        test,
        config,
        found: Vec::new(),
        pending: Vec::new(),
    };
    let c = Item::Node(control.document_element()?);
    let t = Item::Node(test.document_element()?);
    walker.pending.push(Task::Compare(c, t));
    while let Some(task) = walker.pending.pop() {
        match task {
            Task::Compare(c, t) => walker.compare_items(&c, &t),
            Task::Report(difference) => walker.found.push(difference),
        }
    }
    Ok(walker.found)
}

/// A child as seen by the comparison: character data may be several
/// merged source nodes with whitespace already processed.
#[derive(Debug, Clone)]
enum Item<N> {
    Node(N),
    CharData { node: N, kind: NodeType, value: String },
}

impl<N: Copy> Item<N> {
    fn node(&self) -> N {
        match self {
            Item::Node(node) | Item::CharData { node, .. } => *node,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum MatchKey {
    Element(Option<String>, String),
    CharData,
    Comment,
    ProcessingInstruction(String),
    Other,
}

/// Deferred work. Children are queued rather than visited recursively so
/// nesting depth is bounded by the heap, not the call stack.
enum Task<N> {
    Compare(Item<N>, Item<N>),
    Report(Difference),
}

struct Walker<'a, T: XmlTree> {
    control: &'a T,
    test: &'a T,
    config: &'a EngineConfig,
    found: Vec<Difference>,
    /// Popped from the end; holds tasks in reverse document order
    pending: Vec<Task<T::Node>>,
}

#[derive(Clone, Copy)]
enum Side {
    Control,
    Test,
}

impl<'a, T: XmlTree> Walker<'a, T> {
    fn tree(&self, side: Side) -> &'a T {
        match side {
            Side::Control => self.control,
            Side::Test => self.test,
        }
    }

    fn report(
        &mut self,
        kind: DifferenceKind,
        control: (String, T::Node),
        test: (String, T::Node),
    ) {
        let difference = self.difference(kind, control, test);
        self.found.push(difference);
    }

    fn difference(
        &self,
        kind: DifferenceKind,
        control: (String, T::Node),
        test: (String, T::Node),
    ) -> Difference {
        let control = self.detail(Side::Control, control.0, control.1);
        let test = self.detail(Side::Test, test.0, test.1);
        Difference::new(kind, control, test)
    }

    fn report_missing(
        &mut self,
        kind: DifferenceKind,
        present: Side,
        value: String,
        node: T::Node,
        other_context: T::Node,
    ) {
        let difference = self.missing(kind, present, value, node, other_context);
        self.found.push(difference);
    }

    fn missing(
        &self,
        kind: DifferenceKind,
        present: Side,
        value: String,
        node: T::Node,
        other_context: T::Node,
    ) -> Difference {
        let (control, test) = match present {
            Side::Control => (
                self.detail(Side::Control, value, node),
                self.absent(Side::Test, other_context),
            ),
            Side::Test => (
                self.absent(Side::Control, other_context),
                self.detail(Side::Test, value, node),
            ),
        };
        Difference::new(kind, control, test)
    }

    fn detail(&self, side: Side, value: String, node: T::Node) -> NodeDetail {
        let tree = self.tree(side);
        NodeDetail::new(value, describe(tree, node), xpath(tree, node))
    }

    fn absent(&self, side: Side, context: T::Node) -> NodeDetail {
        let tree = self.tree(side);
        NodeDetail {
            value: "null".to_string(),
            node: Some(describe(tree, context)),
            xpath: Some(xpath(tree, context)),
        }
    }

    fn compare_items(&mut self, c: &Item<T::Node>, t: &Item<T::Node>) {
        let c_type = item_type(self.control, c);
        let t_type = item_type(self.test, t);
        if c_type != t_type {
            self.report(
                DifferenceKind::NodeType,
                (c_type.label().to_string(), c.node()),
                (t_type.label().to_string(), t.node()),
            );
            return;
        }

        match (c, t) {
            (
                Item::CharData { node: cn, value: cv, .. },
                Item::CharData { node: tn, value: tv, .. },
            ) => {
                if cv != tv {
                    let kind = if c_type == NodeType::CData {
                        DifferenceKind::CdataValue
                    } else {
                        DifferenceKind::TextValue
                    };
                    self.report(kind, (cv.clone(), *cn), (tv.clone(), *tn));
                }
            }
            _ => self.compare_nodes(c_type, c.node(), t.node()),
        }
    }

    fn compare_nodes(&mut self, node_type: NodeType, c: T::Node, t: T::Node) {
        match node_type {
            NodeType::Element => self.compare_elements(c, t),
            NodeType::Comment => {
                let cv = self.control.node_value(c).unwrap_or_default();
                let tv = self.test.node_value(t).unwrap_or_default();
                if cv != tv {
                    self.report(DifferenceKind::CommentValue, (cv, c), (tv, t));
                }
            }
            NodeType::ProcessingInstruction => {
                let c_target = self.control.node_name(c).unwrap_or_default();
                let t_target = self.test.node_name(t).unwrap_or_default();
                if c_target != t_target {
                    self.report(
                        DifferenceKind::ProcessingInstructionTarget,
                        (c_target, c),
                        (t_target, t),
                    );
                }
                let cv = self.control.node_value(c).unwrap_or_default();
                let tv = self.test.node_value(t).unwrap_or_default();
                if cv != tv {
                    self.report(DifferenceKind::ProcessingInstructionData, (cv, c), (tv, t));
                }
            }
            _ => {}
        }
    }

    fn compare_elements(&mut self, c: T::Node, t: T::Node) {
        let c_local = self.control.node_local_name(c).unwrap_or_default();
        let t_local = self.test.node_local_name(t).unwrap_or_default();
        if c_local != t_local {
            self.report(DifferenceKind::ElementTagName, (c_local, c), (t_local, t));
            return;
        }

        let c_uri = self.control.node_namespace_uri(c);
        let t_uri = self.test.node_namespace_uri(t);
        if c_uri != t_uri {
            self.report(DifferenceKind::NamespaceUri, (or_null(c_uri), c), (or_null(t_uri), t));
            return;
        }

        let c_prefix = self.control.node_prefix(c);
        let t_prefix = self.test.node_prefix(t);
        if c_prefix != t_prefix {
            self.report(
                DifferenceKind::NamespacePrefix,
                (or_null(c_prefix), c),
                (or_null(t_prefix), t),
            );
        }

        self.compare_attributes(c, t);
        self.compare_children(c, t);
    }

    fn compare_attributes(&mut self, c: T::Node, t: T::Node) {
        let c_attrs = self.control.attributes(c);
        let t_attrs = self.test.attributes(t);
        if c_attrs.len() != t_attrs.len() {
            self.report(
                DifferenceKind::ElementNumAttributes,
                (c_attrs.len().to_string(), c),
                (t_attrs.len().to_string(), t),
            );
        }

        let mut matched = vec![false; t_attrs.len()];
        for (ci, ca) in c_attrs.iter().copied().enumerate() {
            let key = attribute_key(self.control, ca);
            let found = t_attrs
                .iter()
                .enumerate()
                .find(|(ti, ta)| !matched[*ti] && attribute_key(self.test, **ta) == key);
            let Some((ti, ta)) = found.map(|(ti, ta)| (ti, *ta)) else {
                let name = self.control.node_name(ca).unwrap_or_default();
                self.report_missing(DifferenceKind::AttrNameNotFound, Side::Control, name, ca, t);
                continue;
            };
            matched[ti] = true;

            let c_prefix = self.control.node_prefix(ca);
            let t_prefix = self.test.node_prefix(ta);
            if c_prefix != t_prefix {
                self.report(
                    DifferenceKind::NamespacePrefix,
                    (or_null(c_prefix), ca),
                    (or_null(t_prefix), ta),
                );
            }

            let cv = self.attribute_value(self.control, ca);
            let tv = self.attribute_value(self.test, ta);
            if cv != tv {
                self.report(DifferenceKind::AttrValue, (cv, ca), (tv, ta));
            }

            if !self.config.ignore_attribute_order && ci != ti {
                self.report(
                    DifferenceKind::AttrSequence,
                    (ci.to_string(), ca),
                    (ti.to_string(), ta),
                );
            }
        }

        for (ti, ta) in t_attrs.iter().copied().enumerate() {
            if !matched[ti] {
                let name = self.test.node_name(ta).unwrap_or_default();
                self.report_missing(DifferenceKind::AttrNameNotFound, Side::Test, name, ta, c);
            }
        }
    }

    fn attribute_value(&self, tree: &T, attr: T::Node) -> String {
        let value = tree.node_value(attr).unwrap_or_default();
        if self.config.normalize_whitespace {
            collapse_whitespace(&value)
        } else {
            value
        }
    }

    fn compare_children(&mut self, c: T::Node, t: T::Node) {
        let c_items = self.effective_children(self.control, c);
        let t_items = self.effective_children(self.test, t);
        if c_items.is_empty() && t_items.is_empty() {
            return;
        }
        if c_items.is_empty() || t_items.is_empty() {
            self.report(
                DifferenceKind::HasChildNodes,
                ((!c_items.is_empty()).to_string(), c),
                ((!t_items.is_empty()).to_string(), t),
            );
            return;
        }
        if c_items.len() != t_items.len() {
            self.report(
                DifferenceKind::ChildNodelistLength,
                (c_items.len().to_string(), c),
                (t_items.len().to_string(), t),
            );
        }

        let t_keys: Vec<MatchKey> = t_items.iter().map(|i| match_key(self.test, i)).collect();
        let mut t_used = vec![false; t_items.len()];
        let mut c_unmatched = Vec::new();
        let mut tasks = Vec::new();

        for (ci, c_item) in c_items.iter().enumerate() {
            let key = match_key(self.control, c_item);
            let same_position = ci < t_items.len() && !t_used[ci] && t_keys[ci] == key;
            let found = if same_position {
                Some(ci)
            } else {
                (0..t_items.len()).find(|ti| !t_used[*ti] && t_keys[*ti] == key)
            };
            match found {
                Some(ti) => {
                    t_used[ti] = true;
                    if ti != ci {
                        tasks.push(Task::Report(self.difference(
                            DifferenceKind::ChildNodelistSequence,
                            (ci.to_string(), c_item.node()),
                            (ti.to_string(), t_items[ti].node()),
                        )));
                    }
                    tasks.push(Task::Compare(c_item.clone(), t_items[ti].clone()));
                }
                None => c_unmatched.push(ci),
            }
        }

        let mut t_unmatched = (0..t_items.len()).filter(|ti| !t_used[*ti]);
        for ci in c_unmatched {
            match t_unmatched.next() {
                Some(ti) => tasks.push(Task::Compare(c_items[ci].clone(), t_items[ti].clone())),
                None => {
                    let node = c_items[ci].node();
                    let name = node_label(self.control, node);
                    tasks.push(Task::Report(self.missing(
                        DifferenceKind::ChildNodeNotFound,
                        Side::Control,
                        name,
                        node,
                        t,
                    )));
                }
            }
        }
        for ti in t_unmatched {
            let node = t_items[ti].node();
            let name = node_label(self.test, node);
            tasks.push(Task::Report(self.missing(
                DifferenceKind::ChildNodeNotFound,
                Side::Test,
                name,
                node,
                c,
            )));
        }

        self.pending.extend(tasks.into_iter().rev());
    }

    fn effective_children(&self, tree: &T, parent: T::Node) -> Vec<Item<T::Node>> {
        let config = self.config;
        let merge_allowed = config.normalize || config.ignore_diff_between_text_and_cdata;
        let mut items = Vec::new();
        let mut pending: Option<(T::Node, NodeType, String)> = None;

        for child in tree.children(parent) {
            let node_type = tree.node_type(child);
            if node_type == NodeType::Comment && config.ignore_comments {
                continue;
            }
            if node_type.is_character_data() {
                let kind = if config.ignore_diff_between_text_and_cdata {
                    NodeType::Text
                } else {
                    node_type
                };
                let raw = tree.node_value(child).unwrap_or_default();
                if let Some((_, pending_kind, value)) = pending.as_mut() {
                    if *pending_kind == kind && merge_allowed {
                        value.push_str(&raw);
                        continue;
                    }
                }
                self.flush(&mut items, pending.take());
                pending = Some((child, kind, raw));
                continue;
            }
            self.flush(&mut items, pending.take());
            items.push(Item::Node(child));
        }
        self.flush(&mut items, pending.take());
        items
    }

    fn flush(&self, items: &mut Vec<Item<T::Node>>, pending: Option<(T::Node, NodeType, String)>) {
        let Some((node, kind, raw)) = pending else {
            return;
        };
        let config = self.config;
        let value = if config.normalize_whitespace {
            collapse_whitespace(&raw)
        } else if config.ignore_whitespace {
            raw.trim().to_string()
        } else {
            raw
        };
        if value.is_empty() && (config.ignore_whitespace || config.normalize_whitespace) {
            return;
        }
        items.push(Item::CharData { node, kind, value });
    }
}

fn item_type<T: XmlTree>(tree: &T, item: &Item<T::Node>) -> NodeType {
    match item {
        Item::CharData { kind, .. } => *kind,
        Item::Node(node) => tree.node_type(*node),
    }
}

fn match_key<T: XmlTree>(tree: &T, item: &Item<T::Node>) -> MatchKey {
    match item_type(tree, item) {
        NodeType::Element => MatchKey::Element(
            tree.node_namespace_uri(item.node()),
            tree.node_local_name(item.node()).unwrap_or_default(),
        ),
        NodeType::Text | NodeType::CData => MatchKey::CharData,
        NodeType::Comment => MatchKey::Comment,
        NodeType::ProcessingInstruction => {
            MatchKey::ProcessingInstruction(tree.node_name(item.node()).unwrap_or_default())
        }
        NodeType::Document | NodeType::Attribute => MatchKey::Other,
    }
}

fn attribute_key<T: XmlTree>(tree: &T, attr: T::Node) -> (Option<String>, String) {
    (
        tree.node_namespace_uri(attr),
        tree.node_local_name(attr).unwrap_or_default(),
    )
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn or_null(value: Option<String>) -> String {
    value.unwrap_or_else(|| "null".to_string())
}

fn node_label<T: XmlTree>(tree: &T, node: T::Node) -> String {
    match tree.node_type(node) {
        NodeType::Element | NodeType::ProcessingInstruction => {
            tree.node_name(node).unwrap_or_default()
        }
        other => format!("#{}", other.label()),
    }
}

/// Short rendering of a node for difference messages
pub fn describe<T: XmlTree>(tree: &T, node: T::Node) -> String {
    match tree.node_type(node) {
        NodeType::Document => "#document".to_string(),
        NodeType::Element => {
            let mut out = format!("<{}", tree.node_name(node).unwrap_or_default());
            for attr in tree.attributes(node) {
                out.push_str(&format!(
                    " {}=\"{}\"",
                    tree.node_name(attr).unwrap_or_default(),
                    tree.node_value(attr).unwrap_or_default()
                ));
            }
            out.push_str("...>");
            out
        }
        NodeType::Attribute => match tree.parent(node) {
            Some(owner) => describe(tree, owner),
            None => tree.node_name(node).unwrap_or_default(),
        },
        NodeType::Text => {
            let value = tree.node_value(node).unwrap_or_default();
            match tree.parent(node).and_then(|p| tree.node_name(p)) {
                Some(parent) => format!("<{} ...>{}</{}>", parent, value, parent),
                None => value,
            }
        }
        NodeType::CData => format!("<![CDATA[{}]]>", tree.node_value(node).unwrap_or_default()),
        NodeType::Comment => format!("<!--{}-->", tree.node_value(node).unwrap_or_default()),
        NodeType::ProcessingInstruction => format!(
            "<?{} {}?>",
            tree.node_name(node).unwrap_or_default(),
            tree.node_value(node).unwrap_or_default()
        ),
    }
}

/// Location path of a node, e.g. `/test[1]/a[2]/@id` or `/test[1]/text()[1]`
pub fn xpath<T: XmlTree>(tree: &T, node: T::Node) -> String {
    let mut steps = Vec::new();
    let mut current = node;
    while let Some(parent) = tree.parent(current) {
        steps.push(location_step(tree, current, parent));
        current = parent;
    }
    steps.iter().rev().map(String::as_str).collect()
}

fn location_step<T: XmlTree>(tree: &T, node: T::Node, parent: T::Node) -> String {
    let node_type = tree.node_type(node);
    if node_type == NodeType::Attribute {
        return format!("/@{}", tree.node_name(node).unwrap_or_default());
    }

    let step = |candidate: T::Node| -> bool {
        match node_type {
            NodeType::Element => {
                tree.node_type(candidate) == NodeType::Element
                    && tree.node_name(candidate) == tree.node_name(node)
            }
            NodeType::Text | NodeType::CData => tree.node_type(candidate).is_character_data(),
            other => tree.node_type(candidate) == other,
        }
    };
    let siblings = tree.children(parent);
    let position = siblings
        .iter()
        .take_while(|sibling| **sibling != node)
        .filter(|sibling| step(**sibling))
        .count()
        + 1;

    let test = match node_type {
        NodeType::Element => tree.node_name(node).unwrap_or_default(),
        NodeType::Text | NodeType::CData => "text()".to_string(),
        NodeType::Comment => "comment()".to_string(),
        NodeType::ProcessingInstruction => "processing-instruction()".to_string(),
        NodeType::Document | NodeType::Attribute => String::new(),
    };
    format!("/{}[{}]", test, position)
}
