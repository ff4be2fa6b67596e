//! The externally supplied category/tool taxonomy.
//!
//! A [`DomainNode`] tree is handed over fresh on every data load and is never mutated by the
//! renderer. Validation happens once at the boundary (`from_value`) so everything downstream
//! can rely on a well-formed tree.

use crate::error::{Error, Result};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Category/folder-like node that can hold children.
    Branch,
    /// Actionable resource (tool/link).
    Leaf,
}

impl NodeKind {
    /// Accepts the canonical names plus the content backend's vocabulary
    /// (`folder`/`category`/`root`, `url`/`tool`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "branch" | "folder" | "category" | "root" => Some(Self::Branch),
            "leaf" | "url" | "tool" => Some(Self::Leaf),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Branch => "branch",
            Self::Leaf => "leaf",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct DomainNode {
    pub name: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Set by the search collaborator on nodes that match the active query.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub highlighted: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DomainNode>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaxonomyStats {
    pub branches: usize,
    pub leaves: usize,
    pub highlighted: usize,
    pub max_depth: usize,
}

impl TaxonomyStats {
    pub fn total(&self) -> usize {
        self.branches + self.leaves
    }
}

impl TryFrom<Value> for DomainNode {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(&value)
    }
}

impl DomainNode {
    pub fn branch(name: impl Into<String>, children: Vec<DomainNode>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Branch,
            url: None,
            highlighted: false,
            children,
        }
    }

    pub fn leaf(name: impl Into<String>, url: Option<&str>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Leaf,
            url: url.map(str::to_string),
            highlighted: false,
            children: Vec::new(),
        }
    }

    pub fn with_highlight(mut self, highlighted: bool) -> Self {
        self.highlighted = highlighted;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.kind == NodeKind::Leaf
    }

    /// Parses taxonomy text of any nesting depth.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let mut de = serde_json::Deserializer::from_str(text);
        de.disable_recursion_limit();
        let value = Value::deserialize(serde_stacker::Deserializer::new(&mut de))?;
        de.end()?;
        Self::from_value(&value)
    }

    /// Validates and converts a JSON taxonomy, failing on the first malformed node.
    pub fn from_value(value: &Value) -> Result<Self> {
        parse_tree(value)
    }

    pub fn stats(&self) -> TaxonomyStats {
        let mut stats = TaxonomyStats::default();
        let mut stack: Vec<(&DomainNode, usize)> = vec![(self, 0)];
        while let Some((node, depth)) = stack.pop() {
            match node.kind {
                NodeKind::Branch => stats.branches += 1,
                NodeKind::Leaf => stats.leaves += 1,
            }
            if node.highlighted {
                stats.highlighted += 1;
            }
            stats.max_depth = stats.max_depth.max(depth);
            stack.extend(node.children.iter().map(|c| (c, depth + 1)));
        }
        stats
    }

    /// Names of branches that lie on a path to a highlighted descendant, in pre-order.
    pub fn highlighted_ancestor_names(&self) -> IndexSet<String> {
        let mut order: Vec<(&DomainNode, Option<usize>)> = Vec::new();
        let mut stack: Vec<(&DomainNode, Option<usize>)> = vec![(self, None)];
        while let Some((node, parent)) = stack.pop() {
            let idx = order.len();
            order.push((node, parent));
            stack.extend(node.children.iter().rev().map(|c| (c, Some(idx))));
        }

        // Descendants sit after their ancestors, so one backward sweep settles every flag.
        let mut on_path = vec![false; order.len()];
        for i in (0..order.len()).rev() {
            let (node, parent) = order[i];
            if let Some(p) = parent {
                on_path[p] |= on_path[i] || node.highlighted;
            }
        }

        order
            .iter()
            .zip(on_path)
            .filter_map(|((node, _), hit)| hit.then(|| node.name.clone()))
            .collect()
    }
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A validated node waiting for its children.
struct Parsed {
    node: DomainNode,
    parent: Option<usize>,
    slot: usize,
}

/// `$.children[i].children[j]...` for a node that has not been pushed yet.
fn json_path(parsed: &[Parsed], mut parent: Option<usize>, slot: usize) -> String {
    let mut slots = Vec::new();
    if parent.is_some() {
        slots.push(slot);
    }
    while let Some(p) = parent {
        let up = &parsed[p];
        if up.parent.is_some() {
            slots.push(up.slot);
        }
        parent = up.parent;
    }
    let mut path = String::from("$");
    for i in slots.iter().rev() {
        path.push_str(&format!(".children[{i}]"));
    }
    path
}

fn parse_tree(root: &Value) -> Result<DomainNode> {
    let mut parsed: Vec<Parsed> = Vec::new();
    let mut pending: Vec<(&Value, Option<usize>, usize)> = vec![(root, None, 0)];
    while let Some((value, parent, slot)) = pending.pop() {
        let (node, raw_children) = parse_fields(value)
            .map_err(|message| Error::malformed(&json_path(&parsed, parent, slot), message))?;
        let idx = parsed.len();
        pending.extend(
            raw_children
                .iter()
                .enumerate()
                .rev()
                .map(|(i, child)| (child, Some(idx), i)),
        );
        parsed.push(Parsed { node, parent, slot });
    }

    // `parsed` is in pre-order: popping from the back finishes every child before its parent.
    while let Some(Parsed { mut node, parent, .. }) = parsed.pop() {
        node.children.reverse();
        match parent {
            Some(p) => parsed[p].node.children.push(node),
            None => return Ok(node),
        }
    }
    Err(Error::malformed("$", "empty taxonomy"))
}

/// Checks one node's own fields. Children come back unparsed.
fn parse_fields(value: &Value) -> std::result::Result<(DomainNode, &[Value]), String> {
    let Some(obj) = value.as_object() else {
        return Err(format!("expected an object node, found {}", json_type(value)));
    };

    let name = match obj.get("name") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            return Err(format!("`name` must be a string, found {}", json_type(other)));
        }
        None => return Err("missing required field `name`".to_string()),
    };

    let url = match obj.get("url") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            return Err(format!("`url` must be a string, found {}", json_type(other)));
        }
    };

    let highlighted = match obj.get("highlighted") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            return Err(format!(
                "`highlighted` must be a boolean, found {}",
                json_type(other)
            ));
        }
    };

    let raw_children: &[Value] = match obj.get("children") {
        None | Some(Value::Null) => &[],
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(format!(
                "`children` must be an array, found {}",
                json_type(other)
            ));
        }
    };

    let kind = match obj.get("kind").or_else(|| obj.get("type")) {
        None | Some(Value::Null) => {
            if url.is_some() && raw_children.is_empty() {
                NodeKind::Leaf
            } else {
                NodeKind::Branch
            }
        }
        Some(Value::String(s)) => NodeKind::parse(s)
            .ok_or_else(|| format!("unknown node kind `{s}` for `{name}`"))?,
        Some(other) => {
            return Err(format!("`kind` must be a string, found {}", json_type(other)));
        }
    };

    if kind == NodeKind::Leaf && !raw_children.is_empty() {
        return Err(format!("leaf `{name}` cannot have children"));
    }

    let node = DomainNode {
        name,
        kind,
        url,
        highlighted,
        children: Vec::with_capacity(raw_children.len()),
    };
    Ok((node, raw_children))
}
