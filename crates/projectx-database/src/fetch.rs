//! Fetch graphs: which relations to populate alongside the root entity.
//!
//! A graph touching only to-one relations is loaded with plain joins. Any
//! to-many relation switches paged reads to the id-first protocol.

use projectx_core::{AppError, AppResult};
use projectx_entity::{EntityMeta, RelationDef};

/// A requested relation, with the relations to load beneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Include {
    pub name: String,
    pub nested: Vec<Include>,
}

impl Include {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nested: Vec::new(),
        }
    }

    pub fn with(mut self, nested: Include) -> Self {
        self.nested.push(nested);
        self
    }
}

/// A validated relation in a fetch graph.
#[derive(Debug, Clone)]
pub struct FetchNode {
    pub relation: &'static RelationDef,
    pub children: Vec<FetchNode>,
}

impl FetchNode {
    fn has_collection(&self) -> bool {
        self.relation.is_collection() || self.children.iter().any(FetchNode::has_collection)
    }
}

/// Relations to eagerly load for one root entity.
#[derive(Debug, Clone)]
pub struct FetchGraph {
    root: &'static EntityMeta,
    nodes: Vec<FetchNode>,
}

impl FetchGraph {
    /// Load the root entity only.
    pub fn none(root: &'static EntityMeta) -> Self {
        Self {
            root,
            nodes: Vec::new(),
        }
    }

    /// Validate `includes` against the registry. Repeated relations merge.
    pub fn new(root: &'static EntityMeta, includes: Vec<Include>) -> AppResult<Self> {
        Ok(Self {
            root,
            nodes: resolve(root, includes)?,
        })
    }

    /// Parse a graph such as `roleActions(action), administratorRoles`.
    ///
    /// The list may be wrapped in the root entity name, as in
    /// `Role(roleActions(action))`.
    pub fn parse(root: &'static EntityMeta, input: &str) -> AppResult<Self> {
        if input.trim().is_empty() {
            return Ok(Self::none(root));
        }
        let mut parser = Parser { input, pos: 0 };
        let mut includes = parser.list()?;
        parser.skip_whitespace();
        if parser.pos < input.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        if let [single] = includes.as_slice() {
            if single.name == root.name && root.relation(&single.name).is_none() {
                includes = includes.remove(0).nested;
            }
        }
        Self::new(root, includes)
    }

    pub fn root(&self) -> &'static EntityMeta {
        self.root
    }

    pub fn nodes(&self) -> &[FetchNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether any requested relation, at any depth, is to-many.
    pub fn has_collection(&self) -> bool {
        self.nodes.iter().any(FetchNode::has_collection)
    }
}

fn resolve(meta: &'static EntityMeta, includes: Vec<Include>) -> AppResult<Vec<FetchNode>> {
    let mut nodes: Vec<FetchNode> = Vec::new();
    for include in includes {
        let relation = meta.relation(&include.name).ok_or_else(|| {
            AppError::invalid_field(
                meta.name,
                include.name.as_str(),
                format!("{} has no relation '{}'", meta.name, include.name),
            )
        })?;
        let children = resolve(relation.target, include.nested)?;
        match nodes.iter_mut().find(|n| n.relation.name == relation.name) {
            Some(existing) => merge(&mut existing.children, children),
            None => nodes.push(FetchNode { relation, children }),
        }
    }
    Ok(nodes)
}

fn merge(into: &mut Vec<FetchNode>, nodes: Vec<FetchNode>) {
    for node in nodes {
        match into.iter_mut().find(|n| n.relation.name == node.relation.name) {
            Some(existing) => merge(&mut existing.children, node.children),
            None => into.push(node),
        }
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn list(&mut self) -> AppResult<Vec<Include>> {
        let mut items = vec![self.item()?];
        loop {
            self.skip_whitespace();
            if !self.eat(',') {
                return Ok(items);
            }
            items.push(self.item()?);
        }
    }

    fn item(&mut self) -> AppResult<Include> {
        self.skip_whitespace();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !(c.is_ascii_alphanumeric() || c == '_') {
                break;
            }
            self.pos += c.len_utf8();
        }
        if start == self.pos {
            return Err(self.error("expected a relation name"));
        }
        let mut include = Include::new(&self.input[start..self.pos]);
        self.skip_whitespace();
        if self.eat('(') {
            include.nested = self.list()?;
            self.skip_whitespace();
            if !self.eat(')') {
                return Err(self.error("expected ')'"));
            }
        }
        Ok(include)
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn error(&self, reason: &str) -> AppError {
        AppError::configuration(format!(
            "Invalid fetch graph '{}' at position {}: {reason}",
            self.input, self.pos
        ))
    }
}
