//! Recursive expansion of schema documents into [`Field`] trees.
//!
//! Every recursive call owns its [`Branch`]: the nesting depth, the file the
//! schema came from and the schema names currently being expanded on the
//! path from the root. A reference to a name already on that path becomes a
//! leaf that carries `ref_name` but no children, so self-referential and
//! mutually recursive schemas terminate without any shared visited set.

use std::collections::BTreeSet;
use std::future::Future;
use std::pin::Pin;

use super::context::Resolution;
use super::refs::schema_name;
use crate::error::ResolveError;
use crate::model::Field;
use crate::parse::scan::{Block, Document, Token, extract_ref};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

const COMPOSITION_KEYS: [&str; 3] = ["allOf", "oneOf", "anyOf"];

/// Per-branch expansion state.
#[derive(Debug, Clone)]
pub struct Branch {
    pub depth: usize,
    pub in_flight: BTreeSet<String>,
    /// Registry path of the document being expanded.
    pub path: String,
}

impl Branch {
    /// Start of an expansion: `schema` at depth 0, already in flight.
    pub fn root(schema: &str, path: &str) -> Self {
        Self {
            depth: 0,
            in_flight: BTreeSet::from([schema.to_string()]),
            path: path.to_string(),
        }
    }

    fn enter(&self, schema: &str, path: &str, depth: usize) -> Self {
        let mut in_flight = self.in_flight.clone();
        in_flight.insert(schema.to_string());
        Self {
            depth,
            in_flight,
            path: path.to_string(),
        }
    }

    fn nested(&self) -> Self {
        Self {
            depth: self.depth + 1,
            ..self.clone()
        }
    }
}

/// Fields of an expanded schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaTree {
    /// Set when the schema is an alias for another document.
    pub name: Option<String>,
    pub fields: Vec<Field>,
}

/// Expand the schema document `content`, read from `branch.path`.
pub fn build_tree<'b>(
    cx: &'b Resolution<'_>,
    content: String,
    branch: Branch,
) -> BoxFuture<'b, Result<SchemaTree, ResolveError>> {
    Box::pin(async move {
        let doc = Document::parse(&content);
        expand_schema(cx, doc.root(), branch).await
    })
}

fn check_depth(cx: &Resolution<'_>, depth: usize, schema: &str) -> Result<(), ResolveError> {
    if depth > cx.limits.max_depth {
        return Err(ResolveError::DepthLimitExceeded {
            limit: cx.limits.max_depth,
            schema: schema.to_string(),
        });
    }
    Ok(())
}

/// `$ref` inside a composition keyword wrapping a single reference.
fn composed_ref<'b>(block: Block<'b>) -> Option<&'b str> {
    COMPOSITION_KEYS.iter().find_map(|key| {
        block
            .child(key)?
            .items()
            .find_map(|part| part.value("$ref"))
    })
}

/// Reference an array's `items` points at.
fn items_ref<'b>(block: Block<'b>) -> Option<&'b str> {
    let (line, body) = block.get("items")?;
    match &line.token {
        Token::Pair(_, value) => extract_ref(value),
        _ => body.value("$ref").or_else(|| composed_ref(body)),
    }
}

fn is_array(block: Block<'_>) -> bool {
    block.value("type") == Some("array") || block.get("items").is_some()
}

/// Fields of `reference`'s target, expanded at `depth`. Empty for names
/// already in flight and for targets that cannot be loaded. A target whose
/// subtree contains no cuts is expanded once per resolution and reused.
async fn expand_ref(
    cx: &Resolution<'_>,
    reference: &str,
    name: &str,
    branch: &Branch,
    depth: usize,
) -> Result<Vec<Field>, ResolveError> {
    if branch.in_flight.contains(name) {
        log::debug!("{name} is already being expanded from {}", branch.path);
        cx.note_cut();
        return Ok(Vec::new());
    }
    check_depth(cx, depth, name)?;

    let Some(target) = cx.locate(reference, &branch.path) else {
        return Ok(Vec::new());
    };
    if let Some(fields) = cx.recall(&target.path, depth) {
        return Ok(fields);
    }
    cx.begin_expansion()?;
    let Some(loaded) = cx.load(target, reference).await? else {
        return Ok(Vec::new());
    };

    let cuts = cx.cuts();
    let child = branch.enter(name, &loaded.path, depth);
    let tree = build_tree(cx, loaded.content, child).await?;
    if cx.cuts() == cuts {
        cx.remember(&loaded.path, depth, &tree.fields);
    }
    Ok(tree.fields)
}

fn expand_schema<'b>(
    cx: &'b Resolution<'_>,
    block: Block<'b>,
    branch: Branch,
) -> BoxFuture<'b, Result<SchemaTree, ResolveError>> {
    Box::pin(async move {
        let array = is_array(block);
        if !array && block.get("properties").is_none() && block.get("allOf").is_none() {
            if let Some(reference) = block.value("$ref") {
                let name = schema_name(reference);
                let fields = expand_ref(cx, reference, &name, &branch, branch.depth).await?;
                return Ok(SchemaTree {
                    name: Some(name),
                    fields,
                });
            }
        }

        let mut fields = Vec::new();
        if let Some(parts) = block.child("allOf") {
            for part in parts.items() {
                match part.value("$ref") {
                    Some(reference) => {
                        let name = schema_name(reference);
                        fields.extend(expand_ref(cx, reference, &name, &branch, branch.depth).await?);
                    }
                    None => fields.extend(expand_object(cx, part, branch.clone()).await?),
                }
            }
        }

        if array {
            if let Some(reference) = items_ref(block) {
                let name = schema_name(reference);
                fields.extend(expand_ref(cx, reference, &name, &branch, branch.depth).await?);
            } else if let Some(items) = block.child("items") {
                fields.extend(expand_object(cx, items, branch.clone()).await?);
            }
        }

        fields.extend(expand_object(cx, block, branch).await?);
        Ok(SchemaTree { name: None, fields })
    })
}

/// Fields for the `properties` of `block`, at `branch.depth`. `required` is
/// read from this level only.
fn expand_object<'b>(
    cx: &'b Resolution<'_>,
    block: Block<'b>,
    branch: Branch,
) -> BoxFuture<'b, Result<Vec<Field>, ResolveError>> {
    Box::pin(async move {
        let Some(properties) = block.child("properties") else {
            return Ok(Vec::new());
        };
        let required = block.list("required");

        let mut fields = Vec::new();
        for (line, body) in properties.children() {
            let Some(name) = line.key() else {
                continue;
            };
            let inline_ref = match &line.token {
                Token::Pair(_, value) => extract_ref(value),
                _ => None,
            };
            let mut field = Field::new(name, branch.depth);
            field.required = required.iter().any(|r| r == name);
            expand_property(cx, &mut field, body, inline_ref, &branch).await?;
            fields.push(field);
        }
        Ok(fields)
    })
}

async fn expand_property(
    cx: &Resolution<'_>,
    field: &mut Field,
    body: Block<'_>,
    inline_ref: Option<&str>,
    branch: &Branch,
) -> Result<(), ResolveError> {
    field.field_type = body.value("type").map(str::to_string);
    field.format = body.value("format").map(str::to_string);
    field.description = body.value("description").map(str::to_string);
    field.example = body.value("example").map(str::to_string);

    let reference = inline_ref
        .or_else(|| body.value("$ref"))
        .or_else(|| composed_ref(body));

    if let Some(reference) = reference {
        let name = schema_name(reference);
        field.field_type.get_or_insert_with(|| "object".to_string());
        field.children = expand_ref(cx, reference, &name, branch, branch.depth + 1).await?;
        field.ref_name = Some(name);
    } else if is_array(body) {
        field.is_array = true;
        field.field_type.get_or_insert_with(|| "array".to_string());
        if let Some(reference) = items_ref(body) {
            let name = schema_name(reference);
            field.children = expand_ref(cx, reference, &name, branch, branch.depth + 1).await?;
            field.ref_name = Some(name);
        } else if let Some(items) = body.child("items") {
            check_depth(cx, branch.depth + 1, &field.name)?;
            field.children = expand_object(cx, items, branch.nested()).await?;
        }
    } else if body.get("properties").is_some() {
        field.field_type.get_or_insert_with(|| "object".to_string());
        check_depth(cx, branch.depth + 1, &field.name)?;
        field.children = expand_object(cx, body, branch.nested()).await?;
    }
    Ok(())
}
