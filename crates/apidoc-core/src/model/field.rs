use serde::{Deserialize, Serialize};

/// One property of an expanded schema.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    pub required: bool,
    /// Nesting level; top-level properties are 0.
    pub depth: usize,
    /// Name of the schema this field was expanded from, if it came via `$ref`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_name: Option<String>,
    /// The field is an array; `children` describe one element.
    pub is_array: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Field>,
    /// Where the value comes from, as documented by a human.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, depth: usize) -> Self {
        Self {
            name: name.into(),
            depth,
            ..Self::default()
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Visit every field of a tree, parents before children.
pub fn for_each_field_mut(fields: &mut [Field], f: &mut impl FnMut(&mut Field)) {
    for field in fields {
        f(field);
        for_each_field_mut(&mut field.children, f);
    }
}

/// Count every field of a tree.
pub fn count_fields(fields: &[Field]) -> usize {
    fields.iter().map(|f| 1 + count_fields(&f.children)).sum()
}
