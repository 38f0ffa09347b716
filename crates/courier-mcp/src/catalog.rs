//! Tool catalog: the static list of tools an adapter exposes.
//!
//! Descriptors are pure metadata. They are built once when the adapter is
//! constructed and rendered verbatim for `tools/list`.

use serde_json::{Map, Value, json};

/// Primitive type of an input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// JSON string.
    String,
    /// JSON object with arbitrary keys.
    Object,
}

impl FieldKind {
    /// JSON Schema type name.
    pub fn schema_type(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Object => "object",
        }
    }
}

/// One named input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Argument key.
    pub name: &'static str,
    /// Primitive type.
    pub kind: FieldKind,
    /// Human description shown to the caller.
    pub description: &'static str,
    /// Whether the caller must supply it.
    pub required: bool,
}

/// A tool's name, intent and argument shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDescriptor {
    /// Unique tool name.
    pub name: &'static str,
    /// Human description.
    pub description: &'static str,
    /// Input fields, in declaration order.
    pub fields: Vec<FieldSpec>,
}

impl ToolDescriptor {
    /// Start a descriptor with no fields.
    pub fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            fields: Vec::new(),
        }
    }

    /// Add a required field.
    pub fn required(
        mut self,
        name: &'static str,
        kind: FieldKind,
        description: &'static str,
    ) -> Self {
        self.fields.push(FieldSpec {
            name,
            kind,
            description,
            required: true,
        });
        self
    }

    /// Add an optional field.
    pub fn optional(
        mut self,
        name: &'static str,
        kind: FieldKind,
        description: &'static str,
    ) -> Self {
        self.fields.push(FieldSpec {
            name,
            kind,
            description,
            required: false,
        });
        self
    }

    /// Names of the required fields.
    pub fn required_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().filter(|f| f.required).map(|f| f.name)
    }

    /// Render the input schema as a JSON Schema object.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            properties.insert(
                field.name.to_string(),
                json!({
                    "type": field.kind.schema_type(),
                    "description": field.description,
                }),
            );
        }
        let required: Vec<&str> = self.required_fields().collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// An immutable, ordered set of tool descriptors with unique names.
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    tools: Vec<ToolDescriptor>,
}

impl ToolCatalog {
    /// Build a catalog.
    ///
    /// # Panics
    ///
    /// Panics if two descriptors share a name. Catalogs are static tables
    /// written in code, so a duplicate is a programming error.
    pub fn new(tools: Vec<ToolDescriptor>) -> Self {
        for (i, tool) in tools.iter().enumerate() {
            assert!(
                !tools[..i].iter().any(|t| t.name == tool.name),
                "duplicate tool name in catalog: {}",
                tool.name
            );
        }
        Self { tools }
    }

    /// Look up a descriptor by exact name.
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// Check whether a tool exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Tool names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tools.iter().map(|t| t.name)
    }

    /// All descriptors.
    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter()
    }

    /// Number of tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
