use serde_json::{json, Map, Value};

/// JSON type of one schema property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Number,
    String,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Number => "number",
            FieldKind::String => "string",
        }
    }

    pub fn accepts(self, value: &Value) -> bool {
        match self {
            FieldKind::Number => value.as_f64().is_some_and(f64::is_finite),
            FieldKind::String => value.is_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub key: String,
    pub kind: FieldKind,
    pub description: String,
    pub required: bool,
}

/// Typed description of the object the scoring backend must return.
///
/// Properties serialize in declaration order and undeclared properties
/// are always forbidden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSchema {
    fields: Vec<FieldDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateField {
    pub key: String,
}

#[derive(Debug, Default)]
pub struct RequestSchemaBuilder {
    fields: Vec<FieldDescriptor>,
}

impl RequestSchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(
        &mut self,
        key: impl Into<String>,
        kind: FieldKind,
        description: impl Into<String>,
    ) -> Result<&mut Self, DuplicateField> {
        self.push(key.into(), kind, description.into(), true)
    }

    pub fn optional(
        &mut self,
        key: impl Into<String>,
        kind: FieldKind,
        description: impl Into<String>,
    ) -> Result<&mut Self, DuplicateField> {
        self.push(key.into(), kind, description.into(), false)
    }

    fn push(
        &mut self,
        key: String,
        kind: FieldKind,
        description: String,
        required: bool,
    ) -> Result<&mut Self, DuplicateField> {
        if self.fields.iter().any(|f| f.key == key) {
            return Err(DuplicateField { key });
        }
        self.fields.push(FieldDescriptor {
            key,
            kind,
            description,
            required,
        });
        Ok(self)
    }

    pub fn build(self) -> RequestSchema {
        RequestSchema {
            fields: self.fields,
        }
    }
}

impl RequestSchema {
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn required_keys(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.key.as_str())
            .collect()
    }

    /// JSON Schema object suitable as function-call parameters.
    pub fn to_json(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            properties.insert(
                field.key.clone(),
                json!({
                    "type": field.kind.as_str(),
                    "description": field.description,
                }),
            );
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": self.required_keys(),
            "additionalProperties": false,
        })
    }
}
