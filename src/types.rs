use serde_json::{json, Map, Value};

/// Simple type system for structured-output contracts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDef {
    Text,
    /// String restricted to a closed set of values.
    OneOf(&'static [&'static str]),
    List(Box<TypeDef>),
    Object(Vec<FieldDef>),
}

/// A named, required object field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub ty: TypeDef,
}

impl FieldDef {
    pub fn new(name: &'static str, ty: TypeDef) -> Self {
        Self { name, ty }
    }
}

impl TypeDef {
    pub fn list(inner: TypeDef) -> Self {
        TypeDef::List(Box::new(inner))
    }

    /// Field names of an object shape, in declaration order.
    pub fn field_names(&self) -> Vec<&'static str> {
        match self {
            TypeDef::Object(fields) => fields.iter().map(|f| f.name).collect(),
            _ => Vec::new(),
        }
    }

    /// Renders the Gemini `responseSchema` form (OpenAPI subset, upper-case type names).
    pub fn to_gemini_schema(&self) -> Value {
        self.render(Dialect::Gemini)
    }

    /// Renders a plain JSON Schema, as accepted by Ollama's `format` field.
    pub fn to_json_schema(&self) -> Value {
        self.render(Dialect::JsonSchema)
    }

    fn render(&self, dialect: Dialect) -> Value {
        match self {
            TypeDef::Text => json!({ "type": dialect.name("string") }),
            TypeDef::OneOf(values) => json!({
                "type": dialect.name("string"),
                "enum": values,
            }),
            TypeDef::List(inner) => json!({
                "type": dialect.name("array"),
                "items": inner.render(dialect),
            }),
            TypeDef::Object(fields) => {
                let mut properties = Map::new();
                for f in fields {
                    properties.insert(f.name.to_string(), f.ty.render(dialect));
                }
                let names: Vec<&str> = fields.iter().map(|f| f.name).collect();

                let mut obj = Map::new();
                obj.insert("type".into(), json!(dialect.name("object")));
                obj.insert("properties".into(), Value::Object(properties));
                obj.insert("required".into(), json!(names));
                if dialect == Dialect::Gemini {
                    obj.insert("propertyOrdering".into(), json!(names));
                }
                Value::Object(obj)
            }
        }
    }

    /// Human-readable schema description, for backends that only see the prompt.
    pub fn describe(&self) -> String {
        describe_schema(self, 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    Gemini,
    JsonSchema,
}

impl Dialect {
    fn name(self, base: &'static str) -> String {
        match self {
            Dialect::Gemini => base.to_ascii_uppercase(),
            Dialect::JsonSchema => base.to_string(),
        }
    }
}

fn describe_schema(ty: &TypeDef, indent: usize) -> String {
    use TypeDef::*;
    let mut s = String::new();
    let pad = " ".repeat(indent);

    match ty {
        Text => s.push_str(&format!("{pad}- string\n")),
        OneOf(values) => s.push_str(&format!("{pad}- one of: {}\n", values.join(", "))),
        List(inner) => {
            s.push_str(&format!("{pad}- array of:\n"));
            s.push_str(&describe_schema(inner, indent + 2));
        }
        Object(fields) => {
            s.push_str(&format!("{pad}- object with fields:\n"));
            for f in fields {
                s.push_str(&format!("{pad}  - {}: ", f.name));
                match &f.ty {
                    Text => s.push_str("string\n"),
                    OneOf(values) => s.push_str(&format!("one of {}\n", values.join(", "))),
                    List(inner) => {
                        s.push_str("array of:\n");
                        s.push_str(&describe_schema(inner, indent + 4));
                    }
                    Object(_) => {
                        s.push_str("nested object:\n");
                        s.push_str(&describe_schema(&f.ty, indent + 4));
                    }
                }
            }
        }
    }

    s
}
