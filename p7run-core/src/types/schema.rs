use std::fmt;

/// Value shape of a parameter or result slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaType {
    Scalar,
    List,
    Dictionary,
}

/// `@type` tags the server uses for single values.
const SCALAR_TAGS: &[&str] = &["Scalar", "Real", "Integer", "String", "Boolean"];

impl SchemaType {
    /// Classify a server `@type` tag. Unknown tags yield `None` and must be rejected by callers.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "List" => Some(Self::List),
            "Dictionary" => Some(Self::Dictionary),
            t if SCALAR_TAGS.contains(&t) => Some(Self::Scalar),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scalar => "Scalar",
            Self::List => "List",
            Self::Dictionary => "Dictionary",
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
