use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SecretRef {
    pub scheme: String,
    pub id: String,
}

impl SecretRef {
    pub fn parse(input: &str) -> Result<Self, SecretRefParseError> {
        let s = input.trim();
        let (scheme, id) = s
            .split_once("://")
            .ok_or(SecretRefParseError::MissingScheme)?;
        if !is_valid_scheme(scheme) {
            return Err(SecretRefParseError::InvalidScheme(scheme.to_string()));
        }
        if id.is_empty() {
            return Err(SecretRefParseError::EmptyId);
        }
        Ok(Self {
            scheme: scheme.to_string(),
            id: id.to_string(),
        })
    }
}

impl fmt::Display for SecretRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // an identifier, never the secret itself
        write!(f, "{}://{}", self.scheme, self.id)
    }
}

fn is_valid_scheme(s: &str) -> bool {
    // ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SecretRefParseError {
    #[error("secret reference must be URI-like (e.g. secrets://P7RUN_API_TOKEN)")]
    MissingScheme,
    #[error("invalid secret reference scheme: '{0}'")]
    InvalidScheme(String),
    #[error("secret reference id must not be empty")]
    EmptyId,
}
