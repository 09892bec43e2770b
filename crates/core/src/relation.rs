use std::fmt;

use crate::ConfigError;

/// A possibly qualified table or view name such as `db.schema.view`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationName {
    pub database: Option<String>,
    pub schema: Option<String>,
    pub name: String,
}

impl RelationName {
    #[must_use]
    pub fn unqualified(name: impl Into<String>) -> Self {
        Self {
            database: None,
            schema: None,
            name: name.into(),
        }
    }

    /// Parses `name`, `schema.name` or `database.schema.name`. Parts must be
    /// plain identifiers so the result can be spliced into SQL unquoted.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidRelation {
            raw: raw.to_string(),
        };

        let parts = raw.trim().split('.').collect::<Vec<_>>();
        if parts.iter().any(|part| !is_plain_identifier(part)) {
            return Err(invalid());
        }

        match parts.as_slice() {
            [name] => Ok(Self::unqualified(*name)),
            [schema, name] => Ok(Self {
                database: None,
                schema: Some((*schema).to_string()),
                name: (*name).to_string(),
            }),
            [database, schema, name] => Ok(Self {
                database: Some((*database).to_string()),
                schema: Some((*schema).to_string()),
                name: (*name).to_string(),
            }),
            _ => Err(invalid()),
        }
    }

    /// Same qualification, different final name.
    #[must_use]
    pub fn sibling(&self, name: impl Into<String>) -> Self {
        Self {
            database: self.database.clone(),
            schema: self.schema.clone(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RelationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(database) = &self.database {
            write!(f, "{database}.")?;
        }
        if let Some(schema) = &self.schema {
            write!(f, "{schema}.")?;
        }
        f.write_str(&self.name)
    }
}

/// Double-quotes an identifier, doubling embedded quotes.
#[must_use]
pub fn quote_identifier(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Single-quotes a string literal, doubling embedded quotes.
#[must_use]
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn is_plain_identifier(part: &str) -> bool {
    let mut chars = part.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '$'))
}
