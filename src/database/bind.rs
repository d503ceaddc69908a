//! Bound statement parameters.

use anyhow::{anyhow, Result};
use rusqlite::types::Value;
use rusqlite::Statement;

/// Values bound to a prepared statement, positionally or by name.
///
/// Values always travel through statement parameters; SQL text is never
/// assembled by concatenating values in. A statement that declares
/// parameters must receive exactly that many values, and every named value
/// must resolve to a placeholder in the SQL.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BindValues {
    /// No parameters.
    #[default]
    None,
    /// Ordered values for `?1`-style placeholders.
    Positional(Vec<Value>),
    /// Keyed values for `:name`-style placeholders. The leading `:` on the
    /// key is optional.
    Named(Vec<(String, Value)>),
}

impl BindValues {
    /// Ordered values for positional placeholders.
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        BindValues::Positional(values.into_iter().map(Into::into).collect())
    }

    /// Keyed values for named placeholders.
    pub fn named<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        BindValues::Named(
            values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        match self {
            BindValues::None => true,
            BindValues::Positional(values) => values.is_empty(),
            BindValues::Named(values) => values.is_empty(),
        }
    }
}

/// Bind `values` onto a prepared statement.
pub(crate) fn apply(stmt: &mut Statement<'_>, values: &BindValues) -> Result<()> {
    let declared = stmt.parameter_count();
    match values {
        BindValues::None => {
            if declared != 0 {
                return Err(anyhow!(
                    "Statement declares {} parameters but no values were bound",
                    declared
                ));
            }
            Ok(())
        }
        BindValues::Positional(values) => {
            if values.len() != declared {
                return Err(anyhow!(
                    "Statement declares {} parameters but {} values were bound",
                    declared,
                    values.len()
                ));
            }
            for (i, value) in values.iter().enumerate() {
                stmt.raw_bind_parameter(i + 1, value)
                    .map_err(|e| anyhow!("Failed to bind parameter {}: {}", i + 1, e))?;
            }
            Ok(())
        }
        BindValues::Named(values) => {
            if values.len() != declared {
                return Err(anyhow!(
                    "Statement declares {} parameters but {} values were bound",
                    declared,
                    values.len()
                ));
            }
            for (name, value) in values {
                let index = named_index(stmt, name)?;
                stmt.raw_bind_parameter(index, value)
                    .map_err(|e| anyhow!("Failed to bind parameter '{}': {}", name, e))?;
            }
            Ok(())
        }
    }
}

fn named_index(stmt: &Statement<'_>, name: &str) -> Result<usize> {
    let lookup = |candidate: &str| -> Result<Option<usize>> {
        stmt.parameter_index(candidate)
            .map_err(|e| anyhow!("Failed to resolve parameter '{}': {}", candidate, e))
    };

    if let Some(index) = lookup(name)? {
        return Ok(index);
    }
    if !name.starts_with(&[':', '@', '$'][..]) {
        if let Some(index) = lookup(&format!(":{}", name))? {
            return Ok(index);
        }
    }
    Err(anyhow!("Statement has no parameter named '{}'", name))
}
