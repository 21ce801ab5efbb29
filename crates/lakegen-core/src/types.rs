use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Coarse type family used by the inference rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TypeFamily {
    Date,
    Number,
    Other,
}

impl TypeFamily {
    /// Classify a catalog type name.
    ///
    /// Oracle reports `DATE` and `NUMBER`; Postgres catalogs report the
    /// upper-cased SQL names (`NUMERIC`, `INTEGER`, ...), which are folded
    /// into the same families.
    pub fn of(data_type: &str) -> Self {
        let normalized = data_type.trim().to_ascii_uppercase();
        let base = normalized
            .split(|c: char| c == '(' || c.is_whitespace())
            .next()
            .unwrap_or("");

        match base {
            "DATE" => TypeFamily::Date,
            "NUMBER" | "NUMERIC" | "DECIMAL" | "INTEGER" | "INT" | "INT2" | "INT4" | "INT8"
            | "SMALLINT" | "BIGINT" => TypeFamily::Number,
            _ => TypeFamily::Other,
        }
    }

    pub fn is_date_or_number(self) -> bool {
        matches!(self, TypeFamily::Date | TypeFamily::Number)
    }
}

/// Hive column type used for staging-table DDL.
pub fn hive_type(data_type: &str) -> &'static str {
    match data_type.trim().to_ascii_uppercase().as_str() {
        "LONG" => "BIGINT",
        "CLOB" | "RAW" => "BINARY",
        _ => "STRING",
    }
}

/// Java type override passed to Sqoop (`--map-column-java`), when one is needed.
pub fn java_type_override(data_type: &str) -> Option<&'static str> {
    match TypeFamily::of(data_type) {
        TypeFamily::Date => Some("String"),
        _ => None,
    }
}
