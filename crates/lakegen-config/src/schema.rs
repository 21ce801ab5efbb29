use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::model::ConfigModel;

/// Emit the JSON Schema for the generator config.
pub fn config_json_schema() -> RootSchema {
    schema_for!(ConfigModel)
}
