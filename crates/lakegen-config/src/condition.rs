//! Inclusion predicates for processes.
//!
//! A condition is a closed boolean tree over a fixed set of table/stage
//! fields. In TOML it is written as a tagged table, e.g.
//! `condition = { op = "all", conditions = [{ op = "present", field = "merge_column" }] }`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Fields a condition may inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConditionField {
    MergeColumn,
    CheckColumn,
    SourceName,
    Schema,
    Table,
    Stage,
}

impl ConditionField {
    pub fn as_str(self) -> &'static str {
        match self {
            ConditionField::MergeColumn => "merge_column",
            ConditionField::CheckColumn => "check_column",
            ConditionField::SourceName => "source_name",
            ConditionField::Schema => "schema",
            ConditionField::Table => "table",
            ConditionField::Stage => "stage",
        }
    }
}

/// Supplies field values while a condition is evaluated.
pub trait ConditionContext {
    /// Value of `field`; `None` when absent.
    fn field(&self, field: ConditionField) -> Option<&str>;
}

/// Structured inclusion predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Condition {
    #[default]
    Always,
    Present { field: ConditionField },
    Absent { field: ConditionField },
    Equals { field: ConditionField, value: String },
    OneOf { field: ConditionField, values: Vec<String> },
    All { conditions: Vec<Condition> },
    Any { conditions: Vec<Condition> },
    Not { condition: Box<Condition> },
}

impl Condition {
    /// Both a merge column and a check column are known.
    pub fn incremental() -> Self {
        Condition::All {
            conditions: vec![
                Condition::Present {
                    field: ConditionField::MergeColumn,
                },
                Condition::Present {
                    field: ConditionField::CheckColumn,
                },
            ],
        }
    }

    pub fn evaluate(&self, ctx: &dyn ConditionContext) -> bool {
        match self {
            Condition::Always => true,
            Condition::Present { field } => present(ctx, *field),
            Condition::Absent { field } => !present(ctx, *field),
            Condition::Equals { field, value } => ctx.field(*field) == Some(value.as_str()),
            Condition::OneOf { field, values } => ctx
                .field(*field)
                .is_some_and(|actual| values.iter().any(|value| value == actual)),
            Condition::All { conditions } => conditions.iter().all(|c| c.evaluate(ctx)),
            Condition::Any { conditions } => conditions.iter().any(|c| c.evaluate(ctx)),
            Condition::Not { condition } => !condition.evaluate(ctx),
        }
    }
}

fn present(ctx: &dyn ConditionContext, field: ConditionField) -> bool {
    ctx.field(field).is_some_and(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct Fields(HashMap<ConditionField, &'static str>);

    impl ConditionContext for Fields {
        fn field(&self, field: ConditionField) -> Option<&str> {
            self.0.get(&field).copied()
        }
    }

    fn fields(pairs: &[(ConditionField, &'static str)]) -> Fields {
        Fields(pairs.iter().copied().collect())
    }

    #[test]
    fn incremental_requires_both_columns() {
        let cond = Condition::incremental();
        let both = fields(&[
            (ConditionField::MergeColumn, "ID"),
            (ConditionField::CheckColumn, "LAST_UPD"),
        ]);
        let merge_only = fields(&[(ConditionField::MergeColumn, "ID")]);
        let empty_check = fields(&[
            (ConditionField::MergeColumn, "ID"),
            (ConditionField::CheckColumn, ""),
        ]);

        assert!(cond.evaluate(&both));
        assert!(!cond.evaluate(&merge_only));
        assert!(!cond.evaluate(&empty_check));
    }

    #[test]
    fn combinators_compose() {
        let cond = Condition::Any {
            conditions: vec![
                Condition::OneOf {
                    field: ConditionField::SourceName,
                    values: vec!["CPC".to_string(), "NIS".to_string()],
                },
                Condition::Not {
                    condition: Box::new(Condition::Equals {
                        field: ConditionField::Stage,
                        value: "prod".to_string(),
                    }),
                },
            ],
        };

        assert!(cond.evaluate(&fields(&[
            (ConditionField::SourceName, "NIS"),
            (ConditionField::Stage, "prod"),
        ])));
        assert!(cond.evaluate(&fields(&[
            (ConditionField::SourceName, "BRM"),
            (ConditionField::Stage, "dev"),
        ])));
        assert!(!cond.evaluate(&fields(&[
            (ConditionField::SourceName, "BRM"),
            (ConditionField::Stage, "prod"),
        ])));
    }

    #[test]
    fn parses_tagged_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            condition: Condition,
        }

        let parsed: Wrapper = toml::from_str(
            r#"condition = { op = "all", conditions = [{ op = "present", field = "merge_column" }, { op = "present", field = "check_column" }] }"#,
        )
        .expect("parse condition");
        assert_eq!(parsed.condition, Condition::incremental());
    }
}
