//! Jinja rendering for config values (target databases, feed paths,
//! property defaults) and for artifact templates.
//!
//! Config values use `{{ key }}` placeholders resolved against the job
//! values. `${NAME}` scheduler macros are plain text to the renderer and pass
//! through untouched. Undefined keys are errors.

use std::collections::BTreeMap;

use minijinja::{AutoEscape, Environment, Template, UndefinedBehavior};

use lakegen_config::ConfigModel;

const INLINE_TEMPLATE: &str = "<value>";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// A placeholder names a key the job values do not know.
    #[error("no value for placeholder '{0}'")]
    MissingKey(String),
    #[error("invalid template '{template}': {message}")]
    Syntax { template: String, message: String },
    #[error("failed to render '{template}': {message}")]
    Render { template: String, message: String },
}

impl TemplateError {
    /// Issue code used in generation reports.
    pub fn code(&self) -> &'static str {
        match self {
            TemplateError::MissingKey(_) => "missing_substitution",
            TemplateError::Syntax { .. } | TemplateError::Render { .. } => "invalid_template",
        }
    }

    pub(crate) fn syntax(template: &str, err: minijinja::Error) -> Self {
        TemplateError::Syntax {
            template: template.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn render(template: &str, err: minijinja::Error) -> Self {
        TemplateError::Render {
            template: template.to_string(),
            message: err.to_string(),
        }
    }
}

/// Environment shared by value and artifact templates: strict undefined
/// values, no auto-escaping (XML templates call the `xml` filter), block tags
/// do not leave blank lines.
pub(crate) fn base_environment<'s>() -> Environment<'s> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(true);
    env.add_filter("xml", xml_escape);
    env
}

fn xml_escape(value: String) -> String {
    quick_xml::escape::escape(value.as_str()).into_owned()
}

/// Config value templates, compiled once per generation pass.
///
/// Templates are keyed by their own source text, so identical values share
/// one compiled template.
pub struct ValueTemplates<'a> {
    env: Environment<'a>,
}

impl Default for ValueTemplates<'_> {
    fn default() -> Self {
        Self {
            env: base_environment(),
        }
    }
}

impl<'a> ValueTemplates<'a> {
    /// Compile every templated value of `config`.
    ///
    /// Values that fail to compile are returned with their config path; they
    /// fail again, per job, when rendered.
    pub fn for_config(config: &'a ConfigModel) -> (Self, Vec<(String, TemplateError)>) {
        let oozie = [
            ("defaults", &config.oozie.defaults),
            ("file_defaults", &config.oozie.file_defaults),
        ];
        let sources = config
            .stage
            .iter()
            .map(|(name, stage)| (format!("/stage/{name}/targetdb"), stage.targetdb.as_str()))
            .chain(
                config
                    .feed
                    .iter()
                    .map(|(name, feed)| (format!("/feed/{name}/path"), feed.path.as_str())),
            )
            .chain(
                config
                    .hive_feed
                    .iter()
                    .map(|(name, feed)| (format!("/hive_feed/{name}/path"), feed.path.as_str())),
            )
            .chain(oozie.into_iter().flat_map(|(field, defaults)| {
                defaults.iter().enumerate().filter_map(move |(idx, default)| {
                    default
                        .value
                        .as_deref()
                        .map(|value| (format!("/oozie/{field}/{idx}/value"), value))
                })
            }));

        let mut templates = Self::default();
        let mut failures = Vec::new();
        for (path, source) in sources {
            if let Err(err) = templates.add(source) {
                failures.push((path, err));
            }
        }
        (templates, failures)
    }

    pub fn add(&mut self, source: &'a str) -> Result<(), TemplateError> {
        if self.env.get_template(source).is_ok() {
            return Ok(());
        }
        self.env
            .add_template(source, source)
            .map_err(|err| TemplateError::syntax(source, err))
    }

    /// Render `source` against `values`.
    ///
    /// Sources that were not added are compiled on the fly.
    pub fn render(
        &self,
        source: &str,
        values: &BTreeMap<String, String>,
    ) -> Result<String, TemplateError> {
        if let Ok(template) = self.env.get_template(source) {
            return render_value(&template, source, values);
        }

        let mut env = base_environment();
        env.add_template(INLINE_TEMPLATE, source)
            .map_err(|err| TemplateError::syntax(source, err))?;
        let template = env
            .get_template(INLINE_TEMPLATE)
            .map_err(|err| TemplateError::syntax(source, err))?;
        render_value(&template, source, values)
    }
}

fn render_value(
    template: &Template<'_, '_>,
    source: &str,
    values: &BTreeMap<String, String>,
) -> Result<String, TemplateError> {
    let mut missing: Vec<String> = template
        .undeclared_variables(false)
        .into_iter()
        .filter(|name| !values.contains_key(name))
        .collect();
    missing.sort();
    if let Some(key) = missing.into_iter().next() {
        return Err(TemplateError::MissingKey(key));
    }

    template
        .render(values)
        .map_err(|err| TemplateError::render(source, err))
}
