use std::collections::HashMap;
use chatflow_base::{NamedStore, RegistryError};
use crate::ReplyError;


/// Replace every `{{key}}` in `escaped_template` with its already escaped value.
///
/// Placeholders without a param are left as they are.
pub fn render_template<ES>(escaped_template: &str, params: &HashMap<&str, ES>) -> String
    where ES: AsRef<str>
{
  let mut result = escaped_template.to_owned();
  for (k, v) in params {
    let mut full_key = String::with_capacity(k.len() + 4 /* {{}} */);
    full_key.push_str("{{");
    full_key.push_str(k);
    full_key.push_str("}}");

    if result.contains(&full_key[..]) {
      result = result.replace(&full_key[..], v.as_ref());
    }
  }
  result
}

pub trait EscapedString : AsRef<str> + std::fmt::Debug + Send + Sync + 'static {
  fn from_unescaped(unescaped_str: &str) -> Self;
  fn already_escaped(escaped_str: String) -> Self;
}

/// Text safe to embed in an HTML formatted chat message
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlEscapedString(String);

impl EscapedString for HtmlEscapedString {
  fn from_unescaped(unescaped_str: &str) -> Self {
    HtmlEscapedString(htmlescape::encode_minimal(unescaped_str))
  }
  fn already_escaped(escaped_str: String) -> Self {
    HtmlEscapedString(escaped_str)
  }
}

impl AsRef<str> for HtmlEscapedString {
  fn as_ref(&self) -> &str {
    &(self.0)[..]
  }
}


/// Unescaped values for a template, keyed by placeholder name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateParams {
  params: HashMap<&'static str, String>,
}

impl TemplateParams {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with<V>(mut self, key: &'static str, value: V) -> Self
      where V: ToString
  {
    self.params.insert(key, value.to_string());
    self
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self.params.get(key).map(String::as_str)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
    self.params.iter().map(|(k, v)| (*k, v.as_str()))
  }
}


/// Named reply templates.
///
/// Templates are trusted and stored as written; params are HTML-escaped when rendered.
///
/// ```
/// # use chatflow_port::{TemplateSet, TemplateParams};
/// let mut templates = TemplateSet::new();
/// templates.register("welcome", "Hello, <b>{{name}}</b>!").unwrap();
///
/// let params = TemplateParams::new().with("name", "<script>");
/// assert_eq!(templates.render("welcome", &params).unwrap(), "Hello, <b>&lt;script&gt;</b>!");
/// ```
#[derive(Debug, Default)]
pub struct TemplateSet {
  templates: NamedStore<HtmlEscapedString>,
}

impl TemplateSet {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register<N, T>(&mut self, name: N, escaped_template: T) -> Result<(), RegistryError>
      where N: Into<String>, T: Into<String>
  {
    self.templates
      .register(name, HtmlEscapedString::already_escaped(escaped_template.into()))
      .map(|_| ())
  }

  pub fn contains(&self, name: &str) -> bool {
    self.templates.contains(name)
  }

  pub fn render(&self, name: &str, params: &TemplateParams) -> Result<String, ReplyError> {
    let template = self.templates.lookup(name)?;
    let escaped = params
      .iter()
      .map(|(k, v)| (k, HtmlEscapedString::from_unescaped(v)))
      .collect::<HashMap<_, _>>();
    Ok(render_template((*template).as_ref(), &escaped))
  }
}
