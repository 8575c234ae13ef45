//! Menu title localization.

use std::collections::HashMap;

use serde_json::Value;

use cmsadmin_core::{DomainError, DomainResult};

use super::RouteNode;

/// Message lookup for the active locale.
pub trait Translator {
    /// Translation for `key`, or `None` when the key is unknown.
    fn translate(&self, key: &str) -> Option<String>;
}

/// In-memory message catalog for one locale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    locale: String,
    messages: HashMap<String, String>,
}

impl Catalog {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            messages: HashMap::new(),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.messages.insert(key.into(), message.into());
    }

    /// Load a catalog from a JSON object.
    ///
    /// Nested objects are flattened with `.`: `{"menu":{"sys":"System"}}`
    /// yields the key `menu.sys`. Non-string leaves are rejected.
    pub fn from_json(locale: impl Into<String>, json: &str) -> DomainResult<Self> {
        let root: Value = serde_json::from_str(json)
            .map_err(|e| DomainError::validation(format!("catalog: {e}")))?;
        let mut catalog = Self::new(locale);
        match root {
            Value::Object(_) => flatten(&root, String::new(), &mut catalog.messages)?,
            _ => return Err(DomainError::validation("catalog: root must be an object")),
        }
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

fn flatten(value: &Value, prefix: String, out: &mut HashMap<String, String>) -> DomainResult<()> {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                let key = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{prefix}.{k}")
                };
                flatten(v, key, out)?;
            }
            Ok(())
        }
        Value::String(s) => {
            out.insert(prefix, s.clone());
            Ok(())
        }
        _ => Err(DomainError::validation(format!(
            "catalog: value at '{prefix}' is not a string"
        ))),
    }
}

impl Translator for Catalog {
    fn translate(&self, key: &str) -> Option<String> {
        self.messages.get(key).cloned()
    }
}

impl<T: Translator + ?Sized> Translator for &T {
    fn translate(&self, key: &str) -> Option<String> {
        (**self).translate(key)
    }
}

/// Title for the menu named `name`: the `menu.<name>` message when the
/// catalog has one, otherwise `title` unchanged.
pub fn translate_menu_title(title: &str, name: &str, translator: &dyn Translator) -> String {
    translator
        .translate(&format!("menu.{name}"))
        .unwrap_or_else(|| title.to_string())
}

/// Copy of `routes` with every title localized. Structure is untouched.
pub fn localize_forest(routes: &[RouteNode], translator: &dyn Translator) -> Vec<RouteNode> {
    routes.iter().map(|r| localize(r, translator)).collect()
}

fn localize(route: &RouteNode, translator: &dyn Translator) -> RouteNode {
    let mut out = route.clone();
    if !route.meta.title.is_empty() {
        out.meta.title = translate_menu_title(&route.meta.title, &route.name, translator);
    }
    out.children = route
        .children
        .as_ref()
        .map(|kids| localize_forest(kids, translator));
    out
}
