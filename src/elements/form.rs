use super::{Element, ElementKind, Fingerprint, Scope};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A named form control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInput {
    pub name: String,

    /// Control type (`text`, `hidden`, `select`, ...)
    #[serde(default = "default_input_type")]
    pub input_type: String,

    /// Default value, if the markup carries one
    #[serde(default)]
    pub value: Option<String>,
}

fn default_input_type() -> String {
    "text".to_string()
}

impl FormInput {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            input_type: default_input_type(),
            value: None,
        }
    }
}

/// An HTML form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Form {
    /// Absolute action URL
    pub action: String,

    /// Upper-cased submission method
    pub method: String,

    #[serde(default)]
    pub inputs: Vec<FormInput>,

    #[serde(default)]
    pub scope: Scope,
}

impl Form {
    pub fn new(action: &str, method: &str) -> Self {
        Self {
            action: action.to_string(),
            method: method.to_uppercase(),
            inputs: Vec::new(),
            scope: Scope::default(),
        }
    }

    pub fn with_input(mut self, input: FormInput) -> Self {
        self.inputs.push(input);
        self
    }

    /// Distinct input names in lexical order
    pub fn input_names(&self) -> BTreeSet<&str> {
        self.inputs.iter().map(|i| i.name.as_str()).collect()
    }
}

impl Element for Form {
    const KIND: ElementKind = ElementKind::Form;

    fn fingerprint(&self) -> Fingerprint {
        let head = [self.action.as_str(), self.method.as_str()];
        Fingerprint::new(head.into_iter().chain(self.input_names()))
    }

    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn set_scope(&mut self, scope: Scope) {
        self.scope = scope;
    }
}
