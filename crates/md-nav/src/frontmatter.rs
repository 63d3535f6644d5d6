use std::collections::BTreeMap;

use gray_matter::{engine::YAML, Matter};
use serde_yaml::Value;

use crate::error::{Error, Result};

/// YAML metadata at the top of an article (`title`, `description`, `tags`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Frontmatter {
    data: BTreeMap<String, Value>,
}

impl Frontmatter {
    /// Parse frontmatter from raw file content. Returns (Frontmatter, body).
    pub fn parse(raw: &str) -> Result<(Self, String)> {
        let matter = Matter::<YAML>::new();
        let result = matter.parse(raw);

        let data: BTreeMap<String, Value> = match result.data {
            Some(pod) => pod
                .deserialize()
                .map_err(|e| Error::FrontmatterParse(e.to_string()))?,
            None => return Err(Error::NoFrontmatter),
        };

        Ok((Self { data }, result.content))
    }

    /// Try to parse frontmatter; returns (None, full_content) if there is none.
    pub fn try_parse(raw: &str) -> Result<(Option<Self>, String)> {
        match Self::parse(raw) {
            Ok((fm, body)) => Ok((Some(fm), body)),
            Err(Error::NoFrontmatter) => Ok((None, raw.to_string())),
            Err(e) => Err(e),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// A field as display text; `None` when absent or blank.
    pub fn get_display(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(yaml_value_to_string)
            .filter(|s| !s.trim().is_empty())
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    /// `tags` as a list; a single string counts as one tag.
    pub fn tags(&self) -> Vec<String> {
        match self.get("tags") {
            Some(Value::Sequence(seq)) => seq.iter().map(yaml_value_to_string).collect(),
            Some(Value::String(s)) => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.data
                .iter()
                .map(|(k, v)| (k.clone(), yaml_to_json(v)))
                .collect(),
        )
    }
}

pub fn yaml_value_to_string(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(seq) => {
            let items: Vec<String> = seq.iter().map(yaml_value_to_string).collect();
            items.join(", ")
        }
        Value::Mapping(_) => serde_yaml::to_string(v).unwrap_or_default(),
        Value::Tagged(tagged) => yaml_value_to_string(&tagged.value),
    }
}

fn yaml_to_json(v: &Value) -> serde_json::Value {
    match v {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                serde_json::Value::Number(i.into())
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null)
            }
        }
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Sequence(seq) => serde_json::Value::Array(seq.iter().map(yaml_to_json).collect()),
        Value::Mapping(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let key = match k {
                        Value::String(s) => s.clone(),
                        other => yaml_value_to_string(other),
                    };
                    (key, yaml_to_json(v))
                })
                .collect(),
        ),
        Value::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}
