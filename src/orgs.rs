//! Matching scored document names back to known organisations.

use serde::{Deserialize, Serialize};

/// Splits CamelCase names: `"AcmeCorp"` becomes `"Acme Corp"`.
pub fn pad_name(name: &str) -> String {
    let mut padded = String::with_capacity(name.len() + 8);
    for c in name.chars() {
        if c.is_uppercase() {
            padded.push(' ');
        }
        padded.push(c);
    }
    padded.trim().replace("  ", " ")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgAlias {
    pub org_id: i64,
    pub org_name: String,
    pub alias: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrgMatch {
    pub org_id: i64,
    pub org_name: String,
}

/// In-memory alias table, searched in insertion order.
#[derive(Debug, Clone, Default)]
pub struct AliasIndex {
    aliases: Vec<(String, OrgAlias)>,
}

impl AliasIndex {
    pub fn new(aliases: impl IntoIterator<Item = OrgAlias>) -> Self {
        Self {
            aliases: aliases
                .into_iter()
                .map(|a| (a.alias.to_lowercase(), a))
                .collect(),
        }
    }

    /// First alias containing the name, or its padded form, ignoring case.
    pub fn find(&self, name: &str) -> Option<OrgMatch> {
        let raw = name.trim().to_lowercase();
        if raw.is_empty() {
            return None;
        }
        let padded = pad_name(name.trim()).to_lowercase();

        self.aliases
            .iter()
            .find(|(alias, _)| alias.contains(&raw) || alias.contains(&padded))
            .map(|(_, a)| OrgMatch {
                org_id: a.org_id,
                org_name: a.org_name.clone(),
            })
    }
}
