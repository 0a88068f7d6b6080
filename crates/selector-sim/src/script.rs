//! Script steps
//!
//! Each step is one `verb[:argument]` token, e.g. `search:genomics`,
//! `page:2`, `toggle:https://repo.example/01` or `custom:Name|uri|description`.

use anyhow::{anyhow, bail, Context};
use selector_core::{CustomItemDraft, SearchFilters};
use std::str::FromStr;

/// One scripted user action
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Step {
    /// Open the picker
    Open,
    /// Close the picker
    Close,
    /// Search for a term
    Search(String),
    /// Go to a one-based page
    Page(usize),
    /// Toggle the result with this uri
    Toggle(String),
    /// Remove by uri or id
    Remove(String),
    /// Remove everything
    Clear,
    /// Replace category filters
    Filter(SearchFilters),
    /// Replace the preferred uri list
    Preferred(Vec<String>),
    /// Opt in or out of the preferred-only view
    PreferredOnly(bool),
    /// Open the form and submit a custom item
    Custom(CustomItemDraft),
}

impl FromStr for Step {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (verb, arg) = match s.split_once(':') {
            Some((verb, arg)) => (verb.trim(), Some(arg)),
            None => (s.trim(), None),
        };

        let required = || arg.ok_or_else(|| anyhow!("step '{verb}' needs an argument"));

        let step = match verb {
            "open" => Self::Open,
            "close" => Self::Close,
            "clear" => Self::Clear,
            "search" => Self::Search(arg.unwrap_or_default().to_string()),
            "page" => {
                let page = required()?
                    .trim()
                    .parse()
                    .with_context(|| format!("invalid page in '{s}'"))?;
                Self::Page(page)
            }
            "toggle" => Self::Toggle(required()?.trim().to_string()),
            "remove" => Self::Remove(required()?.trim().to_string()),
            "filter" => Self::Filter(SearchFilters::categories(list(arg.unwrap_or_default()))),
            "preferred" => Self::Preferred(list(arg.unwrap_or_default())),
            "preferred-only" => {
                let flag = required()?
                    .trim()
                    .parse()
                    .with_context(|| format!("expected true or false in '{s}'"))?;
                Self::PreferredOnly(flag)
            }
            "custom" => {
                let fields: Vec<&str> = required()?.splitn(3, '|').collect();
                let [name, uri, description] = fields.as_slice() else {
                    bail!("custom step needs name|uri|description, got '{s}'");
                };
                Self::Custom(CustomItemDraft::new(*name, *uri, *description))
            }
            other => bail!("unknown step '{other}'"),
        };

        Ok(step)
    }
}

fn list(arg: &str) -> Vec<String> {
    arg.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
