//! Rules and policies
//!
//! A rule is a named predicate/transform applied to a resource (resource
//! level) or to a record (record level). Rules accumulate down the resource
//! hierarchy; a negation entry removes a previously inherited rule by name.

use crate::{Context, LeafResource, User, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Message value distinguishing "never set" from an explicitly set message.
pub const NO_RULES_SET: &str = "no rules set";

/// The opaque record type record-level rules operate on.
///
/// Data nodes stream whatever their serialiser produces; the control plane
/// only ever treats records as JSON-shaped values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record(pub serde_json::Value);

impl Record {
    pub fn field(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }
}

/// A predicate/transform over `T` given the requesting user and context.
///
/// Returning `None` drops the item entirely; returning a modified item
/// redacts or masks it.
pub trait Rule<T>: Send + Sync {
    fn apply(&self, item: T, user: &User, context: &Context) -> Option<T>;
}

impl<T, F> Rule<T> for F
where
    F: Fn(T, &User, &Context) -> Option<T> + Send + Sync,
{
    fn apply(&self, item: T, user: &User, context: &Context) -> Option<T> {
        self(item, user, context)
    }
}

/// One entry in an ordered rule chain
pub enum RuleEntry<T> {
    /// A named rule to apply
    Apply {
        name: String,
        rule: Arc<dyn Rule<T>>,
    },

    /// Removes every rule named `target` from the chain merged so far
    Negate { target: String },
}

impl<T> Clone for RuleEntry<T> {
    fn clone(&self) -> Self {
        match self {
            RuleEntry::Apply { name, rule } => RuleEntry::Apply {
                name: name.clone(),
                rule: Arc::clone(rule),
            },
            RuleEntry::Negate { target } => RuleEntry::Negate {
                target: target.clone(),
            },
        }
    }
}

impl<T> fmt::Debug for RuleEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleEntry::Apply { name, .. } => write!(f, "Apply({name})"),
            RuleEntry::Negate { target } => write!(f, "Negate({target})"),
        }
    }
}

/// An ordered collection of named rules with a human-readable message
///
/// Duplicate names are allowed and preserved. Cloning is shallow for the
/// rule implementations (shared `Arc`s) but deep for the container, so a
/// merge never mutates the instance it started from.
pub struct Rules<T> {
    message: String,
    entries: Vec<RuleEntry<T>>,
}

impl<T> Clone for Rules<T> {
    fn clone(&self) -> Self {
        Self {
            message: self.message.clone(),
            entries: self.entries.clone(),
        }
    }
}

impl<T> Rules<T> {
    pub fn new() -> Self {
        Self {
            message: NO_RULES_SET.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_rule(mut self, name: impl Into<String>, rule: impl Rule<T> + 'static) -> Self {
        self.add_rule(name, rule);
        self
    }

    pub fn with_negation(mut self, target: impl Into<String>) -> Self {
        self.entries.push(RuleEntry::Negate {
            target: target.into(),
        });
        self
    }

    pub fn add_rule(&mut self, name: impl Into<String>, rule: impl Rule<T> + 'static) {
        self.entries.push(RuleEntry::Apply {
            name: name.into(),
            rule: Arc::new(rule),
        });
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the message was ever explicitly set.
    pub fn message_is_set(&self) -> bool {
        self.message != NO_RULES_SET
    }

    pub fn entries(&self) -> &[RuleEntry<T>] {
        &self.entries
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = RuleEntry<T>>) {
        self.entries.extend(entries);
    }

    /// Removes every `Apply` entry named `target`.
    pub fn remove_named(&mut self, target: &str) {
        self.entries
            .retain(|entry| !matches!(entry, RuleEntry::Apply { name, .. } if name == target));
    }

    /// Drops any negation entries, leaving only applicable rules.
    pub fn strip_negations(&mut self) {
        self.entries
            .retain(|entry| matches!(entry, RuleEntry::Apply { .. }));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of the applicable rules, in chain order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                RuleEntry::Apply { name, .. } => Some(name.as_str()),
                RuleEntry::Negate { .. } => None,
            })
            .collect()
    }

    /// Folds the item through the applicable rules in order.
    ///
    /// Negation entries are inert here; they only matter while merging.
    pub fn apply_to(&self, item: T, user: &User, context: &Context) -> Option<T> {
        let mut current = Some(item);
        for entry in &self.entries {
            if let RuleEntry::Apply { rule, .. } = entry {
                current = match current {
                    Some(item) => rule.apply(item, user, context),
                    None => return None,
                };
            }
        }
        current
    }
}

impl<T> Default for Rules<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Rules<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rules")
            .field("message", &self.message)
            .field("entries", &self.entries)
            .finish()
    }
}

/// Resource-level and record-level rule chains for one policy binding
///
/// Either side may be empty; the resolver merges each side independently.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    pub resource_rules: Rules<LeafResource>,
    pub record_rules: Rules<Record>,

    /// Owning identity, carried for audit only
    pub owner: Option<UserId>,
}

impl Policy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource_rules(mut self, rules: Rules<LeafResource>) -> Self {
        self.resource_rules = rules;
        self
    }

    pub fn with_record_rules(mut self, rules: Rules<Record>) -> Self {
        self.record_rules = rules;
        self
    }

    pub fn with_owner(mut self, owner: UserId) -> Self {
        self.owner = Some(owner);
        self
    }
}
