//! Domain types for the gridveto state store.
//!
//! These types describe what the constraint filter reasons about: the
//! multi-valued attributes a host advertises, the placement constraints a
//! job declares, and the tasks of each job that are currently active. All
//! types are serializable to/from JSON for storage in redb tables, and to
//! TOML for cluster snapshots.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{StateError, StateResult};

/// Unique identifier for a host in the cluster.
pub type HostId = String;

/// Key identifying a job (e.g. `prod/api`).
pub type JobKey = String;

/// Identifier for a task within a job.
pub type TaskId = String;

// ── Attribute ─────────────────────────────────────────────────────

/// A named, multi-valued property of a host (rack, zone, dedicated, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub values: BTreeSet<String>,
}

impl Attribute {
    pub fn new<N, I, V>(name: N, values: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// True if at least one of `values` is also one of this attribute's values.
    pub fn overlaps(&self, values: &BTreeSet<String>) -> bool {
        !self.values.is_disjoint(values)
    }
}

/// The attributes of exactly one host, keyed by attribute name.
///
/// A name maps to a single multi-valued [`Attribute`], so lookups are never
/// ambiguous. Serializes as a `name -> [values]` map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, BTreeSet<String>>",
    into = "BTreeMap<String, BTreeSet<String>>"
)]
pub struct AttributeCatalog {
    attributes: BTreeMap<String, Attribute>,
}

impl AttributeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a flat attribute list.
    ///
    /// Fails with [`StateError::DuplicateAttribute`] if two entries share a name.
    pub fn from_attributes<I>(attributes: I) -> StateResult<Self>
    where
        I: IntoIterator<Item = Attribute>,
    {
        let mut catalog = Self::new();
        for attribute in attributes {
            catalog.insert(attribute)?;
        }
        Ok(catalog)
    }

    /// Add an attribute. A name may only be declared once per host.
    pub fn insert(&mut self, attribute: Attribute) -> StateResult<()> {
        if self.attributes.contains_key(&attribute.name) {
            return Err(StateError::DuplicateAttribute(attribute.name));
        }
        self.attributes.insert(attribute.name.clone(), attribute);
        Ok(())
    }

    /// The attribute with the given name, if the host advertises it.
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Iterate attributes in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }
}

impl From<BTreeMap<String, BTreeSet<String>>> for AttributeCatalog {
    fn from(map: BTreeMap<String, BTreeSet<String>>) -> Self {
        let attributes = map
            .into_iter()
            .map(|(name, values)| (name.clone(), Attribute { name, values }))
            .collect();
        Self { attributes }
    }
}

impl From<AttributeCatalog> for BTreeMap<String, BTreeSet<String>> {
    fn from(catalog: AttributeCatalog) -> Self {
        catalog
            .attributes
            .into_iter()
            .map(|(name, attribute)| (name, attribute.values))
            .collect()
    }
}

// ── Constraint ────────────────────────────────────────────────────

/// A placement constraint declared by a job, targeting the host attribute
/// with the same name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Constraint {
    pub name: String,
    #[serde(flatten)]
    pub body: ConstraintBody,
}

/// The two constraint kinds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConstraintBody {
    Value(ValueConstraint),
    Limit(LimitConstraint),
    /// A kind written by a newer schema. Never constructed by this crate;
    /// evaluating it is a fatal error, not a veto.
    #[serde(other)]
    Unrecognized,
}

/// Host attribute must (or, if negated, must not) share a value with `values`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValueConstraint {
    #[serde(default)]
    pub negated: bool,
    pub values: BTreeSet<String>,
}

/// At most `limit` active tasks of the job (the new one included) may share
/// a value of the attribute with the candidate host.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LimitConstraint {
    pub limit: u32,
}

impl Constraint {
    pub fn value<N, I, V>(name: N, negated: bool, values: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            body: ConstraintBody::Value(ValueConstraint {
                negated,
                values: values.into_iter().map(Into::into).collect(),
            }),
        }
    }

    pub fn limit(name: impl Into<String>, limit: u32) -> Self {
        Self {
            name: name.into(),
            body: ConstraintBody::Limit(LimitConstraint { limit }),
        }
    }

    /// Check the invariants a stored constraint must satisfy.
    pub fn validate(&self) -> StateResult<()> {
        if self.name.trim().is_empty() {
            return Err(StateError::Invalid("constraint name is blank".to_string()));
        }
        match &self.body {
            ConstraintBody::Value(value) if value.values.is_empty() => {
                Err(StateError::EmptyValueConstraint(self.name.clone()))
            }
            ConstraintBody::Value(_) | ConstraintBody::Limit(_) => Ok(()),
            ConstraintBody::Unrecognized => Err(StateError::Invalid(format!(
                "unrecognized constraint kind for {}",
                self.name
            ))),
        }
    }
}

// ── Host ──────────────────────────────────────────────────────────

/// A host and the attributes it advertises.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostRecord {
    pub id: HostId,
    #[serde(default)]
    pub attributes: AttributeCatalog,
}

// ── Job ───────────────────────────────────────────────────────────

/// A job and the constraints every one of its tasks must satisfy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobSpec {
    pub key: JobKey,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

impl JobSpec {
    pub fn validate(&self) -> StateResult<()> {
        if self.key.trim().is_empty() {
            return Err(StateError::Invalid("job key is blank".to_string()));
        }
        if self.key.contains(TASK_KEY_SEPARATOR) {
            return Err(StateError::Invalid(format!(
                "job key {:?} contains {TASK_KEY_SEPARATOR:?}",
                self.key
            )));
        }
        self.constraints.iter().try_for_each(Constraint::validate)
    }
}

// ── Task ──────────────────────────────────────────────────────────

/// A task of a job that is currently scheduled on a host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActiveTask {
    pub id: TaskId,
    pub job_key: JobKey,
    pub host: HostId,
}

/// Separator between job key and task id in task table keys.
pub const TASK_KEY_SEPARATOR: char = ':';

impl ActiveTask {
    /// Build the composite key for the tasks table.
    pub fn table_key(&self) -> String {
        format!("{}{TASK_KEY_SEPARATOR}{}", self.job_key, self.id)
    }

    /// Job key and id must be non-blank and free of the key separator, so
    /// that no two tasks share a table key.
    pub fn validate(&self) -> StateResult<()> {
        for (field, value) in [("job key", &self.job_key), ("id", &self.id)] {
            if value.trim().is_empty() {
                return Err(StateError::Invalid(format!(
                    "task {:?} of job {:?} has a blank {field}",
                    self.id, self.job_key
                )));
            }
            if value.contains(TASK_KEY_SEPARATOR) {
                return Err(StateError::Invalid(format!(
                    "task {field} {value:?} contains {TASK_KEY_SEPARATOR:?}"
                )));
            }
        }
        Ok(())
    }
}
