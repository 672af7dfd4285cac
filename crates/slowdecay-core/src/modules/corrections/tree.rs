use crate::domain::{ProfileError, ProfileResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Nested correction record. Every leaf holds one value per station of the
/// run it belongs to; branches group leaves by category.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CorrectionNode {
    Leaf(Vec<f64>),
    Branch(BTreeMap<String, CorrectionNode>),
}

impl Default for CorrectionNode {
    fn default() -> Self {
        Self::Branch(BTreeMap::new())
    }
}

/// Corrections the projector reads, each at a fixed path in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CorrectionKind {
    Ellipticity,
    Crustal,
    MantleUpswingP,
    MantleUpswingS,
    GeometricSpreading,
}

impl CorrectionKind {
    pub const ALL: [Self; 5] = [
        Self::Ellipticity,
        Self::Crustal,
        Self::MantleUpswingP,
        Self::MantleUpswingS,
        Self::GeometricSpreading,
    ];

    pub const fn path(self) -> &'static [&'static str] {
        match self {
            Self::Ellipticity => &["travel_time", "ellipticity"],
            Self::Crustal => &["travel_time", "crustal"],
            Self::MantleUpswingP => &["travel_time", "mantle_upswing", "p_model"],
            Self::MantleUpswingS => &["travel_time", "mantle_upswing", "s_model"],
            Self::GeometricSpreading => &["amplitude", "geometric_spreading"],
        }
    }

    pub fn label(self) -> String {
        self.path().join("/")
    }
}

impl CorrectionNode {
    pub fn leaf(&self, path: &[&str]) -> Option<&[f64]> {
        match (self, path) {
            (Self::Leaf(values), []) => Some(values.as_slice()),
            (Self::Branch(children), [head, rest @ ..]) => children.get(*head)?.leaf(rest),
            _ => None,
        }
    }

    pub fn correction(&self, kind: CorrectionKind) -> ProfileResult<&[f64]> {
        self.leaf(kind.path()).ok_or_else(|| {
            ProfileError::input_validation(
                "INPUT.MISSING_CORRECTION",
                format!("correction '{}' is not present", kind.label()),
            )
        })
    }

    /// Inserts `values` at `path`, creating intermediate branches. A leaf
    /// standing where a branch is needed is replaced.
    pub fn insert(&mut self, path: &[&str], values: Vec<f64>) {
        let Some((head, rest)) = path.split_first() else {
            *self = Self::Leaf(values);
            return;
        };

        if !matches!(self, Self::Branch(_)) {
            *self = Self::default();
        }
        if let Self::Branch(children) = self {
            children
                .entry((*head).to_string())
                .or_default()
                .insert(rest, values);
        }
    }

    pub fn with_correction(mut self, kind: CorrectionKind, values: Vec<f64>) -> Self {
        self.insert(kind.path(), values);
        self
    }

    /// Paths and values of every leaf, depth first in key order.
    pub fn leaves(&self) -> Vec<(String, &[f64])> {
        let mut collected = Vec::new();
        self.collect_leaves(String::new(), &mut collected);
        collected
    }

    fn collect_leaves<'a>(&'a self, prefix: String, collected: &mut Vec<(String, &'a [f64])>) {
        match self {
            Self::Leaf(values) => collected.push((prefix, values.as_slice())),
            Self::Branch(children) => {
                for (key, child) in children {
                    let path = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{prefix}/{key}")
                    };
                    child.collect_leaves(path, collected);
                }
            }
        }
    }

    pub fn validate_lengths(&self, station_count: usize) -> ProfileResult<()> {
        for (path, values) in self.leaves() {
            if values.len() != station_count {
                return Err(length_mismatch(&path, values.len(), station_count));
            }
        }
        Ok(())
    }

    /// Restricts every leaf to `indices`, keeping the branch layout.
    pub fn subset(&self, indices: &[usize], station_count: usize) -> ProfileResult<Self> {
        self.subset_at("", indices, station_count)
    }

    fn subset_at(
        &self,
        path: &str,
        indices: &[usize],
        station_count: usize,
    ) -> ProfileResult<Self> {
        match self {
            Self::Leaf(values) => {
                if values.len() != station_count {
                    return Err(length_mismatch(path, values.len(), station_count));
                }
                let mut picked = Vec::with_capacity(indices.len());
                for &index in indices {
                    let value = values.get(index).copied().ok_or_else(|| {
                        ProfileError::internal(
                            "SYS.CORRECTION_INDEX",
                            format!(
                                "station index {index} is out of range for \
                                 correction '{path}' ({station_count} stations)"
                            ),
                        )
                    })?;
                    picked.push(value);
                }
                Ok(Self::Leaf(picked))
            }
            Self::Branch(children) => {
                let mut subset = BTreeMap::new();
                for (key, child) in children {
                    let child_path = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{path}/{key}")
                    };
                    subset.insert(
                        key.clone(),
                        child.subset_at(&child_path, indices, station_count)?,
                    );
                }
                Ok(Self::Branch(subset))
            }
        }
    }
}

fn length_mismatch(path: &str, actual: usize, expected: usize) -> ProfileError {
    let path = if path.is_empty() { "<root>" } else { path };
    ProfileError::input_validation(
        "INPUT.CORRECTION_LENGTH",
        format!("correction '{path}' has {actual} values; expected one per station ({expected})"),
    )
}
