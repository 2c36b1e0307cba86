//! Bin sets and partition building.
//!
//! A [`BinSet`] is built once from configuration and never mutated during
//! evaluation. [`build_partition`] is a pure function of the column and the
//! bin set; every call recomputes the partition from scratch.

use colstack_model::{BinInclude, BinSpec, OverlapPolicy, ScalarType, ScalarValue};
use tracing::{debug, warn};

use crate::error::{BinError, Result};
use crate::eval::{Predicate, null_mask};
use crate::expr::BinExpression;

/// Reserved label for non-null values claimed by no user bin.
pub const OTHER_LABEL: &str = "other";
/// Reserved label for null values.
pub const NULL_LABEL: &str = "NA";

/// A named user bin.
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub name: String,
    pub expression: BinExpression,
}

/// Ordered user bins for one column plus the reserved-bin policies.
#[derive(Debug, Clone, PartialEq)]
pub struct BinSet {
    scalar_type: ScalarType,
    bins: Vec<Bin>,
    include: BinInclude,
    overlap: OverlapPolicy,
}

impl BinSet {
    pub fn new(scalar_type: ScalarType, include: BinInclude, overlap: OverlapPolicy) -> Self {
        Self {
            scalar_type,
            bins: Vec::new(),
            include,
            overlap,
        }
    }

    /// Parses every expression of `spec` for `scalar_type`, keeping declaration order.
    ///
    /// # Errors
    ///
    /// Fails on the first invalid expression, duplicate name or reserved name.
    pub fn from_spec(
        spec: &BinSpec,
        scalar_type: ScalarType,
        include: BinInclude,
        overlap: OverlapPolicy,
    ) -> Result<Self> {
        let mut set = Self::new(scalar_type, include, overlap);
        for (name, text) in spec.iter() {
            let expression = BinExpression::parse(text, scalar_type)?;
            set.push(name, expression)?;
        }
        Ok(set)
    }

    /// Appends a bin.
    ///
    /// # Errors
    ///
    /// - [`BinError::DuplicateBinName`] if the name is already used
    /// - [`BinError::ReservedBinName`] if the name is an enabled reserved label
    /// - [`BinError::UnsupportedBoundType`] for an interval on a non-orderable type
    pub fn push(&mut self, name: impl Into<String>, expression: BinExpression) -> Result<()> {
        let name = name.into();
        if self.bins.iter().any(|bin| bin.name == name) {
            return Err(BinError::DuplicateBinName { name });
        }
        if (self.include.other && name == OTHER_LABEL) || (self.include.null && name == NULL_LABEL)
        {
            return Err(BinError::ReservedBinName { name });
        }
        if expression.is_interval() && !self.scalar_type.is_orderable() {
            return Err(BinError::UnsupportedBoundType {
                scalar_type: self.scalar_type,
            });
        }
        self.bins.push(Bin { name, expression });
        Ok(())
    }

    pub fn scalar_type(&self) -> ScalarType {
        self.scalar_type
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    pub fn include(&self) -> BinInclude {
        self.include
    }

    pub fn overlap(&self) -> OverlapPolicy {
        self.overlap
    }

    /// True when the set can never produce a label.
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty() && !self.include.other && !self.include.null
    }
}

/// Label -> row positions for one column and one bin set.
///
/// Groups are ordered: user bins in declaration order, then `other`, then `NA`.
/// Each row position appears in at most one group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    row_count: usize,
    groups: Vec<(String, Vec<usize>)>,
}

impl Partition {
    /// Number of rows in the partitioned column.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn get(&self, label: &str) -> Option<&[usize]> {
        self.groups
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, rows)| rows.as_slice())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.groups
            .iter()
            .map(|(name, rows)| (name.as_str(), rows.as_slice()))
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn into_groups(self) -> Vec<(String, Vec<usize>)> {
        self.groups
    }
}

/// Partitions `values` by the bins of `bin_set`.
///
/// Null rows go to `NA` (if enabled), unclaimed non-null rows to `other` (if
/// enabled). Rows claimed by several user bins are rejected or given to the
/// last declared bin, depending on the set's [`OverlapPolicy`].
///
/// # Errors
///
/// - [`BinError::OverlappingBin`] under [`OverlapPolicy::Reject`]
/// - [`BinError::UnsupportedBoundType`] if an interval cannot be resolved
pub fn build_partition(values: &[Option<ScalarValue>], bin_set: &BinSet) -> Result<Partition> {
    let row_count = values.len();
    let masks = bin_set
        .bins()
        .iter()
        .map(|bin| Ok(Predicate::compile(&bin.expression, bin_set.scalar_type())?.mask(values)))
        .collect::<Result<Vec<_>>>()?;

    let owners = assign_owners(&masks, bin_set, row_count)?;
    let nulls = null_mask(values);

    let mut groups: Vec<(String, Vec<usize>)> = bin_set
        .bins()
        .iter()
        .map(|bin| (bin.name.clone(), Vec::new()))
        .collect();
    let mut other = Vec::new();
    let mut null = Vec::new();

    for (row, owner) in owners.into_iter().enumerate() {
        match owner {
            Some(idx) => groups[idx].1.push(row),
            None if nulls[row] => null.push(row),
            None => other.push(row),
        }
    }

    for (name, rows) in &groups {
        debug!(bin = %name, rows = rows.len(), "Evaluated bin");
    }

    if bin_set.include().other {
        groups.push((OTHER_LABEL.to_string(), other));
    }
    if bin_set.include().null {
        groups.push((NULL_LABEL.to_string(), null));
    }

    Ok(Partition { row_count, groups })
}

/// Resolves each row to the index of the bin owning it.
fn assign_owners(
    masks: &[Vec<bool>],
    bin_set: &BinSet,
    row_count: usize,
) -> Result<Vec<Option<usize>>> {
    let mut owners: Vec<Option<usize>> = vec![None; row_count];
    let mut stolen = 0usize;

    for (idx, mask) in masks.iter().enumerate() {
        for (row, claimed) in mask.iter().enumerate() {
            if !claimed {
                continue;
            }
            if owners[row].is_some() {
                match bin_set.overlap() {
                    OverlapPolicy::Reject => {
                        let bins = masks
                            .iter()
                            .zip(bin_set.bins())
                            .filter(|(mask, _)| mask[row])
                            .map(|(_, bin)| bin.name.clone())
                            .collect();
                        return Err(BinError::OverlappingBin { row, bins });
                    }
                    OverlapPolicy::LastWins => stolen += 1,
                }
            }
            owners[row] = Some(idx);
        }
    }

    if stolen > 0 {
        warn!(rows = stolen, "Overlapping bins resolved by last declared bin");
    }

    Ok(owners)
}
