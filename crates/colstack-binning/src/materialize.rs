//! Row labels and grouping from a partition.

use colstack_model::ScalarValue;

use crate::error::Result;
use crate::partition::{BinSet, Partition, build_partition};

/// Per-row labels of a partition; rows in no group stay `None`.
pub fn label_rows(partition: &Partition) -> Vec<Option<String>> {
    let mut labels = vec![None; partition.row_count()];
    for (label, rows) in partition.iter() {
        for &row in rows {
            labels[row] = Some(label.to_string());
        }
    }
    labels
}

/// Partitions `values` and returns the label of every row.
///
/// # Errors
///
/// Propagates the errors of [`build_partition`].
pub fn apply_bins(values: &[Option<ScalarValue>], bin_set: &BinSet) -> Result<Vec<Option<String>>> {
    Ok(label_rows(&build_partition(values, bin_set)?))
}

/// Groups rows by an existing label column, in order of first appearance.
///
/// Labels need not belong to any bin definition. Unset rows are always
/// skipped; rows labelled `exclude` (typically [`NULL_LABEL`](crate::NULL_LABEL))
/// are skipped as well.
pub fn group_labels(
    labels: &[Option<String>],
    exclude: Option<&str>,
) -> Vec<(String, Vec<usize>)> {
    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
    for (row, label) in labels.iter().enumerate() {
        let Some(label) = label.as_deref() else {
            continue;
        };
        if exclude == Some(label) {
            continue;
        }
        match groups.iter_mut().find(|(name, _)| name == label) {
            Some((_, rows)) => rows.push(row),
            None => groups.push((label.to_string(), vec![row])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use colstack_model::{BinInclude, BinSpec, OverlapPolicy, ScalarType};

    fn ages() -> Vec<Option<ScalarValue>> {
        [Some(12.0), Some(45.5), None, Some(80.0)]
            .into_iter()
            .map(|v| v.map(ScalarValue::Float))
            .collect()
    }

    fn bin_set(include: BinInclude) -> BinSet {
        let spec: BinSpec = [("young", "[..18)"), ("adult", "[18..65)")]
            .into_iter()
            .collect();
        BinSet::from_spec(&spec, ScalarType::Float, include, OverlapPolicy::Reject).unwrap()
    }

    #[test]
    fn test_apply_bins_labels_every_row() {
        let labels = apply_bins(&ages(), &bin_set(BinInclude::new(true, true))).unwrap();
        assert_eq!(
            labels,
            vec![
                Some("young".to_string()),
                Some("adult".to_string()),
                Some("NA".to_string()),
                Some("other".to_string()),
            ]
        );
    }

    #[test]
    fn test_apply_bins_leaves_unclaimed_unset() {
        let labels = apply_bins(&ages(), &bin_set(BinInclude::default())).unwrap();
        assert_eq!(labels[2], None);
        assert_eq!(labels[3], None);
    }

    #[test]
    fn test_group_labels_first_appearance_order() {
        let labels = vec![
            Some("b".to_string()),
            None,
            Some("a".to_string()),
            Some("b".to_string()),
        ];
        assert_eq!(
            group_labels(&labels, None),
            vec![("b".to_string(), vec![0, 3]), ("a".to_string(), vec![2])]
        );
    }

    #[test]
    fn test_group_labels_excludes_null_label() {
        let labels = vec![
            Some("NA".to_string()),
            Some("young".to_string()),
            None,
            Some("NA".to_string()),
            Some("retired".to_string()),
        ];
        assert_eq!(
            group_labels(&labels, Some(crate::NULL_LABEL)),
            vec![
                ("young".to_string(), vec![1]),
                ("retired".to_string(), vec![4]),
            ]
        );
        assert_eq!(
            group_labels(&labels, None),
            vec![
                ("NA".to_string(), vec![0, 3]),
                ("young".to_string(), vec![1]),
                ("retired".to_string(), vec![4]),
            ]
        );
    }
}
