//! Property tests for partition invariants.

use colstack_binning::{BinSet, NULL_LABEL, OTHER_LABEL, Partition, build_partition};
use colstack_model::{BinInclude, BinSpec, OverlapPolicy, ScalarType, ScalarValue};
use proptest::prelude::*;

fn int_column() -> impl Strategy<Value = Vec<Option<i64>>> {
    prop::collection::vec(prop::option::of(-100i64..100), 0..64)
}

fn to_values(column: &[Option<i64>]) -> Vec<Option<ScalarValue>> {
    column.iter().map(|v| v.map(ScalarValue::Int)).collect()
}

fn disjoint_bins(include: BinInclude) -> BinSet {
    let spec: BinSpec = [
        ("negative", "[..0)"),
        ("small", "[0..10]"),
        ("medium", "(10..50)"),
        ("picked", "[60,70,80]"),
    ]
    .into_iter()
    .collect();
    BinSet::from_spec(&spec, ScalarType::Int, include, OverlapPolicy::Reject).unwrap()
}

fn occurrences(partition: &Partition) -> Vec<usize> {
    let mut counts = vec![0; partition.row_count()];
    for (_, rows) in partition.iter() {
        for &row in rows {
            counts[row] += 1;
        }
    }
    counts
}

proptest! {
    #[test]
    fn prop_every_row_in_exactly_one_group(column in int_column()) {
        let values = to_values(&column);
        let partition = build_partition(&values, &disjoint_bins(BinInclude::new(true, true))).unwrap();
        prop_assert!(occurrences(&partition).iter().all(|&count| count == 1));
    }

    #[test]
    fn prop_rows_never_in_two_groups(column in int_column(), other: bool, null: bool) {
        let values = to_values(&column);
        let partition = build_partition(&values, &disjoint_bins(BinInclude::new(other, null))).unwrap();
        prop_assert!(occurrences(&partition).iter().all(|&count| count <= 1));
    }

    #[test]
    fn prop_null_group_holds_exactly_null_rows(column in int_column()) {
        let values = to_values(&column);
        let partition = build_partition(&values, &disjoint_bins(BinInclude::new(true, true))).unwrap();
        let expected: Vec<usize> = column
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_none())
            .map(|(row, _)| row)
            .collect();
        prop_assert_eq!(partition.get(NULL_LABEL).unwrap_or(&[]), expected.as_slice());
        for (label, rows) in partition.iter() {
            if label != NULL_LABEL {
                prop_assert!(rows.iter().all(|&row| column[row].is_some()));
            }
        }
    }

    #[test]
    fn prop_other_holds_unclaimed_non_null_rows(column in int_column()) {
        let values = to_values(&column);
        let partition = build_partition(&values, &disjoint_bins(BinInclude::new(true, false))).unwrap();
        for &row in partition.get(OTHER_LABEL).unwrap_or(&[]) {
            let value = column[row];
            prop_assert!(value.is_some_and(|v| v >= 50 && ![60, 70, 80].contains(&v)));
        }
    }

    #[test]
    fn prop_partition_is_idempotent(column in int_column()) {
        let values = to_values(&column);
        let bins = disjoint_bins(BinInclude::new(true, true));
        prop_assert_eq!(
            build_partition(&values, &bins).unwrap(),
            build_partition(&values, &bins).unwrap()
        );
    }

    #[test]
    fn prop_last_wins_keeps_groups_disjoint(
        column in int_column(),
        a in -100i64..100,
        b in -100i64..100,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let spec: BinSpec = [
            ("first", format!("[{lo}..]")),
            ("second", format!("[..{hi}]")),
        ]
        .into_iter()
        .collect();
        let bins = BinSet::from_spec(
            &spec,
            ScalarType::Int,
            BinInclude::new(true, true),
            OverlapPolicy::LastWins,
        )
        .unwrap();
        let values = to_values(&column);
        let partition = build_partition(&values, &bins).unwrap();
        prop_assert!(occurrences(&partition).iter().all(|&count| count == 1));
        for &row in partition.get("first").unwrap_or(&[]) {
            prop_assert!(column[row].is_some_and(|v| v > hi));
        }
    }
}
