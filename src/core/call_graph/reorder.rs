// src/core/call_graph/reorder.rs
use std::cmp::Reverse;

use super::AdjacencyMatrix;

/// Put the most-called routines first on the row axis and the busiest
/// callers first on the column axis.
///
/// Rows are sorted by row sum, then columns by column sum of the row-sorted
/// matrix, both descending with a stable sort so ties keep their prior
/// relative order. Cell values are untouched; only axis order changes.
pub fn reorder_by_sum(matrix: &AdjacencyMatrix) -> AdjacencyMatrix {
    let row_order = descending_order(&matrix.row_sums());
    let by_rows = matrix.permute_rows(&row_order);

    // Column sums do not depend on row order
    let col_order = descending_order(&by_rows.col_sums());
    by_rows.permute_cols(&col_order)
}

fn descending_order(sums: &[u64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..sums.len()).collect();
    order.sort_by_key(|&i| Reverse(sums[i]));
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    /// rows = callees, cols = callers over a, b, c, d
    fn sample() -> AdjacencyMatrix {
        AdjacencyMatrix::from_parts(
            labels(&["a", "b", "c", "d"]),
            labels(&["a", "b", "c", "d"]),
            vec![
                vec![0, 0, 0, 0],
                vec![1, 0, 1, 0],
                vec![1, 1, 0, 1],
                vec![0, 0, 1, 0],
            ],
        )
        .unwrap()
    }

    fn cell_values(matrix: &AdjacencyMatrix) -> Vec<u32> {
        let mut values: Vec<u32> = matrix.rows().iter().flatten().copied().collect();
        values.sort_unstable();
        values
    }

    #[test]
    fn test_sums_are_descending() {
        let reordered = reorder_by_sum(&sample());

        assert_eq!(reordered.row_labels(), labels(&["c", "b", "d", "a"]).as_slice());
        assert_eq!(reordered.row_sums(), vec![3, 2, 1, 0]);

        let col_sums = reordered.col_sums();
        let mut sorted = col_sums.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(col_sums, sorted);
        assert_eq!(reordered.col_labels(), labels(&["a", "c", "b", "d"]).as_slice());
    }

    #[test]
    fn test_cells_follow_their_labels() {
        let original = sample();
        let reordered = reorder_by_sum(&original);

        assert_eq!(cell_values(&reordered), cell_values(&original));
        for row in original.row_labels() {
            for col in original.col_labels() {
                assert_eq!(reordered.get(row, col), original.get(row, col));
            }
        }
    }

    #[test]
    fn test_is_a_fixed_point() {
        let once = reorder_by_sum(&sample());
        let twice = reorder_by_sum(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_ties_keep_original_order() {
        let matrix = AdjacencyMatrix::square(labels(&["x", "y", "z"]));
        let reordered = reorder_by_sum(&matrix);

        assert_eq!(reordered.row_labels(), labels(&["x", "y", "z"]).as_slice());
        assert_eq!(reordered.col_labels(), labels(&["x", "y", "z"]).as_slice());
    }

    #[test]
    fn test_two_phase_matches_independent_sorts() {
        let original = sample();
        let reordered = reorder_by_sum(&original);

        let independent = original
            .permute_cols(&descending_order(&original.col_sums()))
            .permute_rows(&descending_order(&original.row_sums()));
        assert_eq!(reordered, independent);
    }

    #[test]
    fn test_empty_matrix() {
        let reordered = reorder_by_sum(&AdjacencyMatrix::square(Vec::new()));
        assert!(reordered.is_empty());
    }
}
