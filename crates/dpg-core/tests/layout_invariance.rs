//! Products read operands by logical index, so every combination of operand
//! and result layouts has to produce bit-identical values.

use dpg_core::container::{Layout, Matrix, Vector};
use dpg_core::linalg::{CsrOperator, Transpose, mm, mm_new, mv};
use proptest::prelude::*;

const LAYOUTS: [Layout; 2] = [Layout::Row, Layout::Col];

/// A `rows x cols` matrix with logical entries `data` (row by row).
fn build(rows: usize, cols: usize, data: &[f64], layout: Layout) -> Matrix<f64> {
    Matrix::from_vec(rows, cols, Layout::Row, data.to_vec())
        .unwrap()
        .to_layout(layout)
        .unwrap()
}

/// Logical entries in row order, independent of storage layout.
fn logical(m: &Matrix<f64>) -> Vec<f64> {
    let (rows, cols) = m.extents();
    (0..rows)
        .flat_map(|i| (0..cols).map(move |j| (i, j)))
        .map(|(i, j)| m[(i, j)])
        .collect()
}

fn dims_and_data() -> impl Strategy<Value = (usize, usize, usize, Vec<f64>, Vec<f64>)> {
    (1usize..6, 1usize..6, 1usize..6).prop_flat_map(|(m, k, n)| {
        (
            Just(m),
            Just(k),
            Just(n),
            prop::collection::vec(-10.0f64..10.0, m * k),
            prop::collection::vec(-10.0f64..10.0, k * n),
        )
    })
}

proptest! {
    #[test]
    fn mm_is_layout_invariant((m, k, n, a, b) in dims_and_data()) {
        let reference = {
            let a = build(m, k, &a, Layout::Row);
            let b = build(k, n, &b, Layout::Row);
            logical(&mm_new(Transpose::No, Transpose::No, 1.0, &a, &b, Layout::Row).unwrap())
        };
        for la in LAYOUTS {
            for lb in LAYOUTS {
                for lc in LAYOUTS {
                    let am = build(m, k, &a, la);
                    let bm = build(k, n, &b, lb);
                    let mut c = Matrix::zeros(m, n, lc).unwrap();
                    mm(Transpose::No, Transpose::No, 1.0, &am, &bm, 0.0, &mut c).unwrap();
                    prop_assert_eq!(c.layout(), lc);
                    prop_assert_eq!(logical(&c), reference.clone());
                }
            }
        }
    }

    #[test]
    fn mm_transposed_operands_match_explicit_transpose((m, k, n, a, b) in dims_and_data()) {
        // op(A) = A^T with A stored k x m; op(B) = B^T with B stored n x k.
        let at = build(m, k, &a, Layout::Row).to_layout(Layout::Col).unwrap();
        let bt = build(k, n, &b, Layout::Col).to_layout(Layout::Row).unwrap();
        let mut a_stored = at.clone();
        a_stored.transpose();
        let mut b_stored = bt.clone();
        b_stored.transpose();
        let direct = mm_new(Transpose::No, Transpose::No, 1.0, &at, &bt, Layout::Col).unwrap();
        let via_flags = mm_new(Transpose::Yes, Transpose::Yes, 1.0, &a_stored, &b_stored, Layout::Row).unwrap();
        prop_assert_eq!(logical(&direct), logical(&via_flags));
    }

    #[test]
    fn mv_is_layout_invariant((m, k, _n, a, x) in dims_and_data()) {
        let x = Vector::from_vec(x[..k].to_vec());
        let mut results = Vec::new();
        for la in LAYOUTS {
            let am = build(m, k, &a, la);
            let mut y = Vector::zeros(m).unwrap();
            mv(Transpose::No, 2.0, &am, &x, 0.0, &mut y).unwrap();
            results.push(y);
        }
        prop_assert_eq!(&results[0], &results[1]);
    }

    #[test]
    fn csr_dense_round_trip_is_layout_invariant((m, k, _n, a, _b) in dims_and_data()) {
        // Sparsify: drop entries with small magnitude.
        let sparse: Vec<f64> = a.iter().map(|&v| if v.abs() < 5.0 { 0.0 } else { v }).collect();
        for la in LAYOUTS {
            let dense = build(m, k, &sparse, la);
            let op = CsrOperator::from_dense(&dense, 0.0).unwrap();
            prop_assert_eq!(op.shape(), (m, k));
            for lo in LAYOUTS {
                prop_assert_eq!(logical(&op.to_dense(lo).unwrap()), sparse.clone());
            }
        }
    }
}
