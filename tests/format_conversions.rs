//! Integration tests for format conversions with sprs

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rowwise::{from_sprs_csr, to_sprs_csr, SparseMatrixCSR, Triplet};
use sprs::TriMat;

/// Creates a test matrix with a specific pattern
fn create_test_matrix_csr() -> SparseMatrixCSR<f64> {
    // [ 1.0  0.0  2.0  0.0  0.0 ]
    // [ 0.0  3.0  0.0  0.0  4.0 ]
    // [ 0.0  0.0  5.0  0.0  0.0 ]
    // [ 6.0  0.0  0.0  7.0  0.0 ]
    // [ 0.0  0.0  8.0  0.0  9.0 ]
    SparseMatrixCSR::from_raw_parts(
        5,
        5,
        vec![0, 2, 4, 5, 7, 9],
        vec![0, 2, 1, 4, 2, 0, 3, 2, 4],
        vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0],
    )
    .unwrap()
}

fn random_matrix(width: usize, height: usize, nnz: usize, seed: u64) -> SparseMatrixCSR<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let triplets = (0..nnz)
        .map(|_| {
            Triplet::new(
                rng.gen_range(0..height),
                rng.gen_range(0..width),
                rng.gen_range(-8..9) as f64,
            )
        })
        .collect();
    SparseMatrixCSR::from_triplets(width, height, triplets, false, false).unwrap()
}

#[test]
fn test_roundtrip_preserves_storage() {
    let original = create_test_matrix_csr();
    let sprs_mat = to_sprs_csr(&original);

    assert_eq!(sprs_mat.shape(), (5, 5));
    assert_eq!(sprs_mat.nnz(), 9);
    assert_eq!(sprs_mat.get(3, 3), Some(&7.0));

    let back = from_sprs_csr(sprs_mat).unwrap();
    assert_eq!(back.row_ptr(), original.row_ptr());
    assert_eq!(back.col_idx(), original.col_idx());
    assert_eq!(back.values(), original.values());
}

#[test]
fn test_triplet_construction_agrees_with_sprs() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let mut tri = TriMat::new((6, 9));
    let mut triplets = Vec::new();

    for _ in 0..40 {
        let (row, col, val) = (rng.gen_range(0..6), rng.gen_range(0..9), rng.gen_range(1..5) as f64);
        tri.add_triplet(row, col, val);
        triplets.push(Triplet::new(row, col, val));
    }

    // sprs sums duplicates when compressing
    let expected = from_sprs_csr(tri.to_csr()).unwrap();
    let ours = SparseMatrixCSR::from_triplets(9, 6, triplets, false, false).unwrap();

    assert_eq!(ours.row_ptr(), expected.row_ptr());
    assert_eq!(ours.col_idx(), expected.col_idx());
    assert!(ours.approx_eq(&expected));
}

#[test]
fn test_products_match_sprs() {
    let a = random_matrix(30, 20, 90, 3);
    let b = random_matrix(25, 30, 110, 4);

    let reference = &to_sprs_csr(&a) * &to_sprs_csr(&b);
    let reference = reference.to_dense();

    assert_eq!(a.multiply_inner(&b).unwrap().to_dense(), reference);
    assert_eq!(
        a.multiply_inner_with_transposition(&b, 3).unwrap().to_dense(),
        reference
    );
    assert_eq!(a.multiply_row_wise(&b, 4, 3).unwrap().to_dense(), reference);
}

#[test]
fn test_transpose_matches_sprs() {
    let a = random_matrix(7, 4, 15, 5);
    let expected = to_sprs_csr(&a).transpose_view().to_csr();

    let ours = a.transpose().unwrap();
    assert_eq!(ours.width(), 4);
    assert_eq!(ours.height(), 7);
    assert_eq!(ours.to_dense(), expected.to_dense());
}
