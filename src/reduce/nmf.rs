// Non-negative factorization of the sparse term-document matrix.
//
// Multiplicative updates on the Frobenius objective: A (m×n) ≈ U (m×k) ×
// V (k×n), all factors non-negative. Reproducibility is a hard requirement:
// the iteration count is fixed, initialization comes from a seeded
// splitmix64 stream, and every rayon-parallel product keeps each output
// element's summation order sequential — so the result is bit-identical at
// any thread count.

use rayon::prelude::*;

use crate::vsm::{DenseMatrix, SparseRowMajorMatrix};

/// Guards multiplicative-update denominators against division by zero.
const EPSILON: f64 = 1e-9;

/// Fixed initialization seed. Clustering the same input twice must produce
/// the same factors, so there is deliberately no way to randomize this.
const INIT_SEED: u64 = 0x5ca1_ab1e_0ddb_a11;

/// Factorize `a` at rank `k` with a fixed number of multiplicative updates.
/// Returns (U, V) with U's columns scaled to unit L2 length.
pub fn factorize(
    a: &SparseRowMajorMatrix,
    k: usize,
    iterations: usize,
) -> (DenseMatrix, DenseMatrix) {
    let m = a.rows();
    let n = a.cols();

    let mut u = seeded_matrix(m, k, INIT_SEED);
    let mut v = seeded_matrix(k, n, INIT_SEED ^ 0xffff_ffff_ffff_ffff);

    for _ in 0..iterations {
        // V <- V ∘ (Uᵀ A) / ((Uᵀ U) V)
        let numerator = transposed_left_product(&u, a, k, n);
        let gram_u = gram_of_columns(&u);
        let denominator = small_left_product(&gram_u, &v);
        multiply_elementwise(&mut v, &numerator, &denominator);

        // U <- U ∘ (A Vᵀ) / (U (V Vᵀ))
        let numerator = right_transposed_product(a, &v, m, k);
        let gram_v = gram_of_rows(&v);
        let denominator = small_right_product(&u, &gram_v);
        multiply_elementwise(&mut u, &numerator, &denominator);
    }

    normalize_basis_columns(&mut u, &mut v);
    (u, v)
}

/// Deterministic dense init with entries in (0, 1].
fn seeded_matrix(rows: usize, cols: usize, seed: u64) -> DenseMatrix {
    let mut state = seed;
    let mut out = DenseMatrix::zeros(rows, cols);
    for value in out.data_mut() {
        *value = 0.01 + 0.99 * splitmix64(&mut state);
    }
    out
}

/// splitmix64 step mapped to [0, 1).
fn splitmix64(state: &mut u64) -> f64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^= z >> 31;
    (z >> 11) as f64 / (1u64 << 53) as f64
}

/// Uᵀ A, shape k×n. Parallel over the k output rows; each row is filled by
/// one worker in a fixed sweep over A's rows, so the sum order never
/// depends on the thread count.
fn transposed_left_product(
    u: &DenseMatrix,
    a: &SparseRowMajorMatrix,
    k: usize,
    n: usize,
) -> DenseMatrix {
    let mut out = DenseMatrix::zeros(k, n);
    out.data_mut()
        .par_chunks_mut(n)
        .enumerate()
        .for_each(|(c, out_row)| {
            for i in 0..a.rows() {
                let coefficient = u.at(i, c);
                if coefficient == 0.0 {
                    continue;
                }
                let (cols, values) = a.row(i);
                for (&j, &value) in cols.iter().zip(values) {
                    out_row[j] += coefficient * value;
                }
            }
        });
    out
}

/// A Vᵀ, shape m×k. Parallel over A's rows.
fn right_transposed_product(
    a: &SparseRowMajorMatrix,
    v: &DenseMatrix,
    m: usize,
    k: usize,
) -> DenseMatrix {
    let mut out = DenseMatrix::zeros(m, k);
    out.data_mut()
        .par_chunks_mut(k)
        .enumerate()
        .for_each(|(i, out_row)| {
            let (cols, values) = a.row(i);
            for (&j, &value) in cols.iter().zip(values) {
                for (c, slot) in out_row.iter_mut().enumerate() {
                    *slot += value * v.at(c, j);
                }
            }
        });
    out
}

/// Uᵀ U, shape k×k. k is small; sequential.
fn gram_of_columns(u: &DenseMatrix) -> DenseMatrix {
    let k = u.cols();
    let mut out = DenseMatrix::zeros(k, k);
    for i in 0..u.rows() {
        let row = u.row(i);
        for a in 0..k {
            for b in 0..k {
                let sum = out.at(a, b) + row[a] * row[b];
                out.set(a, b, sum);
            }
        }
    }
    out
}

/// V Vᵀ, shape k×k.
fn gram_of_rows(v: &DenseMatrix) -> DenseMatrix {
    let k = v.rows();
    let mut out = DenseMatrix::zeros(k, k);
    for a in 0..k {
        for b in 0..k {
            let sum = v.row(a).iter().zip(v.row(b)).map(|(x, y)| x * y).sum();
            out.set(a, b, sum);
        }
    }
    out
}

/// (k×k) × (k×n) product.
fn small_left_product(gram: &DenseMatrix, v: &DenseMatrix) -> DenseMatrix {
    let k = gram.rows();
    let n = v.cols();
    let mut out = DenseMatrix::zeros(k, n);
    out.data_mut()
        .par_chunks_mut(n)
        .enumerate()
        .for_each(|(c, out_row)| {
            for t in 0..k {
                let g = gram.at(c, t);
                if g == 0.0 {
                    continue;
                }
                for (j, slot) in out_row.iter_mut().enumerate() {
                    *slot += g * v.at(t, j);
                }
            }
        });
    out
}

/// (m×k) × (k×k) product.
fn small_right_product(u: &DenseMatrix, gram: &DenseMatrix) -> DenseMatrix {
    let k = gram.rows();
    let mut out = DenseMatrix::zeros(u.rows(), k);
    out.data_mut()
        .par_chunks_mut(k)
        .enumerate()
        .for_each(|(i, out_row)| {
            let row = u.row(i);
            for (c, slot) in out_row.iter_mut().enumerate() {
                *slot = (0..k).map(|t| row[t] * gram.at(t, c)).sum();
            }
        });
    out
}

/// target <- target ∘ numerator / (denominator + ε), elementwise.
fn multiply_elementwise(target: &mut DenseMatrix, numerator: &DenseMatrix, denominator: &DenseMatrix) {
    for ((t, &num), &den) in target
        .data_mut()
        .iter_mut()
        .zip(numerator.data())
        .zip(denominator.data())
    {
        *t *= num / (den + EPSILON);
    }
}

/// Scale U's columns to unit L2 length and fold the norms into V's rows so
/// the product U V is unchanged.
fn normalize_basis_columns(u: &mut DenseMatrix, v: &mut DenseMatrix) {
    let k = u.cols();
    for c in 0..k {
        let norm: f64 = (0..u.rows()).map(|r| u.at(r, c).powi(2)).sum::<f64>().sqrt();
        if norm <= EPSILON {
            continue;
        }
        for r in 0..u.rows() {
            let scaled = u.at(r, c) / norm;
            u.set(r, c, scaled);
        }
        for value in v.row_mut(c) {
            *value *= norm;
        }
    }
}
