//! Dense polynomials over `Zp`, ascending-coefficient representation.
//!
//! `f(X) = sum_k coeffs[k] * X^k`. The only operations the accumulator
//! needs: grow by a monomial factor, evaluate, and exactly divide out a
//! monomial factor (checking the remainder is zero, since a non-zero
//! remainder means the server's blacklist polynomial is corrupted).
//!
//! Division here is specialized to a *linear* factor `(X + a)`, always
//! exact by construction; a non-clean division is treated as a hard error
//! rather than a truncated quotient.

#![forbid(unsafe_code)]

use ark_ff::Zero;

use crate::errors::StorageError;
use crate::group::Scalar;

/// `f(X) * (X + a)`. Length grows by exactly one.
pub fn mul_by_linear(f: &[Scalar], a: Scalar) -> Vec<Scalar> {
    if f.is_empty() {
        return Vec::new();
    }
    let mut out = vec![Scalar::zero(); f.len() + 1];
    out[0] = f[0] * a;
    for i in 1..f.len() {
        out[i] = f[i - 1] + f[i] * a;
    }
    out[f.len()] = f[f.len() - 1];
    out
}

/// `f(x) = sum_k coeffs[k] * x^k`, by Horner's method.
pub fn eval(f: &[Scalar], x: Scalar) -> Scalar {
    f.iter().rev().fold(Scalar::zero(), |acc, &c| acc * x + c)
}

/// Compute `Q(X)` such that `(f(X) - f(-y)) = Q(X) * (X + y)`.
///
/// This is always an exact division (`X = -y` is a root of the left-hand
/// side by construction), so a non-zero remainder indicates the caller's
/// `f` was already inconsistent — surfaced as [`StorageError::NonZeroRemainder`],
/// a server/storage consistency error, not a verification failure a
/// client-supplied proof can trigger.
pub fn div_by_linear(f: &[Scalar], y: Scalar) -> Result<Vec<Scalar>, StorageError> {
    if f.is_empty() {
        return Ok(Vec::new());
    }
    let v = eval(f, -y);
    let mut g = f.to_vec();
    g[0] -= v;

    // Synthetic division of g(X) by (X - r), r = -y, on descending coeffs.
    let r = -y;
    let desc: Vec<Scalar> = g.iter().rev().cloned().collect();
    let n = desc.len();
    if n == 1 {
        if !desc[0].is_zero() {
            return Err(StorageError::NonZeroRemainder);
        }
        return Ok(Vec::new());
    }
    let mut b = Vec::with_capacity(n - 1);
    b.push(desc[0]);
    for item in desc.iter().take(n - 1).skip(1) {
        let bi = *item + r * *b.last().unwrap();
        b.push(bi);
    }
    let remainder = desc[n - 1] + r * b[n - 2];
    if !remainder.is_zero() {
        return Err(StorageError::NonZeroRemainder);
    }
    b.reverse();
    Ok(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: u64) -> Scalar {
        Scalar::from(v)
    }

    #[test]
    fn mul_by_linear_matches_direct_expansion() {
        // f(X) = 1 (constant), times (X + 3) => 3 + X
        let f = vec![s(1)];
        let g = mul_by_linear(&f, s(3));
        assert_eq!(g, vec![s(3), s(1)]);
    }

    #[test]
    fn mul_by_linear_of_the_zero_polynomial_stays_zero() {
        assert_eq!(mul_by_linear(&[], s(3)), Vec::<Scalar>::new());
    }

    #[test]
    fn eval_matches_textbook_horner() {
        // f(X) = 1 + 2X + 3X^2, at x = 5 -> 1 + 10 + 75 = 86
        let f = vec![s(1), s(2), s(3)];
        assert_eq!(eval(&f, s(5)), s(86));
    }

    #[test]
    fn div_by_linear_exact_for_inserted_roots() {
        // Build f(X) = (X+2)(X+3)(X+5), starting from [1].
        let mut f = vec![s(1)];
        for root in [s(2), s(3), s(5)] {
            f = mul_by_linear(&f, root);
        }
        for root in [s(2), s(3), s(5)] {
            let q = div_by_linear(&f, root).expect("exact division for an inserted root");
            // deg(Q) = deg(f) - 1
            assert_eq!(q.len(), f.len() - 1);
            // Q(X) * (X + root) should equal f(X) - f(-root) == f(X) (since root is a root)
            let rebuilt = mul_by_linear(&q, root);
            assert_eq!(rebuilt, f);
        }
    }

    #[test]
    fn div_by_linear_on_non_root_still_succeeds_with_adjustment() {
        // (X+2)(X+3), divide by (X+7): not a root, but g(X) = f(X)-f(-7) IS divisible.
        let f = mul_by_linear(&mul_by_linear(&vec![s(1)], s(2)), s(3));
        let q = div_by_linear(&f, s(7)).expect("g(X) is always divisible by (X+y) by construction");
        assert_eq!(q.len(), f.len() - 1);
    }
}
