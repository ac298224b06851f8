//! The size-N multiplicative subgroup of roots of unity that every KZG vector
//! commitment in this crate is committed and opened over.
//!
//! Working in a domain of roots of unity enables O(1) in-domain Lagrange
//! evaluation and an O(N) quotient-polynomial construction instead of a
//! general polynomial division.

use ark_bls12_381::Fr;
use ark_ff::{batch_inversion, Field, Zero};
use ark_poly::{EvaluationDomain, Polynomial, Radix2EvaluationDomain};

use crate::error::{Error, Result};

/// Fixed evaluation-domain size of the core. Every `VectorCommit` and every
/// tree level operates over exactly this many Lagrange-basis values.
pub const N: usize = 4096;

/// The size-`N` multiplicative subgroup `{ω⁰,…,ω^{N-1}}` of `Fr`, plus the
/// precomputed helpers used for Lagrange evaluation and quotient-polynomial
/// construction in the Lagrange basis.
#[derive(Clone, Debug)]
pub struct Domain {
    inner: Radix2EvaluationDomain<Fr>,
    /// `roots[i] == ω^i`, in natural (non-bit-reversed) order.
    roots: Vec<Fr>,
    /// `vanishing_inv[i] == ω^i / N`, the barycentric weight at root `i`.
    vanishing_inv: Vec<Fr>,
}

impl Domain {
    /// Builds the evaluation domain of size `n`. `n` must be a power of two
    /// dividing `|Fr| - 1`.
    ///
    /// The whole crate only ever uses [`Domain::standard`] (size [`N`]); this
    /// constructor is kept generic so it can be exercised directly in tests
    /// with small domains.
    pub fn new(n: usize) -> Result<Self> {
        if !n.is_power_of_two() {
            return Err(Error::TrustedSetupInvalid(format!(
                "domain size {n} is not a power of two"
            )));
        }
        let inner = Radix2EvaluationDomain::<Fr>::new(n).ok_or_else(|| {
            Error::TrustedSetupInvalid(format!("no domain of size {n} exists for this field"))
        })?;
        let roots: Vec<Fr> = inner.elements().collect();

        // vanishing_inv[i] = omega^i / N = 1 / (N * omega^{-i})
        let n_f = Fr::from(n as u64);
        let mut vanishing_inv: Vec<Fr> = roots
            .iter()
            .map(|root| n_f * root.inverse().unwrap())
            .collect();
        batch_inversion(&mut vanishing_inv);

        Ok(Self {
            inner,
            roots,
            vanishing_inv,
        })
    }

    /// The standard, crate-wide domain of size [`N`].
    pub fn standard() -> Self {
        Self::new(N).expect("N is a power of two supported by the BLS12-381 scalar field")
    }

    pub fn size(&self) -> usize {
        self.roots.len()
    }

    pub fn roots(&self) -> &[Fr] {
        &self.roots
    }

    pub fn root(&self, i: usize) -> Fr {
        self.roots[i]
    }

    /// If `z` is one of `roots`, returns its index. `O(N)` but only taken on
    /// the negligible-probability path where a uniformly random `z` happens
    /// to land in the domain.
    pub fn index_of(&self, z: Fr) -> Option<usize> {
        if !self.inner.vanishing_polynomial().evaluate(&z).is_zero() {
            return None;
        }
        self.roots.iter().position(|r| *r == z)
    }

    /// Evaluates the polynomial given by `values` (in Lagrange basis over
    /// this domain) at an arbitrary point `z`.
    pub fn lagrange_eval(&self, values: &[Fr], z: Fr) -> Fr {
        assert_eq!(values.len(), self.size());
        if let Some(i) = self.index_of(z) {
            return values[i];
        }

        let mut denom_inv: Vec<Fr> = self.roots.iter().map(|root| z - root).collect();
        batch_inversion(&mut denom_inv);

        let mut sum = Fr::zero();
        for i in 0..self.size() {
            sum += values[i] * self.vanishing_inv[i] * denom_inv[i];
        }
        self.inner.vanishing_polynomial().evaluate(&z) * sum
    }

    /// Returns the Lagrange-basis coefficients of
    /// `q(X) = (p(X) - y) / (X - z)`, evaluated at every root of this domain.
    ///
    /// `z` may be inside or outside the domain. When `z == roots[m]` for some
    /// `m`, `y` must equal `values[m]`, or [`Error::DomainEvalMismatch`] is
    /// returned.
    pub fn quotient_poly(&self, values: &[Fr], z: Fr, y: Fr) -> Result<Vec<Fr>> {
        assert_eq!(values.len(), self.size());
        match self.index_of(z) {
            Some(m) => {
                if values[m] != y {
                    return Err(Error::DomainEvalMismatch);
                }
                Ok(self.quotient_in_domain(values, m))
            }
            None => Ok(self.quotient_outside(values, z, y)),
        }
    }

    /// `q_i = (values[i] - values[m]) / (roots[i] - roots[m])` for `i != m`;
    /// `q_m` is the synthetic sum that makes `q` the evaluation-form witness
    /// polynomial at the in-domain point `roots[m]`, per the multiproof
    /// witness-evaluation trick: <https://dankradfeist.de/ethereum/2021/06/18/pcs-multiproofs.html>
    fn quotient_in_domain(&self, values: &[Fr], m: usize) -> Vec<Fr> {
        let n = self.size();
        let y = values[m];
        let zm = self.roots[m];

        let mut nums = Vec::with_capacity(n);
        let mut denoms = Vec::with_capacity(n);
        for i in 0..n {
            nums.push(values[i] - y);
            denoms.push(self.roots[i] - zm);
        }
        denoms[m] = Fr::from(1u64);
        batch_inversion(&mut denoms);

        let mut q: Vec<Fr> = (0..n).map(|i| nums[i] * denoms[i]).collect();

        let mut sum = Fr::zero();
        for i in 0..n {
            if i == m {
                continue;
            }
            let exponent = ((i as isize - m as isize).rem_euclid(n as isize)) as usize;
            sum += nums[i] * (-denoms[i]) * self.roots[exponent];
        }
        q[m] = sum;
        q
    }

    /// `q_i = (values[i] - y) / (roots[i] - z)` for all `i`, assuming `z` is
    /// not in the domain.
    fn quotient_outside(&self, values: &[Fr], z: Fr, y: Fr) -> Vec<Fr> {
        let mut denom_inv: Vec<Fr> = self.roots.iter().map(|root| root - z).collect();
        batch_inversion(&mut denom_inv);
        (0..self.size())
            .map(|i| (values[i] - y) * denom_inv[i])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_std::UniformRand;

    fn rand_values(n: usize) -> Vec<Fr> {
        let mut rng = ark_std::test_rng();
        (0..n).map(|_| Fr::rand(&mut rng)).collect()
    }

    #[test]
    fn in_domain_evaluation_returns_stored_value() {
        let domain = Domain::new(64).unwrap();
        let values = rand_values(64);
        for i in 0..domain.size() {
            assert_eq!(domain.lagrange_eval(&values, domain.root(i)), values[i]);
        }
    }

    #[test]
    fn out_of_domain_evaluation_matches_naive_interpolation() {
        use ark_poly::{univariate::DensePolynomial, DenseUVPolynomial, Evaluations, Polynomial};

        let domain = Domain::new(64).unwrap();
        let values = rand_values(64);
        let evals = Evaluations::from_vec_and_domain(values.clone(), domain.inner);
        let poly: DensePolynomial<Fr> = evals.interpolate_by_ref();

        let mut rng = ark_std::test_rng();
        let z = Fr::rand(&mut rng);
        assert_eq!(domain.lagrange_eval(&values, z), poly.evaluate(&z));
    }

    #[test]
    fn quotient_in_domain_matches_long_division() {
        use ark_poly::{univariate::DensePolynomial, DenseUVPolynomial, Evaluations, Polynomial};

        let domain = Domain::new(64).unwrap();
        let values = rand_values(64);
        let evals = Evaluations::from_vec_and_domain(values.clone(), domain.inner);
        let poly: DensePolynomial<Fr> = evals.interpolate_by_ref();

        let m = 7;
        let z = domain.root(m);
        let y = values[m];
        let shifted = &poly - &DensePolynomial::from_coefficients_vec(vec![y]);
        let divisor = DensePolynomial::from_coefficients_vec(vec![-z, Fr::from(1u64)]);
        let witness = &shifted / &divisor;

        let q = domain.quotient_poly(&values, z, y).unwrap();
        for i in 0..domain.size() {
            assert_eq!(q[i], witness.evaluate(&domain.root(i)));
        }
    }

    #[test]
    fn quotient_rejects_inconsistent_claim() {
        let domain = Domain::new(64).unwrap();
        let values = rand_values(64);
        let z = domain.root(3);
        let wrong_y = values[3] + Fr::from(1u64);
        assert!(matches!(
            domain.quotient_poly(&values, z, wrong_y),
            Err(Error::DomainEvalMismatch)
        ));
    }
}
