//! Finding the real roots of a [`RationalFunction`].

use crate::{
    equations::EquationError,
    expr::Expr,
    ops::EvaluationError,
    poly::{self, Polynomial, RationalFunction},
    radical,
};
use arrayvec::ArrayVec;
use nalgebra::DMatrix as Matrix;
use num::{BigInt, BigRational, Integer, One, Signed, Zero};
use std::{
    cmp::Ordering,
    collections::BTreeSet,
    fmt::{self, Display, Formatter},
};

/// A single root.
#[derive(Debug, Clone, PartialEq)]
pub enum Root {
    Exact(Expr),
    /// A root we could only find numerically.
    Approximate(f64),
}

impl Root {
    pub fn approximate(&self) -> Option<f64> {
        match self {
            Root::Exact(value) => value.approximate(),
            Root::Approximate(value) => Some(*value),
        }
    }
}

impl Display for Root {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Root::Exact(value) => write!(f, "{}", value),
            Root::Approximate(value) => write!(f, "{}", value),
        }
    }
}

/// The outcome of solving an equation.
#[derive(Debug, Clone, PartialEq)]
pub enum Solution {
    /// The real roots, in ascending order. Never empty.
    Roots(Vec<Root>),
    NoSolution,
    InfinitelyMany,
}

impl Solution {
    pub fn roots(&self) -> &[Root] {
        match self {
            Solution::Roots(roots) => roots,
            Solution::NoSolution | Solution::InfinitelyMany => &[],
        }
    }
}

/// Find the values of the variable which make `function` zero, skipping any
/// where one of the `poles` vanishes.
pub(crate) fn find_roots(
    function: &RationalFunction,
    poles: &[Polynomial],
) -> Result<Solution, EquationError> {
    let numerator = function.numerator();

    let degree = match numerator.degree() {
        None => return Ok(Solution::InfinitelyMany),
        Some(0) => return Ok(Solution::NoSolution),
        Some(degree) => degree,
    };

    let candidates = if numerator.is_symbolic() {
        if degree > 1 {
            return Err(EquationError::Nonlinear { degree });
        }
        vec![linear(numerator)?]
    } else if let Some(coefficients) = numerator.to_rationals() {
        rational_roots(coefficients)?
    } else {
        match degree {
            1 => vec![linear(numerator)?],
            2 => quadratic(numerator)?.into_iter().collect(),
            _ => numeric(numerator),
        }
    };

    let roots = real_roots(candidates, |root| {
        vanishes(function.denominator(), root)
            || poles.iter().any(|pole| vanishes(pole, root))
    });

    if roots.is_empty() {
        Ok(Solution::NoSolution)
    } else {
        Ok(Solution::Roots(roots))
    }
}

/// Drop the excluded roots, then sort and deduplicate.
fn real_roots<F>(candidates: Vec<Root>, excluded: F) -> Vec<Root>
where
    F: Fn(&Root) -> bool,
{
    let mut roots: Vec<Root> = candidates
        .into_iter()
        .filter(|root| !excluded(root))
        .collect();

    roots.sort_by(|left, right| {
        left.approximate()
            .partial_cmp(&right.approximate())
            .unwrap_or(Ordering::Equal)
    });

    roots.dedup_by(|left, right| match (left.approximate(), right.approximate())
    {
        (Some(a), Some(b)) => {
            left == right
                || approx::relative_eq!(
                    a,
                    b,
                    epsilon = 1e-9,
                    max_relative = 1e-9
                )
        },
        _ => left == right,
    });

    roots
}

fn vanishes(polynomial: &Polynomial, root: &Root) -> bool {
    match root {
        Root::Exact(value) => polynomial.evaluate(value).is_zero(),
        Root::Approximate(value) => polynomial
            .evaluate_approximately(*value)
            .map_or(false, |y| y.abs() < 1e-9),
    }
}

/// `a*x + b = 0` gives `x = -b/a`.
fn linear(polynomial: &Polynomial) -> Result<Root, EvaluationError> {
    let coefficients = polynomial.coefficients();
    debug_assert_eq!(coefficients.len(), 2);

    let root = (-coefficients[0].clone()).checked_div(&coefficients[1])?;
    Ok(Root::Exact(root))
}

/// The real roots of `a*x^2 + b*x + c` from the quadratic formula.
fn quadratic(
    polynomial: &Polynomial,
) -> Result<ArrayVec<Root, 2>, EvaluationError> {
    let coefficients = polynomial.coefficients();
    debug_assert_eq!(coefficients.len(), 3);
    let (c, b, a) = (&coefficients[0], &coefficients[1], &coefficients[2]);

    let discriminant =
        b.clone() * b.clone() - Expr::from(4) * a.clone() * c.clone();
    let two_a = Expr::from(2) * a.clone();

    let sign = match discriminant.as_constant() {
        Some(d) => d.cmp(&BigRational::zero()),
        None => discriminant
            .approximate()
            .and_then(|d| d.partial_cmp(&0.0))
            .unwrap_or(Ordering::Greater),
    };

    let mut roots = ArrayVec::new();

    match sign {
        Ordering::Less => {},
        Ordering::Equal => {
            roots.push(Root::Exact((-b.clone()).checked_div(&two_a)?));
        },
        Ordering::Greater => {
            let half = BigRational::new(1.into(), 2.into());
            let root = discriminant.pow_rational(&half)?;

            for offset in [-root.clone(), root] {
                let x = (offset - b.clone()).checked_div(&two_a)?;
                roots.push(Root::Exact(x));
            }
        },
    }

    Ok(roots)
}

/// Find every rational root using the rational root theorem, then solve
/// whatever is left over.
fn rational_roots(
    coefficients: Vec<BigRational>,
) -> Result<Vec<Root>, EvaluationError> {
    let mut remaining = coefficients;
    let mut roots = Vec::new();

    while remaining.len() > 1 && remaining[0].is_zero() {
        roots.push(Root::Exact(Expr::zero()));
        remaining.remove(0);
    }

    if remaining.len() > 3 {
        for candidate in rational_candidates(&remaining) {
            while remaining.len() > 1
                && poly::evaluate_rational(&remaining, &candidate).is_zero()
            {
                log::debug!("Found a rational root, {}", candidate);
                roots.push(Root::Exact(Expr::constant(candidate.clone())));
                remaining = deflate(&remaining, &candidate);
            }

            if remaining.len() <= 3 {
                break;
            }
        }
    }

    if remaining.len() > 3 {
        if let Some(found) = binomial(&remaining)? {
            roots.extend(found);
            return Ok(roots);
        }
    }

    let rest = Polynomial::from_rationals(remaining);

    match rest.degree() {
        None | Some(0) => {},
        Some(1) => roots.push(linear(&rest)?),
        Some(2) => roots.extend(quadratic(&rest)?),
        Some(_) => roots.extend(numeric(&rest)),
    }

    Ok(roots)
}

/// `a*x^n + c = 0` has the real roots `±(-c/a)^(1/n)`.
///
/// Returns `None` if any of the other coefficients are non-zero.
fn binomial(
    coefficients: &[BigRational],
) -> Result<Option<Vec<Root>>, EvaluationError> {
    let (constant, middle, leading) = match coefficients {
        [constant, middle @ .., leading] => (constant, middle, leading),
        _ => return Ok(None),
    };
    if middle.iter().any(|c| !c.is_zero()) {
        return Ok(None);
    }

    let degree = middle.len() + 1;
    let value = -(constant / leading);
    let exponent = BigRational::new(BigInt::one(), BigInt::from(degree));
    let magnitude = Expr::constant(value.abs()).pow_rational(&exponent)?;

    let roots = match (value.is_negative(), degree.is_even()) {
        (true, true) => Vec::new(),
        (true, false) => vec![Root::Exact(-magnitude)],
        (false, true) => {
            vec![Root::Exact(-magnitude.clone()), Root::Exact(magnitude)]
        },
        (false, false) => vec![Root::Exact(magnitude)],
    };

    Ok(Some(roots))
}

/// Every `±p/q` where `p` divides the constant term and `q` divides the
/// leading coefficient, once the polynomial has integer coefficients.
fn rational_candidates(coefficients: &[BigRational]) -> BTreeSet<BigRational> {
    let mut candidates = BTreeSet::new();

    let scale = coefficients
        .iter()
        .fold(BigInt::one(), |acc, c| acc.lcm(c.denom()));
    let scale = BigRational::from_integer(scale);

    let (constant, leading) = match (coefficients.first(), coefficients.last())
    {
        (Some(constant), Some(leading)) => {
            ((constant * &scale).to_integer(), (leading * &scale).to_integer())
        },
        _ => return candidates,
    };

    let (numerators, denominators) =
        match (radical::divisors(&constant), radical::divisors(&leading)) {
            (Some(p), Some(q)) => (p, q),
            _ => {
                log::debug!(
                    "Coefficients are too large to search for rational roots"
                );
                return candidates;
            },
        };

    for p in &numerators {
        for q in &denominators {
            let candidate = BigRational::new(p.clone(), q.clone());
            candidates.insert(-candidate.clone());
            candidates.insert(candidate);
        }
    }

    candidates
}

/// Divide out the factor `(x - root)`.
fn deflate(
    coefficients: &[BigRational],
    root: &BigRational,
) -> Vec<BigRational> {
    let factor = [-root.clone(), BigRational::one()];
    let (quotient, remainder) = poly::div_rem(coefficients, &factor);
    debug_assert!(remainder.is_empty());

    quotient
}

/// Find the real roots numerically, using the eigenvalues of the companion
/// matrix as a first guess and polishing them with Newton's method.
fn numeric(polynomial: &Polynomial) -> Vec<Root> {
    let coefficients = match polynomial.to_floats() {
        Some(c) if c.len() > 1 => c,
        _ => {
            log::warn!("Unable to approximate the coefficients of a polynomial");
            return Vec::new();
        },
    };

    let degree = coefficients.len() - 1;
    let leading = coefficients[degree];

    let companion = Matrix::from_fn(degree, degree, |row, column| {
        if column == degree - 1 {
            -coefficients[row] / leading
        } else if row == column + 1 {
            1.0
        } else {
            0.0
        }
    });

    let mut roots = Vec::new();

    for eigenvalue in companion.complex_eigenvalues().iter() {
        if eigenvalue.im.abs() > 1e-6 * eigenvalue.re.abs().max(1.0) {
            continue;
        }

        let root = polish(&coefficients, eigenvalue.re);
        if root.is_finite() {
            roots.push(Root::Approximate(root));
        }
    }

    roots
}

fn polish(coefficients: &[f64], guess: f64) -> f64 {
    const MAX_ITERATIONS: usize = 50;

    let derivative: Vec<f64> = coefficients
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, c)| c * i as f64)
        .collect();

    let mut x = guess;

    for _ in 0..MAX_ITERATIONS {
        let slope = poly::horner(&derivative, x);
        if slope == 0.0 {
            break;
        }

        let next = x - poly::horner(coefficients, x) / slope;

        if approx::relative_eq!(next, x) {
            return next;
        }
        x = next;
    }

    x
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poly(coefficients: &[i64]) -> Polynomial {
        Polynomial::new(coefficients.iter().map(|&c| Expr::from(c)).collect())
    }

    fn solve(coefficients: &[i64]) -> Solution {
        let function = RationalFunction::from_polynomial(poly(coefficients));
        find_roots(&function, &[]).unwrap()
    }

    fn exact(roots: &[i64]) -> Solution {
        Solution::Roots(
            roots.iter().map(|&r| Root::Exact(Expr::from(r))).collect(),
        )
    }

    #[test]
    fn zero_polynomial_has_infinitely_many_solutions() {
        assert_eq!(solve(&[]), Solution::InfinitelyMany);
    }

    #[test]
    fn non_zero_constant_has_no_solutions() {
        assert_eq!(solve(&[5]), Solution::NoSolution);
    }

    #[test]
    fn linear_equation() {
        let got = solve(&[-4, 2]);

        assert_eq!(got, exact(&[2]));
    }

    #[test]
    fn quadratic_roots_are_sorted() {
        let got = solve(&[-4, 0, 1]);

        assert_eq!(got, exact(&[-2, 2]));
    }

    #[test]
    fn repeated_roots_are_reported_once() {
        let got = solve(&[1, -2, 1]);

        assert_eq!(got, exact(&[1]));
    }

    #[test]
    fn irrational_roots_are_exact() {
        let got = solve(&[-2, 0, 1]);

        let roots: Vec<_> = got.roots().iter().map(Root::to_string).collect();
        assert_eq!(roots, vec!["-sqrt(2)", "sqrt(2)"]);
    }

    #[test]
    fn complex_roots_are_ignored() {
        assert_eq!(solve(&[1, 0, 1]), Solution::NoSolution);
    }

    #[test]
    fn cubic_with_rational_roots() {
        let got = solve(&[-6, 11, -6, 1]);

        assert_eq!(got, exact(&[1, 2, 3]));
    }

    #[test]
    fn zero_is_found_as_a_root() {
        let got = solve(&[0, -1, 0, 1]);

        assert_eq!(got, exact(&[-1, 0, 1]));
    }

    #[test]
    fn cube_roots_are_exact() {
        // 2x^3 - 1 has no rational roots
        let got = solve(&[-1, 0, 0, 2]);

        let roots = got.roots();
        assert_eq!(roots.len(), 1);
        assert!(matches!(roots[0], Root::Exact(_)), "{:?}", roots);
        approx::assert_relative_eq!(
            roots[0].approximate().unwrap(),
            0.5_f64.cbrt(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn roots_of_pure_powers() {
        let inputs = vec![
            (vec![-2, 0, 0, 1], vec!["2^(1/3)"]),
            (vec![2, 0, 0, 1], vec!["-2^(1/3)"]),
            (vec![-4, 0, 0, 0, 1], vec!["-sqrt(2)", "sqrt(2)"]),
            (vec![4, 0, 0, 0, 1], vec![]),
        ];

        for (coefficients, should_be) in inputs {
            let got = solve(&coefficients);

            let roots: Vec<_> =
                got.roots().iter().map(Root::to_string).collect();
            assert_eq!(roots, should_be, "{:?}", coefficients);
        }
    }

    #[test]
    fn fractional_rational_root() {
        let got = solve(&[-1, 0, 0, 8]);

        assert_eq!(
            got,
            Solution::Roots(vec![Root::Exact(Expr::constant(
                BigRational::new(BigInt::from(1), BigInt::from(2))
            ))])
        );
    }

    #[test]
    fn quartic_after_deflation_leaves_a_quadratic() {
        // (x - 1)(x + 1)(x^2 - 3)
        let got = solve(&[3, 0, -4, 0, 1]);

        let roots: Vec<_> = got.roots().iter().map(Root::to_string).collect();
        assert_eq!(roots, vec!["-sqrt(3)", "-1", "1", "sqrt(3)"]);
    }

    #[test]
    fn numeric_roots_of_a_quintic() {
        // x^5 - x - 1 has a single real root
        let got = solve(&[-1, -1, 0, 0, 0, 1]);

        let roots = got.roots();
        assert_eq!(roots.len(), 1);
        let x = roots[0].approximate().unwrap();
        approx::assert_relative_eq!(x.powi(5) - x - 1.0, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn roots_of_the_denominator_are_discarded() {
        // (x^2 - 1)/(x - 1), before cancelling
        let function =
            RationalFunction::new(poly(&[-1, 0, 1]), poly(&[-1, 1]));

        let got = find_roots(&function, &[]).unwrap();

        assert_eq!(got, exact(&[-1]));
    }

    #[test]
    fn roots_of_cancelled_poles_are_discarded() {
        // (x^2 - 1)/(x - 1) - 2 == x - 1 once the common factor is gone
        let function = RationalFunction::from_polynomial(poly(&[-1, 1]));

        let got = find_roots(&function, &[poly(&[-1, 1])]).unwrap();

        assert_eq!(got, Solution::NoSolution);
    }

    #[test]
    fn symbolic_linear_coefficients() {
        let y = Expr::symbol("y");
        let numerator =
            Polynomial::new(vec![y.clone() - Expr::from(3), Expr::one()]);
        let function = RationalFunction::from_polynomial(numerator);

        let got = find_roots(&function, &[]).unwrap();

        assert_eq!(got.roots()[0].to_string(), "-y + 3");
    }

    #[test]
    fn symbolic_quadratics_are_rejected() {
        let y = Expr::symbol("y");
        let numerator = Polynomial::new(vec![y, Expr::zero(), Expr::one()]);
        let function = RationalFunction::from_polynomial(numerator);

        let got = find_roots(&function, &[]).unwrap_err();

        assert_eq!(got, EquationError::Nonlinear { degree: 2 });
    }

    #[test]
    fn irrational_coefficients() {
        // x^2 - 2*sqrt(2)*x + 2 == (x - sqrt(2))^2
        let half = BigRational::new(BigInt::from(1), BigInt::from(2));
        let root_2 = Expr::from(2).pow_rational(&half).unwrap();
        let numerator = Polynomial::new(vec![
            Expr::from(2),
            Expr::from(-2) * root_2.clone(),
            Expr::one(),
        ]);
        let function = RationalFunction::from_polynomial(numerator);

        let got = find_roots(&function, &[]).unwrap();

        assert_eq!(got, Solution::Roots(vec![Root::Exact(root_2)]));
    }
}
