//! Polynomials and rational functions in a single variable.

use crate::{
    expr::{Atom, Expr, Monomial},
    ops::EvaluationError,
};
use num::{BigRational, One, Signed, ToPrimitive, Zero};
use std::{
    collections::BTreeMap,
    ops::{Add, Mul, Neg, Sub},
};

/// The largest power we'll expand when converting to a rational function.
const MAX_DEGREE: u32 = 64;

/// A polynomial with [`Expr`] coefficients, stored lowest degree first.
///
/// Trailing zeros are always trimmed, so the zero polynomial has no
/// coefficients at all.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Polynomial {
    coefficients: Vec<Expr>,
}

impl Polynomial {
    pub fn new(coefficients: Vec<Expr>) -> Self {
        let mut coefficients = coefficients;
        while coefficients.last().map_or(false, Expr::is_zero) {
            coefficients.pop();
        }

        Polynomial { coefficients }
    }

    pub fn constant(value: Expr) -> Self { Polynomial::new(vec![value]) }

    /// The polynomial `x`.
    pub fn variable() -> Self {
        Polynomial::new(vec![Expr::zero(), Expr::one()])
    }

    pub(crate) fn from_rationals(coefficients: Vec<BigRational>) -> Self {
        Polynomial::new(coefficients.into_iter().map(Expr::constant).collect())
    }

    pub fn coefficients(&self) -> &[Expr] { &self.coefficients }

    /// The degree, or `None` for the zero polynomial.
    pub fn degree(&self) -> Option<usize> {
        self.coefficients.len().checked_sub(1)
    }

    pub fn leading_coefficient(&self) -> Option<&Expr> {
        self.coefficients.last()
    }

    /// Do all the coefficients boil down to plain rational numbers?
    pub fn is_rational(&self) -> bool {
        self.coefficients.iter().all(|c| c.as_constant().is_some())
    }

    /// Does any coefficient mention a symbol?
    pub fn is_symbolic(&self) -> bool {
        self.coefficients.iter().any(|c| !c.symbols().is_empty())
    }

    pub(crate) fn to_rationals(&self) -> Option<Vec<BigRational>> {
        self.coefficients.iter().map(Expr::as_constant).collect()
    }

    pub(crate) fn to_floats(&self) -> Option<Vec<f64>> {
        self.coefficients.iter().map(Expr::approximate).collect()
    }

    /// Evaluate the polynomial using Horner's method.
    pub fn evaluate(&self, at: &Expr) -> Expr {
        self.coefficients
            .iter()
            .rev()
            .fold(Expr::zero(), |acc, c| acc * at.clone() + c.clone())
    }

    pub fn evaluate_approximately(&self, at: f64) -> Option<f64> {
        let coefficients = self.to_floats()?;
        Some(horner(&coefficients, at))
    }

    /// Turn the polynomial back into an [`Expr`] in terms of `variable`.
    pub fn to_expr(&self, variable: &str) -> Expr {
        self.evaluate(&Expr::symbol(variable))
    }

    fn scale(&self, factor: &Expr) -> Polynomial {
        Polynomial::new(
            self.coefficients
                .iter()
                .map(|c| c.clone() * factor.clone())
                .collect(),
        )
    }

    fn powi(&self, n: u32) -> Polynomial {
        (0..n).fold(Polynomial::one(), |acc, _| acc * self.clone())
    }

    /// The monic greatest common divisor of two polynomials with rational
    /// coefficients.
    pub fn gcd(&self, other: &Polynomial) -> Option<Polynomial> {
        let a = self.to_rationals()?;
        let b = other.to_rationals()?;

        Some(Polynomial::from_rationals(gcd(a, b)))
    }

    /// Polynomial long division, for rational coefficients.
    pub fn div_rem(
        &self,
        divisor: &Polynomial,
    ) -> Option<(Polynomial, Polynomial)> {
        let numerator = self.to_rationals()?;
        let divisor = divisor.to_rationals()?;

        if divisor.is_empty() {
            return None;
        }

        let (quotient, remainder) = div_rem(&numerator, &divisor);
        Some((
            Polynomial::from_rationals(quotient),
            Polynomial::from_rationals(remainder),
        ))
    }
}

impl Zero for Polynomial {
    fn zero() -> Self { Polynomial::default() }

    fn is_zero(&self) -> bool { self.coefficients.is_empty() }
}

impl One for Polynomial {
    fn one() -> Self { Polynomial::constant(Expr::one()) }
}

impl Add for Polynomial {
    type Output = Polynomial;

    fn add(self, rhs: Polynomial) -> Polynomial {
        let (mut longer, shorter) =
            if self.coefficients.len() >= rhs.coefficients.len() {
                (self.coefficients, rhs.coefficients)
            } else {
                (rhs.coefficients, self.coefficients)
            };

        for (i, c) in shorter.into_iter().enumerate() {
            let existing = std::mem::take(&mut longer[i]);
            longer[i] = existing + c;
        }

        Polynomial::new(longer)
    }
}

impl Neg for Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Polynomial {
        Polynomial::new(self.coefficients.into_iter().map(Neg::neg).collect())
    }
}

impl Sub for Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: Polynomial) -> Polynomial { self + -rhs }
}

impl Mul for Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: Polynomial) -> Polynomial {
        if self.is_zero() || rhs.is_zero() {
            return Polynomial::zero();
        }

        let length = self.coefficients.len() + rhs.coefficients.len() - 1;
        let mut product = vec![Expr::zero(); length];

        for (i, a) in self.coefficients.iter().enumerate() {
            for (j, b) in rhs.coefficients.iter().enumerate() {
                let existing = std::mem::take(&mut product[i + j]);
                product[i + j] = existing + a.clone() * b.clone();
            }
        }

        Polynomial::new(product)
    }
}

/// A ratio of two [`Polynomial`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct RationalFunction {
    numerator: Polynomial,
    denominator: Polynomial,
}

impl RationalFunction {
    pub fn new(numerator: Polynomial, denominator: Polynomial) -> Self {
        debug_assert!(!denominator.is_zero());
        RationalFunction {
            numerator,
            denominator,
        }
    }

    pub fn from_polynomial(numerator: Polynomial) -> Self {
        RationalFunction::new(numerator, Polynomial::one())
    }

    pub fn numerator(&self) -> &Polynomial { &self.numerator }

    pub fn denominator(&self) -> &Polynomial { &self.denominator }

    pub fn is_rational(&self) -> bool {
        self.numerator.is_rational() && self.denominator.is_rational()
    }

    /// Try to rewrite `value` as a ratio of polynomials in `variable`.
    ///
    /// Returns `None` when `variable` appears somewhere a polynomial can't
    /// express, like `sqrt(x)` or `2^x`.
    pub fn from_expr(value: &Expr, variable: &str) -> Option<Self> {
        let mut total =
            RationalFunction::from_polynomial(Polynomial::zero());

        for (monomial, coefficient) in value.terms() {
            let term =
                RationalFunction::from_term(monomial, coefficient, variable)?;
            total = (total + term).reduced();
        }

        Some(total)
    }

    /// Every polynomial in `variable` that `value` is divided by, before
    /// anything gets cancelled.
    ///
    /// `value` is undefined wherever one of these is zero, even if
    /// [`RationalFunction::reduced()`] would cancel that factor away.
    pub fn poles(value: &Expr, variable: &str) -> Option<Vec<Polynomial>> {
        let mut poles = Vec::new();

        for (monomial, _) in value.terms() {
            for (atom, exponent) in monomial.factors() {
                if !atom.depends_on(variable) {
                    continue;
                }

                match atom {
                    Atom::Symbol(_) => {
                        if exponent.is_negative() {
                            poles.push(Polynomial::variable());
                        }
                    },
                    Atom::Group(inner) => {
                        poles.extend(RationalFunction::poles(inner, variable)?);

                        if exponent.is_negative() {
                            let base =
                                RationalFunction::from_expr(inner, variable)?;
                            poles.push(base.numerator);
                        }
                    },
                    Atom::Surd(_) | Atom::Power { .. } => return None,
                }
            }
        }

        Some(poles)
    }

    fn from_term(
        monomial: &Monomial,
        coefficient: &BigRational,
        variable: &str,
    ) -> Option<Self> {
        let mut constant_factors = BTreeMap::new();
        let mut function = RationalFunction::from_polynomial(Polynomial::one());

        for (atom, exponent) in monomial.factors() {
            if !atom.depends_on(variable) {
                constant_factors.insert(atom.clone(), exponent.clone());
                continue;
            }

            if !exponent.is_integer() {
                return None;
            }
            let power = exponent.to_integer().to_i32()?;

            let base = match atom {
                Atom::Symbol(_) => {
                    RationalFunction::from_polynomial(Polynomial::variable())
                },
                Atom::Group(inner) => {
                    RationalFunction::from_expr(inner, variable)?
                },
                Atom::Surd(_) | Atom::Power { .. } => return None,
            };

            function = function * base.powi(power)?;
        }

        let constant = Expr::term(coefficient.clone(), constant_factors);
        Some(RationalFunction::new(
            function.numerator.scale(&constant),
            function.denominator,
        ))
    }

    fn powi(&self, n: i32) -> Option<Self> {
        if n.unsigned_abs() > MAX_DEGREE {
            return None;
        }

        let (top, bottom) = if n >= 0 {
            (&self.numerator, &self.denominator)
        } else {
            (&self.denominator, &self.numerator)
        };

        if bottom.is_zero() {
            return None;
        }

        let n = n.unsigned_abs();
        Some(RationalFunction::new(top.powi(n), bottom.powi(n)))
    }

    /// Cancel common factors and make the denominator monic.
    ///
    /// Only functions with rational coefficients can have common factors
    /// cancelled. Anything else only has a rational constant denominator
    /// divided through.
    pub fn reduced(&self) -> Self {
        if self.numerator.is_zero() {
            return RationalFunction::from_polynomial(Polynomial::zero());
        }

        if let Some(common) = self.numerator.gcd(&self.denominator) {
            let quotients = self
                .numerator
                .div_rem(&common)
                .zip(self.denominator.div_rem(&common));

            if let Some(((numerator, _), (denominator, _))) = quotients {
                let leading = denominator
                    .leading_coefficient()
                    .and_then(Expr::as_constant)
                    .filter(|c| !c.is_zero());

                if let Some(leading) = leading {
                    let inverse = Expr::constant(leading.recip());
                    return RationalFunction::new(
                        numerator.scale(&inverse),
                        denominator.scale(&inverse),
                    );
                }
            }
        }

        match self.denominator.to_rationals().as_deref() {
            Some([constant]) if !constant.is_zero() && !constant.is_one() => {
                let inverse = Expr::constant(constant.recip());
                RationalFunction::from_polynomial(self.numerator.scale(&inverse))
            },
            _ => self.clone(),
        }
    }

    /// Rebuild the function as an [`Expr`] in terms of `variable`.
    pub fn to_expr(&self, variable: &str) -> Result<Expr, EvaluationError> {
        let numerator = self.numerator.to_expr(variable);

        if self.denominator.is_one() {
            Ok(numerator)
        } else {
            numerator.checked_div(&self.denominator.to_expr(variable))
        }
    }
}

impl Add for RationalFunction {
    type Output = RationalFunction;

    fn add(self, rhs: RationalFunction) -> RationalFunction {
        if self.denominator == rhs.denominator {
            return RationalFunction::new(
                self.numerator + rhs.numerator,
                self.denominator,
            );
        }

        RationalFunction::new(
            self.numerator * rhs.denominator.clone()
                + rhs.numerator * self.denominator.clone(),
            self.denominator * rhs.denominator,
        )
    }
}

impl Mul for RationalFunction {
    type Output = RationalFunction;

    fn mul(self, rhs: RationalFunction) -> RationalFunction {
        RationalFunction::new(
            self.numerator * rhs.numerator,
            self.denominator * rhs.denominator,
        )
    }
}

/// Evaluate a polynomial with floating point coefficients.
pub(crate) fn horner(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

pub(crate) fn evaluate_rational(
    coefficients: &[BigRational],
    x: &BigRational,
) -> BigRational {
    coefficients
        .iter()
        .rev()
        .fold(BigRational::zero(), |acc, c| acc * x + c)
}

fn trim(coefficients: &mut Vec<BigRational>) {
    while coefficients.last().map_or(false, Zero::is_zero) {
        coefficients.pop();
    }
}

/// Long division of rational polynomials. The divisor must be non-zero.
pub(crate) fn div_rem(
    numerator: &[BigRational],
    divisor: &[BigRational],
) -> (Vec<BigRational>, Vec<BigRational>) {
    let divisor_degree = divisor.len() - 1;
    let leading = &divisor[divisor_degree];
    let mut remainder = numerator.to_vec();

    if remainder.len() < divisor.len() {
        return (Vec::new(), remainder);
    }

    let mut quotient =
        vec![BigRational::zero(); remainder.len() - divisor_degree];

    for i in (0..quotient.len()).rev() {
        let factor = &remainder[i + divisor_degree] / leading;

        for (j, c) in divisor.iter().enumerate() {
            remainder[i + j] -= &factor * c;
        }

        quotient[i] = factor;
    }

    remainder.truncate(divisor_degree);
    trim(&mut quotient);
    trim(&mut remainder);

    (quotient, remainder)
}

fn gcd(a: Vec<BigRational>, b: Vec<BigRational>) -> Vec<BigRational> {
    let mut a = a;
    let mut b = b;
    trim(&mut a);
    trim(&mut b);

    while !b.is_empty() {
        let (_, remainder) = div_rem(&a, &b);
        a = b;
        b = remainder;
    }

    if let Some(leading) = a.last().cloned() {
        for c in &mut a {
            *c /= &leading;
        }
    }

    a
}
