use crate::{ops::EvaluationError, radical};
use num::{BigInt, BigRational, One, Signed, ToPrimitive, Zero};
use smol_str::SmolStr;
use std::{
    collections::{btree_map::Entry, BTreeMap, BTreeSet},
    fmt::{self, Display, Formatter},
    ops::{Add, Mul, Neg, Sub},
    str::FromStr,
};

/// The largest exponent numerator we are willing to raise something to.
pub(crate) const MAX_EXPONENT: u32 = 10_000;

/// The largest power a sum will be expanded to.
const MAX_EXPANSION: u32 = 64;

/// Raising a rational to an integer power is refused when the result would
/// need more bits than this.
const MAX_BITS: u64 = 1 << 22;

/// An exact value.
///
/// Values are kept in a canonical form: a sum of terms, where each term is a
/// non-zero rational coefficient multiplied by a [`Monomial`]. Because the
/// form is canonical, `x + x` and `2*x` are the same [`Expr`] and compare
/// equal.
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Expr {
    terms: BTreeMap<Monomial, BigRational>,
}

/// A product of [`Atom`]s, each raised to a non-zero rational power. The
/// empty product is `1`.
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Monomial {
    factors: BTreeMap<Atom, BigRational>,
}

/// The indivisible building blocks of a [`Monomial`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Atom {
    /// An integer under a radical. Its exponent is always strictly between 0
    /// and 1, anything larger gets folded into the coefficient.
    Surd(BigInt),
    Symbol(SmolStr),
    /// An expression which can't be distributed, like `(x + 1)^-1` or
    /// `(-8)^(1/3)`. A group is never raised to a positive integer power,
    /// those are expanded.
    Group(Box<Expr>),
    /// A power with a non-constant exponent.
    Power { base: Box<Expr>, exponent: Box<Expr> },
}

impl Expr {
    pub fn constant(value: BigRational) -> Expr {
        Expr::term(value, BTreeMap::new())
    }

    pub fn symbol<S: Into<SmolStr>>(name: S) -> Expr {
        Expr::from_atom(Atom::Symbol(name.into()), BigRational::one())
    }

    pub(crate) fn from_atom(atom: Atom, exponent: BigRational) -> Expr {
        let mut factors = BTreeMap::new();
        factors.insert(atom, exponent);
        Expr::term(BigRational::one(), factors)
    }

    /// Build a single term, pulling whole powers out of surds and expanding
    /// groups which end up with a positive integer exponent.
    pub(crate) fn term(
        coefficient: BigRational,
        factors: BTreeMap<Atom, BigRational>,
    ) -> Expr {
        if coefficient.is_zero() {
            return Expr::zero();
        }

        let mut coefficient = coefficient;
        let mut normalized = BTreeMap::new();
        let mut expansions = Vec::new();

        for (atom, exponent) in factors {
            if exponent.is_zero() {
                continue;
            }

            match atom {
                Atom::Surd(base) => {
                    let whole = exponent.floor();
                    let base_value = BigRational::from_integer(base.clone());
                    let scale =
                        radical::checked_powi(&base_value, whole.numer());

                    match scale {
                        Some(scale) => {
                            coefficient *= scale;
                            let fraction = exponent - whole;
                            if !fraction.is_zero() {
                                normalized.insert(Atom::Surd(base), fraction);
                            }
                        },
                        None => {
                            normalized.insert(Atom::Surd(base), exponent);
                        },
                    }
                },
                Atom::Group(inner)
                    if exponent.is_integer() && exponent.is_positive() =>
                {
                    match exponent.to_integer().to_u32() {
                        Some(n) if n <= MAX_EXPANSION => {
                            expansions.push(inner.powi(n))
                        },
                        _ => {
                            normalized.insert(Atom::Group(inner), exponent);
                        },
                    }
                },
                other => {
                    normalized.insert(other, exponent);
                },
            }
        }

        let mut expr = Expr::zero();
        expr.add_term(
            Monomial {
                factors: normalized,
            },
            coefficient,
        );

        expansions.into_iter().fold(expr, |acc, factor| acc * factor)
    }

    fn add_term(&mut self, monomial: Monomial, coefficient: BigRational) {
        match self.terms.entry(monomial) {
            Entry::Vacant(entry) => {
                if !coefficient.is_zero() {
                    entry.insert(coefficient);
                }
            },
            Entry::Occupied(mut entry) => {
                *entry.get_mut() += coefficient;
                if entry.get().is_zero() {
                    entry.remove();
                }
            },
        }
    }

    pub fn terms(&self) -> impl Iterator<Item = (&Monomial, &BigRational)> {
        self.terms.iter()
    }

    /// The value as a rational number, if it doesn't contain any symbols or
    /// radicals.
    pub fn as_constant(&self) -> Option<BigRational> {
        match self.single_term() {
            None if self.terms.is_empty() => Some(BigRational::zero()),
            Some((monomial, coefficient)) if monomial.is_one() => {
                Some(coefficient.clone())
            },
            _ => None,
        }
    }

    pub(crate) fn single_term(&self) -> Option<(&Monomial, &BigRational)> {
        if self.terms.len() == 1 {
            self.terms.iter().next()
        } else {
            None
        }
    }

    /// All the symbols this value refers to.
    pub fn symbols(&self) -> BTreeSet<SmolStr> {
        let mut symbols = BTreeSet::new();
        self.collect_symbols(&mut symbols);
        symbols
    }

    fn collect_symbols(&self, symbols: &mut BTreeSet<SmolStr>) {
        for monomial in self.terms.keys() {
            for atom in monomial.factors.keys() {
                match atom {
                    Atom::Surd(_) => {},
                    Atom::Symbol(name) => {
                        symbols.insert(name.clone());
                    },
                    Atom::Group(inner) => inner.collect_symbols(symbols),
                    Atom::Power { base, exponent } => {
                        base.collect_symbols(symbols);
                        exponent.collect_symbols(symbols);
                    },
                }
            }
        }
    }

    pub fn depends_on(&self, name: &str) -> bool {
        self.terms
            .keys()
            .flat_map(|monomial| monomial.factors.keys())
            .any(|atom| atom.depends_on(name))
    }

    /// True division. Fails when `divisor` is exactly zero.
    pub fn checked_div(&self, divisor: &Expr) -> Result<Expr, EvaluationError> {
        if divisor.is_zero() {
            return Err(EvaluationError::DivisionByZero);
        }

        if let Some(ratio) = self.constant_ratio(divisor) {
            return Ok(Expr::constant(ratio));
        }

        let inverse = divisor.pow_rational(&-BigRational::one())?;
        Ok(self.clone() * inverse)
    }

    /// If `self == k * other` for some rational `k`, find `k`.
    fn constant_ratio(&self, other: &Expr) -> Option<BigRational> {
        if self.terms.len() != other.terms.len() || self.is_zero() {
            return None;
        }

        let mut ratio: Option<BigRational> = None;

        for ((left, a), (right, b)) in self.terms.iter().zip(&other.terms) {
            if left != right {
                return None;
            }

            let candidate = a / b;
            match &ratio {
                Some(existing) if *existing != candidate => return None,
                Some(_) => {},
                None => ratio = Some(candidate),
            }
        }

        ratio
    }

    /// Raise this value to some power.
    pub fn pow(&self, exponent: &Expr) -> Result<Expr, EvaluationError> {
        match exponent.as_constant() {
            Some(exponent) => self.pow_rational(&exponent),
            None if self.is_one() => Ok(Expr::one()),
            None => Ok(Expr::from_atom(
                Atom::Power {
                    base: Box::new(self.clone()),
                    exponent: Box::new(exponent.clone()),
                },
                BigRational::one(),
            )),
        }
    }

    pub(crate) fn pow_rational(
        &self,
        exponent: &BigRational,
    ) -> Result<Expr, EvaluationError> {
        if exponent.is_zero() {
            return Ok(Expr::one());
        }
        if self.is_zero() {
            return if exponent.is_positive() {
                Ok(Expr::zero())
            } else {
                Err(EvaluationError::DivisionByZero)
            };
        }
        if exponent.numer().abs() > BigInt::from(MAX_EXPONENT) {
            return Err(too_large(exponent));
        }

        match self.single_term() {
            Some((monomial, coefficient)) => {
                monomial.pow(coefficient, exponent)
            },
            None if exponent.is_integer() && exponent.is_positive() => {
                let n = exponent
                    .to_integer()
                    .to_u32()
                    .filter(|n| *n <= MAX_EXPANSION)
                    .ok_or_else(|| too_large(exponent))?;
                Ok(self.powi(n))
            },
            None => Ok(self.grouped(exponent)),
        }
    }

    fn grouped(&self, exponent: &BigRational) -> Expr {
        Expr::from_atom(Atom::Group(Box::new(self.clone())), exponent.clone())
    }

    fn powi(&self, n: u32) -> Expr {
        let mut result = Expr::one();
        let mut base = self.clone();
        let mut n = n;

        while n > 0 {
            if n & 1 == 1 {
                result = result * base.clone();
            }
            n >>= 1;
            if n > 0 {
                base = base.clone() * base;
            }
        }

        result
    }

    /// A floating point approximation, if this value doesn't depend on any
    /// symbols and is real.
    pub fn approximate(&self) -> Option<f64> {
        let mut total = 0.0;

        for (monomial, coefficient) in &self.terms {
            let mut value = coefficient.to_f64()?;

            for (atom, exponent) in &monomial.factors {
                let base = match atom {
                    Atom::Surd(n) => n.to_f64()?,
                    Atom::Symbol(_) => return None,
                    Atom::Group(inner) => inner.approximate()?,
                    Atom::Power { base, exponent } => {
                        base.approximate()?.powf(exponent.approximate()?)
                    },
                };
                value *= base.powf(exponent.to_f64()?);
            }

            total += value;
        }

        if total.is_finite() {
            Some(total)
        } else {
            None
        }
    }

    /// Would this print without needing parentheses around it?
    fn is_simple(&self) -> bool {
        if let Some(value) = self.as_constant() {
            return value.is_integer() && !value.is_negative();
        }

        match self.single_term() {
            Some((monomial, coefficient)) => {
                coefficient.is_one()
                    && monomial.factors.len() == 1
                    && monomial.factors.iter().all(|(atom, exponent)| {
                        matches!(atom, Atom::Symbol(_)) && exponent.is_one()
                    })
            },
            None => false,
        }
    }

    /// Each term's sign and rendered magnitude, in display order.
    ///
    /// Terms sharing the same symbolic denominator are written over it
    /// together, so `x/(x + 1) + 2/(x + 1)` prints as `(x + 2)/(x + 1)`.
    fn display_terms(&self) -> Vec<(bool, String)> {
        let mut terms: Vec<_> = self.terms.iter().collect();
        terms.sort_by(|(left, _), (right, _)| right.degree().cmp(&left.degree()));

        let mut denominator_counts: BTreeMap<Monomial, usize> = BTreeMap::new();
        for (monomial, _) in &terms {
            let denominator = monomial.denominator();
            if !denominator.is_one() {
                *denominator_counts.entry(denominator).or_default() += 1;
            }
        }

        let mut rendered = Vec::new();
        let mut written = BTreeSet::new();

        for (monomial, coefficient) in &terms {
            let denominator = monomial.denominator();
            let shared = denominator_counts
                .get(&denominator)
                .map_or(false, |&count| count > 1);

            if !shared {
                let text = render_term(&coefficient.abs(), monomial);
                rendered.push((coefficient.is_negative(), text));
            } else if written.insert(denominator.clone()) {
                let numerator = Expr {
                    terms: terms
                        .iter()
                        .filter(|(m, _)| m.denominator() == denominator)
                        .map(|(m, c)| (m.numerator(), (*c).clone()))
                        .collect(),
                };
                let bottom = denominator.render_factors();
                rendered.push((
                    false,
                    format!("({})/{}", numerator, join_product(&bottom)),
                ));
            }
        }

        rendered
    }
}

impl Monomial {
    pub fn is_one(&self) -> bool { self.factors.is_empty() }

    pub fn factors(&self) -> impl Iterator<Item = (&Atom, &BigRational)> {
        self.factors.iter()
    }

    /// The sum of the exponents on symbols, used for ordering terms.
    fn degree(&self) -> BigRational {
        self.factors
            .iter()
            .filter(|(atom, _)| matches!(atom, Atom::Symbol(_)))
            .map(|(_, exponent)| exponent.clone())
            .fold(BigRational::zero(), |acc, exponent| acc + exponent)
    }

    /// The factors with a positive exponent.
    fn numerator(&self) -> Monomial {
        Monomial {
            factors: self
                .factors
                .iter()
                .filter(|(_, exponent)| exponent.is_positive())
                .map(|(atom, exponent)| (atom.clone(), exponent.clone()))
                .collect(),
        }
    }

    /// The factors with a negative exponent, flipped to be positive.
    fn denominator(&self) -> Monomial {
        Monomial {
            factors: self
                .factors
                .iter()
                .filter(|(_, exponent)| exponent.is_negative())
                .map(|(atom, exponent)| (atom.clone(), -exponent))
                .collect(),
        }
    }

    fn times(&self, other: &Monomial, coefficient: BigRational) -> Expr {
        let mut factors = self.factors.clone();

        for (atom, exponent) in &other.factors {
            *factors
                .entry(atom.clone())
                .or_insert_with(BigRational::zero) += exponent;
        }

        Expr::term(coefficient, factors)
    }

    /// Raise `coefficient * self` to a rational power.
    fn pow(
        &self,
        coefficient: &BigRational,
        exponent: &BigRational,
    ) -> Result<Expr, EvaluationError> {
        if exponent.is_integer() {
            let bits = coefficient.numer().bits() + coefficient.denom().bits();
            let n = exponent.to_integer();
            let too_big = n
                .abs()
                .to_u64()
                .map_or(true, |n| bits.saturating_mul(n) > MAX_BITS);
            if too_big {
                return Err(too_large(exponent));
            }

            let coefficient = radical::checked_powi(coefficient, &n)
                .ok_or_else(|| too_large(exponent))?;
            let factors: BTreeMap<Atom, BigRational> = self
                .factors
                .iter()
                .map(|(atom, e)| (atom.clone(), e * exponent))
                .collect();

            // a group which ends up with a positive integer exponent gets
            // expanded
            let limit = BigRational::from_integer(MAX_EXPANSION.into());
            let expands_too_far = factors.iter().any(|(atom, e)| {
                matches!(atom, Atom::Group(_)) && e.is_integer() && *e > limit
            });
            if expands_too_far {
                return Err(too_large(exponent));
            }

            return Ok(Expr::term(coefficient, factors));
        }

        if coefficient.is_negative() {
            let base = Expr::term(coefficient.clone(), self.factors.clone());
            return Ok(base.grouped(exponent));
        }

        // the numeric part can be split into prime powers exactly, whatever's
        // left has to stay symbolic
        let mut numeric: BTreeMap<Atom, BigRational> = BTreeMap::new();
        let mut symbolic = BTreeMap::new();

        for (factor, multiplicity) in radical::factorize(coefficient.numer()) {
            *numeric
                .entry(Atom::Surd(factor))
                .or_insert_with(BigRational::zero) +=
                exponent * BigRational::from_integer(multiplicity.into());
        }
        for (factor, multiplicity) in radical::factorize(coefficient.denom()) {
            *numeric
                .entry(Atom::Surd(factor))
                .or_insert_with(BigRational::zero) -=
                exponent * BigRational::from_integer(multiplicity.into());
        }

        for (atom, e) in &self.factors {
            match atom {
                Atom::Surd(_) => {
                    *numeric
                        .entry(atom.clone())
                        .or_insert_with(BigRational::zero) += e * exponent;
                },
                _ => {
                    symbolic.insert(atom.clone(), e.clone());
                },
            }
        }

        let numeric = Expr::term(BigRational::one(), numeric);

        let mut factors = symbolic.into_iter();
        let symbolic = match (factors.next(), factors.next()) {
            (None, _) => Expr::one(),
            (Some((atom, e)), None) if e.is_one() => {
                Expr::from_atom(atom, exponent.clone())
            },
            (first, second) => {
                let factors = first.into_iter().chain(second).chain(factors);
                Expr::term(BigRational::one(), factors.collect())
                    .grouped(exponent)
            },
        };

        Ok(numeric * symbolic)
    }

    /// Render each factor, merging surds which share an exponent so
    /// `sqrt(2)*sqrt(3)` comes out as `sqrt(6)`.
    fn render_factors(&self) -> Vec<String> {
        let mut surds: BTreeMap<&BigRational, BigInt> = BTreeMap::new();
        let mut others = Vec::new();

        for (atom, exponent) in &self.factors {
            match atom {
                Atom::Surd(base) => {
                    *surds.entry(exponent).or_insert_with(BigInt::one) *= base;
                },
                other => others.push(other.render(exponent)),
            }
        }

        surds
            .into_iter()
            .map(|(exponent, base)| render_power(base.to_string(), true, exponent))
            .chain(others)
            .collect()
    }
}

impl Atom {
    pub(crate) fn depends_on(&self, name: &str) -> bool {
        match self {
            Atom::Surd(_) => false,
            Atom::Symbol(symbol) => symbol == name,
            Atom::Group(inner) => inner.depends_on(name),
            Atom::Power { base, exponent } => {
                base.depends_on(name) || exponent.depends_on(name)
            },
        }
    }

    fn render(&self, exponent: &BigRational) -> String {
        match self {
            Atom::Surd(base) => render_power(base.to_string(), true, exponent),
            Atom::Symbol(name) => render_power(name.to_string(), true, exponent),
            Atom::Group(inner) => {
                render_power(inner.to_string(), false, exponent)
            },
            Atom::Power { base, exponent: power } => {
                let text = format!("{}^{}", wrap(base), wrap(power));
                if exponent.is_one() {
                    text
                } else {
                    render_power(text, false, exponent)
                }
            },
        }
    }
}

fn too_large(exponent: &BigRational) -> EvaluationError {
    EvaluationError::ExponentTooLarge {
        exponent: exponent.clone(),
    }
}

fn wrap(expr: &Expr) -> String {
    if expr.is_simple() {
        expr.to_string()
    } else {
        format!("({})", expr)
    }
}

fn render_power(base: String, simple: bool, exponent: &BigRational) -> String {
    let half = BigRational::new(BigInt::one(), BigInt::from(2));

    if exponent.is_one() {
        if simple {
            base
        } else {
            format!("({})", base)
        }
    } else if *exponent == half {
        format!("sqrt({})", base)
    } else {
        let base = if simple { base } else { format!("({})", base) };

        if exponent.is_integer() {
            format!("{}^{}", base, exponent)
        } else {
            format!("{}^({})", base, exponent)
        }
    }
}

fn join_product(pieces: &[String]) -> String {
    if pieces.len() == 1 {
        pieces[0].clone()
    } else {
        format!("({})", pieces.join("*"))
    }
}

fn render_term(magnitude: &BigRational, monomial: &Monomial) -> String {
    let top_factors = monomial.numerator().render_factors();
    let bottom_factors = monomial.denominator().render_factors();

    let mut top = Vec::new();
    if !magnitude.numer().is_one() || top_factors.is_empty() {
        top.push(magnitude.numer().to_string());
    }
    top.extend(top_factors);

    let mut bottom = Vec::new();
    if !magnitude.denom().is_one() {
        bottom.push(magnitude.denom().to_string());
    }
    bottom.extend(bottom_factors);

    let mut text = top.join("*");
    if !bottom.is_empty() {
        text.push('/');
        text.push_str(&join_product(&bottom));
    }

    text
}

impl Zero for Expr {
    fn zero() -> Expr { Expr::default() }

    fn is_zero(&self) -> bool { self.terms.is_empty() }
}

impl One for Expr {
    fn one() -> Expr { Expr::constant(BigRational::one()) }
}

impl From<BigRational> for Expr {
    fn from(value: BigRational) -> Expr { Expr::constant(value) }
}

impl From<BigInt> for Expr {
    fn from(value: BigInt) -> Expr {
        Expr::constant(BigRational::from_integer(value))
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Expr { Expr::from(BigInt::from(value)) }
}

impl FromStr for Expr {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> { crate::calculate(s) }
}

// operator overloads, for building values in code

impl Add for Expr {
    type Output = Expr;

    fn add(mut self, rhs: Expr) -> Expr {
        for (monomial, coefficient) in rhs.terms {
            self.add_term(monomial, coefficient);
        }

        self
    }
}

impl Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr { self + -rhs }
}

impl Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        let mut product = Expr::zero();

        for (left, a) in &self.terms {
            for (right, b) in &rhs.terms {
                product = product + left.times(right, a * b);
            }
        }

        product
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(mut self) -> Expr {
        for coefficient in self.terms.values_mut() {
            *coefficient = -coefficient.clone();
        }

        self
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }

        for (i, (negative, text)) in self.display_terms().into_iter().enumerate()
        {
            match (i, negative) {
                (0, true) => write!(f, "-{}", text)?,
                (0, false) => write!(f, "{}", text)?,
                (_, true) => write!(f, " - {}", text)?,
                (_, false) => write!(f, " + {}", text)?,
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expr { Expr::symbol("x") }

    fn rational(numer: i64, denom: i64) -> BigRational {
        BigRational::new(BigInt::from(numer), BigInt::from(denom))
    }

    #[test]
    fn like_terms_are_combined() {
        let got = x() + x();

        assert_eq!(got, Expr::from(2) * x());
        assert_eq!(got.to_string(), "2*x");
    }

    #[test]
    fn cancelling_terms_leave_zero() {
        let got = x() - x();

        assert!(got.is_zero());
        assert_eq!(got.to_string(), "0");
    }

    #[test]
    fn products_are_distributed() {
        let x_plus_one = x() + Expr::one();

        let got = x_plus_one.clone() * x_plus_one;

        assert_eq!(got.to_string(), "x^2 + 2*x + 1");
    }

    #[test]
    fn square_roots_stay_exact() {
        let two = Expr::from(2);

        let root = two.pow_rational(&rational(1, 2)).unwrap();

        assert_eq!(root.to_string(), "sqrt(2)");
        assert_eq!(root.clone() * root, two);
    }

    #[test]
    fn whole_powers_are_pulled_out_of_radicals() {
        let inputs = vec![
            (8, rational(1, 3), "2"),
            (12, rational(1, 2), "2*sqrt(3)"),
            (4, rational(-1, 2), "1/2"),
            (2, rational(-1, 2), "sqrt(2)/2"),
            (2, rational(1, 3), "2^(1/3)"),
            (4, rational(3, 2), "8"),
        ];

        for (base, exponent, should_be) in inputs {
            let got = Expr::from(base).pow_rational(&exponent).unwrap();
            assert_eq!(got.to_string(), should_be, "{}^({})", base, exponent);
        }
    }

    #[test]
    fn surds_with_the_same_exponent_print_together() {
        let half = rational(1, 2);
        let root_2 = Expr::from(2).pow_rational(&half).unwrap();
        let root_3 = Expr::from(3).pow_rational(&half).unwrap();

        assert_eq!((root_2 * root_3).to_string(), "sqrt(6)");
    }

    #[test]
    fn negative_bases_under_a_root_stay_symbolic() {
        let got = Expr::from(-8).pow_rational(&rational(1, 3)).unwrap();

        assert_eq!(got.to_string(), "(-8)^(1/3)");
        assert_eq!(got.approximate(), None);
    }

    #[test]
    fn dividing_by_zero_is_an_error() {
        let got = Expr::one().checked_div(&Expr::zero());

        assert_eq!(got, Err(EvaluationError::DivisionByZero));
    }

    #[test]
    fn dividing_by_a_multiple_of_yourself_gives_a_constant() {
        let numerator = Expr::from(2) * x() + Expr::from(2);
        let denominator = x() + Expr::one();

        let got = numerator.checked_div(&denominator).unwrap();

        assert_eq!(got, Expr::from(2));
    }

    #[test]
    fn dividing_by_a_sum_keeps_it_as_a_denominator() {
        let got = (x() + Expr::from(2))
            .checked_div(&(x() + Expr::one()))
            .unwrap();

        assert_eq!(got.to_string(), "(x + 2)/(x + 1)");
    }

    #[test]
    fn symbolic_exponents_are_kept() {
        let got = Expr::from(2).pow(&x()).unwrap();

        assert_eq!(got.to_string(), "2^x");
        assert!(got.depends_on("x"));
    }

    #[test]
    fn huge_exponents_are_rejected() {
        let got = Expr::from(2).pow(&Expr::from(1_000_000));

        assert!(matches!(got, Err(EvaluationError::ExponentTooLarge { .. })));
    }

    #[test]
    fn products_of_large_group_powers_are_not_expanded() {
        let half_power = (x() + Expr::one())
            .pow_rational(&rational(65, 2))
            .unwrap();

        let got = half_power.clone() * half_power;

        assert_eq!(got.terms().count(), 1);
        assert!(got.depends_on("x"));
    }

    #[test]
    fn approximate_constant_values() {
        let root_2 = Expr::from(2).pow_rational(&rational(1, 2)).unwrap();

        let got = (root_2 + Expr::one()).approximate().unwrap();

        approx::assert_relative_eq!(got, 2_f64.sqrt() + 1.0);
        assert_eq!(x().approximate(), None);
    }
}
