//! Declarative threshold conditions for tests.
//!
//! A [`Condition`] is a conjunction of optional fields (`eq`, `gt`, `lt`,
//! membership, ...). Every set field must hold for the condition to pass;
//! evaluation never short-circuits, so failure descriptions can name the
//! full set of violated fields.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One kind of tolerance for approximate equality.
///
/// The two kinds are mutually exclusive by construction; there is no
/// precedence rule to get wrong.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tolerance {
    /// `|actual - expected| <= bound`
    Absolute(f64),
    /// `|actual - expected| <= bound * |expected|`
    Relative(f64),
}

/// An expected value wrapped with a tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Approx {
    /// The expected value.
    pub value: f64,
    /// The tolerance under which equality holds.
    pub tolerance: Tolerance,
}

impl Approx {
    /// Creates an approximation with an absolute tolerance.
    pub fn absolute(value: f64, tolerance: f64) -> Self {
        Self {
            value,
            tolerance: Tolerance::Absolute(tolerance),
        }
    }

    /// Creates an approximation with a relative tolerance.
    pub fn relative(value: f64, tolerance: f64) -> Self {
        Self {
            value,
            tolerance: Tolerance::Relative(tolerance),
        }
    }

    /// The absolute bound this approximation allows around its value.
    pub fn bound(&self) -> f64 {
        match self.tolerance {
            Tolerance::Absolute(a) => a,
            Tolerance::Relative(r) => r * self.value.abs(),
        }
    }

    /// Returns true when `actual` is within tolerance of the expected value.
    pub fn matches(&self, actual: f64) -> bool {
        (actual - self.value).abs() <= self.bound()
    }
}

impl fmt::Display for Approx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tolerance {
            Tolerance::Absolute(a) => write!(f, "{} ± {}", self.value, a),
            Tolerance::Relative(r) => write!(f, "{} ± {}%", self.value, r * 100.0),
        }
    }
}

/// An expected value for equality fields: exact or approximate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expected {
    /// Exact equality.
    Exact(f64),
    /// Equality within a tolerance.
    Approx(Approx),
}

impl Expected {
    /// Returns true when `actual` matches this expectation.
    pub fn matches(&self, actual: f64) -> bool {
        match self {
            Expected::Exact(expected) => actual == *expected,
            Expected::Approx(approx) => approx.matches(actual),
        }
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Exact(v) => write!(f, "{v}"),
            Expected::Approx(a) => write!(f, "{a}"),
        }
    }
}

impl From<f64> for Expected {
    fn from(value: f64) -> Self {
        Expected::Exact(value)
    }
}

impl From<Approx> for Expected {
    fn from(value: Approx) -> Self {
        Expected::Approx(value)
    }
}

/// A scalar value under test: numeric, categorical, or boolean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TestValue {
    /// A numeric value.
    Number(f64),
    /// A boolean value.
    Bool(bool),
    /// A categorical (string) value.
    Text(String),
}

impl TestValue {
    /// Numeric view of the value. Booleans count as 0/1; text has none.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TestValue::Number(v) => Some(*v),
            TestValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            TestValue::Text(_) => None,
        }
    }
}

impl fmt::Display for TestValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestValue::Number(v) => write!(f, "{v}"),
            TestValue::Bool(b) => write!(f, "{b}"),
            TestValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for TestValue {
    fn from(value: f64) -> Self {
        TestValue::Number(value)
    }
}

impl From<usize> for TestValue {
    fn from(value: usize) -> Self {
        TestValue::Number(value as f64)
    }
}

impl From<&str> for TestValue {
    fn from(value: &str) -> Self {
        TestValue::Text(value.to_string())
    }
}

impl From<String> for TestValue {
    fn from(value: String) -> Self {
        TestValue::Text(value)
    }
}

impl From<bool> for TestValue {
    fn from(value: bool) -> Self {
        TestValue::Bool(value)
    }
}

/// A conjunctive threshold expression.
///
/// Every field is optional; an empty condition means no explicit threshold
/// was configured. Serialization emits exactly the fields that are set, so
/// the JSON export mirrors the configured checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Value must equal this (exactly or within tolerance).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eq: Option<Expected>,
    /// Value must not equal this.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_eq: Option<Expected>,
    /// Value must be strictly greater.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt: Option<f64>,
    /// Value must be greater or equal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<f64>,
    /// Value must be strictly less.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lt: Option<f64>,
    /// Value must be less or equal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<f64>,
    /// Value must be one of these.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_in: Option<Vec<TestValue>>,
    /// Value must not be one of these.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_in: Option<Vec<TestValue>>,
}

impl Condition {
    /// Creates an empty condition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the equality field.
    #[must_use]
    pub fn eq(mut self, expected: impl Into<Expected>) -> Self {
        self.eq = Some(expected.into());
        self
    }

    /// Sets the inequality field.
    #[must_use]
    pub fn not_eq(mut self, expected: impl Into<Expected>) -> Self {
        self.not_eq = Some(expected.into());
        self
    }

    /// Sets the strictly-greater bound.
    #[must_use]
    pub fn gt(mut self, bound: f64) -> Self {
        self.gt = Some(bound);
        self
    }

    /// Sets the greater-or-equal bound.
    #[must_use]
    pub fn gte(mut self, bound: f64) -> Self {
        self.gte = Some(bound);
        self
    }

    /// Sets the strictly-less bound.
    #[must_use]
    pub fn lt(mut self, bound: f64) -> Self {
        self.lt = Some(bound);
        self
    }

    /// Sets the less-or-equal bound.
    #[must_use]
    pub fn lte(mut self, bound: f64) -> Self {
        self.lte = Some(bound);
        self
    }

    /// Sets the membership list.
    #[must_use]
    pub fn is_in<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<TestValue>,
    {
        self.is_in = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the non-membership list.
    #[must_use]
    pub fn not_in<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<TestValue>,
    {
        self.not_in = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Returns true when any field is set.
    pub fn is_set(&self) -> bool {
        self.eq.is_some()
            || self.not_eq.is_some()
            || self.gt.is_some()
            || self.gte.is_some()
            || self.lt.is_some()
            || self.lte.is_some()
            || self.is_in.is_some()
            || self.not_in.is_some()
    }

    /// Evaluates the value against every set field and returns the names of
    /// the fields that failed. All fields are ANDed; an empty return means
    /// the condition passed.
    ///
    /// Numeric fields applied to a non-numeric value count as violations.
    pub fn check(&self, value: &TestValue) -> Vec<&'static str> {
        let mut violated = Vec::new();
        let numeric = value.as_f64();

        let mut check_numeric = |name: &'static str, ok: Option<bool>| {
            if !ok.unwrap_or(false) {
                violated.push(name);
            }
        };

        if let Some(expected) = &self.eq {
            check_numeric("eq", numeric.map(|v| expected.matches(v)));
        }
        if let Some(expected) = &self.not_eq {
            check_numeric("not_eq", numeric.map(|v| !expected.matches(v)));
        }
        if let Some(bound) = self.gt {
            check_numeric("gt", numeric.map(|v| v > bound));
        }
        if let Some(bound) = self.gte {
            check_numeric("gte", numeric.map(|v| v >= bound));
        }
        if let Some(bound) = self.lt {
            check_numeric("lt", numeric.map(|v| v < bound));
        }
        if let Some(bound) = self.lte {
            check_numeric("lte", numeric.map(|v| v <= bound));
        }
        if let Some(values) = &self.is_in {
            if !values.contains(value) {
                violated.push("is_in");
            }
        }
        if let Some(values) = &self.not_in {
            if values.contains(value) {
                violated.push("not_in");
            }
        }
        violated
    }

    /// Returns true when the value satisfies every set field.
    pub fn is_satisfied(&self, value: &TestValue) -> bool {
        self.check(value).is_empty()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if let Some(v) = &self.eq {
            parts.push(format!("eq={v}"));
        }
        if let Some(v) = &self.not_eq {
            parts.push(format!("not_eq={v}"));
        }
        if let Some(v) = self.gt {
            parts.push(format!("gt={v}"));
        }
        if let Some(v) = self.gte {
            parts.push(format!("gte={v}"));
        }
        if let Some(v) = self.lt {
            parts.push(format!("lt={v}"));
        }
        if let Some(v) = self.lte {
            parts.push(format!("lte={v}"));
        }
        if let Some(values) = &self.is_in {
            let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
            parts.push(format!("is_in=[{}]", rendered.join(", ")));
        }
        if let Some(values) = &self.not_in {
            let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
            parts.push(format!("not_in=[{}]", rendered.join(", ")));
        }
        if parts.is_empty() {
            write!(f, "no condition")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}
