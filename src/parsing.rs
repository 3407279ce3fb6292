use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

const NANOS_PER_UNIT: i128 = 1_000_000_000;

/// One binary megabyte, the unit memory is reported in.
pub const MEBIBYTE: i128 = 1024 * 1024;

// Order matters: binary suffixes are two characters and must win over the
// single-character decimal ones.
const BINARY_UNITS: &[(&str, i128)] = &[
    ("Ki", 1 << 10),
    ("Mi", 1 << 20),
    ("Gi", 1 << 30),
    ("Ti", 1 << 40),
    ("Pi", 1 << 50),
    ("Ei", 1 << 60),
];
const DECIMAL_UNITS: &[(&str, i32)] = &[
    ("n", -9),
    ("u", -6),
    ("m", -3),
    ("", 0),
    ("k", 3),
    ("M", 6),
    ("G", 9),
    ("T", 12),
    ("P", 15),
    ("E", 18),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid quantity {input:?}: {reason}")]
pub struct ParseQuantityError {
    pub input: String,
    pub reason: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid duration {input:?}: {reason}")]
pub struct ParseDurationError {
    pub input: String,
    pub reason: &'static str,
}

/// Exact resource quantity, stored as a signed count of nano-units.
///
/// Anything finer than one nano-unit is rounded away from zero while parsing,
/// so `128Mi`, `134217728` and `0.125Gi` all compare equal and add up without
/// drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity {
    nanos: i128,
}

impl Quantity {
    pub const ZERO: Quantity = Quantity { nanos: 0 };

    pub fn from_units(units: i64) -> Self {
        Self { nanos: units as i128 * NANOS_PER_UNIT }
    }

    pub fn is_zero(&self) -> bool {
        self.nanos == 0
    }

    /// Integer value, rounded up.
    pub fn value(&self) -> i64 {
        self.scaled_ceil(1)
    }

    /// Value expressed in multiples of `unit`, rounded up. Saturates at the
    /// bounds of `i64`.
    pub fn scaled_ceil(&self, unit: i128) -> i64 {
        let divisor = unit * NANOS_PER_UNIT;
        let floor = self.nanos.div_euclid(divisor);
        let ceil = if self.nanos.rem_euclid(divisor) == 0 { floor } else { floor + 1 };
        i64::try_from(ceil).unwrap_or(if ceil > 0 { i64::MAX } else { i64::MIN })
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Quantity) -> Quantity {
        Quantity { nanos: self.nanos.saturating_add(rhs.nanos) }
    }
}

impl AddAssign for Quantity {
    fn add_assign(&mut self, rhs: Quantity) {
        *self = *self + rhs;
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Quantity {
        iter.fold(Quantity::ZERO, Add::add)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nanos % NANOS_PER_UNIT == 0 {
            write!(f, "{}", self.nanos / NANOS_PER_UNIT)
        } else {
            write!(f, "{}n", self.nanos)
        }
    }
}

impl FromStr for Quantity {
    type Err = ParseQuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| ParseQuantityError { input: s.to_string(), reason };
        let q = s.trim();
        if q.is_empty() {
            return Err(err("empty"));
        }

        let (negative, rest) = if let Some(r) = q.strip_prefix('-') {
            (true, r)
        } else {
            (false, q.strip_prefix('+').unwrap_or(q))
        };

        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, suffix) = rest.split_at(number_len);
        let (whole, frac) = number.split_once('.').unwrap_or((number, ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(err("missing number"));
        }
        if frac.contains('.') {
            return Err(err("malformed number"));
        }

        let mantissa: i128 = format!("{whole}{frac}")
            .parse()
            .map_err(|_| err("number out of range"))?;
        let (multiplier, exponent) = suffix_scale(suffix).ok_or_else(|| err("unknown suffix"))?;

        let base = mantissa
            .checked_mul(multiplier)
            .ok_or_else(|| err("number out of range"))?;
        let exp10 = exponent
            .checked_add(9)
            .and_then(|e| e.checked_sub(i32::try_from(frac.len()).ok()?))
            .ok_or_else(|| err("number out of range"))?;
        let nanos = if exp10 >= 0 {
            10i128
                .checked_pow(exp10 as u32)
                .and_then(|p| base.checked_mul(p))
                .ok_or_else(|| err("number out of range"))?
        } else {
            match 10i128.checked_pow(exp10.unsigned_abs()) {
                Some(divisor) => base / divisor + i128::from(base % divisor != 0),
                None => i128::from(base != 0),
            }
        };

        Ok(Quantity { nanos: if negative { -nanos } else { nanos } })
    }
}

/// Splits a quantity suffix into a binary multiplier and a power of ten.
fn suffix_scale(suffix: &str) -> Option<(i128, i32)> {
    for (suf, mul) in BINARY_UNITS {
        if suffix == *suf {
            return Some((*mul, 0));
        }
    }
    for (suf, exp) in DECIMAL_UNITS {
        if suffix == *suf {
            return Some((1, *exp));
        }
    }
    // decimal exponent form, e.g. 1e3 or 5E-2
    let exponent = suffix.strip_prefix(['e', 'E'])?;
    if exponent.is_empty() {
        return None;
    }
    exponent.parse::<i32>().ok().map(|e| (1, e))
}

/// Parses a duration such as `2s`, `500ms` or `1m30s`.
pub fn parse_duration(input: &str) -> Result<Duration, ParseDurationError> {
    let err = |reason| ParseDurationError { input: input.to_string(), reason };
    let s = input.trim();
    if s.is_empty() {
        return Err(err("empty"));
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total: u128 = 0;
    let mut rest = s;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return Err(err("expected a number"));
        }
        let (number, tail) = rest.split_at(number_len);
        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_len);

        let unit_nanos: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60 * 1_000_000_000,
            "h" => 3_600 * 1_000_000_000,
            "" => return Err(err("missing unit")),
            _ => return Err(err("unknown unit")),
        };

        let (whole, frac) = number.split_once('.').unwrap_or((number, ""));
        if (whole.is_empty() && frac.is_empty()) || frac.contains('.') {
            return Err(err("malformed number"));
        }
        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| err("number out of range"))?
        };
        let mut nanos = whole
            .checked_mul(unit_nanos)
            .ok_or_else(|| err("number out of range"))?;
        if !frac.is_empty() {
            let digits = frac.len().min(18);
            let frac: u128 = frac[..digits].parse().map_err(|_| err("malformed number"))?;
            nanos = nanos
                .checked_add(frac * unit_nanos / 10u128.pow(digits as u32))
                .ok_or_else(|| err("number out of range"))?;
        }

        total = total
            .checked_add(nanos)
            .ok_or_else(|| err("number out of range"))?;
        rest = next;
    }

    u64::try_from(total)
        .map(Duration::from_nanos)
        .map_err(|_| err("number out of range"))
}
