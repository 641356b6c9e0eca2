//! Expiry Module
//!
//! Entry lifetime policy and the duration syntax accepted by the
//! `cache-expiry` header (`300ms`, `2s`, `1h30m`, `1.5h`, `-1ns`).

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

// == Expiry ==
/// Lifetime policy of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expiry {
    /// The entry is only removed by an explicit delete or overwrite.
    #[default]
    Never,
    /// The entry expires once the duration has elapsed since it was written.
    After(Duration),
}

impl Expiry {
    /// Computes the absolute deadline for an entry written at `written_at`.
    ///
    /// Returns `None` for [`Expiry::Never`] and for durations too large to be
    /// represented by the clock, which are treated as never expiring.
    pub fn deadline_from(&self, written_at: Instant) -> Option<Instant> {
        match self {
            Expiry::Never => None,
            Expiry::After(ttl) => written_at.checked_add(*ttl),
        }
    }
}

impl From<Duration> for Expiry {
    fn from(ttl: Duration) -> Self {
        Expiry::After(ttl)
    }
}

impl FromStr for Expiry {
    type Err = ParseDurationError;

    /// Parses a signed duration. Negative durations map to [`Expiry::Never`];
    /// a negative zero is still zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.strip_prefix('-') {
            Some(rest) => {
                let magnitude = parse_duration(rest)?;
                if magnitude.is_zero() {
                    Ok(Expiry::After(magnitude))
                } else {
                    Ok(Expiry::Never)
                }
            }
            None => parse_duration(s.strip_prefix('+').unwrap_or(s)).map(Expiry::After),
        }
    }
}

// == Parse Error ==
/// Reasons a duration string is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseDurationError {
    #[error("empty duration")]
    Empty,

    #[error("invalid duration {0:?}")]
    Invalid(String),

    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },

    #[error("duration {0:?} is out of range")]
    Overflow(String),
}

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;

// Fractional digits beyond this cannot change a nanosecond result.
const MAX_FRACTION_DIGITS: usize = 18;

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3_600 * NANOS_PER_SEC),
        _ => None,
    }
}

// == Parse Duration ==
/// Parses an unsigned duration made of `<decimal><unit>` groups.
///
/// The bare string `0` is accepted without a unit. Signs are handled by
/// [`Expiry::from_str`].
pub fn parse_duration(input: &str) -> Result<Duration, ParseDurationError> {
    if input.is_empty() {
        return Err(ParseDurationError::Empty);
    }
    if input == "0" {
        return Ok(Duration::ZERO);
    }

    let invalid = || ParseDurationError::Invalid(input.to_string());
    let overflow = || ParseDurationError::Overflow(input.to_string());

    let mut total: u128 = 0;
    let mut rest = input;

    while !rest.is_empty() {
        // Integer part
        let int_len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let (int_digits, after_int) = rest.split_at(int_len);

        // Optional fraction
        let (frac_digits, after_number) = match after_int.strip_prefix('.') {
            Some(frac) => {
                let frac_len = frac.find(|c: char| !c.is_ascii_digit()).unwrap_or(frac.len());
                frac.split_at(frac_len)
            }
            None => ("", after_int),
        };

        if int_digits.is_empty() && frac_digits.is_empty() {
            return Err(invalid());
        }

        // Unit
        let unit_len = after_number
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after_number.len());
        let (unit, remaining) = after_number.split_at(unit_len);
        if unit.is_empty() {
            return Err(ParseDurationError::MissingUnit(input.to_string()));
        }
        let scale = unit_nanos(unit).ok_or_else(|| ParseDurationError::UnknownUnit {
            unit: unit.to_string(),
            input: input.to_string(),
        })?;

        let whole: u128 = if int_digits.is_empty() {
            0
        } else {
            int_digits.parse().map_err(|_| overflow())?
        };
        let mut nanos = whole.checked_mul(scale).ok_or_else(overflow)?;

        let frac_digits = &frac_digits[..frac_digits.len().min(MAX_FRACTION_DIGITS)];
        if !frac_digits.is_empty() {
            let frac: u128 = frac_digits.parse().map_err(|_| invalid())?;
            let divisor = 10u128.pow(frac_digits.len() as u32);
            nanos = nanos
                .checked_add(frac * scale / divisor)
                .ok_or_else(overflow)?;
        }

        total = total.checked_add(nanos).ok_or_else(overflow)?;
        rest = remaining;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| overflow())?;
    Ok(Duration::new(secs, (total % NANOS_PER_SEC) as u32))
}
