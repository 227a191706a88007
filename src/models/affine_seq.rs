//! Affine (arithmetic) sequences of start slots.
//!
//! An `AffineSeq` is the ordered set `{start, start + step, ...}` restricted
//! to the half-open range `[start, stop)`. Courses receive their start slots
//! as one such sequence, and the allocators combine them with the algebra
//! below (shifting, termwise addition, intersection).
//!
//! Sequences can also be written in the compact `Xn+Y` notation known from
//! CSS `nth-child`, where `X` is the step and `Y` the first term.
//!
//! # Reference
//! Graham, Knuth, Patashnik (1994), "Concrete Mathematics", Ch. 4.8 (CRT)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, BitAnd, Shl, Shr};

use crate::error::{Result, ScheduleError};

use super::Slot;

/// Greatest common divisor (non-negative).
pub fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// Least common multiple; zero if either argument is zero.
pub fn lcm(a: i64, b: i64) -> i64 {
    if a == 0 || b == 0 {
        return 0;
    }
    (a / gcd(a, b) * b).abs()
}

/// An arithmetic progression of slot indices.
///
/// Immutable: every operation returns a new sequence.
/// Invariant: `step >= 1`. The sequence is empty iff `start >= stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "AffineSeqParts")]
pub struct AffineSeq {
    start: Slot,
    stop: Slot,
    step: Slot,
}

#[derive(Deserialize)]
struct AffineSeqParts {
    start: Slot,
    stop: Slot,
    step: Slot,
}

impl TryFrom<AffineSeqParts> for AffineSeq {
    type Error = ScheduleError;

    fn try_from(parts: AffineSeqParts) -> Result<Self> {
        Self::new(parts.start, parts.stop, parts.step)
    }
}

impl AffineSeq {
    /// Creates a sequence, rejecting non-positive steps.
    pub fn new(start: Slot, stop: Slot, step: Slot) -> Result<Self> {
        if step < 1 {
            return Err(ScheduleError::InvalidStep(step));
        }
        Ok(Self { start, stop, step })
    }

    /// Creates a unit-step sequence over `[start, stop)`.
    pub fn range(start: Slot, stop: Slot) -> Self {
        Self {
            start,
            stop,
            step: 1,
        }
    }

    /// Parses the `Xn+Y` notation, bounded above by `stop`.
    ///
    /// `X` defaults to 1 and `Y` to 0, so `"n"`, `"3n"`, `"n+2"` and
    /// `"3n+2"` are all accepted.
    pub fn parse(pattern: &str, stop: Slot) -> Result<Self> {
        let invalid = || ScheduleError::InvalidPattern(pattern.to_string());
        let trimmed = pattern.trim();

        let (step_part, rest) = trimmed.split_once('n').ok_or_else(invalid)?;
        let step = if step_part.is_empty() {
            1
        } else if step_part.bytes().all(|b| b.is_ascii_digit()) {
            step_part.parse::<Slot>().map_err(|_| invalid())?
        } else {
            return Err(invalid());
        };

        let start = if rest.is_empty() {
            0
        } else {
            let offset = rest.strip_prefix('+').ok_or_else(invalid)?;
            if offset.is_empty() || !offset.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            offset.parse::<Slot>().map_err(|_| invalid())?
        };

        Self::new(start, stop, step)
    }

    /// First term (inclusive lower bound).
    #[inline]
    pub fn start(&self) -> Slot {
        self.start
    }

    /// Exclusive upper bound.
    #[inline]
    pub fn stop(&self) -> Slot {
        self.stop
    }

    /// Distance between consecutive terms.
    #[inline]
    pub fn step(&self) -> Slot {
        self.step
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        if self.start >= self.stop {
            0
        } else {
            ((self.stop - self.start + self.step - 1) / self.step) as usize
        }
    }

    /// Whether the sequence has no terms.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.stop
    }

    /// The `k`-th term, `start + k * step`. Not bounds-checked against `stop`.
    #[inline]
    pub fn index(&self, k: usize) -> Slot {
        self.start + self.step * k as Slot
    }

    /// Last term, if any.
    pub fn last(&self) -> Option<Slot> {
        match self.len() {
            0 => None,
            n => Some(self.index(n - 1)),
        }
    }

    /// Whether `slot` is one of the terms.
    pub fn contains(&self, slot: Slot) -> bool {
        self.start <= slot && slot < self.stop && (slot - self.start) % self.step == 0
    }

    /// Iterates the terms in ascending order (reversible).
    pub fn iter(&self) -> Iter {
        Iter {
            front: self.start,
            remaining: self.len(),
            step: self.step,
        }
    }

    /// Equivalent `std` range with step.
    pub fn to_range(&self) -> std::iter::StepBy<std::ops::Range<Slot>> {
        (self.start..self.stop).step_by(self.step as usize)
    }

    /// Termwise sum of `(start, stop, step)`.
    ///
    /// Used to compose nested offset spaces, e.g. a course sequence added to
    /// a per-category offset pattern.
    pub fn add(&self, other: &Self) -> Self {
        Self {
            start: self.start + other.start,
            stop: self.stop + other.stop,
            step: self.step + other.step,
        }
    }

    /// Moves the sequence `n` steps towards lower slots.
    pub fn shift_left(&self, n: i64) -> Self {
        Self {
            start: self.start - n * self.step,
            stop: self.stop - n * self.step,
            step: self.step,
        }
    }

    /// Moves the sequence `n` steps towards higher slots.
    pub fn shift_right(&self, n: i64) -> Self {
        Self {
            start: self.start + n * self.step,
            stop: self.stop + n * self.step,
            step: self.step,
        }
    }

    /// Sequence of the terms common to `self` and `other`.
    ///
    /// The result steps by `lcm(step1, step2)`. If the starts disagree
    /// modulo `gcd(step1, step2)` the progressions never meet and the result
    /// is empty.
    pub fn intersect(&self, other: &Self) -> Self {
        let mut start = self.start.max(other.start);
        let mut stop = self.stop.min(other.stop);
        let step = lcm(self.step, other.step);

        if (self.start - other.start).rem_euclid(gcd(self.step, other.step)) != 0 {
            stop = start;
        } else {
            match self.iter().find(|slot| other.contains(*slot)) {
                Some(first) => start = first,
                None => stop = start,
            }
        }

        Self { start, stop, step }
    }

    /// Renders the `Xn+Y` notation for this sequence (ignoring `stop`).
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        if self.step != 1 {
            out.push_str(&self.step.to_string());
        }
        out.push('n');
        if self.start != 0 {
            out.push('+');
            out.push_str(&self.start.to_string());
        }
        out
    }
}

impl fmt::Display for AffineSeq {
    /// Short preview: first two terms, an ellipsis and the last term.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.len();
        f.write_str("(")?;
        if len > 0 {
            write!(f, "{}", self.start)?;
        }
        if len > 1 {
            write!(f, ", {}", self.start + self.step)?;
        }
        if len > 3 {
            f.write_str(", …")?;
        }
        if len > 2 {
            write!(f, ", {}", self.index(len - 1))?;
        }
        f.write_str(")")
    }
}

impl Add for AffineSeq {
    type Output = AffineSeq;

    fn add(self, rhs: Self) -> Self::Output {
        AffineSeq::add(&self, &rhs)
    }
}

impl Shl<i64> for AffineSeq {
    type Output = AffineSeq;

    fn shl(self, steps: i64) -> Self::Output {
        self.shift_left(steps)
    }
}

impl Shr<i64> for AffineSeq {
    type Output = AffineSeq;

    fn shr(self, steps: i64) -> Self::Output {
        self.shift_right(steps)
    }
}

impl BitAnd for AffineSeq {
    type Output = AffineSeq;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.intersect(&rhs)
    }
}

impl<'a> IntoIterator for &'a AffineSeq {
    type Item = Slot;
    type IntoIter = Iter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for AffineSeq {
    type Item = Slot;
    type IntoIter = Iter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the terms of an [`AffineSeq`].
#[derive(Debug, Clone)]
pub struct Iter {
    front: Slot,
    remaining: usize,
    step: Slot,
}

impl Iterator for Iter {
    type Item = Slot;

    fn next(&mut self) -> Option<Slot> {
        if self.remaining == 0 {
            return None;
        }
        let slot = self.front;
        self.front += self.step;
        self.remaining -= 1;
        Some(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl DoubleEndedIterator for Iter {
    fn next_back(&mut self) -> Option<Slot> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.front + self.step * self.remaining as Slot)
    }
}

impl ExactSizeIterator for Iter {}

impl std::iter::FusedIterator for Iter {}
