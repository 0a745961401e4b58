//! Morphological accumulators: the running state is a min or max.
//!
//! The symmetric/antisymmetric entry points forward to two plain
//! accumulations; min/max folding gains nothing from multiplication pairing,
//! and structuring elements are rarely classified as anything but general.

use filtra_array::Element;
use num_traits::{Bounded, Zero};

use crate::filter::Accumulator;

/// Flat gray erosion: the minimum sample under the nonzero taps.
#[derive(Debug, Clone)]
pub struct ErodeGrayFlat<T: Element> {
    state: T::Acc,
}

impl<T: Element> Default for ErodeGrayFlat<T> {
    fn default() -> Self {
        Self {
            state: T::Acc::max_value(),
        }
    }
}

impl<T: Element> Accumulator<T> for ErodeGrayFlat<T> {
    fn reset(&mut self) {
        self.state = T::Acc::max_value();
    }

    fn accumulate(&mut self, tap: T, sample: T) {
        if tap.to_acc() != T::Acc::zero() {
            let s = sample.to_acc();
            if s < self.state {
                self.state = s;
            }
        }
    }

    fn accumulate_zero(&mut self, _sample: T) {}

    fn accumulate_sym(&mut self, tap: T, left: T, right: T) {
        self.accumulate(tap, left);
        self.accumulate(tap, right);
    }

    fn accumulate_asym(&mut self, tap: T, left: T, right: T) {
        self.accumulate_sym(tap, left, right);
    }

    fn set_norm(&mut self, _norm: T) {}

    fn result(&self) -> T {
        T::from_acc(self.state)
    }
}

/// Flat gray dilation: the maximum sample under the nonzero taps.
#[derive(Debug, Clone)]
pub struct DilateGrayFlat<T: Element> {
    state: T::Acc,
}

impl<T: Element> Default for DilateGrayFlat<T> {
    fn default() -> Self {
        Self {
            state: T::Acc::min_value(),
        }
    }
}

impl<T: Element> Accumulator<T> for DilateGrayFlat<T> {
    fn reset(&mut self) {
        self.state = T::Acc::min_value();
    }

    fn accumulate(&mut self, tap: T, sample: T) {
        if tap.to_acc() != T::Acc::zero() {
            let s = sample.to_acc();
            if s > self.state {
                self.state = s;
            }
        }
    }

    fn accumulate_zero(&mut self, _sample: T) {}

    fn accumulate_sym(&mut self, tap: T, left: T, right: T) {
        self.accumulate(tap, left);
        self.accumulate(tap, right);
    }

    fn accumulate_asym(&mut self, tap: T, left: T, right: T) {
        self.accumulate_sym(tap, left, right);
    }

    fn set_norm(&mut self, _norm: T) {}

    fn result(&self) -> T {
        T::from_acc(self.state)
    }
}

/// Non-flat gray erosion: the minimum of `sample − tap` over all taps.
#[derive(Debug, Clone)]
pub struct ErodeGrayNonFlat<T: Element> {
    state: T::Acc,
}

impl<T: Element> Default for ErodeGrayNonFlat<T> {
    fn default() -> Self {
        Self {
            state: T::Acc::max_value(),
        }
    }
}

impl<T: Element> Accumulator<T> for ErodeGrayNonFlat<T> {
    fn reset(&mut self) {
        self.state = T::Acc::max_value();
    }

    fn accumulate(&mut self, tap: T, sample: T) {
        let v = sample.to_acc() - tap.to_acc();
        if v < self.state {
            self.state = v;
        }
    }

    fn accumulate_zero(&mut self, sample: T) {
        let s = sample.to_acc();
        if s < self.state {
            self.state = s;
        }
    }

    fn accumulate_sym(&mut self, tap: T, left: T, right: T) {
        self.accumulate(tap, left);
        self.accumulate(tap, right);
    }

    fn accumulate_asym(&mut self, tap: T, left: T, right: T) {
        self.accumulate_sym(tap, left, right);
    }

    fn set_norm(&mut self, _norm: T) {}

    fn result(&self) -> T {
        T::from_acc(self.state)
    }
}

/// Non-flat gray dilation: the maximum of `sample + tap` over all taps.
#[derive(Debug, Clone)]
pub struct DilateGrayNonFlat<T: Element> {
    state: T::Acc,
}

impl<T: Element> Default for DilateGrayNonFlat<T> {
    fn default() -> Self {
        Self {
            state: T::Acc::min_value(),
        }
    }
}

impl<T: Element> Accumulator<T> for DilateGrayNonFlat<T> {
    fn reset(&mut self) {
        self.state = T::Acc::min_value();
    }

    fn accumulate(&mut self, tap: T, sample: T) {
        let v = sample.to_acc() + tap.to_acc();
        if v > self.state {
            self.state = v;
        }
    }

    fn accumulate_zero(&mut self, sample: T) {
        let s = sample.to_acc();
        if s > self.state {
            self.state = s;
        }
    }

    fn accumulate_sym(&mut self, tap: T, left: T, right: T) {
        self.accumulate(tap, left);
        self.accumulate(tap, right);
    }

    fn accumulate_asym(&mut self, tap: T, left: T, right: T) {
        self.accumulate_sym(tap, left, right);
    }

    fn set_norm(&mut self, _norm: T) {}

    fn result(&self) -> T {
        T::from_acc(self.state)
    }
}

/// Binary erosion: the kernel norm while every nonzero tap covers a nonzero
/// sample, 0 as soon as one misses.
#[derive(Debug, Clone)]
pub struct ErodeBinary<T: Element> {
    state: T::Acc,
    norm: T::Acc,
}

impl<T: Element> Default for ErodeBinary<T> {
    fn default() -> Self {
        let norm = T::suggested_norm().to_acc();
        Self { state: norm, norm }
    }
}

impl<T: Element> Accumulator<T> for ErodeBinary<T> {
    fn reset(&mut self) {
        self.state = self.norm;
    }

    fn accumulate(&mut self, tap: T, sample: T) {
        if tap.to_acc() != T::Acc::zero() && sample.to_acc() == T::Acc::zero() {
            self.state = T::Acc::zero();
        }
    }

    fn accumulate_zero(&mut self, _sample: T) {}

    fn accumulate_sym(&mut self, tap: T, left: T, right: T) {
        self.accumulate(tap, left);
        self.accumulate(tap, right);
    }

    fn accumulate_asym(&mut self, tap: T, left: T, right: T) {
        self.accumulate_sym(tap, left, right);
    }

    fn set_norm(&mut self, norm: T) {
        self.norm = norm.to_acc();
    }

    fn result(&self) -> T {
        T::from_acc(self.state)
    }
}

/// Binary dilation: the kernel norm as soon as any nonzero tap overlaps a
/// nonzero sample, 0 otherwise.
#[derive(Debug, Clone)]
pub struct DilateBinary<T: Element> {
    state: T::Acc,
    norm: T::Acc,
}

impl<T: Element> Default for DilateBinary<T> {
    fn default() -> Self {
        Self {
            state: T::Acc::zero(),
            norm: T::suggested_norm().to_acc(),
        }
    }
}

impl<T: Element> Accumulator<T> for DilateBinary<T> {
    fn reset(&mut self) {
        self.state = T::Acc::zero();
    }

    fn accumulate(&mut self, tap: T, sample: T) {
        if tap.to_acc() != T::Acc::zero() && sample.to_acc() != T::Acc::zero() {
            self.state = self.norm;
        }
    }

    fn accumulate_zero(&mut self, _sample: T) {}

    fn accumulate_sym(&mut self, tap: T, left: T, right: T) {
        self.accumulate(tap, left);
        self.accumulate(tap, right);
    }

    fn accumulate_asym(&mut self, tap: T, left: T, right: T) {
        self.accumulate_sym(tap, left, right);
    }

    fn set_norm(&mut self, norm: T) {
        self.norm = norm.to_acc();
    }

    fn result(&self) -> T {
        T::from_acc(self.state)
    }
}
