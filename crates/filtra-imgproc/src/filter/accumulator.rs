use filtra_array::Element;
use num_traits::{One, Zero};

/// Strategy object defining how kernel taps and source samples combine into
/// one output value.
///
/// The filtering engine drives every variant through the same protocol: the
/// accumulator is reset before each output element, fed a sequence of
/// `accumulate*` calls, read once through [`Accumulator::result`], then reset
/// for the next element. No instance is shared across elements concurrently;
/// parallel row workers clone a configured prototype.
///
/// `accumulate_sym`/`accumulate_asym` combine one tap with the pair of
/// samples symmetric/antisymmetric about the kernel center and are only
/// invoked when the bound kernel has the corresponding symmetry, halving the
/// number of multiplications. `accumulate_zero` stands for
/// `accumulate(0, sample)` and lets a variant skip work it knows is a no-op.
pub trait Accumulator<T: Element>: Clone {
    /// Clear the running state to the variant's identity.
    fn reset(&mut self);

    /// Combine one kernel tap and one source sample into the state.
    fn accumulate(&mut self, tap: T, sample: T);

    /// Same as `accumulate(0, sample)`, skipping work where possible.
    fn accumulate_zero(&mut self, sample: T);

    /// Combine one tap with a sample pair for a symmetric kernel.
    fn accumulate_sym(&mut self, tap: T, left: T, right: T);

    /// Combine one tap with a sample pair for an antisymmetric kernel.
    fn accumulate_asym(&mut self, tap: T, left: T, right: T);

    /// Inform the accumulator of the active kernel norm.
    fn set_norm(&mut self, norm: T);

    /// Finalize and return the output sample. Idempotent until the next
    /// `accumulate*` or `reset` call.
    fn result(&self) -> T;
}

/// The plain convolution sum: `state += tap * sample`, finalized by the
/// kernel norm for fixed-point element types.
///
/// Classic correlation uses this same accumulator; the only engine-level
/// difference is that the correlation functor mirrors its kernel before the
/// sliding-window pass.
#[derive(Debug, Clone)]
pub struct Sum<T: Element> {
    state: T::Acc,
    norm: T::Acc,
}

impl<T: Element> Default for Sum<T> {
    fn default() -> Self {
        Self {
            state: T::Acc::zero(),
            norm: T::suggested_norm().to_acc(),
        }
    }
}

impl<T: Element> Accumulator<T> for Sum<T> {
    fn reset(&mut self) {
        self.state = T::Acc::zero();
    }

    fn accumulate(&mut self, tap: T, sample: T) {
        self.state = self.state + tap.to_acc() * sample.to_acc();
    }

    fn accumulate_zero(&mut self, _sample: T) {}

    fn accumulate_sym(&mut self, tap: T, left: T, right: T) {
        self.state = self.state + tap.to_acc() * (left.to_acc() + right.to_acc());
    }

    fn accumulate_asym(&mut self, tap: T, left: T, right: T) {
        self.state = self.state + tap.to_acc() * (left.to_acc() - right.to_acc());
    }

    fn set_norm(&mut self, norm: T) {
        self.norm = norm.to_acc();
    }

    fn result(&self) -> T {
        if self.norm == T::Acc::one() {
            T::from_acc(self.state)
        } else {
            T::from_acc(self.state / self.norm)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_basic() {
        let mut acc = Sum::<f32>::default();
        acc.set_norm(1.0);
        acc.accumulate(0.5, 10.0);
        acc.accumulate(0.25, 4.0);
        assert_eq!(acc.result(), 6.0);
        // idempotent
        assert_eq!(acc.result(), 6.0);
        acc.reset();
        assert_eq!(acc.result(), 0.0);
    }

    #[test]
    fn test_sum_fixed_point_norm() {
        // u8 taps with norm 255: [255] * 100 / 255 == 100
        let mut acc = Sum::<u8>::default();
        acc.set_norm(255);
        acc.accumulate(255, 100);
        assert_eq!(acc.result(), 100);
    }

    #[test]
    fn test_sym_matches_two_accumulates() {
        let mut paired = Sum::<f32>::default();
        paired.set_norm(1.0);
        paired.accumulate_sym(2.0, 3.0, 5.0);

        let mut plain = Sum::<f32>::default();
        plain.set_norm(1.0);
        plain.accumulate(2.0, 3.0);
        plain.accumulate(2.0, 5.0);

        assert_eq!(paired.result(), plain.result());
    }

    #[test]
    fn test_asym_matches_two_accumulates() {
        let mut paired = Sum::<f32>::default();
        paired.set_norm(1.0);
        paired.accumulate_asym(2.0, 3.0, 5.0);

        let mut plain = Sum::<f32>::default();
        plain.set_norm(1.0);
        plain.accumulate(2.0, 3.0);
        plain.accumulate(-2.0, 5.0);

        assert_eq!(paired.result(), plain.result());
    }

    #[test]
    fn test_accumulate_zero_is_noop() {
        let mut acc = Sum::<f32>::default();
        acc.accumulate(1.0, 2.0);
        acc.accumulate_zero(100.0);
        assert_eq!(acc.result(), 2.0);
    }
}
