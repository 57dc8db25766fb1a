//! Parallel iteration when the `parallel` feature is on, plain iterators
//! otherwise.
//!
//! Per-cell stages call `into_par_iter()` through this module so that both
//! builds run the same code and produce identical, ordered output.

#[cfg(feature = "parallel")]
pub use rayon::prelude::*;

#[cfg(not(feature = "parallel"))]
mod sequential {
    /// Mirrors `rayon::prelude::IntoParallelIterator` with `into_iter()`.
    pub trait IntoParallelIterator {
        type Iter;
        type Item;
        fn into_par_iter(self) -> Self::Iter;
    }

    impl<I: IntoIterator> IntoParallelIterator for I {
        type Iter = I::IntoIter;
        type Item = I::Item;
        fn into_par_iter(self) -> Self::Iter {
            self.into_iter()
        }
    }
}

#[cfg(not(feature = "parallel"))]
pub use sequential::*;
