//! Conditional pixel-level parallelism.
//!
//! Pixels are independent of each other, so every per-pixel loop in this crate
//! (model fitting, prediction, state updates) is written once against these
//! macros. With the `parallel` feature (default) they expand to rayon parallel
//! iterators; without it they expand to the matching sequential iterators and
//! produce identical results.
//!
//! Nothing here synchronises across dates: callers keep the date loop
//! sequential and only parallelise inside a single date.

/// Iterate a range (or any `IntoIterator`) of pixel indices, in parallel when
/// the `parallel` feature is enabled.
///
/// ```ignore
/// let predicted: Vec<f64> = iter_maybe_parallel!(0..n_pixels)
///     .map(|p| predict_pixel(&coefficients, p, day))
///     .collect();
/// ```
#[macro_export]
macro_rules! iter_maybe_parallel {
    ($expr:expr) => {{
        #[cfg(feature = "parallel")]
        {
            use rayon::iter::IntoParallelIterator;

            IntoParallelIterator::into_par_iter($expr)
        }
        #[cfg(not(feature = "parallel"))]
        {
            IntoIterator::into_iter($expr)
        }
    }};
}

/// Mutable iteration over a slice of per-pixel records.
///
/// Used for the per-date state update, where every pixel writes only its own
/// slot. The result supports `.zip(...)` and `.enumerate()` in both modes.
#[macro_export]
macro_rules! slice_maybe_parallel_mut {
    ($expr:expr) => {{
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            $expr.par_iter_mut()
        }
        #[cfg(not(feature = "parallel"))]
        {
            $expr.iter_mut()
        }
    }};
}

pub use iter_maybe_parallel;
pub use slice_maybe_parallel_mut;
