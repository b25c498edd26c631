use rayon::prelude::*;
use thiserror::Error;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// The slice length does not split the buffer evenly.
    #[error("slice length {0} does not divide a buffer of {1} elements")]
    InvalidSliceLength(usize, usize),
}

/// Controls how the voxel loops are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Use the global Rayon thread pool to process z-slices in parallel.
    #[default]
    ParallelSlices,

    /// Run sequentially on the current thread, z-slice by z-slice.
    ///
    /// Useful for small volumes, debugging, or when a deterministic visiting order matters.
    Serial,

    /// Run on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every call, which has significant overhead.
    /// Use this primarily for benchmarking or specific isolation needs.
    Fixed(usize),
}

/// Apply a function to each slice of a buffer with the given strategy.
///
/// The buffer is split into consecutive chunks of `slice_len` elements and `f` is called
/// with the index of the chunk and the chunk itself. Every chunk is visited exactly once.
///
/// # Errors
///
/// Returns an error if `slice_len` does not divide the buffer or the thread pool
/// cannot be built.
pub fn par_iter_slices<T, F>(
    dst: &mut [T],
    slice_len: usize,
    strategy: ExecutionStrategy,
    f: F,
) -> Result<(), ParallelError>
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    if dst.is_empty() {
        return Ok(());
    }

    if slice_len == 0 || dst.len() % slice_len != 0 {
        return Err(ParallelError::InvalidSliceLength(slice_len, dst.len()));
    }

    match strategy {
        ExecutionStrategy::Serial => {
            dst.chunks_mut(slice_len)
                .enumerate()
                .for_each(|(k, slice)| f(k, slice));
        }
        ExecutionStrategy::ParallelSlices => {
            dst.par_chunks_mut(slice_len)
                .enumerate()
                .for_each(|(k, slice)| f(k, slice));
        }
        ExecutionStrategy::Fixed(n) => {
            if n == 0 {
                return Err(ParallelError::InvalidThreadCount(n));
            }
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| ParallelError::BuildError(e.to_string()))?;

            pool.install(|| {
                dst.par_chunks_mut(slice_len)
                    .enumerate()
                    .for_each(|(k, slice)| f(k, slice));
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(strategy: ExecutionStrategy) -> Result<Vec<usize>, ParallelError> {
        let mut dst = vec![0; 6];
        par_iter_slices(&mut dst, 2, strategy, |k, slice| {
            slice.iter_mut().enumerate().for_each(|(i, v)| *v = 10 * k + i);
        })?;
        Ok(dst)
    }

    #[test]
    fn test_slices_serial() -> Result<(), ParallelError> {
        assert_eq!(fill(ExecutionStrategy::Serial)?, vec![0, 1, 10, 11, 20, 21]);
        Ok(())
    }

    #[test]
    fn test_slices_parallel() -> Result<(), ParallelError> {
        assert_eq!(
            fill(ExecutionStrategy::ParallelSlices)?,
            vec![0, 1, 10, 11, 20, 21]
        );
        Ok(())
    }

    #[test]
    fn test_slices_fixed() -> Result<(), ParallelError> {
        assert_eq!(fill(ExecutionStrategy::Fixed(2))?, vec![0, 1, 10, 11, 20, 21]);
        assert_eq!(
            fill(ExecutionStrategy::Fixed(0)),
            Err(ParallelError::InvalidThreadCount(0))
        );
        Ok(())
    }

    #[test]
    fn test_slices_invalid_length() {
        let mut dst = vec![0; 5];
        let res = par_iter_slices(&mut dst, 2, ExecutionStrategy::Serial, |_, _| {});
        assert_eq!(res, Err(ParallelError::InvalidSliceLength(2, 5)));

        let mut empty: Vec<u8> = vec![];
        assert!(par_iter_slices(&mut empty, 0, ExecutionStrategy::Serial, |_, _| {}).is_ok());
    }
}
