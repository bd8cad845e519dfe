//! Row chunking for rayon-parallel image loops.

use std::ops::Range;

/// Multiplier for number of chunks relative to CPU threads.
/// Using 2x threads provides good load balancing when some chunks finish faster.
const CHUNKS_PER_THREAD: usize = 2;

/// Rows per chunk that divides `height` into roughly `threads * 2` chunks.
/// Minimum of 1 row per chunk.
#[inline]
pub fn rows_per_chunk(height: usize) -> usize {
    let num_chunks = rayon::current_num_threads() * CHUNKS_PER_THREAD;
    (height / num_chunks).max(1)
}

/// Split `0..height` into contiguous, disjoint row ranges covering every row once.
pub fn row_chunks(height: usize) -> Vec<Range<usize>> {
    let chunk_rows = rows_per_chunk(height);
    (0..height.div_ceil(chunk_rows))
        .map(|chunk| {
            let start = chunk * chunk_rows;
            start..(start + chunk_rows).min(height)
        })
        .collect()
}
