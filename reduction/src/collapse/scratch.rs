//! Reusable sample buffers for per-pixel loops.

use hashbrown::HashMap;

/// Free-list of `Vec<f64>` keyed by capacity.
///
/// Each row chunk owns one cache; it is never shared between threads.
#[derive(Debug, Default)]
pub(crate) struct VectorCache {
    free: HashMap<usize, Vec<Vec<f64>>>,
}

impl VectorCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Empty vector able to hold `len` values without reallocating.
    pub(crate) fn take(&mut self, len: usize) -> Vec<f64> {
        if let Some(mut v) = self.free.get_mut(&len).and_then(Vec::pop) {
            v.clear();
            return v;
        }
        Vec::with_capacity(len)
    }

    /// Return a vector for reuse.
    pub(crate) fn give(&mut self, v: Vec<f64>) {
        self.free.entry(v.capacity()).or_default().push(v);
    }

    #[cfg(test)]
    pub(crate) fn pooled(&self) -> usize {
        self.free.values().map(Vec::len).sum()
    }
}
