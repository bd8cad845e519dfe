//! Sample statistics and small fitting routines shared by the reducers.

mod polyfit;
mod statistics;

pub use polyfit::{QuadraticFit, fit_quadratic};
pub use statistics::{
    MAD_TO_SIGMA, MEDIAN_ERROR_FACTOR, mad_to_sigma, mad_with_scratch, mean, mean_error,
    median_mut, median_sorted, quadrature_sum, sort_pairs_by_value, stdev, weighted_mean,
};
