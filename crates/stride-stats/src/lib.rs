//! Numeric primitives for the Stride performance analysis engine.
//!
//! This crate provides the small set of statistics the comparison and insight
//! layers build on. Everything here is a pure function over caller-supplied
//! slices; nothing allocates global state.
//!
//! # Modules
//!
//! - [`descriptive`]: Mean, population standard deviation and five-number summaries
//! - [`percentiles`]: Linearly interpolated percentiles over sorted data
//! - [`trend`]: Least-squares linear trend with a clamped correlation
//! - [`outliers`]: Z-score outlier rejection
//! - [`confidence`]: Normal-approximation confidence intervals
//! - [`significance`]: Welch's t-test and standardized effect sizes
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use stride_stats::descriptive::DescriptiveStats;
//!
//! let values = [10.0, 20.0, 30.0, 40.0, 50.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.median, 30.0);
//! assert!((stats.std_dev - 200.0_f64.sqrt()).abs() < 1e-12);
//! ```
//!
//! ## Fitting a trend
//!
//! ```
//! use stride_stats::trend::LinearTrend;
//!
//! let trend = LinearTrend::fit(&[1.0, 2.0, 3.0, 4.0, 5.0]);
//! assert_eq!(trend.slope, 1.0);
//! ```
//!
//! ## Rejecting outliers
//!
//! ```
//! use stride_stats::outliers::detect_outliers;
//!
//! let mut values = vec![10.0; 19];
//! values.push(500.0);
//! let split = detect_outliers(&values, 3.0);
//! assert_eq!(split.outliers, vec![500.0]);
//! ```

pub mod confidence;
pub mod descriptive;
pub mod outliers;
pub mod percentiles;
pub mod significance;
pub mod trend;
