mod maths_utils;
mod perf;
mod time_utils;

pub use time_utils::{TimeUtils, format_duration};

pub(crate) use maths_utils::{mean_and_stddev, rolling_mean};
