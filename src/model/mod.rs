mod labels;
mod timestamp;

pub use labels::*;
pub use timestamp::*;

pub type MetricName = String;

pub type SampleValue = f64;
