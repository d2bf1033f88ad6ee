use std::collections::HashMap;

pub type LabelName = String;
pub type LabelValue = String;

/// A label set. The metric name travels as the reserved `__name__` label,
/// so one representation serves both the parser and the storage interface.
pub type Labels = HashMap<LabelName, LabelValue>;

pub const METRIC_NAME_LABEL: &str = "__name__";

pub fn metric_name(labels: &Labels) -> Option<&LabelValue> {
    labels.get(METRIC_NAME_LABEL)
}
