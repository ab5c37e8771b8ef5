//! Metric capture with `metrics_util`'s debugging recorder.

use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};

/// Create a debugging recorder and the snapshotter reading it.
///
/// Install the recorder for a closure with `metrics::with_local_recorder`.
#[must_use]
pub fn debugging_recorder() -> (Snapshotter, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (snapshotter, recorder)
}

/// Counter values captured from one snapshot.
#[derive(Debug)]
pub struct Counters {
    entries: Vec<(String, Vec<(String, String)>, u64)>,
}

impl Counters {
    /// Take a snapshot of every counter recorded so far.
    #[must_use]
    pub fn capture(snapshotter: &Snapshotter) -> Self {
        let entries = snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .filter_map(|(key, _, _, value)| match value {
                DebugValue::Counter(count) => {
                    let key = key.key();
                    let labels = key
                        .labels()
                        .map(|l| (l.key().to_owned(), l.value().to_owned()))
                        .collect();
                    Some((key.name().to_owned(), labels, count))
                }
                _ => None,
            })
            .collect();
        Self { entries }
    }

    /// Sum the counters named `name`, optionally restricted to one label
    /// value.
    #[must_use]
    pub fn get(&self, name: &str, label: Option<(&str, &str)>) -> u64 {
        self.entries
            .iter()
            .filter(|(n, _, _)| n == name)
            .filter(|(_, labels, _)| {
                label.is_none_or(|(k, v)| labels.iter().any(|(lk, lv)| lk == k && lv == v))
            })
            .map(|(_, _, count)| count)
            .sum()
    }
}
