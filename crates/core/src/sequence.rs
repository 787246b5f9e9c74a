pub const SENTINEL_TIMESTAMP: &str = "19700101-000000";

/// Numbers files that share a capture timestamp.
///
/// Feed timestamps in sorted file name order. The counter restarts at zero
/// whenever the timestamp differs from the previous one, so only adjacent
/// duplicates are numbered upward.
#[derive(Debug, Clone, Default)]
pub struct SequenceAssigner {
    previous: Option<String>,
    sequence: u32,
}

impl SequenceAssigner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, timestamp: &str) -> u32 {
        if self.previous.as_deref() == Some(timestamp) {
            self.sequence += 1;
        } else {
            self.previous = Some(timestamp.to_string());
            self.sequence = 0;
        }
        self.sequence
    }

    pub fn assign_or_sentinel(&mut self, timestamp: Option<&str>) -> u32 {
        self.assign(timestamp.unwrap_or(SENTINEL_TIMESTAMP))
    }
}

pub fn assign_sequences<'a, I>(timestamps: I) -> Vec<u32>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut assigner = SequenceAssigner::new();
    timestamps.into_iter().map(|ts| assigner.assign(ts)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_timestamps_count_up_then_reset() {
        let sequences = assign_sequences([
            "20240101-120000",
            "20240101-120000",
            "20240101-120001",
        ]);
        assert_eq!(sequences, vec![0, 1, 0]);
    }

    #[test]
    fn runs_have_no_gaps() {
        let timestamps = [
            "20240101-120000",
            "20240101-120000",
            "20240101-120000",
            "20240102-090000",
            "20240102-090000",
            "20240101-120000",
        ];
        assert_eq!(assign_sequences(timestamps), vec![0, 1, 2, 0, 1, 0]);
    }

    #[test]
    fn unresolved_timestamps_share_the_sentinel() {
        let mut assigner = SequenceAssigner::new();
        assert_eq!(assigner.assign_or_sentinel(None), 0);
        assert_eq!(assigner.assign_or_sentinel(None), 1);
        assert_eq!(assigner.assign_or_sentinel(Some("20240101-120000")), 0);
        assert_eq!(assigner.assign_or_sentinel(None), 0);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(assign_sequences(Vec::<&str>::new()).is_empty());
    }
}
