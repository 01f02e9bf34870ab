//! Time-bucket histogram and hot-moment selection.
//!
//! The scan pipeline reduces a video's chat replay to a histogram of
//! keyword-matching message counts over fixed-width time buckets, then picks
//! the k busiest buckets as the video's "hot" moments. Everything here is a
//! pure function over plain integers so the whole core is unit-testable
//! without a network or a database.

/// Count `offsets` into fixed-width buckets of `interval` seconds.
///
/// Bucket `i` covers the half-open window `[i*interval, (i+1)*interval)`.
/// The histogram length is derived from the largest offset present, so
/// late-arriving offsets simply extend it. An empty input yields a single
/// zero-count bucket.
pub fn build_histogram(offsets: &[u64], interval: u64) -> Vec<u64> {
    let max = match offsets.iter().max() {
        Some(&max) => max,
        None => return vec![0],
    };

    let mut bins = vec![0u64; (max / interval) as usize + 1];
    for &offset in offsets {
        bins[(offset / interval) as usize] += 1;
    }
    bins
}

/// Select the `k` highest-count buckets.
///
/// Returns the bucket start-times (seconds) and their counts, ordered by
/// count descending. Equal counts keep ascending bucket-index order: the
/// sort is stable over an index vector, which makes the selection
/// deterministic. Asking for more buckets than exist returns them all.
pub fn top_k(histogram: &[u64], k: usize, interval: u64) -> (Vec<u64>, Vec<u64>) {
    let mut indices: Vec<usize> = (0..histogram.len()).collect();
    indices.sort_by(|&a, &b| histogram[b].cmp(&histogram[a]));
    indices.truncate(k.min(histogram.len()));

    let times = indices.iter().map(|&i| i as u64 * interval).collect();
    let counts = indices.iter().map(|&i| histogram[i]).collect();
    (times, counts)
}

/// Format a second count as `H時間M分S秒`.
pub fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{}時間{}分{}秒", hours, minutes, seconds)
}

/// Literal-substring keyword matcher, case-sensitive, no tokenization.
///
/// Built once from configuration and threaded into the scanner.
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    keywords: Vec<String>,
}

impl KeywordFilter {
    pub fn new(keywords: Vec<String>) -> Self {
        Self { keywords }
    }

    /// True iff `text` is non-empty and contains at least one keyword.
    pub fn matches(&self, text: &str) -> bool {
        !text.is_empty() && self.keywords.iter().any(|k| text.contains(k.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_duration_basic() {
        assert_eq!(format_duration(3661), "1時間1分1秒");
        assert_eq!(format_duration(0), "0時間0分0秒");
    }

    #[test]
    fn format_duration_boundaries() {
        assert_eq!(format_duration(59), "0時間0分59秒");
        assert_eq!(format_duration(60), "0時間1分0秒");
        assert_eq!(format_duration(3600), "1時間0分0秒");
        assert_eq!(format_duration(7325), "2時間2分5秒");
    }

    #[test]
    fn empty_offsets_single_zero_bucket() {
        assert_eq!(build_histogram(&[], 20), vec![0]);
    }

    #[test]
    fn bucket_boundaries_half_open() {
        // bucket 0: 5, 19; bucket 1: 20; bucket 2: 45
        assert_eq!(build_histogram(&[5, 19, 20, 45], 20), vec![2, 1, 1]);
    }

    #[test]
    fn histogram_length_from_max_offset() {
        let bins = build_histogram(&[205], 20);
        assert_eq!(bins.len(), 11);
        assert_eq!(bins[10], 1);
        assert_eq!(bins.iter().take(10).sum::<u64>(), 0);
    }

    #[test]
    fn histogram_sum_equals_offset_count() {
        let offsets = [1, 2, 2, 19, 20, 21, 300, 301, 599];
        for interval in [1, 7, 20, 60] {
            let bins = build_histogram(&offsets, interval);
            assert_eq!(
                bins.iter().sum::<u64>(),
                offsets.len() as u64,
                "interval {}",
                interval
            );
        }
    }

    #[test]
    fn top_k_orders_by_count_descending() {
        let (times, counts) = top_k(&[2, 1, 1], 10, 20);
        assert_eq!(times, vec![0, 20, 40]);
        assert_eq!(counts, vec![2, 1, 1]);
    }

    #[test]
    fn top_k_larger_than_histogram_returns_all() {
        let (times, counts) = top_k(&[3], 10, 20);
        assert_eq!(times, vec![0]);
        assert_eq!(counts, vec![3]);
    }

    #[test]
    fn top_k_truncates_to_k() {
        let histogram: Vec<u64> = (0..30).collect();
        let (times, counts) = top_k(&histogram, 10, 20);
        assert_eq!(times.len(), 10);
        assert_eq!(counts[0], 29);
        assert_eq!(times[0], 29 * 20);
    }

    #[test]
    fn top_k_ties_keep_ascending_bucket_order() {
        let (times, counts) = top_k(&[1, 1, 5, 1], 3, 20);
        assert_eq!(counts, vec![5, 1, 1]);
        // buckets 0, 1, 3 all hold 1; the lower indices come first
        assert_eq!(times, vec![40, 0, 20]);
    }

    #[test]
    fn top_k_on_degenerate_histogram() {
        let (times, counts) = top_k(&[0], 10, 20);
        assert_eq!(times, vec![0]);
        assert_eq!(counts, vec![0]);
    }

    #[test]
    fn keyword_filter_literal_substring() {
        let filter = KeywordFilter::new(vec!["草".to_string(), "lol".to_string()]);
        assert!(filter.matches("大草原"));
        assert!(filter.matches("that was lol"));
        assert!(!filter.matches("LOL")); // case-sensitive
        assert!(!filter.matches("nothing here"));
        assert!(!filter.matches(""));
    }

    #[test]
    fn keyword_filter_empty_keyword_list_matches_nothing() {
        let filter = KeywordFilter::new(vec![]);
        assert!(!filter.matches("anything"));
    }
}
