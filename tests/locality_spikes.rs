use zorder_core::analysis::expected_step_distance;
use zorder_core::{BitCodec, DistanceStats, LocalityAnalyzer};

#[test]
fn step_distances_follow_trailing_zero_law() {
    let codec = BitCodec::new(16).unwrap();
    let analyzer = LocalityAnalyzer::new(&codec);
    for s in analyzer.analyze(0..=4096).unwrap() {
        let expected = expected_step_distance(s.key);
        assert!(
            (s.distance - expected).abs() < 1e-9,
            "key {}: {} vs {}",
            s.key,
            s.distance,
            expected
        );
    }
}

#[test]
fn distances_are_bounded_by_axis_extent() {
    let codec = BitCodec::new(12).unwrap();
    let analyzer = LocalityAnalyzer::new(&codec);
    let bound = (1u64 << 6) as f64;
    let samples: Vec<_> = analyzer.analyze(0..=codec.max_key()).unwrap().collect();
    assert_eq!(samples.len(), 4095);
    for s in &samples {
        assert!(s.distance >= 0.0);
        assert!(s.distance <= bound, "key {} jumped {}", s.key, s.distance);
    }
    // Odd keys only move one step along x.
    assert!(samples.iter().filter(|s| s.key % 2 == 1).all(|s| s.distance == 1.0));
}

#[test]
fn maxima_fall_on_powers_of_two() {
    let codec = BitCodec::new(32).unwrap();
    let analyzer = LocalityAnalyzer::new(&codec);

    for k in 2..=14u32 {
        let end = 1u64 << k;
        let stats = analyzer.stats(0..=end).unwrap();
        let max = stats.max().unwrap();

        let at_max: Vec<u64> = analyzer
            .analyze(0..=end)
            .unwrap()
            .filter(|s| s.distance == max)
            .map(|s| s.key)
            .collect();
        assert!(!at_max.is_empty());
        for key in &at_max {
            assert!(key.is_power_of_two(), "k={} max at non power of two {}", k, key);
        }

        // Half-open (0, 2^k) with even k peaks uniquely at the middle boundary.
        if k % 2 == 0 {
            let top = analyzer.top_spikes(0..=end - 1, 1).unwrap();
            assert_eq!(top[0].key, 1u64 << (k - 1));
        }
    }
}

#[test]
fn spike_keys_share_trailing_zero_levels() {
    let codec = BitCodec::new(20).unwrap();
    let analyzer = LocalityAnalyzer::new(&codec);
    let top = analyzer.top_spikes(0..=1024, 8).unwrap();
    let keys: Vec<u64> = top.iter().map(|s| s.key).collect();
    assert_eq!(keys, vec![512, 1024, 128, 256, 384, 640, 768, 896]);
}

#[test]
fn parallel_stats_match_sequential_reduction() {
    let codec = BitCodec::new(24).unwrap();
    let analyzer = LocalityAnalyzer::new(&codec);
    let range = 1_000..=50_000;

    let parallel = analyzer.stats(range.clone()).unwrap();
    let sequential = DistanceStats::from_samples(analyzer.analyze(range).unwrap());
    assert_eq!(parallel.as_slice(), sequential.as_slice());
    assert_eq!(parallel.len(), 49_000);

    let mean = parallel.mean().unwrap();
    assert!(mean > 1.0 && mean < 4.0, "mean {}", mean);
    // At least half of all steps are unit steps.
    assert_eq!(parallel.percentile(50.0).unwrap(), Some(1.0));
}

#[test]
fn summary_reports_requested_percentiles() {
    let codec = BitCodec::new(16).unwrap();
    let analyzer = LocalityAnalyzer::new(&codec);
    let summary = analyzer.summarize(0..=256, &[50.0, 99.0], 2).unwrap();
    assert_eq!(summary.samples, 256);
    assert_eq!(summary.min, Some(1.0));
    assert_eq!(summary.percentiles.len(), 2);
    assert_eq!(summary.percentiles[0], (50.0, 1.0));
    assert_eq!(summary.spikes.len(), 2);
    assert_eq!(summary.spikes[0].key, 128);

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["samples"], 256);

    let empty = analyzer.summarize(10..=10, &[50.0], 3).unwrap();
    assert_eq!(empty.samples, 0);
    assert!(empty.percentiles.is_empty());
    assert!(empty.spikes.is_empty());
}
