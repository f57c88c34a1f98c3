#![no_main]

use cvm_estimator::CvmEstimator;
use libfuzzer_sys::fuzz_target;
use wyhash::wyhash;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let seed = wyhash(data, 0);
    let capacity = seed as usize % (data.len() + 1);

    let mut estimator = CvmEstimator::<&[u8]>::with_seed(capacity, seed);
    let mut threshold = estimator.threshold();
    for chunk in data.chunks(2) {
        estimator.process(chunk);
        let snapshot = estimator.snapshot();
        assert!(snapshot.size <= capacity);
        assert!(snapshot.threshold <= threshold);
        if let Some(max_priority) = snapshot.max_priority {
            assert!(max_priority <= snapshot.threshold);
        }
        threshold = snapshot.threshold;
    }
    if capacity == 0 {
        assert_eq!(estimator.estimate(), 0);
    }
});
