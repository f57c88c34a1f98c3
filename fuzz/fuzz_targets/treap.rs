#![no_main]

use std::collections::BTreeMap;

use cvm_estimator::TreapBuffer;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut buffer = TreapBuffer::new(usize::MAX);
    let mut model = BTreeMap::new();
    for op in data.chunks_exact(3) {
        let value = op[1];
        let priority = f64::from(op[2]) / 256.0;
        if op[0] % 3 == 0 {
            assert_eq!(buffer.delete(&value), model.remove(&value).is_some());
        } else {
            buffer.insert(value, priority);
            model.insert(value, priority);
        }
        assert_eq!(buffer.len(), model.len());
        let max = model.values().copied().fold(None, |acc: Option<f64>, p| {
            Some(acc.map_or(p, |a| a.max(p)))
        });
        assert_eq!(buffer.peek_max_priority(), max);
    }
    assert!(buffer
        .iter()
        .map(|(v, _)| *v)
        .eq(model.keys().copied()));
});
