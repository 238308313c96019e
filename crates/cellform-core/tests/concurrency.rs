//! Formatter confinement across threads.

use rhi_cellform_core::{
    CellConverter, CellValue, Decimal, DecimalFormatConverter, FieldConfig, FormatterCache,
};
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 8;

#[test]
fn test_each_thread_gets_its_own_formatter() {
    let cache = Arc::new(FormatterCache::new());
    let barrier = Barrier::new(THREADS);
    let value = Decimal::from_str("-1234567.891").unwrap();

    let results: Vec<(u64, u64, u64, String)> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    let handle = cache.resolve("#,##0.00").unwrap();
                    let again = cache.resolve("#,##0.00").unwrap();
                    let output = handle.format(&value).unwrap();
                    (
                        handle.factory_id(),
                        handle.instance_id(),
                        again.instance_id(),
                        output,
                    )
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let factories: HashSet<u64> = results.iter().map(|r| r.0).collect();
    let instances: HashSet<u64> = results.iter().map(|r| r.1).collect();
    let outputs: HashSet<&str> = results.iter().map(|r| r.3.as_str()).collect();

    // One published factory, one formatter per thread, identical output.
    assert_eq!(factories.len(), 1);
    assert_eq!(instances.len(), THREADS);
    assert!(results.iter().all(|r| r.1 == r.2));
    assert_eq!(outputs, HashSet::from(["-1,234,567.89"]));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_converter_shared_across_threads() {
    let converter = DecimalFormatConverter::with_cache(Arc::new(FormatterCache::with_capacity(2)));
    let patterns = ["#,##0.00", "0.000", "#,##0", "0.0%"];

    let outputs: Vec<Vec<String>> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    (0..50)
                        .flat_map(|_| patterns)
                        .map(|pattern| {
                            let field = FieldConfig::decimal("amount", pattern);
                            let value = CellValue::from(Decimal::from_str("0.98765").unwrap());
                            converter
                                .convert(&field, &value)
                                .unwrap()
                                .as_str()
                                .unwrap()
                                .to_string()
                        })
                        .collect::<Vec<String>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    // Capacity 2 with 4 patterns keeps evicting; output must not change.
    let expected: Vec<String> = (0..50)
        .flat_map(|_| ["0.99", "0.988", "1", "99.0%"])
        .map(String::from)
        .collect();
    for output in outputs {
        assert_eq!(output, expected);
    }
    assert!(converter.cache().stats().evictions > 0);
}
