//! Property-based tests for splitting analysis input into chunks

use genfleet::analysis::split_into_chunks;
use proptest::prelude::*;

/// Chunks cover the input exactly once, in order
#[test]
fn test_chunks_partition_input() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(proptest::collection::vec(any::<u16>(), 0..200), 0usize..32),
            |(items, k)| {
                let chunks = split_into_chunks(&items, k);
                let rejoined: Vec<u16> = chunks.iter().flat_map(|c| c.iter().copied()).collect();
                prop_assert_eq!(rejoined, items);
                Ok(())
            },
        )
        .unwrap();
}

/// Chunk count is min(max(k, 1), n); sizes differ by at most one, larger chunks first
#[test]
fn test_chunk_count_and_sizes() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(1usize..300, 0usize..40), |(n, k)| {
            let items: Vec<usize> = (0..n).collect();
            let chunks = split_into_chunks(&items, k);
            let expected = k.max(1).min(n);
            prop_assert_eq!(chunks.len(), expected);

            let base = n / expected;
            let extra = n % expected;
            for (i, chunk) in chunks.iter().enumerate() {
                let want = if i < extra { base + 1 } else { base };
                prop_assert_eq!(chunk.len(), want);
            }
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_empty_input_has_no_chunks() {
    let items: Vec<u8> = Vec::new();
    for k in 0..5 {
        assert!(split_into_chunks(&items, k).is_empty());
    }
}
