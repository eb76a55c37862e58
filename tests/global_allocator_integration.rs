use oz_core::alloc::{OzAlloc, ALLOC};
use oz_core::collections::HashString;
use oz_core::Pool;

#[global_allocator]
static GLOBAL: OzAlloc = OzAlloc;

// One test only: the counters are exact only while a single thread allocates.
#[test]
fn test_global_allocator_end_to_end() {
    ALLOC.init();

    // Boxes and vectors land on 16-byte boundaries.
    let boxes: Vec<Box<u64>> = (0..1000).map(Box::new).collect();
    for (i, b) in boxes.iter().enumerate() {
        assert_eq!(**b, i as u64);
        assert_eq!(&**b as *const u64 as usize % 16, 0);
    }
    assert!(ALLOC.statistics().count >= 1000);

    // Growth goes through the default realloc path.
    let mut v: Vec<u32> = Vec::new();
    for i in 0..10_000 {
        v.push(i);
    }
    assert_eq!(v.iter().map(|&x| u64::from(x)).sum::<u64>(), 49_995_000);

    // Over-aligned types.
    #[repr(align(128))]
    struct Wide([u8; 8]);
    let wide = Box::new(Wide([3; 8]));
    assert_eq!(&*wide as *const Wide as usize % 128, 0);
    assert_eq!(wide.0[7], 3);

    // Pools and tables allocate their blocks through the installed allocator.
    let mut pool: Pool<String, 16> = Pool::new();
    let s = pool.construct(String::from("pooled"));
    unsafe {
        assert_eq!(&*s.as_ptr(), "pooled");
        pool.destruct(s);
    }

    let mut table: HashString<Vec<u8>> = HashString::new();
    table.add("bytes", vec![1, 2, 3]);
    assert_eq!(table["bytes"], [1, 2, 3]);

    let live = ALLOC.statistics();
    drop(boxes);
    drop(v);
    drop(wide);
    drop(pool);
    drop(table);
    let after = ALLOC.statistics();
    assert!(after.count < live.count);
    assert!(after.sum_count >= live.sum_count);
    assert!(after.max_amount >= live.amount);

    ALLOC.print_summary();
}
