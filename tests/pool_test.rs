use oz_core::alloc::constants::DEFAULT_BLOCK_SIZE;
use oz_core::{construct_in, destroy_in, Pool};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn test_lifo_slot_reuse() {
    let mut pool: Pool<[u64; 4]> = Pool::new();
    let slots: Vec<_> = (0..10).map(|_| pool.alloc()).collect();

    unsafe {
        pool.dealloc(slots[3]);
        pool.dealloc(slots[7]);
    }
    assert_eq!(pool.alloc(), slots[7]);
    assert_eq!(pool.alloc(), slots[3]);

    for slot in slots {
        unsafe { pool.dealloc(slot) };
    }
    assert!(pool.is_empty());
}

#[test]
fn test_block_growth() {
    const BS: usize = 32;
    let mut pool: Pool<u16, BS> = Pool::new();

    let mut slots: Vec<_> = (0..BS).map(|i| pool.construct(i as u16)).collect();
    assert_eq!(pool.capacity(), BS);

    slots.push(pool.construct(u16::MAX));
    assert_eq!(pool.len(), BS + 1);
    assert_eq!(pool.capacity(), 2 * BS);

    for slot in slots {
        unsafe { pool.destruct(slot) };
    }
    assert_eq!(pool.len(), 0);
    assert_eq!(pool.capacity(), 2 * BS);

    pool.free();
    assert_eq!(pool.capacity(), 0);
}

#[test]
fn test_default_block_size() {
    let mut pool: Pool<u8> = Pool::default();
    let p = pool.alloc();
    assert_eq!(pool.capacity(), DEFAULT_BLOCK_SIZE);
    unsafe { pool.dealloc(p) };
}

#[test]
fn test_free_with_live_slots_leaks_instead_of_invalidating() {
    let mut pool: Pool<String, 4> = Pool::new();
    let s = pool.construct("still here".to_string());

    pool.free();
    assert_eq!(pool.len(), 1);
    assert_eq!(pool.capacity(), 4);
    assert_eq!(unsafe { s.as_ref() }, "still here");

    unsafe { pool.destruct(s) };
}

#[test]
fn test_construct_and_destroy_are_separate_steps() {
    let log = Rc::new(RefCell::new(Vec::new()));

    struct Noisy(&'static str, Rc<RefCell<Vec<&'static str>>>);
    impl Drop for Noisy {
        fn drop(&mut self) {
            self.1.borrow_mut().push(self.0);
        }
    }

    let mut pool: Pool<Noisy, 2> = Pool::new();
    let slot = pool.alloc();
    unsafe {
        let obj = construct_in(slot, Noisy("first", log.clone()));
        destroy_in(obj);
        assert_eq!(*log.borrow(), ["first"]);

        // The same slot can hold a new object before it returns to the pool.
        construct_in(slot, Noisy("second", log.clone()));
        pool.destruct(slot);
    }
    assert_eq!(*log.borrow(), ["first", "second"]);
    assert!(pool.is_empty());
}

#[test]
fn test_pool_moves_between_threads() {
    let mut pool: Pool<u64, 8> = Pool::new();
    let p = pool.construct(7);
    let addr = p.as_ptr() as usize;

    let pool = std::thread::spawn(move || {
        let mut pool = pool;
        let q = pool.construct(8);
        unsafe { pool.destruct(q) };
        pool
    })
    .join()
    .unwrap();

    let mut pool = pool;
    let p = std::ptr::NonNull::new(addr as *mut u64).unwrap();
    unsafe {
        assert_eq!(*p.as_ptr(), 7);
        pool.destruct(p);
    }
    assert!(pool.is_empty());
}
