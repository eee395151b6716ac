#![cfg(feature = "alloc")]
#![cfg_attr(feature = "nightly", feature(allocator_api))]

use rstest::rstest;

use flex_pool::{
    alloc::Spill,
    capacity::{GrowDoubling, GrowPooled},
    pool::{PoolConfig, PoolStats},
    storage::array_storage,
    Buffer, Pool, PoolList, Shared,
};

#[rstest]
#[case(1)]
#[case(7)]
#[case(100)]
#[case(5000)]
fn dispose_returns_every_rental(#[case] count: usize) {
    let pool = Pool::new();
    let mut buf = Buffer::<u32, &Pool, GrowPooled>::new_in(&pool);
    let mut growths = 0;
    for value in 0..count as u32 {
        let cap = buf.capacity();
        buf.push(value);
        if buf.capacity() != cap {
            growths += 1;
        }
    }
    buf.dispose();
    let stats = pool.stats();
    assert_eq!(stats.rented, growths);
    assert_eq!(stats.returned, stats.rented);
    assert!(stats.returned <= growths + 1);
}

#[test]
fn stack_buffer_releases_only_rented_blocks() {
    let pool = Pool::new();
    let mut storage = array_storage::<u64, 2>();
    let mut buf = Buffer::<u64, Spill<'_, &Pool>, GrowDoubling>::from_borrowed_in(
        storage.as_uninit_slice(),
        &pool,
    );
    buf.extend(0..100);
    let rented = pool.stats().rented;
    assert!(rented > 0);
    drop(buf);
    assert_eq!(pool.stats().returned, rented);
}

#[test]
fn rented_region_starts_empty() {
    let pool = Pool::new();
    let mut buf = Buffer::<u8, &Pool, GrowPooled>::with_capacity_in(10, &pool);
    buf.extend_from_slice(b"stale data");
    buf.dispose();

    let buf = Buffer::<u8, &Pool, GrowPooled>::with_capacity_in(10, &pool);
    assert_eq!(pool.stats().reused, 1);
    assert_eq!(buf.len(), 0);
    assert_eq!(buf.capacity(), 64);
}

#[test]
fn pool_stats_track_activity() {
    let pool = Pool::with_config(PoolConfig {
        min_block_size: 100,
        max_retained: 2,
    });
    assert_eq!(pool.config().min_block_size, 128);
    let bufs: Vec<_> = (0..3)
        .map(|_| Buffer::<u8, &Pool, GrowPooled>::with_capacity_in(1, &pool))
        .collect();
    assert!(bufs.iter().all(|b| b.capacity() == 128));
    drop(bufs);
    assert_eq!(
        pool.stats(),
        PoolStats {
            rented: 3,
            returned: 3,
            reused: 0,
            retained: 2,
        }
    );
    pool.trim();
    assert_eq!(pool.stats().retained, 0);
}

#[test]
fn pool_shared_between_threads() {
    let pool = Pool::new();
    std::thread::scope(|scope| {
        for t in 0..4 {
            let pool = &pool;
            scope.spawn(move || {
                for _ in 0..50 {
                    let mut buf = Buffer::<usize, &Pool, GrowDoubling>::new_in(pool);
                    buf.extend(0..t * 10 + 1);
                    assert_eq!(buf.iter().sum::<usize>(), (0..t * 10 + 1).sum());
                }
            });
        }
    });
    let stats = pool.stats();
    assert_eq!(stats.rented, stats.returned);
    assert!(stats.reused > 0);
}

#[test]
fn shared_pool_front_end() {
    let mut list = PoolList::<u16>::with_capacity(4);
    list.extend_from_slice(&[1, 2, 3, 4]);
    list.insert(2, 9);
    assert_eq!(list, [1, 2, 9, 3, 4]);
    // any activity on the shared pool is visible through its stats
    assert!(Shared::pool().stats().rented >= 1);
}

#[cfg(feature = "zeroize")]
#[test]
fn zeroizing_pool_blocks() {
    use core::alloc::Layout;
    use flex_pool::alloc::{Allocator, ZeroizingAlloc};

    let pool = Pool::new();
    let mut buf = Buffer::<u8, _, GrowPooled>::new_in(ZeroizingAlloc(&pool));
    buf.extend_from_slice(b"secret value");
    buf.dispose();
    assert_eq!(pool.stats().retained, 1);

    // the retained block is handed out again, cleared
    let layout = Layout::new::<[u8; 12]>();
    let block = pool.allocate(layout).unwrap();
    assert_eq!(pool.stats().reused, 1);
    let bytes = unsafe { block.as_ref() };
    assert!(bytes.iter().all(|b| *b == 0));
    unsafe { pool.deallocate(block.cast(), layout) };
}
