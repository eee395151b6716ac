#![cfg(feature = "alloc")]

use flex_pool::{Pool, PoolWriter};

#[test]
fn writer_text() {
    use core::fmt::Write;

    let mut w = PoolWriter::<u8>::new();
    assert!(w.is_empty());
    for idx in 0..3 {
        write!(w, "{idx},").unwrap();
    }
    w.write_str("end").unwrap();
    assert_eq!(w.as_str(), Ok("0,1,2,end"));
    assert_eq!(&*w.to_owned_array(), b"0,1,2,end");
    w.clear();
    assert_eq!(w.as_str(), Ok(""));
}

#[test]
fn writer_values() {
    let mut w = PoolWriter::<u64>::with_capacity(2);
    w.write(1);
    w.write_slice(&[2, 3]);
    w.extend(4..=6);
    assert_eq!(w.written(), &[1, 2, 3, 4, 5, 6]);
    assert_eq!(w.len(), 6);
    assert!(w.capacity() >= 6);
}

#[test]
fn writer_spare_fill() {
    let pool = Pool::new();
    let mut w = PoolWriter::<u8, _>::new_in(&pool);
    let mut total = 0;
    while total < 300 {
        let spare = w.get_spare(50);
        assert!(spare.len() >= 50);
        for slot in &mut spare[..50] {
            slot.write(b'x');
        }
        unsafe { w.advance(50) };
        total += 50;
    }
    assert_eq!(w.len(), 300);
    assert!(w.written().iter().all(|b| *b == b'x'));
    w.dispose();
    let stats = pool.stats();
    assert_eq!(stats.rented, stats.returned);
}

#[test]
fn writer_detach_hands_off_storage() {
    let pool = Pool::new();
    let mut w = PoolWriter::new_in(&pool);
    w.write_slice(&[1u16, 2, 3]);
    let mut owned = w.detach();
    assert_eq!(pool.stats().returned, 0);
    owned.push(4);
    assert_eq!(owned, [1, 2, 3, 4]);
    owned.dispose();
    assert_eq!(pool.stats().returned, 1);
}

#[cfg(feature = "std")]
#[test]
fn writer_io() {
    use std::io::Write;
    let mut w = PoolWriter::<u8>::default();
    w.write_all(b"line one\n").unwrap();
    writeln!(w, "line {}", 2).unwrap();
    w.flush().unwrap();
    assert_eq!(w.as_str(), Ok("line one\nline 2\n"));
}
