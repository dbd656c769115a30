//! Unit tests for the frame pool

use std::sync::atomic::Ordering;

use crate::device::mock_device::MockPresentDevice;
use crate::device::PresentDevice;
use crate::error::Error;
use crate::frame::frame_pool::FramePool;

#[test]
fn test_pool_requires_at_least_one_slot() {
    let device = MockPresentDevice::new();
    assert!(FramePool::new(&device, 0, u64::MAX).is_err());
    assert!(FramePool::new(&device, 1, u64::MAX).is_ok());
}

#[test]
fn test_rotation_wraps_modulo_pool_size() {
    let device = MockPresentDevice::new();
    let pool = FramePool::new(&device, 3, u64::MAX).unwrap();

    assert_eq!(pool.frames_in_flight(), 3);
    assert_eq!(pool.next(0), 1);
    assert_eq!(pool.next(1), 2);
    assert_eq!(pool.next(2), 0);
}

#[test]
fn test_first_pass_over_ring_never_blocks() {
    let device = MockPresentDevice::new();
    let n = 3;
    let pool = FramePool::new(&device, n, u64::MAX).unwrap();

    let mut slot = 0;
    for _ in 0..n {
        pool.acquire(slot).unwrap();
        device.submit(pool.context(slot)).unwrap();
        slot = pool.next(slot);
    }

    // Pre-signaled fences: no wait blocked during the first pass
    assert_eq!(device.stats().blocking_fence_waits.load(Ordering::SeqCst), 0);
}

#[test]
fn test_wrapped_ring_blocks_on_every_slot() {
    let device = MockPresentDevice::new();
    let n = 2;
    let pool = FramePool::new(&device, n, u64::MAX).unwrap();

    // 2N ticks: rotation sequence 0,1,0,1 with blocking waits once the
    // ring has wrapped
    let mut observed = Vec::new();
    let mut slot = 0;
    for _ in 0..2 * n {
        observed.push(slot);
        pool.acquire(slot).unwrap();
        device.submit(pool.context(slot)).unwrap();
        slot = pool.next(slot);
    }

    assert_eq!(observed, vec![0, 1, 0, 1]);
    // Ticks N+1..2N each found their slot's fence pending
    assert_eq!(
        device.stats().blocking_fence_waits.load(Ordering::SeqCst),
        n
    );
}

#[test]
fn test_acquire_without_submit_times_out_on_reuse() {
    let device = MockPresentDevice::new();
    let pool = FramePool::new(&device, 2, 1_000_000).unwrap();

    // First checkout resets the fence; nothing is submitted, so a second
    // checkout of the same slot can never complete
    pool.acquire(0).unwrap();
    match pool.acquire(0) {
        Err(Error::Timeout) => {}
        other => panic!("expected Timeout, got {:?}", other),
    }
}

#[test]
fn test_slot_contexts_are_distinct() {
    let device = MockPresentDevice::new();
    let pool = FramePool::new(&device, 2, u64::MAX).unwrap();

    // Checking out slot 0 must not disturb slot 1's pre-signaled fence
    pool.acquire(0).unwrap();
    pool.acquire(1).unwrap();
}
