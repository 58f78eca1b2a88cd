//! Allocation accounting for container construction and release.
//!
//! A counting global allocator tracks allocations made on the current test
//! thread, so each test checks that everything it built was given back.

use std::alloc::{GlobalAlloc, Layout as AllocLayout, System};
use std::cell::Cell;

use dpg_core::container::{Layout, Matrix, Multiarray, Vector};
use dpg_core::linalg::CsrOperator;
use dpg_core::nested::{Level, Nested3, free_nested};

struct Counting;

thread_local! {
    static ALLOCS: Cell<usize> = const { Cell::new(0) };
    static FREES: Cell<usize> = const { Cell::new(0) };
}

unsafe impl GlobalAlloc for Counting {
    unsafe fn alloc(&self, layout: AllocLayout) -> *mut u8 {
        let _ = ALLOCS.try_with(|c| c.set(c.get() + 1));
        unsafe { System.alloc(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: AllocLayout) {
        let _ = FREES.try_with(|c| c.set(c.get() + 1));
        unsafe { System.dealloc(ptr, layout) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: AllocLayout, new_size: usize) -> *mut u8 {
        unsafe { System.realloc(ptr, layout, new_size) }
    }
}

#[global_allocator]
static GLOBAL: Counting = Counting;

/// Net allocations (allocs minus frees) made on this thread by `f`.
///
/// `f` runs once unmeasured first, so one-time setup (thread-locals, log
/// callsite registration) is not counted.
fn net_allocations<F: Fn()>(f: F) -> isize {
    f();
    let a0 = ALLOCS.with(Cell::get);
    let f0 = FREES.with(Cell::get);
    f();
    let a1 = ALLOCS.with(Cell::get);
    let f1 = FREES.with(Cell::get);
    (a1 - a0) as isize - (f1 - f0) as isize
}

#[test]
fn test_containers_release_everything() {
    let net = net_allocations(|| {
        let v = Vector::<f64>::filled(10, 1.5).unwrap();
        let m = Matrix::<f64>::zeros(4, 5, Layout::Row).unwrap();
        let a = Multiarray::<f64>::zeros(&[3, 2, 2], Layout::Col).unwrap();
        let t = m.to_layout(Layout::Col).unwrap();
        v.destroy();
        m.destroy();
        a.destroy();
        t.destroy();
    });
    assert_eq!(net, 0);
}

#[test]
fn test_views_do_not_allocate() {
    let m = Matrix::<f64>::filled(3, 3, Layout::Col, 2.0).unwrap();
    let a = Multiarray::<f64>::zeros(&[2, 2, 2], Layout::Col).unwrap();
    let borrow = || {
        let mv = m.view();
        let col = m.col(1).unwrap();
        let sub = a.sub_matrix(&[1]).unwrap();
        assert_eq!(mv.rows(), 3);
        assert_eq!(col.len(), 3);
        assert_eq!(sub.rows(), 2);
    };
    borrow();
    let before = ALLOCS.with(Cell::get);
    borrow();
    assert_eq!(ALLOCS.with(Cell::get), before);
}

#[test]
fn test_nested_release_with_unconstructed_slots() {
    let extents = [2, 3, 4];
    let net = net_allocations(|| {
        let mut k = 0;
        let root: Nested3<Matrix<f64>> = Level::from_fn(extents[0], |_| {
            Some(
                Level::from_fn(extents[1], |_| {
                    Some(
                        Level::from_fn(extents[2], |_| {
                            k += 1;
                            (k % 3 != 0).then(|| Matrix::filled(2, 2, Layout::Row, k as f64).unwrap())
                        })
                        .unwrap(),
                    )
                })
                .unwrap(),
            )
        })
        .unwrap();

        let stats = free_nested(&extents, root).unwrap();
        assert_eq!(stats.leaves + stats.skipped, 24);
        assert_eq!(stats.skipped, 8);
        assert_eq!(stats.levels, 1 + 2 + 6);
    });
    assert_eq!(net, 0);
}

#[test]
fn test_csr_round_trip_releases_buffers() {
    let net = net_allocations(|| {
        let op = CsrOperator::new(vec![0, 2, 3], vec![0, 1, 0], vec![1.0, 2.0, 3.0]).unwrap();
        let dense = op.to_dense(Layout::Row).unwrap();
        assert_eq!(dense.as_slice(), &[1.0, 2.0, 3.0, 0.0]);
        let back = CsrOperator::from_dense(&dense, 0.0).unwrap();
        assert_eq!(back.values(), op.values());
        CsrOperator::destroy_optional(Some(op));
        CsrOperator::<f64>::destroy_optional(None);
        back.destroy();
        dense.destroy();
    });
    assert_eq!(net, 0);
}
