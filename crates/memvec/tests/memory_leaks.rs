//! Teardown and leak-balance tests
//!
//! An instrumented element type counts its drops. After a container is torn
//! down, every element it ever constructed must have been destroyed exactly
//! once: growth moves elements without dropping them, and teardown performs
//! element destruction before the single storage release.

use std::cell::Cell;
use std::rc::Rc;

use memvec::{MemVec, PoolAllocator};

struct Tracked {
    value: usize,
    drops: Rc<Cell<usize>>,
}

impl Tracked {
    fn new(value: usize, drops: &Rc<Cell<usize>>) -> Self {
        Tracked {
            value,
            drops: Rc::clone(drops),
        }
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

#[test]
fn test_container_drop_runs_every_destructor() {
    let drops = Rc::new(Cell::new(0));
    {
        let mut vec: MemVec<Tracked> = MemVec::new();
        for i in 0..25 {
            vec.push(Tracked::new(i, &drops)).unwrap();
        }
        // Growth transfers elements; nothing is dropped along the way.
        assert_eq!(drops.get(), 0);
    }
    assert_eq!(drops.get(), 25);
}

#[test]
fn test_clear_drops_exactly_the_live_elements() {
    let drops = Rc::new(Cell::new(0));
    let mut vec: MemVec<Tracked> = MemVec::new();
    for i in 0..7 {
        vec.push(Tracked::new(i, &drops)).unwrap();
    }

    vec.clear();
    assert_eq!(drops.get(), 7);

    // The retained capacity holds no live elements; dropping the cleared
    // container must not run any further destructors.
    drop(vec);
    assert_eq!(drops.get(), 7);
}

#[test]
fn test_repeated_cycles_balance() {
    let drops = Rc::new(Cell::new(0));
    let mut created = 0;
    {
        let mut vec: MemVec<Tracked> = MemVec::new();
        for cycle in 0..10 {
            for i in 0..8 {
                vec.push(Tracked::new(cycle * 8 + i, &drops)).unwrap();
                created += 1;
            }
            vec.clear();
        }
        // A final partial fill stays live until the container drops.
        for i in 0..5 {
            vec.push(Tracked::new(i, &drops)).unwrap();
            created += 1;
        }
        assert_eq!(drops.get(), created - 5);
    }
    assert_eq!(drops.get(), created);
}

#[test]
fn test_pool_backed_teardown() {
    let drops = Rc::new(Cell::new(0));
    {
        let pool = PoolAllocator::with_chunk_capacity(16);
        let mut vec = MemVec::with_capacity_in(16, pool).unwrap();
        for i in 0..12 {
            vec.push(Tracked::new(i, &drops)).unwrap();
        }
        // Container drop destroys the elements, then the pool drop releases
        // its chunks.
    }
    assert_eq!(drops.get(), 12);
}

#[test]
fn test_growth_never_double_drops() {
    let drops = Rc::new(Cell::new(0));
    {
        let mut vec: MemVec<Tracked> = MemVec::new();
        // 33 pushes walk the capacities 1, 2, 4, 8, 16, 32, 64.
        for i in 0..33 {
            vec.push(Tracked::new(i, &drops)).unwrap();
        }
        assert_eq!(drops.get(), 0);
        assert_eq!(vec.len(), 33);
        assert!(vec.iter().enumerate().all(|(i, t)| t.value == i));
    }
    assert_eq!(drops.get(), 33);
}
