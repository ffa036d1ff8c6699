// src/backend/rotation.rs
use std::sync::atomic::{AtomicUsize, Ordering};

/// Hands out items in strict rotation.
#[derive(Debug)]
pub struct RoundRobin<T> {
    items: Vec<T>,
    counter: AtomicUsize,
}

impl<T> RoundRobin<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            counter: AtomicUsize::new(0),
        }
    }

    pub fn next(&self) -> Option<&T> {
        if self.items.is_empty() {
            return None;
        }

        let index = self.counter.fetch_add(1, Ordering::Relaxed) % self.items.len();
        Some(&self.items[index])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
