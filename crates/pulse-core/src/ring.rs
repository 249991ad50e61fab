//! Buffer FIFO acotado usado por ambas historias (bus y state).
//!
//! Semántica: `push` descarta el elemento más antiguo cuando el buffer está
//! lleno; `pop_last` retira el más reciente (lo usa el time travel, que
//! deshace en orden LIFO).

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct Ring<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> Ring<T> {
    pub fn new(capacity: usize) -> Self {
        // capacidad mínima 1: un ring de cero elementos no tiene sentido
        let capacity = capacity.max(1);
        Self { items: VecDeque::with_capacity(capacity.min(64)),
               capacity }
    }

    /// Añade al final; si el buffer está lleno, expulsa el más antiguo.
    pub fn push(&mut self, item: T) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    /// Retira y devuelve el elemento más reciente.
    pub fn pop_last(&mut self) -> Option<T> {
        self.items.pop_back()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterador del más antiguo al más reciente.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
