/*
 * Copyright (C) 2026 Fastly, Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

// A slab whose insertions report allocation failure instead of aborting.
// Adapted from https://github.com/tokio-rs/slab (MIT licensed).
//
// Changes:
// * try_insert() grows the table with try_reserve() and hands the value back
//   on failure.
// * take() returns the removed value, or None if the key is vacant.
// * All methods/types we don't use are removed.

use std::fmt;
use std::ops::{Index, IndexMut};

pub struct InsertError<T>(pub T);

impl<T> fmt::Debug for InsertError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsertError").finish_non_exhaustive()
    }
}

pub struct MiniSlab<T> {
    entries: Vec<Entry<T>>,
    len: usize,
    next: usize,
}

enum Entry<T> {
    Vacant(usize),
    Occupied(T),
}

impl<T> MiniSlab<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next: 0,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, key: usize) -> Option<&T> {
        match self.entries.get(key) {
            Some(Entry::Occupied(val)) => Some(val),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, key: usize) -> Option<&mut T> {
        match self.entries.get_mut(key) {
            Some(Entry::Occupied(val)) => Some(val),
            _ => None,
        }
    }

    pub fn try_insert(&mut self, val: T) -> Result<usize, InsertError<T>> {
        let key = self.next;

        if key == self.entries.len() {
            // No vacant slot to reuse, so the table must grow
            if self.entries.try_reserve(1).is_err() {
                return Err(InsertError(val));
            }

            self.entries.push(Entry::Occupied(val));
            self.next = key + 1;
        } else {
            self.next = match self.entries[key] {
                Entry::Vacant(next) => next,
                Entry::Occupied(_) => unreachable!(),
            };
            self.entries[key] = Entry::Occupied(val);
        }

        self.len += 1;

        Ok(key)
    }

    pub fn take(&mut self, key: usize) -> Option<T> {
        let entry = self.entries.get_mut(key)?;

        if let Entry::Vacant(_) = entry {
            return None;
        }

        let prev = std::mem::replace(entry, Entry::Vacant(self.next));
        self.len -= 1;
        self.next = key;

        match prev {
            Entry::Occupied(val) => Some(val),
            Entry::Vacant(_) => unreachable!(),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.len = 0;
        self.next = 0;
    }
}

impl<T> Default for MiniSlab<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for MiniSlab<T> {
    type Output = T;

    #[track_caller]
    fn index(&self, key: usize) -> &Self::Output {
        match self.get(key) {
            Some(val) => val,
            None => panic!("invalid key"),
        }
    }
}

impl<T> IndexMut<usize> for MiniSlab<T> {
    #[track_caller]
    fn index_mut(&mut self, key: usize) -> &mut Self::Output {
        match self.get_mut(key) {
            Some(val) => val,
            None => panic!("invalid key"),
        }
    }
}
