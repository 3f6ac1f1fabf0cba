/*
 * Copyright (C) 2020-2023 Fanout, Inc.
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

//! Key-linked list primitives.
//!
//! Nodes live in caller-provided storage indexed by `usize` keys. A [`List`]
//! only records the head and tail keys; linking and unlinking rewrite the
//! `prev`/`next` keys of the affected nodes.

use log::trace;
use std::ops::{Index, IndexMut};

pub struct Node<T> {
    pub prev: Option<usize>,
    pub next: Option<usize>,
    pub value: T,
}

impl<T> Node<T> {
    pub fn new(value: T) -> Self {
        Self {
            prev: None,
            next: None,
            value,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct List {
    pub head: Option<usize>,
    pub tail: Option<usize>,
}

impl List {
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Links `key` directly after `after`, or at the head if `after` is None.
    pub fn insert<T, S>(&mut self, nodes: &mut S, after: Option<usize>, key: usize)
    where
        S: IndexMut<usize, Output = Node<T>>,
    {
        let next = if let Some(pkey) = after {
            let pn = &mut nodes[pkey];

            let next = pn.next;
            pn.next = Some(key);

            let n = &mut nodes[key];
            n.prev = Some(pkey);

            next
        } else {
            let next = self.head;
            self.head = Some(key);

            let n = &mut nodes[key];
            n.prev = None;

            next
        };

        let n = &mut nodes[key];
        n.next = next;

        if let Some(nkey) = next {
            let nn = &mut nodes[nkey];

            nn.prev = Some(key);
        } else {
            self.tail = Some(key);
        }
    }

    pub fn remove<T, S>(&mut self, nodes: &mut S, key: usize)
    where
        S: IndexMut<usize, Output = Node<T>>,
    {
        let n = &mut nodes[key];

        let prev = n.prev.take();
        let next = n.next.take();

        if let Some(pkey) = prev {
            let pn = &mut nodes[pkey];
            pn.next = next;
        }

        if let Some(nkey) = next {
            let nn = &mut nodes[nkey];
            nn.prev = prev;
        }

        if self.head == Some(key) {
            self.head = next;
        }

        if self.tail == Some(key) {
            self.tail = prev;
        }
    }

    pub fn push_front<T, S>(&mut self, nodes: &mut S, key: usize)
    where
        S: IndexMut<usize, Output = Node<T>>,
    {
        self.insert(nodes, None, key);
    }

    pub fn push_back<T, S>(&mut self, nodes: &mut S, key: usize)
    where
        S: IndexMut<usize, Output = Node<T>>,
    {
        self.insert(nodes, self.tail, key);
    }

    /// Returns the key of the node at position `idx`, walking from whichever
    /// end is nearer. `len` must be the number of linked nodes.
    pub fn iterate_to<T, S>(&self, nodes: &S, len: usize, idx: usize) -> Option<usize>
    where
        S: Index<usize, Output = Node<T>>,
    {
        if idx >= len {
            return None;
        }

        if idx < len / 2 {
            trace!("walking {} steps forward from head", idx);

            let mut cur = self.head?;
            for _ in 0..idx {
                cur = nodes[cur].next?;
            }

            Some(cur)
        } else {
            let steps = len - 1 - idx;

            trace!("walking {} steps backward from tail", steps);

            let mut cur = self.tail?;
            for _ in 0..steps {
                cur = nodes[cur].prev?;
            }

            Some(cur)
        }
    }

    pub fn iter<'a, T, S>(&self, nodes: &'a S) -> ListIterator<'a, S>
    where
        S: Index<usize, Output = Node<T>>,
    {
        ListIterator {
            nodes,
            front: self.head,
            back: self.tail,
        }
    }
}

pub struct ListIterator<'a, S> {
    nodes: &'a S,
    front: Option<usize>,
    back: Option<usize>,
}

impl<'a, T, S> Iterator for ListIterator<'a, S>
where
    T: 'a,
    S: Index<usize, Output = Node<T>>,
{
    type Item = (usize, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.front?;
        let n = &self.nodes[key];

        if self.back == Some(key) {
            // Cursors met
            self.front = None;
            self.back = None;
        } else {
            self.front = n.next;
        }

        Some((key, &n.value))
    }
}

impl<'a, T, S> DoubleEndedIterator for ListIterator<'a, S>
where
    T: 'a,
    S: Index<usize, Output = Node<T>>,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        let key = self.back?;
        let n = &self.nodes[key];

        if self.front == Some(key) {
            self.front = None;
            self.back = None;
        } else {
            self.back = n.prev;
        }

        Some((key, &n.value))
    }
}
