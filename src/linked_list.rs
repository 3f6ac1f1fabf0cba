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

use crate::core::list::{List, ListIterator, Node};
use crate::core::minislab::{InsertError, MiniSlab};
use crate::error::Error;
use crate::ownership::{Deep, Ownership, Shallow};
use log::debug;
use std::fmt;

pub type RawList<T> = LinkedList<Shallow<T>>;
pub type DeepList<T> = LinkedList<Deep<T>>;

/// A doubly linked list that owns copies of its elements.
///
/// Nodes are kept in an arena and linked by key. How elements are copied in
/// and out, and how they are released, is decided by the policy `P`.
///
/// Reads (`get_*`) always return independent copies. Borrowed access is
/// available through [`LinkedList::iter`].
pub struct LinkedList<P: Ownership> {
    nodes: MiniSlab<Node<P::Value>>,
    links: List,
    len: usize,
    policy: P,
}

impl<P: Ownership + Default> LinkedList<P> {
    pub fn new() -> Self {
        Self::with_policy(P::default())
    }
}

impl<P: Ownership + Default> Default for LinkedList<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Ownership> LinkedList<P> {
    pub fn with_policy(policy: P) -> Self {
        Self {
            nodes: MiniSlab::new(),
            links: List::default(),
            len: 0,
            policy,
        }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // Produces an unlinked node holding a copy of elem
    fn create_node(&mut self, elem: &P::Source) -> Result<usize, Error> {
        let value = match self.policy.duplicate(elem) {
            Ok(value) => value,
            Err(e) => {
                debug!("failed to copy element in: {}", e);

                return Err(e);
            }
        };

        match self.nodes.try_insert(Node::new(value)) {
            Ok(key) => Ok(key),
            Err(InsertError(node)) => {
                debug!("failed to allocate node");

                self.policy.release(node.value);

                Err(Error::Alloc)
            }
        }
    }

    // Node must already be unlinked
    fn free_node(&mut self, key: usize) {
        if let Some(node) = self.nodes.take(key) {
            self.policy.release(node.value);
        }
    }

    fn unlink(&mut self, key: usize) {
        self.links.remove(&mut self.nodes, key);
        self.free_node(key);

        self.len -= 1;
    }

    fn locate(&self, idx: usize) -> Result<usize, Error> {
        if self.len == 0 {
            return Err(Error::Empty);
        }

        self.links
            .iterate_to(&self.nodes, self.len, idx)
            .ok_or(Error::OutOfRange {
                index: idx,
                len: self.len,
            })
    }

    fn copy_out(&self, key: usize) -> Option<P::Value> {
        let value = &self.nodes[key].value;

        match self.policy.duplicate(P::view(value)) {
            Ok(v) => Some(v),
            Err(e) => {
                debug!("failed to copy element out: {}", e);

                None
            }
        }
    }

    pub fn push_first(&mut self, elem: &P::Source) -> Result<(), Error> {
        let key = self.create_node(elem)?;

        self.links.push_front(&mut self.nodes, key);
        self.len += 1;

        Ok(())
    }

    pub fn push_last(&mut self, elem: &P::Source) -> Result<(), Error> {
        let key = self.create_node(elem)?;

        self.links.push_back(&mut self.nodes, key);
        self.len += 1;

        Ok(())
    }

    /// Inserts a copy of `elem` so that it ends up at position `idx`.
    /// `idx` may equal the length, in which case this appends.
    pub fn push_at(&mut self, elem: &P::Source, idx: usize) -> Result<(), Error> {
        if idx > self.len {
            debug!("push at {} rejected, len {}", idx, self.len);

            return Err(Error::OutOfRange {
                index: idx,
                len: self.len,
            });
        }

        if idx == 0 {
            return self.push_first(elem);
        }

        if idx == self.len {
            return self.push_last(elem);
        }

        let cur = self.locate(idx)?;
        let after = self.nodes[cur].prev;

        let key = self.create_node(elem)?;

        self.links.insert(&mut self.nodes, after, key);
        self.len += 1;

        Ok(())
    }

    pub fn get_first(&self) -> Option<P::Value> {
        self.copy_out(self.links.head?)
    }

    pub fn get_last(&self) -> Option<P::Value> {
        self.copy_out(self.links.tail?)
    }

    pub fn get_index(&self, idx: usize) -> Option<P::Value> {
        let key = self.links.iterate_to(&self.nodes, self.len, idx)?;

        self.copy_out(key)
    }

    pub fn set_first(&mut self, elem: &P::Source) -> Result<(), Error> {
        self.set_index(elem, 0)
    }

    pub fn set_last(&mut self, elem: &P::Source) -> Result<(), Error> {
        if self.len == 0 {
            debug!("set last rejected: {}", Error::Empty);

            return Err(Error::Empty);
        }

        self.set_index(elem, self.len - 1)
    }

    /// Replaces the element at `idx` with a copy of `elem`. If the copy
    /// fails, the existing element is left in place.
    pub fn set_index(&mut self, elem: &P::Source, idx: usize) -> Result<(), Error> {
        let key = match self.locate(idx) {
            Ok(key) => key,
            Err(e) => {
                debug!("set at {} rejected: {}", idx, e);

                return Err(e);
            }
        };

        self.policy.assign(&mut self.nodes[key].value, elem)
    }

    pub fn del_first(&mut self) -> Result<(), Error> {
        let Some(key) = self.links.head else {
            debug!("del first rejected: {}", Error::Empty);

            return Err(Error::Empty);
        };

        self.unlink(key);

        Ok(())
    }

    pub fn del_last(&mut self) -> Result<(), Error> {
        let Some(key) = self.links.tail else {
            debug!("del last rejected: {}", Error::Empty);

            return Err(Error::Empty);
        };

        self.unlink(key);

        Ok(())
    }

    pub fn del_index(&mut self, idx: usize) -> Result<(), Error> {
        let key = match self.locate(idx) {
            Ok(key) => key,
            Err(e) => {
                debug!("delete at {} rejected: {}", idx, e);

                return Err(e);
            }
        };

        self.unlink(key);

        Ok(())
    }

    /// Releases every element, leaving the list empty and usable.
    pub fn clear(&mut self) {
        let mut next = self.links.head;

        while let Some(key) = next {
            next = self.nodes[key].next;
            self.free_node(key);
        }

        self.nodes.clear();
        self.links = List::default();
        self.len = 0;
    }

    /// Releases every element and the list itself.
    pub fn free(self) {
        drop(self)
    }

    pub fn iter(&self) -> Iter<'_, P::Value> {
        Iter {
            inner: self.links.iter(&self.nodes),
            remaining: self.len,
        }
    }
}

impl<P: Ownership> Drop for LinkedList<P> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<P: Ownership> fmt::Debug for LinkedList<P>
where
    P::Value: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, P: Ownership> IntoIterator for &'a LinkedList<P> {
    type Item = &'a P::Value;
    type IntoIter = Iter<'a, P::Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct Iter<'a, T> {
    inner: ListIterator<'a, MiniSlab<Node<T>>>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let (_, value) = self.inner.next()?;
        self.remaining -= 1;

        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let (_, value) = self.inner.next_back()?;
        self.remaining -= 1;

        Some(value)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ownership::DeepCopy;
    use std::cell::Cell;
    use std::rc::Rc;
    use test_log::test;

    fn setup() -> RawList<u32> {
        RawList::new()
    }

    fn contents(l: &RawList<u32>) -> Vec<u32> {
        l.iter().copied().collect()
    }

    fn check_links<P: Ownership>(l: &LinkedList<P>) {
        if l.len == 0 {
            assert_eq!(l.links.head, None);
            assert_eq!(l.links.tail, None);
            return;
        }

        let head = l.links.head.unwrap();
        let tail = l.links.tail.unwrap();
        assert_eq!(l.nodes[head].prev, None);
        assert_eq!(l.nodes[tail].next, None);

        let mut cur = head;
        for _ in 0..(l.len - 1) {
            cur = l.nodes[cur].next.unwrap();
        }
        assert_eq!(cur, tail);

        let mut cur = tail;
        for _ in 0..(l.len - 1) {
            cur = l.nodes[cur].prev.unwrap();
        }
        assert_eq!(cur, head);

        assert_eq!(l.nodes.len(), l.len);
    }

    #[test]
    fn test_push_get_last() {
        let mut l = setup();

        for i in 0..1024 {
            assert_eq!(l.push_last(&i), Ok(()));
            assert_eq!(l.len(), (i + 1) as usize);
            assert_eq!(l.get_last(), Some(i));
        }

        for i in 0..1024 {
            assert_eq!(l.get_index(i as usize), Some(i));
        }

        check_links(&l);
        l.free();
    }

    #[test]
    fn test_push_get_first() {
        let mut l = setup();

        for i in 0..1024 {
            assert_eq!(l.push_first(&i), Ok(()));
            assert_eq!(l.len(), (i + 1) as usize);
            assert_eq!(l.get_first(), Some(i));
        }

        for i in 0..1024 {
            assert_eq!(l.get_index(i as usize), Some(1023 - i));
        }

        check_links(&l);
        l.free();
    }

    #[test]
    fn test_push_get_index() {
        let mut l = setup();
        l.push_last(&0).unwrap();
        l.push_last(&0).unwrap();

        for i in 1..=1024 {
            assert_eq!(l.push_at(&i, 1), Ok(()));
            assert_eq!(l.len(), (i + 2) as usize);
            assert_eq!(l.get_index(1), Some(i));
        }

        assert_eq!(l.get_first(), Some(0));
        assert_eq!(l.get_last(), Some(0));

        check_links(&l);
        l.free();
    }

    #[test]
    fn test_push_at_bounds() {
        let mut l = setup();

        assert_eq!(
            l.push_at(&0, 1),
            Err(Error::OutOfRange { index: 1, len: 0 })
        );
        assert_eq!(l.len(), 0);

        // Index equal to the length appends
        l.push_at(&1, 0).unwrap();
        l.push_at(&3, 1).unwrap();
        l.push_at(&2, 1).unwrap();
        l.push_at(&0, 0).unwrap();
        assert_eq!(contents(&l), vec![0, 1, 2, 3]);

        assert_eq!(
            l.push_at(&9, 5),
            Err(Error::OutOfRange { index: 5, len: 4 })
        );
        assert_eq!(contents(&l), vec![0, 1, 2, 3]);

        check_links(&l);
        l.free();
    }

    #[test]
    fn test_empty() {
        let mut l = setup();

        assert_eq!(l.get_first(), None);
        assert_eq!(l.get_last(), None);
        assert_eq!(l.get_index(0), None);
        assert_eq!(l.set_first(&1), Err(Error::Empty));
        assert_eq!(l.set_last(&1), Err(Error::Empty));
        assert_eq!(l.set_index(&1, 0), Err(Error::Empty));
        assert_eq!(l.del_first(), Err(Error::Empty));
        assert_eq!(l.del_last(), Err(Error::Empty));
        assert_eq!(l.del_index(0), Err(Error::Empty));
        assert_eq!(l.len(), 0);

        check_links(&l);
        l.free();
    }

    #[test]
    fn test_get_out_of_bounds() {
        let mut l = setup();
        l.push_first(&0).unwrap();

        assert_eq!(l.get_index(1), None);
        assert_eq!(
            l.set_index(&1, 1),
            Err(Error::OutOfRange { index: 1, len: 1 })
        );
        assert_eq!(
            l.del_index(1),
            Err(Error::OutOfRange { index: 1, len: 1 })
        );
        assert_eq!(contents(&l), vec![0]);

        l.free();
    }

    #[test]
    fn test_push_set_first() {
        let mut l = setup();

        for i in 0..1024 {
            l.push_first(&0).unwrap();
            assert_eq!(l.len(), i + 1);
            assert_eq!(l.get_first(), Some(0));

            assert_eq!(l.set_first(&1), Ok(()));
            assert_eq!(l.len(), i + 1);
            assert_eq!(l.get_first(), Some(1));
        }

        assert!(l.iter().all(|v| *v == 1));

        l.free();
    }

    #[test]
    fn test_scenario() {
        let mut l = setup();

        l.push_last(&10).unwrap();
        l.push_last(&20).unwrap();
        l.push_first(&5).unwrap();
        assert_eq!(contents(&l), vec![5, 10, 20]);
        assert_eq!(l.len(), 3);
        assert_eq!(l.get_index(1), Some(10));

        l.del_index(1).unwrap();
        assert_eq!(contents(&l), vec![5, 20]);
        assert_eq!(l.len(), 2);

        l.set_first(&99).unwrap();
        assert_eq!(contents(&l), vec![99, 20]);

        l.set_last(&7).unwrap();
        assert_eq!(contents(&l), vec![99, 7]);

        check_links(&l);
        l.free();
    }

    #[test]
    fn test_insert_delete_pair() {
        let mut l = setup();
        for i in 0..8 {
            l.push_last(&i).unwrap();
        }

        let before = contents(&l);

        for idx in 0..=8 {
            l.push_at(&100, idx).unwrap();
            assert_eq!(l.get_index(idx), Some(100));
            l.del_index(idx).unwrap();

            assert_eq!(contents(&l), before);
            check_links(&l);
        }

        l.free();
    }

    #[test]
    fn test_round_trip_last() {
        let mut l = setup();
        l.push_last(&1).unwrap();
        l.push_last(&2).unwrap();

        let before = contents(&l);

        l.push_last(&42).unwrap();
        let v = l.get_last();
        l.del_last().unwrap();

        assert_eq!(v, Some(42));
        assert_eq!(contents(&l), before);

        l.free();
    }

    #[test]
    fn test_delete_ends() {
        let mut l = setup();
        for i in 0..5 {
            l.push_last(&i).unwrap();
        }

        l.del_first().unwrap();
        l.del_last().unwrap();
        assert_eq!(contents(&l), vec![1, 2, 3]);

        l.del_index(2).unwrap();
        l.del_index(0).unwrap();
        assert_eq!(contents(&l), vec![2]);
        check_links(&l);

        l.del_last().unwrap();
        assert_eq!(l.is_empty(), true);
        check_links(&l);

        // Slots are reused after deletion
        l.push_last(&8).unwrap();
        assert_eq!(contents(&l), vec![8]);
        check_links(&l);

        l.free();
    }

    #[test]
    fn test_iter() {
        let mut l = setup();
        for i in 0..4 {
            l.push_last(&i).unwrap();
        }

        assert_eq!(l.iter().len(), 4);
        assert_eq!(l.iter().rev().copied().collect::<Vec<_>>(), vec![3, 2, 1, 0]);
        assert_eq!((&l).into_iter().sum::<u32>(), 6);
        assert_eq!(format!("{:?}", l), "[0, 1, 2, 3]");

        l.clear();
        assert_eq!(l.len(), 0);
        assert_eq!(l.iter().next(), None);

        l.push_last(&5).unwrap();
        assert_eq!(contents(&l), vec![5]);

        l.free();
    }

    #[derive(Default)]
    struct Registry {
        live: Cell<usize>,
        clones: Cell<usize>,
        fail: Cell<bool>,
    }

    // Owns a heap block and counts live copies in a shared registry
    struct Tracked {
        data: Box<[u32]>,
        registry: Rc<Registry>,
        released: bool,
    }

    impl Tracked {
        fn new(registry: &Rc<Registry>, v: u32) -> Self {
            Self {
                data: vec![v; 4].into_boxed_slice(),
                registry: Rc::clone(registry),
                released: false,
            }
        }

        fn value(&self) -> u32 {
            self.data[0]
        }
    }

    impl DeepCopy for Tracked {
        fn deep_clone(&self) -> Option<Self> {
            if self.registry.fail.get() {
                return None;
            }

            let r = &self.registry;
            r.live.set(r.live.get() + 1);
            r.clones.set(r.clones.get() + 1);

            Some(Self {
                data: self.data.clone(),
                registry: Rc::clone(r),
                released: false,
            })
        }

        fn release(&mut self) {
            assert!(!self.released, "released twice");
            self.released = true;

            let r = &self.registry;
            r.live.set(r.live.get() - 1);
        }
    }

    fn deep_setup() -> (Rc<Registry>, DeepList<Tracked>) {
        (Rc::new(Registry::default()), DeepList::new())
    }

    #[test]
    fn test_deep_copies_are_independent() {
        let (reg, mut l) = deep_setup();

        let mut src = Tracked::new(&reg, 1);
        l.push_last(&src).unwrap();
        assert_eq!(reg.live.get(), 1);

        // Mutating the source doesn't affect the stored copy
        src.data[0] = 50;
        assert_eq!(l.iter().next().unwrap().value(), 1);

        let mut out = l.get_first().unwrap();
        assert_eq!(out.value(), 1);
        assert_eq!(reg.live.get(), 2);
        assert_eq!(reg.clones.get(), 2);

        // Copies read out are the caller's to release
        out.release();
        assert_eq!(reg.live.get(), 1);

        l.free();
        assert_eq!(reg.live.get(), 0);
    }

    #[test]
    fn test_deep_release_once() {
        let (reg, mut l) = deep_setup();

        for i in 0..10 {
            l.push_last(&Tracked::new(&reg, i)).unwrap();
        }
        assert_eq!(reg.live.get(), 10);

        l.push_at(&Tracked::new(&reg, 100), 5).unwrap();
        l.set_index(&Tracked::new(&reg, 200), 2).unwrap();
        assert_eq!(reg.live.get(), 11);

        l.del_first().unwrap();
        l.del_last().unwrap();
        l.del_index(3).unwrap();
        assert_eq!(reg.live.get(), 8);

        let values: Vec<u32> = l.iter().map(|t| t.value()).collect();
        assert_eq!(values, vec![1, 200, 3, 100, 5, 6, 7, 8]);

        l.clear();
        assert_eq!(reg.live.get(), 0);

        l.push_last(&Tracked::new(&reg, 1)).unwrap();
        l.push_last(&Tracked::new(&reg, 2)).unwrap();

        // Dropping without free releases too
        drop(l);
        assert_eq!(reg.live.get(), 0);
    }

    #[test]
    fn test_deep_clone_failure() {
        let (reg, mut l) = deep_setup();

        l.push_last(&Tracked::new(&reg, 1)).unwrap();
        l.push_last(&Tracked::new(&reg, 2)).unwrap();

        reg.fail.set(true);

        let src = Tracked::new(&reg, 3);
        assert_eq!(l.push_first(&src), Err(Error::Clone));
        assert_eq!(l.push_last(&src), Err(Error::Clone));
        assert_eq!(l.push_at(&src, 1), Err(Error::Clone));
        assert_eq!(l.set_index(&src, 1), Err(Error::Clone));
        assert!(l.get_first().is_none());

        reg.fail.set(false);

        assert_eq!(l.len(), 2);
        assert_eq!(reg.live.get(), 2);

        let values: Vec<u32> = l.iter().map(|t| t.value()).collect();
        assert_eq!(values, vec![1, 2]);

        check_links(&l);
        l.free();
        assert_eq!(reg.live.get(), 0);
    }
}
