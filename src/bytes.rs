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

//! Lists of fixed-size byte elements.
//!
//! Without callbacks, elements are copied byte for byte. With callbacks, the
//! cloner produces every stored or returned copy and the destroyer runs on
//! every stored element before its storage is dropped.

use crate::error::Error;
use crate::linked_list::LinkedList;
use crate::ownership::Ownership;
use log::debug;

pub type ByteList = LinkedList<Bytes>;

type Cloner = dyn Fn(&[u8]) -> Option<Box<[u8]>>;
type Destroyer = dyn Fn(&mut [u8]);

/// A cloner/destroyer pair. The two always travel together.
pub struct Callbacks {
    cloner: Box<Cloner>,
    destroyer: Box<Destroyer>,
}

impl Callbacks {
    pub fn new<C, D>(cloner: C, destroyer: D) -> Self
    where
        C: Fn(&[u8]) -> Option<Box<[u8]>> + 'static,
        D: Fn(&mut [u8]) + 'static,
    {
        Self {
            cloner: Box::new(cloner),
            destroyer: Box::new(destroyer),
        }
    }
}

pub struct Bytes {
    elem_size: usize,
    callbacks: Option<Callbacks>,
}

impl Bytes {
    pub fn new(elem_size: usize, callbacks: Option<Callbacks>) -> Result<Self, Error> {
        if elem_size == 0 {
            return Err(Error::ZeroElementSize);
        }

        Ok(Self {
            elem_size,
            callbacks,
        })
    }

    pub fn elem_size(&self) -> usize {
        self.elem_size
    }

    pub fn is_deep(&self) -> bool {
        self.callbacks.is_some()
    }

    fn check_size(&self, elem: &[u8]) -> Result<(), Error> {
        if elem.len() != self.elem_size {
            return Err(Error::ElementSize {
                expected: self.elem_size,
                actual: elem.len(),
            });
        }

        Ok(())
    }
}

fn copy_block(elem: &[u8]) -> Result<Box<[u8]>, Error> {
    let mut v = Vec::new();

    if v.try_reserve_exact(elem.len()).is_err() {
        return Err(Error::Alloc);
    }

    v.extend_from_slice(elem);

    Ok(v.into_boxed_slice())
}

impl Ownership for Bytes {
    type Value = Box<[u8]>;
    type Source = [u8];

    fn duplicate(&self, elem: &[u8]) -> Result<Box<[u8]>, Error> {
        self.check_size(elem)?;

        let Some(callbacks) = &self.callbacks else {
            return copy_block(elem);
        };

        let mut value = (callbacks.cloner)(elem).ok_or(Error::Clone)?;

        if value.len() != self.elem_size {
            debug!(
                "cloner returned {} bytes, expected {}",
                value.len(),
                self.elem_size
            );

            // The copy may still own nested resources
            (callbacks.destroyer)(&mut value[..]);

            return Err(Error::Clone);
        }

        Ok(value)
    }

    fn release(&self, mut value: Box<[u8]>) {
        if let Some(callbacks) = &self.callbacks {
            (callbacks.destroyer)(&mut value[..]);
        }
    }

    fn view(value: &Box<[u8]>) -> &[u8] {
        value
    }

    fn assign(&self, slot: &mut Box<[u8]>, elem: &[u8]) -> Result<(), Error> {
        if self.callbacks.is_none() {
            self.check_size(elem)?;

            // Same size, so reuse the existing block
            slot.copy_from_slice(elem);

            return Ok(());
        }

        let value = self.duplicate(elem)?;

        let old = std::mem::replace(slot, value);
        self.release(old);

        Ok(())
    }
}

impl LinkedList<Bytes> {
    /// Creates an empty list of `elem_size`-byte elements. Pass callbacks if
    /// elements refer to resources that must be copied and released along
    /// with them.
    pub fn create(elem_size: usize, callbacks: Option<Callbacks>) -> Result<Self, Error> {
        Ok(Self::with_policy(Bytes::new(elem_size, callbacks)?))
    }

    pub fn elem_size(&self) -> usize {
        self.policy().elem_size()
    }
}
