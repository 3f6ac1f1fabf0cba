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

//! Copy-ownership policies.
//!
//! A list never stores a caller's value directly. Every value entering the
//! list goes through [`Ownership::duplicate`], every value read out is
//! duplicated again, and every value leaving the list is handed to
//! [`Ownership::release`] exactly once.

use crate::error::Error;
use std::marker::PhantomData;
use std::mem;

pub trait Ownership {
    /// What a node stores.
    type Value;

    /// What callers pass in when inserting or updating.
    type Source: ?Sized;

    fn duplicate(&self, elem: &Self::Source) -> Result<Self::Value, Error>;

    fn release(&self, value: Self::Value);

    fn view(value: &Self::Value) -> &Self::Source;

    /// Replaces the value in `slot` with a copy of `elem`. The old value is
    /// only released once the copy exists.
    fn assign(&self, slot: &mut Self::Value, elem: &Self::Source) -> Result<(), Error> {
        let value = self.duplicate(elem)?;

        let old = mem::replace(slot, value);
        self.release(old);

        Ok(())
    }
}

/// Plain bitwise copies for values with no nested ownership.
pub struct Shallow<T>(PhantomData<fn() -> T>);

impl<T> Default for Shallow<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<T: Copy> Ownership for Shallow<T> {
    type Value = T;
    type Source = T;

    fn duplicate(&self, elem: &T) -> Result<T, Error> {
        Ok(*elem)
    }

    fn release(&self, _value: T) {}

    fn view(value: &T) -> &T {
        value
    }

    fn assign(&self, slot: &mut T, elem: &T) -> Result<(), Error> {
        *slot = *elem;

        Ok(())
    }
}

/// Values that own nested resources and know how to copy and release them.
pub trait DeepCopy: Sized {
    /// Returns an independent copy, or None if one could not be made.
    fn deep_clone(&self) -> Option<Self>;

    /// Releases nested resources. Called once, right before the value is
    /// dropped by the list.
    fn release(&mut self) {}
}

pub struct Deep<T>(PhantomData<fn() -> T>);

impl<T> Default for Deep<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<T: DeepCopy> Ownership for Deep<T> {
    type Value = T;
    type Source = T;

    fn duplicate(&self, elem: &T) -> Result<T, Error> {
        elem.deep_clone().ok_or(Error::Clone)
    }

    fn release(&self, mut value: T) {
        value.release();
    }

    fn view(value: &T) -> &T {
        value
    }
}
