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

//! C interface to [`ByteList`].
//!
//! Mutating functions return `true` if an error occurred. Getters return a
//! `malloc`ed copy of the element that the caller must `free`, or null.
//! A null list handle is rejected the same way: mutators return `true`,
//! getters return null and `linked_list_size` returns 0.
//!
//! If callbacks are given, `clone_elem` must return null or a `malloc`ed
//! block of `elem_size` bytes, which the list adopts and frees. `free_elem`
//! must only release what the element refers to, not the element's own
//! storage.

use crate::bytes::{ByteList, Callbacks};
use crate::ownership::Ownership;
use libc::{c_void, size_t};
use log::debug;
use std::ptr;
use std::slice;

pub type CloneElemFn = unsafe extern "C" fn(elem: *const c_void) -> *mut c_void;
pub type FreeElemFn = unsafe extern "C" fn(elem: *mut c_void);

fn c_callbacks(elem_size: usize, clone_elem: CloneElemFn, free_elem: FreeElemFn) -> Callbacks {
    let cloner = move |elem: &[u8]| -> Option<Box<[u8]>> {
        let p = unsafe { clone_elem(elem.as_ptr() as *const c_void) };

        if p.is_null() {
            return None;
        }

        // SAFETY: clone_elem promises a block of elem_size bytes
        let out = unsafe { slice::from_raw_parts(p as *const u8, elem_size) }
            .to_vec()
            .into_boxed_slice();

        unsafe { libc::free(p) };

        Some(out)
    };

    let destroyer = move |elem: &mut [u8]| unsafe { free_elem(elem.as_mut_ptr() as *mut c_void) };

    Callbacks::new(cloner, destroyer)
}

unsafe fn elem_slice<'a>(list: &ByteList, elem: *const c_void) -> Option<&'a [u8]> {
    if elem.is_null() {
        return None;
    }

    Some(slice::from_raw_parts(elem as *const u8, list.elem_size()))
}

// Moves value into the C block p. If p is null, value is released through
// the list's policy so nested resources are not leaked.
unsafe fn adopt(list: &ByteList, value: Box<[u8]>, p: *mut c_void) -> *mut c_void {
    if p.is_null() {
        debug!("failed to allocate {} bytes for returned element", value.len());

        list.policy().release(value);

        return ptr::null_mut();
    }

    ptr::copy_nonoverlapping(value.as_ptr(), p as *mut u8, value.len());

    p
}

fn to_c(list: &ByteList, value: Option<Box<[u8]>>) -> *mut c_void {
    let Some(value) = value else {
        return ptr::null_mut();
    };

    unsafe {
        let p = libc::malloc(value.len());

        adopt(list, value, p)
    }
}

#[no_mangle]
pub unsafe extern "C" fn linked_list_create(
    elem_size: size_t,
    clone_elem: Option<CloneElemFn>,
    free_elem: Option<FreeElemFn>,
) -> *mut ByteList {
    let callbacks = match (clone_elem, free_elem) {
        (Some(clone_elem), Some(free_elem)) => Some(c_callbacks(elem_size, clone_elem, free_elem)),
        (None, None) => None,
        _ => {
            debug!("clone_elem and free_elem must be set together");

            return ptr::null_mut();
        }
    };

    match ByteList::create(elem_size, callbacks) {
        Ok(list) => Box::into_raw(Box::new(list)),
        Err(e) => {
            debug!("failed to create list: {}", e);

            ptr::null_mut()
        }
    }
}

#[no_mangle]
pub unsafe extern "C" fn linked_list_free(list: *mut ByteList) {
    if !list.is_null() {
        Box::from_raw(list).free();
    }
}

#[no_mangle]
pub unsafe extern "C" fn linked_list_size(list: *const ByteList) -> size_t {
    if list.is_null() {
        return 0;
    }

    (*list).len()
}

#[no_mangle]
pub unsafe extern "C" fn linked_list_push_first(list: *mut ByteList, elem: *const c_void) -> bool {
    let Some(list) = list.as_mut() else {
        return true;
    };

    match elem_slice(list, elem) {
        Some(elem) => list.push_first(elem).is_err(),
        None => true,
    }
}

#[no_mangle]
pub unsafe extern "C" fn linked_list_push_last(list: *mut ByteList, elem: *const c_void) -> bool {
    let Some(list) = list.as_mut() else {
        return true;
    };

    match elem_slice(list, elem) {
        Some(elem) => list.push_last(elem).is_err(),
        None => true,
    }
}

#[no_mangle]
pub unsafe extern "C" fn linked_list_push_at(
    list: *mut ByteList,
    elem: *const c_void,
    idx: size_t,
) -> bool {
    let Some(list) = list.as_mut() else {
        return true;
    };

    match elem_slice(list, elem) {
        Some(elem) => list.push_at(elem, idx).is_err(),
        None => true,
    }
}

#[no_mangle]
pub unsafe extern "C" fn linked_list_get_first(list: *const ByteList) -> *mut c_void {
    let Some(list) = list.as_ref() else {
        return ptr::null_mut();
    };

    to_c(list, list.get_first())
}

#[no_mangle]
pub unsafe extern "C" fn linked_list_get_last(list: *const ByteList) -> *mut c_void {
    let Some(list) = list.as_ref() else {
        return ptr::null_mut();
    };

    to_c(list, list.get_last())
}

#[no_mangle]
pub unsafe extern "C" fn linked_list_get_index(list: *const ByteList, idx: size_t) -> *mut c_void {
    let Some(list) = list.as_ref() else {
        return ptr::null_mut();
    };

    to_c(list, list.get_index(idx))
}

#[no_mangle]
pub unsafe extern "C" fn linked_list_set_first(list: *mut ByteList, elem: *const c_void) -> bool {
    let Some(list) = list.as_mut() else {
        return true;
    };

    match elem_slice(list, elem) {
        Some(elem) => list.set_first(elem).is_err(),
        None => true,
    }
}

#[no_mangle]
pub unsafe extern "C" fn linked_list_set_last(list: *mut ByteList, elem: *const c_void) -> bool {
    let Some(list) = list.as_mut() else {
        return true;
    };

    match elem_slice(list, elem) {
        Some(elem) => list.set_last(elem).is_err(),
        None => true,
    }
}

#[no_mangle]
pub unsafe extern "C" fn linked_list_set_index(
    list: *mut ByteList,
    elem: *const c_void,
    idx: size_t,
) -> bool {
    let Some(list) = list.as_mut() else {
        return true;
    };

    match elem_slice(list, elem) {
        Some(elem) => list.set_index(elem, idx).is_err(),
        None => true,
    }
}

#[no_mangle]
pub unsafe extern "C" fn linked_list_del_first(list: *mut ByteList) -> bool {
    let Some(list) = list.as_mut() else {
        return true;
    };

    list.del_first().is_err()
}

#[no_mangle]
pub unsafe extern "C" fn linked_list_del_last(list: *mut ByteList) -> bool {
    let Some(list) = list.as_mut() else {
        return true;
    };

    list.del_last().is_err()
}

#[no_mangle]
pub unsafe extern "C" fn linked_list_del_index(list: *mut ByteList, idx: size_t) -> bool {
    let Some(list) = list.as_mut() else {
        return true;
    };

    list.del_index(idx).is_err()
}
