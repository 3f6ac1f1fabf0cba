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

pub mod bytes;
pub mod core;
pub mod error;
pub mod ffi;
pub mod linked_list;
pub mod ownership;

pub use bytes::{ByteList, Callbacks};
pub use error::Error;
pub use linked_list::{DeepList, LinkedList, RawList};
pub use ownership::{Deep, DeepCopy, Ownership, Shallow};
