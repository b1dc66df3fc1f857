// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]
#![allow(clippy::too_many_arguments)]

//! # aclscope
//!
//! [![Crates.io](https://img.shields.io/crates/v/aclscope.svg)](https://crates.io/crates/aclscope)
//! [![Documentation](https://docs.rs/aclscope/badge.svg)](https://docs.rs/aclscope)
//! [![License](https://img.shields.io/badge/license-Apache--2.0-blue.svg)](https://github.com/BinFlip/aclscope/blob/main/LICENSE-APACHE)
//!
//! A cross-platform library for parsing, querying and mutating Windows-style security
//! descriptors and access-control lists. Built in pure Rust, `aclscope` implements the
//! MS-DTYP binary layouts (SIDs, ACEs, ACLs, self-relative security descriptors) and the
//! rule engine layered on top of them - allow / deny / audit rules, object-typed
//! (GUID-scoped) entries, inheritance and propagation semantics - without requiring
//! Windows or any OS security API.
//!
//! ## Features
//!
//! - **📦 Faithful wire formats** - byte-exact SID, ACE, ACL and security descriptor codecs
//! - **🔍 Rule-level API** - immutable, validated rule value objects instead of raw ACE bits
//! - **🧩 Object-typed entries** - GUID-scoped directory-service ACEs, including the
//!   legacy-to-DS ACL revision upgrade
//! - **🛡️ Consistent snapshots** - reader/writer-locked container with fully detached
//!   query results
//! - **🔧 Cross-platform** - no FFI; works anywhere Rust does
//!
//! ## Quick Start
//!
//! Add `aclscope` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! aclscope = "0.2"
//! ```
//!
//! ### Using the Prelude
//!
//! ```rust
//! use std::sync::Arc;
//! use aclscope::prelude::*;
//!
//! let security = DirectoryObjectSecurity::new(
//!     Arc::new(AccountDirectory::new()),
//!     StandardRuleFactory,
//! );
//!
//! let rule = AccessRule::new(
//!     SecurityIdentifier::world().into(),
//!     0x1F01FF,
//!     false,
//!     InheritanceFlags::empty(),
//!     PropagationFlags::empty(),
//!     AccessControlType::Allow,
//! )?;
//! security.add_access_rule(&rule)?;
//!
//! let rules = security.get_access_rules(true, true, IdentityKind::Sid)?;
//! assert_eq!(rules.len(), 1);
//! # Ok::<(), aclscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `aclscope` is organized into several key modules:
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`identity`] - SIDs, identity references and translation between identity kinds
//! - [`acl`] - ACE / ACL object model, binary codecs and qualified mutation semantics
//! - [`descriptor`] - the security descriptor and its self-relative binary form
//! - [`rules`] - validated rule value objects and query result collections
//! - [`objectsecurity`] - the locked securable-object container tying it all together
//! - [`Error`] and [`Result`] - Comprehensive error handling
//!
//! ### Layering
//!
//! The [`objectsecurity::DirectoryObjectSecurity`] container is the main entry point. It
//! owns one security descriptor, serializes every structural change under an exclusive
//! lock, resolves identities through a caller-supplied [`identity::IdentityResolver`],
//! and materializes query snapshots through a caller-supplied
//! [`objectsecurity::RuleFactory`]. Everything below it - descriptors, ACLs, ACEs, SIDs -
//! is plain owned data with faithful binary round-trips.
//!
//! ## Standards Compliance
//!
//! The binary layouts implement **MS-DTYP** (Windows Data Types): SIDs per 2.4.2, ACEs per
//! 2.4.4, ACLs per 2.4.5 and self-relative security descriptors per 2.4.6.
//!
//! ### References
//!
//! - [MS-DTYP](https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-dtyp/cca27429-5689-4a16-b2b4-9325d93e4ba2) - Windows Data Types specification
//! - [Order of ACEs in a DACL](https://learn.microsoft.com/en-us/windows/win32/secauthz/order-of-aces-in-a-dacl)
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result) with comprehensive error information:
//!
//! ```rust
//! use aclscope::{acl::RawAcl, Error};
//!
//! match RawAcl::from_bytes(&[0x02, 0x00]) {
//!     Ok(acl) => println!("parsed {} entries", acl.count()),
//!     Err(Error::OutOfBounds) => println!("buffer too small"),
//!     Err(Error::Malformed { message, .. }) => println!("malformed ACL: {}", message),
//!     Err(e) => println!("other error: {}", e),
//! }
//! ```

#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
///
/// This module provides a curated selection of the most frequently used types
/// from across the aclscope library, allowing for convenient glob imports.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use aclscope::prelude::*;
///
/// let security = DirectoryObjectSecurity::new(
///     Arc::new(AccountDirectory::new()),
///     StandardRuleFactory,
/// );
/// assert!(!security.access_rules_modified()?);
/// # Ok::<(), aclscope::Error>(())
/// ```
pub mod prelude;

/// Access-control lists and entries: binary codecs and qualified mutation semantics
///
/// This module provides the ACE/ACL layer: the MS-DTYP wire formats and the
/// supersede / exact-removal / purge semantics the securable-object container drives.
///
/// # Key Types
///
/// - [`acl::Ace`] - one access-control entry
/// - [`acl::RawAcl`] - ordered entry list with the ACL wire codec
/// - [`acl::DiscretionaryAcl`] / [`acl::SystemAcl`] - allow/deny and audit surfaces
pub mod acl;

/// The security descriptor: owner, group and the DACL / SACL pair
///
/// # Key Types
///
/// - [`descriptor::SecurityDescriptor`] - the owned state with its binary codec
/// - [`descriptor::ControlFlags`] - the 16-bit control word with the ACL presence bits
pub mod descriptor;

/// Principal identities: SIDs, identity references and translation
///
/// # Key Types
///
/// - [`identity::SecurityIdentifier`] - the canonical on-wire identity
/// - [`identity::IdentityReference`] / [`identity::IdentityKind`] - the identity union
/// - [`identity::IdentityResolver`] / [`identity::AccountDirectory`] - translation
pub mod identity;

/// The securable-object rule container and its rule factory capability
///
/// # Key Types
///
/// - [`objectsecurity::DirectoryObjectSecurity`] - the locked container
/// - [`objectsecurity::RuleFactory`] / [`objectsecurity::StandardRuleFactory`]
pub mod objectsecurity;

/// Validated rule value objects and query result collections
///
/// # Key Types
///
/// - [`rules::AccessRule`] / [`rules::AuditRule`] - the two rule value types
/// - [`rules::AuthorizationRuleCollection`] - immutable ordered query result
pub mod rules;

/// The result type used throughout this crate, wrapping [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

pub use error::Error;
