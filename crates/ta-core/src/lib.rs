// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Incremental type-ahead engine
//!
//! A field fetches a coarse candidate set (the primer) for the prefix being
//! typed, refines it locally on every keystroke, renders the refinement
//! through a windowed [`ListView`] and keeps the record identifiers bound to
//! the input in sync with its text.
//!
//! The pure parts (token extraction, matching, request scheduling, cursor
//! arithmetic, selection bookkeeping) live in their own modules; [`field`]
//! wires them into one event loop per field.

pub mod config;
pub mod cursor;
pub mod error;
pub mod field;
pub mod matching;
pub mod primer;
pub mod scheduler;
pub mod selection;
pub mod timers;
pub mod token;
pub mod type_switch;
pub mod virtual_list;

pub use config::{FieldConfig, Strategy};
pub use cursor::Cursor;
pub use error::{CoreError, CoreResult};
pub use field::{
    spawn_field, FieldDeps, FieldHandle, FieldInput, FieldNotification, FieldOptions,
    FieldSnapshot, Key, SpawnedField,
};
pub use selection::Selection;
pub use type_switch::SelectionMode;
pub use virtual_list::{ListView, VirtualList};
