// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::collections::BTreeMap;

use ta_domain_types::{Candidate, RecordType};
use tokio::sync::{mpsc, oneshot};
use tracing::error;

use super::events::{FieldInput, FieldSnapshot, Key};
use super::LoopMsg;
use crate::error::{CoreError, CoreResult};

/// Cloneable sender side of a running field. The field stops once every
/// handle is dropped and no timer or request is outstanding.
#[derive(Debug, Clone)]
pub struct FieldHandle {
    tx: mpsc::UnboundedSender<LoopMsg>,
}

impl FieldHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<LoopMsg>) -> Self {
        Self { tx }
    }

    pub fn send(&self, input: FieldInput) -> CoreResult<()> {
        self.tx.send(LoopMsg::Host(input)).map_err(|_| CoreError::FieldClosed)
    }

    pub fn focus(&self) -> CoreResult<()> {
        self.send(FieldInput::Focus)
    }

    pub fn blur(&self) -> CoreResult<()> {
        self.send(FieldInput::Blur)
    }

    pub fn click(&self) -> CoreResult<()> {
        self.send(FieldInput::Click)
    }

    pub fn input(&self, value: impl Into<String>) -> CoreResult<()> {
        self.send(FieldInput::Input(value.into()))
    }

    pub fn key_up(&self) -> CoreResult<()> {
        self.send(FieldInput::KeyUp)
    }

    pub fn scroll_to(&self, offset: usize) -> CoreResult<()> {
        self.send(FieldInput::ScrollTo(offset))
    }

    pub fn select_row(&self, slot: usize) -> CoreResult<()> {
        self.send(FieldInput::SelectRow(slot))
    }

    pub fn set_ignore_input(&self, ignore: bool) -> CoreResult<()> {
        self.send(FieldInput::SetIgnoreInput(ignore))
    }

    pub fn push_geocoded_primer(&self, places: Vec<Candidate>) -> CoreResult<()> {
        self.send(FieldInput::GeocodedPrimer(places))
    }

    /// Deliver a key press; resolves to whether the field consumed it, in
    /// which case the host must not apply the key's default action
    pub async fn key_down(&self, key: Key) -> CoreResult<bool> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(LoopMsg::KeyDown { key, reply })
            .map_err(|_| CoreError::FieldClosed)?;
        rx.await.map_err(|_| CoreError::FieldClosed)
    }

    /// Swap to the record type named `record_type`
    pub fn swap_type(
        &self,
        record_type: &str,
        request_params: Option<BTreeMap<String, String>>,
        keep_binding: bool,
    ) -> CoreResult<()> {
        let record_type: RecordType = record_type.parse().map_err(|err| {
            error!(%err, "type swap to an unknown record type");
            CoreError::from(err)
        })?;
        self.send(FieldInput::Swap {
            record_type,
            request_params,
            keep_binding,
        })
    }

    pub async fn snapshot(&self) -> CoreResult<FieldSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(LoopMsg::Snapshot(reply))
            .map_err(|_| CoreError::FieldClosed)?;
        rx.await.map_err(|_| CoreError::FieldClosed)
    }

    /// Stop the field, cancelling its timers and requests
    pub fn shutdown(&self) -> CoreResult<()> {
        self.tx.send(LoopMsg::Shutdown).map_err(|_| CoreError::FieldClosed)
    }
}
