// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only
#![allow(clippy::disallowed_methods)] // CLI commands intentionally print to stdout/stderr

//! `ta query`: type into a field and report what it offers

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use ta_config::EngineSettings;
use ta_core::{spawn_field, FieldDeps, FieldHandle, FieldOptions, FieldSnapshot};
use ta_domain_types::RecordType;
use ta_mock_search::MockSearchService;
use ta_rest_client::RestSearchClient;
use ta_search_api::SearchService;
use tracing::debug;

use crate::console_view::ConsoleView;
use crate::parse_pairs;

/// Poll interval while waiting for the field to settle
const POLL: Duration = Duration::from_millis(20);

#[derive(Args, Clone, Debug)]
pub struct QueryArgs {
    /// Record type to search
    #[arg(long = "type", value_enum)]
    pub record_type: RecordType,
    /// Treat the text as a list separated by this string
    #[arg(long)]
    pub separator: Option<String>,
    /// Extra request parameter, e.g. `--param lat=45.5`
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,
    /// Answer from a JSON catalog file instead of the remote service
    #[arg(long)]
    pub mock_catalog: Option<PathBuf>,
    /// Choose this visible row after the list settles
    #[arg(long)]
    pub select: Option<usize>,
    /// Print the full field snapshot as JSON
    #[arg(long)]
    pub json: bool,
    /// Text typed into the field
    pub text: String,
}

impl QueryArgs {
    pub async fn run(self, settings: EngineSettings) -> Result<()> {
        let settings = Arc::new(settings);
        let search = self.search_service(&settings)?;
        let params: BTreeMap<String, String> = parse_pairs(&self.params)?
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let mut options = FieldOptions::new(self.record_type).with_request_params(params);
        if let Some(separator) = &self.separator {
            options = options.with_separator(separator.clone());
        }

        let deps = FieldDeps::new(Arc::clone(&settings), search);
        let view = ConsoleView::new();
        let field = spawn_field(deps, options, view.clone());
        let handle = field.handle;

        handle.focus()?;
        handle.input(self.text.clone())?;
        handle.key_up()?;
        let mut snapshot = settle(&handle, &settings).await?;

        if let Some(row) = self.select {
            let visible = visible_rows(&snapshot, settings.display.window_size);
            if row >= visible {
                bail!("row {row} is not visible ({visible} rows shown)");
            }
            handle.select_row(row)?;
            snapshot = settle(&handle, &settings).await?;
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        } else {
            print_summary(&snapshot, &view);
        }
        handle.shutdown()?;
        Ok(())
    }

    fn search_service(&self, settings: &EngineSettings) -> Result<Arc<dyn SearchService>> {
        match &self.mock_catalog {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading catalog {:?}", path))?;
                let service = MockSearchService::from_catalog_json(&json)
                    .with_context(|| format!("parsing catalog {:?}", path))?;
                Ok(Arc::new(service))
            }
            None => Ok(Arc::new(RestSearchClient::from_settings(&settings.service)?)),
        }
    }
}

/// Wait out the refresh debounce, then until no fetch is in flight
async fn settle(handle: &FieldHandle, settings: &EngineSettings) -> Result<FieldSnapshot> {
    tokio::time::sleep(settings.timing.refresh_delay() + POLL).await;
    let deadline = tokio::time::Instant::now() + settings.service.timeout() + POLL;
    loop {
        let snapshot = handle.snapshot().await?;
        if !snapshot.fetch_in_flight || tokio::time::Instant::now() >= deadline {
            debug!(matches = snapshot.matches.len(), "field settled");
            return Ok(snapshot);
        }
        tokio::time::sleep(POLL).await;
    }
}

/// Rows currently shown in the list window
fn visible_rows(snapshot: &FieldSnapshot, window_size: usize) -> usize {
    snapshot
        .matches
        .len()
        .saturating_sub(snapshot.scroll_offset)
        .min(window_size)
}

fn print_summary(snapshot: &FieldSnapshot, view: &ConsoleView) {
    println!("value: {:?}", snapshot.value);
    println!(
        "primer: {} candidate(s){}",
        snapshot.primer.len(),
        if snapshot.primer_incomplete { ", truncated" } else { "" }
    );
    if view.is_open() {
        print!("{}", view.render());
    } else {
        println!("matches: {}", snapshot.match_names().join(", "));
    }
    println!(
        "{} = {}",
        snapshot.hidden_field,
        snapshot.binding.hidden_value()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use ta_core::SelectionMode;
    use ta_domain_types::{BindingSnapshot, Candidate};

    fn snapshot_with(count: usize, scroll_offset: usize) -> FieldSnapshot {
        FieldSnapshot {
            value: "site".to_string(),
            record_type: RecordType::Location,
            mode: SelectionMode::Regular,
            focused: true,
            primer: Vec::new(),
            primer_incomplete: false,
            fetch_in_flight: false,
            last_request: "site".to_string(),
            matches: (0..count).map(|i| Candidate::new(format!("Site {i}"), i as i64)).collect(),
            current_row: Some(scroll_offset),
            scroll_offset,
            highlight: Some(0),
            open: true,
            binding: BindingSnapshot::Single { record: None },
            kept: Vec::new(),
            hidden_field: "location_id".to_string(),
            create_link_visible: false,
        }
    }

    #[test]
    fn visible_rows_are_capped_by_the_window() {
        assert_eq!(visible_rows(&snapshot_with(25, 0), 10), 10);
        assert_eq!(visible_rows(&snapshot_with(25, 20), 10), 5);
        assert_eq!(visible_rows(&snapshot_with(3, 0), 10), 3);
        assert_eq!(visible_rows(&snapshot_with(0, 0), 10), 0);
    }
}
