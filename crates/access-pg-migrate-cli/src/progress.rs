//! Terminal progress bars for table transfers.

use std::sync::Mutex;

use access_pg_migrate::{ProgressObserver, TransferPhase, TransferStats};
use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = "{spinner:.green} {prefix:.bold} [{bar:40.cyan/blue}] {pos:>3}% {msg}";

/// One bar per table, reset at every phase.
#[derive(Default)]
pub struct BarObserver {
    bar: Mutex<Option<ProgressBar>>,
}

impl BarObserver {
    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(bar) = guard.as_ref() {
                f(bar);
            }
        }
    }
}

fn style() -> ProgressStyle {
    ProgressStyle::with_template(TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-")
}

impl ProgressObserver for BarObserver {
    fn on_table_start(&self, table: &str, _total_rows: u64) {
        let bar = ProgressBar::new(100);
        bar.set_style(style());
        bar.set_prefix(table.to_string());
        if let Ok(mut guard) = self.bar.lock() {
            *guard = Some(bar);
        }
    }

    fn on_phase(&self, _table: &str, phase: TransferPhase) {
        self.with_bar(|bar| match phase {
            TransferPhase::Failed => bar.abandon_with_message("failed"),
            TransferPhase::RowStaging | TransferPhase::RowCommitting => {
                bar.set_position(0);
                bar.set_message(phase.to_string());
            }
            _ => bar.set_message(phase.to_string()),
        });
    }

    fn on_progress(&self, _table: &str, _phase: TransferPhase, percent: u8) {
        self.with_bar(|bar| bar.set_position(u64::from(percent)));
    }

    fn on_complete(&self, _table: &str, stats: &TransferStats) {
        self.with_bar(|bar| bar.finish_with_message(stats.summary()));
    }
}
