use kdam::{Bar, BarExt, tqdm};

/// Records-scanned progress bar shown while a table is being read
pub struct ProgressIndicator {
    bar: Option<Bar>,
    current: usize,
    total: usize,
}

impl ProgressIndicator {
    pub fn new(total: usize, quiet: bool) -> Self {
        let bar = if quiet {
            None
        } else {
            Some(tqdm!(total = total, desc = "Scanning records"))
        };
        Self {
            bar,
            current: 0,
            total,
        }
    }

    pub fn increment(&mut self) {
        self.current += 1;
        if let Some(bar) = self.bar.as_mut() {
            if let Err(e) = bar.update(1) {
                log::debug!("Progress bar update failed: {}", e);
            }
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn finish(&mut self) {
        if let Some(bar) = self.bar.as_mut() {
            if let Err(e) = bar.refresh() {
                log::debug!("Progress bar refresh failed: {}", e);
            }
            eprintln!();
        }
        log::debug!("Scanned {}/{} records", self.current, self.total);
    }
}
