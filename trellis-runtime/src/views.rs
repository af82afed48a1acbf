// View registry: named entry points collected at link time.
//
// Each entry opens its windows from inside `run`'s init callback. Hosts (the
// CLI, an embedding native app) list them and launch one by name.

use crate::app::App;
use crate::error::TrellisResult;
use crate::logging::LOG_DISPLAY;
use crate::tlog;

/// Submitted by `trellis::register_view!`.
pub struct ViewEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub open: fn(&App) -> TrellisResult<()>,
}
inventory::collect!(ViewEntry);

impl ViewEntry {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        open: fn(&App) -> TrellisResult<()>,
    ) -> Self {
        ViewEntry { name, description, open }
    }
}

/// Every registered view, sorted by name.
pub fn all() -> Vec<&'static ViewEntry> {
    let mut entries: Vec<_> = inventory::iter::<ViewEntry>.into_iter().collect();
    entries.sort_by_key(|e| e.name);
    entries
}

pub fn find(name: &str) -> Option<&'static ViewEntry> {
    inventory::iter::<ViewEntry>.into_iter().find(|e| e.name == name)
}

/// Open `entry`'s windows, logging the outcome.
pub fn open(entry: &ViewEntry, app: &App) -> TrellisResult<()> {
    (entry.open)(app)?;
    tlog!(LOG_DISPLAY, "view '{}' opened", entry.name);
    Ok(())
}
