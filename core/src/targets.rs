pub const UI: &str = "dspi::ui";
pub const STORE: &str = "dspi::store";
pub const LEDGER: &str = "dspi::ledger";
pub const PAGINATION: &str = "dspi::pagination";
pub const CONFIG: &str = "dspi::config";

pub const ALL: [&str; 5] = [UI, STORE, LEDGER, PAGINATION, CONFIG];
