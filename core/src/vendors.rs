//! Hardware-vendor resolution from the embedded OUI database.
//!
//! The database is loaded once into process-wide immutable state and is
//! safe for unsynchronized concurrent reads. Lookups are best-effort: an
//! unresolved prefix (or a database that failed to load) yields
//! `"Unknown"`, never an error.

use std::sync::OnceLock;

use mac_oui::Oui;
use pnet::util::MacAddr;
use tracing::warn;

static OUI_DB: OnceLock<Option<Oui>> = OnceLock::new();

fn oui_db() -> Option<&'static Oui> {
    OUI_DB
        .get_or_init(|| match Oui::default() {
            Ok(db) => Some(db),
            Err(e) => {
                warn!("OUI database unavailable, vendors will be Unknown: {e}");
                None
            }
        })
        .as_ref()
}

/// Resolves the vendor name for a MAC address.
pub fn vendor_name(mac: MacAddr) -> String {
    let Some(db) = oui_db() else {
        return String::from("Unknown");
    };
    match db.lookup_by_mac(&mac.to_string()) {
        Ok(Some(entry)) => entry.company_name.clone(),
        _ => String::from("Unknown"),
    }
}
