//! Well-known-port service names.
//!
//! A static table loaded once at first use; reads need no synchronization.
//! The guess is best-effort labeling only, it says nothing about what is
//! actually listening.

use std::collections::HashMap;
use std::sync::OnceLock;

const WELL_KNOWN: &[(u16, &str)] = &[
    (20, "FTP-DATA"),
    (21, "FTP"),
    (22, "SSH"),
    (23, "Telnet"),
    (25, "SMTP"),
    (53, "DNS"),
    (67, "DHCP"),
    (68, "DHCP"),
    (80, "HTTP"),
    (110, "POP3"),
    (123, "NTP"),
    (137, "NetBIOS-NS"),
    (143, "IMAP"),
    (161, "SNMP"),
    (389, "LDAP"),
    (443, "HTTPS"),
    (445, "SMB"),
    (465, "SMTPS"),
    (514, "Syslog"),
    (587, "SMTP-Submission"),
    (993, "IMAPS"),
    (995, "POP3S"),
    (1433, "MSSQL"),
    (1883, "MQTT"),
    (3306, "MySQL"),
    (3389, "RDP"),
    (5353, "mDNS"),
    (5432, "PostgreSQL"),
    (6379, "Redis"),
    (8080, "HTTP-Proxy"),
    (8443, "HTTPS-Alt"),
];

static SERVICE_TABLE: OnceLock<HashMap<u16, &'static str>> = OnceLock::new();

fn table() -> &'static HashMap<u16, &'static str> {
    SERVICE_TABLE.get_or_init(|| WELL_KNOWN.iter().copied().collect())
}

/// The service name registered for `port`, if any.
pub fn service_name(port: u16) -> Option<&'static str> {
    table().get(&port).copied()
}

/// Best-effort service label for a flow: destination port first, then
/// source, `"Unknown"` when neither matches.
pub fn guess(dst_port: Option<u16>, src_port: Option<u16>) -> String {
    dst_port
        .and_then(service_name)
        .or_else(|| src_port.and_then(service_name))
        .unwrap_or("Unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_port_takes_precedence() {
        assert_eq!(guess(Some(443), Some(22)), "HTTPS");
    }

    #[test]
    fn source_port_is_the_fallback() {
        assert_eq!(guess(Some(54321), Some(53)), "DNS");
    }

    #[test]
    fn unregistered_ports_are_unknown() {
        assert_eq!(guess(Some(54321), Some(49152)), "Unknown");
        assert_eq!(guess(None, None), "Unknown");
    }
}
