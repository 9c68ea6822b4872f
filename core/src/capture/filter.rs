//! Capture filter expressions.
//!
//! A small conjunctive language validated up front, before the capture
//! resource is acquired: `tcp`, `udp`, `icmp`, `arp`, `port <n>`, `any`,
//! and space-joined combinations such as `tcp port 443`. The empty string
//! matches everything.

use std::str::FromStr;

use lanscope_common::network::packet::Protocol;

use crate::classify;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Term {
    Proto(Protocol),
    Port(u16),
}

/// A validated filter; every term must match for a frame to pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterExpr {
    terms: Vec<Term>,
}

impl FilterExpr {
    /// Matches everything.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn matches(&self, frame: &[u8]) -> bool {
        if self.terms.is_empty() {
            return true;
        }
        let record = classify::classify(frame);
        self.terms.iter().all(|term| match term {
            Term::Proto(proto) => record.protocol == *proto,
            Term::Port(port) => {
                record.src_port == Some(*port) || record.dst_port == Some(*port)
            }
        })
    }
}

impl FromStr for FilterExpr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut terms = Vec::new();
        let mut tokens = s.split_whitespace();

        while let Some(token) = tokens.next() {
            match token.to_ascii_lowercase().as_str() {
                "any" => {}
                "tcp" => terms.push(Term::Proto(Protocol::Tcp)),
                "udp" => terms.push(Term::Proto(Protocol::Udp)),
                "icmp" => terms.push(Term::Proto(Protocol::Icmp)),
                "arp" => terms.push(Term::Proto(Protocol::Arp)),
                "port" => {
                    let value = tokens.next().ok_or("port expects a number")?;
                    let port: u16 = value
                        .parse()
                        .map_err(|_| format!("invalid port number: {value}"))?;
                    terms.push(Term::Port(port));
                }
                other => return Err(format!("unrecognized filter term: {other}")),
            }
        }

        Ok(Self { terms })
    }
}
