//! Deterministic pseudonymization with in-process reversal.

use std::fmt::Display;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{trace, warn};

use super::kind::CensorKind;
use crate::input::Value;

/// Matches any pseudonym shape this service can mint.
static PSEUDONYM_TOKEN: Lazy<Regex> = Lazy::new(|| {
    let alternatives: Vec<String> = CensorKind::ALL
        .iter()
        .map(|k| format!("{}[A-F0-9]{{{}}}", regex::escape(k.prefix()), k.digest_len()))
        .collect();
    Regex::new(&format!(r"\b(?:{})\b", alternatives.join("|")))
        .expect("pseudonym pattern is valid")
});

/// Compute the pseudonym for an already-canonical value without recording it.
pub fn pseudonym_for(canonical: &str, kind: CensorKind) -> String {
    let digest = format!("{:x}", Sha256::digest(canonical.as_bytes()));
    format!(
        "{}{}",
        kind.prefix(),
        digest[..kind.digest_len()].to_ascii_uppercase()
    )
}

/// Mapping sizes, for the stats endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PseudonymStats {
    pub total: usize,
    pub by_kind: IndexMap<String, usize>,
}

/// Process-wide pseudonym table.
///
/// Shared across requests behind an `Arc`. Both directions live in concurrent
/// maps; inserts go through the entry API so a value minted twice at once is
/// recorded exactly once.
#[derive(Debug, Default)]
pub struct CensoringService {
    forward: DashMap<(CensorKind, String), String>,
    reverse: DashMap<String, String>,
}

impl CensoringService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Censor any displayable value.
    ///
    /// Blank input returns `""` and records nothing. `0` and `false` are not
    /// blank and are censored like any other value.
    pub fn censor<V: Display>(&self, value: V, kind: CensorKind) -> String {
        let text = value.to_string();
        let canonical = text.trim();
        if canonical.is_empty() {
            return String::new();
        }

        if let Some(existing) = self.forward.get(&(kind, canonical.to_string())) {
            return existing.clone();
        }

        let pseudonym = pseudonym_for(canonical, kind);
        self.record(kind, canonical, &pseudonym);
        pseudonym
    }

    /// Censor a dataset cell. Nulls become `""`.
    pub fn censor_value(&self, value: &Value, kind: CensorKind) -> String {
        match value {
            Value::Null => String::new(),
            other => self.censor(other, kind),
        }
    }

    /// Censor an optional string; `None` is treated as blank.
    pub fn censor_opt(&self, value: Option<&str>, kind: CensorKind) -> String {
        value.map_or_else(String::new, |v| self.censor(v, kind))
    }

    fn record(&self, kind: CensorKind, canonical: &str, pseudonym: &str) {
        match self.reverse.entry(pseudonym.to_string()) {
            Entry::Occupied(existing) => {
                if existing.get() != canonical {
                    warn!(
                        %pseudonym,
                        kind = %kind,
                        "pseudonym collision; keeping first mapping"
                    );
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(canonical.to_string());
                trace!(%pseudonym, kind = %kind, "minted pseudonym");
            }
        }
        self.forward
            .entry((kind, canonical.to_string()))
            .or_insert_with(|| pseudonym.to_string());
    }

    /// Reverse a pseudonym minted by this process.
    ///
    /// Unknown input is returned unchanged: it may have been minted by another
    /// process or never censored at all.
    pub fn desensitize(&self, pseudonym: &str) -> String {
        self.reverse
            .get(pseudonym.trim())
            .map(|original| original.clone())
            .unwrap_or_else(|| pseudonym.to_string())
    }

    /// Replace every known pseudonym embedded in free text.
    pub fn desensitize_text(&self, text: &str) -> String {
        PSEUDONYM_TOKEN
            .replace_all(text, |caps: &Captures<'_>| self.desensitize(&caps[0]))
            .into_owned()
    }

    /// Number of distinct pseudonyms recorded.
    pub fn len(&self) -> usize {
        self.reverse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reverse.is_empty()
    }

    pub fn stats(&self) -> PseudonymStats {
        let mut by_kind: IndexMap<String, usize> = CensorKind::ALL
            .iter()
            .map(|k| (k.as_str().to_string(), 0))
            .collect();
        for entry in self.forward.iter() {
            *by_kind.entry(entry.key().0.as_str().to_string()).or_insert(0) += 1;
        }
        PseudonymStats {
            total: self.forward.len(),
            by_kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_identifier_shape_and_determinism() {
        let service = CensoringService::new();
        let first = service.censor("CUST12345", CensorKind::Identifier);
        let second = service.censor("CUST12345", CensorKind::Identifier);

        assert!(first.starts_with("DEALER_"));
        assert_eq!(first.len(), "DEALER_".len() + 6);
        assert_eq!(first, second);
        assert_eq!(service.len(), 1);
    }

    #[test]
    fn test_address_round_trip() {
        let service = CensoringService::new();
        let address = "123 Main St, New York, NY 10001";
        let censored = service.censor(address, CensorKind::Address);

        assert!(censored.starts_with("ADDR_"));
        assert_eq!(censored.len(), 13);
        assert_eq!(service.desensitize(&censored), address);
    }

    #[test]
    fn test_blank_input_mints_nothing() {
        let service = CensoringService::new();
        assert_eq!(service.censor("", CensorKind::Identifier), "");
        assert_eq!(service.censor("   ", CensorKind::Address), "");
        assert_eq!(service.censor_opt(None, CensorKind::Identifier), "");
        assert_eq!(service.censor_value(&Value::Null, CensorKind::Identifier), "");
        assert!(service.is_empty());
    }

    #[test]
    fn test_falsy_values_are_censored() {
        let service = CensoringService::new();
        let zero = service.censor(0, CensorKind::Identifier);
        let no = service.censor(false, CensorKind::Identifier);

        assert!(zero.starts_with("DEALER_"));
        assert!(no.starts_with("DEALER_"));
        assert_eq!(service.desensitize(&zero), "0");
        assert_eq!(service.desensitize(&no), "false");
    }

    #[test]
    fn test_numeric_input_is_stringified() {
        let service = CensoringService::new();
        assert_eq!(
            service.censor(12345, CensorKind::Identifier),
            service.censor("12345", CensorKind::Identifier)
        );
        assert_eq!(
            service.censor_value(&Value::Number(12345.0), CensorKind::Identifier),
            service.censor("12345", CensorKind::Identifier)
        );
    }

    #[test]
    fn test_unknown_pseudonym_passes_through() {
        let service = CensoringService::new();
        assert_eq!(service.desensitize("DEALER_ABCDEF"), "DEALER_ABCDEF");
    }

    #[test]
    fn test_desensitize_text_replaces_known_tokens() {
        let service = CensoringService::new();
        let id = service.censor("CUST98765", CensorKind::Identifier);
        let text = format!("Customer {} bought two units; DEALER_000000 did not.", id);

        assert_eq!(
            service.desensitize_text(&text),
            "Customer CUST98765 bought two units; DEALER_000000 did not."
        );
    }

    #[test]
    fn test_concurrent_censoring_is_idempotent() {
        let service = Arc::new(CensoringService::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                std::thread::spawn(move || {
                    (0..50)
                        .map(|i| service.censor(format!("CUST{:05}", i), CensorKind::Identifier))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let results: Vec<Vec<String>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for other in &results[1..] {
            assert_eq!(other, &results[0]);
        }
        assert_eq!(service.len(), 50);
        assert_eq!(service.stats().by_kind["identifier"], 50);
    }
}
