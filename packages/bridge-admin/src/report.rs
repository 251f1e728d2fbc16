//! Per-direction summary of provisioned tokens

use std::fmt;

use crate::types::ProvisioningRecord;

const RULE: &str = "================================================================";

/// Tokens provisioned in one direction of a setup run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningReport {
    source: String,
    destination: String,
    records: Vec<ProvisioningRecord>,
}

impl ProvisioningReport {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: ProvisioningRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ProvisioningRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }
}

impl fmt::Display for ProvisioningReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", RULE)?;
        writeln!(f, "Bridged tokens: {} -> {}", self.source, self.destination)?;
        writeln!(f, "{}", RULE)?;

        if self.records.is_empty() {
            writeln!(f, "No tokens provisioned")?;
            return write!(f, "{}", RULE);
        }

        let symbol_width = self
            .records
            .iter()
            .map(|r| r.symbol.chars().count())
            .max()
            .unwrap_or_default();

        for record in &self.records {
            writeln!(
                f,
                "{:<width$}  {} ({})",
                record.symbol,
                record.source_token,
                self.source,
                width = symbol_width
            )?;
            writeln!(
                f,
                "{:<width$}  {} ({})",
                "",
                record.destination_token,
                self.destination,
                width = symbol_width
            )?;
            writeln!(
                f,
                "{:<width$}  resource ID {}",
                "",
                record.resource_id,
                width = symbol_width
            )?;
        }
        write!(f, "{}", RULE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceId;
    use alloy::primitives::address;

    fn dai_record() -> ProvisioningRecord {
        let source_token = address!("6b175474e89094c44da98b954eedeac495271d0f");
        ProvisioningRecord {
            symbol: "DAI".to_string(),
            source_token,
            destination_token: address!("1111111111111111111111111111111111111111"),
            resource_id: ResourceId::for_token(source_token, 1),
        }
    }

    #[test]
    fn test_report_lists_every_record() {
        let mut report = ProvisioningReport::new("ethereum", "avalanche");
        report.push(dai_record());

        let text = report.to_string();
        assert!(text.contains("ethereum -> avalanche"));
        assert!(text.contains("DAI"));
        assert!(text.contains("0x6B175474E89094C44Da98b954EedeAC495271d0F (ethereum)"));
        assert!(text.contains("0x1111111111111111111111111111111111111111 (avalanche)"));
        assert!(text
            .contains("0x00000000000000000000006b175474e89094c44da98b954eedeac495271d0f01"));
        assert!(text.starts_with(RULE));
        assert!(text.ends_with(RULE));
    }

    #[test]
    fn test_empty_report() {
        let report = ProvisioningReport::new("avalanche", "ethereum");
        assert!(report.is_empty());
        assert!(report.to_string().contains("No tokens provisioned"));
    }

    #[test]
    fn test_symbols_are_aligned() {
        let mut report = ProvisioningReport::new("a", "b");
        let mut wavax = dai_record();
        wavax.symbol = "WAVAX".to_string();
        report.push(dai_record());
        report.push(wavax);

        let text = report.to_string();
        let dai_line = text.lines().find(|l| l.starts_with("DAI")).unwrap();
        let wavax_line = text.lines().find(|l| l.starts_with("WAVAX")).unwrap();
        assert_eq!(dai_line.find("0x"), wavax_line.find("0x"));
    }

    #[test]
    fn test_non_ascii_symbols_are_aligned() {
        let mut report = ProvisioningReport::new("a", "b");
        let mut euro = dai_record();
        euro.symbol = "€URO".to_string();
        report.push(euro);
        report.push(dai_record());

        let text = report.to_string();
        let column = |prefix: &str| {
            let line = text.lines().find(|l| l.starts_with(prefix)).unwrap();
            line.chars().position(|c| c == '0')
        };
        assert_eq!(column("€URO"), Some(6));
        assert_eq!(column("DAI"), Some(6));
    }
}
