//! Store identity from the journal header.

use tracing::debug;

use super::patterns::LOCATION_LINE;
use super::SectionExtractor;
use crate::error::JournalError;
use crate::journal::Result;
use crate::models::receipt::Store;

/// Store extractor.
///
/// The header starts with the tax id, followed by one or more company name
/// lines, the `<id>-<name>` location line, the address and the city.
#[derive(Debug, Clone, Default)]
pub struct StoreExtractor;

impl StoreExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl SectionExtractor for StoreExtractor {
    type Output = Store;

    fn extract(&self, text: &str) -> Result<Self::Output> {
        let lines: Vec<&str> = text.trim().lines().map(str::trim).collect();

        let tin = lines.first().copied().unwrap_or_default();
        let mut company_lines: Vec<&str> = lines.get(1).copied().into_iter().collect();

        let mut location = None;
        for (index, line) in lines.iter().copied().enumerate().skip(2) {
            if let Some(caps) = LOCATION_LINE.captures(line) {
                location = Some((index, caps[1].to_string(), caps[2].trim().to_string()));
                break;
            }
            company_lines.push(line);
        }

        let Some((index, location_id, location_name)) = location else {
            return Err(JournalError::StructuralMismatch(
                "store location line not found in header".to_string(),
            ));
        };

        let line_after = |offset: usize| lines.get(index + offset).copied().unwrap_or_default().to_string();

        let store = Store {
            company_name: company_lines.join(" "),
            tin: tin.to_string(),
            location_id,
            location_name,
            address: line_after(1),
            city: line_after(2),
        };

        debug!("Extracted store {} ({})", store.company_name, store.tin);

        Ok(store)
    }
}

/// Extract store identity from a journal header.
pub fn extract_store(header: &str) -> Result<Store> {
    StoreExtractor::new().extract(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_store() {
        let header = "101670560\nMERCATOR-S\n1108934-Roda Megamarket 345\nВИЗАНТИЈСКИ БУЛЕВАР 1\nНиш-Медијана";

        assert_eq!(
            extract_store(header).unwrap(),
            Store {
                company_name: "MERCATOR-S".to_string(),
                tin: "101670560".to_string(),
                location_id: "1108934".to_string(),
                location_name: "Roda Megamarket 345".to_string(),
                address: "ВИЗАНТИЈСКИ БУЛЕВАР 1".to_string(),
                city: "Ниш-Медијана".to_string(),
            }
        );
    }

    #[test]
    fn test_company_name_spans_lines() {
        let header = "   108342562\n  N COPY CENTAR РАДЊА ЗА ПРОМЕТ\n  БИРО-ОПРЕМЕ САША МИЛИВОЈЕВИЋ ПР\n1079580-N COPY CENTAR\nРАЈИЋЕВА 1\nНиш-Медијана\nКасир: ОПЕРАТОР 30";
        let store = extract_store(header).unwrap();

        assert_eq!(store.company_name, "N COPY CENTAR РАДЊА ЗА ПРОМЕТ БИРО-ОПРЕМЕ САША МИЛИВОЈЕВИЋ ПР");
        assert_eq!(store.tin, "108342562");
        assert_eq!(store.location_id, "1079580");
        assert_eq!(store.location_name, "N COPY CENTAR");
        assert_eq!(store.city, "Ниш-Медијана");
    }

    #[test]
    fn test_missing_address_lines() {
        let store = extract_store("101670560\nMERCATOR-S\n1108934-Roda").unwrap();

        assert_eq!(store.location_name, "Roda");
        assert_eq!(store.address, "");
        assert_eq!(store.city, "");
    }

    #[test]
    fn test_missing_location_line() {
        let result = extract_store("101670560\nMERCATOR-S\nВИЗАНТИЈСКИ БУЛЕВАР 1");

        assert!(matches!(result, Err(JournalError::StructuralMismatch(_))));
    }
}
