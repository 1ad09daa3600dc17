//! Splitting a journal into its structural sections.

use tracing::debug;

use super::rules::patterns::{SECTION_DELIMITER, SUB_DELIMITER, TAX_TABLE_LEGEND};
use super::Result;
use crate::error::JournalError;

/// Minimum number of delimited sections in a journal.
pub const MIN_SECTIONS: usize = 5;

/// Borrowed views of the sections of one journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JournalSections<'a> {
    /// Store and labelled header lines.
    pub header: &'a str,
    /// Item table, legend line included.
    pub items: &'a str,
    /// Payment summary lines.
    pub payments: &'a str,
    /// Extra banner section printed on receipts that are not fiscal receipts.
    pub informational: Option<&'a str>,
    /// Tax table, legend line included.
    pub taxes: &'a str,
    /// Fiscalization data (time, number, counter).
    pub fiscalization: &'a str,
    /// Markup holding the QR code image; blank when the journal ends
    /// right after the fiscalization section.
    pub qr_code: &'a str,
}

/// Split normalized journal text into sections.
///
/// The first and last lines are banners and are dropped. The header ends
/// at its last line starting with `--`, which is the transaction type banner.
pub fn split_journal(text: &str) -> Result<JournalSections<'_>> {
    let Some((_, body)) = text.split_once('\n') else {
        return Err(JournalError::StructuralMismatch(
            "journal must span multiple lines".to_string(),
        ));
    };
    let body = body.rfind('\n').map_or("", |end| &body[..end]);

    let sections: Vec<&str> = body.split(SECTION_DELIMITER).collect();
    debug!("Journal has {} sections", sections.len());

    if sections.len() < MIN_SECTIONS {
        return Err(JournalError::StructuralMismatch(format!(
            "expected at least {} sections, found {}",
            MIN_SECTIONS,
            sections.len()
        )));
    }

    let header = sections[0]
        .rfind("\n--")
        .map_or(sections[0], |end| &sections[0][..end]);

    let Some((items, payments)) = sections[1].split_once(SUB_DELIMITER) else {
        return Err(JournalError::StructuralMismatch(
            "item section has no payment summary".to_string(),
        ));
    };

    let (informational, tax_index) = if sections[2].trim().starts_with(TAX_TABLE_LEGEND) {
        (None, 2)
    } else {
        debug!("Skipping informational section");
        (Some(sections[2]), 3)
    };

    let section = |index: usize, name: &'static str| {
        sections.get(index).copied().ok_or_else(|| {
            JournalError::StructuralMismatch(format!("{} section not found", name))
        })
    };

    Ok(JournalSections {
        header,
        items,
        payments,
        informational,
        taxes: section(tax_index, "tax")?,
        fiscalization: section(tax_index + 1, "fiscalization")?,
        qr_code: sections.get(tax_index + 2).copied().unwrap_or(""),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn journal(sections: &[&str]) -> String {
        let delimiter = format!("\n{}\n", SECTION_DELIMITER);
        format!(
            "=========== ФИСКАЛНИ РАЧУН ===========\n{}\n======== КРАЈ ФИСКАЛНОГ РАЧУНА =========",
            sections.join(&delimiter)
        )
    }

    #[test]
    fn test_split_journal() {
        let text = journal(&[
            "101670560\nMERCATOR-S\nКасир: Петар\n-------------ПРОМЕТ ПРОДАЈА-------------\nАртикли",
            &format!("Назив\nBANANA KG (Е)\n1 1 1\n{}\nУкупан износ: 1,00", SUB_DELIMITER),
            "Ознака  Име  Стопа  Порез",
            "ПФР време: 31.12.2022. 15:51:57",
            "<img src=\"data:image/gif;base64,R0lG\" />",
        ]);
        let sections = split_journal(&text).unwrap();

        assert_eq!(sections.header, "101670560\nMERCATOR-S\nКасир: Петар");
        assert!(sections.items.contains("BANANA"));
        assert_eq!(sections.payments.trim(), "Укупан износ: 1,00");
        assert_eq!(sections.informational, None);
        assert!(sections.taxes.trim().starts_with("Ознака"));
        assert!(sections.fiscalization.contains("ПФР време"));
        assert!(sections.qr_code.contains("<img"));
    }

    #[test]
    fn test_informational_section_is_skipped() {
        let text = journal(&[
            "header",
            &format!("items\n{}\npayments", SUB_DELIMITER),
            "       ОВО НИЈЕ ФИСКАЛНИ РАЧУН",
            "Ознака  Име  Стопа  Порез",
            "ПФР време: 31.12.2022. 15:51:57",
            "",
        ]);
        let sections = split_journal(&text).unwrap();

        assert_eq!(sections.informational.map(str::trim), Some("ОВО НИЈЕ ФИСКАЛНИ РАЧУН"));
        assert!(sections.taxes.trim().starts_with("Ознака"));
        assert!(sections.qr_code.trim().is_empty());
    }

    #[test]
    fn test_qr_code_section_may_be_absent() {
        let text = journal(&[
            "header",
            &format!("items\n{}\npayments", SUB_DELIMITER),
            "       ОВО НИЈЕ ФИСКАЛНИ РАЧУН",
            "Ознака  Име  Стопа  Порез",
            "ПФР време: 31.12.2022. 15:51:57",
        ]);
        let sections = split_journal(&text).unwrap();

        assert!(sections.informational.is_some());
        assert!(sections.fiscalization.contains("ПФР време"));
        assert_eq!(sections.qr_code, "");
    }

    #[test]
    fn test_too_few_sections() {
        let text = journal(&["header", "items", "taxes"]);

        assert!(matches!(
            split_journal(&text),
            Err(JournalError::StructuralMismatch(_))
        ));
        assert!(matches!(
            split_journal("test"),
            Err(JournalError::StructuralMismatch(_))
        ));
    }

    #[test]
    fn test_missing_sub_delimiter() {
        let text = journal(&["header", "items", "Ознака", "fiscal", "qr"]);

        assert!(matches!(
            split_journal(&text),
            Err(JournalError::StructuralMismatch(_))
        ));
    }
}
