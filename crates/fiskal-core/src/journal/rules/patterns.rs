//! Common patterns and fixed labels of the fiscal journal layout.

use lazy_static::lazy_static;
use regex::Regex;

/// Line separating the journal sections.
pub const SECTION_DELIMITER: &str = "========================================";

/// Line separating items from payments and tax rows from the tax total.
pub const SUB_DELIMITER: &str = "----------------------------------------";

/// Separator between a label and its value.
pub const LABEL_SEPARATOR: &str = ": ";

/// First word of the tax table legend.
pub const TAX_TABLE_LEGEND: &str = "Ознака";

/// Prefix stripped from the QR code image source.
pub const QR_CODE_PREFIX: &str = "data:image/gif;base64,";

// Labels
pub const LABEL_TOTAL_TAX: &str = "Укупан износ пореза";
pub const LABEL_FISCALIZATION_TIME: &str = "ПФР време";
pub const LABEL_RECEIPT_NUMBER: &str = "ПФР број рачуна";
pub const LABEL_RECEIPT_COUNTER: &str = "Бројач рачуна";
pub const LABEL_TOTAL_PURCHASE: &str = "Укупан износ";
pub const LABEL_TOTAL_REFUND: &str = "Укупна рефундација";

/// Format of the fiscalization time, e.g. `31.12.2022. 15:51:57`.
pub const FISCALIZATION_TIME_FORMAT: &str = "%d.%m.%Y. %H:%M:%S";

/// Units of measure recognised after an item name, Latin then Cyrillic.
pub const UNIT_VOCABULARY: [&str; 23] = [
    "kom", "kom.", "kg", "kgr", "l", "lit", "lit.", "kut", "por", "m", "pce", "ko", "fl",
    "ком", "ком.", "кг", "кгр", "л", "кут", "пор", "м", "ко", "фл",
];

// Item descriptor fragments
pub const ITEM_CODE_PREFIX: &str = r"(?:\[?[0-9]{3,}\]?(?: |,|-))";
pub const ITEM_CODE_SUFFIX: &str = r"(?:(?: |,|-| - |/|#)[0-9]{3,})";
pub const ITEM_NAME: &str = r"(?P<name>.*?)";
pub const UNIT_SEPARATOR: &str = r"(?: / |/ | /|/| \\ | \\|\\ |\\| +|\(|\[)";

lazy_static! {
    // Trailing price, quantity and total columns of an item
    pub static ref AMOUNT_LINE: Regex = Regex::new(
        r"([0-9,.]+)\s+([0-9,.]+)\s+(-?[0-9,.]+)$"
    ).unwrap();

    // Store location, e.g. "1108934-Roda Megamarket 345"
    pub static ref LOCATION_LINE: Regex = Regex::new(
        r"^([0-9]+)-(.+)$"
    ).unwrap();

    pub static ref COLUMN_GAP: Regex = Regex::new(
        r" {2,}"
    ).unwrap();

    pub static ref IMAGE_SOURCE: Regex = Regex::new(
        r#"(?i)<img\b[^>]*?\bsrc\s*=\s*["']([^"']*)["']"#
    ).unwrap();

    // Parenthesised token closing an item descriptor
    pub static ref TRAILING_TAX_TOKEN: Regex = Regex::new(
        r"\((?P<tax>[^()]+)\)\s*$"
    ).unwrap();

    pub static ref UNIT_PATTERN: String = unit_pattern();
}

/// Unit fragment: a separator, an optional opening bracket, the unit and an
/// optional closing bracket.
fn unit_pattern() -> String {
    let units: Vec<String> = UNIT_VOCABULARY.iter().map(|unit| regex::escape(unit)).collect();

    format!(
        r"{UNIT_SEPARATOR}(?:\(|\[)?(?P<unit>{})(?:\)|\])?",
        units.join("|")
    )
}
