// 🏪 Merchant Records - one row of the voucher map
//
// A merchant is a named place on the map that accepts exactly one kind of
// prepaid voucher. The voucher type drives both filtering and color.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// VOUCHER TYPE
// ============================================================================

/// The kind of prepaid instrument a merchant accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoucherType {
    /// T-money transit card
    Tmoney,

    /// Culture gift voucher
    Culture,
}

impl VoucherType {
    pub const ALL: [VoucherType; 2] = [VoucherType::Tmoney, VoucherType::Culture];

    /// Wire value used in the data file and the HTTP API
    pub fn code(&self) -> &'static str {
        match self {
            VoucherType::Tmoney => "tmoney",
            VoucherType::Culture => "culture",
        }
    }

    /// Korean label shown in map tooltips and web cards
    pub fn label_ko(&self) -> &'static str {
        match self {
            VoucherType::Tmoney => "티머니",
            VoucherType::Culture => "문화상품권",
        }
    }

    /// English label used by the terminal dashboard
    pub fn display_name(&self) -> &'static str {
        match self {
            VoucherType::Tmoney => "T-money",
            VoucherType::Culture => "Culture Voucher",
        }
    }

    /// Fixed fill color (sky-500 / orange-500)
    pub fn rgb(&self) -> [u8; 3] {
        match self {
            VoucherType::Tmoney => [14, 165, 233],
            VoucherType::Culture => [249, 115, 22],
        }
    }

    pub fn hex(&self) -> String {
        let [r, g, b] = self.rgb();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}

impl fmt::Display for VoucherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown voucher type '{0}'")]
pub struct UnknownVoucherType(pub String);

impl FromStr for VoucherType {
    type Err = UnknownVoucherType;

    /// Case-insensitive, whitespace-tolerant
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tmoney" => Ok(VoucherType::Tmoney),
            "culture" => Ok(VoucherType::Culture),
            _ => Err(UnknownVoucherType(s.to_string())),
        }
    }
}

// ============================================================================
// MERCHANT RECORD
// ============================================================================

/// One validated row of the dataset.
///
/// Coordinates are guaranteed to be finite and inside the global ranges
/// (lat ∈ [-90, 90], lon ∈ [-180, 180]); the loader rejects anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantRecord {
    pub name: String,
    pub category: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "type")]
    pub voucher_type: VoucherType,
}

impl MerchantRecord {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        address: impl Into<String>,
        latitude: f64,
        longitude: f64,
        voucher_type: VoucherType,
    ) -> Self {
        MerchantRecord {
            name: name.into(),
            category: category.into(),
            address: address.into(),
            latitude,
            longitude,
            voucher_type,
        }
    }

    /// Map position in (lon, lat) order
    pub fn position(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

// ============================================================================
// DATASET
// ============================================================================

/// Ordered, immutable collection of merchants.
///
/// Insertion order is the order rows appeared in the source file. Cloning is
/// cheap: the records live behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Arc<[MerchantRecord]>,
}

impl Dataset {
    pub fn new(records: Vec<MerchantRecord>) -> Self {
        Dataset {
            records: records.into(),
        }
    }

    pub fn records(&self) -> &[MerchantRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MerchantRecord> {
        self.records.iter()
    }

    /// Number of merchants accepting the given voucher type
    pub fn count_of(&self, voucher_type: VoucherType) -> usize {
        self.records
            .iter()
            .filter(|r| r.voucher_type == voucher_type)
            .count()
    }
}

impl From<Vec<MerchantRecord>> for Dataset {
    fn from(records: Vec<MerchantRecord>) -> Self {
        Dataset::new(records)
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a MerchantRecord;
    type IntoIter = std::slice::Iter<'a, MerchantRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voucher_type_codes() {
        assert_eq!(VoucherType::Tmoney.code(), "tmoney");
        assert_eq!(VoucherType::Culture.code(), "culture");
        assert_eq!(VoucherType::Culture.to_string(), "culture");
    }

    #[test]
    fn test_voucher_type_from_str_is_lenient() {
        assert_eq!("tmoney".parse::<VoucherType>(), Ok(VoucherType::Tmoney));
        assert_eq!(" Culture ".parse::<VoucherType>(), Ok(VoucherType::Culture));
        assert_eq!("TMONEY".parse::<VoucherType>(), Ok(VoucherType::Tmoney));
        assert!("giftcard".parse::<VoucherType>().is_err());
        assert!("".parse::<VoucherType>().is_err());
    }

    #[test]
    fn test_voucher_type_palette() {
        assert_eq!(VoucherType::Tmoney.rgb(), [14, 165, 233]);
        assert_eq!(VoucherType::Culture.rgb(), [249, 115, 22]);
        assert_eq!(VoucherType::Tmoney.hex(), "#0ea5e9");
        assert_eq!(VoucherType::Culture.hex(), "#f97316");
    }

    #[test]
    fn test_voucher_type_labels() {
        assert_eq!(VoucherType::Tmoney.label_ko(), "티머니");
        assert_eq!(VoucherType::Culture.label_ko(), "문화상품권");
        assert_eq!(VoucherType::Tmoney.display_name(), "T-money");
    }

    #[test]
    fn test_voucher_type_serde() {
        let json = serde_json::to_string(&VoucherType::Culture).unwrap();
        assert_eq!(json, "\"culture\"");
        let back: VoucherType = serde_json::from_str("\"tmoney\"").unwrap();
        assert_eq!(back, VoucherType::Tmoney);
    }

    #[test]
    fn test_record_position_is_lon_lat() {
        let r = MerchantRecord::new("Cafe X", "Cafe", "Seocho-daero 1", 37.48, 127.03, VoucherType::Tmoney);
        assert_eq!(r.position(), [127.03, 37.48]);
    }

    #[test]
    fn test_record_serializes_type_field() {
        let r = MerchantRecord::new("Cafe X", "Cafe", "Seocho-daero 1", 37.48, 127.03, VoucherType::Tmoney);
        let value = serde_json::to_value(&r).unwrap();
        assert_eq!(value["type"], "tmoney");
        assert_eq!(value["name"], "Cafe X");
    }

    #[test]
    fn test_dataset_counts() {
        let dataset = Dataset::new(vec![
            MerchantRecord::new("A", "Cafe", "addr", 37.0, 127.0, VoucherType::Tmoney),
            MerchantRecord::new("B", "Books", "addr", 37.0, 127.0, VoucherType::Culture),
            MerchantRecord::new("C", "Mart", "addr", 37.0, 127.0, VoucherType::Tmoney),
        ]);

        assert_eq!(dataset.len(), 3);
        assert!(!dataset.is_empty());
        assert_eq!(dataset.count_of(VoucherType::Tmoney), 2);
        assert_eq!(dataset.count_of(VoucherType::Culture), 1);
        let names: Vec<&str> = dataset.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = Dataset::default();
        assert!(dataset.is_empty());
        assert_eq!(dataset.count_of(VoucherType::Tmoney), 0);
    }
}
