// 🧮 Renderer - pure derivations from (Dataset, FilterSelection)
//
// Every redraw recomputes the whole view from scratch. Nothing here can fail
// and nothing here keeps state between calls.

use crate::merchant::{Dataset, MerchantRecord, VoucherType};
use crate::selection::FilterSelection;
use serde::{Deserialize, Serialize};

// ============================================================================
// DERIVED TYPES
// ============================================================================

/// KPI tiles. Only `total` follows the active filter; the per-type counts are
/// always taken over the whole dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kpis {
    pub total: usize,
    pub tmoney_count: usize,
    pub culture_count: usize,
}

/// One renderable point on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    /// (lon, lat)
    pub position: [f64; 2],
    pub color: [u8; 3],
    /// Tooltip text: name, localized type, category, address
    pub label: String,
    pub name: String,
    pub type_label: String,
    pub category: String,
    pub address: String,
    pub voucher_type: VoucherType,
}

/// Two-column card list: even indices left, odd indices right
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardColumns {
    pub left: Vec<MerchantRecord>,
    pub right: Vec<MerchantRecord>,
}

impl CardColumns {
    pub fn len(&self) -> usize {
        self.left.len() + self.right.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    /// Index into the filtered list of the card at (`column`, `row`)
    pub fn source_index(column: Column, row: usize) -> usize {
        match column {
            Column::Left => row * 2,
            Column::Right => row * 2 + 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Left,
    Right,
}

impl Column {
    pub fn other(&self) -> Column {
        match self {
            Column::Left => Column::Right,
            Column::Right => Column::Left,
        }
    }
}

/// Everything a frame needs, recomputed on every render
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedView {
    pub selection: FilterSelection,
    pub filtered_records: Vec<MerchantRecord>,
    pub kpis: Kpis,
    pub map_layer: Vec<MapPoint>,
    pub columns: CardColumns,
}

// ============================================================================
// MAP PRESENTATION
// ============================================================================

/// Camera the map opens with (Seocho-gu)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
}

pub const INITIAL_VIEW: ViewState = ViewState {
    latitude: 37.4831,
    longitude: 127.0327,
    zoom: 12.2,
    pitch: 45.0,
    bearing: 8.0,
};

/// Scatterplot styling shared by every point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointStyle {
    pub radius_meters: f64,
    pub radius_min_pixels: f64,
    pub radius_max_pixels: f64,
    pub line_color: [u8; 3],
    pub line_width_min_pixels: f64,
}

pub const POINT_STYLE: PointStyle = PointStyle {
    radius_meters: 65.0,
    radius_min_pixels: 5.0,
    radius_max_pixels: 60.0,
    line_color: [255, 255, 255],
    line_width_min_pixels: 1.0,
};

// ============================================================================
// DERIVATIONS
// ============================================================================

/// Records matching `selection`, in dataset order. `All` returns everything.
pub fn filter(dataset: &Dataset, selection: FilterSelection) -> Vec<MerchantRecord> {
    dataset
        .iter()
        .filter(|r| selection.matches(r.voucher_type))
        .cloned()
        .collect()
}

/// KPI counts: filtered total plus global per-type counts
pub fn aggregate(dataset: &Dataset, filtered_records: &[MerchantRecord]) -> Kpis {
    Kpis {
        total: filtered_records.len(),
        tmoney_count: dataset.count_of(VoucherType::Tmoney),
        culture_count: dataset.count_of(VoucherType::Culture),
    }
}

pub fn tooltip_label(record: &MerchantRecord) -> String {
    format!(
        "{}\n{} • {}\n{}",
        record.name,
        record.voucher_type.label_ko(),
        record.category,
        record.address
    )
}

pub fn to_map_point(record: &MerchantRecord) -> MapPoint {
    MapPoint {
        position: record.position(),
        color: record.voucher_type.rgb(),
        label: tooltip_label(record),
        name: record.name.clone(),
        type_label: record.voucher_type.label_ko().to_string(),
        category: record.category.clone(),
        address: record.address.clone(),
        voucher_type: record.voucher_type,
    }
}

/// Flat point layer, one point per record, same order
pub fn to_map_layer(filtered_records: &[MerchantRecord]) -> Vec<MapPoint> {
    filtered_records.iter().map(to_map_point).collect()
}

/// Split by index parity: even → left, odd → right
pub fn to_card_list(filtered_records: &[MerchantRecord]) -> CardColumns {
    let mut columns = CardColumns::default();
    for (i, record) in filtered_records.iter().enumerate() {
        if i % 2 == 0 {
            columns.left.push(record.clone());
        } else {
            columns.right.push(record.clone());
        }
    }
    columns
}

/// Full frame for the given dataset and selection
pub fn render(dataset: &Dataset, selection: FilterSelection) -> DerivedView {
    let filtered_records = filter(dataset, selection);
    let kpis = aggregate(dataset, &filtered_records);
    let map_layer = to_map_layer(&filtered_records);
    let columns = to_card_list(&filtered_records);

    DerivedView {
        selection,
        filtered_records,
        kpis,
        map_layer,
        columns,
    }
}
