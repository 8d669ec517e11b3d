//! Reading networks from CSV tables
//!
//! A data directory holds three files:
//! - `df_inprice.csv`: one row per plant, one column per DC
//! - `df_outprice.csv`: one row per DC, one column per store
//! - `df_demand.csv`: one row per store with its demand
//!
//! Tables are joined by identifier, never by column position.

use std::collections::HashMap;
use std::path::Path;

use log::{info, warn};

use crate::domain::network::Network;
use crate::error::LoadError;
use crate::sample::sample_network;

pub const INBOUND_FILE: &str = "df_inprice.csv";
pub const OUTBOUND_FILE: &str = "df_outprice.csv";
pub const DEMAND_FILE: &str = "df_demand.csv";

/// Where the default network came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkSource {
    Files,
    Sample,
}

/// A cost table with row and column identifiers
#[derive(Debug, Clone, PartialEq)]
struct CostTable {
    row_ids: Vec<String>,
    col_ids: Vec<String>,
    values: Vec<Vec<f64>>,
}

fn open(path: &Path) -> Result<csv::Reader<std::fs::File>, LoadError> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| LoadError::Csv {
            path: path.display().to_string(),
            source,
        })
}

/// Position of the identifier column: the one named `id_header`
/// (case-insensitive), otherwise the first column.
fn id_column(headers: &csv::StringRecord, id_header: &str) -> usize {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(id_header))
        .unwrap_or(0)
}

fn read_cost_table(path: &Path, id_header: &str) -> Result<CostTable, LoadError> {
    let mut reader = open(path)?;
    let display = path.display().to_string();

    let headers = reader
        .headers()
        .map_err(|source| LoadError::Csv {
            path: display.clone(),
            source,
        })?
        .clone();

    // Columns before the id column (e.g. an exported index) are ignored.
    let id_col = id_column(&headers, id_header);
    let col_ids: Vec<String> = headers.iter().skip(id_col + 1).map(str::to_string).collect();
    if col_ids.is_empty() {
        return Err(LoadError::Malformed {
            path: display,
            details: "no cost columns after the identifier column".to_string(),
        });
    }

    let mut row_ids = Vec::new();
    let mut values = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let line = i + 2;
        let record = record.map_err(|source| LoadError::Csv {
            path: display.clone(),
            source,
        })?;

        let id = record.get(id_col).unwrap_or_default().to_string();
        let row = record
            .iter()
            .skip(id_col + 1)
            .map(|field| {
                field.parse::<f64>().map_err(|_| LoadError::Parse {
                    path: display.clone(),
                    line,
                    value: field.to_string(),
                    expected: "a cost",
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;

        row_ids.push(id);
        values.push(row);
    }

    Ok(CostTable {
        row_ids,
        col_ids,
        values,
    })
}

/// Store id -> demand, in file order.
fn read_demand(path: &Path) -> Result<Vec<(String, i64)>, LoadError> {
    let mut reader = open(path)?;
    let display = path.display().to_string();

    let headers = reader
        .headers()
        .map_err(|source| LoadError::Csv {
            path: display.clone(),
            source,
        })?
        .clone();

    let store_col = id_column(&headers, "store");
    let demand_col = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("demand"))
        .unwrap_or(headers.len().saturating_sub(1));
    if demand_col == store_col {
        return Err(LoadError::Malformed {
            path: display,
            details: "expected a store column and a demand column".to_string(),
        });
    }

    let mut demand = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|source| LoadError::Csv {
            path: display.clone(),
            source,
        })?;
        let store = record.get(store_col).unwrap_or_default().to_string();
        let field = record.get(demand_col).unwrap_or_default();
        let units = field.parse::<i64>().map_err(|_| LoadError::Parse {
            path: display.clone(),
            line: i + 2,
            value: field.to_string(),
            expected: "a whole number of units",
        })?;
        demand.push((store, units));
    }
    Ok(demand)
}

/// Map each identifier to its position, rejecting repeats.
fn index_unique<'a>(
    ids: impl Iterator<Item = &'a str>,
    axis: &'static str,
    path: &Path,
) -> Result<HashMap<&'a str, usize>, LoadError> {
    let mut positions = HashMap::new();
    for (i, id) in ids.enumerate() {
        if positions.insert(id, i).is_some() {
            return Err(LoadError::DuplicateIdentifier {
                axis,
                id: id.to_string(),
                path: path.display().to_string(),
            });
        }
    }
    Ok(positions)
}

/// Load a network from the three CSV tables in `dir`.
///
/// DC and store order follow the outbound table. Inbound DC columns and
/// demand rows are matched to it by identifier.
pub fn load_network(dir: &Path) -> Result<Network, LoadError> {
    let inbound_path = dir.join(INBOUND_FILE);
    let outbound_path = dir.join(OUTBOUND_FILE);
    let demand_path = dir.join(DEMAND_FILE);

    let inbound = read_cost_table(&inbound_path, "from")?;
    let outbound = read_cost_table(&outbound_path, "from")?;
    let demand_rows = read_demand(&demand_path)?;

    let dcs = outbound.row_ids.clone();
    let stores = outbound.col_ids.clone();

    let dc_position = index_unique(
        inbound.col_ids.iter().map(String::as_str),
        "dc",
        &inbound_path,
    )?;
    for id in &inbound.col_ids {
        if !dcs.contains(id) {
            return Err(LoadError::UnknownIdentifier {
                axis: "dc",
                id: id.clone(),
                path: inbound_path.display().to_string(),
                reference: OUTBOUND_FILE.to_string(),
            });
        }
    }
    let mut column_order = Vec::with_capacity(dcs.len());
    for dc in &dcs {
        let Some(&position) = dc_position.get(dc.as_str()) else {
            return Err(LoadError::MissingIdentifier {
                axis: "dc",
                id: dc.clone(),
                path: inbound_path.display().to_string(),
            });
        };
        column_order.push(position);
    }
    let inbound_cost: Vec<Vec<f64>> = inbound
        .values
        .iter()
        .map(|row| column_order.iter().map(|&c| row.get(c).copied().unwrap_or(f64::NAN)).collect())
        .collect();

    let store_row = index_unique(
        demand_rows.iter().map(|(store, _)| store.as_str()),
        "store",
        &demand_path,
    )?;
    for (store, _) in &demand_rows {
        if !stores.contains(store) {
            return Err(LoadError::UnknownIdentifier {
                axis: "store",
                id: store.clone(),
                path: demand_path.display().to_string(),
                reference: OUTBOUND_FILE.to_string(),
            });
        }
    }
    let demand = stores
        .iter()
        .map(|store| {
            store_row
                .get(store.as_str())
                .map(|&row| demand_rows[row].1)
                .ok_or_else(|| LoadError::MissingIdentifier {
                    axis: "store",
                    id: store.clone(),
                    path: demand_path.display().to_string(),
                })
        })
        .collect::<Result<Vec<i64>, _>>()?;

    let network = Network::with_ids(
        inbound.row_ids,
        dcs,
        stores,
        inbound_cost,
        outbound.values,
        demand,
    )?;
    Ok(network)
}

/// Whether all three tables exist in `dir`.
pub fn data_files_present(dir: &Path) -> bool {
    [INBOUND_FILE, OUTBOUND_FILE, DEMAND_FILE]
        .iter()
        .all(|file| dir.join(file).is_file())
}

/// The network from `dir` when its tables exist, otherwise the synthetic
/// sample network.
pub fn default_network(dir: &Path, seed: u64) -> Result<(Network, NetworkSource), LoadError> {
    if data_files_present(dir) {
        let network = load_network(dir)?;
        info!(
            "loaded network from {}: {} plants, {} dcs, {} stores",
            dir.display(),
            network.plant_count(),
            network.dc_count(),
            network.store_count()
        );
        Ok((network, NetworkSource::Files))
    } else {
        warn!("data files not found in {}, using sample network", dir.display());
        Ok((sample_network(seed)?, NetworkSource::Sample))
    }
}
