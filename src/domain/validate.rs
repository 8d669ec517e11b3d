use std::collections::HashSet;

use crate::error::NetworkError;

/// Largest demand the integer backends accept, per store and in total.
pub const MAX_DEMAND: i64 = i32::MAX as i64;

/// Check that every row of `table` has `width` columns and return the
/// inferred width. `None` means the table has no rows, so the width is
/// not determined by this table.
fn row_width(table: &[Vec<f64>], name: &'static str, axis: &'static str) -> Result<Option<usize>, NetworkError> {
    let Some(first) = table.first() else {
        return Ok(None);
    };
    let width = first.len();
    for row in table {
        if row.len() != width {
            return Err(NetworkError::DimensionMismatch {
                axis,
                left: name,
                left_len: width,
                right: name,
                right_len: row.len(),
            });
        }
    }
    Ok(Some(width))
}

/// Validate the shapes of the three input tables and return `(P, D, S)`.
pub fn validate_dimensions(
    inbound_cost: &[Vec<f64>],
    outbound_cost: &[Vec<f64>],
    demand: &[i64],
) -> Result<(usize, usize, usize), NetworkError> {
    let plants = inbound_cost.len();
    let dcs = outbound_cost.len();

    if let Some(inbound_dcs) = row_width(inbound_cost, "inbound_cost", "dc")? {
        if inbound_dcs != dcs {
            return Err(NetworkError::DimensionMismatch {
                axis: "dc",
                left: "inbound_cost",
                left_len: inbound_dcs,
                right: "outbound_cost",
                right_len: dcs,
            });
        }
    }

    let stores = demand.len();
    if let Some(outbound_stores) = row_width(outbound_cost, "outbound_cost", "store")? {
        if outbound_stores != stores {
            return Err(NetworkError::DimensionMismatch {
                axis: "store",
                left: "outbound_cost",
                left_len: outbound_stores,
                right: "demand",
                right_len: stores,
            });
        }
    }

    Ok((plants, dcs, stores))
}

/// Costs must be finite and non-negative.
pub fn validate_costs(table: &[Vec<f64>], name: &'static str) -> Result<(), NetworkError> {
    for (i, row) in table.iter().enumerate() {
        for (j, &cost) in row.iter().enumerate() {
            if !cost.is_finite() || cost < 0.0 {
                return Err(NetworkError::InvalidValue {
                    table: name,
                    location: format!("[{}][{}]", i, j),
                    value: cost.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Demands must be non-negative and, summed, stay within `MAX_DEMAND`.
pub fn validate_demand(demand: &[i64]) -> Result<(), NetworkError> {
    let mut total: i64 = 0;
    for (s, &units) in demand.iter().enumerate() {
        if !(0..=MAX_DEMAND).contains(&units) {
            return Err(NetworkError::InvalidValue {
                table: "demand",
                location: format!("[{}]", s),
                value: units.to_string(),
            });
        }
        total += units;
        if total > MAX_DEMAND {
            return Err(NetworkError::InvalidValue {
                table: "demand",
                location: "total".to_string(),
                value: total.to_string(),
            });
        }
    }
    Ok(())
}

/// Identifiers must match the axis length and be unique.
pub fn validate_ids(ids: &[String], expected: usize, axis: &'static str) -> Result<(), NetworkError> {
    if ids.len() != expected {
        return Err(NetworkError::DimensionMismatch {
            axis,
            left: "identifiers",
            left_len: ids.len(),
            right: "cost table",
            right_len: expected,
        });
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(id.as_str()) {
            return Err(NetworkError::DuplicateIdentifier {
                axis,
                id: id.clone(),
            });
        }
    }
    Ok(())
}
