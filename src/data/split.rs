use super::model::Table;

/// Split a table into printable segments at `split_point`.
///
/// * no split point, or a label that is not present → one segment, the
///   whole table
/// * otherwise → rows up to and including the first matching row, then the
///   remaining rows (omitted when empty)
pub fn split_at(table: &Table, split_point: Option<&str>) -> Vec<Table> {
    let pos = split_point.and_then(|label| table.position(label));
    let Some(pos) = pos else {
        if let Some(label) = split_point {
            log::debug!("split point '{label}' not found, keeping one segment");
        }
        return vec![table.clone()];
    };

    let mut segments = vec![table.slice_rows(0..pos + 1)];
    if pos + 1 < table.n_rows() {
        segments.push(table.slice_rows(pos + 1..table.n_rows()));
    }
    segments
}
