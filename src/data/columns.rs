use crate::config::{ColumnRoles, Role};
use crate::error::{ChartError, Result};

use super::model::RawTable;

/// How a role finds its column when the caller did not bind it explicitly.
#[derive(Debug, Clone, Copy)]
pub struct ColumnRule<'a> {
    pub role: Role,
    /// Conventional header looked up first.
    pub name: Option<&'a str>,
    /// Position used when the conventional header is absent.
    pub position: usize,
}

impl<'a> ColumnRule<'a> {
    pub const fn positional(role: Role, position: usize) -> Self {
        ColumnRule { role, name: None, position }
    }

    pub const fn named(role: Role, name: &'a str, position: usize) -> Self {
        ColumnRule { role, name: Some(name), position }
    }
}

/// Resolve a role to a column index.
///
/// Order: explicit binding (must exist), conventional header, position.
/// The caller's schema is never renamed.
pub fn resolve_column(raw: &RawTable, roles: &ColumnRoles, rule: ColumnRule<'_>) -> Result<usize> {
    if let Some(bound) = roles.get(&rule.role) {
        return raw.column_index(bound).ok_or_else(|| {
            ChartError::shape(format!(
                "column '{bound}' bound to role '{}' does not exist",
                rule.role
            ))
        });
    }
    if let Some(idx) = rule.name.and_then(|name| raw.column_index(name)) {
        return Ok(idx);
    }
    if rule.position < raw.n_cols() {
        return Ok(rule.position);
    }
    Err(ChartError::shape(match rule.name {
        Some(name) => format!(
            "role '{}' needs column '{name}' or column #{}, table has {} columns",
            rule.role,
            rule.position + 1,
            raw.n_cols()
        ),
        None => format!(
            "role '{}' needs column #{}, table has {} columns",
            rule.role,
            rule.position + 1,
            raw.n_cols()
        ),
    }))
}

/// Resolve several roles that must land on distinct columns.
pub fn resolve_distinct(
    raw: &RawTable,
    roles: &ColumnRoles,
    rules: &[ColumnRule<'_>],
) -> Result<Vec<usize>> {
    let mut resolved: Vec<usize> = Vec::with_capacity(rules.len());
    for rule in rules {
        let idx = resolve_column(raw, roles, *rule)?;
        if let Some(pos) = resolved.iter().position(|&other| other == idx) {
            return Err(ChartError::shape(format!(
                "roles '{}' and '{}' both resolve to column '{}'",
                rules[pos].role, rule.role, raw.headers[idx]
            )));
        }
        resolved.push(idx);
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Cell;

    fn table(headers: &[&str]) -> RawTable {
        RawTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            vec![vec![Cell::Integer(1); headers.len()]],
        )
    }

    #[test]
    fn named_column_beats_position() {
        let raw = table(&["id", "赤霉", "灰霉"]);
        let rule = ColumnRule::named(Role::GrayMold, "灰霉", 1);
        assert_eq!(resolve_column(&raw, &ColumnRoles::new(), rule).unwrap(), 2);
    }

    #[test]
    fn falls_back_to_position() {
        let raw = table(&["id", "a", "b"]);
        let rule = ColumnRule::named(Role::HeadBlight, "赤霉", 2);
        assert_eq!(resolve_column(&raw, &ColumnRoles::new(), rule).unwrap(), 2);
    }

    #[test]
    fn explicit_binding_must_exist() {
        let raw = table(&["id", "a"]);
        let mut roles = ColumnRoles::new();
        roles.insert(Role::Time, "minutes".into());
        let err = resolve_column(&raw, &roles, ColumnRule::positional(Role::Time, 0)).unwrap_err();
        assert!(matches!(err, ChartError::InputShape(_)));
    }

    #[test]
    fn missing_position_is_a_shape_error() {
        let raw = table(&["id"]);
        let rule = ColumnRule::positional(Role::Size, 2);
        assert!(resolve_column(&raw, &ColumnRoles::new(), rule).is_err());
    }

    #[test]
    fn distinct_roles_reject_shared_columns() {
        // "灰霉" sits where 赤霉 would fall back to.
        let raw = table(&["id", "x", "灰霉"]);
        let rules = [
            ColumnRule::named(Role::GrayMold, "灰霉", 1),
            ColumnRule::named(Role::HeadBlight, "赤霉", 2),
        ];
        assert!(resolve_distinct(&raw, &ColumnRoles::new(), &rules).is_err());
    }
}
