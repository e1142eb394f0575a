//! PostgreSQL rendering of the query representation.
//!
//! Every value is bound as a parameter; only identifiers from the static
//! entity registry and rank positions are written into the SQL text.

use sqlx::{Postgres, QueryBuilder};

use projectx_entity::{EntityMeta, Value};

use super::predicate::{ColumnRef, Join, JoinKind, Predicate};
use super::statement::{Delete, Insert, OrderExpr, OrderTerm, Projection, Select, Update};

/// A query builder that owns all of its bound arguments.
pub type PgQuery = QueryBuilder<'static, Postgres>;

pub fn select(select: &Select) -> PgQuery {
    let mut qb = PgQuery::new("SELECT ");
    if select.distinct {
        qb.push("DISTINCT ");
    }
    match &select.projection {
        Projection::Columns(columns) => {
            for (i, selected) in columns.iter().enumerate() {
                if i > 0 {
                    qb.push(", ");
                }
                push_column(&mut qb, &selected.column);
            }
        }
        Projection::Count => {
            qb.push("COUNT(*)");
        }
        Projection::CountDistinct(column) => {
            qb.push("COUNT(DISTINCT ");
            push_column(&mut qb, column);
            qb.push(")");
        }
    }
    qb.push(" FROM ")
        .push(select.from.table)
        .push(" ")
        .push(&select.from.alias);
    for join in &select.joins {
        push_join(&mut qb, join);
    }
    if let Some(filter) = &select.filter {
        qb.push(" WHERE ");
        push_predicate(&mut qb, filter, false);
    }
    if !select.order_by.is_empty() {
        qb.push(" ORDER BY ");
        for (i, term) in select.order_by.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            push_order(&mut qb, term);
        }
    }
    if let Some(limit) = select.limit {
        qb.push(" LIMIT ").push_bind(to_i64(limit));
    }
    if let Some(offset) = select.offset {
        qb.push(" OFFSET ").push_bind(to_i64(offset));
    }
    qb
}

pub fn update(update: &Update) -> PgQuery {
    let mut qb = PgQuery::new("UPDATE ");
    qb.push(update.table.table)
        .push(" AS ")
        .push(&update.table.alias)
        .push(" SET ");
    for (i, (column, value)) in update.assignments.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(*column).push(" = ");
        push_value(&mut qb, value);
    }
    qb.push(" WHERE ");
    push_predicate(&mut qb, &update.filter, false);
    qb
}

pub fn delete(delete: &Delete) -> PgQuery {
    let mut qb = PgQuery::new("DELETE FROM ");
    qb.push(delete.table.table)
        .push(" AS ")
        .push(&delete.table.alias)
        .push(" WHERE ");
    push_predicate(&mut qb, &delete.filter, false);
    qb
}

pub fn insert(insert: &Insert) -> PgQuery {
    let mut qb = PgQuery::new("INSERT INTO ");
    qb.push(insert.table).push(" (");
    for (i, (column, _)) in insert.values.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(*column);
    }
    qb.push(") VALUES (");
    for (i, (_, value)) in insert.values.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        push_value(&mut qb, value);
    }
    qb.push(") RETURNING ").push(EntityMeta::ID);
    qb
}

/// Escape `LIKE` wildcards so the needle matches literally.
pub fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_column(qb: &mut PgQuery, column: &ColumnRef) {
    qb.push(&column.alias).push(".").push(column.column);
}

fn push_join(qb: &mut PgQuery, join: &Join) {
    qb.push(match join.kind {
        JoinKind::Inner => " INNER JOIN ",
        JoinKind::Left => " LEFT JOIN ",
    });
    qb.push(join.table.table)
        .push(" ")
        .push(&join.table.alias)
        .push(" ON ");
    push_predicate(qb, &join.on, false);
}

fn push_predicate(qb: &mut PgQuery, predicate: &Predicate, nested: bool) {
    match predicate {
        Predicate::Compare { column, op, value } => {
            push_column(qb, column);
            qb.push(" ").push(op.as_sql()).push(" ");
            push_value(qb, value);
        }
        Predicate::ColumnsEqual(left, right) => {
            push_column(qb, left);
            qb.push(" = ");
            push_column(qb, right);
        }
        Predicate::InList {
            column,
            values,
            negated,
        } => {
            if values.is_empty() {
                qb.push(if *negated { "1 = 1" } else { "1 = 0" });
                return;
            }
            push_column(qb, column);
            qb.push(if *negated { " NOT IN (" } else { " IN (" });
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    qb.push(", ");
                }
                push_value(qb, value);
            }
            qb.push(")");
        }
        Predicate::Contains { column, needle } => {
            push_column(qb, column);
            qb.push(" ILIKE ")
                .push_bind(format!("%{}%", escape_like(needle)))
                .push(" ESCAPE '\\'");
        }
        Predicate::And(parts) => push_group(qb, parts, " AND ", "1 = 1", nested),
        Predicate::Or(parts) => push_group(qb, parts, " OR ", "1 = 0", nested),
        Predicate::Exists(sub) => {
            qb.push("EXISTS (SELECT 1 FROM ")
                .push(sub.from.table)
                .push(" ")
                .push(&sub.from.alias);
            for join in &sub.joins {
                push_join(qb, join);
            }
            qb.push(" WHERE ");
            push_predicate(qb, &sub.filter, false);
            qb.push(")");
        }
    }
}

fn push_group(qb: &mut PgQuery, parts: &[Predicate], separator: &str, empty: &str, nested: bool) {
    if parts.is_empty() {
        qb.push(empty);
        return;
    }
    let wrap = nested && parts.len() > 1;
    if wrap {
        qb.push("(");
    }
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            qb.push(separator);
        }
        push_predicate(qb, part, true);
    }
    if wrap {
        qb.push(")");
    }
}

fn push_order(qb: &mut PgQuery, term: &OrderTerm) {
    match &term.expr {
        OrderExpr::Column(column) => push_column(qb, column),
        OrderExpr::Related {
            target,
            key,
            foreign_key,
            column,
        } => {
            qb.push("(SELECT ")
                .push(&target.alias)
                .push(".")
                .push(*column)
                .push(" FROM ")
                .push(target.table)
                .push(" ")
                .push(&target.alias)
                .push(" WHERE ")
                .push(&target.alias)
                .push(".")
                .push(*key)
                .push(" = ");
            push_column(qb, foreign_key);
            qb.push(")");
        }
        OrderExpr::Rank { column, ids } => {
            qb.push("CASE ");
            push_column(qb, column);
            for (position, id) in ids.iter().enumerate() {
                qb.push(" WHEN ").push_bind(*id).push(" THEN ").push(position);
            }
            qb.push(" ELSE ").push(ids.len()).push(" END");
        }
    }
    qb.push(" ").push(term.direction.as_sql());
}

fn push_value(qb: &mut PgQuery, value: &Value) {
    match value {
        Value::Null => {
            qb.push("NULL");
        }
        Value::Int(v) => {
            qb.push_bind(*v);
        }
        Value::Text(v) => {
            qb.push_bind(v.clone());
        }
        Value::Timestamp(v) => {
            qb.push_bind(*v);
        }
    }
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use projectx_core::types::SortDirection;
    use projectx_entity::administrator::model::ADMINISTRATOR;
    use projectx_entity::administrator::login_history::LOGIN_HISTORY;
    use projectx_entity::role::administrator_role::ADMINISTRATOR_ROLE;
    use projectx_entity::role::model::ROLE;

    use super::*;
    use crate::query::{Conjunction, OrderTerm, Scope, Selected};

    #[test]
    fn test_select_with_exists_keyword_and_window() {
        let mut scope = Scope::new();
        let root = scope.bind(&ADMINISTRATOR);
        let link = scope.bind(&ADMINISTRATOR_ROLE);
        let role = scope.bind(&ROLE);

        let mut filter = Conjunction::new();
        filter.and(Predicate::eq(root.col("status"), "ACTIVE"));
        filter.and(Predicate::Or(vec![
            Predicate::contains(root.col("name"), "ad"),
            Predicate::contains(root.col("login_id"), "ad"),
        ]));
        filter.and(Predicate::exists(
            link.clone(),
            vec![Join {
                kind: JoinKind::Inner,
                table: role.clone(),
                on: Predicate::ColumnsEqual(role.id(), link.col("role_id")),
            }],
            Predicate::And(vec![
                Predicate::ColumnsEqual(link.col("admin_id"), root.id()),
                Predicate::eq(role.col("name"), "auditor"),
            ]),
        ));

        let stmt = Select::ids(root.clone())
            .filter(filter.into_predicate())
            .order_by(vec![
                OrderTerm::column(root.col("name"), SortDirection::Asc),
                OrderTerm::column(root.id(), SortDirection::Asc),
            ])
            .window(Some(20), Some(10));

        assert_eq!(
            select(&stmt).sql(),
            "SELECT t0.id FROM mjr_admin t0 WHERE t0.status = $1 \
             AND (t0.name ILIKE $2 ESCAPE '\\' OR t0.login_id ILIKE $3 ESCAPE '\\') \
             AND EXISTS (SELECT 1 FROM mjr_admin_x_role t1 INNER JOIN mjr_role t2 ON t2.id = t1.role_id \
             WHERE t1.admin_id = t0.id AND t2.name = $4) \
             ORDER BY t0.name ASC, t0.id ASC LIMIT $5 OFFSET $6"
        );
    }

    #[test]
    fn test_count_distinct_and_in_list() {
        let mut scope = Scope::new();
        let root = scope.bind(&ROLE);
        let stmt = Select::new(root.clone(), Projection::CountDistinct(root.id()))
            .filter(Some(Predicate::not_in(root.id(), [3_i64, 4])));
        assert_eq!(
            select(&stmt).sql(),
            "SELECT COUNT(DISTINCT t0.id) FROM mjr_role t0 WHERE t0.id NOT IN ($1, $2)"
        );
    }

    #[test]
    fn test_rank_ordering_and_left_join() {
        let mut scope = Scope::new();
        let root = scope.bind(&ROLE);
        let child = scope.bind(&ADMINISTRATOR_ROLE);
        let mut columns = Selected::entity(&root, &ROLE);
        columns.truncate(1);
        let stmt = Select::new(root.clone(), Projection::Columns(columns))
            .joins(vec![Join {
                kind: JoinKind::Left,
                table: child.clone(),
                on: Predicate::ColumnsEqual(child.col("role_id"), root.id()),
            }])
            .filter(Some(Predicate::in_list(root.id(), [9_i64, 2])))
            .order_by(vec![OrderTerm {
                expr: OrderExpr::Rank {
                    column: root.id(),
                    ids: vec![9, 2],
                },
                direction: SortDirection::Asc,
            }]);
        assert_eq!(
            select(&stmt).sql(),
            "SELECT t0.id FROM mjr_role t0 LEFT JOIN mjr_admin_x_role t1 ON t1.role_id = t0.id \
             WHERE t0.id IN ($1, $2) ORDER BY CASE t0.id WHEN $3 THEN 0 WHEN $4 THEN 1 ELSE 2 END ASC"
        );
    }

    #[test]
    fn test_related_order_uses_scalar_subselect() {
        let mut scope = Scope::new();
        let root = scope.bind(&LOGIN_HISTORY);
        let admin = scope.bind(&ADMINISTRATOR);
        let stmt = Select::ids(root.clone()).order_by(vec![OrderTerm {
            expr: OrderExpr::Related {
                target: admin,
                key: "id",
                foreign_key: root.col("admin_id"),
                column: "name",
            },
            direction: SortDirection::Desc,
        }]);
        assert_eq!(
            select(&stmt).sql(),
            "SELECT t0.id FROM mjr_admin_login_history t0 \
             ORDER BY (SELECT t1.name FROM mjr_admin t1 WHERE t1.id = t0.admin_id) DESC"
        );
    }

    #[test]
    fn test_update_delete_insert() {
        let mut scope = Scope::new();
        let root = scope.bind(&ADMINISTRATOR);
        let stmt = Update {
            table: root.clone(),
            assignments: vec![("status", Value::from("SUSPENDED")), ("updated_by", Value::Int(1))],
            filter: Predicate::in_list(root.id(), [1_i64, 2, 3]),
        };
        assert_eq!(
            update(&stmt).sql(),
            "UPDATE mjr_admin AS t0 SET status = $1, updated_by = $2 WHERE t0.id IN ($3, $4, $5)"
        );

        let stmt = Delete {
            table: root.clone(),
            filter: Predicate::eq(root.id(), 5_i64),
        };
        assert_eq!(delete(&stmt).sql(), "DELETE FROM mjr_admin AS t0 WHERE t0.id = $1");

        let stmt = Insert {
            table: "mjr_role",
            values: vec![("name", Value::from("auditor")), ("description", Value::Null)],
        };
        assert_eq!(
            insert(&stmt).sql(),
            "INSERT INTO mjr_role (name, description) VALUES ($1, NULL) RETURNING id"
        );
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
