//! Rendering of filters and write DTOs to PostgreSQL statements.
//!
//! Every value is bound through [`QueryBuilder::push_bind`]; only column and
//! table names (which come from the static field schema) are spliced into
//! the SQL text. The rendering mirrors the in-memory evaluation in
//! `todolist_core::filter` exactly:
//!
//! - `eq null` / `neq null` become `IS NULL` / `IS NOT NULL`, and `neq` on a
//!   value uses `IS DISTINCT FROM` so null columns match it.
//! - `nin` and `nlike` also match null columns.
//! - Text comparisons and ordering use the `"C"` collation (byte order).
//! - Ascending order puts nulls first, descending puts them last, and `id`
//!   is always the final tie-breaker.

use sqlx::{Postgres, QueryBuilder};
use todolist_core::entity::{Entity, Record};
use todolist_core::filter::{Condition, Direction, Filter, Operand, Operator, OrderBy, Where};
use todolist_core::schema::{FieldKind, FieldSpec, FieldValue};

pub type PgQuery = QueryBuilder<'static, Postgres>;

/// Comma-separated list of every column of `E`, in schema order.
pub fn column_list<E: Entity>() -> String {
    E::FIELDS
        .iter()
        .map(|f| f.column)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Column reference, collated bytewise for text fields.
fn push_column(qb: &mut PgQuery, field: &FieldSpec) {
    qb.push(field.column);
    if field.kind == FieldKind::Text {
        qb.push(" COLLATE \"C\"");
    }
}

pub fn push_value(qb: &mut PgQuery, value: &FieldValue) {
    match value {
        FieldValue::Null => {
            qb.push("NULL");
        }
        FieldValue::Bool(b) => {
            qb.push_bind(*b);
        }
        FieldValue::Int(i) => {
            qb.push_bind(*i);
        }
        FieldValue::Text(s) => {
            qb.push_bind(s.clone());
        }
    }
}

fn push_list(qb: &mut PgQuery, values: &[FieldValue]) {
    qb.push("(");
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        push_value(qb, value);
    }
    qb.push(")");
}

fn push_condition(qb: &mut PgQuery, cond: &Condition) {
    let column = cond.field.column;
    match (cond.op, &cond.operand) {
        (Operator::Eq, Operand::Value(FieldValue::Null)) => {
            qb.push(column).push(" IS NULL");
        }
        (Operator::Neq, Operand::Value(FieldValue::Null)) => {
            qb.push(column).push(" IS NOT NULL");
        }
        (Operator::Eq, Operand::Value(value)) => {
            qb.push(column).push(" = ");
            push_value(qb, value);
        }
        (Operator::Neq, Operand::Value(value)) => {
            qb.push(column).push(" IS DISTINCT FROM ");
            push_value(qb, value);
        }
        (Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte, Operand::Value(value)) => {
            let symbol = match cond.op {
                Operator::Gt => " > ",
                Operator::Gte => " >= ",
                Operator::Lt => " < ",
                _ => " <= ",
            };
            push_column(qb, cond.field);
            qb.push(symbol);
            push_value(qb, value);
        }
        (Operator::Inq, Operand::List(values)) if values.is_empty() => {
            qb.push("FALSE");
        }
        (Operator::Inq, Operand::List(values)) => {
            qb.push(column).push(" IN ");
            push_list(qb, values);
        }
        (Operator::Nin, Operand::List(values)) if values.is_empty() => {
            qb.push("TRUE");
        }
        (Operator::Nin, Operand::List(values)) => {
            qb.push("(").push(column).push(" IS NULL OR ").push(column).push(" NOT IN ");
            push_list(qb, values);
            qb.push(")");
        }
        (Operator::Like, Operand::Value(value)) => {
            qb.push(column).push(" LIKE ");
            push_value(qb, value);
        }
        (Operator::NLike, Operand::Value(value)) => {
            qb.push("(").push(column).push(" IS NULL OR ").push(column).push(" NOT LIKE ");
            push_value(qb, value);
            qb.push(")");
        }
        // The parser never pairs a scalar operator with a list or vice versa.
        _ => {
            qb.push("FALSE");
        }
    }
}

/// Render a predicate. Empty `and` is true, empty `or` is false.
pub fn push_where(qb: &mut PgQuery, predicate: &Where) {
    match predicate {
        Where::Cond(cond) => push_condition(qb, cond),
        Where::And(items) | Where::Or(items) if items.is_empty() => {
            qb.push(if matches!(predicate, Where::And(_)) {
                "TRUE"
            } else {
                "FALSE"
            });
        }
        Where::And(items) | Where::Or(items) => {
            let joiner = if matches!(predicate, Where::And(_)) {
                " AND "
            } else {
                " OR "
            };
            qb.push("(");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    qb.push(joiner);
                }
                push_where(qb, item);
            }
            qb.push(")");
        }
    }
}

fn push_where_clause(qb: &mut PgQuery, predicate: Option<&Where>) {
    if let Some(predicate) = predicate {
        qb.push(" WHERE ");
        push_where(qb, predicate);
    }
}

pub fn push_order(qb: &mut PgQuery, order: &[OrderBy]) {
    qb.push(" ORDER BY ");
    for key in order {
        push_column(qb, key.field);
        qb.push(match key.direction {
            Direction::Asc => " ASC NULLS FIRST, ",
            Direction::Desc => " DESC NULLS LAST, ",
        });
    }
    qb.push("id ASC");
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// `SELECT` for [`EntityStore::find`](crate::store::EntityStore::find).
pub fn select<E: Entity>(filter: &Filter) -> PgQuery {
    let mut qb = PgQuery::new(format!("SELECT {} FROM {}", column_list::<E>(), E::TABLE));
    push_where_clause(&mut qb, filter.predicate.as_ref());
    push_order(&mut qb, &filter.order);
    if let Some(limit) = filter.limit {
        qb.push(" LIMIT ").push_bind(to_i64(limit));
    }
    if let Some(skip) = filter.skip {
        qb.push(" OFFSET ").push_bind(to_i64(skip));
    }
    qb
}

pub fn count<E: Entity>(predicate: Option<&Where>) -> PgQuery {
    let mut qb = PgQuery::new(format!("SELECT COUNT(*) FROM {}", E::TABLE));
    push_where_clause(&mut qb, predicate);
    qb
}

pub fn insert<E: Entity>(input: &E::Create) -> PgQuery {
    let columns = input.columns();
    let names = columns
        .iter()
        .map(|(column, _)| *column)
        .collect::<Vec<_>>()
        .join(", ");

    let mut qb = PgQuery::new(format!("INSERT INTO {} ({names}) VALUES (", E::TABLE));
    for (i, (_, value)) in columns.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        push_value(&mut qb, value);
    }
    qb.push(") RETURNING ").push(column_list::<E>());
    qb
}

/// `UPDATE ... SET` for the given columns. Returns `None` when there is
/// nothing to set.
pub fn update<E: Entity>(
    record: &impl Record,
    predicate: Option<&Where>,
) -> Option<PgQuery> {
    let columns = record.columns();
    if columns.is_empty() {
        return None;
    }

    let mut qb = PgQuery::new(format!("UPDATE {} SET ", E::TABLE));
    for (i, (column, value)) in columns.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(*column).push(" = ");
        push_value(&mut qb, value);
    }
    push_where_clause(&mut qb, predicate);
    Some(qb)
}

pub fn delete<E: Entity>(predicate: Option<&Where>) -> PgQuery {
    let mut qb = PgQuery::new(format!("DELETE FROM {}", E::TABLE));
    push_where_clause(&mut qb, predicate);
    qb
}
