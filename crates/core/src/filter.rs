//! Closed filter grammar for `find`, `count`, bulk patch and bulk delete.
//!
//! ```text
//! filter := { "where"?: where, "order"?: order, "limit"?: u64, "skip"?: u64, "offset"?: u64 }
//! where  := { "and": [where, ..] } | { "or": [where, ..] }
//!         | { field: scalar | { op: operand, .. }, .. }
//! op     := eq | neq | gt | gte | lt | lte | inq | nin | like | nlike
//! order  := "field [ASC|DESC]" | ["field [ASC|DESC]", ..]
//! ```
//!
//! Sibling keys in one `where` object are AND-ed. Field names and operand
//! types are checked against the entity schema at parse time, so a parsed
//! [`Where`] can be evaluated in memory ([`Where::matches`]) or rendered to
//! SQL without further checks.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::entity::FieldSource;
use crate::error::CoreError;
use crate::schema::{self, FieldKind, FieldSpec, FieldValue};

/// Comparison operator of a single condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Inq,
    Nin,
    Like,
    NLike,
}

impl Operator {
    fn parse(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "eq" => Operator::Eq,
            "neq" => Operator::Neq,
            "gt" => Operator::Gt,
            "gte" => Operator::Gte,
            "lt" => Operator::Lt,
            "lte" => Operator::Lte,
            "inq" => Operator::Inq,
            "nin" => Operator::Nin,
            "like" => Operator::Like,
            "nlike" => Operator::NLike,
            _ => return None,
        })
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Inq => "inq",
            Operator::Nin => "nin",
            Operator::Like => "like",
            Operator::NLike => "nlike",
        }
    }
}

/// Right-hand side of a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(FieldValue),
    List(Vec<FieldValue>),
}

/// `field op operand`, with the field resolved against the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: &'static FieldSpec,
    pub op: Operator,
    pub operand: Operand,
}

impl Condition {
    fn matches(&self, source: &dyn FieldSource) -> bool {
        let actual = source
            .field_value(self.field.name)
            .unwrap_or(FieldValue::Null);

        match (&self.op, &self.operand) {
            (Operator::Eq, Operand::Value(v)) => actual == *v,
            (Operator::Neq, Operand::Value(v)) => actual != *v,
            (Operator::Gt, Operand::Value(v)) => compare(&actual, v) == Some(Ordering::Greater),
            (Operator::Gte, Operand::Value(v)) => matches!(
                compare(&actual, v),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            (Operator::Lt, Operand::Value(v)) => compare(&actual, v) == Some(Ordering::Less),
            (Operator::Lte, Operand::Value(v)) => {
                matches!(compare(&actual, v), Some(Ordering::Less | Ordering::Equal))
            }
            (Operator::Inq, Operand::List(list)) => list.contains(&actual),
            (Operator::Nin, Operand::List(list)) => !list.contains(&actual),
            (Operator::Like, Operand::Value(FieldValue::Text(pattern))) => match &actual {
                FieldValue::Text(text) => like_match(pattern, text),
                _ => false,
            },
            (Operator::NLike, Operand::Value(FieldValue::Text(pattern))) => match &actual {
                FieldValue::Text(text) => !like_match(pattern, text),
                _ => true,
            },
            _ => false,
        }
    }
}

/// Ordered comparison; `None` when either side is null or kinds differ.
fn compare(actual: &FieldValue, expected: &FieldValue) -> Option<Ordering> {
    match (actual, expected) {
        (FieldValue::Int(a), FieldValue::Int(b)) => Some(a.cmp(b)),
        (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
        (FieldValue::Bool(a), FieldValue::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// A boolean predicate over one entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Where {
    And(Vec<Where>),
    Or(Vec<Where>),
    Cond(Condition),
}

impl Where {
    /// `field == value`.
    pub fn equals(field: &'static FieldSpec, value: impl Into<FieldValue>) -> Self {
        Where::Cond(Condition {
            field,
            op: Operator::Eq,
            operand: Operand::Value(value.into()),
        })
    }

    /// `field IN values`.
    pub fn one_of(field: &'static FieldSpec, values: Vec<FieldValue>) -> Self {
        Where::Cond(Condition {
            field,
            op: Operator::Inq,
            operand: Operand::List(values),
        })
    }

    /// Conjoin a mandatory scope with an optional caller predicate.
    pub fn scoped(scope: Where, extra: Option<Where>) -> Self {
        match extra {
            Some(extra) => Where::And(vec![scope, extra]),
            None => scope,
        }
    }

    pub fn matches(&self, source: &dyn FieldSource) -> bool {
        match self {
            Where::And(items) => items.iter().all(|w| w.matches(source)),
            Where::Or(items) => items.iter().any(|w| w.matches(source)),
            Where::Cond(cond) => cond.matches(source),
        }
    }

    /// Parse a `where` JSON object against `fields`.
    pub fn parse(fields: &'static [FieldSpec], value: &Value) -> Result<Self, CoreError> {
        let Value::Object(object) = value else {
            return Err(invalid("`where` must be a JSON object"));
        };

        let mut clauses = Vec::with_capacity(object.len());
        for (key, value) in object {
            match key.as_str() {
                "and" | "or" => {
                    let Value::Array(items) = value else {
                        return Err(invalid(format!("`{key}` expects an array")));
                    };
                    let parsed = items
                        .iter()
                        .map(|item| Where::parse(fields, item))
                        .collect::<Result<Vec<_>, _>>()?;
                    clauses.push(if key == "and" {
                        Where::And(parsed)
                    } else {
                        Where::Or(parsed)
                    });
                }
                name => {
                    let spec = lookup(fields, name)?;
                    match value {
                        Value::Object(ops) => parse_operators(spec, ops, &mut clauses)?,
                        scalar => clauses.push(Where::Cond(Condition {
                            field: spec,
                            op: Operator::Eq,
                            operand: Operand::Value(parse_scalar(spec, scalar, true)?),
                        })),
                    }
                }
            }
        }

        Ok(if clauses.len() == 1 {
            clauses.remove(0)
        } else {
            Where::And(clauses)
        })
    }

    /// Parse the `?where=` query parameter (a JSON string). Blank means none.
    pub fn from_query(
        fields: &'static [FieldSpec],
        raw: Option<&str>,
    ) -> Result<Option<Self>, CoreError> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(None),
            Some(raw) => {
                let value: Value = serde_json::from_str(raw)
                    .map_err(|e| invalid(format!("`where` is not valid JSON: {e}")))?;
                Where::parse(fields, &value).map(Some)
            }
        }
    }
}

fn parse_operators(
    spec: &'static FieldSpec,
    ops: &Map<String, Value>,
    clauses: &mut Vec<Where>,
) -> Result<(), CoreError> {
    if ops.is_empty() {
        return Err(invalid(format!("empty operator object for `{}`", spec.name)));
    }
    for (keyword, operand) in ops {
        let op = Operator::parse(keyword)
            .ok_or_else(|| invalid(format!("unknown operator `{keyword}`")))?;
        let operand = match op {
            Operator::Eq | Operator::Neq => Operand::Value(parse_scalar(spec, operand, true)?),
            Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte => {
                Operand::Value(parse_scalar(spec, operand, false)?)
            }
            Operator::Inq | Operator::Nin => {
                let Value::Array(items) = operand else {
                    return Err(invalid(format!("`{keyword}` expects an array")));
                };
                Operand::List(
                    items
                        .iter()
                        .map(|item| parse_scalar(spec, item, false))
                        .collect::<Result<Vec<_>, _>>()?,
                )
            }
            Operator::Like | Operator::NLike => {
                if spec.kind != FieldKind::Text {
                    return Err(invalid(format!(
                        "`{keyword}` applies to string fields, `{}` is a {}",
                        spec.name,
                        spec.kind.label()
                    )));
                }
                Operand::Value(parse_scalar(spec, operand, false)?)
            }
        };
        clauses.push(Where::Cond(Condition {
            field: spec,
            op,
            operand,
        }));
    }
    Ok(())
}

fn parse_scalar(spec: &FieldSpec, value: &Value, allow_null: bool) -> Result<FieldValue, CoreError> {
    if value.is_null() {
        return if allow_null {
            Ok(FieldValue::Null)
        } else {
            Err(invalid(format!("`{}` cannot be compared with null", spec.name)))
        };
    }
    spec.kind.coerce(value).ok_or_else(|| {
        invalid(format!(
            "`{}` expects a {} operand",
            spec.name,
            spec.kind.label()
        ))
    })
}

fn lookup(fields: &'static [FieldSpec], name: &str) -> Result<&'static FieldSpec, CoreError> {
    schema::field(fields, name).ok_or_else(|| invalid(format!("unknown field `{name}`")))
}

fn invalid(message: impl Into<String>) -> CoreError {
    CoreError::InvalidFilter(message.into())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: &'static FieldSpec,
    pub direction: Direction,
}

impl OrderBy {
    fn parse(fields: &'static [FieldSpec], raw: &str) -> Result<Self, CoreError> {
        let mut parts = raw.split_whitespace();
        let name = parts
            .next()
            .ok_or_else(|| invalid("empty `order` entry"))?;
        let direction = match parts.next() {
            None => Direction::Asc,
            Some(d) if d.eq_ignore_ascii_case("asc") => Direction::Asc,
            Some(d) if d.eq_ignore_ascii_case("desc") => Direction::Desc,
            Some(d) => return Err(invalid(format!("unknown sort direction `{d}`"))),
        };
        if parts.next().is_some() {
            return Err(invalid(format!("malformed `order` entry `{raw}`")));
        }
        Ok(Self {
            field: lookup(fields, name)?,
            direction,
        })
    }
}

/// A parsed `filter` query: predicate, ordering and pagination.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub predicate: Option<Where>,
    pub order: Vec<OrderBy>,
    pub limit: Option<u64>,
    pub skip: Option<u64>,
}

impl Filter {
    /// A filter that only carries a predicate.
    pub fn with_predicate(predicate: Option<Where>) -> Self {
        Self {
            predicate,
            ..Self::default()
        }
    }

    pub fn parse(fields: &'static [FieldSpec], value: &Value) -> Result<Self, CoreError> {
        let Value::Object(object) = value else {
            return Err(invalid("`filter` must be a JSON object"));
        };

        let mut filter = Filter::default();
        for (key, value) in object {
            match key.as_str() {
                "where" => filter.predicate = Some(Where::parse(fields, value)?),
                "order" => {
                    filter.order = match value {
                        Value::String(s) => vec![OrderBy::parse(fields, s)?],
                        Value::Array(items) => items
                            .iter()
                            .map(|item| {
                                item.as_str()
                                    .ok_or_else(|| invalid("`order` entries must be strings"))
                                    .and_then(|s| OrderBy::parse(fields, s))
                            })
                            .collect::<Result<Vec<_>, _>>()?,
                        _ => return Err(invalid("`order` must be a string or array")),
                    }
                }
                "limit" => filter.limit = Some(non_negative(key, value)?),
                "skip" | "offset" => filter.skip = Some(non_negative(key, value)?),
                other => return Err(invalid(format!("unsupported filter key `{other}`"))),
            }
        }
        Ok(filter)
    }

    /// Parse the `?filter=` query parameter (a JSON string). Blank means
    /// the empty filter.
    pub fn from_query(fields: &'static [FieldSpec], raw: Option<&str>) -> Result<Self, CoreError> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(Filter::default()),
            Some(raw) => {
                let value: Value = serde_json::from_str(raw)
                    .map_err(|e| invalid(format!("`filter` is not valid JSON: {e}")))?;
                Filter::parse(fields, &value)
            }
        }
    }

    /// Conjoin a mandatory scope with this filter's predicate.
    pub fn scoped(mut self, scope: Where) -> Self {
        self.predicate = Some(Where::scoped(scope, self.predicate.take()));
        self
    }

    /// Evaluate the filter over rows that are already in id order.
    ///
    /// Sorting is stable, so rows that tie on every order key keep id order.
    pub fn apply<T: FieldSource>(&self, rows: impl IntoIterator<Item = T>) -> Vec<T> {
        let mut matched: Vec<T> = rows
            .into_iter()
            .filter(|row| self.predicate.as_ref().map_or(true, |w| w.matches(row)))
            .collect();

        if !self.order.is_empty() {
            matched.sort_by(|a, b| {
                for key in &self.order {
                    let left = a.field_value(key.field.name).unwrap_or(FieldValue::Null);
                    let right = b.field_value(key.field.name).unwrap_or(FieldValue::Null);
                    let ordering = match key.direction {
                        Direction::Asc => left.cmp(&right),
                        Direction::Desc => right.cmp(&left),
                    };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
        }

        let skip = usize::try_from(self.skip.unwrap_or(0)).unwrap_or(usize::MAX);
        let limit = self
            .limit
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
        matched.into_iter().skip(skip).take(limit).collect()
    }
}

fn non_negative(key: &str, value: &Value) -> Result<u64, CoreError> {
    value
        .as_u64()
        .ok_or_else(|| invalid(format!("`{key}` must be a non-negative integer")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LikeToken {
    Any,
    One,
    Lit(char),
}

/// SQL `LIKE` matching: `%` matches any run, `_` one character, `\`
/// escapes the next character.
pub fn like_match(pattern: &str, text: &str) -> bool {
    let mut tokens = Vec::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '%' => LikeToken::Any,
            '_' => LikeToken::One,
            '\\' => LikeToken::Lit(chars.next().unwrap_or('\\')),
            c => LikeToken::Lit(c),
        });
    }
    let text: Vec<char> = text.chars().collect();

    let (mut pi, mut ti) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;
    while ti < text.len() {
        match tokens.get(pi) {
            Some(LikeToken::Any) => {
                backtrack = Some((pi, ti));
                pi += 1;
                continue;
            }
            Some(LikeToken::One) => {
                pi += 1;
                ti += 1;
                continue;
            }
            Some(LikeToken::Lit(c)) if *c == text[ti] => {
                pi += 1;
                ti += 1;
                continue;
            }
            _ => {}
        }
        match backtrack {
            Some((star, resume)) => {
                pi = star + 1;
                ti = resume + 1;
                backtrack = Some((star, resume + 1));
            }
            None => return false,
        }
    }
    tokens[pi..].iter().all(|t| *t == LikeToken::Any)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    static FIELDS: &[FieldSpec] = &[
        FieldSpec::id(),
        FieldSpec::required("title", "title", FieldKind::Text),
        FieldSpec::optional("isComplete", "is_complete", FieldKind::Bool),
        FieldSpec::optional("listId", "list_id", FieldKind::Integer),
    ];

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: i64,
        title: &'static str,
        is_complete: bool,
        list_id: Option<i64>,
    }

    impl FieldSource for Row {
        fn field_value(&self, name: &str) -> Option<FieldValue> {
            Some(match name {
                "id" => self.id.into(),
                "title" => self.title.into(),
                "isComplete" => self.is_complete.into(),
                "listId" => self.list_id.into(),
                _ => return None,
            })
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { id: 1, title: "Buy milk", is_complete: false, list_id: Some(1) },
            Row { id: 2, title: "Walk dog", is_complete: true, list_id: Some(1) },
            Row { id: 3, title: "Buy bread", is_complete: true, list_id: Some(2) },
            Row { id: 4, title: "Call mom", is_complete: false, list_id: None },
        ]
    }

    fn ids(rows: Vec<Row>) -> Vec<i64> {
        rows.into_iter().map(|r| r.id).collect()
    }

    fn run(filter: Value) -> Vec<i64> {
        let filter = Filter::parse(FIELDS, &filter).unwrap();
        ids(filter.apply(rows()))
    }

    #[test]
    fn empty_filter_keeps_id_order() {
        assert_eq!(ids(Filter::default().apply(rows())), vec![1, 2, 3, 4]);
    }

    #[test]
    fn scalar_shorthand_is_equality() {
        assert_eq!(run(json!({"where": {"isComplete": true}})), vec![2, 3]);
        assert_eq!(run(json!({"where": {"listId": null}})), vec![4]);
    }

    #[test]
    fn sibling_keys_are_conjoined() {
        assert_eq!(
            run(json!({"where": {"isComplete": true, "listId": 1}})),
            vec![2]
        );
    }

    #[test]
    fn comparison_operators_skip_nulls() {
        assert_eq!(run(json!({"where": {"listId": {"gte": 1}}})), vec![1, 2, 3]);
        assert_eq!(run(json!({"where": {"listId": {"lt": 2}}})), vec![1, 2]);
        assert_eq!(run(json!({"where": {"listId": {"neq": 1}}})), vec![3, 4]);
    }

    #[test]
    fn set_and_pattern_operators() {
        assert_eq!(run(json!({"where": {"id": {"inq": [1, 4, 9]}}})), vec![1, 4]);
        assert_eq!(run(json!({"where": {"id": {"nin": [1, 4]}}})), vec![2, 3]);
        assert_eq!(run(json!({"where": {"title": {"like": "Buy%"}}})), vec![1, 3]);
        assert_eq!(run(json!({"where": {"title": {"nlike": "%o%"}}})), vec![1, 3]);
    }

    #[test]
    fn and_or_nest() {
        let filter = json!({"where": {"or": [
            {"title": "Call mom"},
            {"and": [{"isComplete": true}, {"listId": 2}]}
        ]}});
        assert_eq!(run(filter), vec![3, 4]);
    }

    #[test]
    fn order_skip_limit() {
        assert_eq!(run(json!({"order": "title DESC"})), vec![2, 4, 1, 3]);
        assert_eq!(
            run(json!({"order": ["isComplete ASC", "id DESC"], "skip": 1, "limit": 2})),
            vec![1, 3]
        );
        assert_eq!(run(json!({"offset": 3})), vec![4]);
    }

    #[test]
    fn scoped_filter_conjoins_predicate() {
        let scope = Where::equals(&FIELDS[3], 1_i64);
        let filter = Filter::parse(FIELDS, &json!({"where": {"isComplete": false}}))
            .unwrap()
            .scoped(scope);
        assert_eq!(ids(filter.apply(rows())), vec![1]);
    }

    #[test]
    fn rejects_unknown_fields_and_operators() {
        assert_matches!(
            Filter::parse(FIELDS, &json!({"where": {"colour": "red"}})),
            Err(CoreError::InvalidFilter(_))
        );
        assert_matches!(
            Filter::parse(FIELDS, &json!({"where": {"id": {"regexp": "x"}}})),
            Err(CoreError::InvalidFilter(_))
        );
        assert_matches!(
            Filter::parse(FIELDS, &json!({"include": ["todos"]})),
            Err(CoreError::InvalidFilter(_))
        );
        assert_matches!(
            Filter::parse(FIELDS, &json!({"order": "title SIDEWAYS"})),
            Err(CoreError::InvalidFilter(_))
        );
    }

    #[test]
    fn rejects_mistyped_operands() {
        assert_matches!(
            Filter::parse(FIELDS, &json!({"where": {"id": "one"}})),
            Err(CoreError::InvalidFilter(_))
        );
        assert_matches!(
            Filter::parse(FIELDS, &json!({"where": {"id": {"like": "1%"}}})),
            Err(CoreError::InvalidFilter(_))
        );
        assert_matches!(
            Filter::parse(FIELDS, &json!({"where": {"id": {"gt": null}}})),
            Err(CoreError::InvalidFilter(_))
        );
        assert_matches!(
            Filter::parse(FIELDS, &json!({"limit": -1})),
            Err(CoreError::InvalidFilter(_))
        );
    }

    #[test]
    fn query_strings_parse_json() {
        assert_eq!(Filter::from_query(FIELDS, None).unwrap(), Filter::default());
        assert_eq!(Filter::from_query(FIELDS, Some("  ")).unwrap(), Filter::default());
        assert_matches!(
            Filter::from_query(FIELDS, Some("{not json")),
            Err(CoreError::InvalidFilter(_))
        );

        let predicate = Where::from_query(FIELDS, Some(r#"{"title":"Walk dog"}"#))
            .unwrap()
            .unwrap();
        assert_eq!(predicate, Where::equals(&FIELDS[1], "Walk dog"));
    }

    #[test]
    fn like_wildcards() {
        assert!(like_match("%", ""));
        assert!(like_match("a_c", "abc"));
        assert!(!like_match("a_c", "abbc"));
        assert!(like_match("%milk", "Buy milk"));
        assert!(like_match("B%y%k", "Buy milk"));
        assert!(!like_match("Buy", "Buy milk"));
        assert!(like_match("100\\%", "100%"));
        assert!(!like_match("100\\%", "1000"));
    }
}
