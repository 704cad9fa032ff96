//! Grouping and APPLY aggregations.
//!
//! Records are partitioned by the tuple of their GROUP values, rendered as
//! text. Groups keep the order in which their first record was seen. SUM and
//! AVG accumulate in `rust_decimal` and round to two places once, at the end.
//! Values outside the `Decimal` range fall back to `f64` accumulation.

use super::ast::{ApplyRule, ApplyToken, Transform};
use super::executor::{attribute, numeric_attribute, ExecutionError, ResultRow};
use crate::models::{AttrRef, AttrValue, Record};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

/// Decimal places kept by SUM and AVG.
const ROUND_DP: u32 = 2;

/// Groups `records` and computes every APPLY rule per group.
///
/// Each output row carries the GROUP fields (as text) followed by the APPLY
/// output keys.
pub(super) fn group_and_apply(
    records: &[&dyn Record],
    transform: &Transform,
) -> Result<Vec<ResultRow>, ExecutionError> {
    partition(records, &transform.group_by)?
        .into_iter()
        .map(|(key, members)| {
            let mut row = ResultRow::with_capacity(key.len() + transform.apply.len());
            for (field, value) in transform.group_by.iter().zip(key) {
                row.push(field.clone(), AttrValue::Text(value));
            }
            for rule in &transform.apply {
                row.push(rule.output_key.clone(), apply_rule(rule, &members)?);
            }
            Ok(row)
        })
        .collect()
}

type Group<'r> = (Vec<String>, Vec<&'r dyn Record>);

fn partition<'r>(
    records: &[&'r dyn Record],
    group_by: &[String],
) -> Result<Vec<Group<'r>>, ExecutionError> {
    let mut index: HashMap<Vec<String>, usize> = HashMap::new();
    let mut groups: Vec<Group<'r>> = Vec::new();

    for &record in records {
        let key = group_by
            .iter()
            .map(|field| attribute(record, field).map(AttrRef::to_key_text))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(&position) = index.get(&key) {
            groups[position].1.push(record);
        } else {
            index.insert(key.clone(), groups.len());
            groups.push((key, vec![record]));
        }
    }

    Ok(groups)
}

/// Computes one APPLY rule over a group.
fn apply_rule(rule: &ApplyRule, group: &[&dyn Record]) -> Result<AttrValue, ExecutionError> {
    let field = rule.field.as_str();
    match rule.token {
        ApplyToken::Count => count_distinct(group, field),
        ApplyToken::Max => numbers(group, field)?
            .into_iter()
            .reduce(f64::max)
            .map(AttrValue::Number)
            .ok_or_else(|| ExecutionError::EmptyGroup(rule.to_string())),
        ApplyToken::Min => numbers(group, field)?
            .into_iter()
            .reduce(f64::min)
            .map(AttrValue::Number)
            .ok_or_else(|| ExecutionError::EmptyGroup(rule.to_string())),
        ApplyToken::Sum => Ok(AttrValue::Number(sum_or_mean(&numbers(group, field)?, false))),
        ApplyToken::Avg => {
            let values = numbers(group, field)?;
            if values.is_empty() {
                return Err(ExecutionError::EmptyGroup(rule.to_string()));
            }
            Ok(AttrValue::Number(sum_or_mean(&values, true)))
        }
        ApplyToken::Unknown(ref token) => Err(ExecutionError::UnsupportedAggregation(token.clone())),
    }
}

fn numbers(group: &[&dyn Record], field: &str) -> Result<Vec<f64>, ExecutionError> {
    group
        .iter()
        .map(|record| numeric_attribute(*record, field))
        .collect()
}

/// Hashable form of an attribute value for distinct counting.
#[derive(PartialEq, Eq, Hash)]
enum DistinctKey<'r> {
    Text(&'r str),
    Number(u64),
}

fn count_distinct(group: &[&dyn Record], field: &str) -> Result<AttrValue, ExecutionError> {
    let mut seen = HashSet::new();
    for record in group {
        let key = match attribute(*record, field)? {
            AttrRef::Text(s) => DistinctKey::Text(s),
            // -0.0 and 0.0 count as one value
            AttrRef::Number(n) => DistinctKey::Number((n + 0.0).to_bits()),
        };
        seen.insert(key);
    }

    #[allow(clippy::cast_precision_loss)]
    Ok(AttrValue::Number(seen.len() as f64))
}

/// SUM or AVG rounded to two places, accumulated exactly where possible.
fn sum_or_mean(values: &[f64], mean: bool) -> f64 {
    decimal_sum_or_mean(values, mean).unwrap_or_else(|| {
        tracing::debug!(values = values.len(), "Decimal range exceeded, aggregating as f64");
        float_sum_or_mean(values, mean)
    })
}

/// `None` when a value or the total falls outside the `Decimal` range.
fn decimal_sum_or_mean(values: &[f64], mean: bool) -> Option<f64> {
    let mut total = Decimal::ZERO;
    for value in values {
        total = total.checked_add(Decimal::from_str(&value.to_string()).ok()?)?;
    }
    if mean {
        total = total.checked_div(Decimal::from(values.len()))?;
    }
    total
        .round_dp_with_strategy(ROUND_DP, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
}

/// Values this large carry no fractional digits worth rounding.
const FLOAT_ROUNDING_LIMIT: f64 = 1e15;

#[allow(clippy::cast_precision_loss)]
fn float_sum_or_mean(values: &[f64], mean: bool) -> f64 {
    let total: f64 = values.iter().sum();
    let value = if mean {
        total / values.len() as f64
    } else {
        total
    };
    if value.abs() < FLOAT_ROUNDING_LIMIT {
        (value * 100.0).round() / 100.0
    } else {
        value
    }
}
