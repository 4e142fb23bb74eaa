//! SQL generation
//!
//! Renders filters, orderings and update sets to PostgreSQL fragments with
//! numbered placeholders. Values are returned in placeholder order.

use crate::query_builder::filter::{LogicalOperator, Operand, QueryCondition, QueryFilter, QueryOperator};
use crate::query_builder::ordering::SortOrder;
use crate::query_builder::update::UpdateSet;
use crate::value::SqlValue;

pub struct SqlGenerator;

impl SqlGenerator {
    /// Build WHERE clause from conditions, numbering placeholders from `first_param`
    pub fn build_where_clause(conditions: &[QueryFilter], first_param: usize) -> (String, Vec<SqlValue>) {
        if conditions.is_empty() {
            return ("".to_string(), Vec::new());
        }

        let mut values = Vec::new();
        let mut param_counter = first_param;

        let conditions_sql = conditions
            .iter()
            .map(|condition| Self::build_condition_sql(condition, &mut values, &mut param_counter))
            .collect::<Vec<_>>()
            .join(" AND ");

        (format!("WHERE {}", conditions_sql), values)
    }

    fn build_condition_sql(
        filter: &QueryFilter,
        values: &mut Vec<SqlValue>,
        param_counter: &mut usize,
    ) -> String {
        match filter {
            QueryFilter::Condition(condition) => {
                Self::build_single_condition_sql(condition, values, param_counter)
            }
            QueryFilter::Group { operator, filters } => {
                if filters.is_empty() {
                    // Empty AND is vacuously true, empty OR matches nothing
                    return match operator {
                        LogicalOperator::And => "1=1".to_string(),
                        LogicalOperator::Or => "1=0".to_string(),
                    };
                }

                let operator_str = match operator {
                    LogicalOperator::And => " AND ",
                    LogicalOperator::Or => " OR ",
                };

                let group_conditions = filters
                    .iter()
                    .map(|f| Self::build_condition_sql(f, values, param_counter))
                    .collect::<Vec<_>>()
                    .join(operator_str);

                format!("({})", group_conditions)
            }
        }
    }

    fn placeholder(value: &SqlValue, values: &mut Vec<SqlValue>, param_counter: &mut usize) -> String {
        values.push(value.clone());
        let param = format!("${}", param_counter);
        *param_counter += 1;
        param
    }

    fn build_single_condition_sql(
        condition: &QueryCondition,
        values: &mut Vec<SqlValue>,
        param_counter: &mut usize,
    ) -> String {
        let field = &condition.field;

        match (&condition.operator, &condition.operand) {
            (QueryOperator::IsNull, _) | (QueryOperator::Eq, Operand::Value(SqlValue::Null)) => {
                format!("{} IS NULL", field)
            }
            (QueryOperator::IsNotNull, _) | (QueryOperator::Ne, Operand::Value(SqlValue::Null)) => {
                format!("{} IS NOT NULL", field)
            }
            (QueryOperator::In, Operand::List(list)) => {
                if list.is_empty() {
                    return "1=0".to_string(); // Empty IN clause
                }
                let placeholders: Vec<String> = list
                    .iter()
                    .map(|v| Self::placeholder(v, values, param_counter))
                    .collect();
                format!("{} IN ({})", field, placeholders.join(", "))
            }
            (operator, Operand::Value(value)) => {
                let symbol = match operator {
                    QueryOperator::Eq => "=",
                    QueryOperator::Ne => "!=",
                    QueryOperator::Gt => ">",
                    QueryOperator::Gte => ">=",
                    QueryOperator::Lt => "<",
                    QueryOperator::Lte => "<=",
                    _ => return "1=0".to_string(),
                };
                // Ordering against NULL is never true in SQL
                if value.is_null() {
                    return "1=0".to_string();
                }
                let param = Self::placeholder(value, values, param_counter);
                format!("{} {} {}", field, symbol, param)
            }
            _ => "1=0".to_string(), // Invalid condition
        }
    }

    /// Build SET clause; NULL assignments are written literally, everything
    /// else is bound. Returns the clause and its values.
    pub fn build_set_clause(update: &UpdateSet, first_param: usize) -> (String, Vec<SqlValue>) {
        let mut values = Vec::new();
        let mut param_counter = first_param;

        let assignments: Vec<String> = update
            .assignments
            .iter()
            .map(|(field, value)| {
                if value.is_null() {
                    format!("{} = NULL", field)
                } else {
                    let param = Self::placeholder(value, &mut values, &mut param_counter);
                    format!("{} = {}", field, param)
                }
            })
            .collect();

        (assignments.join(", "), values)
    }

    /// Build ORDER BY clause
    pub fn build_order_clause(order_by: &[(String, SortOrder)]) -> String {
        if order_by.is_empty() {
            return "".to_string();
        }

        let order_items: Vec<String> = order_by
            .iter()
            .map(|(field, order)| format!("{} {}", field, order.to_sql()))
            .collect();

        format!("ORDER BY {}", order_items.join(", "))
    }

    /// Build LIMIT clause
    pub fn build_limit_clause(limit: Option<i64>) -> String {
        match limit {
            Some(limit) => format!("LIMIT {}", limit.max(0)),
            None => "".to_string(),
        }
    }
}
