//! Composable filter trees and their query-parameter rendering.
//!
//! A filter is a combinator node (AND/OR) holding leaf conditions and
//! nested combinator scopes in insertion order. Rendering never flattens or
//! reorders across AND/OR boundaries; equality of two trees is structural.

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::GridResult;

/// Comparison operators, named after the service's filter type codes.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    #[serde(rename = "equal")]
    Equal,
    #[serde(rename = "not_equal")]
    NotEqual,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "contains_not")]
    ContainsNot,
    #[serde(rename = "contains_word")]
    ContainsWord,
    #[serde(rename = "doesnt_contain_word")]
    DoesntContainWord,
    #[serde(rename = "length_is_lower_than")]
    LengthIsLowerThan,
    #[serde(rename = "higher_than")]
    HigherThan,
    #[serde(rename = "higher_than_or_equal")]
    HigherThanOrEqual,
    #[serde(rename = "lower_than")]
    LowerThan,
    #[serde(rename = "lower_than_or_equal")]
    LowerThanOrEqual,
    #[serde(rename = "date_before")]
    DateBefore,
    #[serde(rename = "date_after")]
    DateAfter,
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "empty")]
    Empty,
    #[serde(rename = "not_empty")]
    NotEmpty,
}

/// How the children of one combinator scope interact.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// All children must hold.
    #[serde(rename = "AND")]
    And,
    /// At least one child must hold.
    #[serde(rename = "OR")]
    Or,
}

/// A single leaf condition applied to one field.
#[derive(Serialize, Debug, Clone, PartialEq)]
struct Condition {
    field: String,
    #[serde(rename = "type")]
    mode: FilterOperator,
    value: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
enum Node {
    Condition(Condition),
    Group(Filter),
}

/// A filter tree. Built incrementally through the chainable operator
/// methods; immutable once rendered.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Filter {
    #[serde(rename = "filter_type")]
    operator: Combinator,
    #[serde(rename = "filters")]
    nodes: Vec<Node>,
}

impl Filter {
    /// Opens a scope in which every condition must hold.
    pub fn and_() -> Self {
        Self {
            operator: Combinator::And,
            nodes: Vec::new(),
        }
    }

    /// Opens a scope in which at least one condition must hold.
    pub fn or_() -> Self {
        Self {
            operator: Combinator::Or,
            nodes: Vec::new(),
        }
    }

    fn push(mut self, field: &str, mode: FilterOperator, value: Option<String>) -> Self {
        self.nodes.push(Node::Condition(Condition {
            field: field.to_string(),
            mode,
            value,
        }));
        self
    }

    /// Appends a nested combinator scope as the next child.
    pub fn nest(mut self, group: Filter) -> Self {
        self.nodes.push(Node::Group(group));
        self
    }

    pub fn equal(self, field: &str, value: &str) -> Self {
        self.push(field, FilterOperator::Equal, Some(value.to_string()))
    }

    pub fn not_equal(self, field: &str, value: &str) -> Self {
        self.push(field, FilterOperator::NotEqual, Some(value.to_string()))
    }

    pub fn contains(self, field: &str, value: &str) -> Self {
        self.push(field, FilterOperator::Contains, Some(value.to_string()))
    }

    pub fn contains_not(self, field: &str, value: &str) -> Self {
        self.push(field, FilterOperator::ContainsNot, Some(value.to_string()))
    }

    pub fn contains_word(self, field: &str, value: &str) -> Self {
        self.push(field, FilterOperator::ContainsWord, Some(value.to_string()))
    }

    pub fn doesnt_contain_word(self, field: &str, value: &str) -> Self {
        self.push(
            field,
            FilterOperator::DoesntContainWord,
            Some(value.to_string()),
        )
    }

    pub fn length_is_lower_than(self, field: &str, value: &str) -> Self {
        self.push(
            field,
            FilterOperator::LengthIsLowerThan,
            Some(value.to_string()),
        )
    }

    pub fn higher_than(self, field: &str, value: &str) -> Self {
        self.push(field, FilterOperator::HigherThan, Some(value.to_string()))
    }

    pub fn higher_than_or_equal(self, field: &str, value: &str) -> Self {
        self.push(
            field,
            FilterOperator::HigherThanOrEqual,
            Some(value.to_string()),
        )
    }

    pub fn lower_than(self, field: &str, value: &str) -> Self {
        self.push(field, FilterOperator::LowerThan, Some(value.to_string()))
    }

    pub fn lower_than_or_equal(self, field: &str, value: &str) -> Self {
        self.push(
            field,
            FilterOperator::LowerThanOrEqual,
            Some(value.to_string()),
        )
    }

    pub fn date_before(self, field: &str, value: &str) -> Self {
        self.push(field, FilterOperator::DateBefore, Some(value.to_string()))
    }

    pub fn date_after(self, field: &str, value: &str) -> Self {
        self.push(field, FilterOperator::DateAfter, Some(value.to_string()))
    }

    pub fn boolean(self, field: &str, value: bool) -> Self {
        self.push(field, FilterOperator::Boolean, Some(value.to_string()))
    }

    pub fn empty(self, field: &str) -> Self {
        self.push(field, FilterOperator::Empty, None)
    }

    pub fn not_empty(self, field: &str) -> Self {
        self.push(field, FilterOperator::NotEmpty, None)
    }

    /// Renders the tree into the JSON structure the service's `filters`
    /// query parameter expects, children strictly in insertion order.
    pub fn render(&self) -> GridResult<JsonValue> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_the_service_grammar() {
        let filter = Filter::and_()
            .higher_than_or_equal("Age", "30")
            .lower_than_or_equal("Age", "40");
        assert_eq!(
            filter.render().unwrap(),
            json!({
                "filter_type": "AND",
                "filters": [
                    {"field": "Age", "type": "higher_than_or_equal", "value": "30"},
                    {"field": "Age", "type": "lower_than_or_equal", "value": "40"},
                ],
            })
        );
    }

    #[test]
    fn render_is_deterministic() {
        let build = || Filter::and_().equal("Name", "John").contains("CV", "Rust");
        assert_eq!(build().render().unwrap(), build().render().unwrap());
    }

    #[test]
    fn children_keep_insertion_order() {
        let a_then_b = Filter::or_().equal("Name", "A").equal("Name", "B");
        let b_then_a = Filter::or_().equal("Name", "B").equal("Name", "A");
        // Structural equality only, no normalization across OR children.
        assert_ne!(a_then_b, b_then_a);
        assert_ne!(a_then_b.render().unwrap(), b_then_a.render().unwrap());
    }

    #[test]
    fn nested_scopes_render_in_place() {
        let filter = Filter::and_()
            .boolean("NDA Signed", true)
            .nest(Filter::or_().equal("State", "Intern").equal("State", "Temporary"))
            .not_empty("E-Mail");
        assert_eq!(
            filter.render().unwrap(),
            json!({
                "filter_type": "AND",
                "filters": [
                    {"field": "NDA Signed", "type": "boolean", "value": "true"},
                    {
                        "filter_type": "OR",
                        "filters": [
                            {"field": "State", "type": "equal", "value": "Intern"},
                            {"field": "State", "type": "equal", "value": "Temporary"},
                        ],
                    },
                    {"field": "E-Mail", "type": "not_empty", "value": null},
                ],
            })
        );
    }
}
