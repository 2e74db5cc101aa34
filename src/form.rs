use lazy_static::lazy_static;
use log::{info, warn};
use regex::Regex;

use crate::error::{FormError, SubmitError};
use crate::expense::{ExpenseId, NewExpense};
use crate::store::ExpenseStore;

lazy_static! {
    // Leading integer the way a lenient integer parse reads it: "12abc" is 12
    static ref COST_PREFIX_REGEX: Regex = Regex::new(r"^\s*([+-]?[0-9]+)").unwrap();
}

/// Parses the cost field
///
/// Leading whitespace and a sign are accepted and anything after the leading
/// digits is ignored. Input without digits, or a value that does not fit, is
/// rejected, and so is a negative amount.
pub fn parse_cost(input: &str) -> Result<u64, FormError> {
    let digits = COST_PREFIX_REGEX
        .captures(input)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| FormError::InvalidCost(input.to_string()))?;

    let value: i64 = digits
        .as_str()
        .parse()
        .map_err(|_| FormError::InvalidCost(input.to_string()))?;

    if value < 0 {
        return Err(FormError::NegativeCost(value));
    }
    Ok(value as u64)
}

/// The expense entry form
///
/// Mirrors the two inputs and the error text region of the page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpenseForm {
    pub name: String,
    pub cost: String,
    pub error: String,
}

impl ExpenseForm {
    pub fn new(name: impl Into<String>, cost: impl Into<String>) -> Self {
        ExpenseForm {
            name: name.into(),
            cost: cost.into(),
            error: String::new(),
        }
    }

    /// Checks the fields and builds the record to submit
    pub fn validate(&self) -> Result<NewExpense, FormError> {
        if self.name.is_empty() || self.cost.is_empty() {
            return Err(FormError::MissingValues);
        }
        let cost = parse_cost(&self.cost)?;
        Ok(NewExpense::new(self.name.clone(), cost))
    }

    /// Validates and sends the record to the store
    ///
    /// An invalid form sets the error text and never reaches the store. After
    /// a successful create the fields and the error text are cleared; a store
    /// failure leaves the form as it was. The chart is not updated here; it
    /// follows once the subscription reports the new record.
    pub async fn submit<S: ExpenseStore>(&mut self, store: &S) -> Result<ExpenseId, SubmitError> {
        let expense = match self.validate() {
            Ok(expense) => expense,
            Err(e) => {
                self.error = e.to_string();
                return Err(e.into());
            }
        };

        match store.create(expense).await {
            Ok(id) => {
                info!("Submitted expense {}", id);
                self.error.clear();
                self.name.clear();
                self.cost.clear();
                Ok(id)
            }
            Err(e) => {
                warn!("Failed to submit expense: {}", e);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_parses_leading_integer() {
        assert_eq!(parse_cost("42"), Ok(42));
        assert_eq!(parse_cost("  7"), Ok(7));
        assert_eq!(parse_cost("+3"), Ok(3));
        assert_eq!(parse_cost("12abc"), Ok(12));
        assert_eq!(parse_cost("9.99"), Ok(9));
        assert_eq!(parse_cost("0"), Ok(0));
    }

    #[test]
    fn cost_without_digits_is_rejected() {
        assert_eq!(
            parse_cost("abc"),
            Err(FormError::InvalidCost("abc".to_string()))
        );
        assert_eq!(
            parse_cost("-"),
            Err(FormError::InvalidCost("-".to_string()))
        );
        assert!(matches!(
            parse_cost("99999999999999999999999"),
            Err(FormError::InvalidCost(_))
        ));
    }

    #[test]
    fn negative_cost_is_rejected() {
        assert_eq!(parse_cost("-5"), Err(FormError::NegativeCost(-5)));
    }

    #[test]
    fn empty_fields_fail_validation() {
        assert_eq!(
            ExpenseForm::new("", "10").validate(),
            Err(FormError::MissingValues)
        );
        assert_eq!(
            ExpenseForm::new("Lunch", "").validate(),
            Err(FormError::MissingValues)
        );
        assert_eq!(
            ExpenseForm::new("Lunch", "12").validate(),
            Ok(NewExpense::new("Lunch", 12))
        );
    }

    #[test]
    fn error_messages_are_user_facing() {
        assert_eq!(
            FormError::MissingValues.to_string(),
            "Please enter values before submitting"
        );
        assert_eq!(
            FormError::InvalidCost("x".to_string()).to_string(),
            "Cost must be a whole number"
        );
    }
}
