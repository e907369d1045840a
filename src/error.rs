use crate::schemas::PersonId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplitError {
    #[error("expense '{expense_id}' is invalid: {reason}")]
    InvalidExpense { expense_id: String, reason: String },
    #[error("expense '{expense_id}' references unknown person '{person_id}'")]
    DanglingReference {
        expense_id: String,
        person_id: PersonId,
    },
    #[error("person '{0}' does not exist")]
    UnknownPerson(PersonId),
    #[error("cannot remove person '{0}': they are involved in existing expenses")]
    PersonInUse(PersonId),
    #[error("person name must not be blank")]
    BlankName,
}

impl SplitError {
    pub(crate) fn invalid_expense(expense_id: &str, reason: impl Into<String>) -> Self {
        SplitError::InvalidExpense {
            expense_id: expense_id.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a number between 0 and 65535 (found '{0}')")]
    InvalidPort(String),
}
