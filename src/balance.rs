use std::collections::HashSet;

use crate::error::SplitError;
use crate::schemas::{Balances, Expense, Person, PersonId};

/// Computes the net balance of every person in `people` from the expense list.
///
/// People without expenses show up with a balance of zero. Shares are split
/// equally and no rounding is applied, so the sum of all balances is zero only
/// up to floating point error.
pub fn compute_balances(people: &[Person], expenses: &[Expense]) -> Result<Balances, SplitError> {
    let mut balances: Balances = people.iter().map(|p| (p.id.clone(), 0.0)).collect();
    let roster: HashSet<&str> = people.iter().map(|p| p.id.as_str()).collect();

    for expense in expenses {
        check_expense(
            &expense.id,
            expense.amount,
            &expense.paid_by,
            &expense.participants,
            &roster,
        )?;

        let amount = expense.amount;
        let amount_per_participant = amount / expense.participants.len() as f64;

        // Every id was checked against the roster above
        if let Some(payer) = balances.get_mut(&expense.paid_by) {
            *payer += amount;
        }
        for participant in &expense.participants {
            if let Some(balance) = balances.get_mut(participant) {
                *balance -= amount_per_participant;
            }
        }

        let overflowed = std::iter::once(&expense.paid_by)
            .chain(&expense.participants)
            .any(|id| balances.get(id).is_some_and(|b| !b.is_finite()));
        if overflowed {
            return Err(SplitError::invalid_expense(&expense.id, "balance overflow"));
        }
    }
    Ok(balances)
}

pub(crate) fn check_expense(
    expense_id: &str,
    amount: f64,
    paid_by: &str,
    participants: &[PersonId],
    roster: &HashSet<&str>,
) -> Result<(), SplitError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(SplitError::invalid_expense(
            expense_id,
            format!("amount must be positive (found {amount})"),
        ));
    }
    if participants.is_empty() {
        return Err(SplitError::invalid_expense(
            expense_id,
            "at least one participant is required",
        ));
    }
    let dangling = std::iter::once(paid_by)
        .chain(participants.iter().map(String::as_str))
        .find(|id| !roster.contains(id));
    if let Some(person_id) = dangling {
        return Err(SplitError::DanglingReference {
            expense_id: expense_id.to_string(),
            person_id: person_id.to_string(),
        });
    }
    Ok(())
}
