use crate::balance::compute_balances;
use crate::error::SplitError;
use crate::schemas::{Balances, Expense, Person, PersonId, Settlement};
use std::cmp::Ordering;

#[derive(Clone, Debug)]
struct PersonalBalance {
    id: PersonId,
    balance: f64,
}

/// Greedily matches the largest debtor with the largest creditor until one
/// side runs out.
///
/// Equal balances are ordered by person id so the output is reproducible.
/// Whatever is left once a side is exhausted is floating point dust and is
/// dropped without a settlement.
pub fn compute_settlements(balances: &Balances) -> Vec<Settlement> {
    // Divide people into debtors and creditors, zero balances are already settled
    let mut debtors = Vec::new();
    let mut creditors = Vec::new();
    for (id, &balance) in balances {
        let person = PersonalBalance {
            id: id.clone(),
            balance,
        };
        if balance < 0.0 {
            debtors.push(person);
        } else if balance > 0.0 {
            creditors.push(person);
        }
    }

    // Most negative debtor first, largest creditor first
    debtors.sort_by(|a, b| by_balance_then_id(a, b, a.balance.total_cmp(&b.balance)));
    creditors.sort_by(|a, b| by_balance_then_id(a, b, b.balance.total_cmp(&a.balance)));

    let mut settlements = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < debtors.len() && j < creditors.len() {
        let debt = debtors[i].balance.abs();
        let credit = creditors[j].balance;

        let amount = round_to_2_decimals(debt.min(credit));
        if amount > 0.0 {
            settlements.push(Settlement {
                from: debtors[i].id.clone(),
                to: creditors[j].id.clone(),
                amount,
            });
        }

        if debt == credit {
            i += 1;
            j += 1;
        } else if debt < credit {
            creditors[j].balance -= debt;
            i += 1;
        } else {
            debtors[i].balance += credit;
            j += 1;
        }
    }

    if i < debtors.len() || j < creditors.len() {
        tracing::debug!(
            debtors_left = debtors.len() - i,
            creditors_left = creditors.len() - j,
            "dropping residual balances after settlement"
        );
    }
    settlements
}

/// Balances and settlements in one go.
pub fn settle(people: &[Person], expenses: &[Expense]) -> Result<Vec<Settlement>, SplitError> {
    let balances = compute_balances(people, expenses)?;
    Ok(compute_settlements(&balances))
}

fn by_balance_then_id(a: &PersonalBalance, b: &PersonalBalance, order: Ordering) -> Ordering {
    order.then_with(|| a.id.cmp(&b.id))
}

pub fn round_to_2_decimals(n: f64) -> f64 {
    (n * 100.0).round() / 100.0
}
