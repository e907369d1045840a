use std::collections::HashSet;

use chrono::Utc;

use crate::balance::{check_expense, compute_balances};
use crate::error::SplitError;
use crate::exchange::compute_settlements;
use crate::schemas::{Balances, Expense, NewExpense, Person, PersonId, SettlementView};

const UNKNOWN_PERSON_NAME: &str = "Unknown";

/// The people sharing costs and the append-only log of what they spent.
#[derive(Clone, Debug, Default)]
pub struct Group {
    people: Vec<Person>,
    expenses: Vec<Expense>,
    next_person: u64,
    next_expense: u64,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a group with one person per name, skipping blank names.
    pub fn with_people<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut group = Self::new();
        for name in names {
            if let Err(err) = group.add_person(name.as_ref()) {
                tracing::warn!(%err, "skipping seed person");
            }
        }
        group
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn person_name(&self, id: &str) -> &str {
        self.people
            .iter()
            .find(|p| p.id == id)
            .map_or(UNKNOWN_PERSON_NAME, |p| p.name.as_str())
    }

    pub fn add_person(&mut self, name: &str) -> Result<&Person, SplitError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SplitError::BlankName);
        }
        self.next_person += 1;
        self.people.push(Person {
            id: format!("p{}", self.next_person),
            name: name.to_string(),
        });
        let person = &self.people[self.people.len() - 1];
        tracing::info!(id = %person.id, name = %person.name, "person added");
        Ok(person)
    }

    /// Removes a person who is not referenced by any expense.
    pub fn remove_person(&mut self, id: &str) -> Result<Person, SplitError> {
        let index = self
            .people
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| SplitError::UnknownPerson(id.to_string()))?;

        let involved = self
            .expenses
            .iter()
            .any(|e| e.paid_by == id || e.participants.iter().any(|p| p == id));
        if involved {
            tracing::warn!(id, "refusing to remove a person involved in expenses");
            return Err(SplitError::PersonInUse(id.to_string()));
        }

        let person = self.people.remove(index);
        tracing::info!(id = %person.id, "person removed");
        Ok(person)
    }

    pub fn add_expense(&mut self, new_expense: NewExpense) -> Result<&Expense, SplitError> {
        let id = format!("e{}", self.next_expense + 1);
        if new_expense.description.trim().is_empty() {
            return Err(SplitError::invalid_expense(&id, "description must not be blank"));
        }

        // Selecting the same person twice would charge them two shares
        let mut seen = HashSet::new();
        let participants: Vec<PersonId> = new_expense
            .participants
            .into_iter()
            .filter(|p| seen.insert(p.clone()))
            .collect();

        let roster: HashSet<&str> = self.people.iter().map(|p| p.id.as_str()).collect();
        check_expense(
            &id,
            new_expense.amount,
            &new_expense.paid_by,
            &participants,
            &roster,
        )?;

        self.next_expense += 1;
        self.expenses.push(Expense {
            id,
            description: new_expense.description.trim().to_string(),
            amount: new_expense.amount,
            paid_by: new_expense.paid_by,
            date: Utc::now(),
            participants,
        });
        // An amount can be valid on its own and still push a running balance past f64::MAX
        if let Err(err) = self.balances() {
            self.expenses.pop();
            self.next_expense -= 1;
            return Err(err);
        }
        let expense = &self.expenses[self.expenses.len() - 1];
        tracing::info!(
            id = %expense.id,
            amount = expense.amount,
            paid_by = %expense.paid_by,
            participants = expense.participants.len(),
            "expense added"
        );
        Ok(expense)
    }

    pub fn total_spent(&self) -> f64 {
        self.expenses.iter().map(|e| e.amount).sum()
    }

    pub fn balances(&self) -> Result<Balances, SplitError> {
        compute_balances(&self.people, &self.expenses)
    }

    pub fn settlements(&self) -> Result<Vec<SettlementView>, SplitError> {
        let balances = self.balances()?;
        Ok(compute_settlements(&balances)
            .into_iter()
            .map(|s| SettlementView {
                from_name: self.person_name(&s.from).to_string(),
                to_name: self.person_name(&s.to).to_string(),
                from: s.from,
                to: s.to,
                amount: s.amount,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn group() -> Group {
        Group::with_people(["Alice", "Bob", "Carol"])
    }

    fn new_expense(amount: f64, paid_by: &str, participants: &[&str]) -> NewExpense {
        NewExpense {
            description: "groceries".to_string(),
            amount,
            paid_by: paid_by.to_string(),
            participants: participants.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[rstest]
    fn seeded_people_get_distinct_ids(group: Group) {
        let ids: Vec<&str> = group.people().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2", "p3"]);
        assert_eq!(group.person_name("p2"), "Bob");
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_names_are_rejected(mut group: Group, #[case] name: &str) {
        assert_eq!(group.add_person(name).unwrap_err(), SplitError::BlankName);
        assert_eq!(group.people().len(), 3);
    }

    #[rstest]
    fn names_are_trimmed(mut group: Group) {
        let person = group.add_person("  Dave ").unwrap();
        assert_eq!(person.name, "Dave");
        assert_eq!(person.id, "p4");
    }

    #[rstest]
    fn unreferenced_person_can_be_removed(mut group: Group) {
        let removed = group.remove_person("p3").unwrap();
        assert_eq!(removed.name, "Carol");
        assert_eq!(group.people().len(), 2);
        assert_eq!(group.person_name("p3"), "Unknown");
    }

    #[rstest]
    #[case::as_payer("p1")]
    #[case::as_participant("p2")]
    fn referenced_person_cannot_be_removed(mut group: Group, #[case] id: &str) {
        group
            .add_expense(new_expense(30.0, "p1", &["p2"]))
            .unwrap();
        assert_eq!(
            group.remove_person(id).unwrap_err(),
            SplitError::PersonInUse(id.to_string())
        );
        assert_eq!(group.people().len(), 3);
    }

    #[rstest]
    fn removing_unknown_person_fails(mut group: Group) {
        assert_eq!(
            group.remove_person("p9").unwrap_err(),
            SplitError::UnknownPerson("p9".to_string())
        );
    }

    #[rstest]
    fn duplicate_participants_are_collapsed(mut group: Group) {
        let expense = group
            .add_expense(new_expense(20.0, "p1", &["p1", "p2", "p2"]))
            .unwrap();
        assert_eq!(expense.participants, vec!["p1", "p2"]);
        let balances = group.balances().unwrap();
        assert_eq!(balances["p2"], -10.0);
    }

    #[rstest]
    #[case::blank_description(NewExpense { description: " ".to_string(), ..new_expense(10.0, "p1", &["p1"]) })]
    #[case::zero_amount(new_expense(0.0, "p1", &["p1"]))]
    #[case::no_participants(new_expense(10.0, "p1", &[]))]
    #[case::unknown_payer(new_expense(10.0, "p7", &["p1"]))]
    #[case::unknown_participant(new_expense(10.0, "p1", &["p8"]))]
    fn invalid_expenses_leave_the_log_untouched(mut group: Group, #[case] expense: NewExpense) {
        assert!(group.add_expense(expense).is_err());
        assert!(group.expenses().is_empty());
        assert_eq!(group.add_expense(new_expense(5.0, "p1", &["p1"])).unwrap().id, "e1");
    }

    #[rstest]
    fn expense_overflowing_a_balance_is_not_logged(mut group: Group) {
        group
            .add_expense(new_expense(f64::MAX, "p1", &["p2"]))
            .unwrap();
        let err = group
            .add_expense(new_expense(f64::MAX, "p1", &["p2"]))
            .unwrap_err();
        assert_eq!(err, SplitError::invalid_expense("e2", "balance overflow"));
        assert_eq!(group.expenses().len(), 1);
        assert!(group.balances().unwrap().values().all(|b| b.is_finite()));
        assert_eq!(group.add_expense(new_expense(1.0, "p2", &["p1"])).unwrap().id, "e2");
    }

    #[test]
    fn blank_seed_names_are_skipped() {
        let group = Group::with_people(["Alice", " ", "Bob"]);
        let names: Vec<&str> = group.people().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
    }

    #[rstest]
    fn settlements_carry_names(mut group: Group) {
        group
            .add_expense(new_expense(90.0, "p1", &["p1", "p2", "p3"]))
            .unwrap();
        let settlements = group.settlements().unwrap();
        let lines: Vec<String> = settlements.iter().map(ToString::to_string).collect();
        assert_eq!(lines, vec!["Bob pays Alice 30.00", "Carol pays Alice 30.00"]);
        assert_eq!(group.total_spent(), 90.0);
    }
}
