pub mod api;
pub mod balance;
pub mod config;
pub mod error;
pub mod exchange;
pub mod group;
pub mod schemas;

pub use balance::compute_balances;
pub use error::{ConfigError, SplitError};
pub use exchange::{compute_settlements, settle};
pub use group::Group;
pub use schemas::{Balances, Expense, NewExpense, Person, PersonId, Settlement, SettlementView};
