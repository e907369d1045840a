use std::sync::{Mutex, MutexGuard};

use actix_web::{delete, get, post, web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::SplitError;
use crate::exchange::settle;
use crate::group::Group;
use crate::schemas::{Expense, NewExpense, Person};

pub struct AppState {
    group: Mutex<Group>,
}

impl AppState {
    pub fn new(group: Group) -> Self {
        Self {
            group: Mutex::new(group),
        }
    }

    fn group(&self) -> Result<MutexGuard<'_, Group>, HttpResponse> {
        self.group.lock().map_err(|_| {
            tracing::error!("group state lock is poisoned");
            HttpResponse::InternalServerError().json(ErrorJson {
                error: "internal state unavailable".to_string(),
            })
        })
    }
}

#[derive(Deserialize, Serialize)]
struct PersonNameJson {
    name: String,
}

#[derive(Deserialize, Serialize)]
struct ErrorJson {
    error: String,
}

#[derive(Deserialize)]
struct SettleExpenseJson {
    id: String,
    #[serde(flatten)]
    expense: NewExpense,
}

impl From<SettleExpenseJson> for Expense {
    fn from(json: SettleExpenseJson) -> Self {
        Expense {
            id: json.id,
            description: json.expense.description,
            amount: json.expense.amount,
            paid_by: json.expense.paid_by,
            date: Utc::now(),
            participants: json.expense.participants,
        }
    }
}

#[derive(Deserialize)]
struct SettleRequestJson {
    people: Vec<Person>,
    expenses: Vec<SettleExpenseJson>,
}

fn error_response(err: SplitError) -> HttpResponse {
    let body = ErrorJson {
        error: err.to_string(),
    };
    match err {
        SplitError::UnknownPerson(_) => HttpResponse::NotFound().json(body),
        SplitError::PersonInUse(_) => HttpResponse::Conflict().json(body),
        SplitError::InvalidExpense { .. }
        | SplitError::DanglingReference { .. }
        | SplitError::BlankName => HttpResponse::BadRequest().json(body),
    }
}

#[get("/people")]
async fn list_people(state: web::Data<AppState>) -> HttpResponse {
    match state.group() {
        Ok(group) => HttpResponse::Ok().json(group.people()),
        Err(response) => response,
    }
}

#[post("/people")]
async fn add_person(state: web::Data<AppState>, json: web::Json<PersonNameJson>) -> HttpResponse {
    let mut group = match state.group() {
        Ok(group) => group,
        Err(response) => return response,
    };
    match group.add_person(&json.name) {
        Ok(person) => HttpResponse::Created().json(person),
        Err(err) => error_response(err),
    }
}

#[delete("/people/{id}")]
async fn remove_person(state: web::Data<AppState>, id: web::Path<String>) -> HttpResponse {
    let mut group = match state.group() {
        Ok(group) => group,
        Err(response) => return response,
    };
    match group.remove_person(&id.into_inner()) {
        Ok(person) => HttpResponse::Ok().json(person),
        Err(err) => error_response(err),
    }
}

#[get("/expenses")]
async fn list_expenses(state: web::Data<AppState>) -> HttpResponse {
    match state.group() {
        Ok(group) => HttpResponse::Ok().json(group.expenses()),
        Err(response) => response,
    }
}

#[post("/expenses")]
async fn add_expense(state: web::Data<AppState>, expense: web::Json<NewExpense>) -> HttpResponse {
    let mut group = match state.group() {
        Ok(group) => group,
        Err(response) => return response,
    };
    match group.add_expense(expense.into_inner()) {
        Ok(expense) => HttpResponse::Created().json(expense),
        Err(err) => {
            tracing::warn!(%err, "expense rejected");
            error_response(err)
        }
    }
}

#[get("/balances")]
async fn get_balances(state: web::Data<AppState>) -> HttpResponse {
    let group = match state.group() {
        Ok(group) => group,
        Err(response) => return response,
    };
    match group.balances() {
        Ok(balances) => HttpResponse::Ok().json(balances),
        Err(err) => error_response(err),
    }
}

#[get("/settlements")]
async fn get_settlements(state: web::Data<AppState>) -> HttpResponse {
    let group = match state.group() {
        Ok(group) => group,
        Err(response) => return response,
    };
    match group.settlements() {
        Ok(settlements) => HttpResponse::Ok().json(settlements),
        Err(err) => error_response(err),
    }
}

// Stateless: works only on the people and expenses in the request body
#[post("/settle")]
async fn settle_request(json: web::Json<SettleRequestJson>) -> HttpResponse {
    let request = json.into_inner();
    let expenses: Vec<Expense> = request.expenses.into_iter().map(Expense::from).collect();
    match settle(&request.people, &expenses) {
        Ok(settlements) => HttpResponse::Ok().json(settlements),
        Err(err) => error_response(err),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_people)
        .service(add_person)
        .service(remove_person)
        .service(list_expenses)
        .service(add_expense)
        .service(get_balances)
        .service(get_settlements)
        .service(settle_request);
}
