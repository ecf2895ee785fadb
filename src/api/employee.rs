use actix_web::error::{ErrorInternalServerError, ErrorNotFound};
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::core::logical_day::LogicalDay;
use crate::core::reconciler::Reconciler;
use crate::model::employee::Employee;
use crate::utils::db_utils::{build_update_sql, execute_update};

const EMPLOYEE_EDITABLE: &[&str] = &["name", "department", "salary", "divisor", "blocked"];

/// Every table that hangs off an employee, for the delete cascade.
const EMPLOYEE_CHILD_TABLES: &[&str] =
    &["schedules", "punches", "retards", "absents", "advances", "extras", "doublages", "ledger"];

#[derive(Deserialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "Rachid B.")]
    pub name: String,
    #[schema(example = "Cuisine", nullable = true)]
    pub department: Option<String>,
    #[schema(example = 4200.0, nullable = true)]
    pub salary: Option<f64>,
    #[schema(example = 26, nullable = true)]
    pub divisor: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EmployeeQuery {
    pub department: Option<String>,
    pub search: Option<String>,
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployee,
    responses(
        (status = 200, description = "Employee created", body = Object, example = json!({ "id": 7 })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    pool: web::Data<SqlitePool>,
    recon: web::Data<Reconciler>,
    payload: web::Json<CreateEmployee>,
) -> actix_web::Result<impl Responder> {
    let id = sqlx::query("INSERT INTO employees (name, department, salary, divisor) VALUES (?, ?, ?, ?)")
        .bind(&payload.name)
        .bind(payload.department.as_deref().unwrap_or(""))
        .bind(payload.salary.unwrap_or(0.0))
        .bind(payload.divisor)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create employee");
            ErrorInternalServerError("Database error")
        })?
        .last_insert_rowid();

    // The current month was likely provisioned before this employee
    // existed; give them their rows right away.
    let period = LogicalDay::containing(recon.clock().now()).period();
    if let Err(e) = recon.provisioner().backfill_employee(period, id).await {
        warn!(error = %e, employee_id = id, "Ledger backfill for new employee failed");
    }

    Ok(HttpResponse::Ok().json(json!({ "id": id })))
}

/// List Employees
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(
        ("department", Query, description = "Filter by department"),
        ("search", Query, description = "Search by name")
    ),
    responses(
        (status = 200, description = "Employee list", body = [Employee])
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    pool: web::Data<SqlitePool>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    let mut sql = String::from("SELECT * FROM employees WHERE 1 = 1");
    if query.department.is_some() {
        sql.push_str(" AND department = ?");
    }
    if query.search.is_some() {
        sql.push_str(" AND name LIKE ?");
    }
    sql.push_str(" ORDER BY id");

    let mut q = sqlx::query_as::<_, Employee>(&sql);
    if let Some(department) = &query.department {
        q = q.bind(department);
    }
    if let Some(search) = &query.search {
        q = q.bind(format!("%{}%", search));
    }

    let employees = q.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to list employees");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(employees))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}",
    params(("id", Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let employee: Option<Employee> = sqlx::query_as("SELECT * FROM employees WHERE id = ?")
        .bind(id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id = id, "Failed to fetch employee");
            ErrorInternalServerError("Database error")
        })?;

    match employee {
        Some(emp) => Ok(HttpResponse::Ok().json(emp)),
        None => Err(ErrorNotFound("Employee not found")),
    }
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/v1/employees/{id}",
    params(("id", Path, description = "Employee ID")),
    request_body = Object,
    responses(
        (status = 200, description = "Employee updated"),
        (status = 400, description = "Unknown or protected column"),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();

    let update = build_update_sql("employees", &body, "id", id, EMPLOYEE_EDITABLE)?;
    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(ErrorInternalServerError)?;

    if affected == 0 {
        return Err(ErrorNotFound("Employee not found"));
    }
    Ok(HttpResponse::Ok().json(json!({ "message": "Employee updated" })))
}

/// Delete Employee and every record tied to them
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{id}",
    params(("id", Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee and history deleted"),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    pool: web::Data<SqlitePool>,
    recon: web::Data<Reconciler>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();

    let mut tx = pool.begin().await.map_err(|e| {
        error!(error = %e, "Failed to open transaction");
        ErrorInternalServerError("Database error")
    })?;

    for table in EMPLOYEE_CHILD_TABLES {
        let sql = format!("DELETE FROM {} WHERE employee_id = ?", table);
        sqlx::query(&sql).bind(id).execute(&mut *tx).await.map_err(|e| {
            error!(error = %e, table, employee_id = id, "Cascade delete failed");
            ErrorInternalServerError("Database error")
        })?;
    }

    let affected = sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, employee_id = id, "Failed to delete employee");
            ErrorInternalServerError("Database error")
        })?
        .rows_affected();

    if affected == 0 {
        return Err(ErrorNotFound("Employee not found"));
    }

    tx.commit().await.map_err(|e| {
        error!(error = %e, employee_id = id, "Failed to commit cascade delete");
        ErrorInternalServerError("Database error")
    })?;

    recon.cache().invalidate_all();
    Ok(HttpResponse::Ok().json(json!({ "message": "Employee deleted" })))
}
