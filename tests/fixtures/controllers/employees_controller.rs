// Employees controller fixture: annotated handlers read by the extractor
use crate::dto::EmployeeInput;

/// List employees.
///
/// Results are ordered by last name.
///
/// @see https://docs.example.com/employees Employee guide
#[openapi_tag("Staff")]
#[openapi_param(name = "page", in = "query", type = "integer", description = "Page number")]
pub fn index() {}

/// Hire an employee.
#[openapi_dto(EmployeeInput)]
#[openapi_request_body(description = "Employee to hire")]
pub fn add(input: EmployeeInput) {
    let _ = input;
}

/// Look up one employee.
///
/// @throws NotFoundException when no employee has this id
pub fn view(id: u64) {
    let _ = id;
}

/// Remove an employee.
///
/// @deprecated use the archive endpoint instead
#[openapi_security(name = "BearerAuth", scopes("staff:write"))]
pub fn delete(id: u64) {
    let _ = id;
}

fn audit() {}
