// Request payload fixture for the employees controller
pub struct EmployeeInput {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    pub birth_date: Option<String>,
    pub skills: Vec<String>,
}
