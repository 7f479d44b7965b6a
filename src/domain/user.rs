/// Read-only projection of the signed-in account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: Option<String>,
    pub phone_number: String,
    pub username: Option<String>,
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        match self.last_name.as_deref().filter(|name| !name.is_empty()) {
            Some(last_name) => format!("{} {}", self.first_name, last_name),
            None => self.first_name.clone(),
        }
    }

    pub fn username_or_fallback(&self) -> &str {
        self.username
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or("N/A")
    }
}
