use bcrypt::{hash, verify};

use crate::error::AppError;

#[derive(Clone)]
pub struct PasswordService {
    cost: u32,
}

impl PasswordService {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        hash(password, self.cost)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        verify(password, hash)
            .map_err(|e| AppError::Internal(format!("Failed to verify password: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let passwords = PasswordService::new(4);
        let hashed = passwords.hash_password("password123").unwrap();
        assert!(passwords.verify_password("password123", &hashed).unwrap());
        assert!(!passwords.verify_password("password124", &hashed).unwrap());
    }
}
