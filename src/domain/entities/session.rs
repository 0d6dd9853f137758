use crate::error::{IngestError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    owner_id: String,
}

impl Session {
    pub fn new(owner_id: impl Into<String>) -> Result<Self> {
        let owner_id = owner_id.into().trim().to_string();
        if owner_id.is_empty() {
            return Err(IngestError::MissingOwner);
        }
        Ok(Self { owner_id })
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_owner_is_rejected() {
        assert!(matches!(Session::new("   "), Err(IngestError::MissingOwner)));
        assert_eq!(Session::new(" acme-01 ").unwrap().owner_id(), "acme-01");
    }
}
