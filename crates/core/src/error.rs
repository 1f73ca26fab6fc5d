#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A record is missing something the batch needs before it can start
    /// (input references, prompt text).
    #[error("Precondition failed: {0}")]
    Precondition(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precondition_display_keeps_reason() {
        let err = CoreError::Precondition("Field 'Prompt' is empty".into());
        assert_eq!(err.to_string(), "Precondition failed: Field 'Prompt' is empty");
    }
}
