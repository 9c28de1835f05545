//! Opaque list identifier generation.

use uuid::Uuid;

/// Source of fresh list identifiers.
///
/// Tokens only need to be statistically unique; the store still checks the
/// database and asks for new ones on a collision.
pub trait TokenGenerator {
    fn next_token(&self) -> String;
}

/// Random UUIDv4 identifiers (122 bits of entropy).
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidTokens;

impl TokenGenerator for UuidTokens {
    fn next_token(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Draw a (public, private) pair that is guaranteed to differ.
pub fn generate_pair(tokens: &dyn TokenGenerator) -> (String, String) {
    let public_id = tokens.next_token();
    let mut private_id = tokens.next_token();
    while private_id == public_id {
        private_id = tokens.next_token();
    }
    (public_id, private_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    struct Scripted(RefCell<VecDeque<&'static str>>);

    impl TokenGenerator for Scripted {
        fn next_token(&self) -> String {
            self.0.borrow_mut().pop_front().unwrap_or("tail").to_string()
        }
    }

    #[test]
    fn uuid_tokens_are_distinct() {
        let (a, b) = generate_pair(&UuidTokens);
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }

    #[test]
    fn pair_redraws_on_equal_tokens() {
        let tokens = Scripted(RefCell::new(VecDeque::from(["x", "x", "x", "y"])));
        assert_eq!(generate_pair(&tokens), ("x".to_string(), "y".to_string()));
    }
}
