use bson::{doc, Document};
use serde::Deserialize;

/// Field on an order document holding the buyer's email
pub const BUYER_EMAIL_FIELD: &str = "buyerEmail";

/// Query parameters for listing orders
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListOrdersQuery {
    pub email: Option<String>,
}

impl ListOrdersQuery {
    /// Filter on `buyerEmail` when an email was given, otherwise match everything
    pub fn to_filter(&self) -> Document {
        match self.email.as_deref() {
            Some(email) if !email.is_empty() => doc! { BUYER_EMAIL_FIELD: email },
            _ => Document::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_by_buyer_email() {
        let query = ListOrdersQuery {
            email: Some("a@x.com".to_string()),
        };
        assert_eq!(query.to_filter(), doc! { "buyerEmail": "a@x.com" });
    }

    #[test]
    fn test_missing_or_empty_email_matches_all() {
        assert!(ListOrdersQuery::default().to_filter().is_empty());

        let empty = ListOrdersQuery {
            email: Some(String::new()),
        };
        assert!(empty.to_filter().is_empty());
    }
}
