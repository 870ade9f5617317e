//! Purchase and rental of a single listing.

use crate::api::{MarketApi, NewTransaction};
use crate::error::{Result, ValidationErrors};
use crate::models::{Listing, ListingKind, Transaction, ValidationStatus};
use crate::validate;
use tracing::{info, warn};

/// Buyer/renter details typed into the detail view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub message: Option<String>,
    /// Required when renting
    pub rent_duration: Option<String>,
}

/// A recorded transaction and whether its confirmation mail went out
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub transaction: Transaction,
    pub email_sent: bool,
}

pub async fn load_listing(api: &dyn MarketApi, id: i64) -> Result<Listing> {
    api.get_listing(id).await
}

/// Check the form against the listing, as a purchase (`Sale`) or rental (`Rent`)
pub fn check(listing: &Listing, intent: ListingKind, form: &ContactForm) -> Result<NewTransaction> {
    let mut errors = ValidationErrors::new();

    if listing.validation != ValidationStatus::Approved {
        errors.add("listing", "this farm is not approved for sale or rent");
    } else if listing.kind != intent {
        errors.add("listing", format!("this farm is offered for {}", listing.kind));
    } else if listing.sold {
        errors.add("listing", "this farm has already been sold");
    }

    validate::require(&mut errors, "full_name", &form.full_name);
    validate::require_email(&mut errors, "email", &form.email);
    validate::require_phone(&mut errors, "phone", &form.phone);

    let rent_duration = match intent {
        ListingKind::Rent => {
            let duration = form.rent_duration.clone().unwrap_or_default();
            validate::require(&mut errors, "rent_duration", &duration);
            Some(duration.trim().to_string())
        }
        ListingKind::Sale => None,
    };

    errors.into_result()?;

    Ok(NewTransaction {
        listing: listing.id,
        full_name: form.full_name.trim().to_string(),
        email: form.email.trim().to_string(),
        phone: form.phone.trim().to_string(),
        message: form
            .message
            .as_ref()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty()),
        rent_duration,
    })
}

/// Record the transaction, then ask the backend to mail a confirmation.
/// A failed mail does not undo the transaction.
pub async fn submit(
    api: &dyn MarketApi,
    listing: &Listing,
    intent: ListingKind,
    form: &ContactForm,
) -> Result<Receipt> {
    let request = check(listing, intent, form)?;
    let transaction = api.create_transaction(&request).await?;
    info!(
        "Recorded {} request {} for listing {}",
        intent, transaction.id, listing.id
    );

    let email_sent = match api.send_confirmation_email(transaction.id).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Confirmation email for transaction {} failed: {}", transaction.id, e);
            false
        }
    };

    Ok(Receipt {
        transaction,
        email_sent,
    })
}

/// Shorthand for a purchase
pub async fn purchase(api: &dyn MarketApi, listing: &Listing, form: &ContactForm) -> Result<Receipt> {
    submit(api, listing, ListingKind::Sale, form).await
}

/// Shorthand for a rental
pub async fn rent(api: &dyn MarketApi, listing: &Listing, form: &ContactForm) -> Result<Receipt> {
    if form.rent_duration.is_none() && listing.rent_duration.is_some() {
        let mut form = form.clone();
        form.rent_duration = listing.rent_duration.clone();
        return submit(api, listing, ListingKind::Rent, &form).await;
    }
    submit(api, listing, ListingKind::Rent, form).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorCategory, MarketError};
    use crate::tests::fake_api::{listing, FakeApi};

    fn form() -> ContactForm {
        ContactForm {
            full_name: "Wanjiku Kamau".into(),
            email: "wanjiku@example.com".into(),
            phone: "+254 722 000 111".into(),
            message: Some("  ".into()),
            rent_duration: None,
        }
    }

    #[tokio::test]
    async fn invalid_email_rejected_before_any_request() {
        let farm = listing(1, "Nairobi", ListingKind::Sale);
        let api = FakeApi::new().with_listings(vec![farm.clone()]);
        let mut bad = form();
        bad.email = "wanjiku-at-example".into();

        let err = purchase(&api, &farm, &bad).await.unwrap_err();

        match &err {
            MarketError::Validation(errors) => assert!(errors.has("email")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn purchase_records_and_sends_email() {
        let farm = listing(1, "Nairobi", ListingKind::Sale);
        let api = FakeApi::new();

        let receipt = purchase(&api, &farm, &form()).await.unwrap();

        assert!(receipt.email_sent);
        assert_eq!(receipt.transaction.listing, 1);
        assert_eq!(receipt.transaction.message, None);
        assert_eq!(
            api.calls(),
            vec!["create_transaction 1".to_string(), "send_email 1".to_string()]
        );
    }

    #[tokio::test]
    async fn failed_email_keeps_transaction() {
        let farm = listing(1, "Nairobi", ListingKind::Sale);
        let api = FakeApi::new().failing_email();

        let receipt = purchase(&api, &farm, &form()).await.unwrap();
        assert!(!receipt.email_sent);
        assert_eq!(receipt.transaction.id, 1);
    }

    #[tokio::test]
    async fn rent_uses_listing_duration_by_default() {
        let farm = listing(2, "Nakuru", ListingKind::Rent);
        let api = FakeApi::new();

        let receipt = rent(&api, &farm, &form()).await.unwrap();
        assert_eq!(receipt.transaction.rent_duration.as_deref(), Some("12 months"));
    }

    #[test]
    fn rental_needs_a_duration() {
        let mut farm = listing(2, "Nakuru", ListingKind::Rent);
        farm.rent_duration = None;

        match check(&farm, ListingKind::Rent, &form()) {
            Err(MarketError::Validation(errors)) => assert!(errors.has("rent_duration")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unapproved_farm_cannot_be_bought_or_rented() {
        let api = FakeApi::new();
        for status in [ValidationStatus::Pending, ValidationStatus::Rejected] {
            let mut farm = listing(7, "Thika", ListingKind::Sale);
            farm.validation = status;
            match purchase(&api, &farm, &form()).await {
                Err(MarketError::Validation(errors)) => assert!(errors.has("listing")),
                other => panic!("unexpected result: {other:?}"),
            }

            let mut rental = listing(8, "Thika", ListingKind::Rent);
            rental.validation = status;
            assert!(rent(&api, &rental, &form()).await.is_err());
        }
        assert!(api.calls().is_empty());
    }

    #[test]
    fn wrong_intent_or_sold_farm_is_rejected() {
        let rental = listing(2, "Nakuru", ListingKind::Rent);
        assert!(check(&rental, ListingKind::Sale, &form()).is_err());

        let mut sold = listing(3, "Kisumu", ListingKind::Sale);
        sold.sold = true;
        match check(&sold, ListingKind::Sale, &form()) {
            Err(MarketError::Validation(errors)) => assert!(errors.has("listing")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
