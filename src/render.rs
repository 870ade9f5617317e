//! Plain-text rendering of listings and transactions for the terminal.

use crate::models::{Listing, ListingKind, Transaction};

fn money(amount: f64) -> String {
    let whole = amount.round() as i64;
    let digits = whole.abs().to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if whole < 0 {
        out.insert(0, '-');
    }
    out
}

/// One-line summary used by the browsers
pub fn listing_card(listing: &Listing) -> String {
    let offer = match (&listing.kind, &listing.rent_duration) {
        (ListingKind::Rent, Some(duration)) => format!("for rent ({})", duration),
        (ListingKind::Rent, None) => "for rent".to_string(),
        (ListingKind::Sale, _) if listing.sold => "sold".to_string(),
        (ListingKind::Sale, _) => "for sale".to_string(),
    };
    format!(
        "#{} {} | {} acres, {} | KES {} | {}",
        listing.id,
        listing.location,
        listing.size,
        listing.quality,
        money(listing.price),
        offer
    )
}

pub fn listing_detail(listing: &Listing) -> String {
    let mut out = listing_card(listing);
    out.push_str(&format!("\n   Farm ID: {}", listing.farm_id));
    out.push_str(&format!("\n   {}", listing.description));
    out.push_str(&format!("\n   Contact: {} / {}", listing.email, listing.phone));
    if !listing.images.is_empty() {
        out.push_str(&format!("\n   Images: {}", listing.images.join(", ")));
    }
    out
}

pub fn transaction_row(transaction: &Transaction) -> String {
    let mut row = format!(
        "#{} listing {} | {} <{}> {} | {}",
        transaction.id,
        transaction.listing,
        transaction.full_name,
        transaction.email,
        transaction.phone,
        transaction.status
    );
    if let Some(duration) = &transaction.rent_duration {
        row.push_str(&format!(" | {}", duration));
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionStatus;
    use crate::tests::fake_api::{listing, transaction};

    #[test]
    fn money_groups_thousands() {
        assert_eq!(money(0.0), "0");
        assert_eq!(money(950.0), "950");
        assert_eq!(money(4_500_000.0), "4,500,000");
        assert_eq!(money(-12_345.6), "-12,346");
    }

    #[test]
    fn cards_show_offer() {
        let rental = listing(2, "Nakuru", ListingKind::Rent);
        assert_eq!(
            listing_card(&rental),
            "#2 Nakuru | 2.5 acres, loam | KES 200,000 | for rent (12 months)"
        );

        let mut sold = listing(1, "Nairobi", ListingKind::Sale);
        sold.sold = true;
        assert!(listing_card(&sold).ends_with("| sold"));
    }

    #[test]
    fn transaction_rows() {
        let tx = transaction(5, 1, TransactionStatus::Pending);
        assert_eq!(
            transaction_row(&tx),
            "#5 listing 1 | Wanjiku Kamau <wanjiku@example.com> 0722000111 | pending"
        );
    }
}
