//! Content fingerprint over a retailer's listing set.

use acdb_core::ListingRecord;
use sha2::{Digest, Sha256};

/// SHA-256 hex digest of a listing set, independent of listing order.
///
/// Each listing is rendered as JSON with object keys in sorted order
/// (`serde_json::Value` maps are ordered), the renderings are sorted by
/// `(url, name)` with the rendering itself as tiebreak, and the resulting
/// JSON array is hashed. Persistence stamps such as `updated_at` are not
/// part of [`ListingRecord`] and so never reach the digest.
///
/// # Errors
///
/// Returns [`serde_json::Error`] if a listing cannot be serialized.
pub fn content_hash(listings: &[ListingRecord]) -> Result<String, serde_json::Error> {
    let mut rendered: Vec<(&str, &str, String)> = Vec::with_capacity(listings.len());
    for listing in listings {
        let canonical = serde_json::to_value(listing)?.to_string();
        rendered.push((listing.url.as_str(), listing.name.as_str(), canonical));
    }
    rendered.sort();

    let body = rendered
        .iter()
        .map(|(_, _, json)| json.as_str())
        .collect::<Vec<_>>()
        .join(",");
    Ok(format!("{:x}", Sha256::digest(format!("[{body}]").as_bytes())))
}

#[cfg(test)]
mod tests {
    use acdb_core::Retailer;
    use rust_decimal::Decimal;

    use super::*;

    fn listing(name: &str, url: &str, btu: Option<i32>) -> ListingRecord {
        let mut l = ListingRecord::new(name, url, Retailer::Jara).unwrap();
        l.btu = btu;
        l.price = Some(Decimal::new(9_999, 0));
        l
    }

    #[test]
    fn hash_is_deterministic_and_hex() {
        let set = vec![listing("A", "https://j/a", Some(9_000))];
        let first = content_hash(&set).unwrap();
        assert_eq!(first, content_hash(&set).unwrap());
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn hash_ignores_listing_order() {
        let a = listing("A", "https://j/a", None);
        let b = listing("B", "https://j/b", None);
        assert_eq!(
            content_hash(&[a.clone(), b.clone()]).unwrap(),
            content_hash(&[b, a]).unwrap()
        );
    }

    #[test]
    fn any_field_change_changes_hash() {
        let base = listing("A", "https://j/a", Some(9_000));
        let baseline = content_hash(std::slice::from_ref(&base)).unwrap();

        let mut btu = base.clone();
        btu.btu = Some(12_000);
        let mut price = base.clone();
        price.price = Some(Decimal::new(10_000, 0));
        let mut area = base.clone();
        area.service_area = Some(25.0);
        let mut currency = base.clone();
        currency.currency = "EUR".to_string();
        let mut store = base.clone();
        store.store = Retailer::Gree;

        for changed in [btu, price, area, currency, store] {
            assert_ne!(content_hash(&[changed]).unwrap(), baseline);
        }
    }

    #[test]
    fn empty_set_has_a_stable_hash() {
        assert_eq!(content_hash(&[]).unwrap(), content_hash(&[]).unwrap());
    }
}
