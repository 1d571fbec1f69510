use crate::models::{ListingStatus, PropertyRecord};

/// `1234567` -> `"1,234,567"`
fn with_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// One-line summary of a record.
///
/// `is_comp` switches sold records to the "sold for" wording used in the
/// comparables list.
pub fn format_record(record: &PropertyRecord, is_comp: bool) -> String {
    let beds = match record.bedrooms() {
        0 => "beds N/A".to_string(),
        n => format!("{n} bed"),
    };
    let baths = if record.bathrooms() > 0.0 {
        format!("{} bath", record.bathrooms())
    } else {
        "baths N/A".to_string()
    };
    let area = match record.area_sqft() {
        0 => "sq ft N/A".to_string(),
        n => format!("{} sq ft", with_thousands(u64::from(n))),
    };
    let price = if is_comp && record.status() == ListingStatus::Sold {
        format!("sold for ${}", with_thousands(record.price()))
    } else {
        format!("${}", with_thousands(record.price()))
    };

    format!(
        "{} - {}, {}, {} - {} - {}",
        record.address(),
        beds,
        baths,
        area,
        price,
        record.listing_url()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Candidate;
    use url::Url;

    fn record(status: ListingStatus, bedrooms: u32, bathrooms: f64, area_sqft: u32) -> PropertyRecord {
        PropertyRecord::accept(
            Candidate {
                address: Some("12 Oak St, Austin, TX 78701".to_string()),
                bedrooms,
                bathrooms,
                area_sqft,
                price: 1_234_000,
                listing_url: Some("/homedetails/123_zpid/".to_string()),
                sold_date: None,
            },
            status,
            &Url::parse("https://www.zillow.com").unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn thousands() {
        assert_eq!(with_thousands(0), "0");
        assert_eq!(with_thousands(999), "999");
        assert_eq!(with_thousands(1000), "1,000");
        assert_eq!(with_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn full_record() {
        assert_eq!(
            format_record(&record(ListingStatus::Active, 4, 2.5, 2100), false),
            "12 Oak St, Austin, TX 78701 - 4 bed, 2.5 bath, 2,100 sq ft - $1,234,000 - https://www.zillow.com/homedetails/123_zpid/"
        );
    }

    #[test]
    fn unknown_fields() {
        assert_eq!(
            format_record(&record(ListingStatus::Active, 0, 0.0, 0), false),
            "12 Oak St, Austin, TX 78701 - beds N/A, baths N/A, sq ft N/A - $1,234,000 - https://www.zillow.com/homedetails/123_zpid/"
        );
    }

    #[test]
    fn sold_wording_only_for_comparables() {
        let sold = record(ListingStatus::Sold, 3, 2.0, 1500);
        assert!(format_record(&sold, true).contains(" - sold for $1,234,000 - "));
        assert!(format_record(&sold, false).contains(" - $1,234,000 - "));
        assert!(format_record(&sold, true).contains("2 bath"));

        let active = record(ListingStatus::Active, 3, 2.0, 1500);
        assert!(!format_record(&active, true).contains("sold for"));
    }
}
