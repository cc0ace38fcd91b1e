//! Tests for [`CountryIndex`] and [`PolicyIndex`]: filter predicates,
//! ordering, last-write-wins maps and idempotence.

use std::sync::Arc;

use countrieslib::{Country, CountryIndex, Flag, Policy, PolicyIndex};

/// Every combination of code (home / overseas) and the two tri-state flags.
fn flag_grid() -> Vec<Country> {
    let flags = [Flag::Yes, Flag::No, Flag::Unknown];
    let mut countries = Vec::new();
    for (i, code) in ["GB", "AA", "BB"].iter().enumerate() {
        for (j, address) in flags.iter().enumerate() {
            for (k, birth) in flags.iter().enumerate() {
                let code = if *code == "GB" {
                    "GB".to_string()
                } else {
                    format!("{code}{i}{j}{k}")
                };
                countries.push(
                    Country::new(code)
                        .with_slug(format!("slug-{i}{j}{k}"))
                        .with_address_flag(*address)
                        .with_birth_flag(*birth),
                );
            }
        }
    }
    countries
}

fn expected(countries: &[Country], predicate: impl Fn(&Country) -> bool) -> Vec<Country> {
    countries.iter().filter(|c| predicate(c)).cloned().collect()
}

fn unwrap(view: &[Arc<Country>]) -> Vec<Country> {
    view.iter().map(|c| (**c).clone()).collect()
}

#[test]
fn overseas_is_everything_but_gb_in_order() {
    let countries = flag_grid();
    let index = CountryIndex::build(&countries);
    assert_eq!(
        unwrap(&index.overseas),
        expected(&countries, |c| c.country_code != "GB")
    );
}

#[test]
fn residence_matches_only_explicit_true() {
    let countries = flag_grid();
    let index = CountryIndex::build(&countries);
    assert_eq!(
        unwrap(&index.residence),
        expected(&countries, |c| c.address_country_flag == Flag::Yes)
    );
    assert!(
        index
            .residence
            .iter()
            .all(|c| c.address_country_flag.as_bool() == Some(true))
    );
}

#[test]
fn intersections() {
    let countries = flag_grid();
    let index = CountryIndex::build(&countries);
    assert_eq!(
        unwrap(&index.overseas_residence),
        expected(&countries, |c| {
            c.country_code != "GB" && c.address_country_flag == Flag::Yes
        })
    );
    assert_eq!(
        unwrap(&index.birth),
        expected(&countries, |c| c.country_of_birth_flag == Flag::Yes)
    );
    assert_eq!(
        unwrap(&index.overseas_birth),
        expected(&countries, |c| {
            c.country_code != "GB" && c.country_of_birth_flag == Flag::Yes
        })
    );
}

#[test]
fn rebuilding_is_idempotent() {
    let countries = flag_grid();
    assert_eq!(CountryIndex::build(&countries), CountryIndex::build(&countries));

    let policies = vec![Policy::new("GB").with_status("ACTIVE"), Policy::new("FR")];
    assert_eq!(PolicyIndex::build(&policies), PolicyIndex::build(&policies));
}

#[test]
fn duplicate_keys_last_write_wins() {
    let countries = vec![
        Country::new("GB").with_slug("first").with_display_name("Same"),
        Country::new("GB").with_slug("second").with_display_name("Same"),
    ];
    let index = CountryIndex::build(&countries);
    assert_eq!(index.by_id.len(), 1);
    assert_eq!(index.by_id["GB"].slug(), Some("second"));
    assert_eq!(index.by_slug.len(), 2);
    assert_eq!(index.by_display_name["Same"].slug(), Some("second"));

    let policies = vec![
        Policy::new("GB").with_status("INACTIVE"),
        Policy::new("GB").with_status("ACTIVE"),
    ];
    let index = PolicyIndex::build(&policies);
    assert_eq!(index.get("GB").unwrap().status.as_deref(), Some("ACTIVE"));
}

#[test]
fn uk_alias_is_not_applied_when_storing() {
    let index = CountryIndex::build(&[Country::new("UK")]);
    assert!(index.by_id.contains_key("UK"));
    assert!(!index.by_id.contains_key("GB"));
    assert_eq!(index.overseas.len(), 1);
}

#[test]
fn end_to_end_scenario() {
    let countries: Vec<Country> = serde_json::from_str(
        r#"[
            {"countryCode": "GB", "countryNameSlug": "united-kingdom", "addressCountryFlag": true, "countryOfBirthFlag": true},
            {"countryCode": "FO", "countryNameSlug": "foo", "addressCountryFlag": true, "countryOfBirthFlag": false}
        ]"#,
    )
    .unwrap();
    let index = CountryIndex::build(&countries);

    assert_eq!(unwrap(&index.overseas), vec![countries[1].clone()]);
    assert_eq!(unwrap(&index.residence), countries);
    assert_eq!(*index.by_slug["foo"], countries[1]);
    assert!(!index.by_slug.contains_key("missing"));
}
