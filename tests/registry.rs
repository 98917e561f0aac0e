use chrono::NaiveDate;
use support_window::release::{Release, ReleaseRegistry};

fn release(org: &str, tag: &str, commit: &str) -> Release {
    let published = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    Release::new(org, tag, commit, published).unwrap()
}

#[test]
fn reinserting_a_page_does_not_duplicate_releases() {
    let mut registry = ReleaseRegistry::new();
    let page = [("v1.0.0", "aaa"), ("v1.1.0", "bbb")];

    for _ in 0..2 {
        for (tag, commit) in page {
            registry.insert("widget", release("acme", tag, commit));
        }
    }

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.library("acme", "widget").unwrap().len(), 2);
}

#[test]
fn library_mut_creates_an_empty_bucket() {
    let mut registry = ReleaseRegistry::new();

    assert!(registry.library_mut("acme", "widget").is_empty());
    assert_eq!(registry.library("acme", "widget"), Some(&[][..]));
    assert!(registry.library("acme", "gadget").is_none());
}
