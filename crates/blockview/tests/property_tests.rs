//! Property-based tests for block-list filtering and counting.

use blockview::mock::{MockDocument, MockNode};
use blockview::{
    BlockListContext, Comparison, Condition, Describable, ElementSpec, FilterTriple, MemorySink,
    PageRegistry, Scenario, Selector, VerifyConfig,
};
use proptest::prelude::*;
use std::sync::Arc;

#[derive(Default)]
struct Row;

impl Describable for Row {
    fn describe_elements(&self) -> Vec<ElementSpec> {
        vec![
            ElementSpec::element("Name", Selector::css(".name")),
            ElementSpec::element("Price", Selector::css(".price")),
        ]
    }
}

#[derive(Default)]
struct Table;

impl Describable for Table {
    fn describe_elements(&self) -> Vec<ElementSpec> {
        vec![ElementSpec::blocks::<Row>("Rows", Selector::css("li"))]
    }
}

// ===== Strategy definitions =====

fn row_strategy() -> impl Strategy<Value = (&'static str, &'static str)> {
    (
        prop_oneof![Just("Apple"), Just("Pear"), Just("Plum")],
        prop_oneof![Just("10"), Just("12")],
    )
}

fn context(rows: &[(&str, &str)]) -> BlockListContext {
    let doc = MockDocument::new();
    let list = doc.append(doc.root(), MockNode::new("ul"));
    for (name, price) in rows {
        let row = doc.append(list, MockNode::new("li"));
        let _ = doc.append(row, MockNode::new("span").class("name").text(*name));
        let _ = doc.append(row, MockNode::new("span").class("price").text(*price));
    }
    let config = VerifyConfig::new()
        .with_timeout_ms(0)
        .with_polling_interval_ms(1);
    let mut scenario = Scenario::new(doc, Arc::new(config), Arc::new(MemorySink::new()))
        .with_pages(PageRegistry::new().with_page::<Table>("Table"));
    let _ = scenario.open_page("Table").expect("page builds");
    BlockListContext::from_list(&scenario, "Rows").expect("list is not empty")
}

proptest! {
    /// Adding a filter row never widens the result.
    #[test]
    fn prop_filter_narrowing_is_subset(
        rows in prop::collection::vec(row_strategy(), 1..8),
        name in prop_oneof![Just("Apple"), Just("Pear")],
    ) {
        let ctx = context(&rows);
        let by_name = ctx.filter_by_conditions(&[FilterTriple::new("Name", "equals", name)]);
        let by_both = ctx.filter_by_conditions(&[
            FilterTriple::new("Name", "equals", name),
            FilterTriple::new("Price", "equals", "10"),
        ]);

        let expected_name = rows.iter().filter(|(n, _)| *n == name).count();
        let expected_both = rows.iter().filter(|(n, p)| *n == name && *p == "10").count();

        match by_name {
            Ok(blocks) => prop_assert_eq!(blocks.len(), expected_name),
            Err(e) => prop_assert!(e.is_verification() && expected_name == 0),
        }
        match by_both {
            Ok(both) => {
                prop_assert_eq!(both.len(), expected_both);
                let names = ctx
                    .filter_by_conditions(&[FilterTriple::new("Name", "equals", name)])
                    .unwrap();
                prop_assert!(both.iter().all(|b| names.contains(b)));
            }
            Err(e) => prop_assert!(e.is_verification() && expected_both == 0),
        }
    }

    /// Counting agrees with a direct scan, and the count wait accepts it.
    #[test]
    fn prop_count_matches_scan(rows in prop::collection::vec(row_strategy(), 1..8)) {
        let ctx = context(&rows);
        let twelve = Condition::text_equals("12");
        let expected = rows.iter().filter(|(_, p)| *p == "12").count();
        prop_assert_eq!(ctx.count_matching("Price", &twelve).unwrap(), expected);
        prop_assert_eq!(
            ctx.should_have_matching_count("Price", &twelve, Comparison::Equal, expected).unwrap(),
            expected
        );
    }

    /// Every in-range block number resolves; the bounds do not.
    #[test]
    fn prop_nth_block_bounds(rows in prop::collection::vec(row_strategy(), 1..8)) {
        let ctx = context(&rows);
        let size = rows.len();
        for n in 1..=size {
            prop_assert!(ctx.nth_block(n).is_ok());
        }
        prop_assert!(ctx.nth_block(0).is_err());
        prop_assert!(ctx.nth_block(size + 1).is_err());
    }
}
