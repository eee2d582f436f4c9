//! End-to-end reconciliation from the persisted wire bag

use boxkit_model::{DeliveryDate, ListKind, Personalization, ProduceBox, Product, PropertyCodec, WireProperties};
use boxkit_reconcile::{reconcile, Adjustment, ReconcileConfig, ReconciliationEngine};
use pretty_assertions::assert_eq;

const WEEK_ONE: &str = r#"{"Delivery Date":"Tue Feb 20 2024",
    "Including":"Carrots 1kg (2)",
    "Add on Items":"Cabbage Green (2)",
    "Swapped Items":"Silverbeet (2)",
    "Removed Items":"Beetroot 1kg"}"#;

fn date() -> DeliveryDate {
    DeliveryDate::from_ymd(2024, 2, 20).unwrap()
}

fn week_one_box() -> ProduceBox {
    ProduceBox::new(1, "Small Veg Box", date())
        .with_included(vec![
            Product::new(10, "Carrots 1kg", 400, "veg"),
            Product::new(11, "Beetroot 1kg", 450, "veg"),
        ])
        .with_add_ons(vec![
            Product::new(20, "Cabbage Green", 500, "veg"),
            Product::new(21, "Silverbeet", 420, "veg"),
        ])
}

fn decode(json: &str) -> (WireProperties, Personalization) {
    let props = WireProperties::from_json(json).unwrap();
    let decoded = PropertyCodec::decode(&props).unwrap();
    assert!(decoded.is_clean());
    (props, decoded.value)
}

#[test]
fn unchanged_catalog_returns_state_verbatim() {
    let (props, previous) = decode(WEEK_ONE);

    let out = reconcile(&previous, &week_one_box());

    assert!(out.messages().is_empty());
    assert_eq!(PropertyCodec::encode(&out.state), props);
}

#[test]
fn lost_swap_is_replaced_by_compatible_addon() {
    let (_, previous) = decode(WEEK_ONE);
    let mut catalog = week_one_box();
    catalog.add_on_products.retain(|p| p.title != "Silverbeet");
    catalog.add_on_products.push(Product::new(22, "Parsnip 1kg", 480, "veg"));

    let out = reconcile(&previous, &catalog);

    assert_eq!(out.state.titles(ListKind::SwappedItems), vec!["Parsnip 1kg"]);
    assert_eq!(out.state.titles(ListKind::RemovedItems), vec!["Beetroot 1kg"]);
    assert!(out
        .messages()
        .contains(&"Swapped Parsnip 1kg for your removed item Beetroot 1kg".to_string()));
    assert!(out.adjustments.contains(&Adjustment::SwappedUnavailable {
        title: "Silverbeet".into(),
        billed_extra: 1,
    }));
}

#[test]
fn lost_swap_without_candidate_restores_removed_item() {
    let (_, previous) = decode(WEEK_ONE);
    let mut catalog = week_one_box();
    catalog.add_on_products.retain(|p| p.title != "Silverbeet");

    let out = reconcile(&previous, &catalog);

    assert!(out.state.titles(ListKind::RemovedItems).is_empty());
    assert!(out.state.titles(ListKind::SwappedItems).is_empty());
    assert_eq!(
        PropertyCodec::encode(&out.state).including,
        "Carrots 1kg (2),Beetroot 1kg"
    );
    assert!(out.messages().iter().any(|m| m.contains("restored")));
}

#[test]
fn wider_tolerance_finds_more_candidates() {
    let (_, previous) = decode(WEEK_ONE);
    let mut catalog = week_one_box();
    catalog.add_on_products.retain(|p| p.title != "Silverbeet");
    catalog.add_on_products.push(Product::new(23, "Leeks", 600, "veg"));

    let strict = reconcile(&previous, &catalog);
    assert!(strict.state.titles(ListKind::SwappedItems).is_empty());

    let relaxed = ReconciliationEngine::new(ReconcileConfig::new().with_swap_price_tolerance(200))
        .reconcile(&previous, &catalog);
    assert_eq!(relaxed.state.titles(ListKind::SwappedItems), vec!["Leeks"]);
}

#[test]
fn next_week_carries_the_personalization_forward() {
    let (_, previous) = decode(WEEK_ONE);
    let next = ProduceBox {
        delivery_date: DeliveryDate::from_ymd(2024, 2, 27).unwrap(),
        ..week_one_box()
    };

    let out = reconcile(&previous, &next);

    assert!(out.is_unchanged());
    assert_eq!(PropertyCodec::encode(&out.state).delivery_date, "Tue Feb 27 2024");
}
