//! Integration tests for the vehicle ledger

use std::sync::Arc;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{BuyerId, CurrencyCode, CurrencyId, ImageId};
use domain_currency::{
    Currency, CurrencyConverter, ExchangeRateHistory, InMemoryCurrencyStore, NewCurrency, RateBook,
};
use domain_vehicle::{
    CostEntry, CurrencyAmount, ImageStorage, InMemoryImageStorage, InMemoryVehicleStore,
    KabulExpenses, KabulExpensesInput, LedgerPorts, NewBuyer, NewReferenceItem, PaymentStatus,
    Purchase, PurchaseInput, ReferenceKind, RepairExpenses, RepairExpensesInput, SaleInput,
    SaleStatus, SettingsUpdate, Shipping, ShippingInput, Vehicle, VehicleDetails, VehicleDossier,
    VehicleError, VehicleLedger, VehiclePort, WorldExpenses, WorldExpensesInput,
};

fn code(s: &str) -> CurrencyCode {
    CurrencyCode::parse(s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn aed() -> Currency {
    Currency::create(NewCurrency {
        code: code("AED"),
        name: "UAE Dirham".to_string(),
        symbol: "AED".to_string(),
        exchange_rate: dec!(0.28),
        is_base: false,
        is_active: true,
    })
    .unwrap()
}

struct Harness {
    ledger: VehicleLedger,
    store: InMemoryVehicleStore,
    images: InMemoryImageStorage,
}

/// USD as base, AED at 0.28 now and 0.27 from 2024-01-01
async fn harness() -> Harness {
    let aed = aed();
    let currencies = InMemoryCurrencyStore::with_currencies(vec![Currency::us_dollar(), aed.clone()]).await;
    currencies
        .seed_history(vec![ExchangeRateHistory::new(aed.id, dec!(0.27), date(2024, 1, 1))])
        .await;

    let store = InMemoryVehicleStore::new();
    let images = InMemoryImageStorage::new();
    let ledger = VehicleLedger::new(LedgerPorts {
        vehicles: Arc::new(store.clone()),
        buyers: Arc::new(store.clone()),
        references: Arc::new(store.clone()),
        settings: Arc::new(store.clone()),
        currencies: Arc::new(currencies),
        images: Arc::new(images.clone()),
    });
    Harness { ledger, store, images }
}

fn repair_of(amount: Decimal) -> RepairExpensesInput {
    RepairExpensesInput {
        repair_cost: CostEntry::base(amount),
        ..Default::default()
    }
}

// ============================================================================
// Vehicle records
// ============================================================================

mod vehicle_records {
    use super::*;

    #[tokio::test]
    async fn test_lot_number_assigned_once() {
        let h = harness().await;
        let vehicle = h.ledger.create_vehicle(VehicleDetails::default()).await.unwrap();
        assert!(vehicle.lot_number.starts_with("LOT-"));

        let mut cleared = vehicle.clone();
        cleared.lot_number.clear();
        let saved = h.ledger.save_vehicle(cleared).await.unwrap();
        assert_eq!(saved.lot_number, vehicle.lot_number);

        let again = h.ledger.save_vehicle(saved.clone()).await.unwrap();
        assert_eq!(again.lot_number, vehicle.lot_number);
        assert_eq!(h.ledger.list_vehicles().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_lot_ignores_case() {
        let h = harness().await;
        let vehicle = h.ledger.create_vehicle(VehicleDetails::default()).await.unwrap();

        let found = h
            .ledger
            .find_by_lot(&vehicle.lot_number.to_lowercase())
            .await
            .unwrap();
        assert_eq!(found.id, vehicle.id);

        let missing = h.ledger.find_by_lot("LOT-00000000").await.unwrap_err();
        assert!(matches!(missing, VehicleError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_reference_of_wrong_kind_rejected() {
        let h = harness().await;
        let white = h
            .ledger
            .create_reference(
                ReferenceKind::Color,
                NewReferenceItem { name: "White".to_string(), parent_id: None },
            )
            .await
            .unwrap();

        let err = h
            .ledger
            .create_vehicle(VehicleDetails {
                mark_id: Some(white.id),
                ..Default::default()
            })
            .await
            .unwrap_err();
        match err {
            VehicleError::Validation(errors) => assert!(errors.has_field("mark_id")),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(h.ledger.list_vehicles().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_cascades_to_stages_and_images() {
        let h = harness().await;
        let vehicle = h.ledger.create_vehicle(VehicleDetails::default()).await.unwrap();
        h.ledger
            .save_purchase(vehicle.id, PurchaseInput::default())
            .await
            .unwrap();
        h.ledger
            .attach_image(vehicle.id, "front.jpg", b"bytes", "front")
            .await
            .unwrap();
        assert_eq!(h.images.len().await, 1);

        h.ledger.delete_vehicle(vehicle.id).await.unwrap();

        assert!(h.store.purchase_for(vehicle.id).await.unwrap().is_none());
        assert!(h.store.images_for(vehicle.id).await.unwrap().is_empty());
        assert_eq!(h.images.len().await, 0);
    }

    #[tokio::test]
    async fn test_stage_for_unknown_vehicle_not_found() {
        let h = harness().await;
        let orphan = Vehicle::new(VehicleDetails::default());
        let err = h
            .ledger
            .save_repair_expenses(orphan.id, repair_of(dec!(10)))
            .await
            .unwrap_err();
        assert!(matches!(err, VehicleError::NotFound { .. }));
    }
}

// ============================================================================
// Stage saves
// ============================================================================

mod stage_saves {
    use super::*;

    #[tokio::test]
    async fn test_purchase_balance_in_base() {
        let h = harness().await;
        let vehicle = h.ledger.create_vehicle(VehicleDetails::default()).await.unwrap();

        // AED converts at the 2024 history rate of 0.27
        let purchase = h
            .ledger
            .save_purchase(
                vehicle.id,
                PurchaseInput {
                    purchase_price: CurrencyAmount::new(dec!(10000), Some(code("AED"))),
                    paid_amount: CurrencyAmount::usd(dec!(1000)),
                    buy_date: Some(date(2024, 3, 1)),
                    payment_date: Some(date(2024, 4, 1)),
                },
            )
            .await
            .unwrap();

        assert_eq!(purchase.remain_purchase, dec!(1700));
        assert_eq!(purchase.payment_date, Some(date(2024, 4, 1)));
        assert_eq!(purchase.payment_status(), PaymentStatus::PartiallyPaid);
    }

    #[tokio::test]
    async fn test_fully_paid_purchase_clears_payment_date() {
        let h = harness().await;
        let vehicle = h.ledger.create_vehicle(VehicleDetails::default()).await.unwrap();

        let purchase = h
            .ledger
            .save_purchase(
                vehicle.id,
                PurchaseInput {
                    purchase_price: CurrencyAmount::usd(dec!(5000)),
                    paid_amount: CurrencyAmount::usd(dec!(5000)),
                    buy_date: Some(date(2024, 3, 1)),
                    payment_date: Some(date(2024, 4, 1)),
                },
            )
            .await
            .unwrap();

        assert_eq!(purchase.remain_purchase, Decimal::ZERO);
        assert_eq!(purchase.payment_date, None);
        assert_eq!(purchase.payment_status(), PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_resave_keeps_identity() {
        let h = harness().await;
        let vehicle = h.ledger.create_vehicle(VehicleDetails::default()).await.unwrap();

        let first = h.ledger.save_repair_expenses(vehicle.id, repair_of(dec!(100))).await.unwrap();
        let second = h.ledger.save_repair_expenses(vehicle.id, repair_of(dec!(250))).await.unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        let stored = h.ledger.repair_expenses(vehicle.id).await.unwrap().unwrap();
        assert_eq!(stored.repair_cost.amount, dec!(250));
    }

    #[tokio::test]
    async fn test_world_balance_flag_requires_amount_and_date() {
        let h = harness().await;
        let vehicle = h.ledger.create_vehicle(VehicleDetails::default()).await.unwrap();

        let err = h
            .ledger
            .save_world_expenses(
                vehicle.id,
                WorldExpensesInput {
                    has_remaining_gomrok: true,
                    has_remaining_commission: true,
                    remaining_commission: Some(dec!(50)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        match err {
            VehicleError::Validation(errors) => {
                assert!(errors.has_field("remaining_gomrok"));
                assert!(errors.has_field("remaining_gomrok_date"));
                assert!(errors.has_field("remaining_commission_date"));
                assert!(!errors.has_field("remaining_commission"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(h.ledger.world_expenses(vehicle.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_world_balance_discarded_when_flag_off() {
        let h = harness().await;
        let vehicle = h.ledger.create_vehicle(VehicleDetails::default()).await.unwrap();

        let world = h
            .ledger
            .save_world_expenses(
                vehicle.id,
                WorldExpensesInput {
                    has_remaining_gomrok: false,
                    remaining_gomrok: Some(dec!(900)),
                    remaining_gomrok_date: Some(date(2024, 5, 1)),
                    shipping_to_border: CostEntry::new(dec!(800), Some(code("USD")), None),
                    paid_for_shipping: CostEntry::new(dec!(300), Some(code("USD")), None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(world.remaining_gomrok, None);
        assert_eq!(world.remain_shipping, dec!(500));
    }

    #[tokio::test]
    async fn test_kabul_balance_kept_when_flag_on() {
        let h = harness().await;
        let vehicle = h.ledger.create_vehicle(VehicleDetails::default()).await.unwrap();

        let kabul = h
            .ledger
            .save_kabul_expenses(
                vehicle.id,
                KabulExpensesInput {
                    herat_to_kabul: CostEntry::base(dec!(400)),
                    has_remaining: true,
                    remaining: Some(dec!(150)),
                    remaining_date: Some(date(2024, 7, 1)),
                    arrival_date_kabul: None,
                },
            )
            .await
            .unwrap();

        let remaining = kabul.remaining.unwrap();
        assert_eq!(remaining.amount, dec!(150));
        assert_eq!(remaining.date, date(2024, 7, 1));
    }
}

// ============================================================================
// Derivation chain
// ============================================================================

mod derivation_chain {
    use super::*;

    #[tokio::test]
    async fn test_missing_world_stage_contributes_zero() {
        let h = harness().await;
        let vehicle = h.ledger.create_vehicle(VehicleDetails::default()).await.unwrap();
        h.ledger
            .save_kabul_expenses(
                vehicle.id,
                KabulExpensesInput {
                    herat_to_kabul: CostEntry::new(dec!(1000), Some(code("AED")), None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let report = h.ledger.cost_report(vehicle.id).await.unwrap();
        assert_eq!(report.amount_to_herat, None);
        assert_eq!(report.usa_to_kabul_cost, Some(dec!(280)));
        assert_eq!(report.total_cost_in_kabul, Some(dec!(280)));
        assert_eq!(report.final_cost, None);
    }

    #[tokio::test]
    async fn test_chain_through_every_stage() {
        let h = harness().await;
        let vehicle = h.ledger.create_vehicle(VehicleDetails::default()).await.unwrap();
        let id = vehicle.id;

        h.ledger
            .save_purchase(
                id,
                PurchaseInput {
                    purchase_price: CurrencyAmount::usd(dec!(5000)),
                    buy_date: Some(date(2024, 2, 1)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        h.ledger
            .save_shipping(
                id,
                ShippingInput {
                    shipping: CostEntry::new(dec!(1000), Some(code("AED")), Some(date(2024, 3, 1))),
                    towing: CostEntry::base(dec!(150)),
                    cash_paid_commission: CostEntry::base(dec!(50)),
                    dubai_paid_invoice: CostEntry::base(dec!(100)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        h.ledger
            .save_world_expenses(
                id,
                WorldExpensesInput {
                    shipping_to_border: CostEntry::base(dec!(300)),
                    gomrok_payment: CostEntry::base(dec!(700)),
                    business_commission: CostEntry::base(dec!(100)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        h.ledger
            .save_kabul_expenses(
                id,
                KabulExpensesInput {
                    herat_to_kabul: CostEntry::base(dec!(200)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        h.ledger.save_repair_expenses(id, repair_of(dec!(400))).await.unwrap();

        let report = h.ledger.cost_report(id).await.unwrap();
        assert_eq!(report.purchase_price, Some(dec!(5000)));
        assert_eq!(report.invoice_total_dubai, Some(dec!(420)));
        assert_eq!(report.dubai_remain_invoice, Some(dec!(320)));
        assert_eq!(report.cost_to_dubai, Some(dec!(470)));
        assert_eq!(report.total_price_to_dubai, Some(dec!(5470)));
        assert_eq!(report.amount_to_herat, Some(dec!(1100)));
        assert_eq!(report.all_expenses_to_herat, Some(dec!(6570)));
        assert_eq!(report.usa_to_kabul_cost, Some(dec!(1300)));
        assert_eq!(report.total_cost_in_kabul, Some(dec!(6770)));
        assert_eq!(report.final_cost, Some(dec!(7170)));
        assert_eq!(report.base_currency.as_deref(), Some("USD"));
    }
}

// ============================================================================
// Sale reconciliation
// ============================================================================

mod sale_reconciliation {
    use super::*;

    async fn buyer(h: &Harness) -> BuyerId {
        h.ledger
            .create_buyer(NewBuyer {
                name: "Ahmad Karimi".to_string(),
                ..Default::default()
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_sold_vehicle_benefit_split() {
        let h = harness().await;
        let vehicle = h.ledger.create_vehicle(VehicleDetails::default()).await.unwrap();
        h.ledger.save_repair_expenses(vehicle.id, repair_of(dec!(6000))).await.unwrap();
        let buyer_id = buyer(&h).await;

        h.ledger
            .save_sale(
                vehicle.id,
                SaleInput {
                    status: SaleStatus::Sold,
                    buyer_id: Some(buyer_id),
                    sale_price: CurrencyAmount::usd(dec!(10000)),
                    sale_date: Some(date(2024, 9, 1)),
                    split_note: "50/50".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let sale = h.ledger.cost_report(vehicle.id).await.unwrap().sale;
        assert_eq!(sale.sale_commission, dec!(300));
        assert_eq!(sale.special_sale_price, dec!(9700));
        assert_eq!(sale.benefit, dec!(3700));
        assert_eq!(sale.benefit_person_1, dec!(1850));
        assert_eq!(sale.benefit_person_2, dec!(1850));
        assert_eq!(sale.capital_bound, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_unsold_price_tracks_final_cost() {
        let h = harness().await;
        let vehicle = h.ledger.create_vehicle(VehicleDetails::default()).await.unwrap();
        h.ledger.save_repair_expenses(vehicle.id, repair_of(dec!(6000))).await.unwrap();

        let sale = h
            .ledger
            .save_sale(
                vehicle.id,
                SaleInput {
                    sale_price: CurrencyAmount::new(dec!(99), Some(code("AED"))),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(sale.status, SaleStatus::ReadyForSale);
        assert_eq!(sale.sale_price.amount, dec!(6000));
        assert_eq!(sale.sale_price.currency, Some(code("USD")));

        let summary = h.ledger.cost_report(vehicle.id).await.unwrap().sale;
        assert_eq!(summary.capital_bound, dec!(6000));
        assert_eq!(summary.benefit, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_unsold_without_repair_valued_at_zero() {
        let h = harness().await;
        let vehicle = h.ledger.create_vehicle(VehicleDetails::default()).await.unwrap();

        let sale = h
            .ledger
            .save_sale(
                vehicle.id,
                SaleInput {
                    status: SaleStatus::InTransit,
                    sale_price: CurrencyAmount::usd(dec!(8000)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(sale.sale_price.amount, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_sold_requires_price_date_and_buyer() {
        let h = harness().await;
        let vehicle = h.ledger.create_vehicle(VehicleDetails::default()).await.unwrap();

        let err = h
            .ledger
            .save_sale(
                vehicle.id,
                SaleInput {
                    status: SaleStatus::Sold,
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        match err {
            VehicleError::Validation(errors) => {
                assert_eq!(errors.len(), 3);
                assert!(errors.has_field("sale_price"));
                assert!(errors.has_field("sale_date"));
                assert!(errors.has_field("buyer_id"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(h.ledger.sale(vehicle.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sold_with_unknown_buyer_not_found() {
        let h = harness().await;
        let vehicle = h.ledger.create_vehicle(VehicleDetails::default()).await.unwrap();

        let err = h
            .ledger
            .save_sale(
                vehicle.id,
                SaleInput {
                    status: SaleStatus::Sold,
                    buyer_id: Some(BuyerId::new()),
                    sale_price: CurrencyAmount::usd(dec!(5000)),
                    sale_date: Some(date(2024, 9, 1)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, VehicleError::NotFound { ref entity, .. } if entity == "Buyer"));
    }

    #[tokio::test]
    async fn test_deleting_buyer_keeps_sale() {
        let h = harness().await;
        let vehicle = h.ledger.create_vehicle(VehicleDetails::default()).await.unwrap();
        let buyer_id = buyer(&h).await;
        h.ledger
            .save_sale(
                vehicle.id,
                SaleInput {
                    status: SaleStatus::Sold,
                    buyer_id: Some(buyer_id),
                    sale_price: CurrencyAmount::usd(dec!(5000)),
                    sale_date: Some(date(2024, 9, 1)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        h.ledger.delete_buyer(buyer_id).await.unwrap();
        let sale = h.ledger.sale(vehicle.id).await.unwrap().unwrap();
        assert_eq!(sale.buyer_id, None);
    }
}

// ============================================================================
// Catalogs, images, settings and dashboard
// ============================================================================

mod supporting_records {
    use super::*;

    #[tokio::test]
    async fn test_car_type_parent_must_be_mark() {
        let h = harness().await;
        let color = h
            .ledger
            .create_reference(
                ReferenceKind::Color,
                NewReferenceItem { name: "Black".to_string(), parent_id: None },
            )
            .await
            .unwrap();

        let err = h
            .ledger
            .create_reference(
                ReferenceKind::CarType,
                NewReferenceItem { name: "Corolla".to_string(), parent_id: Some(color.id) },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, VehicleError::Validation(ref e) if e.has_field("parent_id")));

        let toyota = h
            .ledger
            .create_reference(
                ReferenceKind::Mark,
                NewReferenceItem { name: "Toyota".to_string(), parent_id: None },
            )
            .await
            .unwrap();
        let corolla = h
            .ledger
            .create_reference(
                ReferenceKind::CarType,
                NewReferenceItem { name: "Corolla".to_string(), parent_id: Some(toyota.id) },
            )
            .await
            .unwrap();
        assert_eq!(corolla.parent_id, Some(toyota.id));
    }

    #[tokio::test]
    async fn test_deleting_mark_clears_vehicle_references() {
        let h = harness().await;
        let toyota = h
            .ledger
            .create_reference(
                ReferenceKind::Mark,
                NewReferenceItem { name: "Toyota".to_string(), parent_id: None },
            )
            .await
            .unwrap();
        let corolla = h
            .ledger
            .create_reference(
                ReferenceKind::CarType,
                NewReferenceItem { name: "Corolla".to_string(), parent_id: Some(toyota.id) },
            )
            .await
            .unwrap();
        let vehicle = h
            .ledger
            .create_vehicle(VehicleDetails {
                mark_id: Some(toyota.id),
                car_type_id: Some(corolla.id),
                ..Default::default()
            })
            .await
            .unwrap();

        h.ledger.delete_reference(toyota.id).await.unwrap();

        let vehicle = h.ledger.get_vehicle(vehicle.id).await.unwrap();
        assert_eq!(vehicle.mark_id, None);
        assert_eq!(vehicle.car_type_id, None);
        assert!(h.ledger.list_references(ReferenceKind::CarType).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_buyer_search_is_case_insensitive() {
        let h = harness().await;
        for name in ["Zahir Shah", "Ahmad Karimi", "Karim Noori"] {
            h.ledger
                .create_buyer(NewBuyer { name: name.to_string(), ..Default::default() })
                .await
                .unwrap();
        }

        let found: Vec<_> = h
            .ledger
            .list_buyers(Some("KARIM"))
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(found, vec!["Ahmad Karimi", "Karim Noori"]);
        assert_eq!(h.ledger.list_buyers(Some("  ")).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_images_listed_in_upload_order() {
        let h = harness().await;
        let vehicle = h.ledger.create_vehicle(VehicleDetails::default()).await.unwrap();

        let first = h.ledger.attach_image(vehicle.id, "a.jpg", b"a", "front").await.unwrap();
        let second = h.ledger.attach_image(vehicle.id, "b.jpg", b"b", "rear").await.unwrap();

        let listed: Vec<_> = h
            .ledger
            .list_images(vehicle.id)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(listed, vec![first.id, second.id]);
        assert_eq!(h.images.get(&second.path).await, Some(b"b".to_vec()));

        h.ledger.delete_image(first.id).await.unwrap();
        assert_eq!(h.images.get(&first.path).await, None);
        assert_eq!(h.ledger.list_images(vehicle.id).await.unwrap().len(), 1);
    }

    /// Stores files in memory but can never remove them
    struct StickyImageStorage(InMemoryImageStorage);

    #[async_trait::async_trait]
    impl ImageStorage for StickyImageStorage {
        async fn store(&self, image_id: ImageId, file_name: &str, bytes: &[u8]) -> Result<String, VehicleError> {
            self.0.store(image_id, file_name, bytes).await
        }

        async fn remove(&self, _path: &str) -> Result<(), VehicleError> {
            Err(VehicleError::storage("permission denied"))
        }
    }

    #[tokio::test]
    async fn test_image_record_deleted_when_file_removal_fails() {
        let store = InMemoryVehicleStore::new();
        let files = InMemoryImageStorage::new();
        let ledger = VehicleLedger::new(LedgerPorts {
            vehicles: Arc::new(store.clone()),
            buyers: Arc::new(store.clone()),
            references: Arc::new(store.clone()),
            settings: Arc::new(store.clone()),
            currencies: Arc::new(InMemoryCurrencyStore::with_currencies(vec![Currency::us_dollar()]).await),
            images: Arc::new(StickyImageStorage(files.clone())),
        });
        let vehicle = ledger.create_vehicle(VehicleDetails::default()).await.unwrap();
        let image = ledger.attach_image(vehicle.id, "a.jpg", b"a", "front").await.unwrap();

        ledger.delete_image(image.id).await.unwrap();

        assert!(ledger.list_images(vehicle.id).await.unwrap().is_empty());
        assert_eq!(files.len().await, 1);
    }

    #[tokio::test]
    async fn test_empty_image_rejected() {
        let h = harness().await;
        let vehicle = h.ledger.create_vehicle(VehicleDetails::default()).await.unwrap();
        let err = h.ledger.attach_image(vehicle.id, "a.jpg", b"", "").await.unwrap_err();
        assert!(matches!(err, VehicleError::Validation(_)));
        assert_eq!(h.images.len().await, 0);
    }

    #[tokio::test]
    async fn test_settings_created_on_first_load() {
        let h = harness().await;
        let settings = h.ledger.settings().await.unwrap();
        assert_eq!(settings.site_name, "Vehicle Ledger");

        let err = h
            .ledger
            .update_settings(SettingsUpdate {
                site_name: Some("Herat Motors".to_string()),
                base_currency_id: Some(CurrencyId::new()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, VehicleError::Validation(ref e) if e.has_field("base_currency_id")));

        let updated = h
            .ledger
            .update_settings(SettingsUpdate {
                site_name: Some("Herat Motors".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.site_name, "Herat Motors");
        assert_eq!(h.ledger.settings().await.unwrap().site_name, "Herat Motors");
    }

    #[tokio::test]
    async fn test_dashboard_totals() {
        let h = harness().await;
        let buyer_id = h
            .ledger
            .create_buyer(NewBuyer { name: "Buyer".to_string(), ..Default::default() })
            .await
            .unwrap()
            .id;

        let sold = h.ledger.create_vehicle(VehicleDetails::default()).await.unwrap();
        h.ledger.save_repair_expenses(sold.id, repair_of(dec!(6000))).await.unwrap();
        h.ledger
            .save_sale(
                sold.id,
                SaleInput {
                    status: SaleStatus::Sold,
                    buyer_id: Some(buyer_id),
                    sale_price: CurrencyAmount::usd(dec!(10000)),
                    sale_date: Some(date(2024, 9, 1)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let ready = h.ledger.create_vehicle(VehicleDetails::default()).await.unwrap();
        h.ledger
            .save_purchase(
                ready.id,
                PurchaseInput {
                    purchase_price: CurrencyAmount::usd(dec!(1500)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        h.ledger.save_repair_expenses(ready.id, repair_of(dec!(2000))).await.unwrap();
        h.ledger.save_sale(ready.id, SaleInput::default()).await.unwrap();

        h.ledger.create_vehicle(VehicleDetails::default()).await.unwrap();

        let summary = h.ledger.dashboard().await.unwrap();
        assert_eq!(summary.vehicle_count, 3);
        assert_eq!(summary.sold_count, 1);
        assert_eq!(summary.ready_count, 1);
        assert_eq!(summary.in_transit_count, 0);
        assert_eq!(summary.sold_percentage, dec!(33.3));
        assert_eq!(summary.total_sales, dec!(10000));
        assert_eq!(summary.total_benefit, dec!(3700));
        assert_eq!(summary.average_benefit, dec!(3700));
        assert_eq!(summary.total_investment, dec!(1500));
        assert_eq!(summary.total_expenses, dec!(8000));
        assert_eq!(summary.recent_vehicles.len(), 3);
        assert_eq!(summary.top_performers.len(), 1);
        assert_eq!(summary.top_performers[0].lot_number, sold.lot_number);
    }
}

// ============================================================================
// Property tests
// ============================================================================

mod properties {
    use super::*;

    const DATES: [Option<(i32, u32, u32)>; 4] = [None, Some((2022, 6, 1)), Some((2023, 6, 1)), Some((2024, 6, 1))];

    fn book_and_aed() -> (RateBook, Currency) {
        let aed = aed();
        let history = vec![
            ExchangeRateHistory::new(aed.id, dec!(0.25), date(2023, 1, 1)),
            ExchangeRateHistory::new(aed.id, dec!(0.27), date(2024, 1, 1)),
        ];
        (RateBook::new(vec![Currency::us_dollar(), aed.clone()], history), aed)
    }

    /// Rate an AED entry converts at, following the seeded history
    fn aed_rate(on: Option<NaiveDate>) -> Decimal {
        match on {
            Some(d) if d >= date(2024, 1, 1) => dec!(0.27),
            Some(d) if d >= date(2023, 1, 1) => dec!(0.25),
            _ => dec!(0.28),
        }
    }

    fn entry() -> impl Strategy<Value = CostEntry> {
        (0i64..10_000_000, any::<bool>(), 0usize..DATES.len()).prop_map(|(cents, is_aed, d)| {
            CostEntry::new(
                Decimal::new(cents, 2),
                Some(code(if is_aed { "AED" } else { "USD" })),
                DATES[d].map(|(y, m, day)| date(y, m, day)),
            )
        })
    }

    fn expected(entry: &CostEntry) -> Decimal {
        if entry.currency == Some(code("AED")) {
            entry.amount * aed_rate(entry.date)
        } else {
            entry.amount
        }
    }

    proptest! {
        #[test]
        fn final_cost_is_sum_of_converted_costs(entries in prop::collection::vec(entry(), 17)) {
            let (book, _) = book_and_aed();
            let converter = CurrencyConverter::new(&book);
            let vehicle = Vehicle::new(VehicleDetails::default());
            let id = vehicle.id;
            let mut dossier = VehicleDossier::new(vehicle);

            let e = |i: usize| entries[i].clone();
            dossier.purchase = Some(Purchase::new(id, PurchaseInput {
                purchase_price: CurrencyAmount::new(e(0).amount, e(0).currency),
                buy_date: e(0).date,
                ..Default::default()
            }));
            dossier.shipping = Some(Shipping::new(id, ShippingInput {
                commission: e(1),
                clearing: e(2),
                duty_vat: e(3),
                delivery_order: e(4),
                red_sea: e(5),
                towing: e(6),
                shipping: e(7),
                port_clips_prmi: e(8),
                attestation: e(9),
                cash_paid_commission: e(10),
                ..Default::default()
            }));
            dossier.world_expenses = Some(WorldExpenses::new(id, WorldExpensesInput {
                business_commission: e(11),
                gomrok_payment: e(12),
                shipping_to_border: e(13),
                ..Default::default()
            }.validate().unwrap()));
            dossier.kabul_expenses = Some(KabulExpenses::new(id, KabulExpensesInput {
                herat_to_kabul: e(14),
                ..Default::default()
            }.validate().unwrap()));
            dossier.repair_expenses = Some(RepairExpenses::new(id, RepairExpensesInput {
                repair_cost: e(15),
                palate_cost: e(16),
                ..Default::default()
            }));

            let total: Decimal = entries.iter().map(expected).sum();
            prop_assert_eq!(dossier.chain(converter).final_cost(), Some(total));
        }

        #[test]
        fn purchase_balance_matches_converted_difference(
            price in entry(),
            paid_cents in 0i64..10_000_000,
        ) {
            let (book, _) = book_and_aed();
            let converter = CurrencyConverter::new(&book);
            let mut purchase = Purchase::new(core_kernel::VehicleId::new(), PurchaseInput {
                purchase_price: CurrencyAmount::new(price.amount, price.currency.clone()),
                paid_amount: CurrencyAmount::usd(Decimal::new(paid_cents, 2)),
                buy_date: price.date,
                payment_date: Some(date(2025, 1, 1)),
            });
            purchase.recalculate(&converter);

            let remain = expected(&price) - Decimal::new(paid_cents, 2);
            prop_assert_eq!(purchase.remain_purchase, remain);
            if remain <= Decimal::ZERO {
                prop_assert_eq!(purchase.payment_date, None);
            } else {
                prop_assert!(purchase.payment_date.is_some());
            }
        }
    }
}
