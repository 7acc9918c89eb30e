//! Trip ledger against Postgres: lifecycle, closing rules, and the
//! closed-trip triggers.

#![allow(clippy::uninlined_format_args)]

mod common;

use bytes::Bytes;
use chrono::Utc;
use logisco_core::fleet::{FleetError, NewTruck, TruckUpdate};
use logisco_core::trip::{
    BillUpload, CloseRejection, ExpenseCategory, ExpenseChanges, LedgerError, NewExpense, NewPayment, NewTrip,
    PaymentMode, PaymentType, TripStatus, TripStore,
};
use logisco_db::entities::{expenses, sea_orm_active_enums, trips};
use logisco_db::{DashboardRepository, TripRepository, TruckRepository};
use logisco_shared::types::{PageRequest, TruckId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait};
use uuid::Uuid;

use common::{Fixture, LedgerService};

fn new_trip(fixture: &Fixture, rate: Decimal) -> NewTrip {
    NewTrip {
        truck_id: fixture.truck.id,
        source: "Trichy".into(),
        destination: "Tuticorin".into(),
        estimated_qty: Some(dec!(10)),
        rate_per_unit: Some(rate),
    }
}

fn expense(amount: Decimal) -> NewExpense {
    NewExpense {
        category: ExpenseCategory::Fuel,
        amount,
        note: Some("diesel".into()),
        bill: None,
    }
}

fn payment(amount: Decimal) -> NewPayment {
    NewPayment {
        amount,
        payment_type: PaymentType::Settlement,
        mode: PaymentMode::Upi,
        note: None,
    }
}

fn bill(filename: &str, content_type: &str) -> BillUpload {
    BillUpload {
        filename: filename.into(),
        content_type: content_type.into(),
        bytes: Bytes::from_static(b"%PDF-1.7 toll receipt"),
    }
}

async fn active_trip(service: &LedgerService, fixture: &Fixture, qty: Decimal, rate: Decimal) -> logisco_core::trip::Trip {
    let trip = service.create_trip(new_trip(fixture, rate)).await.unwrap();
    service.start_trip(trip.id).await.unwrap();
    service.update_actual_qty(trip.id, qty).await.unwrap()
}

#[tokio::test]
async fn test_settled_trip_closes_and_freezes() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = common::setup(&db).await;
    let service = common::service(&db);

    let trip = active_trip(&service, &fixture, dec!(10), dec!(100)).await;
    service.add_expense(trip.id, expense(dec!(200))).await.unwrap();
    service.add_payment(trip.id, payment(dec!(1000))).await.unwrap();

    let closed = service.close_trip(trip.id, "owner").await.unwrap();
    assert_eq!(closed.status, TripStatus::Closed);
    let snapshot = closed.closing.clone().expect("snapshot");
    assert_eq!(snapshot.final_revenue, dec!(1000));
    assert_eq!(snapshot.final_expenses, dec!(200));
    assert_eq!(snapshot.final_balance, dec!(800));
    assert_eq!(snapshot.closed_by, "owner");

    let err = service.add_expense(trip.id, expense(dec!(50))).await.unwrap_err();
    assert!(matches!(err, LedgerError::TripClosed(_)));
    let err = service.add_payment(trip.id, payment(dec!(50))).await.unwrap_err();
    assert!(matches!(err, LedgerError::TripClosed(_)));
    let err = service.update_actual_qty(trip.id, dec!(20)).await.unwrap_err();
    assert!(matches!(err, LedgerError::TripClosed(_)));

    let ledger = service.ledger(trip.id).await.unwrap();
    assert_eq!(ledger.expenses.len(), 1);
    assert_eq!(ledger.payments.len(), 1);
    assert_eq!(ledger.trip.closing, Some(snapshot));

    common::cleanup(&db, &fixture).await;
}

#[tokio::test]
async fn test_outstanding_balance_blocks_close() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = common::setup(&db).await;
    let service = common::service(&db);

    let trip = active_trip(&service, &fixture, dec!(10), dec!(100)).await;
    service.add_expense(trip.id, expense(dec!(200))).await.unwrap();
    service.add_payment(trip.id, payment(dec!(600))).await.unwrap();

    let err = service.close_trip(trip.id, "owner").await.unwrap_err();
    assert!(matches!(
        err,
        LedgerError::CloseRejected(CloseRejection::Outstanding { amount }) if amount == dec!(400)
    ));
    assert_eq!(err.to_string(), "Cannot close trip with ₹400 outstanding");

    let reloaded = service.ledger(trip.id).await.unwrap().trip;
    assert_eq!(reloaded.status, TripStatus::Active);
    assert!(reloaded.closing.is_none());

    common::cleanup(&db, &fixture).await;
}

#[tokio::test]
async fn test_no_expenses_reported_first() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = common::setup(&db).await;
    let service = common::service(&db);

    let trip = active_trip(&service, &fixture, dec!(5), dec!(50)).await;
    let err = service.close_trip(trip.id, "owner").await.unwrap_err();
    assert!(matches!(
        err,
        LedgerError::CloseRejected(CloseRejection::NoExpenses)
    ));

    common::cleanup(&db, &fixture).await;
}

#[tokio::test]
async fn test_planned_trip_cannot_close_and_unknown_truck_rejected() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = common::setup(&db).await;
    let service = common::service(&db);

    let trip = service.create_trip(new_trip(&fixture, dec!(100))).await.unwrap();
    assert_eq!(trip.status, TripStatus::Planned);
    let err = service.close_trip(trip.id, "owner").await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidTransition { .. }));

    let mut orphan = new_trip(&fixture, dec!(100));
    orphan.truck_id = TruckId::new();
    let err = service.create_trip(orphan).await.unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { entity: "truck", .. }));

    common::cleanup(&db, &fixture).await;
}

#[tokio::test]
async fn test_expense_edit_and_delete() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = common::setup(&db).await;
    let service = common::service(&db);

    let trip = active_trip(&service, &fixture, dec!(10), dec!(100)).await;
    let added = service.add_expense(trip.id, expense(dec!(200))).await.unwrap();

    let updated = service
        .update_expense(
            trip.id,
            added.id,
            ExpenseChanges {
                category: Some(ExpenseCategory::Toll),
                amount: Some(dec!(250.50)),
                note: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.category, ExpenseCategory::Toll);
    assert_eq!(updated.amount, dec!(250.50));
    assert_eq!(updated.note.as_deref(), Some("diesel"));

    service.delete_expense(trip.id, added.id).await.unwrap();
    let err = service.delete_expense(trip.id, added.id).await.unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { entity: "expense", .. }));
    assert!(service.ledger(trip.id).await.unwrap().expenses.is_empty());

    common::cleanup(&db, &fixture).await;
}

#[tokio::test]
async fn test_expense_bill_is_stored_and_replaced() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = common::setup(&db).await;
    let service = common::service(&db);

    let trip = active_trip(&service, &fixture, dec!(10), dec!(100)).await;
    let with_bill = service
        .add_expense(
            trip.id,
            NewExpense {
                bill: Some(bill("toll receipt.png", "image/png")),
                ..expense(dec!(120))
            },
        )
        .await
        .unwrap();
    let first = with_bill.bill_ref.clone().unwrap();
    assert!(first.starts_with(&format!("{}/", trip.id)));
    assert!(first.ends_with(".png"));

    let stored = service.ledger(trip.id).await.unwrap();
    assert_eq!(stored.expenses[0].bill_ref.as_deref(), Some(first.as_str()));
    // Memory storage cannot presign.
    assert_eq!(service.bill_url(trip.id, with_bill.id).await.unwrap(), None);

    let replaced = service
        .replace_expense_bill(trip.id, with_bill.id, bill("receipt.pdf", "application/pdf"))
        .await
        .unwrap();
    let second = replaced.bill_ref.unwrap();
    assert_ne!(second, first);
    assert!(second.ends_with(".pdf"));

    let err = service
        .add_expense(
            trip.id,
            NewExpense {
                bill: Some(bill("page.html", "text/html")),
                ..expense(dec!(50))
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidBill(_)));
    assert_eq!(service.ledger(trip.id).await.unwrap().expenses.len(), 1);

    let plain = service.add_expense(trip.id, expense(dec!(80))).await.unwrap();
    let err = service.bill_url(trip.id, plain.id).await.unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { entity: "bill", .. }));

    common::cleanup(&db, &fixture).await;
}

#[tokio::test]
async fn test_unstorable_precision_rejected_before_write() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = common::setup(&db).await;
    let service = common::service(&db);

    let trip = active_trip(&service, &fixture, dec!(10.001), dec!(0.50)).await;
    for amount in [dec!(0.001), dec!(12.345)] {
        let err = service.add_expense(trip.id, expense(amount)).await.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(a) if a == amount));
    }
    let err = service.update_actual_qty(trip.id, dec!(0.0001)).await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidQuantity(_)));

    let stored = service.ledger(trip.id).await.unwrap();
    assert!(stored.expenses.is_empty());
    assert_eq!(stored.trip.actual_qty, Some(dec!(10.001)));

    // 10.001 x 0.50 earns ₹5.00 once rounded to paise.
    service.add_expense(trip.id, expense(dec!(1))).await.unwrap();
    service.add_payment(trip.id, payment(dec!(5.00))).await.unwrap();
    let closed = service.close_trip(trip.id, "owner").await.unwrap();
    let snapshot = closed.closing.expect("snapshot");
    assert_eq!(snapshot.final_revenue, dec!(5.00));
    assert_eq!(snapshot.final_balance, dec!(4.00));

    let row = trips::Entity::find_by_id(trip.id.into_inner())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.final_revenue, Some(dec!(5.00)));

    common::cleanup(&db, &fixture).await;
}

#[tokio::test]
async fn test_trigger_refuses_writes_to_closed_trip() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = common::setup(&db).await;
    let service = common::service(&db);

    let trip = active_trip(&service, &fixture, dec!(10), dec!(100)).await;
    let existing = service.add_expense(trip.id, expense(dec!(200))).await.unwrap();
    service.add_payment(trip.id, payment(dec!(1000))).await.unwrap();
    service.close_trip(trip.id, "owner").await.unwrap();

    // Bypass the repository entirely.
    let direct_insert = expenses::ActiveModel {
        id: Set(Uuid::now_v7()),
        trip_id: Set(trip.id.into_inner()),
        category: Set(sea_orm_active_enums::ExpenseCategory::Other),
        amount: Set(dec!(10)),
        expense_date: Set(Utc::now().into()),
        note: Set(None),
        bill_path: Set(None),
        created_at: Set(Utc::now().into()),
    }
    .insert(&db)
    .await;
    assert!(direct_insert.is_err(), "trigger should refuse the insert");

    let direct_delete = expenses::Entity::delete_by_id(existing.id.into_inner())
        .exec(&db)
        .await;
    assert!(direct_delete.is_err(), "trigger should refuse the delete");

    let model = trips::Entity::find_by_id(trip.id.into_inner())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    let mut active: trips::ActiveModel = model.into();
    active.final_balance = Set(Some(dec!(0)));
    assert!(active.update(&db).await.is_err(), "closed trip row is frozen");

    common::cleanup(&db, &fixture).await;
}

#[tokio::test]
async fn test_store_refuses_closed_trip_under_lock() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = common::setup(&db).await;
    let service = common::service(&db);
    let repo = TripRepository::new(db.clone());

    let trip = active_trip(&service, &fixture, dec!(10), dec!(100)).await;
    let added = service.add_expense(trip.id, expense(dec!(200))).await.unwrap();
    service.add_payment(trip.id, payment(dec!(1000))).await.unwrap();
    service.close_trip(trip.id, "owner").await.unwrap();

    let err = repo.set_actual_qty(trip.id, dec!(1)).await.unwrap_err();
    assert!(matches!(err, LedgerError::TripClosed(_)));
    let err = repo.delete_expense(trip.id, added.id).await.unwrap_err();
    assert!(matches!(err, LedgerError::TripClosed(_)));

    common::cleanup(&db, &fixture).await;
}

#[tokio::test]
async fn test_trip_list_shows_result_only_when_closed() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = common::setup(&db).await;
    let service = common::service(&db);
    let repo = TripRepository::new(db.clone());

    let closed = active_trip(&service, &fixture, dec!(10), dec!(100)).await;
    service.add_expense(closed.id, expense(dec!(200))).await.unwrap();
    service.add_payment(closed.id, payment(dec!(1000))).await.unwrap();
    service.close_trip(closed.id, "owner").await.unwrap();
    let open = active_trip(&service, &fixture, dec!(1), dec!(1)).await;

    let page = PageRequest {
        page: 1,
        per_page: 100,
    };
    let (rows, total) = repo
        .list_summaries(None, &page)
        .await
        .unwrap();
    assert!(total >= 2);
    let closed_row = rows.iter().find(|r| r.id == closed.id).expect("closed row");
    assert_eq!(closed_row.truck_plate, fixture.truck.number_plate);
    assert_eq!(closed_row.result, Some(dec!(800)));
    assert_eq!(closed_row.result_label().as_deref(), Some("₹800"));
    let open_row = rows.iter().find(|r| r.id == open.id).expect("open row");
    assert_eq!(open_row.result, None);

    let (closed_only, _) = repo
        .list_summaries(Some(TripStatus::Closed), &page)
        .await
        .unwrap();
    assert!(closed_only.iter().all(|r| r.status == TripStatus::Closed));

    let strip = DashboardRepository::new(db.clone()).status_strip().await.unwrap();
    assert!(strip.active_trips >= 1);
    assert!(strip.cash_deployed >= Decimal::ZERO);

    common::cleanup(&db, &fixture).await;
}

#[tokio::test]
async fn test_truck_registration_rules() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = common::setup(&db).await;
    let trucks = TruckRepository::new(db.clone());

    let err = trucks
        .create(
            &fixture.company_name,
            NewTruck {
                number_plate: format!("  {} ", fixture.truck.number_plate.to_lowercase()),
                daily_fixed_cost: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, FleetError::DuplicateNumberPlate(_)));

    let updated = trucks
        .update(
            fixture.truck.id,
            TruckUpdate {
                daily_fixed_cost: dec!(1500),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.daily_fixed_cost, Some(dec!(1500)));

    let err = trucks
        .update(
            TruckId::new(),
            TruckUpdate {
                daily_fixed_cost: dec!(1),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, FleetError::TruckNotFound(_)));

    let found = trucks
        .find_by_plate(&fixture.truck.number_plate)
        .await
        .unwrap();
    assert_eq!(found.map(|t| t.id), Some(fixture.truck.id));

    common::cleanup(&db, &fixture).await;
}
