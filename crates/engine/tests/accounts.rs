use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    AccountPatch, AccountUpsert, CategoryKind, ColorToken, Engine, EngineError, MoneyCents,
    SOURCE_BRIDGE, SOURCE_MANUAL,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for user in ["alice", "bob"] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec![user.into(), "password".into()],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn bridge_account(id: &str, balance: &str, date: i64) -> AccountUpsert {
    AccountUpsert {
        sf_account_id: Some(id.to_string()),
        sf_account_name: Some(format!("{id} account")),
        sf_name: Some("First Bank".to_string()),
        balance: balance.to_string(),
        sf_balance_date: Some(date),
    }
}

#[tokio::test]
async fn upsert_inserts_and_refreshes() {
    let (engine, _db) = engine_with_db().await;

    let written = engine
        .upsert_accounts(
            "alice",
            vec![
                bridge_account("chk", "1200.00", 1_700_000_000),
                bridge_account("cc", "-300.50", 1_700_000_100),
            ],
            SOURCE_BRIDGE,
        )
        .await
        .unwrap();
    assert_eq!(written, 2);

    engine
        .update_account(
            "alice",
            "chk",
            AccountPatch {
                display_name: Some("Everyday".to_string()),
                category: Some("Checking".to_string()),
                hidden: None,
            },
        )
        .await
        .unwrap();

    engine
        .upsert_accounts(
            "alice",
            vec![bridge_account("chk", "1500.25", 1_700_100_000)],
            SOURCE_BRIDGE,
        )
        .await
        .unwrap();

    let accounts = engine.accounts("alice", true).await.unwrap();
    assert_eq!(accounts.len(), 2);
    // Ordered by id.
    assert_eq!(accounts[0].sf_account_id, "cc");
    let checking = &accounts[1];
    assert_eq!(checking.balance, "1500.25");
    assert_eq!(checking.sf_balance_date, Some(1_700_100_000));
    assert_eq!(checking.display_name.as_deref(), Some("Everyday"));
    assert_eq!(checking.category.as_deref(), Some("Checking"));
    assert_eq!(checking.label(), "Everyday");

    assert!(engine.accounts("bob", true).await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_balance_rejects_batch() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .upsert_accounts(
            "alice",
            vec![
                bridge_account("chk", "10.00", 1),
                bridge_account("cc", "ten dollars", 1),
            ],
            SOURCE_BRIDGE,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
    assert!(engine.accounts("alice", true).await.unwrap().is_empty());
}

#[tokio::test]
async fn extra_decimals_are_stored_and_rounded() {
    let (engine, _db) = engine_with_db().await;

    let written = engine
        .upsert_accounts(
            "alice",
            vec![
                bridge_account("chk", "12.345", 1),
                bridge_account("sav", "0.015", 2),
            ],
            SOURCE_BRIDGE,
        )
        .await
        .unwrap();
    assert_eq!(written, 2);

    let accounts = engine.accounts("alice", false).await.unwrap();
    assert_eq!(accounts[0].balance, "12.345");

    let summary = engine.dashboard("alice").await.unwrap();
    assert_eq!(summary.net_worth, MoneyCents::new(1236));
    assert_eq!(summary.breakdown[0].label, "Uncategorized");
    assert_eq!(summary.breakdown[0].total, MoneyCents::new(1236));
}

#[tokio::test]
async fn manual_account_gets_generated_id() {
    let (engine, _db) = engine_with_db().await;

    engine
        .upsert_accounts(
            "alice",
            vec![AccountUpsert {
                sf_account_name: Some("Piggy bank".to_string()),
                balance: "42".to_string(),
                ..AccountUpsert::default()
            }],
            SOURCE_MANUAL,
        )
        .await
        .unwrap();

    let accounts = engine.accounts("alice", false).await.unwrap();
    assert_eq!(accounts.len(), 1);
    assert!(accounts[0].sf_account_id.starts_with("manual-"));
    assert_eq!(accounts[0].source, SOURCE_MANUAL);
    assert!(!accounts[0].hidden);
}

#[tokio::test]
async fn update_account_checks_category_and_account() {
    let (engine, _db) = engine_with_db().await;
    engine
        .upsert_accounts("alice", vec![bridge_account("chk", "5", 1)], SOURCE_BRIDGE)
        .await
        .unwrap();

    // Transaction categories are not valid for accounts.
    let err = engine
        .update_account(
            "alice",
            "chk",
            AccountPatch {
                category: Some("Food".to_string()),
                ..AccountPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("Food".to_string()));

    let err = engine
        .update_account(
            "alice",
            "missing",
            AccountPatch {
                hidden: Some(true),
                ..AccountPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("missing".to_string()));

    engine
        .add_category(
            "alice",
            CategoryKind::Account,
            Some("Checking"),
            "Joint",
            ColorToken::new("green.500"),
            None,
        )
        .await
        .unwrap();
    let account = engine
        .update_account(
            "alice",
            "chk",
            AccountPatch {
                category: Some("Joint".to_string()),
                ..AccountPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(account.category.as_deref(), Some("Joint"));

    let account = engine
        .update_account(
            "alice",
            "chk",
            AccountPatch {
                category: Some(String::new()),
                ..AccountPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(account.category, None);

    let unchanged = engine
        .update_account("alice", "chk", AccountPatch::default())
        .await
        .unwrap();
    assert_eq!(unchanged, account);
}

#[tokio::test]
async fn hidden_accounts_are_left_out() {
    let (engine, _db) = engine_with_db().await;
    engine
        .upsert_accounts(
            "alice",
            vec![
                bridge_account("a", "100", 1),
                bridge_account("b", "200", 2),
            ],
            SOURCE_BRIDGE,
        )
        .await
        .unwrap();
    engine
        .update_account(
            "alice",
            "b",
            AccountPatch {
                hidden: Some(true),
                ..AccountPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(engine.accounts("alice", false).await.unwrap().len(), 1);
    assert_eq!(engine.accounts("alice", true).await.unwrap().len(), 2);

    let summary = engine.dashboard("alice").await.unwrap();
    assert_eq!(summary.net_worth, MoneyCents::new(10_000));
}

#[tokio::test]
async fn dashboard_groups_by_account_categories() {
    let (engine, _db) = engine_with_db().await;
    engine
        .upsert_accounts(
            "alice",
            vec![
                bridge_account("chk", "50.00", 10),
                bridge_account("sav", "70.00", 20),
                bridge_account("cc", "-20.00", 30),
                bridge_account("misc", "50.00", 5),
            ],
            SOURCE_BRIDGE,
        )
        .await
        .unwrap();
    for (id, category) in [("chk", "Checking"), ("sav", "Checking"), ("cc", "Credit Card")] {
        engine
            .update_account(
                "alice",
                id,
                AccountPatch {
                    category: Some(category.to_string()),
                    ..AccountPatch::default()
                },
            )
            .await
            .unwrap();
    }

    // Deleting a category leaves the reference on the account.
    engine
        .delete_category("alice", CategoryKind::Account, 3, None, None)
        .await
        .unwrap();

    let summary = engine.dashboard("alice").await.unwrap();
    assert_eq!(summary.net_worth, MoneyCents::new(15_000));
    assert_eq!(summary.total_assets, MoneyCents::new(17_000));
    assert_eq!(summary.total_liabilities, MoneyCents::new(2_000));
    assert_eq!(summary.latest_balance_date, Some(30));
    assert_eq!(summary.uncategorized_accounts, 1);

    // Buckets follow account order (by id): cc, chk, misc, sav.
    let labels: Vec<&str> = summary.breakdown.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec!["Checking", "Uncategorized"]);
    assert_eq!(summary.breakdown[0].total, MoneyCents::new(12_000));
    assert_eq!(summary.breakdown[0].color.as_str(), "green.500");
    assert_eq!(summary.breakdown[1].color.as_str(), "red.500");
}
