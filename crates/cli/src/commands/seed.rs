use chrono::Utc;
use rust_decimal::Decimal;

use parley_core::config::{AppConfig, LoadOptions};
use parley_core::{Concept, FraudCase, Order, OrderItem};
use parley_store::RecordStore;

use crate::commands::CommandResult;

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let store = RecordStore::new(&config.data.dir);
        write_fixtures(&store).await.map_err(|error| error.to_string())
    });

    match result {
        Ok(summary) => CommandResult::success(
            "seed",
            format!("demo records written to `{}`:\n{summary}", config.data.dir.display()),
        ),
        Err(message) => CommandResult::failure("seed", "seed_execution", message, 4),
    }
}

/// Seeding replaces each collection outright so repeated runs stay
/// deterministic.
async fn write_fixtures(store: &RecordStore) -> Result<String, parley_store::StoreError> {
    let cases = vec![FraudCase {
        user_name: "John".to_owned(),
        transaction_name: "Acme Electronics".to_owned(),
        transaction_amount: "$742.50".to_owned(),
        transaction_time: "2026-08-27 03:14".to_owned(),
        transaction_location: "Austin, TX".to_owned(),
        card_ending: "4421".to_owned(),
        security_question: "What is your favorite color?".to_owned(),
        security_answer: "Blue".to_owned(),
        status: "pending".to_owned(),
        outcome: String::new(),
    }];
    store.fraud_cases().replace_all(&cases).await?;

    let concepts = vec![
        Concept::synthesize("Newton's First Law"),
        Concept::synthesize("Ohm's Law"),
        Concept::synthesize("Photosynthesis"),
    ];
    store.concepts().replace_all(&concepts).await?;

    let scenarios: Vec<String> = [
        "you are a weather forecaster reporting on raining meatballs",
        "sell me this invisible pen",
        "you are a tour guide in a city that does not exist",
        "give an acceptance speech for an award you did not win",
        "narrate a cooking show where every ingredient is missing",
    ]
    .iter()
    .map(|s| (*s).to_owned())
    .collect();
    store.scenarios().replace_all(&scenarios).await?;

    let orders = vec![Order::new(
        "order-1",
        vec![
            OrderItem {
                product_id: "espresso-beans".to_owned(),
                name: "Espresso Beans 1kg".to_owned(),
                quantity: 2,
                price: Decimal::new(1_250, 2),
            },
            OrderItem {
                product_id: "paper-filters".to_owned(),
                name: "Paper Filters".to_owned(),
                quantity: 1,
                price: Decimal::new(499, 2),
            },
        ],
        "USD",
        Utc::now(),
    )];
    store.orders().replace_all(&orders).await?;

    Ok(format!(
        "  - fraud cases: {}\n  - concepts: {}\n  - scenarios: {}\n  - orders: {}",
        cases.len(),
        concepts.len(),
        scenarios.len(),
        orders.len()
    ))
}

#[cfg(test)]
mod tests {
    use parley_store::RecordStore;

    use super::write_fixtures;

    #[tokio::test]
    async fn fixtures_are_idempotent_across_reruns() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RecordStore::new(dir.path());

        write_fixtures(&store).await.expect("first run");
        write_fixtures(&store).await.expect("second run");

        assert_eq!(store.fraud_cases().load().await.len(), 1);
        assert_eq!(store.concepts().load().await.len(), 3);
        assert_eq!(store.orders().load().await.len(), 1);

        let case = store.find_case("john").await.expect("case exists");
        assert_eq!(case.security_answer, "Blue");
        assert_eq!(case.status, "pending");
    }
}
