use agro_payment_engine::test_utils::prepare_env::seed_store;
use cucumber::given;

use crate::cucumber::{PaymentSystem, PaymentWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut PaymentWorld) {
    let system = PaymentSystem::new().await;
    world.system = Some(system);
}

#[given(expr = "a store {string} named {string} at {string}")]
async fn store_exists(world: &mut PaymentWorld, code: String, name: String, address: String) {
    seed_store(world.api().db(), &code, &name, &address).await;
}
