//! Endpoint tests run the real routes against a mocked ledger, in-memory sessions and a recording notifier.
mod helpers;
mod mocks;
mod orders;
mod subscriptions;
mod webhook;
