pub mod dictionaries;
pub mod subscriptions;
pub mod users;
pub mod word_states;
