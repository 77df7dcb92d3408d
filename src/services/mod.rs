pub mod catalog;
pub mod learning_session;
pub mod onboarding;
pub mod pending_words;
pub mod subscription;
