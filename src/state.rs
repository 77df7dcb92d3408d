use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::db::PgStore;
use crate::services::catalog::CatalogService;
use crate::services::learning_session::LearningSessionService;
use crate::services::onboarding::OnboardingService;
use crate::services::subscription::SubscriptionService;
use crate::store::{
    DictionaryCatalog, MemoryStore, SubscriptionStore, UserDirectory, WordProgressStore,
};

#[derive(Clone)]
pub enum StoreBackend {
    Postgres(PgStore),
    Memory(Arc<MemoryStore>),
}

impl StoreBackend {
    pub fn name(&self) -> &'static str {
        match self {
            StoreBackend::Postgres(_) => "postgres",
            StoreBackend::Memory(_) => "memory",
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    learning: Arc<LearningSessionService>,
    catalog: Arc<CatalogService>,
    subscriptions: Arc<SubscriptionService>,
    onboarding: Arc<OnboardingService>,
    backend: StoreBackend,
    started_at: Instant,
}

impl AppState {
    pub fn postgres(store: PgStore, store_timeout: Duration) -> Self {
        let shared = Arc::new(store.clone());
        Self::wire(shared, StoreBackend::Postgres(store), store_timeout)
    }

    pub fn memory(store: Arc<MemoryStore>, store_timeout: Duration) -> Self {
        Self::wire(Arc::clone(&store), StoreBackend::Memory(store), store_timeout)
    }

    fn wire<S>(store: Arc<S>, backend: StoreBackend, store_timeout: Duration) -> Self
    where
        S: UserDirectory + DictionaryCatalog + SubscriptionStore + WordProgressStore + 'static,
    {
        let learning = Arc::new(
            LearningSessionService::new(
                store.clone(),
                store.clone(),
                store.clone(),
                store.clone(),
            )
            .with_store_timeout(store_timeout),
        );
        let catalog = Arc::new(CatalogService::new(store.clone(), store.clone()));
        let subscriptions = Arc::new(SubscriptionService::new(
            store.clone(),
            store.clone(),
            store.clone(),
        ));
        let onboarding = Arc::new(OnboardingService::new(store, Arc::clone(&learning)));

        Self {
            learning,
            catalog,
            subscriptions,
            onboarding,
            backend,
            started_at: Instant::now(),
        }
    }

    pub fn learning(&self) -> &LearningSessionService {
        &self.learning
    }

    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }

    pub fn subscriptions(&self) -> &SubscriptionService {
        &self.subscriptions
    }

    pub fn onboarding(&self) -> &OnboardingService {
        &self.onboarding
    }

    pub fn backend(&self) -> &StoreBackend {
        &self.backend
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
