use crate::domain::model::{RegistryLookupResult, Suggestion};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Queries the authoritative registry for a street/house-number/city/zip tuple.
#[async_trait]
pub trait RegistryLookup: Send + Sync {
    async fn lookup(
        &self,
        street: &str,
        house_number: &str,
        city: &str,
        zip: &str,
    ) -> Result<RegistryLookupResult>;
}

/// Fetches alternative addresses for a street in a city.
#[async_trait]
pub trait SuggestionLookup: Send + Sync {
    async fn suggest(&self, street: &str, city: &str) -> Result<Vec<Suggestion>>;
}

#[async_trait]
impl<T: RegistryLookup + ?Sized> RegistryLookup for Arc<T> {
    async fn lookup(
        &self,
        street: &str,
        house_number: &str,
        city: &str,
        zip: &str,
    ) -> Result<RegistryLookupResult> {
        (**self).lookup(street, house_number, city, zip).await
    }
}

#[async_trait]
impl<T: SuggestionLookup + ?Sized> SuggestionLookup for Arc<T> {
    async fn suggest(&self, street: &str, city: &str) -> Result<Vec<Suggestion>> {
        (**self).suggest(street, city).await
    }
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
