//! Mutations and aggregate queries, with user-facing reporting.

use std::sync::Arc;

use shared::{
    domain::{Coordinates, Country, EyeColor, HairColor, Person, PersonDraft, PersonId},
    protocol::CountByLocationQuery,
};
use tracing::{info, warn};

use crate::{
    error::ClientError,
    notify::{NotificationSink, Severity},
    orchestrator::RefreshListener,
    query::{Pagination, QueryDescriptor},
    transport::PersonApi,
};

/// Page size used when collecting coordinates already known to the server.
pub const COORDINATE_LOOKUP_PAGE_SIZE: u32 = 20;

pub struct PersonService {
    api: Arc<dyn PersonApi>,
    sink: Arc<dyn NotificationSink>,
    refresh: Option<Arc<dyn RefreshListener>>,
}

impl PersonService {
    pub fn new(api: Arc<dyn PersonApi>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            api,
            sink,
            refresh: None,
        }
    }

    /// Successful mutations will ask `listener` to refetch the list.
    pub fn with_refresh(mut self, listener: Arc<dyn RefreshListener>) -> Self {
        self.refresh = Some(listener);
        self
    }

    pub async fn create(&self, draft: &PersonDraft) -> Result<(), ClientError> {
        let result = self.api.create_person(draft).await;
        self.finish_mutation(result, "Person created")
    }

    pub async fn update(&self, id: PersonId, draft: &PersonDraft) -> Result<(), ClientError> {
        let result = self.api.update_person(id, draft).await;
        self.finish_mutation(result, "Person updated")
    }

    pub async fn delete(&self, id: PersonId) -> Result<(), ClientError> {
        let result = self.api.delete_person(id).await;
        self.finish_mutation(result, "Person deleted")
    }

    pub async fn average_weight(&self) -> Result<f64, ClientError> {
        let result = self.api.average_weight().await;
        self.report(result)
    }

    pub async fn count_by_location(&self, query: &CountByLocationQuery) -> Result<u64, ClientError> {
        let result = self.api.count_by_location(query).await;
        self.report(result)
    }

    pub async fn persons_by_min_height(&self, min_height: f64) -> Result<Vec<Person>, ClientError> {
        let result = self.api.persons_by_min_height(min_height).await;
        self.report(result)
    }

    pub async fn count_by_hair_color(&self, hair_color: HairColor) -> Result<u64, ClientError> {
        let result = self.api.count_by_hair_color(hair_color).await;
        self.report(result)
    }

    pub async fn nationality_eye_color_percentage(
        &self,
        nationality: Country,
        eye_color: EyeColor,
    ) -> Result<f64, ClientError> {
        let result = self
            .api
            .nationality_eye_color_percentage(nationality, eye_color)
            .await;
        self.report(result)
    }

    /// Coordinates of the first page of persons, without duplicates, in server order.
    pub async fn distinct_coordinates(&self) -> Result<Vec<Coordinates>, ClientError> {
        let query = QueryDescriptor {
            pagination: Pagination::new(0, COORDINATE_LOOKUP_PAGE_SIZE)
                .unwrap_or_default(),
            ..QueryDescriptor::default()
        };
        let page = self.report(self.api.list_persons(&query).await)?;

        let mut unique: Vec<Coordinates> = Vec::new();
        for person in page.data {
            let c = person.coordinates;
            if !unique.iter().any(|u| u.x == c.x && u.y == c.y) {
                unique.push(c);
            }
        }
        Ok(unique)
    }

    fn finish_mutation(&self, result: Result<(), ClientError>, done: &str) -> Result<(), ClientError> {
        self.report(result)?;
        info!("{done}");
        self.sink.notify(done, Severity::Info);
        if let Some(listener) = &self.refresh {
            listener.refresh();
        }
        Ok(())
    }

    fn report<T>(&self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        result.inspect_err(|err| {
            warn!(category = ?err.category(), "{err}");
            self.sink.notify(err.user_message(), Severity::Error);
        })
    }
}

#[cfg(test)]
#[path = "tests/service_tests.rs"]
mod tests;
