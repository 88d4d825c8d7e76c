//! HTTP access to the person collection and the demography service.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{Country, EyeColor, HairColor, Person, PersonDraft, PersonId},
    error::ErrorResponse,
    protocol::{ByHeightQuery, CountByLocationQuery, PersonsApiResponse},
};
use tracing::debug;

use crate::{
    config::ClientSettings,
    error::{ClientError, Operation},
    query::QueryDescriptor,
    store::ResultPage,
};

/// Anything that can answer a paginated list query.
#[async_trait]
pub trait PageSource: Send + Sync + 'static {
    type Item: Send + Sync + 'static;

    async fn fetch_page(
        &self,
        query: &QueryDescriptor,
    ) -> Result<ResultPage<Self::Item>, ClientError>;
}

#[async_trait]
pub trait PersonApi: Send + Sync {
    async fn list_persons(&self, query: &QueryDescriptor)
        -> Result<ResultPage<Person>, ClientError>;
    async fn create_person(&self, draft: &PersonDraft) -> Result<(), ClientError>;
    async fn update_person(&self, id: PersonId, draft: &PersonDraft) -> Result<(), ClientError>;
    async fn delete_person(&self, id: PersonId) -> Result<(), ClientError>;
    async fn average_weight(&self) -> Result<f64, ClientError>;
    async fn count_by_location(&self, query: &CountByLocationQuery) -> Result<u64, ClientError>;
    async fn persons_by_min_height(&self, min_height: f64) -> Result<Vec<Person>, ClientError>;
    async fn count_by_hair_color(&self, hair_color: HairColor) -> Result<u64, ClientError>;
    async fn nationality_eye_color_percentage(
        &self,
        nationality: Country,
        eye_color: EyeColor,
    ) -> Result<f64, ClientError>;
}

pub struct HttpPersonClient {
    http: Client,
    persons_api_url: String,
    demography_api_url: String,
}

impl HttpPersonClient {
    pub fn new(settings: &ClientSettings) -> Self {
        Self::with_client(Client::new(), settings)
    }

    pub fn with_client(http: Client, settings: &ClientSettings) -> Self {
        Self {
            http,
            persons_api_url: settings.persons_api_url.trim_end_matches('/').to_string(),
            demography_api_url: settings
                .demography_api_url
                .trim_end_matches('/')
                .to_string(),
        }
    }

    fn persons(&self, suffix: &str) -> String {
        format!("{}/persons{suffix}", self.persons_api_url)
    }

    async fn send(&self, operation: Operation, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|err| ClientError::transport(operation, err.to_string()))?;
        let status = response.status();
        debug!(%operation, status = status.as_u16(), "person service responded");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(parsed) if !parsed.summary().is_empty() => parsed.summary(),
            _ if !body.trim().is_empty() => body.trim().to_string(),
            _ => status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string(),
        };
        Err(ClientError::status(operation, status.as_u16(), detail))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: Operation,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.send(operation, request).await?;
        response.json::<T>().await.map_err(|err| ClientError::Decode {
            operation,
            detail: err.to_string(),
        })
    }

    async fn write<B: Serialize + Sync>(
        &self,
        operation: Operation,
        request: RequestBuilder,
        body: Option<&B>,
    ) -> Result<(), ClientError> {
        let request = match body {
            Some(body) => request.json(body),
            None => request,
        };
        self.send(operation, request).await.map(|_| ())
    }
}

#[async_trait]
impl PersonApi for HttpPersonClient {
    async fn list_persons(
        &self,
        query: &QueryDescriptor,
    ) -> Result<ResultPage<Person>, ClientError> {
        let request = self.http.get(self.persons("")).query(&query.to_query_pairs());
        let body: PersonsApiResponse = self.get_json(Operation::ListPersons, request).await?;
        Ok(ResultPage::new(body.persons, body.size))
    }

    async fn create_person(&self, draft: &PersonDraft) -> Result<(), ClientError> {
        let request = self.http.post(self.persons(""));
        self.write(Operation::CreatePerson, request, Some(draft)).await
    }

    async fn update_person(&self, id: PersonId, draft: &PersonDraft) -> Result<(), ClientError> {
        let request = self.http.put(self.persons(&format!("/{id}")));
        self.write(Operation::UpdatePerson, request, Some(draft)).await
    }

    async fn delete_person(&self, id: PersonId) -> Result<(), ClientError> {
        let request = self.http.delete(self.persons(&format!("/{id}")));
        self.write::<()>(Operation::DeletePerson, request, None)
            .await
    }

    async fn average_weight(&self) -> Result<f64, ClientError> {
        let request = self.http.get(self.persons("/average-weight"));
        self.get_json(Operation::AverageWeight, request).await
    }

    async fn count_by_location(&self, query: &CountByLocationQuery) -> Result<u64, ClientError> {
        let request = self
            .http
            .get(self.persons("/count-by-location"))
            .query(query);
        self.get_json(Operation::CountByLocation, request).await
    }

    async fn persons_by_min_height(&self, min_height: f64) -> Result<Vec<Person>, ClientError> {
        let request = self
            .http
            .get(self.persons("/by-height"))
            .query(&ByHeightQuery { min_height });
        self.get_json(Operation::PersonsByHeight, request).await
    }

    async fn count_by_hair_color(&self, hair_color: HairColor) -> Result<u64, ClientError> {
        let url = format!("{}/hair-color/{hair_color}", self.demography_api_url);
        self.get_json(Operation::CountByHairColor, self.http.get(url))
            .await
    }

    async fn nationality_eye_color_percentage(
        &self,
        nationality: Country,
        eye_color: EyeColor,
    ) -> Result<f64, ClientError> {
        let url = format!(
            "{}/nationality/{nationality}/eye-color/{eye_color}/percentage",
            self.demography_api_url
        );
        self.get_json(Operation::NationalityEyeColorPercentage, self.http.get(url))
            .await
    }
}

#[async_trait]
impl PageSource for HttpPersonClient {
    type Item = Person;

    async fn fetch_page(&self, query: &QueryDescriptor) -> Result<ResultPage<Person>, ClientError> {
        self.list_persons(query).await
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
