use crate::metadata::QueryParams;
use crate::resource::{ListEndpoint, ResourceDescriptor, Resources, RetrieveEndpoint};
use crate::Result;
use http::Method;
use serde_json::Value;
use std::fmt;

const RECORDING: ResourceDescriptor = ResourceDescriptor::new("recording", "recordings")
    .with_list(ListEndpoint::Unsupported(
        "Recording list is not supported. Recordings are accessed via Meeting::recording_id",
    ))
    .with_retrieve(RetrieveEndpoint::Unsupported(
        "Recording get is not supported. Use recordings().summary(id) or recordings().transcript(id) instead",
    ));

resource_type!(
    /// A meeting recording.
    ///
    /// The API has no list or retrieve endpoint for recordings; only the
    /// summary and transcript of a known recording id can be fetched.
    Recording,
    RECORDING
);

impl Resources<Recording> {
    /// Fetches `recordings/<id>/summary`.
    ///
    /// With `destination_url` the API delivers the summary asynchronously
    /// to that URL and the returned value is the delivery confirmation.
    pub async fn summary(
        &self,
        recording_id: impl fmt::Display,
        destination_url: Option<&str>,
    ) -> Result<Value> {
        self.fetch_part(recording_id, "summary", destination_url)
            .await
    }

    /// Fetches `recordings/<id>/transcript`.
    ///
    /// `destination_url` works as for [`summary`](Self::summary).
    pub async fn transcript(
        &self,
        recording_id: impl fmt::Display,
        destination_url: Option<&str>,
    ) -> Result<Value> {
        self.fetch_part(recording_id, "transcript", destination_url)
            .await
    }

    async fn fetch_part(
        &self,
        recording_id: impl fmt::Display,
        part: &str,
        destination_url: Option<&str>,
    ) -> Result<Value> {
        let mut params = QueryParams::new();
        if let Some(url) = destination_url {
            params.insert("destination_url".to_string(), url.to_string());
        }

        let path = format!("{}/{}/{}", self.descriptor().path, recording_id, part);
        let body = self
            .client()
            .execute(Method::GET, path, &params, None)
            .await?;

        Ok(crate::resource::unwrap_key(body, &[part]))
    }
}
