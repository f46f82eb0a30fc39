use crate::resource::ResourceDescriptor;
use crate::Result;
use serde_json::Value;

const MEETING: ResourceDescriptor = ResourceDescriptor::new("meeting", "meetings");

resource_type!(
    /// A recorded meeting.
    ///
    /// Summary and transcript are only present when the meeting was listed
    /// with `include_summary=true` / `include_transcript=true`; use
    /// [`fetch_summary`](Meeting::fetch_summary) and
    /// [`fetch_transcript`](Meeting::fetch_transcript) otherwise.
    Meeting,
    MEETING
);

impl Meeting {
    /// The id of this meeting's recording.
    pub fn recording_id(&self) -> Option<String> {
        self.get_string("recording_id")
    }

    /// Returns `true` if the meeting has a recording.
    pub fn has_recording(&self) -> bool {
        self.recording_id().is_some()
    }

    /// The `default_summary` object.
    pub fn summary(&self) -> Option<&Value> {
        self.get("default_summary").filter(|v| !v.is_null())
    }

    /// The transcript segments.
    pub fn transcript(&self) -> Option<&Value> {
        self.get("transcript").filter(|v| !v.is_null())
    }

    /// Calendar invitees.
    pub fn participants(&self) -> &[Value] {
        self.get_array("calendar_invitees")
    }

    /// Action items, present when requested with `include_action_items`.
    pub fn action_items(&self) -> &[Value] {
        self.get_array("action_items")
    }

    /// Fetches the recording summary. `None` when there is no recording.
    pub async fn fetch_summary(&self, destination_url: Option<&str>) -> Result<Option<Value>> {
        let Some(recording_id) = self.recording_id() else {
            return Ok(None);
        };
        self.client()
            .recordings()
            .summary(recording_id, destination_url)
            .await
            .map(Some)
    }

    /// Fetches the recording transcript. `None` when there is no recording.
    pub async fn fetch_transcript(&self, destination_url: Option<&str>) -> Result<Option<Value>> {
        let Some(recording_id) = self.recording_id() else {
            return Ok(None);
        };
        self.client()
            .recordings()
            .transcript(recording_id, destination_url)
            .await
            .map(Some)
    }
}
