use crate::resource::ResourceDescriptor;

const WEBHOOK: ResourceDescriptor = ResourceDescriptor::new("webhook", "webhooks");

resource_type!(
    /// A webhook subscription.
    Webhook,
    WEBHOOK
);

impl Webhook {
    /// The delivery URL.
    pub fn url(&self) -> Option<&str> {
        self.get_str("url")
    }

    /// The signing secret, when the API returns it.
    pub fn secret(&self) -> Option<&str> {
        self.get_str("secret")
    }

    /// Active if `active` is `true` or `status` is `"active"`.
    pub fn is_active(&self) -> bool {
        self.flag("active") || self.get_str("status") == Some("active")
    }

    /// Which recordings trigger the webhook, e.g. `my_recordings`,
    /// `shared_external_recordings`, `my_shared_with_team_recordings`,
    /// `shared_team_recordings`.
    pub fn triggered_for(&self) -> Vec<&str> {
        self.get_array("triggered_for")
            .iter()
            .filter_map(|v| v.as_str())
            .collect()
    }

    /// Payload options chosen when the webhook was created.
    pub fn include_transcript(&self) -> bool {
        self.flag("include_transcript")
    }

    pub fn include_summary(&self) -> bool {
        self.flag("include_summary")
    }

    pub fn include_action_items(&self) -> bool {
        self.flag("include_action_items")
    }

    pub fn include_crm_matches(&self) -> bool {
        self.flag("include_crm_matches")
    }
}

#[cfg(test)]
mod tests {
    use super::Webhook;
    use crate::{Client, Config};
    use serde_json::{json, Value};

    fn webhook(attributes: Value) -> Webhook {
        let Value::Object(map) = attributes else {
            panic!("attributes must be an object");
        };
        Client::new(Config::new("key")).unwrap().webhooks().build(map)
    }

    #[test]
    fn test_active_from_flag_or_status() {
        assert!(webhook(json!({"active": true})).is_active());
        assert!(webhook(json!({"status": "active"})).is_active());
        assert!(!webhook(json!({"active": false, "status": "paused"})).is_active());
        assert!(!webhook(json!({"active": "true"})).is_active());
        assert!(!webhook(json!({})).is_active());
    }

    #[test]
    fn test_payload_flags() {
        let hook = webhook(json!({
            "url": "https://example.com/hook",
            "secret": "whsec_123",
            "include_transcript": true,
            "include_summary": false,
            "include_action_items": true,
            "triggered_for": ["my_recordings", "shared_team_recordings"],
        }));

        assert_eq!(hook.url(), Some("https://example.com/hook"));
        assert_eq!(hook.secret(), Some("whsec_123"));
        assert!(hook.include_transcript());
        assert!(!hook.include_summary());
        assert!(hook.include_action_items());
        assert!(!hook.include_crm_matches());
        assert_eq!(
            hook.triggered_for(),
            vec!["my_recordings", "shared_team_recordings"]
        );
    }
}
