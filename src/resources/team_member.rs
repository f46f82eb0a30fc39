use crate::resource::{ListEndpoint, ResourceDescriptor, RetrieveEndpoint};

const TEAM_MEMBER: ResourceDescriptor = ResourceDescriptor::new("team_member", "team_members")
    .with_list(ListEndpoint::ItemsOnly)
    .with_retrieve(RetrieveEndpoint::Unsupported(
        "TeamMember get is not supported by the Fathom API. Use team_members().list() instead",
    ))
    .without_id();

resource_type!(
    /// A member of a team.
    ///
    /// Team members have no id and cannot be fetched individually; list them
    /// with an optional `team` filter instead.
    TeamMember,
    TEAM_MEMBER
);

impl TeamMember {
    /// The member's email address.
    pub fn email(&self) -> Option<&str> {
        self.get_str("email")
    }

    /// The member's display name.
    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
    }

    /// When the member joined, as an RFC 3339 timestamp.
    pub fn created_at(&self) -> Option<&str> {
        self.get_str("created_at")
    }
}
