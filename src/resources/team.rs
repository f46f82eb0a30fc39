use super::TeamMember;
use crate::metadata::QueryParams;
use crate::resource::ResourceDescriptor;
use crate::{Error, Result};

const TEAM: ResourceDescriptor = ResourceDescriptor::new("team", "teams");

resource_type!(
    /// A team in the workspace.
    Team,
    TEAM
);

impl Team {
    /// The team name, also used as the `team` filter for members.
    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
    }

    /// When the team was created.
    pub fn created_at(&self) -> Option<&str> {
        self.get_str("created_at")
    }

    /// Lists this team's members, filtering team members by team name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] without sending anything if the team
    /// has no `name` attribute.
    pub async fn members(&self, params: &QueryParams) -> Result<Vec<TeamMember>> {
        let name = self.name().ok_or_else(|| {
            Error::Unsupported("team members can only be listed for a team with a name".to_string())
        })?;

        let mut params = params.clone();
        params.insert("team".to_string(), name.to_string());
        self.client().team_members().list(&params).await
    }
}
