//! The five API resource kinds.
//!
//! Each kind is a newtype over [`Resource`](crate::Resource) with its own
//! [`ResourceDescriptor`](crate::ResourceDescriptor) and typed readers.
//! Generic verbs come from [`Resources`]; kind-specific calls are extra
//! methods on the newtype or on `Resources<Kind>`.

use crate::resource::{ResourceType, Resources};
use crate::Client;

macro_rules! resource_type {
    ($(#[$meta:meta])* $name:ident, $descriptor:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name($crate::resource::Resource);

        impl $crate::resource::ResourceType for $name {
            const DESCRIPTOR: &'static $crate::resource::ResourceDescriptor = &$descriptor;
        }

        impl From<$crate::resource::Resource> for $name {
            fn from(resource: $crate::resource::Resource) -> Self {
                Self(resource)
            }
        }

        impl From<$name> for $crate::resource::Resource {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<$crate::resource::Resource> for $name {
            fn as_ref(&self) -> &$crate::resource::Resource {
                &self.0
            }
        }

        impl AsMut<$crate::resource::Resource> for $name {
            fn as_mut(&mut self) -> &mut $crate::resource::Resource {
                &mut self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = $crate::resource::Resource;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }
    };
}

mod meeting;
mod recording;
mod team;
mod team_member;
mod webhook;

pub use meeting::Meeting;
pub use recording::Recording;
pub use team::Team;
pub use team_member::TeamMember;
pub use webhook::Webhook;

impl Client {
    /// Returns the verbs for any resource kind.
    pub fn resources<T: ResourceType>(&self) -> Resources<T> {
        Resources::new(self.clone())
    }

    /// Returns the verbs for meetings.
    pub fn meetings(&self) -> Resources<Meeting> {
        self.resources()
    }

    /// Returns the verbs for recordings.
    pub fn recordings(&self) -> Resources<Recording> {
        self.resources()
    }

    /// Returns the verbs for teams.
    pub fn teams(&self) -> Resources<Team> {
        self.resources()
    }

    /// Returns the verbs for team members.
    pub fn team_members(&self) -> Resources<TeamMember> {
        self.resources()
    }

    /// Returns the verbs for webhooks.
    pub fn webhooks(&self) -> Resources<Webhook> {
        self.resources()
    }
}
