//! Participant data structure.

use serde::{Deserialize, Serialize};

/// User identifier of a participant, as issued by the surrounding service.
pub type ParticipantId = String;

/// A user entered into a tournament, with the display name captured when they joined.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    #[serde(rename = "participantId")]
    pub id: ParticipantId,
    pub display_name: String,
}

impl Participant {
    pub fn new(id: impl Into<ParticipantId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}
