use serde::{Deserialize, Serialize};

use crate::domain::{serialize_duration, WorkoutEntry, WorkoutStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutListResponse {
    pub workouts: Vec<WorkoutEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWorkout {
    pub name: String,
    #[serde(serialize_with = "serialize_duration")]
    pub duration: f64,
    pub status: WorkoutStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutUpdate {
    pub name: String,
    #[serde(serialize_with = "serialize_duration")]
    pub duration: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedWorkoutResponse {
    pub updated_workout: WorkoutEntry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedWorkoutResponse {
    pub workout: WorkoutEntry,
}
