use serde::{Deserialize, Serialize};

/// Where a session is between the ready step and completion
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Before the subject confirmed they are ready.
    #[default]
    Waiting,
    /// Instructions are up, the first arrow key starts the experiment.
    Ready,
    Running,
    Complete,
}

impl SessionPhase {
    /// Whether a key press that does not start the experiment is checked
    /// against the indicators.
    pub fn allows_input(&self) -> bool {
        matches!(self, Self::Ready | Self::Running)
    }

    pub fn shows_instructions(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

#[derive(Copy, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperimentKind {
    Static,
    Moving,
}

impl ExperimentKind {
    pub fn instructions(&self) -> &'static str {
        match self {
            ExperimentKind::Static => {
                "During this experiment, dots will appear one by one on your screen.\n \
                 Observe each dot closely. When a ← or → appears on the dot,\n \
                 press the button with the same arrow on your keyboard.\n \
                 Press ← or → on your keyboard to start."
            }
            ExperimentKind::Moving => {
                "During this experiment, you will see a moving dot on your screen.\n \
                 Observe the dot closely. When a ← or → appears on the dot,\n \
                 press the button with the same arrow on your keyboard.\n \
                 Focus on the dot, then press ← or → on your keyboard to start."
            }
        }
    }
}
