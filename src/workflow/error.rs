use std::fmt;

/// Workflow steps whose failure aborts the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    ResolveBranch,
    FetchTree,
    CreateFork,
    CreateTree,
    CreateCommit,
    CreateBranch,
    CreatePullRequest,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::ResolveBranch => "resolving branch",
            Step::FetchTree => "fetching tree",
            Step::CreateFork => "creating fork",
            Step::CreateTree => "creating tree",
            Step::CreateCommit => "creating commit",
            Step::CreateBranch => "creating branch",
            Step::CreatePullRequest => "creating pull request",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("{step} failed")]
    Step {
        step: Step,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("branch {branch} points at a {object_type}, not a commit")]
    NotACommit { branch: String, object_type: String },
}

impl WorkflowError {
    pub fn step(step: Step, source: anyhow::Error) -> Self {
        Self::Step {
            step,
            source: source.into(),
        }
    }

    /// The step that failed, if the failure came from a remote call.
    #[cfg(test)]
    pub fn failed_step(&self) -> Option<Step> {
        match self {
            Self::Step { step, .. } => Some(*step),
            Self::NotACommit { .. } => None,
        }
    }
}
