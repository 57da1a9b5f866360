use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::state_machine::RequestStatus;

/// The three intake workflows served by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Workflow {
    Testing,
    Design,
    Certification,
}

/// A wizard step a workflow may expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Product,
    Details,
    Documents,
    Requirements,
    Standards,
    LabSelection,
}

/// Static description of one workflow
#[derive(Debug)]
pub struct WorkflowSpec {
    pub workflow: Workflow,
    /// HTTP prefix without the leading slash, e.g. `testing-request`
    pub route_segment: &'static str,
    /// Directory name used under the upload root
    pub storage_dir: &'static str,
    pub initial_status: RequestStatus,
    pub steps: &'static [Step],
    /// Whether the draft lookup and cleanup endpoints are mounted
    pub draft_retention: bool,
}

const PRODUCT_WIZARD: &[Step] = &[
    Step::Product,
    Step::Documents,
    Step::Requirements,
    Step::Standards,
    Step::LabSelection,
];

const CERTIFICATION_WIZARD: &[Step] = &[Step::Details, Step::Documents, Step::LabSelection];

static TESTING: WorkflowSpec = WorkflowSpec {
    workflow: Workflow::Testing,
    route_segment: "testing-request",
    storage_dir: "testing_requests",
    initial_status: RequestStatus::Submitted,
    steps: PRODUCT_WIZARD,
    draft_retention: false,
};

static DESIGN: WorkflowSpec = WorkflowSpec {
    workflow: Workflow::Design,
    route_segment: "design-request",
    storage_dir: "design_requests",
    initial_status: RequestStatus::Submitted,
    steps: PRODUCT_WIZARD,
    draft_retention: false,
};

static CERTIFICATION: WorkflowSpec = WorkflowSpec {
    workflow: Workflow::Certification,
    route_segment: "certification-request",
    storage_dir: "certification_requests",
    initial_status: RequestStatus::Draft,
    steps: CERTIFICATION_WIZARD,
    draft_retention: true,
};

impl Workflow {
    pub const ALL: [Workflow; 3] = [Workflow::Testing, Workflow::Design, Workflow::Certification];

    pub fn spec(self) -> &'static WorkflowSpec {
        match self {
            Workflow::Testing => &TESTING,
            Workflow::Design => &DESIGN,
            Workflow::Certification => &CERTIFICATION,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Workflow::Testing => "testing",
            Workflow::Design => "design",
            Workflow::Certification => "certification",
        }
    }

    pub fn supports(self, step: Step) -> bool {
        self.spec().steps.contains(&step)
    }
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Workflow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "testing" => Ok(Workflow::Testing),
            "design" => Ok(Workflow::Design),
            "certification" => Ok(Workflow::Certification),
            other => Err(format!("unknown workflow '{other}'")),
        }
    }
}

impl Step {
    pub fn as_str(self) -> &'static str {
        match self {
            Step::Product => "product",
            Step::Details => "details",
            Step::Documents => "documents",
            Step::Requirements => "requirements",
            Step::Standards => "standards",
            Step::LabSelection => "lab_selection",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_workflows_share_wizard() {
        for workflow in [Workflow::Testing, Workflow::Design] {
            assert!(workflow.supports(Step::Product));
            assert!(workflow.supports(Step::Requirements));
            assert!(workflow.supports(Step::Standards));
            assert!(!workflow.supports(Step::Details));
            assert_eq!(workflow.spec().initial_status, RequestStatus::Submitted);
            assert!(!workflow.spec().draft_retention);
        }
    }

    #[test]
    fn test_certification_wizard() {
        let spec = Workflow::Certification.spec();
        assert_eq!(spec.initial_status, RequestStatus::Draft);
        assert!(spec.draft_retention);
        assert!(Workflow::Certification.supports(Step::Details));
        assert!(Workflow::Certification.supports(Step::Documents));
        assert!(!Workflow::Certification.supports(Step::Requirements));
        assert!(!Workflow::Certification.supports(Step::Product));
    }

    #[test]
    fn test_workflow_round_trips_through_str() {
        for workflow in Workflow::ALL {
            assert_eq!(workflow.as_str().parse::<Workflow>(), Ok(workflow));
        }
        assert!("audit".parse::<Workflow>().is_err());
    }
}
