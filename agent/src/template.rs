use crate::capability::Capability;
use crate::spec::{DEFAULT_FRAMEWORK, TaskSpecBuilder};

/// Preset form contents.
pub struct Template {
    pub name: &'static str,
    pub summary: &'static str,
    pub topic: &'static str,
    pub role_id: &'static str,
    pub role_title: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
    pub task_id: &'static str,
    pub task_description: &'static str,
    pub expected_output: &'static str,
    pub capabilities: &'static [Capability],
}

const TEMPLATES: &[Template] = &[
    Template {
        name: "biotech",
        summary: "Research recently funded biotech startups",
        topic: "Biotech Startup Funding",
        role_id: "biotech_analyst",
        role_title: "Biotech Investment Researcher",
        goal: "Identify and analyze recently funded biotech startups in {topic}",
        backstory: "You are a sharp-eyed financial analyst specializing in the biotech sector, with a keen interest in tracking startup funding and company developments.",
        task_id: "research_funded_startups",
        task_description: "Investigate and compile information about biotech startups that have received significant funding in July 2024.",
        expected_output: "A detailed report on recently funded biotech startups, including company names, funding amounts, investors, date funding received, contacts from about us page, and the startups' focus areas within biotechnology.",
        capabilities: &[Capability::InternetSearch],
    },
    Template {
        name: "space",
        summary: "Summarize the latest developments in space exploration",
        topic: "Space Exploration",
        role_id: "astronomer",
        role_title: "Space Researcher",
        goal: "Track the latest missions and discoveries in {topic}",
        backstory: "You are an astronomer who follows every launch, probe and telescope result, and explains them plainly.",
        task_id: "survey_recent_missions",
        task_description: "Find the most significant space missions and discoveries of the past three months.",
        expected_output: "A short briefing listing each mission or discovery with its agency, date and why it matters.",
        capabilities: &[Capability::InternetSearch],
    },
    Template {
        name: "blank",
        summary: "Start from an empty form",
        topic: "",
        role_id: "",
        role_title: "",
        goal: "",
        backstory: "",
        task_id: "",
        task_description: "",
        expected_output: "",
        capabilities: &[],
    },
];

impl Template {
    pub fn all() -> &'static [Template] {
        TEMPLATES
    }

    pub fn find(name: &str) -> Option<&'static Template> {
        TEMPLATES.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn is_blank(&self) -> bool {
        self.role_title.is_empty()
    }

    /// A builder pre-filled with this template. Blank templates are
    /// accepted as is.
    pub fn builder(&self) -> TaskSpecBuilder {
        TaskSpecBuilder::new()
            .framework(DEFAULT_FRAMEWORK)
            .topic(self.topic)
            .role_id(self.role_id)
            .role_title(self.role_title)
            .goal(self.goal)
            .backstory(self.backstory)
            .task_id(self.task_id)
            .task_description(self.task_description)
            .expected_output(self.expected_output)
            .capabilities(self.capabilities.iter().copied())
            .allow_blank(self.is_blank())
    }
}
