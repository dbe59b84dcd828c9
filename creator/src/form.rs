use agent::{Capability, Error, Result, TaskSpec, Template};
use clap::Args;

/// Form fields. Anything left out is taken from the template.
#[derive(Args, Debug)]
pub struct FormArgs {
    /// Template to start from (see `templates`)
    #[arg(short, long, default_value = "biotech")]
    pub template: String,

    #[arg(long)]
    pub framework: Option<String>,

    #[arg(long)]
    pub topic: Option<String>,

    /// Role title, e.g. "Space Researcher"
    #[arg(long)]
    pub role: Option<String>,

    /// Role key in the document; derived from the role title when omitted
    #[arg(long)]
    pub role_id: Option<String>,

    #[arg(long)]
    pub goal: Option<String>,

    #[arg(long)]
    pub backstory: Option<String>,

    #[arg(long)]
    pub task_id: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub expected_output: Option<String>,

    /// Enabled tool, repeatable; replaces the template's tools
    #[arg(long = "tool", value_parser = parse_capability)]
    pub tools: Vec<Capability>,

    /// Disable every tool
    #[arg(long, conflicts_with = "tools")]
    pub no_tools: bool,

    /// Submit even if some fields are empty
    #[arg(long)]
    pub allow_blank: bool,
}

fn parse_capability(s: &str) -> std::result::Result<Capability, String> {
    s.parse().map_err(|e: Error| e.to_string())
}

impl FormArgs {
    pub fn spec(&self) -> Result<TaskSpec> {
        let template = Template::find(&self.template).ok_or_else(|| {
            Error::Configuration(format!("unknown template {}", self.template))
        })?;

        let mut builder = template.builder();
        if self.allow_blank {
            builder = builder.allow_blank(true);
        }

        if let Some(framework) = &self.framework {
            builder = builder.framework(framework);
        }
        if let Some(topic) = &self.topic {
            builder = builder.topic(topic);
        }
        if let Some(role) = &self.role {
            builder = builder.role_title(role);
            // a new title without an explicit id gets a fresh id
            if self.role_id.is_none() {
                builder = builder.role_id(role);
            }
        }
        if let Some(role_id) = &self.role_id {
            builder = builder.role_id(role_id);
        }
        if let Some(goal) = &self.goal {
            builder = builder.goal(goal);
        }
        if let Some(backstory) = &self.backstory {
            builder = builder.backstory(backstory);
        }
        if let Some(task_id) = &self.task_id {
            builder = builder.task_id(task_id);
        }
        if let Some(description) = &self.description {
            builder = builder.task_description(description);
        }
        if let Some(expected_output) = &self.expected_output {
            builder = builder.expected_output(expected_output);
        }

        if self.no_tools {
            builder = builder.capabilities(Vec::new());
        } else if !self.tools.is_empty() {
            builder = builder.capabilities(self.tools.iter().copied());
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::FormArgs;
    use agent::{Error, Result};
    use clap::Parser;

    #[derive(Parser)]
    struct Form {
        #[command(flatten)]
        form: FormArgs,
    }

    fn form(args: &[&str]) -> FormArgs {
        Form::try_parse_from(std::iter::once("form").chain(args.iter().copied()))
            .unwrap()
            .form
    }

    #[test]
    fn test_template_defaults() -> Result<()> {
        let spec = form(&[]).spec()?;
        assert_eq!(spec.topic(), "Biotech Startup Funding");
        assert_eq!(spec.role_id(), "biotech_analyst");
        assert_eq!(spec.task_id(), "research_funded_startups");
        assert_eq!(spec.capabilities(), ["InternetSearchTool"]);
        Ok(())
    }

    #[test]
    fn test_overrides() -> Result<()> {
        let spec = form(&[
            "--template",
            "space",
            "--role",
            "Mission Planner",
            "--goal",
            "Plan: \"everything\"",
            "--no-tools",
        ])
        .spec()?;

        assert_eq!(spec.topic(), "Space Exploration");
        assert_eq!(spec.role_id(), "mission_planner");
        assert_eq!(spec.role_title(), "Mission Planner");
        assert_eq!(spec.goal(), "Plan: \"everything\"");
        assert!(spec.capabilities().is_empty());

        let spec = form(&["--role", "Analyst", "--role-id", "lead"]).spec()?;
        assert_eq!(spec.role_id(), "lead");
        Ok(())
    }

    #[test]
    fn test_blank_template() -> Result<()> {
        let spec = form(&["--template", "blank", "--topic", "Rust"]).spec()?;
        assert_eq!(spec.topic(), "Rust");
        assert_eq!(spec.goal(), "");

        let err = form(&["--goal", " "]).spec().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        form(&["--goal", " ", "--allow-blank"]).spec()?;
        Ok(())
    }

    #[test]
    fn test_unknown_template() {
        let err = form(&["--template", "nope"]).spec().unwrap_err();
        assert!(matches!(err, Error::Configuration(msg) if msg.contains("nope")));
    }
}
