use crate::capability::Capability;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_FRAMEWORK: &str = "crewai";
pub const DEFAULT_TASK_ID: &str = "task";

/// Any number of roles, each with any number of tasks.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub framework: String,
    pub topic: String,
    pub roles: BTreeMap<String, RoleEntry>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RoleEntry {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub tasks: BTreeMap<String, TaskEntry>,
    #[serde(default)]
    pub tools: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TaskEntry {
    pub description: String,
    pub expected_output: String,
}

/// One task of a document together with the role that owns it.
pub struct Assignment<'a> {
    pub role_id: &'a str,
    pub role: &'a RoleEntry,
    pub task_id: &'a str,
    pub task: &'a TaskEntry,
}

impl Document {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Every task in role order, then task order.
    pub fn assignments(&self) -> impl Iterator<Item = Assignment<'_>> {
        self.roles.iter().flat_map(|(role_id, role)| {
            role.tasks.iter().map(move |(task_id, task)| Assignment {
                role_id,
                role,
                task_id,
                task,
            })
        })
    }
}

/// Lowercases and joins whitespace-separated words with `_`.
pub fn identifier(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Description of one role with one task, built once per submission and
/// never changed afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskSpec {
    framework: String,
    topic: String,
    role_id: String,
    role_title: String,
    goal: String,
    backstory: String,
    task_id: String,
    task_description: String,
    expected_output: String,
    capabilities: Vec<String>,
}

impl TaskSpec {
    pub fn builder() -> TaskSpecBuilder {
        TaskSpecBuilder::new()
    }

    pub fn framework(&self) -> &str {
        &self.framework
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn role_id(&self) -> &str {
        &self.role_id
    }

    pub fn role_title(&self) -> &str {
        &self.role_title
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn backstory(&self) -> &str {
        &self.backstory
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn task_description(&self) -> &str {
        &self.task_description
    }

    pub fn expected_output(&self) -> &str {
        &self.expected_output
    }

    pub fn capabilities(&self) -> &[String] {
        &self.capabilities
    }

    pub fn document(&self) -> Document {
        let task = TaskEntry {
            description: self.task_description.clone(),
            expected_output: self.expected_output.clone(),
        };

        let role = RoleEntry {
            role: self.role_title.clone(),
            goal: self.goal.clone(),
            backstory: self.backstory.clone(),
            tasks: BTreeMap::from([(self.task_id.clone(), task)]),
            tools: self.capabilities.clone(),
        };

        Document {
            framework: self.framework.clone(),
            topic: self.topic.clone(),
            roles: BTreeMap::from([(self.role_id.clone(), role)]),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        self.document().to_yaml()
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::try_from(Document::from_yaml(yaml)?)
    }
}

impl TryFrom<Document> for TaskSpec {
    type Error = Error;

    fn try_from(doc: Document) -> Result<Self> {
        if doc.roles.len() != 1 {
            return Err(Error::InvalidDocument(format!(
                "expected exactly one role, found {}",
                doc.roles.len()
            )));
        }
        let Some((role_id, role)) = doc.roles.into_iter().next() else {
            return Err(Error::InvalidDocument("no roles".to_string()));
        };

        if role.tasks.len() != 1 {
            return Err(Error::InvalidDocument(format!(
                "role {} must have exactly one task, found {}",
                role_id,
                role.tasks.len()
            )));
        }
        let Some((task_id, task)) = role.tasks.into_iter().next() else {
            return Err(Error::InvalidDocument(format!("role {} has no tasks", role_id)));
        };

        Ok(Self {
            framework: doc.framework,
            topic: doc.topic,
            role_id,
            role_title: role.role,
            goal: role.goal,
            backstory: role.backstory,
            task_id,
            task_description: task.description,
            expected_output: task.expected_output,
            capabilities: role.tools,
        })
    }
}

pub struct TaskSpecBuilder {
    framework: String,
    topic: String,
    role_id: Option<String>,
    role_title: String,
    goal: String,
    backstory: String,
    task_id: Option<String>,
    task_description: String,
    expected_output: String,
    capabilities: Vec<String>,
    allow_blank: bool,
}

impl TaskSpecBuilder {
    pub fn new() -> Self {
        Self {
            framework: DEFAULT_FRAMEWORK.to_string(),
            topic: String::new(),
            role_id: None,
            role_title: String::new(),
            goal: String::new(),
            backstory: String::new(),
            task_id: None,
            task_description: String::new(),
            expected_output: String::new(),
            capabilities: Vec::new(),
            allow_blank: false,
        }
    }

    pub fn framework(mut self, framework: impl Into<String>) -> Self {
        self.framework = framework.into();
        self
    }

    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Defaults to the role title turned into an identifier.
    pub fn role_id(mut self, role_id: impl Into<String>) -> Self {
        self.role_id = Some(role_id.into());
        self
    }

    pub fn role_title(mut self, role_title: impl Into<String>) -> Self {
        self.role_title = role_title.into();
        self
    }

    pub fn goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = goal.into();
        self
    }

    pub fn backstory(mut self, backstory: impl Into<String>) -> Self {
        self.backstory = backstory.into();
        self
    }

    pub fn task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    pub fn task_description(mut self, description: impl Into<String>) -> Self {
        self.task_description = description.into();
        self
    }

    pub fn expected_output(mut self, expected_output: impl Into<String>) -> Self {
        self.expected_output = expected_output.into();
        self
    }

    pub fn capability(mut self, capability: Capability) -> Self {
        self.push_capability(capability.name().to_string());
        self
    }

    /// Replaces any capabilities set so far.
    pub fn capabilities(mut self, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        self.capabilities.clear();
        for capability in capabilities {
            self.push_capability(capability.name().to_string());
        }
        self
    }

    /// Accept empty fields, as when submitting the blank template as is.
    pub fn allow_blank(mut self, allow: bool) -> Self {
        self.allow_blank = allow;
        self
    }

    fn push_capability(&mut self, name: String) {
        if !self.capabilities.contains(&name) {
            self.capabilities.push(name);
        }
    }

    pub fn build(self) -> Result<TaskSpec> {
        let role_id = identifier(self.role_id.as_deref().unwrap_or(&self.role_title));
        let task_id = identifier(self.task_id.as_deref().unwrap_or(DEFAULT_TASK_ID));

        let spec = TaskSpec {
            framework: self.framework,
            topic: self.topic,
            role_id,
            role_title: self.role_title,
            goal: self.goal,
            backstory: self.backstory,
            task_id,
            task_description: self.task_description,
            expected_output: self.expected_output,
            capabilities: self.capabilities,
        };

        if !self.allow_blank {
            let fields = [
                ("framework", &spec.framework),
                ("topic", &spec.topic),
                ("role id", &spec.role_id),
                ("role", &spec.role_title),
                ("goal", &spec.goal),
                ("backstory", &spec.backstory),
                ("task id", &spec.task_id),
                ("task description", &spec.task_description),
                ("expected output", &spec.expected_output),
            ];
            if let Some((name, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
                return Err(Error::Configuration(format!("{} is required", name)));
            }
        }

        Ok(spec)
    }
}

impl Default for TaskSpecBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Document, TaskSpec, identifier};
    use crate::capability::Capability;
    use crate::{Error, Result};

    fn space() -> Result<TaskSpec> {
        TaskSpec::builder()
            .topic("Space Exploration")
            .role_id("astronomer")
            .role_title("Space Researcher")
            .goal("Survey recent missions")
            .backstory("You follow every launch.")
            .task_description("List the missions launched this year.")
            .expected_output("A bullet list of missions.")
            .capability(Capability::InternetSearch)
            .build()
    }

    #[test]
    fn test_identifier() {
        assert_eq!(identifier("Biotech Analyst"), "biotech_analyst");
        assert_eq!(identifier("  Space   Researcher "), "space_researcher");
        assert_eq!(identifier("astronomer"), "astronomer");
        assert_eq!(identifier(""), "");
    }

    #[test]
    fn test_document_shape() -> Result<()> {
        let yaml = space()?.to_yaml()?;
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml)?;

        assert_eq!(value["framework"].as_str(), Some("crewai"));
        assert_eq!(value["topic"].as_str(), Some("Space Exploration"));

        let role = &value["roles"]["astronomer"];
        assert_eq!(role["role"].as_str(), Some("Space Researcher"));
        assert_eq!(
            role["tasks"]["task"]["expected_output"].as_str(),
            Some("A bullet list of missions.")
        );
        assert_eq!(
            role["tools"],
            serde_yaml::Value::Sequence(vec!["InternetSearchTool".into()])
        );

        Ok(())
    }

    #[test]
    fn test_round_trip_hostile_text() -> Result<()> {
        let spec = TaskSpec::builder()
            .topic("Topic: with \"quotes\" and 'single' ones")
            .role_title("Analyst")
            .goal("line one\nline two: still\n  - not a list")
            .backstory("{topic} # not a comment")
            .task_id("Deep Dive")
            .task_description("roles:\n  injected:\n    role: x")
            .expected_output("yes")
            .capability(Capability::Memory)
            .capability(Capability::InternetSearch)
            .capability(Capability::Memory)
            .build()?;

        let yaml = spec.to_yaml()?;
        let parsed = TaskSpec::from_yaml(&yaml)?;

        assert_eq!(parsed, spec);
        assert_eq!(parsed.role_id(), "analyst");
        assert_eq!(parsed.task_id(), "deep_dive");
        assert_eq!(parsed.capabilities(), ["MemoryTool", "InternetSearchTool"]);

        let doc = Document::from_yaml(&yaml)?;
        assert_eq!(doc.roles.len(), 1);

        Ok(())
    }

    #[test]
    fn test_deterministic() -> Result<()> {
        assert_eq!(space()?.to_yaml()?, space()?.to_yaml()?);
        Ok(())
    }

    #[test]
    fn test_missing_field() {
        let err = TaskSpec::builder()
            .topic("Space Exploration")
            .role_title("Space Researcher")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(msg) if msg == "goal is required"));
    }

    #[test]
    fn test_blank_allowed() -> Result<()> {
        let spec = TaskSpec::builder().allow_blank(true).build()?;
        assert_eq!(spec.role_id(), "");
        assert_eq!(TaskSpec::from_yaml(&spec.to_yaml()?)?, spec);
        Ok(())
    }

    #[test]
    fn test_multi_role_document_is_not_a_task_spec() -> Result<()> {
        let yaml = r#"
framework: crewai
topic: t
roles:
  a:
    role: A
    goal: g
    backstory: b
    tasks:
      one: { description: d, expected_output: e }
  b:
    role: B
    goal: g
    backstory: b
    tasks:
      two: { description: d, expected_output: e }
"#;
        let doc = Document::from_yaml(yaml)?;
        let ids = doc
            .assignments()
            .map(|a| format!("{}/{}", a.role_id, a.task_id))
            .collect::<Vec<_>>();
        assert_eq!(ids, ["a/one", "b/two"]);
        assert!(doc.roles["a"].tools.is_empty());

        assert!(matches!(
            TaskSpec::from_yaml(yaml),
            Err(Error::InvalidDocument(_))
        ));
        Ok(())
    }
}
