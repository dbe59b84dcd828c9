use crate::agent::{Agent, AgentBuilder, DEFAULT_MAX_STEPS, FinalAnswer};
use crate::callbacks::{MessageLogger, StepTracker};
use crate::capability::Capability;
use crate::executor::Executor;
use crate::llm::{self, LLM, Message};
use crate::session::ApiKey;
use crate::spec::{Assignment, Document, RoleEntry, TaskEntry};
use crate::tools::{InternetSearchTool, KVMemoryTool, SummarizeHistory};
use crate::{Error, Result};
use async_trait::async_trait;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

const TOPIC_PLACEHOLDER: &str = "{topic}";
const SUMMARY_KEEP_LAST: usize = 4;

pub struct CrewExecutor {
    llm: Arc<dyn LLM + Send + Sync>,
    search_llm: Arc<dyn LLM + Send + Sync>,
    max_steps: usize,
    transcript: Option<PathBuf>,
}

impl CrewExecutor {
    pub fn new(llm: Arc<dyn LLM + Send + Sync>) -> Self {
        Self {
            search_llm: llm.clone(),
            llm,
            max_steps: DEFAULT_MAX_STEPS,
            transcript: None,
        }
    }

    /// `model` must support function calling; `search_model` must be one
    /// of the `*-search-preview` models.
    pub fn openai(model: &str, search_model: &str, api_key: &ApiKey) -> Self {
        Self::new(llm::OpenAI::new(model, api_key))
            .search_llm(llm::OpenAI::new(search_model, api_key))
    }

    /// Model behind the `InternetSearchTool` capability. Defaults to the
    /// agents' model.
    pub fn search_llm(mut self, llm: Arc<dyn LLM + Send + Sync>) -> Self {
        self.search_llm = llm;
        self
    }

    /// Upper bound on model turns per task.
    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Append a markdown transcript of every task to `path`.
    pub fn transcript(mut self, path: impl Into<PathBuf>) -> Self {
        self.transcript = Some(path.into());
        self
    }

    fn agent(&self, tools: &[String], label: &str) -> Result<Agent> {
        let mut builder = AgentBuilder::new()
            .llm(self.llm.clone())
            .stop_condition(Box::new(FinalAnswer))
            .max_steps(self.max_steps);

        for name in tools {
            builder = match name.parse::<Capability>()? {
                Capability::InternetSearch => {
                    builder.tool(InternetSearchTool::new(self.search_llm.clone()))
                }
                Capability::Memory => builder.tools(KVMemoryTool::new().tools()),
            };
        }

        if let Some(path) = &self.transcript {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder = builder.callback(MessageLogger::new(label, file)?);
        }

        builder
            .tool(SummarizeHistory::new(self.llm.clone(), SUMMARY_KEEP_LAST))
            .callback(StepTracker::new(label))
            .callback(SummarizeHistory::new(self.llm.clone(), SUMMARY_KEEP_LAST))
            .build()
    }

    async fn run_assignment(&self, topic: &str, assignment: &Assignment<'_>) -> Result<String> {
        let label = format!("{}/{}", assignment.role_id, assignment.task_id);
        info!(task = %label, tools = ?assignment.role.tools, "starting task");

        let mut agent = self.agent(&assignment.role.tools, &label)?;
        let history = agent
            .run(vec![
                Message::System(system_prompt(assignment.role, topic)),
                Message::User(task_prompt(assignment.task, topic)),
            ])
            .await?;

        match history.last() {
            Some(Message::Assistant(answer, _)) => {
                info!(task = %label, steps = history.len(), "task finished");
                Ok(answer.clone())
            }
            _ => Err(Error::AgentWorkflowError(format!(
                "agent for {} stopped without an answer",
                label
            ))),
        }
    }
}

fn with_topic(text: &str, topic: &str) -> String {
    text.replace(TOPIC_PLACEHOLDER, topic)
}

fn system_prompt(role: &RoleEntry, topic: &str) -> String {
    format!(
        "You are {}.\n{}\n\nYour goal: {}\n\nUse the tools available to you when they help. When you are done, reply with your final answer only.",
        with_topic(&role.role, topic),
        with_topic(&role.backstory, topic),
        with_topic(&role.goal, topic),
    )
}

fn task_prompt(task: &TaskEntry, topic: &str) -> String {
    format!(
        "Task: {}\n\nExpected output: {}",
        with_topic(&task.description, topic),
        with_topic(&task.expected_output, topic),
    )
}

#[async_trait]
impl Executor for CrewExecutor {
    async fn execute(&self, document: &str) -> Result<String> {
        let doc = Document::from_yaml(document)?;
        if doc.roles.is_empty() {
            return Err(Error::InvalidDocument("document has no roles".to_string()));
        }

        let mut outputs = Vec::new();
        for assignment in doc.assignments() {
            outputs.push(self.run_assignment(&doc.topic, &assignment).await?);
        }

        Ok(outputs.join("\n\n"))
    }
}
