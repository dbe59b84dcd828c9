use crate::Result;
use crate::llm::Message;
use crate::tools::{FunctionalTool, NoArgs, Tool, ToolCall, ToolDefinition};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Scratch memory backing the `MemoryTool` capability. The three tools it
/// hands out share one store, scoped to a single task.
#[derive(Clone, Default)]
pub struct KVMemoryTool {
    memory: Arc<Mutex<BTreeMap<String, String>>>,
}

impl KVMemoryTool {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.memory.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn list_keys(&self) -> String {
        let mut s = "Keys in memory:\n".to_string();
        for key in self.store().keys() {
            s.push_str(&format!("- {}\n", key));
        }
        s
    }

    fn get_key(&self, key: &str) -> String {
        self.store()
            .get(key)
            .map(|value| format!("value of key {}:\n{}", key, value))
            .unwrap_or_else(|| format!("key {} is not in memory", key))
    }

    fn set_key(&self, key: String, value: String) -> String {
        let msg = format!("key {} inserted into memory", key);
        self.store().insert(key, value);
        msg
    }

    pub fn tools(&self) -> Vec<Box<dyn Tool + Send>> {
        vec![
            Box::new(MemoryListTool(self.clone())),
            Box::new(MemoryGetTool(self.clone())),
            Box::new(MemorySetTool(self.clone())),
        ]
    }
}

struct MemoryListTool(KVMemoryTool);

#[async_trait]
impl FunctionalTool for MemoryListTool {
    fn definition(&self) -> Result<ToolDefinition> {
        ToolDefinition::new::<NoArgs>(
            "memory_list_keys",
            "list the keys that are available in memory",
        )
    }

    async fn invoke_fn(&mut self, call: &ToolCall) -> Result<Message> {
        Ok(call.reply(self.0.list_keys()))
    }
}

#[derive(Deserialize, JsonSchema)]
struct MemoryGetArgs {
    key: String,
}

struct MemoryGetTool(KVMemoryTool);

#[async_trait]
impl FunctionalTool for MemoryGetTool {
    fn definition(&self) -> Result<ToolDefinition> {
        ToolDefinition::new::<MemoryGetArgs>(
            "memory_get_key",
            "get the value associated with the given key in memory",
        )
    }

    async fn invoke_fn(&mut self, call: &ToolCall) -> Result<Message> {
        let args: MemoryGetArgs = call.args()?;
        Ok(call.reply(self.0.get_key(&args.key)))
    }
}

#[derive(Deserialize, JsonSchema)]
struct MemorySetArgs {
    key: String,
    value: String,
}

struct MemorySetTool(KVMemoryTool);

#[async_trait]
impl FunctionalTool for MemorySetTool {
    fn definition(&self) -> Result<ToolDefinition> {
        ToolDefinition::new::<MemorySetArgs>(
            "memory_set_key",
            "set the value associated with the given key in memory",
        )
    }

    async fn invoke_fn(&mut self, call: &ToolCall) -> Result<Message> {
        let args: MemorySetArgs = call.args()?;
        Ok(call.reply(self.0.set_key(args.key, args.value)))
    }
}
