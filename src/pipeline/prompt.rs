//! Instruction construction for the LLM

/// System-role message sent ahead of every instruction
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful SQL assistant.";

/// System and user messages for one LLM round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub system: String,
    pub user: String,
}

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    system_prompt: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}

impl PromptBuilder {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
        }
    }

    /// Column list joined with ", " followed directly by the transcript.
    ///
    /// There is no separator between the last column and the transcript.
    pub fn build(columns: &[String], transcript: &str) -> String {
        let mut instruction = columns.join(", ");
        instruction.push_str(transcript);
        instruction
    }

    pub fn instruction(&self, columns: &[String], transcript: &str) -> Instruction {
        Instruction {
            system: self.system_prompt.clone(),
            user: Self::build(columns, transcript),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}
