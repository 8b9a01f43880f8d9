//! Project layout and context assembly.
//!
//! A persflow project lives under one base path:
//!
//! ```text
//! <base>/
//!   data/emv_pers.json          source corpus (required)
//!   data/output.txt             final artifact sink
//!   data/drafts/                per-stage draft outputs
//!   user_input/*.txt            user briefs (prompt_1.txt is the default)
//!   prompts/system_prompt.txt   base system prompt (required)
//!   prompts/hyperlink_requirements.txt        optional addendum
//!   prompts/special_instructions/<topic>.txt  topic addenda
//!   prompts/topic_rules.yaml    optional ruleset override
//! ```
//!
//! Context assembly appends the hyperlink addendum and the topic
//! addendum selected from the brief to the base prompt, each after a
//! blank-line separator. Missing optional files are skipped; missing
//! required files are load errors.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::core::topic::TopicRuleset;
use crate::domain::context::PipelineContext;
use crate::domain::result::Ledger;

/// Separator between the base prompt and each appended addendum
const ADDENDUM_SEPARATOR: &str = "\n\n";

/// File locations under a project base path
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    base: PathBuf,
}

impl ProjectLayout {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn source_data(&self) -> PathBuf {
        self.base.join("data").join("emv_pers.json")
    }

    pub fn user_prompt_dir(&self) -> PathBuf {
        self.base.join("user_input")
    }

    pub fn default_user_prompt(&self) -> PathBuf {
        self.user_prompt_dir().join("prompt_1.txt")
    }

    pub fn system_prompt(&self) -> PathBuf {
        self.base.join("prompts").join("system_prompt.txt")
    }

    pub fn hyperlink_instructions(&self) -> PathBuf {
        self.base.join("prompts").join("hyperlink_requirements.txt")
    }

    pub fn special_instruction(&self, topic_id: &str) -> PathBuf {
        self.base
            .join("prompts")
            .join("special_instructions")
            .join(format!("{}.txt", topic_id))
    }

    pub fn topic_rules(&self) -> PathBuf {
        self.base.join("prompts").join("topic_rules.yaml")
    }

    pub fn output(&self) -> PathBuf {
        self.base.join("data").join("output.txt")
    }

    pub fn drafts_dir(&self) -> PathBuf {
        self.base.join("data").join("drafts")
    }

    /// Create the expected directory structure
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [
            self.base.join("data"),
            self.drafts_dir(),
            self.user_prompt_dir(),
            self.base.join("prompts").join("special_instructions"),
        ] {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(())
    }

    /// List available brief files (sorted, .txt only)
    pub fn list_prompt_files(&self) -> Result<Vec<PathBuf>> {
        let dir = self.user_prompt_dir();
        let entries = fs::read_dir(&dir)
            .with_context(|| format!("Failed to read prompt directory: {}", dir.display()))?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map(|ext| ext == "txt").unwrap_or(false))
            .collect();
        files.sort();
        Ok(files)
    }

    /// Persist the final artifact to the output sink
    pub fn save_output(&self, content: &str) -> Result<()> {
        let path = self.output();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(&path, content)
            .with_context(|| format!("Failed to write output: {}", path.display()))?;
        info!(path = %path.display(), "Output saved");
        Ok(())
    }

    /// Persist every successful stage output as a numbered draft file
    pub fn save_drafts(&self, ledger: &Ledger) -> Result<()> {
        let dir = self.drafts_dir();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create drafts directory: {}", dir.display()))?;

        for (idx, entry) in ledger.entries().iter().enumerate() {
            if !entry.is_success() {
                continue;
            }
            let path = dir.join(format!("{:02}_{}.txt", idx + 1, entry.stage_id));
            fs::write(&path, &entry.output)
                .with_context(|| format!("Failed to write draft: {}", path.display()))?;
        }
        Ok(())
    }
}

/// Assembled context plus the topic that was selected (if any)
#[derive(Debug, Clone)]
pub struct LoadedContext {
    pub context: PipelineContext,
    pub topic: Option<String>,
}

/// Loads and assembles the per-run context from a project layout
pub struct ContextLoader {
    layout: ProjectLayout,
    ruleset: TopicRuleset,
}

impl ContextLoader {
    /// Create a loader with the built-in topic ruleset, or the project
    /// override from `prompts/topic_rules.yaml` when present.
    pub fn new(layout: ProjectLayout) -> Result<Self> {
        let rules_path = layout.topic_rules();
        let ruleset = if rules_path.exists() {
            let content = fs::read_to_string(&rules_path)
                .with_context(|| format!("Failed to read ruleset: {}", rules_path.display()))?;
            TopicRuleset::from_yaml(&content)?
        } else {
            TopicRuleset::default_rules()
        };

        Ok(Self { layout, ruleset })
    }

    /// Replace the topic ruleset
    pub fn with_ruleset(mut self, ruleset: TopicRuleset) -> Self {
        self.ruleset = ruleset;
        self
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Assemble the run context.
    ///
    /// `prompt_file` overrides the default brief file. The system
    /// prompt is built as: base prompt, then the hyperlink addendum if
    /// present, then the topic addendum selected from the brief, each
    /// appended after a blank-line separator.
    pub fn load(&self, prompt_file: Option<&Path>) -> Result<LoadedContext> {
        let source_data = read_required(&self.layout.source_data())?;

        let brief_path = prompt_file
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.layout.default_user_prompt());
        let user_brief = read_required(&brief_path)?;

        let mut system_prompt = read_required(&self.layout.system_prompt())?;

        if let Some(hyperlink) = read_optional(&self.layout.hyperlink_instructions()) {
            system_prompt.push_str(ADDENDUM_SEPARATOR);
            system_prompt.push_str(&hyperlink);
        }

        let topic = self.ruleset.select(&user_brief).map(|r| r.id.clone());
        if let Some(ref topic_id) = topic {
            if let Some(addendum) = read_optional(&self.layout.special_instruction(topic_id)) {
                system_prompt.push_str(ADDENDUM_SEPARATOR);
                system_prompt.push_str(&addendum);
                info!(topic = %topic_id, "Applied topic-specific instructions");
            } else {
                debug!(topic = %topic_id, "Topic selected but no addendum file found");
            }
        }

        Ok(LoadedContext {
            context: PipelineContext::new(source_data, user_brief, system_prompt),
            topic,
        })
    }
}

fn read_required(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Required file not found: {}", path.display()))?;
    Ok(content.trim().to_string())
}

/// Read an optional file; missing or empty files yield None
fn read_optional(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project() -> (TempDir, ProjectLayout) {
        let temp = TempDir::new().unwrap();
        let layout = ProjectLayout::new(temp.path());
        layout.ensure_directories().unwrap();
        (temp, layout)
    }

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_load_assembles_plain_context() {
        let (_temp, layout) = project();
        write(&layout.source_data(), "[{\"title\": \"artikel\"}]");
        write(&layout.default_user_prompt(), "mobiliteit in steden");
        write(&layout.system_prompt(), "BASE");

        let loaded = ContextLoader::new(layout).unwrap().load(None).unwrap();
        assert_eq!(loaded.context.system_prompt, "BASE");
        assert_eq!(loaded.topic, None);
        assert!(loaded.context.ensure_complete().is_ok());
    }

    #[test]
    fn test_missing_required_file_is_error() {
        let (_temp, layout) = project();
        write(&layout.default_user_prompt(), "brief");
        write(&layout.system_prompt(), "BASE");
        // no source data

        let err = ContextLoader::new(layout).unwrap().load(None).unwrap_err();
        assert!(err.to_string().contains("emv_pers.json"));
    }

    #[test]
    fn test_addenda_appended_in_order() {
        let (_temp, layout) = project();
        write(&layout.source_data(), "[]");
        write(&layout.default_user_prompt(), "verkooprecht stijgt");
        write(&layout.system_prompt(), "BASE");
        write(&layout.hyperlink_instructions(), "LINKS");
        write(&layout.special_instruction("tax_analysis"), "TAX");

        let loaded = ContextLoader::new(layout).unwrap().load(None).unwrap();
        assert_eq!(loaded.topic.as_deref(), Some("tax_analysis"));
        assert_eq!(loaded.context.system_prompt, "BASE\n\nLINKS\n\nTAX");
    }

    #[test]
    fn test_ruleset_override_from_project_file() {
        let (_temp, layout) = project();
        write(&layout.source_data(), "[]");
        write(&layout.default_user_prompt(), "energie besparen");
        write(&layout.system_prompt(), "BASE");
        write(&layout.topic_rules(), "rules:\n  - id: energy\n    keywords: [energie]\n");
        write(&layout.special_instruction("energy"), "ENERGY");

        let loaded = ContextLoader::new(layout).unwrap().load(None).unwrap();
        assert_eq!(loaded.topic.as_deref(), Some("energy"));
        assert!(loaded.context.system_prompt.ends_with("\n\nENERGY"));
    }

    #[test]
    fn test_prompt_file_listing_sorted() {
        let (_temp, layout) = project();
        write(&layout.user_prompt_dir().join("prompt_2.txt"), "b");
        write(&layout.user_prompt_dir().join("prompt_1.txt"), "a");
        write(&layout.user_prompt_dir().join("notes.md"), "skip");

        let files = layout.list_prompt_files().unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["prompt_1.txt", "prompt_2.txt"]);
    }

    #[test]
    fn test_save_output_and_drafts() {
        use crate::domain::result::ExecutionResult;

        let (_temp, layout) = project();
        layout.save_output("<html></html>").unwrap();
        assert_eq!(fs::read_to_string(layout.output()).unwrap(), "<html></html>");

        let mut ledger = Ledger::new();
        ledger.push(ExecutionResult::success("strategy", "strategist", "plan"));
        ledger.push(ExecutionResult::failed("writing", "writer", "boom"));
        layout.save_drafts(&ledger).unwrap();

        assert!(layout.drafts_dir().join("01_strategy.txt").exists());
        assert!(!layout.drafts_dir().join("02_writing.txt").exists());
    }
}
