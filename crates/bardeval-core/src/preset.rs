//! Bundled flow presets.
//!
//! `Local` is the developer run: the full seed list and judge prompts read
//! from `archaic.txt` / `poetic.txt`. `Ci` is the pipeline run: a shorter
//! seed list, inline few-shot judge prompts, and failures surfaced to the
//! CI runner.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{CheckDescriptor, SeedDatum};
use crate::error::{FlowError, Result};

/// Placeholder the platform substitutes with the model output.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

pub const ARCHAIC_PROMPT_FILE: &str = "archaic.txt";
pub const POETIC_PROMPT_FILE: &str = "poetic.txt";

const ARCHAIC_DESCRIPTION: &str = "Use LLM-as-a-judge to rate how archaic the output is.";
const POETIC_DESCRIPTION: &str = "Use LLM-as-a-judge to rate how poetic the output is.";

const SEED_INPUTS: [&str; 10] = [
    "How do I boil an egg?",
    "Why is the sky blue?",
    "Write a letter explaining why you cannot attend a wedding.",
    "Write a message praising someone's positive qualities.",
    "What are the main anatomical features of a flower and what are they for?",
    "What is the airspeed velocity of an unladen swallow?",
    "What is the meaning of life?",
    "What is best in life?",
    "Write a sonnet about a pickle jar.",
    "Describe the features of iambic pentameter.",
];

/// Seeds used by the CI preset.
const CI_SEED_COUNT: usize = 5;

const FEW_SHOT_EXAMPLE_PROSE: &str = "The sky appears blue because of the way sunlight interacts with Earth's atmosphere. When sunlight reaches Earth, it is made up of a spectrum of colors, with shorter wavelengths like blue and violet being scattered more easily by the gases and particles in the atmosphere. This scattering causes the blue light to be more visible to our eyes, giving the sky its blue color.";

const FEW_SHOT_EXAMPLE_VERSE: &str = "Why is the sky blue? Why is the world\n\
At endless strife with the spirit of man?\n\
Why do the stars in their courses whirl,\n\
And the planets and suns in their cycles plan\n\
The doom of the earth and the fate of man?\n\
Why is the sky blue?";

/// How a failed flow is reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Log the failure and exit cleanly
    Log,
    /// Emit a GitHub Actions error annotation and exit non-zero
    Ci,
}

impl FailureMode {
    pub fn message(err: &dyn std::fmt::Display) -> String {
        format!("Evaluation failed because: {}", err)
    }

    /// Line to print on failure.
    pub fn failure_line(&self, err: &dyn std::fmt::Display) -> String {
        match self {
            FailureMode::Log => Self::message(err),
            FailureMode::Ci => format!("::error::{}", Self::message(err)),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            FailureMode::Log => 0,
            FailureMode::Ci => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Local,
    Ci,
}

impl Preset {
    pub fn build_prefix(&self) -> &'static str {
        match self {
            Preset::Local => "local",
            Preset::Ci => "ci",
        }
    }

    pub fn failure_mode(&self) -> FailureMode {
        match self {
            Preset::Local => FailureMode::Log,
            Preset::Ci => FailureMode::Ci,
        }
    }

    pub fn seed_data(&self) -> Vec<SeedDatum> {
        let count = match self {
            Preset::Local => SEED_INPUTS.len(),
            Preset::Ci => CI_SEED_COUNT,
        };
        SEED_INPUTS[..count]
            .iter()
            .map(|input| SeedDatum::new(*input))
            .collect()
    }

    /// Custom judge checks for this preset.
    ///
    /// `Local` reads its prompt templates from `prompt_dir`; `Ci` ignores it.
    pub fn custom_checks(&self, prompt_dir: &Path) -> Result<Vec<CheckDescriptor>> {
        match self {
            Preset::Local => {
                let archaic = load_prompt(&prompt_dir.join(ARCHAIC_PROMPT_FILE))?;
                let poetic = load_prompt(&prompt_dir.join(POETIC_PROMPT_FILE))?;
                Ok(vec![
                    CheckDescriptor::prompted("custom.Archaic", ARCHAIC_DESCRIPTION, archaic),
                    CheckDescriptor::prompted("custom.Poetic", POETIC_DESCRIPTION, poetic),
                ])
            }
            Preset::Ci => Ok(vec![
                CheckDescriptor::prompted(
                    "custom.Archaic.fewshot",
                    ARCHAIC_DESCRIPTION,
                    few_shot_prompt(
                        "Output a score for how archaic the writing style is, on a scale of 1 (most modern) to 5 (most archaic).",
                        "Archaic Writing Style Score",
                        1,
                        4,
                    ),
                ),
                CheckDescriptor::prompted(
                    "custom.Poetic.fewshot",
                    POETIC_DESCRIPTION,
                    few_shot_prompt(
                        "Output a score for how poetic the writing style is, on a scale of 1 (most prosaic and ordinary) to 5 (most poetic). Poetic devices can include rhythm and meter, simile and metaphor, rhetorical questions, repetition, alliteration, elevated diction, and so on.",
                        "Poetic Writing Style Score",
                        1,
                        5,
                    ),
                ),
            ]),
        }
    }
}

/// Instruction, two scored examples, then the output to score, each block
/// separated by a blank line.
fn few_shot_prompt(
    instruction: &str,
    score_label: &str,
    prose_score: u8,
    verse_score: u8,
) -> String {
    format!(
        "{instruction}\n\n\
         Example 1 model answer:\n{prose}\n{label}: {prose_score}\n\n\
         Example 2 model answer:\n{verse}\n{label}: {verse_score}\n\n\
         Example 3 model answer:\n{placeholder}\n{label}:",
        instruction = instruction,
        prose = FEW_SHOT_EXAMPLE_PROSE,
        verse = FEW_SHOT_EXAMPLE_VERSE,
        label = score_label,
        prose_score = prose_score,
        verse_score = verse_score,
        placeholder = OUTPUT_PLACEHOLDER,
    )
}

/// Read a judge prompt template.
///
/// Templates without the `{output}` placeholder are still returned; the
/// judge will just never see the model output.
pub fn load_prompt(path: &Path) -> Result<String> {
    let prompt = std::fs::read_to_string(path).map_err(|source| FlowError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if !prompt.contains(OUTPUT_PLACEHOLDER) {
        warn!(
            "Prompt template {} has no {} placeholder",
            path.display(),
            OUTPUT_PLACEHOLDER
        );
    }
    Ok(prompt)
}

/// Load seed data from a JSON array of `{"input": .., "result": ..}`.
pub fn load_seed_file(path: &Path) -> Result<Vec<SeedDatum>> {
    let content = std::fs::read_to_string(path).map_err(|source| FlowError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| FlowError::SeedFile {
        path: PathBuf::from(path),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn ci_uses_first_five_seeds() {
        let local = Preset::Local.seed_data();
        let ci = Preset::Ci.seed_data();
        assert_eq!(local.len(), 10);
        assert_eq!(ci.len(), 5);
        assert_eq!(&local[..5], &ci[..]);
        assert!(ci.iter().all(|s| s.result.is_empty()));
    }

    #[test]
    fn few_shot_checks_carry_placeholder() {
        let checks = Preset::Ci.custom_checks(Path::new("unused")).unwrap();
        assert_eq!(checks.len(), 2);
        assert_eq!(checks[0].name, "custom.Archaic.fewshot");
        for check in &checks {
            let prompt = check.prompt.as_deref().unwrap();
            assert!(prompt.contains(OUTPUT_PLACEHOLDER));
            assert!(prompt.trim_end().ends_with("Score:"));
        }
    }

    #[test]
    fn few_shot_layout() {
        let prompt = few_shot_prompt("Rate it.", "Score", 1, 4);
        let blocks: Vec<&str> = prompt.split("\n\n").collect();

        assert_eq!(blocks[0], "Rate it.");
        assert!(blocks[1].starts_with("Example 1 model answer:\nThe sky appears blue"));
        assert!(blocks[1].ends_with("\nScore: 1"));
        assert!(blocks[2].starts_with("Example 2 model answer:\nWhy is the sky blue?"));
        assert!(blocks[2].ends_with("\nScore: 4"));
        assert_eq!(blocks[3], "Example 3 model answer:\n{output}\nScore:");
        assert_eq!(prompt.matches(OUTPUT_PLACEHOLDER).count(), 1);
    }

    #[test]
    fn local_reads_prompt_files() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(ARCHAIC_PROMPT_FILE), "Archaic? {output}").unwrap();
        std::fs::write(dir.path().join(POETIC_PROMPT_FILE), "Poetic? {output}").unwrap();

        let checks = Preset::Local.custom_checks(dir.path()).unwrap();
        assert_eq!(checks[0].name, "custom.Archaic");
        assert_eq!(checks[0].prompt.as_deref(), Some("Archaic? {output}"));
        assert_eq!(checks[1].prompt.as_deref(), Some("Poetic? {output}"));
    }

    #[test]
    fn local_missing_prompt_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = Preset::Local.custom_checks(dir.path()).unwrap_err();
        assert!(matches!(err, FlowError::Io { .. }));
    }

    #[test]
    fn seed_file_parses_and_defaults_result() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seeds.json");
        std::fs::write(
            &path,
            r#"[{"input":"How do I boil an egg?"},{"input":"Why is the sky blue?","result":""}]"#,
        )
        .unwrap();
        let seeds = load_seed_file(&path).unwrap();
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[1].input, "Why is the sky blue?");
    }

    #[test]
    fn bad_seed_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seeds.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            load_seed_file(&path).unwrap_err(),
            FlowError::SeedFile { .. }
        ));
    }

    #[test]
    fn failure_lines() {
        let err = "boom";
        assert_eq!(
            FailureMode::Log.failure_line(&err),
            "Evaluation failed because: boom"
        );
        assert_eq!(
            FailureMode::Ci.failure_line(&err),
            "::error::Evaluation failed because: boom"
        );
        assert_eq!(FailureMode::Ci.exit_code(), 1);
        assert_eq!(FailureMode::Log.exit_code(), 0);
    }
}
