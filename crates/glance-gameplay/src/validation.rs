//! Offline validation of interaction data.
//!
//! Run when assets are loaded (or from tooling), never from the runtime
//! scan loop. Errors make an asset unusable; warnings are advisory.

use ahash::AHashSet;
use glance_common::Name;
use thiserror::Error;

use crate::data_asset::InteractionDataAsset;
use crate::npc::NpcInteractionDataAsset;
use crate::requirements::KeyRequirement;

/// Whether an issue blocks use of the asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Advisory
    Warning,
    /// Blocks use
    Error,
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    /// No states defined
    #[error("states is empty, at least one state must be defined")]
    EmptyStates,

    /// A state without id
    #[error("states[{index}] has state_id None")]
    NoneStateId {
        /// Index in the state list
        index: usize,
    },

    /// Two states share an id
    #[error("duplicate state_id '{state_id}' found in states")]
    DuplicateStateId {
        /// The repeated id
        state_id: Name,
    },

    /// A requirement without key
    #[error("states[{state_index}] required_keys[{index}] has key_id None")]
    NoneKeyId {
        /// Index of the owning state
        state_index: usize,
        /// Index in the requirement list
        index: usize,
    },

    /// The same key listed twice in one state
    #[error("states[{state_index}] lists key_id '{key_id}' more than once")]
    DuplicateKeyId {
        /// Index of the owning state
        state_index: usize,
        /// The repeated key
        key_id: Name,
    },

    /// Default id is None where it must be set
    #[error("default_state_id is None, it must reference one of the states")]
    NoneDefaultStateId,

    /// Default id points nowhere
    #[error("default_state_id '{state_id}' does not exist in states")]
    DanglingDefaultStateId {
        /// The unresolved id
        state_id: Name,
    },

    /// Prompt must show but has no text
    #[error("state '{state_id}' must show a prompt but prompt_text is empty")]
    EmptyPromptText {
        /// Offending state
        state_id: Name,
    },

    /// Hold state without positive duration
    #[error("state '{state_id}' is hold but hold_duration <= 0")]
    NonPositiveHoldDuration {
        /// Offending state
        state_id: Name,
    },

    /// Requirement without missing message
    #[error("state '{state_id}' required_keys[{index}] missing_message is empty")]
    EmptyMissingMessage {
        /// Offending state
        state_id: Name,
        /// Index in the requirement list
        index: usize,
    },

    /// NPC state with requirements but no "missing" line
    #[error("states[{index}] has requirements but line_if_missing is empty")]
    EmptyLineIfMissing {
        /// Index in the state list
        index: usize,
    },

    /// NPC state without requirements and without "met" line
    #[error("states[{index}] has no requirements and line_if_met is empty")]
    EmptyLineIfMet {
        /// Index in the state list
        index: usize,
    },

    /// NPC asset without prompt
    #[error("prompt_text is empty, the prompt falls back to 'Talk'")]
    EmptyNpcPrompt,
}

impl ValidationIssue {
    /// Severity of this issue.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::EmptyStates
            | Self::NoneStateId { .. }
            | Self::DuplicateStateId { .. }
            | Self::NoneKeyId { .. }
            | Self::DuplicateKeyId { .. }
            | Self::NoneDefaultStateId
            | Self::DanglingDefaultStateId { .. } => Severity::Error,
            Self::EmptyPromptText { .. }
            | Self::NonPositiveHoldDuration { .. }
            | Self::EmptyMissingMessage { .. }
            | Self::EmptyLineIfMissing { .. }
            | Self::EmptyLineIfMet { .. }
            | Self::EmptyNpcPrompt => Severity::Warning,
        }
    }
}

/// Collected validation findings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Blocking findings
    pub errors: Vec<ValidationIssue>,
    /// Advisory findings
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Files an issue under its severity.
    pub fn push(&mut self, issue: ValidationIssue) {
        match issue.severity() {
            Severity::Error => self.errors.push(issue),
            Severity::Warning => self.warnings.push(issue),
        }
    }

    /// True if there are no errors.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// True if there are neither errors nor warnings.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Assets that can be validated.
pub trait Validate {
    /// Runs every check and reports the findings.
    fn validate(&self) -> ValidationReport;
}

fn check_requirements(report: &mut ValidationReport, state_index: usize, requirements: &[KeyRequirement]) {
    let mut seen = AHashSet::new();
    for (index, requirement) in requirements.iter().enumerate() {
        if requirement.key_id.is_none() {
            report.push(ValidationIssue::NoneKeyId { state_index, index });
            continue;
        }
        if !seen.insert(requirement.key_id) {
            report.push(ValidationIssue::DuplicateKeyId {
                state_index,
                key_id: requirement.key_id,
            });
        }
    }
}

impl Validate for InteractionDataAsset {
    fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();

        if self.states.is_empty() {
            report.push(ValidationIssue::EmptyStates);
            return report;
        }

        let mut seen = AHashSet::new();
        for (index, state) in self.states.iter().enumerate() {
            if state.state_id.is_none() {
                report.push(ValidationIssue::NoneStateId { index });
                continue;
            }
            if !seen.insert(state.state_id) {
                report.push(ValidationIssue::DuplicateStateId {
                    state_id: state.state_id,
                });
            }

            if self.should_show_prompt(state) && state.prompt_text.is_empty() {
                report.push(ValidationIssue::EmptyPromptText {
                    state_id: state.state_id,
                });
            }

            if state.is_hold() && state.hold_duration <= 0.0 {
                report.push(ValidationIssue::NonPositiveHoldDuration {
                    state_id: state.state_id,
                });
            }

            check_requirements(&mut report, index, &state.required_keys);
            for (req_index, requirement) in state.required_keys.iter().enumerate() {
                if !requirement.key_id.is_none() && requirement.missing_message.is_empty() {
                    report.push(ValidationIssue::EmptyMissingMessage {
                        state_id: state.state_id,
                        index: req_index,
                    });
                }
            }
        }

        // None is allowed here; it resolves to the first state
        if !self.default_state_id.is_none() && self.find_state(self.default_state_id).is_none() {
            report.push(ValidationIssue::DanglingDefaultStateId {
                state_id: self.default_state_id,
            });
        }

        report
    }
}

impl Validate for NpcInteractionDataAsset {
    fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();

        if self.states.is_empty() {
            report.push(ValidationIssue::EmptyStates);
            return report;
        }

        let mut seen = AHashSet::new();
        for (index, state) in self.states.iter().enumerate() {
            if state.state_id.is_none() {
                report.push(ValidationIssue::NoneStateId { index });
            } else if !seen.insert(state.state_id) {
                report.push(ValidationIssue::DuplicateStateId {
                    state_id: state.state_id,
                });
            }

            check_requirements(&mut report, index, &state.required_keys);

            if !state.required_keys.is_empty() && state.line_if_missing.is_empty() {
                report.push(ValidationIssue::EmptyLineIfMissing { index });
            }
            if state.required_keys.is_empty() && state.line_if_met.is_empty() {
                report.push(ValidationIssue::EmptyLineIfMet { index });
            }
        }

        if self.default_state_id.is_none() {
            report.push(ValidationIssue::NoneDefaultStateId);
        } else if self.find_state(self.default_state_id).is_none() {
            report.push(ValidationIssue::DanglingDefaultStateId {
                state_id: self.default_state_id,
            });
        }

        if self.prompt_text.is_empty() {
            report.push(ValidationIssue::EmptyNpcPrompt);
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_asset::{PromptOverride, StateDefinition};
    use crate::npc::NpcDialogueState;

    #[test]
    fn test_duplicate_state_id() {
        let asset = InteractionDataAsset::new("Crate")
            .with_state(StateDefinition::new("Dup", "Open"))
            .with_state(StateDefinition::new("Dup", "Close"));

        let report = asset.validate();
        assert_eq!(
            report.errors,
            vec![ValidationIssue::DuplicateStateId {
                state_id: Name::new("Dup")
            }]
        );
        assert!(!report.is_valid());
        assert_eq!(asset.default_state_id(), Name::new("Dup"));
    }

    #[test]
    fn test_empty_states_is_the_only_error() {
        let report = InteractionDataAsset::new("Nothing").validate();
        assert_eq!(report.errors, vec![ValidationIssue::EmptyStates]);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_key_errors() {
        let asset = InteractionDataAsset::new("Vault").with_state(
            StateDefinition::new("Locked", "Unlock")
                .with_requirement(KeyRequirement::new("Gold", "Gold Key", "Need gold"))
                .with_requirement(KeyRequirement::new(Name::NONE, "", ""))
                .with_requirement(KeyRequirement::new("Gold", "Gold Key", "Need gold")),
        );

        let report = asset.validate();
        assert_eq!(
            report.errors,
            vec![
                ValidationIssue::NoneKeyId {
                    state_index: 0,
                    index: 1
                },
                ValidationIssue::DuplicateKeyId {
                    state_index: 0,
                    key_id: Name::new("Gold")
                },
            ]
        );
    }

    #[test]
    fn test_warnings_do_not_invalidate() {
        let asset = InteractionDataAsset::new("Valve")
            .with_state(StateDefinition::new("Shut", "").with_hold(0.0))
            .with_state(
                StateDefinition::new("Jammed", "Kick")
                    .with_requirement(KeyRequirement::new("Boots", "Boots", "")),
            );

        let report = asset.validate();
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 3);
        assert!(report.warnings.contains(&ValidationIssue::EmptyPromptText {
            state_id: Name::new("Shut")
        }));
        assert!(report.warnings.contains(&ValidationIssue::NonPositiveHoldDuration {
            state_id: Name::new("Shut")
        }));
    }

    #[test]
    fn test_force_hide_skips_prompt_warning() {
        let asset = InteractionDataAsset::new("Secret")
            .with_prompt_override(PromptOverride::ForceHide)
            .with_state(StateDefinition::new("Hidden", ""));
        assert!(asset.validate().is_clean());
    }

    #[test]
    fn test_prompt_warning_follows_runtime_visibility() {
        let silent = StateDefinition::new("Idle", "").with_show_prompt(false);
        let per_state = InteractionDataAsset::new("Lamp").with_state(silent.clone());
        let forced = per_state.clone().with_prompt_override(PromptOverride::ForceShow);

        for asset in [&per_state, &forced] {
            let warned = asset
                .validate()
                .warnings
                .contains(&ValidationIssue::EmptyPromptText {
                    state_id: Name::new("Idle"),
                });
            assert_eq!(warned, asset.should_show_prompt(&silent));
        }
        assert!(forced.should_show_prompt(&silent));
    }

    #[test]
    fn test_dangling_default() {
        let asset = InteractionDataAsset::new("Door")
            .with_state(StateDefinition::new("Closed", "Open"))
            .with_default_state("Ajar");

        let report = asset.validate();
        assert_eq!(
            report.errors,
            vec![ValidationIssue::DanglingDefaultStateId {
                state_id: Name::new("Ajar")
            }]
        );
    }

    #[test]
    fn test_none_state_id_is_error() {
        let asset = InteractionDataAsset::new("Odd").with_state(StateDefinition::default());
        assert_eq!(
            asset.validate().errors,
            vec![ValidationIssue::NoneStateId { index: 0 }]
        );
    }

    #[test]
    fn test_npc_validation() {
        let asset = NpcInteractionDataAsset::new("")
            .with_state(
                NpcDialogueState::new("Ask", "", "Sure.")
                    .with_requirement(KeyRequirement::new("Coin", "Coin", "Need a coin")),
            )
            .with_state(NpcDialogueState::new("Idle", "", ""));

        let report = asset.validate();
        assert_eq!(report.errors, vec![ValidationIssue::NoneDefaultStateId]);
        assert_eq!(
            report.warnings,
            vec![
                ValidationIssue::EmptyLineIfMissing { index: 0 },
                ValidationIssue::EmptyLineIfMet { index: 1 },
                ValidationIssue::EmptyNpcPrompt,
            ]
        );
    }

    #[test]
    fn test_issue_messages() {
        let issue = ValidationIssue::DuplicateStateId {
            state_id: Name::new("Dup"),
        };
        assert_eq!(issue.to_string(), "duplicate state_id 'Dup' found in states");
        assert_eq!(issue.severity(), Severity::Error);
    }
}
