// Path: crates/abci/src/rules/source.rs

use super::ProcessRules;
use std::path::PathBuf;
use std::sync::Arc;
use tmpop_api::validation::{LinkValidator, RulesetUpdate, ValidatorSource};
use tokio::sync::watch;

/// Polls a JSON rules file and yields a new `ProcessRules` whenever its
/// content hash changes.
///
/// A missing or invalid file keeps whatever ruleset is active.
#[derive(Debug)]
pub struct RulesFileSource {
    path: PathBuf,
    current: Option<[u8; 32]>,
}

impl RulesFileSource {
    /// Watches `path`. Nothing is read until the first poll.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: None,
        }
    }
}

impl ValidatorSource for RulesFileSource {
    fn poll(&mut self) -> RulesetUpdate {
        let rules = match ProcessRules::load(&self.path) {
            Ok(rules) => rules,
            Err(e) => {
                tracing::warn!(
                    target: "abci",
                    path = %self.path.display(),
                    error = %e,
                    "rules file unreadable, keeping the active ruleset"
                );
                return RulesetUpdate::Unchanged;
            }
        };
        let hash = rules.hash();
        if self.current == Some(hash) {
            return RulesetUpdate::Unchanged;
        }
        self.current = Some(hash);
        tracing::info!(
            target: "abci",
            path = %self.path.display(),
            ruleset_hash = %hex::encode(hash),
            "ruleset loaded"
        );
        RulesetUpdate::Set(Arc::new(rules))
    }
}

/// The value carried by a ruleset channel. `None` means no ruleset.
pub type RulesetCell = Option<Arc<dyn LinkValidator>>;

/// A `ValidatorSource` fed through a `tokio::sync::watch` channel, for hosts
/// that swap rulesets programmatically.
#[derive(Debug)]
pub struct ChannelValidatorSource {
    receiver: watch::Receiver<RulesetCell>,
    primed: bool,
}

impl ChannelValidatorSource {
    /// Wraps a receiver. The first poll reports the channel's current value.
    pub fn new(receiver: watch::Receiver<RulesetCell>) -> Self {
        Self {
            receiver,
            primed: false,
        }
    }
}

/// Creates a ruleset channel holding `initial`.
pub fn channel(initial: RulesetCell) -> (watch::Sender<RulesetCell>, ChannelValidatorSource) {
    let (sender, receiver) = watch::channel(initial);
    (sender, ChannelValidatorSource::new(receiver))
}

impl ValidatorSource for ChannelValidatorSource {
    fn poll(&mut self) -> RulesetUpdate {
        if self.primed {
            // A closed channel keeps the last ruleset it delivered.
            match self.receiver.has_changed() {
                Ok(true) => {}
                Ok(false) | Err(_) => return RulesetUpdate::Unchanged,
            }
        }
        self.primed = true;
        match self.receiver.borrow_and_update().clone() {
            Some(validator) => RulesetUpdate::Set(validator),
            None => RulesetUpdate::Cleared,
        }
    }
}
