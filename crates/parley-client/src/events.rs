//! Side effects the conversation view asks the display layer to perform.
//!
//! Effects travel over an unbounded `tokio` channel so the view never
//! depends on how (or whether) the display layer renders them.

use serde::Serialize;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "kebab-case")]
pub enum ViewEffect {
    /// A history fetch started; show the loading indicator.
    SpinnerStarted { key: &'static str },
    /// The history fetch finished, successfully or not.
    SpinnerStopped { key: &'static str },
    /// Keep the newest message in view.
    ScrollDown,
}

pub type EffectReceiver = mpsc::UnboundedReceiver<ViewEffect>;

#[derive(Debug, Clone)]
pub struct EffectSender {
    tx: mpsc::UnboundedSender<ViewEffect>,
}

impl EffectSender {
    pub fn channel() -> (Self, EffectReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn emit(&self, effect: ViewEffect) {
        if let Err(mpsc::error::SendError(effect)) = self.tx.send(effect) {
            tracing::debug!(?effect, "Effect dropped, display layer gone");
        }
    }
}

/// Keeps the loading indicator spinning until dropped.
#[derive(Debug)]
pub struct SpinnerGuard {
    key: &'static str,
    effects: EffectSender,
}

impl SpinnerGuard {
    pub fn spin(key: &'static str, effects: &EffectSender) -> Self {
        effects.emit(ViewEffect::SpinnerStarted { key });
        Self {
            key,
            effects: effects.clone(),
        }
    }
}

impl Drop for SpinnerGuard {
    fn drop(&mut self) {
        self.effects.emit(ViewEffect::SpinnerStopped { key: self.key });
    }
}
