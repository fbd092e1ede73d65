//! Panel state machines.
//!
//! Read panels (`keys`, `get`) recompute whenever their input changes:
//! `Idle -> Pending -> Success | Failed`, with no confirmation step.
//! Write panels (`set`, `delete`, `flushAll`) only run on explicit submit:
//! `Idle -> Confirming -> Pending -> Success | Failed`, and any input edit
//! drops them back to `Idle`. Nothing is retried.

use crate::output::Output;

/// Word the user must type to confirm `flushAll`.
pub const FLUSHALL_TOKEN: &str = "flushall";

/// One remote call, as issued by a panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Keys(String),
    Get(String),
    Set { key: String, value: String },
    Delete(String),
    FlushAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Confirming,
    Pending,
    Success(Output),
    Failed(String),
}

impl Phase {
    /// Text for the shared output block: the result, the error message, or nothing.
    pub fn output_text(&self) -> String {
        match self {
            Phase::Success(out) => out.to_string(),
            Phase::Failed(message) => message.clone(),
            Phase::Idle | Phase::Confirming | Phase::Pending => String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOp {
    Keys,
    Get,
}

#[derive(Debug, Clone)]
pub struct ReadPanel {
    op: ReadOp,
    issued: Option<String>,
    phase: Phase,
}

impl ReadPanel {
    pub fn new(op: ReadOp) -> Self {
        Self { op, issued: None, phase: Phase::Idle }
    }

    pub fn keys() -> Self {
        Self::new(ReadOp::Keys)
    }

    pub fn get() -> Self {
        Self::new(ReadOp::Get)
    }

    pub fn op(&self) -> ReadOp {
        self.op
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Feed a new input. Returns the call to issue when the input is
    /// non-empty and differs from the one last issued.
    pub fn set_input(&mut self, input: impl Into<String>) -> Option<Call> {
        let input = input.into();
        if input.is_empty() {
            self.issued = None;
            self.phase = Phase::Idle;
            return None;
        }
        if self.issued.as_deref() == Some(input.as_str()) {
            return None;
        }
        self.issued = Some(input.clone());
        self.phase = Phase::Pending;
        Some(match self.op {
            ReadOp::Keys => Call::Keys(input),
            ReadOp::Get => Call::Get(input),
        })
    }

    /// Record whatever the transport delivered; later responses simply overwrite earlier ones.
    pub fn resolve(&mut self, result: Result<Output, String>) {
        self.phase = match result {
            Ok(out) => Phase::Success(out),
            Err(message) => Phase::Failed(message),
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Set,
    Delete,
    FlushAll,
}

/// What the user has to acknowledge before a write is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// Plain yes/no question.
    YesNo(String),
    /// The user must type `token` exactly.
    Token { prompt: String, token: &'static str },
}

impl Confirmation {
    pub fn prompt(&self) -> &str {
        match self {
            Confirmation::YesNo(prompt) => prompt,
            Confirmation::Token { prompt, .. } => prompt,
        }
    }

    fn accepts(&self, answer: &Answer) -> bool {
        match (self, answer) {
            (Confirmation::YesNo(_), Answer::Accept) => true,
            (Confirmation::Token { token, .. }, Answer::Typed(typed)) => typed == token,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Accept,
    Decline,
    Typed(String),
}

#[derive(Debug, Clone)]
pub struct WritePanel {
    op: WriteOp,
    key: String,
    value: String,
    pending_confirmation: Option<Confirmation>,
    phase: Phase,
}

impl WritePanel {
    pub fn new(op: WriteOp) -> Self {
        Self {
            op,
            key: String::new(),
            value: String::new(),
            pending_confirmation: None,
            phase: Phase::Idle,
        }
    }

    pub fn set() -> Self {
        Self::new(WriteOp::Set)
    }

    pub fn delete() -> Self {
        Self::new(WriteOp::Delete)
    }

    pub fn flush_all() -> Self {
        Self::new(WriteOp::FlushAll)
    }

    pub fn op(&self) -> WriteOp {
        self.op
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key = key.into();
        self.reset();
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.reset();
    }

    /// Edits drop a stale confirmation or result; an in-flight call keeps the panel `Pending`.
    fn reset(&mut self) {
        self.pending_confirmation = None;
        if self.phase != Phase::Pending {
            self.phase = Phase::Idle;
        }
    }

    /// Submission stays disabled until every required input is non-empty.
    pub fn can_submit(&self) -> bool {
        match self.op {
            WriteOp::Set => !self.key.is_empty() && !self.value.is_empty(),
            WriteOp::Delete => !self.key.is_empty(),
            WriteOp::FlushAll => true,
        }
    }

    /// Ask for confirmation. `None` when submission is disabled or a call is in flight.
    pub fn submit(&mut self) -> Option<Confirmation> {
        if !self.can_submit() || self.phase == Phase::Pending {
            return None;
        }
        let confirmation = match self.op {
            WriteOp::Set => Confirmation::YesNo(format!(
                "You are attempting to set key {} with value {}. Any existing value will be overwritten. Continue?",
                self.key, self.value
            )),
            WriteOp::Delete => {
                Confirmation::YesNo(format!("You are attempting to delete key {}. Continue?", self.key))
            }
            WriteOp::FlushAll => Confirmation::Token {
                prompt: format!(
                    "You are about to delete ALL KEYS from ALL DATABASES. Type '{FLUSHALL_TOKEN}' to confirm."
                ),
                token: FLUSHALL_TOKEN,
            },
        };
        self.pending_confirmation = Some(confirmation.clone());
        self.phase = Phase::Confirming;
        Some(confirmation)
    }

    /// Answer the pending confirmation. An accepted answer yields the call to
    /// issue; anything else cancels back to `Idle` without a call.
    pub fn confirm(&mut self, answer: Answer) -> Option<Call> {
        let confirmation = self.pending_confirmation.take()?;
        if !confirmation.accepts(&answer) {
            self.phase = Phase::Idle;
            return None;
        }
        self.phase = Phase::Pending;
        Some(match self.op {
            WriteOp::Set => Call::Set { key: self.key.clone(), value: self.value.clone() },
            WriteOp::Delete => Call::Delete(self.key.clone()),
            WriteOp::FlushAll => Call::FlushAll,
        })
    }

    pub fn resolve(&mut self, result: Result<Output, String>) {
        self.phase = match result {
            Ok(out) => Phase::Success(out),
            Err(message) => Phase::Failed(message),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_panel_refetches_only_on_change() {
        let mut panel = ReadPanel::keys();
        assert_eq!(panel.set_input(""), None);
        assert_eq!(panel.phase(), &Phase::Idle);

        assert_eq!(panel.set_input("user:*"), Some(Call::Keys("user:*".into())));
        assert_eq!(panel.phase(), &Phase::Pending);
        panel.resolve(Ok(Output::Keys(vec!["user:1".into()])));
        assert_eq!(panel.phase().output_text(), "user:1");

        // same input: nothing to do
        assert_eq!(panel.set_input("user:*"), None);
        assert_eq!(panel.phase().output_text(), "user:1");

        assert_eq!(panel.set_input("session:*"), Some(Call::Keys("session:*".into())));
        panel.resolve(Err("connection refused".into()));
        assert_eq!(panel.phase(), &Phase::Failed("connection refused".into()));
    }

    #[test]
    fn clearing_read_input_returns_to_idle_and_rearms() {
        let mut panel = ReadPanel::get();
        assert!(panel.set_input("a").is_some());
        panel.set_input("");
        assert_eq!(panel.phase(), &Phase::Idle);
        assert_eq!(panel.set_input("a"), Some(Call::Get("a".into())));
    }

    #[test]
    fn delete_requires_key_and_yes() {
        let mut panel = WritePanel::delete();
        assert!(!panel.can_submit());
        assert_eq!(panel.submit(), None);

        panel.set_key("a");
        let confirmation = panel.submit().expect("enabled");
        assert_eq!(confirmation.prompt(), "You are attempting to delete key a. Continue?");
        assert_eq!(panel.phase(), &Phase::Confirming);

        assert_eq!(panel.confirm(Answer::Accept), Some(Call::Delete("a".into())));
        assert_eq!(panel.phase(), &Phase::Pending);
        panel.resolve(Ok(Output::Deleted(1)));
        assert_eq!(panel.phase().output_text(), "Deleted 1 key(s)");
    }

    #[test]
    fn declined_delete_issues_nothing() {
        let mut panel = WritePanel::delete();
        panel.set_key("a");
        panel.submit();
        assert_eq!(panel.confirm(Answer::Decline), None);
        assert_eq!(panel.phase(), &Phase::Idle);
        // confirmation is consumed
        assert_eq!(panel.confirm(Answer::Accept), None);
    }

    #[test]
    fn flush_all_needs_exact_token() {
        let mut panel = WritePanel::flush_all();
        for wrong in [Answer::Accept, Answer::Typed("FLUSHALL".into()), Answer::Typed("flushall ".into())] {
            assert!(panel.submit().is_some());
            assert_eq!(panel.confirm(wrong), None);
            assert_eq!(panel.phase(), &Phase::Idle);
        }

        match panel.submit() {
            Some(Confirmation::Token { token, .. }) => assert_eq!(token, FLUSHALL_TOKEN),
            other => panic!("expected token confirmation, got {other:?}"),
        }
        assert_eq!(panel.confirm(Answer::Typed("flushall".into())), Some(Call::FlushAll));
    }

    #[test]
    fn set_needs_key_and_value_and_edits_reset() {
        let mut panel = WritePanel::set();
        panel.set_key("k");
        assert!(!panel.can_submit());
        panel.set_value("v");
        assert!(panel.can_submit());

        panel.submit();
        assert_eq!(panel.phase(), &Phase::Confirming);
        panel.set_value("w");
        assert_eq!(panel.phase(), &Phase::Idle);
        assert_eq!(panel.confirm(Answer::Accept), None);

        panel.submit();
        assert_eq!(
            panel.confirm(Answer::Accept),
            Some(Call::Set { key: "k".into(), value: "w".into() })
        );
    }

    #[test]
    fn failed_write_shows_message() {
        let mut panel = WritePanel::delete();
        panel.set_key("a");
        panel.submit();
        panel.confirm(Answer::Accept);
        assert_eq!(panel.submit(), None, "no second submit while pending");
        panel.resolve(Err("READONLY You can't write against a read only replica.".into()));
        assert_eq!(panel.phase().output_text(), "READONLY You can't write against a read only replica.");
    }

    #[test]
    fn edits_while_pending_do_not_rearm_submit() {
        let mut panel = WritePanel::delete();
        panel.set_key("a");
        panel.submit();
        assert_eq!(panel.confirm(Answer::Accept), Some(Call::Delete("a".into())));

        panel.set_key("b");
        assert_eq!(panel.phase(), &Phase::Pending);
        assert_eq!(panel.submit(), None);
        assert_eq!(panel.confirm(Answer::Accept), None);

        panel.resolve(Ok(Output::Deleted(1)));
        assert_eq!(panel.phase(), &Phase::Success(Output::Deleted(1)));
        panel.set_key("c");
        assert_eq!(panel.phase(), &Phase::Idle);
        assert!(panel.submit().is_some());
    }
}
