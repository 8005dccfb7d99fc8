use std::time::Duration;

/// How long a transient message stays on screen.
pub const NOTICE_TTL: Duration = Duration::from_secs(6);

pub type NoticeId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: NoticeId,
    pub severity: Severity,
    pub text: String,
}

/// Stack of transient messages, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NoticeBoard {
    next_id: NoticeId,
    notices: Vec<Notice>,
}

impl NoticeBoard {
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub(crate) fn push(&mut self, severity: Severity, text: impl Into<String>) -> NoticeId {
        self.next_id += 1;
        let id = self.next_id;
        self.notices.insert(
            0,
            Notice {
                id,
                severity,
                text: text.into(),
            },
        );
        id
    }

    pub(crate) fn dismiss(&mut self, id: NoticeId) -> bool {
        let before = self.notices.len();
        self.notices.retain(|notice| notice.id != id);
        self.notices.len() != before
    }
}
