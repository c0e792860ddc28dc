use std::fmt;

/// The wizard's steps, in order. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    Identity,
    Contact,
    Details,
    Uploads,
    Success,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::Identity,
        Step::Contact,
        Step::Details,
        Step::Uploads,
        Step::Success,
    ];

    /// 1-based position, used for the progress bar.
    pub fn number(&self) -> u8 {
        match self {
            Step::Identity => 1,
            Step::Contact => 2,
            Step::Details => 3,
            Step::Uploads => 4,
            Step::Success => 5,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Step::Identity => "About your business",
            Step::Contact => "Where should we send it?",
            Step::Details => "Tell us more (optional)",
            Step::Uploads => "Logos, photos & files (optional)",
            Step::Success => "You're in the queue!",
        }
    }

    /// Next step for a plain forward move. Uploads and Success have none:
    /// leaving Uploads is a submission, and Success is terminal.
    pub(crate) fn next(self) -> Option<Step> {
        match self {
            Step::Identity => Some(Step::Contact),
            Step::Contact => Some(Step::Details),
            Step::Details => Some(Step::Uploads),
            Step::Uploads | Step::Success => None,
        }
    }

    pub(crate) fn prev(self) -> Option<Step> {
        match self {
            Step::Contact => Some(Step::Identity),
            Step::Details => Some(Step::Contact),
            Step::Uploads => Some(Step::Details),
            Step::Identity | Step::Success => None,
        }
    }

    pub fn can_retreat(&self) -> bool {
        self.prev().is_some()
    }

    /// Steps that may trigger the terminal submission.
    pub fn can_submit(&self) -> bool {
        matches!(self, Step::Details | Step::Uploads)
    }

    pub fn id(&self) -> &'static str {
        match self {
            Step::Identity => "identity",
            Step::Contact => "contact",
            Step::Details => "details",
            Step::Uploads => "uploads",
            Step::Success => "success",
        }
    }

    pub fn from_id(id: &str) -> Option<Step> {
        Step::ALL
            .into_iter()
            .find(|s| s.id().eq_ignore_ascii_case(id.trim()))
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
